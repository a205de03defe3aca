use flamey_layout::{
    layout, Campfire, CampfireParams, Color, ColorKeying, FlameyBuffer, FlameyStore,
    GradientAnchor, GradientTable, Population, RingParams, Selection,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn pick_tick_and_repopulate() {
    let mut fire = Campfire::new(CampfireParams::default()).unwrap();
    let mut store = FlameyBuffer::new();
    let mut rng = StdRng::seed_from_u64(2024);

    fire.populate(&mut store, 5000, &mut rng).unwrap();
    let original_3 = *store.get(3).unwrap();

    assert_eq!(fire.on_pick(&mut store, Some(3)), Some(3));
    fire.on_frame_tick(&mut store, 16.0);
    assert_eq!(fire.on_pick(&mut store, Some(7)), Some(7));

    // Height moved with the tick, everything else came back.
    let restored = *store.get(3).unwrap();
    assert_eq!(restored.color, original_3.color);
    assert_eq!(restored.scale, original_3.scale);
    assert_eq!(restored.position[0], original_3.position[0]);
    assert_eq!(restored.position[2], original_3.position[2]);

    assert_eq!(fire.on_pick(&mut store, Some(7)), None);
    assert_eq!(fire.selection(), Selection::Selected(7));

    fire.populate(&mut store, 200, &mut rng).unwrap();
    assert_eq!(fire.selection(), Selection::None);
    assert_eq!(fire.population(), Population::Populated(200));
    assert_eq!(store.len(), 200);

    // Old index 7 is a fresh flamey now; picking it highlights it again.
    assert_eq!(fire.on_pick(&mut store, Some(7)), Some(7));
}

#[test]
fn same_count_gives_same_shape_different_detail() {
    let mut fire = Campfire::new(CampfireParams::default()).unwrap();
    let mut a = FlameyBuffer::new();
    let mut b = FlameyBuffer::new();

    fire.populate(&mut a, 1000, &mut StdRng::seed_from_u64(1)).unwrap();
    fire.populate(&mut b, 1000, &mut StdRng::seed_from_u64(2)).unwrap();

    assert_eq!(a.len(), b.len());
    assert_ne!(a.flameys(), b.flameys());

    // Colors depend only on the index.
    for (fa, fb) in a.flameys().iter().zip(b.flameys()) {
        assert_eq!(fa.color, fb.color);
    }

    // Jitter never moves a flamey more than the configured amount off its ring slot.
    let params = fire.params();
    let slots = layout(1000, &params.rings).unwrap();
    let k = params.flameys.position_randomness;
    for (flamey, slot) in a.flameys().iter().zip(&slots) {
        let dx = flamey.position[0] - slot.radius * slot.angle.cos();
        let dz = flamey.position[2] - slot.radius * slot.angle.sin();
        assert!((-1e-4..=k + 1e-4).contains(&dx));
        assert!((-1e-4..=k + 1e-4).contains(&dz));
    }
}

#[test]
fn custom_gradient_drives_colors() {
    let red = Color::rgb(1.0, 0.0, 0.0);
    let blue = Color::rgb(0.0, 0.0, 1.0);
    let table = GradientTable::new(vec![
        GradientAnchor::new(0, red),
        GradientAnchor::new(10, blue),
    ])
    .unwrap();

    let params = CampfireParams {
        rings: RingParams {
            initial_capacity: 20,
            initial_radius: 2.4,
            radius_increment: 1.0,
            ..RingParams::default()
        },
        coloring: ColorKeying::Index(table),
        ..CampfireParams::default()
    };
    let mut fire = Campfire::new(params).unwrap();
    let mut store = FlameyBuffer::new();
    fire.populate(&mut store, 20, &mut StdRng::seed_from_u64(9)).unwrap();

    assert_eq!(store.get(0).unwrap().color(), red);
    assert_eq!(store.get(10).unwrap().color(), blue);
    // Past the last anchor the ramp keeps going.
    assert!(store.get(19).unwrap().color().b > 1.0);
}
