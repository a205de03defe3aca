//! Campfire scene state: layout, animation and selection driven by the host

use rand::Rng;

use crate::animator::FloatAnimator;
use crate::attributes::{assign, ColorKeying, FlameyParams};
use crate::error::LayoutError;
use crate::rings::{rings, RingParams, RingSlot};
use crate::selection::{Highlight, Selection, SelectionTracker};
use crate::store::{FlameyStore, MAX_FLAMEYS};

/// Default number of flameys around the fire.
pub const FLAMEY_COUNT: usize = 5000;

/// Everything that shapes the flamey field.
#[derive(Clone, Debug, PartialEq)]
pub struct CampfireParams {
    pub rings: RingParams,
    pub flameys: FlameyParams,
    pub coloring: ColorKeying,
    pub floating: FloatAnimator,
    pub highlight: Highlight,
}

impl Default for CampfireParams {
    fn default() -> Self {
        let flameys = FlameyParams::default();
        Self {
            rings: RingParams::default(),
            coloring: ColorKeying::default(),
            floating: FloatAnimator::new(flameys.base_height, 0.08, 2300.0),
            highlight: Highlight::default(),
            flameys,
        }
    }
}

impl CampfireParams {
    pub fn validate(&self) -> Result<(), LayoutError> {
        self.rings.validate()?;
        self.flameys.validate()?;
        self.coloring.validate()?;
        self.floating.validate()?;
        if !(self.highlight.color.is_finite() && self.highlight.scale.is_finite()) {
            return Err(LayoutError::param("highlight", "must be finite"));
        }
        Ok(())
    }
}

/// Whether the store currently holds a laid-out field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Population {
    Empty,
    Populated(usize),
}

/// Scene controller owning all cross-frame state.
///
/// The host owns the [`FlameyStore`] and calls in once per population request,
/// once per frame, and once per resolved pick.
#[derive(Clone, Debug)]
pub struct Campfire {
    params: CampfireParams,
    animator: FloatAnimator,
    selection: SelectionTracker,
    population: Population,
}

impl Campfire {
    pub fn new(params: CampfireParams) -> Result<Self, LayoutError> {
        params.validate()?;
        Ok(Self {
            animator: params.floating,
            selection: SelectionTracker::new(params.highlight),
            population: Population::Empty,
            params,
        })
    }

    pub fn params(&self) -> &CampfireParams {
        &self.params
    }

    pub fn population(&self) -> Population {
        self.population
    }

    pub fn selection(&self) -> Selection {
        self.selection.selection()
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.animator.elapsed_ms()
    }

    /// Rebuild the whole field with `count` flameys.
    ///
    /// The selection is dropped first since indices are reassigned. The new
    /// field is built off to the side and swapped into the store in one call.
    pub fn populate<S, R>(
        &mut self,
        store: &mut S,
        count: usize,
        rng: &mut R,
    ) -> Result<(), LayoutError>
    where
        S: FlameyStore + ?Sized,
        R: Rng + ?Sized,
    {
        let rings = rings(count, &self.params.rings)?;

        let mut flameys = Vec::new();
        flameys
            .try_reserve_exact(count)
            .map_err(|_| LayoutError::Allocation(count))?;

        self.selection.reset();
        self.population = Population::Empty;

        let mut ring_count = 0;
        for ring in rings {
            ring_count += 1;
            for (slot, index) in ring.particles().enumerate() {
                let placement = RingSlot {
                    ring: ring.index,
                    radius: ring.radius,
                    angle: ring.angle_of(slot),
                };
                flameys.push(assign(
                    index,
                    &placement,
                    &self.params.flameys,
                    &self.params.coloring,
                    rng,
                ));
            }
        }

        store.replace_all(flameys);
        self.population = Population::Populated(count);

        log::info!("Populated {} flameys in {} rings", count, ring_count);
        Ok(())
    }

    /// [`populate`](Self::populate) for hosts that hold the count as a float
    /// (sliders, text fields).
    ///
    /// Negative, fractional, non-finite and oversized values are rejected
    /// before any storage is touched.
    pub fn populate_from_f64<S, R>(
        &mut self,
        store: &mut S,
        count: f64,
        rng: &mut R,
    ) -> Result<(), LayoutError>
    where
        S: FlameyStore + ?Sized,
        R: Rng + ?Sized,
    {
        let count = count_from_f64(count)?;
        self.populate(store, count, rng)
    }

    /// Advance the float animation by `delta_ms` and write new heights.
    pub fn on_frame_tick<S: FlameyStore + ?Sized>(&mut self, store: &mut S, delta_ms: f64) {
        self.animator.tick(delta_ms);
        self.animator.apply(store.flameys_mut());
    }

    /// Apply a resolved pick; returns the index to report to the UI, if any.
    pub fn on_pick<S: FlameyStore + ?Sized>(
        &mut self,
        store: &mut S,
        pick: Option<usize>,
    ) -> Option<usize> {
        if self.population == Population::Empty {
            return None;
        }
        self.selection.on_pick(store, pick)
    }
}

fn count_from_f64(value: f64) -> Result<usize, LayoutError> {
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value > MAX_FLAMEYS as f64 {
        log::warn!("Rejected flamey count {}", value);
        return Err(LayoutError::InvalidCount(value));
    }
    Ok(value as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::FlameyBuffer;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn campfire() -> (Campfire, FlameyBuffer, StdRng) {
        (
            Campfire::new(CampfireParams::default()).unwrap(),
            FlameyBuffer::new(),
            StdRng::seed_from_u64(42),
        )
    }

    #[test]
    fn test_populate_fills_store() {
        let (mut fire, mut store, mut rng) = campfire();
        assert_eq!(fire.population(), Population::Empty);

        fire.populate(&mut store, 5000, &mut rng).unwrap();
        assert_eq!(store.len(), 5000);
        assert_eq!(fire.population(), Population::Populated(5000));
    }

    #[test]
    fn test_populate_zero() {
        let (mut fire, mut store, mut rng) = campfire();
        fire.populate(&mut store, 0, &mut rng).unwrap();
        assert!(store.is_empty());
        assert_eq!(fire.population(), Population::Populated(0));
        assert_eq!(fire.on_pick(&mut store, Some(0)), None);
    }

    #[test]
    fn test_repopulate_resets_selection() {
        let (mut fire, mut store, mut rng) = campfire();
        fire.populate(&mut store, 5000, &mut rng).unwrap();
        assert_eq!(fire.on_pick(&mut store, Some(4000)), Some(4000));

        fire.populate(&mut store, 200, &mut rng).unwrap();
        assert_eq!(fire.selection(), Selection::None);
        assert_eq!(store.len(), 200);
        assert!(store
            .flameys()
            .iter()
            .all(|f| f.color() != fire.params().highlight.color));
    }

    #[test]
    fn test_rejected_count_leaves_store_untouched() {
        let (mut fire, mut store, mut rng) = campfire();
        fire.populate(&mut store, 50, &mut rng).unwrap();
        fire.on_pick(&mut store, Some(10));
        let generation = store.generation();

        for bad in [-1.0, f64::NAN, f64::INFINITY, 2.5, 1e19] {
            assert!(matches!(
                fire.populate_from_f64(&mut store, bad, &mut rng),
                Err(LayoutError::InvalidCount(_))
            ));
        }

        assert_eq!(store.generation(), generation);
        assert_eq!(store.len(), 50);
        assert_eq!(fire.selection(), Selection::Selected(10));

        fire.populate_from_f64(&mut store, 30.0, &mut rng).unwrap();
        assert_eq!(store.len(), 30);
    }

    #[test]
    fn test_oversized_count_returns_error() {
        let (mut fire, mut store, mut rng) = campfire();
        fire.populate(&mut store, 10, &mut rng).unwrap();

        assert!(matches!(
            fire.populate(&mut store, usize::MAX, &mut rng),
            Err(LayoutError::InvalidCount(_))
        ));
        assert!(matches!(
            fire.populate_from_f64(&mut store, (MAX_FLAMEYS as f64) * 2.0, &mut rng),
            Err(LayoutError::InvalidCount(_))
        ));
        assert_eq!(store.len(), 10);
        assert_eq!(fire.population(), Population::Populated(10));
    }

    #[test]
    fn test_frame_tick_moves_only_height() {
        let (mut fire, mut store, mut rng) = campfire();
        fire.populate(&mut store, 100, &mut rng).unwrap();
        let before = store.flameys().to_vec();

        fire.on_frame_tick(&mut store, 16.6);
        assert_eq!(fire.elapsed_ms(), 16.6);
        for (i, (a, b)) in before.iter().zip(store.flameys()).enumerate() {
            assert_eq!(a.position[0], b.position[0]);
            assert_eq!(a.position[2], b.position[2]);
            let expected = 0.55 + 0.08 * ((i as f64 + 16.6 / 2300.0).cos() as f32);
            assert!((b.position[1] - expected).abs() < 1e-5);
        }
    }

    #[test]
    fn test_pick_before_populate_is_ignored() {
        let (mut fire, mut store, _) = campfire();
        assert_eq!(fire.on_pick(&mut store, Some(0)), None);
    }

    #[test]
    fn test_invalid_params_rejected() {
        let mut params = CampfireParams::default();
        params.rings.initial_capacity = 0;
        assert!(Campfire::new(params).is_err());
    }
}
