//! Fixed-angle panning camera and ground parallax
//!
//! The camera orbits nothing: its angles are locked and the only input is a
//! drag that slides the target across the ground plane. Drags feed an inertial
//! offset that is applied and decayed once per frame by [`pan_step`].

use glam::{Mat4, Vec2, Vec3};

/// Inertial offsets below `speed * EPSILON` snap to zero.
const EPSILON: f32 = 0.001;

/// Camera configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraSettings {
    /// Longitudinal angle (radians)
    pub alpha: f32,
    /// Latitudinal angle from the up axis (radians)
    pub beta: f32,
    /// Distance from the target
    pub radius: f32,
    /// Fraction of the pan velocity kept each frame
    pub panning_inertia: f32,
    /// Pixels of drag per unit of pan velocity
    pub panning_sensibility: f32,
    /// Maximum distance the target may wander from its origin
    pub panning_distance_limit: f32,
    pub speed: f32,
    pub fovy: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            alpha: 0.0,
            beta: std::f32::consts::PI / 5.0,
            radius: 25.0,
            panning_inertia: 0.95,
            panning_sensibility: 500.0,
            panning_distance_limit: 40.0,
            speed: 2.0,
            fovy: 0.8,
            znear: 0.1,
            zfar: 1000.0,
        }
    }
}

/// Result of one inertia step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanStep {
    pub target: Vec3,
    pub inertial_pan: Vec2,
    /// The move was rejected by the distance limit
    pub clamped: bool,
}

pub struct PanningCamera {
    pub settings: CameraSettings,
    pub target: Vec3,
    origin_target: Vec3,
    inertial_pan: Vec2,
    pub aspect: f32,
}

impl PanningCamera {
    pub fn new(settings: CameraSettings, width: u32, height: u32) -> Self {
        Self {
            settings,
            target: Vec3::ZERO,
            origin_target: Vec3::ZERO,
            inertial_pan: Vec2::ZERO,
            aspect: width.max(1) as f32 / height.max(1) as f32,
        }
    }

    pub fn inertial_pan(&self) -> Vec2 {
        self.inertial_pan
    }

    pub fn position(&self) -> Vec3 {
        let s = &self.settings;
        let (sin_a, cos_a) = s.alpha.sin_cos();
        let (sin_b, cos_b) = s.beta.sin_cos();
        self.target + s.radius * Vec3::new(cos_a * sin_b, cos_b, sin_a * sin_b)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    pub fn build_view_projection_matrix(&self) -> Mat4 {
        let s = &self.settings;
        let proj = Mat4::perspective_rh(s.fovy, self.aspect, s.znear, s.zfar);
        proj * self.view_matrix()
    }

    /// Camera right and up axes in world space.
    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        let world = self.view_matrix().inverse();
        let right = world.x_axis.truncate();
        let up = world.y_axis.truncate();
        let forward = -world.z_axis.truncate();
        (right, up, forward)
    }

    /// Feed a pointer drag (pixels, screen y down).
    pub fn pan(&mut self, delta_x: f32, delta_y: f32) {
        let sensibility = self.settings.panning_sensibility;
        self.inertial_pan.x -= delta_x / sensibility;
        self.inertial_pan.y += delta_y / sensibility;
    }

    /// Apply and decay the inertial pan. Call once per frame.
    pub fn update(&mut self) {
        let step = pan_step(self);
        if step.clamped {
            log::debug!("Pan blocked at distance limit, target {:?}", self.target);
        }
        self.target = step.target;
        self.inertial_pan = step.inertial_pan;
    }

    /// Return to the starting view.
    pub fn center(&mut self) {
        self.target = self.origin_target;
        self.inertial_pan = Vec2::ZERO;
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
    }
}

/// Next target and pan velocity for the camera's current state.
pub fn pan_step(camera: &PanningCamera) -> PanStep {
    let s = &camera.settings;
    let inertial = camera.inertial_pan;

    if inertial == Vec2::ZERO {
        return PanStep {
            target: camera.target,
            inertial_pan: inertial,
            clamped: false,
        };
    }

    // Pan along the camera's right and (ground-projected) up axes.
    let (right, up, _) = camera.basis();
    let mut delta = right * inertial.x + up * inertial.y;
    delta.y = 0.0;

    let candidate = camera.target + delta;
    let limit = s.panning_distance_limit;
    let clamped = candidate.distance_squared(camera.origin_target) > limit * limit;
    let target = if clamped { camera.target } else { candidate };

    let snap = s.speed * EPSILON;
    let mut next = inertial * s.panning_inertia;
    if next.x.abs() < snap {
        next.x = 0.0;
    }
    if next.y.abs() < snap {
        next.y = 0.0;
    }

    PanStep {
        target,
        inertial_pan: next,
        clamped,
    }
}

/// Background plane that slides against the camera for a sense of depth.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroundParallax {
    offset: Vec3,
    /// 0 disables parallax; negative moves the ground against the camera
    pub factor: f32,
    pub height: f32,
}

impl GroundParallax {
    /// Capture the offset between camera and ground at startup.
    pub fn new(camera_position: Vec3, ground_position: Vec3, factor: f32) -> Self {
        Self {
            offset: camera_position - ground_position,
            factor,
            height: ground_position.y,
        }
    }

    pub fn position(&self, camera_position: Vec3) -> Vec3 {
        Vec3::new(
            self.offset.x + self.factor * camera_position.x,
            self.height,
            self.offset.z + self.factor * camera_position.z,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> PanningCamera {
        PanningCamera::new(CameraSettings::default(), 1920, 1080)
    }

    #[test]
    fn test_position_uses_fixed_angles() {
        let cam = camera();
        let pos = cam.position();
        assert!((pos.length() - 25.0).abs() < 1e-4);
        let beta = (pos.y / 25.0).acos();
        assert!((beta - std::f32::consts::PI / 5.0).abs() < 1e-4);
        assert!(pos.z.abs() < 1e-5);
    }

    #[test]
    fn test_pan_moves_target_on_ground_plane() {
        let mut cam = camera();
        cam.pan(-100.0, 50.0);
        cam.update();
        assert_eq!(cam.target.y, 0.0);
        assert!(cam.target.length() > 0.0);
    }

    #[test]
    fn test_inertia_decays_to_rest() {
        let mut cam = camera();
        cam.pan(200.0, 0.0);
        let first = cam.inertial_pan().x.abs();

        cam.update();
        assert!((cam.inertial_pan().x.abs() - first * 0.95).abs() < 1e-6);

        for _ in 0..500 {
            cam.update();
        }
        assert_eq!(cam.inertial_pan(), Vec2::ZERO);

        let rest = cam.target;
        cam.update();
        assert_eq!(cam.target, rest);
    }

    #[test]
    fn test_distance_limit_holds() {
        let mut cam = camera();
        for _ in 0..200 {
            cam.pan(-5000.0, 0.0);
            cam.update();
            assert!(cam.target.length() <= 40.0 + 1e-3);
        }
    }

    #[test]
    fn test_center_resets() {
        let mut cam = camera();
        cam.pan(300.0, 300.0);
        cam.update();
        cam.center();
        assert_eq!(cam.target, Vec3::ZERO);
        assert_eq!(cam.inertial_pan(), Vec2::ZERO);
    }

    #[test]
    fn test_pan_step_is_pure() {
        let mut cam = camera();
        cam.pan(10.0, 10.0);
        let a = pan_step(&cam);
        let b = pan_step(&cam);
        assert_eq!(a, b);
        assert_eq!(cam.target, Vec3::ZERO);
    }

    #[test]
    fn test_ground_parallax() {
        let camera_start = Vec3::new(10.0, 20.0, 0.0);
        let ground = Vec3::new(0.0, -5.0, 0.0);
        let parallax = GroundParallax::new(camera_start, ground, -0.25);

        let p = parallax.position(Vec3::new(14.0, 20.0, 4.0));
        assert_eq!(p.y, -5.0);
        assert!((p.x - (10.0 - 0.25 * 14.0)).abs() < 1e-5);
        assert!((p.z - (0.0 - 0.25 * 4.0)).abs() < 1e-5);

        let still = GroundParallax::new(camera_start, ground, 0.0);
        assert_eq!(still.position(Vec3::new(99.0, 0.0, 99.0)).x, 10.0);
    }
}
