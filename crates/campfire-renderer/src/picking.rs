//! CPU ray picking against flamey billboards

use flamey_layout::Flamey;
use glam::Vec3;

use crate::camera::PanningCamera;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl PanningCamera {
    /// Ray through a pixel, `(0, 0)` being the top-left corner.
    pub fn screen_to_world_ray(&self, x: f32, y: f32, width: f32, height: f32) -> Ray {
        let ndc_x = (2.0 * x / width.max(1.0)) - 1.0;
        let ndc_y = 1.0 - (2.0 * y / height.max(1.0));

        let (right, up, forward) = self.basis();
        let tan_half = (self.settings.fovy * 0.5).tan();
        let direction = forward + right * ndc_x * tan_half * self.aspect + up * ndc_y * tan_half;

        Ray {
            origin: self.position(),
            direction: direction.normalize(),
        }
    }
}

/// Distance along the ray to a sphere, if hit in front of the origin.
fn hit_sphere(ray: &Ray, center: Vec3, radius: f32) -> Option<f32> {
    let to_center = center - ray.origin;
    let along = to_center.dot(ray.direction);
    let miss_sq = to_center.length_squared() - along * along;
    let radius_sq = radius * radius;
    if miss_sq > radius_sq {
        return None;
    }
    let t = along - (radius_sq - miss_sq).sqrt();
    (t > 0.0).then_some(t)
}

/// Nearest flamey under the ray.
///
/// Each flamey is treated as a disc of radius `0.5 * scale` around its center.
pub fn pick_flamey(ray: &Ray, flameys: &[Flamey]) -> Option<usize> {
    flameys
        .iter()
        .enumerate()
        .filter_map(|(index, flamey)| {
            hit_sphere(ray, flamey.position(), 0.5 * flamey.scale).map(|t| (index, t))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(index, _)| index)
}
