//! Per-flamey position, scale and color

use glam::Vec3;
use rand::Rng;

use crate::color::Color;
use crate::error::LayoutError;
use crate::gradient::GradientTable;
use crate::rings::RingSlot;
use crate::store::Flamey;

/// Static attribute parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlameyParams {
    /// Resting height of every flamey
    pub base_height: f32,
    /// Upper bound of the jitter added to x and z (always positive)
    pub position_randomness: f32,
    pub scale_min: f32,
    pub scale_max: f32,
}

impl Default for FlameyParams {
    fn default() -> Self {
        Self {
            base_height: 0.55,
            position_randomness: 0.55,
            scale_min: 0.5,
            scale_max: 0.7,
        }
    }
}

impl FlameyParams {
    pub fn validate(&self) -> Result<(), LayoutError> {
        if !self.base_height.is_finite() {
            return Err(LayoutError::param("base_height", "must be finite"));
        }
        if !(self.position_randomness.is_finite() && self.position_randomness >= 0.0) {
            return Err(LayoutError::param(
                "position_randomness",
                "must be finite and non-negative",
            ));
        }
        if !(self.scale_min.is_finite() && self.scale_max.is_finite()) {
            return Err(LayoutError::param("scale", "bounds must be finite"));
        }
        if self.scale_min > self.scale_max {
            return Err(LayoutError::param("scale", "scale_min must not exceed scale_max"));
        }
        Ok(())
    }
}

/// What a flamey's color is derived from.
#[derive(Clone, Debug, PartialEq)]
pub enum ColorKeying {
    /// Gradient lookup by flamey index
    Index(GradientTable),
    /// Two-color blend by `radius / max_radius`
    RadiusRatio {
        from: Color,
        to: Color,
        max_radius: f32,
    },
}

impl ColorKeying {
    /// Teal-to-red blend over 30 units of radius.
    pub fn radial() -> Self {
        Self::RadiusRatio {
            from: Color::rgb(0.0, 1.0, 0.78),
            to: Color::rgb(1.0, 0.0, 0.0),
            max_radius: 30.0,
        }
    }

    pub fn validate(&self) -> Result<(), LayoutError> {
        match self {
            // Tables are validated on construction.
            Self::Index(_) => Ok(()),
            Self::RadiusRatio {
                from,
                to,
                max_radius,
            } => {
                if !(max_radius.is_finite() && *max_radius > 0.0) {
                    return Err(LayoutError::param("max_radius", "must be finite and positive"));
                }
                if !(from.is_finite() && to.is_finite()) {
                    return Err(LayoutError::param("radial colors", "must be finite"));
                }
                Ok(())
            }
        }
    }

    pub fn color_for(&self, index: usize, radius: f32) -> Color {
        match self {
            Self::Index(table) => table.color_at(index),
            Self::RadiusRatio {
                from,
                to,
                max_radius,
            } => from.lerp(*to, radius / max_radius),
        }
    }
}

impl Default for ColorKeying {
    fn default() -> Self {
        Self::Index(GradientTable::campfire())
    }
}

/// Build the flamey at `index` from its ring placement.
pub fn assign<R: Rng + ?Sized>(
    index: usize,
    slot: &RingSlot,
    params: &FlameyParams,
    keying: &ColorKeying,
    rng: &mut R,
) -> Flamey {
    let (sin, cos) = slot.angle.sin_cos();
    let position = Vec3::new(
        slot.radius * cos + jitter(params.position_randomness, rng),
        params.base_height,
        slot.radius * sin + jitter(params.position_randomness, rng),
    );

    let scale = rng.random_range(params.scale_min..=params.scale_max);
    let color = keying.color_for(index, slot.radius);

    Flamey::new(position, scale, color)
}

/// Uniform in `[0, amount)`; zero when jitter is disabled.
fn jitter<R: Rng + ?Sized>(amount: f32, rng: &mut R) -> f32 {
    if amount > 0.0 {
        rng.random_range(0.0..amount)
    } else {
        0.0
    }
}
