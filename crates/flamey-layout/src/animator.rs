//! Per-frame floating motion

use crate::error::LayoutError;
use crate::store::Flamey;

/// Vertical bobbing of every flamey.
///
/// `y = base_height + amplitude · cos(index + elapsed / period)`; each flamey
/// is phase-shifted by its index, so neighbours never move in lockstep.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FloatAnimator {
    pub base_height: f32,
    pub amplitude: f32,
    /// Milliseconds per radian of phase
    pub period_ms: f64,
    /// f64 so the phase stays precise after hours of uptime
    elapsed_ms: f64,
}

impl Default for FloatAnimator {
    fn default() -> Self {
        Self::new(0.55, 0.08, 2300.0)
    }
}

impl FloatAnimator {
    pub fn new(base_height: f32, amplitude: f32, period_ms: f64) -> Self {
        Self {
            base_height,
            amplitude,
            period_ms,
            elapsed_ms: 0.0,
        }
    }

    pub fn validate(&self) -> Result<(), LayoutError> {
        if !(self.base_height.is_finite() && self.amplitude.is_finite()) {
            return Err(LayoutError::param(
                "float animation",
                "height and amplitude must be finite",
            ));
        }
        if !(self.period_ms.is_finite() && self.period_ms > 0.0) {
            return Err(LayoutError::param("period_ms", "must be finite and positive"));
        }
        Ok(())
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    /// Advance the clock. Negative or non-finite deltas are ignored.
    pub fn tick(&mut self, delta_ms: f64) {
        if delta_ms.is_finite() && delta_ms > 0.0 {
            self.elapsed_ms += delta_ms;
        }
    }

    pub fn height_at(&self, index: usize) -> f32 {
        let phase = index as f64 + self.elapsed_ms / self.period_ms;
        self.base_height + self.amplitude * phase.cos() as f32
    }

    /// Write the current height into every flamey. Does not allocate.
    pub fn apply(&self, flameys: &mut [Flamey]) {
        for (index, flamey) in flameys.iter_mut().enumerate() {
            flamey.position[1] = self.height_at(index);
        }
    }
}
