//! Piecewise-linear color ramp keyed by flamey index

use crate::color::Color;
use crate::error::GradientError;

/// A `(threshold, color)` pair of the ramp.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientAnchor {
    pub amount: usize,
    pub color: Color,
}

impl GradientAnchor {
    pub const fn new(amount: usize, color: Color) -> Self {
        Self { amount, color }
    }
}

/// Ordered gradient anchors with strictly increasing thresholds.
///
/// Lookups past the last threshold keep interpolating along the final pair,
/// so colors extrapolate beyond the last anchor instead of clamping.
#[derive(Clone, Debug, PartialEq)]
pub struct GradientTable {
    anchors: Vec<GradientAnchor>,
}

impl GradientTable {
    pub fn new(anchors: Vec<GradientAnchor>) -> Result<Self, GradientError> {
        if anchors.len() < 2 {
            return Err(GradientError::TooFewAnchors(anchors.len()));
        }

        for (index, anchor) in anchors.iter().enumerate() {
            if !anchor.color.is_finite() {
                return Err(GradientError::NonFiniteColor(index));
            }
            if index > 0 {
                let previous = anchors[index - 1].amount;
                if anchor.amount <= previous {
                    return Err(GradientError::NonIncreasingThreshold {
                        index,
                        amount: anchor.amount,
                        previous,
                    });
                }
            }
        }

        Ok(Self { anchors })
    }

    /// Campfire palette: mint → teal → amber → red over the first 10k flameys.
    pub fn campfire() -> Self {
        Self {
            anchors: vec![
                GradientAnchor::new(0, Color::rgb(0.5, 2.0, 1.5)),
                GradientAnchor::new(100, Color::rgb(0.1, 1.0, 0.8)),
                GradientAnchor::new(1000, Color::rgb(1.0, 0.66, 0.1)),
                GradientAnchor::new(10000, Color::rgb(1.0, 0.1, 0.2)),
            ],
        }
    }

    pub fn anchors(&self) -> &[GradientAnchor] {
        &self.anchors
    }

    /// Index of the first anchor of the pair that brackets `index`.
    ///
    /// Falls back to the last pair when no pair brackets it.
    fn segment(&self, index: usize) -> usize {
        self.anchors
            .windows(2)
            .position(|pair| pair[0].amount <= index && index < pair[1].amount)
            .unwrap_or(self.anchors.len() - 2)
    }

    pub fn color_at(&self, index: usize) -> Color {
        let a = self.segment(index);
        let from = self.anchors[a];
        let to = self.anchors[a + 1];

        // Signed: an index below the first threshold extrapolates backwards.
        let factor =
            (index as f64 - from.amount as f64) / (to.amount as f64 - from.amount as f64);

        from.color.lerp(to.color, factor as f32)
    }
}

impl Default for GradientTable {
    fn default() -> Self {
        Self::campfire()
    }
}
