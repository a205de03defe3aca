//! Error types for layout and gradient configuration

use thiserror::Error;

/// Errors raised while building a [`GradientTable`](crate::GradientTable).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GradientError {
    #[error("gradient needs at least 2 anchors, got {0}")]
    TooFewAnchors(usize),

    #[error(
        "gradient anchor {index} has threshold {amount}, which does not exceed the previous threshold {previous}"
    )]
    NonIncreasingThreshold {
        index: usize,
        amount: usize,
        previous: usize,
    },

    #[error("gradient anchor {0} has a non-finite color channel")]
    NonFiniteColor(usize),
}

/// Errors raised by layout parameters and population requests.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("invalid flamey count {0}: expected a finite, non-negative whole number")]
    InvalidCount(f64),

    #[error("could not allocate storage for {0} flameys")]
    Allocation(usize),

    #[error("invalid layout parameter `{name}`: {reason}")]
    InvalidParam {
        name: &'static str,
        reason: &'static str,
    },

    #[error(transparent)]
    Gradient(#[from] GradientError),
}

impl LayoutError {
    pub(crate) fn param(name: &'static str, reason: &'static str) -> Self {
        Self::InvalidParam { name, reason }
    }
}
