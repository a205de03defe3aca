//! # Flamey Layout
//!
//! Placement and animation core for the campfire scene: thousands of billboard
//! "flameys" arranged in concentric rings around the fire, colored by a
//! piecewise gradient, gently floating, and individually pickable.
//!
//! The crate never owns GPU resources. A host hands it a [`FlameyStore`] and
//! drives [`Campfire`] from its render loop.

pub mod animator;
pub mod attributes;
pub mod color;
pub mod error;
pub mod gradient;
pub mod rings;
pub mod scene;
pub mod selection;
pub mod store;

pub use animator::*;
pub use attributes::*;
pub use color::*;
pub use error::*;
pub use gradient::*;
pub use rings::*;
pub use scene::*;
pub use selection::*;
pub use store::*;
