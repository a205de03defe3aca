//! # Campfire Renderer
//!
//! wgpu rendering, camera and picking for the flamey campfire scene.

pub mod ambience;
pub mod camera;
pub mod error;
pub mod picking;
pub mod renderer;

pub use ambience::*;
pub use camera::*;
pub use error::*;
pub use picking::*;
pub use renderer::*;
