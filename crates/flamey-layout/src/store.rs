//! Flamey records and the store the host keeps them in

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::color::Color;

/// Largest flamey count a single store allocation can describe.
pub const MAX_FLAMEYS: usize = isize::MAX as usize / std::mem::size_of::<Flamey>();

/// GPU-compatible flamey instance.
///
/// Laid out to match the WGSL `Flamey` struct (vec3 + f32 + vec4, 32 bytes).
/// A flamey's identity is its index in the store.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct Flamey {
    pub position: [f32; 3],
    /// Uniform scale applied to all three axes
    pub scale: f32,
    pub color: [f32; 4],
}

impl Flamey {
    pub fn new(position: Vec3, scale: f32, color: Color) -> Self {
        Self {
            position: position.to_array(),
            scale,
            color: color.to_array(),
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    pub fn color(&self) -> Color {
        Color::from_array(self.color)
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color.to_array();
    }
}

/// Indexed flamey storage owned by the rendering host.
pub trait FlameyStore {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, index: usize) -> Option<&Flamey>;

    fn get_mut(&mut self, index: usize) -> Option<&mut Flamey>;

    /// All flameys, for per-frame passes.
    fn flameys_mut(&mut self) -> &mut [Flamey];

    /// Drop every current flamey and take ownership of `flameys` in one step.
    fn replace_all(&mut self, flameys: Vec<Flamey>);
}

/// `Vec`-backed store, uploaded to the GPU as-is.
#[derive(Clone, Debug, Default)]
pub struct FlameyBuffer {
    flameys: Vec<Flamey>,
    /// Bumped whenever the buffer is rebuilt; GPU mirrors resize when it changes
    generation: u64,
}

impl FlameyBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flameys(&self) -> &[Flamey] {
        &self.flameys
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl FlameyStore for FlameyBuffer {
    fn len(&self) -> usize {
        self.flameys.len()
    }

    fn get(&self, index: usize) -> Option<&Flamey> {
        self.flameys.get(index)
    }

    fn get_mut(&mut self, index: usize) -> Option<&mut Flamey> {
        self.flameys.get_mut(index)
    }

    fn flameys_mut(&mut self) -> &mut [Flamey] {
        &mut self.flameys
    }

    fn replace_all(&mut self, flameys: Vec<Flamey>) {
        self.flameys = flameys;
        self.generation = self.generation.wrapping_add(1);
    }
}
