//! Concentric ring layout
//!
//! Flameys are laid out ring by ring, innermost first. Every ring after the
//! first gets as many slots as keep the arc length between neighbours close to
//! the spacing of the first ring, so density stays even as the rings grow.
//! Consecutive rings are rotated by half a slot so flameys never line up
//! radially, and a final partial ring is spread evenly around its whole
//! circumference.

use std::f32::consts::TAU;

use crate::error::LayoutError;
use crate::store::MAX_FLAMEYS;

/// How the slot count of the next ring is derived.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CapacityGrowth {
    /// `floor(2π·radius / preferred_arc_distance)`
    ArcDistance,
    /// `round(previous_capacity · multiplier)`
    Geometric { multiplier: f32 },
}

/// Parameters of the ring layout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RingParams {
    /// Slot count of the innermost ring
    pub initial_capacity: usize,
    /// Radius of the innermost ring
    pub initial_radius: f32,
    /// Radius added between consecutive rings
    pub radius_increment: f32,
    /// Factor applied to `radius_increment` after every ring (1.0 = linear spacing)
    pub radius_increment_multiplier: f32,
    pub growth: CapacityGrowth,
}

impl Default for RingParams {
    fn default() -> Self {
        Self {
            initial_capacity: 20,
            initial_radius: 3.0,
            radius_increment: 1.2,
            radius_increment_multiplier: 1.0,
            growth: CapacityGrowth::ArcDistance,
        }
    }
}

impl RingParams {
    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.initial_capacity == 0 {
            return Err(LayoutError::param("initial_capacity", "must be at least 1"));
        }
        if !(self.initial_radius.is_finite() && self.initial_radius > 0.0) {
            return Err(LayoutError::param("initial_radius", "must be finite and positive"));
        }
        if !(self.radius_increment.is_finite() && self.radius_increment > 0.0) {
            return Err(LayoutError::param("radius_increment", "must be finite and positive"));
        }
        if !(self.radius_increment_multiplier.is_finite() && self.radius_increment_multiplier > 0.0)
        {
            return Err(LayoutError::param(
                "radius_increment_multiplier",
                "must be finite and positive",
            ));
        }
        if let CapacityGrowth::Geometric { multiplier } = self.growth {
            if !(multiplier.is_finite() && multiplier >= 1.0) {
                return Err(LayoutError::param(
                    "growth.multiplier",
                    "must be finite and at least 1.0",
                ));
            }
        }
        Ok(())
    }

    /// Target spacing between neighbours, taken from the innermost ring.
    pub fn preferred_arc_distance(&self) -> f32 {
        TAU * self.initial_radius / self.initial_capacity as f32
    }
}

/// One ring of the layout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ring {
    pub index: usize,
    pub radius: f32,
    /// Slots this ring holds before the next ring starts
    pub capacity: usize,
    pub angle_step: f32,
    /// Rotate by half a step (alternates ring to ring)
    pub angle_offset: bool,
    /// Index of the first flamey placed on this ring
    pub first_particle: usize,
    /// Flameys actually placed on this ring (`<= capacity`)
    pub len: usize,
}

impl Ring {
    pub fn angle_of(&self, slot: usize) -> f32 {
        let offset = if self.angle_offset {
            self.angle_step * 0.5
        } else {
            0.0
        };
        slot as f32 * self.angle_step + offset
    }

    /// Indices of the flameys on this ring.
    pub fn particles(&self) -> std::ops::Range<usize> {
        self.first_particle..self.first_particle + self.len
    }
}

/// Placement of a single flamey.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RingSlot {
    pub ring: usize,
    pub radius: f32,
    pub angle: f32,
}

/// Iterator over the rings needed to place a given number of flameys.
#[derive(Clone, Debug)]
pub struct Rings {
    params: RingParams,
    preferred_arc: f32,
    remaining: usize,
    next_index: usize,
    next_particle: usize,
    radius: f32,
    radius_increment: f32,
    capacity: usize,
    angle_step: f32,
    angle_offset: bool,
}

impl Rings {
    fn new(particle_count: usize, params: RingParams) -> Self {
        Self {
            preferred_arc: params.preferred_arc_distance(),
            remaining: particle_count,
            next_index: 0,
            next_particle: 0,
            radius: params.initial_radius,
            radius_increment: params.radius_increment,
            capacity: params.initial_capacity,
            angle_step: TAU / params.initial_capacity as f32,
            angle_offset: false,
            params,
        }
    }

    fn next_capacity(&self) -> usize {
        let capacity = match self.params.growth {
            CapacityGrowth::ArcDistance => (TAU * self.radius / self.preferred_arc).floor(),
            CapacityGrowth::Geometric { multiplier } => {
                (self.capacity as f32 * multiplier).round()
            }
        };
        // Float error can floor a one-slot ring to zero when the radius barely grows.
        (capacity as usize).max(1)
    }
}

impl Iterator for Rings {
    type Item = Ring;

    fn next(&mut self) -> Option<Ring> {
        if self.remaining == 0 {
            return None;
        }

        let len = self.capacity.min(self.remaining);
        let ring = Ring {
            index: self.next_index,
            radius: self.radius,
            capacity: self.capacity,
            angle_step: self.angle_step,
            angle_offset: self.angle_offset,
            first_particle: self.next_particle,
            len,
        };

        self.remaining -= len;
        self.next_particle += len;
        self.next_index += 1;

        self.radius += self.radius_increment;
        self.radius_increment *= self.params.radius_increment_multiplier;
        self.angle_offset = !self.angle_offset;
        self.capacity = self.next_capacity();

        let divisions = if 0 < self.remaining && self.remaining < self.capacity {
            self.remaining
        } else {
            self.capacity
        };
        self.angle_step = TAU / divisions as f32;

        Some(ring)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.remaining == 0 {
            (0, Some(0))
        } else {
            (1, Some(self.remaining))
        }
    }
}

impl std::iter::FusedIterator for Rings {}

/// Rings needed to place `particle_count` flameys.
pub fn rings(particle_count: usize, params: &RingParams) -> Result<Rings, LayoutError> {
    params.validate()?;
    if particle_count > MAX_FLAMEYS {
        return Err(LayoutError::InvalidCount(particle_count as f64));
    }
    Ok(Rings::new(particle_count, *params))
}

/// Ring radius and angle for every flamey, in index order.
pub fn layout(particle_count: usize, params: &RingParams) -> Result<Vec<RingSlot>, LayoutError> {
    let rings = rings(particle_count, params)?;

    let mut slots = Vec::new();
    slots
        .try_reserve_exact(particle_count)
        .map_err(|_| LayoutError::Allocation(particle_count))?;

    for ring in rings {
        for slot in 0..ring.len {
            let angle = ring.angle_of(slot);
            debug_assert!((0.0..TAU).contains(&angle));
            slots.push(RingSlot {
                ring: ring.index,
                radius: ring.radius,
                angle,
            });
        }
    }

    Ok(slots)
}
