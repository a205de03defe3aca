//! Scene lighting, fog, the animated fire and the loading overlay

use flamey_layout::Color;
use glam::Vec3;

/// Cubic ease-in-out, `t` in [0, 1].
pub fn ease_in_out_cubic(t: f32) -> f32 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        let f = t - 1.0;
        1.0 + 4.0 * f * f * f
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Keyframe {
    pub frame: f32,
    pub value: f32,
}

/// Looping keyframe track sampled in milliseconds.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyframeTrack {
    pub fps: f32,
    keys: Vec<Keyframe>,
}

impl KeyframeTrack {
    /// Keys must be sorted by frame; a track with fewer than two keys is constant.
    pub fn new(fps: f32, keys: Vec<Keyframe>) -> Self {
        Self { fps, keys }
    }

    /// `low -> high -> low` over `frames` frames.
    pub fn pulse(fps: f32, frames: f32, low: f32, high: f32) -> Self {
        Self::new(
            fps,
            vec![
                Keyframe {
                    frame: 0.0,
                    value: low,
                },
                Keyframe {
                    frame: frames / 2.0,
                    value: high,
                },
                Keyframe {
                    frame: frames,
                    value: low,
                },
            ],
        )
    }

    pub fn sample(&self, elapsed_ms: f64) -> f32 {
        let (first, last) = match (self.keys.first(), self.keys.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return 0.0,
        };
        let length = last.frame - first.frame;
        if length <= 0.0 || self.fps <= 0.0 {
            return first.value;
        }

        let frames = (elapsed_ms / 1000.0 * self.fps as f64).rem_euclid(length as f64) as f32;
        let frame = first.frame + frames;

        for pair in self.keys.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if frame >= a.frame && frame <= b.frame && b.frame > a.frame {
                let t = ease_in_out_cubic((frame - a.frame) / (b.frame - a.frame));
                return a.value + (b.value - a.value) * t;
            }
        }
        last.value
    }
}

/// The central flame bobbing with its light.
#[derive(Clone, Debug, PartialEq)]
pub struct FireAnimation {
    pub flame_height: KeyframeTrack,
    pub light_intensity: KeyframeTrack,
}

impl Default for FireAnimation {
    fn default() -> Self {
        Self {
            flame_height: KeyframeTrack::pulse(30.0, 100.0, 0.05, 0.45),
            light_intensity: KeyframeTrack::pulse(30.0, 100.0, 500.0, 5000.0),
        }
    }
}

impl FireAnimation {
    /// Flame height and light intensity at `elapsed_ms`.
    pub fn sample(&self, elapsed_ms: f64) -> (f32, f32) {
        (
            self.flame_height.sample(elapsed_ms),
            self.light_intensity.sample(elapsed_ms),
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fog {
    pub start: f32,
    pub end: f32,
    pub color: Color,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Color,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vignette {
    pub color: Color,
    pub weight: f32,
}

/// Static look of the scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneAmbience {
    pub clear_color: Color,
    pub fog: Fog,
    pub light: PointLight,
    pub hemi_color: Color,
    pub hemi_intensity: f32,
    pub vignette: Vignette,
    pub flame_color: Color,
    pub flame_scale: f32,
    /// Ground plane half extent
    pub ground_extent: f32,
    pub ground_color: Color,
}

impl Default for SceneAmbience {
    fn default() -> Self {
        Self {
            clear_color: Color::rgb(0.0, 0.0, 0.0),
            fog: Fog {
                start: 32.0,
                end: 96.0,
                color: Color::rgb(0.0, 0.55, 1.0),
            },
            light: PointLight {
                position: Vec3::new(0.0, 7.0, 0.0),
                color: Color::rgb(0.0, 0.333, 1.0),
            },
            hemi_color: Color::WHITE,
            hemi_intensity: 0.2,
            vignette: Vignette {
                color: Color::rgb(0.0, 0.1, 0.2),
                weight: 5.0,
            },
            flame_color: Color::rgb(0.65, 0.85, 0.95),
            flame_scale: 2.5,
            ground_extent: 150.0,
            ground_color: Color::rgb(0.2, 0.25, 0.3),
        }
    }
}

/// Black cover shown at startup that fades out once loading finishes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LoadingFade {
    alpha: f32,
    fading: bool,
    /// Alpha lost per millisecond while fading
    pub rate: f32,
}

impl Default for LoadingFade {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            fading: false,
            rate: 0.0025,
        }
    }
}

impl LoadingFade {
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn hide(&mut self) {
        self.fading = true;
    }

    pub fn update(&mut self, delta_ms: f32) {
        if self.fading && delta_ms.is_finite() && delta_ms > 0.0 {
            self.alpha = (self.alpha - self.rate * delta_ms).max(0.0);
            if self.alpha == 0.0 {
                self.fading = false;
            }
        }
    }
}
