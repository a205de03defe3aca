//! Pick/selection tracking
//!
//! At most one flamey is highlighted at a time. Picking another flamey restores
//! the previous one to exactly the color and scale it had before it was
//! highlighted. Picking the highlighted flamey again, or picking nothing, is a
//! no-op so the highlight never flickers.

use crate::color::Color;
use crate::store::FlameyStore;

/// Emphasis applied to the selected flamey.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Highlight {
    pub color: Color,
    pub scale: f32,
}

impl Default for Highlight {
    fn default() -> Self {
        Self {
            color: Color::RED,
            scale: 1.5,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selection {
    None,
    Selected(usize),
}

impl Selection {
    pub fn index(&self) -> Option<usize> {
        match self {
            Selection::None => None,
            Selection::Selected(index) => Some(*index),
        }
    }
}

/// Attributes of the selected flamey from before it was highlighted.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Snapshot {
    index: usize,
    color: Color,
    scale: f32,
}

#[derive(Clone, Debug, Default)]
pub struct SelectionTracker {
    highlight: Highlight,
    snapshot: Option<Snapshot>,
}

impl SelectionTracker {
    pub fn new(highlight: Highlight) -> Self {
        Self {
            highlight,
            snapshot: None,
        }
    }

    pub fn selection(&self) -> Selection {
        match self.snapshot {
            Some(snapshot) => Selection::Selected(snapshot.index),
            None => Selection::None,
        }
    }

    /// Apply a resolved pick.
    ///
    /// Returns the index to report to the host, or `None` when nothing visible
    /// changed. Indices outside the store count as "no flamey".
    pub fn on_pick<S: FlameyStore + ?Sized>(
        &mut self,
        store: &mut S,
        pick: Option<usize>,
    ) -> Option<usize> {
        let index = pick?;

        let Some(picked) = store.get(index).copied() else {
            log::warn!(
                "Ignoring pick of flamey {} (store holds {})",
                index,
                store.len()
            );
            return None;
        };

        if let Some(previous) = self.snapshot {
            if previous.index == index {
                return None;
            }
            if let Some(flamey) = store.get_mut(previous.index) {
                flamey.set_color(previous.color);
                flamey.scale = previous.scale;
            }
        }

        self.snapshot = Some(Snapshot {
            index,
            color: picked.color(),
            scale: picked.scale,
        });

        if let Some(flamey) = store.get_mut(index) {
            flamey.set_color(self.highlight.color);
            flamey.scale = self.highlight.scale;
        }

        log::debug!("Selected flamey {}", index);
        Some(index)
    }

    /// Forget the selection without touching the store.
    ///
    /// Only valid when the store is about to be rebuilt.
    pub fn reset(&mut self) {
        self.snapshot = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Flamey, FlameyBuffer};
    use glam::Vec3;

    fn store(n: usize) -> FlameyBuffer {
        let mut buffer = FlameyBuffer::new();
        buffer.replace_all(
            (0..n)
                .map(|i| {
                    Flamey::new(
                        Vec3::new(i as f32, 0.55, 0.0),
                        0.5 + i as f32 * 0.01,
                        Color::rgb(0.0, i as f32 / n as f32, 1.0),
                    )
                })
                .collect(),
        );
        buffer
    }

    #[test]
    fn test_first_pick_highlights() {
        let mut buffer = store(10);
        let mut tracker = SelectionTracker::default();

        assert_eq!(tracker.on_pick(&mut buffer, Some(3)), Some(3));
        assert_eq!(tracker.selection(), Selection::Selected(3));
        assert_eq!(buffer.get(3).unwrap().color(), Color::RED);
        assert_eq!(buffer.get(3).unwrap().scale, 1.5);
    }

    #[test]
    fn test_switching_restores_previous() {
        let mut buffer = store(10);
        let original = *buffer.get(3).unwrap();
        let mut tracker = SelectionTracker::default();

        tracker.on_pick(&mut buffer, Some(3));
        assert_eq!(tracker.on_pick(&mut buffer, Some(7)), Some(7));

        assert_eq!(*buffer.get(3).unwrap(), original);
        assert_eq!(buffer.get(7).unwrap().color(), Color::RED);
        assert_eq!(tracker.selection(), Selection::Selected(7));
    }

    #[test]
    fn test_repick_is_noop() {
        let mut buffer = store(10);
        let mut tracker = SelectionTracker::default();

        tracker.on_pick(&mut buffer, Some(3));
        tracker.on_pick(&mut buffer, Some(7));
        let before = buffer.flameys().to_vec();

        assert_eq!(tracker.on_pick(&mut buffer, Some(7)), None);
        assert_eq!(buffer.flameys(), &before[..]);
        assert_eq!(tracker.selection(), Selection::Selected(7));
    }

    #[test]
    fn test_picking_nothing_keeps_selection() {
        let mut buffer = store(10);
        let mut tracker = SelectionTracker::default();

        tracker.on_pick(&mut buffer, Some(2));
        assert_eq!(tracker.on_pick(&mut buffer, None), None);
        assert_eq!(tracker.on_pick(&mut buffer, Some(99)), None);
        assert_eq!(tracker.selection(), Selection::Selected(2));
        assert_eq!(buffer.get(2).unwrap().color(), Color::RED);
    }

    #[test]
    fn test_chain_restores_every_original() {
        let mut buffer = store(10);
        let originals = buffer.flameys().to_vec();
        let mut tracker = SelectionTracker::default();

        for index in [1, 4, 1, 9, 0] {
            tracker.on_pick(&mut buffer, Some(index));
        }

        for (i, flamey) in buffer.flameys().iter().enumerate() {
            if i == 0 {
                assert_eq!(flamey.color(), Color::RED);
            } else {
                assert_eq!(*flamey, originals[i], "flamey {}", i);
            }
        }
    }

    #[test]
    fn test_custom_highlight() {
        let mut buffer = store(4);
        let highlight = Highlight {
            color: Color::WHITE,
            scale: 2.0,
        };
        let mut tracker = SelectionTracker::new(highlight);
        tracker.on_pick(&mut buffer, Some(1));
        assert_eq!(buffer.get(1).unwrap().color(), Color::WHITE);
        assert_eq!(buffer.get(1).unwrap().scale, 2.0);
    }

    #[test]
    fn test_reset_clears_selection() {
        let mut buffer = store(4);
        let mut tracker = SelectionTracker::default();
        tracker.on_pick(&mut buffer, Some(1));
        tracker.reset();
        assert_eq!(tracker.selection(), Selection::None);
        assert_eq!(tracker.selection().index(), None);
    }
}
