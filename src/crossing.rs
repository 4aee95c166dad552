use std::collections::HashSet;

use serde_derive::{Deserialize, Serialize};
use tracing::info;

use crate::Track;

/// Direction of a counted transition over the line. Image y grows downward,
/// so moving down across the line is an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrossingDirection {
    Entered,
    Exited,
}

impl CrossingDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Entered => "IN",
            Self::Exited => "OUT",
        }
    }
}

/// Horizontal counting line at a fixed `y`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CountingLine {
    pub y: f32,
}

impl CountingLine {
    pub fn new(y: f32) -> Self {
        Self { y }
    }

    /// Classifies the move from `prev_y` to `curr_y`. Starting exactly on the
    /// line never counts; ending exactly on it does.
    pub fn classify(&self, prev_y: f32, curr_y: f32) -> Option<CrossingDirection> {
        if prev_y < self.y && curr_y >= self.y {
            Some(CrossingDirection::Entered)
        } else if prev_y > self.y && curr_y <= self.y {
            Some(CrossingDirection::Exited)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CrossingEvent {
    pub track_id: u32,
    pub direction: CrossingDirection,
}

/// Turns track motion into one-shot entry/exit counts. Each identity counts
/// at most once while it stays in the counted set.
#[derive(Debug)]
pub struct CrossingDetector {
    line: CountingLine,
    counted: HashSet<u32>,
    entered: u64,
    exited: u64,
}

impl CrossingDetector {
    pub fn new(line: CountingLine) -> Self {
        Self {
            line,
            counted: HashSet::new(),
            entered: 0,
            exited: 0,
        }
    }

    #[inline]
    pub fn line(&self) -> CountingLine {
        self.line
    }

    #[inline]
    pub fn entered(&self) -> u64 {
        self.entered
    }

    #[inline]
    pub fn exited(&self) -> u64 {
        self.exited
    }

    #[inline]
    pub fn is_counted(&self, id: u32) -> bool {
        self.counted.contains(&id)
    }

    #[inline]
    pub fn counted_len(&self) -> usize {
        self.counted.len()
    }

    pub fn process(&mut self, tracks: &[Track]) -> Vec<CrossingEvent> {
        let mut events = Vec::new();

        for t in tracks {
            let direction = match self.line.classify(t.previous_center.y, t.center.y) {
                Some(d) => d,
                None => continue,
            };

            if !self.counted.insert(t.track_id) {
                continue;
            }

            match direction {
                CrossingDirection::Entered => self.entered += 1,
                CrossingDirection::Exited => self.exited += 1,
            }

            info!(
                id = t.track_id,
                direction = direction.as_str(),
                entered = self.entered,
                exited = self.exited,
                "line crossed"
            );

            events.push(CrossingEvent {
                track_id: t.track_id,
                direction,
            });
        }

        events
    }

    /// Drops identities from the counted set so a later crossing counts again.
    pub fn forget<I: IntoIterator<Item = u32>>(&mut self, ids: I) {
        for id in ids {
            self.counted.remove(&id);
        }
    }
}
