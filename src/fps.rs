use std::time::Duration;

use crate::circular_queue::CircularQueue;

/// Frame throughput over the last `window` frame durations.
#[derive(Debug, Clone)]
pub struct FpsMeter {
    frames: u64,
    samples: CircularQueue<f32>,
}

impl FpsMeter {
    pub fn new(window: usize) -> Self {
        Self {
            frames: 0,
            samples: CircularQueue::with_capacity(window),
        }
    }

    /// Records one frame that took `ms` milliseconds.
    pub fn push_ms(&mut self, ms: f32) {
        self.samples.push(ms);
        self.frames += 1;
    }

    #[inline]
    pub fn push(&mut self, elapsed: Duration) {
        self.push_ms(elapsed.as_secs_f32() * 1000.0);
    }

    /// Frames recorded since creation or the last reset.
    #[inline]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn average(&self) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }

        let avg_ms = self.samples.iter().sum::<f32>() / self.samples.len() as f32;
        to_fps(avg_ms)
    }

    pub fn instant(&self) -> f32 {
        self.samples.top().map_or(0.0, |&ms| to_fps(ms))
    }

    pub fn reset(&mut self) {
        self.samples.clear();
        self.frames = 0;
    }
}

impl Default for FpsMeter {
    fn default() -> Self {
        Self::new(60)
    }
}

#[inline]
fn to_fps(ms: f32) -> f32 {
    if ms > 0.0 {
        1000.0 / ms
    } else {
        0.0
    }
}
