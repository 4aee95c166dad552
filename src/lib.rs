pub mod bbox;
pub mod config;
pub mod counter;
pub mod crossing;
pub mod detection;
pub mod error;
pub mod fps;
pub mod frame;
pub mod occupancy;
pub mod scene;
pub mod sink;
pub mod tracker;

mod circular_queue;
mod track;

pub use config::CounterConfig;
pub use counter::{FrameReport, PeopleCounter};
pub use crossing::{CountingLine, CrossingDirection, CrossingEvent};
pub use detection::{Detection, PERSON_CLASS};
pub use frame::Frame;
pub use occupancy::{Counts, Occupancy};
pub use scene::{Scene, SceneUpdate};
pub use sink::{CountSink, MemorySink, SqliteSink};
pub use track::Track;

/// Frame-to-frame identity assignment. Implementations must snapshot the
/// previous center of every matched object before overwriting its current
/// center, and must be driven from a single thread, one frame at a time.
pub trait Tracking {
    fn update(&mut self, detections: &[Detection]) -> SceneUpdate;
    fn tracks(&self) -> Vec<Track>;
}
