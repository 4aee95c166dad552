use tracing::{info, warn};

use crate::config::CounterConfig;
use crate::crossing::{CountingLine, CrossingDetector, CrossingDirection, CrossingEvent};
use crate::error::Error;
use crate::occupancy::{Counts, Occupancy, PersistenceTrigger};
use crate::scene::Scene;
use crate::sink::CountSink;
use crate::{Frame, Track, Tracking};

/// Everything a renderer or caller needs to know about one processed frame.
#[derive(Debug, Clone)]
pub struct FrameReport {
    pub index: u64,
    pub tracks: Vec<Track>,
    pub events: Vec<CrossingEvent>,
    pub counts: Counts,
    pub occupancy: Occupancy,
    pub persisted: bool,
}

impl FrameReport {
    /// Direction of the first crossing counted in this frame, if any.
    #[inline]
    pub fn line_signal(&self) -> Option<CrossingDirection> {
        self.events.first().map(|e| e.direction)
    }
}

/// Frame loop core: association, line crossing, occupancy and persistence,
/// strictly in that order for every frame.
pub struct PeopleCounter<S: CountSink, T: Tracking = Scene> {
    tracker: T,
    crossing: Option<CrossingDetector>,
    trigger: PersistenceTrigger,
    sink: S,
    recount_after_eviction: bool,
    drifting: bool,
}

impl<S: CountSink> PeopleCounter<S, Scene> {
    pub fn new(config: CounterConfig, sink: S) -> Result<Self, Error> {
        let scene = Scene::new(&config);

        Self::with_tracker(scene, &config, sink)
    }
}

impl<S: CountSink, T: Tracking> PeopleCounter<S, T> {
    pub fn with_tracker(tracker: T, config: &CounterConfig, sink: S) -> Result<Self, Error> {
        config.validate()?;

        Ok(Self {
            tracker,
            crossing: config
                .line_y
                .map(|y| CrossingDetector::new(CountingLine::new(y))),
            trigger: PersistenceTrigger::new(),
            sink,
            recount_after_eviction: config.recount_after_eviction,
            drifting: false,
        })
    }

    pub fn process_frame(&mut self, frame: &Frame) -> FrameReport {
        let update = self.tracker.update(&frame.detections);
        let tracks = self.tracker.tracks();

        let crossing = self
            .crossing
            .get_or_insert_with(|| CrossingDetector::new(CountingLine::new(frame.midline())));

        let events = crossing.process(&tracks);

        if self.recount_after_eviction {
            crossing.forget(update.evicted);
        }

        let counts = Counts::new(crossing.entered(), crossing.exited());
        let occupancy = counts.occupancy();

        if occupancy.is_drifting() && !self.drifting {
            warn!(
                frame = frame.index,
                occupancy = occupancy.raw,
                "more exits than entries counted"
            );
        }
        self.drifting = occupancy.is_drifting();

        let persisted = self.persist(frame.index, &counts);

        FrameReport {
            index: frame.index,
            tracks,
            events,
            counts,
            occupancy,
            persisted,
        }
    }

    fn persist(&mut self, index: u64, counts: &Counts) -> bool {
        if !self.trigger.is_due(counts) {
            return false;
        }

        match self.sink.insert(counts.entered, counts.exited) {
            Ok(()) => {
                self.trigger.mark_persisted(counts);
                info!(
                    frame = index,
                    entered = counts.entered,
                    exited = counts.exited,
                    "counts persisted"
                );
                true
            }
            Err(err) => {
                warn!(frame = index, error = %err, "failed to persist counts");
                false
            }
        }
    }

    pub fn counts(&self) -> Counts {
        self.crossing
            .as_ref()
            .map(|c| Counts::new(c.entered(), c.exited()))
            .unwrap_or_default()
    }

    #[inline]
    pub fn occupancy(&self) -> Occupancy {
        self.counts().occupancy()
    }

    /// `None` until the first frame when the line follows the frame height.
    #[inline]
    pub fn line(&self) -> Option<CountingLine> {
        self.crossing.as_ref().map(|c| c.line())
    }

    #[inline]
    pub fn crossing(&self) -> Option<&CrossingDetector> {
        self.crossing.as_ref()
    }

    #[inline]
    pub fn last_persisted_total(&self) -> u64 {
        self.trigger.last_persisted_total()
    }

    #[inline]
    pub fn tracker(&self) -> &T {
        &self.tracker
    }

    #[inline]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    #[inline]
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}
