use serde_derive::{Deserialize, Serialize};

/// Running entry/exit totals.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Counts {
    pub entered: u64,
    pub exited: u64,
}

impl Counts {
    pub fn new(entered: u64, exited: u64) -> Self {
        Self { entered, exited }
    }

    #[inline]
    pub fn total(&self) -> u64 {
        self.entered + self.exited
    }

    #[inline]
    pub fn occupancy(&self) -> Occupancy {
        Occupancy::from(*self)
    }
}

/// People currently inside. `raw` may go negative when exits are attributed
/// to identities whose entry was never seen; `display` is clamped at zero.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occupancy {
    pub raw: i64,
    pub display: u64,
}

impl Occupancy {
    #[inline]
    pub fn is_drifting(&self) -> bool {
        self.raw < 0
    }
}

impl From<Counts> for Occupancy {
    fn from(c: Counts) -> Self {
        let raw = c.entered as i64 - c.exited as i64;

        Self {
            raw,
            display: raw.max(0) as u64,
        }
    }
}

/// Decides when totals should be handed to the sink: only after they grew.
#[derive(Debug, Default, Clone)]
pub struct PersistenceTrigger {
    last_persisted_total: u64,
}

impl PersistenceTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn last_persisted_total(&self) -> u64 {
        self.last_persisted_total
    }

    #[inline]
    pub fn is_due(&self, counts: &Counts) -> bool {
        counts.total() > self.last_persisted_total
    }

    /// Advances the cursor after a successful write.
    pub fn mark_persisted(&mut self, counts: &Counts) {
        self.last_persisted_total = self.last_persisted_total.max(counts.total());
    }
}
