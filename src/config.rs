use serde_derive::{Deserialize, Serialize};

use crate::detection::PERSON_CLASS;
use crate::error::Error;

/// Tuning knobs of the tracker and the counting line.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct CounterConfig {
    /// An object unmatched for more frames than this is dropped.
    pub max_frames_missing: u32,
    /// Centroid distance (px) below which a detection continues an object.
    pub distance_threshold: f32,
    /// Vertical position of the counting line; the frame midpoint when unset.
    pub line_y: Option<f32>,
    /// Objects missing for this many frames or more are hidden from consumers.
    pub visibility_cutoff: u32,
    pub person_class: i32,
    /// Drop evicted identities from the counted set, bounding it to live tracks.
    pub recount_after_eviction: bool,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            max_frames_missing: 5,
            distance_threshold: 50.0,
            line_y: None,
            visibility_cutoff: 2,
            person_class: PERSON_CLASS,
            recount_after_eviction: false,
        }
    }
}

impl CounterConfig {
    pub fn from_json(src: &str) -> Result<Self, Error> {
        let config: Self = serde_json::from_str(src)?;
        config.validate()?;

        Ok(config)
    }

    pub fn with_line_y(mut self, line_y: f32) -> Self {
        self.line_y = Some(line_y);
        self
    }

    pub fn validate(&self) -> Result<(), Error> {
        if !self.distance_threshold.is_finite() || self.distance_threshold <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "distance_threshold must be a positive number, got {}",
                self.distance_threshold
            )));
        }

        if let Some(y) = self.line_y {
            if !y.is_finite() {
                return Err(Error::InvalidConfig(format!(
                    "line_y must be finite, got {}",
                    y
                )));
            }
        }

        if self.visibility_cutoff == 0 {
            return Err(Error::InvalidConfig(
                "visibility_cutoff of 0 would hide every track".into(),
            ));
        }

        Ok(())
    }
}
