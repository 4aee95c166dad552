use nalgebra as na;

use crate::bbox::{BBox, Ltwh};

/// Live view of a tracked person handed to the crossing detector and renderers.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub track_id: u32,
    pub frames_since_seen: u32,
    pub bbox: BBox<Ltwh>,

    // in px
    pub center: na::Point2<f32>,
    pub previous_center: na::Point2<f32>,
}
