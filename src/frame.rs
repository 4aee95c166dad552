use crate::detection::Detection;

pub struct Frame {
    pub index: u64,
    pub dims: (u32, u32),
    pub detections: Vec<Detection>,
}

impl Frame {
    pub fn new(index: u64, dims: (u32, u32), detections: Vec<Detection>) -> Self {
        Self {
            index,
            dims,
            detections,
        }
    }

    /// Counting line position used when none is configured: the vertical midpoint.
    #[inline]
    pub fn midline(&self) -> f32 {
        self.dims.1 as f32 / 2.0
    }
}
