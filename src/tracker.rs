use std::collections::BTreeMap;

use nalgebra as na;
use tracing::debug;

use crate::bbox::{BBox, Ltwh};
use crate::Track;

#[derive(Debug, Clone)]
pub struct TrackedObject {
    pub id: u32,
    pub center: na::Point2<f32>,
    pub previous_center: na::Point2<f32>,
    pub bbox: BBox<Ltwh>,
    pub frames_since_seen: u32,
}

impl TrackedObject {
    pub fn new(id: u32, bbox: BBox<Ltwh>) -> Self {
        let center = bbox.center();

        Self {
            id,
            center,
            // a new object has no motion yet, so it can never cross on its first frame
            previous_center: center,
            bbox,
            frames_since_seen: 0,
        }
    }

    /// Applies a successful match. The old center becomes the previous center
    /// before it is overwritten.
    pub fn update(&mut self, bbox: BBox<Ltwh>) {
        self.previous_center = self.center;
        self.center = bbox.center();
        self.bbox = bbox;
        self.frames_since_seen = 0;
    }

    #[inline]
    pub fn distance(&self, pt: &na::Point2<f32>) -> f32 {
        na::distance(&self.center, pt)
    }
}

impl From<&TrackedObject> for Track {
    fn from(o: &TrackedObject) -> Track {
        Track {
            track_id: o.id,
            frames_since_seen: o.frames_since_seen,
            bbox: o.bbox,
            center: o.center,
            previous_center: o.previous_center,
        }
    }
}

/// Owns every known object keyed by identity. Identities start at 0, grow by
/// one per created object and are never handed out twice.
#[derive(Debug, Default)]
pub struct TrackStore {
    next_id: u32,
    objects: BTreeMap<u32, TrackedObject>,
}

impl TrackStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    #[inline]
    pub fn get(&self, id: u32) -> Option<&TrackedObject> {
        self.objects.get(&id)
    }

    #[inline]
    pub fn contains(&self, id: u32) -> bool {
        self.objects.contains_key(&id)
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &TrackedObject> {
        self.objects.values()
    }

    /// Identity the next created object will receive.
    #[inline]
    pub fn next_id(&self) -> u32 {
        self.next_id
    }

    pub fn create(&mut self, bbox: BBox<Ltwh>) -> u32 {
        let id = self.next_id;
        self.next_id += 1;

        let obj = TrackedObject::new(id, bbox);
        debug!(id, x = obj.center.x, y = obj.center.y, "track created");
        self.objects.insert(id, obj);

        id
    }

    /// Returns `false` when `id` is not in the store.
    pub fn update(&mut self, id: u32, bbox: BBox<Ltwh>) -> bool {
        match self.objects.get_mut(&id) {
            Some(obj) => {
                obj.update(bbox);
                true
            }
            None => false,
        }
    }

    /// Marks every object as unseen for one more frame.
    pub fn age(&mut self) {
        for obj in self.objects.values_mut() {
            obj.frames_since_seen += 1;
        }
    }

    /// Removes objects missing for more than `max_frames_missing` frames and
    /// returns their identities.
    pub fn evict(&mut self, max_frames_missing: u32) -> Vec<u32> {
        let mut evicted = Vec::new();

        self.objects.retain(|&id, obj| {
            if obj.frames_since_seen > max_frames_missing {
                evicted.push(id);
                false
            } else {
                true
            }
        });

        for id in &evicted {
            debug!(id, "track evicted");
        }

        evicted
    }

    /// Nearest object strictly closer than `threshold`, with its distance. On
    /// equal distances the lowest identity wins.
    pub fn nearest(&self, pt: &na::Point2<f32>, threshold: f32) -> Option<(u32, f32)> {
        let mut best = None;
        let mut min_dist = threshold;

        for obj in self.objects.values() {
            let dist = obj.distance(pt);
            if dist < min_dist {
                min_dist = dist;
                best = Some((obj.id, dist));
            }
        }

        best
    }

    /// Objects missing for fewer than `visibility_cutoff` frames.
    pub fn visible(&self, visibility_cutoff: u32) -> Vec<Track> {
        self.objects
            .values()
            .filter(|o| o.frames_since_seen < visibility_cutoff)
            .map(Into::into)
            .collect()
    }
}
