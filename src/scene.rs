use std::collections::BTreeMap;

use tracing::trace;

use crate::config::CounterConfig;
use crate::tracker::TrackStore;
use crate::{Detection, Track};

pub struct IndexedSlice<'a, T> {
    pub slice: &'a [T],
    idxs: Vec<usize>,
}

impl<'a, T> IndexedSlice<'a, T> {
    pub fn new_with_indexes(slice: &'a [T], idxs: Vec<usize>) -> Self {
        Self { slice, idxs }
    }

    #[inline]
    pub fn get_index(&self, idx: usize) -> usize {
        self.idxs[idx]
    }

    #[inline]
    pub fn indexes(&self) -> &[usize] {
        &self.idxs
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a T> + '_ {
        let slice = self.slice;
        self.idxs.iter().map(move |&i| &slice[i])
    }
}

/// Result of associating one frame of detections with the known objects.
/// Nothing is mutated until it is passed to [`Scene::update`].
pub struct DetectionsMapping<'a> {
    detections: &'a [Detection],
    /// (object id, detection index)
    matched: Vec<(u32, usize)>,
    missed: IndexedSlice<'a, Detection>,
}

impl<'a> DetectionsMapping<'a> {
    #[inline]
    pub fn matched(&self) -> &[(u32, usize)] {
        &self.matched
    }

    #[inline]
    pub fn missed(&self) -> &IndexedSlice<'a, Detection> {
        &self.missed
    }
}

/// Identities touched by one [`Scene::update`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SceneUpdate {
    pub created: Vec<u32>,
    pub evicted: Vec<u32>,
}

/// Greedy nearest-centroid association over a [`TrackStore`].
pub struct Scene {
    store: TrackStore,
    person_class: i32,
    distance_threshold: f32,
    max_frames_missing: u32,
    visibility_cutoff: u32,
}

impl Scene {
    pub fn new(config: &CounterConfig) -> Self {
        Self {
            store: TrackStore::new(),
            person_class: config.person_class,
            distance_threshold: config.distance_threshold,
            max_frames_missing: config.max_frames_missing,
            visibility_cutoff: config.visibility_cutoff,
        }
    }

    #[inline]
    pub fn store(&self) -> &TrackStore {
        &self.store
    }

    /// Every person detection looks up its nearest object independently. When
    /// two detections pick the same object, the later one keeps it and the
    /// earlier one is treated as missed.
    pub fn map_detections<'a>(&self, detections: &'a [Detection]) -> DetectionsMapping<'a> {
        let persons = IndexedSlice::new_with_indexes(
            detections,
            detections
                .iter()
                .enumerate()
                .filter(|(_, d)| d.class == self.person_class)
                .map(|(i, _)| i)
                .collect(),
        );

        let mut claims: BTreeMap<u32, usize> = BTreeMap::new();
        let mut missed = Vec::new();

        for (i, det) in persons.iter().enumerate() {
            let idx = persons.get_index(i);
            let center = det.center();

            match self.store.nearest(&center, self.distance_threshold) {
                Some((id, dist)) => {
                    trace!(id, detection = idx, dist, "detection matched");

                    if let Some(lost) = claims.insert(id, idx) {
                        trace!(id, detection = lost, "match overridden by a later detection");
                        missed.push(lost);
                    }
                }
                None => missed.push(idx),
            }
        }

        missed.sort_unstable();

        let mut matched: Vec<_> = claims.into_iter().collect();
        matched.sort_unstable_by_key(|&(_, idx)| idx);

        DetectionsMapping {
            detections,
            matched,
            missed: IndexedSlice::new_with_indexes(detections, missed),
        }
    }

    pub fn update(&mut self, mapping: DetectionsMapping<'_>) -> SceneUpdate {
        let dets = mapping.detections;

        self.store.age();

        for &(id, j) in &mapping.matched {
            self.store.update(id, dets[j].bbox());
        }

        let created = mapping
            .missed
            .iter()
            .map(|det| self.store.create(det.bbox()))
            .collect();

        let evicted = self.store.evict(self.max_frames_missing);

        SceneUpdate { created, evicted }
    }

    pub fn tracks(&self) -> Vec<Track> {
        self.store.visible(self.visibility_cutoff)
    }
}

impl crate::Tracking for Scene {
    fn update(&mut self, detections: &[Detection]) -> SceneUpdate {
        let mapping = self.map_detections(detections);
        Scene::update(self, mapping)
    }

    #[inline]
    fn tracks(&self) -> Vec<Track> {
        Scene::tracks(self)
    }
}
