//! End-to-end counting scenarios driven through `PeopleCounter`.

use smart_counter::{
    CounterConfig, Counts, CrossingDirection, Detection, Frame, MemorySink, PeopleCounter,
    SqliteSink, Tracking,
};

const DIMS: (u32, u32) = (640, 400);

fn person(cx: f32, cy: f32) -> Detection {
    Detection::person(cx - 15.0, cy - 40.0, 30.0, 80.0, 0.85)
}

fn frame(index: u64, centers: &[(f32, f32)]) -> Frame {
    Frame::new(index, DIMS, centers.iter().map(|&(x, y)| person(x, y)).collect())
}

fn counter() -> PeopleCounter<MemorySink> {
    PeopleCounter::new(CounterConfig::default().with_line_y(200.0), MemorySink::new())
        .expect("default config is valid")
}

// =============================================================================
// Scenario A: a single person walks down across the line
// =============================================================================

#[test]
fn test_single_person_entering_counts_once() {
    let mut counter = counter();
    let mut entered_at = Vec::new();

    for (i, y) in [100.0, 140.0, 180.0, 220.0, 260.0, 300.0].iter().enumerate() {
        let report = counter.process_frame(&frame(i as u64, &[(320.0, *y)]));
        assert_eq!(report.tracks.len(), 1);
        assert_eq!(report.tracks[0].track_id, 0);

        if report.line_signal() == Some(CrossingDirection::Entered) {
            entered_at.push(i);
        }
    }

    assert_eq!(entered_at, vec![3]);
    assert_eq!(counter.counts(), Counts::new(1, 0));
    assert_eq!(counter.occupancy().raw, 1);
    assert_eq!(counter.occupancy().display, 1);
    assert_eq!(counter.sink().snapshots, vec![Counts::new(1, 0)]);
}

// =============================================================================
// Scenario B: an already counted person keeps moving or turns back
// =============================================================================

#[test]
fn test_counted_person_never_counts_again() {
    let mut counter = counter();
    let path = [100.0, 140.0, 180.0, 220.0, 260.0, 300.0, 340.0, 380.0];

    for (i, y) in path.iter().enumerate() {
        counter.process_frame(&frame(i as u64, &[(320.0, *y)]));
    }
    assert_eq!(counter.counts(), Counts::new(1, 0));

    // walking back up across the line is the same identity
    for (i, y) in [340.0, 300.0, 260.0, 220.0, 180.0, 140.0].iter().enumerate() {
        let report = counter.process_frame(&frame(100 + i as u64, &[(320.0, *y)]));
        assert!(report.events.is_empty());
        assert!(!report.persisted);
    }

    assert_eq!(counter.counts(), Counts::new(1, 0));
    assert_eq!(counter.sink().snapshots.len(), 1);
}

// =============================================================================
// Scenario C: a short gap keeps the identity
// =============================================================================

#[test]
fn test_reappearing_person_is_rematched() {
    let mut counter = counter();
    counter.process_frame(&frame(0, &[(320.0, 100.0)]));

    for i in 1..=5 {
        let report = counter.process_frame(&frame(i, &[]));
        if i >= 2 {
            assert!(report.tracks.is_empty(), "frame {}: ghost track exposed", i);
        }
    }
    assert_eq!(counter.tracker().store().len(), 1);

    let report = counter.process_frame(&frame(6, &[(330.0, 110.0)]));
    assert_eq!(report.tracks.len(), 1);
    assert_eq!(report.tracks[0].track_id, 0);
    assert_eq!(report.tracks[0].frames_since_seen, 0);
    assert_eq!(counter.tracker().store().next_id(), 1);
}

#[test]
fn test_long_gap_evicts_and_assigns_new_identity() {
    let mut counter = counter();
    counter.process_frame(&frame(0, &[(320.0, 100.0)]));

    for i in 1..=6 {
        counter.process_frame(&frame(i, &[]));
    }
    assert!(counter.tracker().store().is_empty());

    let report = counter.process_frame(&frame(7, &[(320.0, 100.0)]));
    assert_eq!(report.tracks[0].track_id, 1);
}

// =============================================================================
// Scenario D: two detections compete for one object
// =============================================================================

#[test]
fn test_two_detections_near_one_object_spawn_one_track() {
    let mut counter = counter();
    counter.process_frame(&frame(0, &[(320.0, 100.0)]));
    let before = counter.tracker().store().len();

    let report = counter.process_frame(&frame(1, &[(310.0, 105.0), (330.0, 105.0)]));

    assert_eq!(counter.tracker().store().len(), before + 1);
    let mut ids: Vec<_> = report.tracks.iter().map(|t| t.track_id).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![0, 1]);

    let kept = counter.tracker().store().get(0).unwrap();
    assert_eq!(kept.center.x, 330.0);
}

// =============================================================================
// Scenario E: more exits than entries
// =============================================================================

#[test]
fn test_negative_occupancy_is_reported_as_drift() {
    let mut counter = counter();

    let xs: Vec<f32> = (0..8).map(|i| 40.0 + i as f32 * 80.0).collect();
    let start: Vec<_> = xs
        .iter()
        .enumerate()
        .map(|(i, &x)| (x, if i < 3 { 180.0 } else { 220.0 }))
        .collect();
    let end: Vec<_> = xs
        .iter()
        .enumerate()
        .map(|(i, &x)| (x, if i < 3 { 220.0 } else { 180.0 }))
        .collect();

    counter.process_frame(&frame(0, &start));
    let report = counter.process_frame(&frame(1, &end));

    assert_eq!(report.events.len(), 8);
    assert_eq!(report.counts, Counts::new(3, 5));
    assert_eq!(report.occupancy.raw, -2);
    assert_eq!(report.occupancy.display, 0);
    assert!(report.occupancy.is_drifting());
    assert!(report.persisted);
    assert_eq!(counter.sink().snapshots, vec![Counts::new(3, 5)]);
}

// =============================================================================
// Filtering, line placement and persistence
// =============================================================================

#[test]
fn test_non_person_detections_are_ignored() {
    let mut counter = counter();
    let mut car = person(320.0, 100.0);
    car.class = 2;

    let report = counter.process_frame(&Frame::new(0, DIMS, vec![car]));

    assert!(report.tracks.is_empty());
    assert!(counter.tracker().store().is_empty());
}

#[test]
fn test_new_track_on_the_far_side_does_not_count() {
    let mut counter = counter();

    let report = counter.process_frame(&frame(0, &[(320.0, 300.0)]));
    assert!(report.events.is_empty());

    let report = counter.process_frame(&frame(1, &[(100.0, 100.0)]));
    assert!(report.events.is_empty());
    assert_eq!(counter.counts(), Counts::default());
}

#[test]
fn test_recount_policy_prunes_counted_set_on_eviction() {
    let config = CounterConfig {
        recount_after_eviction: true,
        ..CounterConfig::default().with_line_y(200.0)
    };
    let mut counter = PeopleCounter::new(config, MemorySink::new()).unwrap();

    counter.process_frame(&frame(0, &[(320.0, 180.0)]));
    counter.process_frame(&frame(1, &[(320.0, 220.0)]));
    assert_eq!(counter.crossing().unwrap().counted_len(), 1);

    for i in 2..8 {
        counter.process_frame(&frame(i, &[]));
    }

    assert_eq!(counter.crossing().unwrap().counted_len(), 0);
    assert_eq!(counter.counts(), Counts::new(1, 0));
}

#[test]
fn test_counts_reach_sqlite() {
    let mut counter =
        PeopleCounter::new(CounterConfig::default(), SqliteSink::in_memory().unwrap()).unwrap();

    // line falls back to the frame midpoint, y = 200
    counter.process_frame(&frame(0, &[(100.0, 180.0), (500.0, 230.0)]));
    counter.process_frame(&frame(1, &[(100.0, 215.0), (500.0, 190.0)]));
    counter.process_frame(&frame(2, &[(100.0, 250.0), (500.0, 150.0)]));

    let rows = counter.sink().recent(10).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!((rows[0].in_count, rows[0].out_count), (1, 1));
}

#[test]
fn test_scene_is_usable_through_the_tracking_trait() {
    fn drive<T: Tracking>(tracker: &mut T) -> usize {
        tracker.update(&[person(10.0, 10.0), person(200.0, 10.0)]);
        tracker.tracks().len()
    }

    let mut scene = smart_counter::Scene::new(&CounterConfig::default());
    assert_eq!(drive(&mut scene), 2);
}

// =============================================================================
// Scenario: config file and frame dims supplied from outside, as the replay does
// =============================================================================

#[test]
fn test_config_file_and_custom_dims_drive_the_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("counter.json");
    std::fs::write(&path, r#"{"distance_threshold": 80, "max_frames_missing": 3}"#).unwrap();

    let config = CounterConfig::from_json(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(config.line_y, None);

    let mut counter = PeopleCounter::new(config, MemorySink::new()).unwrap();
    let dims = (1280, 720);

    for (i, y) in [260.0, 320.0, 380.0, 440.0].iter().enumerate() {
        let f = Frame::new(i as u64, dims, vec![person(640.0, *y)]);
        counter.process_frame(&f);
    }

    // line sits at the 720px frame's midpoint, not the 400px default used above
    assert_eq!(counter.line().map(|l| l.y), Some(360.0));
    assert_eq!(counter.counts(), Counts::new(1, 0));
}

#[test]
fn test_unreadable_config_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("counter.json");
    std::fs::write(&path, r#"{"line_y": "middle"}"#).unwrap();

    let res = CounterConfig::from_json(&std::fs::read_to_string(&path).unwrap());
    assert!(matches!(res, Err(smart_counter::error::Error::Json(_))));
}
