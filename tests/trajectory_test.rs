use std::io::Cursor;

use handgesture_rs::integration::HandPose;
use handgesture_rs::output::{ClearReason, LineSink};
use handgesture_rs::{
    GestureConfig, GestureKind, GestureManager, GesturePipeline, HandId, JsonLinesSource, LandmarkFrame,
    LandmarkSetBuilder, LineEncoder, OutputFormat, PipelineEvent,
};

/// Open hand, a fist dragged to the right, then an open hand again.
fn drag_frames() -> Vec<LandmarkFrame> {
    let mut frames = Vec::new();
    let mut push = |pose: HandPose, x: f32| {
        let t = frames.len() as f64 / 30.0;
        let hand = LandmarkSetBuilder::new("0").pose(pose).wrist(x, 0.7).build();
        frames.push(LandmarkFrame::new(t, vec![hand]));
    };
    for _ in 0..3 {
        push(HandPose::Open, 0.3);
    }
    for i in 0..15 {
        push(HandPose::Fist, 0.3 + 0.02 * i as f32);
    }
    for _ in 0..10 {
        push(HandPose::Open, 0.58);
    }
    frames
}

fn config() -> GestureConfig {
    let mut config = GestureConfig::default();
    config.trajectory.max_trail_points = 5;
    config
}

fn run_manager(config: GestureConfig) -> (GestureManager, Vec<PipelineEvent>) {
    let mut manager = GestureManager::new(config).unwrap();
    let mut events = Vec::new();
    for frame in drag_frames() {
        events.extend(manager.process_frame(frame.timestamp, &frame.hands));
    }
    (manager, events)
}

#[test]
fn test_drag_produces_rightward_updates() {
    let (_, events) = run_manager(config());
    let updates: Vec<_> = events.iter().filter_map(PipelineEvent::as_trajectory).collect();

    assert!(updates.len() >= 8);
    for update in &updates {
        assert_eq!(update.hand_id, HandId::from("0"));
        assert!(update.movement.dx > 0);
        assert_eq!(update.movement.dy, 0);
        assert!(update.movement.distance > 5.0);
        assert_eq!(update.position.x - update.previous_position.x, update.movement.dx);
    }
    for pair in updates.windows(2) {
        assert_eq!(pair[1].previous_position, pair[0].position);
    }
}

#[test]
fn test_trail_never_exceeds_capacity() {
    let mut manager = GestureManager::new(config()).unwrap();
    let id = HandId::from("0");
    for frame in drag_frames() {
        manager.process_frame(frame.timestamp, &frame.hands);
        assert!(manager.trail(&id).map_or(0, |t| t.len()) <= 5);
    }
}

#[test]
fn test_release_clears_trail() {
    let (manager, events) = run_manager(config());
    let cleared: Vec<_> = events.iter().filter_map(PipelineEvent::as_trail_cleared).collect();
    assert_eq!(cleared.len(), 1);
    assert_eq!(cleared[0].reason, ClearReason::Released);
    assert_eq!(cleared[0].points, 5);
    assert!(manager.trail(&HandId::from("0")).is_none());

    let gestures: Vec<GestureKind> = events
        .iter()
        .filter_map(PipelineEvent::as_gesture)
        .map(|g| g.gesture)
        .collect();
    assert_eq!(gestures, vec![GestureKind::HandClose, GestureKind::HandOpen]);
}

#[test]
fn test_disabled_tracking_still_reports_fist() {
    let mut config = config();
    config.trajectory.enabled = false;
    let (_, events) = run_manager(config);
    assert!(events.iter().all(|e| matches!(e, PipelineEvent::Gesture(_))));
    assert_eq!(events.len(), 2);
}

#[test]
fn test_large_movement_threshold_suppresses_updates() {
    let mut config = config();
    config.trajectory.movement_threshold = 500.0;
    let (_, events) = run_manager(config);
    assert!(events.iter().all(|e| e.as_trajectory().is_none()));
}

fn replay(format: OutputFormat) -> String {
    let text: String = drag_frames()
        .iter()
        .map(|f| f.to_json_line().unwrap() + "\n")
        .collect();
    let source = JsonLinesSource::new(Cursor::new(text));
    let mut pipeline = GesturePipeline::new(source, config()).unwrap();
    let mut sink = LineSink::new(Vec::new(), LineEncoder::new(format));
    assert_eq!(pipeline.run(&mut sink).unwrap(), 28);
    String::from_utf8(sink.into_inner()).unwrap()
}

#[test]
fn test_simple_replay_lines() {
    let output = replay(OutputFormat::Simple);
    let lines: Vec<&str> = output.lines().collect();

    assert!(lines[0].starts_with("[GESTURE_DETECTED] Right_0: hand_close openness="));
    assert!(
        lines
            .iter()
            .filter(|l| l.starts_with("[TRAIL_UPDATE]"))
            .all(|l| l.starts_with("[TRAIL_UPDATE] Right_0: pos=(") && l.contains(" dist="))
    );
    assert!(lines.contains(&"[TRAIL_CLEARED] Right_0: reason=released points=5"));
}

#[test]
fn test_json_replay_lines() {
    let output = replay(OutputFormat::Json);
    let update = output
        .lines()
        .find(|l| l.starts_with("[TRAIL_UPDATE]"))
        .unwrap();
    assert!(update.starts_with("[TRAIL_UPDATE] {\"timestamp\":"));
    assert!(update.contains("\"hand_id\":\"0\",\"hand_type\":\"Right\",\"position\":{\"x\":"));

    let body: serde_json::Value = serde_json::from_str(update.trim_start_matches("[TRAIL_UPDATE] ")).unwrap();
    let dx = body["movement"]["dx"].as_i64().unwrap();
    let x = body["position"]["x"].as_i64().unwrap();
    let previous = body["previous_position"]["x"].as_i64().unwrap();
    assert_eq!(x - previous, dx);
}
