use super::*;

#[test]
fn fps_rejects_zero_parts() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
    assert!(Fps::new(30000, 1001).is_ok());
}

#[test]
fn fps_frame_budget_rounds_to_nearest() {
    let fps = Fps::new(60, 1).unwrap();
    assert_eq!(fps.frames_for_secs_round(2.0), 120);
    assert_eq!(fps.frames_for_secs_round(0.0), 0);
    assert_eq!(fps.frames_for_secs_round(-1.0), 0);
    assert_eq!(fps.frames_for_secs_round(f64::NAN), 0);

    let ntsc = Fps::new(30000, 1001).unwrap();
    assert_eq!(ntsc.frames_for_secs_round(1.0), 30);
    assert!((ntsc.frame_duration_secs() - 1001.0 / 30000.0).abs() < 1e-12);
}

#[test]
fn time_window_is_half_open() {
    let w = TimeWindow {
        start: 0.5,
        end: 1.5,
    };
    assert!(!w.contains(0.49));
    assert!(w.contains(0.5));
    assert!(w.contains(1.49));
    assert!(!w.contains(1.5));
    assert!((w.duration() - 1.0).abs() < 1e-12);
}

#[test]
fn entity_id_displays_with_hash() {
    assert_eq!(EntityId(7).to_string(), "#7");
}
