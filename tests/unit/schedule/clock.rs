use super::*;

fn advance(clock: &mut VirtualClock, dt: f64) -> Woken {
    clock.begin_frame(dt);
    let woken = clock.resolve_due();
    clock.end_frame();
    woken
}

#[test]
fn frame_delta_is_only_readable_inside_an_advance() {
    let mut clock = VirtualClock::new();
    assert!(matches!(
        clock.frame_delta(),
        Err(WavyteError::InvalidTimeAccess(_))
    ));

    clock.begin_frame(0.25);
    assert_eq!(clock.frame_delta().unwrap(), 0.25);
    clock.end_frame();
    assert!(clock.frame_delta().is_err());
}

#[test]
fn frame_wait_resolves_on_next_advance_only() {
    let mut clock = VirtualClock::new();
    let signal = clock.register_frame_wait();
    signal.attach(TaskId(4));
    assert!(!signal.is_resolved());

    let woken = advance(&mut clock, 0.1);
    assert_eq!(woken.as_slice(), &[TaskId(4)]);
    assert!(signal.is_resolved());
    assert_eq!(clock.pending_waits(), 0);

    // Resolved waits never wake anyone twice.
    assert!(advance(&mut clock, 0.1).is_empty());
}

#[test]
fn frame_wait_registered_mid_frame_waits_for_the_next_boundary() {
    let mut clock = VirtualClock::new();
    clock.begin_frame(0.1);
    let signal = clock.register_frame_wait();
    signal.attach(TaskId(1));
    assert!(clock.resolve_due().is_empty());
    clock.end_frame();

    assert_eq!(advance(&mut clock, 0.1).as_slice(), &[TaskId(1)]);
}

#[test]
fn time_wait_resolves_once_due() {
    let mut clock = VirtualClock::new();
    let signal = clock.register_time_wait(0.25);
    signal.attach(TaskId(2));

    assert!(advance(&mut clock, 0.1).is_empty());
    assert!(advance(&mut clock, 0.1).is_empty());
    assert_eq!(advance(&mut clock, 0.1).as_slice(), &[TaskId(2)]);
    assert!((clock.now() - 0.3).abs() < 1e-12);
}

#[test]
fn non_positive_time_wait_is_already_resolved() {
    let mut clock = VirtualClock::new();
    assert!(clock.register_time_wait(0.0).is_resolved());
    assert!(clock.register_time_wait(-3.0).is_resolved());
    assert!(clock.register_time_wait(f64::NAN).is_resolved());
    assert_eq!(clock.pending_waits(), 0);
}

#[test]
fn frame_class_resolves_before_time_class() {
    let mut clock = VirtualClock::new();
    let t = clock.register_time_wait(0.05);
    t.attach(TaskId(10));
    let f = clock.register_frame_wait();
    f.attach(TaskId(20));

    assert_eq!(advance(&mut clock, 0.1).as_slice(), &[TaskId(20), TaskId(10)]);
}

#[test]
fn reset_drops_pending_waits_and_time() {
    let mut clock = VirtualClock::new();
    let _ = clock.register_frame_wait();
    let _ = clock.register_time_wait(1.0);
    advance(&mut clock, 0.5);
    clock.reset();

    assert_eq!(clock.now(), 0.0);
    assert_eq!(clock.frame(), FrameIndex(0));
    assert_eq!(clock.pending_waits(), 0);
    assert!(!clock.is_advancing());
}
