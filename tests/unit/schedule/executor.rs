use super::*;
use std::cell::Cell;

fn counter() -> Rc<Cell<u32>> {
    Rc::new(Cell::new(0))
}

#[test]
fn chained_frame_waits_resume_once_per_frame() {
    const N: u32 = 5;
    let mut sched = Scheduler::new();
    let h = sched.handle();
    let resumes = counter();
    let r = resumes.clone();
    sched.start_root("chain", async move {
        for _ in 0..N {
            r.set(r.get() + 1);
            h.wait_next_frame().await;
        }
        r.set(r.get() + 1);
        Ok(())
    });
    assert_eq!(resumes.get(), 1);

    for frame in 1..=N {
        sched.advance_frame(1.0 / 30.0).unwrap();
        assert_eq!(resumes.get(), frame + 1);
    }
    assert_eq!(sched.root_status(), TaskStatus::Finished);

    sched.advance_frame(1.0 / 30.0).unwrap();
    assert_eq!(resumes.get(), N + 1);
    assert_eq!(sched.pending_waits(), 0);
}

#[test]
fn zero_and_negative_waits_do_not_suspend() {
    let mut sched = Scheduler::new();
    let h = sched.handle();
    sched.start_root("instant", async move {
        h.wait_seconds(0.0).await;
        h.wait_seconds(-1.0).await;
        h.wait_seconds(f64::NAN).await;
        Ok(())
    });
    assert_eq!(sched.root_status(), TaskStatus::Finished);
    assert_eq!(sched.pending_waits(), 0);
}

#[test]
fn time_wait_resumes_on_the_frame_that_reaches_it() {
    let mut sched = Scheduler::new();
    let h = sched.handle();
    let seen = Rc::new(Cell::new(None));
    let s = seen.clone();
    sched.start_root("timed", async move {
        h.wait_seconds(0.5).await;
        s.set(Some((h.now(), h.frame_delta()?)));
        Ok(())
    });

    sched.advance_frame(0.25).unwrap();
    assert_eq!(seen.get(), None);
    sched.advance_frame(0.25).unwrap();
    assert_eq!(seen.get(), Some((0.5, 0.25)));
    assert_eq!(sched.frame(), FrameIndex(2));
}

#[test]
fn spawned_tasks_start_in_the_same_pass() {
    let mut sched = Scheduler::new();
    let h = sched.handle();
    let log = Rc::new(RefCell::new(Vec::new()));
    let l = log.clone();
    sched.start_root("root", async move {
        let child_log = l.clone();
        let child = h.clone();
        h.spawn("child", async move {
            child_log.borrow_mut().push("child start");
            child.wait_next_frame().await;
            child_log.borrow_mut().push("child resumed");
            Ok(())
        });
        l.borrow_mut().push("root");
        h.wait_next_frame().await;
        l.borrow_mut().push("root resumed");
        Ok(())
    });
    assert_eq!(*log.borrow(), vec!["root", "child start"]);
    assert_eq!(sched.live_tasks(), 2);

    sched.advance_frame(0.1).unwrap();
    assert_eq!(
        *log.borrow(),
        vec!["root", "child start", "root resumed", "child resumed"]
    );
    assert_eq!(sched.live_tasks(), 0);
}

#[test]
fn error_result_becomes_a_fault() {
    let mut sched = Scheduler::new();
    let h = sched.handle();
    sched.start_root("failing", async move {
        h.wait_next_frame().await;
        Err(anyhow::anyhow!("boom"))
    });
    assert!(sched.fault().is_none());

    sched.advance_frame(0.5).unwrap();
    assert_eq!(sched.root_status(), TaskStatus::Faulted);
    let fault = sched.take_fault().unwrap();
    assert_eq!(fault.message, "boom");
    assert_eq!(fault.task, "failing");
    assert_eq!(fault.frame, FrameIndex(1));
    assert_eq!(fault.time, 0.5);
}

#[test]
fn panic_is_caught_and_reported() {
    let mut sched = Scheduler::new();
    let explode = true;
    sched.start_root("panicky", async move {
        if explode {
            panic!("kaboom");
        }
        Ok(())
    });
    assert_eq!(sched.root_status(), TaskStatus::Faulted);
    let fault = sched.fault().unwrap();
    assert!(fault.message.contains("kaboom"), "{}", fault.message);
}

#[test]
fn first_fault_stops_the_pass() {
    let mut sched = Scheduler::new();
    let h = sched.handle();
    let child_resumed = counter();
    let c = child_resumed.clone();
    sched.start_root("root", async move {
        let child = h.clone();
        h.spawn("child", async move {
            child.wait_next_frame().await;
            c.set(1);
            Ok(())
        });
        h.wait_next_frame().await;
        Err(anyhow::anyhow!("root failed"))
    });

    sched.advance_frame(0.1).unwrap();
    assert_eq!(sched.fault().unwrap().task, "root");
    assert_eq!(child_resumed.get(), 0);
}

#[test]
fn advance_rejects_bad_steps() {
    let mut sched = Scheduler::new();
    assert!(sched.advance_frame(0.0).is_err());
    assert!(sched.advance_frame(-0.1).is_err());
    assert!(sched.advance_frame(f64::INFINITY).is_err());
    assert_eq!(sched.now(), 0.0);
}

#[test]
fn reset_drops_tasks_and_rewinds() {
    let mut sched = Scheduler::new();
    let h = sched.handle();
    sched.start_root("pending", async move {
        h.wait_seconds(10.0).await;
        Ok(())
    });
    sched.advance_frame(1.0).unwrap();
    sched.reset();
    assert_eq!(sched.now(), 0.0);
    assert_eq!(sched.frame(), FrameIndex(0));
    assert_eq!(sched.live_tasks(), 0);
    assert_eq!(sched.pending_waits(), 0);
    assert_eq!(sched.root_status(), TaskStatus::Pending);
}
