use std::cell::Cell;
use std::rc::Rc;

use smallvec::SmallVec;

use crate::foundation::core::FrameIndex;
use crate::foundation::error::{WavyteError, WavyteResult};
use crate::schedule::executor::TaskId;

/// Task ids woken by one resolution pass. Most frames wake a handful of tasks.
pub(crate) type Woken = SmallVec<[TaskId; 8]>;

/// Completion signal shared between a pending wait and the future suspended on it.
#[derive(Debug, Default)]
pub(crate) struct WaitSignal {
    resolved: Cell<bool>,
    waiter: Cell<Option<TaskId>>,
}

impl WaitSignal {
    pub(crate) fn resolved() -> Rc<Self> {
        let signal = Self::default();
        signal.resolved.set(true);
        Rc::new(signal)
    }

    pub(crate) fn is_resolved(&self) -> bool {
        self.resolved.get()
    }

    /// Remember which task must be resumed once this signal resolves.
    pub(crate) fn attach(&self, task: TaskId) {
        self.waiter.set(Some(task));
    }

    fn resolve(&self) -> Option<TaskId> {
        self.resolved.set(true);
        self.waiter.take()
    }
}

/// Which resolution class a pending wait belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum WaitClass {
    Frame,
    Time,
}

/// A registered, not yet resolved wait.
#[derive(Debug)]
pub(crate) enum PendingWait {
    /// Ready once at least one frame boundary has passed since `start_frame`.
    Frame {
        start_frame: FrameIndex,
        signal: Rc<WaitSignal>,
    },
    /// Ready once virtual time reaches `due_time`.
    Time { due_time: f64, signal: Rc<WaitSignal> },
}

impl PendingWait {
    fn class(&self) -> WaitClass {
        match self {
            Self::Frame { .. } => WaitClass::Frame,
            Self::Time { .. } => WaitClass::Time,
        }
    }

    fn is_ready(&self, frame: FrameIndex, time: f64) -> bool {
        match self {
            Self::Frame { start_frame, .. } => *start_frame < frame,
            Self::Time { due_time, .. } => *due_time <= time,
        }
    }

    fn signal(&self) -> &Rc<WaitSignal> {
        match self {
            Self::Frame { signal, .. } | Self::Time { signal, .. } => signal,
        }
    }
}

/// Virtual time owned by exactly one bake.
///
/// Time only moves when the scheduler advances a frame; nothing here reads a
/// system timer.
#[derive(Debug, Default)]
pub struct VirtualClock {
    time: f64,
    frame: FrameIndex,
    delta: Option<f64>,
    pending: Vec<PendingWait>,
}

impl VirtualClock {
    /// Create a clock at time zero with no pending waits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero time, frame counter and delta, and drop every pending wait.
    pub fn reset(&mut self) {
        self.time = 0.0;
        self.frame = FrameIndex(0);
        self.delta = None;
        self.pending.clear();
    }

    /// Current virtual time in seconds.
    pub fn now(&self) -> f64 {
        self.time
    }

    /// Number of frame advances performed since the last reset.
    pub fn frame(&self) -> FrameIndex {
        self.frame
    }

    /// Step of the frame currently being advanced.
    ///
    /// Only valid while a frame advance is in progress.
    pub fn frame_delta(&self) -> WavyteResult<f64> {
        self.delta.ok_or_else(|| {
            WavyteError::invalid_time_access(format!(
                "frame delta read outside of a frame advance (frame {}, t={:.6}s)",
                self.frame.0, self.time
            ))
        })
    }

    /// Number of registered waits that have not resolved yet.
    pub fn pending_waits(&self) -> usize {
        self.pending.len()
    }

    pub(crate) fn is_advancing(&self) -> bool {
        self.delta.is_some()
    }

    /// Register a wait that resolves on the next frame advance.
    pub(crate) fn register_frame_wait(&mut self) -> Rc<WaitSignal> {
        let signal = Rc::new(WaitSignal::default());
        self.pending.push(PendingWait::Frame {
            start_frame: self.frame,
            signal: signal.clone(),
        });
        signal
    }

    /// Register a wait due `seconds` from now. Waits that are already due resolve immediately
    /// and are never queued.
    pub(crate) fn register_time_wait(&mut self, seconds: f64) -> Rc<WaitSignal> {
        if seconds.is_nan() || seconds <= 0.0 {
            return WaitSignal::resolved();
        }
        let due_time = self.time + seconds;
        let signal = Rc::new(WaitSignal::default());
        self.pending.push(PendingWait::Time {
            due_time,
            signal: signal.clone(),
        });
        signal
    }

    /// Open a frame: publish `dt`, move time forward and cross one frame boundary.
    pub(crate) fn begin_frame(&mut self, dt: f64) {
        self.delta = Some(dt);
        self.time += dt;
        self.frame = FrameIndex(self.frame.0 + 1);
    }

    /// Close the frame opened by [`VirtualClock::begin_frame`].
    pub(crate) fn end_frame(&mut self) {
        self.delta = None;
    }

    /// Remove and resolve every wait that is due now: frame waits first, then time waits.
    ///
    /// Returns the tasks that were suspended on them. Each wait leaves the pending set exactly
    /// once; waits registered later are picked up by a subsequent call.
    pub(crate) fn resolve_due(&mut self) -> Woken {
        let mut woken = Woken::new();
        for class in [WaitClass::Frame, WaitClass::Time] {
            let (frame, time) = (self.frame, self.time);
            for wait in self
                .pending
                .extract_if(.., |w| w.class() == class && w.is_ready(frame, time))
            {
                if let Some(task) = wait.signal().resolve() {
                    woken.push(task);
                }
            }
        }
        woken
    }
}

#[cfg(test)]
#[path = "../../tests/unit/schedule/clock.rs"]
mod tests;
