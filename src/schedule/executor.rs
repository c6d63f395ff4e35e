use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

use crate::foundation::core::FrameIndex;
use crate::foundation::error::{WavyteError, WavyteResult};
use crate::schedule::clock::VirtualClock;
use crate::schedule::wait::Wait;
use crate::script::behavior::{ScriptFuture, ScriptResult};
use crate::script::fault::ScriptFault;

/// Index of a task inside one [`Scheduler`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct TaskId(pub(crate) u32);

/// Observable state of a script continuation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskStatus {
    /// Suspended on a wait (or not started yet).
    Pending,
    /// Ran to completion without error.
    Finished,
    /// Returned an error or panicked.
    Faulted,
}

/// State reachable from scripts: the clock, the task being polled and newly spawned tasks.
pub(crate) struct SchedulerShared {
    clock: RefCell<VirtualClock>,
    current: Cell<Option<TaskId>>,
    inbox: RefCell<Vec<(String, ScriptFuture)>>,
}

impl SchedulerShared {
    pub(crate) fn current_task(&self) -> Option<TaskId> {
        self.current.get()
    }
}

/// Cloneable, script-facing view of a [`Scheduler`].
#[derive(Clone)]
pub struct SchedulerHandle {
    shared: Rc<SchedulerShared>,
}

impl SchedulerHandle {
    /// Current virtual time in seconds.
    pub fn now(&self) -> f64 {
        self.shared.clock.borrow().now()
    }

    /// Current frame counter.
    pub fn frame(&self) -> FrameIndex {
        self.shared.clock.borrow().frame()
    }

    /// Step of the frame being advanced. Fails outside of a frame advance.
    pub fn frame_delta(&self) -> WavyteResult<f64> {
        self.shared.clock.borrow().frame_delta()
    }

    /// Suspend until the next frame advance.
    pub fn wait_next_frame(&self) -> Wait {
        let signal = self.shared.clock.borrow_mut().register_frame_wait();
        Wait::new(signal, self.shared.clone())
    }

    /// Suspend for `seconds` of virtual time. Non-positive durations do not suspend.
    pub fn wait_seconds(&self, seconds: f64) -> Wait {
        let signal = self.shared.clock.borrow_mut().register_time_wait(seconds);
        Wait::new(signal, self.shared.clone())
    }

    /// Register an additional continuation. It starts running before the current poll pass ends.
    pub fn spawn<F>(&self, name: impl Into<String>, fut: F)
    where
        F: Future<Output = ScriptResult> + 'static,
    {
        self.shared
            .inbox
            .borrow_mut()
            .push((name.into(), Box::pin(fut)));
    }
}

enum TaskState {
    Pending(ScriptFuture),
    Finished,
    Faulted,
}

struct TaskSlot {
    name: String,
    state: TaskState,
}

/// Single-threaded cooperative scheduler driving script continuations against a virtual clock.
///
/// Tasks only run inside [`Scheduler::start_root`] and [`Scheduler::advance_frame`]. Polling
/// uses a no-op waker: resumption is driven by the clock's wait signals, which record the task
/// suspended on them.
pub struct Scheduler {
    shared: Rc<SchedulerShared>,
    tasks: Vec<TaskSlot>,
    ready: VecDeque<TaskId>,
    root: Option<TaskId>,
    fault: Option<ScriptFault>,
}

impl Scheduler {
    /// Create an empty scheduler with a fresh clock.
    pub fn new() -> Self {
        Self {
            shared: Rc::new(SchedulerShared {
                clock: RefCell::new(VirtualClock::new()),
                current: Cell::new(None),
                inbox: RefCell::new(Vec::new()),
            }),
            tasks: Vec::new(),
            ready: VecDeque::new(),
            root: None,
            fault: None,
        }
    }

    /// Script-facing handle sharing this scheduler's clock.
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            shared: self.shared.clone(),
        }
    }

    /// Drop every task and pending wait and rewind the clock to zero.
    pub fn reset(&mut self) {
        self.shared.clock.borrow_mut().reset();
        self.shared.current.set(None);
        self.shared.inbox.borrow_mut().clear();
        self.tasks.clear();
        self.ready.clear();
        self.root = None;
        self.fault = None;
    }

    /// Current virtual time in seconds.
    pub fn now(&self) -> f64 {
        self.shared.clock.borrow().now()
    }

    /// Current frame counter.
    pub fn frame(&self) -> FrameIndex {
        self.shared.clock.borrow().frame()
    }

    /// Number of registered waits that have not resolved yet.
    pub fn pending_waits(&self) -> usize {
        self.shared.clock.borrow().pending_waits()
    }

    /// Number of tasks that are still suspended.
    pub fn live_tasks(&self) -> usize {
        self.tasks
            .iter()
            .filter(|t| matches!(t.state, TaskState::Pending(_)))
            .count()
    }

    /// Install `fut` as the root continuation and run it until its first suspension.
    ///
    /// Returns the number of task polls performed.
    pub fn start_root<F>(&mut self, name: impl Into<String>, fut: F) -> usize
    where
        F: Future<Output = ScriptResult> + 'static,
    {
        let id = self.insert(name.into(), Box::pin(fut));
        self.root = Some(id);
        self.ready.push_back(id);
        self.run_until_stalled()
    }

    /// Advance the clock by one frame of `dt` seconds and resume every continuation that becomes
    /// due, including ones that become due as a side effect of resuming others.
    ///
    /// Returns the number of task polls performed.
    pub fn advance_frame(&mut self, dt: f64) -> WavyteResult<usize> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(WavyteError::validation(format!(
                "frame step must be finite and > 0 (got {dt})"
            )));
        }
        if self.shared.clock.borrow().is_advancing() {
            return Err(WavyteError::invalid_time_access(
                "advance_frame called while a frame is already being advanced",
            ));
        }

        self.shared.clock.borrow_mut().begin_frame(dt);
        let mut polls = 0;
        while self.fault.is_none() {
            let woken = self.shared.clock.borrow_mut().resolve_due();
            if woken.is_empty() {
                break;
            }
            for id in woken {
                self.enqueue(id);
            }
            polls += self.run_until_stalled();
        }
        self.shared.clock.borrow_mut().end_frame();
        Ok(polls)
    }

    /// Status of the root continuation.
    pub fn root_status(&self) -> TaskStatus {
        let Some(root) = self.root else {
            return TaskStatus::Pending;
        };
        match self.tasks.get(root.0 as usize).map(|t| &t.state) {
            Some(TaskState::Finished) => TaskStatus::Finished,
            Some(TaskState::Faulted) => TaskStatus::Faulted,
            Some(TaskState::Pending(_)) | None => TaskStatus::Pending,
        }
    }

    /// First fault raised by any task since the last reset.
    pub fn fault(&self) -> Option<&ScriptFault> {
        self.fault.as_ref()
    }

    /// Take ownership of the recorded fault.
    pub fn take_fault(&mut self) -> Option<ScriptFault> {
        self.fault.take()
    }

    fn insert(&mut self, name: String, fut: ScriptFuture) -> TaskId {
        let id = TaskId(self.tasks.len() as u32);
        self.tasks.push(TaskSlot {
            name,
            state: TaskState::Pending(fut),
        });
        id
    }

    fn enqueue(&mut self, id: TaskId) {
        if !self.ready.contains(&id) {
            self.ready.push_back(id);
        }
    }

    fn adopt_spawned(&mut self) {
        let spawned = std::mem::take(&mut *self.shared.inbox.borrow_mut());
        for (name, fut) in spawned {
            let id = self.insert(name, fut);
            self.ready.push_back(id);
        }
    }

    fn run_until_stalled(&mut self) -> usize {
        let mut polls = 0;
        loop {
            self.adopt_spawned();
            if self.fault.is_some() {
                break;
            }
            let Some(id) = self.ready.pop_front() else {
                break;
            };
            if self.poll_task(id) {
                polls += 1;
            }
        }
        polls
    }

    fn poll_task(&mut self, id: TaskId) -> bool {
        let Some(slot) = self.tasks.get_mut(id.0 as usize) else {
            return false;
        };
        let TaskState::Pending(fut) = &mut slot.state else {
            return false;
        };

        self.shared.current.set(Some(id));
        let mut cx = Context::from_waker(Waker::noop());
        let polled = panic::catch_unwind(AssertUnwindSafe(|| fut.as_mut().poll(&mut cx)));
        self.shared.current.set(None);

        let (frame, time) = {
            let clock = self.shared.clock.borrow();
            (clock.frame(), clock.now())
        };
        let fault = match polled {
            Ok(Poll::Pending) => return true,
            Ok(Poll::Ready(Ok(()))) => {
                tracing::trace!(task = %slot.name, frame = frame.0, "task finished");
                slot.state = TaskState::Finished;
                return true;
            }
            Ok(Poll::Ready(Err(err))) => ScriptFault::from_error(&err, &slot.name, frame, time),
            Err(payload) => ScriptFault::from_panic(payload, &slot.name, frame, time),
        };

        tracing::debug!(task = %slot.name, frame = frame.0, error = %fault.message, "task faulted");
        slot.state = TaskState::Faulted;
        if self.fault.is_none() {
            self.fault = Some(fault);
        }
        true
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        // Spawned-but-unadopted futures hold handles back to `shared`.
        self.shared.inbox.borrow_mut().clear();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/schedule/executor.rs"]
mod tests;
