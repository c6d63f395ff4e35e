use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use crate::schedule::clock::WaitSignal;
use crate::schedule::executor::SchedulerShared;

/// Suspension point returned by `wait_next_frame` / `wait_seconds`.
///
/// The wait is registered with the clock when it is created, not when it is first polled, so
/// its anchor (frame or due time) is the moment the script asked for it.
#[must_use = "a wait does nothing unless it is awaited"]
pub struct Wait {
    signal: Rc<WaitSignal>,
    shared: Rc<SchedulerShared>,
}

impl Wait {
    pub(crate) fn new(signal: Rc<WaitSignal>, shared: Rc<SchedulerShared>) -> Self {
        Self { signal, shared }
    }

    /// Return `true` if awaiting this wait would complete without suspending.
    pub fn is_ready(&self) -> bool {
        self.signal.is_resolved()
    }
}

impl Future for Wait {
    type Output = ();

    fn poll(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<()> {
        if self.signal.is_resolved() {
            return Poll::Ready(());
        }
        if let Some(task) = self.shared.current_task() {
            self.signal.attach(task);
        }
        Poll::Pending
    }
}

impl std::fmt::Debug for Wait {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wait")
            .field("ready", &self.signal.is_resolved())
            .finish()
    }
}
