use std::any::Any;

use crate::foundation::core::FrameIndex;

/// A script-authoring fault captured while baking.
///
/// Faults never escape a bake: the orchestrator records them on the artifact and substitutes
/// the builtin error behavior.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ScriptFault {
    /// Human-readable message, including the error's context chain.
    pub message: String,
    /// Diagnostic trace: the error's cause chain and, when captured, its backtrace.
    pub stack_trace: Option<String>,
    /// Name of the task that faulted.
    pub task: String,
    /// Frame counter at the moment of the fault.
    pub frame: FrameIndex,
    /// Virtual time at the moment of the fault.
    pub time: f64,
}

impl ScriptFault {
    pub(crate) fn from_error(err: &anyhow::Error, task: &str, frame: FrameIndex, time: f64) -> Self {
        Self {
            message: format!("{err:#}"),
            stack_trace: Some(format!("{err:?}")),
            task: task.to_owned(),
            frame,
            time,
        }
    }

    pub(crate) fn from_panic(
        payload: Box<dyn Any + Send>,
        task: &str,
        frame: FrameIndex,
        time: f64,
    ) -> Self {
        let detail = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_owned()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_owned()
        };
        Self {
            message: format!("script panicked: {detail}"),
            stack_trace: Some(format!(
                "panic in task '{task}' at frame {} (t={time:.6}s)",
                frame.0
            )),
            task: task.to_owned(),
            frame,
            time,
        }
    }
}
