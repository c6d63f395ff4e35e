use crate::foundation::core::{Point, Vec3};
use crate::foundation::error::{WavyteError, WavyteResult};
use crate::record::command::{Command, CommandKind};
use crate::record::handle::{Handle2D, Handle3D, HandleBook, HandleKey};

/// Append-only command log for one bake.
///
/// Mutations are only accepted inside a recording boundary
/// (`begin_recording` .. `end_recording`), which the orchestrator opens around every scheduler
/// pump step.
#[derive(Debug, Default)]
pub struct MutationRecorder {
    commands: Vec<Command>,
    boundary: Option<String>,
    handles: HandleBook,
    finished: bool,
}

/// Finished output of a [`MutationRecorder`].
#[derive(Clone, Debug, Default)]
pub struct RecordedLog {
    /// Commands in recording order, terminated by [`CommandKind::End`].
    pub commands: Vec<Command>,
    /// 2D editor handles in creation order.
    pub handles_2d: Vec<Handle2D>,
    /// 3D editor handles in creation order.
    pub handles_3d: Vec<Handle3D>,
}

impl RecordedLog {
    /// Every `PlaySound` command, in log order.
    pub fn sound_commands(&self) -> impl Iterator<Item = &Command> {
        self.commands
            .iter()
            .filter(|c| matches!(c.kind, CommandKind::PlaySound { .. }))
    }

    /// Time carried by the terminal `End` command.
    pub fn end_time(&self) -> f64 {
        self.commands.last().map_or(0.0, |c| c.time)
    }
}

impl MutationRecorder {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop everything recorded so far and accept new mutations again.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Open a recording boundary labelled `context`.
    pub fn begin_recording(&mut self, context: &str) -> WavyteResult<()> {
        if self.finished {
            return Err(WavyteError::recording("recorder already finished"));
        }
        if let Some(open) = &self.boundary {
            return Err(WavyteError::recording(format!(
                "boundary '{context}' opened while '{open}' is still open"
            )));
        }
        self.boundary = Some(context.to_owned());
        Ok(())
    }

    /// Close the current recording boundary.
    pub fn end_recording(&mut self) -> WavyteResult<()> {
        match self.boundary.take() {
            Some(_) => Ok(()),
            None => Err(WavyteError::recording("no recording boundary is open")),
        }
    }

    /// Return `true` while a boundary is open.
    pub fn is_recording(&self) -> bool {
        self.boundary.is_some()
    }

    /// Fail unless a boundary is open. Callers check this before touching the scene so a
    /// rejected mutation never leaves the scene ahead of the log.
    pub fn ensure_recording(&self) -> WavyteResult<()> {
        if self.finished {
            return Err(WavyteError::recording("recorder already finished"));
        }
        if self.boundary.is_none() {
            return Err(WavyteError::recording(
                "scene mutation outside of a recording boundary",
            ));
        }
        Ok(())
    }

    /// Append a command stamped with `time`.
    pub fn record(&mut self, time: f64, kind: CommandKind) -> WavyteResult<()> {
        self.ensure_recording()?;
        if matches!(kind, CommandKind::End) {
            return Err(WavyteError::recording(
                "the end sentinel is appended by finish()",
            ));
        }
        if let Some(last) = self.commands.last()
            && time < last.time
        {
            return Err(WavyteError::recording(format!(
                "command time {time} precedes previous command time {}",
                last.time
            )));
        }
        self.commands.push(Command { time, kind });
        Ok(())
    }

    /// Number of commands recorded so far.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Return `true` if nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub(crate) fn open_handle_2d(
        &mut self,
        id: String,
        position: Point,
        now: f64,
    ) -> WavyteResult<HandleKey> {
        self.ensure_recording()?;
        Ok(self.handles.open_2d(id, position, now))
    }

    pub(crate) fn open_handle_3d(
        &mut self,
        id: String,
        position: Vec3,
        now: f64,
    ) -> WavyteResult<HandleKey> {
        self.ensure_recording()?;
        Ok(self.handles.open_3d(id, position, now))
    }

    pub(crate) fn close_handle(&mut self, key: HandleKey, now: f64) -> WavyteResult<()> {
        self.ensure_recording()?;
        if self.handles.close(key, now) {
            Ok(())
        } else {
            Err(WavyteError::scene(format!(
                "handle {key:?} is unknown or already closed"
            )))
        }
    }

    /// Terminate the log with an `End` command at `end_time` and hand it out.
    ///
    /// The log is emitted even when nothing was recorded so consumers always get a defined
    /// track length. Afterwards the recorder rejects further mutations until reset.
    pub fn finish(&mut self, end_time: f64) -> WavyteResult<RecordedLog> {
        if self.finished {
            return Err(WavyteError::recording("recorder already finished"));
        }
        if let Some(open) = self.boundary.take() {
            tracing::debug!(boundary = %open, "closing recording boundary left open at finish");
        }
        self.finished = true;

        let last = self.commands.last().map_or(0.0, |c| c.time);
        let end_time = end_time.max(last);
        let mut commands = std::mem::take(&mut self.commands);
        commands.push(Command {
            time: end_time,
            kind: CommandKind::End,
        });
        let (handles_2d, handles_3d) = std::mem::take(&mut self.handles).finish(end_time);
        Ok(RecordedLog {
            commands,
            handles_2d,
            handles_3d,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/record/recorder.rs"]
mod tests;
