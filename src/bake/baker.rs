use std::cell::RefCell;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use crate::audio::mix::{create_track, mix_sound_commands};
use crate::bake::artifact::{BakeOutcome, BakedArtifact};
use crate::bake::options::BakeOpts;
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{WavyteError, WavyteResult};
use crate::record::command::CommandKind;
use crate::record::recorder::MutationRecorder;
use crate::scene::model::Scene;
use crate::scene::view::SceneView;
use crate::schedule::executor::{Scheduler, TaskStatus};
use crate::script::api::ScriptApi;
use crate::script::behavior::{Behavior, ScriptResult};
use crate::script::builtin::{EmptyBehavior, ErrorBehavior};
use crate::script::fault::ScriptFault;

/// State of a single bake run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BakePhase {
    /// Nothing has run yet.
    Idle,
    /// The root behavior runs until its first suspension.
    Priming,
    /// Frames are being advanced.
    Stepping,
    /// The root behavior finished.
    Completed,
    /// A script raised an error or panicked.
    Faulted,
    /// The frame budget ran out.
    BudgetExceeded,
}

/// Runs behaviors to completion against a virtual clock and packages the result.
///
/// A fault in the user behavior never escapes: the partial scene is discarded and the builtin
/// [`ErrorBehavior`] is baked instead, with the fault attached to the artifact. Only a fault in
/// that fallback is returned as [`WavyteError::FallbackFault`].
#[derive(Clone, Debug)]
pub struct Baker {
    opts: BakeOpts,
}

impl Baker {
    /// Create a baker after validating `opts`.
    pub fn new(opts: BakeOpts) -> WavyteResult<Self> {
        opts.validate()?;
        Ok(Self { opts })
    }

    /// Options this baker uses.
    pub fn opts(&self) -> &BakeOpts {
        &self.opts
    }

    /// Bake `behavior`.
    #[tracing::instrument(skip_all, fields(behavior = behavior.name()))]
    pub fn bake(&self, behavior: &dyn Behavior) -> WavyteResult<BakedArtifact> {
        let budget = self.opts.frame_budget();
        let mut run = BakeRun::new();
        match run.execute(behavior, &self.opts, budget)? {
            RunEnd::Completed => run.finalize(&self.opts, BakeOutcome::Completed, None),
            RunEnd::BudgetExceeded => {
                tracing::warn!(
                    frames = run.frames,
                    max_length_secs = self.opts.max_length_secs,
                    "behavior still running at the end of the budget; cut off"
                );
                run.finalize(&self.opts, BakeOutcome::BudgetExceeded, None)
            }
            RunEnd::Faulted(fault) => self.recover(fault),
        }
    }

    /// Bake a closure behavior. Convenience over [`Baker::bake`] that lets argument types be
    /// inferred.
    pub fn bake_fn<F, Fut>(&self, f: F) -> WavyteResult<BakedArtifact>
    where
        F: Fn(SceneView, ScriptApi) -> Fut,
        Fut: Future<Output = ScriptResult> + 'static,
    {
        self.bake(&f)
    }

    /// Bake a project's behavior, or the builtin empty behavior when it has none.
    pub fn bake_project(&self, behavior: Option<&dyn Behavior>) -> WavyteResult<BakedArtifact> {
        match behavior {
            Some(b) => self.bake(b),
            None => self.bake(&EmptyBehavior),
        }
    }

    fn recover(&self, fault: ScriptFault) -> WavyteResult<BakedArtifact> {
        tracing::warn!(
            task = %fault.task,
            frame = fault.frame.0,
            time = fault.time,
            error = %fault.message,
            "behavior faulted; baking fallback"
        );
        let fallback = ErrorBehavior::new(fault.message.clone());
        self.recover_with(fault, &fallback)
    }

    fn recover_with(
        &self,
        fault: ScriptFault,
        fallback: &dyn Behavior,
    ) -> WavyteResult<BakedArtifact> {
        let mut run = BakeRun::new();
        match run.execute(fallback, &self.opts, 1)? {
            RunEnd::Faulted(inner) => Err(WavyteError::FallbackFault {
                message: inner.message,
                original: fault.message,
            }),
            RunEnd::Completed | RunEnd::BudgetExceeded => {
                run.finalize(&self.opts, BakeOutcome::Recovered, Some(fault))
            }
        }
    }
}

enum RunEnd {
    Completed,
    BudgetExceeded,
    Faulted(ScriptFault),
}

struct BakeRun {
    scheduler: Scheduler,
    scene: Rc<RefCell<Scene>>,
    recorder: Rc<RefCell<MutationRecorder>>,
    phase: BakePhase,
    frames: u64,
}

impl BakeRun {
    fn new() -> Self {
        Self {
            scheduler: Scheduler::new(),
            scene: Rc::new(RefCell::new(Scene::new())),
            recorder: Rc::new(RefCell::new(MutationRecorder::new())),
            phase: BakePhase::Idle,
            frames: 0,
        }
    }

    fn transition(&mut self, to: BakePhase) {
        tracing::debug!(from = ?self.phase, to = ?to, frame = self.frames, "bake phase");
        self.phase = to;
    }

    fn fault(&mut self) -> Option<ScriptFault> {
        let fault = self.scheduler.take_fault()?;
        self.transition(BakePhase::Faulted);
        Some(fault)
    }

    fn execute(
        &mut self,
        behavior: &dyn Behavior,
        opts: &BakeOpts,
        max_frames: u64,
    ) -> WavyteResult<RunEnd> {
        self.transition(BakePhase::Priming);
        self.scheduler.reset();
        self.scene.borrow_mut().reset();
        self.recorder.borrow_mut().reset();
        self.frames = 0;

        let api = ScriptApi::new(
            self.scheduler.handle(),
            self.scene.clone(),
            self.recorder.clone(),
        );
        let view = SceneView::new(self.scene.clone());

        self.recorder.borrow_mut().begin_recording("prime")?;
        let started = panic::catch_unwind(AssertUnwindSafe(|| behavior.start(view, api)));
        match started {
            Ok(fut) => {
                self.scheduler.start_root(behavior.name(), fut);
            }
            Err(payload) => {
                self.recorder.borrow_mut().end_recording()?;
                self.transition(BakePhase::Faulted);
                return Ok(RunEnd::Faulted(ScriptFault::from_panic(
                    payload,
                    behavior.name(),
                    FrameIndex(0),
                    0.0,
                )));
            }
        }
        self.recorder.borrow_mut().end_recording()?;

        self.transition(BakePhase::Stepping);
        let dt = opts.fps.frame_duration_secs();
        loop {
            if let Some(fault) = self.fault() {
                return Ok(RunEnd::Faulted(fault));
            }
            if self.scheduler.root_status() == TaskStatus::Finished {
                self.transition(BakePhase::Completed);
                return Ok(RunEnd::Completed);
            }
            if self.frames >= max_frames {
                self.transition(BakePhase::BudgetExceeded);
                return Ok(RunEnd::BudgetExceeded);
            }
            self.step(dt)?;
        }
    }

    fn step(&mut self, dt: f64) -> WavyteResult<()> {
        self.recorder.borrow_mut().begin_recording("frame")?;
        self.scheduler.advance_frame(dt)?;
        let now = self.scheduler.now();
        let expired = self.scene.borrow_mut().advance(now);
        {
            let mut recorder = self.recorder.borrow_mut();
            for snapshot in expired {
                recorder.record(
                    now,
                    CommandKind::Destroy {
                        entity_id: snapshot.id,
                        snapshot,
                    },
                )?;
            }
            recorder.end_recording()?;
        }
        self.frames += 1;
        Ok(())
    }

    fn finalize(
        &mut self,
        opts: &BakeOpts,
        outcome: BakeOutcome,
        fault: Option<ScriptFault>,
    ) -> WavyteResult<BakedArtifact> {
        let log = self.recorder.borrow_mut().finish(self.scheduler.now())?;
        let mut sound_track = create_track(opts.sample_rate, opts.channels, log.end_time())?;
        let mixed = mix_sound_commands(&mut sound_track, log.sound_commands());
        tracing::info!(
            ?outcome,
            frames = self.frames,
            commands = log.commands.len(),
            sounds = mixed,
            end_time = log.end_time(),
            "bake finished"
        );
        Ok(BakedArtifact {
            commands: log.commands,
            fps: opts.fps,
            handles_2d: log.handles_2d,
            handles_3d: log.handles_3d,
            sound_track,
            outcome,
            frames: self.frames,
            fault,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/bake/baker.rs"]
mod tests;
