use super::*;
use crate::foundation::core::Fps;
use crate::record::command::{EntityKind, PropertyValue};
use crate::scene::view::SceneView;
use crate::script::behavior::ScriptFuture;

fn behavior<F, Fut>(f: F) -> F
where
    F: Fn(SceneView, ScriptApi) -> Fut,
    Fut: Future<Output = ScriptResult> + 'static,
{
    f
}

fn baker(fps: u32, max_length_secs: f64) -> Baker {
    Baker::new(BakeOpts {
        fps: Fps { num: fps, den: 1 },
        max_length_secs,
        ..BakeOpts::default()
    })
    .unwrap()
}

struct FailingFallback;

impl Behavior for FailingFallback {
    fn name(&self) -> &str {
        "broken"
    }

    fn start(&self, _scene: SceneView, _api: ScriptApi) -> ScriptFuture {
        Box::pin(async { Err(anyhow::anyhow!("still broken")) })
    }
}

struct PanicsOnStart;

impl Behavior for PanicsOnStart {
    fn start(&self, _scene: SceneView, _api: ScriptApi) -> ScriptFuture {
        panic!("eager failure")
    }
}

#[test]
fn invalid_options_are_rejected_up_front() {
    let err = Baker::new(BakeOpts {
        channels: 0,
        ..BakeOpts::default()
    })
    .unwrap_err();
    assert!(matches!(err, WavyteError::Validation(_)));
}

#[test]
fn run_walks_priming_stepping_completed() {
    let opts = BakeOpts::default();
    let mut run = BakeRun::new();
    assert_eq!(run.phase, BakePhase::Idle);
    let script = behavior(|_scene, api| async move {
        api.wait_next_frame().await;
        Ok(())
    });
    let end = run.execute(&script, &opts, 10).unwrap();
    assert!(matches!(end, RunEnd::Completed));
    assert_eq!(run.phase, BakePhase::Completed);
    assert_eq!(run.frames, 1);
}

#[test]
fn run_stops_at_budget() {
    let opts = BakeOpts::default();
    let mut run = BakeRun::new();
    let script = behavior(|_scene, api| async move {
        while api.now() < f64::MAX {
            api.wait_next_frame().await;
        }
        Ok(())
    });
    let end = run.execute(&script, &opts, 3).unwrap();
    assert!(matches!(end, RunEnd::BudgetExceeded));
    assert_eq!(run.phase, BakePhase::BudgetExceeded);
    assert_eq!(run.frames, 3);
}

#[test]
fn zero_budget_still_primes() {
    let artifact = baker(30, 0.0)
        .bake_fn(|_scene, api| async move {
            api.create(EntityKind::Group)?;
            api.wait_next_frame().await;
            Ok(())
        })
        .unwrap();
    assert_eq!(artifact.outcome, BakeOutcome::BudgetExceeded);
    assert_eq!(artifact.frames, 0);
    assert_eq!(artifact.commands.len(), 2);
}

#[test]
fn fault_is_replaced_by_error_text() {
    let artifact = baker(30, 5.0)
        .bake_fn(|_scene, api| async move {
            api.wait_seconds(0.1).await;
            Err(anyhow::anyhow!("bad script").context("while fading"))
        })
        .unwrap();

    assert_eq!(artifact.outcome, BakeOutcome::Recovered);
    assert!(artifact.has_error());
    assert_eq!(artifact.error_message(), Some("while fading: bad script"));
    assert!(artifact.stack_trace().is_some());
    match &artifact.commands[0].kind {
        CommandKind::Create { entity } => {
            assert_eq!(entity.kind, EntityKind::Text2D);
            assert_eq!(
                entity.properties["text"],
                PropertyValue::from("while fading: bad script")
            );
        }
        other => panic!("unexpected first command {other:?}"),
    }
    assert_eq!(artifact.commands.last().map(|c| &c.kind), Some(&CommandKind::End));
}

#[test]
fn panic_while_starting_is_contained() {
    let artifact = baker(30, 1.0).bake(&PanicsOnStart).unwrap();
    assert!(artifact.has_error());
    assert!(artifact.error_message().unwrap().contains("eager failure"));
}

#[test]
fn fallback_failure_is_fatal() {
    let b = baker(30, 1.0);
    let err = b.recover_with(
        ScriptFault {
            message: "original".to_owned(),
            stack_trace: None,
            task: "main".to_owned(),
            frame: FrameIndex(0),
            time: 0.0,
        },
        &FailingFallback,
    );
    match err {
        Err(WavyteError::FallbackFault { message, original }) => {
            assert_eq!(message, "still broken");
            assert_eq!(original, "original");
        }
        other => panic!("expected fallback fault, got {other:?}"),
    }
}

#[test]
fn no_project_bakes_the_empty_behavior() {
    let artifact = baker(30, 1.0).bake_project(None).unwrap();
    assert_eq!(artifact.outcome, BakeOutcome::Completed);
    assert!(!artifact.has_error());
    assert_eq!(artifact.commands.len(), 2);
    assert_eq!(artifact.frames, 0);
    assert!(artifact.sound_track.is_empty());
}

#[test]
fn transient_entities_are_destroyed_by_the_scene_step() {
    let artifact = baker(10, 5.0)
        .bake_fn(|_scene, api| async move {
            let props: [(&str, PropertyValue); 0] = [];
            api.create_transient(EntityKind::Shape2D, props, 0.3)?;
            api.wait_seconds(1.0).await;
            Ok(())
        })
        .unwrap();
    let destroys: Vec<f64> = artifact
        .commands
        .iter()
        .filter(|c| matches!(c.kind, CommandKind::Destroy { .. }))
        .map(|c| c.time)
        .collect();
    assert_eq!(destroys.len(), 1);
    assert!((destroys[0] - 0.3).abs() < 1e-9, "{destroys:?}");
}
