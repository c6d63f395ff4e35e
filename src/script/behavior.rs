use std::future::Future;
use std::pin::Pin;

use crate::scene::view::SceneView;
use crate::script::api::ScriptApi;

/// Result of a script continuation. Scripts use `anyhow` so authors can attach context freely.
pub type ScriptResult = anyhow::Result<()>;

/// Boxed script continuation driven by the scheduler.
pub type ScriptFuture = Pin<Box<dyn Future<Output = ScriptResult>>>;

/// A user-authored animation: sequential scene edits separated by explicit waits.
///
/// Any `Fn(SceneView, ScriptApi) -> impl Future<Output = ScriptResult>` is a behavior.
pub trait Behavior {
    /// Name used for the root task in logs and fault reports.
    fn name(&self) -> &str {
        "main"
    }

    /// Create the root continuation. Nothing runs until the scheduler polls it.
    fn start(&self, scene: SceneView, api: ScriptApi) -> ScriptFuture;
}

impl<F, Fut> Behavior for F
where
    F: Fn(SceneView, ScriptApi) -> Fut,
    Fut: Future<Output = ScriptResult> + 'static,
{
    fn start(&self, scene: SceneView, api: ScriptApi) -> ScriptFuture {
        Box::pin(self(scene, api))
    }
}
