use crate::foundation::core::{Rgba, Vec2};
use crate::record::command::{EntityKind, PropertyValue};
use crate::scene::view::SceneView;
use crate::script::api::ScriptApi;
use crate::script::behavior::{Behavior, ScriptFuture};

/// Substitute behavior shown after a script fault: one red text entity carrying the message.
#[derive(Clone, Debug)]
pub struct ErrorBehavior {
    message: String,
}

impl ErrorBehavior {
    /// Behavior displaying `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Message this behavior displays.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Behavior for ErrorBehavior {
    fn name(&self) -> &str {
        "error"
    }

    fn start(&self, _scene: SceneView, api: ScriptApi) -> ScriptFuture {
        let message = self.message.clone();
        Box::pin(async move {
            api.create_with(
                EntityKind::Text2D,
                [
                    ("text", PropertyValue::Text(message)),
                    ("color", Rgba::RED.into()),
                    ("position", Vec2::ZERO.into()),
                ],
            )?;
            Ok(())
        })
    }
}

/// Behavior used when a project has no script: a single empty label.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmptyBehavior;

impl Behavior for EmptyBehavior {
    fn name(&self) -> &str {
        "empty"
    }

    fn start(&self, _scene: SceneView, api: ScriptApi) -> ScriptFuture {
        Box::pin(async move {
            api.create_with(EntityKind::Text2D, [("text", "")])?;
            Ok(())
        })
    }
}
