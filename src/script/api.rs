use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;
use std::sync::Arc;

use crate::audio::mix::SoundSample;
use crate::foundation::core::{EntityId, FrameIndex, Point, RenderBufferId, Vec3};
use crate::foundation::error::{WavyteError, WavyteResult};
use crate::record::command::{CommandKind, EntityKind, PropertyValue};
use crate::record::handle::HandleKey;
use crate::record::recorder::MutationRecorder;
use crate::scene::model::Scene;
use crate::scene::view::SceneView;
use crate::schedule::executor::SchedulerHandle;
use crate::schedule::wait::Wait;
use crate::script::behavior::ScriptResult;

/// Where an absorbing entity is pulled to. Both points are optional.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AbsorbTarget {
    /// World-space target.
    pub point: Option<Vec3>,
    /// Screen-space target.
    pub screen_point: Option<Point>,
}

/// Everything a behavior may do: read the clock, suspend, and mutate the scene.
///
/// Each mutation is applied to the scene and appended to the command log, stamped with the
/// current virtual time. Mutations outside of a scheduler pump step are rejected before the
/// scene is touched.
#[derive(Clone)]
pub struct ScriptApi {
    sched: SchedulerHandle,
    scene: Rc<RefCell<Scene>>,
    recorder: Rc<RefCell<MutationRecorder>>,
}

impl ScriptApi {
    pub(crate) fn new(
        sched: SchedulerHandle,
        scene: Rc<RefCell<Scene>>,
        recorder: Rc<RefCell<MutationRecorder>>,
    ) -> Self {
        Self {
            sched,
            scene,
            recorder,
        }
    }

    /// Read-only view of the scene.
    pub fn scene(&self) -> SceneView {
        SceneView::new(self.scene.clone())
    }

    /// Current virtual time in seconds.
    pub fn now(&self) -> f64 {
        self.sched.now()
    }

    /// Current frame counter.
    pub fn frame(&self) -> FrameIndex {
        self.sched.frame()
    }

    /// Step of the frame currently being advanced.
    pub fn frame_delta(&self) -> WavyteResult<f64> {
        self.sched.frame_delta()
    }

    /// Suspend until the next frame.
    pub fn wait_next_frame(&self) -> Wait {
        self.sched.wait_next_frame()
    }

    /// Suspend for `seconds` of virtual time.
    pub fn wait_seconds(&self, seconds: f64) -> Wait {
        self.sched.wait_seconds(seconds)
    }

    /// Suspend for `frames` frame advances.
    pub async fn wait_frames(&self, frames: u32) {
        for _ in 0..frames {
            self.wait_next_frame().await;
        }
    }

    /// Run `fut` as an additional continuation alongside the caller.
    pub fn spawn<F>(&self, name: impl Into<String>, fut: F)
    where
        F: Future<Output = ScriptResult> + 'static,
    {
        self.sched.spawn(name, fut);
    }

    /// Create an entity with its kind's default properties.
    pub fn create(&self, kind: EntityKind) -> WavyteResult<EntityId> {
        self.create_inner(kind, Vec::new(), None)
    }

    /// Create an entity, overriding or adding properties.
    pub fn create_with<I, K, V>(&self, kind: EntityKind, props: I) -> WavyteResult<EntityId>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<PropertyValue>,
    {
        self.create_inner(kind, collect_props(props), None)
    }

    /// Create an entity that is destroyed automatically after `lifetime_secs`.
    pub fn create_transient<I, K, V>(
        &self,
        kind: EntityKind,
        props: I,
        lifetime_secs: f64,
    ) -> WavyteResult<EntityId>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<PropertyValue>,
    {
        if !lifetime_secs.is_finite() || lifetime_secs <= 0.0 {
            return Err(WavyteError::scene(format!(
                "transient lifetime must be finite and > 0 (got {lifetime_secs})"
            )));
        }
        let expires_at = self.now() + lifetime_secs;
        self.create_inner(kind, collect_props(props), Some(expires_at))
    }

    fn create_inner(
        &self,
        kind: EntityKind,
        props: Vec<(String, PropertyValue)>,
        expires_at: Option<f64>,
    ) -> WavyteResult<EntityId> {
        self.mutate(|scene| {
            let entity = scene.create(kind, props, expires_at)?;
            Ok((entity.id, CommandKind::Create { entity }))
        })
    }

    /// Remove an entity.
    pub fn destroy(&self, id: EntityId) -> WavyteResult<()> {
        self.mutate(|scene| {
            let snapshot = scene.destroy(id)?;
            Ok((
                (),
                CommandKind::Destroy {
                    entity_id: id,
                    snapshot,
                },
            ))
        })
    }

    /// Set one property of one entity.
    pub fn set_property(
        &self,
        id: EntityId,
        property: &str,
        value: impl Into<PropertyValue>,
    ) -> WavyteResult<()> {
        let new_value = value.into();
        self.mutate(|scene| {
            let old_value = scene.set_property(id, property, new_value.clone())?;
            Ok((
                (),
                CommandKind::SetProperty {
                    entity_id: id,
                    property: property.to_owned(),
                    old_value,
                    new_value,
                },
            ))
        })
    }

    /// Set the same property on several entities in one atomic edit.
    pub fn set_property_batch(
        &self,
        ids: &[EntityId],
        property: &str,
        value: impl Into<PropertyValue>,
    ) -> WavyteResult<()> {
        let new_value = value.into();
        self.mutate(|scene| {
            let old_values = scene.set_property_batch(ids, property, &new_value)?;
            Ok((
                (),
                CommandKind::SetPropertyBatch {
                    entity_ids: ids.to_vec(),
                    property: property.to_owned(),
                    old_values,
                    new_value,
                },
            ))
        })
    }

    /// Set absorb progress of an entity.
    pub fn absorb(&self, id: EntityId, progress: f64, target: AbsorbTarget) -> WavyteResult<()> {
        self.mutate(|scene| {
            let old_progress = scene.absorb(id, progress)?;
            let new_progress = scene.get(id).map_or(progress, |e| e.absorb);
            Ok((
                (),
                CommandKind::Absorb {
                    entity_id: id,
                    old_progress,
                    new_progress,
                    absorb_point: target.point,
                    absorb_screen_point: target.screen_point,
                },
            ))
        })
    }

    /// Make `camera` the active camera, or clear it with `None`.
    pub fn set_active_camera(&self, camera: Option<EntityId>) -> WavyteResult<()> {
        self.mutate(|scene| {
            let old_camera = scene.set_active_camera(camera)?;
            Ok((
                (),
                CommandKind::SetActiveCamera {
                    new_camera: camera,
                    old_camera,
                },
            ))
        })
    }

    /// Trigger `sample` at the current time.
    pub fn play_sound(&self, sample: Arc<SoundSample>, volume: f32) -> WavyteResult<()> {
        if !volume.is_finite() {
            return Err(WavyteError::validation("sound volume must be finite"));
        }
        self.mutate(|_| Ok(((), CommandKind::PlaySound { sample, volume })))
    }

    /// Request an offscreen render buffer.
    pub fn create_render_buffer(&self, width: u32, height: u32) -> WavyteResult<RenderBufferId> {
        self.mutate(|scene| {
            let id = scene.allocate_render_buffer(width, height)?;
            Ok((id, CommandKind::CreateRenderBuffer { id, width, height }))
        })
    }

    /// Open a 2D editor handle at the current time.
    pub fn begin_handle_2d(&self, id: impl Into<String>, position: Point) -> WavyteResult<HandleKey> {
        let now = self.now();
        self.recorder
            .borrow_mut()
            .open_handle_2d(id.into(), position, now)
    }

    /// Open a 3D editor handle at the current time.
    pub fn begin_handle_3d(&self, id: impl Into<String>, position: Vec3) -> WavyteResult<HandleKey> {
        let now = self.now();
        self.recorder
            .borrow_mut()
            .open_handle_3d(id.into(), position, now)
    }

    /// Close a handle opened earlier.
    pub fn end_handle(&self, key: HandleKey) -> WavyteResult<()> {
        let now = self.now();
        self.recorder.borrow_mut().close_handle(key, now)
    }

    fn mutate<T>(
        &self,
        apply: impl FnOnce(&mut Scene) -> WavyteResult<(T, CommandKind)>,
    ) -> WavyteResult<T> {
        let now = self.now();
        let mut recorder = self.recorder.borrow_mut();
        recorder.ensure_recording()?;
        let (out, kind) = apply(&mut self.scene.borrow_mut())?;
        tracing::trace!(command = kind.name(), time = now, "recorded");
        recorder.record(now, kind)?;
        Ok(out)
    }
}

fn collect_props<I, K, V>(props: I) -> Vec<(String, PropertyValue)>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<PropertyValue>,
{
    props
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/script/api.rs"]
mod tests;
