use std::collections::BTreeMap;

use crate::foundation::core::{EntityId, RenderBufferId, Rgba, Vec2, Vec3};
use crate::foundation::error::{WavyteError, WavyteResult};
use crate::record::command::{EntityKind, EntitySnapshot, PropertyValue};

const MAX_RENDER_BUFFER_SIDE: u32 = 16_384;

impl EntityKind {
    /// Properties every entity of this kind starts with.
    pub fn default_properties(self) -> BTreeMap<String, PropertyValue> {
        let mut props = BTreeMap::new();
        let mut put = |name: &str, value: PropertyValue| {
            props.insert(name.to_owned(), value);
        };
        match self {
            Self::Group => {
                put("position", Vec2::ZERO.into());
                put("opacity", 1.0.into());
            }
            Self::Shape2D => {
                put("position", Vec2::ZERO.into());
                put("rotation", 0.0.into());
                put("scale", Vec2::new(1.0, 1.0).into());
                put("color", Rgba::WHITE.into());
                put("opacity", 1.0.into());
                put("shape", PropertyValue::Enum("rect".to_owned()));
            }
            Self::Text2D => {
                put("position", Vec2::ZERO.into());
                put("text", "".into());
                put("size", 24.0.into());
                put("color", Rgba::WHITE.into());
                put("opacity", 1.0.into());
            }
            Self::Mesh3D => {
                put("position", Vec3::default().into());
                put("scale", Vec3::new(1.0, 1.0, 1.0).into());
                put("color", Rgba::WHITE.into());
                put("opacity", 1.0.into());
            }
            Self::Camera => {
                put("position", Vec3::new(0.0, 0.0, -10.0).into());
                put("target", Vec3::default().into());
                put("fov", 60.0.into());
            }
        }
        props
    }
}

#[derive(Clone, Debug)]
struct SceneEntity {
    snapshot: EntitySnapshot,
    expires_at: Option<f64>,
}

/// In-memory scene mutated by scripts during a bake.
///
/// The scene only models what the command log needs: entity identity, a declared property bag
/// per entity, absorb progress, the active camera and render-buffer allocation. Every mutating
/// method returns the state that existed before the edit.
#[derive(Debug, Default)]
pub struct Scene {
    entities: BTreeMap<EntityId, SceneEntity>,
    next_entity: u64,
    next_buffer: u32,
    active_camera: Option<EntityId>,
}

impl Scene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove every entity and restart id allocation.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Number of live entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Return `true` if the scene has no entities.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Snapshot of a live entity.
    pub fn get(&self, id: EntityId) -> Option<&EntitySnapshot> {
        self.entities.get(&id).map(|e| &e.snapshot)
    }

    /// Current value of one property of a live entity.
    pub fn property(&self, id: EntityId, name: &str) -> Option<&PropertyValue> {
        self.get(id).and_then(|e| e.properties.get(name))
    }

    /// Currently active camera, if any.
    pub fn active_camera(&self) -> Option<EntityId> {
        self.active_camera
    }

    /// Ids of live entities in ascending order.
    pub fn entity_ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.keys().copied()
    }

    /// Add an entity of `kind`, overriding or extending its default properties with `props`.
    ///
    /// `expires_at` schedules an automatic destroy once virtual time reaches it.
    pub fn create(
        &mut self,
        kind: EntityKind,
        props: impl IntoIterator<Item = (String, PropertyValue)>,
        expires_at: Option<f64>,
    ) -> WavyteResult<EntitySnapshot> {
        let mut properties = kind.default_properties();
        for (name, value) in props {
            validate_property_name(&name)?;
            if let Some(default) = properties.get(&name)
                && !default.same_type(&value)
            {
                return Err(WavyteError::scene(format!(
                    "property '{name}' of {kind:?} expects {}, got {}",
                    default.type_name(),
                    value.type_name()
                )));
            }
            properties.insert(name, value);
        }
        if let Some(t) = expires_at
            && !t.is_finite()
        {
            return Err(WavyteError::scene("entity lifetime must be finite"));
        }

        let id = EntityId(self.next_entity);
        self.next_entity += 1;
        let snapshot = EntitySnapshot {
            id,
            kind,
            properties,
            absorb: 0.0,
        };
        self.entities.insert(
            id,
            SceneEntity {
                snapshot: snapshot.clone(),
                expires_at,
            },
        );
        Ok(snapshot)
    }

    /// Remove an entity and return its last state.
    pub fn destroy(&mut self, id: EntityId) -> WavyteResult<EntitySnapshot> {
        if self.active_camera == Some(id) {
            return Err(WavyteError::scene(format!(
                "cannot destroy {id}: it is the active camera"
            )));
        }
        self.entities
            .remove(&id)
            .map(|e| e.snapshot)
            .ok_or_else(|| unknown_entity(id))
    }

    /// Set one declared property and return its previous value.
    pub fn set_property(
        &mut self,
        id: EntityId,
        name: &str,
        value: PropertyValue,
    ) -> WavyteResult<PropertyValue> {
        let entity = self.entities.get_mut(&id).ok_or_else(|| unknown_entity(id))?;
        let slot = property_slot(&mut entity.snapshot, name, &value)?;
        Ok(std::mem::replace(slot, value))
    }

    /// Set the same property on several entities. Either every entity is edited or none is.
    ///
    /// Returns the previous values in `ids` order.
    pub fn set_property_batch(
        &mut self,
        ids: &[EntityId],
        name: &str,
        value: &PropertyValue,
    ) -> WavyteResult<Vec<PropertyValue>> {
        for (i, id) in ids.iter().enumerate() {
            if ids[..i].contains(id) {
                return Err(WavyteError::scene(format!(
                    "{id} appears more than once in a batch edit"
                )));
            }
            let entity = self.entities.get(id).ok_or_else(|| unknown_entity(*id))?;
            check_property(&entity.snapshot, name, value)?;
        }

        let mut old_values = Vec::with_capacity(ids.len());
        for id in ids {
            let entity = self.entities.get_mut(id).ok_or_else(|| unknown_entity(*id))?;
            let slot = property_slot(&mut entity.snapshot, name, value)?;
            old_values.push(std::mem::replace(slot, value.clone()));
        }
        Ok(old_values)
    }

    /// Set absorb progress (clamped to `[0, 1]`) and return the previous progress.
    pub fn absorb(&mut self, id: EntityId, progress: f64) -> WavyteResult<f64> {
        if !progress.is_finite() {
            return Err(WavyteError::scene("absorb progress must be finite"));
        }
        let entity = self.entities.get_mut(&id).ok_or_else(|| unknown_entity(id))?;
        Ok(std::mem::replace(
            &mut entity.snapshot.absorb,
            progress.clamp(0.0, 1.0),
        ))
    }

    /// Make `camera` the active camera (or clear it) and return the previous one.
    pub fn set_active_camera(
        &mut self,
        camera: Option<EntityId>,
    ) -> WavyteResult<Option<EntityId>> {
        if let Some(id) = camera {
            let entity = self.entities.get(&id).ok_or_else(|| unknown_entity(id))?;
            if entity.snapshot.kind != EntityKind::Camera {
                return Err(WavyteError::scene(format!(
                    "{id} is a {:?}, not a camera",
                    entity.snapshot.kind
                )));
            }
        }
        Ok(std::mem::replace(&mut self.active_camera, camera))
    }

    /// Allocate an id for an offscreen render buffer.
    pub fn allocate_render_buffer(
        &mut self,
        width: u32,
        height: u32,
    ) -> WavyteResult<RenderBufferId> {
        let side_ok = |v: u32| (1..=MAX_RENDER_BUFFER_SIDE).contains(&v);
        if !side_ok(width) || !side_ok(height) {
            return Err(WavyteError::scene(format!(
                "render buffer size {width}x{height} is out of range"
            )));
        }
        let id = RenderBufferId(self.next_buffer);
        self.next_buffer += 1;
        Ok(id)
    }

    /// Process time-driven scene behavior up to `now`: entities whose lifetime has elapsed are
    /// removed, in id order. Returns their last state.
    pub fn advance(&mut self, now: f64) -> Vec<EntitySnapshot> {
        let expired: Vec<EntityId> = self
            .entities
            .iter()
            .filter(|(id, e)| {
                e.expires_at.is_some_and(|t| t <= now) && self.active_camera != Some(**id)
            })
            .map(|(id, _)| *id)
            .collect();
        expired
            .into_iter()
            .filter_map(|id| self.entities.remove(&id).map(|e| e.snapshot))
            .collect()
    }
}

fn unknown_entity(id: EntityId) -> WavyteError {
    WavyteError::scene(format!("unknown entity {id}"))
}

fn validate_property_name(name: &str) -> WavyteResult<()> {
    if name.trim().is_empty() {
        return Err(WavyteError::scene("property name must be non-empty"));
    }
    Ok(())
}

fn check_property(entity: &EntitySnapshot, name: &str, value: &PropertyValue) -> WavyteResult<()> {
    let current = entity.properties.get(name).ok_or_else(|| {
        WavyteError::scene(format!(
            "{} ({:?}) has no property '{name}'",
            entity.id, entity.kind
        ))
    })?;
    if !current.same_type(value) {
        return Err(WavyteError::scene(format!(
            "property '{name}' of {} expects {}, got {}",
            entity.id,
            current.type_name(),
            value.type_name()
        )));
    }
    Ok(())
}

fn property_slot<'a>(
    entity: &'a mut EntitySnapshot,
    name: &str,
    value: &PropertyValue,
) -> WavyteResult<&'a mut PropertyValue> {
    check_property(entity, name, value)?;
    entity
        .properties
        .get_mut(name)
        .ok_or_else(|| WavyteError::scene(format!("property '{name}' vanished")))
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
