use std::collections::BTreeMap;
use std::sync::Arc;

use crate::audio::mix::SoundSample;
use crate::foundation::core::{EntityId, Point, RenderBufferId, ResourceKey, Rgba, Vec2, Vec3};

/// Closed set of property value types understood by the scene model.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "value")]
pub enum PropertyValue {
    /// Scalar number.
    Number(f64),
    /// 2D vector.
    Vec2(Vec2),
    /// 3D vector.
    Vec3(Vec3),
    /// Straight-alpha color.
    Color(Rgba),
    /// Free-form string.
    Text(String),
    /// Named variant of a property-specific enumeration.
    Enum(String),
    /// Reference to an externally managed resource.
    Resource(ResourceKey),
}

impl PropertyValue {
    /// Stable name of the value's variant.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::Vec2(_) => "vec2",
            Self::Vec3(_) => "vec3",
            Self::Color(_) => "color",
            Self::Text(_) => "text",
            Self::Enum(_) => "enum",
            Self::Resource(_) => "resource",
        }
    }

    /// Return `true` if both values are of the same variant.
    pub fn same_type(&self, other: &Self) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    /// Numeric payload, if this is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// String payload, if this is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<Vec2> for PropertyValue {
    fn from(v: Vec2) -> Self {
        Self::Vec2(v)
    }
}

impl From<Vec3> for PropertyValue {
    fn from(v: Vec3) -> Self {
        Self::Vec3(v)
    }
}

impl From<Rgba> for PropertyValue {
    fn from(v: Rgba) -> Self {
        Self::Color(v)
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<String> for PropertyValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<ResourceKey> for PropertyValue {
    fn from(v: ResourceKey) -> Self {
        Self::Resource(v)
    }
}

/// Kind of scene entity; determines the properties an entity starts with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Transform-only grouping node.
    Group,
    /// Filled 2D shape.
    Shape2D,
    /// 2D text label.
    Text2D,
    /// 3D mesh.
    Mesh3D,
    /// Camera that can be made active.
    Camera,
}

/// Full state of one entity at a point in time.
#[derive(Clone, Debug, PartialEq)]
pub struct EntitySnapshot {
    /// Entity identifier.
    pub id: EntityId,
    /// Entity kind.
    pub kind: EntityKind,
    /// Every declared property and its value.
    pub properties: BTreeMap<String, PropertyValue>,
    /// Blend/merge progress in `[0, 1]`.
    pub absorb: f64,
}

/// One recorded scene mutation, stamped with the virtual time it happened at.
#[derive(Clone, Debug, PartialEq)]
pub struct Command {
    /// Virtual time in seconds.
    pub time: f64,
    /// What happened.
    pub kind: CommandKind,
}

/// Recorded mutation payload. Edits carry both old and new values so the log can be walked
/// backwards without re-running the script.
#[derive(Clone, Debug, PartialEq)]
pub enum CommandKind {
    /// An entity was added to the scene.
    Create {
        /// State of the entity right after creation.
        entity: EntitySnapshot,
    },
    /// An entity was removed from the scene.
    Destroy {
        /// Removed entity.
        entity_id: EntityId,
        /// State of the entity right before removal.
        snapshot: EntitySnapshot,
    },
    /// One property of one entity changed.
    SetProperty {
        /// Edited entity.
        entity_id: EntityId,
        /// Property name.
        property: String,
        /// Value before the edit.
        old_value: PropertyValue,
        /// Value after the edit.
        new_value: PropertyValue,
    },
    /// The same property of several entities was set to one shared value.
    SetPropertyBatch {
        /// Edited entities.
        entity_ids: Vec<EntityId>,
        /// Property name.
        property: String,
        /// Value before the edit, one per entity in `entity_ids` order.
        old_values: Vec<PropertyValue>,
        /// Value after the edit, shared by all entities.
        new_value: PropertyValue,
    },
    /// Blend/merge progress of an entity changed.
    Absorb {
        /// Edited entity.
        entity_id: EntityId,
        /// Progress before the edit.
        old_progress: f64,
        /// Progress after the edit.
        new_progress: f64,
        /// World-space point the entity is absorbed into.
        absorb_point: Option<Vec3>,
        /// Screen-space point the entity is absorbed into.
        absorb_screen_point: Option<Point>,
    },
    /// The active camera changed.
    SetActiveCamera {
        /// Camera after the change.
        new_camera: Option<EntityId>,
        /// Camera before the change.
        old_camera: Option<EntityId>,
    },
    /// A sound starts playing at the command's time.
    PlaySound {
        /// PCM data to play.
        sample: Arc<SoundSample>,
        /// Linear gain.
        volume: f32,
    },
    /// An offscreen render buffer was requested.
    CreateRenderBuffer {
        /// Buffer identifier.
        id: RenderBufferId,
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
    },
    /// Terminal sentinel; always the last command of a finished log.
    End,
}

impl CommandKind {
    /// Stable, lowercase name of the command variant.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Create { .. } => "create",
            Self::Destroy { .. } => "destroy",
            Self::SetProperty { .. } => "set_property",
            Self::SetPropertyBatch { .. } => "set_property_batch",
            Self::Absorb { .. } => "absorb",
            Self::SetActiveCamera { .. } => "set_active_camera",
            Self::PlaySound { .. } => "play_sound",
            Self::CreateRenderBuffer { .. } => "create_render_buffer",
            Self::End => "end",
        }
    }

    /// Commands that undo this one, in application order.
    ///
    /// Batch edits expand into one `SetProperty` per entity because their old values differ.
    /// Sounds, render buffers and the end sentinel have no inverse.
    pub fn inverse(&self) -> Vec<CommandKind> {
        match self {
            Self::Create { entity } => vec![Self::Destroy {
                entity_id: entity.id,
                snapshot: entity.clone(),
            }],
            Self::Destroy { snapshot, .. } => vec![Self::Create {
                entity: snapshot.clone(),
            }],
            Self::SetProperty {
                entity_id,
                property,
                old_value,
                new_value,
            } => vec![Self::SetProperty {
                entity_id: *entity_id,
                property: property.clone(),
                old_value: new_value.clone(),
                new_value: old_value.clone(),
            }],
            Self::SetPropertyBatch {
                entity_ids,
                property,
                old_values,
                new_value,
            } => entity_ids
                .iter()
                .zip(old_values)
                .map(|(id, old)| Self::SetProperty {
                    entity_id: *id,
                    property: property.clone(),
                    old_value: new_value.clone(),
                    new_value: old.clone(),
                })
                .collect(),
            Self::Absorb {
                entity_id,
                old_progress,
                new_progress,
                absorb_point,
                absorb_screen_point,
            } => vec![Self::Absorb {
                entity_id: *entity_id,
                old_progress: *new_progress,
                new_progress: *old_progress,
                absorb_point: *absorb_point,
                absorb_screen_point: *absorb_screen_point,
            }],
            Self::SetActiveCamera {
                new_camera,
                old_camera,
            } => vec![Self::SetActiveCamera {
                new_camera: *old_camera,
                old_camera: *new_camera,
            }],
            Self::PlaySound { .. } | Self::CreateRenderBuffer { .. } | Self::End => Vec::new(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/record/command.rs"]
mod tests;
