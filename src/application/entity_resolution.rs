// Ordered strategies for finding a board's device-linked entities
use crate::domain::dashboard::BoardDetail;
use crate::domain::entity::Entity;
use crate::domain::ids::{DeviceId, EntityId};

/// Where a board's entities can be loaded from.
#[derive(Debug, Clone, PartialEq)]
pub enum EntitySource {
    /// Entity records embedded in the board, usable as-is.
    Embedded(Vec<Entity>),
    /// Explicit entity ids, resolved with an entity search.
    ByIds(Vec<EntityId>),
    /// Linked devices, resolved with one entity search per device.
    ByDevices(Vec<DeviceId>),
}

pub struct Strategy {
    pub name: &'static str,
    pub source: fn(&BoardDetail) -> Option<EntitySource>,
}

/// Tried in order; the first source that yields device-linked entities wins.
pub const STRATEGIES: [Strategy; 3] = [
    Strategy {
        name: "embedded_entities",
        source: embedded_entities,
    },
    Strategy {
        name: "listed_entity_ids",
        source: listed_entity_ids,
    },
    Strategy {
        name: "linked_device_ids",
        source: linked_device_ids,
    },
];

pub fn embedded_entities(detail: &BoardDetail) -> Option<EntitySource> {
    detail
        .entities
        .iter()
        .any(|e| e.device_id.is_some())
        .then(|| EntitySource::Embedded(detail.entities.clone()))
}

pub fn listed_entity_ids(detail: &BoardDetail) -> Option<EntitySource> {
    let ids = detail.referenced_entity_ids();
    (!ids.is_empty()).then_some(EntitySource::ByIds(ids))
}

pub fn linked_device_ids(detail: &BoardDetail) -> Option<EntitySource> {
    (!detail.device_ids.is_empty()).then(|| EntitySource::ByDevices(detail.device_ids.clone()))
}

/// Entity ids the board cares about, from embedded records and references.
/// Used to restrict the all-devices scan.
pub fn board_entity_ids(detail: &BoardDetail) -> Vec<EntityId> {
    let mut ids = detail.referenced_entity_ids();
    for entity in &detail.entities {
        if !ids.contains(&entity.id) {
            ids.push(entity.id.clone());
        }
    }
    ids
}

pub fn has_device_link(entities: &[Entity]) -> bool {
    entities.iter().any(|e| e.device_id.is_some())
}
