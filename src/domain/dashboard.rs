// Dashboard and board (canvas) domain models
use super::entity::Entity;
use super::ids::{ApiKey, CanvasId, DashboardId, DeviceId, EntityId};

#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub id: DashboardId,
    pub name: String,
    pub main_canvas_id: Option<CanvasId>,
}

impl Dashboard {
    pub fn new(id: DashboardId, name: String, main_canvas_id: Option<CanvasId>) -> Self {
        Self {
            id,
            name,
            main_canvas_id,
        }
    }

    /// Canvas holding the dashboard's widgets. Older dashboards have no
    /// separate canvas and are addressed by their own id.
    pub fn canvas_id(&self) -> CanvasId {
        self.main_canvas_id
            .clone()
            .unwrap_or_else(|| self.id.clone().into())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoardDetail {
    pub name: Option<String>,
    pub entity_ids: Vec<EntityId>,
    pub entities: Vec<Entity>,
    pub widgets: Vec<serde_json::Value>,
    pub device_ids: Vec<DeviceId>,
}

impl BoardDetail {
    /// Entity ids listed on the board plus the ones referenced by widgets,
    /// deduplicated in first-seen order.
    pub fn referenced_entity_ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = Vec::new();
        let widget_ids = self.widgets.iter().flat_map(widget_entity_ids);
        for id in self.entity_ids.iter().cloned().chain(widget_ids) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
            && self.device_ids.is_empty()
            && self.referenced_entity_ids().is_empty()
    }
}

/// Widgets reference entities through `data.entity` (single select) or
/// `data.entityList` (multi select); both carry the id in `value`.
fn widget_entity_ids(widget: &serde_json::Value) -> Vec<EntityId> {
    let data = &widget["data"];
    let single = std::iter::once(&data["entity"]);
    let multi = data["entityList"].as_array().into_iter().flatten();

    single
        .chain(multi)
        .filter_map(|reference| ApiKey::from_json(&reference["value"]))
        .map(EntityId)
        .collect()
}
