// Device/entity grouping for report sections
use crate::domain::entity::Entity;
use crate::domain::ids::DeviceId;
use crate::domain::telemetry::DeviceSection;

#[derive(Debug, Clone, PartialEq)]
pub struct DeviceGroup {
    pub device_id: DeviceId,
    pub entities: Vec<Entity>,
}

/// Group entities by owning device, keyed by first-seen device id.
/// Entities without a device are dropped; order inside a group is the input
/// order.
pub fn group_by_device(entities: &[Entity]) -> Vec<DeviceGroup> {
    let mut groups: Vec<DeviceGroup> = Vec::new();

    for entity in entities {
        let Some(device_id) = &entity.device_id else {
            continue;
        };

        match groups.iter_mut().find(|g| &g.device_id == device_id) {
            Some(group) => group.entities.push(entity.clone()),
            None => groups.push(DeviceGroup {
                device_id: device_id.clone(),
                entities: vec![entity.clone()],
            }),
        }
    }

    groups
}

/// Device ids in first-seen order.
pub fn device_ids(groups: &[DeviceGroup]) -> Vec<DeviceId> {
    groups.iter().map(|g| g.device_id.clone()).collect()
}

/// Keep only sections that have at least one row.
pub fn non_empty_sections(sections: Vec<DeviceSection>) -> Vec<DeviceSection> {
    sections.into_iter().filter(|s| !s.rows.is_empty()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::EntityId;
    use crate::domain::telemetry::{AggregateValues, ReportRow};

    fn entity(id: &str, device: Option<&str>) -> Entity {
        let e = Entity::new(EntityId::parse(id).unwrap(), format!("key.{}", id), format!("Entity {}", id));
        match device {
            Some(d) => e.with_device(DeviceId::parse(d).unwrap()),
            None => e,
        }
    }

    #[test]
    fn test_groups_by_first_seen_device() {
        let entities = vec![
            entity("1", Some("b")),
            entity("2", Some("a")),
            entity("3", None),
            entity("4", Some("b")),
        ];

        let groups = group_by_device(&entities);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].device_id.as_str(), "b");
        assert_eq!(groups[1].device_id.as_str(), "a");

        let b_ids: Vec<&str> = groups[0].entities.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(b_ids, vec!["1", "4"]);
    }

    #[test]
    fn test_entities_without_devices_yield_no_groups() {
        let entities = vec![entity("1", None), entity("2", None)];
        assert!(group_by_device(&entities).is_empty());
        assert!(group_by_device(&[]).is_empty());
    }

    #[test]
    fn test_empty_sections_are_dropped() {
        let row = ReportRow::new("Humidity".to_string(), "%".to_string(), AggregateValues::default());
        let sections = vec![
            DeviceSection::new("A".to_string(), vec![row.clone(), row]),
            DeviceSection::new("B".to_string(), Vec::new()),
        ];

        let kept = non_empty_sections(sections);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].device_name, "A");
        assert_eq!(kept[0].rows.len(), 2);
    }
}
