// Alarm rules placeholder - the feature is not implemented yet
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct AlarmRulesPlaceholder {
    pub title: String,
    pub message: String,
    pub phase: String,
}

impl Default for AlarmRulesPlaceholder {
    fn default() -> Self {
        Self {
            title: "Alarm rules".to_string(),
            message: "Alarm rules (if-then) will be added soon.".to_string(),
            phase: "This feature is planned for phase 2.".to_string(),
        }
    }
}
