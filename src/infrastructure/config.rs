use chrono::{FixedOffset, Offset, Utc};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    pub console: ConsoleSettings,
    #[serde(default)]
    pub report: ReportSettings,
    #[serde(default)]
    pub labels: ReportLabels,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ConsoleSettings {
    pub base_url: String,
    #[serde(default)]
    pub access_token: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_page_size() -> u32 {
    1000
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ReportSettings {
    pub file_prefix: String,
    /// Offset applied to every date printed in the report.
    pub utc_offset_minutes: i32,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            file_prefix: "TelemetryReport".to_string(),
            utc_offset_minutes: 0,
        }
    }
}

impl ReportSettings {
    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix())
    }
}

/// Strings printed in the PDF. Translations are supplied through config.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ReportLabels {
    pub default_title: String,
    pub generated_at: String,
    pub attribution: String,
    pub dashboard: String,
    pub device: String,
    pub entity_name: String,
    pub unit: String,
    pub last: String,
    pub min: String,
    pub max: String,
    pub avg: String,
}

impl Default for ReportLabels {
    fn default() -> Self {
        Self {
            default_title: "Telemetry Report".to_string(),
            generated_at: "Generated at:".to_string(),
            attribution: "Generated by the IoT console".to_string(),
            dashboard: "Dashboard".to_string(),
            device: "Device".to_string(),
            entity_name: "Entity".to_string(),
            unit: "Unit".to_string(),
            last: "Last".to_string(),
            min: "Min".to_string(),
            max: "Max".to_string(),
            avg: "Avg".to_string(),
        }
    }
}

impl ReportLabels {
    pub fn table_headers(&self) -> [String; 6] {
        [
            self.entity_name.clone(),
            self.unit.clone(),
            self.last.clone(),
            self.min.clone(),
            self.max.clone(),
            self.avg.clone(),
        ]
    }
}

/// Load `config/report.*`, overridden by `REPORT__SECTION__KEY` variables.
pub fn load_config() -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/report"))
        .add_source(config::Environment::with_prefix("REPORT").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_sections() {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(
                "[console]\nbase_url = \"http://localhost:9200/api/v1\"\n\n[labels]\ndevice = \"Cihaz\"\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();
        let config: AppConfig = settings.try_deserialize().unwrap();

        assert_eq!(config.console.page_size, 1000);
        assert_eq!(config.console.timeout_secs, 30);
        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!(config.report.file_prefix, "TelemetryReport");
        assert_eq!(config.labels.device, "Cihaz");
        assert_eq!(config.labels.dashboard, "Dashboard");
    }

    #[test]
    fn test_offset() {
        let settings = ReportSettings {
            utc_offset_minutes: 180,
            ..Default::default()
        };
        assert_eq!(settings.offset().local_minus_utc(), 3 * 3600);

        let broken = ReportSettings {
            utc_offset_minutes: 100_000,
            ..Default::default()
        };
        assert_eq!(broken.offset().local_minus_utc(), 0);
    }
}
