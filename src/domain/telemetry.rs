// Telemetry report domain models

/// Placeholder rendered for values that are missing or not a number.
pub const NOT_AVAILABLE: &str = "—";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Statistic {
    Last,
    Min,
    Max,
    Avg,
}

impl Statistic {
    /// Wire name of the aggregate type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Statistic::Last => "LAST",
            Statistic::Min => "MIN",
            Statistic::Max => "MAX",
            Statistic::Avg => "AVG",
        }
    }
}

/// Closed interval in epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start_ms: i64,
    pub end_ms: i64,
}

impl TimeRange {
    /// Returns `None` when the interval is reversed.
    pub fn new(start_ms: i64, end_ms: i64) -> Option<Self> {
        (start_ms <= end_ms).then_some(Self { start_ms, end_ms })
    }
}

/// The four aggregates of one entity; `None` means "not available".
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AggregateValues {
    pub last: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub avg: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub entity_name: String,
    pub unit: String,
    pub values: AggregateValues,
}

impl ReportRow {
    pub fn new(entity_name: String, unit: String, values: AggregateValues) -> Self {
        Self {
            entity_name,
            unit,
            values,
        }
    }

    /// Table cells in column order: name, unit, last, min, max, avg.
    pub fn cells(&self) -> [String; 6] {
        [
            self.entity_name.clone(),
            format_text(&self.unit),
            format_value(self.values.last),
            format_value(self.values.min),
            format_value(self.values.max),
            format_value(self.values.avg),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeviceSection {
    pub device_name: String,
    pub rows: Vec<ReportRow>,
}

impl DeviceSection {
    pub fn new(device_name: String, rows: Vec<ReportRow>) -> Self {
        Self { device_name, rows }
    }
}

/// Literal form of a statistic; missing and non-finite values become the
/// placeholder.
pub fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => v.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

pub fn format_text(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Parse an aggregate value that may arrive as a JSON number or a numeric
/// string.
pub fn parse_aggregate(value: &serde_json::Value) -> Option<f64> {
    let parsed = match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| !v.is_nan())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(Some(f64::NAN)), "—");
        assert_eq!(format_value(Some(42.0)), "42");
        assert_eq!(format_value(Some(21.75)), "21.75");
        assert_eq!(format_value(Some(-3.0)), "-3");
        assert_eq!(format_value(Some(f64::INFINITY)), "—");
        assert_eq!(format_value(None), "—");
    }

    #[test]
    fn test_format_text() {
        assert_eq!(format_text(""), "—");
        assert_eq!(format_text("  "), "—");
        assert_eq!(format_text("°C"), "°C");
    }

    #[test]
    fn test_parse_aggregate() {
        assert_eq!(parse_aggregate(&json!(10)), Some(10.0));
        assert_eq!(parse_aggregate(&json!("12.5")), Some(12.5));
        assert_eq!(parse_aggregate(&json!("")), None);
        assert_eq!(parse_aggregate(&json!("n/a")), None);
        assert_eq!(parse_aggregate(&json!(null)), None);
        assert_eq!(parse_aggregate(&json!({"v": 1})), None);
    }

    #[test]
    fn test_row_cells() {
        let row = ReportRow::new(
            "Temperature".to_string(),
            String::new(),
            AggregateValues {
                last: Some(10.0),
                ..Default::default()
            },
        );
        assert_eq!(row.cells(), ["Temperature", "—", "10", "—", "—", "—"].map(String::from));
    }

    #[test]
    fn test_time_range_rejects_reversed_interval() {
        assert!(TimeRange::new(10, 5).is_none());
        assert_eq!(TimeRange::new(5, 5).unwrap().end_ms, 5);
    }
}
