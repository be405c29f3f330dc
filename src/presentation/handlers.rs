// HTTP request handlers
use crate::application::report_error::ReportError;
use crate::application::report_form::ReportForm;
use crate::domain::alarm::AlarmRulesPlaceholder;
use crate::domain::ids::{ApiKey, DashboardId};
use crate::presentation::app_state::AppState;
use axum::{
    extract::State,
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub struct GenerateReportBody {
    /// String or number; normalized before it reaches the form.
    #[serde(default)]
    pub dashboard_id: Option<serde_json::Value>,
    #[serde(default)]
    pub report_title: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub start_ms: Option<i64>,
    #[serde(default)]
    pub end_ms: Option<i64>,
}

impl GenerateReportBody {
    pub fn into_form(self) -> ReportForm {
        let dashboard_id = self.dashboard_id.as_ref().and_then(ApiKey::from_json).map(DashboardId);

        let mut form = ReportForm::new();
        form.select_dashboard(dashboard_id, &[]);
        form.report_title = self.report_title.unwrap_or_default();
        form.company_name = self.company_name.unwrap_or_default();
        form.set_date_range(self.start_ms, self.end_ms);
        form
    }
}

#[derive(Debug, Serialize)]
pub struct DashboardOption {
    pub dashboard_id: DashboardId,
    pub name: String,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Dashboards available for a report
pub async fn list_dashboards(State(state): State<Arc<AppState>>) -> Result<Json<Vec<DashboardOption>>, ReportError> {
    let dashboards = state
        .console
        .list_dashboards()
        .await
        .map_err(|e| ReportError::from_step(e, ReportError::FetchDashboards))?;

    Ok(Json(
        dashboards
            .into_iter()
            .map(|d| DashboardOption {
                dashboard_id: d.id,
                name: d.name,
            })
            .collect(),
    ))
}

/// Generate a report and return it as a PDF download
pub async fn generate_report(
    State(state): State<Arc<AppState>>,
    Json(body): Json<GenerateReportBody>,
) -> Result<Response, ReportError> {
    let mut form = body.into_form();
    let report = state.report_service.generate(&mut form).await?;

    let disposition = format!("attachment; filename=\"{}\"", report.file_name);
    let disposition = HeaderValue::from_str(&disposition).map_err(anyhow::Error::from)?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        report.content,
    )
        .into_response())
}

/// Alarm rules are not implemented yet
pub async fn alarm_rules() -> Json<AlarmRulesPlaceholder> {
    Json(AlarmRulesPlaceholder::default())
}
