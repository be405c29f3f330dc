// Report generation errors
use crate::application::console_api::ApiError;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Select a dashboard")]
    MissingDashboard,

    #[error("Select a date range")]
    MissingDateRange,

    #[error("The start of the date range is after its end")]
    InvalidDateRange,

    #[error("Failed to fetch dashboards: {0}")]
    FetchDashboards(#[source] ApiError),

    #[error("Dashboard not found")]
    DashboardNotFound,

    #[error("The dashboard has no entities")]
    NoEntities,

    #[error("Failed to fetch entities: {0}")]
    FetchEntities(#[source] ApiError),

    #[error("The dashboard has no devices")]
    NoDevices,

    #[error("Failed to fetch devices: {0}")]
    FetchDevices(#[source] ApiError),

    #[error("No data in the selected range")]
    NoData,

    /// The console session is gone; the caller re-authenticates.
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Report generation failed: {0}")]
    GenerationFailed(#[from] anyhow::Error),
}

impl ReportError {
    /// Stable key a front-end can localize.
    pub fn message_key(&self) -> &'static str {
        match self {
            ReportError::MissingDashboard => "report.message.select_dashboard",
            ReportError::MissingDateRange => "report.message.select_date_range",
            ReportError::InvalidDateRange => "report.message.invalid_date_range",
            ReportError::FetchDashboards(_) => "report.message.failed_to_fetch_dashboards",
            ReportError::DashboardNotFound => "report.message.dashboard_not_found",
            ReportError::NoEntities => "report.message.no_entities_in_dashboard",
            ReportError::FetchEntities(_) => "report.message.failed_to_fetch_entities",
            ReportError::NoDevices => "report.message.no_devices_in_dashboard",
            ReportError::FetchDevices(_) => "report.message.failed_to_fetch_devices",
            ReportError::NoData => "report.message.no_data_in_range",
            ReportError::Unauthenticated => "report.message.authentication_required",
            ReportError::GenerationFailed(_) => "report.message.generate_failed",
        }
    }

    /// Wrap a step failure, turning authentication failures into a silent abort.
    pub fn from_step(err: ApiError, wrap: fn(ApiError) -> ReportError) -> Self {
        if err.is_authentication() {
            ReportError::Unauthenticated
        } else {
            wrap(err)
        }
    }
}
