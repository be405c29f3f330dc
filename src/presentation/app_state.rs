// Application state for HTTP handlers
use crate::application::console_api::ConsoleApi;
use crate::application::report_service::ReportService;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub console: Arc<dyn ConsoleApi>,
    pub report_service: ReportService,
}
