// Report form state - dashboard selection, date range and generating flag
use crate::application::report_error::ReportError;
use crate::domain::dashboard::Dashboard;
use crate::domain::ids::DashboardId;
use crate::domain::telemetry::TimeRange;

/// A validated report request.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRequest {
    pub dashboard_id: DashboardId,
    pub range: TimeRange,
    pub report_title: String,
    pub company_name: String,
}

#[derive(Debug, Clone, Default)]
pub struct ReportForm {
    dashboard_id: Option<DashboardId>,
    dashboard_name: String,
    pub report_title: String,
    pub company_name: String,
    pub start_ms: Option<i64>,
    pub end_ms: Option<i64>,
    generating: bool,
}

impl ReportForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the selection and the dashboard name derived from it.
    /// Returns the selected dashboard when it is in `dashboards`.
    pub fn select_dashboard<'a>(
        &mut self,
        dashboard_id: Option<DashboardId>,
        dashboards: &'a [Dashboard],
    ) -> Option<&'a Dashboard> {
        let selected = dashboard_id
            .as_ref()
            .and_then(|id| dashboards.iter().find(|d| &d.id == id));

        self.dashboard_name = selected.map(|d| d.name.clone()).unwrap_or_default();
        self.dashboard_id = dashboard_id;
        selected
    }

    pub fn set_date_range(&mut self, start_ms: Option<i64>, end_ms: Option<i64>) {
        self.start_ms = start_ms;
        self.end_ms = end_ms;
    }

    pub fn dashboard_id(&self) -> Option<&DashboardId> {
        self.dashboard_id.as_ref()
    }

    pub fn dashboard_name(&self) -> &str {
        &self.dashboard_name
    }

    pub fn is_generating(&self) -> bool {
        self.generating
    }

    pub fn can_submit(&self) -> bool {
        self.dashboard_id.is_some() && !self.generating
    }

    pub fn validate(&self) -> Result<ReportRequest, ReportError> {
        let dashboard_id = self.dashboard_id.clone().ok_or(ReportError::MissingDashboard)?;
        let (Some(start_ms), Some(end_ms)) = (self.start_ms, self.end_ms) else {
            return Err(ReportError::MissingDateRange);
        };
        let range = TimeRange::new(start_ms, end_ms).ok_or(ReportError::InvalidDateRange)?;

        Ok(ReportRequest {
            dashboard_id,
            range,
            report_title: self.report_title.trim().to_string(),
            company_name: self.company_name.trim().to_string(),
        })
    }

    /// Mark the form as generating until the guard is dropped.
    pub fn begin_generation(&mut self) -> GenerationGuard<'_> {
        self.generating = true;
        GenerationGuard { form: self }
    }
}

pub struct GenerationGuard<'a> {
    form: &'a mut ReportForm,
}

impl GenerationGuard<'_> {
    pub fn form(&mut self) -> &mut ReportForm {
        &mut *self.form
    }
}

impl Drop for GenerationGuard<'_> {
    fn drop(&mut self) {
        self.form.generating = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dashboards() -> Vec<Dashboard> {
        vec![
            Dashboard::new(DashboardId::parse("1").unwrap(), "Greenhouse".to_string(), None),
            Dashboard::new(DashboardId::parse("2").unwrap(), "Cold room".to_string(), None),
        ]
    }

    #[test]
    fn test_clearing_selection_resets_name_and_disables_submit() {
        let list = dashboards();
        let mut form = ReportForm::new();
        assert!(!form.can_submit());

        let selected = form.select_dashboard(DashboardId::parse("2"), &list);
        assert_eq!(selected.map(|d| d.name.as_str()), Some("Cold room"));
        assert_eq!(form.dashboard_name(), "Cold room");
        assert!(form.can_submit());

        form.select_dashboard(None, &list);
        assert_eq!(form.dashboard_name(), "");
        assert!(!form.can_submit());
    }

    #[test]
    fn test_unknown_dashboard_has_empty_name() {
        let mut form = ReportForm::new();
        assert!(form.select_dashboard(DashboardId::parse("9"), &dashboards()).is_none());
        assert_eq!(form.dashboard_name(), "");
        assert!(form.can_submit());
    }

    #[test]
    fn test_validate() {
        let mut form = ReportForm::new();
        assert!(matches!(form.validate(), Err(ReportError::MissingDashboard)));

        form.select_dashboard(DashboardId::parse("1"), &dashboards());
        assert!(matches!(form.validate(), Err(ReportError::MissingDateRange)));

        form.set_date_range(Some(100), None);
        assert!(matches!(form.validate(), Err(ReportError::MissingDateRange)));

        form.set_date_range(Some(200), Some(100));
        assert!(matches!(form.validate(), Err(ReportError::InvalidDateRange)));

        form.set_date_range(Some(100), Some(200));
        form.report_title = "  Weekly  ".to_string();
        let request = form.validate().unwrap();
        assert_eq!(request.range, TimeRange::new(100, 200).unwrap());
        assert_eq!(request.report_title, "Weekly");
    }

    #[test]
    fn test_generation_guard_clears_flag() {
        let mut form = ReportForm::new();
        form.select_dashboard(DashboardId::parse("1"), &dashboards());
        {
            let mut guard = form.begin_generation();
            assert!(guard.form().is_generating());
            assert!(!guard.form().can_submit());
        }
        assert!(!form.is_generating());
        assert!(form.can_submit());
    }
}
