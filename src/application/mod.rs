// Application layer - Report generation use cases
pub mod console_api;
pub mod entity_resolution;
pub mod grouping;
pub mod report_error;
pub mod report_form;
pub mod report_service;
