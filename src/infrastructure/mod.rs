// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod console_client;
pub mod pdf_report;
