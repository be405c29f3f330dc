// Domain layer - Report data model
pub mod alarm;
pub mod dashboard;
pub mod entity;
pub mod ids;
pub mod telemetry;
