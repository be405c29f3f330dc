// Console API trait for dashboard, entity, device and history access
use crate::domain::dashboard::{BoardDetail, Dashboard};
use crate::domain::entity::{Device, Entity};
use crate::domain::ids::{CanvasId, DeviceId, EntityId};
use crate::domain::telemetry::{Statistic, TimeRange};
use async_trait::async_trait;

/// Error code the console puts in a failure envelope when the session is gone.
pub const AUTHENTICATION_FAILED: &str = "authentication_failed";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("authentication failed")]
    Authentication,

    #[error("request rejected ({code}): {message}")]
    Rejected { code: String, message: String },

    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error(transparent)]
    Transport(#[from] anyhow::Error),
}

impl ApiError {
    pub fn is_authentication(&self) -> bool {
        matches!(self, ApiError::Authentication)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Entity search filter. Searches are always restricted to property entities.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityFilter {
    Ids(Vec<EntityId>),
    Device(DeviceId),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceFilter {
    /// `None` lists every device the caller can see.
    pub ids: Option<Vec<DeviceId>>,
}

impl DeviceFilter {
    pub fn all() -> Self {
        Self { ids: None }
    }

    pub fn by_ids(ids: Vec<DeviceId>) -> Self {
        Self { ids: Some(ids) }
    }
}

/// One-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page_number: u32,
    pub page_size: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total: u64,
}

#[async_trait]
pub trait ConsoleApi: Send + Sync {
    /// List dashboards visible to the caller
    async fn list_dashboards(&self) -> ApiResult<Vec<Dashboard>>;

    /// Get the board (canvas) behind a dashboard
    async fn get_board_detail(&self, canvas_id: &CanvasId) -> ApiResult<BoardDetail>;

    async fn search_entities(&self, filter: &EntityFilter, page: Pagination) -> ApiResult<Page<Entity>>;

    async fn list_devices(&self, filter: &DeviceFilter, page: Pagination) -> ApiResult<Page<Device>>;

    /// Aggregate of one entity over a closed interval; `None` when the
    /// backend has no value
    async fn get_aggregate(
        &self,
        entity_id: &EntityId,
        range: TimeRange,
        statistic: Statistic,
    ) -> ApiResult<Option<f64>>;
}
