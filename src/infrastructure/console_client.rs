// Console REST client - ConsoleApi implementation over reqwest
use crate::application::console_api::{
    ApiError, ApiResult, AUTHENTICATION_FAILED, ConsoleApi, DeviceFilter, EntityFilter, Page, Pagination,
};
use crate::domain::dashboard::{BoardDetail, Dashboard};
use crate::domain::entity::{Device, Entity};
use crate::domain::ids::{lenient_id, lenient_id_list, CanvasId, DashboardId, DeviceId, EntityId};
use crate::domain::telemetry::{parse_aggregate, Statistic, TimeRange};
use crate::infrastructure::config::ConsoleSettings;
use anyhow::Context;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

const SUCCESS: &str = "Success";
const PROPERTY_ENTITY_TYPE: &str = "PROPERTY";

#[derive(Debug, Clone)]
pub struct ConsoleClient {
    client: reqwest::Client,
    base_url: String,
    access_token: String,
}

/// Response envelope wrapped around every console payload.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    status: Option<String>,
    #[serde(default)]
    request_id: Option<String>,
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    error_message: Option<String>,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct DashboardRecord {
    dashboard_id: DashboardId,
    name: String,
    #[serde(default, deserialize_with = "lenient_id")]
    main_canvas_id: Option<CanvasId>,
}

#[derive(Debug, Deserialize)]
struct CanvasRecord {
    #[serde(default)]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient_id_list")]
    entity_ids: Option<Vec<EntityId>>,
    #[serde(default, deserialize_with = "valid_records")]
    entities: Vec<EntityRecord>,
    #[serde(default)]
    widgets: Option<Vec<Value>>,
    #[serde(default, deserialize_with = "lenient_id_list")]
    device_ids: Option<Vec<DeviceId>>,
}

#[derive(Debug, Deserialize)]
struct EntityRecord {
    entity_id: EntityId,
    #[serde(default)]
    entity_key: String,
    #[serde(default)]
    entity_name: String,
    #[serde(default, deserialize_with = "lenient_id")]
    device_id: Option<DeviceId>,
    #[serde(default)]
    entity_value_attribute: Option<ValueAttribute>,
}

#[derive(Debug, Deserialize)]
struct ValueAttribute {
    #[serde(default)]
    unit: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
struct PageRecord<T> {
    #[serde(default = "Vec::new", deserialize_with = "valid_records")]
    content: Vec<T>,
    #[serde(default)]
    total: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct DeviceRecord {
    id: DeviceId,
    name: String,
}

#[derive(Debug, Deserialize)]
struct AggregateRecord {
    #[serde(default)]
    value: Value,
}

/// Decode a record list, skipping records the backend sent without a usable
/// id instead of failing the whole payload.
fn valid_records<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: DeserializeOwned,
{
    let values = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(values
        .into_iter()
        .filter_map(|value| match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::debug!("Skipping malformed console record: {}", e);
                None
            }
        })
        .collect())
}

impl From<EntityRecord> for Entity {
    fn from(record: EntityRecord) -> Self {
        Entity {
            id: record.entity_id,
            key: record.entity_key,
            name: record.entity_name,
            device_id: record.device_id,
            unit: record
                .entity_value_attribute
                .and_then(|a| a.unit)
                .filter(|u| !u.trim().is_empty()),
        }
    }
}

impl ConsoleClient {
    pub fn new(settings: &ConsoleSettings) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .context("Failed to build console HTTP client")?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            access_token: settings.access_token.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<Option<T>> {
        let request = self.client.get(self.url(path));
        self.execute(request).await
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, body: &Value) -> ApiResult<Option<T>> {
        let request = self.client.post(self.url(path)).json(body);
        self.execute(request).await
    }

    async fn execute<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> ApiResult<Option<T>> {
        let response = request
            .bearer_auth(&self.access_token)
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to send request to console")?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Authentication);
        }

        let body = response.text().await.context("Failed to read console response")?;
        decode_envelope(status, &body)
    }
}

/// Unwrap a console envelope, classifying failures.
fn decode_envelope<T: DeserializeOwned>(status: StatusCode, body: &str) -> ApiResult<Option<T>> {
    let envelope: Envelope<T> = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(_) if !status.is_success() => {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: body.to_string(),
            });
        }
        Err(e) => return Err(ApiError::Transport(anyhow::Error::new(e).context("Failed to parse console response"))),
    };

    if envelope.error_code.as_deref() == Some(AUTHENTICATION_FAILED) {
        return Err(ApiError::Authentication);
    }

    if envelope.status.as_deref() != Some(SUCCESS) || !status.is_success() {
        tracing::debug!(
            "Console request {} failed with status {}",
            envelope.request_id.as_deref().unwrap_or("-"),
            status
        );
        return Err(ApiError::Rejected {
            code: envelope.error_code.unwrap_or_else(|| status.as_u16().to_string()),
            message: envelope.error_message.unwrap_or_default(),
        });
    }

    Ok(envelope.data)
}

fn entity_filter_body(filter: &EntityFilter) -> Value {
    let type_filter = json!({ "operator": "ANY_EQUALS", "values": [PROPERTY_ENTITY_TYPE] });
    match filter {
        EntityFilter::Ids(ids) => json!({
            "ENTITY_ID": { "operator": "ANY_EQUALS", "values": ids },
            "ENTITY_TYPE": type_filter,
        }),
        EntityFilter::Device(device_id) => json!({
            "DEVICE_ID": { "operator": "ANY_EQUALS", "values": [device_id] },
            "ENTITY_TYPE": type_filter,
        }),
    }
}

#[async_trait]
impl ConsoleApi for ConsoleClient {
    async fn list_dashboards(&self) -> ApiResult<Vec<Dashboard>> {
        let records: Vec<DashboardRecord> = self
            .post("/dashboard/search", &json!({ "name": "" }))
            .await?
            .unwrap_or_default();

        Ok(records
            .into_iter()
            .map(|r| Dashboard::new(r.dashboard_id, r.name, r.main_canvas_id))
            .collect())
    }

    async fn get_board_detail(&self, canvas_id: &CanvasId) -> ApiResult<BoardDetail> {
        let path = format!("/canvas/{}", urlencoding::encode(canvas_id.as_str()));
        let Some(record) = self.get::<CanvasRecord>(&path).await? else {
            return Ok(BoardDetail::default());
        };

        Ok(BoardDetail {
            name: record.name,
            entity_ids: record.entity_ids.unwrap_or_default(),
            entities: record
                .entities
                .into_iter()
                .map(Entity::from)
                .collect(),
            widgets: record.widgets.unwrap_or_default(),
            device_ids: record.device_ids.unwrap_or_default(),
        })
    }

    async fn search_entities(&self, filter: &EntityFilter, page: Pagination) -> ApiResult<Page<Entity>> {
        let body = json!({
            "page_size": page.page_size,
            "page_number": page.page_number,
            "sorts": [{ "direction": "ASC", "property": "key" }],
            "entity_filter": entity_filter_body(filter),
        });

        let record: PageRecord<EntityRecord> = self
            .post("/entity/advanced-search", &body)
            .await?
            .ok_or_else(|| ApiError::Transport(anyhow::anyhow!("Entity search returned no data")))?;

        let content: Vec<Entity> = record.content.into_iter().map(Entity::from).collect();
        let total = record.total.unwrap_or(content.len() as u64);
        Ok(Page { content, total })
    }

    async fn list_devices(&self, filter: &DeviceFilter, page: Pagination) -> ApiResult<Page<Device>> {
        let mut body = json!({ "page_size": page.page_size, "page_number": page.page_number });
        if let Some(ids) = &filter.ids {
            body["id_list"] = json!(ids);
        }

        let record: PageRecord<DeviceRecord> = self
            .post("/device/search", &body)
            .await?
            .ok_or_else(|| ApiError::Transport(anyhow::anyhow!("Device search returned no data")))?;

        let content: Vec<Device> = record
            .content
            .into_iter()
            .map(|d| Device::new(d.id, d.name))
            .collect();
        let total = record.total.unwrap_or(content.len() as u64);
        Ok(Page { content, total })
    }

    async fn get_aggregate(
        &self,
        entity_id: &EntityId,
        range: TimeRange,
        statistic: Statistic,
    ) -> ApiResult<Option<f64>> {
        let body = json!({
            "entity_id": entity_id,
            "start_timestamp": range.start_ms,
            "end_timestamp": range.end_ms,
            "aggregate_type": statistic.as_str(),
        });

        let record: Option<AggregateRecord> = self.post("/entity/history/aggregate", &body).await?;
        Ok(record.and_then(|r| parse_aggregate(&r.value)))
    }
}
