// Report service - Use case for generating a telemetry PDF from a dashboard
use crate::application::console_api::{ApiResult, ConsoleApi, DeviceFilter, EntityFilter, Page, Pagination};
use crate::application::entity_resolution::{board_entity_ids, has_device_link, EntitySource, STRATEGIES};
use crate::application::grouping::{device_ids, group_by_device, non_empty_sections};
use crate::application::report_error::ReportError;
use crate::application::report_form::{ReportForm, ReportRequest};
use crate::domain::dashboard::BoardDetail;
use crate::domain::entity::{Device, Entity};
use crate::domain::ids::{DeviceId, EntityId};
use crate::domain::telemetry::{AggregateValues, DeviceSection, ReportRow, Statistic, TimeRange};
use crate::infrastructure::config::{ReportLabels, ReportSettings};
use crate::infrastructure::pdf_report::{build_telemetry_pdf, PdfReportOptions};
use anyhow::anyhow;
use bytes::Bytes;
use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use rand::Rng;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

const SUFFIX_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const SUFFIX_LEN: usize = 6;

/// A rendered report ready for download.
#[derive(Debug, Clone)]
pub struct GeneratedReport {
    pub file_name: String,
    pub content: Bytes,
    pub sections: Vec<DeviceSection>,
}

#[derive(Clone)]
pub struct ReportService {
    console: Arc<dyn ConsoleApi>,
    settings: ReportSettings,
    labels: ReportLabels,
    page_size: u32,
}

impl ReportService {
    pub fn new(console: Arc<dyn ConsoleApi>, settings: ReportSettings, labels: ReportLabels, page_size: u32) -> Self {
        Self {
            console,
            settings,
            labels,
            page_size: page_size.max(1),
        }
    }

    /// Validate the form and generate its report. The form's generating flag
    /// is set for the duration of the call and cleared on every exit path.
    pub async fn generate(&self, form: &mut ReportForm) -> Result<GeneratedReport, ReportError> {
        let request = form.validate()?;

        let mut guard = form.begin_generation();
        let result = self.run(guard.form(), &request).await;

        match &result {
            Ok(report) => tracing::info!(
                "Generated {} for dashboard {} ({} device sections)",
                report.file_name,
                request.dashboard_id,
                report.sections.len()
            ),
            Err(ReportError::Unauthenticated) => {
                tracing::debug!("Report for dashboard {} aborted: session expired", request.dashboard_id)
            }
            Err(e @ ReportError::GenerationFailed(_)) => {
                tracing::error!("PDF generation error for dashboard {}: {:#}", request.dashboard_id, e)
            }
            Err(e) => tracing::warn!("Report for dashboard {} not generated: {}", request.dashboard_id, e),
        }

        result
    }

    async fn run(&self, form: &mut ReportForm, request: &ReportRequest) -> Result<GeneratedReport, ReportError> {
        // 1. Dashboard and its board
        let dashboards = self
            .console
            .list_dashboards()
            .await
            .map_err(|e| ReportError::from_step(e, ReportError::FetchDashboards))?;
        let dashboard = form
            .select_dashboard(Some(request.dashboard_id.clone()), &dashboards)
            .cloned()
            .ok_or(ReportError::DashboardNotFound)?;

        let detail = self
            .console
            .get_board_detail(&dashboard.canvas_id())
            .await
            .map_err(|e| {
                tracing::warn!("Failed to fetch board {}: {}", dashboard.canvas_id(), e);
                ReportError::from_step(e, |_| ReportError::DashboardNotFound)
            })?;
        if detail.is_empty() {
            return Err(ReportError::NoEntities);
        }

        // 2. Entities with their owning devices
        let entities = self.resolve_entities(&detail).await?;
        let groups = group_by_device(&entities);
        if groups.is_empty() {
            return Err(ReportError::NoDevices);
        }

        // 3. Device names
        let devices = self.list_all_devices(&DeviceFilter::by_ids(device_ids(&groups))).await?;
        let device_names: HashMap<DeviceId, String> = devices.into_iter().map(|d| (d.id, d.name)).collect();

        // 4. Aggregates, one entity at a time
        let mut sections = Vec::with_capacity(groups.len());
        for group in &groups {
            let mut rows = Vec::with_capacity(group.entities.len());
            for entity in &group.entities {
                let values = self.fetch_aggregates(&entity.id, request.range).await;
                rows.push(ReportRow::new(
                    entity.name.clone(),
                    entity.unit.clone().unwrap_or_default(),
                    values,
                ));
            }

            let device_name = device_names
                .get(&group.device_id)
                .cloned()
                .unwrap_or_else(|| Device::placeholder_name(&group.device_id));
            sections.push(DeviceSection::new(device_name, rows));
        }

        let sections = non_empty_sections(sections);
        if sections.is_empty() {
            return Err(ReportError::NoData);
        }

        // 5. Document
        let dashboard_name = if form.dashboard_name().is_empty() {
            detail.name.clone().unwrap_or_default()
        } else {
            form.dashboard_name().to_string()
        };
        let offset = self.settings.offset();
        let now = Utc::now().with_timezone(&offset);
        let date_range = format_date_range(request.range, offset)?;
        let generated_at = now.format("%Y-%m-%d %H:%M:%S").to_string();

        let options = PdfReportOptions {
            title: &request.report_title,
            company_name: Some(&request.company_name),
            dashboard_name: Some(&dashboard_name),
            date_range: &date_range,
            sections: &sections,
            generated_at: &generated_at,
            labels: &self.labels,
        };
        let content = build_telemetry_pdf(&options)?;

        Ok(GeneratedReport {
            file_name: report_file_name(&self.settings.file_prefix, &now),
            content: Bytes::from(content),
            sections,
        })
    }

    /// Try each strategy in order, then fall back to scanning every device
    /// for the board's entities.
    async fn resolve_entities(&self, detail: &BoardDetail) -> Result<Vec<Entity>, ReportError> {
        for strategy in &STRATEGIES {
            let Some(source) = (strategy.source)(detail) else {
                continue;
            };

            let entities = self.load_source(source).await?;
            if has_device_link(&entities) {
                tracing::debug!("Resolved {} entities via {}", entities.len(), strategy.name);
                return Ok(entities);
            }
            tracing::debug!("Strategy {} found no device-linked entities", strategy.name);
        }

        let wanted = board_entity_ids(detail);
        if wanted.is_empty() {
            return Ok(Vec::new());
        }

        tracing::debug!("Scanning all devices for {} board entities", wanted.len());
        let devices = self.list_all_devices(&DeviceFilter::all()).await?;

        let mut found = Vec::new();
        for device in devices {
            let entities = self.search_all(EntityFilter::Device(device.id.clone())).await?;
            found.extend(
                attach_device(entities, &device.id)
                    .into_iter()
                    .filter(|e| wanted.contains(&e.id)),
            );
        }
        found.sort_by_key(|e| wanted.iter().position(|id| id == &e.id));

        Ok(found)
    }

    async fn load_source(&self, source: EntitySource) -> Result<Vec<Entity>, ReportError> {
        match source {
            EntitySource::Embedded(entities) => Ok(entities),
            EntitySource::ByIds(ids) => self.search_all(EntityFilter::Ids(ids)).await,
            EntitySource::ByDevices(device_ids) => {
                let mut entities = Vec::new();
                for device_id in device_ids {
                    let found = self.search_all(EntityFilter::Device(device_id.clone())).await?;
                    entities.extend(attach_device(found, &device_id));
                }
                Ok(entities)
            }
        }
    }

    async fn search_all(&self, filter: EntityFilter) -> Result<Vec<Entity>, ReportError> {
        let console = self.console.as_ref();
        let filter = &filter;
        collect_pages(self.page_size, move |page| console.search_entities(filter, page))
            .await
            .map_err(|e| ReportError::from_step(e, ReportError::FetchEntities))
    }

    async fn list_all_devices(&self, filter: &DeviceFilter) -> Result<Vec<Device>, ReportError> {
        let console = self.console.as_ref();
        collect_pages(self.page_size, move |page| console.list_devices(filter, page))
            .await
            .map_err(|e| ReportError::from_step(e, ReportError::FetchDevices))
    }

    /// Fetch the four statistics of one entity concurrently. A failed
    /// statistic is reported as not available.
    async fn fetch_aggregates(&self, entity_id: &EntityId, range: TimeRange) -> AggregateValues {
        let (last, min, max, avg) = futures::join!(
            self.fetch_aggregate(entity_id, range, Statistic::Last),
            self.fetch_aggregate(entity_id, range, Statistic::Min),
            self.fetch_aggregate(entity_id, range, Statistic::Max),
            self.fetch_aggregate(entity_id, range, Statistic::Avg),
        );

        AggregateValues { last, min, max, avg }
    }

    async fn fetch_aggregate(&self, entity_id: &EntityId, range: TimeRange, statistic: Statistic) -> Option<f64> {
        match self.console.get_aggregate(entity_id, range, statistic).await {
            Ok(value) => value.filter(|v| !v.is_nan()),
            Err(e) => {
                tracing::debug!("{} of entity {} unavailable: {}", statistic.as_str(), entity_id, e);
                None
            }
        }
    }
}

/// Follow search pages until `total` entries are collected or a page comes
/// back empty.
async fn collect_pages<T, F, Fut>(page_size: u32, mut fetch: F) -> ApiResult<Vec<T>>
where
    F: FnMut(Pagination) -> Fut,
    Fut: Future<Output = ApiResult<Page<T>>>,
{
    let mut collected = Vec::new();
    let mut page_number = 1;

    loop {
        let page = fetch(Pagination { page_number, page_size }).await?;

        let received = page.content.len();
        collected.extend(page.content);
        if received == 0 || collected.len() as u64 >= page.total {
            break;
        }
        page_number += 1;
    }

    Ok(collected)
}

fn attach_device(entities: Vec<Entity>, device_id: &DeviceId) -> Vec<Entity> {
    entities
        .into_iter()
        .map(|mut e| {
            if e.device_id.is_none() {
                e.device_id = Some(device_id.clone());
            }
            e
        })
        .collect()
}

fn format_date_range(range: TimeRange, offset: FixedOffset) -> Result<String, ReportError> {
    let day = |ms: i64| {
        offset
            .timestamp_millis_opt(ms)
            .single()
            .map(|t| t.format("%Y-%m-%d").to_string())
            .ok_or_else(|| anyhow!("timestamp {} is out of range", ms))
    };

    Ok(format!("{} – {}", day(range.start_ms)?, day(range.end_ms)?))
}

/// `<prefix>_<YYYY_MM_DD>_<6 random [a-z0-9]>.pdf`
pub fn report_file_name(prefix: &str, now: &DateTime<FixedOffset>) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| SUFFIX_CHARS[rng.gen_range(0..SUFFIX_CHARS.len())] as char)
        .collect();

    format!("{}_{}_{}.pdf", prefix, now.format("%Y_%m_%d"), suffix)
}
