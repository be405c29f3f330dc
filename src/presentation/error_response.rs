// Mapping of report errors to HTTP responses
use crate::application::report_error::ReportError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

impl ReportError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ReportError::MissingDashboard | ReportError::MissingDateRange | ReportError::InvalidDateRange => {
                StatusCode::BAD_REQUEST
            }
            ReportError::DashboardNotFound => StatusCode::NOT_FOUND,
            ReportError::NoEntities | ReportError::NoDevices | ReportError::NoData => StatusCode::UNPROCESSABLE_ENTITY,
            ReportError::FetchDashboards(_) | ReportError::FetchEntities(_) | ReportError::FetchDevices(_) => {
                StatusCode::BAD_GATEWAY
            }
            ReportError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ReportError::GenerationFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ReportError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // The client redirects to login; there is nothing to show.
        if matches!(self, ReportError::Unauthenticated) {
            return status.into_response();
        }

        let message = match &self {
            ReportError::GenerationFailed(_) => "Report generation failed".to_string(),
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": {
                "code": status.as_u16(),
                "message_key": self.message_key(),
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::console_api::ApiError;

    #[test]
    fn test_status_codes() {
        assert_eq!(ReportError::MissingDashboard.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ReportError::NoData.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            ReportError::FetchDevices(ApiError::Authentication).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(ReportError::Unauthenticated.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_unauthenticated_has_empty_body() {
        let response = ReportError::Unauthenticated.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_error_body_carries_message_key() {
        let response = ReportError::NoDevices.into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["error"]["message_key"], "report.message.no_devices_in_dashboard");
        assert_eq!(value["error"]["code"], 422);
    }
}
