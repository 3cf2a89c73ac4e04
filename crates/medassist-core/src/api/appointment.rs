use serde::Deserialize;

use super::client::ApiClient;
use super::error::ApiError;
use crate::appointment::AppointmentRequest;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AppointmentResponse {
    pub message: String,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub disclaimer: Option<String>,
}

impl ApiClient {
    pub async fn request_appointment(
        &self,
        request: &AppointmentRequest,
    ) -> Result<AppointmentResponse, ApiError> {
        tracing::info!(category = %request.category, date = %request.preferred_date, "submitting appointment request");
        self.execute(self.post("/appointment/request").json(request)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::test_server::serve_once;
    use crate::api::client::DEFAULT_TIMEOUT;
    use chrono::NaiveDate;

    fn request() -> AppointmentRequest {
        AppointmentRequest {
            name: "Jane Doe".to_string(),
            email: "jane.doe@example.com".to_string(),
            phone: "+1-555-123-4567".to_string(),
            category: "Dermatologist".to_string(),
            preferred_date: NaiveDate::from_ymd_opt(2030, 1, 12).unwrap(),
            preferred_time: Some("10:00".to_string()),
            reason: None,
        }
    }

    #[tokio::test]
    async fn test_request_appointment() {
        let (base, server) = serve_once(
            200,
            r#"{"message": "Your appointment request has been recorded.", "note": "This does not confirm a booking.", "disclaimer": "Call emergency services for urgent concerns."}"#,
        )
        .await;
        let client = ApiClient::new(&base, DEFAULT_TIMEOUT).unwrap();

        let response = client.request_appointment(&request()).await.unwrap();
        assert_eq!(response.message, "Your appointment request has been recorded.");

        let captured = server.await.unwrap();
        assert!(captured.head.starts_with("POST /appointment/request "));
        let sent: serde_json::Value = serde_json::from_str(&captured.body).unwrap();
        assert_eq!(sent["preferred_date"], "2030-01-12");
        assert_eq!(sent["category"], "Dermatologist");
        assert!(sent.get("reason").is_none());
    }

    #[tokio::test]
    async fn test_past_date_rejected_by_backend() {
        let (base, _server) =
            serve_once(400, r#"{"detail": "Preferred date cannot be in the past."}"#).await;
        let client = ApiClient::new(&base, DEFAULT_TIMEOUT).unwrap();

        let err = client.request_appointment(&request()).await.unwrap_err();
        assert_eq!(err.user_message(), "Preferred date cannot be in the past.");
    }
}
