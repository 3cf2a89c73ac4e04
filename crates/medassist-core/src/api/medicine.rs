use serde::Deserialize;

use super::client::ApiClient;
use super::error::ApiError;
use crate::medicine::Medicine;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MedicineSearchResponse {
    pub results: Vec<Medicine>,
    #[serde(default)]
    pub disclaimer: Option<String>,
    #[serde(default)]
    pub query: Option<String>,
}

impl ApiClient {
    /// Server-side medicine lookup.
    pub async fn search_medicine(&self, query: &str) -> Result<MedicineSearchResponse, ApiError> {
        tracing::info!(query, "searching medicines remotely");
        let request = self.get("/medicine/search").query(&[("q", query)]);
        self.execute(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::test_server::serve_once;
    use crate::api::client::DEFAULT_TIMEOUT;

    #[tokio::test]
    async fn test_search_sends_query_parameter() {
        let (base, server) = serve_once(
            200,
            r#"{"results": [{"name": "Aspirin", "usage": "Pain relief", "precautions": ["May increase risk of bleeding"]}], "disclaimer": "Educational only.", "query": "aspirin"}"#,
        )
        .await;
        let client = ApiClient::new(&base, DEFAULT_TIMEOUT).unwrap();

        let found = client.search_medicine("aspirin tablets").await.unwrap();
        assert_eq!(found.results.len(), 1);
        assert_eq!(found.results[0].name, "Aspirin");
        assert_eq!(found.results[0].precautions.len(), 1);
        assert_eq!(found.query.as_deref(), Some("aspirin"));

        let captured = server.await.unwrap();
        assert!(captured.head.starts_with("GET /medicine/search?q=aspirin+tablets "));
    }
}
