use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::client::ApiClient;
use super::error::ApiError;

#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<&'a str>,
}

impl<'a> ChatRequest<'a> {
    /// An empty id counts as no id at all.
    pub fn new(message: &'a str, conversation_id: Option<&'a str>) -> Self {
        Self {
            message,
            conversation_id: conversation_id.filter(|id| !id.is_empty()),
        }
    }
}

/// A successful assistant reply.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatReply {
    pub response: String,
    #[serde(default)]
    pub disclaimer: Option<String>,
    #[serde(default)]
    pub conversation_id: Option<String>,
}

/// One request/response exchange per user turn.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn send_message(
        &self,
        message: &str,
        conversation_id: Option<&str>,
    ) -> Result<ChatReply, ApiError>;
}

#[async_trait]
impl ChatBackend for ApiClient {
    async fn send_message(
        &self,
        message: &str,
        conversation_id: Option<&str>,
    ) -> Result<ChatReply, ApiError> {
        let request = ChatRequest::new(message, conversation_id);
        tracing::info!(
            conversation_id = request.conversation_id.unwrap_or("-"),
            chars = message.chars().count(),
            "sending chat message"
        );
        self.execute(self.post("/chat").json(&request)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::test_server::serve_once;
    use crate::api::client::DEFAULT_TIMEOUT;
    use serde_json::json;

    #[test]
    fn test_request_omits_missing_conversation_id() {
        let body = serde_json::to_value(ChatRequest::new("I have a headache", None)).unwrap();
        assert_eq!(body, json!({"message": "I have a headache"}));

        let body = serde_json::to_value(ChatRequest::new("hello", Some(""))).unwrap();
        assert_eq!(body, json!({"message": "hello"}));
    }

    #[test]
    fn test_request_includes_known_conversation_id() {
        let body = serde_json::to_value(ChatRequest::new("again", Some("abc"))).unwrap();
        assert_eq!(body, json!({"message": "again", "conversation_id": "abc"}));
    }

    #[test]
    fn test_reply_optional_fields() {
        let reply: ChatReply = serde_json::from_str(r#"{"response": "ok"}"#).unwrap();
        assert_eq!(reply.response, "ok");
        assert!(reply.disclaimer.is_none());
        assert!(reply.conversation_id.is_none());
    }

    #[tokio::test]
    async fn test_send_message_over_http() {
        let (base, server) = serve_once(
            200,
            r#"{"response": "Try rest and hydration.", "disclaimer": "Consult a doctor if symptoms persist.", "conversation_id": "c1"}"#,
        )
        .await;
        let client = ApiClient::new(&base, DEFAULT_TIMEOUT).unwrap();

        let reply = client.send_message("I have a headache", None).await.unwrap();
        assert_eq!(reply.response, "Try rest and hydration.");
        assert_eq!(reply.conversation_id.as_deref(), Some("c1"));

        let captured = server.await.unwrap();
        assert!(captured.head.starts_with("POST /chat "));
        let sent: serde_json::Value = serde_json::from_str(&captured.body).unwrap();
        assert_eq!(sent, json!({"message": "I have a headache"}));
    }

    #[tokio::test]
    async fn test_error_status_uses_detail() {
        let (base, _server) = serve_once(
            500,
            r#"{"detail": "An error occurred while processing your request. Please try again."}"#,
        )
        .await;
        let client = ApiClient::new(&base, DEFAULT_TIMEOUT).unwrap();

        let err = client.send_message("hi", Some("abc")).await.unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert_eq!(
            err.user_message(),
            "An error occurred while processing your request. Please try again."
        );
    }

    #[tokio::test]
    async fn test_reply_without_response_is_malformed() {
        let (base, _server) = serve_once(200, r#"{"answer": "hello"}"#).await;
        let client = ApiClient::new(&base, DEFAULT_TIMEOUT).unwrap();

        let err = client.send_message("hi", None).await.unwrap_err();
        assert!(matches!(err, ApiError::MalformedResponse(_)));
    }
}
