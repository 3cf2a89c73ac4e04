use serde::Deserialize;
use thiserror::Error;

/// Body of a fallback message when an error response cannot be read.
pub const GENERIC_ERROR: &str = "An error occurred";

/// Everything that can go wrong talking to the assistant backend.
///
/// Callers that only need "it failed" use [`ApiError::user_message`]; the
/// variants exist for logging and tests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request never produced an HTTP response (DNS, refused, timeout).
    #[error("could not reach the assistant service: {0}")]
    Transport(String),

    /// The backend answered with a status outside 200-299.
    #[error("{message}")]
    Application { status: u16, message: String },

    /// A 2xx body that is not the expected shape.
    #[error("unexpected response from the assistant service: {0}")]
    MalformedResponse(String),
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

impl ApiError {
    pub(crate) fn transport(err: reqwest::Error) -> Self {
        let reason = if err.is_timeout() {
            "request timed out".to_string()
        } else if err.is_connect() {
            "connection failed".to_string()
        } else {
            err.to_string()
        };
        ApiError::Transport(reason)
    }

    /// Builds an application error from a non-success status and its body.
    /// A string `detail` wins; a readable body without one falls back to the
    /// status code; an unreadable body gets the generic message.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = match serde_json::from_str::<ErrorBody>(body) {
            Ok(ErrorBody {
                detail: Some(serde_json::Value::String(detail)),
            }) if !detail.is_empty() => detail,
            Ok(_) => format!("HTTP error! status: {}", status),
            Err(_) => GENERIC_ERROR.to_string(),
        };
        ApiError::Application { status, message }
    }

    pub fn user_message(&self) -> String {
        self.to_string()
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Application { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_is_used_as_message() {
        let err = ApiError::from_status(500, r#"{"detail": "Something broke"}"#);
        assert_eq!(
            err,
            ApiError::Application {
                status: 500,
                message: "Something broke".to_string()
            }
        );
        assert_eq!(err.user_message(), "Something broke");
    }

    #[test]
    fn test_missing_detail_uses_status() {
        let err = ApiError::from_status(404, r#"{"error": "nope"}"#);
        assert_eq!(err.user_message(), "HTTP error! status: 404");
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn test_structured_detail_uses_status() {
        let err = ApiError::from_status(422, r#"{"detail": [{"loc": ["body"], "msg": "field required"}]}"#);
        assert_eq!(err.user_message(), "HTTP error! status: 422");
    }

    #[test]
    fn test_unparseable_body_is_generic() {
        let err = ApiError::from_status(502, "<html>Bad Gateway</html>");
        assert_eq!(err.user_message(), GENERIC_ERROR);
    }
}
