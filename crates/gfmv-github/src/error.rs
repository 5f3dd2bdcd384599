//! Error types for markdown rendering.

use serde::Deserialize;

/// Error from a render request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    /// The service rejected the identifier/secret pair.
    #[error("GitHub rejected the credentials (HTTP {status}): {message}")]
    InvalidCredentials {
        /// HTTP status code.
        status: u16,
        /// Message reported by the service.
        message: String,
    },

    /// The service rejected the markdown body.
    #[error("GitHub rejected the markdown (HTTP {status}): {message}")]
    InvalidInput {
        /// HTTP status code.
        status: u16,
        /// Message reported by the service.
        message: String,
    },

    /// Transport failure, timeout, or an unexpected service response.
    #[error("GitHub is unreachable: {0}")]
    Unreachable(String),
}

/// Error body returned by the GitHub REST API.
#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

impl RenderError {
    /// Classify a non-success HTTP response.
    ///
    /// 401/403 are credential failures and 400/413/422 are input failures.
    /// Everything else, including 5xx, counts as the service being unreachable.
    pub(crate) fn from_status(status: u16, body: &str) -> Self {
        let message = api_message(body);
        match status {
            401 | 403 => Self::InvalidCredentials { status, message },
            400 | 413 | 422 => Self::InvalidInput { status, message },
            _ => Self::Unreachable(format!("HTTP {status}: {message}")),
        }
    }
}

/// Extract `message` from a JSON error body, falling back to the raw text.
fn api_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .map(|parsed| parsed.message)
        .unwrap_or_else(|_| body.trim().to_owned())
}

impl From<ureq::Error> for RenderError {
    fn from(err: ureq::Error) -> Self {
        Self::Unreachable(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_status_unauthorized() {
        let err = RenderError::from_status(
            401,
            r#"{"message":"Bad credentials","documentation_url":"https://docs.github.com/rest"}"#,
        );
        assert_eq!(
            err,
            RenderError::InvalidCredentials {
                status: 401,
                message: "Bad credentials".to_owned(),
            }
        );
    }

    #[test]
    fn test_from_status_forbidden_is_credentials() {
        let err = RenderError::from_status(403, "");
        assert!(matches!(
            err,
            RenderError::InvalidCredentials { status: 403, .. }
        ));
    }

    #[test]
    fn test_from_status_input_errors() {
        for status in [400, 413, 422] {
            let err = RenderError::from_status(status, r#"{"message":"Problems parsing JSON"}"#);
            assert_eq!(
                err,
                RenderError::InvalidInput {
                    status,
                    message: "Problems parsing JSON".to_owned(),
                }
            );
        }
    }

    #[test]
    fn test_from_status_server_error_is_unreachable() {
        let err = RenderError::from_status(503, "Service Unavailable\n");
        assert_eq!(
            err,
            RenderError::Unreachable("HTTP 503: Service Unavailable".to_owned())
        );
    }

    #[test]
    fn test_api_message_plain_text_body() {
        assert_eq!(api_message("  not json  "), "not json");
    }

    #[test]
    fn test_display_includes_status_and_message() {
        let err = RenderError::from_status(401, r#"{"message":"Bad credentials"}"#);
        assert_eq!(
            err.to_string(),
            "GitHub rejected the credentials (HTTP 401): Bad credentials"
        );
    }
}
