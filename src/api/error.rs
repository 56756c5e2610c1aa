use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Unauthorized - session may be expired")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Extract the human-readable message from an error body.
    /// The backend wraps errors as `{"message": "..."}`; anything else is
    /// passed through truncated.
    fn message_from_body(body: &str) -> String {
        #[derive(serde::Deserialize)]
        struct MessageBody {
            message: String,
        }

        if let Ok(parsed) = serde_json::from_str::<MessageBody>(body) {
            return parsed.message;
        }
        Self::truncate_body(body)
    }

    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            format!(
                "{}... (truncated, {} total bytes)",
                &body[..MAX_ERROR_BODY_LENGTH],
                body.len()
            )
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let message = Self::message_from_body(body);
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            403 => ApiError::AccessDenied(message),
            404 => ApiError::NotFound(message),
            409 => ApiError::Conflict(message),
            500..=599 => ApiError::ServerError(message),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, message)),
        }
    }

    /// True for the statuses that end the session (401/403 from any
    /// authenticated endpoint).
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ApiError::Unauthorized | ApiError::AccessDenied(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status_mapping() {
        assert!(matches!(
            ApiError::from_status(StatusCode::UNAUTHORIZED, ""),
            ApiError::Unauthorized
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::FORBIDDEN, ""),
            ApiError::AccessDenied(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::NOT_FOUND, ""),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::CONFLICT, ""),
            ApiError::Conflict(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, ""),
            ApiError::ServerError(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::IM_A_TEAPOT, ""),
            ApiError::InvalidResponse(_)
        ));
    }

    #[test]
    fn test_message_extracted_from_json_body() {
        let err = ApiError::from_status(
            StatusCode::CONFLICT,
            r#"{"message": "Recipe is already in your favorites"}"#,
        );
        match err {
            ApiError::Conflict(msg) => assert_eq!(msg, "Recipe is already in your favorites"),
            other => panic!("unexpected variant: {:?}", other),
        }
    }

    #[test]
    fn test_non_json_body_passed_through() {
        let err = ApiError::from_status(StatusCode::BAD_GATEWAY, "upstream down");
        match err {
            ApiError::ServerError(msg) => assert_eq!(msg, "upstream down"),
            other => panic!("unexpected variant: {:?}", other),
        }
    }

    #[test]
    fn test_is_auth_failure() {
        assert!(ApiError::Unauthorized.is_auth_failure());
        assert!(ApiError::AccessDenied(String::new()).is_auth_failure());
        assert!(!ApiError::NotFound(String::new()).is_auth_failure());
        assert!(!ApiError::Conflict(String::new()).is_auth_failure());
    }

    #[test]
    fn test_truncate_long_body() {
        let body = "x".repeat(600);
        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, &body);
        match err {
            ApiError::ServerError(msg) => {
                assert!(msg.contains("truncated"));
                assert!(msg.len() < body.len());
            }
            other => panic!("unexpected variant: {:?}", other),
        }
    }
}
