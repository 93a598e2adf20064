//! Backend Errors
//!
//! Every failure from the data store, the auth provider or the channel
//! control API is normalized here into a message the UI can show.

use serde_json::Value;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    #[error("No user session")]
    NoSession,
    #[error("No clinic is linked to this account")]
    NoTenant,
    #[error("{0}")]
    Http(String),
    #[error("{message}")]
    Backend { status: u16, message: String },
    #[error("Unexpected response: {0}")]
    Decode(String),
    #[error("{0}")]
    Validation(String),
}

impl ApiError {
    /// Session/tenant failures block every data operation
    pub fn is_session(&self) -> bool {
        matches!(self, ApiError::NoSession | ApiError::NoTenant)
    }

    /// The data store no longer accepts the user's access token
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, ApiError::Backend { status: 401, .. })
    }

    pub fn from_response(status: u16, body: &str) -> Self {
        ApiError::Backend { status, message: backend_message(status, body) }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Http(e.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Decode(e.to_string())
    }
}

/// Best available message from an error body.
/// Data store: `message`; control API: `detail`; auth: `error_description` / `msg`.
pub fn backend_message(status: u16, body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    parsed
        .as_ref()
        .and_then(|v| {
            ["message", "detail", "error_description", "msg", "error"]
                .iter()
                .find_map(|key| v.get(*key).and_then(Value::as_str))
        })
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP error! status: {}", status))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postgrest_message() {
        let body = r#"{"code":"PGRST116","details":"0 rows","hint":null,"message":"JSON object requested, multiple (or no) rows returned"}"#;
        assert_eq!(
            backend_message(406, body),
            "JSON object requested, multiple (or no) rows returned"
        );
    }

    #[test]
    fn test_control_api_detail() {
        assert_eq!(backend_message(400, r#"{"detail":"Instance already exists"}"#), "Instance already exists");
    }

    #[test]
    fn test_auth_error_description() {
        let body = r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#;
        assert_eq!(backend_message(400, body), "Invalid login credentials");
    }

    #[test]
    fn test_fallback_to_status() {
        assert_eq!(backend_message(502, "<html>Bad gateway</html>"), "HTTP error! status: 502");
        assert_eq!(backend_message(500, r#"{"message":""}"#), "HTTP error! status: 500");
    }

    #[test]
    fn test_display_is_the_message() {
        let err = ApiError::from_response(404, r#"{"message":"not found"}"#);
        assert_eq!(err.to_string(), "not found");
        assert!(!err.is_session());
        assert!(ApiError::NoTenant.is_session());
    }

    #[test]
    fn test_is_auth_expired() {
        let expired = ApiError::from_response(401, r#"{"code":"PGRST301","message":"JWT expired"}"#);
        assert!(expired.is_auth_expired());
        assert_eq!(expired.to_string(), "JWT expired");

        // Row-level security refusals are not a lapsed login
        assert!(!ApiError::from_response(403, r#"{"code":"42501","message":"permission denied"}"#).is_auth_expired());
        assert!(!ApiError::Http("offline".to_string()).is_auth_expired());
        assert!(!ApiError::NoSession.is_auth_expired());
    }
}
