//! Session Commands
//!
//! Sign-in, password recovery and tenant resolution against the auth
//! provider. The signed-in session is kept in `localStorage` so a reload
//! does not log the user out.

use serde::Serialize;
use serde_json::json;

use super::client::{read_empty, read_json, single, Query, RestClient, TenantSession};
use crate::error::{ApiError, ApiResult};
use crate::models::AuthSession;

const SESSION_KEY: &str = "clinic-dashboard.session";

/// Refresh this long before the access token expires
const REFRESH_MARGIN_SECS: i64 = 120;

/// Path the password-recovery email links back to
pub const RESET_CONFIRM_PATH: &str = "/reset-password-confirm";

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(serde::Deserialize)]
struct ClinicUserRow {
    clinic_id: Option<String>,
}

// ========================
// Auth provider
// ========================

pub async fn sign_in(rest: &RestClient, email: &str, password: &str) -> ApiResult<AuthSession> {
    let url = rest.config().auth_url("token?grant_type=password");
    let req = rest
        .authorize(rest.http().post(url), None)
        .json(&Credentials { email: email.trim(), password });
    let session: AuthSession = read_json(req.send().await?).await?;
    log::info!("[AUTH] signed in as {}", session.user.email.as_deref().unwrap_or(&session.user.id));
    Ok(session.stamped(now_secs()))
}

/// Trade the refresh token for a new access token
pub async fn refresh_session(rest: &RestClient, refresh_token: &str) -> ApiResult<AuthSession> {
    let url = rest.config().auth_url("token?grant_type=refresh_token");
    let req = rest
        .authorize(rest.http().post(url), None)
        .json(&json!({ "refresh_token": refresh_token }));
    let session: AuthSession = read_json(req.send().await?).await?;
    log::info!("[AUTH] session refreshed");
    Ok(session.stamped(now_secs()))
}

/// Whether the access token is expired or about to be. A session without
/// a known expiry is taken at face value.
pub fn refresh_due(session: &AuthSession, now_secs: i64) -> bool {
    session
        .expires_at
        .is_some_and(|at| at - REFRESH_MARGIN_SECS <= now_secs)
}

/// Refresh the tenant's token when it is due; the clinic stays the same.
/// Returns `None` when nothing had to change.
pub async fn refresh_tenant(rest: &RestClient, tenant: &TenantSession) -> ApiResult<Option<TenantSession>> {
    if !refresh_due(&tenant.session, now_secs()) {
        return Ok(None);
    }
    let refresh_token = tenant.session.refresh_token.as_deref().ok_or(ApiError::NoSession)?;
    let session = refresh_session(rest, refresh_token).await?;
    save_session(&session);
    Ok(Some(TenantSession { session, clinic_id: tenant.clinic_id.clone() }))
}

/// Bring a stored session back: refresh it if its token has lapsed, then
/// resolve the clinic again.
pub async fn restore_session(rest: &RestClient, session: AuthSession) -> ApiResult<TenantSession> {
    let session = match session.refresh_token.as_deref() {
        Some(refresh_token) if refresh_due(&session, now_secs()) => {
            let fresh = refresh_session(rest, refresh_token).await?;
            save_session(&fresh);
            fresh
        }
        _ => session,
    };
    resolve_tenant(rest, session).await
}

/// Whether a failed refresh or restore means the user has to sign in again,
/// as opposed to a transient failure worth retrying
pub fn refresh_rejected(e: &ApiError) -> bool {
    matches!(e, ApiError::NoSession | ApiError::Backend { status: 400 | 401 | 403, .. })
}

fn now_secs() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Send a recovery email whose link lands on `redirect_to`
pub async fn request_password_reset(rest: &RestClient, email: &str, redirect_to: &str) -> ApiResult<()> {
    let url = format!(
        "{}?redirect_to={}",
        rest.config().auth_url("recover"),
        super::client::encode(redirect_to)
    );
    let req = rest.authorize(rest.http().post(url), None).json(&json!({ "email": email.trim() }));
    read_empty(req.send().await?).await
}

/// Set a new password using the access token carried by the recovery link
pub async fn update_password(rest: &RestClient, access_token: &str, password: &str) -> ApiResult<()> {
    let url = rest.config().auth_url("user");
    let req = rest
        .authorize(rest.http().put(url), Some(access_token))
        .json(&json!({ "password": password }));
    read_empty(req.send().await?).await
}

pub async fn sign_out(rest: &RestClient, access_token: &str) -> ApiResult<()> {
    let url = rest.config().auth_url("logout");
    let req = rest.authorize(rest.http().post(url), Some(access_token));
    read_empty(req.send().await?).await
}

/// Look up the clinic the user belongs to. Done once per session.
pub async fn resolve_tenant(rest: &RestClient, session: AuthSession) -> ApiResult<TenantSession> {
    if session.access_token.is_empty() || session.user.id.is_empty() {
        return Err(ApiError::NoSession);
    }
    let query = Query::table("clinic_users").select("clinic_id").eq("user_id", &session.user.id);
    let rows: Vec<ClinicUserRow> = rest.select(&session.access_token, &query).await?;
    let clinic_id = single(rows)
        .ok()
        .and_then(|row| row.clinic_id)
        .filter(|id| !id.is_empty())
        .ok_or(ApiError::NoTenant)?;
    log::info!("[AUTH] tenant {}", clinic_id);
    Ok(TenantSession { session, clinic_id })
}

// ========================
// Form checks
// ========================

/// Field errors for the login form, `None` when both fields are filled
pub fn check_login(email: &str, password: &str) -> (Option<&'static str>, Option<&'static str>) {
    let email_err = email.trim().is_empty().then_some("Email is required");
    let password_err = password.is_empty().then_some("Password is required");
    (email_err, password_err)
}

pub fn check_new_password(password: &str, confirm: &str) -> Result<(), ApiError> {
    if password.is_empty() || confirm.is_empty() {
        return Err(ApiError::Validation("Both password fields are required".to_string()));
    }
    if password != confirm {
        return Err(ApiError::Validation("Passwords do not match".to_string()));
    }
    Ok(())
}

/// Access token from a recovery link fragment (`#access_token=...&type=recovery`)
pub fn recovery_token(hash: &str) -> Option<String> {
    hash.trim_start_matches('#')
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "access_token")
        .map(|(_, value)| {
            percent_encoding::percent_decode_str(value)
                .decode_utf8_lossy()
                .into_owned()
        })
        .filter(|token| !token.is_empty())
}

// ========================
// Browser persistence
// ========================

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

pub fn save_session(session: &AuthSession) {
    let Some(storage) = local_storage() else { return };
    match serde_json::to_string(session) {
        Ok(raw) => {
            if storage.set_item(SESSION_KEY, &raw).is_err() {
                log::warn!("[AUTH] could not persist session");
            }
        }
        Err(e) => log::warn!("[AUTH] could not encode session: {}", e),
    }
}

pub fn load_session() -> Option<AuthSession> {
    let raw = local_storage()?.get_item(SESSION_KEY).ok().flatten()?;
    serde_json::from_str(&raw).ok()
}

pub fn clear_session() {
    if let Some(storage) = local_storage() {
        let _ = storage.remove_item(SESSION_KEY);
    }
}

/// Current URL fragment, including the leading `#`
pub fn location_hash() -> String {
    web_sys::window()
        .and_then(|w| w.location().hash().ok())
        .unwrap_or_default()
}

pub fn location_path() -> String {
    web_sys::window()
        .and_then(|w| w.location().pathname().ok())
        .unwrap_or_default()
}

pub fn location_origin() -> String {
    web_sys::window()
        .and_then(|w| w.location().origin().ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recovery_token() {
        let hash = "#access_token=eyJhbGciOi.abc&expires_in=3600&refresh_token=r1&token_type=bearer&type=recovery";
        assert_eq!(recovery_token(hash).as_deref(), Some("eyJhbGciOi.abc"));
        assert_eq!(recovery_token("#type=recovery"), None);
        assert_eq!(recovery_token("#access_token="), None);
        assert_eq!(recovery_token(""), None);
    }

    #[test]
    fn test_check_login() {
        assert_eq!(check_login("", ""), (Some("Email is required"), Some("Password is required")));
        assert_eq!(check_login("a@b.com", ""), (None, Some("Password is required")));
        assert_eq!(check_login("a@b.com", "secret"), (None, None));
    }

    #[test]
    fn test_check_new_password() {
        assert!(check_new_password("abc", "abc").is_ok());
        assert_eq!(
            check_new_password("abc", "abd").unwrap_err().to_string(),
            "Passwords do not match"
        );
        assert_eq!(
            check_new_password("", "abc").unwrap_err().to_string(),
            "Both password fields are required"
        );
    }

    #[test]
    fn test_session_decodes_auth_response() {
        let body = r#"{"access_token":"t","token_type":"bearer","expires_in":3600,"refresh_token":"r",
            "user":{"id":"u1","email":"staff@clinic.com","role":"authenticated"}}"#;
        let session: AuthSession = serde_json::from_str(body).unwrap();
        assert_eq!(session.user.id, "u1");
        assert_eq!(session.refresh_token.as_deref(), Some("r"));
        assert_eq!(session.expires_in, Some(3600));
        assert_eq!(session.stamped(1_000).expires_at, Some(4_600));
    }

    fn session_expiring_at(expires_at: Option<i64>) -> AuthSession {
        AuthSession {
            access_token: "t".to_string(),
            refresh_token: Some("r".to_string()),
            expires_in: Some(3600),
            expires_at,
            user: crate::models::AuthUser { id: "u1".to_string(), email: None },
        }
    }

    #[test]
    fn test_refresh_due() {
        let session = session_expiring_at(Some(10_000));
        assert!(!refresh_due(&session, 5_000));
        assert!(!refresh_due(&session, 10_000 - REFRESH_MARGIN_SECS - 1));
        assert!(refresh_due(&session, 10_000 - REFRESH_MARGIN_SECS));
        assert!(refresh_due(&session, 20_000));

        // Issued expiry is kept when the provider sent one
        let stamped = session_expiring_at(Some(10_000)).stamped(0);
        assert_eq!(stamped.expires_at, Some(10_000));

        // Older stored sessions carry no expiry
        assert!(!refresh_due(&session_expiring_at(None), i64::MAX));
    }

    #[test]
    fn test_refresh_rejected() {
        let invalid_grant = ApiError::from_response(400, r#"{"error":"invalid_grant","error_description":"Invalid Refresh Token: Already Used"}"#);
        assert!(refresh_rejected(&invalid_grant));
        assert!(refresh_rejected(&ApiError::from_response(401, "")));
        assert!(refresh_rejected(&ApiError::NoSession));

        assert!(!refresh_rejected(&ApiError::Http("network down".to_string())));
        assert!(!refresh_rejected(&ApiError::from_response(503, "")));
    }

    #[test]
    fn test_stored_session_without_expiry_still_loads() {
        let raw = r#"{"access_token":"t","refresh_token":"r","user":{"id":"u1","email":null}}"#;
        let session: AuthSession = serde_json::from_str(raw).unwrap();
        assert_eq!(session.expires_at, None);
        assert_eq!(session.stamped(1_000).expires_at, None);
    }
}
