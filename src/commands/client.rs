//! REST Client
//!
//! Thin typed layer over the hosted data store (PostgREST), its auth
//! endpoints, and the channel control API. Every response goes through
//! [`read_json`] so failures reach callers as an [`ApiError`].

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::error::{ApiError, ApiResult};
use crate::models::{AuthSession, ClinicId};

/// Characters left as-is in filter values
const FILTER_VALUE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

// ========================
// Query builder
// ========================

/// PostgREST query against one table
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    table: String,
    params: Vec<(String, String)>,
}

impl Query {
    pub fn table(table: &str) -> Self {
        Self { table: table.to_string(), params: Vec::new() }
    }

    pub fn select(self, columns: &str) -> Self {
        self.param("select", columns.replace(' ', ""))
    }

    pub fn eq(self, column: &str, value: &str) -> Self {
        self.param(column, format!("eq.{}", encode(value)))
    }

    pub fn neq(self, column: &str, value: &str) -> Self {
        self.param(column, format!("neq.{}", encode(value)))
    }

    /// Inclusive row range, `range(0, 99)` yields the first 100 rows
    pub fn range(self, from: usize, to: usize) -> Self {
        let limit = to.saturating_sub(from) + 1;
        self.param("offset", from.to_string()).param("limit", limit.to_string())
    }

    pub fn on_conflict(self, columns: &str) -> Self {
        self.param("on_conflict", columns.to_string())
    }

    fn param(mut self, key: &str, value: String) -> Self {
        self.params.push((key.to_string(), value));
        self
    }

    pub fn url(&self, config: &AppConfig) -> String {
        let base = config.rest_url(&self.table);
        if self.params.is_empty() {
            return base;
        }
        let query: Vec<String> = self.params.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        format!("{}?{}", base, query.join("&"))
    }
}

pub fn encode(value: &str) -> String {
    utf8_percent_encode(value, FILTER_VALUE).to_string()
}

// ========================
// Client
// ========================

/// Unauthenticated client: knows the endpoints and the public key
#[derive(Clone, Debug)]
pub struct RestClient {
    http: reqwest::Client,
    config: AppConfig,
}

impl RestClient {
    pub fn new(config: AppConfig) -> Self {
        Self { http: reqwest::Client::new(), config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// `apikey` header plus the bearer credential (the user token when signed in)
    pub fn authorize(&self, req: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        let bearer = token.unwrap_or(&self.config.supabase_anon_key);
        req.header("apikey", &self.config.supabase_anon_key).bearer_auth(bearer)
    }

    pub async fn select<T: DeserializeOwned>(&self, token: &str, query: &Query) -> ApiResult<Vec<T>> {
        let req = self.authorize(self.http.get(query.url(&self.config)), Some(token));
        read_json(req.send().await?).await
    }

    /// PATCH rows matched by `query`, returning the updated rows
    pub async fn update<B, T>(&self, token: &str, query: &Query, body: &B) -> ApiResult<Vec<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let req = self
            .authorize(self.http.patch(query.url(&self.config)), Some(token))
            .header("Prefer", "return=representation")
            .json(body);
        read_json(req.send().await?).await
    }

    /// Insert-or-merge rows on the conflict key carried by `query`
    pub async fn upsert<B, T>(&self, token: &str, query: &Query, body: &B) -> ApiResult<Vec<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let req = self
            .authorize(self.http.post(query.url(&self.config)), Some(token))
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(body);
        read_json(req.send().await?).await
    }
}

/// Decode a success body or turn the error body into an [`ApiError`]
pub async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> ApiResult<T> {
    let status = resp.status();
    let body = resp.text().await?;
    if !status.is_success() {
        log::warn!("[API] {} {}", status.as_u16(), body);
        return Err(ApiError::from_response(status.as_u16(), &body));
    }
    // Some endpoints answer 2xx with an empty body
    let body = if body.trim().is_empty() { "null" } else { body.as_str() };
    Ok(serde_json::from_str(body)?)
}

/// Check status only; the body is discarded on success
pub async fn read_empty(resp: reqwest::Response) -> ApiResult<()> {
    let status = resp.status();
    if status.is_success() {
        return Ok(());
    }
    let body = resp.text().await.unwrap_or_default();
    Err(ApiError::from_response(status.as_u16(), &body))
}

/// Exactly one row, like `.single()` in the hosted client
pub fn single<T>(rows: Vec<T>) -> ApiResult<T> {
    let count = rows.len();
    let mut rows = rows.into_iter();
    match (rows.next(), count) {
        (Some(row), 1) => Ok(row),
        _ => Err(ApiError::Backend {
            status: 406,
            message: "JSON object requested, multiple (or no) rows returned".to_string(),
        }),
    }
}

// ========================
// Tenant scope
// ========================

/// Signed-in user bound to the clinic resolved for them at login
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenantSession {
    pub session: AuthSession,
    pub clinic_id: ClinicId,
}

/// Client carrying the caller's credential and tenant filter
#[derive(Clone, Debug)]
pub struct ScopedClient {
    rest: RestClient,
    tenant: TenantSession,
}

impl ScopedClient {
    pub fn new(config: AppConfig, tenant: TenantSession) -> Self {
        Self { rest: RestClient::new(config), tenant }
    }

    pub fn rest(&self) -> &RestClient {
        &self.rest
    }

    pub fn clinic_id(&self) -> &str {
        &self.tenant.clinic_id
    }

    pub fn token(&self) -> &str {
        &self.tenant.session.access_token
    }

    /// Query on `table` already filtered to this tenant
    pub fn scoped(&self, table: &str) -> Query {
        Query::table(table).eq("clinic_id", self.clinic_id())
    }
}
