//! WhatsApp Channel Commands
//!
//! Instances are listed from the data store; create/verify/delete go to
//! the control API with the user's bearer credential.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::client::{encode, read_json, ScopedClient};
use crate::error::{ApiError, ApiResult};
use crate::models::{InstanceKind, InstanceStatus, WhatsAppInstance};

const TABLE: &str = "clinic_instances";
const INSTANCE_COLUMNS: &str = "api_key,clinic_id,instance_name,phone_number,status,created_at,qr_code";

static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+55\d{2}9\d{8}$").expect("valid phone regex"));

pub const PHONE_FORMAT_ERROR: &str =
    "Phone number must be in the format +55DDD9NNNNNNNN (e.g. +5511999999999)";

// ========================
// Payloads
// ========================

/// Create-form state
#[derive(Debug, Clone, PartialEq)]
pub struct NewInstance {
    pub instance_name: String,
    pub phone_number: String,
    pub kind: InstanceKind,
}

impl NewInstance {
    /// Blank form with a generated instance name
    pub fn new(now_millis: i64) -> Self {
        Self {
            instance_name: default_instance_name(now_millis),
            phone_number: String::new(),
            kind: InstanceKind::default(),
        }
    }

    fn request(&self) -> CreateInstanceRequest<'_> {
        CreateInstanceRequest {
            instance_name: &self.instance_name,
            phone_number: self.phone_number.trim().replacen('+', "", 1),
            kind: self.kind,
        }
    }
}

#[derive(Debug, Serialize)]
struct CreateInstanceRequest<'a> {
    instance_name: &'a str,
    phone_number: String,
    #[serde(rename = "type")]
    kind: InstanceKind,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VerifyResult {
    pub api_key: String,
    pub status: InstanceStatus,
}

pub fn default_instance_name(now_millis: i64) -> String {
    format!("clinic_instance_{}", now_millis)
}

/// Brazilian mobile number: `+55`, two-digit area code, `9`, eight digits
pub fn validate_phone(phone: &str) -> ApiResult<()> {
    if PHONE_RE.is_match(phone.trim()) {
        Ok(())
    } else {
        Err(ApiError::Validation(PHONE_FORMAT_ERROR.to_string()))
    }
}

// ========================
// Polling helpers
// ========================

/// Instances still pairing that no verify/delete is currently touching
pub fn pollable(instances: &[WhatsAppInstance], busy: &HashSet<String>) -> Vec<String> {
    instances
        .iter()
        .filter(|inst| inst.status == InstanceStatus::Connecting)
        .filter(|inst| !busy.contains(&inst.api_key))
        .map(|inst| inst.api_key.clone())
        .collect()
}

/// Apply a verification result; returns false if the instance is gone
pub fn apply_verification(instances: &mut [WhatsAppInstance], result: &VerifyResult) -> bool {
    match instances.iter_mut().find(|inst| inst.api_key == result.api_key) {
        Some(inst) => {
            inst.status = result.status;
            true
        }
        None => false,
    }
}

// ========================
// API
// ========================

#[derive(Clone, Debug)]
pub struct ChannelApi {
    client: ScopedClient,
}

impl ChannelApi {
    pub fn new(client: ScopedClient) -> Self {
        Self { client }
    }

    fn control(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.bearer_auth(self.client.token())
            .header("ngrok-skip-browser-warning", "true")
    }

    pub async fn list_instances(&self) -> ApiResult<Vec<WhatsAppInstance>> {
        let query = self.client.scoped(TABLE).select(INSTANCE_COLUMNS);
        self.client.rest().select(self.client.token(), &query).await
    }

    pub async fn create_instance(&self, form: &NewInstance) -> ApiResult<()> {
        validate_phone(&form.phone_number)?;
        let rest = self.client.rest();
        let url = rest.config().api_url("/create-instance");
        let req = self.control(rest.http().post(url)).json(&form.request());
        let _: serde_json::Value = read_json(req.send().await?).await?;
        log::info!("[CHANNELS] created {}", form.instance_name);
        Ok(())
    }

    pub async fn verify_instance(&self, api_key: &str) -> ApiResult<VerifyResult> {
        let rest = self.client.rest();
        let url = rest.config().api_url("/verify-instance");
        let req = self.control(rest.http().post(url)).json(&json!({ "api_key": api_key }));
        let result: VerifyResult = read_json(req.send().await?).await?;
        log::debug!("[CHANNELS] {} is {:?}", api_key, result.status);
        Ok(result)
    }

    pub async fn delete_instance(&self, api_key: &str) -> ApiResult<()> {
        let rest = self.client.rest();
        let url = rest.config().api_url(&format!("/delete-instance/{}", encode(api_key)));
        let _: serde_json::Value = read_json(self.control(rest.http().delete(url)).send().await?).await?;
        log::info!("[CHANNELS] deleted {}", api_key);
        Ok(())
    }
}
