//! Clinic Profile Commands
//!
//! The clinic row and its automation agent prompts are loaded and saved
//! together.

use super::client::{single, Query, ScopedClient};
use crate::error::ApiResult;
use crate::models::{AgentPrompt, ClinicProfile};

const CLINICS: &str = "clinics";
const PROMPTS: &str = "agent_prompts";

/// Agent names and whether each is on when no prompt says otherwise
pub const AGENT_DEFAULTS: [(&str, bool); 6] = [
    ("Attendance Agent", true),
    ("Scheduling Agent", true),
    ("Payment Agent", false),
    ("Reminder Agent", true),
    ("Initial Message", true),
    ("Offered Services", true),
];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileBundle {
    pub profile: ClinicProfile,
    pub prompts: Vec<AgentPrompt>,
}

/// Whether the named agent is enabled, falling back to its default
pub fn agent_enabled(prompts: &[AgentPrompt], name: &str) -> bool {
    prompts
        .iter()
        .find(|p| p.name == name)
        .map(|p| p.enabled)
        .or_else(|| AGENT_DEFAULTS.iter().find(|(n, _)| *n == name).map(|(_, on)| *on))
        .unwrap_or(false)
}

/// Ids the store did not assign (not UUIDs) are dropped so it assigns new ones
pub fn clean_prompts(prompts: &[AgentPrompt], clinic_id: &str) -> Vec<AgentPrompt> {
    prompts
        .iter()
        .cloned()
        .map(|mut p| {
            p.id = p.id.filter(|id| uuid::Uuid::parse_str(id).is_ok());
            p.clinic_id = Some(clinic_id.to_string());
            p
        })
        .collect()
}

pub async fn fetch_profile(client: &ScopedClient) -> ApiResult<ProfileBundle> {
    let rest = client.rest();
    let profile_query = client.scoped(CLINICS).select("*");
    let profile: ClinicProfile = single(rest.select(client.token(), &profile_query).await?)?;
    let prompts_query = client.scoped(PROMPTS).select("*");
    let prompts: Vec<AgentPrompt> = rest.select(client.token(), &prompts_query).await?;
    Ok(ProfileBundle { profile, prompts })
}

pub async fn save_profile(client: &ScopedClient, bundle: &ProfileBundle) -> ApiResult<ProfileBundle> {
    let rest = client.rest();
    let clinic_id = client.clinic_id();

    let mut profile = bundle.profile.clone();
    profile.clinic_id = clinic_id.to_string();
    let query = Query::table(CLINICS).on_conflict("clinic_id");
    let saved: ClinicProfile = single(rest.upsert(client.token(), &query, &[profile]).await?)?;

    // Bulk writes need one key set per request
    let (existing, fresh): (Vec<_>, Vec<_>) = clean_prompts(&bundle.prompts, clinic_id)
        .into_iter()
        .partition(|p| p.id.is_some());
    let mut prompts = Vec::with_capacity(existing.len() + fresh.len());
    if !existing.is_empty() {
        let query = Query::table(PROMPTS).on_conflict("id");
        let rows: Vec<AgentPrompt> = rest.upsert(client.token(), &query, &existing).await?;
        prompts.extend(rows);
    }
    if !fresh.is_empty() {
        let rows: Vec<AgentPrompt> = rest.upsert(client.token(), &Query::table(PROMPTS), &fresh).await?;
        prompts.extend(rows);
    }
    log::info!("[PROFILE] saved clinic {} with {} prompts", clinic_id, prompts.len());
    Ok(ProfileBundle { profile: saved, prompts })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompt(id: Option<&str>, name: &str, enabled: bool) -> AgentPrompt {
        AgentPrompt {
            id: id.map(str::to_string),
            name: name.to_string(),
            enabled,
            ..Default::default()
        }
    }

    #[test]
    fn test_clean_prompts_drops_local_ids() {
        let prompts = vec![
            prompt(Some("6f1c2b7e-3a44-4d2e-9b0a-8f7e6d5c4b3a"), "Attendance Agent", true),
            prompt(Some("tmp-1"), "Payment Agent", false),
            prompt(None, "Reminder Agent", true),
        ];
        let cleaned = clean_prompts(&prompts, "c1");
        assert!(cleaned[0].id.is_some());
        assert_eq!(cleaned[1].id, None);
        assert_eq!(cleaned[2].id, None);
        assert!(cleaned.iter().all(|p| p.clinic_id.as_deref() == Some("c1")));
    }

    #[test]
    fn test_new_prompt_serializes_without_id() {
        let json = serde_json::to_value(prompt(None, "Initial Message", true)).unwrap();
        assert!(json.get("id").is_none());
    }

    #[test]
    fn test_agent_enabled_defaults() {
        let prompts = vec![prompt(Some("x"), "Attendance Agent", false)];
        assert!(!agent_enabled(&prompts, "Attendance Agent"));
        assert!(agent_enabled(&prompts, "Scheduling Agent"));
        assert!(!agent_enabled(&prompts, "Payment Agent"));
        assert!(!agent_enabled(&prompts, "Unknown Agent"));
    }
}
