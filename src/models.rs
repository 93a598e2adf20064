//! Frontend Models
//!
//! Data structures matching backend rows, and the typed shapes the
//! dashboard works with. Raw rows are converted with explicit fallback
//! rules instead of being trusted as-is.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike};
use serde::{Deserialize, Deserializer, Serialize};

/// Opaque lead identifier (the messaging handle of the contact)
pub type LeadId = String;

/// Tenant identifier; every read and write is filtered by it
pub type ClinicId = String;

/// Lead status. Only these values are meaningful to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LeadStatus {
    New,
    Contacted,
    NoShow,
    InAttendance,
    Canceled,
    ToReschedule,
    Rescheduled,
    Pending,
}

impl LeadStatus {
    pub const ALL: [LeadStatus; 8] = [
        LeadStatus::New,
        LeadStatus::Contacted,
        LeadStatus::NoShow,
        LeadStatus::InAttendance,
        LeadStatus::Canceled,
        LeadStatus::ToReschedule,
        LeadStatus::Rescheduled,
        LeadStatus::Pending,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::New => "new",
            LeadStatus::Contacted => "contacted",
            LeadStatus::NoShow => "no-show",
            LeadStatus::InAttendance => "in-attendance",
            LeadStatus::Canceled => "canceled",
            LeadStatus::ToReschedule => "to-reschedule",
            LeadStatus::Rescheduled => "rescheduled",
            LeadStatus::Pending => "pending",
        }
    }

    /// Name shown to staff: the lane title, or a readable name for the
    /// statuses that have no lane
    pub fn label(&self) -> &'static str {
        match self {
            LeadStatus::Rescheduled => "Rescheduled",
            LeadStatus::Pending => "Pending",
            _ => Column::for_status(*self).map_or(self.as_str(), |c| c.title),
        }
    }

    /// Exact match against the wire value
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == s)
    }

    /// Backend values outside the known set (or missing) become `Pending`
    pub fn from_backend(raw: Option<&str>) -> Self {
        raw.and_then(Self::parse).unwrap_or(LeadStatus::Pending)
    }
}

impl std::fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw `clients` row as returned by the data store
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LeadRow {
    pub remotejid: String,
    #[serde(default)]
    pub nome_cliente: Option<String>,
    #[serde(default)]
    pub pushname: Option<String>,
    #[serde(default)]
    pub telefone: Option<String>,
    #[serde(default)]
    pub ult_contato: Option<String>,
    #[serde(default)]
    pub appointment_datetime: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub sintomas: Option<String>,
    #[serde(default)]
    pub clinic_id: Option<String>,
}

/// Columns requested for every lead read and write
pub const LEAD_COLUMNS: &str =
    "remotejid,nome_cliente,pushname,telefone,ult_contato,appointment_datetime,status,sintomas,clinic_id";

/// A tenant-scoped contact/appointment record
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Lead {
    pub id: LeadId,
    pub client_name: String,
    pub phone: Option<String>,
    pub last_contact: Option<String>,
    pub appointment_date: Option<NaiveDate>,
    pub appointment_time: Option<NaiveTime>,
    pub status: LeadStatus,
    pub notes: Option<String>,
    pub clinic_id: Option<ClinicId>,
}

impl Lead {
    /// Convert a raw row, splitting the appointment timestamp in `tz`
    pub fn from_row<Tz: TimeZone>(row: LeadRow, tz: &Tz) -> Self {
        let appointment = row
            .appointment_datetime
            .as_deref()
            .and_then(|raw| split_appointment(raw, tz));
        let client_name = non_empty(row.nome_cliente)
            .or_else(|| non_empty(row.pushname))
            .unwrap_or_else(|| "Unknown".to_string());
        Self {
            id: row.remotejid,
            client_name,
            phone: non_empty(row.telefone),
            last_contact: non_empty(row.ult_contato),
            appointment_date: appointment.map(|(date, _)| date),
            appointment_time: appointment.map(|(_, time)| time),
            status: LeadStatus::from_backend(row.status.as_deref()),
            notes: non_empty(row.sintomas),
            clinic_id: non_empty(row.clinic_id),
        }
    }

    /// "YYYY-MM-DD HH:MM" when both halves of the appointment are known
    pub fn appointment_label(&self) -> Option<String> {
        match (self.appointment_date, self.appointment_time) {
            (Some(date), Some(time)) => Some(format!("{} {}", date.format("%Y-%m-%d"), time.format("%H:%M"))),
            _ => None,
        }
    }
}

impl From<LeadRow> for Lead {
    fn from(row: LeadRow) -> Self {
        Lead::from_row(row, &Local)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Split a backend timestamp into calendar date and time-of-day in `tz`.
/// Timestamps without an offset are read as wall-clock time in `tz`.
pub fn split_appointment<Tz: TimeZone>(raw: &str, tz: &Tz) -> Option<(NaiveDate, NaiveTime)> {
    let raw = raw.trim();
    let instant: DateTime<FixedOffset> = DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%#z"))
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%#z"))
        .ok()
        .or_else(|| {
            let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
                .ok()?;
            tz.from_local_datetime(&naive).earliest().map(|dt| dt.fixed_offset())
        })?;
    let local = instant.with_timezone(tz);
    let time = NaiveTime::from_hms_opt(local.hour(), local.minute(), 0)?;
    Some((local.date_naive(), time))
}

/// A board lane: a fixed projection of one status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub status: LeadStatus,
    pub title: &'static str,
}

/// Board lanes in display order
pub static COLUMNS: [Column; 6] = [
    Column { status: LeadStatus::New, title: "Scheduled" },
    Column { status: LeadStatus::InAttendance, title: "In Attendance" },
    Column { status: LeadStatus::Contacted, title: "Completed" },
    Column { status: LeadStatus::NoShow, title: "No-show" },
    Column { status: LeadStatus::ToReschedule, title: "To Reschedule" },
    Column { status: LeadStatus::Canceled, title: "Canceled" },
];

impl Column {
    pub fn id(&self) -> &'static str {
        self.status.as_str()
    }

    /// Lane whose id is exactly `id`
    pub fn find(id: &str) -> Option<&'static Column> {
        COLUMNS.iter().find(|c| c.id() == id)
    }

    pub fn for_status(status: LeadStatus) -> Option<&'static Column> {
        COLUMNS.iter().find(|c| c.status == status)
    }

    /// Moving a lead here needs explicit confirmation
    pub fn is_sensitive(&self) -> bool {
        self.status == LeadStatus::Contacted
    }
}

// ========================
// WhatsApp channels
// ========================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceStatus {
    Connecting,
    Connected,
    #[serde(other)]
    Disconnected,
}

impl InstanceStatus {
    pub fn label(&self) -> &'static str {
        match self {
            InstanceStatus::Connecting => "Connecting",
            InstanceStatus::Connected => "Connected",
            InstanceStatus::Disconnected => "Disconnected",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InstanceKind {
    #[default]
    #[serde(rename = "WHATSAPP-BAILEYS")]
    Baileys,
    #[serde(rename = "WHATSAPP-BUSINESS")]
    Business,
}

impl InstanceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstanceKind::Baileys => "WHATSAPP-BAILEYS",
            InstanceKind::Business => "WHATSAPP-BUSINESS",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "WHATSAPP-BUSINESS" => InstanceKind::Business,
            _ => InstanceKind::Baileys,
        }
    }
}

/// A messaging channel paired (or pairing) with the clinic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhatsAppInstance {
    pub api_key: String,
    #[serde(default)]
    pub clinic_id: Option<ClinicId>,
    #[serde(default)]
    pub instance_name: Option<String>,
    #[serde(default, deserialize_with = "null_to_default")]
    pub phone_number: String,
    pub status: InstanceStatus,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<InstanceKind>,
    #[serde(default)]
    pub qr_code: Option<String>,
}

impl WhatsAppInstance {
    pub fn display_name(&self) -> &str {
        self.instance_name.as_deref().unwrap_or("Unnamed instance")
    }
}

// ========================
// Operating hours
// ========================

pub const DAYS: [&str; 7] = ["monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DayHours {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
}

/// Day name -> hours
pub type OperatingHours = BTreeMap<String, DayHours>;

/// Raw `operating_hours` row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoursRow {
    #[serde(default)]
    pub clinic_id: Option<ClinicId>,
    pub day: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
}

// ========================
// Clinic profile
// ========================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClinicProfile {
    #[serde(deserialize_with = "null_to_default")]
    pub clinic_id: String,
    #[serde(deserialize_with = "null_to_default")]
    pub name: String,
    #[serde(deserialize_with = "null_to_default")]
    pub assistant_name: String,
    #[serde(deserialize_with = "null_to_default")]
    pub asaas_api_key: String,
    #[serde(deserialize_with = "null_to_default")]
    pub klingo_api_key: String,
    #[serde(deserialize_with = "null_to_default")]
    pub address: String,
    #[serde(deserialize_with = "null_to_default")]
    pub recommendations: String,
    #[serde(deserialize_with = "null_to_default")]
    pub support_phone: String,
    #[serde(deserialize_with = "null_to_default")]
    pub asaas_enabled: bool,
    #[serde(deserialize_with = "null_to_default")]
    pub klingo_enabled: bool,
}

/// Automation agent prompt configured per clinic
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentPrompt {
    /// `None` for prompts the store has not assigned an id yet
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub clinic_id: Option<ClinicId>,
    #[serde(default, deserialize_with = "null_to_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub prompt: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub variables: Vec<String>,
    #[serde(default, deserialize_with = "null_to_default")]
    pub enabled: bool,
}

/// Template variables offered on every prompt
pub const DEFAULT_VARIABLES: [&str; 9] = [
    "{clinic_name}",
    "{client_name}",
    "{appointment_time}",
    "{appointment_date}",
    "{service_name}",
    "{doctor_name}",
    "{phone_number}",
    "{greeting}",
    "{service_list}",
];

impl AgentPrompt {
    /// Add `{name}` unless already present; braces in the input are tolerated
    pub fn add_variable(&mut self, name: &str) -> bool {
        let bare = name.trim().trim_start_matches('{').trim_end_matches('}').trim();
        if bare.is_empty() {
            return false;
        }
        let variable = format!("{{{}}}", bare);
        if self.variables.contains(&variable) {
            return false;
        }
        self.variables.push(variable);
        true
    }

    pub fn remove_variable(&mut self, variable: &str) {
        self.variables.retain(|v| v != variable);
    }

    pub fn description(&self) -> &'static str {
        match self.name.as_str() {
            "Initial Message" => "Initial message sent to clients",
            "Offered Services" => "List of services offered",
            _ => "Automated responses",
        }
    }
}

// ========================
// Auth session
// ========================

/// Authenticated user session issued by the auth provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Access token lifetime in seconds, as issued
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Unix time the access token stops being accepted
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: AuthUser,
}

impl AuthSession {
    /// Fill in `expires_at` from `expires_in` when the provider only sent the latter
    pub fn stamped(mut self, now_secs: i64) -> Self {
        if self.expires_at.is_none() {
            self.expires_at = self.expires_in.map(|ttl| now_secs + ttl);
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

fn null_to_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sao_paulo() -> FixedOffset {
        FixedOffset::west_opt(3 * 3600).unwrap()
    }

    fn row(status: Option<&str>) -> LeadRow {
        LeadRow {
            remotejid: "5511999990000@s.whatsapp.net".to_string(),
            nome_cliente: Some("Maria".to_string()),
            status: status.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_status_wire_values() {
        for status in LeadStatus::ALL {
            assert_eq!(LeadStatus::parse(status.as_str()), Some(status));
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }

    #[test]
    fn test_unknown_status_becomes_pending() {
        let lead = Lead::from_row(row(Some("archived")), &sao_paulo());
        assert_eq!(lead.status, LeadStatus::Pending);
        assert_eq!(Lead::from_row(row(None), &sao_paulo()).status, LeadStatus::Pending);
        assert_eq!(Lead::from_row(row(Some("no-show")), &sao_paulo()).status, LeadStatus::NoShow);
    }

    #[test]
    fn test_name_fallback_chain() {
        let mut r = row(Some("new"));
        r.nome_cliente = None;
        r.pushname = Some("mari".to_string());
        assert_eq!(Lead::from_row(r.clone(), &sao_paulo()).client_name, "mari");

        r.nome_cliente = Some(String::new());
        assert_eq!(Lead::from_row(r.clone(), &sao_paulo()).client_name, "mari");

        r.pushname = None;
        assert_eq!(Lead::from_row(r, &sao_paulo()).client_name, "Unknown");
    }

    #[test]
    fn test_empty_optionals_are_absent() {
        let mut r = row(Some("new"));
        r.telefone = Some(String::new());
        r.sintomas = Some("  ".to_string());
        let lead = Lead::from_row(r, &sao_paulo());
        assert_eq!(lead.phone, None);
        assert_eq!(lead.notes, None);
        assert_eq!(lead.appointment_date, None);
        assert_eq!(lead.appointment_time, None);
        assert_eq!(lead.appointment_label(), None);
    }

    #[test]
    fn test_appointment_split_in_local_zone() {
        let (date, time) = split_appointment("2024-05-01T14:30:00+00:00", &sao_paulo()).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(time, NaiveTime::from_hms_opt(11, 30, 0).unwrap());

        // Crosses midnight backwards
        let (date, time) = split_appointment("2024-05-01T01:15:00Z", &sao_paulo()).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 4, 30).unwrap());
        assert_eq!(time, NaiveTime::from_hms_opt(22, 15, 0).unwrap());
    }

    #[test]
    fn test_appointment_postgres_formats() {
        let (_, time) = split_appointment("2024-05-01 14:30:00+00", &sao_paulo()).unwrap();
        assert_eq!(time, NaiveTime::from_hms_opt(11, 30, 0).unwrap());

        // No offset: wall-clock time in the local zone
        let (date, time) = split_appointment("2024-05-01T09:05:00", &sao_paulo()).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(time, NaiveTime::from_hms_opt(9, 5, 0).unwrap());

        assert_eq!(split_appointment("next tuesday", &sao_paulo()), None);
    }

    #[test]
    fn test_row_deserializes_with_nulls() {
        let json = r#"{"remotejid":"abc","nome_cliente":null,"pushname":"Ana","telefone":null,
            "ult_contato":null,"appointment_datetime":"2024-06-10T13:00:00+00:00","status":"in-attendance",
            "sintomas":"headache","clinic_id":"c1"}"#;
        let row: LeadRow = serde_json::from_str(json).unwrap();
        let lead = Lead::from_row(row, &sao_paulo());
        assert_eq!(lead.client_name, "Ana");
        assert_eq!(lead.status, LeadStatus::InAttendance);
        assert_eq!(lead.appointment_label().as_deref(), Some("2024-06-10 10:00"));
        assert_eq!(lead.notes.as_deref(), Some("headache"));
    }

    #[test]
    fn test_columns() {
        assert_eq!(COLUMNS.len(), 6);
        assert!(Column::find("contacted").unwrap().is_sensitive());
        assert!(!Column::find("new").unwrap().is_sensitive());
        assert!(Column::find("pending").is_none());
        assert!(Column::find("5511999990000@s.whatsapp.net").is_none());
        assert_eq!(Column::for_status(LeadStatus::Canceled).unwrap().title, "Canceled");
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(LeadStatus::InAttendance.label(), "In Attendance");
        assert_eq!(LeadStatus::New.label(), "Scheduled");
        assert_eq!(LeadStatus::Rescheduled.label(), "Rescheduled");
        assert_eq!(LeadStatus::Pending.label(), "Pending");
        for status in LeadStatus::ALL {
            assert_ne!(status.label(), status.as_str(), "{:?} shows its wire value", status);
        }
    }

    #[test]
    fn test_instance_deserialize() {
        let json = r#"{"api_key":"k1","clinic_id":"c1","instance_name":null,"phone_number":"5511999999999",
            "status":"connecting","created_at":"2024-01-01","qr_code":null}"#;
        let inst: WhatsAppInstance = serde_json::from_str(json).unwrap();
        assert_eq!(inst.status, InstanceStatus::Connecting);
        assert_eq!(inst.display_name(), "Unnamed instance");
        assert_eq!(inst.kind, None);

        let json = r#"{"api_key":"k2","phone_number":null,"status":"weird"}"#;
        let inst: WhatsAppInstance = serde_json::from_str(json).unwrap();
        assert_eq!(inst.status, InstanceStatus::Disconnected);
        assert_eq!(inst.phone_number, "");
    }

    #[test]
    fn test_profile_nulls_default() {
        let json = r#"{"clinic_id":"c1","name":"Clinica","assistant_name":null,"asaas_enabled":null,"extra":1}"#;
        let profile: ClinicProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.name, "Clinica");
        assert_eq!(profile.assistant_name, "");
        assert!(!profile.asaas_enabled);
    }

    #[test]
    fn test_prompt_variables() {
        let mut prompt = AgentPrompt::default();
        assert!(prompt.add_variable("client_name"));
        assert!(!prompt.add_variable("{client_name}"));
        assert!(!prompt.add_variable("   "));
        assert!(prompt.add_variable("{greeting}"));
        assert_eq!(prompt.variables, vec!["{client_name}", "{greeting}"]);
        prompt.remove_variable("{client_name}");
        assert_eq!(prompt.variables, vec!["{greeting}"]);
    }
}
