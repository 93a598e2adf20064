//! Operating Hours Commands

use super::client::ScopedClient;
use crate::error::ApiResult;
use crate::models::{DayHours, HoursRow, OperatingHours, DAYS};

const TABLE: &str = "operating_hours";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeField {
    Start,
    End,
}

/// Rows keyed by day name; times trimmed to `HH:MM` for time inputs
pub fn hours_from_rows(rows: Vec<HoursRow>) -> OperatingHours {
    rows.into_iter()
        .map(|row| {
            let day = DayHours {
                enabled: row.enabled,
                start_time: row.start_time.as_deref().map(short_time),
                end_time: row.end_time.as_deref().map(short_time),
            };
            (row.day, day)
        })
        .collect()
}

/// One row per weekday; days never configured are saved disabled
pub fn rows_from_hours(clinic_id: &str, hours: &OperatingHours) -> Vec<HoursRow> {
    DAYS.iter()
        .map(|day| {
            let entry = hours.get(*day).cloned().unwrap_or_default();
            HoursRow {
                clinic_id: Some(clinic_id.to_string()),
                day: day.to_string(),
                enabled: entry.enabled,
                start_time: entry.start_time.filter(|t| !t.is_empty()),
                end_time: entry.end_time.filter(|t| !t.is_empty()),
            }
        })
        .collect()
}

pub fn toggle_day(hours: &mut OperatingHours, day: &str) {
    let entry = hours.entry(day.to_string()).or_default();
    entry.enabled = !entry.enabled;
}

/// Editing a time on a day with no entry yet enables it
pub fn set_time(hours: &mut OperatingHours, day: &str, field: TimeField, value: &str) {
    let entry = hours
        .entry(day.to_string())
        .or_insert_with(|| DayHours { enabled: true, ..Default::default() });
    let value = Some(value.to_string());
    match field {
        TimeField::Start => entry.start_time = value,
        TimeField::End => entry.end_time = value,
    }
}

fn short_time(raw: &str) -> String {
    raw.chars().take(5).collect()
}

pub async fn fetch_hours(client: &ScopedClient) -> ApiResult<OperatingHours> {
    let query = client.scoped(TABLE).select("*");
    let rows: Vec<HoursRow> = client.rest().select(client.token(), &query).await?;
    Ok(hours_from_rows(rows))
}

/// Upsert every weekday and return the stored schedule
pub async fn save_hours(client: &ScopedClient, hours: &OperatingHours) -> ApiResult<OperatingHours> {
    let rows = rows_from_hours(client.clinic_id(), hours);
    let query = super::client::Query::table(TABLE).on_conflict("clinic_id,day");
    let saved: Vec<HoursRow> = client.rest().upsert(client.token(), &query, &rows).await?;
    log::info!("[HOURS] saved {} days", saved.len());
    Ok(hours_from_rows(saved))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_round_trip_through_map() {
        let rows = vec![HoursRow {
            clinic_id: Some("c1".to_string()),
            day: "monday".to_string(),
            enabled: true,
            start_time: Some("08:00:00".to_string()),
            end_time: Some("18:00:00".to_string()),
        }];
        let hours = hours_from_rows(rows);
        assert_eq!(hours["monday"].start_time.as_deref(), Some("08:00"));

        let out = rows_from_hours("c1", &hours);
        assert_eq!(out.len(), 7);
        assert_eq!(out[0].day, "monday");
        assert!(out[0].enabled);
        assert_eq!(out[6].day, "sunday");
        assert!(!out[6].enabled);
        assert_eq!(out[6].start_time, None);
    }

    #[test]
    fn test_toggle_and_set_time() {
        let mut hours = OperatingHours::new();
        toggle_day(&mut hours, "friday");
        assert!(hours["friday"].enabled);
        toggle_day(&mut hours, "friday");
        assert!(!hours["friday"].enabled);

        // Existing entry keeps its flag
        set_time(&mut hours, "friday", TimeField::Start, "09:00");
        assert!(!hours["friday"].enabled);

        set_time(&mut hours, "saturday", TimeField::End, "12:00");
        assert!(hours["saturday"].enabled);
        assert_eq!(hours["saturday"].end_time.as_deref(), Some("12:00"));
    }
}
