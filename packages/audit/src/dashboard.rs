//! # Dashboard aggregation
//!
//! The stores return flat aggregation rows ([`StaffNightRow`], [`IncidentRow`]);
//! this module re-shapes them into the records the admin dashboard renders.
//! [`mock_nightly_rows`] and [`mock_incident_rows`] provide fixed data for
//! development setups without a backend.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::progress::percentage;

/// Raw per-staff aggregate for one night.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StaffNightRow {
    pub user_id: String,
    pub full_name: String,
    pub rounds_assigned: i64,
    pub rounds_completed: i64,
    pub checkpoints_total: i64,
    pub checkpoints_done: i64,
    pub incidents: i64,
    pub tasks_total: i64,
    pub tasks_done: i64,
}

/// Raw incident check-in joined with its location and reporter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IncidentRow {
    pub checkin_id: String,
    pub created_at: DateTime<Utc>,
    pub location_name: String,
    pub building: String,
    pub floor: i32,
    pub staff_name: String,
    pub description: Option<String>,
    pub damage_photo_url: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Standing {
    NotStarted,
    InProgress,
    Complete,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StaffCompliance {
    pub user_id: String,
    pub name: String,
    /// "1/2" rounds completed out of assigned.
    pub rounds: String,
    pub checkpoint_pct: u8,
    pub task_pct: u8,
    pub compliance_pct: u8,
    pub incidents: i64,
    pub standing: Standing,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NightlyOverview {
    pub date: NaiveDate,
    /// Least compliant first.
    pub staff: Vec<StaffCompliance>,
    pub compliance_pct: u8,
    pub checkpoints_done: i64,
    pub checkpoints_total: i64,
    pub tasks_done: i64,
    pub tasks_total: i64,
    pub incidents: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IncidentRecord {
    pub checkin_id: String,
    pub reported_at: DateTime<Utc>,
    pub location: String,
    pub staff_name: String,
    pub description: String,
    pub photo_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocationCount {
    pub location: String,
    pub count: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IncidentSummary {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub total: usize,
    /// Most affected locations first.
    pub by_location: Vec<LocationCount>,
    pub recent: Vec<IncidentRecord>,
}

/// Number of incident records kept in [`IncidentSummary::recent`].
pub const RECENT_INCIDENTS: usize = 20;

fn pct(done: i64, total: i64) -> u8 {
    percentage(done.max(0) as u64, total.max(0) as u64)
}

pub fn nightly_overview(date: NaiveDate, rows: Vec<StaffNightRow>) -> NightlyOverview {
    let mut staff: Vec<StaffCompliance> = rows
        .iter()
        .map(|row| {
            let done = row.checkpoints_done + row.tasks_done;
            let total = row.checkpoints_total + row.tasks_total;
            let standing = if total > 0 && done >= total {
                Standing::Complete
            } else if done == 0 {
                Standing::NotStarted
            } else {
                Standing::InProgress
            };
            StaffCompliance {
                user_id: row.user_id.clone(),
                name: row.full_name.clone(),
                rounds: format!("{}/{}", row.rounds_completed, row.rounds_assigned),
                checkpoint_pct: pct(row.checkpoints_done, row.checkpoints_total),
                task_pct: pct(row.tasks_done, row.tasks_total),
                compliance_pct: pct(done, total),
                incidents: row.incidents,
                standing,
            }
        })
        .collect();
    staff.sort_by(|a, b| {
        a.compliance_pct
            .cmp(&b.compliance_pct)
            .then_with(|| a.name.cmp(&b.name))
    });

    let sum = |f: fn(&StaffNightRow) -> i64| rows.iter().map(f).sum::<i64>();
    let checkpoints_done = sum(|r| r.checkpoints_done);
    let checkpoints_total = sum(|r| r.checkpoints_total);
    let tasks_done = sum(|r| r.tasks_done);
    let tasks_total = sum(|r| r.tasks_total);

    NightlyOverview {
        date,
        staff,
        compliance_pct: pct(
            checkpoints_done + tasks_done,
            checkpoints_total + tasks_total,
        ),
        checkpoints_done,
        checkpoints_total,
        tasks_done,
        tasks_total,
        incidents: sum(|r| r.incidents),
    }
}

pub fn incident_summary(from: NaiveDate, to: NaiveDate, mut rows: Vec<IncidentRow>) -> IncidentSummary {
    rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for row in &rows {
        *counts.entry(location_label(row)).or_default() += 1;
    }
    let mut by_location: Vec<LocationCount> = counts
        .into_iter()
        .map(|(location, count)| LocationCount { location, count })
        .collect();
    by_location.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.location.cmp(&b.location)));

    let total = rows.len();
    let recent = rows
        .into_iter()
        .take(RECENT_INCIDENTS)
        .map(|row| IncidentRecord {
            location: location_label(&row),
            checkin_id: row.checkin_id,
            reported_at: row.created_at,
            staff_name: row.staff_name,
            description: row.description.unwrap_or_default(),
            photo_url: row.damage_photo_url,
        })
        .collect();

    IncidentSummary {
        from,
        to,
        total,
        by_location,
        recent,
    }
}

fn location_label(row: &IncidentRow) -> String {
    format!("{} · Floor {} · {}", row.building, row.floor, row.location_name)
}

/// Fixed nightly stats for development without a backend.
pub fn mock_nightly_rows() -> Vec<StaffNightRow> {
    vec![
        StaffNightRow {
            user_id: "mock-staff-1".to_string(),
            full_name: "Ana Ruiz".to_string(),
            rounds_assigned: 2,
            rounds_completed: 2,
            checkpoints_total: 12,
            checkpoints_done: 12,
            incidents: 1,
            tasks_total: 5,
            tasks_done: 5,
        },
        StaffNightRow {
            user_id: "mock-staff-2".to_string(),
            full_name: "Marco Bellini".to_string(),
            rounds_assigned: 2,
            rounds_completed: 1,
            checkpoints_total: 12,
            checkpoints_done: 8,
            incidents: 0,
            tasks_total: 5,
            tasks_done: 3,
        },
        StaffNightRow {
            user_id: "mock-staff-3".to_string(),
            full_name: "Lea Schmidt".to_string(),
            rounds_assigned: 1,
            rounds_completed: 0,
            checkpoints_total: 6,
            checkpoints_done: 0,
            incidents: 0,
            tasks_total: 4,
            tasks_done: 0,
        },
    ]
}

/// Fixed incidents for development without a backend, dated on and before
/// `to` and kept only when they fall within `from..=to`.
pub fn mock_incident_rows(from: NaiveDate, to: NaiveDate) -> Vec<IncidentRow> {
    let at = |days_back: i64, hour: u32, minute: u32| {
        (to - Duration::days(days_back))
            .and_hms_opt(hour, minute, 0)
            .unwrap_or_default()
            .and_utc()
    };
    vec![
        IncidentRow {
            checkin_id: "mock-checkin-1".to_string(),
            created_at: at(0, 2, 15),
            location_name: "Pool gate".to_string(),
            building: "Main".to_string(),
            floor: 0,
            staff_name: "Ana Ruiz".to_string(),
            description: Some("Gate latch broken, door does not lock".to_string()),
            damage_photo_url: None,
        },
        IncidentRow {
            checkin_id: "mock-checkin-2".to_string(),
            created_at: at(1, 3, 40),
            location_name: "Service stairs".to_string(),
            building: "Annex".to_string(),
            floor: 2,
            staff_name: "Marco Bellini".to_string(),
            description: Some("Emergency light out".to_string()),
            damage_photo_url: None,
        },
    ]
    .into_iter()
    .filter(|row| (from..=to).contains(&row.created_at.date_naive()))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, cp: (i64, i64), tasks: (i64, i64), incidents: i64) -> StaffNightRow {
        StaffNightRow {
            user_id: format!("id-{name}"),
            full_name: name.to_string(),
            rounds_assigned: 1,
            rounds_completed: if cp.0 == cp.1 { 1 } else { 0 },
            checkpoints_done: cp.0,
            checkpoints_total: cp.1,
            incidents,
            tasks_done: tasks.0,
            tasks_total: tasks.1,
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
    }

    #[test]
    fn test_nightly_overview_totals_and_order() {
        let overview = nightly_overview(
            date(),
            vec![
                row("Zoe", (4, 4), (2, 2), 1),
                row("Adam", (1, 4), (0, 2), 0),
                row("Bea", (0, 4), (0, 2), 0),
            ],
        );

        assert_eq!(overview.checkpoints_done, 5);
        assert_eq!(overview.checkpoints_total, 12);
        assert_eq!(overview.tasks_done, 2);
        assert_eq!(overview.tasks_total, 6);
        assert_eq!(overview.incidents, 1);
        // 7 of 18
        assert_eq!(overview.compliance_pct, 39);

        let names: Vec<&str> = overview.staff.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Bea", "Adam", "Zoe"]);
        assert_eq!(overview.staff[0].standing, Standing::NotStarted);
        assert_eq!(overview.staff[1].standing, Standing::InProgress);
        assert_eq!(overview.staff[2].standing, Standing::Complete);
        assert_eq!(overview.staff[2].rounds, "1/1");
    }

    #[test]
    fn test_empty_night_is_zero_percent() {
        let overview = nightly_overview(date(), Vec::new());
        assert_eq!(overview.compliance_pct, 0);
        assert!(overview.staff.is_empty());
    }

    #[test]
    fn test_incident_summary_groups_by_location() {
        let base = date().and_hms_opt(1, 0, 0).unwrap().and_utc();
        let incident = |id: &str, minutes: i64, location: &str| IncidentRow {
            checkin_id: id.to_string(),
            created_at: base + Duration::minutes(minutes),
            location_name: location.to_string(),
            building: "Main".to_string(),
            floor: 1,
            staff_name: "Ana".to_string(),
            description: None,
            damage_photo_url: None,
        };

        let summary = incident_summary(
            date(),
            date(),
            vec![
                incident("c1", 0, "Lobby"),
                incident("c2", 30, "Bar"),
                incident("c3", 60, "Lobby"),
            ],
        );

        assert_eq!(summary.total, 3);
        assert_eq!(summary.by_location[0].location, "Main · Floor 1 · Lobby");
        assert_eq!(summary.by_location[0].count, 2);
        assert_eq!(summary.recent[0].checkin_id, "c3");
        assert_eq!(summary.recent[2].description, "");
    }

    #[test]
    fn test_mock_data_is_not_empty() {
        assert_eq!(mock_nightly_rows().len(), 3);
        let incidents = mock_incident_rows(date() - Duration::days(6), date());
        assert_eq!(incidents.len(), 2);
        assert!(incidents.iter().all(|i| i.created_at.date_naive() <= date()));
    }

    #[test]
    fn test_mock_incidents_respect_range() {
        let single_day = mock_incident_rows(date(), date());
        assert_eq!(single_day.len(), 1);
        assert_eq!(single_day[0].created_at.date_naive(), date());
    }
}
