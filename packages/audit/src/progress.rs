//! # Round progress
//!
//! Computes how far a staff member is through the round of one assignment:
//! completed vs pending checkpoints, the percentage done, and which
//! checkpoint is actionable next. Checkpoints are visited in round order, so
//! the first pending location is [`CheckpointState::Next`] and every pending
//! location after it is [`CheckpointState::Locked`].

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{Checkin, DailyAssignment, Location, Round};
use crate::store::AuditStore;

/// `round(done / total * 100)`, or 0 when `total` is 0.
pub fn percentage(done: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    let pct = (done as f64 / total as f64 * 100.0).round();
    pct.clamp(0.0, 100.0) as u8
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckpointState {
    Completed,
    Next,
    Locked,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CheckpointStatus {
    pub location: Location,
    pub state: CheckpointState,
    pub completed_at: Option<DateTime<Utc>>,
    pub has_incident: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompletedCheckpoint {
    pub location_id: String,
    pub location_name: String,
    pub completed_at: DateTime<Utc>,
    pub has_incident: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundProgress {
    pub assignment: DailyAssignment,
    pub round_name: String,
    pub estimated_minutes: i32,
    pub total: usize,
    pub completed: usize,
    pub percentage: u8,
    /// In completion order.
    pub completed_checkpoints: Vec<CompletedCheckpoint>,
    /// In round order.
    pub pending: Vec<Location>,
    /// Every checkpoint of the round, in round order.
    pub checkpoints: Vec<CheckpointStatus>,
}

impl RoundProgress {
    pub fn next_checkpoint(&self) -> Option<&CheckpointStatus> {
        self.checkpoints
            .iter()
            .find(|c| c.state == CheckpointState::Next)
    }

    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.completed == self.total
    }

    pub fn state_of(&self, location_id: &str) -> Option<CheckpointState> {
        self.checkpoints
            .iter()
            .find(|c| c.location.id == location_id)
            .map(|c| c.state)
    }
}

fn unknown_location(id: &str) -> Location {
    Location {
        id: id.to_string(),
        name: "Unknown location".to_string(),
        floor: 0,
        building: String::new(),
        verification_code: String::new(),
    }
}

/// Build the progress of `assignment` from already-fetched rows.
pub fn compute_progress(
    assignment: DailyAssignment,
    round: &Round,
    locations: &[Location],
    checkins: &[Checkin],
) -> RoundProgress {
    let by_id: HashMap<&str, &Location> =
        locations.iter().map(|l| (l.id.as_str(), l)).collect();

    // First check-in per location wins.
    let mut sorted: Vec<&Checkin> = checkins.iter().collect();
    sorted.sort_by_key(|c| c.created_at);
    let mut first_checkin: HashMap<&str, &Checkin> = HashMap::new();
    for checkin in sorted {
        first_checkin
            .entry(checkin.location_id.as_str())
            .or_insert(checkin);
    }

    let mut checkpoints = Vec::with_capacity(round.location_ids.len());
    let mut pending = Vec::new();
    let mut next_assigned = false;
    for id in &round.location_ids {
        let location = by_id
            .get(id.as_str())
            .map(|l| (*l).clone())
            .unwrap_or_else(|| unknown_location(id));
        match first_checkin.get(id.as_str()) {
            Some(checkin) => checkpoints.push(CheckpointStatus {
                location,
                state: CheckpointState::Completed,
                completed_at: Some(checkin.created_at),
                has_incident: checkin.has_incident,
            }),
            None => {
                let state = if next_assigned {
                    CheckpointState::Locked
                } else {
                    next_assigned = true;
                    CheckpointState::Next
                };
                pending.push(location.clone());
                checkpoints.push(CheckpointStatus {
                    location,
                    state,
                    completed_at: None,
                    has_incident: false,
                });
            }
        }
    }

    let mut completed_checkpoints: Vec<CompletedCheckpoint> = checkpoints
        .iter()
        .filter_map(|c| {
            c.completed_at.map(|at| CompletedCheckpoint {
                location_id: c.location.id.clone(),
                location_name: c.location.name.clone(),
                completed_at: at,
                has_incident: c.has_incident,
            })
        })
        .collect();
    completed_checkpoints.sort_by_key(|c| c.completed_at);

    let total = checkpoints.len();
    let completed = completed_checkpoints.len();

    RoundProgress {
        assignment,
        round_name: round.name.clone(),
        estimated_minutes: round.estimated_minutes,
        total,
        completed,
        percentage: percentage(completed as u64, total as u64),
        completed_checkpoints,
        pending,
        checkpoints,
    }
}

/// Fetch everything needed and compute the progress of one assignment.
pub async fn load_progress<S: AuditStore>(store: &S, assignment_id: &str) -> Result<RoundProgress> {
    let assignment = store
        .get_assignment(assignment_id)
        .await?
        .ok_or_else(|| Error::not_found("assignment", assignment_id))?;
    let round = store
        .get_round(&assignment.round_id)
        .await?
        .ok_or_else(|| Error::not_found("round", assignment.round_id.clone()))?;
    let locations = store.list_locations().await?;
    let checkins = store.list_checkins(assignment_id).await?;

    Ok(compute_progress(assignment, &round, &locations, &checkins))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AssignmentStatus, Shift};
    use chrono::{Duration, NaiveDate};

    fn location(id: &str) -> Location {
        Location {
            id: id.to_string(),
            name: format!("Room {id}"),
            floor: 1,
            building: "Main".to_string(),
            verification_code: format!("TAG-{id}"),
        }
    }

    fn round(ids: &[&str]) -> Round {
        Round {
            id: "r1".to_string(),
            name: "Night round".to_string(),
            location_ids: ids.iter().map(|s| s.to_string()).collect(),
            estimated_minutes: 45,
            created_at: Utc::now(),
        }
    }

    fn assignment() -> DailyAssignment {
        DailyAssignment {
            id: "a1".to_string(),
            user_id: "u1".to_string(),
            round_id: "r1".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            shift: Shift::Night,
            status: AssignmentStatus::InProgress,
            started_at: None,
            completed_at: None,
        }
    }

    fn checkin(location_id: &str, minutes: i64, has_incident: bool) -> Checkin {
        Checkin {
            id: format!("c-{location_id}-{minutes}"),
            assignment_id: "a1".to_string(),
            location_id: location_id.to_string(),
            user_id: "u1".to_string(),
            proof_photo_url: "https://photos/proof.jpg".to_string(),
            has_incident,
            damage_photo_url: None,
            damage_description: None,
            nfc_verified: true,
            created_at: NaiveDate::from_ymd_opt(2026, 3, 14)
                .unwrap()
                .and_hms_opt(23, 0, 0)
                .unwrap()
                .and_utc()
                + Duration::minutes(minutes),
        }
    }

    #[test]
    fn test_percentage_rounds() {
        assert_eq!(percentage(0, 0), 0);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 2), 50);
        assert_eq!(percentage(3, 3), 100);
    }

    #[test]
    fn test_empty_round_has_zero_percent() {
        let progress = compute_progress(assignment(), &round(&[]), &[], &[]);
        assert_eq!(progress.total, 0);
        assert_eq!(progress.percentage, 0);
        assert!(progress.next_checkpoint().is_none());
        assert!(!progress.is_complete());
    }

    #[test]
    fn test_next_checkpoint_and_locks() {
        let locations = vec![location("l1"), location("l2"), location("l3"), location("l4")];
        let progress = compute_progress(
            assignment(),
            &round(&["l1", "l2", "l3", "l4"]),
            &locations,
            &[checkin("l1", 5, false)],
        );

        assert_eq!(progress.completed, 1);
        assert_eq!(progress.total, 4);
        assert_eq!(progress.percentage, 25);
        assert_eq!(progress.next_checkpoint().unwrap().location.id, "l2");
        assert_eq!(progress.state_of("l1"), Some(CheckpointState::Completed));
        assert_eq!(progress.state_of("l3"), Some(CheckpointState::Locked));
        assert_eq!(progress.state_of("l4"), Some(CheckpointState::Locked));
        let pending: Vec<&str> = progress.pending.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(pending, vec!["l2", "l3", "l4"]);
    }

    #[test]
    fn test_completed_in_completion_order() {
        let locations = vec![location("l1"), location("l2"), location("l3")];
        let progress = compute_progress(
            assignment(),
            &round(&["l1", "l2", "l3"]),
            &locations,
            &[checkin("l2", 10, true), checkin("l1", 20, false), checkin("l1", 30, false)],
        );

        let order: Vec<&str> = progress
            .completed_checkpoints
            .iter()
            .map(|c| c.location_id.as_str())
            .collect();
        assert_eq!(order, vec!["l2", "l1"]);
        assert!(progress.completed_checkpoints[0].has_incident);
        // Duplicate check-ins for l1 count once.
        assert_eq!(progress.completed, 2);
        assert_eq!(progress.next_checkpoint().unwrap().location.id, "l3");
    }

    #[test]
    fn test_missing_location_is_placeholder() {
        let progress = compute_progress(assignment(), &round(&["gone"]), &[], &[]);
        assert_eq!(progress.total, 1);
        assert_eq!(progress.checkpoints[0].location.name, "Unknown location");
    }
}
