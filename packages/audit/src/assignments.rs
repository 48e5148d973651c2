//! # Daily assignments
//!
//! Binding rounds to staff for a date and shift, and moving an assignment
//! through its lifecycle:
//!
//! ```text
//! pending ──start / first check-in──▶ in_progress ──finish──▶ completed | incomplete
//! ```
//!
//! Transitions are applied as the UI requests them; only the ownership of
//! the assignment is checked.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{
    AssignmentFilter, AssignmentStatus, AssignmentUpdate, DailyAssignment, NewAssignment, Role,
};
use crate::progress::{load_progress, RoundProgress};
use crate::store::AuditStore;

/// An assignment with its round name and progress, for list views.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AssignmentSummary {
    pub assignment: DailyAssignment,
    pub round_name: String,
    pub staff_name: String,
    pub total: usize,
    pub completed: usize,
    pub percentage: u8,
}

pub async fn assign_round<S: AuditStore>(store: &S, assignment: NewAssignment) -> Result<DailyAssignment> {
    let profile = store
        .get_profile(&assignment.user_id)
        .await?
        .ok_or_else(|| Error::not_found("user", assignment.user_id.clone()))?;
    if profile.role != Role::Staff {
        return Err(Error::invalid("Rounds can only be assigned to staff"));
    }
    store
        .get_round(&assignment.round_id)
        .await?
        .ok_or_else(|| Error::not_found("round", assignment.round_id.clone()))?;

    let assignment = store.insert_assignment(assignment).await?;
    tracing::info!(
        "Assigned round {} to {} for {} ({})",
        assignment.round_id,
        profile.email,
        assignment.date,
        assignment.shift.as_str()
    );
    Ok(assignment)
}

/// Assignments matching `filter`, each with its progress.
pub async fn summarize<S: AuditStore>(store: &S, filter: AssignmentFilter) -> Result<Vec<AssignmentSummary>> {
    let assignments = store.list_assignments(filter).await?;
    let mut summaries = Vec::with_capacity(assignments.len());
    for assignment in assignments {
        let staff_name = store
            .get_profile(&assignment.user_id)
            .await?
            .map(|p| p.display_name().to_string())
            .unwrap_or_default();
        let progress = load_progress(store, &assignment.id).await?;
        summaries.push(AssignmentSummary {
            round_name: progress.round_name,
            staff_name,
            total: progress.total,
            completed: progress.completed,
            percentage: progress.percentage,
            assignment: progress.assignment,
        });
    }
    Ok(summaries)
}

pub async fn assignments_for<S: AuditStore>(
    store: &S,
    user_id: &str,
    date: NaiveDate,
) -> Result<Vec<AssignmentSummary>> {
    summarize(
        store,
        AssignmentFilter {
            user_id: Some(user_id.to_string()),
            date: Some(date),
        },
    )
    .await
}

async fn owned<S: AuditStore>(store: &S, user_id: &str, assignment_id: &str) -> Result<RoundProgress> {
    let progress = load_progress(store, assignment_id).await?;
    if progress.assignment.user_id != user_id {
        return Err(Error::Forbidden);
    }
    Ok(progress)
}

/// First action on a round: pending → in_progress.
pub async fn start_round<S: AuditStore>(
    store: &S,
    user_id: &str,
    assignment_id: &str,
    now: DateTime<Utc>,
) -> Result<DailyAssignment> {
    let progress = owned(store, user_id, assignment_id).await?;
    if progress.assignment.status != AssignmentStatus::Pending {
        return Ok(progress.assignment);
    }
    store
        .update_assignment(
            assignment_id,
            AssignmentUpdate {
                status: AssignmentStatus::InProgress,
                started_at: Some(now),
                completed_at: None,
            },
        )
        .await
}

/// Advance the status after a check-in was stored: a pending assignment
/// starts, and one with every checkpoint done completes.
pub async fn record_checkin<S: AuditStore>(
    store: &S,
    assignment_id: &str,
    now: DateTime<Utc>,
) -> Result<DailyAssignment> {
    let progress = load_progress(store, assignment_id).await?;
    let assignment = progress.assignment.clone();
    if assignment.status.is_terminal() {
        return Ok(assignment);
    }

    let started_at = match assignment.started_at {
        Some(_) => None,
        None => Some(now),
    };
    let update = if progress.is_complete() {
        AssignmentUpdate {
            status: AssignmentStatus::Completed,
            started_at,
            completed_at: Some(now),
        }
    } else if assignment.status == AssignmentStatus::Pending {
        AssignmentUpdate {
            status: AssignmentStatus::InProgress,
            started_at,
            completed_at: None,
        }
    } else {
        return Ok(assignment);
    };
    store.update_assignment(assignment_id, update).await
}

/// Close the round: completed when every checkpoint is done, incomplete
/// otherwise.
pub async fn finish_round<S: AuditStore>(
    store: &S,
    user_id: &str,
    assignment_id: &str,
    now: DateTime<Utc>,
) -> Result<DailyAssignment> {
    let progress = owned(store, user_id, assignment_id).await?;
    if progress.assignment.status.is_terminal() {
        return Ok(progress.assignment);
    }
    let status = if progress.is_complete() {
        AssignmentStatus::Completed
    } else {
        AssignmentStatus::Incomplete
    };
    let assignment = store
        .update_assignment(
            assignment_id,
            AssignmentUpdate {
                status,
                started_at: progress.assignment.started_at.or(Some(now)),
                completed_at: Some(now),
            },
        )
        .await?;
    tracing::info!(
        "Round {} finished as {}",
        assignment.id,
        assignment.status.as_str()
    );
    Ok(assignment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkin::{submit_checkin, CheckinSubmission};
    use crate::memory::MemoryPhotoStore;
    use crate::models::Shift;
    use crate::testing::{at, jpeg, night, scenario, Scenario};

    async fn check_in(s: &Scenario, photos: &MemoryPhotoStore, index: usize, minute: u32) {
        submit_checkin(
            &s.store,
            photos,
            &s.staff.id,
            CheckinSubmission {
                assignment_id: s.assignment.id.clone(),
                location_id: s.locations[index].id.clone(),
                proof_photo: Some(jpeg()),
                has_incident: false,
                damage_photo: None,
                damage_description: None,
                scanned_code: None,
            },
            at(23, minute),
        )
        .await
        .unwrap();
        record_checkin(&s.store, &s.assignment.id, at(23, minute))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_checkins_drive_the_lifecycle() {
        let s = scenario().await;
        let photos = MemoryPhotoStore::new();

        check_in(&s, &photos, 0, 1).await;
        let a = s.store.get_assignment(&s.assignment.id).await.unwrap().unwrap();
        assert_eq!(a.status, AssignmentStatus::InProgress);
        assert_eq!(a.started_at, Some(at(23, 1)));

        check_in(&s, &photos, 1, 2).await;
        check_in(&s, &photos, 2, 3).await;
        let a = s.store.get_assignment(&s.assignment.id).await.unwrap().unwrap();
        assert_eq!(a.status, AssignmentStatus::Completed);
        assert_eq!(a.started_at, Some(at(23, 1)));
        assert_eq!(a.completed_at, Some(at(23, 3)));
    }

    #[tokio::test]
    async fn test_finish_partial_round_is_incomplete() {
        let s = scenario().await;
        let photos = MemoryPhotoStore::new();
        start_round(&s.store, &s.staff.id, &s.assignment.id, at(22, 59))
            .await
            .unwrap();
        check_in(&s, &photos, 0, 1).await;

        let a = finish_round(&s.store, &s.staff.id, &s.assignment.id, at(23, 30))
            .await
            .unwrap();
        assert_eq!(a.status, AssignmentStatus::Incomplete);
        assert_eq!(a.started_at, Some(at(22, 59)));

        // Terminal states stay put.
        let again = start_round(&s.store, &s.staff.id, &s.assignment.id, at(23, 40))
            .await
            .unwrap();
        assert_eq!(again.status, AssignmentStatus::Incomplete);
    }

    #[tokio::test]
    async fn test_other_users_cannot_start() {
        let s = scenario().await;
        let err = start_round(&s.store, &s.admin.id, &s.assignment.id, at(23, 0))
            .await
            .unwrap_err();
        assert_eq!(err, Error::Forbidden);
    }

    #[tokio::test]
    async fn test_assign_round_rules() {
        let s = scenario().await;
        let err = assign_round(
            &s.store,
            NewAssignment {
                user_id: s.admin.id.clone(),
                round_id: s.round.id.clone(),
                date: night(),
                shift: Shift::Night,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err, Error::invalid("Rounds can only be assigned to staff"));

        let err = assign_round(
            &s.store,
            NewAssignment {
                user_id: s.staff.id.clone(),
                round_id: s.round.id.clone(),
                date: night(),
                shift: Shift::Night,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::Duplicate(_)));

        let morning = assign_round(
            &s.store,
            NewAssignment {
                user_id: s.staff.id.clone(),
                round_id: s.round.id.clone(),
                date: night(),
                shift: Shift::Morning,
            },
        )
        .await
        .unwrap();
        assert_eq!(morning.status, AssignmentStatus::Pending);
    }

    #[tokio::test]
    async fn test_summaries_carry_progress() {
        let s = scenario().await;
        check_in(&s, &MemoryPhotoStore::new(), 0, 1).await;

        let summaries = assignments_for(&s.store, &s.staff.id, night()).await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].round_name, "Night round");
        assert_eq!(summaries[0].staff_name, "Night Porter");
        assert_eq!(summaries[0].completed, 1);
        assert_eq!(summaries[0].percentage, 33);
    }
}
