//! # Storage traits
//!
//! Every orchestrator in this crate is generic over two async traits:
//!
//! - [`AuditStore`]: the relational tables (`profiles`, `locations`, `rounds`,
//!   `daily_assignments`, `checkins`, `task_templates`, `staff_tasks`) plus the
//!   two dashboard aggregations.
//! - [`PhotoStore`]: the evidence-photo bucket, addressed by slash-separated
//!   object paths and read back through expiring signed URLs.
//!
//! The server implements them over Postgres and the local filesystem (in the
//! `api` crate); [`crate::MemoryStore`] and [`crate::MemoryPhotoStore`] back the
//! tests and development mocks.

use std::future::Future;

use chrono::{Duration, NaiveDate};

use crate::dashboard::{IncidentRow, StaffNightRow};
use crate::error::Result;
use crate::models::*;

/// Async access to the audit tables.
pub trait AuditStore: Send + Sync {
    fn get_profile(&self, id: &str) -> impl Future<Output = Result<Option<Profile>>> + Send;
    fn find_profile_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<Profile>>> + Send;
    fn list_profiles(&self) -> impl Future<Output = Result<Vec<Profile>>> + Send;
    /// Fails with [`crate::Error::Duplicate`] when the email is taken.
    fn insert_profile(&self, profile: NewProfile) -> impl Future<Output = Result<Profile>> + Send;

    fn list_locations(&self) -> impl Future<Output = Result<Vec<Location>>> + Send;
    fn insert_location(
        &self,
        location: NewLocation,
    ) -> impl Future<Output = Result<Location>> + Send;

    fn list_rounds(&self) -> impl Future<Output = Result<Vec<Round>>> + Send;
    fn get_round(&self, id: &str) -> impl Future<Output = Result<Option<Round>>> + Send;
    fn insert_round(&self, round: NewRound) -> impl Future<Output = Result<Round>> + Send;

    fn get_assignment(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<DailyAssignment>>> + Send;
    fn list_assignments(
        &self,
        filter: AssignmentFilter,
    ) -> impl Future<Output = Result<Vec<DailyAssignment>>> + Send;
    /// Fails with [`crate::Error::Duplicate`] for an existing
    /// (user, round, date, shift).
    fn insert_assignment(
        &self,
        assignment: NewAssignment,
    ) -> impl Future<Output = Result<DailyAssignment>> + Send;
    fn update_assignment(
        &self,
        id: &str,
        update: AssignmentUpdate,
    ) -> impl Future<Output = Result<DailyAssignment>> + Send;

    fn insert_checkin(&self, checkin: NewCheckin) -> impl Future<Output = Result<Checkin>> + Send;
    /// Check-ins of one assignment, oldest first.
    fn list_checkins(
        &self,
        assignment_id: &str,
    ) -> impl Future<Output = Result<Vec<Checkin>>> + Send;

    fn list_task_templates(
        &self,
        active_only: bool,
    ) -> impl Future<Output = Result<Vec<TaskTemplate>>> + Send;
    fn insert_task_template(
        &self,
        template: NewTaskTemplate,
    ) -> impl Future<Output = Result<TaskTemplate>> + Send;
    fn set_template_active(
        &self,
        id: &str,
        active: bool,
    ) -> impl Future<Output = Result<TaskTemplate>> + Send;

    /// Bulk insert that silently skips rows conflicting on
    /// (user, template, date, shift). Returns the number of rows created.
    fn upsert_staff_tasks(
        &self,
        tasks: Vec<NewStaffTask>,
    ) -> impl Future<Output = Result<usize>> + Send;
    fn insert_staff_task(&self, task: NewStaffTask) -> impl Future<Output = Result<StaffTask>> + Send;
    fn get_staff_task(&self, id: &str) -> impl Future<Output = Result<Option<StaffTask>>> + Send;
    fn list_staff_tasks(
        &self,
        filter: TaskFilter,
    ) -> impl Future<Output = Result<Vec<StaffTask>>> + Send;
    fn update_staff_task(
        &self,
        id: &str,
        update: TaskUpdate,
    ) -> impl Future<Output = Result<StaffTask>> + Send;

    /// One row per staff member with an assignment or task on `date`.
    fn nightly_stats(
        &self,
        date: NaiveDate,
    ) -> impl Future<Output = Result<Vec<StaffNightRow>>> + Send;
    /// Incident check-ins created between `from` and `to` (inclusive), newest first.
    fn incidents_summary(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> impl Future<Output = Result<Vec<IncidentRow>>> + Send;
}

/// Async access to the evidence-photo bucket.
pub trait PhotoStore: Send + Sync {
    fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> impl Future<Output = Result<()>> + Send;
    /// A URL granting read access to `path` for `expires_in`.
    fn signed_url(
        &self,
        path: &str,
        expires_in: Duration,
    ) -> impl Future<Output = Result<String>> + Send;
    fn remove(&self, path: &str) -> impl Future<Output = Result<()>> + Send;
    /// Lifetime given to URLs handed out after an upload.
    fn url_ttl(&self) -> Duration {
        crate::photos::signed_url_ttl()
    }
}
