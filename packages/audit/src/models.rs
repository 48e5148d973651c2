//! # Domain models for rounds, check-ins and tasks
//!
//! Plain data structures shared by the server (Postgres rows are converted into
//! these) and the client (they cross the server-function boundary as JSON).
//! Identifiers are strings so the types work unchanged in WASM builds; the
//! server stores them as UUIDs.
//!
//! | Struct | Represents |
//! |--------|-----------|
//! | [`Profile`] | A user account with its [`Role`]. |
//! | [`Location`] | A physical checkpoint with its NFC/QR verification code. |
//! | [`Round`] | A named, ordered sequence of location ids. |
//! | [`DailyAssignment`] | A round bound to a user for a date and [`Shift`]. |
//! | [`Checkin`] | One verification of a location within an assignment. |
//! | [`TaskTemplate`] | A reusable task definition toggled active by admins. |
//! | [`StaffTask`] | A per-user, per-date, per-shift instance of a task. |
//!
//! The `New*` structs are insert payloads; `*Update` structs carry the
//! mutable columns of a lifecycle change.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Staff,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Staff => "staff",
        }
    }

    /// Landing page for this role.
    pub fn home_path(&self) -> &'static str {
        match self {
            Role::Admin => "/dashboard/admin",
            Role::Staff => "/dashboard/staff",
        }
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "staff" => Ok(Role::Staff),
            other => Err(Error::invalid(format!("Unknown role: {other}"))),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Role::Admin => "Administrator",
            Role::Staff => "Staff",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shift {
    Morning,
    Afternoon,
    Night,
}

impl Shift {
    pub const ALL: [Shift; 3] = [Shift::Morning, Shift::Afternoon, Shift::Night];

    pub fn as_str(&self) -> &'static str {
        match self {
            Shift::Morning => "morning",
            Shift::Afternoon => "afternoon",
            Shift::Night => "night",
        }
    }
}

impl FromStr for Shift {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "morning" => Ok(Shift::Morning),
            "afternoon" => Ok(Shift::Afternoon),
            "night" => Ok(Shift::Night),
            other => Err(Error::invalid(format!("Unknown shift: {other}"))),
        }
    }
}

impl fmt::Display for Shift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Shift::Morning => "Morning",
            Shift::Afternoon => "Afternoon",
            Shift::Night => "Night",
        })
    }
}

/// Lifecycle of a [`DailyAssignment`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    Pending,
    InProgress,
    Completed,
    Incomplete,
}

impl AssignmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentStatus::Pending => "pending",
            AssignmentStatus::InProgress => "in_progress",
            AssignmentStatus::Completed => "completed",
            AssignmentStatus::Incomplete => "incomplete",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AssignmentStatus::Completed | AssignmentStatus::Incomplete
        )
    }
}

impl FromStr for AssignmentStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(AssignmentStatus::Pending),
            "in_progress" => Ok(AssignmentStatus::InProgress),
            "completed" => Ok(AssignmentStatus::Completed),
            "incomplete" => Ok(AssignmentStatus::Incomplete),
            other => Err(Error::invalid(format!("Unknown assignment status: {other}"))),
        }
    }
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AssignmentStatus::Pending => "Pending",
            AssignmentStatus::InProgress => "In progress",
            AssignmentStatus::Completed => "Completed",
            AssignmentStatus::Incomplete => "Incomplete",
        })
    }
}

/// Lifecycle of a [`StaffTask`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Skipped,
    Blocked,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Skipped => "skipped",
            TaskStatus::Blocked => "blocked",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::Skipped | TaskStatus::Blocked
        )
    }
}

impl FromStr for TaskStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "in_progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            "skipped" => Ok(TaskStatus::Skipped),
            "blocked" => Ok(TaskStatus::Blocked),
            other => Err(Error::invalid(format!("Unknown task status: {other}"))),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::InProgress => "In progress",
            TaskStatus::Completed => "Completed",
            TaskStatus::Skipped => "Skipped",
            TaskStatus::Blocked => "Blocked",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        }
    }
}

impl FromStr for TaskPriority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(TaskPriority::Low),
            "medium" => Ok(TaskPriority::Medium),
            "high" => Ok(TaskPriority::High),
            other => Err(Error::invalid(format!("Unknown priority: {other}"))),
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TaskPriority::Low => "Low",
            TaskPriority::Medium => "Medium",
            TaskPriority::High => "High",
        })
    }
}

/// A user account. The password hash never leaves the server.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    /// Full name, falling back to the email address when empty.
    pub fn display_name(&self) -> &str {
        if self.full_name.trim().is_empty() {
            &self.email
        } else {
            &self.full_name
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewProfile {
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub password_hash: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    pub name: String,
    pub floor: i32,
    pub building: String,
    /// NFC tag id or QR payload attached to the checkpoint.
    pub verification_code: String,
}

impl Location {
    /// "Main · Floor 3 · Linen room"
    pub fn label(&self) -> String {
        format!("{} · Floor {} · {}", self.building, self.floor, self.name)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewLocation {
    pub name: String,
    pub floor: i32,
    pub building: String,
    pub verification_code: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Round {
    pub id: String,
    pub name: String,
    /// Checkpoints in the order they must be visited.
    pub location_ids: Vec<String>,
    pub estimated_minutes: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewRound {
    pub name: String,
    pub location_ids: Vec<String>,
    pub estimated_minutes: i32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DailyAssignment {
    pub id: String,
    pub user_id: String,
    pub round_id: String,
    pub date: NaiveDate,
    pub shift: Shift,
    pub status: AssignmentStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewAssignment {
    pub user_id: String,
    pub round_id: String,
    pub date: NaiveDate,
    pub shift: Shift,
}

/// Status change for an assignment. Timestamps left as `None` keep their
/// stored value.
#[derive(Clone, Debug, PartialEq)]
pub struct AssignmentUpdate {
    pub status: AssignmentStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AssignmentFilter {
    pub user_id: Option<String>,
    pub date: Option<NaiveDate>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Checkin {
    pub id: String,
    pub assignment_id: String,
    pub location_id: String,
    pub user_id: String,
    pub proof_photo_url: String,
    pub has_incident: bool,
    pub damage_photo_url: Option<String>,
    pub damage_description: Option<String>,
    pub nfc_verified: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewCheckin {
    pub assignment_id: String,
    pub location_id: String,
    pub user_id: String,
    pub proof_photo_url: String,
    pub has_incident: bool,
    pub damage_photo_url: Option<String>,
    pub damage_description: Option<String>,
    pub nfc_verified: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaskTemplate {
    pub id: String,
    pub title: String,
    pub category: String,
    /// Markdown shown to staff.
    pub instructions: String,
    pub priority: TaskPriority,
    pub requires_photo: bool,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewTaskTemplate {
    pub title: String,
    pub category: String,
    pub instructions: String,
    pub priority: TaskPriority,
    pub requires_photo: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StaffTask {
    pub id: String,
    pub user_id: String,
    /// `None` for custom one-off tasks.
    pub template_id: Option<String>,
    pub task_date: NaiveDate,
    pub shift: Shift,
    pub title: String,
    pub category: String,
    pub instructions: String,
    pub priority: TaskPriority,
    pub requires_photo: bool,
    pub status: TaskStatus,
    pub notes: Option<String>,
    pub photo_url: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewStaffTask {
    pub user_id: String,
    pub template_id: Option<String>,
    pub task_date: NaiveDate,
    pub shift: Shift,
    pub title: String,
    pub category: String,
    pub instructions: String,
    pub priority: TaskPriority,
    pub requires_photo: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TaskUpdate {
    pub status: TaskStatus,
    pub notes: Option<String>,
    pub photo_url: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TaskFilter {
    pub user_id: Option<String>,
    pub date: Option<NaiveDate>,
    pub shift: Option<Shift>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_strings_roundtrip() {
        for status in [
            AssignmentStatus::Pending,
            AssignmentStatus::InProgress,
            AssignmentStatus::Completed,
            AssignmentStatus::Incomplete,
        ] {
            assert_eq!(status.as_str().parse::<AssignmentStatus>(), Ok(status));
        }
        assert!("done".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!TaskStatus::InProgress.is_terminal());
        assert!(TaskStatus::Blocked.is_terminal());
        assert!(AssignmentStatus::Incomplete.is_terminal());
        assert!(!AssignmentStatus::Pending.is_terminal());
    }

    #[test]
    fn test_role_home_paths() {
        assert_eq!(Role::Admin.home_path(), "/dashboard/admin");
        assert_eq!(Role::Staff.home_path(), "/dashboard/staff");
    }

    #[test]
    fn test_display_name_falls_back_to_email() {
        let profile = Profile {
            id: "u1".to_string(),
            email: "night@hotel.test".to_string(),
            full_name: "  ".to_string(),
            role: Role::Staff,
            created_at: Utc::now(),
        };
        assert_eq!(profile.display_name(), "night@hotel.test");
    }
}
