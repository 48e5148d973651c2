//! # API crate: fullstack server functions for NightAudit
//!
//! Every public `async fn` in this file is a Dioxus server function, compiled
//! twice: once with the server logic (behind `#[cfg(feature = "server")]`)
//! and once as a client stub the web frontend calls over HTTP.
//!
//! | Module | Feature gate | Purpose |
//! |--------|-------------|---------|
//! | [`auth`] | `server` | password accounts, sessions, role checks |
//! | [`db`] | `server` | Postgres pool and the [`db::PgStore`] audit store |
//! | [`settings`] | `server` | layered configuration |
//! | [`storage`] | `server` | filesystem photo store with signed URLs |
//! | [`models`] | none | client-safe [`UserInfo`] |
//!
//! The server bodies only authorize the caller and delegate to the `audit`
//! crate. Errors are translated through `audit::messages` before they reach
//! the UI.

use chrono::NaiveDate;
use dioxus::prelude::*;

use audit::assignments::AssignmentSummary;
use audit::checkin::CheckinSubmission;
use audit::dashboard::{IncidentSummary, NightlyOverview};
use audit::progress::RoundProgress;
use audit::tasks::{AssignOutcome, CustomTask, TaskStatusChange};
use audit::{
    Checkin, DailyAssignment, Location, NewTaskTemplate, Role, Round, Shift, StaffTask,
    TaskTemplate,
};

pub mod auth;
pub mod db;
pub mod models;
#[cfg(feature = "server")]
pub mod settings;
#[cfg(feature = "server")]
pub mod storage;

pub use models::UserInfo;

/// The message to show the user for a failed server call.
pub fn error_message(e: &ServerFnError) -> String {
    match e {
        ServerFnError::ServerError { message, .. } => message.clone(),
        other => other.to_string(),
    }
}

#[cfg(feature = "server")]
fn fail(e: audit::Error) -> ServerFnError {
    match &e {
        audit::Error::Backend(_) | audit::Error::Storage(_) => tracing::error!("{}", e),
        _ => tracing::debug!("{}", e),
    }
    let messages: Vec<String> = e
        .messages()
        .iter()
        .map(|m| audit::messages::user_message(m))
        .collect();
    ServerFnError::new(messages.join("; "))
}

#[cfg(feature = "server")]
async fn store() -> Result<db::PgStore, ServerFnError> {
    db::PgStore::shared().await.map_err(fail)
}

#[cfg(feature = "server")]
async fn admin(session: &tower_sessions::Session) -> Result<(db::PgStore, audit::Profile), ServerFnError> {
    let store = store().await?;
    let profile = auth::require_role(session, &store, Role::Admin)
        .await
        .map_err(fail)?;
    Ok((store, profile))
}

/// Mock dashboards read no tables, so only the session cookie is checked.
#[cfg(feature = "server")]
async fn mock_viewer(session: &tower_sessions::Session) -> Result<(), ServerFnError> {
    match auth::session_user_id(session).await.map_err(fail)? {
        Some(_) => Ok(()),
        None => Err(fail(audit::Error::Unauthenticated)),
    }
}

#[cfg(feature = "server")]
async fn signed_in(session: &tower_sessions::Session) -> Result<(db::PgStore, audit::Profile), ServerFnError> {
    let store = store().await?;
    let profile = auth::require_user(session, &store).await.map_err(fail)?;
    Ok((store, profile))
}

/// Get the current authenticated user from the session.
#[cfg(feature = "server")]
#[get("/api/auth/me", session: tower_sessions::Session)]
pub async fn get_current_user() -> Result<Option<UserInfo>, ServerFnError> {
    let store = store().await?;
    let profile = auth::current_profile(&session, &store)
        .await
        .map_err(fail)?;
    Ok(profile.map(UserInfo::from))
}

#[cfg(not(feature = "server"))]
#[get("/api/auth/me")]
pub async fn get_current_user() -> Result<Option<UserInfo>, ServerFnError> {
    Ok(None)
}

/// Log in with email and password.
#[cfg(feature = "server")]
#[post("/api/auth/login", session: tower_sessions::Session)]
pub async fn login(email: String, password: String) -> Result<UserInfo, ServerFnError> {
    let store = store().await?;
    let credentials = store
        .find_credentials(email.trim())
        .await
        .map_err(fail)?;
    let profile = auth::authenticate(credentials, &password).map_err(fail)?;
    auth::sign_in(&session, &profile).await.map_err(fail)?;
    tracing::info!("{} signed in", profile.email);
    Ok(profile.into())
}

#[cfg(not(feature = "server"))]
#[post("/api/auth/login")]
pub async fn login(email: String, password: String) -> Result<UserInfo, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Log out the current user by clearing the session.
#[cfg(feature = "server")]
#[post("/api/auth/logout", session: tower_sessions::Session)]
pub async fn logout() -> Result<(), ServerFnError> {
    session
        .flush()
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    Ok(())
}

#[cfg(not(feature = "server"))]
#[post("/api/auth/logout")]
pub async fn logout() -> Result<(), ServerFnError> {
    Ok(())
}

#[cfg(feature = "server")]
#[get("/api/admin/users", session: tower_sessions::Session)]
pub async fn list_users() -> Result<Vec<UserInfo>, ServerFnError> {
    use audit::AuditStore;

    let (store, _) = admin(&session).await?;
    let profiles = store.list_profiles().await.map_err(fail)?;
    Ok(profiles.into_iter().map(UserInfo::from).collect())
}

#[cfg(not(feature = "server"))]
#[get("/api/admin/users")]
pub async fn list_users() -> Result<Vec<UserInfo>, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

#[cfg(feature = "server")]
#[post("/api/admin/users/create", session: tower_sessions::Session)]
pub async fn create_user(
    email: String,
    password: String,
    full_name: String,
    role: Role,
) -> Result<UserInfo, ServerFnError> {
    let (store, _) = admin(&session).await?;
    let profile = auth::create_user(
        &store,
        auth::NewUser {
            email,
            password,
            full_name,
            role,
        },
    )
    .await
    .map_err(fail)?;
    Ok(profile.into())
}

#[cfg(not(feature = "server"))]
#[post("/api/admin/users/create")]
pub async fn create_user(
    email: String,
    password: String,
    full_name: String,
    role: Role,
) -> Result<UserInfo, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Assign the default tasks to every staff member for a date and shift.
#[cfg(feature = "server")]
#[post("/api/admin/seed-tasks", session: tower_sessions::Session)]
pub async fn seed_tasks(date: NaiveDate, shift: Shift) -> Result<AssignOutcome, ServerFnError> {
    let (store, _) = admin(&session).await?;
    audit::tasks::seed_demo_assignments(&store, date, shift)
        .await
        .map_err(fail)
}

#[cfg(not(feature = "server"))]
#[post("/api/admin/seed-tasks")]
pub async fn seed_tasks(date: NaiveDate, shift: Shift) -> Result<AssignOutcome, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

#[cfg(feature = "server")]
#[get("/api/locations", session: tower_sessions::Session)]
pub async fn list_locations() -> Result<Vec<Location>, ServerFnError> {
    use audit::AuditStore;

    let (store, _) = signed_in(&session).await?;
    store.list_locations().await.map_err(fail)
}

#[cfg(not(feature = "server"))]
#[get("/api/locations")]
pub async fn list_locations() -> Result<Vec<Location>, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

#[cfg(feature = "server")]
#[post("/api/admin/locations", session: tower_sessions::Session)]
pub async fn create_location(
    name: String,
    floor: i32,
    building: String,
    verification_code: String,
) -> Result<Location, ServerFnError> {
    let (store, _) = admin(&session).await?;
    audit::rounds::create_location(
        &store,
        audit::NewLocation {
            name,
            floor,
            building,
            verification_code,
        },
    )
    .await
    .map_err(fail)
}

#[cfg(not(feature = "server"))]
#[post("/api/admin/locations")]
pub async fn create_location(
    name: String,
    floor: i32,
    building: String,
    verification_code: String,
) -> Result<Location, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

#[cfg(feature = "server")]
#[get("/api/rounds", session: tower_sessions::Session)]
pub async fn list_rounds() -> Result<Vec<Round>, ServerFnError> {
    use audit::AuditStore;

    let (store, _) = signed_in(&session).await?;
    store.list_rounds().await.map_err(fail)
}

#[cfg(not(feature = "server"))]
#[get("/api/rounds")]
pub async fn list_rounds() -> Result<Vec<Round>, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

#[cfg(feature = "server")]
#[post("/api/admin/rounds", session: tower_sessions::Session)]
pub async fn create_round(
    name: String,
    location_ids: Vec<String>,
    estimated_minutes: i32,
) -> Result<Round, ServerFnError> {
    let (store, _) = admin(&session).await?;
    audit::rounds::create_round(
        &store,
        audit::NewRound {
            name,
            location_ids,
            estimated_minutes,
        },
    )
    .await
    .map_err(fail)
}

#[cfg(not(feature = "server"))]
#[post("/api/admin/rounds")]
pub async fn create_round(
    name: String,
    location_ids: Vec<String>,
    estimated_minutes: i32,
) -> Result<Round, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

#[cfg(feature = "server")]
#[post("/api/admin/rounds/duplicate", session: tower_sessions::Session)]
pub async fn duplicate_round(round_id: String, name: Option<String>) -> Result<Round, ServerFnError> {
    let (store, _) = admin(&session).await?;
    audit::rounds::duplicate_round(&store, &round_id, name)
        .await
        .map_err(fail)
}

#[cfg(not(feature = "server"))]
#[post("/api/admin/rounds/duplicate")]
pub async fn duplicate_round(round_id: String, name: Option<String>) -> Result<Round, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

#[cfg(feature = "server")]
#[post("/api/admin/assignments", session: tower_sessions::Session)]
pub async fn assign_round(
    user_id: String,
    round_id: String,
    date: NaiveDate,
    shift: Shift,
) -> Result<DailyAssignment, ServerFnError> {
    let (store, _) = admin(&session).await?;
    audit::assignments::assign_round(
        &store,
        audit::NewAssignment {
            user_id,
            round_id,
            date,
            shift,
        },
    )
    .await
    .map_err(fail)
}

#[cfg(not(feature = "server"))]
#[post("/api/admin/assignments")]
pub async fn assign_round(
    user_id: String,
    round_id: String,
    date: NaiveDate,
    shift: Shift,
) -> Result<DailyAssignment, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

#[cfg(feature = "server")]
#[post("/api/admin/assignments/list", session: tower_sessions::Session)]
pub async fn list_assignments(date: NaiveDate) -> Result<Vec<AssignmentSummary>, ServerFnError> {
    let (store, _) = admin(&session).await?;
    audit::assignments::summarize(
        &store,
        audit::AssignmentFilter {
            user_id: None,
            date: Some(date),
        },
    )
    .await
    .map_err(fail)
}

#[cfg(not(feature = "server"))]
#[post("/api/admin/assignments/list")]
pub async fn list_assignments(date: NaiveDate) -> Result<Vec<AssignmentSummary>, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

#[cfg(feature = "server")]
#[post("/api/assignments/mine", session: tower_sessions::Session)]
pub async fn my_assignments(date: NaiveDate) -> Result<Vec<AssignmentSummary>, ServerFnError> {
    let (store, profile) = signed_in(&session).await?;
    audit::assignments::assignments_for(&store, &profile.id, date)
        .await
        .map_err(fail)
}

#[cfg(not(feature = "server"))]
#[post("/api/assignments/mine")]
pub async fn my_assignments(date: NaiveDate) -> Result<Vec<AssignmentSummary>, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Progress of one assignment, for its owner or any administrator.
#[cfg(feature = "server")]
#[post("/api/assignments/progress", session: tower_sessions::Session)]
pub async fn get_round_progress(assignment_id: String) -> Result<RoundProgress, ServerFnError> {
    let (store, profile) = signed_in(&session).await?;
    let progress = audit::progress::load_progress(&store, &assignment_id)
        .await
        .map_err(fail)?;
    if profile.role != Role::Admin && progress.assignment.user_id != profile.id {
        return Err(fail(audit::Error::Forbidden));
    }
    Ok(progress)
}

#[cfg(not(feature = "server"))]
#[post("/api/assignments/progress")]
pub async fn get_round_progress(assignment_id: String) -> Result<RoundProgress, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

#[cfg(feature = "server")]
#[post("/api/assignments/start", session: tower_sessions::Session)]
pub async fn start_round(assignment_id: String) -> Result<DailyAssignment, ServerFnError> {
    let (store, profile) = signed_in(&session).await?;
    audit::assignments::start_round(&store, &profile.id, &assignment_id, chrono::Utc::now())
        .await
        .map_err(fail)
}

#[cfg(not(feature = "server"))]
#[post("/api/assignments/start")]
pub async fn start_round(assignment_id: String) -> Result<DailyAssignment, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

#[cfg(feature = "server")]
#[post("/api/assignments/finish", session: tower_sessions::Session)]
pub async fn finish_round(assignment_id: String) -> Result<DailyAssignment, ServerFnError> {
    let (store, profile) = signed_in(&session).await?;
    audit::assignments::finish_round(&store, &profile.id, &assignment_id, chrono::Utc::now())
        .await
        .map_err(fail)
}

#[cfg(not(feature = "server"))]
#[post("/api/assignments/finish")]
pub async fn finish_round(assignment_id: String) -> Result<DailyAssignment, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Record a checkpoint visit, then advance the assignment status. A failed
/// status update is logged and does not undo the check-in.
#[cfg(feature = "server")]
#[post("/api/checkins", session: tower_sessions::Session)]
pub async fn submit_checkin(submission: CheckinSubmission) -> Result<Checkin, ServerFnError> {
    let (store, profile) = signed_in(&session).await?;
    let now = chrono::Utc::now();
    let checkin = audit::checkin::submit_checkin(
        &store,
        storage::photo_store(),
        &profile.id,
        submission,
        now,
    )
    .await
    .map_err(fail)?;

    if let Err(e) = audit::assignments::record_checkin(&store, &checkin.assignment_id, now).await {
        tracing::warn!(
            "Check-in {} stored but assignment {} was not advanced: {}",
            checkin.id,
            checkin.assignment_id,
            e
        );
    }
    Ok(checkin)
}

#[cfg(not(feature = "server"))]
#[post("/api/checkins")]
pub async fn submit_checkin(submission: CheckinSubmission) -> Result<Checkin, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

#[cfg(feature = "server")]
#[get("/api/admin/templates", session: tower_sessions::Session)]
pub async fn list_templates() -> Result<Vec<TaskTemplate>, ServerFnError> {
    use audit::AuditStore;

    let (store, _) = admin(&session).await?;
    store.list_task_templates(false).await.map_err(fail)
}

#[cfg(not(feature = "server"))]
#[get("/api/admin/templates")]
pub async fn list_templates() -> Result<Vec<TaskTemplate>, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

#[cfg(feature = "server")]
#[post("/api/admin/templates/create", session: tower_sessions::Session)]
pub async fn create_template(template: NewTaskTemplate) -> Result<TaskTemplate, ServerFnError> {
    let (store, _) = admin(&session).await?;
    audit::tasks::create_template(&store, template)
        .await
        .map_err(fail)
}

#[cfg(not(feature = "server"))]
#[post("/api/admin/templates/create")]
pub async fn create_template(template: NewTaskTemplate) -> Result<TaskTemplate, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

#[cfg(feature = "server")]
#[post("/api/admin/templates/toggle", session: tower_sessions::Session)]
pub async fn toggle_template(template_id: String) -> Result<TaskTemplate, ServerFnError> {
    let (store, _) = admin(&session).await?;
    audit::tasks::toggle_template(&store, &template_id)
        .await
        .map_err(fail)
}

#[cfg(not(feature = "server"))]
#[post("/api/admin/templates/toggle")]
pub async fn toggle_template(template_id: String) -> Result<TaskTemplate, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

#[cfg(feature = "server")]
#[post("/api/admin/tasks/defaults", session: tower_sessions::Session)]
pub async fn assign_default_tasks(
    user_id: String,
    date: NaiveDate,
    shift: Shift,
) -> Result<AssignOutcome, ServerFnError> {
    let (store, _) = admin(&session).await?;
    audit::tasks::assign_defaults(&store, &user_id, date, shift)
        .await
        .map_err(fail)
}

#[cfg(not(feature = "server"))]
#[post("/api/admin/tasks/defaults")]
pub async fn assign_default_tasks(
    user_id: String,
    date: NaiveDate,
    shift: Shift,
) -> Result<AssignOutcome, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

#[cfg(feature = "server")]
#[post("/api/admin/tasks/custom", session: tower_sessions::Session)]
pub async fn assign_custom_task(task: CustomTask) -> Result<StaffTask, ServerFnError> {
    let (store, _) = admin(&session).await?;
    audit::tasks::assign_custom(&store, task).await.map_err(fail)
}

#[cfg(not(feature = "server"))]
#[post("/api/admin/tasks/custom")]
pub async fn assign_custom_task(task: CustomTask) -> Result<StaffTask, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

#[cfg(feature = "server")]
#[post("/api/admin/tasks/list", session: tower_sessions::Session)]
pub async fn list_tasks_for(user_id: String, date: NaiveDate) -> Result<Vec<StaffTask>, ServerFnError> {
    let (store, _) = admin(&session).await?;
    audit::tasks::tasks_for(&store, &user_id, date, None)
        .await
        .map_err(fail)
}

#[cfg(not(feature = "server"))]
#[post("/api/admin/tasks/list")]
pub async fn list_tasks_for(user_id: String, date: NaiveDate) -> Result<Vec<StaffTask>, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

#[cfg(feature = "server")]
#[post("/api/tasks/mine", session: tower_sessions::Session)]
pub async fn my_tasks(date: NaiveDate, shift: Option<Shift>) -> Result<Vec<StaffTask>, ServerFnError> {
    let (store, profile) = signed_in(&session).await?;
    audit::tasks::tasks_for(&store, &profile.id, date, shift)
        .await
        .map_err(fail)
}

#[cfg(not(feature = "server"))]
#[post("/api/tasks/mine")]
pub async fn my_tasks(date: NaiveDate, shift: Option<Shift>) -> Result<Vec<StaffTask>, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

#[cfg(feature = "server")]
#[post("/api/tasks/update", session: tower_sessions::Session)]
pub async fn update_task(change: TaskStatusChange) -> Result<StaffTask, ServerFnError> {
    let (store, profile) = signed_in(&session).await?;
    audit::tasks::update_task_status(
        &store,
        storage::photo_store(),
        &profile.id,
        change,
        chrono::Utc::now(),
    )
    .await
    .map_err(fail)
}

#[cfg(not(feature = "server"))]
#[post("/api/tasks/update")]
pub async fn update_task(change: TaskStatusChange) -> Result<StaffTask, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

#[cfg(feature = "server")]
#[post("/api/dashboard/nightly", session: tower_sessions::Session)]
pub async fn nightly_overview(date: NaiveDate) -> Result<NightlyOverview, ServerFnError> {
    use audit::AuditStore;

    let rows = if settings::settings().dashboards.mock_data {
        mock_viewer(&session).await?;
        audit::dashboard::mock_nightly_rows()
    } else {
        let (store, _) = admin(&session).await?;
        store.nightly_stats(date).await.map_err(fail)?
    };
    Ok(audit::dashboard::nightly_overview(date, rows))
}

#[cfg(not(feature = "server"))]
#[post("/api/dashboard/nightly")]
pub async fn nightly_overview(date: NaiveDate) -> Result<NightlyOverview, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

#[cfg(feature = "server")]
#[post("/api/dashboard/incidents", session: tower_sessions::Session)]
pub async fn incident_summary(from: NaiveDate, to: NaiveDate) -> Result<IncidentSummary, ServerFnError> {
    use audit::AuditStore;

    if from > to {
        return Err(fail(audit::Error::invalid("The start date must not be after the end date")));
    }
    let rows = if settings::settings().dashboards.mock_data {
        mock_viewer(&session).await?;
        audit::dashboard::mock_incident_rows(from, to)
    } else {
        let (store, _) = admin(&session).await?;
        store.incidents_summary(from, to).await.map_err(fail)?
    };
    Ok(audit::dashboard::incident_summary(from, to, rows))
}

#[cfg(not(feature = "server"))]
#[post("/api/dashboard/incidents")]
pub async fn incident_summary(from: NaiveDate, to: NaiveDate) -> Result<IncidentSummary, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}
