//! [`AuditStore`] over PostgreSQL.
//!
//! Rows are read into private `FromRow` structs with native column types
//! (UUIDs, text enums) and converted into the string-keyed `audit` models.
//! Unique violations surface as [`Error::Duplicate`] carrying the
//! constraint name so `audit::messages` can translate them.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use audit::dashboard::{IncidentRow, StaffNightRow};
use audit::{
    AssignmentFilter, AssignmentUpdate, AuditStore, Checkin, DailyAssignment, Error, Location,
    NewAssignment, NewCheckin, NewLocation, NewProfile, NewRound, NewStaffTask, NewTaskTemplate,
    Profile, Result, Round, StaffTask, TaskFilter, TaskTemplate, TaskUpdate,
};

use super::get_pool;

const SHIFT_ORDER: &str = "array_position(ARRAY['morning','afternoon','night'], shift)";
const PRIORITY_ORDER: &str = "array_position(ARRAY['low','medium','high'], priority)";

fn db_err(e: sqlx::Error) -> Error {
    if let sqlx::Error::Database(db) = &e {
        if db.code().as_deref() == Some("23505") {
            let name = db.constraint().unwrap_or_else(|| db.message());
            return Error::Duplicate(name.to_string());
        }
    }
    Error::Backend(e.to_string())
}

fn parse_id(id: &str) -> Option<Uuid> {
    Uuid::parse_str(id).ok()
}

fn require_id(entity: &'static str, id: &str) -> Result<Uuid> {
    parse_id(id).ok_or_else(|| Error::not_found(entity, id))
}

#[derive(FromRow)]
struct ProfileRow {
    id: Uuid,
    email: String,
    full_name: String,
    role: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl ProfileRow {
    fn into_profile(self) -> Result<Profile> {
        Ok(Profile {
            id: self.id.to_string(),
            email: self.email,
            full_name: self.full_name,
            role: self.role.parse()?,
            created_at: self.created_at,
        })
    }
}

#[derive(FromRow)]
struct LocationRow {
    id: Uuid,
    name: String,
    floor: i32,
    building: String,
    verification_code: String,
}

impl From<LocationRow> for Location {
    fn from(row: LocationRow) -> Self {
        Location {
            id: row.id.to_string(),
            name: row.name,
            floor: row.floor,
            building: row.building,
            verification_code: row.verification_code,
        }
    }
}

#[derive(FromRow)]
struct RoundRow {
    id: Uuid,
    name: String,
    location_ids: Vec<Uuid>,
    estimated_minutes: i32,
    created_at: DateTime<Utc>,
}

impl From<RoundRow> for Round {
    fn from(row: RoundRow) -> Self {
        Round {
            id: row.id.to_string(),
            name: row.name,
            location_ids: row.location_ids.iter().map(Uuid::to_string).collect(),
            estimated_minutes: row.estimated_minutes,
            created_at: row.created_at,
        }
    }
}

#[derive(FromRow)]
struct AssignmentRow {
    id: Uuid,
    user_id: Uuid,
    round_id: Uuid,
    date: NaiveDate,
    shift: String,
    status: String,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}

impl AssignmentRow {
    fn into_assignment(self) -> Result<DailyAssignment> {
        Ok(DailyAssignment {
            id: self.id.to_string(),
            user_id: self.user_id.to_string(),
            round_id: self.round_id.to_string(),
            date: self.date,
            shift: self.shift.parse()?,
            status: self.status.parse()?,
            started_at: self.started_at,
            completed_at: self.completed_at,
        })
    }
}

#[derive(FromRow)]
struct CheckinRow {
    id: Uuid,
    assignment_id: Uuid,
    location_id: Uuid,
    user_id: Uuid,
    proof_photo_url: String,
    has_incident: bool,
    damage_photo_url: Option<String>,
    damage_description: Option<String>,
    nfc_verified: bool,
    created_at: DateTime<Utc>,
}

impl From<CheckinRow> for Checkin {
    fn from(row: CheckinRow) -> Self {
        Checkin {
            id: row.id.to_string(),
            assignment_id: row.assignment_id.to_string(),
            location_id: row.location_id.to_string(),
            user_id: row.user_id.to_string(),
            proof_photo_url: row.proof_photo_url,
            has_incident: row.has_incident,
            damage_photo_url: row.damage_photo_url,
            damage_description: row.damage_description,
            nfc_verified: row.nfc_verified,
            created_at: row.created_at,
        }
    }
}

#[derive(FromRow)]
struct TemplateRow {
    id: Uuid,
    title: String,
    category: String,
    instructions: String,
    priority: String,
    requires_photo: bool,
    active: bool,
    created_at: DateTime<Utc>,
}

impl TemplateRow {
    fn into_template(self) -> Result<TaskTemplate> {
        Ok(TaskTemplate {
            id: self.id.to_string(),
            title: self.title,
            category: self.category,
            instructions: self.instructions,
            priority: self.priority.parse()?,
            requires_photo: self.requires_photo,
            active: self.active,
            created_at: self.created_at,
        })
    }
}

#[derive(FromRow)]
struct TaskRow {
    id: Uuid,
    user_id: Uuid,
    template_id: Option<Uuid>,
    task_date: NaiveDate,
    shift: String,
    title: String,
    category: String,
    instructions: String,
    priority: String,
    requires_photo: bool,
    status: String,
    notes: Option<String>,
    photo_url: Option<String>,
    completed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TaskRow {
    fn into_task(self) -> Result<StaffTask> {
        Ok(StaffTask {
            id: self.id.to_string(),
            user_id: self.user_id.to_string(),
            template_id: self.template_id.map(|id| id.to_string()),
            task_date: self.task_date,
            shift: self.shift.parse()?,
            title: self.title,
            category: self.category,
            instructions: self.instructions,
            priority: self.priority.parse()?,
            requires_photo: self.requires_photo,
            status: self.status.parse()?,
            notes: self.notes,
            photo_url: self.photo_url,
            completed_at: self.completed_at,
            created_at: self.created_at,
        })
    }
}

#[derive(FromRow)]
struct NightRow {
    user_id: Uuid,
    full_name: String,
    rounds_assigned: i64,
    rounds_completed: i64,
    checkpoints_total: i64,
    checkpoints_done: i64,
    incidents: i64,
    tasks_total: i64,
    tasks_done: i64,
}

#[derive(FromRow)]
struct IncidentQueryRow {
    checkin_id: Uuid,
    created_at: DateTime<Utc>,
    location_name: String,
    building: String,
    floor: i32,
    staff_name: String,
    description: Option<String>,
    damage_photo_url: Option<String>,
}

/// Postgres-backed audit tables.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A store over the shared process-wide pool.
    pub async fn shared() -> Result<Self> {
        let pool = get_pool().await.map_err(db_err)?;
        Ok(Self::new(pool.clone()))
    }

    /// Profile and password hash for a login attempt.
    pub async fn find_credentials(&self, email: &str) -> Result<Option<(Profile, String)>> {
        let row: Option<ProfileRow> =
            sqlx::query_as("SELECT * FROM profiles WHERE lower(email) = lower($1)")
                .bind(email)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_err)?;
        match row {
            Some(row) => {
                let hash = row.password_hash.clone();
                Ok(Some((row.into_profile()?, hash)))
            }
            None => Ok(None),
        }
    }
}

impl AuditStore for PgStore {
    async fn get_profile(&self, id: &str) -> Result<Option<Profile>> {
        let Some(id) = parse_id(id) else {
            return Ok(None);
        };
        let row: Option<ProfileRow> = sqlx::query_as("SELECT * FROM profiles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.map(ProfileRow::into_profile).transpose()
    }

    async fn find_profile_by_email(&self, email: &str) -> Result<Option<Profile>> {
        Ok(self.find_credentials(email).await?.map(|(profile, _)| profile))
    }

    async fn list_profiles(&self) -> Result<Vec<Profile>> {
        let rows: Vec<ProfileRow> =
            sqlx::query_as("SELECT * FROM profiles ORDER BY full_name, email")
                .fetch_all(&self.pool)
                .await
                .map_err(db_err)?;
        rows.into_iter().map(ProfileRow::into_profile).collect()
    }

    async fn insert_profile(&self, profile: NewProfile) -> Result<Profile> {
        let row: ProfileRow = sqlx::query_as(
            "INSERT INTO profiles (email, full_name, role, password_hash)
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(&profile.email)
        .bind(&profile.full_name)
        .bind(profile.role.as_str())
        .bind(&profile.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;
        row.into_profile()
    }

    async fn list_locations(&self) -> Result<Vec<Location>> {
        let rows: Vec<LocationRow> =
            sqlx::query_as("SELECT * FROM locations ORDER BY building, floor, name")
                .fetch_all(&self.pool)
                .await
                .map_err(db_err)?;
        Ok(rows.into_iter().map(Location::from).collect())
    }

    async fn insert_location(&self, location: NewLocation) -> Result<Location> {
        let row: LocationRow = sqlx::query_as(
            "INSERT INTO locations (name, floor, building, verification_code)
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(&location.name)
        .bind(location.floor)
        .bind(&location.building)
        .bind(&location.verification_code)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(row.into())
    }

    async fn list_rounds(&self) -> Result<Vec<Round>> {
        let rows: Vec<RoundRow> = sqlx::query_as("SELECT * FROM rounds ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(rows.into_iter().map(Round::from).collect())
    }

    async fn get_round(&self, id: &str) -> Result<Option<Round>> {
        let Some(id) = parse_id(id) else {
            return Ok(None);
        };
        let row: Option<RoundRow> = sqlx::query_as("SELECT * FROM rounds WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(row.map(Round::from))
    }

    async fn insert_round(&self, round: NewRound) -> Result<Round> {
        let location_ids = round
            .location_ids
            .iter()
            .map(|id| require_id("location", id))
            .collect::<Result<Vec<Uuid>>>()?;
        let row: RoundRow = sqlx::query_as(
            "INSERT INTO rounds (name, location_ids, estimated_minutes)
             VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(&round.name)
        .bind(&location_ids)
        .bind(round.estimated_minutes)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(row.into())
    }

    async fn get_assignment(&self, id: &str) -> Result<Option<DailyAssignment>> {
        let Some(id) = parse_id(id) else {
            return Ok(None);
        };
        let row: Option<AssignmentRow> =
            sqlx::query_as("SELECT * FROM daily_assignments WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_err)?;
        row.map(AssignmentRow::into_assignment).transpose()
    }

    async fn list_assignments(&self, filter: AssignmentFilter) -> Result<Vec<DailyAssignment>> {
        let user_id = match filter.user_id.as_deref() {
            Some(id) => match parse_id(id) {
                Some(id) => Some(id),
                None => return Ok(Vec::new()),
            },
            None => None,
        };
        let sql = format!(
            "SELECT * FROM daily_assignments
             WHERE ($1::uuid IS NULL OR user_id = $1)
               AND ($2::date IS NULL OR date = $2)
             ORDER BY date, {SHIFT_ORDER}"
        );
        let rows: Vec<AssignmentRow> = sqlx::query_as(&sql)
            .bind(user_id)
            .bind(filter.date)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.into_iter().map(AssignmentRow::into_assignment).collect()
    }

    async fn insert_assignment(&self, assignment: NewAssignment) -> Result<DailyAssignment> {
        let user_id = require_id("user", &assignment.user_id)?;
        let round_id = require_id("round", &assignment.round_id)?;
        let row: AssignmentRow = sqlx::query_as(
            "INSERT INTO daily_assignments (user_id, round_id, date, shift)
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(user_id)
        .bind(round_id)
        .bind(assignment.date)
        .bind(assignment.shift.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;
        row.into_assignment()
    }

    async fn update_assignment(&self, id: &str, update: AssignmentUpdate) -> Result<DailyAssignment> {
        let uuid = require_id("assignment", id)?;
        let row: Option<AssignmentRow> = sqlx::query_as(
            "UPDATE daily_assignments
             SET status = $2,
                 started_at = COALESCE($3, started_at),
                 completed_at = COALESCE($4, completed_at)
             WHERE id = $1 RETURNING *",
        )
        .bind(uuid)
        .bind(update.status.as_str())
        .bind(update.started_at)
        .bind(update.completed_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.ok_or_else(|| Error::not_found("assignment", id))?
            .into_assignment()
    }

    async fn insert_checkin(&self, checkin: NewCheckin) -> Result<Checkin> {
        let row: CheckinRow = sqlx::query_as(
            "INSERT INTO checkins (assignment_id, location_id, user_id, proof_photo_url,
                                   has_incident, damage_photo_url, damage_description,
                                   nfc_verified, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING *",
        )
        .bind(require_id("assignment", &checkin.assignment_id)?)
        .bind(require_id("location", &checkin.location_id)?)
        .bind(require_id("user", &checkin.user_id)?)
        .bind(&checkin.proof_photo_url)
        .bind(checkin.has_incident)
        .bind(&checkin.damage_photo_url)
        .bind(&checkin.damage_description)
        .bind(checkin.nfc_verified)
        .bind(checkin.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(row.into())
    }

    async fn list_checkins(&self, assignment_id: &str) -> Result<Vec<Checkin>> {
        let Some(id) = parse_id(assignment_id) else {
            return Ok(Vec::new());
        };
        let rows: Vec<CheckinRow> = sqlx::query_as(
            "SELECT * FROM checkins WHERE assignment_id = $1 ORDER BY created_at",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(rows.into_iter().map(Checkin::from).collect())
    }

    async fn list_task_templates(&self, active_only: bool) -> Result<Vec<TaskTemplate>> {
        let rows: Vec<TemplateRow> = sqlx::query_as(
            "SELECT * FROM task_templates WHERE active OR NOT $1 ORDER BY category, title",
        )
        .bind(active_only)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.into_iter().map(TemplateRow::into_template).collect()
    }

    async fn insert_task_template(&self, template: NewTaskTemplate) -> Result<TaskTemplate> {
        let row: TemplateRow = sqlx::query_as(
            "INSERT INTO task_templates (title, category, instructions, priority, requires_photo)
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(&template.title)
        .bind(&template.category)
        .bind(&template.instructions)
        .bind(template.priority.as_str())
        .bind(template.requires_photo)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;
        row.into_template()
    }

    async fn set_template_active(&self, id: &str, active: bool) -> Result<TaskTemplate> {
        let uuid = require_id("template", id)?;
        let row: Option<TemplateRow> = sqlx::query_as(
            "UPDATE task_templates SET active = $2 WHERE id = $1 RETURNING *",
        )
        .bind(uuid)
        .bind(active)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.ok_or_else(|| Error::not_found("template", id))?
            .into_template()
    }

    async fn upsert_staff_tasks(&self, tasks: Vec<NewStaffTask>) -> Result<usize> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        let mut created = 0;
        for task in tasks {
            let template_id = match task.template_id.as_deref() {
                Some(id) => Some(require_id("template", id)?),
                None => None,
            };
            let result = sqlx::query(
                "INSERT INTO staff_tasks (user_id, template_id, task_date, shift, title,
                                          category, instructions, priority, requires_photo)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                 ON CONFLICT ON CONSTRAINT staff_tasks_slot_key DO NOTHING",
            )
            .bind(require_id("user", &task.user_id)?)
            .bind(template_id)
            .bind(task.task_date)
            .bind(task.shift.as_str())
            .bind(&task.title)
            .bind(&task.category)
            .bind(&task.instructions)
            .bind(task.priority.as_str())
            .bind(task.requires_photo)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
            created += result.rows_affected() as usize;
        }
        tx.commit().await.map_err(db_err)?;
        Ok(created)
    }

    async fn insert_staff_task(&self, task: NewStaffTask) -> Result<StaffTask> {
        let template_id = match task.template_id.as_deref() {
            Some(id) => Some(require_id("template", id)?),
            None => None,
        };
        let row: TaskRow = sqlx::query_as(
            "INSERT INTO staff_tasks (user_id, template_id, task_date, shift, title,
                                      category, instructions, priority, requires_photo)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING *",
        )
        .bind(require_id("user", &task.user_id)?)
        .bind(template_id)
        .bind(task.task_date)
        .bind(task.shift.as_str())
        .bind(&task.title)
        .bind(&task.category)
        .bind(&task.instructions)
        .bind(task.priority.as_str())
        .bind(task.requires_photo)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;
        row.into_task()
    }

    async fn get_staff_task(&self, id: &str) -> Result<Option<StaffTask>> {
        let Some(id) = parse_id(id) else {
            return Ok(None);
        };
        let row: Option<TaskRow> = sqlx::query_as("SELECT * FROM staff_tasks WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.map(TaskRow::into_task).transpose()
    }

    async fn list_staff_tasks(&self, filter: TaskFilter) -> Result<Vec<StaffTask>> {
        let user_id = match filter.user_id.as_deref() {
            Some(id) => match parse_id(id) {
                Some(id) => Some(id),
                None => return Ok(Vec::new()),
            },
            None => None,
        };
        let sql = format!(
            "SELECT * FROM staff_tasks
             WHERE ($1::uuid IS NULL OR user_id = $1)
               AND ($2::date IS NULL OR task_date = $2)
               AND ($3::text IS NULL OR shift = $3)
             ORDER BY {PRIORITY_ORDER} DESC, created_at"
        );
        let rows: Vec<TaskRow> = sqlx::query_as(&sql)
            .bind(user_id)
            .bind(filter.date)
            .bind(filter.shift.map(|s| s.as_str()))
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.into_iter().map(TaskRow::into_task).collect()
    }

    async fn update_staff_task(&self, id: &str, update: TaskUpdate) -> Result<StaffTask> {
        let uuid = require_id("task", id)?;
        let row: Option<TaskRow> = sqlx::query_as(
            "UPDATE staff_tasks
             SET status = $2,
                 notes = COALESCE($3, notes),
                 photo_url = COALESCE($4, photo_url),
                 completed_at = COALESCE($5, completed_at)
             WHERE id = $1 RETURNING *",
        )
        .bind(uuid)
        .bind(update.status.as_str())
        .bind(&update.notes)
        .bind(&update.photo_url)
        .bind(update.completed_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.ok_or_else(|| Error::not_found("task", id))?.into_task()
    }

    async fn nightly_stats(&self, date: NaiveDate) -> Result<Vec<StaffNightRow>> {
        let rows: Vec<NightRow> = sqlx::query_as(
            "WITH visits AS (
                 SELECT da.id AS assignment_id,
                        COUNT(DISTINCT c.location_id) FILTER (WHERE c.location_id = ANY(r.location_ids)) AS done,
                        COUNT(c.id) FILTER (WHERE c.has_incident) AS incidents
                 FROM daily_assignments da
                 JOIN rounds r ON r.id = da.round_id
                 LEFT JOIN checkins c ON c.assignment_id = da.id
                 WHERE da.date = $1
                 GROUP BY da.id
             ),
             rounds_by_user AS (
                 SELECT da.user_id,
                        COUNT(*) AS rounds_assigned,
                        COUNT(*) FILTER (WHERE da.status = 'completed') AS rounds_completed,
                        SUM(cardinality(r.location_ids))::BIGINT AS checkpoints_total,
                        SUM(v.done)::BIGINT AS checkpoints_done,
                        SUM(v.incidents)::BIGINT AS incidents
                 FROM daily_assignments da
                 JOIN rounds r ON r.id = da.round_id
                 JOIN visits v ON v.assignment_id = da.id
                 WHERE da.date = $1
                 GROUP BY da.user_id
             ),
             tasks_by_user AS (
                 SELECT user_id,
                        COUNT(*) AS tasks_total,
                        COUNT(*) FILTER (WHERE status = 'completed') AS tasks_done
                 FROM staff_tasks
                 WHERE task_date = $1
                 GROUP BY user_id
             )
             SELECT p.id AS user_id,
                    COALESCE(NULLIF(p.full_name, ''), p.email) AS full_name,
                    COALESCE(rb.rounds_assigned, 0) AS rounds_assigned,
                    COALESCE(rb.rounds_completed, 0) AS rounds_completed,
                    COALESCE(rb.checkpoints_total, 0) AS checkpoints_total,
                    COALESCE(rb.checkpoints_done, 0) AS checkpoints_done,
                    COALESCE(rb.incidents, 0) AS incidents,
                    COALESCE(tb.tasks_total, 0) AS tasks_total,
                    COALESCE(tb.tasks_done, 0) AS tasks_done
             FROM profiles p
             LEFT JOIN rounds_by_user rb ON rb.user_id = p.id
             LEFT JOIN tasks_by_user tb ON tb.user_id = p.id
             WHERE rb.user_id IS NOT NULL OR tb.user_id IS NOT NULL
             ORDER BY full_name",
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(rows
            .into_iter()
            .map(|row| StaffNightRow {
                user_id: row.user_id.to_string(),
                full_name: row.full_name,
                rounds_assigned: row.rounds_assigned,
                rounds_completed: row.rounds_completed,
                checkpoints_total: row.checkpoints_total,
                checkpoints_done: row.checkpoints_done,
                incidents: row.incidents,
                tasks_total: row.tasks_total,
                tasks_done: row.tasks_done,
            })
            .collect())
    }

    async fn incidents_summary(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<IncidentRow>> {
        let rows: Vec<IncidentQueryRow> = sqlx::query_as(
            "SELECT c.id AS checkin_id,
                    c.created_at,
                    l.name AS location_name,
                    l.building,
                    l.floor,
                    COALESCE(NULLIF(p.full_name, ''), p.email) AS staff_name,
                    c.damage_description AS description,
                    c.damage_photo_url
             FROM checkins c
             JOIN locations l ON l.id = c.location_id
             JOIN profiles p ON p.id = c.user_id
             WHERE c.has_incident
               AND (c.created_at AT TIME ZONE 'UTC')::date BETWEEN $1 AND $2
             ORDER BY c.created_at DESC",
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(rows
            .into_iter()
            .map(|row| IncidentRow {
                checkin_id: row.checkin_id.to_string(),
                created_at: row.created_at,
                location_name: row.location_name,
                building: row.building,
                floor: row.floor,
                staff_name: row.staff_name,
                description: row.description,
                damage_photo_url: row.damage_photo_url,
            })
            .collect())
    }
}
