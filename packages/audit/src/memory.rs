use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{Duration, NaiveDate, Utc};

use crate::dashboard::{IncidentRow, StaffNightRow};
use crate::error::{Error, Result};
use crate::messages;
use crate::models::*;
use crate::store::{AuditStore, PhotoStore};

#[derive(Debug, Default)]
struct Tables {
    next_id: u64,
    profiles: Vec<Profile>,
    locations: Vec<Location>,
    rounds: Vec<Round>,
    assignments: Vec<DailyAssignment>,
    checkins: Vec<Checkin>,
    templates: Vec<TaskTemplate>,
    tasks: Vec<StaffTask>,
    checkin_failure: Option<String>,
}

impl Tables {
    fn id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }
}

/// In-memory AuditStore for tests and development.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Make every following `insert_checkin` fail with `reason`.
    #[cfg(any(test, feature = "testing"))]
    pub fn fail_checkin_inserts(&self, reason: &str) {
        self.tables().checkin_failure = Some(reason.to_string());
    }
}

impl AuditStore for MemoryStore {
    async fn get_profile(&self, id: &str) -> Result<Option<Profile>> {
        Ok(self.tables().profiles.iter().find(|p| p.id == id).cloned())
    }

    async fn find_profile_by_email(&self, email: &str) -> Result<Option<Profile>> {
        Ok(self
            .tables()
            .profiles
            .iter()
            .find(|p| p.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn list_profiles(&self) -> Result<Vec<Profile>> {
        let mut profiles = self.tables().profiles.clone();
        profiles.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        Ok(profiles)
    }

    async fn insert_profile(&self, profile: NewProfile) -> Result<Profile> {
        let mut tables = self.tables();
        if tables
            .profiles
            .iter()
            .any(|p| p.email.eq_ignore_ascii_case(&profile.email))
        {
            return Err(Error::Duplicate(messages::PROFILES_EMAIL_KEY.to_string()));
        }
        let row = Profile {
            id: tables.id("user"),
            email: profile.email,
            full_name: profile.full_name,
            role: profile.role,
            created_at: Utc::now(),
        };
        tables.profiles.push(row.clone());
        Ok(row)
    }

    async fn list_locations(&self) -> Result<Vec<Location>> {
        let mut locations = self.tables().locations.clone();
        locations.sort_by(|a, b| {
            (&a.building, a.floor, &a.name).cmp(&(&b.building, b.floor, &b.name))
        });
        Ok(locations)
    }

    async fn insert_location(&self, location: NewLocation) -> Result<Location> {
        let mut tables = self.tables();
        if tables
            .locations
            .iter()
            .any(|l| l.verification_code == location.verification_code)
        {
            return Err(Error::Duplicate(messages::LOCATIONS_CODE_KEY.to_string()));
        }
        let row = Location {
            id: tables.id("loc"),
            name: location.name,
            floor: location.floor,
            building: location.building,
            verification_code: location.verification_code,
        };
        tables.locations.push(row.clone());
        Ok(row)
    }

    async fn list_rounds(&self) -> Result<Vec<Round>> {
        let mut rounds = self.tables().rounds.clone();
        rounds.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rounds)
    }

    async fn get_round(&self, id: &str) -> Result<Option<Round>> {
        Ok(self.tables().rounds.iter().find(|r| r.id == id).cloned())
    }

    async fn insert_round(&self, round: NewRound) -> Result<Round> {
        let mut tables = self.tables();
        let row = Round {
            id: tables.id("round"),
            name: round.name,
            location_ids: round.location_ids,
            estimated_minutes: round.estimated_minutes,
            created_at: Utc::now(),
        };
        tables.rounds.push(row.clone());
        Ok(row)
    }

    async fn get_assignment(&self, id: &str) -> Result<Option<DailyAssignment>> {
        Ok(self.tables().assignments.iter().find(|a| a.id == id).cloned())
    }

    async fn list_assignments(&self, filter: AssignmentFilter) -> Result<Vec<DailyAssignment>> {
        let mut assignments: Vec<DailyAssignment> = self
            .tables()
            .assignments
            .iter()
            .filter(|a| filter.user_id.as_ref().map_or(true, |u| &a.user_id == u))
            .filter(|a| filter.date.map_or(true, |d| a.date == d))
            .cloned()
            .collect();
        assignments.sort_by_key(|a| (a.date, a.shift));
        Ok(assignments)
    }

    async fn insert_assignment(&self, assignment: NewAssignment) -> Result<DailyAssignment> {
        let mut tables = self.tables();
        if tables.assignments.iter().any(|a| {
            a.user_id == assignment.user_id
                && a.round_id == assignment.round_id
                && a.date == assignment.date
                && a.shift == assignment.shift
        }) {
            return Err(Error::Duplicate(messages::ASSIGNMENTS_SLOT_KEY.to_string()));
        }
        let row = DailyAssignment {
            id: tables.id("assignment"),
            user_id: assignment.user_id,
            round_id: assignment.round_id,
            date: assignment.date,
            shift: assignment.shift,
            status: AssignmentStatus::Pending,
            started_at: None,
            completed_at: None,
        };
        tables.assignments.push(row.clone());
        Ok(row)
    }

    async fn update_assignment(&self, id: &str, update: AssignmentUpdate) -> Result<DailyAssignment> {
        let mut tables = self.tables();
        let row = tables
            .assignments
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| Error::not_found("assignment", id))?;
        row.status = update.status;
        if update.started_at.is_some() {
            row.started_at = update.started_at;
        }
        if update.completed_at.is_some() {
            row.completed_at = update.completed_at;
        }
        Ok(row.clone())
    }

    async fn insert_checkin(&self, checkin: NewCheckin) -> Result<Checkin> {
        let mut tables = self.tables();
        if let Some(reason) = &tables.checkin_failure {
            return Err(Error::Backend(reason.clone()));
        }
        if tables
            .checkins
            .iter()
            .any(|c| c.assignment_id == checkin.assignment_id && c.location_id == checkin.location_id)
        {
            return Err(Error::Duplicate(messages::CHECKINS_VISIT_KEY.to_string()));
        }
        let row = Checkin {
            id: tables.id("checkin"),
            assignment_id: checkin.assignment_id,
            location_id: checkin.location_id,
            user_id: checkin.user_id,
            proof_photo_url: checkin.proof_photo_url,
            has_incident: checkin.has_incident,
            damage_photo_url: checkin.damage_photo_url,
            damage_description: checkin.damage_description,
            nfc_verified: checkin.nfc_verified,
            created_at: checkin.created_at,
        };
        tables.checkins.push(row.clone());
        Ok(row)
    }

    async fn list_checkins(&self, assignment_id: &str) -> Result<Vec<Checkin>> {
        let mut checkins: Vec<Checkin> = self
            .tables()
            .checkins
            .iter()
            .filter(|c| c.assignment_id == assignment_id)
            .cloned()
            .collect();
        checkins.sort_by_key(|c| c.created_at);
        Ok(checkins)
    }

    async fn list_task_templates(&self, active_only: bool) -> Result<Vec<TaskTemplate>> {
        Ok(self
            .tables()
            .templates
            .iter()
            .filter(|t| !active_only || t.active)
            .cloned()
            .collect())
    }

    async fn insert_task_template(&self, template: NewTaskTemplate) -> Result<TaskTemplate> {
        let mut tables = self.tables();
        let row = TaskTemplate {
            id: tables.id("template"),
            title: template.title,
            category: template.category,
            instructions: template.instructions,
            priority: template.priority,
            requires_photo: template.requires_photo,
            active: true,
            created_at: Utc::now(),
        };
        tables.templates.push(row.clone());
        Ok(row)
    }

    async fn set_template_active(&self, id: &str, active: bool) -> Result<TaskTemplate> {
        let mut tables = self.tables();
        let row = tables
            .templates
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| Error::not_found("task template", id))?;
        row.active = active;
        Ok(row.clone())
    }

    async fn upsert_staff_tasks(&self, tasks: Vec<NewStaffTask>) -> Result<usize> {
        let mut tables = self.tables();
        let mut created = 0;
        for task in tasks {
            let conflict = task.template_id.is_some()
                && tables.tasks.iter().any(|t| {
                    t.user_id == task.user_id
                        && t.template_id == task.template_id
                        && t.task_date == task.task_date
                        && t.shift == task.shift
                });
            if conflict {
                continue;
            }
            let row = new_task_row(&mut tables, task);
            tables.tasks.push(row);
            created += 1;
        }
        Ok(created)
    }

    async fn insert_staff_task(&self, task: NewStaffTask) -> Result<StaffTask> {
        let mut tables = self.tables();
        let row = new_task_row(&mut tables, task);
        tables.tasks.push(row.clone());
        Ok(row)
    }

    async fn get_staff_task(&self, id: &str) -> Result<Option<StaffTask>> {
        Ok(self.tables().tasks.iter().find(|t| t.id == id).cloned())
    }

    async fn list_staff_tasks(&self, filter: TaskFilter) -> Result<Vec<StaffTask>> {
        let mut tasks: Vec<StaffTask> = self
            .tables()
            .tasks
            .iter()
            .filter(|t| filter.user_id.as_ref().map_or(true, |u| &t.user_id == u))
            .filter(|t| filter.date.map_or(true, |d| t.task_date == d))
            .filter(|t| filter.shift.map_or(true, |s| t.shift == s))
            .cloned()
            .collect();
        tasks.sort_by(|a, b| b.priority.cmp(&a.priority));
        Ok(tasks)
    }

    async fn update_staff_task(&self, id: &str, update: TaskUpdate) -> Result<StaffTask> {
        let mut tables = self.tables();
        let row = tables
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| Error::not_found("task", id))?;
        row.status = update.status;
        if update.notes.is_some() {
            row.notes = update.notes;
        }
        if update.photo_url.is_some() {
            row.photo_url = update.photo_url;
        }
        if update.completed_at.is_some() {
            row.completed_at = update.completed_at;
        }
        Ok(row.clone())
    }

    async fn nightly_stats(&self, date: NaiveDate) -> Result<Vec<StaffNightRow>> {
        let tables = self.tables();
        let mut rows: HashMap<String, StaffNightRow> = HashMap::new();
        let name_of = |user_id: &str| {
            tables
                .profiles
                .iter()
                .find(|p| p.id == user_id)
                .map(|p| p.display_name().to_string())
                .unwrap_or_else(|| user_id.to_string())
        };
        let empty_row = |user_id: &str| StaffNightRow {
            user_id: user_id.to_string(),
            full_name: name_of(user_id),
            rounds_assigned: 0,
            rounds_completed: 0,
            checkpoints_total: 0,
            checkpoints_done: 0,
            incidents: 0,
            tasks_total: 0,
            tasks_done: 0,
        };

        for assignment in tables.assignments.iter().filter(|a| a.date == date) {
            let round_ids: HashSet<&str> = tables
                .rounds
                .iter()
                .find(|r| r.id == assignment.round_id)
                .map(|r| r.location_ids.iter().map(String::as_str).collect())
                .unwrap_or_default();
            let checkins: Vec<&Checkin> = tables
                .checkins
                .iter()
                .filter(|c| c.assignment_id == assignment.id)
                .collect();
            let done: HashSet<&str> = checkins
                .iter()
                .map(|c| c.location_id.as_str())
                .filter(|id| round_ids.contains(id))
                .collect();

            let row = rows
                .entry(assignment.user_id.clone())
                .or_insert_with(|| empty_row(&assignment.user_id));
            row.rounds_assigned += 1;
            if assignment.status == AssignmentStatus::Completed {
                row.rounds_completed += 1;
            }
            row.checkpoints_total += round_ids.len() as i64;
            row.checkpoints_done += done.len() as i64;
            row.incidents += checkins.iter().filter(|c| c.has_incident).count() as i64;
        }

        for task in tables.tasks.iter().filter(|t| t.task_date == date) {
            let row = rows
                .entry(task.user_id.clone())
                .or_insert_with(|| empty_row(&task.user_id));
            row.tasks_total += 1;
            if task.status == TaskStatus::Completed {
                row.tasks_done += 1;
            }
        }

        let mut rows: Vec<StaffNightRow> = rows.into_values().collect();
        rows.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        Ok(rows)
    }

    async fn incidents_summary(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<IncidentRow>> {
        let tables = self.tables();
        let mut rows: Vec<IncidentRow> = tables
            .checkins
            .iter()
            .filter(|c| c.has_incident)
            .filter(|c| {
                let day = c.created_at.date_naive();
                day >= from && day <= to
            })
            .map(|c| {
                let location = tables.locations.iter().find(|l| l.id == c.location_id);
                IncidentRow {
                    checkin_id: c.id.clone(),
                    created_at: c.created_at,
                    location_name: location.map(|l| l.name.clone()).unwrap_or_default(),
                    building: location.map(|l| l.building.clone()).unwrap_or_default(),
                    floor: location.map(|l| l.floor).unwrap_or_default(),
                    staff_name: tables
                        .profiles
                        .iter()
                        .find(|p| p.id == c.user_id)
                        .map(|p| p.display_name().to_string())
                        .unwrap_or_default(),
                    description: c.damage_description.clone(),
                    damage_photo_url: c.damage_photo_url.clone(),
                }
            })
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }
}

fn new_task_row(tables: &mut Tables, task: NewStaffTask) -> StaffTask {
    StaffTask {
        id: tables.id("task"),
        user_id: task.user_id,
        template_id: task.template_id,
        task_date: task.task_date,
        shift: task.shift,
        title: task.title,
        category: task.category,
        instructions: task.instructions,
        priority: task.priority,
        requires_photo: task.requires_photo,
        status: TaskStatus::Pending,
        notes: None,
        photo_url: None,
        completed_at: None,
        created_at: Utc::now(),
    }
}

#[derive(Debug, Default)]
struct Bucket {
    objects: HashMap<String, (Vec<u8>, String)>,
    uploads_left: Option<usize>,
    signing_fails: bool,
}

/// In-memory PhotoStore for tests and development.
#[derive(Clone, Debug, Default)]
pub struct MemoryPhotoStore {
    bucket: Arc<Mutex<Bucket>>,
}

impl MemoryPhotoStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose uploads start failing after `n` successful ones.
    #[cfg(any(test, feature = "testing"))]
    pub fn failing_after(n: usize) -> Self {
        let store = Self::default();
        store.bucket().uploads_left = Some(n);
        store
    }

    /// A store that accepts uploads but refuses to sign URLs.
    #[cfg(any(test, feature = "testing"))]
    pub fn failing_signatures() -> Self {
        let store = Self::default();
        store.bucket().signing_fails = true;
        store
    }

    fn bucket(&self) -> MutexGuard<'_, Bucket> {
        self.bucket.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.bucket().objects.contains_key(path)
    }

    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.bucket().objects.keys().cloned().collect();
        paths.sort();
        paths
    }
}

impl PhotoStore for MemoryPhotoStore {
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<()> {
        let mut bucket = self.bucket();
        if let Some(left) = bucket.uploads_left.as_mut() {
            if *left == 0 {
                return Err(Error::Storage("upload rejected".to_string()));
            }
            *left -= 1;
        }
        bucket
            .objects
            .insert(path.to_string(), (bytes, content_type.to_string()));
        Ok(())
    }

    async fn signed_url(&self, path: &str, expires_in: Duration) -> Result<String> {
        if self.bucket().signing_fails {
            return Err(Error::Storage("signing key unavailable".to_string()));
        }
        if !self.contains(path) {
            return Err(Error::Storage(format!("object not found: {path}")));
        }
        let expires = (Utc::now() + expires_in).timestamp();
        Ok(format!("memory://{path}?expires={expires}"))
    }

    async fn remove(&self, path: &str) -> Result<()> {
        self.bucket().objects.remove(path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn staff(email: &str) -> NewProfile {
        NewProfile {
            email: email.to_string(),
            full_name: "Night Porter".to_string(),
            role: Role::Staff,
            password_hash: "hash".to_string(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let store = MemoryStore::new();
        store.insert_profile(staff("porter@hotel.test")).await.unwrap();

        let err = store
            .insert_profile(staff("PORTER@hotel.test"))
            .await
            .unwrap_err();
        assert_eq!(err, Error::Duplicate(messages::PROFILES_EMAIL_KEY.to_string()));
        assert_eq!(store.list_profiles().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_second_visit_to_checkpoint_is_rejected() {
        let store = MemoryStore::new();
        let visit = NewCheckin {
            assignment_id: "a1".to_string(),
            location_id: "l1".to_string(),
            user_id: "u1".to_string(),
            proof_photo_url: "memory://u1/a1/proof_1.jpg".to_string(),
            has_incident: false,
            damage_photo_url: None,
            damage_description: None,
            nfc_verified: false,
            created_at: Utc::now(),
        };
        store.insert_checkin(visit.clone()).await.unwrap();

        let err = store.insert_checkin(visit.clone()).await.unwrap_err();
        assert_eq!(err, Error::Duplicate(messages::CHECKINS_VISIT_KEY.to_string()));

        let other = NewCheckin {
            location_id: "l2".to_string(),
            ..visit
        };
        store.insert_checkin(other).await.unwrap();
        assert_eq!(store.list_checkins("a1").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_custom_tasks_never_conflict() {
        let store = MemoryStore::new();
        let task = NewStaffTask {
            user_id: "u1".to_string(),
            template_id: None,
            task_date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            shift: Shift::Night,
            title: "Check fridge".to_string(),
            category: "Kitchen".to_string(),
            instructions: String::new(),
            priority: TaskPriority::Low,
            requires_photo: false,
        };

        let created = store
            .upsert_staff_tasks(vec![task.clone(), task])
            .await
            .unwrap();
        assert_eq!(created, 2);
    }

    #[tokio::test]
    async fn test_update_keeps_unset_timestamps() {
        let store = MemoryStore::new();
        let assignment = store
            .insert_assignment(NewAssignment {
                user_id: "u1".to_string(),
                round_id: "r1".to_string(),
                date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
                shift: Shift::Night,
            })
            .await
            .unwrap();
        let started = Utc::now();

        store
            .update_assignment(
                &assignment.id,
                AssignmentUpdate {
                    status: AssignmentStatus::InProgress,
                    started_at: Some(started),
                    completed_at: None,
                },
            )
            .await
            .unwrap();
        let updated = store
            .update_assignment(
                &assignment.id,
                AssignmentUpdate {
                    status: AssignmentStatus::Incomplete,
                    started_at: None,
                    completed_at: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.status, AssignmentStatus::Incomplete);
        assert_eq!(updated.started_at, Some(started));
    }

    #[tokio::test]
    async fn test_photo_store_roundtrip_and_failure() {
        let photos = MemoryPhotoStore::failing_after(1);
        photos
            .upload("u1/a1/proof_1.jpg", vec![1, 2, 3], "image/jpeg")
            .await
            .unwrap();
        let url = photos
            .signed_url("u1/a1/proof_1.jpg", Duration::days(7))
            .await
            .unwrap();
        assert!(url.starts_with("memory://u1/a1/proof_1.jpg?expires="));

        let err = photos
            .upload("u1/a1/damage_1.jpg", vec![4], "image/jpeg")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Storage(_)));

        photos.remove("u1/a1/proof_1.jpg").await.unwrap();
        assert!(photos.paths().is_empty());
    }
}
