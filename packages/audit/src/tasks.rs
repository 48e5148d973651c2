//! # Staff tasks
//!
//! Active [`TaskTemplate`]s are copied into per-user, per-date, per-shift
//! [`StaffTask`] rows. The copy is idempotent: the store skips rows that
//! conflict on (user, template, date, shift), so assigning defaults twice
//! leaves a single set of tasks. Custom tasks carry no template and never
//! conflict.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{
    NewStaffTask, NewTaskTemplate, Role, Shift, StaffTask, TaskFilter, TaskPriority, TaskStatus,
    TaskTemplate, TaskUpdate,
};
use crate::photos::{discard_photos, photo_path, upload_photo, PhotoKind, PhotoUpload};
use crate::store::{AuditStore, PhotoStore};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignOutcome {
    pub created: usize,
    pub skipped: usize,
}

impl AssignOutcome {
    fn add(&mut self, other: AssignOutcome) {
        self.created += other.created;
        self.skipped += other.skipped;
    }
}

/// Ad-hoc task not tied to a template.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CustomTask {
    pub user_id: String,
    pub task_date: NaiveDate,
    pub shift: Shift,
    pub title: String,
    pub category: String,
    pub instructions: String,
    pub priority: TaskPriority,
    pub requires_photo: bool,
}

/// A staff member moving one of their tasks along.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaskStatusChange {
    pub task_id: String,
    pub status: TaskStatus,
    pub notes: Option<String>,
    pub photo: Option<PhotoUpload>,
}

fn from_template(
    template: &TaskTemplate,
    user_id: &str,
    date: NaiveDate,
    shift: Shift,
) -> NewStaffTask {
    NewStaffTask {
        user_id: user_id.to_string(),
        template_id: Some(template.id.clone()),
        task_date: date,
        shift,
        title: template.title.clone(),
        category: template.category.clone(),
        instructions: template.instructions.clone(),
        priority: template.priority,
        requires_photo: template.requires_photo,
    }
}

/// Copy every active template to `user_id` for the date and shift.
pub async fn assign_defaults<S: AuditStore>(
    store: &S,
    user_id: &str,
    date: NaiveDate,
    shift: Shift,
) -> Result<AssignOutcome> {
    store
        .get_profile(user_id)
        .await?
        .ok_or_else(|| Error::not_found("user", user_id))?;

    let templates = store.list_task_templates(true).await?;
    let tasks: Vec<NewStaffTask> = templates
        .iter()
        .map(|t| from_template(t, user_id, date, shift))
        .collect();
    let total = tasks.len();
    let created = store.upsert_staff_tasks(tasks).await?;

    Ok(AssignOutcome {
        created,
        skipped: total.saturating_sub(created),
    })
}

pub async fn assign_custom<S: AuditStore>(store: &S, task: CustomTask) -> Result<StaffTask> {
    if task.title.trim().is_empty() {
        return Err(Error::invalid("Task title is required"));
    }
    store
        .get_profile(&task.user_id)
        .await?
        .ok_or_else(|| Error::not_found("user", task.user_id.clone()))?;

    let category = match task.category.trim() {
        "" => "General".to_string(),
        c => c.to_string(),
    };
    store
        .insert_staff_task(NewStaffTask {
            user_id: task.user_id,
            template_id: None,
            task_date: task.task_date,
            shift: task.shift,
            title: task.title.trim().to_string(),
            category,
            instructions: task.instructions,
            priority: task.priority,
            requires_photo: task.requires_photo,
        })
        .await
}

/// Assign the default tasks to every staff member.
pub async fn seed_demo_assignments<S: AuditStore>(
    store: &S,
    date: NaiveDate,
    shift: Shift,
) -> Result<AssignOutcome> {
    let mut outcome = AssignOutcome::default();
    for profile in store.list_profiles().await? {
        if profile.role != Role::Staff {
            continue;
        }
        outcome.add(assign_defaults(store, &profile.id, date, shift).await?);
    }
    tracing::info!(
        "Seeded tasks for {} ({}): {} created, {} already present",
        date,
        shift.as_str(),
        outcome.created,
        outcome.skipped
    );
    Ok(outcome)
}

pub async fn tasks_for<S: AuditStore>(
    store: &S,
    user_id: &str,
    date: NaiveDate,
    shift: Option<Shift>,
) -> Result<Vec<StaffTask>> {
    store
        .list_staff_tasks(TaskFilter {
            user_id: Some(user_id.to_string()),
            date: Some(date),
            shift,
        })
        .await
}

pub async fn update_task_status<S, P>(
    store: &S,
    photos: &P,
    user_id: &str,
    change: TaskStatusChange,
    now: DateTime<Utc>,
) -> Result<StaffTask>
where
    S: AuditStore,
    P: PhotoStore,
{
    let task = store
        .get_staff_task(&change.task_id)
        .await?
        .ok_or_else(|| Error::not_found("task", change.task_id.clone()))?;
    if task.user_id != user_id {
        return Err(Error::Forbidden);
    }

    let notes = change
        .notes
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());
    let photo = change.photo.filter(|p| !p.is_empty());

    let mut errors = Vec::new();
    if matches!(change.status, TaskStatus::Skipped | TaskStatus::Blocked) && notes.is_none() {
        errors.push(format!(
            "A note is required when a task is {}",
            change.status.as_str()
        ));
    }
    if change.status == TaskStatus::Completed
        && task.requires_photo
        && photo.is_none()
        && task.photo_url.is_none()
    {
        errors.push("This task requires a photo".to_string());
    }
    if !errors.is_empty() {
        return Err(Error::Validation(errors));
    }

    let uploaded = match &photo {
        Some(photo) => {
            let path = photo_path(user_id, &task.id, PhotoKind::Task, now);
            match upload_photo(photos, path.clone(), photo).await {
                Ok(uploaded) => Some(uploaded),
                Err(e) => {
                    discard_photos(photos, &[path]).await;
                    return Err(e);
                }
            }
        }
        None => None,
    };

    let update = TaskUpdate {
        status: change.status,
        notes,
        photo_url: uploaded.as_ref().map(|(_, url)| url.clone()),
        completed_at: (change.status == TaskStatus::Completed).then_some(now),
    };
    match store.update_staff_task(&task.id, update).await {
        Ok(task) => Ok(task),
        Err(e) => {
            if let Some((path, _)) = uploaded {
                discard_photos(photos, &[path]).await;
            }
            Err(e)
        }
    }
}

pub async fn create_template<S: AuditStore>(
    store: &S,
    template: NewTaskTemplate,
) -> Result<TaskTemplate> {
    let mut errors = Vec::new();
    if template.title.trim().is_empty() {
        errors.push("Task title is required".to_string());
    }
    if template.category.trim().is_empty() {
        errors.push("Category is required".to_string());
    }
    if !errors.is_empty() {
        return Err(Error::Validation(errors));
    }
    let template = store
        .insert_task_template(NewTaskTemplate {
            title: template.title.trim().to_string(),
            category: template.category.trim().to_string(),
            ..template
        })
        .await?;
    tracing::info!("Created task template {} ({})", template.title, template.id);
    Ok(template)
}

pub async fn toggle_template<S: AuditStore>(store: &S, id: &str) -> Result<TaskTemplate> {
    let current = store
        .list_task_templates(false)
        .await?
        .into_iter()
        .find(|t| t.id == id)
        .ok_or_else(|| Error::not_found("template", id))?;
    store.set_template_active(id, !current.active).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryPhotoStore;
    use crate::testing::{at, jpeg, night, scenario};

    async fn templates<S: AuditStore>(store: &S) -> Vec<TaskTemplate> {
        let mut created = Vec::new();
        for (title, requires_photo) in [("Check minibar stock", false), ("Photograph boiler gauge", true)] {
            created.push(
                create_template(
                    store,
                    NewTaskTemplate {
                        title: title.to_string(),
                        category: "Maintenance".to_string(),
                        instructions: "- look\n- note".to_string(),
                        priority: TaskPriority::Medium,
                        requires_photo,
                    },
                )
                .await
                .unwrap(),
            );
        }
        created
    }

    #[tokio::test]
    async fn test_assign_defaults_is_idempotent() {
        let s = scenario().await;
        templates(&s.store).await;

        let first = assign_defaults(&s.store, &s.staff.id, night(), Shift::Night).await.unwrap();
        assert_eq!(first, AssignOutcome { created: 2, skipped: 0 });

        let second = assign_defaults(&s.store, &s.staff.id, night(), Shift::Night).await.unwrap();
        assert_eq!(second, AssignOutcome { created: 0, skipped: 2 });

        let tasks = tasks_for(&s.store, &s.staff.id, night(), Some(Shift::Night)).await.unwrap();
        assert_eq!(tasks.len(), 2);
    }

    #[tokio::test]
    async fn test_inactive_templates_are_not_assigned() {
        let s = scenario().await;
        let created = templates(&s.store).await;
        let toggled = toggle_template(&s.store, &created[0].id).await.unwrap();
        assert!(!toggled.active);

        let outcome = assign_defaults(&s.store, &s.staff.id, night(), Shift::Morning).await.unwrap();
        assert_eq!(outcome.created, 1);
    }

    #[tokio::test]
    async fn test_seed_only_targets_staff() {
        let s = scenario().await;
        templates(&s.store).await;
        let outcome = seed_demo_assignments(&s.store, night(), Shift::Night).await.unwrap();
        assert_eq!(outcome.created, 2);
        let admin_tasks = tasks_for(&s.store, &s.admin.id, night(), None).await.unwrap();
        assert!(admin_tasks.is_empty());
    }

    #[tokio::test]
    async fn test_custom_task_requires_title() {
        let s = scenario().await;
        let mut task = CustomTask {
            user_id: s.staff.id.clone(),
            task_date: night(),
            shift: Shift::Night,
            title: "  ".to_string(),
            category: String::new(),
            instructions: String::new(),
            priority: TaskPriority::High,
            requires_photo: false,
        };
        let err = assign_custom(&s.store, task.clone()).await.unwrap_err();
        assert_eq!(err, Error::invalid("Task title is required"));

        task.title = "Escort guest to room 12".to_string();
        let created = assign_custom(&s.store, task.clone()).await.unwrap();
        assert_eq!(created.template_id, None);
        assert_eq!(created.category, "General");
        // Custom tasks never collide with each other.
        assign_custom(&s.store, task).await.unwrap();
    }

    #[tokio::test]
    async fn test_status_rules() {
        let s = scenario().await;
        templates(&s.store).await;
        assign_defaults(&s.store, &s.staff.id, night(), Shift::Night).await.unwrap();
        let tasks = tasks_for(&s.store, &s.staff.id, night(), None).await.unwrap();
        let gauge = tasks.iter().find(|t| t.requires_photo).unwrap();
        let photos = MemoryPhotoStore::new();

        let err = update_task_status(
            &s.store,
            &photos,
            &s.staff.id,
            TaskStatusChange {
                task_id: gauge.id.clone(),
                status: TaskStatus::Completed,
                notes: None,
                photo: None,
            },
            at(2, 0),
        )
        .await
        .unwrap_err();
        assert_eq!(err.messages(), vec!["This task requires a photo".to_string()]);

        let err = update_task_status(
            &s.store,
            &photos,
            &s.staff.id,
            TaskStatusChange {
                task_id: gauge.id.clone(),
                status: TaskStatus::Blocked,
                notes: Some(" ".to_string()),
                photo: None,
            },
            at(2, 0),
        )
        .await
        .unwrap_err();
        assert_eq!(
            err.messages(),
            vec!["A note is required when a task is blocked".to_string()]
        );

        let err = update_task_status(
            &s.store,
            &photos,
            &s.admin.id,
            TaskStatusChange {
                task_id: gauge.id.clone(),
                status: TaskStatus::InProgress,
                notes: None,
                photo: None,
            },
            at(2, 0),
        )
        .await
        .unwrap_err();
        assert_eq!(err, Error::Forbidden);

        let done = update_task_status(
            &s.store,
            &photos,
            &s.staff.id,
            TaskStatusChange {
                task_id: gauge.id.clone(),
                status: TaskStatus::Completed,
                notes: None,
                photo: Some(jpeg()),
            },
            at(2, 5),
        )
        .await
        .unwrap();
        assert_eq!(done.status, TaskStatus::Completed);
        assert_eq!(done.completed_at, Some(at(2, 5)));
        assert!(done.photo_url.is_some());
        assert_eq!(
            photos.paths(),
            vec![photo_path(&s.staff.id, &gauge.id, PhotoKind::Task, at(2, 5))]
        );
    }

    #[tokio::test]
    async fn test_unsigned_task_photo_is_discarded() {
        let s = scenario().await;
        templates(&s.store).await;
        assign_defaults(&s.store, &s.staff.id, night(), Shift::Night).await.unwrap();
        let tasks = tasks_for(&s.store, &s.staff.id, night(), None).await.unwrap();
        let gauge = tasks.iter().find(|t| t.requires_photo).unwrap();
        let photos = MemoryPhotoStore::failing_signatures();

        let err = update_task_status(
            &s.store,
            &photos,
            &s.staff.id,
            TaskStatusChange {
                task_id: gauge.id.clone(),
                status: TaskStatus::Completed,
                notes: None,
                photo: Some(jpeg()),
            },
            at(2, 5),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::Storage(_)));
        assert!(photos.paths().is_empty());
        let unchanged = s.store.get_staff_task(&gauge.id).await.unwrap().unwrap();
        assert_eq!(unchanged.status, TaskStatus::Pending);
    }
}
