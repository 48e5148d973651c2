//! The staff member's night: assigned rounds and tasks.

use audit::assignments::AssignmentSummary;
use audit::photos::PhotoUpload;
use audit::tasks::TaskStatusChange;
use audit::{Shift, StaffTask, TaskStatus};
use dioxus::prelude::*;
use ui::icons::FaRoute;
use ui::status::{assignment_tone, priority_tone, task_tone};
use ui::{Icon, Instructions, PhotoInput, ProgressBar, StatusBadge};

use super::{DateInput, ErrorText};
use crate::Route;

#[component]
pub fn StaffDashboard() -> Element {
    let mut date = use_signal(ui::today);
    let mut shift = use_signal(|| Option::<Shift>::None);

    let assignments = use_resource(move || async move { api::my_assignments(date()).await });
    let mut tasks = use_resource(move || async move { api::my_tasks(date(), shift()).await });

    rsx! {
        div {
            class: "section-header",
            h2 { "My night" }
            DateInput { value: date(), on_change: move |d| date.set(d) }
        }

        section {
            class: "section",
            h3 { "Rounds" }
            match &*assignments.read() {
                Some(Ok(list)) if list.is_empty() => rsx! {
                    p { class: "muted", "No rounds assigned." }
                },
                Some(Ok(list)) => rsx! {
                    div {
                        class: "card-list",
                        for summary in list.iter().cloned() {
                            AssignmentCard { key: "{summary.assignment.id}", summary: summary }
                        }
                    }
                },
                Some(Err(e)) => rsx! { ErrorText { message: api::error_message(e) } },
                None => rsx! { p { class: "muted", "Loading..." } },
            }
        }

        section {
            class: "section",
            div {
                class: "section-header",
                h3 { "Tasks" }
                select {
                    class: "input",
                    onchange: move |evt: FormEvent| shift.set(evt.value().parse::<Shift>().ok()),
                    option { value: "", "All shifts" }
                    for s in Shift::ALL {
                        option { value: s.as_str(), selected: shift() == Some(s), "{s}" }
                    }
                }
            }
            match &*tasks.read() {
                Some(Ok(list)) if list.is_empty() => rsx! {
                    p { class: "muted", "No tasks assigned." }
                },
                Some(Ok(list)) => rsx! {
                    div {
                        class: "card-list",
                        for task in list.iter().cloned() {
                            TaskCard { key: "{task.id}", task: task, on_change: move |_| tasks.restart() }
                        }
                    }
                },
                Some(Err(e)) => rsx! { ErrorText { message: api::error_message(e) } },
                None => rsx! { p { class: "muted", "Loading..." } },
            }
        }
    }
}

#[component]
fn AssignmentCard(summary: AssignmentSummary) -> Element {
    let status = summary.assignment.status;
    rsx! {
        Link {
            class: "card card-link",
            to: Route::RoundDetail { assignment_id: summary.assignment.id.clone() },
            div {
                class: "card-title",
                Icon { icon: FaRoute, width: 14, height: 14 }
                " {summary.round_name}"
                StatusBadge { label: status.to_string(), tone: assignment_tone(status) }
            }
            p { class: "muted", "{summary.assignment.shift} shift" }
            ProgressBar {
                percentage: summary.percentage,
                label: format!("{}/{} checkpoints", summary.completed, summary.total),
            }
        }
    }
}

#[component]
fn TaskCard(task: StaffTask, on_change: EventHandler<()>) -> Element {
    let mut notes = use_signal(|| task.notes.clone().unwrap_or_default());
    let mut photo = use_signal(|| Option::<PhotoUpload>::None);
    let mut error = use_signal(|| Option::<String>::None);
    let mut busy = use_signal(|| false);

    let task_id = task.id.clone();
    let update = use_callback(move |status: TaskStatus| {
        let change = TaskStatusChange {
            task_id: task_id.clone(),
            status,
            notes: Some(notes()).filter(|n| !n.trim().is_empty()),
            photo: photo(),
        };
        spawn(async move {
            busy.set(true);
            error.set(None);
            match api::update_task(change).await {
                Ok(_) => {
                    photo.set(None);
                    on_change.call(());
                }
                Err(e) => error.set(Some(api::error_message(&e))),
            }
            busy.set(false);
        });
    });

    let finished = task.status.is_terminal();

    rsx! {
        div {
            class: "card",
            div {
                class: "card-title",
                "{task.title}"
                StatusBadge { label: task.priority.to_string(), tone: priority_tone(task.priority) }
                StatusBadge { label: task.status.to_string(), tone: task_tone(task.status) }
            }
            p { class: "muted", "{task.category} · {task.shift}" }
            Instructions { source: task.instructions.clone() }

            if let Some(url) = task.photo_url.clone() {
                a { href: "{url}", target: "_blank", rel: "noopener", "View photo" }
            }

            if !finished {
                textarea {
                    class: "input",
                    rows: "2",
                    placeholder: "Notes (required to skip or block)",
                    value: notes(),
                    oninput: move |evt: FormEvent| notes.set(evt.value()),
                }
                if task.requires_photo {
                    PhotoInput {
                        label: "Photo (required to complete)",
                        on_change: move |upload| photo.set(upload),
                        disabled: busy(),
                    }
                }
                if let Some(message) = error() {
                    ErrorText { message }
                }
                div {
                    class: "button-row",
                    if task.status == TaskStatus::Pending {
                        button {
                            class: "btn",
                            disabled: busy(),
                            onclick: move |_| update.call(TaskStatus::InProgress),
                            "Start"
                        }
                    }
                    button {
                        class: "btn btn-primary",
                        disabled: busy(),
                        onclick: move |_| update.call(TaskStatus::Completed),
                        "Complete"
                    }
                    button {
                        class: "btn btn-ghost",
                        disabled: busy(),
                        onclick: move |_| update.call(TaskStatus::Skipped),
                        "Skip"
                    }
                    button {
                        class: "btn btn-danger",
                        disabled: busy(),
                        onclick: move |_| update.call(TaskStatus::Blocked),
                        "Blocked"
                    }
                }
            } else if let Some(note) = task.notes.clone() {
                p { class: "task-note", "{note}" }
            }
        }
    }
}
