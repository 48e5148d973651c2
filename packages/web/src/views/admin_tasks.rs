//! Task templates and per-night task assignment.

use audit::tasks::{AssignOutcome, CustomTask};
use audit::{NewTaskTemplate, Role, Shift, StaffTask, TaskPriority, TaskTemplate};
use dioxus::prelude::*;
use ui::status::{priority_tone, task_tone};
use ui::{Instructions, StatusBadge};

use super::{DateInput, ErrorText, ShiftSelect};

fn outcome_text(outcome: &AssignOutcome) -> String {
    format!(
        "{} tasks assigned, {} already present",
        outcome.created, outcome.skipped
    )
}

#[component]
fn PrioritySelect(value: TaskPriority, on_change: EventHandler<TaskPriority>) -> Element {
    rsx! {
        select {
            class: "input",
            onchange: move |evt: FormEvent| {
                if let Ok(priority) = evt.value().parse::<TaskPriority>() {
                    on_change.call(priority);
                }
            },
            for priority in [TaskPriority::Low, TaskPriority::Medium, TaskPriority::High] {
                option { value: priority.as_str(), selected: priority == value, "{priority}" }
            }
        }
    }
}

#[component]
pub fn AdminTasks() -> Element {
    // Templates and users load concurrently.
    let mut templates = use_resource(|| async move { api::list_templates().await });
    let users = use_resource(|| async move { api::list_users().await });

    let mut user_id = use_signal(String::new);
    let mut date = use_signal(ui::today);
    let mut shift = use_signal(|| Shift::Night);
    let mut error = use_signal(|| Option::<String>::None);
    let mut notice = use_signal(|| Option::<String>::None);

    let mut assigned = use_resource(move || async move {
        let user = user_id();
        if user.is_empty() {
            return Ok(Vec::new());
        }
        api::list_tasks_for(user, date()).await
    });

    let staff: Vec<(String, String)> = match &*users.read() {
        Some(Ok(list)) => list
            .iter()
            .filter(|u| u.role == Role::Staff)
            .map(|u| (u.id.clone(), u.display_name().to_string()))
            .collect(),
        _ => Vec::new(),
    };

    let assign_defaults = move |_| async move {
        error.set(None);
        notice.set(None);
        if user_id().is_empty() {
            error.set(Some("Choose a staff member".to_string()));
            return;
        }
        match api::assign_default_tasks(user_id(), date(), shift()).await {
            Ok(outcome) => {
                notice.set(Some(outcome_text(&outcome)));
                assigned.restart();
            }
            Err(e) => error.set(Some(api::error_message(&e))),
        }
    };

    let seed_all = move |_| async move {
        error.set(None);
        notice.set(None);
        match api::seed_tasks(date(), shift()).await {
            Ok(outcome) => {
                notice.set(Some(outcome_text(&outcome)));
                assigned.restart();
            }
            Err(e) => error.set(Some(api::error_message(&e))),
        }
    };

    rsx! {
        section {
            class: "section",
            h2 { "Assign tasks" }
            div {
                class: "form-row",
                select {
                    class: "input",
                    onchange: move |evt: FormEvent| user_id.set(evt.value()),
                    option { value: "", "Staff member" }
                    for (id, name) in staff {
                        option { key: "{id}", value: "{id}", "{name}" }
                    }
                }
                DateInput { value: date(), on_change: move |d| date.set(d) }
                ShiftSelect { value: shift(), on_change: move |s| shift.set(s) }
                button { class: "btn btn-primary", onclick: assign_defaults, "Assign default tasks" }
                button { class: "btn", onclick: seed_all, "Assign to all staff" }
            }
            if let Some(message) = error() {
                ErrorText { message }
            }
            if let Some(message) = notice() {
                p { class: "form-notice", "{message}" }
            }

            if !user_id().is_empty() {
                CustomTaskForm {
                    user_id: user_id(),
                    date: date(),
                    shift: shift(),
                    on_created: move |_| assigned.restart(),
                }
                match &*assigned.read() {
                    Some(Ok(tasks)) => rsx! { AssignedTasks { tasks: tasks.clone() } },
                    Some(Err(e)) => rsx! { ErrorText { message: api::error_message(e) } },
                    None => rsx! { p { class: "muted", "Loading..." } },
                }
            }
        }

        section {
            class: "section",
            h2 { "Templates" }
            match &*templates.read() {
                Some(Ok(list)) => rsx! {
                    TemplateTable { templates: list.clone(), on_change: move |_| templates.restart() }
                },
                Some(Err(e)) => rsx! { ErrorText { message: api::error_message(e) } },
                None => rsx! { p { class: "muted", "Loading..." } },
            }
            NewTemplateForm { on_created: move |_| templates.restart() }
        }
    }
}

#[component]
fn AssignedTasks(tasks: Vec<StaffTask>) -> Element {
    if tasks.is_empty() {
        return rsx! {
            p { class: "muted", "No tasks for this day." }
        };
    }
    rsx! {
        table {
            class: "table",
            thead {
                tr {
                    th { "Shift" }
                    th { "Task" }
                    th { "Priority" }
                    th { "Status" }
                    th { "Notes" }
                }
            }
            tbody {
                for task in tasks {
                    tr {
                        key: "{task.id}",
                        td { "{task.shift}" }
                        td {
                            "{task.title}"
                            span { class: "muted", " · {task.category}" }
                        }
                        td { StatusBadge { label: task.priority.to_string(), tone: priority_tone(task.priority) } }
                        td { StatusBadge { label: task.status.to_string(), tone: task_tone(task.status) } }
                        td {
                            "{task.notes.clone().unwrap_or_default()}"
                            if let Some(url) = task.photo_url.clone() {
                                " "
                                a { href: "{url}", target: "_blank", rel: "noopener", "Photo" }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn CustomTaskForm(user_id: String, date: chrono::NaiveDate, shift: Shift, on_created: EventHandler<()>) -> Element {
    let mut title = use_signal(String::new);
    let mut category = use_signal(String::new);
    let mut instructions = use_signal(String::new);
    let mut priority = use_signal(|| TaskPriority::Medium);
    let mut requires_photo = use_signal(|| false);
    let mut error = use_signal(|| Option::<String>::None);

    let onsubmit = move |evt: FormEvent| {
        evt.prevent_default();
        let task = CustomTask {
            user_id: user_id.clone(),
            task_date: date,
            shift,
            title: title().trim().to_string(),
            category: category().trim().to_string(),
            instructions: instructions(),
            priority: priority(),
            requires_photo: requires_photo(),
        };
        async move {
            error.set(None);
            match api::assign_custom_task(task).await {
                Ok(_) => {
                    title.set(String::new());
                    instructions.set(String::new());
                    on_created.call(());
                }
                Err(e) => error.set(Some(api::error_message(&e))),
            }
        }
    };

    rsx! {
        form {
            class: "card form",
            onsubmit: onsubmit,
            h3 { "One-off task" }
            div {
                class: "form-row",
                input {
                    class: "input",
                    placeholder: "Title",
                    value: title(),
                    oninput: move |evt: FormEvent| title.set(evt.value()),
                }
                input {
                    class: "input",
                    placeholder: "Category",
                    value: category(),
                    oninput: move |evt: FormEvent| category.set(evt.value()),
                }
                PrioritySelect { value: priority(), on_change: move |p| priority.set(p) }
                label {
                    input {
                        r#type: "checkbox",
                        checked: requires_photo(),
                        onchange: move |evt: FormEvent| requires_photo.set(evt.checked()),
                    }
                    " Photo required"
                }
            }
            textarea {
                class: "input",
                rows: "3",
                placeholder: "Instructions (markdown)",
                value: instructions(),
                oninput: move |evt: FormEvent| instructions.set(evt.value()),
            }
            if let Some(message) = error() {
                ErrorText { message }
            }
            button { class: "btn btn-primary", r#type: "submit", "Assign task" }
        }
    }
}

#[component]
fn TemplateTable(templates: Vec<TaskTemplate>, on_change: EventHandler<()>) -> Element {
    let mut error = use_signal(|| Option::<String>::None);
    if templates.is_empty() {
        return rsx! {
            p { class: "muted", "No templates yet." }
        };
    }
    rsx! {
        if let Some(message) = error() {
            ErrorText { message }
        }
        table {
            class: "table",
            thead {
                tr {
                    th { "Task" }
                    th { "Priority" }
                    th { "Photo" }
                    th { "Active" }
                }
            }
            tbody {
                for template in templates {
                    {
                        let id = template.id.clone();
                        rsx! {
                            tr {
                                key: "{template.id}",
                                class: if !template.active { "row-muted" },
                                td {
                                    strong { "{template.title}" }
                                    span { class: "muted", " · {template.category}" }
                                    Instructions { source: template.instructions.clone() }
                                }
                                td { StatusBadge { label: template.priority.to_string(), tone: priority_tone(template.priority) } }
                                td { if template.requires_photo { "Required" } else { "" } }
                                td {
                                    input {
                                        r#type: "checkbox",
                                        checked: template.active,
                                        onchange: move |_| {
                                            let id = id.clone();
                                            async move {
                                                match api::toggle_template(id).await {
                                                    Ok(_) => on_change.call(()),
                                                    Err(e) => error.set(Some(api::error_message(&e))),
                                                }
                                            }
                                        },
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn NewTemplateForm(on_created: EventHandler<()>) -> Element {
    let mut title = use_signal(String::new);
    let mut category = use_signal(String::new);
    let mut instructions = use_signal(String::new);
    let mut priority = use_signal(|| TaskPriority::Medium);
    let mut requires_photo = use_signal(|| false);
    let mut error = use_signal(|| Option::<String>::None);

    let onsubmit = move |evt: FormEvent| async move {
        evt.prevent_default();
        error.set(None);
        let template = NewTaskTemplate {
            title: title().trim().to_string(),
            category: category().trim().to_string(),
            instructions: instructions(),
            priority: priority(),
            requires_photo: requires_photo(),
        };
        match api::create_template(template).await {
            Ok(_) => {
                title.set(String::new());
                category.set(String::new());
                instructions.set(String::new());
                requires_photo.set(false);
                on_created.call(());
            }
            Err(e) => error.set(Some(api::error_message(&e))),
        }
    };

    rsx! {
        form {
            class: "card form",
            onsubmit: onsubmit,
            h3 { "New template" }
            div {
                class: "form-row",
                input {
                    class: "input",
                    placeholder: "Title",
                    value: title(),
                    oninput: move |evt: FormEvent| title.set(evt.value()),
                }
                input {
                    class: "input",
                    placeholder: "Category",
                    value: category(),
                    oninput: move |evt: FormEvent| category.set(evt.value()),
                }
                PrioritySelect { value: priority(), on_change: move |p| priority.set(p) }
                label {
                    input {
                        r#type: "checkbox",
                        checked: requires_photo(),
                        onchange: move |evt: FormEvent| requires_photo.set(evt.checked()),
                    }
                    " Photo required"
                }
            }
            textarea {
                class: "input",
                rows: "4",
                placeholder: "Instructions (markdown)",
                value: instructions(),
                oninput: move |evt: FormEvent| instructions.set(evt.value()),
            }
            if !instructions().trim().is_empty() {
                div { class: "preview",
                    span { class: "muted", "Preview" }
                    Instructions { source: instructions() }
                }
            }
            if let Some(message) = error() {
                ErrorText { message }
            }
            button { class: "btn btn-primary", r#type: "submit", "Create template" }
        }
    }
}
