//! Nightly compliance, live round progress and the incident report.

use audit::assignments::AssignmentSummary;
use audit::dashboard::{IncidentRecord, IncidentSummary, NightlyOverview, Standing, StaffCompliance};
use chrono::Duration;
use dioxus::prelude::*;
use ui::icons::{FaTriangleExclamation, FaUserCheck};
use ui::status::{assignment_tone, Tone};
use ui::{Icon, ProgressBar, StatusBadge};

use super::{DateInput, ErrorText};

fn standing_badge(standing: Standing) -> (&'static str, Tone) {
    match standing {
        Standing::NotStarted => ("Not started", Tone::Neutral),
        Standing::InProgress => ("In progress", Tone::Info),
        Standing::Complete => ("Complete", Tone::Success),
    }
}

#[component]
pub fn AdminDashboard() -> Element {
    let mut night = use_signal(ui::today);
    let mut from = use_signal(|| ui::today() - Duration::days(7));
    let mut to = use_signal(ui::today);

    let overview = use_resource(move || async move { api::nightly_overview(night()).await });
    let assignments = use_resource(move || async move { api::list_assignments(night()).await });
    let incidents = use_resource(move || async move { api::incident_summary(from(), to()).await });

    rsx! {
        section {
            class: "section",
            div {
                class: "section-header",
                h2 { "Night overview" }
                DateInput { value: night(), on_change: move |d| night.set(d) }
            }
            match &*overview.read() {
                Some(Ok(overview)) => rsx! { Overview { overview: overview.clone() } },
                Some(Err(e)) => rsx! { ErrorText { message: api::error_message(e) } },
                None => rsx! { p { class: "muted", "Loading..." } },
            }
        }

        section {
            class: "section",
            h2 { "Rounds in progress" }
            match &*assignments.read() {
                Some(Ok(list)) if list.is_empty() => rsx! {
                    p { class: "muted", "No rounds assigned for this night." }
                },
                Some(Ok(list)) => rsx! { AssignmentTable { assignments: list.clone() } },
                Some(Err(e)) => rsx! { ErrorText { message: api::error_message(e) } },
                None => rsx! { p { class: "muted", "Loading..." } },
            }
        }

        section {
            class: "section",
            div {
                class: "section-header",
                h2 { "Incidents" }
                div {
                    class: "inline-fields",
                    DateInput { value: from(), on_change: move |d| from.set(d) }
                    span { "to" }
                    DateInput { value: to(), on_change: move |d| to.set(d) }
                }
            }
            match &*incidents.read() {
                Some(Ok(summary)) => rsx! { Incidents { summary: summary.clone() } },
                Some(Err(e)) => rsx! { ErrorText { message: api::error_message(e) } },
                None => rsx! { p { class: "muted", "Loading..." } },
            }
        }
    }
}

#[component]
fn Overview(overview: NightlyOverview) -> Element {
    rsx! {
        div {
            class: "stat-grid",
            div { class: "stat",
                span { class: "stat-label", "Compliance" }
                span { class: "stat-value", "{overview.compliance_pct}%" }
            }
            div { class: "stat",
                span { class: "stat-label", "Checkpoints" }
                span { class: "stat-value", "{overview.checkpoints_done}/{overview.checkpoints_total}" }
            }
            div { class: "stat",
                span { class: "stat-label", "Tasks" }
                span { class: "stat-value", "{overview.tasks_done}/{overview.tasks_total}" }
            }
            div { class: "stat",
                span { class: "stat-label", "Incidents" }
                span { class: "stat-value", "{overview.incidents}" }
            }
        }
        if overview.staff.is_empty() {
            p { class: "muted", "Nobody is on the schedule." }
        } else {
            table {
                class: "table",
                thead {
                    tr {
                        th { "Staff" }
                        th { "Rounds" }
                        th { "Checkpoints" }
                        th { "Tasks" }
                        th { "Incidents" }
                        th { "Standing" }
                    }
                }
                tbody {
                    for row in overview.staff.iter().cloned() {
                        StaffRow { key: "{row.user_id}", row: row }
                    }
                }
            }
        }
    }
}

#[component]
fn StaffRow(row: StaffCompliance) -> Element {
    let (label, tone) = standing_badge(row.standing);
    rsx! {
        tr {
            td {
                Icon { icon: FaUserCheck, width: 12, height: 12 }
                " {row.name}"
            }
            td { "{row.rounds}" }
            td { ProgressBar { percentage: row.checkpoint_pct } }
            td { ProgressBar { percentage: row.task_pct } }
            td { "{row.incidents}" }
            td { StatusBadge { label: label.to_string(), tone: tone } }
        }
    }
}

#[component]
fn AssignmentTable(assignments: Vec<AssignmentSummary>) -> Element {
    rsx! {
        table {
            class: "table",
            thead {
                tr {
                    th { "Staff" }
                    th { "Round" }
                    th { "Shift" }
                    th { "Progress" }
                    th { "Status" }
                }
            }
            tbody {
                for summary in assignments {
                    tr {
                        key: "{summary.assignment.id}",
                        td { "{summary.staff_name}" }
                        td { "{summary.round_name}" }
                        td { "{summary.assignment.shift}" }
                        td {
                            ProgressBar {
                                percentage: summary.percentage,
                                label: format!("{}/{}", summary.completed, summary.total),
                            }
                        }
                        td {
                            StatusBadge {
                                label: summary.assignment.status.to_string(),
                                tone: assignment_tone(summary.assignment.status),
                            }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn Incidents(summary: IncidentSummary) -> Element {
    if summary.total == 0 {
        return rsx! {
            p { class: "muted", "No incidents reported between {summary.from} and {summary.to}." }
        };
    }
    rsx! {
        p {
            Icon { icon: FaTriangleExclamation, width: 14, height: 14 }
            " {summary.total} incidents reported"
        }
        div {
            class: "two-columns",
            div {
                h3 { "By location" }
                ul {
                    class: "plain-list",
                    for entry in summary.by_location.iter() {
                        li { key: "{entry.location}",
                            span { "{entry.location}" }
                            span { class: "count", "{entry.count}" }
                        }
                    }
                }
            }
            div {
                h3 { "Most recent" }
                ul {
                    class: "incident-list",
                    for incident in summary.recent.iter().cloned() {
                        IncidentItem { key: "{incident.checkin_id}", incident: incident }
                    }
                }
            }
        }
    }
}

#[component]
fn IncidentItem(incident: IncidentRecord) -> Element {
    let when = incident.reported_at.format("%Y-%m-%d %H:%M").to_string();
    rsx! {
        li {
            div { class: "incident-meta",
                strong { "{incident.location}" }
                span { class: "muted", " {when} · {incident.staff_name}" }
            }
            p { "{incident.description}" }
            if let Some(url) = incident.photo_url {
                a { href: "{url}", target: "_blank", rel: "noopener", "View photo" }
            }
        }
    }
}
