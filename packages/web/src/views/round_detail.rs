//! Walking a round: progress, the next checkpoint and the check-in form.

use audit::checkin::CheckinSubmission;
use audit::photos::PhotoUpload;
use audit::progress::RoundProgress;
use audit::{AssignmentStatus, Location};
use dioxus::prelude::*;
use ui::icons::{FaArrowLeft, FaFlagCheckered, FaPlay};
use ui::status::assignment_tone;
use ui::{CheckpointList, Icon, PhotoInput, ProgressBar, StatusBadge};

use super::ErrorText;
use crate::Route;

#[component]
pub fn RoundDetail(assignment_id: String) -> Element {
    let id = use_memo(use_reactive((&assignment_id,), |(assignment_id,)| assignment_id));
    let mut progress = use_resource(move || async move { api::get_round_progress(id()).await });
    let mut selected = use_signal(|| Option::<String>::None);
    let mut error = use_signal(|| Option::<String>::None);

    let start = move |_| async move {
        error.set(None);
        match api::start_round(id()).await {
            Ok(_) => progress.restart(),
            Err(e) => error.set(Some(api::error_message(&e))),
        }
    };

    let finish = move |_| async move {
        error.set(None);
        match api::finish_round(id()).await {
            Ok(_) => progress.restart(),
            Err(e) => error.set(Some(api::error_message(&e))),
        }
    };

    let body = match &*progress.read() {
        Some(Ok(progress)) => progress.clone(),
        Some(Err(e)) => {
            return rsx! {
                BackLink {}
                ErrorText { message: api::error_message(e) }
            }
        }
        None => {
            return rsx! {
                BackLink {}
                p { class: "muted", "Loading..." }
            }
        }
    };

    let status = body.assignment.status;
    let checkpoint = selected()
        .and_then(|location_id| body.pending.iter().find(|l| l.id == location_id).cloned());

    rsx! {
        BackLink {}
        div {
            class: "section-header",
            h2 { "{body.round_name}" }
            StatusBadge { label: status.to_string(), tone: assignment_tone(status) }
        }
        p { class: "muted", "{body.assignment.shift} shift · about {body.estimated_minutes} minutes" }
        ProgressBar {
            percentage: body.percentage,
            label: format!("{}/{} checkpoints", body.completed, body.total),
        }

        if let Some(message) = error() {
            ErrorText { message }
        }

        if status == AssignmentStatus::Pending {
            button {
                class: "btn btn-primary",
                onclick: start,
                Icon { icon: FaPlay, width: 12, height: 12 }
                " Start round"
            }
        }

        CheckpointList {
            progress: body.clone(),
            on_select: move |location_id| selected.set(Some(location_id)),
        }

        if let Some(location) = checkpoint {
            if !status.is_terminal() {
                CheckinForm {
                    key: "{location.id}",
                    assignment_id: id(),
                    location: location,
                    on_done: move |_| {
                        selected.set(None);
                        progress.restart();
                    },
                    on_cancel: move |_| selected.set(None),
                }
            }
        }

        if status == AssignmentStatus::InProgress {
            FinishButton { progress: body.clone(), on_finish: finish }
        }
    }
}

#[component]
fn BackLink() -> Element {
    rsx! {
        Link {
            class: "back-link",
            to: Route::StaffDashboard {},
            Icon { icon: FaArrowLeft, width: 12, height: 12 }
            " Back to my night"
        }
    }
}

/// Finishing early marks the round incomplete, so it asks first.
#[component]
fn FinishButton(progress: RoundProgress, on_finish: EventHandler<()>) -> Element {
    let mut confirming = use_signal(|| false);
    let remaining = progress.total.saturating_sub(progress.completed);
    let complete = progress.is_complete();

    if complete || !confirming() {
        return rsx! {
            button {
                class: "btn",
                onclick: move |_| {
                    if complete {
                        on_finish.call(());
                    } else {
                        confirming.set(true);
                    }
                },
                Icon { icon: FaFlagCheckered, width: 12, height: 12 }
                " Finish round"
            }
        };
    }

    rsx! {
        div {
            class: "card confirm",
            p { "{remaining} checkpoints are still open. The round will be marked incomplete." }
            div {
                class: "button-row",
                button {
                    class: "btn btn-danger",
                    onclick: move |_| {
                        confirming.set(false);
                        on_finish.call(());
                    },
                    "Finish anyway"
                }
                button { class: "btn btn-ghost", onclick: move |_| confirming.set(false), "Keep going" }
            }
        }
    }
}

#[component]
fn CheckinForm(
    assignment_id: String,
    location: Location,
    on_done: EventHandler<()>,
    on_cancel: EventHandler<()>,
) -> Element {
    let mut code = use_signal(String::new);
    let mut proof = use_signal(|| Option::<PhotoUpload>::None);
    let mut has_incident = use_signal(|| false);
    let mut damage = use_signal(|| Option::<PhotoUpload>::None);
    let mut description = use_signal(String::new);
    let mut errors = use_signal(Vec::<String>::new);
    let mut submitting = use_signal(|| false);

    let location_id = location.id.clone();
    let onsubmit = move |evt: FormEvent| {
        evt.prevent_default();
        let incident = has_incident();
        let submission = CheckinSubmission {
            assignment_id: assignment_id.clone(),
            location_id: location_id.clone(),
            proof_photo: proof(),
            has_incident: incident,
            damage_photo: if incident { damage() } else { None },
            damage_description: Some(description())
                .filter(|d| incident && !d.trim().is_empty()),
            scanned_code: Some(code().trim().to_string()).filter(|c| !c.is_empty()),
        };
        async move {
            // Same checks the server runs first; nothing is uploaded if they fail.
            let problems = submission.precheck();
            if !problems.is_empty() {
                errors.set(problems);
                return;
            }
            submitting.set(true);
            errors.set(Vec::new());
            match api::submit_checkin(submission).await {
                Ok(_) => on_done.call(()),
                Err(e) => errors.set(vec![api::error_message(&e)]),
            }
            submitting.set(false);
        }
    };

    rsx! {
        form {
            class: "card form checkin-form",
            onsubmit: onsubmit,
            h3 { "Check in: {location.name}" }
            p { class: "muted", "{location.building} · Floor {location.floor}" }

            label { class: "field",
                span { "Tag code" }
                input {
                    class: "input",
                    placeholder: "Scan the NFC tag or QR sticker",
                    value: code(),
                    oninput: move |evt: FormEvent| code.set(evt.value()),
                }
            }

            PhotoInput {
                label: "Proof photo",
                on_change: move |upload| proof.set(upload),
                disabled: submitting(),
            }

            label { class: "field field-inline",
                input {
                    r#type: "checkbox",
                    checked: has_incident(),
                    onchange: move |evt: FormEvent| has_incident.set(evt.checked()),
                }
                span { "Report an incident" }
            }

            if has_incident() {
                PhotoInput {
                    label: "Photo of the damage",
                    on_change: move |upload| damage.set(upload),
                    disabled: submitting(),
                }
                textarea {
                    class: "input",
                    rows: "3",
                    placeholder: "What happened?",
                    value: description(),
                    oninput: move |evt: FormEvent| description.set(evt.value()),
                }
            }

            for message in errors() {
                ErrorText { message }
            }

            div {
                class: "button-row",
                button {
                    class: "btn btn-primary",
                    r#type: "submit",
                    disabled: submitting(),
                    if submitting() { "Submitting..." } else { "Submit check-in" }
                }
                button {
                    class: "btn btn-ghost",
                    r#type: "button",
                    onclick: move |_| on_cancel.call(()),
                    "Cancel"
                }
            }
        }
    }
}
