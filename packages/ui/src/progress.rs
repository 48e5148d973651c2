//! Round progress: the percentage bar and the checkpoint list.

use audit::progress::{CheckpointState, CheckpointStatus, RoundProgress};
use dioxus::prelude::*;

use crate::icons::{FaCircleCheck, FaLocationDot, FaLock, FaTriangleExclamation};
use crate::Icon;

#[component]
pub fn ProgressBar(percentage: u8, #[props(default)] label: String) -> Element {
    let width = percentage.min(100);
    rsx! {
        div {
            class: "progress",
            div {
                class: "progress-track",
                div { class: "progress-fill", style: "width: {width}%;" }
            }
            span {
                class: "progress-label",
                if label.is_empty() {
                    "{width}%"
                } else {
                    "{label} · {width}%"
                }
            }
        }
    }
}

fn time_label(checkpoint: &CheckpointStatus) -> String {
    checkpoint
        .completed_at
        .map(|at| at.format("%H:%M").to_string())
        .unwrap_or_default()
}

/// Every checkpoint of a round in order. Only the next actionable one is
/// clickable; later ones show a lock until it completes.
#[component]
pub fn CheckpointList(progress: RoundProgress, on_select: EventHandler<String>) -> Element {
    rsx! {
        ol {
            class: "checkpoints",
            for checkpoint in progress.checkpoints.iter().cloned() {
                {
                    let id = checkpoint.location.id.clone();
                    let label = checkpoint.location.label();
                    let time = time_label(&checkpoint);
                    match checkpoint.state {
                        CheckpointState::Completed => rsx! {
                            li {
                                key: "{id}",
                                class: "checkpoint checkpoint--done",
                                Icon { icon: FaCircleCheck, width: 16, height: 16 }
                                span { class: "checkpoint-name", "{label}" }
                                if checkpoint.has_incident {
                                    span {
                                        class: "checkpoint-incident",
                                        title: "Incident reported",
                                        Icon { icon: FaTriangleExclamation, width: 14, height: 14 }
                                    }
                                }
                                span { class: "checkpoint-time", "{time}" }
                            }
                        },
                        CheckpointState::Next => rsx! {
                            li {
                                key: "{id}",
                                class: "checkpoint checkpoint--next",
                                button {
                                    class: "checkpoint-action",
                                    onclick: move |_| on_select.call(id.clone()),
                                    Icon { icon: FaLocationDot, width: 16, height: 16 }
                                    span { class: "checkpoint-name", "{label}" }
                                    span { class: "checkpoint-hint", "Check in" }
                                }
                            }
                        },
                        CheckpointState::Locked => rsx! {
                            li {
                                key: "{id}",
                                class: "checkpoint checkpoint--locked",
                                title: "Complete the previous checkpoints first",
                                Icon { icon: FaLock, width: 14, height: 14 }
                                span { class: "checkpoint-name", "{label}" }
                            }
                        },
                    }
                }
            }
        }
    }
}
