//! Coloured badges for assignment, task and priority states.

use audit::{AssignmentStatus, TaskPriority, TaskStatus};
use dioxus::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tone {
    Neutral,
    Info,
    Success,
    Warning,
    Danger,
}

impl Tone {
    fn class(&self) -> &'static str {
        match self {
            Tone::Neutral => "badge badge-neutral",
            Tone::Info => "badge badge-info",
            Tone::Success => "badge badge-success",
            Tone::Warning => "badge badge-warning",
            Tone::Danger => "badge badge-danger",
        }
    }
}

pub fn assignment_tone(status: AssignmentStatus) -> Tone {
    match status {
        AssignmentStatus::Pending => Tone::Neutral,
        AssignmentStatus::InProgress => Tone::Info,
        AssignmentStatus::Completed => Tone::Success,
        AssignmentStatus::Incomplete => Tone::Danger,
    }
}

pub fn task_tone(status: TaskStatus) -> Tone {
    match status {
        TaskStatus::Pending => Tone::Neutral,
        TaskStatus::InProgress => Tone::Info,
        TaskStatus::Completed => Tone::Success,
        TaskStatus::Skipped => Tone::Warning,
        TaskStatus::Blocked => Tone::Danger,
    }
}

pub fn priority_tone(priority: TaskPriority) -> Tone {
    match priority {
        TaskPriority::Low => Tone::Neutral,
        TaskPriority::Medium => Tone::Warning,
        TaskPriority::High => Tone::Danger,
    }
}

#[component]
pub fn StatusBadge(label: String, tone: Tone) -> Element {
    rsx! {
        span { class: tone.class(), "{label}" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_failures_are_red() {
        assert_eq!(assignment_tone(AssignmentStatus::Incomplete), Tone::Danger);
        assert_eq!(task_tone(TaskStatus::Blocked), Tone::Danger);
        assert_eq!(task_tone(TaskStatus::Completed), Tone::Success);
    }
}
