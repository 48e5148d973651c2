mod login;
pub use login::Login;

mod layouts;
pub use layouts::{AdminLayout, StaffLayout};

mod admin_dashboard;
pub use admin_dashboard::AdminDashboard;

mod admin_rounds;
pub use admin_rounds::AdminRounds;

mod admin_tasks;
pub use admin_tasks::AdminTasks;

mod admin_users;
pub use admin_users::AdminUsers;

mod staff_dashboard;
pub use staff_dashboard::StaffDashboard;

mod round_detail;
pub use round_detail::RoundDetail;

use audit::Shift;
use dioxus::prelude::*;

/// Inline error line shown under a form or section.
#[component]
pub(crate) fn ErrorText(message: String) -> Element {
    rsx! {
        p { class: "form-error", role: "alert", "{message}" }
    }
}

/// `<select>` over the three shifts.
#[component]
pub(crate) fn ShiftSelect(value: Shift, on_change: EventHandler<Shift>) -> Element {
    rsx! {
        select {
            class: "input",
            value: value.as_str(),
            onchange: move |evt: FormEvent| {
                if let Ok(shift) = evt.value().parse::<Shift>() {
                    on_change.call(shift);
                }
            },
            for shift in Shift::ALL {
                option { value: shift.as_str(), selected: shift == value, "{shift}" }
            }
        }
    }
}

/// `<input type="date">` bound to a `NaiveDate`.
#[component]
pub(crate) fn DateInput(value: chrono::NaiveDate, on_change: EventHandler<chrono::NaiveDate>) -> Element {
    rsx! {
        input {
            class: "input",
            r#type: "date",
            value: value.format("%Y-%m-%d").to_string(),
            onchange: move |evt: FormEvent| {
                if let Some(date) = ui::parse_date(&evt.value()) {
                    on_change.call(date);
                }
            },
        }
    }
}
