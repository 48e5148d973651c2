//! Locations, rounds and nightly round assignments.

use audit::{Location, Role, Round, Shift};
use dioxus::prelude::*;
use ui::icons::{FaCopy, FaPlus};
use ui::Icon;

use super::{DateInput, ErrorText, ShiftSelect};

#[component]
pub fn AdminRounds() -> Element {
    let mut locations = use_resource(|| async move { api::list_locations().await });
    let mut rounds = use_resource(|| async move { api::list_rounds().await });
    let users = use_resource(|| async move { api::list_users().await });

    let location_list = match &*locations.read() {
        Some(Ok(list)) => list.clone(),
        _ => Vec::new(),
    };
    let round_list = match &*rounds.read() {
        Some(Ok(list)) => list.clone(),
        _ => Vec::new(),
    };
    let staff: Vec<(String, String)> = match &*users.read() {
        Some(Ok(list)) => list
            .iter()
            .filter(|u| u.role == Role::Staff)
            .map(|u| (u.id.clone(), u.display_name().to_string()))
            .collect(),
        _ => Vec::new(),
    };
    let load_error = [
        locations.read().as_ref().and_then(|r| r.as_ref().err().map(api::error_message)),
        rounds.read().as_ref().and_then(|r| r.as_ref().err().map(api::error_message)),
    ]
    .into_iter()
    .flatten()
    .next();

    rsx! {
        if let Some(message) = load_error {
            ErrorText { message }
        }

        section {
            class: "section",
            h2 { "Assign a round" }
            AssignRoundForm { staff: staff, rounds: round_list.clone() }
        }

        section {
            class: "section",
            h2 { "Rounds" }
            RoundList {
                rounds: round_list.clone(),
                locations: location_list.clone(),
                on_change: move |_| rounds.restart(),
            }
            NewRoundForm {
                locations: location_list.clone(),
                on_created: move |_| rounds.restart(),
            }
        }

        section {
            class: "section",
            h2 { "Locations" }
            table {
                class: "table",
                thead {
                    tr {
                        th { "Building" }
                        th { "Floor" }
                        th { "Name" }
                        th { "Tag code" }
                    }
                }
                tbody {
                    for location in location_list.iter() {
                        tr { key: "{location.id}",
                            td { "{location.building}" }
                            td { "{location.floor}" }
                            td { "{location.name}" }
                            td { code { "{location.verification_code}" } }
                        }
                    }
                }
            }
            NewLocationForm { on_created: move |_| locations.restart() }
        }
    }
}

#[component]
fn AssignRoundForm(staff: Vec<(String, String)>, rounds: Vec<Round>) -> Element {
    let mut user_id = use_signal(String::new);
    let mut round_id = use_signal(String::new);
    let mut date = use_signal(ui::today);
    let mut shift = use_signal(|| Shift::Night);
    let mut error = use_signal(|| Option::<String>::None);
    let mut notice = use_signal(|| Option::<String>::None);

    let onsubmit = move |evt: FormEvent| async move {
        evt.prevent_default();
        error.set(None);
        notice.set(None);
        if user_id().is_empty() || round_id().is_empty() {
            error.set(Some("Choose a staff member and a round".to_string()));
            return;
        }
        match api::assign_round(user_id(), round_id(), date(), shift()).await {
            Ok(_) => notice.set(Some("Round assigned".to_string())),
            Err(e) => error.set(Some(api::error_message(&e))),
        }
    };

    rsx! {
        form {
            class: "form-row",
            onsubmit: onsubmit,
            select {
                class: "input",
                onchange: move |evt: FormEvent| user_id.set(evt.value()),
                option { value: "", "Staff member" }
                for (id, name) in staff {
                    option { key: "{id}", value: "{id}", "{name}" }
                }
            }
            select {
                class: "input",
                onchange: move |evt: FormEvent| round_id.set(evt.value()),
                option { value: "", "Round" }
                for round in rounds {
                    option { key: "{round.id}", value: "{round.id}", "{round.name}" }
                }
            }
            DateInput { value: date(), on_change: move |d| date.set(d) }
            ShiftSelect { value: shift(), on_change: move |s| shift.set(s) }
            button { class: "btn btn-primary", r#type: "submit", "Assign" }
        }
        if let Some(message) = error() {
            ErrorText { message }
        }
        if let Some(message) = notice() {
            p { class: "form-notice", "{message}" }
        }
    }
}

#[component]
fn RoundList(rounds: Vec<Round>, locations: Vec<Location>, on_change: EventHandler<()>) -> Element {
    let mut error = use_signal(|| Option::<String>::None);

    if rounds.is_empty() {
        return rsx! {
            p { class: "muted", "No rounds yet." }
        };
    }

    rsx! {
        if let Some(message) = error() {
            ErrorText { message }
        }
        ul {
            class: "round-list",
            for round in rounds {
                {
                    let stops: Vec<String> = round
                        .location_ids
                        .iter()
                        .map(|id| {
                            locations
                                .iter()
                                .find(|l| &l.id == id)
                                .map(|l| l.name.clone())
                                .unwrap_or_else(|| "Unknown location".to_string())
                        })
                        .collect();
                    let route = stops.join(" → ");
                    let id = round.id.clone();
                    rsx! {
                        li {
                            key: "{round.id}",
                            div {
                                strong { "{round.name}" }
                                span { class: "muted", " · {round.estimated_minutes} min · {stops.len()} checkpoints" }
                            }
                            p { class: "round-route", "{route}" }
                            button {
                                class: "btn btn-ghost",
                                title: "Duplicate round",
                                onclick: move |_| {
                                    let id = id.clone();
                                    async move {
                                        match api::duplicate_round(id, None).await {
                                            Ok(_) => {
                                                error.set(None);
                                                on_change.call(());
                                            }
                                            Err(e) => error.set(Some(api::error_message(&e))),
                                        }
                                    }
                                },
                                Icon { icon: FaCopy, width: 14, height: 14 }
                                " Duplicate"
                            }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn NewRoundForm(locations: Vec<Location>, on_created: EventHandler<()>) -> Element {
    let mut name = use_signal(String::new);
    let mut minutes = use_signal(|| 30i32);
    // Checkpoint order follows the order in which boxes are ticked.
    let mut selected = use_signal(Vec::<String>::new);
    let mut error = use_signal(|| Option::<String>::None);

    let onsubmit = move |evt: FormEvent| async move {
        evt.prevent_default();
        error.set(None);
        match api::create_round(name().trim().to_string(), selected(), minutes()).await {
            Ok(_) => {
                name.set(String::new());
                selected.set(Vec::new());
                on_created.call(());
            }
            Err(e) => error.set(Some(api::error_message(&e))),
        }
    };

    rsx! {
        form {
            class: "card form",
            onsubmit: onsubmit,
            h3 { "New round" }
            div {
                class: "form-row",
                input {
                    class: "input",
                    placeholder: "Round name",
                    value: name(),
                    oninput: move |evt: FormEvent| name.set(evt.value()),
                }
                input {
                    class: "input input-narrow",
                    r#type: "number",
                    min: "1",
                    value: "{minutes}",
                    oninput: move |evt: FormEvent| {
                        if let Ok(value) = evt.value().parse() {
                            minutes.set(value);
                        }
                    },
                }
                span { "minutes" }
            }
            div {
                class: "checkbox-list",
                for location in locations {
                    {
                        let id = location.id.clone();
                        let position = selected().iter().position(|s| s == &id);
                        rsx! {
                            label {
                                key: "{location.id}",
                                input {
                                    r#type: "checkbox",
                                    checked: position.is_some(),
                                    onchange: move |_| {
                                        let mut ids = selected();
                                        if let Some(at) = ids.iter().position(|s| s == &id) {
                                            ids.remove(at);
                                        } else {
                                            ids.push(id.clone());
                                        }
                                        selected.set(ids);
                                    },
                                }
                                if let Some(at) = position {
                                    span { class: "order", "{at + 1}" }
                                }
                                " {location.label()}"
                            }
                        }
                    }
                }
            }
            if let Some(message) = error() {
                ErrorText { message }
            }
            button {
                class: "btn btn-primary",
                r#type: "submit",
                Icon { icon: FaPlus, width: 12, height: 12 }
                " Create round"
            }
        }
    }
}

#[component]
fn NewLocationForm(on_created: EventHandler<()>) -> Element {
    let mut name = use_signal(String::new);
    let mut building = use_signal(String::new);
    let mut floor = use_signal(|| 0i32);
    let mut code = use_signal(String::new);
    let mut error = use_signal(|| Option::<String>::None);

    let onsubmit = move |evt: FormEvent| async move {
        evt.prevent_default();
        error.set(None);
        match api::create_location(
            name().trim().to_string(),
            floor(),
            building().trim().to_string(),
            code().trim().to_string(),
        )
        .await
        {
            Ok(_) => {
                name.set(String::new());
                code.set(String::new());
                on_created.call(());
            }
            Err(e) => error.set(Some(api::error_message(&e))),
        }
    };

    rsx! {
        form {
            class: "card form",
            onsubmit: onsubmit,
            h3 { "New location" }
            div {
                class: "form-row",
                input {
                    class: "input",
                    placeholder: "Building",
                    value: building(),
                    oninput: move |evt: FormEvent| building.set(evt.value()),
                }
                input {
                    class: "input input-narrow",
                    r#type: "number",
                    value: "{floor}",
                    oninput: move |evt: FormEvent| {
                        if let Ok(value) = evt.value().parse() {
                            floor.set(value);
                        }
                    },
                }
                input {
                    class: "input",
                    placeholder: "Name",
                    value: name(),
                    oninput: move |evt: FormEvent| name.set(evt.value()),
                }
                input {
                    class: "input",
                    placeholder: "NFC / QR code",
                    value: code(),
                    oninput: move |evt: FormEvent| code.set(evt.value()),
                }
            }
            if let Some(message) = error() {
                ErrorText { message }
            }
            button {
                class: "btn btn-primary",
                r#type: "submit",
                Icon { icon: FaPlus, width: 12, height: 12 }
                " Add location"
            }
        }
    }
}
