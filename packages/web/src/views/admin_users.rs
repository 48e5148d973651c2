use audit::Role;
use dioxus::prelude::*;
use ui::icons::FaUserPlus;
use ui::Icon;

use super::ErrorText;

#[component]
pub fn AdminUsers() -> Element {
    let mut users = use_resource(|| async move { api::list_users().await });

    rsx! {
        section {
            class: "section",
            h2 { "Users" }
            match &*users.read() {
                Some(Ok(list)) => rsx! {
                    table {
                        class: "table",
                        thead {
                            tr {
                                th { "Name" }
                                th { "Email" }
                                th { "Role" }
                            }
                        }
                        tbody {
                            for user in list.iter() {
                                tr { key: "{user.id}",
                                    td { "{user.display_name()}" }
                                    td { "{user.email}" }
                                    td { "{user.role}" }
                                }
                            }
                        }
                    }
                },
                Some(Err(e)) => rsx! { ErrorText { message: api::error_message(e) } },
                None => rsx! { p { class: "muted", "Loading..." } },
            }
        }
        section {
            class: "section",
            NewUserForm { on_created: move |_| users.restart() }
        }
    }
}

#[component]
fn NewUserForm(on_created: EventHandler<()>) -> Element {
    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut full_name = use_signal(String::new);
    let mut role = use_signal(|| Role::Staff);
    let mut error = use_signal(|| Option::<String>::None);
    let mut notice = use_signal(|| Option::<String>::None);

    let onsubmit = move |evt: FormEvent| async move {
        evt.prevent_default();
        error.set(None);
        notice.set(None);
        match api::create_user(email(), password(), full_name(), role()).await {
            Ok(user) => {
                notice.set(Some(format!("Created {}", user.email)));
                email.set(String::new());
                password.set(String::new());
                full_name.set(String::new());
                on_created.call(());
            }
            Err(e) => error.set(Some(api::error_message(&e))),
        }
    };

    rsx! {
        form {
            class: "card form",
            onsubmit: onsubmit,
            h3 { "New user" }
            div {
                class: "form-row",
                input {
                    class: "input",
                    placeholder: "Full name",
                    value: full_name(),
                    oninput: move |evt: FormEvent| full_name.set(evt.value()),
                }
                input {
                    class: "input",
                    r#type: "email",
                    placeholder: "Email",
                    value: email(),
                    oninput: move |evt: FormEvent| email.set(evt.value()),
                }
                input {
                    class: "input",
                    r#type: "password",
                    autocomplete: "new-password",
                    placeholder: "Temporary password",
                    value: password(),
                    oninput: move |evt: FormEvent| password.set(evt.value()),
                }
                select {
                    class: "input",
                    onchange: move |evt: FormEvent| {
                        if let Ok(value) = evt.value().parse::<Role>() {
                            role.set(value);
                        }
                    },
                    option { value: "staff", selected: role() == Role::Staff, "Staff" }
                    option { value: "admin", selected: role() == Role::Admin, "Administrator" }
                }
            }
            if let Some(message) = error() {
                ErrorText { message }
            }
            if let Some(message) = notice() {
                p { class: "form-notice", "{message}" }
            }
            button {
                class: "btn btn-primary",
                r#type: "submit",
                Icon { icon: FaUserPlus, width: 14, height: 14 }
                " Create user"
            }
        }
    }
}
