//! Email and password sign-in.

use dioxus::prelude::*;
use ui::{use_auth, AuthState};

use super::ErrorText;

#[component]
pub fn Login() -> Element {
    let mut auth = use_auth();
    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut error = use_signal(|| Option::<String>::None);
    let mut submitting = use_signal(|| false);

    // The route gate moves the user to their dashboard once `auth` has a user.
    let onsubmit = move |evt: FormEvent| async move {
        evt.prevent_default();
        if submitting() {
            return;
        }
        submitting.set(true);
        error.set(None);
        match api::login(email().trim().to_string(), password()).await {
            Ok(user) => auth.set(AuthState {
                user: Some(user),
                loading: false,
                online: true,
            }),
            Err(e) => error.set(Some(api::error_message(&e))),
        }
        submitting.set(false);
    };

    rsx! {
        div {
            class: "login-container",
            form {
                class: "card login-card",
                onsubmit: onsubmit,
                h1 { class: "login-title", "NightAudit" }
                p { class: "muted", "Sign in with your hotel account" }

                label { class: "field",
                    span { "Email" }
                    input {
                        class: "input",
                        r#type: "email",
                        autocomplete: "username",
                        required: true,
                        value: email(),
                        oninput: move |evt: FormEvent| email.set(evt.value()),
                    }
                }
                label { class: "field",
                    span { "Password" }
                    input {
                        class: "input",
                        r#type: "password",
                        autocomplete: "current-password",
                        required: true,
                        value: password(),
                        oninput: move |evt: FormEvent| password.set(evt.value()),
                    }
                }

                if let Some(message) = error() {
                    ErrorText { message }
                }

                button {
                    class: "btn btn-primary",
                    r#type: "submit",
                    disabled: submitting(),
                    if submitting() { "Signing in..." } else { "Sign in" }
                }
            }
        }
    }
}
