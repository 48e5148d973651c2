use dioxus::prelude::*;

use crate::auth::{use_auth, LogoutButton};
use crate::OnlineIndicator;

/// Top bar with the product name, navigation links (`children`) and the
/// signed-in user.
#[component]
pub fn Navbar(children: Element) -> Element {
    let auth = use_auth();
    let name = auth()
        .user
        .map(|u| u.display_name().to_string())
        .unwrap_or_default();

    rsx! {
        nav {
            class: "navbar",
            span { class: "navbar-brand", "NightAudit" }
            div { class: "navbar-links", {children} }
            div {
                class: "navbar-user",
                OnlineIndicator {}
                span { class: "navbar-name", "{name}" }
                LogoutButton { class: "btn btn-ghost" }
            }
        }
    }
}
