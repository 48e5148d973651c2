//! Authentication context, the route gate and the logout button.

use api::UserInfo;
use audit::access::{resolve, Access};
use dioxus::prelude::*;

/// Authentication state for the application.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthState {
    pub user: Option<UserInfo>,
    pub loading: bool,
    /// Whether the server is reachable (last connectivity check succeeded).
    pub online: bool,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            user: None,
            loading: true,
            online: false,
        }
    }
}

/// Get the current authentication state.
/// Returns a signal that updates when the user logs in or out.
pub fn use_auth() -> Signal<AuthState> {
    use_context::<Signal<AuthState>>()
}

/// Ask the server who is signed in. A failed call means the server is
/// unreachable, not that the user is signed out.
async fn probe(previous: &AuthState) -> AuthState {
    match api::get_current_user().await {
        Ok(user) => AuthState {
            user,
            loading: false,
            online: true,
        },
        Err(e) => {
            tracing::warn!("Session check failed: {}", e);
            AuthState {
                loading: false,
                online: false,
                ..previous.clone()
            }
        }
    }
}

/// Holds the [`AuthState`] for the whole app and re-checks the session
/// every minute, so an expired session sends the user back to `/login`.
#[component]
pub fn AuthProvider(children: Element) -> Element {
    let mut auth_state = use_signal(AuthState::default);

    let _ = use_resource(move || async move {
        let previous = auth_state.peek().clone();
        auth_state.set(probe(&previous).await);
    });

    use_effect(move || {
        spawn(async move {
            loop {
                #[cfg(target_arch = "wasm32")]
                gloo_timers::future::sleep(std::time::Duration::from_secs(60)).await;
                #[cfg(not(target_arch = "wasm32"))]
                tokio::time::sleep(std::time::Duration::from_secs(60)).await;

                let current = auth_state.peek().clone();
                if current.loading {
                    continue;
                }
                let next = probe(&current).await;
                if next != current {
                    auth_state.set(next);
                }
            }
        });
    });

    use_context_provider(|| auth_state);

    rsx! {
        {children}
    }
}

/// Renders `children` only when the signed-in user may view `path`;
/// otherwise replaces the location with the redirect target.
#[component]
pub fn AccessGate(path: String, children: Element) -> Element {
    let auth = use_auth();
    let nav = use_navigator();
    let state = auth();

    if state.loading {
        return rsx! {
            div { class: "page-loading", "Loading..." }
        };
    }

    let role = state.user.as_ref().map(|u| u.role);
    match resolve(&path, role) {
        Access::Allow => rsx! {
            {children}
        },
        Access::Redirect(target) => {
            nav.replace(target.to_string());
            rsx! {}
        }
    }
}

/// Button to log out the current user.
#[component]
pub fn LogoutButton(
    #[props(default = "Sign out".to_string())] label: String,
    #[props(default = "".to_string())] class: String,
) -> Element {
    let mut auth_state = use_auth();
    let nav = use_navigator();

    let onclick = move |_| async move {
        match api::logout().await {
            Ok(()) => {
                auth_state.set(AuthState {
                    user: None,
                    loading: false,
                    online: auth_state().online,
                });
                nav.replace("/login".to_string());
            }
            Err(e) => tracing::error!("Logout failed: {}", e),
        }
    };

    rsx! {
        button {
            class: "{class}",
            onclick: onclick,
            "{label}"
        }
    }
}
