//! Connection status indicator for the top bar.

use dioxus::prelude::*;

use crate::auth::use_auth;
use crate::icons::{FaCloud, FaCloudArrowUp};
use crate::Icon;

/// A small icon showing whether the last session check reached the server.
#[component]
pub fn OnlineIndicator() -> Element {
    let auth = use_auth();
    let state = auth();

    if state.loading {
        return rsx! {};
    }

    if state.online {
        rsx! {
            span {
                class: "online-indicator online-indicator--online",
                title: "Connected",
                Icon { icon: FaCloud, width: 14, height: 14 }
            }
        }
    } else {
        rsx! {
            span {
                class: "online-indicator online-indicator--offline",
                title: "Offline: changes will fail until the connection returns",
                Icon { icon: FaCloudArrowUp, width: 14, height: 14 }
            }
        }
    }
}
