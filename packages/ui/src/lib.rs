//! This crate contains all shared UI for the workspace.

use dioxus::prelude::*;

// Re-export icon library
pub use dioxus_free_icons::Icon;
pub mod icons {
    pub use dioxus_free_icons::icons::fa_solid_icons::*;
}


mod auth;
pub use auth::{use_auth, AccessGate, AuthProvider, AuthState, LogoutButton};

mod navbar;
pub use navbar::Navbar;

mod online_indicator;
pub use online_indicator::OnlineIndicator;

mod progress;
pub use progress::{CheckpointList, ProgressBar};

pub mod status;
pub use status::StatusBadge;

mod instructions;
pub use instructions::{instructions_html, Instructions};

mod photo_input;
pub use photo_input::PhotoInput;

mod dates;
pub use dates::{parse_date, today};
