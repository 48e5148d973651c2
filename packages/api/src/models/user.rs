//! # The signed-in user as seen by the client
//!
//! [`UserInfo`] is the client-safe projection of an `audit::Profile`: it
//! crosses the server-function boundary and feeds the router guard, so it
//! carries the role but never the password hash.

use serde::{Deserialize, Serialize};

use audit::{Profile, Role};

/// User information safe to send to the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserInfo {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub role: Role,
}

impl UserInfo {
    /// Get display name, falling back to email if name is not set.
    pub fn display_name(&self) -> &str {
        if self.full_name.trim().is_empty() {
            &self.email
        } else {
            &self.full_name
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<Profile> for UserInfo {
    fn from(profile: Profile) -> Self {
        Self {
            id: profile.id,
            email: profile.email,
            full_name: profile.full_name,
            role: profile.role,
        }
    }
}
