//! Authentication: local email + password accounts, sessions and role checks.

#[cfg(feature = "server")]
mod accounts;
#[cfg(feature = "server")]
mod password;
#[cfg(feature = "server")]
mod session;

#[cfg(feature = "server")]
pub use accounts::{authenticate, bootstrap_admin, create_user, NewUser};
#[cfg(feature = "server")]
pub use password::{hash_password, verify_password};
#[cfg(feature = "server")]
pub use session::{
    current_profile, require_role, require_user, session_user_id, sign_in, SESSION_USER_ID_KEY,
};
