//! User-facing translations of backend error messages.
//!
//! Errors coming out of the stores carry raw backend text (constraint names,
//! driver messages). [`user_message`] looks them up in a fixed table and
//! returns the sentence shown in the UI; unknown messages pass through
//! verbatim.

pub const PROFILES_EMAIL_KEY: &str = "profiles_email_key";
pub const LOCATIONS_CODE_KEY: &str = "locations_verification_code_key";
pub const ASSIGNMENTS_SLOT_KEY: &str = "daily_assignments_slot_key";
pub const STAFF_TASKS_SLOT_KEY: &str = "staff_tasks_slot_key";
pub const CHECKINS_VISIT_KEY: &str = "checkins_visit_key";

pub const INVALID_CREDENTIALS: &str = "Invalid login credentials";
pub const WEAK_PASSWORD: &str = "Password should be at least 8 characters";
pub const MIN_PASSWORD_LEN: usize = 8;

const TRANSLATIONS: &[(&str, &str)] = &[
    (PROFILES_EMAIL_KEY, "A user with this email already exists"),
    ("User already registered", "A user with this email already exists"),
    (LOCATIONS_CODE_KEY, "Another checkpoint already uses this tag code"),
    (
        ASSIGNMENTS_SLOT_KEY,
        "This round is already assigned to that person for this date and shift",
    ),
    (
        STAFF_TASKS_SLOT_KEY,
        "This task is already assigned for that date and shift",
    ),
    (
        CHECKINS_VISIT_KEY,
        "This checkpoint has already been checked in",
    ),
    (INVALID_CREDENTIALS, "Invalid email or password"),
    (WEAK_PASSWORD, "Password must be at least 8 characters long"),
    ("Unable to validate email address", "Please enter a valid email address"),
    ("pool timed out", "The server is busy, please try again"),
];

/// Translate a raw error message for display.
pub fn user_message(raw: &str) -> String {
    TRANSLATIONS
        .iter()
        .find(|(needle, _)| raw.contains(needle))
        .map(|(_, friendly)| friendly.to_string())
        .unwrap_or_else(|| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_messages_are_translated() {
        assert_eq!(
            user_message(
                "duplicate key value violates unique constraint \"profiles_email_key\""
            ),
            "A user with this email already exists"
        );
        assert_eq!(
            user_message(WEAK_PASSWORD),
            "Password must be at least 8 characters long"
        );
        assert_eq!(
            user_message(
                "duplicate key value violates unique constraint \"checkins_visit_key\""
            ),
            "This checkpoint has already been checked in"
        );
    }

    #[test]
    fn test_unknown_messages_pass_through() {
        assert_eq!(user_message("disk on fire"), "disk on fire");
    }
}
