//! Route access rules shared by the router guard and the server.

use crate::models::Role;

pub const LOGIN_PATH: &str = "/login";
pub const ADMIN_PREFIX: &str = "/dashboard/admin";
pub const STAFF_PREFIX: &str = "/dashboard/staff";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Access {
    Allow,
    Redirect(&'static str),
}

fn under(path: &str, prefix: &str) -> bool {
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Decide whether a user with `role` (or nobody) may view `path`.
pub fn resolve(path: &str, role: Option<Role>) -> Access {
    let path = match path.split_once('?') {
        Some((path, _)) => path,
        None => path,
    };
    let path = match path.trim_end_matches('/') {
        "" => "/",
        p => p,
    };

    match role {
        None if path == LOGIN_PATH => Access::Allow,
        None => Access::Redirect(LOGIN_PATH),
        Some(role) if path == "/" || path == LOGIN_PATH => Access::Redirect(role.home_path()),
        Some(Role::Staff) if under(path, ADMIN_PREFIX) => Access::Redirect(STAFF_PREFIX),
        Some(Role::Admin) if under(path, STAFF_PREFIX) => Access::Redirect(ADMIN_PREFIX),
        Some(_) => Access::Allow,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_goes_to_login() {
        assert_eq!(resolve("/dashboard/admin", None), Access::Redirect("/login"));
        assert_eq!(resolve("/", None), Access::Redirect("/login"));
        assert_eq!(resolve("/login", None), Access::Allow);
    }

    #[test]
    fn test_wrong_role_is_sent_home() {
        assert_eq!(
            resolve("/dashboard/admin/rounds", Some(Role::Staff)),
            Access::Redirect("/dashboard/staff")
        );
        assert_eq!(
            resolve("/dashboard/staff/round/a-1", Some(Role::Admin)),
            Access::Redirect("/dashboard/admin")
        );
        assert_eq!(resolve("/dashboard/staff/", Some(Role::Staff)), Access::Allow);
        assert_eq!(resolve("/dashboard/admin?date=2026-03-14", Some(Role::Admin)), Access::Allow);
    }

    #[test]
    fn test_root_and_login_redirect_by_role() {
        assert_eq!(resolve("/", Some(Role::Admin)), Access::Redirect("/dashboard/admin"));
        assert_eq!(resolve("/login", Some(Role::Staff)), Access::Redirect("/dashboard/staff"));
    }

    #[test]
    fn test_prefix_match_is_segment_aware() {
        assert_eq!(resolve("/dashboard/administer", Some(Role::Staff)), Access::Allow);
    }
}
