//! Types shared with the browser that have no home in `audit`.

mod user;

pub use user::UserInfo;
