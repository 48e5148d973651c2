//! # Database module
//!
//! The shared PostgreSQL pool and the [`PgStore`] implementation of
//! [`audit::AuditStore`]. Everything here is gated behind the `server`
//! feature so client (WASM) builds never pull in SQLx.
//!
//! The pool is a lazy, process-wide singleton: the first call to
//! [`get_pool`] opens up to `database.max_connections` connections and every
//! later caller shares them. Migrations live in `packages/api/migrations`
//! and are embedded by the web server at startup.

#[cfg(feature = "server")]
mod pool;
#[cfg(feature = "server")]
mod pg_store;

#[cfg(feature = "server")]
pub use pg_store::PgStore;
#[cfg(feature = "server")]
pub use pool::get_pool;
