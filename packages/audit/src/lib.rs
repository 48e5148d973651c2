pub mod access;
pub mod assignments;
pub mod checkin;
pub mod dashboard;
pub mod error;
pub mod messages;
pub mod models;
pub mod photos;
pub mod progress;
pub mod rounds;
pub mod store;
pub mod tasks;

mod memory;
pub use memory::{MemoryPhotoStore, MemoryStore};

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
pub use models::*;
pub use store::{AuditStore, PhotoStore};
