pub mod manager;
pub mod query_builder;
pub mod models;
pub mod users;
pub mod catalog;
pub mod enrollments;
pub mod payments;

pub use manager::{DatabaseManager, DatabaseError};
