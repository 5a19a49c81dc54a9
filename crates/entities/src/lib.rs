//! Core entity definitions for the RTO status dashboard.
//!
//! This crate defines the records shared by the store, the server and the
//! export path: users and their roles, uploaded RTO status entries, upload
//! validation, and the aggregations the dashboard shows.

mod aggregate;
mod rto_status;
mod user;
mod validation;

pub use aggregate::*;
pub use rto_status::*;
pub use user::*;
pub use validation::*;
