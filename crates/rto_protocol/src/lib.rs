//! JSON API definitions for the RTO status dashboard.
//!
//! This crate defines the request and response bodies exchanged between the
//! dashboard client and the server, along with the error codes carried by
//! failed responses.

mod error;
pub mod requests;
pub mod responses;

pub use error::*;
