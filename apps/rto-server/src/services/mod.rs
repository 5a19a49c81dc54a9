//! Services used by the API handlers.

pub mod bootstrap;
pub mod export;
