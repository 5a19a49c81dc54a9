//! User and RTO status storage for the RTO status dashboard.
//!
//! All data lives in a single JSON document holding the user directory and
//! the upload history. [`MemoryRtoStore`] keeps that document in memory only;
//! [`JsonFileStore`] also rewrites it to disk after every mutation.

mod document;
mod error;
mod json_file;
mod memory;
mod traits;

pub use document::*;
pub use error::*;
pub use json_file::*;
pub use memory::*;
pub use traits::*;
