//! Data Models
//!
//! Command payloads and persisted settings.

pub mod response;
pub mod settings;

pub use response::*;
pub use settings::*;
