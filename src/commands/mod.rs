//! Tauri Commands
//!
//! Contains all Tauri command handlers that can be called from the frontend.
//! These are the IPC entry points for the application; the logic they call
//! lives in `AppState` and `Session`.

pub mod analysis;
pub mod health;
pub mod init;
pub mod models;
pub mod optimizer;
pub mod query;
pub mod sessions;
pub mod settings;
pub mod visualization;

pub use analysis::*;
pub use health::*;
pub use init::*;
pub use models::*;
pub use optimizer::*;
pub use query::*;
pub use sessions::*;
pub use settings::*;
pub use visualization::*;
