//! Macro Monitor Shared Library
//!
//! The calculation core: unit conversion, BMR/TDEE/macro estimation, the
//! profile store and the session state machine. Used by the CLI host and the
//! WASM bindings.

pub mod errors;
pub mod estimation;
pub mod models;
pub mod session;
pub mod store;
pub mod units;
pub mod validation;

// Re-export commonly used items
pub use errors::*;
pub use estimation::*;
pub use models::*;
pub use session::{Session, SessionState};
pub use store::ProfileStore;
pub use units::*;
