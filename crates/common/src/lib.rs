//! Environment and logging setup shared by the workspace. Hosts embedding
//! the decoder call [`setup_logging`] once at startup.

pub mod config;
pub mod logging;

pub use config::Environment;
pub use logging::setup_logging;
