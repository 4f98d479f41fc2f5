//! Command implementations.

pub mod config;
pub mod events;
pub mod extract;

pub use self::config::execute_config;
pub use self::events::execute_events;
pub use self::extract::execute_extract;
