pub mod config;
pub mod cost;
pub mod cost_explorer_client;
pub mod cost_reporter;
pub mod error;
pub mod image_client;
pub mod image_lifecycle;
pub mod invocation;
pub mod logging;
pub mod report;
pub mod time_range;
pub mod webhook;

pub use error::{ChoreError, Result};
