pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod http;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::ServerArgs;

pub use app::Application;
pub use config::{AckPolicy, AppConfig};
pub use crate::core::{handler::ContactHandler, pipeline::SubmissionPipeline};
pub use utils::error::{ContactError, Result};
