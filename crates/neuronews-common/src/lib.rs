//! neuronews-common — shared error type, configuration, field-default
//! policy, and the allowlisted HTTP client used by all source clients.

pub mod config;
pub mod defaults;
pub mod error;
pub mod http;

pub use config::{Config, ConfigError};
pub use error::{NewsError, Result};
pub use http::SandboxClient;
