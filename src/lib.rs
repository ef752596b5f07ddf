pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod food;
pub mod ml;
pub mod risk;

pub use config::AppConfig;
pub use error::{BodyEchoError, Result};
pub use ml::{ModelRegistry, ModelStatus};
pub use risk::{assess, RiskCategory, RiskReport};
