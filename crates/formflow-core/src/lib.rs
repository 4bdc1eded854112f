//! # formflow-core
//!
//! Core types shared by the formflow crates: the error taxonomy, engine
//! settings and their loaders, and tracing setup. This crate has no
//! dependency on the form engine itself.
//!
//! ## Modules
//!
//! - [`error`] - `FormError`, `ValidationError`, and result aliases
//! - [`settings`] - Engine settings with defaults
//! - [`settings_loader`] - Loading settings from TOML/JSON and the environment
//! - [`logging`] - Tracing-based logging integration

pub mod error;
pub mod logging;
pub mod settings;
pub mod settings_loader;

// Re-export the most commonly used types at the crate root.
pub use error::{FormError, FormResult, ValidationError};
pub use settings::Settings;
