//! Engine settings.
//!
//! [`Settings`] holds the process-wide knobs that are not part of any single
//! form definition, currently the logging configuration. Load it with
//! [`settings_loader`](crate::settings_loader) or start from
//! [`Settings::default`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The complete set of engine settings.
///
/// # Examples
///
/// ```
/// use formflow_core::settings::Settings;
///
/// let settings = Settings::default();
/// assert!(settings.debug);
/// assert_eq!(settings.log_level, "info");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Whether debug mode is enabled. Selects pretty log output over JSON.
    pub debug: bool,
    /// The log filter directive (e.g. "info", "formflow_forms=trace").
    pub log_level: String,
    /// Custom settings that don't fit into the above categories.
    pub extra: HashMap<String, serde_json::Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: true,
            log_level: "info".to_string(),
            extra: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert!(settings.debug);
        assert_eq!(settings.log_level, "info");
        assert!(settings.extra.is_empty());
    }

    #[test]
    fn test_settings_serde_roundtrip_keeps_extra() {
        let mut settings = Settings::default();
        settings
            .extra
            .insert("theme".into(), serde_json::json!("dark"));
        let json = serde_json::to_value(&settings).unwrap();
        let back: Settings = serde_json::from_value(json).unwrap();
        assert_eq!(back, settings);
    }
}
