//! Settings loading from configuration files.
//!
//! ## Loading Order
//!
//! 1. Start with default settings.
//! 2. Load from a TOML or JSON file (overriding defaults).
//! 3. Apply environment variable overrides (highest priority).
//!
//! ## Environment Variable Mapping
//!
//! | Env Var | Setting |
//! |---|---|
//! | `FORMFLOW_DEBUG` | `debug` |
//! | `FORMFLOW_LOG_LEVEL` | `log_level` |
//!
//! ## Examples
//!
//! ```rust,no_run
//! use formflow_core::settings_loader;
//!
//! let settings = settings_loader::from_toml_file("config/formflow.toml").unwrap();
//! formflow_core::logging::setup_logging(&settings);
//! ```

use std::path::Path;

use crate::error::FormError;
use crate::settings::Settings;

/// Loads settings from a TOML string.
///
/// Keys not present in the TOML keep their default values.
pub fn from_toml_str(toml_str: &str) -> Result<Settings, FormError> {
    let toml_value: toml::Value = toml::from_str(toml_str)
        .map_err(|e| FormError::Configuration(format!("Failed to parse TOML: {e}")))?;
    merge_with_defaults(toml_to_json(toml_value), "TOML")
}

/// Loads settings from a TOML file.
pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Settings, FormError> {
    let content = read_file(path.as_ref(), "TOML")?;
    from_toml_str(&content)
}

/// Loads settings from a TOML file and then applies environment variable overrides.
pub fn from_toml_file_with_env(path: impl AsRef<Path>) -> Result<Settings, FormError> {
    let mut settings = from_toml_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Loads settings from a JSON string.
pub fn from_json_str(json_str: &str) -> Result<Settings, FormError> {
    let json_value: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|e| FormError::Configuration(format!("Failed to parse JSON: {e}")))?;
    merge_with_defaults(json_value, "JSON")
}

/// Loads settings from a JSON file.
pub fn from_json_file(path: impl AsRef<Path>) -> Result<Settings, FormError> {
    let content = read_file(path.as_ref(), "JSON")?;
    from_json_str(&content)
}

/// Loads settings from just environment variables (starting from defaults).
pub fn from_env() -> Settings {
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings);
    settings
}

/// Applies environment variable overrides to a settings struct.
///
/// - `FORMFLOW_DEBUG` -> `debug` ("true"/"1"/"yes" => true, anything else => false)
/// - `FORMFLOW_LOG_LEVEL` -> `log_level`
pub fn apply_env_overrides(settings: &mut Settings) {
    if let Ok(val) = std::env::var("FORMFLOW_DEBUG") {
        settings.debug = matches!(val.to_lowercase().as_str(), "true" | "1" | "yes");
    }

    if let Ok(val) = std::env::var("FORMFLOW_LOG_LEVEL") {
        settings.log_level = val;
    }
}

/// Converts a TOML value to a `serde_json::Value`.
///
/// Datetimes become strings.
pub fn toml_to_json(value: toml::Value) -> serde_json::Value {
    match value {
        toml::Value::String(s) => serde_json::Value::String(s),
        toml::Value::Integer(i) => serde_json::json!(i),
        toml::Value::Float(f) => serde_json::json!(f),
        toml::Value::Boolean(b) => serde_json::Value::Bool(b),
        toml::Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
        toml::Value::Array(arr) => {
            serde_json::Value::Array(arr.into_iter().map(toml_to_json).collect())
        }
        toml::Value::Table(table) => {
            let map: serde_json::Map<String, serde_json::Value> = table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect();
            serde_json::Value::Object(map)
        }
    }
}

fn read_file(path: &Path, format: &str) -> Result<String, FormError> {
    std::fs::read_to_string(path).map_err(|e| {
        FormError::Configuration(format!(
            "Failed to read {format} file '{}': {e}",
            path.display()
        ))
    })
}

fn merge_with_defaults(value: serde_json::Value, format: &str) -> Result<Settings, FormError> {
    let default_json = serde_json::to_value(Settings::default()).map_err(|e| {
        FormError::Configuration(format!("Failed to serialize default settings: {e}"))
    })?;

    let merged = merge_json(default_json, value);
    serde_json::from_value(merged).map_err(|e| {
        FormError::Configuration(format!("Failed to deserialize settings from {format}: {e}"))
    })
}

/// Deep-merges two JSON values. The `override_val` takes precedence.
fn merge_json(base: serde_json::Value, override_val: serde_json::Value) -> serde_json::Value {
    match (base, override_val) {
        (serde_json::Value::Object(mut base_map), serde_json::Value::Object(override_map)) => {
            for (key, override_v) in override_map {
                let merged = if let Some(base_v) = base_map.remove(&key) {
                    merge_json(base_v, override_v)
                } else {
                    override_v
                };
                base_map.insert(key, merged);
            }
            serde_json::Value::Object(base_map)
        }
        (_, override_val) => override_val,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── TOML loading ────────────────────────────────────────────────

    #[test]
    fn test_from_toml_str_basic() {
        let toml = r#"
            debug = false
            log_level = "formflow_forms=trace"
        "#;

        let settings = from_toml_str(toml).unwrap();
        assert!(!settings.debug);
        assert_eq!(settings.log_level, "formflow_forms=trace");
    }

    #[test]
    fn test_from_toml_str_empty() {
        let settings = from_toml_str("").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_from_toml_str_extra() {
        let toml = r#"
            [extra]
            theme = "dark"
            columns = 2
        "#;

        let settings = from_toml_str(toml).unwrap();
        assert_eq!(settings.extra.get("theme"), Some(&serde_json::json!("dark")));
        assert_eq!(settings.extra.get("columns"), Some(&serde_json::json!(2)));
        // Defaults preserved
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn test_from_toml_str_invalid() {
        let err = from_toml_str("[[invalid toml content").unwrap_err();
        assert!(matches!(err, FormError::Configuration(_)));
    }

    #[test]
    fn test_from_toml_str_wrong_type() {
        let err = from_toml_str("debug = \"sometimes\"").unwrap_err();
        assert!(err.to_string().contains("Failed to deserialize settings from TOML"));
    }

    // ── JSON loading ────────────────────────────────────────────────

    #[test]
    fn test_from_json_str_basic() {
        let settings = from_json_str(r#"{"debug": false, "log_level": "debug"}"#).unwrap();
        assert!(!settings.debug);
        assert_eq!(settings.log_level, "debug");
    }

    #[test]
    fn test_from_json_str_empty_object() {
        let settings = from_json_str("{}").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_from_json_str_invalid() {
        assert!(from_json_str("{invalid json").is_err());
    }

    // ── File loading ────────────────────────────────────────────────

    #[test]
    fn test_from_toml_file() {
        let dir = std::env::temp_dir().join("formflow_test_toml");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("settings.toml");
        std::fs::write(&path, "log_level = \"warn\"\n").unwrap();

        let settings = from_toml_file(&path).unwrap();
        assert_eq!(settings.log_level, "warn");

        std::fs::remove_file(&path).ok();
        std::fs::remove_dir(&dir).ok();
    }

    #[test]
    fn test_from_json_file() {
        let dir = std::env::temp_dir().join("formflow_test_json");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("settings.json");
        std::fs::write(&path, r#"{"debug": false}"#).unwrap();

        let settings = from_json_file(&path).unwrap();
        assert!(!settings.debug);

        std::fs::remove_file(&path).ok();
        std::fs::remove_dir(&dir).ok();
    }

    #[test]
    fn test_from_file_missing() {
        let err = from_toml_file("/nonexistent/formflow.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read TOML file"));
    }

    // ── Environment ─────────────────────────────────────────────────

    #[test]
    fn test_apply_env_overrides() {
        std::env::set_var("FORMFLOW_LOG_LEVEL", "trace");
        std::env::set_var("FORMFLOW_DEBUG", "0");
        let settings = from_env();
        std::env::remove_var("FORMFLOW_LOG_LEVEL");
        std::env::remove_var("FORMFLOW_DEBUG");

        assert_eq!(settings.log_level, "trace");
        assert!(!settings.debug);
    }

    // ── Helpers ─────────────────────────────────────────────────────

    #[test]
    fn test_toml_to_json_nested() {
        let value: toml::Value = toml::from_str("a = [1, 2]\n[b]\nc = true\n").unwrap();
        let json = toml_to_json(value);
        assert_eq!(json, serde_json::json!({"a": [1, 2], "b": {"c": true}}));
    }

    #[test]
    fn test_merge_json_override_wins() {
        let merged = merge_json(
            serde_json::json!({"a": 1, "b": {"c": 2, "d": 3}}),
            serde_json::json!({"b": {"c": 9}}),
        );
        assert_eq!(merged, serde_json::json!({"a": 1, "b": {"c": 9, "d": 3}}));
    }
}
