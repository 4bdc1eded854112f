//! Type-specific field behaviour.
//!
//! Each field type tag maps to a [`FieldKind`] strategy with three hooks:
//! a structural check run during validation, a coercion run during
//! processing, and a decoration applied to the serialized view. The
//! validation, processing, and serialization stages only ever talk to the
//! [`KindRegistry`], so new types are added by registering a strategy.
//!
//! Tags without a registered strategy behave like plain text.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use formflow_core::{FormResult, ValidationError};

use crate::fields::{FieldSpec, FieldType};
use crate::serialization::{FieldView, OptionView};
use crate::value::is_truthy;

/// Behaviour attached to a field type tag.
///
/// All hooks have no-op defaults.
pub trait FieldKind: Send + Sync + fmt::Debug {
    /// Structural check for a present (truthy) value.
    fn check(&self, _field: &FieldSpec, _value: &Value) -> FormResult<()> {
        Ok(())
    }

    /// Coerces a resolved value during processing, after the field's own
    /// transform has run.
    fn coerce(&self, value: Value) -> Value {
        value
    }

    /// Adds type-specific display state to a serialized field.
    fn decorate(&self, _field: &FieldSpec, _view: &mut FieldView) {}
}

/// Free-form text. No special handling.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextKind;

impl FieldKind for TextKind {}

/// A boolean checkbox: coerces to `true`/`false` and sets `checked`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckboxKind;

impl FieldKind for CheckboxKind {
    fn coerce(&self, value: Value) -> Value {
        Value::Bool(is_truthy(&value))
    }

    fn decorate(&self, _field: &FieldSpec, view: &mut FieldView) {
        view.checked = Some(view.value.as_ref().is_some_and(is_truthy));
    }
}

/// A single choice: the value must match an option key, and every option
/// is marked `selected` or not.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectKind;

impl FieldKind for SelectKind {
    fn check(&self, field: &FieldSpec, value: &Value) -> FormResult<()> {
        if field
            .resolve_options()
            .iter()
            .any(|option| key_matches(&option.key, value))
        {
            Ok(())
        } else {
            Err(ValidationError::new(
                format!("Unknown option selected for \"{}\"", field.label()),
                "invalid_choice",
            )
            .into())
        }
    }

    fn decorate(&self, field: &FieldSpec, view: &mut FieldView) {
        let options = field
            .resolve_options()
            .into_iter()
            .map(|option| {
                let selected = view
                    .value
                    .as_ref()
                    .is_some_and(|value| key_matches(&option.key, value));
                OptionView {
                    key: option.key,
                    label: option.label,
                    selected,
                }
            })
            .collect();
        view.options = Some(options);
    }
}

/// Strict option matching, except that numbers compare by value (`1` matches
/// `1.0`).
pub fn key_matches(key: &Value, value: &Value) -> bool {
    match (key, value) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => key == value,
    }
}

/// Maps type tags to their behaviour.
#[derive(Clone)]
pub struct KindRegistry {
    kinds: HashMap<String, Arc<dyn FieldKind>>,
    fallback: Arc<dyn FieldKind>,
}

impl KindRegistry {
    /// Creates a registry with no types registered.
    pub fn empty() -> Self {
        Self {
            kinds: HashMap::new(),
            fallback: Arc::new(TextKind),
        }
    }

    /// Creates a registry with the built-in `text`, `checkbox`, and
    /// `select` kinds.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register(FieldType::Text, TextKind);
        registry.register(FieldType::Checkbox, CheckboxKind);
        registry.register(FieldType::Select, SelectKind);
        registry
    }

    /// Registers (or replaces) the behaviour for a type tag.
    pub fn register(&mut self, field_type: impl Into<FieldType>, kind: impl FieldKind + 'static) {
        let field_type = field_type.into();
        tracing::trace!(field_type = %field_type, "registering field kind");
        self.kinds
            .insert(field_type.as_str().to_string(), Arc::new(kind));
    }

    /// Returns `true` if a behaviour is registered for the tag.
    pub fn contains(&self, field_type: &FieldType) -> bool {
        self.kinds.contains_key(field_type.as_str())
    }

    /// Returns the behaviour for a tag, falling back to plain text.
    pub fn kind_for(&self, field_type: &FieldType) -> &dyn FieldKind {
        self.kinds
            .get(field_type.as_str())
            .unwrap_or(&self.fallback)
            .as_ref()
    }
}

impl Default for KindRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for KindRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<&str> = self.kinds.keys().map(String::as_str).collect();
        tags.sort_unstable();
        f.debug_struct("KindRegistry").field("kinds", &tags).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::SelectOption;
    use serde_json::json;

    fn role_field() -> FieldSpec {
        FieldSpec::select(
            "role",
            vec![SelectOption::key("admin"), SelectOption::new("user", "User")],
        )
    }

    #[derive(Debug)]
    struct UppercaseKind;

    impl FieldKind for UppercaseKind {
        fn coerce(&self, value: Value) -> Value {
            match value {
                Value::String(s) => Value::String(s.to_uppercase()),
                other => other,
            }
        }
    }

    #[test]
    fn test_builtins_registered() {
        let registry = KindRegistry::default();
        assert!(registry.contains(&FieldType::Text));
        assert!(registry.contains(&FieldType::Checkbox));
        assert!(registry.contains(&FieldType::Select));
        assert!(!registry.contains(&FieldType::from("rating")));
    }

    #[test]
    fn test_unknown_tag_falls_back_to_text() {
        let registry = KindRegistry::default();
        let kind = registry.kind_for(&FieldType::from("rating"));
        assert_eq!(kind.coerce(json!("x")), json!("x"));
        assert!(kind.check(&FieldSpec::text("r"), &json!("x")).is_ok());
    }

    #[test]
    fn test_checkbox_coerce() {
        assert_eq!(CheckboxKind.coerce(json!("on")), json!(true));
        assert_eq!(CheckboxKind.coerce(json!(1)), json!(true));
        assert_eq!(CheckboxKind.coerce(json!(0)), json!(false));
        assert_eq!(CheckboxKind.coerce(Value::Null), json!(false));
    }

    #[test]
    fn test_select_check_known_key() {
        assert!(SelectKind.check(&role_field(), &json!("admin")).is_ok());
    }

    #[test]
    fn test_select_check_unknown_key() {
        let err = SelectKind
            .check(&role_field().with_label("Role"), &json!("root"))
            .unwrap_err();
        let validation = err.as_validation().unwrap();
        assert_eq!(validation.message, "Unknown option selected for \"Role\"");
        assert_eq!(validation.code, "invalid_choice");
    }

    #[test]
    fn test_select_check_is_strict() {
        let field = FieldSpec::select("n", vec![SelectOption::key(1)]);
        assert!(SelectKind.check(&field, &json!(1)).is_ok());
        assert!(SelectKind.check(&field, &json!("1")).is_err());
    }

    #[test]
    fn test_select_numeric_keys_compare_by_value() {
        let field = FieldSpec::select("n", vec![SelectOption::key(1), SelectOption::key(2.5)]);
        assert!(SelectKind.check(&field, &json!(1.0)).is_ok());
        assert!(SelectKind.check(&field, &json!(2.5)).is_ok());
        assert!(SelectKind.check(&field, &json!(2)).is_err());
        assert!(key_matches(&json!(1), &json!(1.0)));
        assert!(!key_matches(&json!(1), &json!(true)));
    }

    #[test]
    fn test_select_decorate_numeric_value() {
        let field = FieldSpec::select("n", vec![SelectOption::key(1), SelectOption::key(2)]);
        let form = crate::form::FormDefinition::builder()
            .group(crate::form::FieldGroup::new(vec![field]))
            .build();
        let values = match json!({"n": 2.0}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        let view = form.serialize(crate::serialization::SerializeOptions::with_values(values));
        let options = view.field("n").unwrap().options.as_ref().unwrap();
        assert!(!options[0].selected);
        assert!(options[1].selected);
    }

    #[test]
    fn test_register_custom_kind() {
        let mut registry = KindRegistry::with_builtins();
        registry.register("shout", UppercaseKind);
        let kind = registry.kind_for(&FieldType::from("shout"));
        assert_eq!(kind.coerce(json!("hey")), json!("HEY"));
    }

    #[test]
    fn test_replace_builtin_kind() {
        let mut registry = KindRegistry::with_builtins();
        registry.register(FieldType::Checkbox, TextKind);
        assert_eq!(registry.kind_for(&FieldType::Checkbox).coerce(json!("on")), json!("on"));
    }

    #[test]
    fn test_registry_debug_lists_tags() {
        let debug = format!("{:?}", KindRegistry::default());
        assert!(debug.contains("checkbox"));
        assert!(debug.contains("select"));
    }
}
