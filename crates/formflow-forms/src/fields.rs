//! Field specifications.
//!
//! A [`FieldSpec`] describes one form field: its name and type, when it is
//! required, how it is validated and processed, and how it is displayed.
//! Several settings may be either a plain value or a function evaluated
//! lazily at the point of use; those are modelled as the tagged unions
//! [`Required`], [`OptionSource`], and [`Description`].

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use formflow_core::{FormError, FormResult};

use crate::value::Payload;

/// The result of running a validator: either already decided, or a future
/// that settles later.
///
/// Pending outcomes must own everything they touch, so validators clone the
/// parts of the value and payload they need before returning one.
pub enum ValidationOutcome {
    /// The validator finished synchronously.
    Ready(FormResult<()>),
    /// The validator will finish asynchronously.
    Pending(BoxFuture<'static, FormResult<()>>),
}

impl ValidationOutcome {
    /// A successful, immediate outcome.
    pub const fn ok() -> Self {
        Self::Ready(Ok(()))
    }

    /// A failed, immediate outcome.
    pub fn fail(error: impl Into<FormError>) -> Self {
        Self::Ready(Err(error.into()))
    }

    /// Wraps a future as a pending outcome.
    pub fn pending<F>(future: F) -> Self
    where
        F: Future<Output = FormResult<()>> + Send + 'static,
    {
        Self::Pending(Box::pin(future))
    }

    /// Waits for the outcome to settle.
    pub async fn resolve(self) -> FormResult<()> {
        match self {
            Self::Ready(result) => result,
            Self::Pending(future) => future.await,
        }
    }
}

impl From<FormResult<()>> for ValidationOutcome {
    fn from(result: FormResult<()>) -> Self {
        Self::Ready(result)
    }
}

impl fmt::Debug for ValidationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(result) => f.debug_tuple("Ready").field(result).finish(),
            Self::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

/// A per-field validator, called with the field's value and the full payload.
pub type FieldValidator = Arc<dyn Fn(&Value, &Payload) -> ValidationOutcome + Send + Sync>;

/// A per-field transform applied during processing.
pub type FieldProcessor = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// The type tag of a field.
///
/// `text`, `checkbox`, and `select` have built-in behaviour; any other tag
/// is carried through unchanged and may be given behaviour by registering a
/// [`FieldKind`](crate::kinds::FieldKind).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    /// A free-form text field.
    #[default]
    Text,
    /// A boolean checkbox.
    Checkbox,
    /// A single choice among a list of options.
    Select,
    /// A caller-defined type.
    Other(String),
}

impl FieldType {
    /// Returns the type tag as a string.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::Checkbox => "checkbox",
            Self::Select => "select",
            Self::Other(tag) => tag,
        }
    }
}

impl From<&str> for FieldType {
    fn from(tag: &str) -> Self {
        match tag {
            "text" => Self::Text,
            "checkbox" => Self::Checkbox,
            "select" => Self::Select,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for FieldType {
    fn from(tag: String) -> Self {
        Self::from(tag.as_str())
    }
}

impl From<FieldType> for String {
    fn from(field_type: FieldType) -> Self {
        field_type.as_str().to_string()
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a field must have a value.
#[derive(Clone)]
pub enum Required {
    /// Always or never required.
    Flag(bool),
    /// Required when the predicate over the full payload returns `true`.
    When(Arc<dyn Fn(&Payload) -> bool + Send + Sync>),
}

impl Required {
    /// Evaluates the rule against a payload.
    pub fn evaluate(&self, payload: &Payload) -> bool {
        match self {
            Self::Flag(flag) => *flag,
            Self::When(predicate) => predicate(payload),
        }
    }

    /// Returns `true` only for the literal `Flag(true)`; predicates are not run.
    pub const fn is_always(&self) -> bool {
        matches!(self, Self::Flag(true))
    }
}

impl Default for Required {
    fn default() -> Self {
        Self::Flag(false)
    }
}

impl fmt::Debug for Required {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(flag) => f.debug_tuple("Flag").field(flag).finish(),
            Self::When(_) => f.write_str("When(..)"),
        }
    }
}

/// One choice of a `select` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    /// The value submitted when this option is chosen.
    pub key: Value,
    /// The text shown for this option.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl SelectOption {
    /// Creates an option with a key and label.
    pub fn new(key: impl Into<Value>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: Some(label.into()),
        }
    }

    /// Creates an option with only a key.
    pub fn key(key: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            label: None,
        }
    }
}

/// Where a `select` field's options come from.
#[derive(Clone)]
pub enum OptionSource {
    /// A fixed list.
    Static(Vec<SelectOption>),
    /// A provider called each time the options are needed.
    Provider(Arc<dyn Fn() -> Vec<SelectOption> + Send + Sync>),
}

impl OptionSource {
    /// Resolves the option list, calling the provider if there is one.
    pub fn resolve(&self) -> Vec<SelectOption> {
        match self {
            Self::Static(options) => options.clone(),
            Self::Provider(provider) => provider(),
        }
    }
}

impl fmt::Debug for OptionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(options) => f.debug_tuple("Static").field(options).finish(),
            Self::Provider(_) => f.write_str("Provider(..)"),
        }
    }
}

/// Help text shown with a field.
#[derive(Clone)]
pub enum Description {
    /// Fixed text.
    Text(String),
    /// Text computed from the value mapping being rendered.
    Computed(Arc<dyn Fn(&Payload) -> String + Send + Sync>),
}

impl Description {
    /// Produces the text for the given values.
    pub fn render(&self, values: &Payload) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Computed(render) => render(values),
        }
    }
}

impl fmt::Debug for Description {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

impl From<&str> for Description {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Description {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// Complete definition of a form field.
///
/// Built with a chain of builder methods:
///
/// ```
/// use formflow_forms::fields::{FieldSpec, SelectOption};
///
/// let role = FieldSpec::select("role", vec![SelectOption::key("admin"), SelectOption::key("user")])
///     .with_label("Role")
///     .required(true);
/// assert_eq!(role.label(), "Role");
/// ```
#[derive(Clone, Default)]
pub struct FieldSpec {
    /// The field name, used as the key in payloads and output mappings.
    pub name: String,
    /// Human-readable label. Falls back to `name`.
    pub label: Option<String>,
    /// The type tag.
    pub field_type: FieldType,
    /// The requirement rule.
    pub required: Required,
    /// Custom validator.
    pub validator: Option<FieldValidator>,
    /// Custom transform applied during processing.
    pub processor: Option<FieldProcessor>,
    /// Fallback used when the submitted value is empty.
    pub default: Option<Value>,
    /// Option source for `select` fields.
    pub options: Option<OptionSource>,
    /// Plain-text help.
    pub description: Option<Description>,
    /// HTML help.
    pub description_html: Option<Description>,
    /// Visibility. Anything but an explicit `false` means visible.
    pub visible: Option<bool>,
    /// Explicit render identifier.
    pub id: Option<String>,
    /// Additional display attributes copied verbatim into the view model.
    pub attrs: Map<String, Value>,
}

impl FieldSpec {
    /// Creates a field of the given type. It is optional, visible, and has
    /// no validator or processor.
    pub fn new(name: impl Into<String>, field_type: impl Into<FieldType>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            ..Self::default()
        }
    }

    /// Creates a `text` field.
    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Text)
    }

    /// Creates a `checkbox` field.
    pub fn checkbox(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Checkbox)
    }

    /// Creates a `select` field with a static option list.
    pub fn select(name: impl Into<String>, options: Vec<SelectOption>) -> Self {
        Self::new(name, FieldType::Select).options(options)
    }

    /// Returns the label, or the name if no label is set.
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    /// Sets the label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sets whether this field is always required.
    #[must_use]
    pub fn required(mut self, required: bool) -> Self {
        self.required = Required::Flag(required);
        self
    }

    /// Makes this field required when the predicate holds for the payload.
    #[must_use]
    pub fn required_when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Payload) -> bool + Send + Sync + 'static,
    {
        self.required = Required::When(Arc::new(predicate));
        self
    }

    /// Sets a validator returning a [`ValidationOutcome`].
    #[must_use]
    pub fn validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&Value, &Payload) -> ValidationOutcome + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// Sets a synchronous validator.
    #[must_use]
    pub fn check<F>(self, check: F) -> Self
    where
        F: Fn(&Value, &Payload) -> FormResult<()> + Send + Sync + 'static,
    {
        self.validator(move |value, payload| ValidationOutcome::Ready(check(value, payload)))
    }

    /// Sets an asynchronous validator. It receives owned copies of the value
    /// and payload.
    #[must_use]
    pub fn check_async<F, Fut>(self, check: F) -> Self
    where
        F: Fn(Value, Payload) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = FormResult<()>> + Send + 'static,
    {
        self.validator(move |value, payload| {
            ValidationOutcome::pending(check(value.clone(), payload.clone()))
        })
    }

    /// Sets the processing transform.
    #[must_use]
    pub fn process<F>(mut self, processor: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.processor = Some(Arc::new(processor));
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Sets a static option list.
    #[must_use]
    pub fn options(mut self, options: Vec<SelectOption>) -> Self {
        self.options = Some(OptionSource::Static(options));
        self
    }

    /// Sets an option provider, called each time options are needed.
    #[must_use]
    pub fn options_from<F>(mut self, provider: F) -> Self
    where
        F: Fn() -> Vec<SelectOption> + Send + Sync + 'static,
    {
        self.options = Some(OptionSource::Provider(Arc::new(provider)));
        self
    }

    /// Sets the plain-text description.
    #[must_use]
    pub fn description(mut self, description: impl Into<Description>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets a description computed from the rendered values.
    #[must_use]
    pub fn description_with<F>(mut self, render: F) -> Self
    where
        F: Fn(&Payload) -> String + Send + Sync + 'static,
    {
        self.description = Some(Description::Computed(Arc::new(render)));
        self
    }

    /// Sets the HTML description.
    #[must_use]
    pub fn description_html(mut self, description: impl Into<Description>) -> Self {
        self.description_html = Some(description.into());
        self
    }

    /// Sets an HTML description computed from the rendered values.
    #[must_use]
    pub fn description_html_with<F>(mut self, render: F) -> Self
    where
        F: Fn(&Payload) -> String + Send + Sync + 'static,
    {
        self.description_html = Some(Description::Computed(Arc::new(render)));
        self
    }

    /// Sets visibility.
    #[must_use]
    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = Some(visible);
        self
    }

    /// Sets the render identifier.
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Adds a display attribute.
    #[must_use]
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    /// Returns the resolved options, or an empty list if none are set.
    pub fn resolve_options(&self) -> Vec<SelectOption> {
        self.options
            .as_ref()
            .map(OptionSource::resolve)
            .unwrap_or_default()
    }
}

impl fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSpec")
            .field("name", &self.name)
            .field("label", &self.label)
            .field("field_type", &self.field_type)
            .field("required", &self.required)
            .field("validator", &self.validator.is_some())
            .field("processor", &self.processor.is_some())
            .field("default", &self.default)
            .field("options", &self.options)
            .field("visible", &self.visible)
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formflow_core::ValidationError;
    use serde_json::json;

    #[test]
    fn test_field_defaults() {
        let field = FieldSpec::text("name");
        assert_eq!(field.name, "name");
        assert_eq!(field.label(), "name");
        assert_eq!(field.field_type, FieldType::Text);
        assert!(!field.required.evaluate(&Payload::new()));
        assert!(field.validator.is_none());
        assert!(field.default.is_none());
        assert!(field.visible.is_none());
    }

    #[test]
    fn test_field_builder_chain() {
        let field = FieldSpec::checkbox("agree")
            .with_label("I agree")
            .required(true)
            .default_value(false)
            .visible(false)
            .id("agree-box")
            .attr("class", "wide");
        assert_eq!(field.label(), "I agree");
        assert!(field.required.is_always());
        assert_eq!(field.default, Some(json!(false)));
        assert_eq!(field.visible, Some(false));
        assert_eq!(field.id.as_deref(), Some("agree-box"));
        assert_eq!(field.attrs.get("class"), Some(&json!("wide")));
    }

    #[test]
    fn test_field_type_tags() {
        assert_eq!(FieldType::from("text"), FieldType::Text);
        assert_eq!(FieldType::from("checkbox"), FieldType::Checkbox);
        assert_eq!(FieldType::from("select"), FieldType::Select);
        assert_eq!(FieldType::from("email"), FieldType::Other("email".into()));
        assert_eq!(FieldType::Other("email".into()).as_str(), "email");
        assert_eq!(FieldType::Checkbox.to_string(), "checkbox");
    }

    #[test]
    fn test_field_type_serde() {
        let tag: FieldType = serde_json::from_value(json!("select")).unwrap();
        assert_eq!(tag, FieldType::Select);
        assert_eq!(serde_json::to_value(FieldType::from("date")).unwrap(), json!("date"));
    }

    #[test]
    fn test_required_predicate() {
        let field = FieldSpec::text("company")
            .required_when(|payload| payload.get("employed") == Some(&json!(true)));
        let mut payload = Payload::new();
        assert!(!field.required.evaluate(&payload));
        payload.insert("employed".into(), json!(true));
        assert!(field.required.evaluate(&payload));
        assert!(!field.required.is_always());
    }

    #[test]
    fn test_option_provider_resolved_lazily() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let field = FieldSpec::new("color", FieldType::Select).options_from(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            vec![SelectOption::new("red", "Red")]
        });
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        let options = field.resolve_options();
        assert_eq!(options, vec![SelectOption::new("red", "Red")]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_resolve_options_none() {
        assert!(FieldSpec::new("x", FieldType::Select).resolve_options().is_empty());
    }

    #[test]
    fn test_description_render() {
        let mut values = Payload::new();
        values.insert("name".into(), json!("Ann"));
        let text = Description::from("Plain");
        let computed = Description::Computed(Arc::new(|v: &Payload| {
            format!("Hello {}", v.get("name").and_then(Value::as_str).unwrap_or("?"))
        }));
        assert_eq!(text.render(&values), "Plain");
        assert_eq!(computed.render(&values), "Hello Ann");
    }

    #[test]
    fn test_select_option_serde() {
        let option: SelectOption = serde_json::from_value(json!({"key": "admin"})).unwrap();
        assert_eq!(option, SelectOption::key("admin"));
        assert_eq!(
            serde_json::to_value(SelectOption::new(1, "One")).unwrap(),
            json!({"key": 1, "label": "One"})
        );
    }

    #[tokio::test]
    async fn test_sync_check_outcome() {
        let field = FieldSpec::text("age").check(|value, _| {
            if value.as_i64().is_some_and(|n| n < 18) {
                Err(ValidationError::invalid("too young").into())
            } else {
                Ok(())
            }
        });
        let validator = field.validator.unwrap();
        let outcome = validator(&json!(12), &Payload::new());
        assert!(matches!(outcome, ValidationOutcome::Ready(Err(_))));
        assert!(validator(&json!(30), &Payload::new()).resolve().await.is_ok());
    }

    #[tokio::test]
    async fn test_async_check_outcome() {
        let field = FieldSpec::text("username").check_async(|value, _| async move {
            if value == json!("taken") {
                Err(FormError::custom("username taken"))
            } else {
                Ok(())
            }
        });
        let validator = field.validator.unwrap();
        let outcome = validator(&json!("taken"), &Payload::new());
        assert!(matches!(outcome, ValidationOutcome::Pending(_)));
        let err = outcome.resolve().await.unwrap_err();
        assert_eq!(err.to_string(), "username taken");
    }

    #[test]
    fn test_field_debug_hides_closures() {
        let field = FieldSpec::text("a").process(|v| v).required_when(|_| true);
        let debug = format!("{field:?}");
        assert!(debug.contains("When(..)"));
        assert!(debug.contains("processor: true"));
    }
}
