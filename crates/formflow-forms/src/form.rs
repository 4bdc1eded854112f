//! Form definitions.
//!
//! A [`FormDefinition`] owns an ordered list of [`FieldGroup`]s, the
//! form-level validator and processor, rendering metadata, and the
//! [`KindRegistry`] used for type-specific behaviour. It is built once with
//! a [`FormBuilder`] (or loaded through [`config`](crate::config)) and is
//! then shared read-only across any number of concurrent
//! validate/process/serialize calls.
//!
//! At build time the groups are flattened, in group order and then field
//! order, into the single field list that validation and processing walk.
//! Names are not deduplicated: a later field with the same name overwrites
//! the earlier one's entry in every output.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use formflow_core::FormResult;

use crate::fields::{FieldSpec, FieldType, ValidationOutcome};
use crate::kinds::{FieldKind, KindRegistry};
use crate::serialization::{self, SerializeOptions, ViewModel};
use crate::value::Payload;
use crate::{processing, validation};

/// A form-level validator, called with the full payload after every field
/// passed.
pub type FormValidator = Arc<dyn Fn(&Payload) -> ValidationOutcome + Send + Sync>;

/// A form-level transform over the whole processed mapping.
pub type FormProcessor = Arc<dyn Fn(Payload) -> Payload + Send + Sync>;

/// Rendering metadata copied to the top level of the view model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormMetadata {
    /// The form's render identifier.
    pub id: String,
    /// The submission target.
    pub action: String,
    /// The submission method.
    pub method: String,
    /// Plain-text help.
    pub help: String,
    /// HTML help.
    pub help_html: String,
    /// Instructions shown above the fields.
    pub instructions: String,
    /// Submit button text.
    pub submit: String,
    /// Any other caller-defined metadata.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for FormMetadata {
    fn default() -> Self {
        Self {
            id: "form".to_string(),
            action: String::new(),
            method: "post".to_string(),
            help: String::new(),
            help_html: String::new(),
            instructions: String::new(),
            submit: "Submit".to_string(),
            extra: Map::new(),
        }
    }
}

/// A named, ordered group of fields.
#[derive(Debug, Clone, Default)]
pub struct FieldGroup {
    /// The group name. Defaults to `group-{index}` when rendered.
    pub name: Option<String>,
    /// The fields, in display order.
    pub fields: Vec<FieldSpec>,
    /// Additional display attributes copied verbatim into the view model.
    pub attrs: Map<String, Value>,
}

impl FieldGroup {
    /// Creates an unnamed group.
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self {
            fields,
            ..Self::default()
        }
    }

    /// Creates a named group.
    pub fn named(name: impl Into<String>, fields: Vec<FieldSpec>) -> Self {
        Self {
            name: Some(name.into()),
            fields,
            attrs: Map::new(),
        }
    }

    /// Adds a display attribute.
    #[must_use]
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    /// Returns the group name, or `group-{index}` if none is set.
    pub fn name_or_default(&self, index: usize) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("group-{index}"))
    }
}

/// An immutable form definition.
///
/// # Examples
///
/// ```
/// use formflow_forms::{FieldGroup, FieldSpec, FormDefinition, SelectOption};
///
/// let form = FormDefinition::builder()
///     .id("signup")
///     .group(FieldGroup::new(vec![
///         FieldSpec::text("name").required(true),
///         FieldSpec::select("role", vec![SelectOption::key("admin"), SelectOption::key("user")])
///             .required(true),
///     ]))
///     .build();
///
/// assert_eq!(form.fields().len(), 2);
/// assert!(form.has_required_fields());
/// ```
#[derive(Clone)]
pub struct FormDefinition {
    metadata: FormMetadata,
    groups: Vec<FieldGroup>,
    fields: Vec<FieldSpec>,
    validator: Option<FormValidator>,
    processor: Option<FormProcessor>,
    kinds: KindRegistry,
}

impl FormDefinition {
    /// Starts building a form definition.
    pub fn builder() -> FormBuilder {
        FormBuilder::default()
    }

    /// Returns the rendering metadata.
    pub const fn metadata(&self) -> &FormMetadata {
        &self.metadata
    }

    /// Returns the groups as defined.
    pub fn groups(&self) -> &[FieldGroup] {
        &self.groups
    }

    /// Returns the flattened field list.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Returns the form-level validator, if any.
    pub const fn validator(&self) -> Option<&FormValidator> {
        self.validator.as_ref()
    }

    /// Returns the form-level processor, if any.
    pub const fn processor(&self) -> Option<&FormProcessor> {
        self.processor.as_ref()
    }

    /// Returns the type behaviour registry.
    pub const fn kinds(&self) -> &KindRegistry {
        &self.kinds
    }

    /// Returns `true` if any field is literally always required.
    ///
    /// Predicate-based requirements are not evaluated and never count.
    pub fn has_required_fields(&self) -> bool {
        self.fields.iter().any(|field| field.required.is_always())
    }

    /// Validates the payload and, on success, returns the processed output.
    ///
    /// See [`validation::validate`]. Must be called from within a Tokio
    /// runtime.
    pub async fn validate(&self, payload: &Payload) -> FormResult<Payload> {
        validation::validate(self, payload).await
    }

    /// Processes a payload into the output mapping without validating it.
    ///
    /// See [`processing::process`].
    pub fn process(&self, payload: &Payload) -> Payload {
        processing::process(self, payload)
    }

    /// Builds the render-ready view model.
    ///
    /// See [`serialization::serialize`].
    pub fn serialize(&self, options: SerializeOptions) -> ViewModel {
        serialization::serialize(self, options)
    }
}

impl fmt::Debug for FormDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormDefinition")
            .field("metadata", &self.metadata)
            .field("groups", &self.groups)
            .field("validator", &self.validator.is_some())
            .field("processor", &self.processor.is_some())
            .field("kinds", &self.kinds)
            .finish_non_exhaustive()
    }
}

/// Builder for [`FormDefinition`].
#[derive(Default)]
pub struct FormBuilder {
    metadata: FormMetadata,
    groups: Vec<FieldGroup>,
    validator: Option<FormValidator>,
    processor: Option<FormProcessor>,
    kinds: KindRegistry,
}

impl FormBuilder {
    /// Replaces all metadata at once.
    #[must_use]
    pub fn metadata(mut self, metadata: FormMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Sets the form id.
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.metadata.id = id.into();
        self
    }

    /// Sets the submission target.
    #[must_use]
    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.metadata.action = action.into();
        self
    }

    /// Sets the submission method.
    #[must_use]
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.metadata.method = method.into();
        self
    }

    /// Sets the plain-text help.
    #[must_use]
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.metadata.help = help.into();
        self
    }

    /// Sets the HTML help.
    #[must_use]
    pub fn help_html(mut self, help_html: impl Into<String>) -> Self {
        self.metadata.help_html = help_html.into();
        self
    }

    /// Sets the instructions.
    #[must_use]
    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.metadata.instructions = instructions.into();
        self
    }

    /// Sets the submit button text.
    #[must_use]
    pub fn submit(mut self, submit: impl Into<String>) -> Self {
        self.metadata.submit = submit.into();
        self
    }

    /// Appends a group.
    #[must_use]
    pub fn group(mut self, group: FieldGroup) -> Self {
        self.groups.push(group);
        self
    }

    /// Appends several groups.
    #[must_use]
    pub fn groups(mut self, groups: impl IntoIterator<Item = FieldGroup>) -> Self {
        self.groups.extend(groups);
        self
    }

    /// Sets the form-level validator.
    #[must_use]
    pub fn validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&Payload) -> ValidationOutcome + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// Sets a synchronous form-level validator.
    #[must_use]
    pub fn check<F>(self, check: F) -> Self
    where
        F: Fn(&Payload) -> FormResult<()> + Send + Sync + 'static,
    {
        self.validator(move |payload| ValidationOutcome::Ready(check(payload)))
    }

    /// Sets an asynchronous form-level validator. It receives an owned copy
    /// of the payload.
    #[must_use]
    pub fn check_async<F, Fut>(self, check: F) -> Self
    where
        F: Fn(Payload) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = FormResult<()>> + Send + 'static,
    {
        self.validator(move |payload| ValidationOutcome::pending(check(payload.clone())))
    }

    /// Sets the form-level processor.
    #[must_use]
    pub fn processor<F>(mut self, processor: F) -> Self
    where
        F: Fn(Payload) -> Payload + Send + Sync + 'static,
    {
        self.processor = Some(Arc::new(processor));
        self
    }

    /// Sets the form-level validator from an already shared callable.
    #[must_use]
    pub fn shared_validator(mut self, validator: FormValidator) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Sets the form-level processor from an already shared callable.
    #[must_use]
    pub fn shared_processor(mut self, processor: FormProcessor) -> Self {
        self.processor = Some(processor);
        self
    }

    /// Registers behaviour for a field type tag.
    #[must_use]
    pub fn kind(mut self, field_type: impl Into<FieldType>, kind: impl FieldKind + 'static) -> Self {
        self.kinds.register(field_type, kind);
        self
    }

    /// Replaces the type behaviour registry.
    #[must_use]
    pub fn kinds(mut self, kinds: KindRegistry) -> Self {
        self.kinds = kinds;
        self
    }

    /// Finishes the definition, flattening the groups into the field list.
    pub fn build(self) -> FormDefinition {
        let fields: Vec<FieldSpec> = self
            .groups
            .iter()
            .flat_map(|group| group.fields.iter().cloned())
            .collect();

        tracing::debug!(
            form = %self.metadata.id,
            groups = self.groups.len(),
            fields = fields.len(),
            "built form definition"
        );

        FormDefinition {
            metadata: self.metadata,
            groups: self.groups,
            fields,
            validator: self.validator,
            processor: self.processor,
            kinds: self.kinds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::SelectOption;
    use serde_json::json;

    fn make_test_form() -> FormDefinition {
        FormDefinition::builder()
            .id("contact")
            .group(FieldGroup::named(
                "person",
                vec![FieldSpec::text("name").required(true), FieldSpec::text("email")],
            ))
            .group(FieldGroup::new(vec![FieldSpec::select(
                "topic",
                vec![SelectOption::key("sales"), SelectOption::key("support")],
            )]))
            .build()
    }

    #[test]
    fn test_metadata_defaults() {
        let metadata = FormMetadata::default();
        assert_eq!(metadata.id, "form");
        assert_eq!(metadata.action, "");
        assert_eq!(metadata.method, "post");
        assert_eq!(metadata.help, "");
        assert_eq!(metadata.help_html, "");
        assert_eq!(metadata.instructions, "");
        assert_eq!(metadata.submit, "Submit");
    }

    #[test]
    fn test_metadata_deserialize_partial() {
        let metadata: FormMetadata =
            serde_json::from_value(json!({"id": "login", "helpHtml": "<b>hi</b>", "theme": "dark"}))
                .unwrap();
        assert_eq!(metadata.id, "login");
        assert_eq!(metadata.help_html, "<b>hi</b>");
        assert_eq!(metadata.method, "post");
        assert_eq!(metadata.extra.get("theme"), Some(&json!("dark")));
    }

    #[test]
    fn test_builder_metadata() {
        let form = FormDefinition::builder()
            .id("f")
            .action("/submit")
            .method("get")
            .help("h")
            .help_html("<i>h</i>")
            .instructions("fill in")
            .submit("Send")
            .build();
        let metadata = form.metadata();
        assert_eq!(metadata.id, "f");
        assert_eq!(metadata.action, "/submit");
        assert_eq!(metadata.method, "get");
        assert_eq!(metadata.help_html, "<i>h</i>");
        assert_eq!(metadata.instructions, "fill in");
        assert_eq!(metadata.submit, "Send");
    }

    #[test]
    fn test_empty_form() {
        let form = FormDefinition::builder().build();
        assert!(form.groups().is_empty());
        assert!(form.fields().is_empty());
        assert!(!form.has_required_fields());
        assert!(form.validator().is_none());
        assert!(form.processor().is_none());
    }

    #[test]
    fn test_fields_flattened_in_order() {
        let form = make_test_form();
        let names: Vec<&str> = form.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["name", "email", "topic"]);
        assert_eq!(form.groups().len(), 2);
    }

    #[test]
    fn test_flatten_keeps_duplicates() {
        let form = FormDefinition::builder()
            .group(FieldGroup::new(vec![FieldSpec::text("a")]))
            .group(FieldGroup::new(vec![FieldSpec::checkbox("a")]))
            .build();
        assert_eq!(form.fields().len(), 2);
    }

    #[test]
    fn test_group_default_name() {
        let form = make_test_form();
        assert_eq!(form.groups()[0].name_or_default(0), "person");
        assert_eq!(form.groups()[1].name_or_default(1), "group-1");
    }

    #[test]
    fn test_has_required_fields_literal_only() {
        let predicate_only = FormDefinition::builder()
            .group(FieldGroup::new(vec![FieldSpec::text("a").required_when(|_| true)]))
            .build();
        assert!(!predicate_only.has_required_fields());
        assert!(make_test_form().has_required_fields());
    }

    #[test]
    fn test_builder_custom_kind() {
        #[derive(Debug)]
        struct Rating;
        impl FieldKind for Rating {}

        let form = FormDefinition::builder().kind("rating", Rating).build();
        assert!(form.kinds().contains(&FieldType::from("rating")));
        assert!(form.kinds().contains(&FieldType::Select));
    }

    #[test]
    fn test_debug_output() {
        let form = make_test_form();
        let debug = format!("{form:?}");
        assert!(debug.contains("contact"));
        assert!(debug.contains("validator: false"));
    }
}
