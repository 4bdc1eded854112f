//! View-model generation.
//!
//! [`serialize`] turns a [`FormDefinition`] plus a value mapping into a
//! [`ViewModel`]: the structure a template layer iterates to render the
//! form. Every call builds fresh group and field views, so the shared
//! definition is never touched.
//!
//! Per field:
//!
//! - `value` is `values[name]` when present and not `null`, else the
//!   field's default, else a static `value` attribute, else unset.
//! - `id` is the explicit id, else `form-{group}-{field}`.
//! - `visible` is `false` only when explicitly set so.
//! - `description` and `descriptionHtml` are evaluated against `values`.
//! - The field type's [`FieldKind`](crate::kinds::FieldKind) adds its own
//!   state (`checked` for checkboxes, per-option `selected` for selects).
//!
//! Display attributes never override computed state: attributes named like
//! a computed key are dropped from the view.
//!
//! The JSON form of the view model uses camelCase keys.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use formflow_core::logging::form_span;

use crate::fields::{FieldSpec, FieldType};
use crate::form::{FieldGroup, FormDefinition, FormMetadata};
use crate::value::{present, Payload};

/// Keys computed for every field view.
const FIELD_KEYS: [&str; 12] = [
    "name",
    "label",
    "type",
    "value",
    "default",
    "checked",
    "options",
    "id",
    "visible",
    "required",
    "description",
    "descriptionHtml",
];

/// Keys computed for every group view.
const GROUP_KEYS: [&str; 2] = ["name", "fields"];

fn display_attrs(attrs: &Map<String, Value>, computed: &[&str]) -> Map<String, Value> {
    attrs
        .iter()
        .filter(|(key, _)| !computed.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Inputs to [`serialize`]. Both default to empty.
#[derive(Debug, Clone, Default)]
pub struct SerializeOptions {
    /// Extra top-level entries, overlaid on the form metadata.
    pub extend: Map<String, Value>,
    /// The values to display (a raw payload or processed output).
    pub values: Payload,
}

impl SerializeOptions {
    /// Creates options with the given values and nothing to extend.
    pub fn with_values(values: Payload) -> Self {
        Self {
            values,
            ..Self::default()
        }
    }

    /// Adds a top-level entry.
    #[must_use]
    pub fn extend(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extend.insert(key.into(), value.into());
        self
    }
}

/// One option of a serialized `select` field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionView {
    /// The option key.
    pub key: Value,
    /// The option label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Whether this option matches the field's value.
    pub selected: bool,
}

/// A serialized field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldView {
    /// The field name.
    pub name: String,
    /// The label, falling back to the name.
    pub label: String,
    /// The type tag.
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// The resolved display value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// The field's default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Checkbox state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
    /// Select options with their `selected` flags.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<OptionView>>,
    /// The render identifier.
    pub id: String,
    /// Whether the field is shown.
    pub visible: bool,
    /// Whether the field is literally always required.
    pub required: bool,
    /// Evaluated plain-text description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Evaluated HTML description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_html: Option<String>,
    /// Additional display attributes.
    #[serde(flatten)]
    pub attrs: Map<String, Value>,
}

/// A serialized group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupView {
    /// The group name, defaulted to `group-{index}`.
    pub name: String,
    /// The group's fields.
    pub fields: Vec<FieldView>,
    /// Additional display attributes.
    #[serde(flatten)]
    pub attrs: Map<String, Value>,
}

/// The render-ready form.
///
/// Serializes as one JSON object: the metadata, overlaid by `extend`, then
/// `groups` and `hasRequiredFields`.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewModel {
    /// The form metadata.
    pub metadata: FormMetadata,
    /// Caller-supplied extras.
    pub extend: Map<String, Value>,
    /// The serialized groups.
    pub groups: Vec<GroupView>,
    /// Whether any field is literally always required.
    pub has_required_fields: bool,
}

impl ViewModel {
    /// Returns the view model as a single JSON object.
    pub fn to_json(&self) -> Value {
        let mut map = match serde_json::to_value(&self.metadata) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        for (key, value) in &self.extend {
            map.insert(key.clone(), value.clone());
        }
        map.insert(
            "groups".to_string(),
            serde_json::to_value(&self.groups).unwrap_or(Value::Null),
        );
        map.insert(
            "hasRequiredFields".to_string(),
            Value::Bool(self.has_required_fields),
        );
        Value::Object(map)
    }

    /// Finds a serialized field by name.
    pub fn field(&self, name: &str) -> Option<&FieldView> {
        self.groups
            .iter()
            .flat_map(|group| &group.fields)
            .find(|field| field.name == name)
    }
}

impl Serialize for ViewModel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Builds the view model for a form.
pub fn serialize(form: &FormDefinition, options: SerializeOptions) -> ViewModel {
    let span = form_span(&form.metadata().id, "serialize");
    let _guard = span.enter();

    let SerializeOptions { extend, values } = options;
    let groups: Vec<GroupView> = form
        .groups()
        .iter()
        .enumerate()
        .map(|(index, group)| serialize_group(form, group, index, &values))
        .collect();

    tracing::debug!(groups = groups.len(), "serialized form");

    ViewModel {
        metadata: form.metadata().clone(),
        extend,
        groups,
        has_required_fields: form.has_required_fields(),
    }
}

fn serialize_group(
    form: &FormDefinition,
    group: &FieldGroup,
    index: usize,
    values: &Payload,
) -> GroupView {
    let name = group.name_or_default(index);
    let fields = group
        .fields
        .iter()
        .map(|field| serialize_field(form, field, &name, values))
        .collect();
    GroupView {
        name,
        fields,
        attrs: display_attrs(&group.attrs, &GROUP_KEYS),
    }
}

/// Builds the view of a single field within the named group.
pub fn serialize_field(
    form: &FormDefinition,
    field: &FieldSpec,
    group_name: &str,
    values: &Payload,
) -> FieldView {
    let value = present(values, &field.name)
        .cloned()
        .or_else(|| field.default.clone())
        .or_else(|| field.attrs.get("value").cloned());

    let mut view = FieldView {
        name: field.name.clone(),
        label: field.label().to_string(),
        field_type: field.field_type.clone(),
        value,
        default: field.default.clone(),
        checked: None,
        options: None,
        id: field
            .id
            .clone()
            .unwrap_or_else(|| format!("form-{group_name}-{}", field.name)),
        visible: field.visible != Some(false),
        required: field.required.is_always(),
        description: field.description.as_ref().map(|d| d.render(values)),
        description_html: field.description_html.as_ref().map(|d| d.render(values)),
        attrs: display_attrs(&field.attrs, &FIELD_KEYS),
    };

    form.kinds()
        .kind_for(&field.field_type)
        .decorate(field, &mut view);
    view
}
