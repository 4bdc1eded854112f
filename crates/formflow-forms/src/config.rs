//! Loading form definitions from static configuration.
//!
//! A [`FormConfig`] is the serde-deserializable shape of a form: metadata,
//! groups, and fields with plain-data settings. Behaviour that can't be
//! written as data (validators, processors, option providers, conditional
//! requirements) is referred to by name and looked up in a
//! [`CallableRegistry`] when the definition is built. A name with no registered callable is a configuration error.
//!
//! ## Example (TOML)
//!
//! ```toml
//! id = "signup"
//! submit = "Create account"
//! validate = "passwords_match"
//!
//! [[groups]]
//! name = "account"
//!
//! [[groups.fields]]
//! name = "email"
//! required = true
//! process = "lowercase"
//!
//! [[groups.fields]]
//! name = "plan"
//! type = "select"
//! options = [{ key = "free", label = "Free" }, { key = "pro" }]
//! ```

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Map, Value};

use formflow_core::settings_loader::toml_to_json;
use formflow_core::{FormError, FormResult};

use crate::fields::{
    Description, FieldProcessor, FieldSpec, FieldType, FieldValidator, OptionSource, Required,
    SelectOption, ValidationOutcome,
};
use crate::form::{FieldGroup, FormDefinition, FormMetadata, FormProcessor, FormValidator};
use crate::kinds::KindRegistry;
use crate::value::Payload;

type OptionProvider = Arc<dyn Fn() -> Vec<SelectOption> + Send + Sync>;
type RequiredPredicate = Arc<dyn Fn(&Payload) -> bool + Send + Sync>;

/// A form definition as static data.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    /// Rendering metadata (`id`, `action`, `method`, ... at the top level).
    #[serde(flatten)]
    pub metadata: FormMetadata,
    /// The field groups.
    pub groups: Vec<GroupConfig>,
    /// Name of a registered form validator.
    pub validate: Option<String>,
    /// Name of a registered form processor.
    pub process: Option<String>,
}

/// A group as static data.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GroupConfig {
    /// The group name.
    pub name: Option<String>,
    /// The group's fields.
    pub fields: Vec<FieldConfig>,
    /// Any other keys, copied into the view model.
    #[serde(flatten)]
    pub attrs: Map<String, Value>,
}

/// A field as static data.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldConfig {
    /// The field name.
    pub name: String,
    /// The display label.
    pub label: Option<String>,
    /// The type tag.
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Whether the field is required: a flag, or the name of a registered
    /// predicate.
    pub required: RequiredConfig,
    /// Name of a registered field validator.
    pub validate: Option<String>,
    /// Name of a registered field processor.
    pub process: Option<String>,
    /// The default value.
    pub default: Option<Value>,
    /// Static options, or the name of a registered provider.
    pub options: Option<OptionsConfig>,
    /// Plain-text description.
    pub description: Option<String>,
    /// HTML description.
    pub description_html: Option<String>,
    /// Visibility; absent means visible.
    pub visible: Option<bool>,
    /// Explicit render identifier.
    pub id: Option<String>,
    /// Any other keys, copied into the view model.
    #[serde(flatten)]
    pub attrs: Map<String, Value>,
}

/// The `options` setting of a field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OptionsConfig {
    /// A fixed list of options.
    List(Vec<SelectOption>),
    /// The name of a registered option provider.
    Provider(String),
}

/// The `required` setting of a field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RequiredConfig {
    /// Always or never required.
    Flag(bool),
    /// The name of a registered predicate over the payload.
    When(String),
}

impl Default for RequiredConfig {
    fn default() -> Self {
        Self::Flag(false)
    }
}

/// Named callables that configuration can refer to.
#[derive(Clone, Default)]
pub struct CallableRegistry {
    field_validators: HashMap<String, FieldValidator>,
    field_processors: HashMap<String, FieldProcessor>,
    form_validators: HashMap<String, FormValidator>,
    form_processors: HashMap<String, FormProcessor>,
    option_providers: HashMap<String, OptionProvider>,
    required_predicates: HashMap<String, RequiredPredicate>,
    kinds: KindRegistry,
}

impl CallableRegistry {
    /// Creates an empty registry with the built-in field kinds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a field validator.
    #[must_use]
    pub fn field_validator<F>(mut self, name: impl Into<String>, validator: F) -> Self
    where
        F: Fn(&Value, &Payload) -> ValidationOutcome + Send + Sync + 'static,
    {
        self.field_validators.insert(name.into(), Arc::new(validator));
        self
    }

    /// Registers a field processor.
    #[must_use]
    pub fn field_processor<F>(mut self, name: impl Into<String>, processor: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.field_processors.insert(name.into(), Arc::new(processor));
        self
    }

    /// Registers a form validator.
    #[must_use]
    pub fn form_validator<F>(mut self, name: impl Into<String>, validator: F) -> Self
    where
        F: Fn(&Payload) -> ValidationOutcome + Send + Sync + 'static,
    {
        self.form_validators.insert(name.into(), Arc::new(validator));
        self
    }

    /// Registers a form processor.
    #[must_use]
    pub fn form_processor<F>(mut self, name: impl Into<String>, processor: F) -> Self
    where
        F: Fn(Payload) -> Payload + Send + Sync + 'static,
    {
        self.form_processors.insert(name.into(), Arc::new(processor));
        self
    }

    /// Registers an option provider.
    #[must_use]
    pub fn option_provider<F>(mut self, name: impl Into<String>, provider: F) -> Self
    where
        F: Fn() -> Vec<SelectOption> + Send + Sync + 'static,
    {
        self.option_providers.insert(name.into(), Arc::new(provider));
        self
    }

    /// Registers a requirement predicate.
    #[must_use]
    pub fn required_when<F>(mut self, name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Payload) -> bool + Send + Sync + 'static,
    {
        self.required_predicates.insert(name.into(), Arc::new(predicate));
        self
    }

    /// Replaces the field kinds given to built definitions.
    #[must_use]
    pub fn kinds(mut self, kinds: KindRegistry) -> Self {
        self.kinds = kinds;
        self
    }
}

impl fmt::Debug for CallableRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn names<V>(map: &HashMap<String, V>) -> Vec<&str> {
            let mut names: Vec<&str> = map.keys().map(String::as_str).collect();
            names.sort_unstable();
            names
        }
        f.debug_struct("CallableRegistry")
            .field("field_validators", &names(&self.field_validators))
            .field("field_processors", &names(&self.field_processors))
            .field("form_validators", &names(&self.form_validators))
            .field("form_processors", &names(&self.form_processors))
            .field("option_providers", &names(&self.option_providers))
            .field("required_predicates", &names(&self.required_predicates))
            .finish_non_exhaustive()
    }
}

fn lookup<'a, V>(
    map: &'a HashMap<String, V>,
    name: &str,
    option: &str,
    field: Option<&str>,
) -> FormResult<&'a V> {
    map.get(name).ok_or_else(|| {
        let message = match field {
            Some(field) => {
                format!("Invalid option (\"{option}\") for field \"{field}\": Function expected")
            }
            None => format!("Invalid option (\"{option}\"): Function expected"),
        };
        tracing::warn!(callable = %name, "{message}");
        FormError::Configuration(message)
    })
}

impl FormConfig {
    /// Builds a form definition, resolving every callable name.
    pub fn build(self, registry: &CallableRegistry) -> FormResult<FormDefinition> {
        let mut builder = FormDefinition::builder()
            .metadata(self.metadata)
            .kinds(registry.kinds.clone());

        if let Some(name) = &self.validate {
            let validator = lookup(&registry.form_validators, name, "validate", None)?;
            builder = builder.shared_validator(Arc::clone(validator));
        }
        if let Some(name) = &self.process {
            let processor = lookup(&registry.form_processors, name, "process", None)?;
            builder = builder.shared_processor(Arc::clone(processor));
        }

        let groups = self
            .groups
            .into_iter()
            .map(|group| group.build(registry))
            .collect::<FormResult<Vec<_>>>()?;

        Ok(builder.groups(groups).build())
    }
}

impl GroupConfig {
    fn build(self, registry: &CallableRegistry) -> FormResult<FieldGroup> {
        let fields = self
            .fields
            .into_iter()
            .map(|field| field.build(registry))
            .collect::<FormResult<Vec<_>>>()?;
        Ok(FieldGroup {
            name: self.name,
            fields,
            attrs: self.attrs,
        })
    }
}

impl FieldConfig {
    fn build(self, registry: &CallableRegistry) -> FormResult<FieldSpec> {
        let field_name = Some(self.name.as_str());
        let validator = match &self.validate {
            Some(name) => Some(Arc::clone(lookup(
                &registry.field_validators,
                name,
                "validate",
                field_name,
            )?)),
            None => None,
        };
        let processor = match &self.process {
            Some(name) => Some(Arc::clone(lookup(
                &registry.field_processors,
                name,
                "process",
                field_name,
            )?)),
            None => None,
        };
        let required = match &self.required {
            RequiredConfig::Flag(flag) => Required::Flag(*flag),
            RequiredConfig::When(name) => Required::When(Arc::clone(lookup(
                &registry.required_predicates,
                name,
                "required",
                field_name,
            )?)),
        };
        let options = match self.options {
            Some(OptionsConfig::List(options)) => Some(OptionSource::Static(options)),
            Some(OptionsConfig::Provider(name)) => Some(OptionSource::Provider(Arc::clone(
                lookup(&registry.option_providers, &name, "options", field_name)?,
            ))),
            None => None,
        };

        Ok(FieldSpec {
            name: self.name,
            label: self.label,
            field_type: self.field_type,
            required,
            validator,
            processor,
            default: self.default,
            options,
            description: self.description.map(Description::Text),
            description_html: self.description_html.map(Description::Text),
            visible: self.visible,
            id: self.id,
            attrs: self.attrs,
        })
    }
}

/// Parses a form configuration from a JSON string.
pub fn from_json_str(json_str: &str) -> FormResult<FormConfig> {
    serde_json::from_str(json_str)
        .map_err(|e| FormError::Configuration(format!("Failed to parse form JSON: {e}")))
}

/// Parses a form configuration from a TOML string.
pub fn from_toml_str(toml_str: &str) -> FormResult<FormConfig> {
    let toml_value: toml::Value = toml::from_str(toml_str)
        .map_err(|e| FormError::Configuration(format!("Failed to parse form TOML: {e}")))?;
    serde_json::from_value(toml_to_json(toml_value))
        .map_err(|e| FormError::Configuration(format!("Invalid form configuration: {e}")))
}

/// Reads a form configuration from a file, choosing the format by extension
/// (`.json`, otherwise TOML).
pub fn from_file(path: impl AsRef<Path>) -> FormResult<FormConfig> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        FormError::Configuration(format!(
            "Failed to read form configuration {}: {e}",
            path.display()
        ))
    })?;
    if path.extension().is_some_and(|ext| ext == "json") {
        from_json_str(&content)
    } else {
        from_toml_str(&content)
    }
}

impl FormDefinition {
    /// Builds a definition from configuration.
    pub fn from_config(config: FormConfig, registry: &CallableRegistry) -> FormResult<Self> {
        config.build(registry)
    }
}
