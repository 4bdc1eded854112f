//! Built-in template fragments for a [`ViewModel`](crate::ViewModel).
//!
//! The fragments are Tera templates and expect the view model's JSON form as
//! their context: `formflow/form` iterates `groups`, `formflow/group`
//! iterates a group's `fields`, and `formflow/field` renders one field by
//! type.
//!
//! This crate does not render them. [`register_partials`] hands the sources
//! to a caller's template engine through [`PartialRegistry`], which is
//! implemented for [`tera::Tera`] and for a plain name-to-source map.
//!
//! ```
//! use formflow_forms::partials;
//!
//! let mut tera = tera::Tera::default();
//! partials::register_partials(&mut tera).unwrap();
//! assert!(tera.get_template_names().any(|name| name == "formflow/field"));
//! ```

use std::collections::HashMap;

use formflow_core::{FormError, FormResult};

/// Renders a whole form.
pub const FORM_PARTIAL: &str = r#"<form id="{{ id }}" action="{{ action }}" method="{{ method }}">
{% if instructions %}<p class="formflow-instructions">{{ instructions }}</p>{% endif %}
{% for group in groups %}{% include "formflow/group" %}{% endfor %}
{% if helpHtml %}<div class="formflow-help">{{ helpHtml | safe }}</div>{% elif help %}<div class="formflow-help">{{ help }}</div>{% endif %}
<button type="submit">{{ submit }}</button>
</form>
"#;

/// Renders one group.
pub const GROUP_PARTIAL: &str = r#"<fieldset class="formflow-group" data-group="{{ group.name }}">
{% if group.label %}<legend>{{ group.label }}</legend>{% endif %}
{% for field in group.fields %}{% include "formflow/field" %}{% endfor %}
</fieldset>
"#;

/// Renders one field.
pub const FIELD_PARTIAL: &str = r#"{% if field.visible %}<div class="formflow-field formflow-{{ field.type }}">
{% if field.type == "checkbox" %}<input type="checkbox" id="{{ field.id }}" name="{{ field.name }}"{% if field.checked %} checked{% endif %}> <label for="{{ field.id }}">{{ field.label }}</label>
{% elif field.type == "select" %}<label for="{{ field.id }}">{{ field.label }}</label>
<select id="{{ field.id }}" name="{{ field.name }}"{% if field.required %} required{% endif %}>
{% for option in field.options %}<option value="{{ option.key }}"{% if option.selected %} selected{% endif %}>{% if option.label %}{{ option.label }}{% else %}{{ option.key }}{% endif %}</option>
{% endfor %}</select>
{% else %}<label for="{{ field.id }}">{{ field.label }}</label>
<input type="text" id="{{ field.id }}" name="{{ field.name }}" value="{{ field.value | default(value="") }}"{% if field.required %} required{% endif %}>
{% endif %}{% if field.descriptionHtml %}<div class="formflow-description">{{ field.descriptionHtml | safe }}</div>{% elif field.description %}<div class="formflow-description">{{ field.description }}</div>{% endif %}
</div>{% endif %}
"#;

/// The built-in fragments, by name.
pub const PARTIALS: [(&str, &str); 3] = [
    ("formflow/form", FORM_PARTIAL),
    ("formflow/group", GROUP_PARTIAL),
    ("formflow/field", FIELD_PARTIAL),
];

/// A destination for named template sources.
pub trait PartialRegistry {
    /// Adds or replaces a named template source.
    fn register_partial(&mut self, name: &str, source: &str) -> FormResult<()>;
}

impl PartialRegistry for HashMap<String, String> {
    fn register_partial(&mut self, name: &str, source: &str) -> FormResult<()> {
        self.insert(name.to_string(), source.to_string());
        Ok(())
    }
}

impl PartialRegistry for tera::Tera {
    fn register_partial(&mut self, name: &str, source: &str) -> FormResult<()> {
        self.add_raw_template(name, source).map_err(|e| {
            FormError::Configuration(format!("Failed to register partial \"{name}\": {e}"))
        })
    }
}

/// Registers every built-in fragment.
pub fn register_partials(registry: &mut impl PartialRegistry) -> FormResult<()> {
    for (name, source) in PARTIALS {
        registry.register_partial(name, source)?;
    }
    tracing::debug!(count = PARTIALS.len(), "registered form partials");
    Ok(())
}

/// Returns the source of a built-in fragment.
pub fn partial_source(name: &str) -> Option<&'static str> {
    PARTIALS
        .iter()
        .find(|(partial, _)| *partial == name)
        .map(|(_, source)| *source)
}
