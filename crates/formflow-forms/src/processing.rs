//! The processing pipeline.
//!
//! Turns a payload into the canonical output mapping. Processing performs
//! no validation and cannot fail; for every field in the flattened list:
//!
//! 1. Take the payload value (missing keys read as `null`).
//! 2. If the value is falsy and the field has a default, use the default.
//! 3. Apply the field's own transform, if any.
//! 4. Apply the field type's coercion (`checkbox` becomes a strict boolean).
//! 5. Store it under the field's name; later duplicates overwrite.
//!
//! Finally, the form-level processor, if any, receives the whole mapping and
//! its return value becomes the result.

use serde_json::Value;

use formflow_core::logging::form_span;

use crate::fields::FieldSpec;
use crate::form::FormDefinition;
use crate::value::{is_truthy, lookup, Payload};

/// Processes a payload into the output mapping.
pub fn process(form: &FormDefinition, payload: &Payload) -> Payload {
    let span = form_span(&form.metadata().id, "process");
    let _guard = span.enter();

    let mut values = Payload::new();
    for field in form.fields() {
        let value = process_field(form, field, payload);
        tracing::trace!(field = %field.name, "processed field");
        values.insert(field.name.clone(), value);
    }

    if let Some(processor) = form.processor() {
        values = processor(values);
    }

    tracing::debug!(fields = values.len(), "processed payload");
    values
}

/// Resolves, transforms, and coerces a single field's value.
pub fn process_field(form: &FormDefinition, field: &FieldSpec, payload: &Payload) -> Value {
    let mut value = lookup(payload, &field.name).clone();
    if !is_truthy(&value) {
        if let Some(default) = &field.default {
            value = default.clone();
        }
    }
    if let Some(processor) = &field.processor {
        value = processor(value);
    }
    form.kinds().kind_for(&field.field_type).coerce(value)
}
