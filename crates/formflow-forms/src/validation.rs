//! The validation engine.
//!
//! Validation runs in three steps:
//!
//! 1. Field checks. Every field in the flattened list is dispatched in
//!    order: requirement check for empty values, the type's structural
//!    check for present ones, then the field's own validator. Synchronous
//!    outcomes are known immediately; pending ones are spawned as
//!    independent tasks.
//! 2. The form-level validator, once every field has passed.
//! 3. Processing, whose output becomes the result.
//!
//! The first failure wins. A synchronous failure is reported before any
//! pending one. Among pending checks, whichever fails first is reported.
//! Pending checks still running when validation fails are detached, not
//! cancelled: they run to completion and their results are dropped.

use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use tracing::Instrument;

use formflow_core::logging::form_span;
use formflow_core::{FormError, FormResult, ValidationError};

use crate::fields::{FieldSpec, ValidationOutcome};
use crate::form::FormDefinition;
use crate::processing;
use crate::value::{is_truthy, lookup, Payload};

/// Validates a payload and returns the processed output on success.
///
/// Must be called from within a Tokio runtime, since pending field checks
/// are spawned as tasks.
pub async fn validate(form: &FormDefinition, payload: &Payload) -> FormResult<Payload> {
    let span = form_span(&form.metadata().id, "validate");
    async move {
        tracing::debug!(fields = form.fields().len(), "validating payload");

        if let Err(err) = validate_fields(form, payload).await {
            tracing::debug!(error = %err, "field validation failed");
            return Err(err);
        }

        if let Some(validator) = form.validator() {
            if let Err(err) = validator(payload).resolve().await {
                tracing::debug!(error = %err, "form validation failed");
                return Err(err);
            }
        }

        Ok(processing::process(form, payload))
    }
    .instrument(span)
    .await
}

/// Runs every field check with fail-fast aggregation.
pub async fn validate_fields(form: &FormDefinition, payload: &Payload) -> FormResult<()> {
    let mut first_error: Option<FormError> = None;
    let mut pending = FuturesUnordered::new();

    for field in form.fields() {
        match check_field(form, field, payload) {
            Ok(None) => {}
            Ok(Some(check)) => {
                tracing::trace!(field = %field.name, "dispatched async check");
                pending.push(tokio::spawn(check));
            }
            Err(err) => {
                tracing::trace!(field = %field.name, error = %err, "field check failed");
                first_error.get_or_insert(err);
            }
        }
    }

    if let Some(err) = first_error {
        return Err(err);
    }

    while let Some(joined) = pending.next().await {
        joined.map_err(|e| FormError::TaskFailed(e.to_string()))??;
    }
    Ok(())
}

/// Runs the synchronous part of a field's checks.
///
/// Returns `Ok(Some(future))` when the field's validator is still pending.
pub fn check_field(
    form: &FormDefinition,
    field: &FieldSpec,
    payload: &Payload,
) -> FormResult<Option<BoxFuture<'static, FormResult<()>>>> {
    let value = lookup(payload, &field.name);

    if is_truthy(value) {
        form.kinds().kind_for(&field.field_type).check(field, value)?;
    } else if field.required.evaluate(payload) {
        return Err(ValidationError::new(format!("\"{}\" is required", field.label()), "required")
            .with_param("field", field.name.as_str())
            .into());
    }

    match field.validator.as_ref().map(|validator| validator(value, payload)) {
        None | Some(ValidationOutcome::Ready(Ok(()))) => Ok(None),
        Some(ValidationOutcome::Ready(Err(err))) => Err(err),
        Some(ValidationOutcome::Pending(check)) => Ok(Some(check)),
    }
}
