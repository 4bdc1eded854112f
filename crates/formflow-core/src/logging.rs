//! Logging integration for formflow.
//!
//! Provides helpers for configuring [`tracing`]-based logging from
//! [`Settings`](crate::settings::Settings) and for creating per-form spans.

use crate::settings::Settings;

/// Sets up the global tracing subscriber based on the given settings.
///
/// The filter is read from `settings.log_level`. In debug mode a pretty,
/// human-readable format is used; otherwise structured JSON is emitted.
/// If a global subscriber is already installed this is a no-op.
pub fn setup_logging(settings: &Settings) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(&settings.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    if settings.debug {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(true)
            .with_line_number(true)
            .pretty()
            .try_init()
            .ok();
    } else {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .try_init()
            .ok();
    }
}

/// Creates a tracing span for one pass over a form.
///
/// `stage` names the operation ("validate", "process", "serialize").
///
/// # Examples
///
/// ```
/// use formflow_core::logging::form_span;
///
/// let span = form_span("signup", "validate");
/// let _guard = span.enter();
/// tracing::info!("validating payload");
/// ```
pub fn form_span(form_id: &str, stage: &'static str) -> tracing::Span {
    tracing::debug_span!("form", id = form_id, stage)
}
