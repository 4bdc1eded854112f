//! Error types for formflow.
//!
//! [`ValidationError`] is the distinguished failure kind for field and form
//! rule violations. [`FormError`] is the error returned by every fallible
//! engine operation; it carries validation failures, configuration
//! problems, and arbitrary errors raised by caller-supplied validators.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

/// A form-specific validation failure carrying a display-ready message.
///
/// Validators construct this to signal that a value is invalid in a way the
/// caller should show to the user, as opposed to an unexpected error.
///
/// # Examples
///
/// ```
/// use formflow_core::error::ValidationError;
///
/// let err = ValidationError::new("\"email\" is required", "required");
/// assert_eq!(err.to_string(), "\"email\" is required");
///
/// let err = ValidationError::new("Too short.", "min_length").with_param("min", "8");
/// assert_eq!(err.params.get("min").map(String::as_str), Some("8"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The human-readable error message.
    pub message: String,
    /// A short code identifying the failure (e.g. "required", "invalid_choice").
    pub code: String,
    /// Additional parameters providing context for the message.
    pub params: HashMap<String, String>,
}

impl ValidationError {
    /// Creates a new `ValidationError` with a message and code.
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            params: HashMap::new(),
        }
    }

    /// Creates a `ValidationError` with the generic "invalid" code.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::new(message, "invalid")
    }

    /// Adds a parameter to this validation error.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ValidationError {}

/// The error type for all fallible formflow operations.
#[derive(Error, Debug)]
pub enum FormError {
    /// A field or form rule was violated.
    #[error("{0}")]
    Validation(ValidationError),

    /// The form definition was malformed at construction time.
    #[error("{0}")]
    Configuration(String),

    /// Any other error raised by a caller-supplied validator, passed through
    /// unchanged.
    #[error(transparent)]
    Validator(Box<dyn std::error::Error + Send + Sync>),

    /// A spawned validator task panicked or was aborted by the runtime.
    #[error("Validator task failed: {0}")]
    TaskFailed(String),
}

impl FormError {
    /// Wraps an arbitrary error raised by a validator.
    pub fn custom(error: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Validator(error.into())
    }

    /// Returns `true` if this is a [`ValidationError`].
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns the inner [`ValidationError`], if any.
    pub const fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for FormError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

/// A convenience type alias for `Result<T, FormError>`.
pub type FormResult<T> = Result<T, FormError>;
