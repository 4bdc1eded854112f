//! # formflow-forms
//!
//! Declarative forms: a [`FormDefinition`] built from grouped [`FieldSpec`]s
//! validates a payload (with concurrent, fail-fast async checks), processes
//! it into a normalized output mapping, and serializes itself into a
//! render-ready [`ViewModel`] for a template layer.
//!
//! ## Modules
//!
//! - [`value`] - Payload type and truthiness rules
//! - [`fields`] - Field specifications and lazily evaluated settings
//! - [`kinds`] - Per-type behaviour registry (`text`, `checkbox`, `select`, ...)
//! - [`form`] - Form definitions, groups, and metadata
//! - [`validation`] - The validation engine
//! - [`processing`] - The processing pipeline
//! - [`serialization`] - View-model generation
//! - [`config`] - Loading definitions from TOML/JSON
//! - [`partials`] - Template fragment registration

pub mod config;
pub mod fields;
pub mod form;
pub mod kinds;
pub mod partials;
pub mod processing;
pub mod serialization;
pub mod validation;
pub mod value;

pub use fields::{Description, FieldSpec, FieldType, OptionSource, Required, SelectOption, ValidationOutcome};
pub use form::{FieldGroup, FormBuilder, FormDefinition, FormMetadata};
pub use formflow_core::{FormError, FormResult, ValidationError};
pub use serialization::{SerializeOptions, ViewModel};
pub use value::Payload;
