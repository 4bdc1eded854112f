//! # formflow
//!
//! Declarative form definitions with concurrent, fail-fast validation,
//! value processing, and view-model serialization for templates.
//!
//! This is the meta-crate that re-exports the sub-crates for convenient access.
//!
//! ```
//! use formflow::prelude::*;
//!
//! let form = FormDefinition::builder()
//!     .group(FieldGroup::new(vec![FieldSpec::text("name").required(true)]))
//!     .build();
//!
//! let view = form.serialize(SerializeOptions::default());
//! assert!(view.has_required_fields);
//! ```

/// Error types, settings, and logging.
pub use formflow_core as core;

/// The form engine.
pub use formflow_forms as forms;

/// Third-party crates used in the public API.
pub use serde;
pub use serde_json;
pub use tokio;
pub use tracing;
pub use tracing_subscriber;

/// The most commonly used types.
pub mod prelude {
    pub use formflow_core::{FormError, FormResult, Settings, ValidationError};
    pub use formflow_forms::config::{CallableRegistry, FormConfig};
    pub use formflow_forms::{
        Description, FieldGroup, FieldSpec, FieldType, FormDefinition, FormMetadata, OptionSource,
        Payload, Required, SelectOption, SerializeOptions, ValidationOutcome, ViewModel,
    };
}
