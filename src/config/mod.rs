//! # Configuration System
//!
//! TOML-based configuration for trace context propagation: which vendor
//! member this service writes into `tracestate`, how the sampled flag is
//! decided, and whether a fixed parent id is used.
//!
//! ## Example Configuration
//!
//! ```toml
//! [tracecontext]
//! vendor_key = "r0n"
//! # empty: the new parent id is used as the value
//! vendor_value = ""
//! # empty: a random parent id per request
//! parent_id = ""
//! sampling = "pass_through"
//! ```

mod error;
mod loader;
mod types;
mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;
pub use types::{PropagationConfig, TraceContextConfig};
pub use validation::{
    BasicValidator, ValidationError, ValidationResult, ValidationSeverity, Validator,
};
