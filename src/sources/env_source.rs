//! Environment variable configuration source.
//!
//! # Example
//!
//! ```ignore
//! use stratum::{Chain, Env};
//!
//! // #[config(env = "PORT")] reads PORT
//! let chain = Chain::new().source(Env::new());
//!
//! // #[config(env = "PORT")] reads APP_PORT
//! let chain = Chain::new().source(Env::prefix("APP_"));
//! ```

use crate::env::{ConfigEnv, EnvScope};
use crate::error::ConfigError;
use crate::field::{FieldMeta, Layered};
use crate::source::Source;

/// Environment variable configuration source.
///
/// Every field carrying an `env` annotation is overwritten when its variable
/// is set to a non-empty value, whatever the field held before. Unset and
/// empty variables leave the field alone.
#[derive(Debug, Clone, Default)]
pub struct Env {
    prefix: String,
}

impl Env {
    /// Look annotated names up exactly as written.
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend `prefix` to every annotated name before lookup.
    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl<T: Layered> Source<T> for Env {
    /// Load environment variables.
    ///
    /// The `ConfigEnv` parameter enables dependency injection for testing.
    /// In production, use `RealEnv`; in tests, use `MockEnv`.
    fn load(&self, target: &mut T, env: &dyn ConfigEnv) -> Result<(), ConfigError> {
        let scope = EnvScope::with_prefix(env, &self.prefix);
        target.apply_env(&FieldMeta::ROOT, &scope)
    }

    fn name(&self) -> &str {
        "environment"
    }
}
