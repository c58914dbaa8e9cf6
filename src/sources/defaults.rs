//! Default value sources.
//!
//! [`Defaults`] applies the `#[config(default = "...")]` annotations declared
//! on the target type. [`Preset`] layers a programmer-supplied instance over
//! the target, the same way a file layer is merged.
//!
//! # Example
//!
//! ```ignore
//! use stratum::{Chain, Defaults, Preset, Toml};
//!
//! let chain = Chain::new()
//!     .source(Defaults)
//!     .source(Preset::from_fn(|| AppConfig {
//!         port: if cfg!(debug_assertions) { 3000 } else { 8080 },
//!         ..AppConfig::default()
//!     }))
//!     .source(Toml::file("config.toml"));
//! ```

use std::sync::Arc;

use crate::env::ConfigEnv;
use crate::error::ConfigError;
use crate::field::{FieldMeta, Layered};
use crate::source::{merge_layer, Source};

/// Declared-default source.
///
/// For every empty field, assigns the field's zero value and then its
/// `default` annotation, if any. Fields already holding a value are left
/// alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct Defaults;

impl<T: Layered> Source<T> for Defaults {
    /// Defaults have no I/O, so ConfigEnv is unused.
    fn load(&self, target: &mut T, _env: &dyn ConfigEnv) -> Result<(), ConfigError> {
        target.fill_defaults(&FieldMeta::ROOT)
    }

    fn name(&self) -> &str {
        "defaults"
    }
}

/// The internal source type for presets.
enum PresetSource<T> {
    /// A concrete value
    Value(T),
    /// A closure that produces the value
    Fn(Arc<dyn Fn() -> T + Send + Sync>),
}

impl<T: Clone> Clone for PresetSource<T> {
    fn clone(&self) -> Self {
        match self {
            PresetSource::Value(v) => PresetSource::Value(v.clone()),
            PresetSource::Fn(f) => PresetSource::Fn(Arc::clone(f)),
        }
    }
}

/// In-memory layer source.
///
/// Every non-empty field of the preset overwrites the target; empty fields
/// leave the target untouched.
pub struct Preset<T> {
    source: PresetSource<T>,
}

impl<T: Layered + Clone + Send + Sync + 'static> Preset<T> {
    /// Create a preset from a value.
    #[allow(clippy::should_implement_trait)]
    pub fn from(value: T) -> Self {
        Self {
            source: PresetSource::Value(value),
        }
    }

    /// Create a preset from a closure.
    ///
    /// The closure is called each time the preset is loaded, so it can
    /// compute values from runtime conditions.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self {
            source: PresetSource::Fn(Arc::new(f)),
        }
    }
}

impl<T: Clone> Clone for Preset<T> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
        }
    }
}

impl<T: Layered + Clone + Send + Sync + 'static> Source<T> for Preset<T> {
    fn load(&self, target: &mut T, _env: &dyn ConfigEnv) -> Result<(), ConfigError> {
        let layer = match &self.source {
            PresetSource::Value(v) => v.clone(),
            PresetSource::Fn(f) => f(),
        };
        merge_layer(target, layer);
        Ok(())
    }

    fn name(&self) -> &str {
        "preset"
    }
}
