//! Ordered source chains.
//!
//! A [`Chain`] applies its sources to one target in insertion order, each
//! layered on the result of the previous one. Order is precedence: a source
//! added later overwrites what earlier sources wrote wherever its own rule
//! fires, so reordering a chain changes which layer wins.

use std::fmt;

use tracing::debug;

use crate::env::{ConfigEnv, RealEnv};
use crate::error::ConfigError;
use crate::source::Source;

/// Builder and runner for an ordered list of sources.
///
/// # Example
///
/// ```ignore
/// use stratum::{Chain, Defaults, Env, Toml};
///
/// let mut config = AppConfig::default();
/// Chain::new()
///     .source(Defaults)
///     .source(Toml::file("config.toml").optional())
///     .source(Env::prefix("APP_"))
///     .load(&mut config)?;
/// ```
pub struct Chain<T> {
    sources: Vec<Box<dyn Source<T>>>,
}

impl<T> Default for Chain<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Chain<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain")
            .field("sources", &self.names())
            .finish()
    }
}

impl<T> Chain<T> {
    /// Create a new empty chain.
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// Append a source.
    ///
    /// Sources are applied in order, with later sources overriding earlier ones.
    pub fn source<S: Source<T> + 'static>(mut self, source: S) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Names of the chained sources, in application order.
    pub fn names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Number of chained sources.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Returns true when the chain has no sources.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Apply every source to `target` using the real environment.
    pub fn load(&self, target: &mut T) -> Result<(), ConfigError> {
        self.load_with_env(target, &RealEnv::new())
    }

    /// Apply every source to `target` with a custom environment.
    ///
    /// The first failing source stops the chain and its error is returned
    /// as is. Sources that already ran are not rolled back.
    pub fn load_with_env(&self, target: &mut T, env: &dyn ConfigEnv) -> Result<(), ConfigError> {
        for source in &self.sources {
            debug!(source = source.name(), "applying configuration source");
            source.load(target, env)?;
        }
        Ok(())
    }
}

#[cfg(feature = "toml")]
impl<T: crate::field::Layered> Chain<T> {
    /// The standard chain: declared defaults, then a required TOML file,
    /// then environment variables.
    pub fn standard(path: impl Into<std::path::PathBuf>) -> Self {
        Self::new()
            .source(crate::sources::Defaults)
            .source(crate::sources::Toml::file(path))
            .source(crate::sources::Env::new())
    }
}

impl<T> Source<T> for Chain<T> {
    fn load(&self, target: &mut T, env: &dyn ConfigEnv) -> Result<(), ConfigError> {
        self.load_with_env(target, env)
    }

    fn name(&self) -> &str {
        "chain"
    }
}
