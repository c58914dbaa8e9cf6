//! YAML configuration source.
//!
//! This module provides the `Yaml` source for layering a YAML file or string
//! over a target. It supports required/optional files, string content, and
//! parse errors with line and column.
//!
//! # Example
//!
//! ```ignore
//! use stratum::{Chain, Yaml};
//!
//! // Load from file (required by default)
//! let chain = Chain::new().source(Yaml::file("config.yaml"));
//!
//! // Load from optional file
//! let chain = Chain::new().source(Yaml::file("config.yaml").optional());
//!
//! // Load from string
//! let chain = Chain::new().source(Yaml::string("host: localhost\nport: 8080\n"));
//! ```

use std::path::PathBuf;

use crate::env::ConfigEnv;
use crate::error::{ConfigError, SourceErrorKind};
use crate::field::{Layered, Value};
use crate::source::Source;
use crate::sources::FileLayer;

/// YAML configuration source.
///
/// Same layering as [`Toml`](crate::Toml). Mapping keys must be strings.
#[derive(Debug, Clone)]
pub struct Yaml {
    layer: FileLayer,
}

impl Yaml {
    /// Load YAML from a file path (required by default).
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            layer: FileLayer::file(path),
        }
    }

    /// Load YAML from a string.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use stratum::Yaml;
    ///
    /// let source = Yaml::string("host: localhost\nport: 8080\n");
    /// ```
    pub fn string(content: impl Into<String>) -> Self {
        Self {
            layer: FileLayer::string(content),
        }
    }

    /// Mark this source as optional (no error if file missing).
    ///
    /// A missing optional file contributes nothing to the target.
    pub fn optional(mut self) -> Self {
        self.layer.set_required(false);
        self
    }

    /// Mark this source as required (default).
    pub fn required(mut self) -> Self {
        self.layer.set_required(true);
        self
    }

    /// Set a custom name for this source in error messages.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.layer.set_name(name.into());
        self
    }
}

impl<T: Layered> Source<T> for Yaml {
    /// File I/O is performed through the `ConfigEnv` trait; decoding happens
    /// after the read completes.
    fn load(&self, target: &mut T, env: &dyn ConfigEnv) -> Result<(), ConfigError> {
        self.layer.load(target, env, parse_yaml)
    }

    fn name(&self) -> &str {
        self.layer.name()
    }
}

fn parse_yaml(content: &str) -> Result<Value, SourceErrorKind> {
    // An empty document is an empty layer.
    let content = if content.trim().is_empty() { "{}" } else { content };

    serde_yaml::from_str(content).map_err(|e: serde_yaml::Error| {
        // serde_yaml errors include location info
        let (line, column) = e.location().map_or((None, None), |loc| {
            (Some(loc.line() as u32), Some(loc.column() as u32))
        });
        SourceErrorKind::Parse {
            message: e.to_string(),
            line,
            column,
        }
    })
}
