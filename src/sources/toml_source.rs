//! TOML configuration source.
//!
//! This module provides the `Toml` source for layering a TOML file or string
//! over a target. It supports required/optional files, string content, and
//! parse errors with line and column.
//!
//! # Example
//!
//! ```ignore
//! use stratum::{Chain, Toml};
//!
//! // Load from file (required by default)
//! let chain = Chain::new().source(Toml::file("config.toml"));
//!
//! // Load from optional file
//! let chain = Chain::new().source(Toml::file("config.toml").optional());
//!
//! // Load from string
//! let chain = Chain::new().source(Toml::string(r#"
//!     host = "localhost"
//!     port = 8080
//! "#));
//! ```

use std::path::PathBuf;

use crate::env::ConfigEnv;
use crate::error::{ConfigError, SourceErrorKind};
use crate::field::{Layered, Value};
use crate::source::Source;
use crate::sources::{position_from_offset, FileLayer};

/// TOML configuration source.
///
/// The text is parsed and fitted onto a zero-valued scratch tree of the
/// target type, matching tables to fields by file key. Every non-empty field
/// of the scratch then overwrites the target. Keys missing from the file stay
/// zero in the scratch, so they keep whatever the target already holds.
#[derive(Debug, Clone)]
pub struct Toml {
    layer: FileLayer,
}

impl Toml {
    /// Load TOML from a file path (required by default).
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            layer: FileLayer::file(path),
        }
    }

    /// Load TOML from a string.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use stratum::Toml;
    ///
    /// let source = Toml::string(r#"
    ///     host = "localhost"
    ///     port = 8080
    /// "#);
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

impl<T: Layered> Source<T> for Toml {
    /// File I/O is performed through the `ConfigEnv` trait; decoding happens
    /// after the read completes.
    fn load(&self, target: &mut T, env: &dyn ConfigEnv) -> Result<(), ConfigError> {
        self.layer.load(target, env, parse_toml)
    }

    fn name(&self) -> &str {
        self.layer.name()
    }
}

fn parse_toml(content: &str) -> Result<Value, SourceErrorKind> {
    toml::from_str(content).map_err(|e: toml::de::Error| {
        let (line, column) = e
            .span()
            .map(|span| position_from_offset(content, span.start))
            .map_or((None, None), |(line, column)| (Some(line), Some(column)));

        SourceErrorKind::Parse {
            message: e.message().to_string(),
            line,
            column,
        }
    })
}
