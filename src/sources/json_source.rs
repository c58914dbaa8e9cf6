//! JSON configuration source.
//!
//! This module provides the `Json` source for layering a JSON file or string
//! over a target. It supports required/optional files, string content, and
//! parse errors with line and column.
//!
//! # Example
//!
//! ```ignore
//! use stratum::{Chain, Json};
//!
//! // Load from file (required by default)
//! let chain = Chain::new().source(Json::file("config.json"));
//!
//! // Load from optional file
//! let chain = Chain::new().source(Json::file("config.json").optional());
//!
//! // Load from string
//! let chain = Chain::new().source(Json::string(r#"{"host": "localhost", "port": 8080}"#));
//! ```

use std::path::PathBuf;

use crate::env::ConfigEnv;
use crate::error::{ConfigError, SourceErrorKind};
use crate::field::{Layered, Value};
use crate::source::Source;
use crate::sources::FileLayer;

/// JSON configuration source.
///
/// Same layering as [`Toml`](crate::Toml): the parsed object is fitted onto a
/// zero scratch tree by file key, then merged.
#[derive(Debug, Clone)]
pub struct Json {
    layer: FileLayer,
}

impl Json {
    /// Load JSON from a file path (required by default).
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            layer: FileLayer::file(path),
        }
    }

    /// Load JSON from a string.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use stratum::Json;
    ///
    /// let source = Json::string(r#"{"host": "localhost", "port": 8080}"#);
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

impl<T: Layered> Source<T> for Json {
    /// File I/O is performed through the `ConfigEnv` trait; decoding happens
    /// after the read completes.
    fn load(&self, target: &mut T, env: &dyn ConfigEnv) -> Result<(), ConfigError> {
        self.layer.load(target, env, parse_json)
    }

    fn name(&self) -> &str {
        self.layer.name()
    }
}

fn parse_json(content: &str) -> Result<Value, SourceErrorKind> {
    // serde_json errors include line/column
    serde_json::from_str(content).map_err(|e: serde_json::Error| SourceErrorKind::Parse {
        message: e.to_string(),
        line: Some(e.line() as u32),
        column: Some(e.column() as u32),
    })
}
