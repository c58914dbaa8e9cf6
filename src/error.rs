//! Error types for the stratum configuration library.
//!
//! Two things can go wrong while filling a target: a raw string (from a
//! `default` annotation or an environment variable) fails to convert into the
//! field's type, or a file layer cannot be read, parsed, or fitted onto the
//! target's shape. Both surface as a [`ConfigError`]; a pass stops at the
//! first one.

use std::fmt;

use thiserror::Error;

/// A raw string could not be converted into a field's declared type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected {expected}, got \"{value}\": {reason}")]
pub struct CoercionError {
    /// Human readable name of the target kind (e.g. "i32", "bool").
    pub expected: &'static str,
    /// The rejected input.
    pub value: String,
    /// Why the input was rejected.
    pub reason: String,
}

impl CoercionError {
    /// Create a coercion error for the given kind and input.
    pub fn new(expected: &'static str, value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            expected,
            value: value.into(),
            reason: reason.into(),
        }
    }
}

/// The annotation a raw string came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// A `#[config(default = "...")]` annotation.
    Default,
    /// A `#[config(env = "...")]` annotation, resolved to this variable name.
    Env(String),
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Default => write!(f, "default"),
            Origin::Env(var) => write!(f, "env:{}", var),
        }
    }
}

/// Kinds of file layer failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceErrorKind {
    /// Source file was not found
    NotFound { path: String },
    /// Source file could not be read
    Io { message: String },
    /// Source content could not be decoded into the target shape
    Parse {
        message: String,
        line: Option<u32>,
        column: Option<u32>,
    },
    /// A parsed value does not fit the field it is keyed to
    Mismatch {
        /// Dotted file-key path of the offending value, empty for the root.
        path: String,
        message: String,
    },
}

impl SourceErrorKind {
    /// A mismatch at the current position; enclosing structs fill in the path.
    pub fn mismatch(message: impl Into<String>) -> Self {
        SourceErrorKind::Mismatch {
            path: String::new(),
            message: message.into(),
        }
    }

    /// Prefix a mismatch path with the file key of the table containing it.
    pub fn nested_in(self, parent: &str) -> Self {
        match self {
            SourceErrorKind::Mismatch { path, message } if !parent.is_empty() => {
                let path = if path.is_empty() {
                    parent.to_string()
                } else {
                    format!("{}.{}", parent, path)
                };
                SourceErrorKind::Mismatch { path, message }
            }
            other => other,
        }
    }
}

impl fmt::Display for SourceErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceErrorKind::NotFound { path } => write!(f, "file not found: {}", path),
            SourceErrorKind::Io { message } => write!(f, "I/O error: {}", message),
            SourceErrorKind::Parse {
                message,
                line,
                column,
            } => {
                write!(f, "parse error: {}", message)?;
                if let Some(l) = line {
                    write!(f, " at line {}", l)?;
                    if let Some(c) = column {
                        write!(f, ", column {}", c)?;
                    }
                }
                Ok(())
            }
            SourceErrorKind::Mismatch { path, message } if path.is_empty() => {
                write!(f, "invalid value: {}", message)
            }
            SourceErrorKind::Mismatch { path, message } => {
                write!(f, "invalid value for '{}': {}", path, message)
            }
        }
    }
}

/// Errors returned by a pass, a source, or a chain.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// A default or environment value did not coerce into the field's type.
    #[error("[{origin}] '{path}': {source}")]
    Coercion {
        origin: Origin,
        /// Dotted path of the offending field from the root of the target.
        path: String,
        #[source]
        source: CoercionError,
    },

    /// A file layer failed to load or decode.
    #[error("{source_name}: {kind}")]
    Decode {
        source_name: String,
        kind: SourceErrorKind,
    },
}

impl ConfigError {
    /// Build a coercion error for a single field.
    pub fn coercion(origin: Origin, field: &str, source: CoercionError) -> Self {
        ConfigError::Coercion {
            origin,
            path: field.to_string(),
            source,
        }
    }

    /// Build a decode error for a named source.
    pub fn decode(source_name: impl Into<String>, kind: SourceErrorKind) -> Self {
        ConfigError::Decode {
            source_name: source_name.into(),
            kind,
        }
    }

    /// The dotted field path this error relates to, if any.
    pub fn path(&self) -> Option<&str> {
        match self {
            ConfigError::Coercion { path, .. } => Some(path),
            ConfigError::Decode {
                kind: SourceErrorKind::Mismatch { path, .. },
                ..
            } => Some(path),
            ConfigError::Decode { .. } => None,
        }
    }

    /// Check if this is a coercion error.
    pub fn is_coercion(&self) -> bool {
        matches!(self, ConfigError::Coercion { .. })
    }

    /// Prefix the field path with the name of the struct field containing it.
    ///
    /// An empty `parent` (the root of the target) leaves the path unchanged.
    pub fn nested_in(self, parent: &str) -> Self {
        match self {
            ConfigError::Coercion {
                origin,
                path,
                source,
            } if !parent.is_empty() => ConfigError::Coercion {
                origin,
                path: format!("{}.{}", parent, path),
                source,
            },
            other => other,
        }
    }
}
