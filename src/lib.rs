// Allow large error types - coercion errors carry the rejected input
#![allow(clippy::result_large_err)]

//! Stratum: layered configuration for plain Rust structs.
//!
//! Declare one struct shape and have it filled from declared defaults, an
//! in-memory preset, a configuration file, and environment variables, with a
//! fixed precedence and no per-field glue code.
//!
//! # Core Concepts
//!
//! - **Passes**: each source is one recursive walk over the target that
//!   mutates it in place.
//! - **Emptiness**: a field holding its type's zero value (or `None`) is
//!   "unset" and may be filled by a later layer.
//! - **Precedence**: environment > file > caller-supplied value > declared
//!   default > zero value, when run in the standard order.
//! - **Testable I/O**: file reads and variable lookups go through
//!   [`ConfigEnv`], so tests use [`MockEnv`].
//!
//! # Quick Start
//!
//! ```ignore
//! use stratum::Layered;
//!
//! #[derive(Debug, Default, Layered)]
//! struct Server {
//!     #[config(default = "localhost", env = "SERVER_HOST")]
//!     host: String,
//!     #[config(default = 8080, env = "SERVER_PORT")]
//!     port: u16,
//! }
//!
//! #[derive(Debug, Default, Layered)]
//! struct AppConfig {
//!     server: Server,
//!     #[config(key = "log-level", default = "info", env = "LOG_LEVEL")]
//!     log_level: String,
//! }
//!
//! fn main() -> Result<(), stratum::ConfigError> {
//!     let mut config = AppConfig::default();
//!     stratum::load_all("config.toml", &mut config)?;
//!     println!("listening on {}:{}", config.server.host, config.server.port);
//!     Ok(())
//! }
//! ```
//!
//! # Custom Chains
//!
//! ```ignore
//! use stratum::{Chain, Defaults, Env, Preset, Toml};
//!
//! let chain = Chain::new()
//!     .source(Defaults)
//!     .source(Preset::from(site_overrides()))
//!     .source(Toml::file("/etc/app/config.toml").optional())
//!     .source(Toml::file("config.toml").optional())
//!     .source(Env::prefix("APP_"));
//!
//! let mut config = AppConfig::default();
//! chain.load(&mut config)?;
//! ```
//!
//! Sources run in insertion order; moving a source changes which layer wins.
//! The first failing source stops the chain and its error is returned
//! unchanged.
//!
//! # File Layers
//!
//! A file is parsed into a format-neutral document and fitted onto a zero
//! scratch value of the target type (see [`Field::zero`]), matching tables to
//! struct fields by file key. Only keys present in the file can become
//! non-empty in the scratch, so a key the file leaves out never overrides the
//! target, whatever the target type's `Default` holds. Nested structs need no
//! serde attributes: a partial table fills only the keys it names.
//!
//! `default` and `env` only act on scalars and optional scalars. Putting
//! them on a struct or collection field fails to compile:
//!
//! ```compile_fail
//! use stratum::Layered;
//!
//! #[derive(Default, Layered)]
//! struct Tls {
//!     cert: String,
//! }
//!
//! #[derive(Default, Layered)]
//! struct Server {
//!     #[config(env = "SERVER_TLS")]
//!     tls: Tls,
//! }
//! ```
//!
//! # Limitations
//!
//! An explicit `0`, `false` or `""` cannot be told apart from "unset": a
//! later layer will overwrite it. Use `Option<T>` for fields where the zero
//! value is meaningful.
//!
//! # Module Structure
//!
//! - [`field`]: the [`Field`] walker contract and [`Layered`]
//! - [`value`]: zero detection and string coercion for leaf values
//! - [`source`]: the [`Source`] trait
//! - [`sources`]: built-in sources
//! - [`chain`]: ordered source chains
//! - [`mod@env`]: `ConfigEnv` trait and `MockEnv` for testing
//! - [`error`]: error types

// Lets derived code refer to `::stratum` from inside this crate's own tests.
extern crate self as stratum;

pub mod chain;
pub mod env;
pub mod error;
pub mod field;
pub mod prelude;
pub mod source;
pub mod sources;
pub mod value;

pub use chain::Chain;
pub use env::{ConfigEnv, EnvScope, MockEnv, RealEnv};
pub use error::{CoercionError, ConfigError, Origin, SourceErrorKind};
pub use field::{Field, FieldMeta, Kind, Layered};
pub use source::Source;
pub use value::Scalar;

// Re-export sources
pub use sources::{Defaults, Env, Preset};
#[cfg(feature = "json")]
pub use sources::Json;
#[cfg(feature = "toml")]
pub use sources::Toml;
#[cfg(feature = "yaml")]
pub use sources::Yaml;

// Re-export derive macro when the feature is enabled
#[cfg(feature = "derive")]
pub use stratum_derive::Layered;

/// Run only the defaults pass over `target`.
pub fn load_defaults<T: Layered>(target: &mut T) -> Result<(), ConfigError> {
    load_defaults_with_env(target, &RealEnv::new())
}

/// [`load_defaults`] with a custom environment.
pub fn load_defaults_with_env<T: Layered>(
    target: &mut T,
    env: &dyn ConfigEnv,
) -> Result<(), ConfigError> {
    Defaults.load(target, env)
}

/// Fit a TOML file onto a zero scratch value and merge it into `target`.
///
/// Keys absent from the file keep the value `target` already holds.
#[cfg(feature = "toml")]
pub fn load_from_file<T: Layered>(
    path: impl AsRef<std::path::Path>,
    target: &mut T,
) -> Result<(), ConfigError> {
    load_from_file_with_env(path, target, &RealEnv::new())
}

/// [`load_from_file`] with a custom environment.
#[cfg(feature = "toml")]
pub fn load_from_file_with_env<T: Layered>(
    path: impl AsRef<std::path::Path>,
    target: &mut T,
    env: &dyn ConfigEnv,
) -> Result<(), ConfigError> {
    Toml::file(path.as_ref()).load(target, env)
}

/// Run only the environment pass over `target`, with exact variable names.
pub fn load_from_env<T: Layered>(target: &mut T) -> Result<(), ConfigError> {
    load_from_env_with_env(target, &RealEnv::new())
}

/// [`load_from_env`] with a custom environment.
pub fn load_from_env_with_env<T: Layered>(
    target: &mut T,
    env: &dyn ConfigEnv,
) -> Result<(), ConfigError> {
    Env::new().load(target, env)
}

/// Run the standard chain: defaults, then the TOML file at `path`, then the
/// environment.
#[cfg(feature = "toml")]
pub fn load_all<T: Layered>(
    path: impl AsRef<std::path::Path>,
    target: &mut T,
) -> Result<(), ConfigError> {
    load_all_with_env(path, target, &RealEnv::new())
}

/// [`load_all`] with a custom environment.
#[cfg(feature = "toml")]
pub fn load_all_with_env<T: Layered>(
    path: impl AsRef<std::path::Path>,
    target: &mut T,
    env: &dyn ConfigEnv,
) -> Result<(), ConfigError> {
    Chain::standard(path.as_ref()).load_with_env(target, env)
}
