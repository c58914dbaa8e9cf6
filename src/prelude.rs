//! Convenient re-exports for common stratum usage.
//!
//! ```ignore
//! use stratum::prelude::*;
//!
//! let mut config = AppConfig::default();
//! Chain::new()
//!     .source(Defaults)
//!     .source(Toml::file("config.toml").optional())
//!     .source(Env::prefix("APP_"))
//!     .load(&mut config)?;
//! ```

pub use crate::chain::Chain;
pub use crate::env::{ConfigEnv, MockEnv, RealEnv};
pub use crate::error::{ConfigError, SourceErrorKind};
pub use crate::field::{Field, Layered};
pub use crate::source::Source;
pub use crate::sources::{Defaults, Env, Preset};

#[cfg(feature = "json")]
pub use crate::sources::Json;
#[cfg(feature = "toml")]
pub use crate::sources::Toml;
#[cfg(feature = "yaml")]
pub use crate::sources::Yaml;

#[cfg(feature = "derive")]
pub use stratum_derive::Layered;
