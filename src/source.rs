//! The `Source` trait.
//!
//! A source is one named pass over a target. Built-in sources live in
//! [`crate::sources`]; a [`Chain`](crate::Chain) applies several of them in
//! order.

use crate::env::ConfigEnv;
use crate::error::ConfigError;
use crate::field::{FieldMeta, Layered};

/// A named provider of values for targets of type `T`.
///
/// # Example
///
/// ```ignore
/// use stratum::{ConfigEnv, ConfigError, Source};
///
/// struct Banner;
///
/// impl Source<AppConfig> for Banner {
///     fn load(&self, target: &mut AppConfig, _env: &dyn ConfigEnv) -> Result<(), ConfigError> {
///         if target.banner.is_empty() {
///             target.banner = "hello".to_string();
///         }
///         Ok(())
///     }
///
///     fn name(&self) -> &str {
///         "banner"
///     }
/// }
/// ```
pub trait Source<T>: Send + Sync {
    /// Apply this source to `target`, mutating it in place.
    ///
    /// The `ConfigEnv` parameter enables dependency injection for testing.
    /// In production, use `RealEnv`; in tests, use `MockEnv`.
    fn load(&self, target: &mut T, env: &dyn ConfigEnv) -> Result<(), ConfigError>;

    /// Human-readable name of this source for logs and error messages.
    fn name(&self) -> &str;
}

impl<T, S: Source<T> + ?Sized> Source<T> for Box<S> {
    fn load(&self, target: &mut T, env: &dyn ConfigEnv) -> Result<(), ConfigError> {
        (**self).load(target, env)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Merge a decoded scratch tree into `target`.
///
/// Shared by every source that produces a whole same-shaped value (file
/// layers and presets).
pub(crate) fn merge_layer<T: Layered>(target: &mut T, layer: T) {
    target.merge_from(&FieldMeta::ROOT, layer);
}
