//! Derive macro for the stratum layered configuration library.
//!
//! This crate provides `#[derive(Layered)]`, which lets a struct be filled by
//! the defaults, file and environment passes.
//!
//! # Basic Usage
//!
//! ```ignore
//! use stratum::Layered;
//!
//! #[derive(Default, Layered)]
//! #[config(rename_all = "kebab-case")]
//! struct ServerConfig {
//!     #[config(default = "0.0.0.0", env = "BIND_HOST")]
//!     host: String,
//!
//!     #[config(default = 8080, env = "PORT")]
//!     port: u16,
//!
//!     #[config(key = "tls")]
//!     tls_settings: Option<TlsConfig>,
//!
//!     #[config(skip)]
//!     handle: Option<RuntimeHandle>,
//! }
//! ```
//!
//! The struct needs no serde derive: file layers are fitted onto it field by
//! field, and every nested struct is walked the same way, so a partial table
//! at any depth fills only the keys it names.
//!
//! # Field Attributes
//!
//! - `default = "..."` - Raw value applied when the field is empty. Integer,
//!   float and bool literals are accepted too and stringified.
//! - `env = "VAR"` - Environment variable that overrides the field.
//! - `key = "..."` - Key the field is read from in a file layer.
//! - `skip` - Leave the field alone in every pass. Required for field types
//!   that do not implement `stratum::Field`. Skipped fields need `Default`.
//!
//! `default` and `env` only act on scalars and `Option`s of scalars. On a
//! struct or collection field they are a compile error.
//!
//! # Container Attributes
//!
//! - `rename_all = "..."` - serde-style case rule for file keys.
//!
//! # File Keys
//!
//! A field's file key is `#[config(key)]`, else `#[serde(rename)]`, else the
//! container's `rename_all` (`#[config]` before `#[serde]`), else the field
//! name. Other serde attributes such as `alias` or `flatten` are not read.
//!
//! Every walked field must implement `stratum::Field`: scalars, `String`,
//! `PathBuf`, `Option<T>`, `Vec`, maps, and other `Layered` structs do.

extern crate proc_macro;

mod codegen;
mod derive;
mod parse;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derive `stratum::Layered` and `stratum::Field` for a struct.
///
/// # Example
///
/// ```ignore
/// use stratum::Layered;
///
/// #[derive(Default, Layered)]
/// struct DatabaseConfig {
///     #[config(default = "localhost", env = "DB_HOST")]
///     host: String,
///
///     #[config(default = 5432)]
///     port: u16,
///
///     replica: Option<ReplicaConfig>,
/// }
/// ```
#[proc_macro_derive(Layered, attributes(config))]
pub fn derive_layered(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match derive::derive_layered(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}
