//! The recursive walker behind every pass.
//!
//! Each position in a target tree implements [`Field`]. Leaves (scalars,
//! optionals, collections) carry the per-pass leaf action; structs, usually
//! through `#[derive(Layered)]`, forward each pass to their fields in
//! declaration order. The three passes are:
//!
//! | Pass | Acts when | Action |
//! |------|-----------|--------|
//! | [`Field::fill_defaults`] | field is empty | reset to zero, then coerce the `default` annotation |
//! | [`Field::merge_from`] | layer value is non-empty | overwrite (structs recurse instead) |
//! | [`Field::apply_env`] | `env` variable is set and non-empty | coerce, unconditionally |
//!
//! Structs and struct-valued optionals are never tested for emptiness; the
//! walk always descends into them.
//!
//! File layers do not decode straight into the target type. The parsed
//! document is fitted onto a [`Field::zero`] scratch tree with
//! [`Field::decode`], keyed by [`FieldMeta::key`], and the scratch is then
//! merged. Keys absent from the document stay at their zero value in the
//! scratch, whatever the type's `Default` says, so they never win the merge.

use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use tracing::trace;

use crate::env::EnvScope;
use crate::error::{CoercionError, ConfigError, Origin, SourceErrorKind};
use crate::value::{self, Scalar};

/// A parsed file layer, independent of its text format.
pub use serde_json::Value;

/// The tables of a parsed document.
pub type Table = serde_json::Map<String, Value>;

/// Static annotations attached to one struct field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMeta {
    /// Field name as declared in Rust. Coercion error paths use it.
    pub name: &'static str,
    /// Key the field is read from in a file layer. Decode error paths use it.
    pub key: &'static str,
    /// Raw `default` annotation.
    pub default: Option<&'static str>,
    /// Raw `env` annotation (variable name, before any source prefix).
    pub env: Option<&'static str>,
}

impl FieldMeta {
    /// Metadata for the root of a target tree: no name, no annotations.
    pub const ROOT: FieldMeta = FieldMeta::new("");

    /// Metadata with a name and no annotations.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            key: name,
            default: None,
            env: None,
        }
    }

    /// Set the file key.
    pub const fn key(mut self, key: &'static str) -> Self {
        self.key = key;
        self
    }

    /// Set the `default` annotation.
    pub const fn default_value(mut self, raw: &'static str) -> Self {
        self.default = Some(raw);
        self
    }

    /// Set the `env` annotation.
    pub const fn env(mut self, variable: &'static str) -> Self {
        self.env = Some(variable);
        self
    }
}

/// Structural kind of a field position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// A leaf with a zero value and string coercion.
    Scalar,
    /// `Option<T>`: empty when unallocated.
    Optional,
    /// A struct, walked field by field.
    Struct,
    /// A file-decoded collection, replaced wholesale.
    Collection,
}

impl Kind {
    /// Whether `default` and `env` annotations can act on this kind.
    ///
    /// Only scalars can: structs are walked and collections come from file
    /// layers alone.
    pub const fn takes_annotations(self) -> bool {
        matches!(self, Kind::Scalar)
    }
}

/// A position in a target tree that the passes know how to visit.
pub trait Field: Sized {
    /// Structural kind of this position.
    const KIND: Kind;

    /// Kind of the innermost position, looking through `Option`s.
    const BASE_KIND: Kind = Self::KIND;

    /// The zero value of this position: scalar zeros, `None`, empty
    /// collections, and structs made of those.
    ///
    /// Independent of any `Default` impl the type may have.
    fn zero() -> Self;

    /// Returns true when this position holds its kind's zero value.
    ///
    /// Structs always report `false`; passes recurse into them instead.
    fn is_empty(&self) -> bool;

    /// Coerce a raw string into this position.
    ///
    /// Kinds without a string form accept any input and stay unchanged.
    fn coerce(&mut self, _raw: &str) -> Result<(), CoercionError> {
        Ok(())
    }

    /// Defaults pass.
    fn fill_defaults(&mut self, meta: &FieldMeta) -> Result<(), ConfigError>;

    /// Merge pass: take non-empty values from a same-shaped `layer`.
    fn merge_from(&mut self, meta: &FieldMeta, layer: Self);

    /// Overwrite this position with a parsed document value.
    ///
    /// Structs take only the keys present in `value` and leave the rest.
    fn decode(&mut self, meta: &FieldMeta, value: Value) -> Result<(), SourceErrorKind>;

    /// Environment pass.
    fn apply_env(&mut self, meta: &FieldMeta, scope: &EnvScope<'_>) -> Result<(), ConfigError>;
}

/// A struct whose fields can be walked by every pass.
///
/// Implemented by `#[derive(Layered)]`; this is the bound every entry point
/// takes.
pub trait Layered: Field {
    /// Annotations for every walked field, in declaration order.
    const FIELDS: &'static [FieldMeta];
}

/// Run a struct's field walk, prefixing any error path with the struct's own
/// field name.
pub fn nested<F>(meta: &FieldMeta, walk: F) -> Result<(), ConfigError>
where
    F: FnOnce() -> Result<(), ConfigError>,
{
    walk().map_err(|e| e.nested_in(meta.name))
}

/// Like [`nested`] for decoding: prefixes a mismatch path with the struct's
/// file key.
pub fn nested_key<F>(meta: &FieldMeta, walk: F) -> Result<(), SourceErrorKind>
where
    F: FnOnce() -> Result<(), SourceErrorKind>,
{
    walk().map_err(|e| e.nested_in(meta.key))
}

/// The table a struct is decoded from. `null` (an empty document) is an
/// empty table.
pub fn into_table(value: Value) -> Result<Table, SourceErrorKind> {
    match value {
        Value::Object(table) => Ok(table),
        Value::Null => Ok(Table::new()),
        other => Err(SourceErrorKind::mismatch(format!(
            "expected a table, found {}",
            describe(&other)
        ))),
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a table",
    }
}

/// Defaults-pass leaf action shared by every leaf kind.
fn leaf_defaults<F: Field>(slot: &mut F, meta: &FieldMeta) -> Result<(), ConfigError> {
    if !slot.is_empty() {
        return Ok(());
    }
    *slot = F::zero();

    let Some(raw) = meta.default.filter(|raw| !raw.is_empty()) else {
        return Ok(());
    };
    slot.coerce(raw)
        .map_err(|e| ConfigError::coercion(Origin::Default, meta.name, e))?;
    trace!(field = meta.name, default = raw, "applied declared default");
    Ok(())
}

/// Environment-pass leaf action shared by every leaf kind.
fn leaf_env<F: Field>(
    slot: &mut F,
    meta: &FieldMeta,
    scope: &EnvScope<'_>,
) -> Result<(), ConfigError> {
    let Some(name) = meta.env else {
        return Ok(());
    };
    let variable = scope.variable(name);
    let Some(raw) = scope.lookup(&variable) else {
        return Ok(());
    };

    slot.coerce(&raw)
        .map_err(|e| ConfigError::coercion(Origin::Env(variable.clone()), meta.name, e))?;
    trace!(field = meta.name, variable = %variable, "applied environment override");
    Ok(())
}

/// Merge-pass leaf action shared by every leaf kind.
fn leaf_merge<F: Field>(slot: &mut F, meta: &FieldMeta, layer: F) {
    if !layer.is_empty() {
        *slot = layer;
        trace!(field = meta.name, key = meta.key, "merged layer value");
    }
}

/// Decode-pass leaf action: the whole value is deserialized in one go.
fn leaf_decode<F: DeserializeOwned>(
    slot: &mut F,
    meta: &FieldMeta,
    value: Value,
) -> Result<(), SourceErrorKind> {
    *slot = serde_json::from_value(value)
        .map_err(|e| SourceErrorKind::mismatch(e.to_string()).nested_in(meta.key))?;
    Ok(())
}

macro_rules! scalar_field {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Field for $ty {
                const KIND: Kind = Kind::Scalar;

                fn zero() -> Self {
                    <$ty>::default()
                }

                fn is_empty(&self) -> bool {
                    Scalar::is_zero(self)
                }

                fn coerce(&mut self, raw: &str) -> Result<(), CoercionError> {
                    value::coerce(self, raw)
                }

                fn fill_defaults(&mut self, meta: &FieldMeta) -> Result<(), ConfigError> {
                    leaf_defaults(self, meta)
                }

                fn merge_from(&mut self, meta: &FieldMeta, layer: Self) {
                    leaf_merge(self, meta, layer)
                }

                fn decode(&mut self, meta: &FieldMeta, value: Value) -> Result<(), SourceErrorKind> {
                    leaf_decode(self, meta, value)
                }

                fn apply_env(
                    &mut self,
                    meta: &FieldMeta,
                    scope: &EnvScope<'_>,
                ) -> Result<(), ConfigError> {
                    leaf_env(self, meta, scope)
                }
            }
        )*
    };
}

scalar_field!(bool, String, PathBuf);
scalar_field!(i8, i16, i32, i64, i128, isize);
scalar_field!(u8, u16, u32, u64, u128, usize);
scalar_field!(f32, f64);

impl<T: Field> Field for Option<T> {
    const KIND: Kind = Kind::Optional;
    const BASE_KIND: Kind = T::BASE_KIND;

    fn zero() -> Self {
        None
    }

    fn is_empty(&self) -> bool {
        match self {
            None => true,
            // Some(None) still holds nothing.
            Some(inner) => T::KIND == Kind::Optional && inner.is_empty(),
        }
    }

    fn coerce(&mut self, raw: &str) -> Result<(), CoercionError> {
        let mut inner = T::zero();
        inner.coerce(raw)?;
        *self = Some(inner);
        Ok(())
    }

    fn fill_defaults(&mut self, meta: &FieldMeta) -> Result<(), ConfigError> {
        match self {
            None => self.insert(T::zero()).fill_defaults(meta),
            Some(inner) if T::KIND == Kind::Struct => inner.fill_defaults(meta),
            Some(_) => Ok(()),
        }
    }

    fn merge_from(&mut self, meta: &FieldMeta, layer: Self) {
        let Some(incoming) = layer else {
            return;
        };
        if T::KIND == Kind::Struct {
            if let Some(current) = self.as_mut() {
                current.merge_from(meta, incoming);
                return;
            }
        }
        leaf_merge(self, meta, Some(incoming));
    }

    fn decode(&mut self, meta: &FieldMeta, value: Value) -> Result<(), SourceErrorKind> {
        if value.is_null() {
            *self = None;
            return Ok(());
        }
        self.get_or_insert_with(T::zero).decode(meta, value)
    }

    fn apply_env(&mut self, meta: &FieldMeta, scope: &EnvScope<'_>) -> Result<(), ConfigError> {
        if T::KIND == Kind::Struct {
            // Never allocates: only an existing struct is walked.
            return match self {
                Some(inner) => inner.apply_env(meta, scope),
                None => Ok(()),
            };
        }
        leaf_env(self, meta, scope)
    }
}

macro_rules! collection_field {
    ($(impl [$($generics:tt)*] for $ty:ty;)*) => {
        $(
            impl<$($generics)*> Field for $ty {
                const KIND: Kind = Kind::Collection;

                fn zero() -> Self {
                    Self::default()
                }

                fn is_empty(&self) -> bool {
                    self.len() == 0
                }

                fn fill_defaults(&mut self, _meta: &FieldMeta) -> Result<(), ConfigError> {
                    Ok(())
                }

                fn merge_from(&mut self, meta: &FieldMeta, layer: Self) {
                    leaf_merge(self, meta, layer)
                }

                fn decode(&mut self, meta: &FieldMeta, value: Value) -> Result<(), SourceErrorKind> {
                    leaf_decode(self, meta, value)
                }

                fn apply_env(
                    &mut self,
                    _meta: &FieldMeta,
                    _scope: &EnvScope<'_>,
                ) -> Result<(), ConfigError> {
                    Ok(())
                }
            }
        )*
    };
}

collection_field! {
    impl[T: DeserializeOwned] for Vec<T>;
    impl[K: DeserializeOwned + Ord, V: DeserializeOwned] for BTreeMap<K, V>;
    impl[K: DeserializeOwned + Eq + Hash, V: DeserializeOwned, S: BuildHasher + Default] for HashMap<K, V, S>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MockEnv;

    const PORT: FieldMeta = FieldMeta::new("port").default_value("8080").env("PORT");
    const NAME: FieldMeta = FieldMeta::new("name").default_value("svc");
    const BARE: FieldMeta = FieldMeta::new("bare");

    #[test]
    fn test_field_meta_builders() {
        let meta = FieldMeta::new("port").key("Port").env("APP_PORT");
        assert_eq!(meta.name, "port");
        assert_eq!(meta.key, "Port");
        assert_eq!(meta.env, Some("APP_PORT"));
        assert_eq!(meta.default, None);
        assert_eq!(FieldMeta::ROOT.name, "");
    }

    #[test]
    fn test_scalar_defaults_only_when_empty() {
        let mut port = 0u16;
        port.fill_defaults(&PORT).unwrap();
        assert_eq!(port, 8080);

        let mut port = 9000u16;
        port.fill_defaults(&PORT).unwrap();
        assert_eq!(port, 9000);

        let mut bare = 0i32;
        bare.fill_defaults(&BARE).unwrap();
        assert_eq!(bare, 0);
    }

    #[test]
    fn test_empty_default_annotation_is_ignored() {
        const EMPTY: FieldMeta = FieldMeta::new("flag").default_value("");
        let mut flag = false;
        flag.fill_defaults(&EMPTY).unwrap();
        assert!(!flag);
    }

    #[test]
    fn test_scalar_default_coercion_error_names_field() {
        const BAD: FieldMeta = FieldMeta::new("retries").default_value("notanumber");
        let mut retries = 0i32;

        let err = retries.fill_defaults(&BAD).unwrap_err();
        assert_eq!(err.path(), Some("retries"));
        assert!(matches!(
            err,
            ConfigError::Coercion {
                origin: Origin::Default,
                ..
            }
        ));
        assert_eq!(retries, 0);
    }

    #[test]
    fn test_optional_scalar_defaults() {
        let mut port: Option<u16> = None;
        port.fill_defaults(&PORT).unwrap();
        assert_eq!(port, Some(8080));

        // Allocated, even without an annotation.
        let mut bare: Option<String> = None;
        bare.fill_defaults(&BARE).unwrap();
        assert_eq!(bare, Some(String::new()));

        // An allocated zero is not empty.
        let mut port: Option<u16> = Some(0);
        port.fill_defaults(&PORT).unwrap();
        assert_eq!(port, Some(0));
    }

    #[test]
    fn test_optional_emptiness() {
        assert!(None::<i32>.is_empty());
        assert!(!Some(0i32).is_empty());
        assert!(Some(None::<i32>).is_empty());
        assert!(!Some(Some(0i32)).is_empty());
    }

    #[test]
    fn test_scalar_merge_skips_empty_layer() {
        let mut name = "preset".to_string();
        name.merge_from(&NAME, String::new());
        assert_eq!(name, "preset");

        name.merge_from(&NAME, "from-file".to_string());
        assert_eq!(name, "from-file");
    }

    #[test]
    fn test_optional_merge() {
        let mut port = Some(1u16);
        port.merge_from(&PORT, None);
        assert_eq!(port, Some(1));

        port.merge_from(&PORT, Some(0));
        assert_eq!(port, Some(0));

        let mut unset: Option<u16> = None;
        unset.merge_from(&PORT, Some(7));
        assert_eq!(unset, Some(7));
    }

    #[test]
    fn test_env_overrides_unconditionally() {
        let env = MockEnv::new().with_env("PORT", "7");
        let scope = EnvScope::new(&env);

        let mut port = 9000u16;
        port.apply_env(&PORT, &scope).unwrap();
        assert_eq!(port, 7);

        let mut port: Option<u16> = None;
        port.apply_env(&PORT, &scope).unwrap();
        assert_eq!(port, Some(7));
    }

    #[test]
    fn test_env_unset_or_empty_is_ignored() {
        let mut port = 9000u16;
        port.apply_env(&PORT, &EnvScope::new(&MockEnv::new()))
            .unwrap();
        assert_eq!(port, 9000);

        let env = MockEnv::new().with_env("PORT", "");
        let mut port: Option<u16> = None;
        port.apply_env(&PORT, &EnvScope::new(&env)).unwrap();
        assert_eq!(port, None);
    }

    #[test]
    fn test_env_coercion_error_names_variable() {
        let env = MockEnv::new().with_env("APP_PORT", "high");
        let scope = EnvScope::with_prefix(&env, "APP_");

        let mut port = 1u16;
        let err = port.apply_env(&PORT, &scope).unwrap_err();
        assert!(matches!(
            &err,
            ConfigError::Coercion { origin: Origin::Env(var), .. } if var == "APP_PORT"
        ));
        assert_eq!(port, 1);
    }

    #[test]
    fn test_collections_are_left_to_file_layers() {
        const HOSTS: FieldMeta = FieldMeta::new("hosts").default_value("a,b").env("HOSTS");
        let env = MockEnv::new().with_env("HOSTS", "x,y");

        let mut hosts: Vec<String> = Vec::new();
        hosts.fill_defaults(&HOSTS).unwrap();
        hosts.apply_env(&HOSTS, &EnvScope::new(&env)).unwrap();
        assert!(hosts.is_empty());

        hosts.merge_from(&HOSTS, vec!["db1".to_string()]);
        assert_eq!(hosts, vec!["db1".to_string()]);

        hosts.merge_from(&HOSTS, Vec::new());
        assert_eq!(hosts, vec!["db1".to_string()]);

        let mut limits: HashMap<String, u32> = HashMap::new();
        assert!(Field::is_empty(&limits));
        limits.insert("a".to_string(), 1);
        assert!(!Field::is_empty(&limits));
    }

    #[test]
    fn test_nested_prefixes_error_path() {
        const SERVER: FieldMeta = FieldMeta::new("server");
        const BAD: FieldMeta = FieldMeta::new("port").default_value("x");

        let mut port = 0u16;
        let err = nested(&SERVER, || port.fill_defaults(&BAD)).unwrap_err();
        assert_eq!(err.path(), Some("server.port"));

        let mut port = 0u16;
        let err = nested(&FieldMeta::ROOT, || port.fill_defaults(&BAD)).unwrap_err();
        assert_eq!(err.path(), Some("port"));
    }

    #[test]
    fn test_base_kind_looks_through_options() {
        assert_eq!(<Option<Option<u8>> as Field>::KIND, Kind::Optional);
        assert_eq!(<Option<Option<u8>> as Field>::BASE_KIND, Kind::Scalar);
        assert_eq!(<Option<Vec<u8>> as Field>::BASE_KIND, Kind::Collection);
        assert!(Kind::Scalar.takes_annotations());
        assert!(!Kind::Collection.takes_annotations());
        assert!(!Kind::Struct.takes_annotations());
    }

    #[test]
    fn test_leaf_decode_overwrites_with_zero() {
        let mut port = 9000u16;
        port.decode(&PORT, serde_json::json!(0)).unwrap();
        assert_eq!(port, 0);

        let mut ratio = 0.0f64;
        ratio.decode(&BARE, serde_json::json!(3)).unwrap();
        assert_eq!(ratio, 3.0);
    }

    #[test]
    fn test_leaf_decode_mismatch_names_key() {
        const TIMEOUT: FieldMeta = FieldMeta::new("timeout").key("timeout-secs");

        let mut timeout = 5u64;
        let err = timeout
            .decode(&TIMEOUT, serde_json::json!("soon"))
            .unwrap_err();
        assert!(matches!(
            &err,
            SourceErrorKind::Mismatch { path, .. } if path == "timeout-secs"
        ));
        assert_eq!(timeout, 5);
    }

    #[test]
    fn test_optional_decode() {
        let mut port: Option<u16> = Some(1);
        port.decode(&PORT, Value::Null).unwrap();
        assert_eq!(port, None);

        port.decode(&PORT, serde_json::json!(0)).unwrap();
        assert_eq!(port, Some(0));
        assert!(!port.is_empty());
    }

    #[test]
    fn test_collection_decode_and_zero() {
        const HOSTS: FieldMeta = FieldMeta::new("hosts");

        let mut hosts: Vec<String> = Field::zero();
        assert!(hosts.is_empty());
        hosts.decode(&HOSTS, serde_json::json!(["a", "b"])).unwrap();
        assert_eq!(hosts, vec!["a".to_string(), "b".to_string()]);

        let mut limits: BTreeMap<String, u32> = Field::zero();
        limits.decode(&HOSTS, serde_json::json!({"x": 1})).unwrap();
        assert_eq!(limits.get("x"), Some(&1));
    }

    #[test]
    fn test_into_table() {
        assert!(into_table(Value::Null).unwrap().is_empty());
        assert_eq!(into_table(serde_json::json!({"a": 1})).unwrap().len(), 1);

        let err = into_table(serde_json::json!([1])).unwrap_err();
        assert_eq!(err.to_string(), "invalid value: expected a table, found an array");
    }

    #[test]
    fn test_nested_key_prefixes_decode_path() {
        const SERVER: FieldMeta = FieldMeta::new("server_settings").key("server");

        let mut port = 0u16;
        let err = nested_key(&SERVER, || port.decode(&PORT, serde_json::json!("x"))).unwrap_err();
        assert!(matches!(
            err,
            SourceErrorKind::Mismatch { ref path, .. } if path == "server.port"
        ));
    }
}
