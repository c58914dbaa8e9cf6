//! Leaf values: zero detection and string coercion.
//!
//! A [`Scalar`] is a leaf kind the engine knows how to test for emptiness and
//! how to build from a raw string. Emptiness is "equals the kind's zero
//! value", so an explicit `0`, `false` or `""` is indistinguishable from a
//! value that was never set; later layers will overwrite it.

use std::path::PathBuf;

use crate::error::CoercionError;

/// A leaf kind with a zero value and a string coercion.
pub trait Scalar: Sized + Default {
    /// Name of the kind, used in coercion errors.
    const EXPECTED: &'static str;

    /// Returns true when this value equals the kind's zero value.
    fn is_zero(&self) -> bool;

    /// Parse a raw string into a value of this kind.
    fn parse_raw(raw: &str) -> Result<Self, CoercionError>;
}

/// Coerce `raw` into `slot`.
///
/// The slot is only written after parsing succeeds, so a failed coercion
/// never leaves a half-written leaf behind.
pub fn coerce<S: Scalar>(slot: &mut S, raw: &str) -> Result<(), CoercionError> {
    *slot = S::parse_raw(raw)?;
    Ok(())
}

impl Scalar for bool {
    const EXPECTED: &'static str = "bool";

    fn is_zero(&self) -> bool {
        !*self
    }

    fn parse_raw(raw: &str) -> Result<Self, CoercionError> {
        match raw.to_ascii_lowercase().as_str() {
            "true" | "t" | "1" => Ok(true),
            "false" | "f" | "0" => Ok(false),
            _ => Err(CoercionError::new(
                Self::EXPECTED,
                raw,
                "expected one of true, false, t, f, 1, 0",
            )),
        }
    }
}

macro_rules! numeric_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Scalar for $ty {
                const EXPECTED: &'static str = stringify!($ty);

                fn is_zero(&self) -> bool {
                    *self == <$ty>::default()
                }

                fn parse_raw(raw: &str) -> Result<Self, CoercionError> {
                    let raw = if raw.is_empty() { "0" } else { raw };
                    raw.parse::<$ty>()
                        .map_err(|e| CoercionError::new(Self::EXPECTED, raw, e.to_string()))
                }
            }
        )*
    };
}

numeric_scalar!(i8, i16, i32, i64, i128, isize);
numeric_scalar!(u8, u16, u32, u64, u128, usize);
numeric_scalar!(f32, f64);

impl Scalar for String {
    const EXPECTED: &'static str = "string";

    fn is_zero(&self) -> bool {
        self.is_empty()
    }

    fn parse_raw(raw: &str) -> Result<Self, CoercionError> {
        Ok(raw.to_string())
    }
}

impl Scalar for PathBuf {
    const EXPECTED: &'static str = "path";

    fn is_zero(&self) -> bool {
        self.as_os_str().is_empty()
    }

    fn parse_raw(raw: &str) -> Result<Self, CoercionError> {
        Ok(PathBuf::from(raw))
    }
}
