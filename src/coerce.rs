//! Scalar coercion rules: raw environment string in, typed value out.
//!
//! Every front-end in this crate funnels through the parsers here, so the
//! rules stay identical whether a value is loaded into a struct field, a
//! [`crate::VarSet`] constant, or through the free helper functions.

use num_bigint::BigInt;
use std::str::FromStr;

/// Strings recognized as `true`, compared case-insensitively
pub const TRUTHY: [&str; 4] = ["true", "yes", "y", "on"];
/// Strings recognized as `false`, compared case-insensitively
pub const FALSY: [&str; 4] = ["false", "no", "n", "off"];

/// Conversion from a raw environment string, with the coercion rules this
/// crate guarantees (boolean vocabularies, underscore separators in numeric
/// literals, leading zeros without octal semantics).
///
/// This is the typed sibling of [`FromStr`]; the error is a human-readable
/// reason that ends up inside [`crate::EnvError::TypeMismatch`].
pub trait FromEnvStr: Sized {
    /// Name of the target type as shown in error messages
    fn type_name() -> &'static str;

    /// Coerce `raw` into `Self`, or explain why it cannot be done
    fn from_env_str(raw: &str) -> Result<Self, String>;
}

/// Parse a boolean from the truthy/falsy vocabularies.
///
/// Matching is case-insensitive but exact otherwise: surrounding whitespace
/// is not trimmed, so `" true"` is a mismatch.
pub fn parse_bool(raw: &str) -> Result<bool, String> {
    let folded = raw.to_lowercase();
    if TRUTHY.contains(&folded.as_str()) {
        return Ok(true);
    }
    if FALSY.contains(&folded.as_str()) {
        return Ok(false);
    }
    Err(format!("'{}' is not in the boolean vocabulary", raw))
}

/// Remove underscore separators from a numeric token.
///
/// An underscore is only valid directly between two digits; anything else
/// (`"_1"`, `"1_"`, `"1__2"`, `"1_.2"`) is rejected.
fn strip_separators(token: &str) -> Result<String, String> {
    let bytes = token.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        if b != b'_' {
            continue;
        }
        let digit_before = i > 0 && bytes[i - 1].is_ascii_digit();
        let digit_after = bytes.get(i + 1).is_some_and(|c| c.is_ascii_digit());
        if !digit_before || !digit_after {
            return Err(format!(
                "'{}' has an underscore separator that is not between digits",
                token
            ));
        }
    }
    Ok(token.replace('_', ""))
}

/// Parse an arbitrary-precision base-10 integer.
///
/// Underscore separators are stripped, leading zeros are permitted and never
/// mean octal, and an optional sign prefix is accepted. Surrounding
/// whitespace is ignored.
pub fn parse_int(raw: &str) -> Result<BigInt, String> {
    let cleaned = strip_separators(raw.trim())?;
    BigInt::from_str(&cleaned)
        .map_err(|_| format!("'{}' is not a base-10 integer literal", raw))
}

/// Parse a finite `f64` from a decimal or scientific-notation literal.
///
/// Underscore separators are permitted inside the integer, fractional, and
/// exponent digit runs. Word forms (`inf`, `nan`) and literals that overflow
/// to infinity are rejected.
pub fn parse_float(raw: &str) -> Result<f64, String> {
    let cleaned = strip_separators(raw.trim())?;
    let literal_chars = cleaned
        .bytes()
        .all(|b| matches!(b, b'0'..=b'9' | b'.' | b'e' | b'E' | b'+' | b'-'));
    if cleaned.is_empty() || !literal_chars {
        return Err(format!("'{}' is not a floating-point literal", raw));
    }
    let value = f64::from_str(&cleaned)
        .map_err(|_| format!("'{}' is not a floating-point literal", raw))?;
    if !value.is_finite() {
        return Err(format!("'{}' does not resolve to a finite value", raw));
    }
    Ok(value)
}

/// Parse a bracketed, comma-separated list into its element strings.
///
/// Returns `None` when the raw string is not bracket syntax at all; callers
/// treat that as "keep the raw string", never as an error. Elements are
/// trimmed, surrounding single or double quotes are stripped, and empty
/// elements (including the one produced by a trailing comma) are discarded.
pub fn parse_list(raw: &str) -> Option<Vec<String>> {
    let inner = raw.trim().strip_prefix('[')?.strip_suffix(']')?;
    let mut items = Vec::new();
    for piece in inner.split(',') {
        let mut item = piece.trim();
        let bytes = item.as_bytes();
        if bytes.len() > 1 {
            let first = bytes[0];
            let last = bytes[bytes.len() - 1];
            if first == last && (first == b'\'' || first == b'"') {
                item = &item[1..item.len() - 1];
            }
        }
        if !item.is_empty() {
            items.push(item.to_string());
        }
    }
    Some(items)
}

impl FromEnvStr for bool {
    fn type_name() -> &'static str {
        "boolean"
    }

    fn from_env_str(raw: &str) -> Result<Self, String> {
        parse_bool(raw)
    }
}

impl FromEnvStr for String {
    fn type_name() -> &'static str {
        "string"
    }

    fn from_env_str(raw: &str) -> Result<Self, String> {
        Ok(raw.to_string())
    }
}

impl FromEnvStr for Vec<u8> {
    fn type_name() -> &'static str {
        "bytes"
    }

    fn from_env_str(raw: &str) -> Result<Self, String> {
        Ok(raw.as_bytes().to_vec())
    }
}

impl FromEnvStr for BigInt {
    fn type_name() -> &'static str {
        "integer"
    }

    fn from_env_str(raw: &str) -> Result<Self, String> {
        parse_int(raw)
    }
}

impl FromEnvStr for f64 {
    fn type_name() -> &'static str {
        "float"
    }

    fn from_env_str(raw: &str) -> Result<Self, String> {
        parse_float(raw)
    }
}

impl FromEnvStr for f32 {
    fn type_name() -> &'static str {
        "float"
    }

    fn from_env_str(raw: &str) -> Result<Self, String> {
        let wide = parse_float(raw)?;
        let value = wide as f32;
        if !value.is_finite() {
            return Err(format!("'{}' does not fit in a 32-bit float", raw));
        }
        Ok(value)
    }
}

// Fixed-width integers share the integer literal syntax; values outside the
// type's range are a mismatch, not a wrap.
macro_rules! impl_from_env_str_int {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FromEnvStr for $ty {
                fn type_name() -> &'static str {
                    stringify!($ty)
                }

                fn from_env_str(raw: &str) -> Result<Self, String> {
                    let cleaned = strip_separators(raw.trim())?;
                    <$ty>::from_str(&cleaned).map_err(|_| {
                        format!(
                            "'{}' is not a {} (base-10, within range)",
                            raw,
                            stringify!($ty)
                        )
                    })
                }
            }
        )*
    };
}

impl_from_env_str_int!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
