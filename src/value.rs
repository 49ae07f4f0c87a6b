//! Dynamically-typed side of the coercion engine.
//!
//! [`EnvType`] declares what a binding should coerce to, [`EnvValue`] is the
//! coerced result, and [`coerce`] resolves one binding against an
//! [`EnvSource`]. The [`crate::VarSet`] front-end is a thin layer over these.

use crate::coerce::{self, FromEnvStr};
use crate::error::EnvError;
use num_bigint::BigInt;
use std::collections::{BTreeMap, HashMap};
use std::env;

/// A requested target type for one environment binding
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EnvType {
    Bool,
    Int,
    Float,
    Str,
    Bytes,
    List,
    /// Absence of the variable yields [`EnvValue::Absent`] instead of an error
    Optional(Box<EnvType>),
}

impl EnvType {
    pub fn optional(inner: EnvType) -> Self {
        EnvType::Optional(Box::new(inner))
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, EnvType::Optional(_))
    }

    /// Type name used in error messages; optional wrappers report the inner
    /// type, since that is what failed to parse.
    pub fn name(&self) -> &'static str {
        match self {
            EnvType::Bool => "boolean",
            EnvType::Int => "integer",
            EnvType::Float => "float",
            EnvType::Str => "string",
            EnvType::Bytes => "bytes",
            EnvType::List => "list",
            EnvType::Optional(inner) => inner.name(),
        }
    }
}

/// A coerced environment value
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EnvValue {
    Bool(bool),
    Int(BigInt),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    List(Vec<String>),
    /// An optional binding whose name had no environment entry
    Absent,
}

impl EnvValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            EnvValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<&BigInt> {
        match self {
            EnvValue::Int(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            EnvValue::Float(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            EnvValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            EnvValue::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            EnvValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, EnvValue::Absent)
    }
}

/// The result of list coercion in the typed front-end: either parsed
/// bracket-syntax elements or the raw string kept verbatim.
///
/// Unlike every other target type, a string that is not bracket syntax is a
/// valid outcome rather than an error.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EnvList {
    Items(Vec<String>),
    Raw(String),
}

impl EnvList {
    pub fn items(&self) -> Option<&[String]> {
        match self {
            EnvList::Items(items) => Some(items),
            EnvList::Raw(_) => None,
        }
    }

    pub fn raw(&self) -> Option<&str> {
        match self {
            EnvList::Raw(s) => Some(s),
            EnvList::Items(_) => None,
        }
    }
}

impl FromEnvStr for EnvList {
    fn type_name() -> &'static str {
        "list"
    }

    fn from_env_str(raw: &str) -> Result<Self, String> {
        Ok(match coerce::parse_list(raw) {
            Some(items) => EnvList::Items(items),
            None => EnvList::Raw(raw.to_string()),
        })
    }
}

/// A read-only name-to-string mapping to resolve bindings against.
///
/// The process environment is the usual source; map implementations exist so
/// coercion stays testable without touching process state.
pub trait EnvSource {
    fn get(&self, key: &str) -> Option<String>;
}

/// The live process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

impl EnvSource for BTreeMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        BTreeMap::get(self, key).cloned()
    }
}

/// Coerce a raw string to `ty` without any environment lookup.
///
/// Pure and deterministic: the same (raw, type) pair always yields the same
/// result. An optional wrapper is transparent here; presence was already
/// decided by the caller, so the inner rules apply (an empty string coerces
/// by the inner type's rules, it does not become Absent).
pub fn cast_raw(raw: &str, ty: &EnvType) -> Result<EnvValue, String> {
    match ty {
        EnvType::Bool => coerce::parse_bool(raw).map(EnvValue::Bool),
        EnvType::Int => coerce::parse_int(raw).map(EnvValue::Int),
        EnvType::Float => coerce::parse_float(raw).map(EnvValue::Float),
        EnvType::Str => Ok(EnvValue::Str(raw.to_string())),
        EnvType::Bytes => Ok(EnvValue::Bytes(raw.as_bytes().to_vec())),
        EnvType::List => Ok(match coerce::parse_list(raw) {
            Some(items) => EnvValue::List(items),
            None => EnvValue::Str(raw.to_string()),
        }),
        EnvType::Optional(inner) => cast_raw(raw, inner),
    }
}

/// Resolve one binding: look `key` up in `env` and coerce it to `ty`.
///
/// A missing name yields [`EnvValue::Absent`] for optional types and
/// [`EnvError::MissingVar`] otherwise; a present value that fails the type's
/// rules yields [`EnvError::TypeMismatch`].
pub fn coerce<E: EnvSource>(key: &str, ty: &EnvType, env: &E) -> Result<EnvValue, EnvError> {
    match env.get(key) {
        Some(raw) => cast_raw(&raw, ty).map_err(|reason| EnvError::TypeMismatch {
            key: key.to_string(),
            value: raw,
            expected: ty.name().to_string(),
            reason,
            description: String::new(),
            example: None,
        }),
        None if ty.is_optional() => Ok(EnvValue::Absent),
        None => Err(EnvError::MissingVar {
            key: key.to_string(),
            description: String::new(),
            example: None,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn env_of(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_cast_raw_scalars() {
        assert_eq!(cast_raw("yes", &EnvType::Bool), Ok(EnvValue::Bool(true)));
        assert_eq!(
            cast_raw("1_234", &EnvType::Int),
            Ok(EnvValue::Int(BigInt::from(1234)))
        );
        assert_eq!(cast_raw(".5", &EnvType::Float), Ok(EnvValue::Float(0.5)));
        assert_eq!(
            cast_raw("", &EnvType::Str),
            Ok(EnvValue::Str(String::new()))
        );
        assert_eq!(
            cast_raw("foo", &EnvType::Bytes),
            Ok(EnvValue::Bytes(b"foo".to_vec()))
        );
    }

    #[test]
    fn test_cast_raw_list_fallback() {
        assert_eq!(cast_raw("[]", &EnvType::List), Ok(EnvValue::List(vec![])));
        assert_eq!(
            cast_raw("None", &EnvType::List),
            Ok(EnvValue::Str("None".to_string()))
        );
    }

    #[test]
    fn test_cast_raw_optional_is_transparent() {
        let opt_str = EnvType::optional(EnvType::Str);
        assert_eq!(cast_raw("", &opt_str), Ok(EnvValue::Str(String::new())));

        let opt_bool = EnvType::optional(EnvType::Bool);
        assert!(cast_raw("", &opt_bool).is_err());
    }

    #[test]
    fn test_coerce_present() {
        let env = env_of(&[("FOO", "yes")]);
        assert_eq!(
            coerce("FOO", &EnvType::Bool, &env),
            Ok(EnvValue::Bool(true))
        );
    }

    #[test]
    fn test_coerce_missing_required() {
        let env = env_of(&[]);
        let err = coerce("FOO", &EnvType::Str, &env).unwrap_err();
        assert!(matches!(err, EnvError::MissingVar { ref key, .. } if key == "FOO"));
    }

    #[test]
    fn test_coerce_missing_optional_is_absent() {
        let env = env_of(&[("BAR", "unrelated")]);
        assert_eq!(
            coerce("FOO", &EnvType::optional(EnvType::Str), &env),
            Ok(EnvValue::Absent)
        );
    }

    #[test]
    fn test_coerce_mismatch_reports_inner_type() {
        let env = env_of(&[("FOO", "maybe")]);
        let err = coerce("FOO", &EnvType::optional(EnvType::Bool), &env).unwrap_err();
        match err {
            EnvError::TypeMismatch { key, value, expected, .. } => {
                assert_eq!(key, "FOO");
                assert_eq!(value, "maybe");
                assert_eq!(expected, "boolean");
            }
            other => panic!("expected TypeMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_coerce_big_integer_not_truncated() {
        let literal = "11111111111111111111111111111111";
        let env = env_of(&[("FOO", literal)]);
        assert_eq!(
            coerce("FOO", &EnvType::Int, &env),
            Ok(EnvValue::Int(BigInt::from_str(literal).unwrap()))
        );
    }

    #[test]
    fn test_env_value_accessors() {
        assert_eq!(EnvValue::Bool(true).as_bool(), Some(true));
        assert_eq!(EnvValue::Bool(true).as_str(), None);
        assert_eq!(EnvValue::Float(1.5).as_float(), Some(1.5));
        assert_eq!(EnvValue::Str("x".to_string()).as_str(), Some("x"));
        assert_eq!(EnvValue::Bytes(b"x".to_vec()).as_bytes(), Some(&b"x"[..]));
        assert!(EnvValue::Absent.is_absent());
        assert!(!EnvValue::Bool(false).is_absent());
    }

    #[test]
    fn test_env_list_from_env_str_never_fails() {
        assert_eq!(
            EnvList::from_env_str("[a, b]").unwrap(),
            EnvList::Items(vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(
            EnvList::from_env_str("12").unwrap(),
            EnvList::Raw("12".to_string())
        );
    }
}
