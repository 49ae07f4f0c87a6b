use std::ops::Deref;

/// A loaded environment binding with its metadata and coerced value
// Keys and descriptions are &'static str, so only Serialize can be derived
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EnvField<T> {
    /// Environment variable key
    pub key: &'static str,
    /// Human-readable description of what this binding controls
    pub description: &'static str,
    /// Default value for optional bindings; shown as the example when required
    pub default: T,
    /// Whether this binding is required (true) or optional with a default (false)
    pub required: bool,
    /// The coerced value
    pub value: T,
}

impl<T> EnvField<T> {
    pub fn required(key: &'static str, description: &'static str, example: T, value: T) -> Self {
        Self {
            key,
            description,
            default: example,
            required: true,
            value,
        }
    }

    pub fn optional(key: &'static str, description: &'static str, default: T, value: T) -> Self {
        Self {
            key,
            description,
            default,
            required: false,
            value,
        }
    }
}

// Allow using EnvField<T> as &T without writing .value
impl<T> Deref for EnvField<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.value
    }
}

impl<T> AsRef<T> for EnvField<T> {
    fn as_ref(&self) -> &T {
        &self.value
    }
}
