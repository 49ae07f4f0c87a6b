use crate::coerce::FromEnvStr;
use crate::error::EnvError;
use crate::field::EnvField;
use colored::Colorize;
use std::{env, fmt, fs, path::Path};

/// Metadata about one registered binding, kept for documentation generation
#[derive(Debug, Clone)]
pub struct BindingMeta {
    /// Environment variable key
    pub key: String,
    /// Human-readable description
    pub description: String,
    /// Default or example value as a string
    pub default_str: String,
    /// Whether this binding is required
    pub required: bool,
}

/// Look up `key` in the process environment and coerce it into `T`.
///
/// The single lookup-and-coerce step every other helper builds on.
pub fn env_cast<'a, T: FromEnvStr>(
    key: &str,
    description: &str,
    example: impl Into<Option<&'a str>>,
) -> Result<T, EnvError> {
    let example = example.into();
    match env::var(key) {
        Ok(raw) => match T::from_env_str(&raw) {
            Ok(value) => Ok(value),
            Err(reason) => Err(EnvError::TypeMismatch {
                key: key.to_string(),
                value: raw,
                expected: T::type_name().to_string(),
                reason,
                description: description.to_string(),
                example: example.map(|s| s.to_string()),
            }),
        },
        Err(_) => Err(EnvError::MissingVar {
            key: key.to_string(),
            description: description.to_string(),
            example: example.map(|s| s.to_string()),
        }),
    }
}

/// Load a required environment variable, erroring if missing or invalid
pub fn env_required<T: FromEnvStr + fmt::Display + Clone>(
    key: &'static str,
    description: &'static str,
    example: T,
) -> Result<T, EnvError> {
    let example_str = example.to_string();
    env_cast(key, description, example_str.as_str())
}

/// Load an environment variable with a fallback default.
///
/// The default is used only when the variable is missing; a present but
/// malformed value is still an error.
pub fn env_or_default<T: FromEnvStr + fmt::Display + Clone>(
    key: &'static str,
    description: &'static str,
    default: T,
) -> Result<T, EnvError> {
    let default_str = default.to_string();
    match env_cast(key, description, default_str.as_str()) {
        Ok(value) => Ok(value),
        Err(EnvError::MissingVar { .. }) => Ok(default),
        Err(e) => Err(e),
    }
}

/// Load an optional environment variable, yielding None when missing.
///
/// Returns Ok(None) if the variable is not set, Ok(Some(value)) if it is set
/// and coerces, and Err if it is set but malformed. Note that an empty string
/// is "set": it coerces by T's rules rather than becoming None.
pub fn env_or_option<T: FromEnvStr>(
    key: &'static str,
    description: &'static str,
    example: impl Into<Option<&'static str>>,
) -> Result<Option<T>, EnvError> {
    match env_cast(key, description, example.into()) {
        Ok(value) => Ok(Some(value)),
        Err(EnvError::MissingVar { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Helper to format multiple loading errors into a panic message
pub fn format_env_errors(errors: &[EnvError]) -> String {
    let error_summary = errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Environment loading failed with {} error(s):\n{}",
        errors.len().to_string().yellow().bold(),
        error_summary
    )
}

/// A builder for populating a record from the environment, collecting errors
/// instead of bailing on the first one.
///
/// # Example
/// ```rust
/// use envcast::EnvBuilder;
///
/// let mut builder = EnvBuilder::new();
/// let port = builder.or_default::<u16>("PORT", "Server port", 8080);
///
/// builder.validate().ok();
/// ```
pub struct EnvBuilder {
    errors: Vec<EnvError>,
    bindings: Vec<BindingMeta>,
}

impl EnvBuilder {
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            bindings: Vec::new(),
        }
    }

    /// Load a required binding, collecting the error if it fails
    pub fn required<T: FromEnvStr + fmt::Display + Clone>(
        &mut self,
        key: &'static str,
        description: &'static str,
        example: T,
    ) -> Option<EnvField<T>> {
        self.bindings.push(BindingMeta {
            key: key.to_string(),
            description: description.to_string(),
            default_str: example.to_string(),
            required: true,
        });

        match env_required(key, description, example.clone()) {
            Ok(value) => Some(EnvField::required(key, description, example, value)),
            Err(e) => {
                self.errors.push(e);
                None
            }
        }
    }

    /// Load a binding, falling back to `default` when the variable is missing.
    ///
    /// Returns None and collects the error if the variable exists but is
    /// malformed.
    pub fn or_default<T: FromEnvStr + fmt::Display + Clone>(
        &mut self,
        key: &'static str,
        description: &'static str,
        default: T,
    ) -> Option<EnvField<T>> {
        self.bindings.push(BindingMeta {
            key: key.to_string(),
            description: description.to_string(),
            default_str: default.to_string(),
            required: false,
        });

        match env_or_default(key, description, default.clone()) {
            Ok(value) => Some(EnvField::optional(key, description, default, value)),
            Err(e) => {
                self.errors.push(e);
                None
            }
        }
    }

    /// Load an optional binding whose value may be None.
    ///
    /// A missing variable yields a field holding None; a present variable is
    /// coerced, with malformed values collected as errors.
    pub fn optional<T: FromEnvStr>(
        &mut self,
        key: &'static str,
        description: &'static str,
        example: impl Into<Option<&'static str>>,
    ) -> Option<EnvField<Option<T>>> {
        let example = example.into();

        self.bindings.push(BindingMeta {
            key: key.to_string(),
            description: description.to_string(),
            default_str: example.unwrap_or("").to_string(),
            required: false,
        });

        match env_or_option(key, description, example) {
            Ok(value) => Some(EnvField::optional(key, description, None, value)),
            Err(e) => {
                self.errors.push(e);
                None
            }
        }
    }

    /// Validate that all bindings loaded successfully.
    ///
    /// Unlike `finish()`, this does not consume the builder, so `write_docs()`
    /// can still be called afterward.
    pub fn validate(&self) -> Result<(), Vec<EnvError>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors.clone())
        }
    }

    /// Finish building and return any errors that were collected
    pub fn finish(self) -> Result<(), Vec<EnvError>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }

    /// Finish building and panic with a formatted summary if anything failed
    pub fn finish_or_panic(self) {
        if !self.errors.is_empty() {
            panic!("{}", format_env_errors(&self.errors));
        }
    }

    /// Write a markdown summary table of all registered bindings.
    ///
    /// # Example
    /// ```no_run
    /// use envcast::EnvBuilder;
    ///
    /// let mut builder = EnvBuilder::new();
    /// let port = builder.or_default("PORT", "Server port", 8080);
    /// builder.validate().ok();
    /// builder.write_docs("CONFIG.md").unwrap();
    /// ```
    pub fn write_docs(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let mut md = String::new();

        md.push_str("## Environment Variables Summary\n\n");
        md.push_str("| Variable | Required | Description | Default/Example |\n");
        md.push_str("|----------|----------|-------------|------------------|\n");
        for binding in &self.bindings {
            let required_str = if binding.required { "Yes" } else { "No" };
            let default_display = if binding.default_str.is_empty() {
                "-".to_string()
            } else {
                binding.default_str.clone()
            };
            md.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                binding.key, required_str, binding.description, default_display
            ));
        }

        fs::write(path, md)
    }
}

impl Default for EnvBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_new() {
        let builder = EnvBuilder::new();
        assert_eq!(builder.errors.len(), 0);
        assert_eq!(builder.bindings.len(), 0);
    }

    #[test]
    fn test_builder_finish_with_no_errors() {
        let builder = EnvBuilder::new();
        assert!(builder.finish().is_ok());
    }

    #[test]
    fn test_builder_collects_errors() {
        let mut builder = EnvBuilder::new();

        builder.errors.push(EnvError::MissingVar {
            key: "MISSING_VAR".to_string(),
            description: "Test variable".to_string(),
            example: None,
        });

        let result = builder.finish();
        assert!(result.is_err());

        if let Err(errors) = result {
            assert_eq!(errors.len(), 1);
        }
    }

    #[test]
    fn test_builder_collects_multiple_errors() {
        let mut builder = EnvBuilder::new();

        builder.errors.push(EnvError::MissingVar {
            key: "VAR1".to_string(),
            description: "First variable".to_string(),
            example: None,
        });
        builder.errors.push(EnvError::TypeMismatch {
            key: "VAR2".to_string(),
            value: "bad".to_string(),
            expected: "integer".to_string(),
            reason: "'bad' is not a base-10 integer literal".to_string(),
            description: "Second variable".to_string(),
            example: None,
        });

        let result = builder.finish();
        if let Err(errors) = result {
            assert_eq!(errors.len(), 2);
        } else {
            panic!("expected errors");
        }
    }

    #[test]
    fn test_format_env_errors() {
        colored::control::set_override(false);

        let errors = vec![
            EnvError::MissingVar {
                key: "VAR1".to_string(),
                description: "First".to_string(),
                example: None,
            },
            EnvError::MissingVar {
                key: "VAR2".to_string(),
                description: "Second".to_string(),
                example: None,
            },
        ];

        let formatted = format_env_errors(&errors);
        assert!(formatted.contains("Environment loading failed with 2 error(s)"));
        assert!(formatted.contains("VAR1"));
        assert!(formatted.contains("VAR2"));
    }

    #[test]
    fn test_finish_or_panic_succeeds() {
        let builder = EnvBuilder::new();
        builder.finish_or_panic();
    }

    #[test]
    fn test_builder_captures_required_binding_metadata() {
        let mut builder = EnvBuilder::new();
        let _ = builder.required("BUILDER_META_REQ", "Test description", 123);

        assert_eq!(builder.bindings.len(), 1);
        assert_eq!(builder.bindings[0].key, "BUILDER_META_REQ");
        assert_eq!(builder.bindings[0].description, "Test description");
        assert_eq!(builder.bindings[0].default_str, "123");
        assert!(builder.bindings[0].required);
    }

    #[test]
    fn test_builder_captures_optional_binding_metadata() {
        let mut builder = EnvBuilder::new();
        let _ = builder.or_default("BUILDER_META_PORT", "Server port", 8080);

        assert_eq!(builder.bindings.len(), 1);
        assert_eq!(builder.bindings[0].key, "BUILDER_META_PORT");
        assert_eq!(builder.bindings[0].default_str, "8080");
        assert!(!builder.bindings[0].required);
    }

    #[test]
    fn test_builder_captures_multiple_bindings() {
        let mut builder = EnvBuilder::new();
        let _ = builder.required("BUILDER_KEY1", "First key", "value1".to_string());
        let _ = builder.or_default("BUILDER_KEY2", "Second key", 42);
        let _ = builder.optional::<String>("BUILDER_KEY3", "Third key", Some("example"));

        assert_eq!(builder.bindings.len(), 3);
        assert_eq!(builder.bindings[0].key, "BUILDER_KEY1");
        assert_eq!(builder.bindings[1].key, "BUILDER_KEY2");
        assert_eq!(builder.bindings[2].key, "BUILDER_KEY3");
    }

    #[test]
    fn test_validate_does_not_consume_builder() {
        let builder = EnvBuilder::new();
        assert!(builder.validate().is_ok());
        assert_eq!(builder.bindings.len(), 0);
    }

    #[test]
    fn test_or_default_uses_default_when_missing() {
        let mut builder = EnvBuilder::new();
        let field = builder.or_default::<u16>("BUILDER_UNSET_PORT", "Server port", 8080);

        let field = field.expect("default should substitute for a missing variable");
        assert_eq!(*field, 8080);
        assert!(builder.validate().is_ok());
    }

    #[test]
    fn test_optional_missing_is_none_not_error() {
        let mut builder = EnvBuilder::new();
        let field = builder.optional::<String>("BUILDER_UNSET_OPT", "Optional value", None);

        let field = field.expect("missing optional should still yield a field");
        assert_eq!(*field, None);
        assert!(builder.validate().is_ok());
    }
}
