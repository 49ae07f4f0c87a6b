// Declarative helper for the VarSet front-end.
// The define_env! struct macro lives in the envcast-macros crate.

/// Build a [`crate::VarSetBuilder`] from a table of name => type bindings.
///
/// ```rust
/// use envcast::{env_bindings, EnvType};
///
/// let builder = env_bindings! {
///     DEBUG => EnvType::Bool,
///     WORKERS => EnvType::Int,
///     GREETING => EnvType::optional(EnvType::Str),
/// };
/// ```
#[macro_export]
macro_rules! env_bindings {
    ($($name:ident => $ty:expr),* $(,)?) => {
        $crate::VarSetBuilder::new()$(.bind(stringify!($name), $ty))*
    };
}

#[cfg(test)]
mod tests {
    use crate::value::{EnvType, EnvValue};
    use std::collections::HashMap;

    #[test]
    fn test_env_bindings_macro() {
        let mut env = HashMap::new();
        env.insert("DEBUG".to_string(), "off".to_string());
        env.insert("WORKERS".to_string(), "4".to_string());

        let vars = env_bindings! {
            DEBUG => EnvType::Bool,
            WORKERS => EnvType::Int,
            GREETING => EnvType::optional(EnvType::Str),
        }
        .load(&env)
        .unwrap();

        assert_eq!(vars.get("DEBUG"), Some(&EnvValue::Bool(false)));
        assert_eq!(vars.get("GREETING"), Some(&EnvValue::Absent));
    }

    #[test]
    fn test_env_bindings_empty() {
        let env: HashMap<String, String> = HashMap::new();
        let vars = env_bindings! {}.load(&env).unwrap();
        assert!(vars.is_empty());
    }
}
