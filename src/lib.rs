pub mod builder;
pub mod coerce;
pub mod error;
pub mod field;
pub mod macros;
pub mod value;
pub mod vars;

// Re-export main types
pub use builder::{env_cast, env_or_default, env_or_option, env_required, format_env_errors, EnvBuilder};
pub use coerce::FromEnvStr;
pub use error::EnvError;
pub use field::EnvField;
pub use value::{cast_raw, coerce, EnvList, EnvSource, EnvType, EnvValue, ProcessEnv};
pub use vars::{VarSet, VarSetBuilder};

// Arbitrary-precision integer target, re-exported so callers don't need a
// direct num-bigint dependency
pub use num_bigint::BigInt;

// Re-export macro
pub use envcast_macros::define_env;

/// Trait for records populated from environment variables
pub trait LoadEnv: Sized {
    /// Load from the environment, panicking with a formatted summary on errors
    fn load() -> Self;

    /// Load from the environment, returning collected errors instead of panicking
    fn load_or_error() -> Result<Self, Vec<EnvError>>;

    /// Create a builder for documentation generation (without keeping values)
    fn builder_for_docs() -> EnvBuilder;
}
