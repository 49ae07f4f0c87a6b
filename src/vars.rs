//! The enumerated-constant front-end: a fixed set of named values built from
//! an explicit name-to-type binding table.

use crate::error::EnvError;
use crate::value::{coerce, EnvSource, EnvType, EnvValue, ProcessEnv};
use std::collections::BTreeMap;

/// Builds the binding table for a [`VarSet`].
///
/// Bindings are declared one at a time (or via [`crate::env_bindings!`]) and
/// resolved all at once by [`load`](VarSetBuilder::load). Binding the same
/// name twice keeps the later declaration.
#[derive(Debug, Clone, Default)]
pub struct VarSetBuilder {
    bindings: Vec<(String, EnvType)>,
}

impl VarSetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare one (name, requested type) binding
    pub fn bind(mut self, name: impl Into<String>, ty: EnvType) -> Self {
        self.bindings.push((name.into(), ty));
        self
    }

    /// Resolve every binding against `env`, failing on the first binding that
    /// is missing (and not optional) or malformed.
    pub fn load<E: EnvSource>(self, env: &E) -> Result<VarSet, EnvError> {
        let mut values = BTreeMap::new();
        for (name, ty) in self.bindings {
            let value = coerce(&name, &ty, env)?;
            values.insert(name, value);
        }
        Ok(VarSet { values })
    }

    /// Resolve every binding against the process environment
    pub fn load_process(self) -> Result<VarSet, EnvError> {
        self.load(&ProcessEnv)
    }
}

/// An immutable set of named constants, each holding its coerced value.
///
/// Fixed at construction: there is no way to add, remove, or replace a value
/// after [`VarSetBuilder::load`] returns.
#[derive(Debug, Clone, PartialEq)]
pub struct VarSet {
    values: BTreeMap<String, EnvValue>,
}

impl VarSet {
    pub fn get(&self, name: &str) -> Option<&EnvValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &EnvValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}
