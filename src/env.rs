//! Environment variable access.
//!
//! Indirect credential references (`$NAME`, `${NAME}`) and the `npm_config_*`
//! overlay both read the environment through [`Environment`], so callers can
//! substitute a fixed map instead of the process environment.

use std::collections::HashMap;
use std::hash::BuildHasher;

/// Source of environment variables.
pub trait Environment {
    /// Value of the variable `name`, if set.
    fn var(&self, name: &str) -> Option<String>;

    /// All variables, in no particular order.
    fn vars(&self) -> Vec<(String, String)>;
}

/// The environment of the current process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Environment for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }

    fn vars(&self) -> Vec<(String, String)> {
        // Non-Unicode entries cannot be config keys or values.
        std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect()
    }
}

impl<S: BuildHasher> Environment for HashMap<String, String, S> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }

    fn vars(&self) -> Vec<(String, String)> {
        self.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}
