//! Read-only key/value access to npm configuration.
//!
//! Resolvers never enumerate or mutate configuration; they build keys such as
//! `@myorg:registry` or `//registry.npmjs.org/:_authToken` and ask a
//! [`ConfigStore`] for the value.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

/// A case-sensitive, read-only string-to-string configuration snapshot.
///
/// # Examples
///
/// ```
/// use registry_auth_token_rs::ConfigStore;
/// use std::collections::HashMap;
///
/// let mut config = HashMap::new();
/// config.insert("registry".to_string(), "https://npm.example.com/".to_string());
///
/// assert_eq!(ConfigStore::get(&config, "registry"), Some("https://npm.example.com/"));
/// assert_eq!(ConfigStore::get(&config, "REGISTRY"), None);
/// ```
pub trait ConfigStore {
    /// Look up the raw value stored under `key`.
    fn get(&self, key: &str) -> Option<&str>;
}

impl<S: BuildHasher> ConfigStore for HashMap<String, String, S> {
    fn get(&self, key: &str) -> Option<&str> {
        HashMap::get(self, key).map(String::as_str)
    }
}

impl ConfigStore for BTreeMap<String, String> {
    fn get(&self, key: &str) -> Option<&str> {
        BTreeMap::get(self, key).map(String::as_str)
    }
}

impl<T: ConfigStore + ?Sized> ConfigStore for &T {
    fn get(&self, key: &str) -> Option<&str> {
        (**self).get(key)
    }
}

impl<T: ConfigStore + ?Sized> ConfigStore for Box<T> {
    fn get(&self, key: &str) -> Option<&str> {
        (**self).get(key)
    }
}

/// Look up `key`, treating an empty value the same as a missing one.
pub(crate) fn get_non_empty<'a>(config: &'a dyn ConfigStore, key: &str) -> Option<&'a str> {
    config.get(key).filter(|value| !value.is_empty())
}
