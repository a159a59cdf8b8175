//! Registry URL resolution for npm scopes.
//!
//! This module resolves the base registry URL for a scope such as `@myorg`,
//! falling back to the configured default registry.

use crate::store::{get_non_empty, ConfigStore};

/// The default npm registry URL.
pub const DEFAULT_REGISTRY: &str = "https://registry.npmjs.org/";

/// Resolves the registry URL for a scope from a configuration snapshot.
///
/// # Examples
///
/// ```
/// use registry_auth_token_rs::registry::{RegistryResolver, DEFAULT_REGISTRY};
/// use std::collections::HashMap;
///
/// let mut config = HashMap::new();
/// config.insert("@myorg:registry".to_string(), "https://npm.myorg.dev".to_string());
///
/// let resolver = RegistryResolver::new(&config);
/// assert_eq!(resolver.resolve(Some("@myorg")), "https://npm.myorg.dev/");
/// assert_eq!(resolver.resolve(Some("@other")), DEFAULT_REGISTRY);
/// assert_eq!(resolver.resolve(None), DEFAULT_REGISTRY);
/// ```
pub struct RegistryResolver<'a> {
    config: &'a dyn ConfigStore,
}

impl<'a> RegistryResolver<'a> {
    pub fn new(config: &'a dyn ConfigStore) -> Self {
        RegistryResolver { config }
    }

    /// Registry URL for `scope`, always ending with `/`.
    ///
    /// Looks up `{scope}:registry`, then `registry`, then [`DEFAULT_REGISTRY`].
    pub fn resolve(&self, scope: Option<&str>) -> String {
        let url = scope
            .and_then(|scope| get_non_empty(self.config, &scope_registry_key(scope)))
            .or_else(|| get_non_empty(self.config, "registry"))
            .unwrap_or(DEFAULT_REGISTRY);
        ensure_trailing_slash(url)
    }
}

/// Extract the scope from a package name if present.
///
/// # Examples
///
/// ```
/// use registry_auth_token_rs::registry::extract_scope;
///
/// assert_eq!(extract_scope("@myorg/package"), Some("@myorg"));
/// assert_eq!(extract_scope("package"), None);
/// assert_eq!(extract_scope("@scope/nested/path"), Some("@scope"));
/// ```
pub fn extract_scope(package: &str) -> Option<&str> {
    if package.starts_with('@') {
        let end = package.find('/').unwrap_or(package.len());
        Some(&package[..end])
    } else {
        None
    }
}

/// Build the config key for a scoped registry.
///
/// ```
/// use registry_auth_token_rs::registry::scope_registry_key;
///
/// assert_eq!(scope_registry_key("@myorg"), "@myorg:registry");
/// ```
pub fn scope_registry_key(scope: &str) -> String {
    format!("{}:registry", scope)
}

/// Append `/` to `url` unless it already ends with one.
pub fn ensure_trailing_slash(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{}/", url)
    }
}
