//! Resolve npm registry credentials from `.npmrc` configuration.
//!
//! Given a registry URL, this crate answers "which credentials would npm
//! attach to a request for this registry?" It never performs requests and
//! never writes configuration.
//!
//! # Quick Start
//!
//! ```no_run
//! use registry_auth_token_rs::{resolve_auth, resolve_registry_url, ResolveOptions};
//!
//! let registry = resolve_registry_url(Some("@myorg"), None)?;
//! let options = ResolveOptions::default().recursive(true);
//!
//! if let Some(auth) = resolve_auth(Some(registry.as_str()), options)? {
//!     println!("Authorization: {} ...", auth.auth_type);
//! }
//! # Ok::<(), registry_auth_token_rs::Error>(())
//! ```
//!
//! # Credential Keys (Nerf-Darting)
//!
//! Credentials are scoped to registries by keys that keep the host and path
//! of the registry URL and drop the protocol:
//!
//! ```ini
//! //registry.npmjs.org/:_authToken = ${NPM_TOKEN}
//! //npm.example.com/team/:_auth = dXNlcjpwYXNz
//! //npm.example.com/:username = user
//! //npm.example.com/:_password = cGFzcw==
//! ```
//!
//! At each path level `_authToken` (Bearer) wins over `_auth` (Basic), which
//! wins over `username`/`_password` (Basic). In recursive mode the path is
//! shortened one segment at a time until a credential is found or the host
//! root has been checked.
//!
//! Values written as `$NAME` or `${NAME}` are replaced by the environment
//! variable `NAME`; an unset variable yields an empty value.

mod auth;
mod config;
mod env;
mod error;
mod location;
mod parser;
mod paths;
pub mod registry;
mod secret;
mod store;

pub use auth::{
    decode_password, encode_basic, AuthResolver, AuthType, CredentialField, ResolveOptions,
    ResolvedAuth,
};
pub use config::{ConfigLayer, LayerSource, LoadOptions, NpmrcConfig};
pub use env::{Environment, ProcessEnv};
pub use error::{Error, Result};
pub use location::{credential_key, parent_path, RegistryLocation};
pub use parser::{expand_env_vars, parse_npmrc};
pub use paths::{
    expand_tilde, find_global_prefix, find_local_prefix, global_config_path, project_config_path,
    user_config_path,
};
pub use registry::RegistryResolver;
pub use secret::SecretValue;
pub use store::ConfigStore;

/// Resolve the credentials for `registry_url`, or for the default registry
/// when `None`.
///
/// Configuration comes from `options.config`, or is loaded once from the
/// standard `.npmrc` locations. Returns `Ok(None)` when no credential
/// applies; the only resolution error is an unparseable URL.
///
/// # Examples
///
/// ```
/// use registry_auth_token_rs::{resolve_auth, AuthType, ResolveOptions};
/// use std::collections::HashMap;
///
/// let mut config = HashMap::new();
/// config.insert("//registry.foobar.eu/:_authToken".to_string(), "foobar".to_string());
///
/// let auth = resolve_auth(
///     Some("http://registry.foobar.eu/"),
///     ResolveOptions::default().with_config(&config),
/// )?
/// .unwrap();
/// assert_eq!(auth.auth_type, AuthType::Bearer);
/// assert_eq!(auth.token, "foobar");
/// # Ok::<(), registry_auth_token_rs::Error>(())
/// ```
pub fn resolve_auth(
    registry_url: Option<&str>,
    options: ResolveOptions<'_>,
) -> Result<Option<ResolvedAuth>> {
    let loaded;
    let config: &dyn ConfigStore = match options.config {
        Some(config) => config,
        None => {
            loaded = NpmrcConfig::load()?;
            &loaded
        }
    };

    AuthResolver::new(config)
        .recursive(options.recursive)
        .legacy_global_auth(options.legacy_global_auth)
        .resolve(registry_url)
}

/// Resolve the registry URL for `scope` (e.g. `@myorg`), always ending
/// with `/`.
///
/// Configuration comes from `config`, or is loaded once from the standard
/// `.npmrc` locations.
///
/// # Examples
///
/// ```
/// use registry_auth_token_rs::resolve_registry_url;
/// use std::collections::HashMap;
///
/// let mut config = HashMap::new();
/// config.insert("@somescope:registry".to_string(), "https://some.registry".to_string());
///
/// assert_eq!(
///     resolve_registry_url(Some("@somescope"), Some(&config))?,
///     "https://some.registry/"
/// );
/// # Ok::<(), registry_auth_token_rs::Error>(())
/// ```
pub fn resolve_registry_url(
    scope: Option<&str>,
    config: Option<&dyn ConfigStore>,
) -> Result<String> {
    match config {
        Some(config) => Ok(RegistryResolver::new(config).resolve(scope)),
        None => Ok(RegistryResolver::new(&NpmrcConfig::load()?).resolve(scope)),
    }
}
