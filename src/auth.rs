//! Credential resolution for npm registries.
//!
//! Credentials are scoped to registries by nerf-darted keys such as
//! `//registry.npmjs.org/:_authToken`. [`AuthResolver`] walks from the most
//! specific key for a registry URL towards the host root and returns the
//! first credential it finds.

use crate::env::{Environment, ProcessEnv};
use crate::error::Result;
use crate::location::{credential_key, parent_path, RegistryLocation};
use crate::registry::RegistryResolver;
use crate::secret::resolve_secret;
use crate::store::{get_non_empty, ConfigStore};
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD as BASE64};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use std::fmt;

/// Standard alphabet, accepting `_password` values with or without padding.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Authorization scheme of a resolved credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthType {
    /// Opaque token sent as-is.
    Bearer,
    /// Base64 of `username:password`.
    Basic,
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthType::Bearer => f.write_str("Bearer"),
            AuthType::Basic => f.write_str("Basic"),
        }
    }
}

/// Credential field names that follow the nerf-darted base in a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialField {
    /// `_authToken`: bearer token.
    AuthToken,
    /// `_auth`: legacy base64 of `username:password`.
    Auth,
    /// `username`
    Username,
    /// `_password`: base64-encoded password.
    Password,
}

impl CredentialField {
    /// The key suffix, e.g. `_authToken`.
    pub fn as_str(self) -> &'static str {
        match self {
            CredentialField::AuthToken => "_authToken",
            CredentialField::Auth => "_auth",
            CredentialField::Username => "username",
            CredentialField::Password => "_password",
        }
    }
}

/// Credentials that would be attached to a request to a registry.
///
/// # Security Notes
///
/// - The `Debug` implementation redacts the token and password.
/// - `PartialEq` is intentionally not implemented to prevent timing attacks
///   when comparing credentials.
#[derive(Clone)]
pub struct ResolvedAuth {
    /// Authorization scheme.
    pub auth_type: AuthType,
    /// Literal value for the `Authorization` header (base64 for Basic).
    pub token: String,
    /// Username, only when resolved from `username`/`_password`.
    pub username: Option<String>,
    /// Decoded password, only when resolved from `username`/`_password`.
    pub password: Option<String>,
}

impl fmt::Debug for ResolvedAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedAuth")
            .field("auth_type", &self.auth_type)
            .field("token", &"[REDACTED]")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl ResolvedAuth {
    fn bearer(token: String) -> Self {
        ResolvedAuth {
            auth_type: AuthType::Bearer,
            token,
            username: None,
            password: None,
        }
    }

    fn legacy_basic(token: String) -> Self {
        ResolvedAuth {
            auth_type: AuthType::Basic,
            token,
            username: None,
            password: None,
        }
    }

    fn basic(username: &str, password: String) -> Self {
        ResolvedAuth {
            auth_type: AuthType::Basic,
            token: encode_basic(username, &password),
            username: Some(username.to_string()),
            password: Some(password),
        }
    }

    /// Full `Authorization` header value, e.g. `Bearer npm_abc`.
    pub fn authorization_header(&self) -> String {
        format!("{} {}", self.auth_type, self.token)
    }

    /// Username and password, if resolved from the `username`/`_password` pair.
    pub fn username_password(&self) -> Option<(&str, &str)> {
        match (&self.username, &self.password) {
            (Some(username), Some(password)) => Some((username, password)),
            _ => None,
        }
    }
}

/// Decode a base64-encoded `_password` value.
pub fn decode_password(encoded: &str) -> Result<String> {
    let decoded = LENIENT_BASE64.decode(encoded)?;
    Ok(String::from_utf8(decoded)?)
}

/// Base64 of `username:password`, as sent with HTTP Basic auth.
pub fn encode_basic(username: &str, password: &str) -> String {
    BASE64.encode(format!("{}:{}", username, password).as_bytes())
}

/// Options for [`crate::resolve_auth`].
#[derive(Clone, Copy, Default)]
pub struct ResolveOptions<'a> {
    /// Walk up the URL path until a credential is found.
    pub recursive: bool,
    /// Fall back to the top-level `_auth` key when no scoped credential exists.
    pub legacy_global_auth: bool,
    /// Configuration snapshot; loaded from the standard `.npmrc` locations when `None`.
    pub config: Option<&'a dyn ConfigStore>,
}

impl<'a> ResolveOptions<'a> {
    /// Resolve against `config` instead of loading `.npmrc` files.
    pub fn with_config(mut self, config: &'a dyn ConfigStore) -> Self {
        self.config = Some(config);
        self
    }

    /// Enable or disable walking up the URL path.
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Enable or disable the top-level `_auth` fallback.
    pub fn legacy_global_auth(mut self, enabled: bool) -> Self {
        self.legacy_global_auth = enabled;
        self
    }
}

/// Resolves the credential for a registry URL from a configuration snapshot.
///
/// At each path level the lookup order is `_authToken` (Bearer), then `_auth`
/// (Basic), then `username` + `_password` (Basic). More specific paths win
/// over less specific ones; the walk never leaves the URL's host.
///
/// # Examples
///
/// ```
/// use registry_auth_token_rs::{AuthResolver, AuthType};
/// use std::collections::HashMap;
///
/// let mut config = HashMap::new();
/// config.insert("//npm.example.com/:_authToken".to_string(), "secret".to_string());
///
/// let auth = AuthResolver::new(&config)
///     .recursive(true)
///     .resolve(Some("https://npm.example.com/team/pkg"))
///     .unwrap()
///     .unwrap();
/// assert_eq!(auth.auth_type, AuthType::Bearer);
/// assert_eq!(auth.token, "secret");
/// ```
pub struct AuthResolver<'a> {
    config: &'a dyn ConfigStore,
    env: &'a dyn Environment,
    recursive: bool,
    legacy_global_auth: bool,
}

impl<'a> AuthResolver<'a> {
    /// Create a non-recursive resolver reading the process environment.
    pub fn new(config: &'a dyn ConfigStore) -> Self {
        AuthResolver {
            config,
            env: &ProcessEnv,
            recursive: false,
            legacy_global_auth: false,
        }
    }

    /// Enable or disable walking up the URL path.
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Enable or disable the top-level `_auth` fallback.
    pub fn legacy_global_auth(mut self, enabled: bool) -> Self {
        self.legacy_global_auth = enabled;
        self
    }

    /// Read indirect references from `env` instead of the process environment.
    pub fn with_env(mut self, env: &'a dyn Environment) -> Self {
        self.env = env;
        self
    }

    /// Resolve credentials for `registry_url`, or for the default registry
    /// when `None`.
    ///
    /// Returns `Ok(None)` when no credential applies and
    /// [`Error::InvalidUrl`](crate::Error::InvalidUrl) when the URL cannot be parsed.
    pub fn resolve(&self, registry_url: Option<&str>) -> Result<Option<ResolvedAuth>> {
        let registry_url = match registry_url {
            Some(url) => url.to_string(),
            None => RegistryResolver::new(self.config).resolve(None),
        };
        let location = RegistryLocation::parse(&registry_url)?;

        let mut pathname = location.pathname().to_string();
        loop {
            let bases = location.base_keys(&pathname);
            tracing::trace!(base = %bases[0], "checking credentials");

            if let Some(auth) = self.resolve_level(&bases) {
                tracing::debug!(
                    base = %bases[0],
                    auth_type = %auth.auth_type,
                    "resolved registry credentials"
                );
                return Ok(Some(auth));
            }

            if !self.recursive || pathname == "/" {
                break;
            }
            let parent = parent_path(&pathname);
            if parent == pathname {
                break;
            }
            pathname = parent;
        }

        if self.legacy_global_auth {
            return Ok(self.global_legacy_auth());
        }
        Ok(None)
    }

    /// Credential configured at exactly one path level, if any.
    fn resolve_level(&self, bases: &[String; 2]) -> Option<ResolvedAuth> {
        if let Some(token) = self.lookup(bases, CredentialField::AuthToken) {
            return Some(ResolvedAuth::bearer(resolve_secret(token, self.env)));
        }

        if let Some(auth) = self.lookup(bases, CredentialField::Auth) {
            return Some(ResolvedAuth::legacy_basic(resolve_secret(auth, self.env)));
        }

        let username = self.lookup(bases, CredentialField::Username)?;
        let password = self.lookup(bases, CredentialField::Password)?;
        match decode_password(&resolve_secret(password, self.env)) {
            Ok(password) => Some(ResolvedAuth::basic(username, password)),
            Err(e) => {
                tracing::warn!(base = %bases[0], error = %e, "ignoring undecodable _password");
                None
            }
        }
    }

    /// First non-empty value of `field` under either base key.
    fn lookup(&self, bases: &[String; 2], field: CredentialField) -> Option<&'a str> {
        bases
            .iter()
            .find_map(|base| get_non_empty(self.config, &credential_key(base, field.as_str())))
    }

    fn global_legacy_auth(&self) -> Option<ResolvedAuth> {
        let auth = get_non_empty(self.config, CredentialField::Auth.as_str())?;
        tracing::debug!("using top-level _auth credentials");
        Some(ResolvedAuth::legacy_basic(resolve_secret(auth, self.env)))
    }
}
