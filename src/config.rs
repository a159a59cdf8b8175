//! Layered `.npmrc` configuration.
//!
//! This module loads the configuration snapshot the resolvers read from when
//! the caller does not supply one: global, user and project `.npmrc` files
//! plus an `npm_config_*` environment overlay.

use crate::auth::{AuthResolver, ResolvedAuth};
use crate::env::{Environment, ProcessEnv};
use crate::error::{Error, Result};
use crate::parser::parse_npmrc;
use crate::paths::{
    expand_tilde, find_global_prefix, find_local_prefix, global_config_path, project_config_path,
    user_config_path,
};
use crate::registry::{extract_scope, RegistryResolver};
use crate::store::ConfigStore;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Prefix of environment variables that override configuration keys.
const ENV_PREFIX: &str = "npm_config_";

/// Where a configuration layer came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerSource {
    /// An `.npmrc` file.
    File(PathBuf),
    /// `npm_config_*` environment variables.
    Environment,
}

/// Key-value pairs from a single configuration source.
#[derive(Debug, Clone)]
pub struct ConfigLayer {
    pub source: LayerSource,
    pub data: HashMap<String, String>,
}

impl ConfigLayer {
    /// Load a layer from a file path.
    ///
    /// Returns `Ok(None)` if the file doesn't exist.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        Self::read(path).map(Some)
    }

    fn read(path: &Path) -> Result<Self> {
        // Existing but unreadable files are an error, not a missing layer
        let content = std::fs::read_to_string(path).map_err(|e| Error::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        let data = parse_npmrc(&content);
        tracing::debug!(path = %path.display(), keys = data.len(), "loaded npmrc file");

        Ok(ConfigLayer {
            source: LayerSource::File(path.to_path_buf()),
            data,
        })
    }

    /// Build the overlay layer from `npm_config_*` variables in `env`.
    ///
    /// The prefix matches case-insensitively; the remainder is lowercased and
    /// every non-leading `_` becomes `-`, so `NPM_CONFIG_STRICT_SSL` sets
    /// `strict-ssl` and `npm_config__auth` sets `_auth`. Empty values are
    /// ignored. Returns `None` when no variable applies.
    pub fn from_env(env: &dyn Environment) -> Option<Self> {
        let data: HashMap<String, String> = env
            .vars()
            .into_iter()
            .filter(|(_, value)| !value.is_empty())
            .filter_map(|(name, value)| Some((env_config_key(&name)?, value)))
            .collect();

        if data.is_empty() {
            return None;
        }
        tracing::debug!(keys = data.len(), "loaded npm_config environment overlay");
        Some(ConfigLayer {
            source: LayerSource::Environment,
            data,
        })
    }

    /// Get a value from this layer.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(|s| s.as_str())
    }

    /// Path of the backing file, if the layer came from one.
    pub fn path(&self) -> Option<&Path> {
        match &self.source {
            LayerSource::File(path) => Some(path),
            LayerSource::Environment => None,
        }
    }
}

impl ConfigStore for ConfigLayer {
    fn get(&self, key: &str) -> Option<&str> {
        ConfigLayer::get(self, key)
    }
}

/// Map an `npm_config_*` variable name to its configuration key.
fn env_config_key(name: &str) -> Option<String> {
    let prefix = name.get(..ENV_PREFIX.len())?;
    if !prefix.eq_ignore_ascii_case(ENV_PREFIX) {
        return None;
    }
    let rest = &name[ENV_PREFIX.len()..];
    if rest.is_empty() {
        return None;
    }

    Some(
        rest.char_indices()
            .map(|(i, c)| if c == '_' && i > 0 { '-' } else { c.to_ascii_lowercase() })
            .collect(),
    )
}

/// Options for loading npm configuration.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Override current working directory for project config discovery.
    pub cwd: Option<PathBuf>,
    /// Override global prefix path.
    pub global_prefix: Option<PathBuf>,
    /// Override user config path (default: `npm_config_userconfig`, then `~/.npmrc`).
    pub user_config: Option<PathBuf>,
    /// Variables for the environment overlay instead of the process environment.
    pub env: Option<HashMap<String, String>>,
    /// Skip loading project-level `.npmrc`.
    pub skip_project: bool,
    /// Skip loading user-level `~/.npmrc`.
    pub skip_user: bool,
    /// Skip loading global config.
    pub skip_global: bool,
    /// Skip the `npm_config_*` environment overlay.
    pub skip_env: bool,
}

/// npm configuration loaded from `.npmrc` files and the environment.
///
/// Layers by priority (highest to lowest):
/// 1. `npm_config_*` environment variables
/// 2. Project `.npmrc` (`{localPrefix}/.npmrc`)
/// 3. User `.npmrc` (`~/.npmrc`)
/// 4. Global `npmrc` (`{globalPrefix}/etc/npmrc`)
///
/// # Examples
///
/// ```no_run
/// use registry_auth_token_rs::NpmrcConfig;
///
/// let config = NpmrcConfig::load()?;
/// let registry = config.registry_for("@myorg/package");
///
/// if let Some(auth) = config.credentials_for(&registry, true)? {
///     println!("Authorization: {} ...", auth.auth_type);
/// }
/// # Ok::<(), registry_auth_token_rs::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct NpmrcConfig {
    /// Global prefix path (e.g., `/usr/local`).
    pub global_prefix: Option<PathBuf>,
    /// Local/project prefix path.
    pub local_prefix: PathBuf,

    global_config: Option<ConfigLayer>,
    user_config: Option<ConfigLayer>,
    project_config: Option<ConfigLayer>,
    env_config: Option<ConfigLayer>,
}

impl NpmrcConfig {
    /// Load configuration from standard locations with auto-detected paths.
    pub fn load() -> Result<Self> {
        Self::load_with_options(LoadOptions::default())
    }

    /// Load configuration from a single file path.
    ///
    /// No other layer is consulted. Returns `Err(Error::FileNotFound)` if the
    /// file doesn't exist.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let layer = ConfigLayer::read(path)?;
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

        Ok(NpmrcConfig {
            global_prefix: find_global_prefix(),
            local_prefix: find_local_prefix(&cwd),
            global_config: None,
            user_config: None,
            project_config: Some(layer),
            env_config: None,
        })
    }

    /// Load configuration with custom options.
    pub fn load_with_options(opts: LoadOptions) -> Result<Self> {
        let cwd = opts
            .cwd
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

        // Environment overlay first: it can redirect the user and global files
        let env_config = if opts.skip_env {
            None
        } else {
            match &opts.env {
                Some(env) => ConfigLayer::from_env(env),
                None => ConfigLayer::from_env(&ProcessEnv),
            }
        };
        let env_path = |key: &str| {
            env_config
                .as_ref()
                .and_then(|layer| layer.get(key))
                .map(expand_tilde)
        };

        let global_prefix = opts.global_prefix.or_else(find_global_prefix);
        let local_prefix = find_local_prefix(&cwd);

        // Load global config
        let global_config = if opts.skip_global {
            None
        } else {
            match env_path("globalconfig")
                .or_else(|| global_prefix.as_deref().map(global_config_path))
            {
                Some(path) => ConfigLayer::load(&path)?,
                None => None,
            }
        };

        // Load user config (explicit path > npm_config_userconfig > ~/.npmrc)
        let user_config = if opts.skip_user {
            None
        } else {
            match opts
                .user_config
                .or_else(|| env_path("userconfig"))
                .or_else(user_config_path)
            {
                Some(path) => ConfigLayer::load(&path)?,
                None => None,
            }
        };

        // Load project config
        let project_config = if opts.skip_project {
            None
        } else {
            ConfigLayer::load(&project_config_path(&local_prefix))?
        };

        Ok(NpmrcConfig {
            global_prefix,
            local_prefix,
            global_config,
            user_config,
            project_config,
            env_config,
        })
    }

    /// Get a raw config value by key.
    ///
    /// Searches all layers by priority (env > project > user > global).
    pub fn get(&self, key: &str) -> Option<&str> {
        [
            &self.env_config,
            &self.project_config,
            &self.user_config,
            &self.global_config,
        ]
        .into_iter()
        .flatten()
        .find_map(|layer| layer.get(key))
    }

    /// The default registry URL, ending with `/`.
    pub fn default_registry(&self) -> String {
        RegistryResolver::new(self).resolve(None)
    }

    /// The registry URL for a package, honouring `@scope:registry` entries.
    pub fn registry_for(&self, package: &str) -> String {
        RegistryResolver::new(self).resolve(extract_scope(package))
    }

    /// Credentials for a registry URL.
    ///
    /// With `recursive`, parent paths of the URL are searched as well.
    pub fn credentials_for(
        &self,
        registry_url: &str,
        recursive: bool,
    ) -> Result<Option<ResolvedAuth>> {
        AuthResolver::new(self)
            .recursive(recursive)
            .resolve(Some(registry_url))
    }

    /// Check if project config was loaded.
    pub fn has_project_config(&self) -> bool {
        self.project_config.is_some()
    }

    /// Check if user config was loaded.
    pub fn has_user_config(&self) -> bool {
        self.user_config.is_some()
    }

    /// Check if global config was loaded.
    pub fn has_global_config(&self) -> bool {
        self.global_config.is_some()
    }

    /// Check if any `npm_config_*` variable was applied.
    pub fn has_env_config(&self) -> bool {
        self.env_config.is_some()
    }

    /// Get the path to the project config if loaded.
    pub fn project_config_path(&self) -> Option<&Path> {
        self.project_config.as_ref().and_then(ConfigLayer::path)
    }

    /// Get the path to the user config if loaded.
    pub fn user_config_path(&self) -> Option<&Path> {
        self.user_config.as_ref().and_then(ConfigLayer::path)
    }

    /// Get the path to the global config if loaded.
    pub fn global_config_path(&self) -> Option<&Path> {
        self.global_config.as_ref().and_then(ConfigLayer::path)
    }
}

impl ConfigStore for NpmrcConfig {
    fn get(&self, key: &str) -> Option<&str> {
        NpmrcConfig::get(self, key)
    }
}
