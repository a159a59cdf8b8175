//! Locations of the `.npmrc` files that make up the configuration layers.

use std::path::{Path, PathBuf};

/// Global prefix derived from the `node` executable on `PATH`.
///
/// On Unix the prefix is two levels above the binary (`/usr/local/bin/node`
/// gives `/usr/local`); on Windows it is the binary's directory.
pub fn find_global_prefix() -> Option<PathBuf> {
    let node = which::which("node").ok()?;
    let bin_dir = node.parent()?;

    if cfg!(windows) {
        Some(bin_dir.to_path_buf())
    } else {
        bin_dir.parent().map(Path::to_path_buf)
    }
}

/// Nearest ancestor of `cwd` (inclusive) containing `package.json` or a
/// `node_modules` directory, or `cwd` itself if there is none.
pub fn find_local_prefix(cwd: &Path) -> PathBuf {
    cwd.ancestors()
        .find(|dir| dir.join("package.json").is_file() || dir.join("node_modules").is_dir())
        .unwrap_or(cwd)
        .to_path_buf()
}

/// `~/.npmrc`, if the home directory is known.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".npmrc"))
}

/// `{prefix}/etc/npmrc`.
pub fn global_config_path(prefix: &Path) -> PathBuf {
    prefix.join("etc").join("npmrc")
}

/// `{prefix}/.npmrc`.
pub fn project_config_path(prefix: &Path) -> PathBuf {
    prefix.join(".npmrc")
}

/// Expand a leading `~` to the home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    let home_relative = match path {
        "~" => Some(""),
        _ => path.strip_prefix("~/"),
    };
    match (home_relative, dirs::home_dir()) {
        (Some(""), Some(home)) => home,
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
