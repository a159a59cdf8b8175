//! Registry URL normalization for credential lookup.
//!
//! Credentials are keyed by the "nerf-darted" form of a registry URL: the
//! protocol is dropped and the host and path are kept literally, e.g.
//! `//registry.npmjs.org/:_authToken`.

use crate::error::{Error, Result};
use url::Url;

/// Host and path of a registry URL, the parts that select credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryLocation {
    host: String,
    pathname: String,
}

impl RegistryLocation {
    /// Parse a registry URL.
    ///
    /// Scheme-relative input (`//registry.example.com/npm`) is accepted.
    ///
    /// # Examples
    ///
    /// ```
    /// use registry_auth_token_rs::RegistryLocation;
    ///
    /// let location = RegistryLocation::parse("https://npm.example.com:8443/team/").unwrap();
    /// assert_eq!(location.host(), "npm.example.com:8443");
    /// assert_eq!(location.pathname(), "/team/");
    ///
    /// let location = RegistryLocation::parse("//registry.npmjs.org").unwrap();
    /// assert_eq!(location.pathname(), "/");
    /// ```
    pub fn parse(registry_url: &str) -> Result<Self> {
        let parsed = if registry_url.starts_with("//") {
            Url::parse(&format!("http:{}", registry_url))
        } else {
            Url::parse(registry_url)
        }
        .map_err(|e| Error::InvalidUrl {
            url: registry_url.to_string(),
            message: e.to_string(),
        })?;

        let host = parsed.host_str().ok_or_else(|| Error::InvalidUrl {
            url: registry_url.to_string(),
            message: "URL has no host".to_string(),
        })?;
        let host = match parsed.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };

        let pathname = match parsed.path() {
            "" => "/".to_string(),
            path => path.to_string(),
        };

        Ok(RegistryLocation { host, pathname })
    }

    /// Host, including an explicit non-default port.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Path of the parsed URL, never empty.
    pub fn pathname(&self) -> &str {
        &self.pathname
    }

    /// The two base keys tried for `pathname` on this host: without and with
    /// a trailing slash.
    ///
    /// ```
    /// use registry_auth_token_rs::RegistryLocation;
    ///
    /// let location = RegistryLocation::parse("https://npm.example.com/").unwrap();
    /// assert_eq!(
    ///     location.base_keys("/team/"),
    ///     ["//npm.example.com/team".to_string(), "//npm.example.com/team/".to_string()]
    /// );
    /// ```
    pub fn base_keys(&self, pathname: &str) -> [String; 2] {
        let trimmed = pathname.strip_suffix('/').unwrap_or(pathname);
        let base = format!("//{}{}", self.host, trimmed);
        let alt = if base.ends_with('/') {
            base.clone()
        } else {
            format!("{}/", base)
        };
        [base, alt]
    }
}

/// Parent of a URL path, one segment up.
///
/// A path beginning with `//` reads its first segment as an authority, and
/// never climbs above it: `//what/ever` goes to `//what/` and stops there.
/// Callers detect the end of the walk by comparing with the input.
///
/// ```
/// use registry_auth_token_rs::parent_path;
///
/// assert_eq!(parent_path("/foo/bar/baz"), "/foo/bar");
/// assert_eq!(parent_path("/foo/"), "/");
/// assert_eq!(parent_path("/"), "/");
/// assert_eq!(parent_path("//what/ever"), "//what/");
/// assert_eq!(parent_path("//what/"), "//what/");
/// ```
pub fn parent_path(pathname: &str) -> String {
    let (floor, rest) = match pathname.strip_prefix("//") {
        Some(after) => {
            let end = after.find('/').unwrap_or(after.len()) + 2;
            (&pathname[..end], &pathname[end..])
        }
        None => ("", pathname),
    };

    let trimmed = rest.trim_end_matches('/');
    let parent = match trimmed.rfind('/') {
        Some(idx) if idx > 0 => &trimmed[..idx],
        _ => "/",
    };

    format!("{}{}", floor, parent)
}

/// Build the configuration key for `field` under a nerf-darted base.
pub fn credential_key(base: &str, field: &str) -> String {
    format!("{}:{}", base, field)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let location = RegistryLocation::parse("https://registry.npmjs.org/").unwrap();
        assert_eq!(location.host(), "registry.npmjs.org");
        assert_eq!(location.pathname(), "/");
    }

    #[test]
    fn test_parse_bare_host() {
        let location = RegistryLocation::parse("https://registry.npmjs.org").unwrap();
        assert_eq!(location.pathname(), "/");
    }

    #[test]
    fn test_parse_with_port() {
        let location = RegistryLocation::parse("http://localhost:8770/").unwrap();
        assert_eq!(location.host(), "localhost:8770");
    }

    #[test]
    fn test_parse_default_port_is_dropped() {
        let location = RegistryLocation::parse("https://registry.example.com:443/").unwrap();
        assert_eq!(location.host(), "registry.example.com");
    }

    #[test]
    fn test_parse_scheme_relative() {
        let location = RegistryLocation::parse("//registry.blah.foo").unwrap();
        assert_eq!(location.host(), "registry.blah.foo");
        assert_eq!(location.pathname(), "/");
    }

    #[test]
    fn test_parse_keeps_double_slash_path() {
        let location = RegistryLocation::parse("http://registry.blah.eu//what/ever").unwrap();
        assert_eq!(location.pathname(), "//what/ever");
    }

    #[test]
    fn test_parse_invalid() {
        let err = RegistryLocation::parse("not a url").unwrap_err();
        assert!(matches!(err, Error::InvalidUrl { .. }));
    }

    #[test]
    fn test_parse_without_host() {
        let err = RegistryLocation::parse("mailto:someone@example.com").unwrap_err();
        match err {
            Error::InvalidUrl { url, message } => {
                assert_eq!(url, "mailto:someone@example.com");
                assert!(message.contains("no host"));
            }
            other => panic!("Expected InvalidUrl error, got: {:?}", other),
        }
    }

    #[test]
    fn test_base_keys_root() {
        let location = RegistryLocation::parse("https://registry.npmjs.org/").unwrap();
        assert_eq!(
            location.base_keys("/"),
            [
                "//registry.npmjs.org".to_string(),
                "//registry.npmjs.org/".to_string()
            ]
        );
    }

    #[test]
    fn test_base_keys_path_without_slash() {
        let location = RegistryLocation::parse("https://example.com/").unwrap();
        assert_eq!(
            location.base_keys("/foo/bar"),
            [
                "//example.com/foo/bar".to_string(),
                "//example.com/foo/bar/".to_string()
            ]
        );
    }

    #[test]
    fn test_base_keys_strips_only_one_slash() {
        let location = RegistryLocation::parse("https://example.com/").unwrap();
        assert_eq!(
            location.base_keys("/foo//"),
            [
                "//example.com/foo/".to_string(),
                "//example.com/foo/".to_string()
            ]
        );
    }

    #[test]
    fn test_parent_path_walks_to_root() {
        let mut path = "/a/b/c/".to_string();
        let mut seen = vec![path.clone()];
        while path != "/" {
            path = parent_path(&path);
            seen.push(path.clone());
        }
        assert_eq!(seen, vec!["/a/b/c/", "/a/b", "/a", "/"]);
    }

    #[test]
    fn test_parent_path_double_slash_stops() {
        assert_eq!(parent_path("//what/ever"), "//what/");
        assert_eq!(parent_path("//what/"), "//what/");
        assert_eq!(parent_path("//what"), "//what/");
    }

    #[test]
    fn test_credential_key() {
        assert_eq!(
            credential_key("//registry.npmjs.org/", "_authToken"),
            "//registry.npmjs.org/:_authToken"
        );
    }
}
