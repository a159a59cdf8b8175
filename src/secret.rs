//! Indirect references to environment variables in credential values.
//!
//! A credential value written as `$NAME` or `${NAME}` stands for the value of
//! the environment variable `NAME`. The reference must span the whole value;
//! anything else is taken literally.

use crate::env::Environment;
use regex::Regex;
use std::sync::LazyLock;

/// Whole-value reference: `$NAME` or `${NAME}`.
static ENV_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\$\{?([^}]*)\}?$").unwrap());

/// A credential value as written in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretValue<'a> {
    /// Used as-is.
    Literal(&'a str),
    /// Name of the environment variable holding the real value.
    EnvRef(&'a str),
}

impl<'a> SecretValue<'a> {
    /// Classify a raw configuration value.
    ///
    /// # Examples
    ///
    /// ```
    /// use registry_auth_token_rs::SecretValue;
    ///
    /// assert_eq!(SecretValue::parse("${NPM_TOKEN}"), SecretValue::EnvRef("NPM_TOKEN"));
    /// assert_eq!(SecretValue::parse("$NPM_TOKEN"), SecretValue::EnvRef("NPM_TOKEN"));
    /// assert_eq!(SecretValue::parse("abc$NPM_TOKEN"), SecretValue::Literal("abc$NPM_TOKEN"));
    /// ```
    pub fn parse(raw: &'a str) -> Self {
        match ENV_REFERENCE.captures(raw).and_then(|caps| caps.get(1)) {
            Some(name) => SecretValue::EnvRef(name.as_str()),
            None => SecretValue::Literal(raw),
        }
    }

    /// Produce the concrete value.
    ///
    /// An unset variable yields an empty string rather than an error, so a
    /// misconfigured reference surfaces as an empty credential.
    pub fn resolve(self, env: &dyn Environment) -> String {
        match self {
            SecretValue::Literal(value) => value.to_string(),
            SecretValue::EnvRef(name) => env.var(name).unwrap_or_else(|| {
                tracing::warn!(variable = name, "credential references an unset environment variable");
                String::new()
            }),
        }
    }
}

/// Parse and resolve `raw` in one step.
pub(crate) fn resolve_secret(raw: &str, env: &dyn Environment) -> String {
    SecretValue::parse(raw).resolve(env)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_braced_reference() {
        assert_eq!(SecretValue::parse("${FOO}"), SecretValue::EnvRef("FOO"));
    }

    #[test]
    fn test_parse_bare_reference() {
        assert_eq!(SecretValue::parse("$FOO"), SecretValue::EnvRef("FOO"));
    }

    #[test]
    fn test_parse_literal() {
        assert_eq!(SecretValue::parse("npm_abc"), SecretValue::Literal("npm_abc"));
        assert_eq!(
            SecretValue::parse("prefix-${FOO}"),
            SecretValue::Literal("prefix-${FOO}")
        );
        assert_eq!(
            SecretValue::parse("${FOO}-suffix"),
            SecretValue::Literal("${FOO}-suffix")
        );
    }

    #[test]
    fn test_resolve_reference() {
        let env = env(&[("FOO", "bar")]);
        assert_eq!(SecretValue::parse("${FOO}").resolve(&env), "bar");
        assert_eq!(SecretValue::parse("$FOO").resolve(&env), "bar");
    }

    #[test]
    fn test_resolve_does_not_recurse() {
        let env = env(&[("OUTER", "${INNER}"), ("INNER", "secret")]);
        assert_eq!(resolve_secret("${OUTER}", &env), "${INNER}");
    }

    #[test]
    fn test_resolve_unset_reference_is_empty() {
        let env = env(&[]);
        assert_eq!(resolve_secret("${MISSING}", &env), "");
    }

    #[test]
    fn test_resolve_literal_ignores_env() {
        let env = env(&[("FOO", "bar")]);
        assert_eq!(resolve_secret("FOO", &env), "FOO");
    }
}
