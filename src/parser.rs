//! Parsing for the `.npmrc` text format.
//!
//! `.npmrc` is a section-less INI dialect whose keys may start with `//` or
//! `@` (`//registry.npmjs.org/:_authToken`, `@myorg:registry`), which general
//! INI parsers treat as comments or sections, so the format is parsed here.

use crate::auth::CredentialField;
use crate::secret::SecretValue;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

/// `${VAR}` or `${VAR?}`, with any run of preceding backslashes.
static ENV_EXPR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?P<esc>\\*)\$\{(?P<name>[^${}?]+)(?P<mod>\?)?\}").unwrap());

/// Parse `.npmrc` content into key-value pairs.
///
/// - `key = value` and `key=value` lines; the first `=` separates key and value
/// - `#` and `;` comment lines, blank lines and `[section]` headers are skipped
/// - values wrapped in matching quotes are unquoted
/// - `${VAR}` references inside values are expanded (see [`expand_env_vars`]),
///   except a credential value that is a reference in its entirety, which the
///   credential resolver substitutes itself
///
/// Later occurrences of a key replace earlier ones.
pub fn parse_npmrc(content: &str) -> HashMap<String, String> {
    let mut result = HashMap::new();

    for line in content.lines() {
        let line = line.trim();

        // Skip blank lines and comments
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        // .npmrc has no sections; ignore headers rather than failing
        if line.starts_with('[') && line.ends_with(']') {
            continue;
        }

        // Lines without = are ignored, as npm's ini parser does
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }

        let value = unquote(value.trim());
        let value = if is_deferred_reference(key, value) {
            value.to_string()
        } else {
            expand_env_vars(value)
        };
        result.insert(key.to_string(), value);
    }

    result
}

/// A credential field whose whole value is `$NAME` or `${NAME}`.
///
/// These stay unexpanded so the reference is resolved exactly once, by the
/// credential resolver. `${NAME?}` has no resolver equivalent and is expanded
/// here.
fn is_deferred_reference(key: &str, value: &str) -> bool {
    let field = key.rsplit_once(':').map_or(key, |(_, field)| field);
    let is_credential = [
        CredentialField::AuthToken,
        CredentialField::Auth,
        CredentialField::Password,
    ]
    .iter()
    .any(|f| f.as_str() == field);

    is_credential
        && matches!(SecretValue::parse(value), SecretValue::EnvRef(name) if !name.ends_with('?'))
}

fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'"' || first == b'\'') {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Expand `${VAR}` environment variable references in a value.
///
/// - `${VAR}` - the value of VAR, or the literal `${VAR}` if undefined
/// - `${VAR?}` - the value of VAR, or an empty string if undefined
/// - `\${VAR}` - escaped; kept literally with one backslash fewer
///
/// Bare `$VAR` is not expanded here. A credential value consisting only of a
/// reference is resolved later by the credential resolver.
pub fn expand_env_vars(value: &str) -> String {
    ENV_EXPR
        .replace_all(value, |caps: &regex::Captures| {
            let esc = caps.name("esc").map_or("", |m| m.as_str());
            let name = caps.name("name").map_or("", |m| m.as_str());
            let modifier = caps.name("mod").map_or("", |m| m.as_str());
            let kept_esc = &esc[..esc.len() / 2];

            if esc.len() % 2 == 1 {
                return format!("{}${{{}{}}}", kept_esc, name, modifier);
            }

            let val = match std::env::var(name) {
                Ok(v) => v,
                Err(_) if modifier == "?" => String::new(),
                Err(_) => format!("${{{}}}", name),
            };
            format!("{}{}", kept_esc, val)
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let content = r#"
registry = https://registry.npmjs.org/
strict-ssl = true
"#;
        let result = parse_npmrc(content);
        assert_eq!(
            result.get("registry"),
            Some(&"https://registry.npmjs.org/".to_string())
        );
        assert_eq!(result.get("strict-ssl"), Some(&"true".to_string()));
    }

    #[test]
    fn test_parse_nerf_darted_auth() {
        let content = r#"
//registry.npmjs.org/:_authToken = token123
//registry.mycorp.com/:username = myuser
//registry.mycorp.com/:_password = cGFzc3dvcmQ=
"#;
        let result = parse_npmrc(content);
        assert_eq!(
            result.get("//registry.npmjs.org/:_authToken"),
            Some(&"token123".to_string())
        );
        assert_eq!(
            result.get("//registry.mycorp.com/:_password"),
            Some(&"cGFzc3dvcmQ=".to_string())
        );
    }

    #[test]
    fn test_parse_scoped_registry() {
        let result = parse_npmrc("@myorg:registry=https://registry.mycorp.com/");
        assert_eq!(
            result.get("@myorg:registry"),
            Some(&"https://registry.mycorp.com/".to_string())
        );
    }

    #[test]
    fn test_parse_skips_comments_and_sections() {
        let content = r#"
# comment
; another comment
[section]
registry = https://registry.npmjs.org/
not a pair
"#;
        let result = parse_npmrc(content);
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_parse_value_with_equals() {
        let result = parse_npmrc("//r.example/:_auth = dXNlcjpwYXNz==");
        assert_eq!(
            result.get("//r.example/:_auth"),
            Some(&"dXNlcjpwYXNz==".to_string())
        );
    }

    #[test]
    fn test_parse_quoted_values() {
        let content = "a = \"quoted value\"\nb = 'single'\nc = \"unbalanced'";
        let result = parse_npmrc(content);
        assert_eq!(result.get("a"), Some(&"quoted value".to_string()));
        assert_eq!(result.get("b"), Some(&"single".to_string()));
        assert_eq!(result.get("c"), Some(&"\"unbalanced'".to_string()));
    }

    #[test]
    fn test_parse_last_value_wins() {
        let result = parse_npmrc("registry=https://a.example/\nregistry=https://b.example/");
        assert_eq!(result.get("registry"), Some(&"https://b.example/".to_string()));
    }

    #[test]
    fn test_parse_keeps_bare_dollar_reference() {
        let result = parse_npmrc("//r.example/:_authToken=$PARSER_UNIT_TOKEN");
        assert_eq!(
            result.get("//r.example/:_authToken"),
            Some(&"$PARSER_UNIT_TOKEN".to_string())
        );
    }

    #[test]
    fn test_parse_defers_whole_credential_references() {
        std::env::set_var("PARSER_UNIT_DEFERRED", "$ecret");
        let content = "\
//r.example/:_authToken = ${PARSER_UNIT_DEFERRED}
//r.example/:_password = ${PARSER_UNIT_DEFERRED}
_auth = ${PARSER_UNIT_DEFERRED}
//r.example/:username = ${PARSER_UNIT_DEFERRED}
//r.example/:_authToken-suffix = x${PARSER_UNIT_DEFERRED}
";
        let result = parse_npmrc(content);
        std::env::remove_var("PARSER_UNIT_DEFERRED");

        assert_eq!(
            result.get("//r.example/:_authToken"),
            Some(&"${PARSER_UNIT_DEFERRED}".to_string())
        );
        assert_eq!(
            result.get("//r.example/:_password"),
            Some(&"${PARSER_UNIT_DEFERRED}".to_string())
        );
        assert_eq!(result.get("_auth"), Some(&"${PARSER_UNIT_DEFERRED}".to_string()));
        assert_eq!(
            result.get("//r.example/:username"),
            Some(&"$ecret".to_string())
        );
        assert_eq!(
            result.get("//r.example/:_authToken-suffix"),
            Some(&"x$ecret".to_string())
        );
    }

    #[test]
    fn test_parse_expands_optional_credential_reference() {
        std::env::set_var("PARSER_UNIT_OPTIONAL", "tok");
        let result = parse_npmrc("//r.example/:_authToken = ${PARSER_UNIT_OPTIONAL?}");
        std::env::remove_var("PARSER_UNIT_OPTIONAL");

        assert_eq!(result.get("//r.example/:_authToken"), Some(&"tok".to_string()));
    }

    #[test]
    fn test_expand_env_vars() {
        std::env::set_var("PARSER_UNIT_VAR", "test_value");

        assert_eq!(expand_env_vars("${PARSER_UNIT_VAR}"), "test_value");
        assert_eq!(
            expand_env_vars("prefix_${PARSER_UNIT_VAR}_suffix"),
            "prefix_test_value_suffix"
        );

        std::env::remove_var("PARSER_UNIT_VAR");
    }

    #[test]
    fn test_expand_env_vars_undefined() {
        std::env::remove_var("PARSER_UNIT_UNDEFINED");

        assert_eq!(
            expand_env_vars("${PARSER_UNIT_UNDEFINED}"),
            "${PARSER_UNIT_UNDEFINED}"
        );
        assert_eq!(expand_env_vars("${PARSER_UNIT_UNDEFINED?}"), "");
    }

    #[test]
    fn test_expand_env_vars_escaped() {
        std::env::set_var("PARSER_UNIT_ESC", "value");

        assert_eq!(expand_env_vars("\\${PARSER_UNIT_ESC}"), "${PARSER_UNIT_ESC}");
        assert_eq!(expand_env_vars("\\\\${PARSER_UNIT_ESC}"), "\\value");

        std::env::remove_var("PARSER_UNIT_ESC");
    }
}
