//! Environment variable interpolation for config files.
//!
//! Supported syntax:
//! - `$VAR` or `${VAR}` - value of VAR, error if unset
//! - `${VAR:-default}` - default if VAR is unset or empty
//! - `${VAR-default}` - default only if VAR is unset
//! - `$$` - literal `$`

use regex::{Captures, Regex};
use std::sync::LazyLock;

static ENV_VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        \$\$
        |
        \$\{ (?P<braced>[A-Za-z_][A-Za-z0-9_]*) (?: (?P<op>:?-) (?P<default>[^}]*) )? \}
        |
        \$(?P<bare>[A-Za-z_][A-Za-z0-9_]*)
        ",
    )
    .expect("Invalid regex pattern")
});

/// Interpolated text plus every problem found along the way.
#[derive(Debug)]
pub struct InterpolationResult {
    pub text: String,
    pub errors: Vec<String>,
}

impl InterpolationResult {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Interpolate against the process environment.
pub fn interpolate(input: &str) -> InterpolationResult {
    interpolate_with(input, |name| std::env::var(name).ok())
}

/// Interpolate using `lookup` to resolve variable names.
///
/// Errors are accumulated rather than returned on the first miss so a config
/// author sees every missing variable at once.
pub fn interpolate_with<F>(input: &str, lookup: F) -> InterpolationResult
where
    F: Fn(&str) -> Option<String>,
{
    let mut errors = Vec::new();

    let text = ENV_VAR_PATTERN
        .replace_all(input, |caps: &Captures| {
            let Some(name) = caps.name("braced").or_else(|| caps.name("bare")) else {
                return "$".to_string();
            };
            let name = name.as_str();
            let original = caps[0].to_string();
            let op = caps.name("op").map(|m| m.as_str());
            let default = caps.name("default").map(|m| m.as_str());

            match lookup(name) {
                Some(value) if value.contains(['\n', '\r']) => {
                    errors.push(format!(
                        "environment variable '{name}' contains newlines, which is not allowed"
                    ));
                    original
                }
                Some(value) if value.is_empty() && op == Some(":-") => {
                    default.unwrap_or_default().to_string()
                }
                Some(value) => value,
                None => match default {
                    Some(default) => default.to_string(),
                    None => {
                        errors.push(format!("environment variable '{name}' is not set"));
                        original
                    }
                },
            }
        })
        .into_owned();

    InterpolationResult { text, errors }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_bare_and_braced() {
        let result = interpolate_with(
            "port: $PORT, host: ${HOST}",
            env(&[("PORT", "9000"), ("HOST", "::")]),
        );

        assert!(result.is_ok());
        assert_eq!(result.text, "port: 9000, host: ::");
    }

    #[test]
    fn test_missing_variables_are_all_reported() {
        let result = interpolate_with("a: $MISSING_A, b: ${MISSING_B}", env(&[]));

        assert!(!result.is_ok());
        assert_eq!(result.errors.len(), 2);
        assert!(result.errors[0].contains("MISSING_A"));
        assert!(result.errors[1].contains("not set"));
    }

    #[test]
    fn test_colon_default_covers_unset_and_empty() {
        let unset = interpolate_with("${PORT:-8080}", env(&[]));
        let empty = interpolate_with("${PORT:-8080}", env(&[("PORT", "")]));

        assert_eq!(unset.text, "8080");
        assert_eq!(empty.text, "8080");
    }

    #[test]
    fn test_plain_default_keeps_empty_value() {
        let unset = interpolate_with("v: ${NAME-fallback}", env(&[]));
        let empty = interpolate_with("v: ${NAME-fallback}", env(&[("NAME", "")]));

        assert_eq!(unset.text, "v: fallback");
        assert_eq!(empty.text, "v: ");
    }

    #[test]
    fn test_set_variable_wins_over_default() {
        let result = interpolate_with("${URL:-http://default}", env(&[("URL", "http://set")]));

        assert_eq!(result.text, "http://set");
    }

    #[test]
    fn test_escape_sequence() {
        let result = interpolate_with("price: $$5 a pint", env(&[]));

        assert!(result.is_ok());
        assert_eq!(result.text, "price: $5 a pint");
    }

    #[test]
    fn test_newlines_rejected() {
        let result = interpolate_with("v: $EVIL", env(&[("EVIL", "a\nb: c")]));

        assert!(!result.is_ok());
        assert!(result.errors[0].contains("newlines"));
        assert_eq!(result.text, "v: $EVIL");
    }

    #[test]
    fn test_yaml_example() {
        let yaml = r#"
server:
  port: ${PORT:-8080}
upstream:
  base_url: "${BREWERY_API:-https://api.openbrewerydb.org/v1}"
"#;
        let result = interpolate_with(yaml, env(&[("PORT", "3000")]));

        assert!(result.is_ok());
        assert!(result.text.contains("port: 3000"));
        assert!(result.text.contains("https://api.openbrewerydb.org/v1"));
    }
}
