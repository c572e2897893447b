//! YAML loading with `${NAME}` / `${NAME:default}` environment substitution.

use std::borrow::Cow;
use std::env;
use std::fs;
use std::path::Path;
use std::sync::{LazyLock, Once};

use regex::{Captures, Regex};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::error::ConfigError;

#[derive(Debug, Error)]
pub enum YamlLoaderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

static VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::([^}]*))?\}").expect("Invalid regex pattern")
});

static DOTENV: Once = Once::new();

/// Replaces `${NAME}` and `${NAME:default}` with environment values.
///
/// Unset variables without a default become the empty string. A `.env`
/// file in the working directory is read once, if present.
pub fn expand_env(content: &str) -> Cow<'_, str> {
    DOTENV.call_once(|| {
        let _ = dotenvy::dotenv();
    });

    VAR_PATTERN.replace_all(content, |caps: &Captures| {
        env::var(&caps[1])
            .ok()
            .or_else(|| caps.get(2).map(|m| m.as_str().to_string()))
            .unwrap_or_default()
    })
}

pub fn load_from_file<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T, YamlLoaderError> {
    let content = fs::read_to_string(path)?;
    load_from_str(&content)
}

pub fn load_from_str<T: DeserializeOwned>(content: &str) -> Result<T, YamlLoaderError> {
    let expanded = expand_env(content);
    Ok(serde_yaml::from_str(&expanded)?)
}

/// Embeds a YAML file at compile time and deserializes it at runtime.
#[macro_export]
macro_rules! include_yaml {
    ($path:expr, $t:ty) => {
        $crate::yaml::load_from_str::<$t>(include_str!($path))
    };
}

pub use include_yaml;

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn test_expand_env_basic() {
        unsafe {
            env::set_var("DICTUM_TEST_ROOT", "assets/i18n");
        }
        assert_eq!(
            expand_env("path: ${DICTUM_TEST_ROOT}/{locale}/{namespace}.json"),
            "path: assets/i18n/{locale}/{namespace}.json"
        );
    }

    #[test]
    fn test_expand_env_default() {
        assert_eq!(
            expand_env("locale: ${DICTUM_TEST_MISSING:en-GB}"),
            "locale: en-GB"
        );
        assert_eq!(expand_env("locale: ${DICTUM_TEST_MISSING_TOO}"), "locale: ");
    }

    #[test]
    fn test_expand_env_leaves_path_placeholders() {
        let input = "dictionary_path: src/{locale}/{namespace}.json";
        assert_eq!(expand_env(input), input);
    }

    #[test]
    fn test_load_from_str() {
        #[derive(Deserialize, Debug, PartialEq)]
        struct Source {
            root: String,
            depth: u8,
        }

        unsafe {
            env::set_var("DICTUM_TEST_SOURCE", "dictionary");
        }
        let yaml = r#"
        root: ${DICTUM_TEST_SOURCE}
        depth: ${DICTUM_TEST_DEPTH:3}
        "#;

        let source: Source = load_from_str(yaml).unwrap();
        assert_eq!(source.root, "dictionary");
        assert_eq!(source.depth, 3);
    }
}
