//! Locale configuration consumed by the dictionary compiler and resolver.
//!
//! A `LocaleConfig` is built once (usually from YAML, see [`crate::yaml`])
//! and never mutated afterwards. [`LocaleConfig::validate`] rejects
//! configurations the compiler cannot work with; [`LocaleConfig::check`]
//! reports the softer problems the compiler tolerates.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};

use log::{error, warn};
use regex::Regex;
use serde::{Deserialize, Deserializer};

use crate::error::ConfigError;
use crate::yaml::{self, YamlLoaderError};

/// Directory name substituted for `{locale}` when loading global namespaces.
pub const GLOBAL_SCOPE: &str = "GLOBAL";

pub const DEFAULT_LOCALE_PATTERN: &str = "[a-z]{2}-[A-Z]{2}";

const LOCALE_PLACEHOLDER: &str = "{locale}";
const NAMESPACE_PLACEHOLDER: &str = "{namespace}";

/// Where a dictionary fragment comes from: a concrete locale or the shared
/// global directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scope {
    Locale(String),
    Global,
}

impl Scope {
    pub fn locale(locale: impl Into<String>) -> Self {
        Scope::Locale(locale.into())
    }

    /// The identifier used both in the path template and in suppression lists.
    pub fn as_str(&self) -> &str {
        match self {
            Scope::Locale(locale) => locale,
            Scope::Global => GLOBAL_SCOPE,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Path template containing both `{locale}` and `{namespace}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct DictionaryPath(String);

impl DictionaryPath {
    pub fn new(template: impl Into<String>) -> Result<Self, ConfigError> {
        let template = template.into();
        for placeholder in [LOCALE_PLACEHOLDER, NAMESPACE_PLACEHOLDER] {
            if !template.contains(placeholder) {
                return Err(ConfigError::MissingPlaceholder {
                    template,
                    placeholder,
                });
            }
        }
        Ok(Self(template))
    }

    pub fn template(&self) -> &str {
        &self.0
    }

    /// Substitutes the scope and namespace into the template.
    ///
    /// Placeholders are matched literally in a single left-to-right pass, so a
    /// substituted value is never itself re-scanned for placeholders.
    pub fn resolve(&self, scope: &Scope, namespace: &str) -> PathBuf {
        let locale = scope.as_str();
        let mut out = String::with_capacity(self.0.len() + locale.len() + namespace.len());
        let mut rest = self.0.as_str();

        while let Some(start) = rest.find('{') {
            out.push_str(&rest[..start]);
            let tail = &rest[start..];
            if let Some(after) = tail.strip_prefix(LOCALE_PLACEHOLDER) {
                out.push_str(locale);
                rest = after;
            } else if let Some(after) = tail.strip_prefix(NAMESPACE_PLACEHOLDER) {
                out.push_str(namespace);
                rest = after;
            } else {
                out.push('{');
                rest = &tail[1..];
            }
        }
        out.push_str(rest);

        PathBuf::from(out)
    }
}

impl TryFrom<String> for DictionaryPath {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for DictionaryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `true`/`false` for every scope, or a list of locale identifiers
/// (and/or `GLOBAL`) whose missing files are not reported.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum MissingDictionary {
    All(bool),
    Only(Vec<String>),
}

impl Default for MissingDictionary {
    fn default() -> Self {
        MissingDictionary::All(false)
    }
}

impl MissingDictionary {
    pub fn suppresses(&self, scope: &Scope) -> bool {
        match self {
            MissingDictionary::All(all) => *all,
            MissingDictionary::Only(scopes) => scopes.iter().any(|s| s == scope.as_str()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Suppress {
    pub missing_dictionary: MissingDictionary,
    pub locale_satisfies_pattern: bool,
    pub default_locale_is_supported: bool,
}

impl Suppress {
    /// Whether a `NotFound` load failure for `scope` should stay silent.
    pub fn suppresses_missing(&self, scope: &Scope) -> bool {
        self.missing_dictionary.suppresses(scope)
    }
}

/// Soft configuration problems, reported but tolerated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    PatternMismatch { locale: String, pattern: String },
    DefaultLocaleUnsupported(String),
    OverlappingNamespace(String),
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigWarning::PatternMismatch { locale, pattern } => {
                write!(f, "locale `{locale}` does not match the pattern `{pattern}`")
            }
            ConfigWarning::DefaultLocaleUnsupported(locale) => {
                write!(f, "default locale `{locale}` is not a supported locale")
            }
            ConfigWarning::OverlappingNamespace(namespace) => {
                write!(f, "namespace `{namespace}` is both supported and global")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LocaleConfig {
    #[serde(deserialize_with = "deserialize_unique")]
    pub supported_locales: Vec<String>,
    #[serde(deserialize_with = "deserialize_unique")]
    pub supported_namespaces: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_unique")]
    pub global_namespaces: Vec<String>,
    pub default_locale: String,
    pub default_namespace: String,
    #[serde(default = "default_locale_pattern")]
    pub locale_pattern: String,
    pub dictionary_path: DictionaryPath,
    #[serde(default)]
    pub inherits: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub suppress: Suppress,
    #[serde(default)]
    pub opt_out_compression: bool,
}

fn default_locale_pattern() -> String {
    DEFAULT_LOCALE_PATTERN.to_string()
}

fn deserialize_unique<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Vec::<String>::deserialize(deserializer).map(unique_in_order)
}

/// Removes repeated entries, keeping the first occurrence of each.
pub fn unique_in_order<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .map(Into::into)
        .filter(|item: &String| seen.insert(item.clone()))
        .collect()
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

impl LocaleConfig {
    /// Minimal configuration; the first locale and namespace become the defaults.
    pub fn new<L, N>(dictionary_path: DictionaryPath, locales: L, namespaces: N) -> Self
    where
        L: IntoIterator,
        L::Item: Into<String>,
        N: IntoIterator,
        N::Item: Into<String>,
    {
        let supported_locales = unique_in_order(locales);
        let supported_namespaces = unique_in_order(namespaces);
        Self {
            default_locale: supported_locales.first().cloned().unwrap_or_default(),
            default_namespace: supported_namespaces.first().cloned().unwrap_or_default(),
            supported_locales,
            supported_namespaces,
            global_namespaces: Vec::new(),
            locale_pattern: default_locale_pattern(),
            dictionary_path,
            inherits: BTreeMap::new(),
            suppress: Suppress::default(),
            opt_out_compression: false,
        }
    }

    pub fn global_namespaces<N>(mut self, namespaces: N) -> Self
    where
        N: IntoIterator,
        N::Item: Into<String>,
    {
        self.global_namespaces = unique_in_order(namespaces);
        self
    }

    pub fn default_locale(mut self, locale: impl Into<String>) -> Self {
        self.default_locale = locale.into();
        self
    }

    pub fn default_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.default_namespace = namespace.into();
        self
    }

    pub fn locale_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.locale_pattern = pattern.into();
        self
    }

    /// Sets the ordered fallback chain of `locale`. Earlier entries take
    /// priority over later ones, and the locale's own content beats them all.
    pub fn inherit<C>(mut self, locale: impl Into<String>, chain: C) -> Self
    where
        C: IntoIterator,
        C::Item: Into<String>,
    {
        self.inherits
            .insert(locale.into(), chain.into_iter().map(Into::into).collect());
        self
    }

    pub fn suppress(mut self, suppress: Suppress) -> Self {
        self.suppress = suppress;
        self
    }

    pub fn opt_out_compression(mut self, opt_out: bool) -> Self {
        self.opt_out_compression = opt_out;
        self
    }

    /// Parses, validates and checks a YAML configuration file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, YamlLoaderError> {
        let config: Self = yaml::load_from_file(path)?;
        config.validate()?;
        config.check();
        Ok(config)
    }

    /// Parses, validates and checks a YAML configuration document.
    pub fn from_yaml_str(content: &str) -> Result<Self, YamlLoaderError> {
        let config: Self = yaml::load_from_str(content)?;
        config.validate()?;
        config.check();
        Ok(config)
    }

    pub fn is_supported_locale(&self, locale: &str) -> bool {
        self.supported_locales.iter().any(|l| l == locale)
    }

    pub fn is_supported_namespace(&self, namespace: &str) -> bool {
        self.supported_namespaces.iter().any(|n| n == namespace)
    }

    pub fn is_global_namespace(&self, namespace: &str) -> bool {
        self.global_namespaces.iter().any(|n| n == namespace)
    }

    /// The fallback chain of `locale`, empty when none is configured.
    pub fn inherits_of(&self, locale: &str) -> &[String] {
        self.inherits.get(locale).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn locale_regex(&self) -> Result<Regex, ConfigError> {
        Regex::new(&self.locale_pattern).map_err(|e| ConfigError::InvalidPattern {
            pattern: self.locale_pattern.clone(),
            reason: e.to_string(),
        })
    }

    /// Rejects configurations the compiler cannot work with, including any
    /// cycle in the inheritance graph.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.supported_locales.is_empty() {
            return Err(ConfigError::NoLocales);
        }
        if self.supported_namespaces.is_empty() {
            return Err(ConfigError::NoNamespaces);
        }
        if !self.is_supported_namespace(&self.default_namespace)
            && !self.is_global_namespace(&self.default_namespace)
        {
            return Err(ConfigError::UnsupportedDefaultNamespace(
                self.default_namespace.clone(),
            ));
        }
        self.locale_regex()?;

        for (heir, chain) in &self.inherits {
            if !self.is_supported_locale(heir) {
                return Err(ConfigError::UnsupportedLocale {
                    locale: heir.clone(),
                    context: "inherits",
                });
            }
            for parent in chain {
                if parent == heir {
                    return Err(ConfigError::SelfInheritance(heir.clone()));
                }
                if !self.is_supported_locale(parent) {
                    return Err(ConfigError::UnsupportedLocale {
                        locale: parent.clone(),
                        context: "an inheritance chain",
                    });
                }
            }
        }

        self.inheritance_order().map(|_| ())
    }

    /// Reports tolerated problems through the log and returns them.
    pub fn check(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if !self.suppress.locale_satisfies_pattern
            && let Ok(pattern) = self.locale_regex()
        {
            for locale in &self.supported_locales {
                if !pattern.is_match(locale) {
                    warnings.push(ConfigWarning::PatternMismatch {
                        locale: locale.clone(),
                        pattern: self.locale_pattern.clone(),
                    });
                }
            }
        }

        if !self.suppress.default_locale_is_supported
            && !self.is_supported_locale(&self.default_locale)
        {
            warnings.push(ConfigWarning::DefaultLocaleUnsupported(
                self.default_locale.clone(),
            ));
        }

        for namespace in &self.global_namespaces {
            if self.is_supported_namespace(namespace) {
                warnings.push(ConfigWarning::OverlappingNamespace(namespace.clone()));
            }
        }

        for warning in &warnings {
            match warning {
                ConfigWarning::DefaultLocaleUnsupported(_) => error!("{}", warning),
                _ => warn!("{}", warning),
            }
        }

        warnings
    }

    /// Supported locales ordered so every locale comes after everything it
    /// inherits from.
    pub fn inheritance_order(&self) -> Result<Vec<String>, ConfigError> {
        let mut marks = HashMap::new();
        let mut path = Vec::new();
        let mut order = Vec::with_capacity(self.supported_locales.len());

        for locale in &self.supported_locales {
            self.visit(locale, &mut marks, &mut path, &mut order)?;
        }
        Ok(order)
    }

    fn visit<'a>(
        &'a self,
        locale: &'a str,
        marks: &mut HashMap<&'a str, Mark>,
        path: &mut Vec<&'a str>,
        order: &mut Vec<String>,
    ) -> Result<(), ConfigError> {
        match marks.get(locale) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::Visiting) => {
                let start = path.iter().position(|l| *l == locale).unwrap_or(0);
                let mut cycle: Vec<String> = path[start..].iter().map(|l| l.to_string()).collect();
                cycle.push(locale.to_string());
                return Err(ConfigError::InheritanceCycle(cycle));
            }
            None => {}
        }

        marks.insert(locale, Mark::Visiting);
        path.push(locale);
        for parent in self.inherits_of(locale) {
            self.visit(parent, marks, path, order)?;
        }
        path.pop();
        marks.insert(locale, Mark::Done);
        order.push(locale.to_string());
        Ok(())
    }
}
