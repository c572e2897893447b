use thiserror::Error;

/// Configuration problems that make a `LocaleConfig` unusable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("at least one supported locale is required")]
    NoLocales,
    #[error("at least one supported namespace is required")]
    NoNamespaces,
    #[error("default namespace `{0}` is neither a supported nor a global namespace")]
    UnsupportedDefaultNamespace(String),
    #[error("dictionary path `{template}` is missing the `{placeholder}` placeholder")]
    MissingPlaceholder {
        template: String,
        placeholder: &'static str,
    },
    #[error("invalid locale pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },
    #[error("`{locale}` in {context} is not a supported locale")]
    UnsupportedLocale {
        locale: String,
        context: &'static str,
    },
    #[error("locale `{0}` inherits from itself")]
    SelfInheritance(String),
    #[error("inheritance cycle: {}", .0.join(" -> "))]
    InheritanceCycle(Vec<String>),
}
