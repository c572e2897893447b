//! Translation lookup.
//!
//! A key such as `common.nav.home` is resolved under a locale by walking
//! `"{locale}.{key}"` through the dictionary one `.`-separated segment at a
//! time. Lookups never fail from the caller's point of view: on any miss the
//! problem is logged and the walked path itself is returned, so a missing
//! string shows up in the UI as `en-GB.common.nav.home`.

use std::sync::Arc;

use dictum_core::LocaleConfig;
use tracing::error;

use crate::codec::{Codec, default_codec};
use crate::error::ResolveError;
use crate::reference::{CompiledDictionary, Dictionary, Node};

/// Something that turns keys into display strings.
pub trait TFunction {
    /// Resolves `key`, optionally against another dictionary or locale than
    /// the translator's own.
    fn translate_with(
        &self,
        key: &str,
        dictionary: Option<&CompiledDictionary>,
        locale: Option<&str>,
    ) -> String;

    fn t(&self, key: &str) -> String {
        self.translate_with(key, None, None)
    }
}

impl<T: TFunction + ?Sized> TFunction for &T {
    fn translate_with(
        &self,
        key: &str,
        dictionary: Option<&CompiledDictionary>,
        locale: Option<&str>,
    ) -> String {
        (**self).translate_with(key, dictionary, locale)
    }
}

impl<T: TFunction + ?Sized> TFunction for Arc<T> {
    fn translate_with(
        &self,
        key: &str,
        dictionary: Option<&CompiledDictionary>,
        locale: Option<&str>,
    ) -> String {
        (**self).translate_with(key, dictionary, locale)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenOptions {
    /// Keep a compressed dictionary compressed until a lookup needs it,
    /// instead of expanding it once in [`Resolver::gen_t`].
    pub delay_decompression: bool,
}

#[derive(Debug, Clone)]
pub struct Resolver {
    default_locale: String,
    default_namespace: String,
    dictionary: Option<CompiledDictionary>,
    codec: Arc<dyn Codec>,
}

impl Resolver {
    /// `dictionary` is used whenever a lookup does not supply its own.
    pub fn new(config: &LocaleConfig, dictionary: Option<CompiledDictionary>) -> Self {
        Self {
            default_locale: config.default_locale.clone(),
            default_namespace: config.default_namespace.clone(),
            dictionary,
            codec: default_codec(),
        }
    }

    pub fn with_codec(mut self, codec: Arc<dyn Codec>) -> Self {
        self.codec = codec;
        self
    }

    pub fn dictionary(&self) -> Option<&CompiledDictionary> {
        self.dictionary.as_ref()
    }

    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    /// Strict lookup of a namespace-qualified key.
    pub fn lookup(
        &self,
        key: &str,
        dictionary: Option<&CompiledDictionary>,
        locale: Option<&str>,
    ) -> Result<String, ResolveError> {
        let locale = locale.unwrap_or(&self.default_locale);
        let path = format!("{locale}.{key}");

        let Some(dictionary) = dictionary.or(self.dictionary.as_ref()) else {
            return Err(ResolveError::NoDictionary { path });
        };
        let tree = dictionary
            .expand(self.codec.as_ref())
            .map_err(|e| ResolveError::Malformed {
                path: path.clone(),
                reason: e.to_string(),
            })?;

        walk(&tree, &path).map(str::to_string)
    }

    /// Like [`lookup`](Self::lookup), but logs failures and returns the
    /// `"{locale}.{key}"` path in their place.
    pub fn translate(
        &self,
        key: &str,
        dictionary: Option<&CompiledDictionary>,
        locale: Option<&str>,
    ) -> String {
        self.lookup(key, dictionary, locale).unwrap_or_else(|err| {
            err.log();
            err.into_path()
        })
    }

    /// A translator bound to one locale, namespace and dictionary.
    ///
    /// Omitted arguments fall back to the configured defaults and this
    /// resolver's dictionary. A compressed dictionary is expanded here, once,
    /// unless `options.delay_decompression` is set.
    pub fn gen_t(
        &self,
        locale: Option<&str>,
        namespace: Option<&str>,
        dictionary: Option<CompiledDictionary>,
        options: GenOptions,
    ) -> Scoped {
        let mut dictionary = dictionary.or_else(|| self.dictionary.clone());
        if !options.delay_decompression
            && let Some(compiled @ CompiledDictionary::Compressed(_)) = &dictionary
        {
            match compiled.expand(self.codec.as_ref()) {
                Ok(tree) => dictionary = Some(CompiledDictionary::Raw(tree)),
                Err(err) => error!("failed to decompress dictionary: {}", err),
            }
        }

        Scoped {
            resolver: self.clone(),
            locale: locale.unwrap_or(&self.default_locale).to_string(),
            namespace: namespace.unwrap_or(&self.default_namespace).to_string(),
            dictionary,
        }
    }
}

impl TFunction for Resolver {
    fn translate_with(
        &self,
        key: &str,
        dictionary: Option<&CompiledDictionary>,
        locale: Option<&str>,
    ) -> String {
        self.translate(key, dictionary, locale)
    }
}

fn walk<'d>(dictionary: &'d Dictionary, path: &str) -> Result<&'d str, ResolveError> {
    let not_found = || ResolveError::NotFound {
        path: path.to_string(),
    };

    let mut segments = path.split('.');
    let namespaces = segments
        .next()
        .and_then(|locale| dictionary.locale(locale))
        .ok_or_else(not_found)?;
    let mut node = segments
        .next()
        .and_then(|namespace| namespaces.get(namespace))
        .ok_or_else(not_found)?;

    let mut segments = segments.peekable();
    while let Some(segment) = segments.next() {
        match node.get(segment) {
            None => return Err(not_found()),
            Some(Node::Tree(tree)) => node = tree,
            Some(Node::Text(text)) if segments.peek().is_none() => return Ok(text.as_str()),
            Some(Node::Text(_)) => {
                return Err(ResolveError::Malformed {
                    path: path.to_string(),
                    reason: format!("`{segment}` is a string, not a subtree"),
                });
            }
        }
    }

    // the path ended on a namespace or subtree
    Err(not_found())
}

/// Translator returned by [`Resolver::gen_t`].
#[derive(Debug, Clone)]
pub struct Scoped {
    resolver: Resolver,
    locale: String,
    namespace: String,
    dictionary: Option<CompiledDictionary>,
}

impl Scoped {
    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Whether the bound dictionary is still in compressed form.
    pub fn is_compressed(&self) -> bool {
        self.dictionary
            .as_ref()
            .is_some_and(CompiledDictionary::is_compressed)
    }
}

impl TFunction for Scoped {
    fn translate_with(
        &self,
        key: &str,
        dictionary: Option<&CompiledDictionary>,
        locale: Option<&str>,
    ) -> String {
        self.resolver.translate(
            &format!("{}.{}", self.namespace, key),
            dictionary.or(self.dictionary.as_ref()),
            Some(locale.unwrap_or(&self.locale)),
        )
    }
}

/// Translator returned by [`adapt_namespace`].
#[derive(Debug, Clone)]
pub struct Adapted<T> {
    inner: T,
    namespace: String,
}

/// Wraps `inner` so every key is prefixed with `namespace` before delegating.
pub fn adapt_namespace<T: TFunction>(inner: T, namespace: impl Into<String>) -> Adapted<T> {
    Adapted {
        inner,
        namespace: namespace.into(),
    }
}

impl<T: TFunction> TFunction for Adapted<T> {
    fn translate_with(
        &self,
        key: &str,
        dictionary: Option<&CompiledDictionary>,
        locale: Option<&str>,
    ) -> String {
        self.inner
            .translate_with(&format!("{}.{}", self.namespace, key), dictionary, locale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{DeflateBase64, Identity};
    use dictum_core::DictionaryPath;
    use serde_json::json;

    fn config() -> LocaleConfig {
        LocaleConfig::new(
            DictionaryPath::new("{locale}/{namespace}.json").unwrap(),
            ["en-GB", "fr-FR"],
            ["common", "errors"],
        )
    }

    fn dictionary() -> Dictionary {
        serde_json::from_value(json!({
            "en-GB": {
                "common": {"hello": "Hello", "nav": {"home": "Home"}},
                "errors": {"404": "Not found"}
            },
            "fr-FR": {
                "common": {"hello": "Bonjour"}
            }
        }))
        .unwrap()
    }

    fn resolver() -> Resolver {
        Resolver::new(&config(), Some(dictionary().into()))
    }

    #[test]
    fn test_lookup_walks_segments() {
        let r = resolver();
        assert_eq!(r.lookup("common.hello", None, None).unwrap(), "Hello");
        assert_eq!(r.lookup("common.nav.home", None, None).unwrap(), "Home");
        assert_eq!(
            r.lookup("common.hello", None, Some("fr-FR")).unwrap(),
            "Bonjour"
        );
    }

    #[test]
    fn test_lookup_failures() {
        let r = resolver();
        assert_eq!(
            r.lookup("common.missing", None, None),
            Err(ResolveError::NotFound {
                path: "en-GB.common.missing".into()
            })
        );
        // ends on a subtree
        assert!(matches!(
            r.lookup("common.nav", None, None),
            Err(ResolveError::NotFound { .. })
        ));
        assert!(matches!(
            r.lookup("common", None, None),
            Err(ResolveError::NotFound { .. })
        ));
        assert!(matches!(
            r.lookup("common.hello", None, Some("de-DE")),
            Err(ResolveError::NotFound { .. })
        ));
        // a string where a subtree was expected
        let malformed = r.lookup("common.hello.world", None, None).unwrap_err();
        assert!(matches!(malformed, ResolveError::Malformed { .. }));
        assert!(!malformed.is_warning());

        assert!(r.lookup("common.missing", None, None).unwrap_err().is_warning());
        let no_dictionary = Resolver::new(&config(), None)
            .lookup("common.hello", None, None)
            .unwrap_err();
        assert!(!no_dictionary.is_warning());
    }

    #[test]
    fn test_translate_falls_back_to_path() {
        let r = resolver();
        assert_eq!(r.translate("common.hello", None, None), "Hello");
        assert_eq!(
            r.translate("common.missing.key", None, Some("fr-FR")),
            "fr-FR.common.missing.key"
        );

        let empty = Resolver::new(&config(), None);
        assert_eq!(
            empty.lookup("common.hello", None, None),
            Err(ResolveError::NoDictionary {
                path: "en-GB.common.hello".into()
            })
        );
        assert_eq!(empty.t("common.hello"), "en-GB.common.hello");
    }

    #[test]
    fn test_supplied_dictionary_overrides_own() {
        let other: CompiledDictionary =
            Dictionary::from_json(r#"{"en-GB": {"common": {"hello": "Howdy"}}}"#)
                .unwrap()
                .into();
        let r = resolver();
        assert_eq!(r.translate("common.hello", Some(&other), None), "Howdy");
    }

    #[test]
    fn test_compressed_dictionary() {
        let compressed = CompiledDictionary::compress(&dictionary(), &DeflateBase64).unwrap();
        let r = Resolver::new(&config(), Some(compressed));
        assert_eq!(r.t("errors.404"), "Not found");

        let garbage = CompiledDictionary::Compressed("@@@".into());
        assert!(matches!(
            r.lookup("errors.404", Some(&garbage), None),
            Err(ResolveError::Malformed { .. })
        ));
        assert_eq!(r.translate("errors.404", Some(&garbage), None), "en-GB.errors.404");
    }

    #[test]
    fn test_codec_must_match() {
        let json = CompiledDictionary::compress(&dictionary(), &Identity).unwrap();
        let r = Resolver::new(&config(), Some(json)).with_codec(Arc::new(Identity));
        assert_eq!(r.t("common.hello"), "Hello");
    }

    #[test]
    fn test_gen_t_scopes_namespace_and_locale() {
        let r = resolver();

        let common = r.gen_t(None, None, None, GenOptions::default());
        assert_eq!(common.locale(), "en-GB");
        assert_eq!(common.namespace(), "common");
        assert_eq!(common.t("nav.home"), "Home");
        assert_eq!(common.translate_with("hello", None, Some("fr-FR")), "Bonjour");

        let errors = r.gen_t(Some("fr-FR"), Some("errors"), None, GenOptions::default());
        assert_eq!(errors.t("404"), "fr-FR.errors.404");
    }

    #[test]
    fn test_gen_t_decompression_timing() {
        let compressed = CompiledDictionary::compress(&dictionary(), &DeflateBase64).unwrap();
        let r = resolver();

        let eager = r.gen_t(None, None, Some(compressed.clone()), GenOptions::default());
        assert!(!eager.is_compressed());
        assert_eq!(eager.t("hello"), "Hello");

        let lazy = r.gen_t(
            None,
            None,
            Some(compressed),
            GenOptions {
                delay_decompression: true,
            },
        );
        assert!(lazy.is_compressed());
        assert_eq!(lazy.t("hello"), "Hello");
    }

    #[test]
    fn test_adapt_namespace() {
        let r = resolver();

        let errors = adapt_namespace(&r, "errors");
        assert_eq!(errors.t("404"), "Not found");

        // adapting a scoped translator nests under its namespace
        let common = r.gen_t(None, None, None, GenOptions::default());
        let nav = adapt_namespace(common, "nav");
        assert_eq!(nav.t("home"), "Home");
        assert_eq!(nav.t("away"), "en-GB.common.nav.away");
    }
}
