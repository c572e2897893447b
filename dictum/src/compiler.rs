//! Dictionary compilation.
//!
//! For each requested locale the compiler:
//!
//! 1. loads every requested supported namespace from disk,
//! 2. folds in the locales it inherits from (own content first, then the
//!    chain in listed order),
//! 3. lays everything over the global namespaces,
//! 4. compresses the result unless the config opts out.
//!
//! Load failures never abort a compile. They are logged (unless the
//! `suppress.missing_dictionary` policy silences them) and returned in the
//! [`Compilation`] report; the affected namespace is simply absent.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use dictum_core::config::unique_in_order;
use dictum_core::{ConfigError, ConfigWarning, LocaleConfig, Scope};
use tracing::{debug, error, info, warn};

use crate::codec::{Codec, default_codec};
use crate::error::LoadError;
use crate::loader::{FileReader, FsReader, Loader};
use crate::merge::merge_locale;
use crate::reference::{CompiledDictionary, Dictionary, LocaleDictionary};

/// Which locales and namespaces to compile. `None` means all configured ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileRequest {
    locales: Option<Vec<String>>,
    namespaces: Option<Vec<String>>,
}

impl CompileRequest {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn locales<I>(mut self, locales: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.locales = Some(unique_in_order(locales));
        self
    }

    pub fn namespaces<I>(mut self, namespaces: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.namespaces = Some(unique_in_order(namespaces));
        self
    }
}

#[derive(Debug, Clone)]
pub struct Compilation {
    pub dictionary: CompiledDictionary,
    /// Failures that were reported; suppressed ones are not listed.
    pub failures: Vec<LoadError>,
}

pub struct Compiler {
    config: Arc<LocaleConfig>,
    reader: Option<Arc<dyn FileReader>>,
    codec: Arc<dyn Codec>,
    order: Vec<String>,
    warnings: Vec<ConfigWarning>,
}

impl Compiler {
    /// Compiler reading fragments from the local filesystem.
    pub fn new(config: impl Into<Arc<LocaleConfig>>) -> Result<Self, ConfigError> {
        Self::build(config.into(), Some(Arc::new(FsReader)))
    }

    pub fn with_reader(
        config: impl Into<Arc<LocaleConfig>>,
        reader: Arc<dyn FileReader>,
    ) -> Result<Self, ConfigError> {
        Self::build(config.into(), Some(reader))
    }

    /// Compiler for hosts without file access; every compile yields `None`.
    pub fn without_filesystem(config: impl Into<Arc<LocaleConfig>>) -> Result<Self, ConfigError> {
        Self::build(config.into(), None)
    }

    fn build(
        config: Arc<LocaleConfig>,
        reader: Option<Arc<dyn FileReader>>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let order = config.inheritance_order()?;
        let warnings = config.check();
        Ok(Self {
            config,
            reader,
            codec: default_codec(),
            order,
            warnings,
        })
    }

    pub fn codec(mut self, codec: Arc<dyn Codec>) -> Self {
        self.codec = codec;
        self
    }

    pub fn config(&self) -> &Arc<LocaleConfig> {
        &self.config
    }

    /// Tolerated config problems found when the compiler was built.
    pub fn warnings(&self) -> &[ConfigWarning] {
        &self.warnings
    }

    pub fn compile(&self, request: &CompileRequest) -> Option<CompiledDictionary> {
        self.compile_report(request).map(|c| c.dictionary)
    }

    pub fn compile_all(&self) -> Option<CompiledDictionary> {
        self.compile(&CompileRequest::all())
    }

    pub fn compile_report(&self, request: &CompileRequest) -> Option<Compilation> {
        let Some(reader) = self.reader.as_deref() else {
            debug!("no file reader available, skipping dictionary compilation");
            return None;
        };

        let loader = Loader::new(&self.config, reader);
        let locales = self.requested_locales(request);
        let namespaces = self.requested_namespaces(request);
        let needed = self.with_fallbacks(&locales);
        let mut failures = Vec::new();

        // Direct load, in inheritance order so parents are folded before heirs.
        let mut loaded: BTreeMap<String, LocaleDictionary> = BTreeMap::new();
        for locale in self.order.iter().filter(|l| needed.contains(l.as_str())) {
            let scope = Scope::locale(locale.as_str());
            let mut own = LocaleDictionary::new();
            for namespace in namespaces
                .iter()
                .filter(|ns| self.config.is_supported_namespace(ns))
            {
                match loader.load(&scope, namespace) {
                    Ok(reference) => {
                        own.insert(namespace.clone(), reference);
                    }
                    Err(err) => self.report(err, &mut failures),
                }
            }
            loaded.insert(locale.clone(), own);
        }

        for locale in self.order.iter().filter(|l| needed.contains(l.as_str())) {
            let chain = self.config.inherits_of(locale);
            if chain.is_empty() {
                continue;
            }

            let mut fallback = LocaleDictionary::new();
            for parent in chain.iter().rev() {
                if let Some(inherited) = loaded.get(parent) {
                    fallback = merge_locale(&fallback, inherited);
                }
            }
            let own = loaded.remove(locale).unwrap_or_default();
            loaded.insert(locale.clone(), merge_locale(&fallback, &own));
        }

        let mut global = LocaleDictionary::new();
        for namespace in namespaces
            .iter()
            .filter(|ns| self.config.is_global_namespace(ns))
        {
            match loader.load(&Scope::Global, namespace) {
                Ok(reference) => {
                    global.insert(namespace.clone(), reference);
                }
                Err(err) => self.report(err, &mut failures),
            }
        }

        let dictionary: Dictionary = locales
            .iter()
            .map(|locale| {
                let own = loaded.get(locale).cloned().unwrap_or_default();
                let mut merged = merge_locale(&global, &own);
                merged.retain(|namespace, _| namespaces.contains(namespace));
                (locale.clone(), merged)
            })
            .collect();

        let compiled = self.finish(dictionary);
        info!(
            locales = locales.len(),
            namespaces = namespaces.len(),
            failures = failures.len(),
            compressed = compiled.is_compressed(),
            "compiled dictionary"
        );

        Some(Compilation {
            dictionary: compiled,
            failures,
        })
    }

    fn finish(&self, dictionary: Dictionary) -> CompiledDictionary {
        if self.config.opt_out_compression {
            return CompiledDictionary::raw(dictionary);
        }
        match CompiledDictionary::compress(&dictionary, self.codec.as_ref()) {
            Ok(compressed) => compressed,
            Err(err) => {
                error!("failed to compress dictionary, keeping it uncompressed: {}", err);
                CompiledDictionary::raw(dictionary)
            }
        }
    }

    fn report(&self, err: LoadError, failures: &mut Vec<LoadError>) {
        if err.is_not_found() && self.config.suppress.suppresses_missing(&err.scope) {
            debug!(path = %err.path.display(), "missing dictionary suppressed");
            return;
        }
        error!(scope = %err.scope, namespace = %err.namespace, "{}", err);
        failures.push(err);
    }

    fn requested_locales(&self, request: &CompileRequest) -> Vec<String> {
        let Some(requested) = &request.locales else {
            return self.config.supported_locales.clone();
        };
        requested
            .iter()
            .filter(|locale| {
                let supported = self.config.is_supported_locale(locale);
                if !supported {
                    warn!(locale = %locale, "skipping unsupported locale");
                }
                supported
            })
            .cloned()
            .collect()
    }

    fn requested_namespaces(&self, request: &CompileRequest) -> Vec<String> {
        match &request.namespaces {
            Some(requested) => requested.clone(),
            None => unique_in_order(
                self.config
                    .supported_namespaces
                    .iter()
                    .chain(&self.config.global_namespaces)
                    .map(String::as_str),
            ),
        }
    }

    /// The requested locales plus everything reachable through `inherits`.
    fn with_fallbacks<'a>(&'a self, locales: &'a [String]) -> HashSet<&'a str> {
        let mut needed = HashSet::new();
        let mut pending: Vec<&str> = locales.iter().map(String::as_str).collect();
        while let Some(locale) = pending.pop() {
            if needed.insert(locale) {
                pending.extend(self.config.inherits_of(locale).iter().map(String::as_str));
            }
        }
        needed
    }
}
