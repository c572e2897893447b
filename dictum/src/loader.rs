use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use dictum_core::{LocaleConfig, Scope};

use crate::error::{LoadError, LoadErrorKind};
use crate::reference::Reference;

/// Source of dictionary fragment text.
///
/// Hosts without a filesystem give the compiler no reader at all instead.
pub trait FileReader: Send + Sync {
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FsReader;

impl FileReader for FsReader {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }
}

/// Fragments held in memory, keyed by the path the template resolves to.
#[derive(Debug, Clone, Default)]
pub struct MemoryReader {
    files: HashMap<PathBuf, String>,
}

impl MemoryReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(mut self, path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        self.insert(path, contents);
        self
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, contents: impl Into<String>) {
        self.files.insert(path.into(), contents.into());
    }
}

impl FileReader for MemoryReader {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such file: {}", path.display()),
            )
        })
    }
}

/// Loads single (scope, namespace) fragments through a `FileReader`.
pub struct Loader<'a> {
    config: &'a LocaleConfig,
    reader: &'a dyn FileReader,
}

impl<'a> Loader<'a> {
    pub fn new(config: &'a LocaleConfig, reader: &'a dyn FileReader) -> Self {
        Self { config, reader }
    }

    /// Locale scopes accept supported namespaces, the global scope accepts
    /// global namespaces.
    pub fn load(&self, scope: &Scope, namespace: &str) -> Result<Reference, LoadError> {
        let path = self.config.dictionary_path.resolve(scope, namespace);

        let allowed = match scope {
            Scope::Locale(_) => self.config.is_supported_namespace(namespace),
            Scope::Global => self.config.is_global_namespace(namespace),
        };
        if !allowed {
            return Err(LoadError::new(
                LoadErrorKind::UnsupportedNamespace,
                scope,
                namespace,
                path,
                "namespace is not configured for this scope",
            ));
        }

        let content = self
            .reader
            .read_to_string(&path)
            .map_err(|e| LoadError::io(scope, namespace, path.clone(), e))?;

        serde_json::from_str(&content).map_err(|e| {
            LoadError::new(LoadErrorKind::Parse, scope, namespace, path, e.to_string())
        })
    }
}
