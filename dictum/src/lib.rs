//! Locale dictionary compiler and translation resolver.
//!
//! A [`Compiler`] assembles per-locale translation trees from JSON fragments
//! laid out by a [`LocaleConfig`] path template, folds in inherited locales
//! and global namespaces, and optionally compresses the result. A
//! [`Resolver`] looks dotted keys up in that output and never fails: misses
//! come back as the visible `"{locale}.{key}"` path.
//!
//! ```
//! use std::sync::Arc;
//! use dictum::{CompileRequest, Compiler, DictionaryPath, GenOptions, LocaleConfig, MemoryReader, Resolver, TFunction};
//!
//! let config = LocaleConfig::new(
//!     DictionaryPath::new("locales/{locale}/{namespace}.json").unwrap(),
//!     ["en-GB", "en-US"],
//!     ["common"],
//! )
//! .inherit("en-US", ["en-GB"]);
//!
//! let reader = MemoryReader::new()
//!     .file("locales/en-GB/common.json", r#"{"colour": "Colour", "hello": "Hello"}"#)
//!     .file("locales/en-US/common.json", r#"{"colour": "Color"}"#);
//!
//! let compiler = Compiler::with_reader(config.clone(), Arc::new(reader)).unwrap();
//! let dictionary = compiler.compile(&CompileRequest::all()).unwrap();
//! assert!(dictionary.is_compressed());
//!
//! let resolver = Resolver::new(&config, Some(dictionary));
//! let t = resolver.gen_t(Some("en-US"), None, None, GenOptions::default());
//! assert_eq!(t.t("colour"), "Color");
//! assert_eq!(t.t("hello"), "Hello");
//! assert_eq!(t.t("missing"), "en-US.common.missing");
//! ```

pub mod codec;
pub mod compiler;
pub mod dedup;
pub mod error;
pub mod loader;
pub mod merge;
pub mod reference;
pub mod resolver;

pub use codec::{Codec, DeflateBase64, Identity};
pub use compiler::{Compilation, CompileRequest, Compiler};
pub use dedup::Dedup;
pub use error::{CodecError, LoadError, LoadErrorKind, ResolveError};
pub use loader::{FileReader, FsReader, Loader, MemoryReader};
pub use merge::{merge, merge_locale};
pub use reference::{CompiledDictionary, Dictionary, LocaleDictionary, Node, Reference};
pub use resolver::{Adapted, GenOptions, Resolver, Scoped, TFunction, adapt_namespace};

pub use dictum_core::{
    ConfigError, ConfigWarning, DictionaryPath, GLOBAL_SCOPE, LocaleConfig, MissingDictionary,
    Scope, Suppress,
};
