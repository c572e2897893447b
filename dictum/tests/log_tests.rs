use std::io;
use std::sync::{Arc, Mutex, PoisonError};

use dictum::{
    CompileRequest, Compiler, Dictionary, DictionaryPath, LocaleConfig, MemoryReader,
    MissingDictionary, Resolver, Suppress, TFunction,
};
use tracing::Level;

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Runs `f` under a scoped subscriber and returns what it logged.
fn capture<R>(f: impl FnOnce() -> R) -> (R, Vec<String>) {
    let captured = Captured::default();
    let writer = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_max_level(Level::TRACE)
        .with_ansi(false)
        .with_target(false)
        .without_time()
        .finish();

    let result = tracing::subscriber::with_default(subscriber, f);
    let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
    (result, output.lines().map(|l| l.trim_start().to_string()).collect())
}

fn at<'a>(lines: &'a [String], level: &str) -> Vec<&'a String> {
    lines.iter().filter(|l| l.starts_with(level)).collect()
}

fn config(locales: &[&str]) -> LocaleConfig {
    LocaleConfig::new(
        DictionaryPath::new("d/{locale}/{namespace}.json").unwrap(),
        locales.iter().copied(),
        ["common"],
    )
}

fn resolver() -> Resolver {
    let dictionary =
        Dictionary::from_json(r#"{"en-GB": {"common": {"hello": "Hello"}}}"#).unwrap();
    Resolver::new(&config(&["en-GB"]), Some(dictionary.into()))
}

#[test]
fn test_missing_key_logs_warning() {
    let r = resolver();
    let (text, lines) = capture(|| r.translate("ns.missing.key", None, Some("en-GB")));

    assert_eq!(text, "en-GB.ns.missing.key");
    let warnings = at(&lines, "WARN");
    assert_eq!(warnings.len(), 1, "{lines:?}");
    assert!(warnings[0].contains("en-GB.ns.missing.key"));
    assert!(at(&lines, "ERROR").is_empty(), "{lines:?}");
}

#[test]
fn test_broken_lookups_log_errors() {
    let r = resolver();
    let (text, lines) = capture(|| r.t("common.hello.world"));
    assert_eq!(text, "en-GB.common.hello.world");
    assert_eq!(at(&lines, "ERROR").len(), 1, "{lines:?}");
    assert!(at(&lines, "WARN").is_empty(), "{lines:?}");

    let empty = Resolver::new(&config(&["en-GB"]), None);
    let (text, lines) = capture(|| empty.t("common.hello"));
    assert_eq!(text, "en-GB.common.hello");
    let errors = at(&lines, "ERROR");
    assert_eq!(errors.len(), 1, "{lines:?}");
    assert!(errors[0].contains("no dictionary"));
}

#[test]
fn test_suppressed_missing_file_logs_nothing() {
    let reader = MemoryReader::new().file("d/en-GB/common.json", r#"{"hello": "Hello"}"#);
    let config = config(&["en-GB", "fr-FR", "de-DE"]).suppress(Suppress {
        missing_dictionary: MissingDictionary::Only(vec!["fr-FR".into()]),
        ..Suppress::default()
    });
    let compiler = Compiler::with_reader(config, Arc::new(reader)).unwrap();

    let (report, lines) = capture(|| compiler.compile_report(&CompileRequest::all()));
    assert_eq!(report.unwrap().failures.len(), 1);

    let loud: Vec<_> = lines
        .iter()
        .filter(|l| l.starts_with("WARN") || l.starts_with("ERROR"))
        .collect();
    assert_eq!(loud.len(), 1, "{lines:?}");
    assert!(loud[0].starts_with("ERROR"));
    assert!(loud[0].contains("de-DE"));
    assert!(!lines.iter().any(|l| l.contains("fr-FR") && !l.starts_with("DEBUG")));
}

#[test]
fn test_unparsable_file_logs_error() {
    let reader = MemoryReader::new().file("d/en-GB/common.json", "{not json");
    let config = config(&["en-GB"]).suppress(Suppress {
        missing_dictionary: MissingDictionary::All(true),
        ..Suppress::default()
    });
    let compiler = Compiler::with_reader(config, Arc::new(reader)).unwrap();

    let (_, lines) = capture(|| compiler.compile_all());
    let errors = at(&lines, "ERROR");
    assert_eq!(errors.len(), 1, "{lines:?}");
    assert!(errors[0].contains("en-GB"));
}
