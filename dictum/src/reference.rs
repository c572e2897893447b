//! Tree types shared by the compiler and the resolver.
//!
//! Every map is a `BTreeMap`, so a serialized dictionary is canonical and
//! compiling unchanged inputs twice yields byte-identical output.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::codec::Codec;
use crate::error::CodecError;

/// A value in a namespace tree: a string leaf or a nested subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Text(String),
    Tree(Reference),
}

impl Node {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(text) => Some(text),
            Node::Tree(_) => None,
        }
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Node::Text(text.to_string())
    }
}

impl From<String> for Node {
    fn from(text: String) -> Self {
        Node::Text(text)
    }
}

impl From<Reference> for Node {
    fn from(tree: Reference) -> Self {
        Node::Tree(tree)
    }
}

/// The content of one namespace fragment.
pub type Reference = BTreeMap<String, Node>;

/// Namespace name to namespace tree, for a single locale.
pub type LocaleDictionary = BTreeMap<String, Reference>;

/// Locale name to that locale's namespaces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dictionary(BTreeMap<String, LocaleDictionary>);

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn locale(&self, locale: &str) -> Option<&LocaleDictionary> {
        self.0.get(locale)
    }

    pub fn insert(&mut self, locale: impl Into<String>, dictionary: LocaleDictionary) {
        self.0.insert(locale.into(), dictionary);
    }

    pub fn locales(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &LocaleDictionary)> {
        self.0.iter().map(|(locale, dict)| (locale.as_str(), dict))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl From<BTreeMap<String, LocaleDictionary>> for Dictionary {
    fn from(locales: BTreeMap<String, LocaleDictionary>) -> Self {
        Self(locales)
    }
}

impl FromIterator<(String, LocaleDictionary)> for Dictionary {
    fn from_iter<I: IntoIterator<Item = (String, LocaleDictionary)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Compiler output: the tree itself, or its compressed JSON form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompiledDictionary {
    Raw(Arc<Dictionary>),
    Compressed(Arc<str>),
}

impl CompiledDictionary {
    pub fn raw(dictionary: Dictionary) -> Self {
        CompiledDictionary::Raw(Arc::new(dictionary))
    }

    pub fn compress(dictionary: &Dictionary, codec: &dyn Codec) -> Result<Self, CodecError> {
        let json = dictionary.to_json()?;
        Ok(CompiledDictionary::Compressed(codec.compress(&json)?.into()))
    }

    pub fn is_compressed(&self) -> bool {
        matches!(self, CompiledDictionary::Compressed(_))
    }

    /// The compressed payload, if this is the compressed form.
    pub fn as_compressed(&self) -> Option<&str> {
        match self {
            CompiledDictionary::Compressed(payload) => Some(&**payload),
            CompiledDictionary::Raw(_) => None,
        }
    }

    /// The tree, decompressing and parsing it when needed.
    pub fn expand(&self, codec: &dyn Codec) -> Result<Arc<Dictionary>, CodecError> {
        match self {
            CompiledDictionary::Raw(dictionary) => Ok(Arc::clone(dictionary)),
            CompiledDictionary::Compressed(payload) => {
                let json = codec.decompress(payload)?;
                Ok(Arc::new(Dictionary::from_json(&json)?))
            }
        }
    }
}

impl From<Dictionary> for CompiledDictionary {
    fn from(dictionary: Dictionary) -> Self {
        CompiledDictionary::raw(dictionary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::DeflateBase64;
    use serde_json::json;

    #[test]
    fn test_reference_rejects_non_string_leaves() {
        assert!(serde_json::from_value::<Reference>(json!({"a": {"b": "ok"}})).is_ok());
        assert!(serde_json::from_value::<Reference>(json!({"a": 1})).is_err());
        assert!(serde_json::from_value::<Reference>(json!({"a": {"b": null}})).is_err());
        assert!(serde_json::from_value::<Reference>(json!({"a": ["x"]})).is_err());
        assert!(serde_json::from_value::<Reference>(json!("just a string")).is_err());
    }

    #[test]
    fn test_compressed_round_trip() {
        let dictionary: Dictionary = serde_json::from_value(json!({
            "en-GB": {"common": {"greeting": "Hello", "nav": {"home": "Home"}}},
            "fr-FR": {"common": {"greeting": "Bonjour"}}
        }))
        .unwrap();

        let compiled = CompiledDictionary::compress(&dictionary, &DeflateBase64).unwrap();
        assert!(compiled.is_compressed());
        assert_eq!(*compiled.expand(&DeflateBase64).unwrap(), dictionary);
    }

    #[test]
    fn test_serialization_is_canonical() {
        let a: Dictionary = serde_json::from_str(r#"{"b":{"x":{"k":"v"}},"a":{}}"#).unwrap();
        let b: Dictionary = serde_json::from_str(r#"{"a":{},"b":{"x":{"k":"v"}}}"#).unwrap();
        assert_eq!(a.to_json().unwrap(), b.to_json().unwrap());
    }
}
