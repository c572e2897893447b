//! Right-biased deep merge.
//!
//! Where both sides hold a subtree under the same key the subtrees are merged
//! recursively; anywhere else the overlay's value replaces the base's. Inputs
//! are never modified.

use crate::reference::{LocaleDictionary, Node, Reference};

pub fn merge(base: &Reference, overlay: &Reference) -> Reference {
    let mut merged = base.clone();
    for (key, value) in overlay {
        let node = match (merged.get(key), value) {
            (Some(Node::Tree(lower)), Node::Tree(upper)) => Node::Tree(merge(lower, upper)),
            _ => value.clone(),
        };
        merged.insert(key.clone(), node);
    }
    merged
}

/// Namespace-wise [`merge`] of two locale dictionaries.
pub fn merge_locale(base: &LocaleDictionary, overlay: &LocaleDictionary) -> LocaleDictionary {
    let mut merged = base.clone();
    for (namespace, reference) in overlay {
        let tree = match merged.get(namespace) {
            Some(lower) => merge(lower, reference),
            None => reference.clone(),
        };
        merged.insert(namespace.clone(), tree);
    }
    merged
}
