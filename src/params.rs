//! Query parameter collection with deterministic, signature-stable encoding.

use crate::sign::percent_encode;

/// A single `name=value` query parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub value: String,
}

impl Param {
    /// Encodes as `name=percent-encoded(value)`. Names are emitted verbatim.
    pub fn encode(&self) -> String {
        format!("{}={}", self.name, percent_encode(&self.value))
    }
}

/// An ordered multiset of query parameters.
///
/// Insertion order is irrelevant to the wire form: [`Params::encode`] always emits
/// parameters sorted by name, keeping insertion order among equal names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    items: Vec<Param>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a parameter. Existing entries with the same name are kept.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.items.push(Param {
            name: name.into(),
            value: value.into(),
        });
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Param> {
        self.items.iter()
    }

    /// Returns the first value stored under `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.items
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value.as_str())
    }

    /// Stable in-place sort by name.
    pub fn sort(&mut self) {
        self.items.sort_by(|a, b| a.name.cmp(&b.name));
    }

    /// Encodes every parameter sorted by name and joined with `&`.
    pub fn encode(&self) -> String {
        let mut sorted: Vec<&Param> = self.items.iter().collect();
        sorted.sort_by(|a, b| a.name.cmp(&b.name));
        sorted
            .iter()
            .map(|p| p.encode())
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (k, v) in iter {
            params.add(k, v);
        }
        params
    }
}
