//! Coverage metadata
//!
//! Raster sources describe themselves with loose key/value pairs whose keys
//! vary between producers, so every lookup names a key and an alias.

use crate::documents::Element;
use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Key/value metadata of a coverage source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoverageMetadata {
    entries: IndexMap<String, Vec<String>>,
}

impl CoverageMetadata {
    /// Empty metadata
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a value; a key may be recorded more than once
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.entry(key.into()).or_default().push(value.into());
    }

    /// Builder form of [`insert`](Self::insert)
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Every recorded key and its values
    pub fn entries(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// The value recorded under `key` or `alias`, if any
    ///
    /// Fails with [`Error::AmbiguousMetadata`] when the two names, or repeated
    /// entries of one name, hold different values.
    pub fn get_optional(&self, key: &str, alias: &str) -> Result<Option<&str>> {
        let mut found: Option<&str> = None;
        let names = if key == alias { vec![key] } else { vec![key, alias] };
        for value in names
            .into_iter()
            .filter_map(|name| self.entries.get(name))
            .flatten()
        {
            match found {
                Some(previous) if previous != value => {
                    return Err(Error::AmbiguousMetadata {
                        key: key.to_string(),
                        alias: alias.to_string(),
                    })
                }
                _ => found = Some(value),
            }
        }
        Ok(found)
    }

    /// The value recorded under `key` or `alias`
    pub fn get(&self, key: &str, alias: &str) -> Result<&str> {
        self.get_optional(key, alias)?
            .ok_or_else(|| Error::MissingMetadata {
                key: key.to_string(),
                alias: alias.to_string(),
            })
    }

    /// [`get`](Self::get) parsed as `T`
    pub fn get_parsed<T: FromStr>(&self, key: &str, alias: &str) -> Result<T>
    where
        T::Err: std::fmt::Display,
    {
        let value = self.get(key, alias)?;
        value.trim().parse().map_err(|e: T::Err| {
            Error::Value(format!("metadata '{}' = '{}': {}", key, value, e))
        })
    }

    /// Collect the text of every leaf element below `element`, keyed by
    /// local name
    pub fn from_element(element: &Element) -> Self {
        let mut metadata = Self::new();
        for leaf in element.descendants().into_iter().skip(1) {
            if leaf.children.is_empty() {
                metadata.insert(leaf.local_name(), leaf.text_content().trim());
            }
        }
        metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::Document;

    #[test]
    fn test_key_or_alias() {
        let metadata = CoverageMetadata::new().with("ulx", "100");
        assert_eq!(metadata.get("origin_x", "ulx").unwrap(), "100");
        assert_eq!(metadata.get_parsed::<f64>("origin_x", "ulx").unwrap(), 100.0);
    }

    #[test]
    fn test_missing_carries_key_and_alias() {
        let err = CoverageMetadata::new().get("origin_x", "ulx").unwrap_err();
        match err {
            Error::MissingMetadata { key, alias } => {
                assert_eq!(key, "origin_x");
                assert_eq!(alias, "ulx");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_ambiguous() {
        let metadata = CoverageMetadata::new()
            .with("origin_x", "100")
            .with("ulx", "101");
        assert!(matches!(
            metadata.get("origin_x", "ulx"),
            Err(Error::AmbiguousMetadata { .. })
        ));

        // the same value twice is not ambiguous
        let metadata = CoverageMetadata::new()
            .with("origin_x", "100")
            .with("ulx", "100");
        assert_eq!(metadata.get("origin_x", "ulx").unwrap(), "100");
    }

    #[test]
    fn test_from_element() {
        let root = Document::from_string(
            "<meta><raster><width>4</width><height>3</height></raster><srs>EPSG:4326</srs></meta>",
        )
        .unwrap()
        .into_root()
        .unwrap();
        let metadata = CoverageMetadata::from_element(&root);
        assert_eq!(metadata.get_parsed::<usize>("width", "cols").unwrap(), 4);
        assert_eq!(metadata.get("srs", "crs").unwrap(), "EPSG:4326");
        assert_eq!(metadata.entries().count(), 3);
    }
}
