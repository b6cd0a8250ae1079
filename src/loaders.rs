//! Document loading
//!
//! The [`Loader`] reads a document from a [`Location`], enforcing [`Limits`]
//! before and during parsing. Remote locations are refused; fetching them is
//! left to the caller.

use crate::binding::FromElement;
use crate::documents::Document;
use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::locations::Location;
use std::fs;
use tracing::debug;

/// Loader for GML and filter documents
#[derive(Debug, Clone, Default)]
pub struct Loader {
    /// Resource limits
    limits: Limits,
}

impl Loader {
    /// Create a new loader with default limits
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// The limits enforced
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Read the text at `location`
    pub fn load(&self, location: &Location) -> Result<String> {
        let content = match location {
            Location::Path(path) => fs::read_to_string(path).map_err(|e| {
                Error::Resource(format!("Failed to read file '{}': {}", path.display(), e))
            })?,
            Location::Url(url) => {
                return Err(Error::Resource(format!(
                    "remote documents are not loaded: {}",
                    url
                )))
            }
            Location::Inline(text) => text.clone(),
        };
        self.limits.check_xml_size(content.len())?;
        Ok(content)
    }

    /// Read and parse the document at `location`
    pub fn load_document(&self, location: &Location) -> Result<Document> {
        let text = self.load(location)?;
        debug!("parsing {} ({} bytes)", location, text.len());
        Document::parse(&text, &self.limits)
    }

    /// Read the document at `location` and decode its root
    pub fn load_root<T: FromElement>(&self, location: &Location) -> Result<T> {
        let root = self.load_document(location)?.into_root()?;
        T::from_element(&root)
    }
}
