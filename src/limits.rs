//! Resource limits for the document reader
//!
//! GML payloads arrive from feature services and coverage catalogues that are
//! not always trustworthy. Every reader entry point takes a [`Limits`] and
//! stops with [`Error::LimitExceeded`] once a document goes past it.

use crate::error::{Error, Result};

const MIB: usize = 1024 * 1024;

/// Ceilings enforced while a document is read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Deepest element nesting accepted
    pub max_xml_depth: usize,
    /// Largest document accepted, in bytes
    pub max_xml_size: usize,
    /// Most attributes on a single element
    pub max_attributes: usize,
    /// Most `xmlns` declarations on a single element
    pub max_namespaces: usize,
}

impl Default for Limits {
    /// Sized for feature collections of a few hundred megabytes
    fn default() -> Self {
        Self::uniform(1_000, 256 * MIB)
    }
}

impl Limits {
    /// Same as [`Limits::default`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tight ceilings for requests coming straight off the network
    pub fn strict() -> Self {
        Self::uniform(100, 10 * MIB)
    }

    /// Loose ceilings for trusted bulk imports
    pub fn permissive() -> Self {
        Self::uniform(10_000, 1024 * MIB)
    }

    fn uniform(count: usize, max_xml_size: usize) -> Self {
        Self {
            max_xml_depth: count,
            max_xml_size,
            max_attributes: count,
            max_namespaces: count,
        }
    }

    /// Fails when an element would open at `depth`
    pub fn check_xml_depth(&self, depth: usize) -> Result<()> {
        within("element depth", depth, self.max_xml_depth)
    }

    /// Fails when a document of `size` bytes is too large
    pub fn check_xml_size(&self, size: usize) -> Result<()> {
        within("document size in bytes", size, self.max_xml_size)
    }

    pub(crate) fn check_attributes(&self, count: usize) -> Result<()> {
        within("attributes on one element", count, self.max_attributes)
    }

    pub(crate) fn check_namespaces(&self, count: usize) -> Result<()> {
        within("namespace declarations on one element", count, self.max_namespaces)
    }
}

fn within(what: &str, value: usize, ceiling: usize) -> Result<()> {
    if value <= ceiling {
        return Ok(());
    }
    Err(Error::LimitExceeded(format!(
        "{} is {}, ceiling is {}",
        what, value, ceiling
    )))
}
