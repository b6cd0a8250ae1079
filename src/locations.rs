//! Document locations
//!
//! A GML or filter document can come from a file, a URL, or a string already
//! in memory.

use crate::error::{Error, Result};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use url::Url;

/// Where a document is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// File system path
    Path(PathBuf),
    /// Remote URL
    Url(Url),
    /// The document text itself
    Inline(String),
}

impl Location {
    /// Whether the location is remote
    pub fn is_remote(&self) -> bool {
        matches!(self, Location::Url(_))
    }

    /// Whether the location is a local file
    pub fn is_file(&self) -> bool {
        matches!(self, Location::Path(_))
    }
}

impl FromStr for Location {
    type Err = Error;

    /// Text starting with `<` is a document, a `file:` URL or anything that is
    /// not a URL is a path
    fn from_str(s: &str) -> Result<Self> {
        if s.trim_start().starts_with('<') {
            return Ok(Location::Inline(s.to_string()));
        }
        match Url::parse(s) {
            Ok(url) if url.scheme() == "file" => url
                .to_file_path()
                .map(Location::Path)
                .map_err(|_| Error::Resource(format!("'{}' is not a local file URL", s))),
            // a single letter scheme is a Windows drive
            Ok(url) if url.scheme().len() > 1 => Ok(Location::Url(url)),
            _ => Ok(Location::Path(PathBuf::from(s))),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Path(path) => write!(f, "{}", path.display()),
            Location::Url(url) => write!(f, "{}", url),
            Location::Inline(_) => f.write_str("<inline document>"),
        }
    }
}

impl From<PathBuf> for Location {
    fn from(path: PathBuf) -> Self {
        Location::Path(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_from_url() {
        let loc: Location = "http://example.com/features.gml".parse().unwrap();
        assert!(matches!(loc, Location::Url(_)));
        assert!(loc.is_remote());
    }

    #[test]
    fn test_location_from_path() {
        let loc: Location = "/tmp/features.gml".parse().unwrap();
        assert_eq!(loc, Location::Path(PathBuf::from("/tmp/features.gml")));
        assert!(loc.is_file());

        let relative: Location = "data/roads.gml".parse().unwrap();
        assert!(relative.is_file());
    }

    #[test]
    fn test_location_inline() {
        let loc: Location = "<ogc:Filter/>".parse().unwrap();
        assert!(matches!(loc, Location::Inline(_)));
        assert_eq!(loc.to_string(), "<inline document>");
    }
}
