//! Checks on XML names
//!
//! `gml:id` is typed `xs:ID`, which means every identifier has to be an
//! NCName before it can be written or referenced through `xlink:href="#id"`.

use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;

/// NCName: an XML Name without any colon
static NCNAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[A-Z_a-z\u{C0}-\u{D6}\u{D8}-\u{F6}\u{F8}-\u{2FF}\u{370}-\u{37D}\u{37F}-\u{1FFF}][A-Z_a-z\u{C0}-\u{D6}\u{D8}-\u{F6}\u{F8}-\u{2FF}\u{370}-\u{37D}\u{37F}-\u{1FFF}\-\.0-9\u{B7}\u{300}-\u{36F}]*$",
    )
    .unwrap()
});

/// True when `name` is a non-colonized XML name
pub fn is_valid_ncname(name: &str) -> bool {
    NCNAME.is_match(name)
}

/// Rejects identifiers that cannot be a `gml:id`
pub fn validate_id(id: &str) -> Result<()> {
    if is_valid_ncname(id) {
        return Ok(());
    }
    Err(Error::Name(format!("'{}' is not usable as a gml:id", id)))
}

/// `app:area` becomes `(Some("app"), "area")`
pub fn split_qname(qname: &str) -> (Option<&str>, &str) {
    match qname.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, qname),
    }
}
