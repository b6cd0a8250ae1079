//! # ogc-schema
//!
//! Typed Rust bindings for the OGC GML 3.2.1 and Filter Encoding 1.1.0 XML
//! schemas.
//!
//! ## Features
//!
//! - GML geometry, feature, envelope, temporal, direction and grid types
//! - Decoding and encoding through a namespace aware XML document layer
//! - Closed variant groups resolved by element name
//! - OGC filters with evaluation against features
//! - Grid coverage reading through an affine grid-to-CRS transform
//! - JSON dumps of every model type through serde
//! - Protection against oversized or deeply nested documents
//!
//! ## Example
//!
//! ```rust
//! use ogc_schema::filter::{Filter, Predicate};
//! use ogc_schema::gml::FeatureCollection;
//! use ogc_schema::decode_str;
//!
//! let filter: Filter = decode_str(
//!     r#"<ogc:Filter xmlns:ogc="http://www.opengis.net/ogc">
//!          <ogc:PropertyIsEqualTo>
//!            <ogc:PropertyName>kind</ogc:PropertyName>
//!            <ogc:Literal>oak</ogc:Literal>
//!          </ogc:PropertyIsEqualTo>
//!        </ogc:Filter>"#,
//! )?;
//!
//! let trees: FeatureCollection = decode_str(
//!     r#"<gml:FeatureCollection xmlns:gml="http://www.opengis.net/gml/3.2" xmlns:app="urn:app">
//!          <gml:featureMember>
//!            <app:Tree gml:id="t1"><app:kind>oak</app:kind></app:Tree>
//!          </gml:featureMember>
//!        </gml:FeatureCollection>"#,
//! )?;
//!
//! for tree in trees.features() {
//!     assert!(filter.evaluate(tree)?);
//! }
//! # Ok::<(), ogc_schema::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Foundation
pub mod error;
pub mod limits;

// XML document layer
pub mod namespaces;
pub mod names;
pub mod documents;
pub mod binding;

// Resource loading
pub mod locations;
pub mod loaders;

// Schema bindings
pub mod gml;
pub mod filter;

// Raster access
pub mod coverage;

// Re-exports for convenience
pub use binding::{decode_str, decode_str_with_limits, encode_string, FromElement, Tagged, ToElement};
pub use documents::{Document, Element, WriterConfig};
pub use error::{DecodeError, Error, Result};
pub use limits::Limits;
pub use loaders::Loader;
pub use locations::Location;
pub use namespaces::{QName, GML_311_NAMESPACE, GML_NAMESPACE, OGC_NAMESPACE, XLINK_NAMESPACE};

/// Version of the ogc-schema library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
