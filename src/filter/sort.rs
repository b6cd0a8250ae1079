//! Sort specifications

use crate::binding::{expect_ogc, required_ogc_child, FromElement, ToElement};
use crate::documents::Element;
use crate::error::{Error, Result};
use crate::filter::evaluate::{compare_values, FeatureView};
use crate::filter::expression::PropertyName;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// `ogc:SortOrderType`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    /// `ASC`
    #[default]
    Ascending,
    /// `DESC`
    Descending,
}

impl SortOrder {
    /// Parse `ASC` or `DESC`
    pub fn parse(text: &str) -> Result<Self> {
        match text.trim() {
            "ASC" => Ok(Self::Ascending),
            "DESC" => Ok(Self::Descending),
            other => Err(Error::Value(format!("'{}' is not a sort order", other))),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        })
    }
}

/// `ogc:SortProperty`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortProperty {
    /// The sort key
    pub property: PropertyName,
    /// `ogc:SortOrder`
    pub order: Option<SortOrder>,
}

impl SortProperty {
    /// Sort on `property`
    pub fn new(property: PropertyName, order: Option<SortOrder>) -> Self {
        Self { property, order }
    }

    /// `ogc:SortOrder`, ascending when unset
    pub fn order(&self) -> SortOrder {
        self.order.unwrap_or_default()
    }
}

impl FromElement for SortProperty {
    fn from_element(element: &Element) -> Result<Self> {
        expect_ogc(element, "SortProperty")?;
        Ok(Self {
            property: PropertyName::from_element(required_ogc_child(element, "PropertyName")?)?,
            order: element
                .ogc_child("SortOrder")
                .map(|o| SortOrder::parse(o.text_content()))
                .transpose()?,
        })
    }
}

impl ToElement for SortProperty {
    fn to_element(&self) -> Element {
        let mut element = Element::ogc("SortProperty").with_child(self.property.to_element());
        if let Some(order) = self.order {
            element.add_child(Element::ogc("SortOrder").with_text(order.to_string()));
        }
        element
    }
}

/// `ogc:SortBy`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SortBy {
    /// Sort keys, most significant first
    pub properties: Vec<SortProperty>,
}

impl SortBy {
    /// Order two features; absent values sort last
    pub fn compare<F: FeatureView + ?Sized>(&self, a: &F, b: &F) -> Result<Ordering> {
        for key in &self.properties {
            let ordering = match (key.property.evaluate(a)?, key.property.evaluate(b)?) {
                (Some(x), Some(y)) => compare_values(&x, &y, true)?,
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            let ordering = match key.order() {
                SortOrder::Ascending => ordering,
                SortOrder::Descending => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return Ok(ordering);
            }
        }
        Ok(Ordering::Equal)
    }

    /// Stable sort of `features`
    pub fn sort<F: FeatureView>(&self, features: &mut [F]) -> Result<()> {
        let mut error = None;
        features.sort_by(|a, b| {
            self.compare(a, b).unwrap_or_else(|e| {
                error.get_or_insert(e);
                Ordering::Equal
            })
        });
        error.map_or(Ok(()), Err)
    }
}

impl FromElement for SortBy {
    fn from_element(element: &Element) -> Result<Self> {
        expect_ogc(element, "SortBy")?;
        Ok(Self {
            properties: element
                .children
                .iter()
                .map(SortProperty::from_element)
                .collect::<Result<Vec<_>>>()?,
        })
    }
}

impl ToElement for SortBy {
    fn to_element(&self) -> Element {
        let mut element = Element::ogc("SortBy");
        for property in &self.properties {
            element.add_child(property.to_element());
        }
        element
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::decode_str;
    use crate::filter::evaluate::tests::MapFeature;

    #[test]
    fn test_order_defaults_to_ascending() {
        let xml = r#"<ogc:SortBy xmlns:ogc="http://www.opengis.net/ogc">
            <ogc:SortProperty><ogc:PropertyName>name</ogc:PropertyName></ogc:SortProperty>
            <ogc:SortProperty><ogc:PropertyName>height</ogc:PropertyName><ogc:SortOrder>DESC</ogc:SortOrder></ogc:SortProperty>
        </ogc:SortBy>"#;
        let sort: SortBy = decode_str(xml).unwrap();
        assert_eq!(sort.properties[0].order, None);
        assert_eq!(sort.properties[0].order(), SortOrder::Ascending);
        assert_eq!(sort.properties[1].order(), SortOrder::Descending);
        assert_eq!(SortBy::from_element(&sort.to_element()).unwrap(), sort);
    }

    #[test]
    fn test_sort_features() {
        let sort = SortBy {
            properties: vec![
                SortProperty::new(PropertyName::new("kind"), None),
                SortProperty::new(PropertyName::new("height"), Some(SortOrder::Descending)),
            ],
        };
        let mut features = vec![
            MapFeature::new("a").with("kind", "oak").with("height", "9"),
            MapFeature::new("b").with("kind", "elm").with("height", "3"),
            MapFeature::new("c").with("kind", "oak").with("height", "12"),
            MapFeature::new("d").with("height", "1"),
        ];
        sort.sort(&mut features).unwrap();
        let ids: Vec<_> = features.iter().filter_map(|f| f.feature_id()).collect();
        assert_eq!(ids, vec!["b", "c", "a", "d"]);
    }

    #[test]
    fn test_bad_order() {
        assert!(SortOrder::parse("UP").is_err());
    }
}
