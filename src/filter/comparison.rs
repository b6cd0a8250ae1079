//! Comparison operators

use crate::binding::{
    expect_ogc, optional_parsed_attribute, required_attribute, required_first_child,
    required_ogc_child, FromElement, Tagged, ToElement,
};
use crate::documents::Element;
use crate::error::{DecodeError, Error, Result};
use crate::filter::evaluate::{compare_values, FeatureView, Predicate};
use crate::filter::expression::{Expression, Literal, PropertyName};
use crate::filter::OperatorFamily;
use crate::namespaces::QName;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Which binary comparison an operator performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryComparisonKind {
    /// `ogc:PropertyIsEqualTo`
    EqualTo,
    /// `ogc:PropertyIsNotEqualTo`
    NotEqualTo,
    /// `ogc:PropertyIsLessThan`
    LessThan,
    /// `ogc:PropertyIsGreaterThan`
    GreaterThan,
    /// `ogc:PropertyIsLessThanOrEqualTo`
    LessThanOrEqualTo,
    /// `ogc:PropertyIsGreaterThanOrEqualTo`
    GreaterThanOrEqualTo,
}

impl BinaryComparisonKind {
    const ALL: [BinaryComparisonKind; 6] = [
        Self::EqualTo,
        Self::NotEqualTo,
        Self::LessThan,
        Self::GreaterThan,
        Self::LessThanOrEqualTo,
        Self::GreaterThanOrEqualTo,
    ];

    /// Element local name
    pub fn local_name(&self) -> &'static str {
        match self {
            Self::EqualTo => "PropertyIsEqualTo",
            Self::NotEqualTo => "PropertyIsNotEqualTo",
            Self::LessThan => "PropertyIsLessThan",
            Self::GreaterThan => "PropertyIsGreaterThan",
            Self::LessThanOrEqualTo => "PropertyIsLessThanOrEqualTo",
            Self::GreaterThanOrEqualTo => "PropertyIsGreaterThanOrEqualTo",
        }
    }

    fn from_name(name: &QName) -> Option<Self> {
        Self::ALL.into_iter().find(|k| name.is_ogc(k.local_name()))
    }

    fn holds(&self, ordering: Ordering) -> bool {
        match self {
            Self::EqualTo => ordering == Ordering::Equal,
            Self::NotEqualTo => ordering != Ordering::Equal,
            Self::LessThan => ordering == Ordering::Less,
            Self::GreaterThan => ordering == Ordering::Greater,
            Self::LessThanOrEqualTo => ordering != Ordering::Greater,
            Self::GreaterThanOrEqualTo => ordering != Ordering::Less,
        }
    }
}

/// `ogc:BinaryComparisonOpType`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryComparisonOp {
    /// The comparison performed
    pub kind: BinaryComparisonKind,
    /// Left operand
    pub left: Expression,
    /// Right operand
    pub right: Expression,
    /// `matchCase`
    pub match_case: Option<bool>,
}

impl BinaryComparisonOp {
    /// Compare `left` with `right`
    pub fn new(kind: BinaryComparisonKind, left: Expression, right: Expression) -> Self {
        Self {
            kind,
            left,
            right,
            match_case: None,
        }
    }

    /// `matchCase`, false when unset
    pub fn match_case(&self) -> bool {
        self.match_case.unwrap_or(false)
    }

    fn decode(kind: BinaryComparisonKind, element: &Element) -> Result<Self> {
        let [left, right] = element.children.as_slice() else {
            return Err(DecodeError::new("comparison needs two expressions")
                .with_element(element.qname.to_string())
                .into());
        };
        Ok(Self {
            kind,
            left: Expression::from_element(left)?,
            right: Expression::from_element(right)?,
            match_case: optional_parsed_attribute(element, "matchCase")?,
        })
    }
}

impl ToElement for BinaryComparisonOp {
    fn to_element(&self) -> Element {
        let mut element = Element::ogc(self.kind.local_name());
        element.set_optional_attribute(QName::local("matchCase"), self.match_case);
        element
            .with_child(self.left.to_element())
            .with_child(self.right.to_element())
    }
}

impl Predicate for BinaryComparisonOp {
    fn evaluate<F: FeatureView + ?Sized>(&self, feature: &F) -> Result<bool> {
        match (self.left.evaluate(feature)?, self.right.evaluate(feature)?) {
            (Some(left), Some(right)) => Ok(self
                .kind
                .holds(compare_values(&left, &right, self.match_case())?)),
            _ => Ok(false),
        }
    }
}

/// `ogc:PropertyIsLike`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyIsLike {
    /// The tested property
    pub property: PropertyName,
    /// The pattern
    pub literal: Literal,
    /// `wildCard`, matching any run of characters
    pub wild_card: String,
    /// `singleChar`, matching one character
    pub single_char: String,
    /// `escapeChar`
    pub escape_char: Option<String>,
    /// `matchCase`
    pub match_case: Option<bool>,
}

impl PropertyIsLike {
    /// Match `property` against `pattern` using `*` and `?`
    pub fn new(property: PropertyName, pattern: impl Into<String>) -> Self {
        Self {
            property,
            literal: Literal::new(pattern),
            wild_card: "*".to_string(),
            single_char: "?".to_string(),
            escape_char: None,
            match_case: None,
        }
    }

    /// `escapeChar`, a backslash when unset
    pub fn escape_char(&self) -> &str {
        self.escape_char.as_deref().unwrap_or("\\")
    }

    /// `matchCase`, true when unset
    pub fn match_case(&self) -> bool {
        self.match_case.unwrap_or(true)
    }

    /// The pattern as an anchored regular expression
    pub fn to_regex(&self) -> Result<Regex> {
        let mut pattern = String::from(if self.match_case() { "(?s)^" } else { "(?si)^" });
        let escape = self.escape_char();
        let mut rest = self.literal.value.as_str();
        while let Some(c) = rest.chars().next() {
            if !escape.is_empty() && rest.starts_with(escape) {
                rest = &rest[escape.len()..];
                let escaped = rest.chars().next().map_or(escape.to_string(), String::from);
                pattern.push_str(&regex::escape(&escaped));
                rest = rest.get(escaped.len()..).unwrap_or("");
            } else if !self.wild_card.is_empty() && rest.starts_with(&self.wild_card) {
                pattern.push_str(".*");
                rest = &rest[self.wild_card.len()..];
            } else if !self.single_char.is_empty() && rest.starts_with(&self.single_char) {
                pattern.push('.');
                rest = &rest[self.single_char.len()..];
            } else {
                pattern.push_str(&regex::escape(&String::from(c)));
                rest = &rest[c.len_utf8()..];
            }
        }
        pattern.push('$');
        Regex::new(&pattern).map_err(|e| Error::Value(format!("like pattern '{}': {}", self.literal.value, e)))
    }
}

impl FromElement for PropertyIsLike {
    fn from_element(element: &Element) -> Result<Self> {
        expect_ogc(element, "PropertyIsLike")?;
        Ok(Self {
            property: PropertyName::from_element(required_ogc_child(element, "PropertyName")?)?,
            literal: Literal::from_element(required_ogc_child(element, "Literal")?)?,
            wild_card: required_attribute(element, "wildCard")?.to_string(),
            single_char: required_attribute(element, "singleChar")?.to_string(),
            escape_char: element
                .get_attribute("escapeChar")
                .or_else(|| element.get_attribute("escape"))
                .map(str::to_string),
            match_case: optional_parsed_attribute(element, "matchCase")?,
        })
    }
}

impl ToElement for PropertyIsLike {
    fn to_element(&self) -> Element {
        let mut element = Element::ogc("PropertyIsLike")
            .with_attribute(QName::local("wildCard"), &self.wild_card)
            .with_attribute(QName::local("singleChar"), &self.single_char);
        element.set_optional_attribute(QName::local("escapeChar"), self.escape_char.as_ref());
        element.set_optional_attribute(QName::local("matchCase"), self.match_case);
        element
            .with_child(self.property.to_element())
            .with_child(self.literal.to_element())
    }
}

impl Predicate for PropertyIsLike {
    fn evaluate<F: FeatureView + ?Sized>(&self, feature: &F) -> Result<bool> {
        let Some(text) = self.property.evaluate(feature)?.and_then(|v| v.as_text()) else {
            return Ok(false);
        };
        Ok(self.to_regex()?.is_match(&text))
    }
}

/// `ogc:PropertyIsNull`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyIsNull {
    /// The tested property
    pub property: PropertyName,
}

impl FromElement for PropertyIsNull {
    fn from_element(element: &Element) -> Result<Self> {
        expect_ogc(element, "PropertyIsNull")?;
        Ok(Self {
            property: PropertyName::from_element(required_ogc_child(element, "PropertyName")?)?,
        })
    }
}

impl ToElement for PropertyIsNull {
    fn to_element(&self) -> Element {
        Element::ogc("PropertyIsNull").with_child(self.property.to_element())
    }
}

impl Predicate for PropertyIsNull {
    fn evaluate<F: FeatureView + ?Sized>(&self, feature: &F) -> Result<bool> {
        Ok(self.property.evaluate(feature)?.is_none())
    }
}

/// `ogc:PropertyIsBetween`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyIsBetween {
    /// The tested expression
    pub expression: Expression,
    /// `ogc:LowerBoundary`, inclusive
    pub lower: Expression,
    /// `ogc:UpperBoundary`, inclusive
    pub upper: Expression,
}

impl FromElement for PropertyIsBetween {
    fn from_element(element: &Element) -> Result<Self> {
        expect_ogc(element, "PropertyIsBetween")?;
        let boundary = |name| -> Result<Expression> {
            Expression::from_element(required_first_child(required_ogc_child(element, name)?)?)
        };
        Ok(Self {
            expression: Expression::from_element(required_first_child(element)?)?,
            lower: boundary("LowerBoundary")?,
            upper: boundary("UpperBoundary")?,
        })
    }
}

impl ToElement for PropertyIsBetween {
    fn to_element(&self) -> Element {
        Element::ogc("PropertyIsBetween")
            .with_child(self.expression.to_element())
            .with_child(Element::ogc("LowerBoundary").with_child(self.lower.to_element()))
            .with_child(Element::ogc("UpperBoundary").with_child(self.upper.to_element()))
    }
}

impl Predicate for PropertyIsBetween {
    fn evaluate<F: FeatureView + ?Sized>(&self, feature: &F) -> Result<bool> {
        let (Some(value), Some(lower), Some(upper)) = (
            self.expression.evaluate(feature)?,
            self.lower.evaluate(feature)?,
            self.upper.evaluate(feature)?,
        ) else {
            return Ok(false);
        };
        Ok(compare_values(&lower, &value, true)? != Ordering::Greater
            && compare_values(&value, &upper, true)? != Ordering::Greater)
    }
}

/// The `ogc:comparisonOps` substitution group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ComparisonOp {
    /// One of the six binary comparisons
    Binary(BinaryComparisonOp),
    /// `ogc:PropertyIsLike`
    Like(PropertyIsLike),
    /// `ogc:PropertyIsNull`
    Null(PropertyIsNull),
    /// `ogc:PropertyIsBetween`
    Between(PropertyIsBetween),
}

impl OperatorFamily for ComparisonOp {
    fn is_member(name: &QName) -> bool {
        BinaryComparisonKind::from_name(name).is_some()
            || name.is_ogc("PropertyIsLike")
            || name.is_ogc("PropertyIsNull")
            || name.is_ogc("PropertyIsBetween")
    }
}

impl Tagged for ComparisonOp {
    fn element_name(&self) -> QName {
        QName::ogc(match self {
            Self::Binary(op) => op.kind.local_name(),
            Self::Like(_) => "PropertyIsLike",
            Self::Null(_) => "PropertyIsNull",
            Self::Between(_) => "PropertyIsBetween",
        })
    }
}

impl FromElement for ComparisonOp {
    fn from_element(element: &Element) -> Result<Self> {
        let qname = &element.qname;
        if let Some(kind) = BinaryComparisonKind::from_name(qname) {
            Ok(Self::Binary(BinaryComparisonOp::decode(kind, element)?))
        } else if qname.is_ogc("PropertyIsLike") {
            Ok(Self::Like(PropertyIsLike::from_element(element)?))
        } else if qname.is_ogc("PropertyIsNull") {
            Ok(Self::Null(PropertyIsNull::from_element(element)?))
        } else if qname.is_ogc("PropertyIsBetween") {
            Ok(Self::Between(PropertyIsBetween::from_element(element)?))
        } else {
            Err(Error::unsupported_variant("comparisonOps", qname.to_string()))
        }
    }
}

impl ToElement for ComparisonOp {
    fn to_element(&self) -> Element {
        match self {
            Self::Binary(op) => op.to_element(),
            Self::Like(op) => op.to_element(),
            Self::Null(op) => op.to_element(),
            Self::Between(op) => op.to_element(),
        }
    }
}

impl Predicate for ComparisonOp {
    fn evaluate<F: FeatureView + ?Sized>(&self, feature: &F) -> Result<bool> {
        match self {
            Self::Binary(op) => op.evaluate(feature),
            Self::Like(op) => op.evaluate(feature),
            Self::Null(op) => op.evaluate(feature),
            Self::Between(op) => op.evaluate(feature),
        }
    }
}

impl From<BinaryComparisonOp> for ComparisonOp {
    fn from(value: BinaryComparisonOp) -> Self {
        Self::Binary(value)
    }
}

impl From<PropertyIsLike> for ComparisonOp {
    fn from(value: PropertyIsLike) -> Self {
        Self::Like(value)
    }
}

impl From<PropertyIsNull> for ComparisonOp {
    fn from(value: PropertyIsNull) -> Self {
        Self::Null(value)
    }
}

impl From<PropertyIsBetween> for ComparisonOp {
    fn from(value: PropertyIsBetween) -> Self {
        Self::Between(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::decode_str;
    use crate::filter::evaluate::tests::MapFeature;

    const OGC: &str = r#"xmlns:ogc="http://www.opengis.net/ogc""#;

    fn decode(body: &str) -> ComparisonOp {
        decode_str(&body.replacen("OGC", OGC, 1)).unwrap()
    }

    #[test]
    fn test_match_case_defaults_differ() {
        let equal = BinaryComparisonOp::new(
            BinaryComparisonKind::EqualTo,
            Expression::property("name"),
            Expression::literal("x"),
        );
        assert!(!equal.match_case());
        let like = PropertyIsLike::new(PropertyName::new("name"), "x*");
        assert!(like.match_case());
        assert_eq!(like.escape_char(), "\\");
    }

    #[test]
    fn test_equal_to_ignores_case_by_default() {
        let op = decode(
            "<ogc:PropertyIsEqualTo OGC><ogc:PropertyName>species</ogc:PropertyName><ogc:Literal>OAK</ogc:Literal></ogc:PropertyIsEqualTo>",
        );
        let feature = MapFeature::new("t1").with("species", "oak");
        assert!(op.evaluate(&feature).unwrap());

        let strict = decode(
            r#"<ogc:PropertyIsEqualTo OGC matchCase="true"><ogc:PropertyName>species</ogc:PropertyName><ogc:Literal>OAK</ogc:Literal></ogc:PropertyIsEqualTo>"#,
        );
        assert!(!strict.evaluate(&feature).unwrap());
        assert!(!op.evaluate(&MapFeature::new("t2")).unwrap());
    }

    #[test]
    fn test_numeric_ordering() {
        let op = decode(
            "<ogc:PropertyIsGreaterThanOrEqualTo OGC><ogc:PropertyName>height</ogc:PropertyName><ogc:Literal>10</ogc:Literal></ogc:PropertyIsGreaterThanOrEqualTo>",
        );
        assert!(op.evaluate(&MapFeature::new("a").with("height", "10")).unwrap());
        assert!(op.evaluate(&MapFeature::new("b").with("height", "12.5")).unwrap());
        assert!(!op.evaluate(&MapFeature::new("c").with("height", "9")).unwrap());
    }

    #[test]
    fn test_like() {
        let op = decode(
            r#"<ogc:PropertyIsLike OGC wildCard="%" singleChar="_" escapeChar="!"><ogc:PropertyName>name</ogc:PropertyName><ogc:Literal>Main_St%!%</ogc:Literal></ogc:PropertyIsLike>"#,
        );
        assert!(op.evaluate(&MapFeature::new("a").with("name", "Main St. 5%")).unwrap());
        assert!(!op.evaluate(&MapFeature::new("b").with("name", "Main St. 5")).unwrap());
        assert!(!op.evaluate(&MapFeature::new("c").with("name", "main st. 5%")).unwrap());
    }

    #[test]
    fn test_like_escapes_regex_syntax() {
        let like = PropertyIsLike::new(PropertyName::new("name"), "a.b*");
        let regex = like.to_regex().unwrap();
        assert!(regex.is_match("a.bcd"));
        assert!(!regex.is_match("axbcd"));
    }

    #[test]
    fn test_null_and_between() {
        let null = decode(
            "<ogc:PropertyIsNull OGC><ogc:PropertyName>owner</ogc:PropertyName></ogc:PropertyIsNull>",
        );
        assert!(null.evaluate(&MapFeature::new("a")).unwrap());
        assert!(!null.evaluate(&MapFeature::new("b").with("owner", "city")).unwrap());

        let between = decode(
            "<ogc:PropertyIsBetween OGC><ogc:PropertyName>depth</ogc:PropertyName>\
             <ogc:LowerBoundary><ogc:Literal>100</ogc:Literal></ogc:LowerBoundary>\
             <ogc:UpperBoundary><ogc:Literal>200</ogc:Literal></ogc:UpperBoundary></ogc:PropertyIsBetween>",
        );
        assert!(between.evaluate(&MapFeature::new("a").with("depth", "100")).unwrap());
        assert!(between.evaluate(&MapFeature::new("b").with("depth", "150")).unwrap());
        assert!(!between.evaluate(&MapFeature::new("c").with("depth", "201")).unwrap());

        let back = ComparisonOp::from_element(&between.to_element()).unwrap();
        assert_eq!(back, between);
    }

    #[test]
    fn test_outside_group() {
        let xml = format!("<ogc:BBOX {}/>", OGC);
        assert!(matches!(
            decode_str::<ComparisonOp>(&xml),
            Err(Error::UnsupportedVariant { group: "comparisonOps", .. })
        ));
    }
}
