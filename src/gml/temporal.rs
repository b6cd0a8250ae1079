//! GML temporal primitives
//!
//! Time positions, instants and periods, and the `AbstractTimePrimitive`
//! variant group used as the operand of temporal filters.

use crate::binding::{expect_gml, required_gml_child, FromElement, Tagged, ToElement};
use crate::documents::Element;
use crate::error::{DecodeError, Error, Result};
use crate::gml::base::GmlObject;
use crate::gml::xlink::Property;
use crate::namespaces::QName;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// `gml:TimeIndeterminateValueType`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeIndeterminateValue {
    /// `after`
    After,
    /// `before`
    Before,
    /// `now`
    Now,
    /// `unknown`
    Unknown,
}

impl TimeIndeterminateValue {
    /// Parse from the attribute value
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "after" => Ok(Self::After),
            "before" => Ok(Self::Before),
            "now" => Ok(Self::Now),
            "unknown" => Ok(Self::Unknown),
            other => Err(Error::Value(format!(
                "'{}' is not a gml:TimeIndeterminateValueType",
                other
            ))),
        }
    }

    /// The attribute value
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::After => "after",
            Self::Before => "before",
            Self::Now => "now",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TimeIndeterminateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `gml:TimePositionType`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimePosition {
    /// The position, in the notation of `frame`
    pub value: String,
    /// Temporal reference system, `#ISO-8601` when unset
    pub frame: Option<String>,
    /// Calendar era
    pub calendar_era_name: Option<String>,
    /// Indeterminate position
    pub indeterminate_position: Option<TimeIndeterminateValue>,
}

impl TimePosition {
    /// A position in the default frame
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Self::default()
        }
    }

    /// The reference frame
    pub fn frame(&self) -> &str {
        self.frame.as_deref().unwrap_or("#ISO-8601")
    }

    /// Interpret an ISO-8601 position as a UTC instant
    ///
    /// Dates without a time are taken at midnight, times without an offset
    /// as UTC. An indeterminate `now` is the current time.
    pub fn to_datetime(&self) -> Result<DateTime<Utc>> {
        if self.indeterminate_position == Some(TimeIndeterminateValue::Now) {
            return Ok(Utc::now());
        }
        if self.frame() != "#ISO-8601" {
            return Err(Error::Unsupported(format!(
                "time position in frame {}",
                self.frame()
            )));
        }
        let text = self.value.trim();
        if text.is_empty() {
            return Err(Error::Value(match self.indeterminate_position {
                Some(ind) => format!("indeterminate time position '{}'", ind),
                None => "empty time position".to_string(),
            }));
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Ok(dt.with_timezone(&Utc));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
            return Ok(naive.and_utc());
        }
        if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
            if let Some(naive) = date.and_hms_opt(0, 0, 0) {
                return Ok(naive.and_utc());
            }
        }
        Err(Error::Value(format!("'{}' is not an ISO-8601 time", text)))
    }

    /// The earliest instant this position may denote
    ///
    /// `unknown` and `before` are open towards the past, as is `after`
    /// without a value.
    pub fn earliest(&self) -> Result<DateTime<Utc>> {
        use TimeIndeterminateValue::*;
        match self.indeterminate_position {
            Some(Unknown) | Some(Before) => Ok(DateTime::<Utc>::MIN_UTC),
            Some(After) if self.value.trim().is_empty() => Ok(DateTime::<Utc>::MIN_UTC),
            _ => self.to_datetime(),
        }
    }

    /// The latest instant this position may denote
    ///
    /// `unknown` and `after` are open towards the future, as is `before`
    /// without a value.
    pub fn latest(&self) -> Result<DateTime<Utc>> {
        use TimeIndeterminateValue::*;
        match self.indeterminate_position {
            Some(Unknown) | Some(After) => Ok(DateTime::<Utc>::MAX_UTC),
            Some(Before) if self.value.trim().is_empty() => Ok(DateTime::<Utc>::MAX_UTC),
            _ => self.to_datetime(),
        }
    }

    /// Decode the content of `gml:timePosition` and similar
    pub fn from_content(element: &Element) -> Result<Self> {
        Ok(Self {
            value: element.text_content().trim().to_string(),
            frame: element.get_attribute("frame").map(str::to_string),
            calendar_era_name: element.get_attribute("calendarEraName").map(str::to_string),
            indeterminate_position: element
                .get_attribute("indeterminatePosition")
                .map(TimeIndeterminateValue::parse)
                .transpose()?,
        })
    }

    /// Encode as the element `name`
    pub fn to_element_named(&self, name: QName) -> Element {
        let mut element = Element::new(name);
        element.set_optional_attribute(QName::local("frame"), self.frame.as_ref());
        element.set_optional_attribute(
            QName::local("calendarEraName"),
            self.calendar_era_name.as_ref(),
        );
        element.set_optional_attribute(
            QName::local("indeterminatePosition"),
            self.indeterminate_position,
        );
        if !self.value.is_empty() {
            element.set_text(self.value.clone());
        }
        element
    }
}

/// `gml:TimeInstant`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeInstant {
    /// Identity
    pub object: GmlObject,
    /// The instant
    pub position: TimePosition,
}

impl FromElement for TimeInstant {
    fn from_element(element: &Element) -> Result<Self> {
        expect_gml(element, "TimeInstant")?;
        Ok(Self {
            object: GmlObject::decode(element)?,
            position: TimePosition::from_content(required_gml_child(element, "timePosition")?)?,
        })
    }
}

impl ToElement for TimeInstant {
    fn to_element(&self) -> Element {
        let mut element = Element::gml("TimeInstant");
        self.object.encode_into(&mut element);
        element.add_child(self.position.to_element_named(QName::gml("timePosition")));
        element
    }
}

/// One end of a [`TimePeriod`], in whichever form it was given
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TimeBound {
    /// `gml:beginPosition` or `gml:endPosition`
    Position(TimePosition),
    /// `gml:begin` or `gml:end` holding a `gml:TimeInstant`
    Instant(Property<TimeInstant>),
}

impl Default for TimeBound {
    fn default() -> Self {
        Self::Position(TimePosition::default())
    }
}

impl TimeBound {
    /// The position of the bound
    ///
    /// Fails for an instant held by reference only.
    pub fn position(&self) -> Result<&TimePosition> {
        match self {
            Self::Position(position) => Ok(position),
            Self::Instant(property) => match property.get() {
                Some(instant) => Ok(&instant.position),
                None => Err(Error::Unsupported(format!(
                    "time instant by reference {}",
                    property.attributes.xlink.href.as_deref().unwrap_or("")
                ))),
            },
        }
    }

    fn decode(element: &Element, position: &str, property: &str) -> Result<Self> {
        if let Some(pos) = element.gml_child(position) {
            return Ok(Self::Position(TimePosition::from_content(pos)?));
        }
        if let Some(prop) = element.gml_child(property) {
            return Ok(Self::Instant(Property::from_element(prop)?));
        }
        Err(DecodeError::new(format!("missing gml:{} or gml:{}", position, property))
            .with_element(element.qname.to_string())
            .into())
    }

    fn to_element(&self, position: &str, property: &str) -> Element {
        match self {
            Self::Position(pos) => pos.to_element_named(QName::gml(position)),
            Self::Instant(instant) => instant.to_element_named(QName::gml(property)),
        }
    }
}

impl From<TimePosition> for TimeBound {
    fn from(value: TimePosition) -> Self {
        Self::Position(value)
    }
}

impl From<TimeInstant> for TimeBound {
    fn from(value: TimeInstant) -> Self {
        Self::Instant(Property::inline(value))
    }
}

/// `gml:TimePeriod`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimePeriod {
    /// Identity
    pub object: GmlObject,
    /// Start of the period
    pub begin: TimeBound,
    /// End of the period
    pub end: TimeBound,
}

impl TimePeriod {
    /// A period between two positions
    pub fn new(begin: TimePosition, end: TimePosition) -> Self {
        Self {
            object: GmlObject::default(),
            begin: begin.into(),
            end: end.into(),
        }
    }
}

impl FromElement for TimePeriod {
    fn from_element(element: &Element) -> Result<Self> {
        expect_gml(element, "TimePeriod")?;
        Ok(Self {
            object: GmlObject::decode(element)?,
            begin: TimeBound::decode(element, "beginPosition", "begin")?,
            end: TimeBound::decode(element, "endPosition", "end")?,
        })
    }
}

impl ToElement for TimePeriod {
    fn to_element(&self) -> Element {
        let mut element = Element::gml("TimePeriod");
        self.object.encode_into(&mut element);
        element.add_child(self.begin.to_element("beginPosition", "begin"));
        element.add_child(self.end.to_element("endPosition", "end"));
        element
    }
}

/// The `gml:AbstractTimePrimitive` variant group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TemporalPrimitive {
    /// `gml:TimeInstant`
    Instant(TimeInstant),
    /// `gml:TimePeriod`
    Period(TimePeriod),
}

impl TemporalPrimitive {
    /// The closed interval covered, an instant being a zero-length interval
    ///
    /// Indeterminate ends widen the interval as far as they may reach.
    pub fn interval(&self) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
        match self {
            Self::Instant(instant) => {
                Ok((instant.position.earliest()?, instant.position.latest()?))
            }
            Self::Period(period) => Ok((
                period.begin.position()?.earliest()?,
                period.end.position()?.latest()?,
            )),
        }
    }
}

impl Tagged for TemporalPrimitive {
    fn element_name(&self) -> QName {
        match self {
            Self::Instant(_) => QName::gml("TimeInstant"),
            Self::Period(_) => QName::gml("TimePeriod"),
        }
    }
}

impl FromElement for TemporalPrimitive {
    fn from_element(element: &Element) -> Result<Self> {
        if element.qname.is_gml("TimeInstant") {
            Ok(Self::Instant(TimeInstant::from_element(element)?))
        } else if element.qname.is_gml("TimePeriod") {
            Ok(Self::Period(TimePeriod::from_element(element)?))
        } else {
            Err(Error::unsupported_variant(
                "AbstractTimePrimitive",
                element.qname.to_string(),
            ))
        }
    }
}

impl ToElement for TemporalPrimitive {
    fn to_element(&self) -> Element {
        match self {
            Self::Instant(instant) => instant.to_element(),
            Self::Period(period) => period.to_element(),
        }
    }
}

impl From<TimeInstant> for TemporalPrimitive {
    fn from(value: TimeInstant) -> Self {
        Self::Instant(value)
    }
}

impl From<TimePeriod> for TemporalPrimitive {
    fn from(value: TimePeriod) -> Self {
        Self::Period(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_frame_default() {
        assert_eq!(TimePosition::default().frame(), "#ISO-8601");
        let explicit = TimePosition {
            frame: Some("#ISO-8601".into()),
            ..TimePosition::new("2020-01-01")
        };
        assert_eq!(explicit.frame(), TimePosition::new("2020-01-01").frame());
    }

    #[test]
    fn test_to_datetime_forms() {
        let expected = Utc.with_ymd_and_hms(2020, 5, 1, 12, 0, 0).unwrap();
        assert_eq!(TimePosition::new("2020-05-01T12:00:00Z").to_datetime().unwrap(), expected);
        assert_eq!(TimePosition::new("2020-05-01T14:00:00+02:00").to_datetime().unwrap(), expected);
        assert_eq!(TimePosition::new("2020-05-01T12:00:00").to_datetime().unwrap(), expected);
        assert_eq!(
            TimePosition::new("2020-05-01").to_datetime().unwrap(),
            Utc.with_ymd_and_hms(2020, 5, 1, 0, 0, 0).unwrap()
        );
        assert!(TimePosition::new("May 1st").to_datetime().is_err());
    }

    #[test]
    fn test_indeterminate_position() {
        let position = TimePosition {
            indeterminate_position: Some(TimeIndeterminateValue::Now),
            ..TimePosition::default()
        };
        let element = position.to_element_named(QName::gml("timePosition"));
        assert_eq!(element.get_attribute("indeterminatePosition"), Some("now"));
        assert_eq!(TimePosition::from_content(&element).unwrap(), position);

        let before = Utc::now();
        let now = position.to_datetime().unwrap();
        assert!(now >= before && now <= Utc::now());
        assert!(TimePosition::default().to_datetime().is_err());
    }

    #[test]
    fn test_indeterminate_bounds() {
        let at = |ind, value: &str| TimePosition {
            indeterminate_position: Some(ind),
            ..TimePosition::new(value)
        };
        let x = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();

        let unknown = at(TimeIndeterminateValue::Unknown, "");
        assert_eq!(unknown.earliest().unwrap(), DateTime::<Utc>::MIN_UTC);
        assert_eq!(unknown.latest().unwrap(), DateTime::<Utc>::MAX_UTC);

        let before = at(TimeIndeterminateValue::Before, "2020-01-01");
        assert_eq!(before.earliest().unwrap(), DateTime::<Utc>::MIN_UTC);
        assert_eq!(before.latest().unwrap(), x);

        let after = at(TimeIndeterminateValue::After, "2020-01-01");
        assert_eq!(after.earliest().unwrap(), x);
        assert_eq!(after.latest().unwrap(), DateTime::<Utc>::MAX_UTC);

        assert_eq!(
            at(TimeIndeterminateValue::After, "").earliest().unwrap(),
            DateTime::<Utc>::MIN_UTC
        );
        assert_eq!(TimePosition::new("2020-01-01").latest().unwrap(), x);
    }

    #[test]
    fn test_open_ended_period_interval() {
        let period = TemporalPrimitive::from(TimePeriod::new(
            TimePosition::new("2020-01-01"),
            TimePosition {
                indeterminate_position: Some(TimeIndeterminateValue::Unknown),
                ..TimePosition::default()
            },
        ));
        let (begin, end) = period.interval().unwrap();
        assert_eq!(begin, Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(end, DateTime::<Utc>::MAX_UTC);

        let by_reference = TimePeriod {
            begin: TimeBound::Instant(Property::by_reference("#t0")),
            ..TimePeriod::default()
        };
        assert!(TemporalPrimitive::from(by_reference).interval().is_err());
    }

    #[test]
    fn test_period_accepts_instant_properties() {
        let xml = r#"<gml:TimePeriod xmlns:gml="http://www.opengis.net/gml/3.2" gml:id="tp">
            <gml:begin><gml:TimeInstant gml:id="t0"><gml:timePosition>2020-01-01</gml:timePosition></gml:TimeInstant></gml:begin>
            <gml:endPosition>2020-12-31</gml:endPosition>
        </gml:TimePeriod>"#;
        let period: TimePeriod = crate::binding::decode_str(xml).unwrap();
        assert!(matches!(period.begin, TimeBound::Instant(_)));
        assert!(matches!(period.end, TimeBound::Position(_)));
        assert_eq!(period.begin.position().unwrap().value, "2020-01-01");
        assert_eq!(period.end.position().unwrap().value, "2020-12-31");

        let written = period.to_element();
        assert!(written.gml_child("beginPosition").is_none());
        assert!(written.gml_child("endPosition").is_some());
        let instant = written
            .gml_child("begin")
            .and_then(|begin| begin.gml_child("TimeInstant"))
            .unwrap();
        assert_eq!(instant.gml_id(), Some("t0"));
        assert_eq!(TimePeriod::from_element(&written).unwrap(), period);
    }

    #[test]
    fn test_temporal_primitive_dispatch() {
        let instant = TemporalPrimitive::from(TimeInstant {
            object: GmlObject::with_id("t1"),
            position: TimePosition::new("2021-03-04"),
        });
        let element = instant.to_element();
        assert_eq!(element.qname, instant.element_name());
        assert_eq!(TemporalPrimitive::from_element(&element).unwrap(), instant);

        let err = TemporalPrimitive::from_element(&Element::gml("TimeNode")).unwrap_err();
        assert!(matches!(err, Error::UnsupportedVariant { group: "AbstractTimePrimitive", .. }));

        let (begin, end) = instant.interval().unwrap();
        assert_eq!(begin, end);
    }
}
