//! Filter document integration tests
//!
//! Filters are read from complete `ogc:Filter` documents and evaluated
//! against the members of a GML feature collection.

use ogc_schema::filter::{
    BinaryTemporalOp, ComparisonOp, Filter, FilterOperator, LogicOp, ObjectId, Predicate, SortBy,
    SpatialOp,
};
use ogc_schema::gml::{Feature, FeatureCollection};
use ogc_schema::{decode_str, encode_string, Error, FromElement, ToElement, WriterConfig};
use pretty_assertions::assert_eq;

const PARCELS: &str = r#"<gml:FeatureCollection xmlns:gml="http://www.opengis.net/gml/3.2" xmlns:app="urn:example:parcels">
  <gml:featureMember>
    <app:Parcel gml:id="parcel.1">
      <gml:name>North field</gml:name>
      <app:area>1200.5</app:area>
      <app:surveyed>2021-05-01</app:surveyed>
      <app:shape>
        <gml:Polygon>
          <gml:exterior>
            <gml:LinearRing><gml:posList>0 0 4 0 4 3 0 3 0 0</gml:posList></gml:LinearRing>
          </gml:exterior>
        </gml:Polygon>
      </app:shape>
    </app:Parcel>
  </gml:featureMember>
  <gml:featureMember>
    <app:Parcel gml:id="parcel.2">
      <gml:name>south meadow</gml:name>
      <app:area>80</app:area>
      <app:surveyed>2019-11-20</app:surveyed>
      <app:shape>
        <gml:Point><gml:pos>20 20</gml:pos></gml:Point>
      </app:shape>
    </app:Parcel>
  </gml:featureMember>
  <gml:featureMember>
    <app:Parcel gml:id="parcel.3">
      <app:area>450</app:area>
    </app:Parcel>
  </gml:featureMember>
</gml:FeatureCollection>"#;

fn parcels() -> Vec<Feature> {
    let collection: FeatureCollection = decode_str(PARCELS).unwrap();
    collection.features().cloned().collect()
}

fn matching(filter: &Filter) -> Vec<String> {
    parcels()
        .iter()
        .filter(|f| filter.evaluate(*f).unwrap())
        .filter_map(|f| f.object.id.clone())
        .collect()
}

// ============================================================================
// Evaluation
// ============================================================================

#[test]
fn test_and_of_comparison_and_like() {
    let filter: Filter = decode_str(
        r#"<ogc:Filter xmlns:ogc="http://www.opengis.net/ogc">
          <ogc:And>
            <ogc:PropertyIsGreaterThan>
              <ogc:PropertyName>app:area</ogc:PropertyName>
              <ogc:Literal>100</ogc:Literal>
            </ogc:PropertyIsGreaterThan>
            <ogc:PropertyIsLike wildCard="*" singleChar="." escapeChar="!">
              <ogc:PropertyName>name</ogc:PropertyName>
              <ogc:Literal>North*</ogc:Literal>
            </ogc:PropertyIsLike>
          </ogc:And>
        </ogc:Filter>"#,
    )
    .unwrap();
    assert!(matches!(filter.operator(), Some(FilterOperator::Logic(LogicOp::And(_)))));
    assert_eq!(matching(&filter), vec!["parcel.1"]);
}

#[test]
fn test_like_ignoring_case() {
    let filter: Filter = decode_str(
        r#"<ogc:Filter xmlns:ogc="http://www.opengis.net/ogc">
            <ogc:PropertyIsLike wildCard="%" singleChar="_" escape="\" matchCase="false">
              <ogc:PropertyName>name</ogc:PropertyName>
              <ogc:Literal>SOUTH%</ogc:Literal>
            </ogc:PropertyIsLike>
        </ogc:Filter>"#,
    )
    .unwrap();
    assert_eq!(matching(&filter), vec!["parcel.2"]);
}

#[test]
fn test_not_null_and_between() {
    let filter: Filter = decode_str(
        r#"<ogc:Filter xmlns:ogc="http://www.opengis.net/ogc">
          <ogc:Or>
            <ogc:Not>
              <ogc:PropertyIsNull><ogc:PropertyName>surveyed</ogc:PropertyName></ogc:PropertyIsNull>
            </ogc:Not>
            <ogc:PropertyIsBetween>
              <ogc:PropertyName>area</ogc:PropertyName>
              <ogc:LowerBoundary><ogc:Literal>400</ogc:Literal></ogc:LowerBoundary>
              <ogc:UpperBoundary><ogc:Literal>500</ogc:Literal></ogc:UpperBoundary>
            </ogc:PropertyIsBetween>
          </ogc:Or>
        </ogc:Filter>"#,
    )
    .unwrap();
    assert_eq!(matching(&filter), vec!["parcel.1", "parcel.2", "parcel.3"]);
}

#[test]
fn test_bbox_on_geometry_property() {
    let filter: Filter = decode_str(
        r#"<ogc:Filter xmlns:ogc="http://www.opengis.net/ogc" xmlns:gml="http://www.opengis.net/gml">
          <ogc:BBOX>
            <ogc:PropertyName>shape</ogc:PropertyName>
            <gml:Envelope srsName="EPSG:4326">
              <gml:lowerCorner>3 2</gml:lowerCorner>
              <gml:upperCorner>25 25</gml:upperCorner>
            </gml:Envelope>
          </ogc:BBOX>
        </ogc:Filter>"#,
    )
    .unwrap();
    assert!(matches!(filter.spatial, Some(SpatialOp::BBox(_))));
    assert_eq!(matching(&filter), vec!["parcel.1", "parcel.2"]);
}

#[test]
fn test_temporal_after() {
    let filter: Filter = decode_str(
        r#"<ogc:Filter xmlns:ogc="http://www.opengis.net/ogc" xmlns:gml="http://www.opengis.net/gml/3.2">
          <ogc:After>
            <ogc:PropertyName>surveyed</ogc:PropertyName>
            <gml:TimeInstant><gml:timePosition>2020-01-01</gml:timePosition></gml:TimeInstant>
          </ogc:After>
        </ogc:Filter>"#,
    )
    .unwrap();
    assert_eq!(matching(&filter), vec!["parcel.1"]);
}

#[test]
fn test_feature_ids() {
    let filter: Filter = decode_str(
        r#"<ogc:Filter xmlns:ogc="http://www.opengis.net/ogc">
          <ogc:FeatureId fid="parcel.3"/>
          <ogc:FeatureId fid="parcel.1"/>
        </ogc:Filter>"#,
    )
    .unwrap();
    assert_eq!(filter.ids, vec![ObjectId::feature("parcel.3"), ObjectId::feature("parcel.1")]);
    assert_eq!(matching(&filter), vec!["parcel.1", "parcel.3"]);
}

#[test]
fn test_topological_operator_is_not_evaluated() {
    let filter: Filter = decode_str(
        r#"<ogc:Filter xmlns:ogc="http://www.opengis.net/ogc" xmlns:gml="http://www.opengis.net/gml">
          <ogc:Intersects>
            <ogc:PropertyName>shape</ogc:PropertyName>
            <gml:Point><gml:pos>1 1</gml:pos></gml:Point>
          </ogc:Intersects>
        </ogc:Filter>"#,
    )
    .unwrap();
    let feature = &parcels()[0];
    assert!(matches!(filter.evaluate(feature), Err(Error::Unsupported(_))));
}

#[test]
fn test_loose_filter_is_not_evaluated() {
    let comparison: Filter = decode_str(
        r#"<ogc:Filter xmlns:ogc="http://www.opengis.net/ogc">
          <ogc:PropertyIsEqualTo>
            <ogc:PropertyName>area</ogc:PropertyName><ogc:Literal>80</ogc:Literal>
          </ogc:PropertyIsEqualTo>
        </ogc:Filter>"#,
    )
    .unwrap();
    let mut filter = comparison.clone();
    filter.ids.push(ObjectId::feature("parcel.2"));
    assert_eq!(filter.populated_slots(), 2);
    assert!(filter.operator().is_none());
    assert!(matches!(filter.evaluate(&parcels()[1]), Err(Error::Value(_))));

    assert_eq!(matching(&comparison), vec!["parcel.2"]);
}

// ============================================================================
// Operand checks
// ============================================================================

#[test]
fn test_dwithin_refuses_envelope() {
    let xml = r#"<ogc:Filter xmlns:ogc="http://www.opengis.net/ogc" xmlns:gml="http://www.opengis.net/gml">
      <ogc:DWithin>
        <ogc:PropertyName>shape</ogc:PropertyName>
        <gml:Envelope><gml:lowerCorner>0 0</gml:lowerCorner><gml:upperCorner>1 1</gml:upperCorner></gml:Envelope>
        <ogc:Distance units="m">10</ogc:Distance>
      </ogc:DWithin>
    </ogc:Filter>"#;
    match decode_str::<Filter>(xml) {
        Err(Error::MalformedGeometry { operator, found }) => {
            assert_eq!(operator, "ogc:DWithin");
            assert!(found.ends_with("Envelope"));
        }
        other => panic!("expected MalformedGeometry, got {:?}", other),
    }
}

#[test]
fn test_bbox_refuses_geometry() {
    let xml = r#"<ogc:Filter xmlns:ogc="http://www.opengis.net/ogc" xmlns:gml="http://www.opengis.net/gml">
      <ogc:BBOX>
        <ogc:PropertyName>shape</ogc:PropertyName>
        <gml:Point><gml:pos>0 0</gml:pos></gml:Point>
      </ogc:BBOX>
    </ogc:Filter>"#;
    assert!(matches!(
        decode_str::<Filter>(xml),
        Err(Error::MalformedGeometry { .. })
    ));
}

#[test]
fn test_unknown_operator() {
    let xml = r#"<ogc:Filter xmlns:ogc="http://www.opengis.net/ogc">
      <ogc:PropertyIsSimilarTo/>
    </ogc:Filter>"#;
    assert!(matches!(
        decode_str::<Filter>(xml),
        Err(Error::UnsupportedVariant { group: "Filter", .. })
    ));
}

// ============================================================================
// Every operator
// ============================================================================

const NAMESPACES: &str = r#"xmlns:ogc="http://www.opengis.net/ogc" xmlns:gml="http://www.opengis.net/gml/3.2""#;

const COMPARISON_NAMES: [&str; 6] = [
    "PropertyIsEqualTo",
    "PropertyIsNotEqualTo",
    "PropertyIsLessThan",
    "PropertyIsGreaterThan",
    "PropertyIsLessThanOrEqualTo",
    "PropertyIsGreaterThanOrEqualTo",
];

const SPATIAL_NAMES: [&str; 8] = [
    "Equals",
    "Disjoint",
    "Touches",
    "Within",
    "Overlaps",
    "Crosses",
    "Intersects",
    "Contains",
];

const TEMPORAL_NAMES: [&str; 14] = [
    "After",
    "Before",
    "Begins",
    "BegunBy",
    "TContains",
    "During",
    "EndedBy",
    "Ends",
    "TEquals",
    "Meets",
    "MetBy",
    "TOverlaps",
    "OverlappedBy",
    "AnyInteracts",
];

fn operator_xml(name: &str, body: &str) -> String {
    format!("<ogc:{name} {NAMESPACES}>{body}</ogc:{name}>")
}

/// Wrapping keeps exactly `name` in one slot, and both the element and the
/// text round trip give back an equal filter
fn assert_filter_survives(filter: &Filter, name: &str) {
    assert_eq!(filter.populated_slots(), 1, "{name}");
    assert!(filter.operator().is_some(), "{name}");

    let root = filter.to_element();
    assert_eq!(root.children.len(), 1, "{name}");
    assert_eq!(root.children[0].local_name(), name);
    assert_eq!(&Filter::from_element(&root).unwrap(), filter, "{name}");

    let written = encode_string(filter, &WriterConfig::default()).unwrap();
    assert_eq!(&decode_str::<Filter>(&written).unwrap(), filter, "{name}");
}

#[test]
fn test_every_comparison_operator_survives() {
    let binary = "<ogc:PropertyName>area</ogc:PropertyName><ogc:Literal>80</ogc:Literal>";
    let mut cases: Vec<(&str, String)> = COMPARISON_NAMES
        .iter()
        .map(|name| (*name, operator_xml(name, binary)))
        .collect();
    cases.push((
        "PropertyIsLike",
        r#"<ogc:PropertyIsLike xmlns:ogc="http://www.opengis.net/ogc" wildCard="*" singleChar="." escapeChar="!">
            <ogc:PropertyName>name</ogc:PropertyName><ogc:Literal>North*</ogc:Literal>
        </ogc:PropertyIsLike>"#
            .to_string(),
    ));
    cases.push((
        "PropertyIsNull",
        operator_xml("PropertyIsNull", "<ogc:PropertyName>surveyed</ogc:PropertyName>"),
    ));
    cases.push((
        "PropertyIsBetween",
        operator_xml(
            "PropertyIsBetween",
            "<ogc:PropertyName>area</ogc:PropertyName>\
             <ogc:LowerBoundary><ogc:Literal>1</ogc:Literal></ogc:LowerBoundary>\
             <ogc:UpperBoundary><ogc:Literal>9</ogc:Literal></ogc:UpperBoundary>",
        ),
    ));
    assert_eq!(cases.len(), 9);

    for (name, xml) in cases {
        let op: ComparisonOp = decode_str(&xml).unwrap();
        match (name, &op) {
            ("PropertyIsLike", ComparisonOp::Like(_))
            | ("PropertyIsNull", ComparisonOp::Null(_))
            | ("PropertyIsBetween", ComparisonOp::Between(_)) => {}
            (_, ComparisonOp::Binary(binary)) => assert_eq!(binary.kind.local_name(), name),
            other => panic!("wrong variant {:?}", other),
        }
        let filter = Filter::from(op.clone());
        assert!(matches!(filter.operator(), Some(FilterOperator::Comparison(inner)) if *inner == op));
        assert_filter_survives(&filter, name);
    }
}

#[test]
fn test_every_spatial_operator_survives() {
    let point = r#"<ogc:PropertyName>shape</ogc:PropertyName>
        <gml:Point gml:id="pt"><gml:pos>1 2</gml:pos></gml:Point>"#;
    let mut cases: Vec<(&str, String)> = SPATIAL_NAMES
        .iter()
        .map(|name| (*name, operator_xml(name, point)))
        .collect();
    for name in ["DWithin", "Beyond"] {
        let body = format!(r#"{point}<ogc:Distance units="m">5</ogc:Distance>"#);
        cases.push((name, operator_xml(name, &body)));
    }
    cases.push((
        "BBOX",
        operator_xml(
            "BBOX",
            "<ogc:PropertyName>shape</ogc:PropertyName>\
             <gml:Envelope><gml:lowerCorner>0 0</gml:lowerCorner><gml:upperCorner>4 3</gml:upperCorner></gml:Envelope>",
        ),
    ));
    assert_eq!(cases.len(), 11);

    for (name, xml) in cases {
        let op: SpatialOp = decode_str(&xml).unwrap();
        match &op {
            SpatialOp::Binary(binary) => assert_eq!(binary.kind.local_name(), name),
            SpatialOp::DistanceBuffer(buffer) => assert_eq!(buffer.kind.local_name(), name),
            SpatialOp::BBox(_) => assert_eq!(name, "BBOX"),
        }
        let filter = Filter::from(op.clone());
        assert!(matches!(filter.operator(), Some(FilterOperator::Spatial(inner)) if *inner == op));
        assert_filter_survives(&filter, name);
    }
}

#[test]
fn test_every_temporal_operator_survives() {
    let period = r#"<ogc:PropertyName>surveyed</ogc:PropertyName>
        <gml:TimePeriod gml:id="tp">
            <gml:begin><gml:TimeInstant gml:id="t0"><gml:timePosition>2020-01-01</gml:timePosition></gml:TimeInstant></gml:begin>
            <gml:endPosition>2021-01-01</gml:endPosition>
        </gml:TimePeriod>"#;
    for name in TEMPORAL_NAMES {
        let op: BinaryTemporalOp = decode_str(&operator_xml(name, period)).unwrap();
        assert_eq!(op.kind.local_name(), name);
        let filter = Filter::from(op.clone());
        assert!(matches!(filter.operator(), Some(FilterOperator::Temporal(inner)) if *inner == op));
        assert_filter_survives(&filter, name);

        let written = encode_string(&filter, &WriterConfig::default()).unwrap();
        assert!(written.contains("t0"), "{name}: {written}");
    }
}

#[test]
fn test_every_identifier_survives() {
    let cases = [
        ("FeatureId", r#"<ogc:FeatureId xmlns:ogc="http://www.opengis.net/ogc" fid="parcel.1"/>"#.to_string()),
        ("GmlObjectId", format!(r#"<ogc:GmlObjectId {NAMESPACES} gml:id="parcel.2"/>"#)),
    ];
    for (name, xml) in cases {
        let id: ObjectId = decode_str(&xml).unwrap();
        let filter = Filter::from(vec![id.clone()]);
        assert!(matches!(filter.operator(), Some(FilterOperator::Ids([inner])) if *inner == id));
        assert_filter_survives(&filter, name);
    }
}

// ============================================================================
// Writing and sorting
// ============================================================================

#[test]
fn test_filter_roundtrip_through_text() {
    let xml = r#"<ogc:Filter xmlns:ogc="http://www.opengis.net/ogc" xmlns:gml="http://www.opengis.net/gml">
      <ogc:Not>
        <ogc:PropertyIsLessThanOrEqualTo matchCase="true">
          <ogc:Add>
            <ogc:PropertyName>area</ogc:PropertyName>
            <ogc:Literal>10</ogc:Literal>
          </ogc:Add>
          <ogc:Literal>90</ogc:Literal>
        </ogc:PropertyIsLessThanOrEqualTo>
      </ogc:Not>
    </ogc:Filter>"#;
    let filter: Filter = decode_str(xml).unwrap();
    let written = encode_string(&filter, &WriterConfig::default()).unwrap();

    let doc = roxmltree::Document::parse(&written).unwrap();
    assert!(doc
        .descendants()
        .any(|n| n.has_tag_name((ogc_schema::OGC_NAMESPACE, "Add"))));

    let back: Filter = decode_str(&written).unwrap();
    assert_eq!(back, filter);
    assert_eq!(matching(&back), vec!["parcel.1", "parcel.3"]);

    let copy = Filter::from_element(&filter.to_element()).unwrap();
    assert!(matches!(
        copy.logic,
        Some(LogicOp::Not(ref not)) if matches!(*not.operand, ogc_schema::filter::LogicOperand::Comparison(ComparisonOp::Binary(_)))
    ));
}

#[test]
fn test_sort_parcels() {
    let sort: SortBy = decode_str(
        r#"<ogc:SortBy xmlns:ogc="http://www.opengis.net/ogc">
          <ogc:SortProperty>
            <ogc:PropertyName>area</ogc:PropertyName>
            <ogc:SortOrder>DESC</ogc:SortOrder>
          </ogc:SortProperty>
        </ogc:SortBy>"#,
    )
    .unwrap();
    let mut features = parcels();
    sort.sort(&mut features).unwrap();
    let ids: Vec<_> = features.iter().filter_map(|f| f.object.id.as_deref()).collect();
    assert_eq!(ids, vec!["parcel.1", "parcel.3", "parcel.2"]);
}
