//! Coverage reading integration tests
//!
//! A raster is georeferenced once through a `gml:RectifiedGrid` document and
//! once through GDAL style metadata; both readers must agree.

use ogc_schema::coverage::{
    CoverageMetadata, CoverageReader, DefaultCoverageReader, MemoryImage, Raster,
};
use ogc_schema::gml::grid::RectifiedGrid;
use ogc_schema::gml::{Envelope, SrsReference};
use ogc_schema::{decode_str, Document, Error};

const GRID: &str = r#"<gml:RectifiedGrid xmlns:gml="http://www.opengis.net/gml/3.2"
        gml:id="dem" dimension="2" srsName="EPSG:32654">
    <gml:limits>
        <gml:GridEnvelope><gml:low>0 0</gml:low><gml:high>99 49</gml:high></gml:GridEnvelope>
    </gml:limits>
    <gml:axisLabels>x y</gml:axisLabels>
    <gml:origin><gml:Point gml:id="dem.origin"><gml:pos>100 50</gml:pos></gml:Point></gml:origin>
    <gml:offsetVector>0.5 0</gml:offsetVector>
    <gml:offsetVector>0 -0.5</gml:offsetVector>
</gml:RectifiedGrid>"#;

/// 100x50 single band image whose sample is `x + 1000 * y`
fn elevation() -> MemoryImage {
    let data = (0..50)
        .flat_map(|y| (0..100).map(move |x| (x + 1000 * y) as f64))
        .collect();
    MemoryImage::new(Raster::new(100, 50, 1, data).unwrap())
}

fn grid_reader() -> DefaultCoverageReader<MemoryImage> {
    let grid: RectifiedGrid = decode_str(GRID).unwrap();
    DefaultCoverageReader::from_rectified_grid(elevation(), &grid).unwrap()
}

fn request(min: [f64; 2], max: [f64; 2]) -> Envelope {
    Envelope::new(min.to_vec(), max.to_vec()).with_srs(SrsReference::named("EPSG:32654"))
}

#[test]
fn test_grid_and_metadata_readers_agree() {
    let metadata = CoverageMetadata::new()
        .with("GeoTransform", "100, 0.5, 0, 50, 0, -0.5")
        .with("crs", "EPSG:32654");
    let from_metadata = DefaultCoverageReader::from_metadata(elevation(), &metadata).unwrap();
    let from_grid = grid_reader();

    assert_eq!(from_grid.grid_to_crs(), from_metadata.grid_to_crs());
    assert_eq!(
        from_grid.coverage_bounds().corners().unwrap(),
        Some((vec![100.0, 25.0], vec![150.0, 50.0]))
    );
    assert_eq!(from_grid.coverage_bounds(), from_metadata.coverage_bounds());
}

#[test]
fn test_read_window() {
    let coverage = grid_reader()
        .read(&request([110.0, 40.0], [120.0, 45.0]), None)
        .unwrap()
        .unwrap();
    assert_eq!((coverage.raster.width, coverage.raster.height), (20, 10));
    assert_eq!(coverage.raster.get(0, 0, 0), Some(10020.0));
    assert_eq!(coverage.raster.get(19, 9, 0), Some(19039.0));
    assert_eq!(coverage.grid_to_crs.apply(0.0, 0.0), (110.0, 45.0));
    assert_eq!(
        coverage.envelope().corners().unwrap(),
        Some((vec![110.0, 40.0], vec![120.0, 45.0]))
    );
    assert_eq!(coverage.srs.srs_name.as_deref(), Some("EPSG:32654"));
}

#[test]
fn test_read_subsampled() {
    let coverage = grid_reader()
        .read(&request([110.0, 40.0], [120.0, 45.0]), Some((1.0, 1.5)))
        .unwrap()
        .unwrap();
    assert_eq!((coverage.raster.width, coverage.raster.height), (10, 4));
    assert_eq!(coverage.raster.get(1, 1, 0), Some(13022.0));
    assert_eq!(coverage.grid_to_crs.apply(1.0, 1.0), (111.0, 43.5));
}

#[test]
fn test_read_clamps_and_misses() {
    let reader = grid_reader();
    let clamped = reader
        .read(&request([90.0, 20.0], [105.0, 60.0]), None)
        .unwrap()
        .unwrap();
    assert_eq!((clamped.raster.width, clamped.raster.height), (10, 50));

    assert!(reader
        .read(&request([200.0, 20.0], [210.0, 30.0]), None)
        .unwrap()
        .is_none());

    let elsewhere = Envelope::new(vec![110.0, 40.0], vec![120.0, 45.0])
        .with_srs(SrsReference::named("EPSG:4326"));
    assert!(matches!(
        reader.read(&elsewhere, None),
        Err(Error::Unsupported(_))
    ));
}

#[test]
fn test_metadata_document() {
    let xml = r#"<metadata>
        <georeference>
            <geotransform>100 0.5 0 50 0 -0.5</geotransform>
            <srsName>EPSG:32654</srsName>
        </georeference>
        <crs>EPSG:4326</crs>
    </metadata>"#;
    let root = Document::from_string(xml).unwrap().into_root().unwrap();
    let metadata = CoverageMetadata::from_element(&root);
    assert_eq!(
        metadata.get("geotransform", "GeoTransform").unwrap(),
        "100 0.5 0 50 0 -0.5"
    );
    match DefaultCoverageReader::from_metadata(elevation(), &metadata) {
        Err(Error::AmbiguousMetadata { key, alias }) => {
            assert_eq!((key.as_str(), alias.as_str()), ("srsName", "crs"));
        }
        other => panic!("expected AmbiguousMetadata, got {:?}", other.map(|_| ())),
    }

    let empty = CoverageMetadata::new();
    assert!(matches!(
        DefaultCoverageReader::from_metadata(elevation(), &empty),
        Err(Error::MissingMetadata { .. })
    ));
}
