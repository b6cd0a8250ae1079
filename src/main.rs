//! Command-line interface for ogc-schema

#[cfg(feature = "cli")]
use anyhow::{bail, Context, Result};
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use std::fs;
#[cfg(feature = "cli")]
use std::path::PathBuf;
#[cfg(feature = "cli")]
use tracing::{debug, info};

#[cfg(feature = "cli")]
use ogc_schema::filter::{FeatureView, Filter, FilterOperator, Predicate};
#[cfg(feature = "cli")]
use ogc_schema::gml::{Envelope, Feature, FeatureCollection, Geometry, GmlObjectType};
#[cfg(feature = "cli")]
use ogc_schema::{Element, FromElement, Loader, Location, Tagged, ToElement, WriterConfig};

#[cfg(feature = "cli")]
#[derive(Parser, Debug)]
#[command(name = "ogc-schema")]
#[command(author, version, about = "GML and OGC filter document tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode a document and describe its root
    Inspect {
        /// GML or filter document
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Print the bounds of a feature collection
    Bounds {
        /// GML feature collection
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Decode a document and write it back out
    Roundtrip {
        /// GML or filter document
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the ids of the features a filter selects
    Filter {
        /// Filter document
        #[arg(value_name = "FILTER")]
        filter: PathBuf,

        /// GML feature collection
        #[arg(value_name = "FEATURES")]
        features: PathBuf,
    },
}

/// A decoded document root
#[cfg(feature = "cli")]
#[derive(Debug, serde::Serialize)]
#[serde(tag = "kind", content = "value")]
enum Decoded {
    Filter(Filter),
    Envelope(Envelope),
    Geometry(Geometry),
    FeatureCollection(FeatureCollection),
    Feature(Feature),
}

#[cfg(feature = "cli")]
impl Decoded {
    fn from_root(root: &Element) -> ogc_schema::Result<Self> {
        let qname = &root.qname;
        if qname.is_ogc("Filter") {
            return Ok(Self::Filter(Filter::from_element(root)?));
        }
        if qname.is_gml("Envelope") {
            return Ok(Self::Envelope(Envelope::from_element(root)?));
        }
        if qname.in_gml() && !qname.local_name.ends_with("FeatureCollection") {
            return Ok(Self::Geometry(Geometry::from_element(root)?));
        }
        let is_collection = root.children.iter().any(|c| {
            matches!(
                c.local_name(),
                "featureMember" | "featureMembers" | "member" | "members"
            )
        });
        if is_collection || qname.local_name.ends_with("FeatureCollection") {
            Ok(Self::FeatureCollection(FeatureCollection::from_element(root)?))
        } else {
            Ok(Self::Feature(Feature::from_element(root)?))
        }
    }

    fn to_element(&self) -> Element {
        match self {
            Self::Filter(filter) => filter.to_element(),
            Self::Envelope(envelope) => envelope.to_element(),
            Self::Geometry(geometry) => geometry.to_element(),
            Self::FeatureCollection(collection) => collection.to_element(),
            Self::Feature(feature) => feature.to_element(),
        }
    }
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect { file, json } => cmd_inspect(file, json),
        Commands::Bounds { file } => cmd_bounds(file),
        Commands::Roundtrip { file, output } => cmd_roundtrip(file, output),
        Commands::Filter { filter, features } => cmd_filter(filter, features),
    }
}

#[cfg(feature = "cli")]
fn load_root(path: PathBuf) -> Result<Element> {
    let location = Location::Path(path);
    info!("Loading {}", location);
    let document = Loader::new()
        .load_document(&location)
        .with_context(|| format!("failed to read {}", location))?;
    document.check_unique_ids()?;
    Ok(document.into_root()?)
}

#[cfg(feature = "cli")]
fn cmd_inspect(file: PathBuf, json: bool) -> Result<()> {
    let root = load_root(file)?;
    let decoded = Decoded::from_root(&root)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&decoded)?);
        return Ok(());
    }

    println!("ogc-schema v{}", ogc_schema::VERSION);
    println!();
    println!("Root: {}", root.qname);
    match &decoded {
        Decoded::Filter(filter) => {
            let operator = match filter.operator() {
                Some(FilterOperator::Comparison(op)) => op.element_name().to_string(),
                Some(FilterOperator::Spatial(op)) => op.element_name().to_string(),
                Some(FilterOperator::Logic(op)) => op.element_name().to_string(),
                Some(FilterOperator::Temporal(op)) => op.element_name().to_string(),
                Some(FilterOperator::Ids(ids)) => format!("{} identifiers", ids.len()),
                None => format!("{} populated slots", filter.populated_slots()),
            };
            println!("  Filter operator: {}", operator);
            println!("  Identifiers: {}", filter.ids.len());
        }
        Decoded::Envelope(envelope) => {
            println!("  srsName: {}", envelope.srs.srs_name.as_deref().unwrap_or("(none)"));
            if let Some(bounds) = envelope.bounds()? {
                print_bounds(bounds.min_x, bounds.min_y, bounds.max_x, bounds.max_y);
            }
        }
        Decoded::Geometry(geometry) => {
            println!("  gml:id: {}", geometry.gml_object().id.as_deref().unwrap_or("(none)"));
            println!("  srsName: {}", geometry.srs().srs_name.as_deref().unwrap_or("(none)"));
            println!("  Positions: {}", geometry.positions()?.len());
            if let Some(bounds) = geometry.bounds()? {
                print_bounds(bounds.min_x, bounds.min_y, bounds.max_x, bounds.max_y);
            }
        }
        Decoded::FeatureCollection(collection) => {
            println!("  Members: {}", collection.features().count());
            for feature in collection.features() {
                println!(
                    "    {} {}",
                    feature.qname,
                    feature.feature_id().unwrap_or("(no id)")
                );
            }
        }
        Decoded::Feature(feature) => {
            println!("  gml:id: {}", feature.feature_id().unwrap_or("(none)"));
            println!("  Properties: {}", feature.properties.len());
            for property in &feature.properties {
                println!("    {}", property.qname);
            }
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn print_bounds(min_x: f64, min_y: f64, max_x: f64, max_y: f64) {
    println!("  Bounds: {} {} {} {}", min_x, min_y, max_x, max_y);
}

#[cfg(feature = "cli")]
fn cmd_bounds(file: PathBuf) -> Result<()> {
    let root = load_root(file)?;
    let collection = FeatureCollection::from_element(&root)?;
    let envelope = collection.compute_bounds()?;
    match envelope.corners()? {
        Some((lower, upper)) => println!(
            "{} {} {} {}",
            lower[0], lower[1], upper[0], upper[1]
        ),
        None => bail!("collection has no bounds"),
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn cmd_roundtrip(file: PathBuf, output: Option<PathBuf>) -> Result<()> {
    let root = load_root(file)?;
    let decoded = Decoded::from_root(&root)?;
    let xml = ogc_schema::Document::with_root(decoded.to_element()).write(&WriterConfig::default())?;

    if let Some(output_path) = output {
        fs::write(&output_path, &xml)?;
        info!("Wrote {}", output_path.display());
    } else {
        println!("{}", xml);
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn cmd_filter(filter: PathBuf, features: PathBuf) -> Result<()> {
    let filter = Filter::from_element(&load_root(filter)?)?;
    let collection = FeatureCollection::from_element(&load_root(features)?)?;

    let mut matched = 0;
    for feature in collection.features() {
        if filter.evaluate(feature)? {
            matched += 1;
            println!("{}", feature.feature_id().unwrap_or("(no id)"));
        }
    }
    debug!("{} of {} features matched", matched, collection.features().count());
    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Rebuild with --features cli");
    std::process::exit(1);
}
