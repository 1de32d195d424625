//! Reading the dashboard's sources from disk.

use anyhow::Context;
use clap::Args;
use flate2::read::GzDecoder;
use geojson::FeatureCollection;
use propdash_core::record::{read_raw_records, RawRecord};
use propdash_dashboard::config::DashboardConfig;
use propdash_geo::lookup::DistrictLookup;
use propdash_geo::parse_feature_collection;
use std::io::Read;

#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Transactions CSV export, optionally gzip-compressed (.gz)
    #[arg(short = 't', long)]
    pub transactions: String,

    /// District geometry as a GeoJSON FeatureCollection
    #[arg(short = 'g', long)]
    pub geometry: String,

    /// District to planning-area lookup JSON; selects the planning-area join
    #[arg(short = 'l', long)]
    pub lookup: Option<String>,

    /// Dashboard config JSON
    #[arg(short = 'c', long)]
    pub config: Option<String>,
}

/// Everything a controller needs before `initialize`.
pub struct Sources {
    pub raw_rows: Vec<RawRecord>,
    pub geometry: FeatureCollection,
    pub lookup: Option<DistrictLookup>,
    pub config: DashboardConfig,
}

/// Decode a transactions file, decompressing when the path ends in `.gz`.
pub fn decode_transactions(path: &str, bytes: Vec<u8>) -> anyhow::Result<String> {
    let bytes = if path.ends_with(".gz") {
        let mut decoder = GzDecoder::new(&bytes[..]);
        let mut decompressed = Vec::new();
        decoder
            .read_to_end(&mut decompressed)
            .with_context(|| format!("decompressing {}", path))?;
        log::debug!("load: Decompressed {} to {} bytes", path, decompressed.len());
        decompressed
    } else {
        bytes
    };
    String::from_utf8(bytes).with_context(|| format!("{} is not valid UTF-8", path))
}

async fn read_transactions(path: &str) -> anyhow::Result<Vec<RawRecord>> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading {}", path))?;
    let csv_data = decode_transactions(path, bytes)?;
    read_raw_records(&csv_data).with_context(|| format!("parsing {}", path))
}

async fn read_geometry(path: &str) -> anyhow::Result<FeatureCollection> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path))?;
    let collection = parse_feature_collection(&text).with_context(|| format!("parsing {}", path))?;
    log::info!("load: Loaded {} features from {}", collection.features.len(), path);
    Ok(collection)
}

async fn read_lookup(path: Option<&str>) -> anyhow::Result<Option<DistrictLookup>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path))?;
    let lookup = DistrictLookup::from_json(&text).with_context(|| format!("parsing {}", path))?;
    Ok(Some(lookup))
}

async fn read_config(path: Option<&str>) -> anyhow::Result<DashboardConfig> {
    let Some(path) = path else {
        return Ok(DashboardConfig::default());
    };
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path))?;
    DashboardConfig::from_json(&text).with_context(|| format!("parsing {}", path))
}

/// Load every source concurrently. Any failure fails the whole load.
pub async fn load_sources(args: &SourceArgs) -> anyhow::Result<Sources> {
    let (raw_rows, geometry, lookup, config) = tokio::try_join!(
        read_transactions(&args.transactions),
        read_geometry(&args.geometry),
        read_lookup(args.lookup.as_deref()),
        read_config(args.config.as_deref()),
    )?;
    Ok(Sources {
        raw_rows,
        geometry,
        lookup,
        config,
    })
}
