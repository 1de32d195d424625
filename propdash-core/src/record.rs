use crate::tenure::LeaseEnd;
use chrono::NaiveDate;
use csv::ReaderBuilder;
use serde::Serialize;
use std::collections::HashMap;

/// Column names of the transaction export, exactly as they appear in the header row.
pub mod columns {
    pub const PROJECT_NAME: &str = "Project Name";
    pub const POSTAL_DISTRICT: &str = "Postal District";
    pub const PROPERTY_TYPE: &str = "Property Type";
    pub const TYPE_OF_AREA: &str = "Type of Area";
    pub const FLOOR_LEVEL: &str = "Floor Level";
    pub const AREA_SQFT: &str = "Area (SQFT)";
    pub const AREA_SQM: &str = "Area (SQM)";
    pub const TRANSACTED_PRICE: &str = "Transacted Price ($)";
    pub const UNIT_PRICE_PSF: &str = "Unit Price ($ PSF)";
    pub const UNIT_PRICE_PSM: &str = "Unit Price ($ PSM)";
    pub const SALE_DATE: &str = "Sale Date";
    pub const TENURE: &str = "Tenure";
}

/// One untyped row of the export: column name to cell text.
pub type RawRecord = HashMap<String, String>;

/// A fully parsed transaction. Built once at load and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalRecord {
    pub project_name: String,
    /// District code, e.g. "10".
    pub postal_district: String,
    pub property_type: String,
    /// The "Type of Area" column (strata, land, ...).
    pub area_category: String,
    /// Floor band; a bare "-" in the export becomes [`UNKNOWN_FLOOR_LEVEL`].
    pub floor_level: String,
    pub area_sqft: f64,
    pub area_sqm: f64,
    pub transacted_price: f64,
    pub unit_price_psf: f64,
    pub unit_price_psm: f64,
    /// First day of the sale month.
    pub sale_date: NaiveDate,
    pub tenure_raw: String,
    pub lease_start_year: Option<i32>,
    pub lease_end: LeaseEnd,
}

/// Placeholder floor level for rows exported with "-".
pub const UNKNOWN_FLOOR_LEVEL: &str = "NA";

/// Read a CSV export with a header row into raw records.
///
/// Short rows are tolerated; their missing cells are simply absent from the
/// map and surface later as a normalization error.
pub fn read_raw_records(csv_data: &str) -> anyhow::Result<Vec<RawRecord>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(csv_data.as_bytes());

    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for result in rdr.records() {
        let r = result?;
        let row: RawRecord = headers
            .iter()
            .zip(r.iter())
            .map(|(header, cell)| (header.clone(), cell.to_string()))
            .collect();
        rows.push(row);
    }
    log::info!("record: Read {} raw rows with {} columns", rows.len(), headers.len());
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "Project Name,Postal District,Transacted Price ($)\n\
                       ALPHA TOWER,10,\"1,200,000\"\n\
                       BETA POINT,3\n";

    #[test]
    fn test_read_raw_records() {
        let rows = read_raw_records(CSV).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][columns::PROJECT_NAME], "ALPHA TOWER");
        assert_eq!(rows[0][columns::TRANSACTED_PRICE], "1,200,000");
        assert_eq!(rows[1][columns::POSTAL_DISTRICT], "3");
        assert!(!rows[1].contains_key(columns::TRANSACTED_PRICE));
    }

    #[test]
    fn test_read_raw_records_header_only() {
        let rows = read_raw_records("Project Name,Tenure\n").unwrap();
        assert!(rows.is_empty());
    }
}
