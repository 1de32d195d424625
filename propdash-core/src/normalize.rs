//! Raw row to [`CanonicalRecord`] conversion.
//!
//! A row either normalizes completely or is rejected; nothing is zero-filled.
//! Rejections are collected so the load can report "N of M rows rejected".

use crate::record::{columns, CanonicalRecord, RawRecord, UNKNOWN_FLOOR_LEVEL};
use crate::tenure::Tenure;
use propdash_utils::{dates, numbers};
use thiserror::Error;

/// Why a raw row could not be normalized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizationError {
    #[error("missing column {column:?}")]
    MissingColumn { column: &'static str },
    #[error("column {column:?} is not numeric: {value:?}")]
    Numeric { column: &'static str, value: String },
    #[error("sale date {value:?} is not in Mon-YY form")]
    Date { value: String },
    #[error("lease tenure {value:?} has an out-of-range year or duration")]
    Tenure { value: String },
}

/// A row excluded from the canonical dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedRow {
    /// Zero-based index of the data row (header excluded).
    pub row: usize,
    pub error: NormalizationError,
}

/// Outcome of normalizing a whole table.
#[derive(Debug, Clone, Default)]
pub struct NormalizedDataset {
    pub records: Vec<CanonicalRecord>,
    pub rejected: Vec<RejectedRow>,
}

impl NormalizedDataset {
    pub fn total_rows(&self) -> usize {
        self.records.len() + self.rejected.len()
    }

    /// "N of M rows rejected"
    pub fn summary(&self) -> String {
        format!("{} of {} rows rejected", self.rejected.len(), self.total_rows())
    }
}

fn cell<'a>(raw: &'a RawRecord, column: &'static str) -> Result<&'a str, NormalizationError> {
    raw.get(column)
        .map(|s| s.trim())
        .ok_or(NormalizationError::MissingColumn { column })
}

fn numeric(raw: &RawRecord, column: &'static str) -> Result<f64, NormalizationError> {
    let value = cell(raw, column)?;
    numbers::parse_finite(value).ok_or_else(|| NormalizationError::Numeric {
        column,
        value: value.to_string(),
    })
}

/// Normalize a single row.
pub fn normalize(raw: &RawRecord) -> Result<CanonicalRecord, NormalizationError> {
    let sale_date_raw = cell(raw, columns::SALE_DATE)?;
    let sale_date = dates::parse_month_year(sale_date_raw).map_err(|_| NormalizationError::Date {
        value: sale_date_raw.to_string(),
    })?;

    let floor_level = match cell(raw, columns::FLOOR_LEVEL)? {
        "-" => UNKNOWN_FLOOR_LEVEL.to_string(),
        other => other.to_string(),
    };

    let tenure_raw = cell(raw, columns::TENURE)?.to_string();
    let tenure = Tenure::parse(&tenure_raw)?;

    Ok(CanonicalRecord {
        project_name: cell(raw, columns::PROJECT_NAME)?.to_string(),
        postal_district: cell(raw, columns::POSTAL_DISTRICT)?.to_string(),
        property_type: cell(raw, columns::PROPERTY_TYPE)?.to_string(),
        area_category: cell(raw, columns::TYPE_OF_AREA)?.to_string(),
        floor_level,
        area_sqft: numeric(raw, columns::AREA_SQFT)?,
        area_sqm: numeric(raw, columns::AREA_SQM)?,
        transacted_price: numeric(raw, columns::TRANSACTED_PRICE)?,
        unit_price_psf: numeric(raw, columns::UNIT_PRICE_PSF)?,
        unit_price_psm: numeric(raw, columns::UNIT_PRICE_PSM)?,
        sale_date,
        tenure_raw,
        lease_start_year: tenure.lease_start_year,
        lease_end: tenure.lease_end,
    })
}

/// Normalize every row, keeping the good ones and collecting the rejections.
pub fn normalize_all(rows: &[RawRecord]) -> NormalizedDataset {
    let mut dataset = NormalizedDataset {
        records: Vec::with_capacity(rows.len()),
        rejected: Vec::new(),
    };
    for (row, raw) in rows.iter().enumerate() {
        match normalize(raw) {
            Ok(record) => dataset.records.push(record),
            Err(error) => {
                log::debug!("normalize: Rejected row {}: {}", row, error);
                dataset.rejected.push(RejectedRow { row, error });
            }
        }
    }
    if dataset.rejected.is_empty() {
        log::info!("normalize: Accepted all {} rows", dataset.records.len());
    } else {
        log::warn!("normalize: {}", dataset.summary());
    }
    dataset
}
