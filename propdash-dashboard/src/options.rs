//! Choices offered by the filter controls, computed once per dataset.

use chrono::Datelike;
use propdash_core::date_range::DateInterval;
use propdash_core::record::CanonicalRecord;
use propdash_core::tenure::TenureBounds;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterOptions {
    /// Distinct project names, sorted.
    pub projects: Vec<String>,
    /// Distinct district codes, numeric codes first in numeric order.
    pub districts: Vec<String>,
    pub tenure: TenureBounds,
    /// Timeline domain.
    pub sale_dates: Option<DateInterval>,
}

fn compare_districts(a: &str, b: &str) -> Ordering {
    match (a.parse::<u32>(), b.parse::<u32>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

impl FilterOptions {
    pub fn from_records(records: &[CanonicalRecord]) -> FilterOptions {
        let projects: Vec<String> = records
            .iter()
            .map(|r| r.project_name.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut districts: Vec<String> = records
            .iter()
            .map(|r| r.postal_district.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        districts.sort_by(|a, b| compare_districts(a, b));

        let sale_dates = DateInterval::extent(records.iter().map(|r| r.sale_date));
        let fallback_year = sale_dates.map(|d| d.start().year()).unwrap_or(0);
        let tenure = TenureBounds::observe(records.iter().map(|r| r.lease_end), fallback_year);

        FilterOptions {
            projects,
            districts,
            tenure,
            sale_dates,
        }
    }

    /// Dropdown label for a district code.
    pub fn district_label(code: &str) -> String {
        format!("District {}", code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use propdash_core::tenure::LeaseEnd;

    fn record(project: &str, district: &str, lease_end: LeaseEnd, year: i32) -> CanonicalRecord {
        CanonicalRecord {
            project_name: project.to_string(),
            postal_district: district.to_string(),
            property_type: "Office".to_string(),
            area_category: "Strata".to_string(),
            floor_level: "01 to 05".to_string(),
            area_sqft: 1000.0,
            area_sqm: 92.9,
            transacted_price: 1_000_000.0,
            unit_price_psf: 1000.0,
            unit_price_psm: 10_764.0,
            sale_date: NaiveDate::from_ymd_opt(year, 3, 1).unwrap(),
            tenure_raw: String::new(),
            lease_start_year: None,
            lease_end,
        }
    }

    #[test]
    fn test_options() {
        let records = vec![
            record("GAMMA", "10", LeaseEnd::Expires(2090), 2021),
            record("ALPHA", "2", LeaseEnd::Freehold, 2019),
            record("BETA", "10", LeaseEnd::Expires(2060), 2023),
            record("ALPHA", "9", LeaseEnd::Freehold, 2020),
        ];
        let options = FilterOptions::from_records(&records);
        assert_eq!(options.projects, vec!["ALPHA", "BETA", "GAMMA"]);
        assert_eq!(options.districts, vec!["2", "9", "10"]);
        assert_eq!(options.tenure.min_year, 2060);
        assert_eq!(options.tenure.freehold_sentinel(), 2091);
        let dates = options.sale_dates.unwrap();
        assert_eq!(dates.start(), NaiveDate::from_ymd_opt(2019, 3, 1).unwrap());
        assert_eq!(dates.end(), NaiveDate::from_ymd_opt(2023, 3, 1).unwrap());
    }

    #[test]
    fn test_non_numeric_districts_sort_last() {
        let mut codes = vec!["B", "11", "A", "01", "3"];
        codes.sort_by(|a, b| compare_districts(a, b));
        assert_eq!(codes, vec!["01", "3", "11", "A", "B"]);
    }

    #[test]
    fn test_all_freehold_falls_back_to_sale_year() {
        let records = vec![record("ALPHA", "1", LeaseEnd::Freehold, 2018)];
        let options = FilterOptions::from_records(&records);
        assert_eq!(options.tenure.min_year, 2018);
        assert_eq!(options.tenure.max_year, 2018);
        assert_eq!(FilterOptions::district_label("1"), "District 1");
    }
}
