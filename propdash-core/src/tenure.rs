use crate::normalize::NormalizationError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static LEASE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)\s+yrs\s+lease\s+commencing\s+from\s+(\d{4})")
        .expect("lease pattern is a valid regex")
});

/// End of a property's tenure.
///
/// `Freehold` sorts after every `Expires` year, so it behaves like a
/// sentinel "later than any lease" wherever lease ends are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LeaseEnd {
    Expires(i32),
    Freehold,
}

/// Lease fields derived from the raw "Tenure" text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tenure {
    pub lease_start_year: Option<i32>,
    pub lease_end: LeaseEnd,
}

impl Tenure {
    /// Derive lease start and end from "<N> yrs lease commencing from <year>".
    ///
    /// Text that does not match the pattern is freehold. Text that matches
    /// but whose numbers do not fit a year is an error, not freehold.
    pub fn parse(raw: &str) -> Result<Tenure, NormalizationError> {
        let Some(caps) = LEASE_PATTERN.captures(raw) else {
            return Ok(Tenure {
                lease_start_year: None,
                lease_end: LeaseEnd::Freehold,
            });
        };
        let invalid = || NormalizationError::Tenure {
            value: raw.to_string(),
        };
        let duration = caps[1].parse::<i32>().map_err(|_| invalid())?;
        let start = caps[2].parse::<i32>().map_err(|_| invalid())?;
        let end = start.checked_add(duration).ok_or_else(invalid)?;
        Ok(Tenure {
            lease_start_year: Some(start),
            lease_end: LeaseEnd::Expires(end),
        })
    }
}

/// Selected tenure interval.
///
/// An upper bound of `Freehold` means the slider sits on its last stop:
/// freehold records pass and every real lease end from `min` upwards passes.
/// A year upper bound excludes freehold records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenureRange {
    pub min: i32,
    pub max: LeaseEnd,
}

impl TenureRange {
    /// A range that every record passes.
    pub fn unbounded() -> Self {
        TenureRange {
            min: i32::MIN,
            max: LeaseEnd::Freehold,
        }
    }

    pub fn contains(&self, lease_end: LeaseEnd) -> bool {
        match (lease_end, self.max) {
            (LeaseEnd::Freehold, LeaseEnd::Freehold) => true,
            (LeaseEnd::Freehold, LeaseEnd::Expires(_)) => false,
            (LeaseEnd::Expires(year), LeaseEnd::Freehold) => year >= self.min,
            (LeaseEnd::Expires(year), LeaseEnd::Expires(max)) => self.min <= year && year <= max,
        }
    }
}

impl Default for TenureRange {
    fn default() -> Self {
        TenureRange::unbounded()
    }
}

/// Bounds of the tenure slider for one dataset.
///
/// The slider is numeric, so freehold needs a number: one past the latest
/// real lease end observed in the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TenureBounds {
    pub min_year: i32,
    pub max_year: i32,
}

impl TenureBounds {
    /// Compute bounds from the lease ends of a dataset. Freehold entries are
    /// ignored; if there are no real lease ends at all, `fallback_year` is
    /// used for both ends.
    pub fn observe<I>(lease_ends: I, fallback_year: i32) -> TenureBounds
    where
        I: IntoIterator<Item = LeaseEnd>,
    {
        let mut bounds: Option<(i32, i32)> = None;
        for lease_end in lease_ends {
            if let LeaseEnd::Expires(year) = lease_end {
                bounds = Some(match bounds {
                    Some((lo, hi)) => (lo.min(year), hi.max(year)),
                    None => (year, year),
                });
            }
        }
        let (min_year, max_year) = bounds.unwrap_or((fallback_year, fallback_year));
        TenureBounds { min_year, max_year }
    }

    pub fn freehold_sentinel(&self) -> i32 {
        self.max_year + 1
    }

    /// Map a raw slider value onto a lease-end bound.
    pub fn bound_for(&self, slider_value: i32) -> LeaseEnd {
        if slider_value >= self.freehold_sentinel() {
            LeaseEnd::Freehold
        } else {
            LeaseEnd::Expires(slider_value)
        }
    }

    /// Slider position for a lease-end bound.
    pub fn slider_value(&self, bound: LeaseEnd) -> i32 {
        match bound {
            LeaseEnd::Expires(year) => year,
            LeaseEnd::Freehold => self.freehold_sentinel(),
        }
    }

    /// Build a range from two raw slider handle values.
    pub fn range_from_slider(&self, low: i32, high: i32) -> TenureRange {
        let (low, high) = if low <= high { (low, high) } else { (high, low) };
        TenureRange {
            min: low,
            max: self.bound_for(high),
        }
    }

    /// The slider's initial position: earliest lease end through freehold.
    pub fn full_range(&self) -> TenureRange {
        TenureRange {
            min: self.min_year,
            max: LeaseEnd::Freehold,
        }
    }

    /// Handle label for a slider value: "Freehold" on the sentinel, "Year N" otherwise.
    pub fn label(&self, slider_value: i32) -> String {
        match self.bound_for(slider_value) {
            LeaseEnd::Freehold => "Freehold".to_string(),
            LeaseEnd::Expires(year) => format!("Year {}", year),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_leasehold() {
        let tenure = Tenure::parse("99 yrs lease commencing from 2000").unwrap();
        assert_eq!(tenure.lease_start_year, Some(2000));
        assert_eq!(tenure.lease_end, LeaseEnd::Expires(2099));
    }

    #[test]
    fn test_parse_freehold() {
        let tenure = Tenure::parse("Freehold").unwrap();
        assert_eq!(tenure.lease_start_year, None);
        assert_eq!(tenure.lease_end, LeaseEnd::Freehold);

        let blank = Tenure::parse("").unwrap();
        assert_eq!(blank.lease_end, LeaseEnd::Freehold);
    }

    #[test]
    fn test_parse_extra_whitespace() {
        let tenure = Tenure::parse("999  yrs lease commencing from 1885").unwrap();
        assert_eq!(tenure.lease_end, LeaseEnd::Expires(2884));
    }

    #[test]
    fn test_parse_oversized_lease_is_rejected() {
        let raw = "99999999999 yrs lease commencing from 2000";
        assert_eq!(
            Tenure::parse(raw),
            Err(NormalizationError::Tenure {
                value: raw.to_string()
            })
        );
        // fits i32 on its own but overflows when added to the start year
        assert!(Tenure::parse("2147483000 yrs lease commencing from 2000").is_err());
    }

    #[test]
    fn test_freehold_sorts_last() {
        assert!(LeaseEnd::Freehold > LeaseEnd::Expires(i32::MAX));
        assert!(LeaseEnd::Expires(2050) < LeaseEnd::Expires(2060));
    }

    #[test]
    fn test_range_with_freehold_bound() {
        let range = TenureRange {
            min: 2050,
            max: LeaseEnd::Freehold,
        };
        assert!(range.contains(LeaseEnd::Expires(2050)));
        assert!(range.contains(LeaseEnd::Expires(2060)));
        assert!(range.contains(LeaseEnd::Freehold));
        assert!(!range.contains(LeaseEnd::Expires(2049)));
    }

    #[test]
    fn test_range_with_year_bound() {
        let range = TenureRange {
            min: 2050,
            max: LeaseEnd::Expires(2059),
        };
        assert!(range.contains(LeaseEnd::Expires(2050)));
        assert!(!range.contains(LeaseEnd::Expires(2060)));
        assert!(!range.contains(LeaseEnd::Freehold));
    }

    #[test]
    fn test_bounds_from_data() {
        let ends = vec![
            LeaseEnd::Expires(2060),
            LeaseEnd::Freehold,
            LeaseEnd::Expires(2050),
        ];
        let bounds = TenureBounds::observe(ends, 1900);
        assert_eq!(bounds.min_year, 2050);
        assert_eq!(bounds.max_year, 2060);
        assert_eq!(bounds.freehold_sentinel(), 2061);
        assert_eq!(bounds.bound_for(2061), LeaseEnd::Freehold);
        assert_eq!(bounds.bound_for(2060), LeaseEnd::Expires(2060));
        assert_eq!(bounds.slider_value(LeaseEnd::Freehold), 2061);
        assert_eq!(bounds.label(2061), "Freehold");
        assert_eq!(bounds.label(2055), "Year 2055");
    }

    #[test]
    fn test_bounds_all_freehold() {
        let bounds = TenureBounds::observe(vec![LeaseEnd::Freehold], 2019);
        assert_eq!(bounds.min_year, 2019);
        assert_eq!(bounds.freehold_sentinel(), 2020);
    }

    #[test]
    fn test_range_from_slider() {
        let bounds = TenureBounds::observe(vec![LeaseEnd::Expires(2050), LeaseEnd::Expires(2100)], 0);
        let range = bounds.range_from_slider(2101, 2060);
        assert_eq!(range.min, 2060);
        assert_eq!(range.max, LeaseEnd::Freehold);
        assert_eq!(bounds.full_range().min, 2050);
    }
}
