//! The user-selected constraints that narrow the canonical dataset.
//!
//! `FilterState` only ever reads records. Applying it yields a fresh vector of
//! references into the canonical dataset, so no filter pass can write back
//! into shared records.

use crate::date_range::DateInterval;
use crate::record::CanonicalRecord;
use crate::tenure::TenureRange;
use serde::{Deserialize, Serialize};

/// Dropdown choice: everything, or exactly one value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Selection {
    #[default]
    All,
    Only(String),
}

impl Selection {
    /// Interpret a dropdown value, where "all" (any case) or an empty value
    /// means no constraint.
    pub fn from_choice(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            Selection::All
        } else {
            Selection::Only(trimmed.to_string())
        }
    }

    pub fn matches(&self, value: &str) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(wanted) => wanted == value,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FilterState {
    pub property_name: Selection,
    pub postal_district: Selection,
    pub tenure_year_range: TenureRange,
    /// Brushed sale-date interval; `None` when nothing is brushed.
    pub date_range: Option<DateInterval>,
}

/// A partial change coming from one control. Unset fields keep their value.
///
/// `date_range` is doubly optional: `Some(None)` clears the brush.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterUpdate {
    pub property_name: Option<Selection>,
    pub postal_district: Option<Selection>,
    pub tenure_year_range: Option<TenureRange>,
    pub date_range: Option<Option<DateInterval>>,
}

impl FilterUpdate {
    pub fn property(selection: Selection) -> Self {
        FilterUpdate {
            property_name: Some(selection),
            ..Default::default()
        }
    }

    pub fn district(selection: Selection) -> Self {
        FilterUpdate {
            postal_district: Some(selection),
            ..Default::default()
        }
    }

    pub fn tenure(range: TenureRange) -> Self {
        FilterUpdate {
            tenure_year_range: Some(range),
            ..Default::default()
        }
    }

    pub fn brush(interval: Option<DateInterval>) -> Self {
        FilterUpdate {
            date_range: Some(interval),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.property_name.is_none()
            && self.postal_district.is_none()
            && self.tenure_year_range.is_none()
            && self.date_range.is_none()
    }
}

impl FilterState {
    /// Initial state for a dataset: no selections, the given tenure range, no brush.
    pub fn with_tenure(tenure_year_range: TenureRange) -> Self {
        FilterState {
            tenure_year_range,
            ..Default::default()
        }
    }

    /// Fold a partial update into this state.
    pub fn merge(&mut self, update: FilterUpdate) {
        if let Some(property_name) = update.property_name {
            self.property_name = property_name;
        }
        if let Some(postal_district) = update.postal_district {
            self.postal_district = postal_district;
        }
        if let Some(range) = update.tenure_year_range {
            self.tenure_year_range = range;
        }
        if let Some(date_range) = update.date_range {
            self.date_range = date_range;
        }
    }

    /// All four predicates, ANDed.
    pub fn matches(&self, record: &CanonicalRecord) -> bool {
        self.property_name.matches(&record.project_name)
            && self.postal_district.matches(&record.postal_district)
            && self.tenure_year_range.contains(record.lease_end)
            && self
                .date_range
                .map_or(true, |interval| interval.contains(record.sale_date))
    }

    pub fn apply<'a>(&self, records: &'a [CanonicalRecord]) -> Vec<&'a CanonicalRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tenure::LeaseEnd;
    use chrono::NaiveDate;

    fn record(project: &str, district: &str, lease_end: LeaseEnd, month: u32) -> CanonicalRecord {
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
            unit_price_psm: 10764.0,
            sale_date: NaiveDate::from_ymd_opt(2024, month, 1).unwrap(),
            tenure_raw: String::new(),
            lease_start_year: None,
            lease_end,
        }
    }

    fn sample() -> Vec<CanonicalRecord> {
        vec![
            record("A", "1", LeaseEnd::Expires(2050), 1),
            record("B", "1", LeaseEnd::Expires(2060), 2),
            record("A", "2", LeaseEnd::Freehold, 3),
            record("C", "9", LeaseEnd::Expires(2100), 4),
        ]
    }

    #[test]
    fn test_default_state_is_identity() {
        let records = sample();
        let filtered = FilterState::default().apply(&records);
        assert_eq!(filtered.len(), records.len());
        for (kept, original) in filtered.iter().zip(records.iter()) {
            assert_eq!(*kept, original);
        }
    }

    #[test]
    fn test_each_narrowing_shrinks() {
        let records = sample();
        let updates = vec![
            FilterUpdate::property(Selection::Only("A".to_string())),
            FilterUpdate::district(Selection::Only("1".to_string())),
            FilterUpdate::tenure(TenureRange {
                min: 2055,
                max: LeaseEnd::Expires(2100),
            }),
            FilterUpdate::brush(Some(DateInterval::new(
                NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            ))),
        ];
        for update in updates {
            let mut state = FilterState::default();
            state.merge(update);
            let filtered = state.apply(&records);
            assert!(filtered.len() < records.len());
        }
    }

    #[test]
    fn test_property_and_district_compose() {
        let records = sample();
        let mut state = FilterState::default();
        state.merge(FilterUpdate::property(Selection::Only("A".to_string())));
        assert_eq!(state.apply(&records).len(), 2);
        state.merge(FilterUpdate::district(Selection::Only("2".to_string())));
        let filtered = state.apply(&records);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].lease_end, LeaseEnd::Freehold);
    }

    #[test]
    fn test_freehold_inclusion() {
        let records = vec![
            record("A", "1", LeaseEnd::Expires(2050), 1),
            record("B", "1", LeaseEnd::Expires(2060), 1),
            record("C", "1", LeaseEnd::Freehold, 1),
        ];
        let mut state = FilterState::default();
        state.merge(FilterUpdate::tenure(TenureRange {
            min: 2050,
            max: LeaseEnd::Freehold,
        }));
        assert_eq!(state.apply(&records).len(), 3);

        state.merge(FilterUpdate::tenure(TenureRange {
            min: 2050,
            max: LeaseEnd::Expires(2059),
        }));
        let filtered = state.apply(&records);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].lease_end, LeaseEnd::Expires(2050));
    }

    #[test]
    fn test_brush_set_and_cleared() {
        let records = sample();
        let mut state = FilterState::default();
        state.merge(FilterUpdate::brush(Some(DateInterval::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        ))));
        assert_eq!(state.apply(&records).len(), 2);

        // An update that does not touch the brush keeps it
        state.merge(FilterUpdate::property(Selection::All));
        assert_eq!(state.apply(&records).len(), 2);

        state.merge(FilterUpdate::brush(None));
        assert_eq!(state.apply(&records).len(), 4);
    }

    #[test]
    fn test_apply_leaves_input_untouched() {
        let records = sample();
        let snapshot = records.clone();
        let mut state = FilterState::default();
        state.merge(FilterUpdate::property(Selection::Only("nope".to_string())));
        assert!(state.apply(&records).is_empty());
        assert_eq!(records, snapshot);
    }

    #[test]
    fn test_selection_from_choice() {
        assert_eq!(Selection::from_choice("all"), Selection::All);
        assert_eq!(Selection::from_choice("All"), Selection::All);
        assert_eq!(Selection::from_choice(""), Selection::All);
        assert_eq!(
            Selection::from_choice(" 10 "),
            Selection::Only("10".to_string())
        );
    }
}
