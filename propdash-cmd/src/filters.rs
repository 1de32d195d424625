//! Filter flags shared by every command.

use clap::Args;
use propdash_core::date_range::DateInterval;
use propdash_core::filter::{FilterUpdate, Selection};
use propdash_core::tenure::{LeaseEnd, TenureBounds, TenureRange};
use propdash_utils::dates::parse_date;

#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Only this project ("all" for every project)
    #[arg(long)]
    pub property: Option<String>,

    /// Only this postal district ("all" for every district)
    #[arg(long)]
    pub district: Option<String>,

    /// Earliest lease-end year; defaults to the earliest in the data
    #[arg(long)]
    pub tenure_min: Option<i32>,

    /// Latest lease-end year, or "freehold" to include freehold properties
    #[arg(long)]
    pub tenure_max: Option<String>,

    /// Start of the sale-date window (YYYY-MM-DD); requires --to
    #[arg(long)]
    pub from: Option<String>,

    /// End of the sale-date window (YYYY-MM-DD); requires --from
    #[arg(long)]
    pub to: Option<String>,
}

fn parse_tenure_max(value: &str, bounds: &TenureBounds) -> anyhow::Result<LeaseEnd> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("freehold") {
        return Ok(LeaseEnd::Freehold);
    }
    let year: i32 = value
        .parse()
        .map_err(|_| anyhow::anyhow!("--tenure-max must be a year or \"freehold\", got {:?}", value))?;
    Ok(bounds.bound_for(year))
}

impl FilterArgs {
    /// Translate the flags into one partial update. Flags that were not given
    /// leave the matching filter untouched.
    pub fn to_update(&self, bounds: &TenureBounds) -> anyhow::Result<FilterUpdate> {
        let tenure_year_range = if self.tenure_min.is_some() || self.tenure_max.is_some() {
            let max = match &self.tenure_max {
                Some(value) => parse_tenure_max(value, bounds)?,
                None => LeaseEnd::Freehold,
            };
            Some(TenureRange {
                min: self.tenure_min.unwrap_or(bounds.min_year),
                max,
            })
        } else {
            None
        };

        let date_range = match (&self.from, &self.to) {
            (Some(from), Some(to)) => Some(Some(DateInterval::new(parse_date(from)?, parse_date(to)?))),
            (None, None) => None,
            _ => anyhow::bail!("--from and --to must be given together"),
        };

        Ok(FilterUpdate {
            property_name: self.property.as_deref().map(Selection::from_choice),
            postal_district: self.district.as_deref().map(Selection::from_choice),
            tenure_year_range,
            date_range,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bounds() -> TenureBounds {
        TenureBounds {
            min_year: 2050,
            max_year: 2100,
        }
    }

    #[test]
    fn test_no_flags_is_empty_update() {
        let update = FilterArgs::default().to_update(&bounds()).unwrap();
        assert!(update.is_empty());
    }

    #[test]
    fn test_selections() {
        let args = FilterArgs {
            property: Some("ALPHA TOWER".to_string()),
            district: Some("all".to_string()),
            ..Default::default()
        };
        let update = args.to_update(&bounds()).unwrap();
        assert_eq!(update.property_name, Some(Selection::Only("ALPHA TOWER".to_string())));
        assert_eq!(update.postal_district, Some(Selection::All));
    }

    #[test]
    fn test_tenure_flags() {
        let args = FilterArgs {
            tenure_max: Some("2080".to_string()),
            ..Default::default()
        };
        let range = args.to_update(&bounds()).unwrap().tenure_year_range.unwrap();
        assert_eq!(range.min, 2050);
        assert_eq!(range.max, LeaseEnd::Expires(2080));

        let args = FilterArgs {
            tenure_min: Some(2070),
            tenure_max: Some("Freehold".to_string()),
            ..Default::default()
        };
        let range = args.to_update(&bounds()).unwrap().tenure_year_range.unwrap();
        assert_eq!(range.min, 2070);
        assert_eq!(range.max, LeaseEnd::Freehold);

        // the slider sentinel also means freehold
        let args = FilterArgs {
            tenure_max: Some("2101".to_string()),
            ..Default::default()
        };
        let range = args.to_update(&bounds()).unwrap().tenure_year_range.unwrap();
        assert_eq!(range.max, LeaseEnd::Freehold);

        let args = FilterArgs {
            tenure_max: Some("forever".to_string()),
            ..Default::default()
        };
        assert!(args.to_update(&bounds()).is_err());
    }

    #[test]
    fn test_date_window() {
        let args = FilterArgs {
            from: Some("2024-03-01".to_string()),
            to: Some("2024-01-01".to_string()),
            ..Default::default()
        };
        let interval = args.to_update(&bounds()).unwrap().date_range.unwrap().unwrap();
        assert_eq!(interval.start(), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());

        let half = FilterArgs {
            from: Some("2024-03-01".to_string()),
            ..Default::default()
        };
        assert!(half.to_update(&bounds()).is_err());
    }
}
