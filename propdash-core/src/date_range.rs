use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An inclusive sale-date interval, as produced by the timeline brush.
///
/// The start never comes after the end, however the interval was built.
#[derive(Clone, Eq, PartialEq, Copy, Debug, Serialize, Deserialize)]
#[serde(from = "(NaiveDate, NaiveDate)")]
pub struct DateInterval(NaiveDate, NaiveDate);

impl From<(NaiveDate, NaiveDate)> for DateInterval {
    fn from((a, b): (NaiveDate, NaiveDate)) -> Self {
        DateInterval::new(a, b)
    }
}

impl DateInterval {
    /// Build an interval from two brush edges in either order.
    pub fn new(a: NaiveDate, b: NaiveDate) -> Self {
        if a <= b {
            DateInterval(a, b)
        } else {
            DateInterval(b, a)
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.0
    }

    pub fn end(&self) -> NaiveDate {
        self.1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.0 <= date && date <= self.1
    }

    /// Smallest interval covering every date, or `None` for no dates.
    pub fn extent<I>(dates: I) -> Option<DateInterval>
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        dates.into_iter().fold(None, |acc, date| match acc {
            None => Some(DateInterval(date, date)),
            Some(DateInterval(lo, hi)) => Some(DateInterval(lo.min(date), hi.max(date))),
        })
    }
}
