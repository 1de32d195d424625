//! Aggregation over filtered transaction records.
//!
//! Every reducer here is a pure function of an already-filtered slice. The
//! reducers are generic over the element type so they work equally on
//! `&[CanonicalRecord]` and on the `Vec<&CanonicalRecord>` a filter pass
//! produces.

/// Group-by reducers producing [`aggregate::AggregateRow`]s for bars and donuts.
pub mod aggregate {
    use serde::Serialize;
    use std::cmp::Ordering;
    use std::collections::HashMap;
    use std::hash::Hash;

    /// One grouped summary, the unit of data bar and donut charts consume.
    #[derive(Debug, Clone, Serialize, PartialEq)]
    pub struct AggregateRow {
        pub key: String,
        pub count: usize,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub mean: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub sum: Option<f64>,
    }

    /// Group records by key, keeping keys in order of first occurrence.
    pub fn group_in_order<'a, T, K, F>(records: &'a [T], key_fn: F) -> Vec<(K, Vec<&'a T>)>
    where
        K: Eq + Hash + Clone,
        F: Fn(&T) -> K,
    {
        let mut index: HashMap<K, usize> = HashMap::new();
        let mut groups: Vec<(K, Vec<&'a T>)> = Vec::new();
        for record in records {
            let key = key_fn(record);
            match index.get(&key) {
                Some(&i) => groups[i].1.push(record),
                None => {
                    index.insert(key.clone(), groups.len());
                    groups.push((key, vec![record]));
                }
            }
        }
        groups
    }

    /// Count records per key. Counts always sum to `records.len()`.
    pub fn count_by<T, K, F>(records: &[T], key_fn: F) -> Vec<AggregateRow>
    where
        K: Eq + Hash + Clone + ToString,
        F: Fn(&T) -> K,
    {
        group_in_order(records, key_fn)
            .into_iter()
            .map(|(key, members)| AggregateRow {
                key: key.to_string(),
                count: members.len(),
                mean: None,
                sum: None,
            })
            .collect()
    }

    /// Arithmetic mean of `value_fn` per key.
    ///
    /// Keys come from the records themselves, so every group has at least
    /// one member and `mean` is always `Some`.
    pub fn mean_by<T, K, F, V>(records: &[T], group_key_fn: F, value_fn: V) -> Vec<AggregateRow>
    where
        K: Eq + Hash + Clone + ToString,
        F: Fn(&T) -> K,
        V: Fn(&T) -> f64,
    {
        group_in_order(records, group_key_fn)
            .into_iter()
            .map(|(key, members)| {
                let sum: f64 = members.iter().map(|r| value_fn(*r)).sum();
                AggregateRow {
                    key: key.to_string(),
                    count: members.len(),
                    mean: Some(sum / members.len() as f64),
                    sum: Some(sum),
                }
            })
            .collect()
    }

    /// Mean over the whole slice; `None` for an empty slice.
    pub fn overall_mean<T, V>(records: &[T], value_fn: V) -> Option<f64>
    where
        V: Fn(&T) -> f64,
    {
        if records.is_empty() {
            return None;
        }
        let sum: f64 = records.iter().map(value_fn).sum();
        Some(sum / records.len() as f64)
    }

    fn row_value(row: &AggregateRow) -> f64 {
        row.mean.unwrap_or(row.count as f64)
    }

    /// Sort rows by mean (or count, for count rows), largest first. Stable, so
    /// equal values keep their first-occurrence order.
    pub fn sort_descending(rows: &mut [AggregateRow]) {
        rows.sort_by(|a, b| {
            row_value(b)
                .partial_cmp(&row_value(a))
                .unwrap_or(Ordering::Equal)
        });
    }

}

/// Equal-width binning for histograms.
pub mod binning {
    use serde::{Deserialize, Serialize};

    /// Number of bins when none is configured.
    pub const DEFAULT_BIN_COUNT: usize = 10;

    /// How to cut the value axis.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub enum Binning {
        /// `count` equal-width bins over `domain`, or over the data's own
        /// min/max when no domain is given.
        Uniform {
            count: usize,
            domain: Option<(f64, f64)>,
        },
        /// Explicit bin edges; n edges make n - 1 bins.
        Thresholds(Vec<f64>),
    }

    impl Default for Binning {
        fn default() -> Self {
            Binning::Uniform {
                count: DEFAULT_BIN_COUNT,
                domain: None,
            }
        }
    }

    /// One histogram bar: the half-open interval `[x0, x1)` (the last bin
    /// also includes `x1`) and the mean of the aggregated value inside it.
    #[derive(Debug, Clone, Serialize, PartialEq)]
    pub struct BinnedRow {
        pub x0: f64,
        pub x1: f64,
        pub count: usize,
        /// `None` for an empty bin.
        pub value: Option<f64>,
    }

    impl Binning {
        fn edges(&self, values: &[f64]) -> Vec<f64> {
            match self {
                Binning::Uniform { count, domain } => {
                    let count = (*count).max(1);
                    let (lo, hi) = domain
                        .or_else(|| value_domain(values.iter().copied()))
                        .unwrap_or((0.0, 0.0));
                    let width = (hi - lo) / count as f64;
                    let mut edges: Vec<f64> = (0..count).map(|i| lo + width * i as f64).collect();
                    edges.push(hi);
                    edges
                }
                Binning::Thresholds(thresholds) => {
                    let mut edges: Vec<f64> =
                        thresholds.iter().copied().filter(|e| e.is_finite()).collect();
                    edges.sort_by(|a, b| a.total_cmp(b));
                    edges.dedup();
                    edges
                }
            }
        }
    }

    /// Min and max of the finite values, or `None` when there are none.
    pub fn value_domain<I>(values: I) -> Option<(f64, f64)>
    where
        I: IntoIterator<Item = f64>,
    {
        values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Bin records by `value_fn` and average `aggregate_fn` within each bin.
    ///
    /// Every bin is reported, empty or not. Records whose binned value falls
    /// outside the edges are left out.
    pub fn binned_mean<T, V, A>(
        records: &[T],
        value_fn: V,
        binning: &Binning,
        aggregate_fn: A,
    ) -> Vec<BinnedRow>
    where
        V: Fn(&T) -> f64,
        A: Fn(&T) -> f64,
    {
        let values: Vec<f64> = records.iter().map(&value_fn).collect();
        let edges = binning.edges(&values);
        if edges.len() < 2 {
            return Vec::new();
        }
        let bins = edges.len() - 1;
        let mut sums = vec![0.0_f64; bins];
        let mut counts = vec![0usize; bins];

        for (record, value) in records.iter().zip(values.iter()) {
            if !value.is_finite() || *value < edges[0] || *value > edges[bins] {
                continue;
            }
            let idx = edges
                .partition_point(|edge| *edge <= *value)
                .saturating_sub(1)
                .min(bins - 1);
            sums[idx] += aggregate_fn(record);
            counts[idx] += 1;
        }

        (0..bins)
            .map(|i| BinnedRow {
                x0: edges[i],
                x1: edges[i + 1],
                count: counts[i],
                value: if counts[i] == 0 {
                    None
                } else {
                    Some(sums[i] / counts[i] as f64)
                },
            })
            .collect()
    }

}

/// Per-date series for the timeline.
pub mod timeline {
    use chrono::NaiveDate;
    use serde::Serialize;
    use std::collections::BTreeMap;

    #[derive(Debug, Clone, Serialize, PartialEq)]
    pub struct TimePoint {
        pub date: NaiveDate,
        pub value: f64,
        pub count: usize,
    }

    /// Mean of `value_fn` per exact date, in ascending date order.
    pub fn time_bucketed_mean<T, D, V>(records: &[T], date_fn: D, value_fn: V) -> Vec<TimePoint>
    where
        D: Fn(&T) -> NaiveDate,
        V: Fn(&T) -> f64,
    {
        let mut buckets: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
        for record in records {
            let entry = buckets.entry(date_fn(record)).or_insert((0.0, 0));
            entry.0 += value_fn(record);
            entry.1 += 1;
        }
        buckets
            .into_iter()
            .map(|(date, (sum, count))| TimePoint {
                date,
                value: sum / count as f64,
                count,
            })
            .collect()
    }

}

/// Headline figures shown above the charts.
pub mod kpi {
    use crate::aggregate::mean_by;
    use chrono::Datelike;
    use propdash_core::record::CanonicalRecord;
    use propdash_utils::numbers::format_revenue;
    use serde::Serialize;
    use std::borrow::Borrow;
    use std::collections::HashSet;

    #[derive(Debug, Clone, Serialize, PartialEq)]
    pub struct DistrictStat {
        pub district: String,
        pub mean_price: f64,
    }

    #[derive(Debug, Clone, Serialize, PartialEq)]
    pub struct KpiSummary {
        pub record_count: usize,
        /// Distinct project names.
        pub total_properties: usize,
        /// Sum of transacted prices.
        pub total_revenue: f64,
        pub revenue_display: String,
        /// Change in mean $ PSM from the earliest sale year to the latest, in percent.
        pub price_change_pct: Option<f64>,
        /// District with the highest mean transacted price.
        pub hottest_district: Option<DistrictStat>,
    }

    fn mean_psm_in_year(records: &[&CanonicalRecord], year: i32) -> Option<f64> {
        let (sum, count) = records
            .iter()
            .filter(|r| r.sale_date.year() == year)
            .fold((0.0, 0usize), |(sum, count), r| (sum + r.unit_price_psm, count + 1));
        if count == 0 {
            None
        } else {
            Some(sum / count as f64)
        }
    }

    pub fn summarize<R: Borrow<CanonicalRecord>>(records: &[R]) -> KpiSummary {
        let records: Vec<&CanonicalRecord> = records
            .iter()
            .map(|r| Borrow::<CanonicalRecord>::borrow(r))
            .collect();

        let total_properties = records
            .iter()
            .map(|r| r.project_name.as_str())
            .collect::<HashSet<_>>()
            .len();
        let total_revenue: f64 = records.iter().map(|r| r.transacted_price).sum();

        let earliest = records.iter().map(|r| r.sale_date.year()).min();
        let latest = records.iter().map(|r| r.sale_date.year()).max();
        let price_change_pct = match (earliest, latest) {
            (Some(first), Some(last)) => {
                match (mean_psm_in_year(&records, first), mean_psm_in_year(&records, last)) {
                    (Some(initial), Some(current)) if initial != 0.0 => {
                        Some((current - initial) / initial * 100.0)
                    }
                    _ => None,
                }
            }
            _ => None,
        };

        let mut hottest_district: Option<DistrictStat> = None;
        for row in mean_by(&records, |r| r.postal_district.clone(), |r| r.transacted_price) {
            let mean_price = row.mean.unwrap_or_default();
            let hotter = hottest_district
                .as_ref()
                .map_or(true, |best| mean_price > best.mean_price);
            if hotter {
                hottest_district = Some(DistrictStat {
                    district: row.key,
                    mean_price,
                });
            }
        }

        log::debug!(
            "kpi: {} records across {} projects, hottest district {:?}",
            records.len(),
            total_properties,
            hottest_district.as_ref().map(|d| d.district.as_str())
        );

        KpiSummary {
            record_count: records.len(),
            total_properties,
            total_revenue,
            revenue_display: format_revenue(total_revenue),
            price_change_pct,
            hottest_district,
        }
    }

}
