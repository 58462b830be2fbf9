use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::model::{GmpStatus, MaterialRecord};

// ---------------------------------------------------------------------------
// Summary – the KPI block over a filtered view
// ---------------------------------------------------------------------------

/// Aggregate metrics over a filtered view. Means and ratios are `None` when
/// undefined (empty view, or no non-unknown GMP rows) — distinct from zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    pub count: usize,
    /// Number of distinct material names in the view.
    pub distinct_materials: usize,
    pub mean_price: Option<f64>,
    pub mean_deviation_pct: Option<f64>,
    /// GMP-compliant rows.
    pub compliant: usize,
    /// Rows whose GMP status is known (compliant or non-compliant).
    pub non_unknown: usize,
    /// compliant / non_unknown, `None` when no row has a known status.
    pub gmp_ratio: Option<f64>,
}

/// Compute the KPI summary for the view given by `indices` into `records`.
/// Deterministic and pure.
pub fn compute_summary(records: &[MaterialRecord], indices: &[usize]) -> Summary {
    let count = indices.len();
    if count == 0 {
        return Summary::default();
    }

    let mut price_sum = 0.0;
    let mut deviation_sum = 0.0;
    let mut compliant = 0;
    let mut non_unknown = 0;
    let mut names = std::collections::BTreeSet::new();

    for &i in indices {
        let rec = &records[i];
        price_sum += rec.price;
        deviation_sum += rec.price_deviation_pct;
        names.insert(rec.material_name.as_str());
        match rec.gmp {
            GmpStatus::Compliant => {
                compliant += 1;
                non_unknown += 1;
            }
            GmpStatus::NonCompliant => non_unknown += 1,
            GmpStatus::Unknown => {}
        }
    }

    Summary {
        count,
        distinct_materials: names.len(),
        mean_price: Some(price_sum / count as f64),
        mean_deviation_pct: Some(deviation_sum / count as f64),
        compliant,
        non_unknown,
        gmp_ratio: (non_unknown > 0).then(|| compliant as f64 / non_unknown as f64),
    }
}

// ---------------------------------------------------------------------------
// Grouped aggregations feeding the charts
// ---------------------------------------------------------------------------

/// Mean price per vendor over the view, sorted by mean price descending.
pub fn mean_price_by_vendor(records: &[MaterialRecord], indices: &[usize]) -> Vec<(String, f64)> {
    let mut sums: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for &i in indices {
        let rec = &records[i];
        let entry = sums.entry(rec.vendor_name.as_str()).or_insert((0.0, 0));
        entry.0 += rec.price;
        entry.1 += 1;
    }
    let mut out: Vec<(String, f64)> = sums
        .into_iter()
        .map(|(vendor, (sum, n))| (vendor.to_string(), sum / n as f64))
        .collect();
    out.sort_by(|a, b| b.1.total_cmp(&a.1));
    out
}

/// Percentage of GMP-compliant rows per vendor, in vendor order. Unlike the
/// headline ratio, unknown rows count against the vendor's denominator here:
/// an unverified material is not a compliant one.
pub fn gmp_pct_by_vendor(records: &[MaterialRecord], indices: &[usize]) -> Vec<(String, f64)> {
    let mut counts: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for &i in indices {
        let rec = &records[i];
        let entry = counts.entry(rec.vendor_name.as_str()).or_insert((0, 0));
        if rec.gmp == GmpStatus::Compliant {
            entry.0 += 1;
        }
        entry.1 += 1;
    }
    counts
        .into_iter()
        .map(|(vendor, (c, n))| (vendor.to_string(), c as f64 / n as f64 * 100.0))
        .collect()
}

/// Mean price and mean benchmark price per material name, ascending by name.
/// The benchmark mean only averages the rows that carry one; a material with
/// no benchmarked rows gets `None` rather than a fabricated zero.
pub fn price_vs_benchmark_by_material(
    records: &[MaterialRecord],
    indices: &[usize],
) -> Vec<(String, f64, Option<f64>)> {
    let mut sums: BTreeMap<&str, (f64, usize, f64, usize)> = BTreeMap::new();
    for &i in indices {
        let rec = &records[i];
        let entry = sums
            .entry(rec.material_name.as_str())
            .or_insert((0.0, 0, 0.0, 0));
        entry.0 += rec.price;
        entry.1 += 1;
        if let Some(benchmark) = rec.benchmark_price {
            entry.2 += benchmark;
            entry.3 += 1;
        }
    }
    sums.into_iter()
        .map(|(name, (price_sum, n, bench_sum, bench_n))| {
            (
                name.to_string(),
                price_sum / n as f64,
                (bench_n > 0).then(|| bench_sum / bench_n as f64),
            )
        })
        .collect()
}

/// Record count per supplier portal, sorted by count descending.
pub fn count_by_portal(records: &[MaterialRecord], indices: &[usize]) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for &i in indices {
        *counts.entry(records[i].portal.as_str()).or_default() += 1;
    }
    let mut out: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(portal, n)| (portal.to_string(), n))
        .collect();
    out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    out
}

/// Mean price and record count per quote date, ascending by date. Rows
/// without a timestamp are skipped.
pub fn price_over_time(
    records: &[MaterialRecord],
    indices: &[usize],
) -> Vec<(NaiveDate, f64, usize)> {
    let mut per_day: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
    for &i in indices {
        let rec = &records[i];
        if let Some(date) = rec.timestamp {
            let entry = per_day.entry(date).or_insert((0.0, 0));
            entry.0 += rec.price;
            entry.1 += 1;
        }
    }
    per_day
        .into_iter()
        .map(|(date, (sum, n))| (date, sum / n as f64, n))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Currency;

    fn rec(name: &str, vendor: &str, price: f64, dev: f64, gmp: GmpStatus) -> MaterialRecord {
        MaterialRecord {
            material_id: format!("MAT-{name}"),
            material_name: name.to_string(),
            material_type: "API".into(),
            vendor_name: vendor.to_string(),
            portal: "SAP Ariba".into(),
            price,
            benchmark_price: None,
            currency: Currency::Usd,
            price_deviation_pct: dev,
            gmp,
            price_tier: "Medium".into(),
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 1),
        }
    }

    #[test]
    fn empty_view_has_undefined_means() {
        let summary = compute_summary(&[], &[]);
        assert_eq!(summary.count, 0);
        assert_eq!(summary.mean_price, None);
        assert_eq!(summary.mean_deviation_pct, None);
        assert_eq!(summary.gmp_ratio, None);
    }

    #[test]
    fn means_and_ratio_over_a_small_view() {
        let records = vec![
            rec("Ethanol", "A", 10.0, 2.0, GmpStatus::Compliant),
            rec("Ethanol", "B", 20.0, 4.0, GmpStatus::NonCompliant),
            rec("Lactose", "A", 30.0, 6.0, GmpStatus::Unknown),
        ];
        let summary = compute_summary(&records, &[0, 1, 2]);
        assert_eq!(summary.count, 3);
        assert_eq!(summary.distinct_materials, 2);
        assert_eq!(summary.mean_price, Some(20.0));
        assert_eq!(summary.mean_deviation_pct, Some(4.0));
        assert_eq!(summary.compliant, 1);
        assert_eq!(summary.non_unknown, 2);
        assert_eq!(summary.gmp_ratio, Some(0.5));
    }

    #[test]
    fn all_unknown_gmp_leaves_ratio_undefined() {
        let records = vec![rec("Ethanol", "A", 10.0, 0.0, GmpStatus::Unknown)];
        let summary = compute_summary(&records, &[0]);
        assert_eq!(summary.count, 1);
        assert_eq!(summary.gmp_ratio, None);
    }

    #[test]
    fn vendor_means_sort_descending() {
        let records = vec![
            rec("a", "Cheap Co", 5.0, 0.0, GmpStatus::Unknown),
            rec("b", "Dear Co", 50.0, 0.0, GmpStatus::Unknown),
            rec("c", "Cheap Co", 15.0, 0.0, GmpStatus::Unknown),
        ];
        let means = mean_price_by_vendor(&records, &[0, 1, 2]);
        assert_eq!(
            means,
            vec![("Dear Co".to_string(), 50.0), ("Cheap Co".to_string(), 10.0)]
        );
    }

    #[test]
    fn benchmark_means_skip_rows_without_one() {
        let mut records = vec![
            rec("Ethanol", "A", 10.0, 0.0, GmpStatus::Unknown),
            rec("Ethanol", "B", 20.0, 0.0, GmpStatus::Unknown),
            rec("Lactose", "A", 6.0, 0.0, GmpStatus::Unknown),
        ];
        records[0].benchmark_price = Some(12.0);
        let data = price_vs_benchmark_by_material(&records, &[0, 1, 2]);
        assert_eq!(
            data,
            vec![
                ("Ethanol".to_string(), 15.0, Some(12.0)),
                ("Lactose".to_string(), 6.0, None),
            ]
        );
    }

    #[test]
    fn summary_respects_the_index_view() {
        let records = vec![
            rec("a", "A", 10.0, 0.0, GmpStatus::Compliant),
            rec("b", "B", 100.0, 0.0, GmpStatus::NonCompliant),
        ];
        let summary = compute_summary(&records, &[0]);
        assert_eq!(summary.count, 1);
        assert_eq!(summary.mean_price, Some(10.0));
        assert_eq!(summary.gmp_ratio, Some(1.0));
    }

    #[test]
    fn time_series_groups_by_day() {
        let mut records = vec![
            rec("a", "A", 10.0, 0.0, GmpStatus::Unknown),
            rec("b", "B", 30.0, 0.0, GmpStatus::Unknown),
            rec("c", "C", 7.0, 0.0, GmpStatus::Unknown),
        ];
        records[2].timestamp = NaiveDate::from_ymd_opt(2024, 1, 2);
        let series = price_over_time(&records, &[0, 1, 2]);
        assert_eq!(
            series,
            vec![
                (NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 20.0, 2),
                (NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(), 7.0, 1),
            ]
        );
    }
}
