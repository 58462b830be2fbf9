use std::collections::HashMap;

use super::filter::{apply_filters, ConfigError, FilterConfig};
use super::model::MaterialDataset;
use super::summary::{compute_summary, Summary};

// ---------------------------------------------------------------------------
// QueryCache – memoised filter-and-summarise queries
// ---------------------------------------------------------------------------

/// Result of one filter query: the view indices plus its KPI summary.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub indices: Vec<usize>,
    pub summary: Summary,
}

/// Memoises query results keyed by the filter configuration itself, scoped to
/// one dataset version. Keying by the full config (not a digest of it) means
/// two distinct configs can never share an entry. A version change
/// invalidates the whole cache; the data is read-only in between, so entries
/// never go stale.
#[derive(Debug, Default)]
pub struct QueryCache {
    version: u64,
    entries: HashMap<FilterConfig, QueryResult>,
}

impl QueryCache {
    /// Answer a filter query, recomputing only on a cache miss. A malformed
    /// configuration is never cached.
    pub fn query(
        &mut self,
        dataset: &MaterialDataset,
        filters: &FilterConfig,
    ) -> Result<&QueryResult, ConfigError> {
        if self.version != dataset.version {
            self.entries.clear();
            self.version = dataset.version;
        }

        if !self.entries.contains_key(filters) {
            let indices = apply_filters(&dataset.records, filters)?;
            let summary = compute_summary(&dataset.records, &indices);
            self.entries
                .insert(filters.clone(), QueryResult { indices, summary });
        }
        Ok(&self.entries[filters])
    }

    /// Number of memoised queries (for the current dataset version).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Currency, GmpStatus, MaterialRecord};
    use chrono::NaiveDate;

    fn dataset(version: u64, n: usize) -> MaterialDataset {
        let records = (0..n)
            .map(|i| MaterialRecord {
                material_id: format!("MAT-{i}"),
                material_name: format!("Material {i}"),
                material_type: "Excipient".into(),
                vendor_name: format!("Vendor {}", i % 2),
                portal: "SAP Ariba".into(),
                price: i as f64,
                benchmark_price: None,
                currency: Currency::Eur,
                price_deviation_pct: 0.0,
                gmp: GmpStatus::Compliant,
                price_tier: "Low".into(),
                timestamp: NaiveDate::from_ymd_opt(2024, 1, 1),
            })
            .collect();
        let mut ds = MaterialDataset::from_parts(records, Vec::new());
        ds.version = version;
        ds
    }

    #[test]
    fn repeated_query_hits_the_cache() {
        let ds = dataset(1, 6);
        let mut cache = QueryCache::default();
        let filters = FilterConfig {
            vendor_names: Some(["Vendor 0".to_string()].into()),
            ..Default::default()
        };

        let first = cache.query(&ds, &filters).unwrap().clone();
        assert_eq!(first.indices, vec![0, 2, 4]);
        assert_eq!(cache.len(), 1);

        let second = cache.query(&ds, &filters).unwrap().clone();
        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn distinct_configs_get_distinct_entries() {
        let ds = dataset(1, 4);
        let mut cache = QueryCache::default();
        cache.query(&ds, &FilterConfig::default()).unwrap();
        let filters = FilterConfig {
            gmp: Some(GmpStatus::NonCompliant),
            ..Default::default()
        };
        cache.query(&ds, &filters).unwrap();
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn entries_are_keyed_by_the_config_value() {
        // Interleaved queries must each come back with their own view; an
        // entry is only ever returned for an equal config.
        let ds = dataset(1, 6);
        let mut cache = QueryCache::default();

        let by_vendor = FilterConfig {
            vendor_names: Some(["Vendor 1".to_string()].into()),
            ..Default::default()
        };
        let by_gmp = FilterConfig {
            gmp: Some(GmpStatus::NonCompliant),
            ..Default::default()
        };

        let vendor_view = cache.query(&ds, &by_vendor).unwrap().indices.clone();
        let gmp_view = cache.query(&ds, &by_gmp).unwrap().indices.clone();
        assert_eq!(vendor_view, vec![1, 3, 5]);
        assert_eq!(gmp_view, Vec::<usize>::new());

        let again = cache.query(&ds, &by_vendor).unwrap().indices.clone();
        assert_eq!(again, vendor_view);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn version_bump_invalidates_wholesale() {
        let mut cache = QueryCache::default();
        let filters = FilterConfig::default();

        let old = dataset(1, 3);
        cache.query(&old, &filters).unwrap();
        assert_eq!(cache.len(), 1);

        let new = dataset(2, 5);
        let result = cache.query(&new, &filters).unwrap();
        assert_eq!(result.indices.len(), 5);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn malformed_config_is_not_cached() {
        let ds = dataset(1, 3);
        let mut cache = QueryCache::default();
        let bad = FilterConfig {
            date_from: NaiveDate::from_ymd_opt(2024, 2, 1),
            date_to: NaiveDate::from_ymd_opt(2024, 1, 1),
            ..Default::default()
        };
        assert!(cache.query(&ds, &bad).is_err());
        assert!(cache.is_empty());
    }
}
