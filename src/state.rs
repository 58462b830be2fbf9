use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::color::ColorMap;
use crate::data::cache::QueryCache;
use crate::data::filter::FilterConfig;
use crate::data::model::{CategoryColumn, GmpStatus, MaterialDataset};
use crate::data::summary::Summary;

// ---------------------------------------------------------------------------
// Chart selection
// ---------------------------------------------------------------------------

/// Which chart the central panel draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    PriceVsDeviation,
    PriceVsBenchmark,
    MeanPriceByVendor,
    GmpByVendor,
    CountByPortal,
    PriceOverTime,
    DataTable,
}

impl ChartKind {
    pub const ALL: [ChartKind; 7] = [
        ChartKind::PriceVsDeviation,
        ChartKind::PriceVsBenchmark,
        ChartKind::MeanPriceByVendor,
        ChartKind::GmpByVendor,
        ChartKind::CountByPortal,
        ChartKind::PriceOverTime,
        ChartKind::DataTable,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ChartKind::PriceVsDeviation => "Price vs Deviation",
            ChartKind::PriceVsBenchmark => "Price vs Benchmark",
            ChartKind::MeanPriceByVendor => "Avg Price by Vendor",
            ChartKind::GmpByVendor => "GMP % by Vendor",
            ChartKind::CountByPortal => "Records by Portal",
            ChartKind::PriceOverTime => "Price over Time",
            ChartKind::DataTable => "Detailed Data",
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded dataset (None until the user opens a file).
    pub dataset: Option<MaterialDataset>,

    /// Active filter configuration.
    pub filters: FilterConfig,

    /// Memoised query results for the current dataset version.
    pub cache: QueryCache,

    /// Indices of records passing the current filters (cached view).
    pub visible_indices: Vec<usize>,

    /// KPI summary over the current view.
    pub summary: Summary,

    /// Which categorical column drives chart colours.
    pub color_column: CategoryColumn,

    /// Active colour map for `color_column`.
    pub color_map: Option<ColorMap>,

    /// Selected chart in the central panel.
    pub chart: ChartKind,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Whether a file loading operation is in progress.
    pub loading: bool,

    /// Monotonic dataset version counter.
    dataset_epoch: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            dataset: None,
            filters: FilterConfig::default(),
            cache: QueryCache::default(),
            visible_indices: Vec::new(),
            summary: Summary::default(),
            color_column: CategoryColumn::MaterialType,
            color_map: None,
            chart: ChartKind::PriceVsDeviation,
            status_message: None,
            loading: false,
            dataset_epoch: 0,
        }
    }
}

impl AppState {
    /// Install a freshly loaded dataset: bump the version tag, reset filters,
    /// rebuild colours and recompute the view.
    pub fn set_dataset(&mut self, mut dataset: MaterialDataset) {
        self.dataset_epoch += 1;
        dataset.version = self.dataset_epoch;

        self.filters = FilterConfig::default();
        self.dataset = Some(dataset);
        self.rebuild_color_map();
        self.status_message = None;
        self.loading = false;
        self.refilter();
    }

    /// Recompute the visible view and summary through the query cache.
    /// A malformed configuration keeps the previous view and surfaces the
    /// error in the status line.
    pub fn refilter(&mut self) {
        let Some(ds) = &self.dataset else {
            return;
        };
        match self.cache.query(ds, &self.filters) {
            Ok(result) => {
                self.visible_indices = result.indices.clone();
                self.summary = result.summary.clone();
                self.status_message = None;
            }
            Err(e) => {
                self.status_message = Some(format!("Filter error: {e}"));
            }
        }
    }

    /// Rows excluded during cleaning, for the KPI strip.
    pub fn excluded_rows(&self) -> usize {
        self.dataset.as_ref().map_or(0, |ds| ds.failures.len())
    }

    // -- Colour column -------------------------------------------------------

    pub fn set_color_column(&mut self, col: CategoryColumn) {
        self.color_column = col;
        self.rebuild_color_map();
    }

    fn rebuild_color_map(&mut self) {
        self.color_map = self.dataset.as_ref().and_then(|ds| {
            ds.unique_values
                .get(&self.color_column)
                .map(ColorMap::new)
        });
    }

    // -- Category filters ----------------------------------------------------

    /// Effective selection for a column: `None` filter means "all selected".
    pub fn selected_values(&self, col: CategoryColumn) -> BTreeSet<String> {
        let option = match col {
            CategoryColumn::MaterialType => &self.filters.material_types,
            CategoryColumn::VendorName => &self.filters.vendor_names,
            CategoryColumn::Portal => &self.filters.portals,
            CategoryColumn::PriceTier => &self.filters.price_tiers,
            CategoryColumn::Currency => {
                return match &self.filters.currencies {
                    Some(set) => set.iter().map(|c| c.code().to_string()).collect(),
                    None => self.all_values(col),
                };
            }
        };
        match option {
            Some(set) => set.clone(),
            None => self.all_values(col),
        }
    }

    fn all_values(&self, col: CategoryColumn) -> BTreeSet<String> {
        self.dataset
            .as_ref()
            .and_then(|ds| ds.unique_values.get(&col).cloned())
            .unwrap_or_default()
    }

    /// Toggle a single value in a column's filter and recompute the view.
    pub fn toggle_filter_value(&mut self, col: CategoryColumn, value: &str) {
        let mut selected = self.selected_values(col);
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
        self.store_selection(col, selected);
        self.refilter();
    }

    /// Select all values in a column (removes the constraint).
    pub fn select_all(&mut self, col: CategoryColumn) {
        self.store_option(col, None);
        self.refilter();
    }

    /// Deselect all values in a column (hides everything).
    pub fn select_none(&mut self, col: CategoryColumn) {
        self.store_selection(col, BTreeSet::new());
        self.refilter();
    }

    fn store_selection(&mut self, col: CategoryColumn, selected: BTreeSet<String>) {
        // A full selection is no constraint at all; normalising back to None
        // keeps the cache key stable.
        if selected == self.all_values(col) {
            self.store_option(col, None);
        } else {
            self.store_option(col, Some(selected));
        }
    }

    fn store_option(&mut self, col: CategoryColumn, selected: Option<BTreeSet<String>>) {
        match col {
            CategoryColumn::MaterialType => self.filters.material_types = selected,
            CategoryColumn::VendorName => self.filters.vendor_names = selected,
            CategoryColumn::Portal => self.filters.portals = selected,
            CategoryColumn::PriceTier => self.filters.price_tiers = selected,
            CategoryColumn::Currency => {
                self.filters.currencies = selected.map(|set| {
                    set.iter()
                        .filter_map(|code| code.parse().ok())
                        .collect()
                });
            }
        }
    }

    // -- Tri-state and date filters ------------------------------------------

    pub fn set_gmp_filter(&mut self, gmp: Option<GmpStatus>) {
        self.filters.gmp = gmp;
        self.refilter();
    }

    pub fn set_date_from(&mut self, date: Option<NaiveDate>) {
        self.filters.date_from = date;
        self.refilter();
    }

    pub fn set_date_to(&mut self, date: Option<NaiveDate>) {
        self.filters.date_to = date;
        self.refilter();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Currency, MaterialRecord};

    fn dataset() -> MaterialDataset {
        let records = (0..4)
            .map(|i| MaterialRecord {
                material_id: format!("MAT-{i}"),
                material_name: format!("Material {i}"),
                material_type: if i < 2 { "Solvent" } else { "API" }.to_string(),
                vendor_name: "Acme".into(),
                portal: "SAP Ariba".into(),
                price: 1.0,
                benchmark_price: None,
                currency: Currency::Usd,
                price_deviation_pct: 0.0,
                gmp: GmpStatus::Compliant,
                price_tier: "Low".into(),
                timestamp: None,
            })
            .collect();
        MaterialDataset::from_parts(records, Vec::new())
    }

    #[test]
    fn set_dataset_resets_filters_and_view() {
        let mut state = AppState::default();
        state.set_dataset(dataset());
        assert_eq!(state.visible_indices, vec![0, 1, 2, 3]);
        assert_eq!(state.filters, FilterConfig::default());
        assert_eq!(state.summary.count, 4);
    }

    #[test]
    fn toggling_a_value_restricts_then_restores() {
        let mut state = AppState::default();
        state.set_dataset(dataset());

        state.toggle_filter_value(CategoryColumn::MaterialType, "API");
        assert_eq!(state.visible_indices, vec![0, 1]);
        assert!(state.filters.material_types.is_some());

        // Toggling back on restores the full selection, normalised to None.
        state.toggle_filter_value(CategoryColumn::MaterialType, "API");
        assert_eq!(state.visible_indices, vec![0, 1, 2, 3]);
        assert_eq!(state.filters.material_types, None);
    }

    #[test]
    fn select_none_hides_everything() {
        let mut state = AppState::default();
        state.set_dataset(dataset());
        state.select_none(CategoryColumn::VendorName);
        assert!(state.visible_indices.is_empty());
        state.select_all(CategoryColumn::VendorName);
        assert_eq!(state.visible_indices.len(), 4);
    }

    #[test]
    fn reload_bumps_the_version() {
        let mut state = AppState::default();
        state.set_dataset(dataset());
        let v1 = state.dataset.as_ref().unwrap().version;
        state.set_dataset(dataset());
        let v2 = state.dataset.as_ref().unwrap().version;
        assert!(v2 > v1);
    }

    #[test]
    fn inverted_date_range_keeps_previous_view() {
        let mut state = AppState::default();
        state.set_dataset(dataset());
        state.set_date_from(NaiveDate::from_ymd_opt(2024, 2, 1));
        state.set_date_to(NaiveDate::from_ymd_opt(2024, 1, 1));
        assert!(state.status_message.is_some());
    }
}
