use std::collections::BTreeSet;

use chrono::NaiveDate;
use thiserror::Error;

use super::model::{Currency, GmpStatus, MaterialRecord};

// ---------------------------------------------------------------------------
// FilterConfig – which records the current view keeps
// ---------------------------------------------------------------------------

/// Filter configuration. Each option, when present, restricts records to
/// those whose field is a member of the given set (or matches the tri-state);
/// absent options impose no restriction. Options compose with logical AND.
///
/// `Some(empty set)` means "nothing selected" and hides every record; that is
/// a deliberate UI state, not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FilterConfig {
    pub material_types: Option<BTreeSet<String>>,
    pub vendor_names: Option<BTreeSet<String>>,
    pub portals: Option<BTreeSet<String>>,
    pub price_tiers: Option<BTreeSet<String>>,
    pub currencies: Option<BTreeSet<Currency>>,
    pub gmp: Option<GmpStatus>,
    /// Inclusive quote-date bounds. Records without a timestamp are excluded
    /// whenever either bound is active.
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

/// Malformed filter configuration. Surfaced to the caller, blocks the filter
/// operation entirely (no partial filtering).
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("date range starts after it ends ({from} > {to})")]
    InvertedDateRange { from: NaiveDate, to: NaiveDate },
    #[error("{0:?} is not a recognised currency code")]
    UnknownCurrency(String),
}

impl FilterConfig {
    /// Build the currency option from textual codes, e.g. from a saved view.
    pub fn with_currency_codes<'a, I>(mut self, codes: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut set = BTreeSet::new();
        for code in codes {
            let cur: Currency = code
                .parse()
                .map_err(|_| ConfigError::UnknownCurrency(code.to_string()))?;
            set.insert(cur);
        }
        self.currencies = Some(set);
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let (Some(from), Some(to)) = (self.date_from, self.date_to) {
            if from > to {
                return Err(ConfigError::InvertedDateRange { from, to });
            }
        }
        Ok(())
    }

    /// Whether a single record passes every active option.
    pub fn matches(&self, rec: &MaterialRecord) -> bool {
        if let Some(set) = &self.material_types {
            if !set.contains(&rec.material_type) {
                return false;
            }
        }
        if let Some(set) = &self.vendor_names {
            if !set.contains(&rec.vendor_name) {
                return false;
            }
        }
        if let Some(set) = &self.portals {
            if !set.contains(&rec.portal) {
                return false;
            }
        }
        if let Some(set) = &self.price_tiers {
            if !set.contains(&rec.price_tier) {
                return false;
            }
        }
        if let Some(set) = &self.currencies {
            if !set.contains(&rec.currency) {
                return false;
            }
        }
        if let Some(status) = self.gmp {
            if rec.gmp != status {
                return false;
            }
        }
        if self.date_from.is_some() || self.date_to.is_some() {
            let Some(date) = rec.timestamp else {
                return false;
            };
            if self.date_from.is_some_and(|from| date < from) {
                return false;
            }
            if self.date_to.is_some_and(|to| date > to) {
                return false;
            }
        }
        true
    }
}

/// Return indices of records that pass all active filters, preserving the
/// original relative order. Validates the configuration first; a malformed
/// config filters nothing.
pub fn apply_filters(
    records: &[MaterialRecord],
    filters: &FilterConfig,
) -> Result<Vec<usize>, ConfigError> {
    filters.validate()?;
    Ok(records
        .iter()
        .enumerate()
        .filter(|(_, rec)| filters.matches(rec))
        .map(|(i, _)| i)
        .collect())
}
