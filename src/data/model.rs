use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// Currency – the enumerated set of price currencies
// ---------------------------------------------------------------------------

/// Currency tag on a price. The accepted set is fixed; anything else in the
/// source data is a validation failure, not a silent passthrough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Currency {
    Usd,
    Eur,
    Gbp,
    Inr,
    Jpy,
    Chf,
}

impl Currency {
    pub const ALL: [Currency; 6] = [
        Currency::Usd,
        Currency::Eur,
        Currency::Gbp,
        Currency::Inr,
        Currency::Jpy,
        Currency::Chf,
    ];

    /// ISO 4217 code as it appears in the source data.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Inr => "INR",
            Currency::Jpy => "JPY",
            Currency::Chf => "CHF",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Currency::ALL
            .iter()
            .find(|c| c.code().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or(())
    }
}

// ---------------------------------------------------------------------------
// GmpStatus – tri-state compliance flag
// ---------------------------------------------------------------------------

/// GMP (Good Manufacturing Practice) compliance status. The source data uses
/// "Yes"/"No"; anything empty or unrecognised is kept as `Unknown` rather
/// than guessed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GmpStatus {
    Compliant,
    NonCompliant,
    #[default]
    Unknown,
}

impl GmpStatus {
    pub fn parse(s: &str) -> GmpStatus {
        let t = s.trim();
        if t.eq_ignore_ascii_case("yes") || t.eq_ignore_ascii_case("true") {
            GmpStatus::Compliant
        } else if t.eq_ignore_ascii_case("no") || t.eq_ignore_ascii_case("false") {
            GmpStatus::NonCompliant
        } else {
            GmpStatus::Unknown
        }
    }
}

impl fmt::Display for GmpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GmpStatus::Compliant => write!(f, "Compliant"),
            GmpStatus::NonCompliant => write!(f, "Non-compliant"),
            GmpStatus::Unknown => write!(f, "Unknown"),
        }
    }
}

// ---------------------------------------------------------------------------
// MaterialRecord – one cleaned row of the dataset
// ---------------------------------------------------------------------------

/// A single vendor/material price record after cleaning. Raw rows never
/// escape the cleaning boundary; everything here is already typed.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialRecord {
    /// Non-empty identifier, e.g. "MAT-0042".
    pub material_id: String,
    pub material_name: String,
    pub material_type: String,
    pub vendor_name: String,
    /// Originating supplier portal, e.g. "SAP Ariba".
    pub portal: String,
    /// Latest unit price, non-negative.
    pub price: f64,
    /// Benchmark price for the same material, if the source had one.
    pub benchmark_price: Option<f64>,
    pub currency: Currency,
    /// Deviation from benchmark in percent, normalised from "12.5%" to 12.5.
    pub price_deviation_pct: f64,
    pub gmp: GmpStatus,
    /// Categorical price bucket, e.g. "Low" / "Medium" / "High".
    pub price_tier: String,
    /// Quote capture date. `None` only when the source cell was empty; an
    /// unparsable non-empty cell fails validation instead.
    pub timestamp: Option<NaiveDate>,
}

// ---------------------------------------------------------------------------
// CategoryColumn – the filterable categorical columns
// ---------------------------------------------------------------------------

/// The categorical columns the sidebar can filter and colour by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CategoryColumn {
    MaterialType,
    VendorName,
    Portal,
    PriceTier,
    Currency,
}

impl CategoryColumn {
    pub const ALL: [CategoryColumn; 5] = [
        CategoryColumn::MaterialType,
        CategoryColumn::VendorName,
        CategoryColumn::Portal,
        CategoryColumn::PriceTier,
        CategoryColumn::Currency,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CategoryColumn::MaterialType => "Material Type",
            CategoryColumn::VendorName => "Vendor",
            CategoryColumn::Portal => "Portal",
            CategoryColumn::PriceTier => "Price Tier",
            CategoryColumn::Currency => "Currency",
        }
    }

    /// The record's value in this column, as a display string.
    pub fn value_of(&self, rec: &MaterialRecord) -> String {
        match self {
            CategoryColumn::MaterialType => rec.material_type.clone(),
            CategoryColumn::VendorName => rec.vendor_name.clone(),
            CategoryColumn::Portal => rec.portal.clone(),
            CategoryColumn::PriceTier => rec.price_tier.clone(),
            CategoryColumn::Currency => rec.currency.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// MaterialDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full cleaned dataset with pre-computed column indices. Immutable for
/// the session: filters derive views over it, a reload replaces it wholesale.
#[derive(Debug, Clone)]
pub struct MaterialDataset {
    /// All cleaned records (rows), in source order.
    pub records: Vec<MaterialRecord>,
    /// Rows that failed validation, with their source index and reason.
    pub failures: Vec<super::clean::RowFailure>,
    /// For each categorical column the sorted set of unique values.
    pub unique_values: BTreeMap<CategoryColumn, BTreeSet<String>>,
    /// Bumped on every (re)load; keys the query cache.
    pub version: u64,
}

impl MaterialDataset {
    /// Build column indices from cleaned records. `version` is assigned by
    /// the caller when the dataset is installed.
    pub fn from_parts(
        records: Vec<MaterialRecord>,
        failures: Vec<super::clean::RowFailure>,
    ) -> Self {
        let mut unique_values: BTreeMap<CategoryColumn, BTreeSet<String>> = BTreeMap::new();
        for col in CategoryColumn::ALL {
            let vals = records.iter().map(|r| col.value_of(r)).collect();
            unique_values.insert(col, vals);
        }
        MaterialDataset {
            records,
            failures,
            unique_values,
            version: 0,
        }
    }

    /// Number of cleaned records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the clean set is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Earliest and latest quote dates among records that have one.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut dates = self.records.iter().filter_map(|r| r.timestamp);
        let first = dates.next()?;
        Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_codes_round_trip() {
        for c in Currency::ALL {
            assert_eq!(c.code().parse::<Currency>(), Ok(c));
        }
        assert_eq!("usd".parse::<Currency>(), Ok(Currency::Usd));
        assert!("XYZ".parse::<Currency>().is_err());
    }

    #[test]
    fn gmp_parse_is_tri_state() {
        assert_eq!(GmpStatus::parse("Yes"), GmpStatus::Compliant);
        assert_eq!(GmpStatus::parse("no"), GmpStatus::NonCompliant);
        assert_eq!(GmpStatus::parse(""), GmpStatus::Unknown);
        assert_eq!(GmpStatus::parse("maybe"), GmpStatus::Unknown);
    }
}
