use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

use super::model::{Currency, GmpStatus, MaterialRecord};

// ---------------------------------------------------------------------------
// RawRow – one untyped input row
// ---------------------------------------------------------------------------

/// One row as it arrives from a loader: everything is still text. Loaders
/// build these; nothing past [`load_and_clean`] ever sees one.
#[derive(Debug, Clone, Default)]
pub struct RawRow {
    pub material_id: String,
    pub material_name: String,
    pub material_type: String,
    pub vendor_name: String,
    pub portal: String,
    pub price: String,
    pub benchmark_price: String,
    pub currency: String,
    pub price_deviation_pct: String,
    pub gmp: String,
    pub price_tier: String,
    pub timestamp: String,
}

// ---------------------------------------------------------------------------
// ValidationError – why a row was rejected
// ---------------------------------------------------------------------------

/// Per-row validation failure. Recovered locally: the row is excluded and the
/// reason recorded, cleaning continues with the remaining rows.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("material id is empty")]
    MissingMaterialId,
    #[error("not a percentage: {0:?}")]
    InvalidPercentage(String),
    #[error("unrecognised timestamp: {0:?}")]
    InvalidTimestamp(String),
    #[error("not a valid price: {0:?}")]
    InvalidPrice(String),
    #[error("unrecognised currency code: {0:?}")]
    InvalidCurrency(String),
}

impl ValidationError {
    /// Stable machine-readable tag for the failure list.
    pub fn reason(&self) -> &'static str {
        match self {
            ValidationError::MissingMaterialId => "missing_material_id",
            ValidationError::InvalidPercentage(_) => "invalid_percentage",
            ValidationError::InvalidTimestamp(_) => "invalid_timestamp",
            ValidationError::InvalidPrice(_) => "invalid_price",
            ValidationError::InvalidCurrency(_) => "invalid_currency",
        }
    }
}

/// A rejected row: its index in the raw input plus the reason.
#[derive(Debug, Clone, PartialEq)]
pub struct RowFailure {
    pub row_index: usize,
    pub error: ValidationError,
}

impl RowFailure {
    pub fn reason(&self) -> &'static str {
        self.error.reason()
    }
}

// ---------------------------------------------------------------------------
// Field parsers
// ---------------------------------------------------------------------------

/// Accepted timestamp formats, tried in order, first match wins. The source
/// export writes `%d-%m-%Y`, so that comes first.
pub const DATE_FORMATS: [&str; 4] = ["%d-%m-%Y", "%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y"];
pub const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Normalise a percentage cell: strip a trailing `%`, parse as float.
/// `"12.5%"` and `"12.5"` both yield 12.5; the result must be finite.
pub fn parse_percent(s: &str) -> Result<f64, ValidationError> {
    let cleaned = s.trim().trim_end_matches('%').trim();
    let value: f64 = cleaned
        .parse()
        .map_err(|_| ValidationError::InvalidPercentage(s.to_string()))?;
    if !value.is_finite() {
        return Err(ValidationError::InvalidPercentage(s.to_string()));
    }
    Ok(value)
}

/// Parse a timestamp cell against the accepted format lists. An empty cell is
/// explicitly "no timestamp"; a non-empty cell that matches nothing is a
/// validation failure, never a fabricated date.
pub fn parse_timestamp(s: &str) -> Result<Option<NaiveDate>, ValidationError> {
    let t = s.trim();
    if t.is_empty() {
        return Ok(None);
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(t, fmt) {
            return Ok(Some(d));
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(t, fmt) {
            return Ok(Some(dt.date()));
        }
    }
    Err(ValidationError::InvalidTimestamp(s.to_string()))
}

/// Parse a price cell: a finite, non-negative float.
fn parse_price(s: &str) -> Result<f64, ValidationError> {
    let value: f64 = s
        .trim()
        .parse()
        .map_err(|_| ValidationError::InvalidPrice(s.to_string()))?;
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::InvalidPrice(s.to_string()));
    }
    Ok(value)
}

// ---------------------------------------------------------------------------
// Row cleaning
// ---------------------------------------------------------------------------

/// Validate and type a single raw row.
pub fn clean_row(raw: &RawRow) -> Result<MaterialRecord, ValidationError> {
    if raw.material_id.trim().is_empty() {
        return Err(ValidationError::MissingMaterialId);
    }

    let price = parse_price(&raw.price)?;
    let benchmark_price = if raw.benchmark_price.trim().is_empty() {
        None
    } else {
        Some(parse_price(&raw.benchmark_price)?)
    };
    let currency: Currency = raw
        .currency
        .parse()
        .map_err(|_| ValidationError::InvalidCurrency(raw.currency.clone()))?;
    let price_deviation_pct = parse_percent(&raw.price_deviation_pct)?;
    let timestamp = parse_timestamp(&raw.timestamp)?;

    Ok(MaterialRecord {
        material_id: raw.material_id.trim().to_string(),
        material_name: raw.material_name.trim().to_string(),
        material_type: raw.material_type.trim().to_string(),
        vendor_name: raw.vendor_name.trim().to_string(),
        portal: raw.portal.trim().to_string(),
        price,
        benchmark_price,
        currency,
        price_deviation_pct,
        gmp: GmpStatus::parse(&raw.gmp),
        price_tier: raw.price_tier.trim().to_string(),
        timestamp,
    })
}

/// Clean a batch of raw rows. Pure: returns the ordered clean set plus the
/// failure list; invalid rows are excluded with a recorded reason, never
/// silently dropped.
pub fn load_and_clean(raw_rows: &[RawRow]) -> (Vec<MaterialRecord>, Vec<RowFailure>) {
    let mut records = Vec::with_capacity(raw_rows.len());
    let mut failures = Vec::new();

    for (row_index, raw) in raw_rows.iter().enumerate() {
        match clean_row(raw) {
            Ok(rec) => records.push(rec),
            Err(error) => failures.push(RowFailure { row_index, error }),
        }
    }

    (records, failures)
}
