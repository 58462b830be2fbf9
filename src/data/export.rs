use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use super::loader::COLUMNS;
use super::model::{GmpStatus, MaterialRecord};

// ---------------------------------------------------------------------------
// CSV export – filtered view back out in the input column contract
// ---------------------------------------------------------------------------

/// Write the filtered subsequence of `records` as CSV with the same columns
/// the loader accepts, so an export can be re-loaded unchanged.
pub fn export_csv<W: Write>(
    records: &[MaterialRecord],
    indices: &[usize],
    writer: W,
) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(COLUMNS).context("writing CSV header")?;

    for &i in indices {
        let rec = &records[i];
        let gmp = match rec.gmp {
            GmpStatus::Compliant => "Yes",
            GmpStatus::NonCompliant => "No",
            GmpStatus::Unknown => "",
        };
        let benchmark = rec
            .benchmark_price
            .map(|b| b.to_string())
            .unwrap_or_default();
        let timestamp = rec
            .timestamp
            .map(|d| d.format("%d-%m-%Y").to_string())
            .unwrap_or_default();

        wtr.write_record([
            rec.material_id.as_str(),
            rec.material_name.as_str(),
            rec.material_type.as_str(),
            rec.vendor_name.as_str(),
            rec.portal.as_str(),
            &rec.price.to_string(),
            &benchmark,
            rec.currency.code(),
            &format!("{}%", rec.price_deviation_pct),
            gmp,
            rec.price_tier.as_str(),
            &timestamp,
        ])
        .with_context(|| format!("writing CSV row for {}", rec.material_id))?;
    }

    wtr.flush().context("flushing CSV output")?;
    Ok(())
}

/// Export the filtered view to a file path.
pub fn export_csv_path(
    records: &[MaterialRecord],
    indices: &[usize],
    path: &Path,
) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    export_csv(records, indices, file)
}
