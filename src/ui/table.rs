use eframe::egui::{RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::loader::COLUMNS;
use crate::data::model::MaterialRecord;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Detailed data table (central panel)
// ---------------------------------------------------------------------------

/// Render the currently visible records as a scrollable table, one column per
/// contract column.
pub fn records_table(ui: &mut Ui, state: &AppState) {
    let Some(dataset) = &state.dataset else {
        return;
    };
    let indices = &state.visible_indices;

    if indices.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label("No records in the current view.");
        });
        return;
    }

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .columns(Column::auto().at_least(70.0), COLUMNS.len())
        .header(22.0, |mut header| {
            for name in COLUMNS {
                header.col(|ui: &mut Ui| {
                    ui.label(RichText::new(name).strong());
                });
            }
        })
        .body(|body| {
            body.rows(18.0, indices.len(), |mut row| {
                let rec = &dataset.records[indices[row.index()]];
                for cell in row_cells(rec) {
                    row.col(|ui: &mut Ui| {
                        ui.label(cell);
                    });
                }
            });
        });
}

/// Display cells for one record, in contract column order. Absent optionals
/// show as a dash, never as a fabricated value.
fn row_cells(rec: &MaterialRecord) -> [String; 12] {
    [
        rec.material_id.clone(),
        rec.material_name.clone(),
        rec.material_type.clone(),
        rec.vendor_name.clone(),
        rec.portal.clone(),
        format!("{:.2}", rec.price),
        rec.benchmark_price
            .map(|b| format!("{b:.2}"))
            .unwrap_or_else(|| "–".to_string()),
        rec.currency.code().to_string(),
        format!("{:.2}%", rec.price_deviation_pct),
        rec.gmp.to_string(),
        rec.price_tier.clone(),
        rec.timestamp
            .map(|d| d.format("%d-%m-%Y").to_string())
            .unwrap_or_else(|| "–".to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Currency, GmpStatus};
    use chrono::NaiveDate;

    #[test]
    fn cells_line_up_with_the_column_contract() {
        let rec = MaterialRecord {
            material_id: "MAT-7".into(),
            material_name: "Magnesium Stearate".into(),
            material_type: "Excipient".into(),
            vendor_name: "Helios Chem".into(),
            portal: "Coupa".into(),
            price: 4.756,
            benchmark_price: None,
            currency: Currency::Eur,
            price_deviation_pct: -3.1,
            gmp: GmpStatus::Unknown,
            price_tier: "Low".into(),
            timestamp: NaiveDate::from_ymd_opt(2024, 2, 29),
        };

        let cells = row_cells(&rec);
        assert_eq!(cells.len(), COLUMNS.len());
        assert_eq!(cells[0], "MAT-7");
        assert_eq!(cells[5], "4.76");
        assert_eq!(cells[6], "–");
        assert_eq!(cells[7], "EUR");
        assert_eq!(cells[8], "-3.10%");
        assert_eq!(cells[9], "Unknown");
        assert_eq!(cells[11], "29-02-2024");
    }

    #[test]
    fn undated_rows_show_a_dash() {
        let rec = MaterialRecord {
            material_id: "MAT-8".into(),
            material_name: "Ethanol".into(),
            material_type: "Solvent".into(),
            vendor_name: "Acme".into(),
            portal: "SAP Ariba".into(),
            price: 12.0,
            benchmark_price: Some(11.5),
            currency: Currency::Usd,
            price_deviation_pct: 4.3,
            gmp: GmpStatus::Compliant,
            price_tier: "Medium".into(),
            timestamp: None,
        };
        let cells = row_cells(&rec);
        assert_eq!(cells[6], "11.50");
        assert_eq!(cells[11], "–");
    }
}
