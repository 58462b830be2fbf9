use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::data::export;
use crate::data::model::{CategoryColumn, GmpStatus};
use crate::state::{AppState, ChartKind};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let Some(dataset) = &state.dataset else {
        ui.label("No dataset loaded.");
        return;
    };

    // Clone what we need so we can mutate state inside the loop.
    let unique = dataset.unique_values.clone();
    let date_bounds = dataset.date_bounds();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Colour-by selector ----
            ui.strong("Color by");
            egui::ComboBox::from_id_salt("color_by")
                .selected_text(state.color_column.label())
                .show_ui(ui, |ui: &mut Ui| {
                    for col in CategoryColumn::ALL {
                        if ui
                            .selectable_label(state.color_column == col, col.label())
                            .clicked()
                        {
                            state.set_color_column(col);
                        }
                    }
                });
            ui.separator();

            // ---- Per-column filter widgets (collapsible) ----
            for col in CategoryColumn::ALL {
                let Some(all_values) = unique.get(&col) else {
                    continue;
                };

                let selected = state.selected_values(col);
                let header_text =
                    format!("{}  ({}/{})", col.label(), selected.len(), all_values.len());

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(col.label())
                    .default_open(false)
                    .show(ui, |ui: &mut Ui| {
                        ui.horizontal(|ui: &mut Ui| {
                            if ui.small_button("All").clicked() {
                                state.select_all(col);
                            }
                            if ui.small_button("None").clicked() {
                                state.select_none(col);
                            }
                        });

                        // Re-read after potential mutation from All/None.
                        let selected = state.selected_values(col);
                        for val in all_values {
                            let mut text = RichText::new(val);
                            if state.color_column == col {
                                if let Some(cm) = &state.color_map {
                                    text = text.color(cm.color_for(val));
                                }
                            }

                            let mut checked = selected.contains(val);
                            if ui.checkbox(&mut checked, text).changed() {
                                state.toggle_filter_value(col, val);
                            }
                        }
                    });
            }
            ui.separator();

            // ---- GMP tri-state ----
            ui.strong("GMP compliance");
            let current = state.filters.gmp;
            let label = current
                .map(|g| g.to_string())
                .unwrap_or_else(|| "All".to_string());
            egui::ComboBox::from_id_salt("gmp_filter")
                .selected_text(label)
                .show_ui(ui, |ui: &mut Ui| {
                    if ui.selectable_label(current.is_none(), "All").clicked() {
                        state.set_gmp_filter(None);
                    }
                    for status in [
                        GmpStatus::Compliant,
                        GmpStatus::NonCompliant,
                        GmpStatus::Unknown,
                    ] {
                        if ui
                            .selectable_label(current == Some(status), status.to_string())
                            .clicked()
                        {
                            state.set_gmp_filter(Some(status));
                        }
                    }
                });
            ui.separator();

            // ---- Quote date range ----
            ui.strong("Quote date");
            date_bound_picker(ui, state, date_bounds, true);
            date_bound_picker(ui, state, date_bounds, false);
        });
}

/// One enable-checkbox + date-picker pair for a range bound.
fn date_bound_picker(
    ui: &mut Ui,
    state: &mut AppState,
    bounds: Option<(chrono::NaiveDate, chrono::NaiveDate)>,
    is_from: bool,
) {
    let (label, current) = if is_from {
        ("From", state.filters.date_from)
    } else {
        ("To", state.filters.date_to)
    };

    ui.horizontal(|ui: &mut Ui| {
        let mut enabled = current.is_some();
        if ui.checkbox(&mut enabled, label).changed() {
            let default_date = bounds
                .map(|(lo, hi)| if is_from { lo } else { hi })
                .unwrap_or_else(|| chrono::Local::now().date_naive());
            let new = enabled.then_some(default_date);
            if is_from {
                state.set_date_from(new);
            } else {
                state.set_date_to(new);
            }
        }

        if let Some(mut date) = if is_from {
            state.filters.date_from
        } else {
            state.filters.date_to
        } {
            let picker = DatePickerButton::new(&mut date).id_salt(label);
            if ui.add(picker).changed() {
                if is_from {
                    state.set_date_from(Some(date));
                } else {
                    state.set_date_to(Some(date));
                }
            }
        }
    });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let can_export = !state.visible_indices.is_empty();
            if ui
                .add_enabled(can_export, egui::Button::new("Export filtered…"))
                .clicked()
            {
                export_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        // ---- Chart selector ----
        egui::ComboBox::from_id_salt("chart_kind")
            .selected_text(state.chart.label())
            .show_ui(ui, |ui: &mut Ui| {
                for kind in ChartKind::ALL {
                    if ui.selectable_label(state.chart == kind, kind.label()).clicked() {
                        state.chart = kind;
                    }
                }
            });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} records loaded, {} visible",
                ds.len(),
                state.visible_indices.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// KPI strip
// ---------------------------------------------------------------------------

/// Render the key-metric strip below the menu bar. Excluded invalid rows are
/// always reported next to the computed metrics.
pub fn kpi_strip(ui: &mut Ui, state: &AppState) {
    if state.dataset.is_none() {
        return;
    }
    let s = &state.summary;

    ui.horizontal(|ui: &mut Ui| {
        metric(ui, "Records", s.count.to_string());
        metric(ui, "Materials", s.distinct_materials.to_string());
        metric(
            ui,
            "Avg price",
            s.mean_price
                .map(|v| format!("{v:.2}"))
                .unwrap_or_else(|| "–".to_string()),
        );
        metric(
            ui,
            "Avg deviation",
            s.mean_deviation_pct
                .map(|v| format!("{v:.2}%"))
                .unwrap_or_else(|| "–".to_string()),
        );
        metric(
            ui,
            "GMP compliant",
            s.gmp_ratio
                .map(|r| format!("{:.0}%  ({}/{})", r * 100.0, s.compliant, s.non_unknown))
                .unwrap_or_else(|| "–".to_string()),
        );

        let excluded = state.excluded_rows();
        if excluded > 0 {
            ui.separator();
            ui.label(
                RichText::new(format!("{excluded} invalid rows excluded"))
                    .color(Color32::ORANGE),
            );
        }
    });
}

fn metric(ui: &mut Ui, label: &str, value: String) {
    ui.label(RichText::new(label).weak());
    ui.label(RichText::new(value).strong());
    ui.separator();
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open materials dataset")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.loading = true;
        match crate::data::loader::load_file(&path) {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} records ({} invalid rows excluded)",
                    dataset.len(),
                    dataset.failures.len()
                );
                for failure in &dataset.failures {
                    log::warn!(
                        "row {} excluded: {} ({})",
                        failure.row_index,
                        failure.error,
                        failure.reason()
                    );
                }
                state.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
                state.loading = false;
            }
        }
    }
}

pub fn export_dialog(state: &mut AppState) {
    let Some(ds) = &state.dataset else {
        return;
    };

    let file = rfd::FileDialog::new()
        .set_title("Export filtered records")
        .set_file_name("filtered_materials.csv")
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        match export::export_csv_path(&ds.records, &state.visible_indices, &path) {
            Ok(()) => {
                log::info!(
                    "Exported {} records to {}",
                    state.visible_indices.len(),
                    path.display()
                );
                state.status_message = None;
            }
            Err(e) => {
                log::error!("Export failed: {e:#}");
                state.status_message = Some(format!("Export error: {e:#}"));
            }
        }
    }
}
