use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, Line, Plot, PlotPoints, Points};

use crate::data::summary;
use crate::state::{AppState, ChartKind};

// ---------------------------------------------------------------------------
// Chart panel (central panel)
// ---------------------------------------------------------------------------

/// Render the selected chart over the currently visible records.
pub fn chart_panel(ui: &mut Ui, state: &AppState) {
    let Some(dataset) = &state.dataset else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to explore materials  (File → Open…)");
        });
        return;
    };

    let records = &dataset.records;
    let indices = &state.visible_indices;

    match state.chart {
        ChartKind::PriceVsDeviation => scatter_chart(ui, state),
        ChartKind::PriceVsBenchmark => benchmark_chart(ui, state),
        ChartKind::DataTable => super::table::records_table(ui, state),
        ChartKind::MeanPriceByVendor => {
            let data = summary::mean_price_by_vendor(records, indices);
            bar_chart(ui, "mean_price_by_vendor", "Avg price", data);
        }
        ChartKind::GmpByVendor => {
            let data = summary::gmp_pct_by_vendor(records, indices);
            bar_chart(ui, "gmp_by_vendor", "GMP %", data);
        }
        ChartKind::CountByPortal => {
            let data = summary::count_by_portal(records, indices)
                .into_iter()
                .map(|(portal, n)| (portal, n as f64))
                .collect();
            bar_chart(ui, "count_by_portal", "Records", data);
        }
        ChartKind::PriceOverTime => time_chart(ui, state),
    }
}

// ---------------------------------------------------------------------------
// Price vs deviation scatter, coloured by the colour column
// ---------------------------------------------------------------------------

fn scatter_chart(ui: &mut Ui, state: &AppState) {
    let Some(dataset) = &state.dataset else {
        return;
    };

    // Group points by colour-column value so each group gets one legend entry.
    let mut groups: BTreeMap<String, Vec<[f64; 2]>> = BTreeMap::new();
    for &idx in &state.visible_indices {
        let rec = &dataset.records[idx];
        let key = state.color_column.value_of(rec);
        groups
            .entry(key)
            .or_default()
            .push([rec.price, rec.price_deviation_pct]);
    }

    Plot::new("price_vs_deviation")
        .legend(egui_plot::Legend::default())
        .x_axis_label("Unit price")
        .y_axis_label("Deviation from benchmark (%)")
        .show(ui, |plot_ui| {
            for (value, pts) in groups {
                let color = state
                    .color_map
                    .as_ref()
                    .map(|cm| cm.color_for(&value))
                    .unwrap_or(Color32::LIGHT_BLUE);
                let points = Points::new(PlotPoints::from(pts))
                    .name(&value)
                    .color(color)
                    .radius(3.0);
                plot_ui.points(points);
            }
        });
}

// ---------------------------------------------------------------------------
// Average price vs benchmark price per material, grouped bars
// ---------------------------------------------------------------------------

fn benchmark_chart(ui: &mut Ui, state: &AppState) {
    let Some(dataset) = &state.dataset else {
        return;
    };

    let data = summary::price_vs_benchmark_by_material(&dataset.records, &state.visible_indices);
    if data.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label("No records in the current view.");
        });
        return;
    }

    let labels: Vec<String> = data.iter().map(|(name, _, _)| name.clone()).collect();
    let price_bars: Vec<Bar> = data
        .iter()
        .enumerate()
        .map(|(i, (name, price, _))| Bar::new(i as f64 - 0.2, *price).name(name))
        .collect();
    let benchmark_bars: Vec<Bar> = data
        .iter()
        .enumerate()
        .filter_map(|(i, (name, _, benchmark))| {
            benchmark.map(|b| Bar::new(i as f64 + 0.2, b).name(name))
        })
        .collect();

    Plot::new("price_vs_benchmark")
        .legend(egui_plot::Legend::default())
        .y_axis_label("Price")
        .x_axis_formatter(move |mark, _range| {
            let i = mark.value.round();
            if i < 0.0 || (mark.value - i).abs() > 1e-6 {
                return String::new();
            }
            labels.get(i as usize).cloned().unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(
                BarChart::new(price_bars)
                    .name("Avg price")
                    .color(Color32::LIGHT_BLUE)
                    .width(0.35),
            );
            plot_ui.bar_chart(
                BarChart::new(benchmark_bars)
                    .name("Benchmark")
                    .color(Color32::from_rgb(235, 165, 60))
                    .width(0.35),
            );
        });
}

// ---------------------------------------------------------------------------
// Labelled bar chart for the grouped aggregations
// ---------------------------------------------------------------------------

fn bar_chart(ui: &mut Ui, id: &str, y_label: &str, data: Vec<(String, f64)>) {
    let labels: Vec<String> = data.iter().map(|(label, _)| label.clone()).collect();
    let bars: Vec<Bar> = data
        .iter()
        .enumerate()
        .map(|(i, (label, value))| Bar::new(i as f64, *value).name(label))
        .collect();

    let axis_labels = labels.clone();
    Plot::new(id.to_string())
        .y_axis_label(y_label)
        .x_axis_formatter(move |mark, _range| {
            let i = mark.value.round();
            if i < 0.0 || (mark.value - i).abs() > 1e-6 {
                return String::new();
            }
            axis_labels.get(i as usize).cloned().unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });
}

// ---------------------------------------------------------------------------
// Price-over-time line
// ---------------------------------------------------------------------------

// Chrono's day number for 1970-01-01; keeps plot x-values as Unix days.
const UNIX_EPOCH_DAYS: i32 = 719_163;

fn date_to_day(date: NaiveDate) -> f64 {
    (date.num_days_from_ce() - UNIX_EPOCH_DAYS) as f64
}

fn day_to_date(day: f64) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(day.round() as i32 + UNIX_EPOCH_DAYS)
}

fn time_chart(ui: &mut Ui, state: &AppState) {
    let Some(dataset) = &state.dataset else {
        return;
    };

    let series = summary::price_over_time(&dataset.records, &state.visible_indices);
    if series.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label("No dated records in the current view.");
        });
        return;
    }

    let marker_points: Vec<[f64; 2]> = series
        .iter()
        .map(|(date, mean, _)| [date_to_day(*date), *mean])
        .collect();
    let line_points: PlotPoints = marker_points.clone().into();

    Plot::new("price_over_time")
        .x_axis_label("Quote date")
        .y_axis_label("Avg price")
        .x_axis_formatter(|mark, _range| {
            day_to_date(mark.value)
                .map(|d| d.format("%d-%m-%Y").to_string())
                .unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(line_points)
                    .name("Avg price")
                    .color(Color32::LIGHT_BLUE)
                    .width(1.5),
            );
            plot_ui.points(
                Points::new(PlotPoints::from(marker_points))
                    .color(Color32::LIGHT_BLUE)
                    .radius(2.5),
            );
        });
}
