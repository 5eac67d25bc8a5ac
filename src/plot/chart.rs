//! PNG chart of observed defects vs. the fitted Rayleigh curve.
//!
//! Rendering uses the plotters bitmap backend at a fixed 1000x600 resolution:
//! sky-blue bars for the observed monthly counts, a thick red line for the
//! prediction, light grid and a legend.

use std::path::Path;

use plotters::prelude::*;
use tracing::debug;

use crate::domain::{RayleighFit, RelativeMonthSeries};
use crate::error::AppError;
use crate::report::{PREDICTION_PADDING_MONTHS, prediction_label};

pub const CHART_SIZE: (u32, u32) = (1000, 600);
pub const CHART_TITLE: &str = "Modelo de Predicción de Defectos (Rayleigh)";
pub const X_LABEL: &str = "Mes del Proyecto";
pub const Y_LABEL: &str = "Cantidad de Defectos";
pub const OBSERVED_LABEL: &str = "Defectos Históricos Reales";

const SKY_BLUE: RGBColor = RGBColor(135, 206, 235);
const BAR_HALF_WIDTH: f64 = 0.4;

/// Draw the chart and save it to `output_path`.
pub fn render_chart_png(
    series: &RelativeMonthSeries,
    fit: &RayleighFit,
    curve: &[(f64, f64)],
    output_path: &Path,
) -> Result<(), AppError> {
    if series.points().is_empty() {
        return Err(AppError::Render("Nothing to plot: the series is empty.".to_string()));
    }
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            AppError::Render(format!("Failed to create '{}': {e}", parent.display()))
        })?;
    }

    let x_max = (series.max_month() + PREDICTION_PADDING_MONTHS) as f64;
    let y_max = chart_y_max(series, curve);
    debug!(x_max, y_max, path = %output_path.display(), "rendering chart");

    let root = BitMapBackend::new(output_path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(CHART_TITLE, ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..x_max, 0.0..y_max)
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .x_desc(X_LABEL)
        .y_desc(Y_LABEL)
        .x_label_formatter(&|v| format!("{v:.0}"))
        .y_label_formatter(&|v| format!("{v:.0}"))
        .bold_line_style(BLACK.mix(0.3))
        .light_line_style(BLACK.mix(0.08))
        .label_style(("sans-serif", 16))
        .draw()
        .map_err(render_err)?;

    chart
        .draw_series(series.points().iter().map(|p| {
            let m = p.month as f64;
            Rectangle::new(
                [(m - BAR_HALF_WIDTH, 0.0), (m + BAR_HALF_WIDTH, p.defects as f64)],
                SKY_BLUE.filled(),
            )
        }))
        .map_err(render_err)?
        .label(OBSERVED_LABEL)
        .legend(|(x, y)| Rectangle::new([(x, y - 6), (x + 16, y + 6)], SKY_BLUE.filled()));

    chart
        .draw_series(LineSeries::new(curve.iter().copied(), RED.stroke_width(3)))
        .map_err(render_err)?
        .label(prediction_label(fit))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.stroke_width(3)));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.85))
        .border_style(BLACK)
        .label_font(("sans-serif", 16))
        .draw()
        .map_err(render_err)?;

    root.present().map_err(render_err)?;
    Ok(())
}

/// Upper y bound: the larger of the tallest bar and the curve peak, plus headroom.
pub fn chart_y_max(series: &RelativeMonthSeries, curve: &[(f64, f64)]) -> f64 {
    let bars = series
        .points()
        .iter()
        .map(|p| p.defects as f64)
        .fold(0.0, f64::max);
    let peak = curve
        .iter()
        .map(|&(_, y)| y)
        .filter(|y| y.is_finite())
        .fold(0.0, f64::max);
    let top = bars.max(peak);
    if top > 0.0 { top * 1.1 } else { 1.0 }
}

fn render_err(e: impl std::fmt::Display) -> AppError {
    AppError::Render(e.to_string())
}
