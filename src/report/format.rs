//! Formatted terminal output.
//!
//! All user-facing console text lives here so the fitting code stays free of
//! presentation concerns and output changes stay localized.

use std::path::Path;

use crate::domain::{ProjectSpan, RayleighFit, RelativeMonthSeries};
use crate::error::AppError;

pub fn format_connecting(source: &str) -> String {
    format!("Conectando a la fuente de datos ({source})...")
}

pub fn format_records_loaded(n: usize) -> String {
    format!("Datos cargados: {n} defectos históricos encontrados.\n")
}

pub fn format_empty_warning(statuses: &[String]) -> String {
    format!(
        "ADVERTENCIA: No se encontraron defectos históricos. Revisa que la fuente de datos contenga proyectos en estado {}.",
        statuses.join("/")
    )
}

/// Dataset overview printed after normalization.
pub fn format_series_summary(series: &RelativeMonthSeries, spans: &[ProjectSpan]) -> String {
    let longest = spans.iter().map(|s| s.last_month).max().unwrap_or(0);
    format!(
        "Proyectos: {} | Meses observados: {} | Defectos: {} | Proyecto más largo: {} meses\n",
        spans.len(),
        series.max_month(),
        series.total_defects(),
        longest
    )
}

/// The fit result block: σ with 2 decimals, `K` truncated to an integer.
pub fn format_fit_summary(fit: &RayleighFit) -> String {
    let mut out = String::new();
    out.push_str("--- RESULTADOS DEL MODELO ---\n");
    out.push_str(&format!("Sigma calculado: {:.2}\n", fit.sigma));
    out.push_str(&format!(
        "Defectos Totales Estimados (K): {}\n",
        fit.total_defects_estimate()
    ));
    out.push_str(&format!(
        "Ajuste: SSE={:.3} RMSE={:.3} iteraciones={}\n",
        fit.sse, fit.rmse, fit.iterations
    ));
    if fit.active_bounds.sigma {
        out.push_str("Nota: sigma quedó en el límite del intervalo permitido.\n");
    }
    if fit.active_bounds.scale {
        out.push_str("Nota: K quedó en el límite del intervalo permitido.\n");
    }
    out
}

pub fn format_fit_failure(err: &AppError) -> String {
    format!("Error al ajustar la curva (pocos datos): {err}")
}

pub fn format_chart_saved(path: &Path) -> String {
    format!("\n¡ÉXITO! Gráfica guardada como '{}'.", path.display())
}

pub fn format_general_error(err: &AppError) -> String {
    format!("Error General: {err}")
}
