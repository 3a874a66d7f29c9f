//! CSV and SVG chart export of a simulated decay curve.

use std::ops::RangeInclusive;

use base64::{engine::general_purpose::STANDARD, Engine};
use plotters::prelude::*;
use thiserror::Error;

use super::models::SimulationResult;

pub const CSV_HEADER: [&str; 3] = ["cycle", "capacity_pct", "efficiency_pct"];

/// Accepted chart width and height in pixels.
pub const CHART_SIDE_RANGE: RangeInclusive<u32> = 64..=4096;

const CAPACITY: RGBColor = RGBColor(31, 119, 180);
const EFFICIENCY: RGBColor = RGBColor(255, 127, 14);

/// Export error types.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to flush CSV buffer: {0}")]
    CsvFlush(String),
    #[error("CSV output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("chart sides must be between 64 and 4096 pixels, got {width}x{height}")]
    ChartSize { width: u32, height: u32 },
    #[error("failed to draw chart: {0}")]
    Chart(String),
}

fn chart_error<E: std::fmt::Display>(e: E) -> ExportError {
    ExportError::Chart(e.to_string())
}

/// Serialize the curve as `cycle,capacity_pct,efficiency_pct` rows.
pub fn curve_to_csv(result: &SimulationResult) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;

    for point in &result.curve {
        writer.write_record(&[
            point.cycle.to_string(),
            format!("{:.4}", point.capacity_pct),
            format!("{:.4}", point.efficiency_pct),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::CsvFlush(e.to_string()))?;
    Ok(String::from_utf8(bytes)?)
}

/// Render capacity and efficiency against cycle count as an SVG line chart.
///
/// Uses the SVG backend so no system fonts are needed.
pub fn render_chart_svg(
    result: &SimulationResult,
    width: u32,
    height: u32,
) -> Result<String, ExportError> {
    if !CHART_SIDE_RANGE.contains(&width) || !CHART_SIDE_RANGE.contains(&height) {
        return Err(ExportError::ChartSize { width, height });
    }

    let max_cycle = result
        .last_point()
        .map(|p| p.cycle)
        .unwrap_or(0)
        .max(1);

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(chart_error)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(
                format!("Capacity decay over {} cycles", result.predicted_cycles),
                ("sans-serif", 20),
            )
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(0u64..max_cycle, 0f64..100f64)
            .map_err(chart_error)?;

        chart
            .configure_mesh()
            .x_desc("Cycle")
            .y_desc("%")
            .draw()
            .map_err(chart_error)?;

        chart
            .draw_series(LineSeries::new(
                result.curve.iter().map(|p| (p.cycle, p.capacity_pct)),
                CAPACITY.stroke_width(2),
            ))
            .map_err(chart_error)?
            .label("Capacity (%)")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], CAPACITY));

        chart
            .draw_series(LineSeries::new(
                result.curve.iter().map(|p| (p.cycle, p.efficiency_pct)),
                EFFICIENCY.stroke_width(2),
            ))
            .map_err(chart_error)?
            .label("Efficiency (%)")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], EFFICIENCY));

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(chart_error)?;

        root.present().map_err(chart_error)?;
    }

    Ok(svg)
}

/// Render the chart as a base64 SVG data URI.
pub fn chart_data_uri(
    result: &SimulationResult,
    width: u32,
    height: u32,
) -> Result<String, ExportError> {
    let svg = render_chart_svg(result, width, height)?;
    Ok(format!("data:image/svg+xml;base64,{}", STANDARD.encode(svg)))
}
