//! Interactive simulator page route handler

use askama::Template;
use axum::{
    extract::{Query, State},
    response::Html,
};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::lifecycle::{
    chart_data_uri, default_charge_rate_c, default_depth_of_discharge_pct, default_temperature_c,
    simulate, Chemistry, Simulation, SimulationRequest, CHARGE_RATE_RANGE_C, DOD_RANGE_PCT,
    TEMPERATURE_RANGE_C,
};
use crate::AppState;

/// Page query as submitted by the form. Fields stay raw text so that blank or
/// malformed numbers reach the handler instead of failing extraction.
#[derive(Debug, Default, Deserialize)]
pub struct SimulatorQuery {
    chemistry: Option<String>,
    temperature_c: Option<String>,
    depth_of_discharge_pct: Option<String>,
    charge_rate_c: Option<String>,
}

/// Form values echoed back into the inputs; blanks replaced by defaults.
struct FormValues {
    chemistry: String,
    temperature_c: String,
    depth_of_discharge_pct: String,
    charge_rate_c: String,
}

impl SimulatorQuery {
    fn into_form(self) -> FormValues {
        FormValues {
            chemistry: filled(self.chemistry, || Chemistry::LiIon.key().to_string()),
            temperature_c: filled(self.temperature_c, || default_temperature_c().to_string()),
            depth_of_discharge_pct: filled(self.depth_of_discharge_pct, || {
                default_depth_of_discharge_pct().to_string()
            }),
            charge_rate_c: filled(self.charge_rate_c, || default_charge_rate_c().to_string()),
        }
    }
}

impl FormValues {
    fn to_request(&self) -> std::result::Result<SimulationRequest, String> {
        Ok(SimulationRequest {
            chemistry: self.chemistry.clone(),
            temperature_c: parse_number("temperature_c", &self.temperature_c)?,
            depth_of_discharge_pct: parse_number(
                "depth_of_discharge_pct",
                &self.depth_of_discharge_pct,
            )?,
            charge_rate_c: parse_number("charge_rate_c", &self.charge_rate_c)?,
        })
    }
}

fn filled<F>(raw: Option<String>, default: F) -> String
where
    F: FnOnce() -> String,
{
    match raw {
        Some(value) if !value.trim().is_empty() => value.trim().to_string(),
        _ => default(),
    }
}

fn parse_number(field: &str, raw: &str) -> std::result::Result<f64, String> {
    raw.parse()
        .map_err(|_| format!("{field} must be a number, got {raw:?}"))
}

struct ChemistryOption {
    key: &'static str,
    label: &'static str,
    base_cycles: u32,
    selected: bool,
}

struct Bounds {
    min: f64,
    max: f64,
}

/// Rendered figures for a successful simulation
struct Outcome {
    chemistry: String,
    predicted_cycles: String,
    cycles_to_80pct: String,
    final_capacity: String,
    final_efficiency: String,
    temperature_factor: String,
    dod_factor: String,
    charge_factor: String,
    chart_data: String,
    csv_url: String,
    notes: Vec<String>,
}

/// Simulator page template
#[derive(Template)]
#[template(path = "simulator.html")]
struct SimulatorTemplate {
    chemistries: Vec<ChemistryOption>,
    temperature_c: String,
    depth_of_discharge_pct: String,
    charge_rate_c: String,
    temperature_bounds: Bounds,
    dod_bounds: Bounds,
    charge_rate_bounds: Bounds,
    outcome: Option<Outcome>,
    error: Option<String>,
}

/// Simulator page handler
pub async fn page(
    State(state): State<AppState>,
    Query(query): Query<SimulatorQuery>,
) -> Result<Html<String>> {
    let form = query.into_form();

    let (outcome, error) = match form.to_request() {
        Ok(request) => match simulate(&request) {
            Ok(simulation) => {
                let chart_data = chart_data_uri(
                    &simulation.result,
                    state.config.chart_width,
                    state.config.chart_height,
                )?;
                (Some(outcome_for(simulation, chart_data)), None)
            }
            Err(e @ (AppError::Decay(_) | AppError::OutOfRange { .. })) => {
                tracing::info!("Simulator input rejected: {}", e);
                (None, Some(e.to_string()))
            }
            Err(e) => return Err(e),
        },
        Err(message) => {
            tracing::info!("Simulator input rejected: {}", message);
            (None, Some(message))
        }
    };

    let selected = form.chemistry.parse::<Chemistry>().ok();
    let template = SimulatorTemplate {
        chemistries: Chemistry::ALL
            .into_iter()
            .map(|c| ChemistryOption {
                key: c.key(),
                label: c.label(),
                base_cycles: c.base_cycles(),
                selected: Some(c) == selected,
            })
            .collect(),
        temperature_c: form.temperature_c,
        depth_of_discharge_pct: form.depth_of_discharge_pct,
        charge_rate_c: form.charge_rate_c,
        temperature_bounds: bounds(&TEMPERATURE_RANGE_C),
        dod_bounds: bounds(&DOD_RANGE_PCT),
        charge_rate_bounds: bounds(&CHARGE_RATE_RANGE_C),
        outcome,
        error,
    };

    Ok(Html(template.render()?))
}

fn bounds(range: &std::ops::RangeInclusive<f64>) -> Bounds {
    Bounds {
        min: *range.start(),
        max: *range.end(),
    }
}

fn outcome_for(simulation: Simulation, chart_data: String) -> Outcome {
    let Simulation { input, result, metrics, .. } = simulation;

    Outcome {
        chemistry: input.chemistry.label().to_string(),
        predicted_cycles: group_thousands(result.predicted_cycles),
        cycles_to_80pct: group_thousands(metrics.cycles_to_80pct),
        final_capacity: format!("{:.1}%", metrics.final_capacity_pct),
        final_efficiency: format!("{:.1}%", metrics.final_efficiency_pct),
        temperature_factor: format!("{:.3}", metrics.temperature_factor),
        dod_factor: format!("{:.3}", metrics.dod_factor),
        charge_factor: format!("{:.3}", metrics.charge_factor),
        chart_data,
        csv_url: format!(
            "/api/lifecycle/export.csv?chemistry={}&temperature_c={}&depth_of_discharge_pct={}&charge_rate_c={}",
            input.chemistry.key(),
            input.temperature_c,
            input.depth_of_discharge_pct,
            input.charge_rate_c
        ),
        notes: metrics.notes,
    }
}

/// Format an integer with `,` thousands separators.
fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
