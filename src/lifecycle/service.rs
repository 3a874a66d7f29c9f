//! Request validation and orchestration around the decay model.

use std::ops::RangeInclusive;

use crate::error::{AppError, Result};

use super::decay::{input_hash, predict};
use super::models::{
    Chemistry, LifecycleMetrics, PredictResponse, SimulationInput, SimulationRequest,
    SimulationResult,
};

pub const TEMPERATURE_RANGE_C: RangeInclusive<f64> = -10.0..=60.0;
pub const DOD_RANGE_PCT: RangeInclusive<f64> = 10.0..=100.0;
pub const CHARGE_RATE_RANGE_C: RangeInclusive<f64> = 0.2..=2.0;

/// A completed simulation with its derived figures.
#[derive(Debug, Clone)]
pub struct Simulation {
    pub input: SimulationInput,
    pub result: SimulationResult,
    pub metrics: LifecycleMetrics,
    pub input_hash: String,
}

impl From<Simulation> for PredictResponse {
    fn from(simulation: Simulation) -> Self {
        Self {
            tool: "battery-life-sim",
            tool_version: env!("CARGO_PKG_VERSION"),
            input: simulation.input,
            predicted_cycles: simulation.result.predicted_cycles,
            curve: simulation.result.curve,
            metrics: simulation.metrics,
            input_hash: simulation.input_hash,
        }
    }
}

/// Check the request against the calculator's input bounds and parse it.
pub fn validate_request(request: &SimulationRequest) -> Result<SimulationInput> {
    let chemistry: Chemistry = request.chemistry.parse()?;

    check_range("temperature_c", request.temperature_c, &TEMPERATURE_RANGE_C)?;
    check_range(
        "depth_of_discharge_pct",
        request.depth_of_discharge_pct,
        &DOD_RANGE_PCT,
    )?;
    check_range("charge_rate_c", request.charge_rate_c, &CHARGE_RATE_RANGE_C)?;

    Ok(SimulationInput {
        chemistry,
        temperature_c: request.temperature_c,
        depth_of_discharge_pct: request.depth_of_discharge_pct,
        charge_rate_c: request.charge_rate_c,
    })
}

/// Validate, predict and summarize.
pub fn simulate(request: &SimulationRequest) -> Result<Simulation> {
    let input = validate_request(request)?;
    let result = predict(&input)?;
    let metrics = LifecycleMetrics::from_result(&input, &result)?;

    tracing::debug!(
        chemistry = %input.chemistry,
        predicted_cycles = result.predicted_cycles,
        points = result.curve.len(),
        "Simulation complete"
    );

    Ok(Simulation {
        input_hash: input_hash(&input),
        input,
        result,
        metrics,
    })
}

fn check_range(field: &'static str, value: f64, range: &RangeInclusive<f64>) -> Result<()> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(AppError::OutOfRange {
            field,
            min: *range.start(),
            max: *range.end(),
            value,
        })
    }
}
