//! Summary figures and interpretation notes for a simulation.

use super::decay::{cycles_to_capacity, DecayError, StressFactors};
use super::models::{LifecycleMetrics, SimulationInput, SimulationResult};

const GENERAL_NOTES: [&str; 2] = [
    "Higher temperature, deeper discharge and faster charging all shorten battery life.",
    "This is a simplified illustration of experimental trends; real batteries may differ.",
];

impl LifecycleMetrics {
    pub fn from_result(
        input: &SimulationInput,
        result: &SimulationResult,
    ) -> Result<Self, DecayError> {
        let factors = StressFactors::for_input(input)?;
        let (final_capacity_pct, final_efficiency_pct) = result
            .last_point()
            .map(|p| (p.capacity_pct, p.efficiency_pct))
            .unwrap_or((100.0, 100.0));

        Ok(Self {
            base_cycles: input.chemistry.base_cycles(),
            temperature_factor: factors.temperature,
            dod_factor: factors.depth_of_discharge,
            charge_factor: factors.charge_rate,
            cycles_to_80pct: cycles_to_capacity(80.0, result.predicted_cycles),
            final_capacity_pct,
            final_efficiency_pct,
            notes: notes_for(input),
        })
    }
}

fn notes_for(input: &SimulationInput) -> Vec<String> {
    let mut notes: Vec<String> = GENERAL_NOTES.iter().map(|s| s.to_string()).collect();

    if input.temperature_c > 35.0 {
        notes.push(format!(
            "At {:.0}°C electrolyte breakdown accelerates; keep the pack below 35°C where possible.",
            input.temperature_c
        ));
    } else if input.temperature_c < 0.0 {
        notes.push(
            "Sub-zero operation slows aging in this model, but charging below 0°C risks lithium plating."
                .to_string(),
        );
    }
    if input.depth_of_discharge_pct > 80.0 {
        notes.push("Limiting depth of discharge to 80% or less noticeably extends cycle life.".to_string());
    }
    if input.charge_rate_c > 1.0 {
        notes.push(format!(
            "Charging at {:.1}C trades cycle life for speed; 1C or slower is gentler.",
            input.charge_rate_c
        ));
    }

    notes
}
