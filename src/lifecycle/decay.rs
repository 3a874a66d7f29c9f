//! Cycle-life decay model.
//!
//! Three multiplicative stress factors scale the chemistry's rated cycle life;
//! capacity then decays exponentially, reaching `100 * e^-5` at the predicted
//! end of life.

use sha2::{Digest, Sha256};
use thiserror::Error;

use super::models::{CurvePoint, SimulationInput, SimulationResult};

/// Reference temperature at which the temperature factor is 1.
const REFERENCE_TEMPERATURE_C: f64 = 25.0;
const TEMPERATURE_COEFFICIENT: f64 = 0.05;
const DOD_EXPONENT: f64 = 1.3;
const CHARGE_RATE_COEFFICIENT: f64 = 0.3;

/// Number of capacity time constants spanned by the predicted life.
const DECAY_TIME_CONSTANTS: f64 = 5.0;
/// Share of capacity loss that shows up as efficiency loss.
const EFFICIENCY_LOSS_RATIO: f64 = 0.7;
/// Target number of sampling intervals along the curve.
const CURVE_INTERVALS: u64 = 100;

/// Decay model error types.
#[derive(Debug, Error, PartialEq)]
pub enum DecayError {
    #[error("unknown battery chemistry: {0:?}")]
    InvalidChemistry(String),
    #[error("depth of discharge must be a positive percentage, got {0}")]
    InvalidDepthOfDischarge(f64),
    #[error("charge rate {0} makes the charge factor non-positive (must exceed -7/3 C)")]
    InvalidChargeRate(f64),
    #[error("conditions yield no usable cycles (raw estimate {0})")]
    DegenerateResult(f64),
}

/// The three stress factors applied to the base cycle life.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StressFactors {
    pub temperature: f64,
    pub depth_of_discharge: f64,
    pub charge_rate: f64,
}

impl StressFactors {
    /// Compute the factors, rejecting inputs that would divide by zero.
    pub fn for_input(input: &SimulationInput) -> Result<Self, DecayError> {
        let dod = input.depth_of_discharge_pct;
        if !dod.is_finite() || dod <= 0.0 {
            return Err(DecayError::InvalidDepthOfDischarge(dod));
        }

        let charge_denominator = 1.0 + CHARGE_RATE_COEFFICIENT * (input.charge_rate_c - 1.0);
        if !charge_denominator.is_finite() || charge_denominator <= 0.0 {
            return Err(DecayError::InvalidChargeRate(input.charge_rate_c));
        }

        Ok(Self {
            temperature: (-TEMPERATURE_COEFFICIENT * (input.temperature_c - REFERENCE_TEMPERATURE_C))
                .exp(),
            depth_of_discharge: (100.0 / dod).powf(DOD_EXPONENT),
            charge_rate: 1.0 / charge_denominator,
        })
    }
}

/// Predict cycle life and sample the capacity/efficiency curve.
pub fn predict(input: &SimulationInput) -> Result<SimulationResult, DecayError> {
    let factors = StressFactors::for_input(input)?;

    let raw = f64::from(input.chemistry.base_cycles())
        * factors.temperature
        * factors.depth_of_discharge
        * factors.charge_rate;

    if !raw.is_finite() || raw < 1.0 {
        return Err(DecayError::DegenerateResult(raw));
    }

    // Truncation toward zero; `raw >= 1` so this is a positive count.
    let predicted_cycles = raw as u64;

    Ok(SimulationResult {
        predicted_cycles,
        curve: sample_curve(predicted_cycles),
    })
}

/// Sampling stride for a curve over `predicted_cycles`.
pub fn curve_stride(predicted_cycles: u64) -> u64 {
    (predicted_cycles / CURVE_INTERVALS).max(1)
}

/// Capacity in percent after `cycle` cycles.
pub fn capacity_at(cycle: u64, predicted_cycles: u64) -> f64 {
    100.0 * (-(cycle as f64) / (predicted_cycles as f64 / DECAY_TIME_CONSTANTS)).exp()
}

/// Efficiency in percent for a given capacity.
pub fn efficiency_for(capacity_pct: f64) -> f64 {
    100.0 - (100.0 - capacity_pct) * EFFICIENCY_LOSS_RATIO
}

/// Cycle at which capacity first reaches `threshold_pct`.
pub fn cycles_to_capacity(threshold_pct: f64, predicted_cycles: u64) -> u64 {
    let time_constant = predicted_cycles as f64 / DECAY_TIME_CONSTANTS;
    (time_constant * (100.0 / threshold_pct).ln()).floor() as u64
}

fn sample_curve(predicted_cycles: u64) -> Vec<CurvePoint> {
    let stride = curve_stride(predicted_cycles);

    (0..=predicted_cycles)
        .step_by(stride as usize)
        .map(|cycle| {
            let capacity_pct = capacity_at(cycle, predicted_cycles);
            CurvePoint {
                cycle,
                capacity_pct,
                efficiency_pct: efficiency_for(capacity_pct),
            }
        })
        .collect()
}

/// Compute SHA256 fingerprint of an input.
pub fn input_hash(input: &SimulationInput) -> String {
    let canonical = serde_json::to_string(input).unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    format!("sha256:{}", hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::models::Chemistry;

    fn input(chemistry: Chemistry, temperature_c: f64, dod: f64, rate: f64) -> SimulationInput {
        SimulationInput {
            chemistry,
            temperature_c,
            depth_of_discharge_pct: dod,
            charge_rate_c: rate,
        }
    }

    #[test]
    fn test_reference_conditions_return_base_life() {
        for chemistry in Chemistry::ALL {
            let result = predict(&input(chemistry, 25.0, 100.0, 1.0)).unwrap();
            assert_eq!(result.predicted_cycles, u64::from(chemistry.base_cycles()));
        }
    }

    #[test]
    fn test_li_ion_typical_use() {
        let result = predict(&input(Chemistry::LiIon, 25.0, 80.0, 1.0)).unwrap();
        assert_eq!(result.predicted_cycles, 2004);
        assert_eq!(curve_stride(2004), 20);
        assert_eq!(result.curve.len(), 101);
        assert_eq!(result.curve.last().unwrap().cycle, 2000);
    }

    #[test]
    fn test_harsh_lead_acid() {
        let result = predict(&input(Chemistry::PbAcid, 60.0, 100.0, 2.0)).unwrap();
        assert_eq!(result.predicted_cycles, 66);
        // Stride 1 includes the end point
        assert_eq!(result.curve.len(), 67);
        assert_eq!(result.curve.last().unwrap().cycle, 66);
    }

    #[test]
    fn test_gentle_li_ion() {
        let result = predict(&input(Chemistry::LiIon, -10.0, 10.0, 0.2)).unwrap();
        assert_eq!(result.predicted_cycles, 226_617);
        assert_eq!(curve_stride(226_617), 2266);
        assert_eq!(result.curve.len(), 101);
        assert!(result.curve.iter().all(|p| p.cycle <= result.predicted_cycles));
    }

    #[test]
    fn test_temperature_monotonicity() {
        let at = |t: f64| predict(&input(Chemistry::LiPo, t, 80.0, 1.0)).unwrap().predicted_cycles;
        assert!(at(35.0) < at(25.0));
        assert!(at(60.0) < at(35.0));
        assert!(at(10.0) > at(25.0));
        assert!(at(-10.0) > at(10.0));
    }

    #[test]
    fn test_dod_monotonicity() {
        let at = |dod: f64| predict(&input(Chemistry::NiMh, 25.0, dod, 1.0)).unwrap().predicted_cycles;
        assert!(at(50.0) > at(80.0));
        assert!(at(20.0) > at(50.0));
    }

    #[test]
    fn test_charge_rate_shortens_life() {
        let at = |rate: f64| predict(&input(Chemistry::LiPo, 25.0, 100.0, rate)).unwrap().predicted_cycles;
        assert_eq!(at(2.0), 923);
        assert!(at(0.5) > at(1.0));
    }

    #[test]
    fn test_curve_shape() {
        let result = predict(&input(Chemistry::LiIon, 30.0, 70.0, 1.5)).unwrap();
        assert_eq!(result.curve[0].cycle, 0);
        assert_eq!(result.curve[0].capacity_pct, 100.0);
        assert_eq!(result.curve[0].efficiency_pct, 100.0);

        for pair in result.curve.windows(2) {
            assert!(pair[1].cycle > pair[0].cycle);
            assert!(pair[1].capacity_pct < pair[0].capacity_pct);
            assert!(pair[1].efficiency_pct < pair[0].efficiency_pct);
        }
        for point in &result.curve {
            assert_eq!(point.efficiency_pct, 100.0 - (100.0 - point.capacity_pct) * 0.7);
        }
    }

    #[test]
    fn test_zero_dod_rejected() {
        let result = predict(&input(Chemistry::LiIon, 25.0, 0.0, 1.0));
        assert_eq!(result, Err(DecayError::InvalidDepthOfDischarge(0.0)));
    }

    #[test]
    fn test_negative_and_nan_dod_rejected() {
        assert!(matches!(
            predict(&input(Chemistry::LiIon, 25.0, -5.0, 1.0)),
            Err(DecayError::InvalidDepthOfDischarge(_))
        ));
        assert!(matches!(
            predict(&input(Chemistry::LiIon, 25.0, f64::NAN, 1.0)),
            Err(DecayError::InvalidDepthOfDischarge(_))
        ));
    }

    #[test]
    fn test_charge_rate_pole_rejected() {
        assert_eq!(
            predict(&input(Chemistry::LiIon, 25.0, 80.0, -4.0)),
            Err(DecayError::InvalidChargeRate(-4.0))
        );
    }

    #[test]
    fn test_extreme_heat_is_degenerate() {
        let result = predict(&input(Chemistry::PbAcid, 500.0, 100.0, 2.0));
        assert!(matches!(result, Err(DecayError::DegenerateResult(raw)) if raw < 1.0));
    }

    #[test]
    fn test_non_finite_estimate_is_degenerate() {
        let result = predict(&input(Chemistry::LiIon, -20_000.0, 80.0, 1.0));
        assert!(matches!(result, Err(DecayError::DegenerateResult(_))));
    }

    #[test]
    fn test_prediction_is_deterministic() {
        let conditions = input(Chemistry::NiMh, 41.5, 63.0, 1.7);
        let first = predict(&conditions).unwrap();
        let second = predict(&conditions).unwrap();
        assert_eq!(first, second);
        assert_eq!(input_hash(&conditions), input_hash(&conditions));
    }

    #[test]
    fn test_cycles_to_80pct() {
        // (2004 / 5) * ln(1.25) = 89.44
        assert_eq!(cycles_to_capacity(80.0, 2004), 89);
        assert!(capacity_at(89, 2004) >= 80.0);
        assert!(capacity_at(90, 2004) < 80.0);
    }

    #[test]
    fn test_input_hash_format() {
        let hash = input_hash(&input(Chemistry::LiIon, 25.0, 80.0, 1.0));
        assert!(hash.starts_with("sha256:"));
        assert_eq!(hash.len(), 7 + 64);
        assert_ne!(hash, input_hash(&input(Chemistry::LiPo, 25.0, 80.0, 1.0)));
    }
}
