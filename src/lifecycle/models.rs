//! Data types for battery lifecycle simulation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::decay::DecayError;

/// Battery chemistry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Chemistry {
    LiIon,
    LiPo,
    #[serde(rename = "nimh")]
    NiMh,
    PbAcid,
}

impl Chemistry {
    pub const ALL: [Chemistry; 4] = [
        Chemistry::LiIon,
        Chemistry::LiPo,
        Chemistry::NiMh,
        Chemistry::PbAcid,
    ];

    /// Rated cycle life at 25°C, 100% DoD and 1C.
    pub const fn base_cycles(self) -> u32 {
        match self {
            Self::LiIon => 1500,
            Self::LiPo => 1200,
            Self::NiMh => 800,
            Self::PbAcid => 500,
        }
    }

    /// Wire key, as accepted by the API.
    pub const fn key(self) -> &'static str {
        match self {
            Self::LiIon => "li-ion",
            Self::LiPo => "li-po",
            Self::NiMh => "nimh",
            Self::PbAcid => "pb-acid",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::LiIon => "Li-ion",
            Self::LiPo => "Li-Po",
            Self::NiMh => "NiMH",
            Self::PbAcid => "Pb-Acid",
        }
    }
}

impl fmt::Display for Chemistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Chemistry {
    type Err = DecayError;

    /// Accepts wire keys and display labels, ignoring case and `_`/`-`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .map(|c| c.to_ascii_lowercase())
            .collect();

        match normalized.as_str() {
            "liion" => Ok(Self::LiIon),
            "lipo" => Ok(Self::LiPo),
            "nimh" => Ok(Self::NiMh),
            "pbacid" => Ok(Self::PbAcid),
            _ => Err(DecayError::InvalidChemistry(s.to_string())),
        }
    }
}

/// Operating conditions for one simulation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimulationInput {
    pub chemistry: Chemistry,
    /// Ambient temperature in °C
    pub temperature_c: f64,
    /// Depth of discharge per cycle in percent
    pub depth_of_discharge_pct: f64,
    /// Charge rate in C
    pub charge_rate_c: f64,
}

/// One sampled point of the decay curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurvePoint {
    pub cycle: u64,
    /// Remaining capacity in percent of rated
    pub capacity_pct: f64,
    /// Round-trip efficiency in percent
    pub efficiency_pct: f64,
}

/// Output of the decay model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationResult {
    pub predicted_cycles: u64,
    pub curve: Vec<CurvePoint>,
}

impl SimulationResult {
    /// Last sampled point. The model never produces an empty curve.
    pub fn last_point(&self) -> Option<&CurvePoint> {
        self.curve.last()
    }
}

/// Request payload for a simulation, used by both JSON body and query string.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimulationRequest {
    pub chemistry: String,
    #[serde(default = "default_temperature_c")]
    pub temperature_c: f64,
    #[serde(default = "default_depth_of_discharge_pct")]
    pub depth_of_discharge_pct: f64,
    #[serde(default = "default_charge_rate_c")]
    pub charge_rate_c: f64,
}

pub(crate) fn default_temperature_c() -> f64 {
    25.0
}

pub(crate) fn default_depth_of_discharge_pct() -> f64 {
    80.0
}

pub(crate) fn default_charge_rate_c() -> f64 {
    1.0
}

/// Chemistry listing entry.
#[derive(Debug, Serialize)]
pub struct ChemistryInfo {
    pub key: &'static str,
    pub label: &'static str,
    pub base_cycles: u32,
}

impl From<Chemistry> for ChemistryInfo {
    fn from(chemistry: Chemistry) -> Self {
        Self {
            key: chemistry.key(),
            label: chemistry.label(),
            base_cycles: chemistry.base_cycles(),
        }
    }
}

/// Figures derived from a result for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LifecycleMetrics {
    pub base_cycles: u32,
    pub temperature_factor: f64,
    pub dod_factor: f64,
    pub charge_factor: f64,
    /// Cycle at which capacity falls to 80%
    pub cycles_to_80pct: u64,
    pub final_capacity_pct: f64,
    pub final_efficiency_pct: f64,
    /// Interpretation guide
    pub notes: Vec<String>,
}

/// Response payload from a simulation.
#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub tool: &'static str,
    pub tool_version: &'static str,
    pub input: SimulationInput,
    pub predicted_cycles: u64,
    pub curve: Vec<CurvePoint>,
    pub metrics: LifecycleMetrics,
    /// SHA256 hash of input
    pub input_hash: String,
}
