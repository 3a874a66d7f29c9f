//! Battery lifecycle simulation module.
//!
//! Exposes the cycle-life decay model, its summary metrics and CSV/SVG
//! exports as HTTP endpoints.

mod decay;
mod export;
mod metrics;
mod models;
mod routes;
mod service;

pub use decay::DecayError;
pub use export::{chart_data_uri, ExportError, CHART_SIDE_RANGE};
pub use models::{Chemistry, SimulationRequest};
pub(crate) use models::{
    default_charge_rate_c, default_depth_of_discharge_pct, default_temperature_c,
};
pub use routes::router;
pub use service::{simulate, Simulation, CHARGE_RATE_RANGE_C, DOD_RANGE_PCT, TEMPERATURE_RANGE_C};
