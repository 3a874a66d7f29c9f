//! Runtime configuration from environment variables.

use std::env;
use std::str::FromStr;

use anyhow::{ensure, Context};

use crate::lifecycle::CHART_SIDE_RANGE;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub chart_width: u32,
    pub chart_height: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            chart_width: 800,
            chart_height: 400,
        }
    }
}

impl Config {
    /// Read `BIND_ADDR`, `CHART_WIDTH` and `CHART_HEIGHT`, falling back to defaults.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let chart_width = parse_or(&lookup, "CHART_WIDTH", defaults.chart_width)?;
        let chart_height = parse_or(&lookup, "CHART_HEIGHT", defaults.chart_height)?;

        for (key, value) in [("CHART_WIDTH", chart_width), ("CHART_HEIGHT", chart_height)] {
            ensure!(
                CHART_SIDE_RANGE.contains(&value),
                "{key} must be between {} and {} pixels, got {value}",
                CHART_SIDE_RANGE.start(),
                CHART_SIDE_RANGE.end()
            );
        }

        Ok(Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            chart_width,
            chart_height,
        })
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid {key}: {raw:?}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.chart_width, 800);
        assert_eq!(config.chart_height, 400);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("BIND_ADDR", "127.0.0.1:9000"),
            ("CHART_WIDTH", " 1024 "),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:9000");
        assert_eq!(config.chart_width, 1024);
        assert_eq!(config.chart_height, 400);
    }

    #[test]
    fn test_chart_size_out_of_bounds() {
        let err = Config::from_lookup(lookup_from(&[("CHART_WIDTH", "0")])).unwrap_err();
        assert!(err.to_string().contains("CHART_WIDTH must be between 64 and 4096"));

        let err = Config::from_lookup(lookup_from(&[("CHART_HEIGHT", "100000")])).unwrap_err();
        assert!(err.to_string().contains("CHART_HEIGHT"));

        let config = Config::from_lookup(lookup_from(&[
            ("CHART_WIDTH", "64"),
            ("CHART_HEIGHT", "4096"),
        ]))
        .unwrap();
        assert_eq!((config.chart_width, config.chart_height), (64, 4096));
    }

    #[test]
    fn test_invalid_number() {
        let err = Config::from_lookup(lookup_from(&[("CHART_HEIGHT", "tall")])).unwrap_err();
        assert!(err.to_string().contains("CHART_HEIGHT"));
    }
}
