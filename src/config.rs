use crate::analysis::AnalysisConfig;
use crate::domain::PhysicalBounds;
use crate::kriging::KrigingConfig;
use crate::simulation::MonteCarloConfig;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub io: IoConfig,
    pub analysis: AnalysisConfig,
    pub kriging: KrigingConfig,
    pub monte_carlo: MonteCarloConfig,
    pub bounds: PhysicalBounds,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IoConfig {
    pub conductor_path: PathBuf,
    pub route_path: PathBuf,
    pub stations_path: PathBuf,
    pub output_path: PathBuf,
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            conductor_path: PathBuf::from("input/conductor.json"),
            route_path: PathBuf::from("input/route.csv"),
            stations_path: PathBuf::from("input/stations.csv"),
            output_path: PathBuf::from("output/hourly_results.csv"),
        }
    }
}

impl Config {
    /// Layered load: `config/default.toml` overridden by `LTR__`-prefixed
    /// environment variables (e.g. `LTR__MONTE_CARLO__ITERATIONS=2000`).
    pub fn load() -> Result<Self> {
        let figment = Figment::new()
            .merge(Toml::file("config/default.toml"))
            .merge(Env::prefixed("LTR__").split("__"));
        Ok(figment.extract()?)
    }
}
