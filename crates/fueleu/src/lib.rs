//! FuelEU Maritime compliance calculator
//!
//! Re-exports the core calculations and the mitigation searches, and loads a
//! single TOML configuration covering both:
//!
//! ```toml
//! [regulation]
//! penalty_rate_eur_per_tonne = 2400.0
//!
//! [search]
//! max_iterations = 60
//!
//! [[fuel]]
//! name = "Heavy Fuel Oil (HFO)"
//! lcv = 0.0405
//! wtt = 13.5
//! ttw_co2 = 3.114
//! ttw_ch4 = 0.00005
//! ttw_n2o = 0.00018
//! ```
//!
//! Omitted tables fall back to the regulation defaults, and an empty fuel list
//! means the reference fuels.

pub use fueleu_core;
pub use fueleu_mitigation;

#[cfg(feature = "python")]
mod python;

use fueleu_core::compliance::ComplianceCalculator;
use fueleu_core::errors::{FuelEUError, FuelEUResult};
use fueleu_core::fuel::{FuelRecord, FuelRegistry};
use fueleu_core::parameters::RegulationParameters;
use fueleu_mitigation::{MitigationSearch, SearchParameters};
use log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub regulation: RegulationParameters,
    pub search: SearchParameters,
    pub fuel: Vec<FuelRecord>,
}

impl Config {
    pub fn from_toml_str(document: &str) -> FuelEUResult<Self> {
        let config: Self = toml::from_str(document)?;
        config.regulation.validate()?;
        config.search.validate()?;
        Ok(config)
    }

    /// Read and validate a configuration file
    pub fn from_path<P: AsRef<Path>>(path: P) -> FuelEUResult<Self> {
        let path = path.as_ref();
        let document = std::fs::read_to_string(path).map_err(|e| {
            FuelEUError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&document)?;
        info!(
            "Loaded configuration from {} ({} custom fuels)",
            path.display(),
            config.fuel.len()
        );
        Ok(config)
    }

    /// The configured fuels, or the reference fuels when none are given
    pub fn registry(&self) -> FuelEUResult<FuelRegistry> {
        if self.fuel.is_empty() {
            Ok(FuelRegistry::reference())
        } else {
            FuelRegistry::from_records(self.fuel.clone())
        }
    }

    pub fn calculator(&self) -> FuelEUResult<ComplianceCalculator> {
        ComplianceCalculator::from_parameters(self.regulation.clone())
    }

    pub fn search(&self) -> FuelEUResult<MitigationSearch> {
        MitigationSearch::new(self.calculator()?, self.search.clone())
    }
}
