//! Per-calculation policy inputs
//!
//! A [`PolicyContext`] is owned by the caller and passed by reference into
//! every calculation. Resetting a calculation means building a fresh default
//! context; nothing is cached between calls.

use crate::errors::{FuelEUError, FuelEUResult};
use crate::parameters::RegulationParameters;
use serde::{Deserialize, Serialize};

/// Global warming potential set used to weight CH4 and N2O against CO2.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum GwpStandard {
    /// IPCC AR4 100-year values (CH4 25, N2O 298), as listed in the FuelEU annex
    #[default]
    #[serde(rename = "AR4")]
    Ar4,
    /// IPCC AR5 100-year values (CH4 28, N2O 265)
    #[serde(rename = "AR5")]
    Ar5,
    /// IPCC AR6 100-year values (CH4 29.8, N2O 273)
    ///
    /// Some tools label this pair "AR5"; the AR5 values are 28 and 265.
    #[serde(rename = "AR6")]
    Ar6,
    /// Caller-supplied weights
    #[serde(rename = "custom")]
    Custom { ch4: f64, n2o: f64 },
}

impl GwpStandard {
    /// CO2-equivalent weight of one gram of CH4
    pub fn ch4(&self) -> f64 {
        match self {
            GwpStandard::Ar4 => 25.0,
            GwpStandard::Ar5 => 28.0,
            GwpStandard::Ar6 => 29.8,
            GwpStandard::Custom { ch4, .. } => *ch4,
        }
    }

    /// CO2-equivalent weight of one gram of N2O
    pub fn n2o(&self) -> f64 {
        match self {
            GwpStandard::Ar4 => 298.0,
            GwpStandard::Ar5 => 265.0,
            GwpStandard::Ar6 => 273.0,
            GwpStandard::Custom { n2o, .. } => *n2o,
        }
    }
}

/// Which tank-to-wake greenhouse gases are counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GhgScope {
    /// CO2, CH4 and N2O
    #[default]
    Full,
    /// CO2 only. Upstream (WtT) emissions are still counted.
    Co2Only,
}

/// Policy toggles for a single compliance calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyContext {
    /// Reporting period the fuel was consumed in
    pub compliance_year: i32,
    pub gwp: GwpStandard,
    pub scope: GhgScope,
    /// Fraction of combustion CO2 avoided by onshore power supply.
    ///
    /// Must lie within `[0, max_ops_reward]` of the regulation parameters.
    pub ops_reward_fraction: f64,
    /// Multiplicative wind-assisted propulsion factor: 1.0 means no reward.
    pub wind_reward_factor: f64,
    /// Number of immediately preceding reporting periods that also ended in deficit
    pub consecutive_deficit_periods: u32,
}

impl Default for PolicyContext {
    fn default() -> Self {
        Self {
            compliance_year: 2025,
            gwp: GwpStandard::default(),
            scope: GhgScope::default(),
            ops_reward_fraction: 0.0,
            wind_reward_factor: 1.0,
            consecutive_deficit_periods: 0,
        }
    }
}

impl PolicyContext {
    /// Default policy for a given compliance year
    pub fn for_year(compliance_year: i32) -> Self {
        Self {
            compliance_year,
            ..Self::default()
        }
    }

    /// Combined attenuation applied to combustion CO2.
    ///
    /// The two rewards compose multiplicatively.
    pub fn co2_reward_multiplier(&self) -> f64 {
        (1.0 - self.ops_reward_fraction) * self.wind_reward_factor
    }

    /// Check the context against the regulation before any calculation runs
    pub fn validate(&self, parameters: &RegulationParameters) -> FuelEUResult<()> {
        if !parameters.covers_year(self.compliance_year) {
            return Err(FuelEUError::UnsupportedYear {
                year: self.compliance_year,
                first: parameters.first_covered_year,
                last: parameters.last_covered_year,
            });
        }

        if !(0.0..=parameters.max_ops_reward).contains(&self.ops_reward_fraction) {
            return Err(FuelEUError::RewardOutOfRange {
                reward: "ops_reward_fraction",
                value: self.ops_reward_fraction,
                min: 0.0,
                max: parameters.max_ops_reward,
            });
        }

        // A zero factor would erase combustion CO2 entirely
        if !(self.wind_reward_factor > 0.0 && self.wind_reward_factor <= 1.0) {
            return Err(FuelEUError::RewardOutOfRange {
                reward: "wind_reward_factor",
                value: self.wind_reward_factor,
                min: 0.0,
                max: 1.0,
            });
        }

        let (ch4, n2o) = (self.gwp.ch4(), self.gwp.n2o());
        if !(ch4.is_finite() && n2o.is_finite() && ch4 >= 0.0 && n2o >= 0.0) {
            return Err(FuelEUError::InvalidParameters(format!(
                "GWP weights must be finite and non-negative, got CH4={ch4}, N2O={n2o}"
            )));
        }

        Ok(())
    }
}
