//! Regulation parameters
//!
//! Constants of the FuelEU Maritime regulation that the calculations depend on.
//! The defaults follow Regulation (EU) 2023/1805; any of them can be
//! overridden from a TOML document to model amendments or sensitivity cases.

use crate::errors::{FuelEUError, FuelEUResult};
use serde::{Deserialize, Serialize};

/// A point in the GHG intensity reduction schedule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReductionMilestone {
    /// First year the reduction applies
    pub year: i32,
    /// Reduction as a fraction of the reference intensity
    pub reduction: f64,
}

impl ReductionMilestone {
    pub const fn new(year: i32, reduction: f64) -> Self {
        Self { year, reduction }
    }
}

/// Parameters of the regulation.
///
/// The target intensity for a year is
///
/// $$I_{target}(y) = I_{ref} \cdot (1 - r(y))$$
///
/// where $r(y)$ is a step function over `reduction_schedule`, linearly
/// interpolated between the final two milestones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegulationParameters {
    /// Reference GHG intensity (2020 fleet average)
    /// unit: gCO2eq/MJ
    /// default: 91.16
    pub reference_intensity: f64,

    /// Milestones in ascending year order with non-decreasing reductions
    pub reduction_schedule: Vec<ReductionMilestone>,

    /// First reporting year the calculator accepts
    /// default: 2020
    pub first_covered_year: i32,

    /// Last reporting year the calculator accepts
    /// default: 2050
    pub last_covered_year: i32,

    /// First year RFNBO energy is credited with `rfnbo_multiplier`
    /// default: 2025
    pub rfnbo_window_start: i32,

    /// Last year (inclusive) of the RFNBO credit
    /// default: 2033
    pub rfnbo_window_end: i32,

    /// Multiplier applied to counted RFNBO energy inside the window
    /// default: 2.0
    pub rfnbo_multiplier: f64,

    /// Penalty per tonne of VLSFO-equivalent energy deficit
    /// unit: EUR/t
    /// default: 2400
    pub penalty_rate_eur_per_tonne: f64,

    /// Energy content of the reference fuel (VLSFO) used to convert a deficit to tonnes
    /// unit: MJ/t
    /// default: 41000
    pub reference_energy_mj_per_tonne: f64,

    /// Upper bound accepted for the onshore power supply reward fraction
    /// default: 0.20
    pub max_ops_reward: f64,

    /// Penalty increase per preceding consecutive deficit period
    /// default: 0.10
    pub penalty_escalation: f64,
}

impl Default for RegulationParameters {
    fn default() -> Self {
        Self {
            reference_intensity: 91.16,
            reduction_schedule: vec![
                ReductionMilestone::new(2025, 0.02),
                ReductionMilestone::new(2030, 0.06),
                ReductionMilestone::new(2035, 0.145),
                ReductionMilestone::new(2040, 0.31),
                ReductionMilestone::new(2045, 0.62),
                ReductionMilestone::new(2050, 0.80),
            ],
            first_covered_year: 2020,
            last_covered_year: 2050,
            rfnbo_window_start: 2025,
            rfnbo_window_end: 2033,
            rfnbo_multiplier: 2.0,
            penalty_rate_eur_per_tonne: 2400.0,
            reference_energy_mj_per_tonne: 41_000.0,
            max_ops_reward: 0.20,
            penalty_escalation: 0.10,
        }
    }
}

impl RegulationParameters {
    /// Parse and validate parameters from a TOML document
    pub fn from_toml_str(document: &str) -> FuelEUResult<Self> {
        let parameters: Self = toml::from_str(document)?;
        parameters.validate()?;
        Ok(parameters)
    }

    pub fn covers_year(&self, year: i32) -> bool {
        (self.first_covered_year..=self.last_covered_year).contains(&year)
    }

    pub fn rfnbo_window_contains(&self, year: i32) -> bool {
        (self.rfnbo_window_start..=self.rfnbo_window_end).contains(&year)
    }

    /// Reject parameter sets that would make the target function non-monotonic
    /// or the penalty formula meaningless.
    pub fn validate(&self) -> FuelEUResult<()> {
        let invalid = |msg: String| Err(FuelEUError::InvalidParameters(msg));

        if !(self.reference_intensity.is_finite() && self.reference_intensity > 0.0) {
            return invalid(format!(
                "reference_intensity must be positive, got {}",
                self.reference_intensity
            ));
        }
        if self.reduction_schedule.is_empty() {
            return invalid("reduction_schedule must not be empty".to_string());
        }
        for milestone in &self.reduction_schedule {
            if !(0.0..=1.0).contains(&milestone.reduction) {
                return invalid(format!(
                    "reduction for {} must lie within [0, 1], got {}",
                    milestone.year, milestone.reduction
                ));
            }
        }
        for pair in self.reduction_schedule.windows(2) {
            if pair[1].year <= pair[0].year || pair[1].reduction < pair[0].reduction {
                return invalid(format!(
                    "reduction_schedule must be strictly ascending in year and non-decreasing in reduction ({} -> {})",
                    pair[0].year, pair[1].year
                ));
            }
        }
        if self.first_covered_year > self.last_covered_year {
            return invalid(format!(
                "first_covered_year {} is after last_covered_year {}",
                self.first_covered_year, self.last_covered_year
            ));
        }
        if self.rfnbo_window_start > self.rfnbo_window_end {
            return invalid(format!(
                "rfnbo_window_start {} is after rfnbo_window_end {}",
                self.rfnbo_window_start, self.rfnbo_window_end
            ));
        }
        if !(self.rfnbo_multiplier.is_finite() && self.rfnbo_multiplier >= 1.0) {
            return invalid(format!(
                "rfnbo_multiplier must be at least 1, got {}",
                self.rfnbo_multiplier
            ));
        }
        if !(self.penalty_rate_eur_per_tonne.is_finite() && self.penalty_rate_eur_per_tonne >= 0.0)
        {
            return invalid(format!(
                "penalty_rate_eur_per_tonne must be non-negative, got {}",
                self.penalty_rate_eur_per_tonne
            ));
        }
        if !(self.reference_energy_mj_per_tonne.is_finite()
            && self.reference_energy_mj_per_tonne > 0.0)
        {
            return invalid(format!(
                "reference_energy_mj_per_tonne must be positive, got {}",
                self.reference_energy_mj_per_tonne
            ));
        }
        if !(0.0..=1.0).contains(&self.max_ops_reward) {
            return invalid(format!(
                "max_ops_reward must lie within [0, 1], got {}",
                self.max_ops_reward
            ));
        }
        if !(self.penalty_escalation.is_finite() && self.penalty_escalation >= 0.0) {
            return invalid(format!(
                "penalty_escalation must be non-negative, got {}",
                self.penalty_escalation
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_parameters() {
        let params = RegulationParameters::default();
        assert!((params.reference_intensity - 91.16).abs() < 1e-10);
        assert!((params.penalty_rate_eur_per_tonne - 2400.0).abs() < 1e-10);
        assert!((params.reference_energy_mj_per_tonne - 41_000.0).abs() < 1e-10);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_rfnbo_window_bounds_inclusive() {
        let params = RegulationParameters::default();
        assert!(!params.rfnbo_window_contains(2024));
        assert!(params.rfnbo_window_contains(2025));
        assert!(params.rfnbo_window_contains(2033));
        assert!(!params.rfnbo_window_contains(2034));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let params = RegulationParameters::from_toml_str("penalty_rate_eur_per_tonne = 3000.0")
            .unwrap();
        assert!((params.penalty_rate_eur_per_tonne - 3000.0).abs() < 1e-10);
        assert_eq!(params.reduction_schedule.len(), 6);
    }

    #[test]
    fn test_rejects_decreasing_schedule() {
        let params = RegulationParameters {
            reduction_schedule: vec![
                ReductionMilestone::new(2025, 0.06),
                ReductionMilestone::new(2030, 0.02),
            ],
            ..RegulationParameters::default()
        };
        assert!(matches!(
            params.validate(),
            Err(FuelEUError::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let result = RegulationParameters::from_toml_str("reference_intensity = \"high\"");
        assert!(matches!(result, Err(FuelEUError::Config(_))));
    }
}
