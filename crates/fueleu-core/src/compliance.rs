//! Compliance balance and penalty
//!
//! $$I = \frac{GHG}{E} \qquad CB = E \cdot (I_{target} - I)$$
//!
//! A negative balance is a deficit. The deficit is converted to tonnes of
//! VLSFO-equivalent energy and priced:
//!
//! $$P = \frac{|CB|}{I \cdot 41000} \cdot 2400 \cdot (1 + n \cdot 0.1)$$
//!
//! where $n$ is the number of preceding consecutive deficit periods.

use crate::emissions::{EmissionCalculator, FuelConsumption, FuelContribution};
use crate::errors::FuelEUResult;
use crate::parameters::RegulationParameters;
use crate::policy::PolicyContext;
use crate::target::target_intensity_with;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Intensity, balance and penalty for a pair of totals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComplianceOutcome {
    /// unit: gCO2eq/MJ
    pub ghg_intensity: f64,
    /// Positive is a surplus
    /// unit: gCO2eq
    pub compliance_balance: f64,
    /// unit: EUR
    pub penalty_eur: f64,
}

/// Full result of a compliance calculation.
///
/// Recomputed from scratch for every input change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub compliance_year: i32,
    /// Counted energy (RFNBO credit applied)
    /// unit: MJ
    pub total_energy_mj: f64,
    /// unit: gCO2eq
    pub total_emissions_gco2eq: f64,
    /// unit: gCO2eq/MJ, 0 when no energy was consumed
    pub ghg_intensity: f64,
    /// unit: gCO2eq/MJ
    pub target_intensity: f64,
    /// unit: gCO2eq
    pub compliance_balance: f64,
    /// unit: EUR
    pub penalty_eur: f64,
    pub breakdown: Vec<FuelContribution>,
    /// Policy the result was calculated under
    #[serde(default)]
    pub policy: PolicyContext,
}

impl CalculationResult {
    pub fn is_compliant(&self) -> bool {
        self.compliance_balance >= 0.0
    }

    pub fn is_deficit(&self) -> bool {
        self.compliance_balance < 0.0
    }
}

/// Emissions intensity over energy, with zero energy reported as zero intensity
pub fn ghg_intensity(total_energy_mj: f64, total_emissions_gco2eq: f64) -> f64 {
    if total_energy_mj > 0.0 {
        total_emissions_gco2eq / total_energy_mj
    } else {
        0.0
    }
}

/// Ties the emission calculator to the target function and penalty rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComplianceCalculator {
    emissions: EmissionCalculator,
}

impl ComplianceCalculator {
    /// Build a calculator after validating the parameters
    pub fn from_parameters(parameters: RegulationParameters) -> FuelEUResult<Self> {
        parameters.validate()?;
        Ok(Self {
            emissions: EmissionCalculator::from_parameters(parameters),
        })
    }

    pub fn parameters(&self) -> &RegulationParameters {
        self.emissions.parameters()
    }

    pub fn emission_calculator(&self) -> &EmissionCalculator {
        &self.emissions
    }

    pub fn target_intensity(&self, year: i32) -> f64 {
        target_intensity_with(self.parameters(), year)
    }

    /// Penalty for a signed balance at the given intensity
    pub fn penalty(
        &self,
        compliance_balance: f64,
        ghg_intensity: f64,
        consecutive_deficit_periods: u32,
    ) -> f64 {
        if compliance_balance >= 0.0 {
            return 0.0;
        }
        if ghg_intensity <= 0.0 {
            warn!(
                "Deficit of {} gCO2eq with non-positive intensity {}; no penalty can be derived",
                compliance_balance, ghg_intensity
            );
            return 0.0;
        }

        let parameters = self.parameters();
        let vlsfo_equivalent_tonnes = compliance_balance.abs()
            / (ghg_intensity * parameters.reference_energy_mj_per_tonne);
        let escalation =
            1.0 + f64::from(consecutive_deficit_periods) * parameters.penalty_escalation;

        vlsfo_equivalent_tonnes * parameters.penalty_rate_eur_per_tonne * escalation
    }

    /// Intensity, balance and penalty for precomputed totals
    pub fn evaluate(
        &self,
        total_energy_mj: f64,
        total_emissions_gco2eq: f64,
        target_intensity: f64,
        consecutive_deficit_periods: u32,
    ) -> ComplianceOutcome {
        let ghg_intensity = ghg_intensity(total_energy_mj, total_emissions_gco2eq);
        let compliance_balance = total_energy_mj * (target_intensity - ghg_intensity);
        let penalty_eur = self.penalty(
            compliance_balance,
            ghg_intensity,
            consecutive_deficit_periods,
        );

        ComplianceOutcome {
            ghg_intensity,
            compliance_balance,
            penalty_eur,
        }
    }

    /// Compute energy, emissions, balance and penalty for a fuel mix
    pub fn calculate(
        &self,
        consumptions: &[FuelConsumption],
        policy: &PolicyContext,
    ) -> FuelEUResult<CalculationResult> {
        policy.validate(self.parameters())?;

        let totals = self.emissions.compute(consumptions, policy)?;
        let target_intensity = self.target_intensity(policy.compliance_year);
        let outcome = self.evaluate(
            totals.total_energy_mj,
            totals.total_emissions_gco2eq,
            target_intensity,
            policy.consecutive_deficit_periods,
        );

        debug!(
            "{}: {} fuels, {:.3} MJ, intensity {:.5} vs target {:.5}, balance {:.0} gCO2eq, penalty {:.2} EUR",
            policy.compliance_year,
            totals.breakdown.len(),
            totals.total_energy_mj,
            outcome.ghg_intensity,
            target_intensity,
            outcome.compliance_balance,
            outcome.penalty_eur
        );

        Ok(CalculationResult {
            compliance_year: policy.compliance_year,
            total_energy_mj: totals.total_energy_mj,
            total_emissions_gco2eq: totals.total_emissions_gco2eq,
            ghg_intensity: outcome.ghg_intensity,
            target_intensity,
            compliance_balance: outcome.compliance_balance,
            penalty_eur: outcome.penalty_eur,
            breakdown: totals.breakdown,
            policy: policy.clone(),
        })
    }
}

/// Calculate compliance under the default regulation parameters
pub fn calculate(
    consumptions: &[FuelConsumption],
    policy: &PolicyContext,
) -> FuelEUResult<CalculationResult> {
    ComplianceCalculator::default().calculate(consumptions, policy)
}

/// Evaluate totals against a target under the default regulation parameters
pub fn evaluate(
    total_energy_mj: f64,
    total_emissions_gco2eq: f64,
    target_intensity: f64,
) -> ComplianceOutcome {
    ComplianceCalculator::default().evaluate(
        total_energy_mj,
        total_emissions_gco2eq,
        target_intensity,
        0,
    )
}
