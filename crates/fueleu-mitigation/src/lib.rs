//! Mitigation searches for FuelEU Maritime deficits
//!
//! Given a [`CalculationResult`] in deficit, [`MitigationSearch`] sizes two
//! kinds of intervention for every candidate fuel in a registry:
//!
//! - `supplement`: burn an additional quantity of the candidate on top of the mix
//! - `substitution`: swap part of a fuel whose own intensity is above target
//!   for the candidate at equal physical energy
//!
//! Both run the shared decimal bisection from `fueleu_core::utils::bisection`
//! and report a typed infeasibility instead of a best-effort number when no
//! amount of the candidate is enough.

mod blend;
pub mod parameters;
pub mod plan;
#[cfg(feature = "python")]
pub mod python;
mod substitution;
mod supplement;

pub use parameters::SearchParameters;
pub use plan::{
    annotate_prices, InfeasibilityReason, MitigationPlan, MitigationStrategy, SearchOutcome,
    Solution,
};

use crate::blend::{to_decimal, BlendFuel, Fleet};
use crate::substitution::Substitution;
use crate::supplement::solve_supplement;
use fueleu_core::compliance::{CalculationResult, ComplianceCalculator};
use fueleu_core::errors::{FuelEUError, FuelEUResult};
use fueleu_core::fuel::FuelRegistry;
use fueleu_core::policy::PolicyContext;
use log::{debug, info};

/// Runs the supplement and substitution searches against one calculator.
#[derive(Debug, Clone, Default)]
pub struct MitigationSearch {
    calculator: ComplianceCalculator,
    parameters: SearchParameters,
}

impl MitigationSearch {
    pub fn new(calculator: ComplianceCalculator, parameters: SearchParameters) -> FuelEUResult<Self> {
        parameters.validate()?;
        Ok(Self {
            calculator,
            parameters,
        })
    }

    pub fn from_parameters(parameters: SearchParameters) -> FuelEUResult<Self> {
        Self::new(ComplianceCalculator::default(), parameters)
    }

    pub fn calculator(&self) -> &ComplianceCalculator {
        &self.calculator
    }

    pub fn parameters(&self) -> &SearchParameters {
        &self.parameters
    }

    /// Size every candidate intervention for a deficit.
    ///
    /// Supplements come first in registry order, followed by substitutions
    /// grouped by the fuel being replaced. A compliant result yields no plans.
    /// `policy` and `registry` must be the ones `result` was calculated with;
    /// a fleet that does not reproduce the result's totals is rejected.
    pub fn find_mitigation(
        &self,
        registry: &FuelRegistry,
        result: &CalculationResult,
        policy: &PolicyContext,
    ) -> FuelEUResult<Vec<MitigationPlan>> {
        if result.is_compliant() {
            return Ok(Vec::new());
        }
        if policy.compliance_year != result.compliance_year {
            return Err(FuelEUError::Error(format!(
                "result was calculated for {} but the policy is for {}",
                result.compliance_year, policy.compliance_year
            )));
        }

        let emissions = self.calculator.emission_calculator();
        let fleet = Fleet::from_result(emissions, registry, result, policy)?;
        fleet.ensure_matches(result)?;
        let target = to_decimal(result.target_intensity, "target_intensity")?;
        let candidates = registry
            .iter()
            .map(|spec| BlendFuel::new(emissions, spec, policy))
            .collect::<FuelEUResult<Vec<_>>>()?;

        let mut plans = Vec::new();
        for candidate in &candidates {
            let outcome = solve_supplement(fleet.balance, candidate, target, &self.parameters)?;
            plans.push(MitigationPlan::new(
                candidate.name.clone(),
                MitigationStrategy::Supplement,
                outcome,
            ));
        }

        for replaced in fleet.fuels.iter().filter(|f| f.fuel.intensity() > target) {
            for candidate in candidates.iter().filter(|c| c.name != replaced.fuel.name) {
                let outcome = Substitution::new(fleet.balance, replaced, candidate)?
                    .solve(target, &self.parameters)?;
                plans.push(MitigationPlan::new(
                    candidate.name.clone(),
                    MitigationStrategy::Substitution {
                        replaced_fuel: replaced.fuel.name.clone(),
                    },
                    outcome,
                ));
            }
        }

        let feasible = plans.iter().filter(|plan| plan.is_feasible()).count();
        info!(
            "{}: {} of {} mitigation options restore compliance",
            result.compliance_year,
            feasible,
            plans.len()
        );
        debug!("deficit {:.0} gCO2eq", result.compliance_balance);
        Ok(plans)
    }
}

/// Search with the default regulation and search parameters
pub fn find_mitigation(
    registry: &FuelRegistry,
    result: &CalculationResult,
    policy: &PolicyContext,
) -> FuelEUResult<Vec<MitigationPlan>> {
    MitigationSearch::default().find_mitigation(registry, result, policy)
}
