//! Pooling of compliance balances across vessels
//!
//! Ships may pool their balances for a reporting period. The pool is
//! compliant when the sum of the members' balances is non-negative, in which
//! case surplus is allocated to members in deficit until each is cleared.

use crate::compliance::{ghg_intensity, CalculationResult, ComplianceCalculator};
use crate::errors::{FuelEUError, FuelEUResult};
use serde::{Deserialize, Serialize};

/// A vessel's result entered into a pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolMember {
    pub name: String,
    pub result: CalculationResult,
}

/// Balance of a member before and after surplus has been allocated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolAllocation {
    pub name: String,
    pub balance_before: f64,
    pub balance_after: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolOutcome {
    pub total_energy_mj: f64,
    pub total_emissions_gco2eq: f64,
    pub pooled_intensity: f64,
    pub pooled_balance: f64,
    /// Penalty payable by the pool as a whole
    pub penalty_eur: f64,
    /// Empty when the pool is in deficit
    pub allocations: Vec<PoolAllocation>,
}

impl PoolOutcome {
    pub fn is_compliant(&self) -> bool {
        self.pooled_balance >= 0.0
    }
}

impl ComplianceCalculator {
    /// Pool the balances of several vessels for the same reporting period
    pub fn pool(&self, members: &[PoolMember]) -> FuelEUResult<PoolOutcome> {
        let Some(first) = members.first() else {
            return Err(FuelEUError::Error("A pool needs at least one member".into()));
        };
        let year = first.result.compliance_year;
        if let Some(other) = members.iter().find(|m| m.result.compliance_year != year) {
            return Err(FuelEUError::Error(format!(
                "Pool members must share a reporting period: {} is {} but {} is {}",
                first.name, year, other.name, other.result.compliance_year
            )));
        }

        let total_energy_mj: f64 = members.iter().map(|m| m.result.total_energy_mj).sum();
        let total_emissions_gco2eq: f64 = members
            .iter()
            .map(|m| m.result.total_emissions_gco2eq)
            .sum();
        let pooled_balance: f64 = members.iter().map(|m| m.result.compliance_balance).sum();
        let pooled_intensity = ghg_intensity(total_energy_mj, total_emissions_gco2eq);
        let penalty_eur = self.penalty(pooled_balance, pooled_intensity, 0);

        let allocations = if pooled_balance >= 0.0 {
            allocate_surplus(members)
        } else {
            Vec::new()
        };

        Ok(PoolOutcome {
            total_energy_mj,
            total_emissions_gco2eq,
            pooled_intensity,
            pooled_balance,
            penalty_eur,
            allocations,
        })
    }

    /// Penalty-equivalent value of a surplus, priced at the target intensity
    pub fn surplus_value_eur(&self, result: &CalculationResult) -> f64 {
        if result.compliance_balance <= 0.0 || result.target_intensity <= 0.0 {
            return 0.0;
        }
        let parameters = self.parameters();
        result.compliance_balance
            / (result.target_intensity * parameters.reference_energy_mj_per_tonne)
            * parameters.penalty_rate_eur_per_tonne
    }
}

// Greedy: surplus is drawn from members in input order and handed to deficit
// members in input order. Assumes the pooled balance is non-negative.
fn allocate_surplus(members: &[PoolMember]) -> Vec<PoolAllocation> {
    let mut available: f64 = members
        .iter()
        .map(|m| m.result.compliance_balance.max(0.0))
        .sum();

    let mut allocations: Vec<PoolAllocation> = members
        .iter()
        .map(|m| PoolAllocation {
            name: m.name.clone(),
            balance_before: m.result.compliance_balance,
            balance_after: m.result.compliance_balance,
        })
        .collect();

    for allocation in allocations.iter_mut().filter(|a| a.balance_before < 0.0) {
        let transfer = allocation.balance_before.abs().min(available);
        allocation.balance_after += transfer;
        available -= transfer;
    }

    let mut spent: f64 = allocations
        .iter()
        .filter(|a| a.balance_before < 0.0)
        .map(|a| a.balance_after - a.balance_before)
        .sum();
    for allocation in allocations.iter_mut().filter(|a| a.balance_before > 0.0) {
        let drawn = allocation.balance_before.min(spent);
        allocation.balance_after -= drawn;
        spent -= drawn;
    }

    allocations
}
