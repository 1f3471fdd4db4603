//! Mitigation plan value objects

use fueleu_core::pricing::{FuelPrice, PriceBook};
use serde::{Deserialize, Serialize};

/// How a candidate fuel would be introduced into the mix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MitigationStrategy {
    /// Burn the candidate in addition to the existing mix
    Supplement,
    /// Replace part of `replaced_fuel` with the candidate at equal physical energy
    Substitution { replaced_fuel: String },
}

/// Why a search produced no answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum InfeasibilityReason {
    /// The candidate is not cleaner than what it would dilute or replace
    NoIntensityReduction,
    /// The candidate's own intensity is not below the target, so no amount suffices
    CannotReachTarget,
    /// A solution would need more than the search's upper bound
    ExceedsSearchDomain { upper_bound_tonnes: f64 },
    /// Replacing all of the fuel is still not enough
    FullReplacementInsufficient,
}

/// A sufficient intervention found by the search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    /// Tonnes of the candidate fuel to take on board
    pub required_quantity_tonnes: f64,
    /// Share of the replaced fuel's mass swapped out, substitution only
    pub substituted_fraction: Option<f64>,
    /// Tonnes of the replaced fuel no longer burned, substitution only
    pub replaced_quantity_tonnes: Option<f64>,
    /// Intensity of the mix after the intervention
    /// unit: gCO2eq/MJ
    pub resulting_intensity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SearchOutcome {
    Solved(Solution),
    Infeasible(InfeasibilityReason),
}

/// One candidate intervention and its search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MitigationPlan {
    pub candidate_fuel: String,
    pub strategy: MitigationStrategy,
    pub outcome: SearchOutcome,
    pub price: Option<FuelPrice>,
    /// unit: EUR
    pub cost_eur: Option<f64>,
}

impl MitigationPlan {
    pub(crate) fn new(
        candidate_fuel: impl Into<String>,
        strategy: MitigationStrategy,
        outcome: SearchOutcome,
    ) -> Self {
        Self {
            candidate_fuel: candidate_fuel.into(),
            strategy,
            outcome,
            price: None,
            cost_eur: None,
        }
    }

    pub fn solution(&self) -> Option<&Solution> {
        match &self.outcome {
            SearchOutcome::Solved(solution) => Some(solution),
            SearchOutcome::Infeasible(_) => None,
        }
    }

    /// Tonnes of candidate fuel required, if the search succeeded
    pub fn required_quantity_tonnes(&self) -> Option<f64> {
        self.solution().map(|s| s.required_quantity_tonnes)
    }

    pub fn is_feasible(&self) -> bool {
        self.solution().is_some()
    }

    /// Attach a price and the cost of the required quantity
    pub fn with_price(mut self, price: FuelPrice) -> Self {
        self.cost_eur = self
            .required_quantity_tonnes()
            .map(|tonnes| tonnes * price.eur_per_tonne);
        self.price = Some(price);
        self
    }
}

/// Price every feasible plan from `book`, leaving unpriced fuels untouched
pub fn annotate_prices(plans: Vec<MitigationPlan>, book: &mut PriceBook) -> Vec<MitigationPlan> {
    plans
        .into_iter()
        .map(|plan| {
            if !plan.is_feasible() {
                return plan;
            }
            match book.price(&plan.candidate_fuel) {
                Some(price) => plan.with_price(price),
                None => plan,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fueleu_core::fuel::names;
    use fueleu_core::pricing::PriceOrigin;

    fn solved(tonnes: f64) -> MitigationPlan {
        MitigationPlan::new(
            names::BIODIESEL_UCO,
            MitigationStrategy::Supplement,
            SearchOutcome::Solved(Solution {
                required_quantity_tonnes: tonnes,
                substituted_fraction: None,
                replaced_quantity_tonnes: None,
                resulting_intensity: 88.0,
            }),
        )
    }

    #[test]
    fn test_with_price_sets_cost() {
        let plan = solved(70.0).with_price(FuelPrice {
            eur_per_tonne: 1000.0,
            origin: PriceOrigin::Live,
        });
        assert_eq!(plan.cost_eur, Some(70_000.0));
    }

    #[test]
    fn test_annotate_skips_infeasible() {
        let infeasible = MitigationPlan::new(
            names::HFO,
            MitigationStrategy::Supplement,
            SearchOutcome::Infeasible(InfeasibilityReason::NoIntensityReduction),
        );
        let mut book = PriceBook::default();
        let plans = annotate_prices(vec![solved(10.0), infeasible], &mut book);

        assert_eq!(plans[0].price.map(|p| p.origin), Some(PriceOrigin::Default));
        assert_eq!(plans[0].cost_eur, Some(11_750.0));
        assert!(plans[1].price.is_none());
        assert!(plans[1].cost_eur.is_none());
    }
}
