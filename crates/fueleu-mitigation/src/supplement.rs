//! Supplement search
//!
//! Finds the smallest extra quantity $q$ of a candidate fuel such that
//!
//! $$\frac{GHG + GHG_c(q)}{E + E_c(q)} < I_{target}$$
//!
//! As $q \to \infty$ the blend tends to the candidate's own intensity, so a
//! candidate that is not strictly below the target can never succeed and is
//! rejected without searching.

use crate::blend::{grams, to_f64, Balance, BlendFuel};
use crate::parameters::SearchParameters;
use crate::plan::{InfeasibilityReason, SearchOutcome, Solution};
use fueleu_core::errors::FuelEUResult;
use fueleu_core::utils::bisection::{bisect, BisectionOutcome};
use log::debug;
use rust_decimal::Decimal;

fn blended(fleet: Balance, candidate: &BlendFuel, tonnes: Decimal) -> FuelEUResult<Balance> {
    fleet.plus(candidate.balance(grams(tonnes)?)?)
}

/// Size a supplement of `candidate` that brings `fleet` strictly below `target`
pub(crate) fn solve_supplement(
    fleet: Balance,
    candidate: &BlendFuel,
    target: Decimal,
    parameters: &SearchParameters,
) -> FuelEUResult<SearchOutcome> {
    let candidate_intensity = candidate.intensity();
    if candidate_intensity >= fleet.intensity() {
        return Ok(SearchOutcome::Infeasible(
            InfeasibilityReason::NoIntensityReduction,
        ));
    }
    if candidate_intensity >= target {
        return Ok(SearchOutcome::Infeasible(
            InfeasibilityReason::CannotReachTarget,
        ));
    }

    let upper = parameters.upper_bound()?;
    let settings = parameters.quantity_settings()?;
    let outcome = bisect(Decimal::ZERO, upper, &settings, |tonnes| {
        Ok(blended(fleet, candidate, tonnes)?.intensity() < target)
    })?;

    match outcome {
        BisectionOutcome::NoFeasiblePoint => Ok(SearchOutcome::Infeasible(
            InfeasibilityReason::ExceedsSearchDomain {
                upper_bound_tonnes: parameters.supplement_upper_bound_tonnes,
            },
        )),
        BisectionOutcome::Converged {
            value, iterations, ..
        } => {
            // Whole tonnes, never rounded down
            let required = value.ceil();
            let resulting = blended(fleet, candidate, required)?.intensity();
            debug!(
                "supplement {}: {} t after {} iterations, intensity {}",
                candidate.name, required, iterations, resulting
            );
            Ok(SearchOutcome::Solved(Solution {
                required_quantity_tonnes: to_f64(required),
                substituted_fraction: None,
                replaced_quantity_tonnes: None,
                resulting_intensity: to_f64(resulting),
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    // 1000 MJ at 95 gCO2eq/MJ
    fn fleet() -> Balance {
        Balance {
            energy: dec!(1000),
            emissions: dec!(95000),
        }
    }

    // 0.04 MJ/g at 10 gCO2eq/MJ
    fn clean_fuel() -> BlendFuel {
        BlendFuel {
            name: "Clean".to_string(),
            lcv: dec!(0.04),
            counted_lcv: dec!(0.04),
            emissions_per_gram: dec!(0.4),
        }
    }

    #[test]
    fn test_solves_analytic_case() {
        // (95000 + 0.4 m) / (1000 + 0.04 m) < 90  =>  m > 5000 / 3.2 = 1562.5 g
        // = 0.0015625 t, rounded up to 1 t
        let outcome =
            solve_supplement(fleet(), &clean_fuel(), dec!(90), &SearchParameters::default())
                .unwrap();
        match outcome {
            SearchOutcome::Solved(solution) => {
                assert_eq!(solution.required_quantity_tonnes, 1.0);
                assert!(solution.resulting_intensity < 90.0);
            }
            other => panic!("expected a solution, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_dirtier_candidate() {
        let dirty = BlendFuel {
            emissions_per_gram: dec!(4.0),
            ..clean_fuel()
        };
        let outcome =
            solve_supplement(fleet(), &dirty, dec!(90), &SearchParameters::default()).unwrap();
        assert_eq!(
            outcome,
            SearchOutcome::Infeasible(InfeasibilityReason::NoIntensityReduction)
        );
    }

    #[test]
    fn test_rejects_candidate_above_target() {
        // 92 gCO2eq/MJ: cleaner than the fleet but never below 90
        let marginal = BlendFuel {
            emissions_per_gram: dec!(3.68),
            ..clean_fuel()
        };
        let outcome =
            solve_supplement(fleet(), &marginal, dec!(90), &SearchParameters::default()).unwrap();
        assert_eq!(
            outcome,
            SearchOutcome::Infeasible(InfeasibilityReason::CannotReachTarget)
        );
    }

    #[test]
    fn test_reports_exceeded_domain() {
        let parameters = SearchParameters {
            supplement_upper_bound_tonnes: 0.001,
            ..SearchParameters::default()
        };
        let outcome = solve_supplement(fleet(), &clean_fuel(), dec!(90), &parameters).unwrap();
        assert!(matches!(
            outcome,
            SearchOutcome::Infeasible(InfeasibilityReason::ExceedsSearchDomain { .. })
        ));
    }
}
