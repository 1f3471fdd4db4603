//! Substitution search
//!
//! Replaces a fraction $x$ of one fuel's mass with a candidate supplying the
//! same physical energy. The fleet is rebuilt at every trial point:
//!
//! $$B(x) = B_{fleet} - B_R(m_R) + B_R((1 - x) m_R) + B_S\left(x m_R \frac{LCV_R}{LCV_S}\right)$$
//!
//! so the RFNBO credit follows whichever portion is eligible. Intensity of
//! $B(x)$ moves monotonically from the current value towards the
//! substitute's own, which makes $x = 1$ the decisive feasibility check.

use crate::blend::{tonnes, to_f64, Balance, BlendFuel, FleetFuel};
use crate::parameters::SearchParameters;
use crate::plan::{InfeasibilityReason, SearchOutcome, Solution};
use fueleu_core::errors::{FuelEUError, FuelEUResult};
use fueleu_core::utils::bisection::{bisect, BisectionOutcome};
use log::debug;
use rust_decimal::{Decimal, RoundingStrategy};

/// A fleet with one fuel split out for partial replacement.
#[derive(Debug, Clone)]
pub(crate) struct Substitution<'a> {
    without: Balance,
    replaced: &'a FleetFuel,
    substitute: &'a BlendFuel,
    /// Substitute grams per replaced gram
    mass_ratio: Decimal,
}

fn overflow(what: &str) -> FuelEUError {
    FuelEUError::NumericOverflow(what.to_string())
}

impl<'a> Substitution<'a> {
    pub fn new(
        fleet: Balance,
        replaced: &'a FleetFuel,
        substitute: &'a BlendFuel,
    ) -> FuelEUResult<Self> {
        let without = fleet.minus(replaced.fuel.balance(replaced.mass_g)?)?;
        let mass_ratio = replaced
            .fuel
            .lcv
            .checked_div(substitute.lcv)
            .ok_or_else(|| overflow("computing energy-equivalent mass ratio"))?;
        Ok(Self {
            without,
            replaced,
            substitute,
            mass_ratio,
        })
    }

    /// Grams of the replaced fuel swapped out at fraction `x`
    fn replaced_mass(&self, x: Decimal) -> FuelEUResult<Decimal> {
        self.replaced
            .mass_g
            .checked_mul(x)
            .ok_or_else(|| overflow("computing replaced mass"))
    }

    fn substitute_mass(&self, x: Decimal) -> FuelEUResult<Decimal> {
        self.replaced_mass(x)?
            .checked_mul(self.mass_ratio)
            .ok_or_else(|| overflow("computing substitute mass"))
    }

    /// Fleet balance with fraction `x` replaced
    pub fn blend(&self, x: Decimal) -> FuelEUResult<Balance> {
        let removed = self.replaced_mass(x)?;
        let remaining = self
            .replaced
            .mass_g
            .checked_sub(removed)
            .ok_or_else(|| overflow("computing remaining mass"))?;
        self.without
            .plus(self.replaced.fuel.balance(remaining)?)?
            .plus(self.substitute.balance(self.substitute_mass(x)?)?)
    }

    /// Smallest fraction of the replaced fuel bringing the fleet to or below `target`
    pub fn solve(
        &self,
        target: Decimal,
        parameters: &SearchParameters,
    ) -> FuelEUResult<SearchOutcome> {
        let current = self.blend(Decimal::ZERO)?.intensity();
        let full = self.blend(Decimal::ONE)?.intensity();
        if self.replaced.mass_g <= Decimal::ZERO || full >= current {
            return Ok(SearchOutcome::Infeasible(
                InfeasibilityReason::NoIntensityReduction,
            ));
        }
        if full > target {
            return Ok(SearchOutcome::Infeasible(
                InfeasibilityReason::FullReplacementInsufficient,
            ));
        }

        let settings = parameters.fraction_settings()?;
        let outcome = bisect(Decimal::ZERO, Decimal::ONE, &settings, |x| {
            Ok(self.blend(x)?.intensity() <= target)
        })?;
        let (value, iterations) = match outcome {
            BisectionOutcome::Converged {
                value, iterations, ..
            } => (value, iterations),
            // Unreachable once x = 1 is known to be feasible
            BisectionOutcome::NoFeasiblePoint => {
                return Ok(SearchOutcome::Infeasible(
                    InfeasibilityReason::FullReplacementInsufficient,
                ))
            }
        };

        let fraction = value
            .round_dp_with_strategy(
                parameters.fraction_decimal_places,
                RoundingStrategy::AwayFromZero,
            )
            .min(Decimal::ONE);
        let resulting = self.blend(fraction)?.intensity();
        let substitute_tonnes = tonnes(self.substitute_mass(fraction)?)?;
        let replaced_tonnes = tonnes(self.replaced_mass(fraction)?)?;
        debug!(
            "substitution {} -> {}: fraction {} after {} iterations, intensity {}",
            self.replaced.fuel.name, self.substitute.name, fraction, iterations, resulting
        );

        Ok(SearchOutcome::Solved(Solution {
            required_quantity_tonnes: to_f64(substitute_tonnes),
            substituted_fraction: Some(to_f64(fraction)),
            replaced_quantity_tonnes: Some(to_f64(replaced_tonnes)),
            resulting_intensity: to_f64(resulting),
        }))
    }
}
