//! Fixed-point energy and emission accounting for the searches
//!
//! Per-fuel factors come from the core [`EmissionCalculator`] so the searches
//! apply exactly the same rewards, GWP weighting and RFNBO credit as a normal
//! calculation. Only the accumulation over candidate quantities is done in
//! [`Decimal`].

use fueleu_core::compliance::CalculationResult;
use fueleu_core::emissions::{EmissionCalculator, GRAMS_PER_TONNE};
use fueleu_core::errors::{FuelEUError, FuelEUResult};
use fueleu_core::fuel::{FuelRegistry, FuelSpec};
use fueleu_core::policy::PolicyContext;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

// Relative agreement required between a result and its decimal rebuild
const TOTALS_TOLERANCE: f64 = 1e-9;

pub(crate) fn to_decimal(value: f64, what: &str) -> FuelEUResult<Decimal> {
    Decimal::from_f64(value)
        .ok_or_else(|| FuelEUError::NumericOverflow(format!("converting {what}={value} to decimal")))
}

pub(crate) fn to_f64(value: Decimal) -> f64 {
    // Every Decimal is within f64 range
    value.to_f64().unwrap_or(f64::NAN)
}

fn overflow(what: &str) -> FuelEUError {
    FuelEUError::NumericOverflow(what.to_string())
}

pub(crate) fn grams(tonnes: Decimal) -> FuelEUResult<Decimal> {
    let per_tonne = to_decimal(GRAMS_PER_TONNE, "grams per tonne")?;
    tonnes
        .checked_mul(per_tonne)
        .ok_or_else(|| overflow("converting tonnes to grams"))
}

pub(crate) fn tonnes(grams: Decimal) -> FuelEUResult<Decimal> {
    let per_tonne = to_decimal(GRAMS_PER_TONNE, "grams per tonne")?;
    grams
        .checked_div(per_tonne)
        .ok_or_else(|| overflow("converting grams to tonnes"))
}

/// Counted energy and emissions of some amount of fuel or a whole fleet.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(crate) struct Balance {
    /// unit: MJ (counted)
    pub energy: Decimal,
    /// unit: gCO2eq
    pub emissions: Decimal,
}

impl Balance {
    pub fn plus(self, other: Balance) -> FuelEUResult<Balance> {
        Ok(Balance {
            energy: self
                .energy
                .checked_add(other.energy)
                .ok_or_else(|| overflow("adding energy"))?,
            emissions: self
                .emissions
                .checked_add(other.emissions)
                .ok_or_else(|| overflow("adding emissions"))?,
        })
    }

    pub fn minus(self, other: Balance) -> FuelEUResult<Balance> {
        Ok(Balance {
            energy: self
                .energy
                .checked_sub(other.energy)
                .ok_or_else(|| overflow("subtracting energy"))?,
            emissions: self
                .emissions
                .checked_sub(other.emissions)
                .ok_or_else(|| overflow("subtracting emissions"))?,
        })
    }

    /// Emissions per counted MJ, zero when there is no energy
    pub fn intensity(&self) -> Decimal {
        if self.energy > Decimal::ZERO {
            self.emissions
                .checked_div(self.energy)
                .unwrap_or(Decimal::MAX)
        } else {
            Decimal::ZERO
        }
    }
}

/// Per-gram factors of one fuel under a policy.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BlendFuel {
    pub name: String,
    /// Physical energy per gram (MJ/g)
    pub lcv: Decimal,
    /// Counted energy per gram (MJ/g)
    pub counted_lcv: Decimal,
    /// Well-to-wake emissions per gram (gCO2eq/g)
    pub emissions_per_gram: Decimal,
}

impl BlendFuel {
    pub fn new(
        calculator: &EmissionCalculator,
        spec: &FuelSpec,
        policy: &PolicyContext,
    ) -> FuelEUResult<Self> {
        let lcv = to_decimal(spec.lcv(), "lcv")?;
        let multiplier = to_decimal(
            calculator.energy_credit_multiplier(spec, policy),
            "energy credit multiplier",
        )?;
        let ttw = to_decimal(calculator.combustion_factor(spec, policy), "ttw factor")?;
        let wtt = to_decimal(spec.wtt(), "wtt")?;

        let upstream = lcv
            .checked_mul(wtt)
            .ok_or_else(|| overflow("computing upstream emissions"))?;
        Ok(Self {
            name: spec.name().to_string(),
            lcv,
            counted_lcv: lcv
                .checked_mul(multiplier)
                .ok_or_else(|| overflow("computing counted energy"))?,
            emissions_per_gram: ttw
                .checked_add(upstream)
                .ok_or_else(|| overflow("computing emissions"))?,
        })
    }

    /// Balance contributed by `mass_g` grams
    pub fn balance(&self, mass_g: Decimal) -> FuelEUResult<Balance> {
        Ok(Balance {
            energy: mass_g
                .checked_mul(self.counted_lcv)
                .ok_or_else(|| overflow("computing fuel energy"))?,
            emissions: mass_g
                .checked_mul(self.emissions_per_gram)
                .ok_or_else(|| overflow("computing fuel emissions"))?,
        })
    }

    /// Emissions per counted MJ of this fuel on its own
    pub fn intensity(&self) -> Decimal {
        self.emissions_per_gram
            .checked_div(self.counted_lcv)
            .unwrap_or(Decimal::MAX)
    }
}

/// A fuel already in the mix together with its consumed mass.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FleetFuel {
    pub fuel: BlendFuel,
    pub mass_g: Decimal,
}

/// Decimal re-accounting of a calculation result.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Fleet {
    pub balance: Balance,
    pub fuels: Vec<FleetFuel>,
}

impl Fleet {
    /// Rebuild a result's totals fuel by fuel.
    ///
    /// Every fuel in the breakdown must be known to `registry`.
    pub fn from_result(
        calculator: &EmissionCalculator,
        registry: &FuelRegistry,
        result: &CalculationResult,
        policy: &PolicyContext,
    ) -> FuelEUResult<Self> {
        let mut balance = Balance::default();
        let mut fuels = Vec::with_capacity(result.breakdown.len());
        for contribution in &result.breakdown {
            let spec = registry.require(&contribution.fuel)?;
            let fuel = BlendFuel::new(calculator, spec, policy)?;
            let mass_g = grams(to_decimal(contribution.quantity_tonnes, "quantity_tonnes")?)?;
            balance = balance.plus(fuel.balance(mass_g)?)?;
            fuels.push(FleetFuel { fuel, mass_g });
        }
        Ok(Self { balance, fuels })
    }

    /// Fail unless the rebuilt totals reproduce `result`.
    ///
    /// A registry or policy other than the one behind `result` changes the
    /// per-fuel factors, and a search over such a fleet would size the wrong
    /// deficit.
    pub fn ensure_matches(&self, result: &CalculationResult) -> FuelEUResult<()> {
        let checks = [
            ("energy", to_f64(self.balance.energy), result.total_energy_mj),
            (
                "emissions",
                to_f64(self.balance.emissions),
                result.total_emissions_gco2eq,
            ),
        ];
        for (what, rebuilt, reported) in checks {
            if (rebuilt - reported).abs() > TOTALS_TOLERANCE * reported.abs().max(1.0) {
                return Err(FuelEUError::InvalidParameters(format!(
                    "result {what} {reported} cannot be reproduced from the registry and policy \
                     (got {rebuilt}); search with the policy the result was calculated under"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fueleu_core::compliance::calculate;
    use fueleu_core::emissions::FuelConsumption;
    use fueleu_core::fuel::names;
    use rust_decimal_macros::dec;

    #[test]
    fn test_fleet_matches_float_calculation() {
        let registry = FuelRegistry::reference();
        let policy = PolicyContext::for_year(2027);
        let consumptions = vec![
            FuelConsumption::new(registry.require(names::HFO).unwrap().clone(), 1200.0),
            FuelConsumption::new(registry.require(names::E_METHANOL).unwrap().clone(), 40.0),
        ];
        let result = calculate(&consumptions, &policy).unwrap();
        let fleet =
            Fleet::from_result(&EmissionCalculator::default(), &registry, &result, &policy)
                .unwrap();

        let energy = to_f64(fleet.balance.energy);
        let emissions = to_f64(fleet.balance.emissions);
        assert!((energy - result.total_energy_mj).abs() / result.total_energy_mj < 1e-12);
        assert!(
            (emissions - result.total_emissions_gco2eq).abs() / result.total_emissions_gco2eq
                < 1e-12
        );
        assert_eq!(fleet.fuels.len(), 2);
    }

    #[test]
    fn test_fleet_rejects_other_policy() {
        let registry = FuelRegistry::reference();
        let policy = PolicyContext::for_year(2025);
        let consumptions = vec![FuelConsumption::new(
            registry.require(names::HFO).unwrap().clone(),
            1000.0,
        )];
        let result = calculate(&consumptions, &policy).unwrap();
        let calculator = EmissionCalculator::default();

        let same = Fleet::from_result(&calculator, &registry, &result, &policy).unwrap();
        assert!(same.ensure_matches(&result).is_ok());

        let rewarded = PolicyContext {
            wind_reward_factor: 0.9,
            ..policy
        };
        let other = Fleet::from_result(&calculator, &registry, &result, &rewarded).unwrap();
        assert!(matches!(
            other.ensure_matches(&result),
            Err(FuelEUError::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_balance_arithmetic() {
        let a = Balance {
            energy: dec!(10),
            emissions: dec!(900),
        };
        let b = Balance {
            energy: dec!(5),
            emissions: dec!(50),
        };
        assert_eq!(a.plus(b).unwrap().intensity(), dec!(950) / dec!(15));
        assert_eq!(a.minus(b).unwrap().intensity(), dec!(170));
        assert_eq!(Balance::default().intensity(), Decimal::ZERO);
    }

    #[test]
    fn test_rfnbo_halves_intensity_in_window() {
        let registry = FuelRegistry::reference();
        let spec = registry.require(names::E_LNG).unwrap();
        let calculator = EmissionCalculator::default();
        let inside = BlendFuel::new(&calculator, spec, &PolicyContext::for_year(2025)).unwrap();
        let outside = BlendFuel::new(&calculator, spec, &PolicyContext::for_year(2040)).unwrap();
        assert_eq!(inside.intensity() * dec!(2), outside.intensity());
    }
}
