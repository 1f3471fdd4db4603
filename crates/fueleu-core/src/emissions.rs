//! Well-to-wake emissions of a fuel mix
//!
//! For each consumed fuel with a positive mass $m$ (grams):
//!
//! $$E = m \cdot LCV$$
//! $$E_{counted} = E \cdot RWD$$
//! $$TtW = C_{CO2} (1 - f_{OPS}) f_{wind} + C_{CH4} GWP_{CH4} + C_{N2O} GWP_{N2O}$$
//! $$GHG = m \cdot TtW + E \cdot WtT$$
//!
//! where $RWD$ is the RFNBO reward multiplier (1 outside the incentive window).
//! The credit only touches counted energy, never the physical energy used for
//! upstream emissions.

use crate::errors::{FuelEUError, FuelEUResult};
use crate::fuel::{FuelRegistry, FuelSpec};
use crate::parameters::RegulationParameters;
use crate::policy::{GhgScope, PolicyContext};
use serde::{Deserialize, Serialize};

/// Grams per metric tonne
pub const GRAMS_PER_TONNE: f64 = 1_000_000.0;

/// A quantity of one fuel consumed during the reporting period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelConsumption {
    pub fuel: FuelSpec,
    pub quantity_tonnes: f64,
}

impl FuelConsumption {
    pub fn new(fuel: FuelSpec, quantity_tonnes: f64) -> Self {
        Self {
            fuel,
            quantity_tonnes,
        }
    }
}

/// A fuel selection by name, as supplied by a front-end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelSelection {
    pub fuel: String,
    pub quantity_tonnes: f64,
}

impl FuelRegistry {
    /// Resolve a named selection against this registry
    pub fn consumption(&self, selection: &FuelSelection) -> FuelEUResult<FuelConsumption> {
        let spec = self.require(&selection.fuel)?;
        Ok(FuelConsumption::new(spec.clone(), selection.quantity_tonnes))
    }

    /// Resolve every selection, failing on the first unknown fuel
    pub fn consumptions(&self, selections: &[FuelSelection]) -> FuelEUResult<Vec<FuelConsumption>> {
        selections
            .iter()
            .map(|selection| self.consumption(selection))
            .collect()
    }
}

/// Energy and emissions attributed to a single fuel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelContribution {
    pub fuel: String,
    pub quantity_tonnes: f64,
    /// Physical energy content
    /// unit: MJ
    pub energy_mj: f64,
    /// Energy counted in the intensity denominator, including any RFNBO credit
    /// unit: MJ
    pub counted_energy_mj: f64,
    /// Combustion emissions per gram of fuel
    /// unit: gCO2eq/g
    pub ttw_factor: f64,
    /// unit: gCO2eq
    pub emissions_gco2eq: f64,
    pub rfnbo_credited: bool,
}

impl FuelContribution {
    /// Emissions per counted MJ of this fuel alone
    pub fn intensity(&self) -> f64 {
        if self.counted_energy_mj > 0.0 {
            self.emissions_gco2eq / self.counted_energy_mj
        } else {
            0.0
        }
    }
}

/// Aggregated energy and emissions over a fuel mix.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EmissionTotals {
    /// Counted energy (RFNBO credit applied)
    /// unit: MJ
    pub total_energy_mj: f64,
    /// unit: gCO2eq
    pub total_emissions_gco2eq: f64,
    /// One entry per fuel with a positive quantity, in input order
    pub breakdown: Vec<FuelContribution>,
}

/// Converts fuel consumption into energy and well-to-wake emissions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmissionCalculator {
    parameters: RegulationParameters,
}

impl EmissionCalculator {
    pub fn from_parameters(parameters: RegulationParameters) -> Self {
        Self { parameters }
    }

    pub fn parameters(&self) -> &RegulationParameters {
        &self.parameters
    }

    /// Multiplier applied to the counted energy of `fuel` in the policy year
    pub fn energy_credit_multiplier(&self, fuel: &FuelSpec, policy: &PolicyContext) -> f64 {
        if fuel.is_rfnbo() && self.parameters.rfnbo_window_contains(policy.compliance_year) {
            self.parameters.rfnbo_multiplier
        } else {
            1.0
        }
    }

    /// Combustion emissions per gram of fuel (gCO2eq/g).
    ///
    /// Rewards attenuate only the CO2 term.
    pub fn combustion_factor(&self, fuel: &FuelSpec, policy: &PolicyContext) -> f64 {
        let co2 = fuel.ttw_co2() * policy.co2_reward_multiplier();
        match policy.scope {
            GhgScope::Full => {
                co2 + fuel.ttw_ch4() * policy.gwp.ch4() + fuel.ttw_n2o() * policy.gwp.n2o()
            }
            GhgScope::Co2Only => co2,
        }
    }

    /// Contribution of a single fuel and mass.
    ///
    /// Returns `None` for a zero quantity.
    pub fn contribution(
        &self,
        fuel: &FuelSpec,
        quantity_tonnes: f64,
        policy: &PolicyContext,
    ) -> FuelEUResult<Option<FuelContribution>> {
        if !quantity_tonnes.is_finite() {
            return Err(FuelEUError::NonFiniteValue {
                fuel: fuel.name().to_string(),
                field: "quantity_tonnes",
                value: quantity_tonnes,
            });
        }
        if quantity_tonnes < 0.0 {
            return Err(FuelEUError::NegativeQuantity {
                fuel: fuel.name().to_string(),
                quantity: quantity_tonnes,
            });
        }
        if quantity_tonnes == 0.0 {
            return Ok(None);
        }

        let mass_g = quantity_tonnes * GRAMS_PER_TONNE;
        let energy_mj = mass_g * fuel.lcv();
        let multiplier = self.energy_credit_multiplier(fuel, policy);
        let ttw_factor = self.combustion_factor(fuel, policy);
        let emissions_gco2eq = mass_g * ttw_factor + energy_mj * fuel.wtt();

        Ok(Some(FuelContribution {
            fuel: fuel.name().to_string(),
            quantity_tonnes,
            energy_mj,
            counted_energy_mj: energy_mj * multiplier,
            ttw_factor,
            emissions_gco2eq,
            rfnbo_credited: multiplier != 1.0,
        }))
    }

    /// Sum energy and emissions over a fuel mix.
    ///
    /// Every entry is validated before anything is accumulated, so an invalid
    /// quantity anywhere in the list yields an error rather than partial totals.
    pub fn compute(
        &self,
        consumptions: &[FuelConsumption],
        policy: &PolicyContext,
    ) -> FuelEUResult<EmissionTotals> {
        let breakdown = consumptions
            .iter()
            .filter_map(|c| {
                self.contribution(&c.fuel, c.quantity_tonnes, policy)
                    .transpose()
            })
            .collect::<FuelEUResult<Vec<_>>>()?;

        let total_energy_mj = breakdown.iter().map(|c| c.counted_energy_mj).sum();
        let total_emissions_gco2eq = breakdown.iter().map(|c| c.emissions_gco2eq).sum();

        Ok(EmissionTotals {
            total_energy_mj,
            total_emissions_gco2eq,
            breakdown,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fuel::names;
    use crate::policy::GwpStandard;
    use approx::assert_relative_eq;

    fn calculator() -> EmissionCalculator {
        EmissionCalculator::default()
    }

    fn spec(name: &str) -> FuelSpec {
        FuelRegistry::reference().require(name).unwrap().clone()
    }

    #[test]
    fn test_hfo_contribution() {
        let policy = PolicyContext::for_year(2025);
        let contribution = calculator()
            .contribution(&spec(names::HFO), 1000.0, &policy)
            .unwrap()
            .unwrap();

        assert_relative_eq!(contribution.energy_mj, 40_500_000.0, max_relative = 1e-12);
        assert_relative_eq!(contribution.ttw_factor, 3.16889, max_relative = 1e-12);
        assert_relative_eq!(
            contribution.emissions_gco2eq,
            3_715_640_000.0,
            max_relative = 1e-12
        );
        assert!(!contribution.rfnbo_credited);
    }

    #[test]
    fn test_zero_quantity_excluded() {
        let policy = PolicyContext::default();
        let totals = calculator()
            .compute(
                &[
                    FuelConsumption::new(spec(names::HFO), 0.0),
                    FuelConsumption::new(spec(names::MGO), 10.0),
                ],
                &policy,
            )
            .unwrap();
        assert_eq!(totals.breakdown.len(), 1);
        assert_eq!(totals.breakdown[0].fuel, names::MGO);
    }

    #[test]
    fn test_negative_quantity_rejected() {
        let policy = PolicyContext::default();
        let result = calculator().compute(
            &[
                FuelConsumption::new(spec(names::MGO), 10.0),
                FuelConsumption::new(spec(names::HFO), -1.0),
            ],
            &policy,
        );
        assert!(matches!(
            result,
            Err(FuelEUError::NegativeQuantity { .. })
        ));
    }

    #[test]
    fn test_rewards_only_scale_co2() {
        let fuel = spec(names::LNG);
        let base = PolicyContext::default();
        let rewarded = PolicyContext {
            ops_reward_fraction: 0.1,
            wind_reward_factor: 0.95,
            ..PolicyContext::default()
        };
        let calc = calculator();
        let difference = calc.combustion_factor(&fuel, &base) - calc.combustion_factor(&fuel, &rewarded);
        assert_relative_eq!(
            difference,
            fuel.ttw_co2() * (1.0 - 0.9 * 0.95),
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_co2_only_scope_drops_other_gases() {
        let fuel = spec(names::LNG);
        let policy = PolicyContext {
            scope: GhgScope::Co2Only,
            ..PolicyContext::default()
        };
        assert_relative_eq!(
            calculator().combustion_factor(&fuel, &policy),
            fuel.ttw_co2(),
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_gwp_standard_changes_factor() {
        let fuel = spec(names::LNG);
        let ar4 = PolicyContext::default();
        let ar6 = PolicyContext {
            gwp: GwpStandard::Ar6,
            ..PolicyContext::default()
        };
        let calc = calculator();
        assert!(calc.combustion_factor(&fuel, &ar6) > calc.combustion_factor(&fuel, &ar4));
    }

    #[test]
    fn test_rfnbo_credit_changes_counted_energy_only() {
        let fuel = spec(names::E_METHANOL);
        let calc = calculator();
        let inside = calc
            .contribution(&fuel, 100.0, &PolicyContext::for_year(2030))
            .unwrap()
            .unwrap();
        let outside = calc
            .contribution(&fuel, 100.0, &PolicyContext::for_year(2034))
            .unwrap()
            .unwrap();

        assert!(inside.rfnbo_credited);
        assert!(!outside.rfnbo_credited);
        assert_relative_eq!(inside.energy_mj, outside.energy_mj);
        assert_relative_eq!(inside.counted_energy_mj, 2.0 * outside.counted_energy_mj);
        assert_relative_eq!(inside.emissions_gco2eq, outside.emissions_gco2eq);
    }

    #[test]
    fn test_summation_order_independent() {
        let policy = PolicyContext::default();
        let mix = vec![
            FuelConsumption::new(spec(names::HFO), 800.0),
            FuelConsumption::new(spec(names::BIO_LNG), 120.0),
            FuelConsumption::new(spec(names::E_LNG), 35.0),
        ];
        let mut reversed = mix.clone();
        reversed.reverse();

        let calc = calculator();
        let forward = calc.compute(&mix, &policy).unwrap();
        let backward = calc.compute(&reversed, &policy).unwrap();
        assert_relative_eq!(
            forward.total_energy_mj,
            backward.total_energy_mj,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            forward.total_emissions_gco2eq,
            backward.total_emissions_gco2eq,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_selection_resolution() {
        let registry = FuelRegistry::reference();
        let consumptions = registry
            .consumptions(&[FuelSelection {
                fuel: names::HVO.to_string(),
                quantity_tonnes: 5.0,
            }])
            .unwrap();
        assert_eq!(consumptions[0].fuel.name(), names::HVO);

        let unknown = registry.consumption(&FuelSelection {
            fuel: "Whale Oil".to_string(),
            quantity_tonnes: 1.0,
        });
        assert!(matches!(unknown, Err(FuelEUError::UnknownFuel(_))));
    }
}
