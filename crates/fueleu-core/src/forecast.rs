//! Year-by-year projection of a fixed fuel mix against the tightening target

use crate::compliance::ComplianceCalculator;
use crate::emissions::FuelConsumption;
use crate::errors::FuelEUResult;
use crate::policy::PolicyContext;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub year: i32,
    pub target_intensity: f64,
    pub ghg_intensity: f64,
    pub compliance_balance: f64,
    pub penalty_eur: f64,
}

impl ComplianceCalculator {
    /// Target intensity for every year of `years`
    pub fn target_curve(&self, years: RangeInclusive<i32>) -> Vec<(i32, f64)> {
        years
            .map(|year| (year, self.target_intensity(year)))
            .collect()
    }

    /// Recalculate the same fuel mix for every year of `years`.
    ///
    /// All other policy settings are taken from `policy`. Each year is a full
    /// recalculation, so the RFNBO credit switches off after its window.
    pub fn forecast(
        &self,
        consumptions: &[FuelConsumption],
        policy: &PolicyContext,
        years: RangeInclusive<i32>,
    ) -> FuelEUResult<Vec<ForecastPoint>> {
        years
            .map(|year| {
                let policy = PolicyContext {
                    compliance_year: year,
                    ..policy.clone()
                };
                let result = self.calculate(consumptions, &policy)?;
                Ok(ForecastPoint {
                    year,
                    target_intensity: result.target_intensity,
                    ghg_intensity: result.ghg_intensity,
                    compliance_balance: result.compliance_balance,
                    penalty_eur: result.penalty_eur,
                })
            })
            .collect()
    }
}
