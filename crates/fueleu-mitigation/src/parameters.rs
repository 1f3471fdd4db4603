//! Search parameters
//!
//! Bounds and termination rules shared by the supplement and substitution searches.

use fueleu_core::errors::{FuelEUError, FuelEUResult};
use fueleu_core::utils::bisection::BisectionSettings;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Parameters for the mitigation searches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParameters {
    /// Largest supplement quantity considered. Needing more than this is
    /// reported as infeasible.
    /// unit: t
    /// default: 100000
    pub supplement_upper_bound_tonnes: f64,

    /// Bracket width at which the supplement search stops
    /// unit: t
    /// default: 1e-5
    pub quantity_tolerance_tonnes: f64,

    /// Bracket width at which the substitution search stops
    /// unit: dimensionless
    /// default: 1e-7
    pub fraction_tolerance: f64,

    /// Maximum number of halvings per search
    /// default: 50
    pub max_iterations: usize,

    /// Substituted fractions are rounded up to this many decimal places
    /// default: 6
    pub fraction_decimal_places: u32,
}

impl Default for SearchParameters {
    fn default() -> Self {
        Self {
            supplement_upper_bound_tonnes: 100_000.0,
            quantity_tolerance_tonnes: 1e-5,
            fraction_tolerance: 1e-7,
            max_iterations: 50,
            fraction_decimal_places: 6,
        }
    }
}

fn positive_decimal(value: f64, name: &str) -> FuelEUResult<Decimal> {
    if !(value.is_finite() && value > 0.0) {
        return Err(FuelEUError::InvalidParameters(format!(
            "{name} must be positive, got {value}"
        )));
    }
    Decimal::from_f64(value).ok_or_else(|| {
        FuelEUError::InvalidParameters(format!("{name}={value} cannot be represented exactly"))
    })
}

impl SearchParameters {
    /// Parse and validate parameters from a TOML document
    pub fn from_toml_str(document: &str) -> FuelEUResult<Self> {
        let parameters: Self = toml::from_str(document)?;
        parameters.validate()?;
        Ok(parameters)
    }

    pub fn validate(&self) -> FuelEUResult<()> {
        self.upper_bound()?;
        self.quantity_settings()?;
        self.fraction_settings()?;
        if self.max_iterations == 0 {
            return Err(FuelEUError::InvalidParameters(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        if self.fraction_decimal_places > 12 {
            return Err(FuelEUError::InvalidParameters(format!(
                "fraction_decimal_places must be at most 12, got {}",
                self.fraction_decimal_places
            )));
        }
        Ok(())
    }

    pub(crate) fn upper_bound(&self) -> FuelEUResult<Decimal> {
        positive_decimal(
            self.supplement_upper_bound_tonnes,
            "supplement_upper_bound_tonnes",
        )
    }

    pub(crate) fn quantity_settings(&self) -> FuelEUResult<BisectionSettings> {
        Ok(BisectionSettings {
            tolerance: positive_decimal(self.quantity_tolerance_tonnes, "quantity_tolerance_tonnes")?,
            max_iterations: self.max_iterations,
        })
    }

    pub(crate) fn fraction_settings(&self) -> FuelEUResult<BisectionSettings> {
        Ok(BisectionSettings {
            tolerance: positive_decimal(self.fraction_tolerance, "fraction_tolerance")?,
            max_iterations: self.max_iterations,
        })
    }
}
