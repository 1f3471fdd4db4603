use thiserror::Error;

/// Error type for invalid inputs and configuration.
///
/// Every variant is recoverable by the caller: correct the offending input and
/// recalculate. A zero-energy fuel mix is not an error (intensity is reported
/// as zero) and neither is an infeasible mitigation search, which is returned
/// as a typed outcome instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FuelEUError {
    #[error("{0}")]
    Error(String),
    #[error("Quantity of {fuel} must be non-negative, got {quantity} t")]
    NegativeQuantity { fuel: String, quantity: f64 },
    #[error("{field} of {fuel} must be finite, got {value}")]
    NonFiniteValue {
        fuel: String,
        field: &'static str,
        value: f64,
    },
    #[error("Lower calorific value of {fuel} must be strictly positive, got {lcv} MJ/g")]
    NonPositiveLcv { fuel: String, lcv: f64 },
    #[error("Emission factor {field} of {fuel} must be non-negative, got {value}")]
    NegativeEmissionFactor {
        fuel: String,
        field: &'static str,
        value: f64,
    },
    #[error("Compliance year {year} is outside the covered period {first}-{last}")]
    UnsupportedYear { year: i32, first: i32, last: i32 },
    #[error("{reward} must lie within [{min}, {max}], got {value}")]
    RewardOutOfRange {
        reward: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("Unknown fuel: {0}")]
    UnknownFuel(String),
    #[error("Fuel {0} is defined more than once")]
    DuplicateFuel(String),
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Numeric overflow while {0}")]
    NumericOverflow(String),
}

impl From<toml::de::Error> for FuelEUError {
    fn from(value: toml::de::Error) -> Self {
        FuelEUError::Config(value.to_string())
    }
}

/// Convenience type for `Result<T, FuelEUError>`.
pub type FuelEUResult<T> = Result<T, FuelEUError>;

#[cfg(feature = "python")]
impl From<FuelEUError> for pyo3::PyErr {
    fn from(value: FuelEUError) -> Self {
        pyo3::exceptions::PyValueError::new_err(value.to_string())
    }
}
