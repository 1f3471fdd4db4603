//! Core calculations for FuelEU Maritime compliance
//!
//! Data flows one way: a [`fuel::FuelRegistry`] supplies specs, the
//! [`emissions::EmissionCalculator`] turns consumption into energy and
//! emissions, and the [`compliance::ComplianceCalculator`] compares the
//! resulting intensity with the year's target to derive a balance and penalty.
//!
//! Every calculation is a pure function of its inputs. Callers own the
//! [`policy::PolicyContext`] and fuel list and pass them in by reference.
//!
//! ```
//! use fueleu_core::compliance::calculate;
//! use fueleu_core::emissions::FuelConsumption;
//! use fueleu_core::fuel::{names, FuelRegistry};
//! use fueleu_core::policy::PolicyContext;
//!
//! let registry = FuelRegistry::reference();
//! let hfo = registry.require(names::HFO).unwrap().clone();
//! let result = calculate(&[FuelConsumption::new(hfo, 1000.0)], &PolicyContext::for_year(2025)).unwrap();
//! assert!(result.is_deficit());
//! ```

pub mod compliance;
pub mod emissions;
pub mod errors;
pub mod forecast;
pub mod fuel;
pub mod parameters;
pub mod policy;
pub mod pooling;
pub mod pricing;
#[cfg(feature = "python")]
pub mod python;
pub mod target;
pub mod utils;
