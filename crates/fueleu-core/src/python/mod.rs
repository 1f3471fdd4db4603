//! Python bindings for the compliance calculations.
//!
//! Inputs and outputs cross the boundary as plain dicts and lists so that a
//! Python front-end can feed form values straight in.

use crate::compliance::ComplianceCalculator;
use crate::emissions::FuelSelection;
use crate::fuel::FuelRegistry;
use crate::policy::PolicyContext;
use pyo3::prelude::*;
use pythonize::{depythonize, pythonize};

fn policy_from(policy: Option<Bound<'_, PyAny>>) -> PyResult<PolicyContext> {
    match policy {
        Some(policy) => Ok(depythonize::<PolicyContext>(&policy)?),
        None => Ok(PolicyContext::default()),
    }
}

/// Target GHG intensity (gCO2eq/MJ) for a compliance year
#[pyfunction]
pub fn target_intensity(year: i32) -> f64 {
    crate::target::target_intensity(year)
}

/// The reference fuels as a list of dicts
#[pyfunction]
pub fn reference_fuels(py: Python<'_>) -> PyResult<Bound<'_, PyAny>> {
    let fuels: Vec<_> = FuelRegistry::reference().iter().cloned().collect();
    Ok(pythonize(py, &fuels)?)
}

/// Calculate energy, emissions, balance and penalty.
///
/// `selections` is a list of `{"fuel": name, "quantity_tonnes": t}` dicts and
/// `policy` an optional dict of policy fields.
#[pyfunction]
#[pyo3(signature = (selections, policy=None))]
pub fn calculate<'py>(
    py: Python<'py>,
    selections: Bound<'py, PyAny>,
    policy: Option<Bound<'py, PyAny>>,
) -> PyResult<Bound<'py, PyAny>> {
    let selections: Vec<FuelSelection> = depythonize(&selections)?;
    let policy = policy_from(policy)?;
    let consumptions = FuelRegistry::reference().consumptions(&selections)?;
    let result = ComplianceCalculator::default().calculate(&consumptions, &policy)?;
    Ok(pythonize(py, &result)?)
}

/// Recalculate a fuel mix for every year from `first_year` to `last_year`
#[pyfunction]
#[pyo3(signature = (selections, first_year, last_year, policy=None))]
pub fn forecast<'py>(
    py: Python<'py>,
    selections: Bound<'py, PyAny>,
    first_year: i32,
    last_year: i32,
    policy: Option<Bound<'py, PyAny>>,
) -> PyResult<Bound<'py, PyAny>> {
    let selections: Vec<FuelSelection> = depythonize(&selections)?;
    let policy = policy_from(policy)?;
    let consumptions = FuelRegistry::reference().consumptions(&selections)?;
    let points =
        ComplianceCalculator::default().forecast(&consumptions, &policy, first_year..=last_year)?;
    Ok(pythonize(py, &points)?)
}

#[pymodule]
pub fn core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(target_intensity, m)?)?;
    m.add_function(wrap_pyfunction!(reference_fuels, m)?)?;
    m.add_function(wrap_pyfunction!(calculate, m)?)?;
    m.add_function(wrap_pyfunction!(forecast, m)?)?;
    Ok(())
}
