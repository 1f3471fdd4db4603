use crate::plan::annotate_prices;
use crate::MitigationSearch;
use fueleu_core::compliance::CalculationResult;
use fueleu_core::fuel::FuelRegistry;
use fueleu_core::policy::PolicyContext;
use fueleu_core::pricing::PriceBook;
use pyo3::prelude::*;
use pythonize::{depythonize, pythonize};

/// Size supplements and substitutions for a calculation result.
///
/// `result` is the dict returned by `core.calculate`, and `policy` defaults to
/// the one recorded in it. Feasible plans are priced
/// from the built-in default price table when `priced` is true.
#[pyfunction]
#[pyo3(signature = (result, policy=None, priced=true))]
pub fn find_mitigation<'py>(
    py: Python<'py>,
    result: Bound<'py, PyAny>,
    policy: Option<Bound<'py, PyAny>>,
    priced: bool,
) -> PyResult<Bound<'py, PyAny>> {
    let result: CalculationResult = depythonize(&result)?;
    let policy = match policy {
        Some(policy) => depythonize::<PolicyContext>(&policy)?,
        None => result.policy.clone(),
    };
    let mut plans = MitigationSearch::default().find_mitigation(
        &FuelRegistry::reference(),
        &result,
        &policy,
    )?;
    if priced {
        plans = annotate_prices(plans, &mut PriceBook::default());
    }
    Ok(pythonize(py, &plans)?)
}

#[pymodule]
pub fn mitigation(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(find_mitigation, m)?)?;
    Ok(())
}
