use fueleu_core::python::core;
use fueleu_mitigation::python::mitigation;
use pyo3::prelude::*;
use pyo3::wrap_pymodule;
use std::ffi::CString;

#[pymodule]
#[pyo3(name = "_lib")]
fn fueleu(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    m.add_wrapped(wrap_pymodule!(core))?;
    m.add_wrapped(wrap_pymodule!(mitigation))?;

    set_path(m, "fueleu._lib.core", "core")?;
    set_path(m, "fueleu._lib.mitigation", "mitigation")?;

    Ok(())
}

// Makes `import fueleu._lib.<module>` resolve to the wrapped submodule
fn set_path(m: &Bound<'_, PyModule>, path: &str, module: &str) -> PyResult<()> {
    let code = CString::new(format!(
        "\
import sys
sys.modules['{path}'] = {module}
    "
    ))?;
    m.py().run(code.as_c_str(), None, Some(&m.dict()))
}
