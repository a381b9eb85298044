use crate::{
    markers::MarkerSet,
    options::{SanitizeOptions, ValidatorOptions},
    validate::ValidationVerdict,
};
use pyo3::prelude::*;

#[pyclass(name = "ValidationVerdict", get_all)]
#[derive(Clone)]
struct PyValidationVerdict {
    is_valid: bool,
    reason: String,
}

#[pymethods]
impl PyValidationVerdict {
    #[getter]
    fn message(&self) -> String {
        self.reason.clone()
    }

    fn __bool__(&self) -> bool {
        self.is_valid
    }

    fn __repr__(&self) -> String {
        format!(
            "ValidationVerdict(is_valid={}, reason={:?})",
            if self.is_valid { "True" } else { "False" },
            self.reason
        )
    }
}

impl From<ValidationVerdict> for PyValidationVerdict {
    fn from(v: ValidationVerdict) -> Self {
        PyValidationVerdict {
            is_valid: v.is_valid,
            reason: v.reason,
        }
    }
}

/// Anything that is not a `str` is treated as empty text.
fn as_text(obj: &Bound<'_, PyAny>) -> String {
    obj.extract::<String>().unwrap_or_default()
}

#[pyfunction]
#[pyo3(signature = (code, markers_json=None))]
fn sanitize(code: &Bound<'_, PyAny>, markers_json: Option<&str>) -> PyResult<String> {
    let mut options = SanitizeOptions::default();
    if let Some(json) = markers_json {
        let markers = MarkerSet::from_json(json)
            .map_err(|e| PyErr::new::<pyo3::exceptions::PyValueError, _>(e.to_string()))?;
        options = options.with_markers(markers);
    }
    Ok(crate::cleanup::sanitize(&as_text(code), &options))
}

#[pyfunction]
fn detect_code_language(code: &Bound<'_, PyAny>) -> &'static str {
    crate::detect::detect_language(&as_text(code)).as_str()
}

#[pyfunction]
#[pyo3(signature = (code, max_cjk_ratio=None))]
fn validate_code(
    code: &Bound<'_, PyAny>,
    max_cjk_ratio: Option<f64>,
) -> PyResult<PyValidationVerdict> {
    let mut options = ValidatorOptions::default();
    if let Some(ratio) = max_cjk_ratio {
        options = options.with_max_cjk_ratio(ratio);
        options
            .validate()
            .map_err(|e| PyErr::new::<pyo3::exceptions::PyValueError, _>(e.to_string()))?;
    }
    Ok(crate::validate::validate_with_options(&as_text(code), &options).into())
}

#[pyfunction]
fn process(code: &Bound<'_, PyAny>) -> (String, &'static str, PyValidationVerdict) {
    let report = crate::process(&as_text(code));
    (report.cleaned, report.language.as_str(), report.verdict.into())
}

#[pymodule]
fn _codeclean(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyValidationVerdict>()?;
    m.add_function(wrap_pyfunction!(sanitize, m)?)?;
    m.add_function(wrap_pyfunction!(detect_code_language, m)?)?;
    m.add_function(wrap_pyfunction!(validate_code, m)?)?;
    m.add_function(wrap_pyfunction!(process, m)?)?;

    Ok(())
}
