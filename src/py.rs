//! Python bindings for the local responder using PyO3

use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::catalog::Catalog;
use crate::normalize;
use crate::scorer::score_all;
use crate::selector::{respond_locally, template_index};
use crate::types::{Intent, Selection};

/// Normalize a raw query (Python function)
#[pyfunction]
pub fn py_normalize(raw: &str) -> String {
    normalize::normalize(raw)
}

/// Tokenize a normalized query (Python function)
#[pyfunction]
pub fn py_tokenize(normalized: &str) -> Vec<String> {
    normalize::tokenize(normalized)
        .into_iter()
        .map(String::from)
        .collect()
}

/// Python wrapper over a catalog, built-in by default
#[pyclass]
pub struct PyLegalMatcher {
    catalog: Catalog,
}

#[pymethods]
impl PyLegalMatcher {
    #[new]
    fn new() -> Self {
        Self {
            catalog: Catalog::builtin().clone(),
        }
    }

    /// Build from a JSON list of intents and a list of templates (fallback last)
    #[staticmethod]
    fn from_json(intents_json: &str, templates: Vec<String>) -> PyResult<Self> {
        let intents: Vec<Intent> = serde_json::from_str(intents_json).map_err(|e| {
            PyErr::new::<pyo3::exceptions::PyValueError, _>(format!("Invalid intents: {}", e))
        })?;
        let catalog = Catalog::new(intents, templates)
            .map_err(|e| PyErr::new::<pyo3::exceptions::PyValueError, _>(e.to_string()))?;
        Ok(Self { catalog })
    }

    /// Score every intent; returns a list of dicts in catalog order
    fn score_all<'py>(&self, query: &str, py: Python<'py>) -> PyResult<Vec<Bound<'py, PyDict>>> {
        let normalized = normalize::normalize(query);
        let tokens = normalize::tokenize(&normalized);

        score_all(&normalized, &tokens, self.catalog.intents())
            .iter()
            .map(|scored| -> PyResult<Bound<'py, PyDict>> {
                let dict = PyDict::new_bound(py);
                dict.set_item("intent", &scored.intent.id)?;
                dict.set_item("score", scored.score)?;
                Ok(dict)
            })
            .collect()
    }

    /// Local answer for a query
    fn respond<'py>(&self, query: &str, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        let (selection, text) = respond_locally(&self.catalog, query);

        let dict = PyDict::new_bound(py);
        dict.set_item("text", text)?;
        dict.set_item("template_index", template_index(&selection, &self.catalog))?;
        match selection {
            Selection::Intent(scored) => {
                dict.set_item("type", "intent")?;
                dict.set_item("intent", &scored.intent.id)?;
                dict.set_item("score", scored.score)?;
            }
            Selection::Fallback { best } => {
                dict.set_item("type", "fallback")?;
                dict.set_item("score", best.map(|b| b.score).unwrap_or(0.0))?;
            }
        }
        Ok(dict)
    }

    fn __len__(&self) -> usize {
        self.catalog.len()
    }
}
