//! Legal responder - keyword-scored legal-advice replies with an optional
//! completion-service front end
//!
//! The local responder normalizes a free-text Arabic legal question, scores
//! it against a fixed catalog of legal intents and renders a canned reply.
//! The `Responder` puts an external completion service in front of it and
//! falls back to local templates whenever that service fails.

pub mod types;
pub mod catalog;
pub mod normalize;
pub mod scorer;
pub mod selector;
pub mod cleanup;
pub mod completion;
pub mod config;
pub mod store;
pub mod push;
pub mod session;
pub mod responder;

pub use types::*;
pub use catalog::{Catalog, CatalogError};
pub use normalize::{normalize, tokenize};
pub use scorer::{score, score_all};
pub use selector::{render, respond_locally, select, template_index, SELECTION_THRESHOLD};
pub use responder::Responder;

// Python bindings
#[cfg(feature = "python")]
pub mod py;

#[cfg(feature = "python")]
use pyo3::prelude::*;

#[cfg(feature = "python")]
#[pymodule]
fn legal_responder(m: &Bound<'_, PyModule>) -> PyResult<()> {
    use py::*;
    m.add_class::<PyLegalMatcher>()?;
    m.add_function(wrap_pyfunction!(py_normalize, m)?)?;
    m.add_function(wrap_pyfunction!(py_tokenize, m)?)?;
    Ok(())
}
