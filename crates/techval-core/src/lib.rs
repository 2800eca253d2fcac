//! Technical validation of extensions against a catalogue of criteria.
//!
//! The analysis itself (rules, source/binary scanning, graph population) is
//! performed by an external engine. This crate owns the request contract, the
//! engine handle, the typed criterion results and their rendering.

pub mod config;
pub mod engine;
pub mod errors;
pub mod model;
pub mod report;
pub mod validate;

pub use engine::{EntryPoint, ValidationEngine};
pub use errors::{EngineError, ErrorKind, ValidationError};
pub use model::{CriteriaId, CriterionResult, Outcome, RawRecord, Verdict};
pub use validate::{TechnicalValidator, ValidationReport, ValidationRequest};
