//! learnpath-core: Progress aggregation and exercise scoring.
//!
//! This crate defines the data model, the collaborator traits, and the pure
//! grading and aggregation logic that the rest of learnpath builds on.

pub mod aggregator;
pub mod error;
pub mod evaluator;
pub mod model;
pub mod parser;
pub mod reporter;
pub mod statistics;
pub mod traits;
pub mod transcript;

pub use aggregator::{aggregate, Aggregate};
pub use error::EngineError;
pub use evaluator::{evaluate, Evaluator, EvaluatorConfig};
pub use reporter::{ClassroomProgress, ModuleProgressReporter, ReporterConfig};
