//! genfleet: Parallel Code Generation
//!
//! Dispatches batches of generation tasks to a remote text-generation service with
//! bounded concurrency. In competition mode every task runs against several variants
//! at once and only the best-scoring result is kept. The same bounded fan-out drives
//! chunked whole-codebase analysis.

pub mod analysis;
pub mod cli;
pub mod competition;
pub mod config;
pub mod credentials;
pub mod error;
pub mod logging;
pub mod persist;
pub mod progress;
pub mod provider;
pub mod scheduler;
pub mod tasks;
pub mod variant;

pub use competition::{CompetitionEngine, CompetitionResult, VariantOutcome};
pub use error::ApiError;
pub use scheduler::{BatchSummary, Concurrency, ExecutionResult, TaskScheduler};
pub use tasks::Task;
pub use variant::Variant;
