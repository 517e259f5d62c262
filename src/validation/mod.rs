//! Validation Engine
//!
//! Compose document checks, separated from parsing and LSP concerns.

pub mod engine;
pub mod graph;
pub mod keys;
pub mod ports;

pub use engine::{validate, Diagnostic, Severity};

// Re-export common types
pub use engine::ValidationResult;
pub use graph::{CycleEdge, DependencyGraph};
