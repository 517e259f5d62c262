//! Compose Language Server
//!
//! Validation of Docker Compose documents, usable from an editor or the
//! command line.
//!
//! This library provides:
//! - YAML/JSON parsing into a format-independent value tree
//! - Compose structure, reference and dependency-cycle validation
//! - LSP protocol implementation
//! - Command-line checking and file watching
//! - Configuration management

pub mod check;
pub mod config;
pub mod core;
pub mod lsp;
pub mod parser;
pub mod validation;
pub mod watch;

// Re-exports for clean public API
pub use config::Config;
pub use parser::{parse_document, Format, Value};
pub use validation::{validate, Diagnostic, Severity, ValidationResult};
