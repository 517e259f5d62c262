//! Core Business Logic
//!
//! Document analysis and source positions shared by the CLI and the LSP.

pub mod diagnostics;
pub mod document;
pub mod position;

pub use diagnostics::{DiagnosticProvider, LocatedDiagnostic};
pub use document::{Analysis, ComposeDocument};
pub use position::{locate_path, service_spans, SourceSpan};
