//! LSP Protocol Implementation
//!
//! Backend focused only on protocol handling; analysis lives in `core`.

pub mod backend;
pub mod document;
pub mod handlers;
pub mod server;

pub use backend::Backend;
