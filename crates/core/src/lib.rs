//! `stockpile-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! the business error model and the document validation rules shared by the
//! inventory operations.

pub mod error;
pub mod validation;

pub use error::{DomainError, DomainResult};
pub use validation::{Document, FieldErrors};
