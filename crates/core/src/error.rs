//! Domain error model.

use thiserror::Error;

use crate::validation::FieldErrors;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business failures (validation,
/// uniqueness, existence, stock). Storage failures belong to the infra layer.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// Input failed validation. `details` maps each offending field to its messages.
    #[error("{message}")]
    Validation { message: String, details: FieldErrors },

    /// A good with this name already exists.
    #[error("a good named '{0}' already exists")]
    Duplicate(String),

    /// No good with this name exists.
    #[error("good '{0}' not found")]
    NotFound(String),

    /// The deduction would drive stock below zero.
    ///
    /// `available` is `None` when the shortfall was detected by the conditional
    /// write rather than by reading the current count.
    #[error("not enough stock for '{name}': requested {requested}")]
    InsufficientStock {
        name: String,
        requested: i64,
        available: Option<i64>,
    },

    /// An update payload contained nothing applicable.
    #[error("no valid fields to update")]
    NoFields,
}

impl DomainError {
    pub fn validation(message: impl Into<String>, details: FieldErrors) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }

    /// Validation failure on a single field, e.g. `'quantity' must be a positive integer`.
    pub fn invalid_field(field: &str, rule: impl Into<String>) -> Self {
        let rule = rule.into();
        let mut details = FieldErrors::new();
        details.add(field, rule.clone());
        Self::Validation {
            message: format!("'{field}' {rule}"),
            details,
        }
    }

    pub fn duplicate(name: impl Into<String>) -> Self {
        Self::Duplicate(name.into())
    }

    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    pub fn insufficient_stock(name: impl Into<String>, requested: i64, available: Option<i64>) -> Self {
        Self::InsufficientStock {
            name: name.into(),
            requested,
            available,
        }
    }
}
