//! Inventory domain module.
//!
//! This crate contains the business rules for goods (validation of create and
//! update payloads, deduction quantities, stock arithmetic), implemented purely
//! as deterministic domain logic (no IO, no HTTP, no storage).

pub mod good;

pub use good::{Good, GoodPatch, Quantity};
