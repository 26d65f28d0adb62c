//! Core traits and types for the Stormline channel design engine.
//!
//! This crate defines the shared abstractions that the solver and the
//! hydraulic models build on:
//!
//! - [`Model`]: a callable that maps a typed input to a typed output
//! - [`Snapshot`]: a captured input/output pair from a model call
//! - [`Observer`]: receives solver events and optionally returns control actions
//! - [`EquationProblem`]: adapts solver variables to model inputs and extracts
//!   residuals from outputs
//! - [`constraint`]: type-level numeric invariants checked at construction

mod model;
mod observer;
mod problems;

pub mod constraint;

pub use observer::Observer;
pub use problems::EquationProblem;
pub use {model::Model, model::Snapshot};
