//! Solvers for equation problems, finding roots of scalar equations.
//!
//! An [`EquationProblem`] maps solver variables `x: [f64; N]` to model inputs,
//! calls the model, and computes residuals. Solvers in this module drive those
//! residuals toward zero.
//!
//! # Solvers
//!
//! - [`bisection`]: bracketed root finding with bracket expansion
//!
//! [`EquationProblem`]: stormline_core::EquationProblem

mod evaluate;

pub use evaluate::{EvaluateError, EvaluateResult, Evaluation, evaluate};

pub mod bisection;
