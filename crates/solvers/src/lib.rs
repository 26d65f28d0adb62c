//! Numerical solvers for the Stormline channel design engine.
//!
//! Every iterative search in the engine (normal depth, minimum channel depth,
//! minimum channel width) routes through [`equation::bisection`], so the
//! tolerance and iteration-count policy lives in exactly one place.

pub mod equation;
