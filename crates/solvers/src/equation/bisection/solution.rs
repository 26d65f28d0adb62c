use stormline_core::Snapshot;

use crate::equation::Evaluation;

/// Indicates how the bisection solver finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Converged according to the configured tolerances.
    Converged,

    /// Reached the iteration limit without converging.
    MaxIters,

    /// No sign change was found, even after bracket expansion.
    ///
    /// The reported `x` is the midpoint of the requested bracket.
    NoSignChange,

    /// Stopped early due to an observer decision.
    StoppedByObserver,
}

/// The result of a bisection solve.
#[derive(Debug, Clone)]
pub struct Solution<I, O> {
    /// Final solver status.
    pub status: Status,

    /// Best estimate of the root.
    pub x: f64,

    /// Residual at the reported root estimate.
    pub residual: f64,

    /// Snapshot at the reported root estimate.
    pub snapshot: Snapshot<I, O>,

    /// Bisection iterations performed after a valid bracket was found.
    pub iters: usize,

    /// Bracket expansion steps performed before bisection started.
    pub expansions: usize,
}

impl<I, O> Solution<I, O> {
    pub(super) fn from_eval(
        eval: Evaluation<I, O, 1>,
        status: Status,
        iters: usize,
        expansions: usize,
    ) -> Self {
        Self {
            status,
            x: eval.x[0],
            residual: eval.residual(),
            snapshot: eval.snapshot,
            iters,
            expansions,
        }
    }

    /// Returns true if the solver met its tolerances.
    #[must_use]
    pub fn converged(&self) -> bool {
        self.status == Status::Converged
    }
}
