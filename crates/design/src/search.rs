//! Glue between the design models and the bisection solver.

use serde::Serialize;
use stormline_core::{EquationProblem, Model, Observer};
use stormline_solvers::equation::bisection::{Action, Event, Solution, Status};
use tracing::{trace, warn};

/// Logs every bisection evaluation at trace level and never intervenes.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TraceObserver {
    search: &'static str,
}

impl TraceObserver {
    pub(crate) fn new(search: &'static str) -> Self {
        Self { search }
    }
}

impl<'a, M, P> Observer<Event<'a, M, P>, Action> for TraceObserver
where
    M: Model,
    P: EquationProblem<1, Input = M::Input, Output = M::Output>,
{
    fn observe(&mut self, event: &Event<'a, M, P>) -> Option<Action> {
        let phase = match event {
            Event::Left { .. } | Event::Right { .. } => "endpoint",
            Event::Expand { .. } => "expand",
            Event::Midpoint { .. } => "bisect",
        };
        match event.residual() {
            Some(residual) => trace!(
                target: "stormline::search",
                search = self.search,
                phase,
                x = event.x(),
                residual,
                "evaluated"
            ),
            None => trace!(
                target: "stormline::search",
                search = self.search,
                phase,
                x = event.x(),
                "evaluation failed"
            ),
        }
        None
    }
}

/// How a root search ended, in a form that can be reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SearchSummary {
    pub converged: bool,
    pub iterations: usize,
    pub expansions: usize,
}

impl SearchSummary {
    /// Summary for a value that needed no search.
    #[must_use]
    pub fn direct() -> Self {
        Self {
            converged: true,
            iterations: 0,
            expansions: 0,
        }
    }

    /// Summarizes a solution, warning when the result is only a best effort.
    pub(crate) fn from_solution<I, O>(search: &'static str, solution: &Solution<I, O>) -> Self {
        match solution.status {
            Status::Converged => {}
            Status::NoSignChange => warn!(
                target: "stormline::search",
                search,
                x = solution.x,
                "no sign change found; using bracket midpoint"
            ),
            Status::MaxIters | Status::StoppedByObserver => warn!(
                target: "stormline::search",
                search,
                x = solution.x,
                residual = solution.residual,
                "search stopped before converging"
            ),
        }
        Self {
            converged: solution.converged(),
            iterations: solution.iters,
            expansions: solution.expansions,
        }
    }
}
