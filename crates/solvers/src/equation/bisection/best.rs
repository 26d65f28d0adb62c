use crate::equation::Evaluation;

use super::{Error, Solution, Status};

/// The evaluation closest to a root seen so far, by residual magnitude.
pub(super) struct Best<I, O>(Option<Evaluation<I, O, 1>>);

impl<I, O> Best<I, O> {
    pub(super) fn empty() -> Self {
        Self(None)
    }

    fn magnitude(&self) -> Option<f64> {
        self.0.as_ref().map(|eval| eval.residual().abs())
    }

    /// Keeps `eval` if it is strictly closer to a root. Ties keep the
    /// earlier evaluation.
    pub(super) fn update(&mut self, eval: Evaluation<I, O, 1>) {
        let magnitude = eval.residual().abs();
        if self.magnitude().is_none_or(|current| magnitude < current) {
            self.0 = Some(eval);
        }
    }

    pub(super) fn is_residual_converged(&self, residual_tol: f64) -> bool {
        self.magnitude().is_some_and(|current| current <= residual_tol)
    }

    /// Reports the kept evaluation as the solution.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoSuccessfulEvaluation`] if nothing was kept.
    pub(super) fn finish(
        self,
        status: Status,
        iters: usize,
        expansions: usize,
    ) -> Result<Solution<I, O>, Error> {
        self.0
            .map(|eval| Solution::from_eval(eval, status, iters, expansions))
            .ok_or(Error::NoSuccessfulEvaluation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use stormline_core::Snapshot;

    /// A trial depth and the flow it carries, scored against 0.25 m³/s.
    fn depth_trial(depth: f64, flow: f64) -> Evaluation<f64, f64, 1> {
        Evaluation {
            x: [depth],
            residuals: [flow - 0.25],
            snapshot: Snapshot::new(depth, flow),
        }
    }

    #[test]
    fn keeps_the_depth_whose_flow_is_nearest_the_target() {
        let mut best = Best::empty();
        best.update(depth_trial(0.1, 0.04));
        best.update(depth_trial(0.4, 0.31));
        best.update(depth_trial(0.25, 0.14));

        let solution = best.finish(Status::MaxIters, 3, 1).unwrap();

        assert_relative_eq!(solution.x, 0.4);
        assert_relative_eq!(solution.residual, 0.06, epsilon = 1e-12);
        assert_relative_eq!(solution.snapshot.output, 0.31);
        assert_eq!((solution.iters, solution.expansions), (3, 1));
    }

    #[test]
    fn ties_keep_the_first_trial() {
        let mut best = Best::empty();
        best.update(depth_trial(0.2, 0.125));
        best.update(depth_trial(0.3, 0.375));

        let solution = best.finish(Status::Converged, 0, 0).unwrap();
        assert_relative_eq!(solution.x, 0.2);
    }

    #[test]
    fn convergence_needs_a_trial_within_tolerance() {
        let mut best: Best<f64, f64> = Best::empty();
        assert!(!best.is_residual_converged(1e-3));

        best.update(depth_trial(0.3, 0.2505));
        assert!(best.is_residual_converged(1e-3));
        assert!(!best.is_residual_converged(1e-4));
    }

    #[test]
    fn nothing_to_report_without_a_trial() {
        let best: Best<f64, f64> = Best::empty();
        assert!(matches!(
            best.finish(Status::StoppedByObserver, 0, 0),
            Err(Error::NoSuccessfulEvaluation)
        ));
    }
}
