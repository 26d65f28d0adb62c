//! Bisection root finding on a scalar residual.
//!
//! # Algorithm
//!
//! Both bracket endpoints are evaluated first. If their residuals share a
//! sign, the solver searches for a sign change: it probes the midpoint, then
//! grows the interval outward (doubling its width each step) on the side
//! whose residual is closer to zero. If no sign change turns up within
//! `max_iters` probes, the solver returns the midpoint of the requested
//! bracket with [`Status::NoSignChange`] rather than failing.
//!
//! Once a sign change is bracketed, the interval is halved until the residual
//! magnitude meets `residual_tol` or the bracket width meets the x tolerances,
//! for at most `max_iters` iterations.
//!
//! The residual is assumed monotone over the bracket. That is not enforced;
//! a non-monotone residual still terminates, possibly at a local crossing.
//!
//! # Observer Events
//!
//! Every evaluation emits one [`Event`]. Observers can return
//! [`Action::StopEarly`] to halt with the best evaluation so far, or
//! [`Action::AssumeResidualSign`] to steer the bracket after a failed
//! evaluation.

mod action;
mod best;
mod bracket;
mod config;
mod decision;
mod error;
mod event;
mod expand;
mod probe;
mod solution;

pub use action::Action;
pub use bracket::{Bracket, BracketError, Sign};
pub use config::{Config, ConfigError};
pub use error::Error;
pub use event::Event;
pub use solution::{Solution, Status};

use stormline_core::{EquationProblem, Model, Observer};

use crate::equation::evaluate;

use best::Best;
use bracket::ordered;
use decision::Decision;
use expand::{Expansion, expand};
use probe::{Endpoint, Site, probe};

/// Finds a root of the equation using the bisection method.
///
/// Observers see every evaluation along with the current bracket state.
///
/// # Errors
///
/// Returns an error if the bracket is invalid, an endpoint or bisection
/// midpoint evaluation fails (and the observer does not recover it), or a
/// residual is non-finite.
pub fn solve<M, P, Obs>(
    model: &M,
    problem: &P,
    bracket: [f64; 2],
    config: &Config,
    mut observer: Obs,
) -> Result<Solution<M::Input, M::Output>, Error>
where
    M: Model,
    P: EquationProblem<1, Input = M::Input, Output = M::Output>,
    Obs: for<'a> Observer<Event<'a, M, P>, Action>,
{
    let [left_x, right_x] = ordered(bracket)?;
    let mut best = Best::empty();

    let left = match probe(model, problem, left_x, Site::Left, &mut observer, &mut best) {
        (Decision::Continue(sign), magnitude) => Endpoint {
            x: left_x,
            sign,
            magnitude,
        },
        (Decision::StopEarly, _) => return best.finish(Status::StoppedByObserver, 0, 0),
        (Decision::Error(err), _) => return Err(err),
    };

    let right = match probe(model, problem, right_x, Site::Right, &mut observer, &mut best) {
        (Decision::Continue(sign), magnitude) => Endpoint {
            x: right_x,
            sign,
            magnitude,
        },
        (Decision::StopEarly, _) => return best.finish(Status::StoppedByObserver, 0, 0),
        (Decision::Error(err), _) => return Err(err),
    };

    if best.is_residual_converged(config.residual_tol()) {
        return best.finish(Status::Converged, 0, 0);
    }

    let (mut bracket, expansions) = if left.sign == right.sign {
        match expand(model, problem, &mut observer, &mut best, config, left, right)? {
            Expansion::Found { bracket, steps } => (bracket, steps),
            Expansion::Stopped { steps } => {
                return best.finish(Status::StoppedByObserver, 0, steps);
            }
            Expansion::Exhausted { steps } => {
                return match evaluate(model, problem, [0.5 * (left_x + right_x)]) {
                    Ok(eval) => Ok(Solution::from_eval(eval, Status::NoSignChange, 0, steps)),
                    Err(_) => best.finish(Status::NoSignChange, 0, steps),
                };
            }
        }
    } else {
        (Bracket::new((left.x, left.sign), (right.x, right.sign))?, 0)
    };

    for iter in 1..=config.max_iters() {
        let mid = bracket.midpoint();
        let (decision, _) = probe(
            model,
            problem,
            mid,
            Site::Midpoint(&bracket),
            &mut observer,
            &mut best,
        );

        let sign = match decision {
            Decision::Continue(sign) => sign,
            Decision::StopEarly => {
                return best.finish(Status::StoppedByObserver, iter, expansions);
            }
            Decision::Error(err) => return Err(err),
        };

        bracket.shrink(mid, sign);

        if best.is_residual_converged(config.residual_tol())
            || bracket.is_x_converged(config.x_abs_tol(), config.x_rel_tol())
        {
            return best.finish(Status::Converged, iter, expansions);
        }
    }

    best.finish(Status::MaxIters, config.max_iters(), expansions)
}

/// Runs bisection without observation.
///
/// # Errors
///
/// See [`solve`].
pub fn solve_unobserved<M, P>(
    model: &M,
    problem: &P,
    bracket: [f64; 2],
    config: &Config,
) -> Result<Solution<M::Input, M::Output>, Error>
where
    M: Model,
    P: EquationProblem<1, Input = M::Input, Output = M::Output>,
{
    solve(model, problem, bracket, config, ())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::convert::Infallible;

    use approx::assert_relative_eq;

    /// Model that evaluates `x² + offset`.
    struct Quadratic {
        offset: f64,
    }

    impl Model for Quadratic {
        type Input = f64;
        type Output = f64;
        type Error = Infallible;

        fn call(&self, input: &f64) -> Result<f64, Infallible> {
            Ok(input * input + self.offset)
        }
    }

    #[derive(Debug, thiserror::Error)]
    #[error("negative input {0}")]
    struct NegativeInput(f64);

    /// Model that refuses negative inputs, like a flow depth.
    struct SqrtModel;

    impl Model for SqrtModel {
        type Input = f64;
        type Output = f64;
        type Error = NegativeInput;

        fn call(&self, input: &f64) -> Result<f64, NegativeInput> {
            if *input < 0.0 {
                Err(NegativeInput(*input))
            } else {
                Ok(input.sqrt())
            }
        }
    }

    /// Drives the model output to a target value.
    struct Target(f64);

    impl EquationProblem<1> for Target {
        type Input = f64;
        type Output = f64;
        type Error = Infallible;

        fn input(&self, x: &[f64; 1]) -> Result<f64, Infallible> {
            Ok(x[0])
        }

        fn residuals(&self, _input: &f64, output: &f64) -> Result<[f64; 1], Infallible> {
            Ok([output - self.0])
        }
    }

    fn loose() -> Config {
        Config::new(100, 1e-6, 0.0, 1e-9).expect("valid config")
    }

    #[test]
    fn finds_root_of_shifted_square() {
        let solution = solve_unobserved(
            &Quadratic { offset: -4.0 },
            &Target(0.0),
            [0.0, 5.0],
            &loose(),
        )
        .expect("should solve");

        assert!(solution.converged());
        assert_eq!(solution.expansions, 0);
        assert_relative_eq!(solution.x, 2.0, epsilon = 1e-3);
    }

    #[test]
    fn rootless_function_reports_no_sign_change() {
        let solution = solve_unobserved(
            &Quadratic { offset: 1.0 },
            &Target(0.0),
            [0.0, 5.0],
            &loose(),
        )
        .expect("should return a best-effort result");

        assert_eq!(solution.status, Status::NoSignChange);
        assert!(!solution.converged());
        assert_relative_eq!(solution.x, 2.5);
        assert_eq!(solution.expansions, 100);
    }

    #[test]
    fn expands_bracket_toward_the_root() {
        let solution = solve_unobserved(
            &Quadratic { offset: -49.0 },
            &Target(0.0),
            [0.0, 5.0],
            &loose(),
        )
        .expect("should solve after expanding");

        assert!(solution.converged());
        assert_eq!(solution.expansions, 2);
        assert_relative_eq!(solution.x, 7.0, epsilon = 1e-5);
    }

    #[test]
    fn midpoint_probe_catches_interior_crossing() {
        let solution = solve_unobserved(
            &Quadratic { offset: -4.0 },
            &Target(0.0),
            [-5.0, 5.0],
            &loose(),
        )
        .expect("should solve");

        assert!(solution.converged());
        assert_eq!(solution.expansions, 1);
        assert_relative_eq!(solution.x.abs(), 2.0, epsilon = 1e-5);
    }

    #[test]
    fn failed_expansion_probe_ends_search() {
        // sqrt(x) > -1 everywhere, and growing left hits a negative input.
        let solution = solve_unobserved(
            &SqrtModel,
            &Target(-1.0),
            [1.0, 4.0],
            &loose(),
        )
        .expect("should return a best-effort result");

        assert_eq!(solution.status, Status::NoSignChange);
        assert_relative_eq!(solution.x, 2.5);
        assert_eq!(solution.expansions, 2);
    }

    #[test]
    fn endpoint_model_error_is_returned() {
        let result = solve_unobserved(&SqrtModel, &Target(1.0), [-1.0, 4.0], &loose());
        assert!(matches!(result, Err(Error::Model(_))));
    }

    #[test]
    fn observer_can_stop_iteration() {
        let mut midpoints = 0usize;
        let observer = |event: &Event<'_, Quadratic, Target>| {
            if let Event::Midpoint { .. } = event {
                midpoints += 1;
                if midpoints >= 3 {
                    return Some(Action::StopEarly);
                }
            }
            None
        };

        let solution = solve(
            &Quadratic { offset: -9.0 },
            &Target(0.0),
            [0.0, 10.0],
            &Config::default(),
            observer,
        )
        .expect("should stop cleanly");

        assert_eq!(solution.status, Status::StoppedByObserver);
        assert_eq!(solution.iters, 3);
    }

    #[test]
    fn max_iters_returns_best_evaluation() {
        let config = Config::new(3, 0.0, 0.0, 0.0).expect("valid config");
        let solution = solve_unobserved(
            &Quadratic { offset: -9.0 },
            &Target(0.0),
            [0.0, 8.0],
            &config,
        )
        .expect("should return best so far");

        // Midpoints 4, 2, 3: the last one is the exact root.
        assert_eq!(solution.status, Status::Converged);
        assert_relative_eq!(solution.x, 3.0);

        let config = Config::new(2, 0.0, 0.0, 0.0).expect("valid config");
        let solution = solve_unobserved(
            &Quadratic { offset: -9.0 },
            &Target(0.0),
            [0.0, 8.0],
            &config,
        )
        .expect("should return best so far");

        assert_eq!(solution.status, Status::MaxIters);
        assert_eq!(solution.iters, 2);
        assert_relative_eq!(solution.x, 2.0);
    }

    #[test]
    fn normalizes_reversed_bracket() {
        let solution = solve_unobserved(
            &Quadratic { offset: -36.0 },
            &Target(0.0),
            [10.0, 0.0],
            &loose(),
        )
        .expect("should solve with reversed bracket");

        assert!(solution.converged());
        assert_relative_eq!(solution.x, 6.0, epsilon = 1e-5);
    }

    #[test]
    fn rejects_degenerate_brackets() {
        let model = Quadratic { offset: -4.0 };
        let result = solve_unobserved(&model, &Target(0.0), [5.0, 5.0], &loose());
        assert!(matches!(
            result,
            Err(Error::InvalidBracket(BracketError::ZeroWidth))
        ));

        let result = solve_unobserved(&model, &Target(0.0), [f64::NAN, 5.0], &loose());
        assert!(matches!(
            result,
            Err(Error::InvalidBracket(BracketError::NonFinite))
        ));
    }
}
