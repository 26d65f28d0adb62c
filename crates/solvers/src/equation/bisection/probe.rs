use stormline_core::{EquationProblem, Model, Observer};

use crate::equation::evaluate;

use super::{Action, Bracket, Error, Event, Sign, best::Best, decision::Decision};

/// Where an evaluation happens, used to build the matching [`Event`].
pub(super) enum Site<'b> {
    Left,
    Right,
    Expand([f64; 2]),
    Midpoint(&'b Bracket),
}

/// A point with a known residual sign.
///
/// The magnitude is only known when the residual came from a successful,
/// unsteered evaluation.
#[derive(Debug, Clone, Copy)]
pub(super) struct Endpoint {
    pub(super) x: f64,
    pub(super) sign: Sign,
    pub(super) magnitude: Option<f64>,
}

/// Evaluates `x`, notifies the observer, and records the evaluation in `best`.
pub(super) fn probe<M, P, Obs>(
    model: &M,
    problem: &P,
    x: f64,
    site: Site<'_>,
    observer: &mut Obs,
    best: &mut Best<M::Input, M::Output>,
) -> (Decision, Option<f64>)
where
    M: Model,
    P: EquationProblem<1, Input = M::Input, Output = M::Output>,
    Obs: for<'a> Observer<Event<'a, M, P>, Action>,
{
    let result = evaluate(model, problem, [x]);
    let action = {
        let event = match site {
            Site::Left => Event::Left { x, result: &result },
            Site::Right => Event::Right { x, result: &result },
            Site::Expand(bounds) => Event::Expand {
                x,
                bounds,
                result: &result,
            },
            Site::Midpoint(bracket) => Event::Midpoint {
                x,
                bracket,
                result: &result,
            },
        };
        observer.observe(&event)
    };

    let (residual, eval) = match result {
        Ok(eval) if eval.residual().is_finite() => (Ok(eval.residual()), Some(eval)),
        Ok(eval) => (
            Err(Error::NonFiniteResidual {
                x,
                residual: eval.residual(),
            }),
            None,
        ),
        Err(err) => (Err(Error::from(err)), None),
    };

    let magnitude = match (&residual, action) {
        (Ok(value), None) => Some(value.abs()),
        _ => None,
    };

    if action.is_none()
        && let Some(eval) = eval
    {
        best.update(eval);
    }

    (Decision::new(action, residual), magnitude)
}
