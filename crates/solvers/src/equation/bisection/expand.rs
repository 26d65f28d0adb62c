use stormline_core::{EquationProblem, Model, Observer};

use super::{
    Action, Bracket, Error, Event,
    best::Best,
    config::Config,
    decision::Decision,
    probe::{Endpoint, Site, probe},
};

/// Outcome of the search for a sign change.
pub(super) enum Expansion {
    /// A bracket straddling a sign change was found.
    Found { bracket: Bracket, steps: usize },
    /// No sign change was found within the step budget.
    Exhausted { steps: usize },
    /// The observer asked the solver to stop.
    Stopped { steps: usize },
}

/// Searches for a sign change when both endpoints share a residual sign.
///
/// The first probe is the midpoint, which catches non-monotone residuals that
/// dip across zero inside the bracket. Later probes grow the interval by its
/// own width on the side whose residual is smaller in magnitude, so the width
/// doubles on every step. A failed evaluation or a non-finite probe ends the
/// search.
pub(super) fn expand<M, P, Obs>(
    model: &M,
    problem: &P,
    observer: &mut Obs,
    best: &mut Best<M::Input, M::Output>,
    config: &Config,
    left: Endpoint,
    right: Endpoint,
) -> Result<Expansion, Error>
where
    M: Model,
    P: EquationProblem<1, Input = M::Input, Output = M::Output>,
    Obs: for<'a> Observer<Event<'a, M, P>, Action>,
{
    let mut lo = left;
    let mut hi = right;

    for step in 1..=config.max_iters() {
        let width = hi.x - lo.x;
        let x = if step == 1 {
            0.5 * (lo.x + hi.x)
        } else if grows_left(&lo, &hi) {
            lo.x - width
        } else {
            hi.x + width
        };

        if !x.is_finite() {
            return Ok(Expansion::Exhausted { steps: step - 1 });
        }

        let (decision, magnitude) = probe(
            model,
            problem,
            x,
            Site::Expand([lo.x, hi.x]),
            observer,
            best,
        );

        let sign = match decision {
            Decision::Continue(sign) => sign,
            Decision::StopEarly => return Ok(Expansion::Stopped { steps: step }),
            Decision::Error(_) => return Ok(Expansion::Exhausted { steps: step }),
        };
        let point = Endpoint {
            x,
            sign,
            magnitude,
        };

        if x < lo.x {
            if sign != lo.sign {
                return found(point, lo, step);
            }
            lo = point;
        } else if x > hi.x {
            if sign != hi.sign {
                return found(hi, point, step);
            }
            hi = point;
        } else if sign != lo.sign {
            return found(lo, point, step);
        }
    }

    Ok(Expansion::Exhausted {
        steps: config.max_iters(),
    })
}

/// Grows toward the endpoint closer to zero, defaulting to the right.
fn grows_left(lo: &Endpoint, hi: &Endpoint) -> bool {
    match (lo.magnitude, hi.magnitude) {
        (Some(lo_mag), Some(hi_mag)) => lo_mag < hi_mag,
        _ => false,
    }
}

fn found(left: Endpoint, right: Endpoint, steps: usize) -> Result<Expansion, Error> {
    let bracket = Bracket::new((left.x, left.sign), (right.x, right.sign))?;
    Ok(Expansion::Found { bracket, steps })
}
