use super::{Action, Error, Sign};

/// What the solver does with one evaluated point.
#[derive(Debug)]
pub(super) enum Decision {
    /// Narrow or grow the bracket as if the residual had this sign.
    Continue(Sign),
    StopEarly,
    Error(Error),
}

impl Decision {
    /// An observer action overrides the evaluation outcome, including a
    /// failed evaluation.
    pub(super) fn new(action: Option<Action>, residual: Result<f64, Error>) -> Self {
        match (action, residual) {
            (Some(Action::StopEarly), _) => Self::StopEarly,
            (Some(Action::AssumeResidualSign(sign)), _) => Self::Continue(sign),
            (None, Ok(residual)) => Self::Continue(Sign::of(residual)),
            (None, Err(error)) => Self::Error(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected_depth() -> Result<f64, Error> {
        Err(Error::Model(Box::new(std::fmt::Error)))
    }

    #[test]
    fn flow_shortfall_reads_as_negative() {
        let decision = Decision::new(None, Ok(-0.02));
        assert!(matches!(decision, Decision::Continue(Sign::Negative)));

        let exact = Decision::new(None, Ok(0.0));
        assert!(matches!(exact, Decision::Continue(Sign::Positive)));
    }

    #[test]
    fn observer_can_step_past_a_rejected_depth() {
        let decision = Decision::new(
            Some(Action::AssumeResidualSign(Sign::Negative)),
            rejected_depth(),
        );
        assert!(matches!(decision, Decision::Continue(Sign::Negative)));
    }

    #[test]
    fn stopping_beats_a_good_residual() {
        let decision = Decision::new(Some(Action::StopEarly), Ok(0.4));
        assert!(matches!(decision, Decision::StopEarly));
    }

    #[test]
    fn unhandled_failure_is_passed_on() {
        let decision = Decision::new(None, rejected_depth());
        assert!(matches!(decision, Decision::Error(Error::Model(_))));
    }
}
