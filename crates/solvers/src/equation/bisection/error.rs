use std::error::Error as StdError;

use thiserror::Error;

use crate::equation::EvaluateError;

use super::{bracket::BracketError, config::ConfigError};

type BoxedError = Box<dyn StdError + Send + Sync>;

/// Reasons a bisection search cannot produce a solution.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid bracket: {0}")]
    InvalidBracket(#[from] BracketError),

    #[error("invalid solver config: {0}")]
    InvalidConfig(#[from] ConfigError),

    /// Every trial point failed, so there is nothing to report.
    #[error("no trial point could be evaluated")]
    NoSuccessfulEvaluation,

    #[error("residual {residual} at x = {x} is not finite")]
    NonFiniteResidual { x: f64, residual: f64 },

    #[error("problem failed: {0}")]
    Problem(#[source] BoxedError),

    #[error("model failed: {0}")]
    Model(#[source] BoxedError),
}

impl<ME, PE> From<EvaluateError<ME, PE>> for Error
where
    ME: StdError + Send + Sync + 'static,
    PE: StdError + Send + Sync + 'static,
{
    fn from(err: EvaluateError<ME, PE>) -> Self {
        match err {
            EvaluateError::Model(source) => Self::Model(Box::new(source)),
            EvaluateError::Problem(source) => Self::Problem(Box::new(source)),
        }
    }
}
