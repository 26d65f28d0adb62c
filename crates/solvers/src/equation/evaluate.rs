use thiserror::Error;

use stormline_core::{EquationProblem, Model, Snapshot};

/// One successful trip through an equation problem: the trial point, the
/// residuals it produced, and the model call behind them.
#[derive(Debug, Clone)]
pub struct Evaluation<I, O, const N: usize> {
    pub x: [f64; N],
    pub residuals: [f64; N],
    pub snapshot: Snapshot<I, O>,
}

impl<I, O> Evaluation<I, O, 1> {
    /// The single residual of a scalar problem.
    #[must_use]
    pub fn residual(&self) -> f64 {
        self.residuals[0]
    }
}

/// Which stage of an evaluation failed.
#[derive(Debug, Error)]
pub enum EvaluateError<ME, PE> {
    /// The model rejected the mapped input.
    #[error("model rejected the input")]
    Model(#[source] ME),

    /// The problem could not map `x` to an input or score the output.
    #[error("problem could not map the trial point")]
    Problem(#[source] PE),
}

/// Result of [`evaluate`] for a model and problem pair.
pub type EvaluateResult<M, P, const N: usize> = Result<
    Evaluation<<M as Model>::Input, <M as Model>::Output, N>,
    EvaluateError<<M as Model>::Error, <P as EquationProblem<N>>::Error>,
>;

/// Maps `x` to a model input, calls the model, and scores the result.
///
/// # Errors
///
/// Returns [`EvaluateError::Problem`] if the problem cannot build the input or
/// the residuals, and [`EvaluateError::Model`] if the model call fails.
pub fn evaluate<M, P, const N: usize>(model: &M, problem: &P, x: [f64; N]) -> EvaluateResult<M, P, N>
where
    M: Model,
    P: EquationProblem<N, Input = M::Input, Output = M::Output>,
{
    let input = problem.input(&x).map_err(EvaluateError::Problem)?;
    let output = model.call(&input).map_err(EvaluateError::Model)?;
    let residuals = problem
        .residuals(&input, &output)
        .map_err(EvaluateError::Problem)?;

    Ok(Evaluation {
        x,
        residuals,
        snapshot: Snapshot::new(input, output),
    })
}
