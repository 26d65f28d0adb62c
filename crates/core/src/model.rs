/// A fallible calculation from a typed input to a typed output.
///
/// Hydraulic relationships such as Manning's equation are written as models
/// so the root finder can drive them through an
/// [`EquationProblem`](crate::EquationProblem) without knowing their
/// internals. A model holds no state between calls.
pub trait Model {
    type Input;
    type Output;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Evaluates the model.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the input is outside the model's domain.
    fn call(&self, input: &Self::Input) -> Result<Self::Output, Self::Error>;
}

/// The input a model was called with and the output it produced.
///
/// Solvers report the snapshot of their best evaluation, so callers get the
/// full model output at the solution without calling the model again.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot<I, O> {
    pub input: I,
    pub output: O,
}

impl<I, O> Snapshot<I, O> {
    pub fn new(input: I, output: O) -> Self {
        Self { input, output }
    }
}
