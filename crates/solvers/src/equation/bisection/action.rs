use super::Sign;

/// What an observer can ask the bisection solver to do after an evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// End the search and report the best point seen so far.
    StopEarly,

    /// Treat the evaluation as having this residual sign when narrowing the
    /// bracket.
    ///
    /// Lets a search step past a point the model rejects. An evaluation
    /// overridden this way never becomes the best point.
    AssumeResidualSign(Sign),
}
