use stormline_core::constraint::{
    ConstraintError, NonNegative, StrictlyPositive, UnitInterval,
};
use stormline_solvers::equation::bisection;
use thiserror::Error;

use crate::config::ConfigError;

/// Input-contract violations detected by the design models.
///
/// A validation failure aborts the current unit of work (one catchment).
/// It never describes a design outcome: an undersized channel is reported
/// through the result status, not through this type.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum ValidationError {
    /// A scalar input violates its numeric constraint.
    #[error("invalid {quantity} ({value}): {source}")]
    InvalidQuantity {
        quantity: &'static str,
        value: f64,
        #[source]
        source: ConstraintError,
    },

    /// A wetted perimeter of zero or less would divide by zero.
    #[error("wetted perimeter must be positive to compute a hydraulic radius, got {perimeter}")]
    NonPositivePerimeter { perimeter: f64 },

    #[error("unknown surface type `{0}`")]
    UnknownSurfaceType(String),

    #[error("unknown channel material `{0}`")]
    UnknownMaterial(String),

    #[error("unknown upstream channel `{0}`")]
    UnknownChannel(String),

    /// The IDF table has no row for the requested return period.
    #[error("no IDF constants for a {return_period}-year return period")]
    MissingIdfConstants { return_period: u32 },

    #[error("sub-areas have zero total area")]
    ZeroTotalArea,

    /// The standard U-channel size table is empty.
    #[error("no standard U-channel sizes are available")]
    NoStandardSizes,
}

/// Errors raised while designing a single catchment's channel.
#[derive(Debug, Error)]
pub enum DesignError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("solver failed: {0}")]
    Solver(#[from] bisection::Error),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The search never found a sign change, so it has no usable answer.
    #[error("{search} search could not bracket a flow of {target} m³/s")]
    Unbracketed { search: &'static str, target: f64 },
}

/// Checks `value > 0`.
pub(crate) fn ensure_positive(quantity: &'static str, value: f64) -> Result<f64, ValidationError> {
    StrictlyPositive::new(value)
        .map(|v| v.into_inner())
        .map_err(|source| ValidationError::InvalidQuantity {
            quantity,
            value,
            source,
        })
}

/// Checks `value >= 0`.
pub(crate) fn ensure_non_negative(
    quantity: &'static str,
    value: f64,
) -> Result<f64, ValidationError> {
    NonNegative::new(value)
        .map(|v| v.into_inner())
        .map_err(|source| ValidationError::InvalidQuantity {
            quantity,
            value,
            source,
        })
}

/// Checks `0 <= value <= 1`.
pub(crate) fn ensure_unit_interval(
    quantity: &'static str,
    value: f64,
) -> Result<f64, ValidationError> {
    UnitInterval::new(value)
        .map(|v| v.into_inner())
        .map_err(|source| ValidationError::InvalidQuantity {
            quantity,
            value,
            source,
        })
}
