//! Time of concentration.
//!
//! Overland flow to the channel inlet uses the Bransby Williams form
//! `t₀ = 0.14465 L / (H^0.2 A^0.1)`, with flow path length `L` in m, average
//! slope `H` in m per 100 m, area `A` in m², and `t₀` in minutes. The result
//! is floored at [`MINIMUM_MINUTES`].
//!
//! Flow that arrives through upstream channels takes the longest of their
//! travel times, so the effective time for a catchment is the larger of its
//! own time and the upstream one.

use serde::Serialize;

use crate::error::{ValidationError, ensure_positive};

/// Shortest storm duration used for design, in minutes.
pub const MINIMUM_MINUTES: f64 = 5.0;

/// Overland time of concentration of a catchment, in minutes.
///
/// # Errors
///
/// Returns a [`ValidationError`] if any input is not positive.
pub fn catchment_minutes(
    flow_path_length: f64,
    average_slope: f64,
    area: f64,
) -> Result<f64, ValidationError> {
    let length = ensure_positive("flow path length", flow_path_length)?;
    let slope = ensure_positive("average slope", average_slope)?;
    let area = ensure_positive("catchment area", area)?;

    let minutes = 0.14465 * length / (slope.powf(0.2) * area.powf(0.1));
    Ok(minutes.max(MINIMUM_MINUTES))
}

/// Travel time along a channel by the Kirpich formula, in minutes.
///
/// `t = 0.0195 L^0.77 S^-0.385`, with length `L` in m and gradient `S` in m/m.
///
/// # Errors
///
/// Returns a [`ValidationError`] if the length or gradient is not positive.
pub fn kirpich_minutes(length: f64, gradient: f64) -> Result<f64, ValidationError> {
    let length = ensure_positive("channel length", length)?;
    let gradient = ensure_positive("channel gradient", gradient)?;
    Ok(0.0195 * length.powf(0.77) * gradient.powf(-0.385))
}

/// Time of concentration with its contributing parts, in minutes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TimeOfConcentration {
    pub catchment: f64,
    /// Zero when nothing drains in from upstream.
    pub upstream: f64,
    pub effective: f64,
}

impl TimeOfConcentration {
    /// Combines a catchment's own time with the times of its upstream
    /// channels.
    #[must_use]
    pub fn combine(catchment: f64, upstream: impl IntoIterator<Item = f64>) -> Self {
        let upstream = upstream.into_iter().fold(0.0, f64::max);
        Self {
            catchment,
            upstream,
            effective: catchment.max(upstream),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn long_flow_paths_exceed_the_floor() {
        let minutes = catchment_minutes(400.0, 2.0, 20_000.0).unwrap();
        let expected = 0.14465 * 400.0 / (2.0_f64.powf(0.2) * 20_000.0_f64.powf(0.1));
        assert!(expected > MINIMUM_MINUTES);
        assert_relative_eq!(minutes, expected, epsilon = 1e-12);
    }

    #[test]
    fn short_flow_paths_are_floored() {
        assert_eq!(catchment_minutes(20.0, 5.0, 500.0).unwrap(), MINIMUM_MINUTES);
    }

    #[test]
    fn rejects_non_positive_inputs() {
        assert!(catchment_minutes(0.0, 2.0, 1000.0).is_err());
        assert!(catchment_minutes(100.0, -1.0, 1000.0).is_err());
        assert!(catchment_minutes(100.0, 2.0, 0.0).is_err());
        assert!(kirpich_minutes(100.0, 0.0).is_err());
    }

    #[test]
    fn kirpich_hand_calculation() {
        let minutes = kirpich_minutes(300.0, 0.02).unwrap();
        assert_relative_eq!(
            minutes,
            0.0195 * 300.0_f64.powf(0.77) * 0.02_f64.powf(-0.385),
            epsilon = 1e-12
        );
    }

    #[test]
    fn effective_time_is_the_longest_path() {
        let tc = TimeOfConcentration::combine(8.0, [6.5, 12.0, 3.0]);
        assert_eq!(tc.upstream, 12.0);
        assert_eq!(tc.effective, 12.0);

        let isolated = TimeOfConcentration::combine(8.0, []);
        assert_eq!(isolated.upstream, 0.0);
        assert_eq!(isolated.effective, 8.0);
    }
}
