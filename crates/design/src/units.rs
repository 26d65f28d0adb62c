//! Unit conversions at the boundary between design conventions and SI.
//!
//! Design inputs follow drainage practice (intensities in mm/h, areas in
//! m² or hectares, durations in minutes) while the hydraulic models work in
//! SI base units. Conversions go through `uom` quantities so the factors are
//! never written by hand.

use uom::si::{
    area::{hectare, square_meter},
    f64::{Area, Length, Time, Velocity, VolumeRate},
    length::millimeter,
    time::{hour, minute, second},
    velocity::meter_per_second,
    volume_rate::{cubic_meter_per_second, liter_per_second},
};

/// Converts a rainfall intensity in mm/h to a velocity in m/s.
#[must_use]
pub fn mm_per_hour_to_m_per_s(intensity: f64) -> f64 {
    let rate: Velocity = Length::new::<millimeter>(intensity) / Time::new::<hour>(1.0);
    rate.get::<meter_per_second>()
}

/// Converts a rate in m/s to a rainfall intensity in mm/h.
#[must_use]
pub fn m_per_s_to_mm_per_hour(rate: f64) -> f64 {
    let depth: Length = Velocity::new::<meter_per_second>(rate) * Time::new::<hour>(1.0);
    depth.get::<millimeter>()
}

/// Converts a flow in m³/s to L/s.
#[must_use]
pub fn cubic_meters_to_liters_per_second(flow: f64) -> f64 {
    VolumeRate::new::<cubic_meter_per_second>(flow).get::<liter_per_second>()
}

/// Converts an area in hectares to m².
#[must_use]
pub fn hectares_to_square_meters(area: f64) -> f64 {
    Area::new::<hectare>(area).get::<square_meter>()
}

/// Converts a duration in seconds to minutes.
#[must_use]
pub fn seconds_to_minutes(duration: f64) -> f64 {
    Time::new::<second>(duration).get::<minute>()
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn intensity_conversion_matches_hand_calculation() {
        assert_relative_eq!(
            mm_per_hour_to_m_per_s(100.0),
            100.0 / 3.6e6,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            m_per_s_to_mm_per_hour(100.0 / 3.6e6),
            100.0,
            max_relative = 1e-12
        );
    }

    #[test]
    fn flows_areas_and_durations() {
        assert_relative_eq!(
            cubic_meters_to_liters_per_second(0.025),
            25.0,
            max_relative = 1e-12
        );
        assert_relative_eq!(hectares_to_square_meters(1.5), 15_000.0, max_relative = 1e-12);
        assert_relative_eq!(seconds_to_minutes(90.0), 1.5, max_relative = 1e-12);
    }
}
