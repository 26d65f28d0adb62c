//! Per-catchment design results.

use serde::Serialize;

use crate::{
    config::VelocityLimits,
    error::DesignError,
    idf::DesignIntensity,
    input::ChannelShape,
    tc::TimeOfConcentration,
};

/// Whether a design is acceptable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DesignStatus {
    Ok,
    #[default]
    NotOk,
}

/// Every value computed for one catchment.
///
/// A catchment that could not be processed gets a zero-filled result with
/// `processed = false` and the reason in `processing_error`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CalculationResult {
    pub catchment_id: String,
    /// `None` when the default channel was assumed.
    pub channel_id: Option<String>,
    pub channel_shape: ChannelShape,
    pub material: String,
    pub manning_n: f64,
    /// Gradient the channel is laid at, m/m.
    pub channel_gradient: f64,

    /// Minutes.
    pub time_of_concentration: TimeOfConcentration,
    pub intensity: DesignIntensity,
    pub using_fallback_intensity: bool,
    pub runoff_coefficient: f64,
    /// m³/s.
    pub peak_flow: f64,
    /// L/s.
    pub peak_flow_lps: f64,

    /// Theoretical minimum channel, m.
    pub required_width: f64,
    pub required_depth: f64,
    /// Selected channel, m.
    pub selected_width: f64,
    pub selected_depth: f64,
    pub selected_size: String,

    /// Normal depth of the peak flow in the selected channel, m.
    pub flow_depth: f64,
    /// Mean velocity at the flow depth, m/s.
    pub flow_velocity: f64,

    /// Full-section properties of the selected channel.
    pub area: f64,
    pub wetted_perimeter: f64,
    pub hydraulic_radius: f64,
    /// Full-section capacity, m³/s.
    pub capacity: f64,
    /// Full-section velocity, m/s.
    pub velocity: f64,
    /// Peak flow over capacity.
    pub utilization: f64,

    pub status: DesignStatus,
    pub error: Option<String>,
    pub warning: Option<String>,
    pub processed: bool,
    pub processing_error: Option<String>,
}

impl CalculationResult {
    /// The zero-filled result for a catchment that failed to process.
    #[must_use]
    pub fn failed(catchment_id: &str, error: &DesignError) -> Self {
        Self {
            catchment_id: catchment_id.to_owned(),
            processed: false,
            processing_error: Some(error.to_string()),
            ..Self::default()
        }
    }
}

/// The verdict on a selected channel.
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    pub status: DesignStatus,
    pub error: Option<String>,
    pub warning: Option<String>,
}

impl Assessment {
    /// Classifies a design by utilization, then velocity.
    ///
    /// Overloading fails the design. A velocity below the minimum also fails
    /// it, and its message replaces any earlier one. A velocity above the
    /// maximum only draws a warning.
    #[must_use]
    pub fn classify(utilization: f64, velocity: f64, limits: &VelocityLimits) -> Self {
        let mut status = DesignStatus::Ok;
        let mut error = None;
        let mut warning = None;

        if utilization > 1.0 {
            status = DesignStatus::NotOk;
            error = Some(format!(
                "channel utilization exceeds 100% ({:.0}%); a larger channel is required",
                utilization * 100.0
            ));
        }
        if velocity < limits.minimum {
            status = DesignStatus::NotOk;
            error = Some(format!(
                "velocity too low ({velocity:.2} m/s < {} m/s); the channel may silt up",
                limits.minimum
            ));
        }
        if velocity > limits.maximum {
            warning = Some(format!(
                "velocity high ({velocity:.2} m/s > {} m/s); consider scour protection",
                limits.maximum
            ));
        }

        Self {
            status,
            error,
            warning,
        }
    }
}
