//! Catchment and channel records supplied by the host.
//!
//! Records deserialize from TOML or JSON. Optional fields default so that a
//! minimal catchment names only its geometry, surface, and return period.

use serde::{Deserialize, Serialize};

/// A value that is either computed by the engine or fixed by the designer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "value", rename_all = "snake_case")]
pub enum Override<T> {
    #[default]
    Auto,
    Manual(T),
}

impl<T: Copy> Override<T> {
    /// Returns the manual value, or `auto` when none was given.
    #[must_use]
    pub fn resolve(&self, auto: T) -> T {
        match self {
            Override::Auto => auto,
            Override::Manual(value) => *value,
        }
    }

    #[must_use]
    pub fn manual(&self) -> Option<T> {
        match self {
            Override::Auto => None,
            Override::Manual(value) => Some(*value),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelShape {
    #[default]
    Trapezoidal,
    UChannel,
}

/// Where a catchment's design rainfall comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum Rainfall {
    /// Use the IDF curve for the catchment's return period.
    #[default]
    Idf,
    /// Use a fixed intensity in mm/h.
    Manual { intensity: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubAreaInput {
    pub surface_type: String,
    /// Area in m².
    pub area: f64,
}

/// A drainage catchment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatchmentInput {
    pub id: String,
    /// Plan area in m².
    pub area: f64,
    /// Average slope in m per 100 m.
    pub average_slope: f64,
    /// Longest overland flow path, in m.
    pub flow_path_length: f64,
    /// Surface type id, used when there are no sub-areas.
    pub surface_type: String,
    /// Mixed surfaces; when present, the runoff coefficient is area-weighted
    /// over them instead of taken from `surface_type`.
    #[serde(default)]
    pub sub_areas: Vec<SubAreaInput>,
    /// Return period in years.
    pub return_period: u32,
    #[serde(default)]
    pub rainfall: Rainfall,
    /// Temporary works skip the climate-change uplift.
    #[serde(default)]
    pub temporary_design: bool,
}

/// Manual geometry for a channel. Unused fields are ignored for the other
/// shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryOverrides {
    pub bottom_width: Override<f64>,
    pub side_slope: Override<f64>,
    pub top_width: Override<f64>,
    /// U-channel width, in m.
    pub width: Override<f64>,
}

/// A drainage channel, optionally serving one catchment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelInput {
    pub id: String,
    #[serde(default)]
    pub catchment_id: Option<String>,
    #[serde(default)]
    pub shape: ChannelShape,
    /// Channel length in m.
    pub length: f64,
    /// Ground gradient along the channel route, m/m.
    pub terrain_gradient: f64,
    /// `Auto` lays the channel at the terrain gradient.
    #[serde(default)]
    pub gradient: Override<f64>,
    /// Material id; the configured default material when absent.
    #[serde(default)]
    pub material: Option<String>,
    #[serde(default)]
    pub geometry: GeometryOverrides,
    /// Travel time along the channel in minutes, if already known.
    #[serde(default)]
    pub time_of_concentration: Option<f64>,
    /// Ids of channels that discharge into this one.
    #[serde(default)]
    pub upstream: Vec<String>,
}

impl ChannelInput {
    /// The gradient the channel is laid at.
    #[must_use]
    pub fn design_gradient(&self) -> f64 {
        self.gradient.resolve(self.terrain_gradient)
    }
}
