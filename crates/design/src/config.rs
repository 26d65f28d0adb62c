//! Design conventions and solver settings.
//!
//! Every field has a default, so a project file only needs to name the
//! values it changes:
//!
//! ```toml
//! parallel = false
//!
//! [velocity]
//! minimum = 0.5
//! ```

use serde::{Deserialize, Serialize};
use stormline_solvers::equation::bisection;
use thiserror::Error;

use crate::input::ChannelShape;

/// Errors raised while loading or validating configuration or reference data.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("invalid solver settings for {search}: {source}")]
    Solver {
        search: &'static str,
        #[source]
        source: bisection::ConfigError,
    },

    #[error("duplicate {table} entry `{id}`")]
    Duplicate { table: &'static str, id: String },
}

/// Absolute bracket-width tolerance for every design search, in meters.
const X_ABS_TOL: f64 = 1e-9;

/// Complete configuration for a design run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignConfig {
    /// Channel assumed for catchments with no linked channel.
    pub default_channel: DefaultChannel,
    pub trapezoid: TrapezoidConvention,
    pub velocity: VelocityLimits,
    pub rainfall: RainfallSettings,
    pub sizing: SizingSettings,
    /// Search used to find the flow depth of the design flow in the
    /// selected channel.
    pub normal_depth: SearchSettings,
    /// Process catchments on the rayon thread pool.
    pub parallel: bool,
}

impl Default for DesignConfig {
    fn default() -> Self {
        Self {
            default_channel: DefaultChannel::default(),
            trapezoid: TrapezoidConvention::default(),
            velocity: VelocityLimits::default(),
            rainfall: RainfallSettings::default(),
            sizing: SizingSettings::default(),
            normal_depth: SearchSettings {
                bracket: [1e-4, 5.0],
                tolerance: 1e-6,
                max_iters: 100,
            },
            parallel: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultChannel {
    pub shape: ChannelShape,
    pub gradient: f64,
    pub material: String,
}

impl Default for DefaultChannel {
    fn default() -> Self {
        Self {
            shape: ChannelShape::Trapezoidal,
            gradient: 0.01,
            material: "concrete".to_owned(),
        }
    }
}

/// Standard trapezoid used when a channel does not override its geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrapezoidConvention {
    pub bottom_width: f64,
    pub side_slope: f64,
    /// Selected top widths are rounded up to a multiple of this, in meters.
    pub top_width_increment: f64,
}

impl Default for TrapezoidConvention {
    fn default() -> Self {
        Self {
            bottom_width: 0.5,
            side_slope: 2.0,
            top_width_increment: 0.5,
        }
    }
}

/// Velocity band for a serviceable channel, in m/s.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VelocityLimits {
    /// Below this the channel silts up and fails.
    pub minimum: f64,
    /// Above this the design only draws a warning.
    pub maximum: f64,
}

impl Default for VelocityLimits {
    fn default() -> Self {
        Self {
            minimum: 0.3,
            maximum: 4.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RainfallSettings {
    /// Multiplier applied to IDF intensities for permanent works.
    pub climate_uplift: f64,
    /// Intensity in mm/h used when no IDF constants are available at all.
    pub fallback_intensity: f64,
}

impl Default for RainfallSettings {
    fn default() -> Self {
        Self {
            climate_uplift: 1.281,
            fallback_intensity: 100.0,
        }
    }
}

/// Searches used to find the minimum channel size for a design flow.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizingSettings {
    /// Flow depth search for trapezoids, in meters.
    pub depth: SearchSettings,
    /// Width search for flush-full U-channels, in meters.
    pub width: SearchSettings,
}

impl Default for SizingSettings {
    fn default() -> Self {
        Self {
            depth: SearchSettings {
                bracket: [0.01, 2.0],
                tolerance: 1e-3,
                max_iters: 50,
            },
            width: SearchSettings {
                bracket: [0.1, 2.0],
                tolerance: 1e-3,
                max_iters: 50,
            },
        }
    }
}

/// Initial bracket and stopping rule for one bisection search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchSettings {
    /// Initial search interval, in meters.
    pub bracket: [f64; 2],
    /// Flow residual tolerance, in m³/s.
    pub tolerance: f64,
    pub max_iters: usize,
}

impl SearchSettings {
    /// Builds the bisection config for this search.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Solver`] if the tolerance is invalid.
    pub fn solver_config(&self, search: &'static str) -> Result<bisection::Config, ConfigError> {
        bisection::Config::new(self.max_iters, X_ABS_TOL, 0.0, self.tolerance)
            .map_err(|source| ConfigError::Solver { search, source })
    }

    fn validate(&self, search: &'static str) -> Result<(), ConfigError> {
        let [lo, hi] = self.bracket;
        if !(lo.is_finite() && hi.is_finite() && lo > 0.0 && lo < hi) {
            return Err(ConfigError::Invalid {
                field: search,
                reason: format!("bracket [{lo}, {hi}] must be positive and increasing"),
            });
        }
        if self.max_iters == 0 {
            return Err(ConfigError::Invalid {
                field: search,
                reason: "max_iters must be at least 1".to_owned(),
            });
        }
        self.solver_config(search).map(|_| ())
    }
}

impl DesignConfig {
    /// Parses and validates a TOML configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if parsing or validation fails.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every setting is usable.
    ///
    /// # Errors
    ///
    /// Returns the first invalid setting found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("default_channel.gradient", self.default_channel.gradient)?;
        if self.default_channel.material.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "default_channel.material",
                reason: "must not be empty".to_owned(),
            });
        }

        non_negative("trapezoid.bottom_width", self.trapezoid.bottom_width)?;
        positive("trapezoid.side_slope", self.trapezoid.side_slope)?;
        positive(
            "trapezoid.top_width_increment",
            self.trapezoid.top_width_increment,
        )?;

        non_negative("velocity.minimum", self.velocity.minimum)?;
        if self.velocity.maximum <= self.velocity.minimum {
            return Err(ConfigError::Invalid {
                field: "velocity.maximum",
                reason: format!(
                    "{} must exceed the minimum of {}",
                    self.velocity.maximum, self.velocity.minimum
                ),
            });
        }

        positive("rainfall.climate_uplift", self.rainfall.climate_uplift)?;
        positive("rainfall.fallback_intensity", self.rainfall.fallback_intensity)?;

        self.sizing.depth.validate("sizing.depth")?;
        self.sizing.width.validate("sizing.width")?;
        self.normal_depth.validate("normal_depth")
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("{value} must be finite and positive"),
        })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("{value} must be finite and non-negative"),
        })
    }
}
