//! Cross-section geometry for open drainage channels.
//!
//! All lengths are in meters and all areas in square meters.
//! A [`Section`] is a channel shape at a specific flow depth, and a
//! [`Profile`] is the same shape without a depth, used when a solver needs
//! to try many depths against one channel.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, ensure_non_negative, ensure_positive};

/// A channel cross-section filled to a given depth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Section {
    /// Trapezoid with side slopes of `side_slope` horizontal per unit vertical.
    Trapezoidal {
        depth: f64,
        bottom_width: f64,
        side_slope: f64,
    },
    /// Semicircular invert of diameter `width` topped by vertical walls.
    UChannel { depth: f64, width: f64 },
}

/// Geometric properties of a flow cross-section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SectionProperties {
    pub area: f64,
    pub wetted_perimeter: f64,
    /// Zero for an empty channel.
    pub hydraulic_radius: f64,
    /// Width of the free surface.
    pub top_width: f64,
}

impl Section {
    /// Returns the flow depth.
    #[must_use]
    pub fn depth(&self) -> f64 {
        match *self {
            Section::Trapezoidal { depth, .. } | Section::UChannel { depth, .. } => depth,
        }
    }

    /// The depth-less shape of this section.
    #[must_use]
    pub fn profile(&self) -> Profile {
        match *self {
            Section::Trapezoidal {
                bottom_width,
                side_slope,
                ..
            } => Profile::Trapezoidal {
                bottom_width,
                side_slope,
            },
            Section::UChannel { width, .. } => Profile::UChannel { width },
        }
    }

    /// Checks that every dimension is physically meaningful.
    ///
    /// Depths, bottom widths, and side slopes may be zero; a U-channel width
    /// must be strictly positive.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming the first invalid dimension.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match *self {
            Section::Trapezoidal {
                depth,
                bottom_width,
                side_slope,
            } => {
                ensure_non_negative("flow depth", depth)?;
                ensure_non_negative("bottom width", bottom_width)?;
                ensure_non_negative("side slope", side_slope)?;
            }
            Section::UChannel { depth, width } => {
                ensure_non_negative("flow depth", depth)?;
                ensure_positive("channel width", width)?;
            }
        }
        Ok(())
    }

    /// Flow area.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the section is invalid.
    pub fn area(&self) -> Result<f64, ValidationError> {
        self.validate()?;
        Ok(match *self {
            Section::Trapezoidal {
                depth,
                bottom_width,
                side_slope,
            } => {
                let top = bottom_width + 2.0 * side_slope * depth;
                0.5 * (top + bottom_width) * depth
            }
            Section::UChannel { depth, width } => {
                let radius = 0.5 * width;
                if depth <= radius {
                    let theta = invert_angle(depth, radius);
                    0.5 * radius * radius * (theta - theta.sin())
                } else {
                    0.5 * PI * radius * radius + (depth - radius) * width
                }
            }
        })
    }

    /// Wetted perimeter.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the section is invalid.
    pub fn wetted_perimeter(&self) -> Result<f64, ValidationError> {
        self.validate()?;
        Ok(match *self {
            Section::Trapezoidal {
                depth,
                bottom_width,
                side_slope,
            } => bottom_width + 2.0 * depth * (1.0 + side_slope * side_slope).sqrt(),
            Section::UChannel { depth, width } => {
                let radius = 0.5 * width;
                if depth <= radius {
                    radius * invert_angle(depth, radius)
                } else {
                    PI * radius + 2.0 * (depth - radius)
                }
            }
        })
    }

    /// Free-surface width.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the section is invalid.
    pub fn top_width(&self) -> Result<f64, ValidationError> {
        self.validate()?;
        Ok(match *self {
            Section::Trapezoidal {
                depth,
                bottom_width,
                side_slope,
            } => bottom_width + 2.0 * side_slope * depth,
            Section::UChannel { depth, width } => {
                let radius = 0.5 * width;
                if depth < radius {
                    2.0 * (depth * (width - depth)).sqrt()
                } else {
                    width
                }
            }
        })
    }

    /// Hydraulic radius, `area / wetted_perimeter`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NonPositivePerimeter`] when the wetted
    /// perimeter is zero, as it is for an empty V-shaped section.
    pub fn hydraulic_radius(&self) -> Result<f64, ValidationError> {
        let perimeter = self.wetted_perimeter()?;
        if perimeter <= 0.0 {
            return Err(ValidationError::NonPositivePerimeter { perimeter });
        }
        Ok(self.area()? / perimeter)
    }

    /// Computes all section properties at once.
    ///
    /// Unlike [`Section::hydraulic_radius`], an empty section is not an
    /// error here: it reports zero area and zero hydraulic radius.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the section is invalid.
    pub fn properties(&self) -> Result<SectionProperties, ValidationError> {
        let area = self.area()?;
        let wetted_perimeter = self.wetted_perimeter()?;
        let hydraulic_radius = if area > 0.0 && wetted_perimeter > 0.0 {
            area / wetted_perimeter
        } else {
            0.0
        };

        Ok(SectionProperties {
            area,
            wetted_perimeter,
            hydraulic_radius,
            top_width: self.top_width()?,
        })
    }
}

/// Central angle subtended by the wetted arc of the semicircular invert.
fn invert_angle(depth: f64, radius: f64) -> f64 {
    2.0 * (1.0 - depth / radius).clamp(-1.0, 1.0).acos()
}

/// A channel shape independent of flow depth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Profile {
    Trapezoidal { bottom_width: f64, side_slope: f64 },
    UChannel { width: f64 },
}

impl Profile {
    /// Fills the profile to the given depth.
    #[must_use]
    pub fn at_depth(self, depth: f64) -> Section {
        match self {
            Profile::Trapezoidal {
                bottom_width,
                side_slope,
            } => Section::Trapezoidal {
                depth,
                bottom_width,
                side_slope,
            },
            Profile::UChannel { width } => Section::UChannel { depth, width },
        }
    }

    /// Depth at which the profile is flowing full.
    ///
    /// U-channels are full when flush with their top, at a depth equal to
    /// their width. Trapezoids are open-ended and have no full depth.
    #[must_use]
    pub fn full_depth(self) -> Option<f64> {
        match self {
            Profile::Trapezoidal { .. } => None,
            Profile::UChannel { width } => Some(width),
        }
    }

    /// The trapezoid with this bottom width and side slope whose top width
    /// is `top_width`.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the side slope is not positive or the
    /// top width is narrower than the bottom.
    pub fn trapezoid_with_top_width(
        bottom_width: f64,
        side_slope: f64,
        top_width: f64,
    ) -> Result<Section, ValidationError> {
        let side_slope = ensure_positive("side slope", side_slope)?;
        let depth = ensure_non_negative(
            "depth implied by top width",
            (top_width - bottom_width) / (2.0 * side_slope),
        )?;
        let section = Section::Trapezoidal {
            depth,
            bottom_width,
            side_slope,
        };
        section.validate()?;
        Ok(section)
    }

    /// A U-channel flowing flush-full, with depth equal to its width.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the width is not positive.
    pub fn flush_full_u_channel(width: f64) -> Result<Section, ValidationError> {
        let profile = Profile::UChannel { width };
        let section = profile.at_depth(profile.full_depth().unwrap_or(width));
        section.validate()?;
        Ok(section)
    }
}
