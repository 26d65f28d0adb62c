//! Channel sizing: the smallest practical channel that carries a design flow.
//!
//! Both shapes first solve for a theoretical minimum with bisection, then
//! pick a buildable size:
//!
//! - Trapezoids solve for the flow depth in the standard section, then round
//!   the resulting top width up to the configured increment.
//! - U-channels solve for the flush-full width, then scan the standard sizes
//!   in ascending order for the first whose flush-full capacity is enough.
//!   If none is, the largest size is used and the selection is flagged as an
//!   overflow so the capacity check can report it.
//!
//! A manual top width or width replaces the rounding or the scan.

use serde::Serialize;
use stormline_core::{EquationProblem, Model};
use stormline_solvers::equation::bisection;
use tracing::debug;

use crate::{
    config::{DesignConfig, SearchSettings},
    error::{DesignError, ValidationError, ensure_non_negative, ensure_positive},
    geometry::{Profile, Section},
    input::{ChannelShape, GeometryOverrides},
    manning::{self, ManningInput, ManningModel, ManningOutput},
    reference::StandardChannelSize,
    search::{SearchSummary, TraceObserver},
};

/// Slack when rounding a width up, so float noise never skips an increment.
const ROUNDING_SLACK: f64 = 1e-9;

/// Most extra top-width increments tried after rounding before the
/// trapezoid is handed to the capacity check as it stands.
const MAX_EXTRA_INCREMENTS: usize = 40;

/// What to size.
#[derive(Debug, Clone, Copy)]
pub struct SizingRequest<'a> {
    /// Design flow in m³/s.
    pub target_flow: f64,
    pub shape: ChannelShape,
    pub slope: f64,
    pub manning_n: f64,
    pub overrides: &'a GeometryOverrides,
}

/// The channel chosen for a design flow.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelSelection {
    pub shape: ChannelShape,
    /// Trapezoids: flow depth of the design flow in the standard section.
    /// U-channels: the minimum flush-full width.
    pub required_depth: f64,
    /// Top width (trapezoids) or width (U-channels) of the theoretical
    /// minimum channel, in m.
    pub required_width: f64,
    /// Top width or width of the selected channel, in m.
    pub selected_width: f64,
    pub label: String,
    /// The selected channel flowing full.
    pub section: Section,
    /// The selection came from a manual override.
    pub manual: bool,
    /// No standard U-channel carries the flow, so the largest was selected.
    pub overflow: bool,
    pub search: SearchSummary,
}

/// Sizes a channel for a design flow.
///
/// `sizes` must be sorted ascending; [`ReferenceData`] keeps them that way.
///
/// # Errors
///
/// Returns a [`DesignError`] if the request is invalid, a search fails, or a
/// U-channel is requested with no standard sizes and no manual width.
///
/// [`ReferenceData`]: crate::reference::ReferenceData
pub fn size_channel(
    request: &SizingRequest<'_>,
    sizes: &[StandardChannelSize],
    config: &DesignConfig,
) -> Result<ChannelSelection, DesignError> {
    ensure_non_negative("design flow", request.target_flow)?;

    let selection = match request.shape {
        ChannelShape::Trapezoidal => size_trapezoid(request, config)?,
        ChannelShape::UChannel => size_u_channel(request, sizes, config)?,
    };

    debug!(
        target: "stormline::sizing",
        shape = ?selection.shape,
        target_flow = request.target_flow,
        required_width = selection.required_width,
        selected = %selection.label,
        overflow = selection.overflow,
        "selected channel"
    );
    Ok(selection)
}

fn size_trapezoid(
    request: &SizingRequest<'_>,
    config: &DesignConfig,
) -> Result<ChannelSelection, DesignError> {
    let overrides = request.overrides;
    let bottom_width = ensure_non_negative(
        "bottom width",
        overrides.bottom_width.resolve(config.trapezoid.bottom_width),
    )?;
    let side_slope = ensure_positive(
        "side slope",
        overrides.side_slope.resolve(config.trapezoid.side_slope),
    )?;
    let profile = Profile::Trapezoidal {
        bottom_width,
        side_slope,
    };

    let problem = SizingProblem {
        dimension: Dimension::Depth(profile),
        slope: request.slope,
        manning_n: request.manning_n,
        target_flow: request.target_flow,
    };
    let (required_depth, search) =
        minimum_dimension(&problem, &config.sizing.depth, "trapezoid depth")?;
    let required_width = profile.at_depth(required_depth).top_width()?;

    if let Some(top_width) = overrides.top_width.manual() {
        let section = Profile::trapezoid_with_top_width(bottom_width, side_slope, top_width)?;
        return Ok(ChannelSelection {
            shape: ChannelShape::Trapezoidal,
            required_depth,
            required_width,
            selected_width: top_width,
            label: trapezoid_label(top_width),
            section,
            manual: true,
            overflow: false,
            search,
        });
    }

    let increment = config.trapezoid.top_width_increment;
    let mut selected_width = round_up(required_width, increment);
    let mut section = Profile::trapezoid_with_top_width(bottom_width, side_slope, selected_width)?;

    // The depth search stops within a flow tolerance, or at its iteration
    // cap, so the rounded section can still fall short.
    for _ in 0..MAX_EXTRA_INCREMENTS {
        if capacity(section, request)? >= request.target_flow {
            break;
        }
        selected_width += increment;
        section = Profile::trapezoid_with_top_width(bottom_width, side_slope, selected_width)?;
    }

    Ok(ChannelSelection {
        shape: ChannelShape::Trapezoidal,
        required_depth,
        required_width,
        selected_width,
        label: trapezoid_label(selected_width),
        section,
        manual: false,
        overflow: false,
        search,
    })
}

fn size_u_channel(
    request: &SizingRequest<'_>,
    sizes: &[StandardChannelSize],
    config: &DesignConfig,
) -> Result<ChannelSelection, DesignError> {
    let problem = SizingProblem {
        dimension: Dimension::FlushFullWidth,
        slope: request.slope,
        manning_n: request.manning_n,
        target_flow: request.target_flow,
    };
    let (required_width, search) =
        minimum_dimension(&problem, &config.sizing.width, "u-channel width")?;

    let select = |width: f64, label: String, manual: bool, overflow: bool| {
        u_channel_selection(required_width, search, width, label, manual, overflow)
    };

    if let Some(width) = request.overrides.width.manual() {
        return Ok(select(width, format!("U{:.0}", width * 1000.0), true, false)?);
    }

    for size in sizes {
        let section = Profile::flush_full_u_channel(size.width())?;
        if capacity(section, request)? >= request.target_flow {
            return Ok(select(size.width(), size.label.clone(), false, false)?);
        }
    }

    let largest = sizes.last().ok_or(ValidationError::NoStandardSizes)?;
    Ok(select(largest.width(), largest.label.clone(), false, true)?)
}

fn u_channel_selection(
    required_width: f64,
    search: SearchSummary,
    width: f64,
    label: String,
    manual: bool,
    overflow: bool,
) -> Result<ChannelSelection, ValidationError> {
    Ok(ChannelSelection {
        shape: ChannelShape::UChannel,
        required_depth: required_width,
        required_width,
        selected_width: width,
        label,
        section: Profile::flush_full_u_channel(width)?,
        manual,
        overflow,
        search,
    })
}

/// The dimension a sizing search varies.
#[derive(Debug, Clone, Copy)]
enum Dimension {
    /// Flow depth in a fixed profile.
    Depth(Profile),
    /// Width of a U-channel flowing flush-full.
    FlushFullWidth,
}

/// Residual `Q(x) - target` for a sizing search.
#[derive(Debug, Clone, Copy)]
struct SizingProblem {
    dimension: Dimension,
    slope: f64,
    manning_n: f64,
    target_flow: f64,
}

impl EquationProblem<1> for SizingProblem {
    type Input = ManningInput;
    type Output = ManningOutput;
    type Error = ValidationError;

    fn input(&self, x: &[f64; 1]) -> Result<Self::Input, Self::Error> {
        let section = match self.dimension {
            Dimension::Depth(profile) => profile.at_depth(x[0]),
            Dimension::FlushFullWidth => Section::UChannel {
                depth: x[0],
                width: x[0],
            },
        };
        Ok(ManningInput {
            section,
            slope: self.slope,
            manning_n: self.manning_n,
        })
    }

    fn residuals(
        &self,
        _input: &Self::Input,
        output: &Self::Output,
    ) -> Result<[f64; 1], Self::Error> {
        Ok([output.flow - self.target_flow])
    }
}

/// Solves for the smallest dimension that carries the target flow.
///
/// When the lower end of the bracket already carries the flow, it is the
/// answer and no search is run.
fn minimum_dimension(
    problem: &SizingProblem,
    settings: &SearchSettings,
    search: &'static str,
) -> Result<(f64, SearchSummary), DesignError> {
    let lower = settings.bracket[0];
    let at_lower = ManningModel.call(&problem.input(&[lower])?)?;
    if at_lower.flow >= problem.target_flow {
        debug!(
            target: "stormline::sizing",
            search,
            lower,
            "lower bound already carries the flow"
        );
        return Ok((lower, SearchSummary::direct()));
    }

    let config = settings.solver_config(search)?;
    let solution = bisection::solve(
        &ManningModel,
        problem,
        settings.bracket,
        &config,
        TraceObserver::new(search),
    )?;
    Ok((solution.x, SearchSummary::from_solution(search, &solution)))
}

fn capacity(section: Section, request: &SizingRequest<'_>) -> Result<f64, ValidationError> {
    manning::flow(&ManningInput {
        section,
        slope: request.slope,
        manning_n: request.manning_n,
    })
    .map(|output| output.flow)
}

fn round_up(width: f64, increment: f64) -> f64 {
    (width / increment - ROUNDING_SLACK).ceil().max(1.0) * increment
}

fn trapezoid_label(top_width: f64) -> String {
    format!("{top_width:.1} m top width")
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::{input::Override, reference::ReferenceData};

    fn request(
        target_flow: f64,
        shape: ChannelShape,
        overrides: &GeometryOverrides,
    ) -> SizingRequest<'_> {
        SizingRequest {
            target_flow,
            shape,
            slope: 0.01,
            manning_n: 0.013,
            overrides,
        }
    }

    fn size(request: &SizingRequest<'_>) -> ChannelSelection {
        let reference = ReferenceData::builtin();
        size_channel(request, &reference.u_channel_sizes, &DesignConfig::default()).unwrap()
    }

    fn full_capacity(selection: &ChannelSelection) -> f64 {
        manning::flow(&ManningInput {
            section: selection.section,
            slope: 0.01,
            manning_n: 0.013,
        })
        .unwrap()
        .flow
    }

    #[test]
    fn trapezoid_rounds_top_width_up() {
        let overrides = GeometryOverrides::default();
        let selection = size(&request(0.4, ChannelShape::Trapezoidal, &overrides));

        assert!(selection.search.converged);
        assert!(selection.selected_width >= selection.required_width);
        assert_relative_eq!(
            (selection.selected_width / 0.5).round() * 0.5,
            selection.selected_width
        );
        assert_relative_eq!(
            selection.section.depth(),
            (selection.selected_width - 0.5) / 4.0,
            epsilon = 1e-12
        );

        let required = Profile::Trapezoidal {
            bottom_width: 0.5,
            side_slope: 2.0,
        }
        .at_depth(selection.required_depth);
        let flow_at_required = manning::flow(&ManningInput {
            section: required,
            slope: 0.01,
            manning_n: 0.013,
        })
        .unwrap()
        .flow;
        assert_relative_eq!(flow_at_required, 0.4, epsilon = 1e-3);
    }

    #[test]
    fn selected_channels_carry_the_design_flow() {
        let overrides = GeometryOverrides::default();
        for flow in [0.005, 0.05, 0.2, 0.8, 2.5] {
            for shape in [ChannelShape::Trapezoidal, ChannelShape::UChannel] {
                let selection = size(&request(flow, shape, &overrides));
                assert!(!selection.overflow, "{shape:?} at {flow}");
                assert!(
                    full_capacity(&selection) >= flow,
                    "{shape:?} at {flow} selected {}",
                    selection.label
                );
            }
        }
    }

    #[test]
    fn coarse_depth_search_still_yields_an_adequate_trapezoid() {
        let mut config = DesignConfig::default();
        config.sizing.depth.max_iters = 1;
        let overrides = GeometryOverrides::default();
        let request = request(0.8, ChannelShape::Trapezoidal, &overrides);

        let selection = size_channel(&request, &[], &config).unwrap();

        assert!(!selection.search.converged);
        assert!(selection.selected_width >= 2.0);
        assert!(full_capacity(&selection) >= 0.8);
    }

    #[test]
    fn u_channel_picks_the_first_adequate_size() {
        let overrides = GeometryOverrides::default();
        let selection = size(&request(0.3, ChannelShape::UChannel, &overrides));

        let reference = ReferenceData::builtin();
        let index = reference
            .u_channel_sizes
            .iter()
            .position(|s| s.label == selection.label)
            .unwrap();
        assert!(index > 0);

        let smaller = Profile::flush_full_u_channel(reference.u_channel_sizes[index - 1].width())
            .unwrap();
        let smaller_capacity = manning::flow(&ManningInput {
            section: smaller,
            slope: 0.01,
            manning_n: 0.013,
        })
        .unwrap()
        .flow;
        assert!(smaller_capacity < 0.3);
        assert!(selection.selected_width >= selection.required_width);
    }

    #[test]
    fn oversized_flow_takes_the_largest_u_channel() {
        let overrides = GeometryOverrides::default();
        let selection = size(&request(50.0, ChannelShape::UChannel, &overrides));

        assert!(selection.overflow);
        assert_eq!(selection.label, "U900");
        assert!(full_capacity(&selection) < 50.0);
        assert!(selection.required_width > 2.0);
    }

    #[test]
    fn zero_flow_needs_no_search() {
        let overrides = GeometryOverrides::default();

        let trapezoid = size(&request(0.0, ChannelShape::Trapezoidal, &overrides));
        assert_eq!(trapezoid.required_depth, 0.01);
        assert_eq!(trapezoid.search, SearchSummary::direct());
        assert_relative_eq!(trapezoid.selected_width, 1.0);

        let u_channel = size(&request(0.0, ChannelShape::UChannel, &overrides));
        assert_eq!(u_channel.required_width, 0.1);
        assert_eq!(u_channel.label, "U300");
    }

    #[test]
    fn manual_geometry_replaces_the_selection() {
        let overrides = GeometryOverrides {
            bottom_width: Override::Manual(1.0),
            side_slope: Override::Manual(1.0),
            top_width: Override::Manual(3.0),
            width: Override::Manual(0.45),
        };

        let trapezoid = size(&request(0.4, ChannelShape::Trapezoidal, &overrides));
        assert!(trapezoid.manual);
        assert_eq!(trapezoid.selected_width, 3.0);
        assert_relative_eq!(trapezoid.section.depth(), 1.0);

        let u_channel = size(&request(0.4, ChannelShape::UChannel, &overrides));
        assert!(u_channel.manual);
        assert_eq!(u_channel.label, "U450");
    }

    #[test]
    fn rejects_invalid_requests() {
        let reference = ReferenceData::builtin();
        let config = DesignConfig::default();

        let overrides = GeometryOverrides::default();
        assert!(matches!(
            size_channel(
                &request(-0.1, ChannelShape::Trapezoidal, &overrides),
                &reference.u_channel_sizes,
                &config
            ),
            Err(DesignError::Validation(_))
        ));

        let flat = GeometryOverrides {
            side_slope: Override::Manual(0.0),
            ..GeometryOverrides::default()
        };
        assert!(
            size_channel(
                &request(0.1, ChannelShape::Trapezoidal, &flat),
                &reference.u_channel_sizes,
                &config
            )
            .is_err()
        );

        assert!(matches!(
            size_channel(&request(0.1, ChannelShape::UChannel, &overrides), &[], &config),
            Err(DesignError::Validation(ValidationError::NoStandardSizes))
        ));
    }
}
