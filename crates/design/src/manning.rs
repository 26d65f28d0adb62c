//! Manning's equation for uniform open-channel flow.
//!
//! `Q = (1/n) A R^(2/3) S^(1/2)` in SI units, with flow `Q` in m³/s,
//! area `A` in m², hydraulic radius `R` in m, and slope `S` in m/m.
//!
//! [`ManningModel`] implements [`Model`] so the bisection solver can drive
//! it, and [`solve_normal_depth`] uses that to find the depth at which a
//! channel carries a given flow.

use serde::Serialize;
use stormline_core::{EquationProblem, Model};
use stormline_solvers::equation::bisection::{self, Status};
use tracing::debug;

use crate::{
    config::SearchSettings,
    error::{DesignError, ValidationError, ensure_non_negative, ensure_positive},
    geometry::{Profile, Section, SectionProperties},
    search::{SearchSummary, TraceObserver},
};

/// Uniform flow through a cross-section.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManningModel;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ManningInput {
    pub section: Section,
    /// Longitudinal channel gradient, m/m.
    pub slope: f64,
    /// Manning's roughness coefficient.
    pub manning_n: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ManningOutput {
    /// Discharge in m³/s.
    pub flow: f64,
    /// Mean velocity in m/s.
    pub velocity: f64,
    pub properties: SectionProperties,
}

impl Model for ManningModel {
    type Input = ManningInput;
    type Output = ManningOutput;
    type Error = ValidationError;

    fn call(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
        flow(input)
    }
}

/// Computes uniform flow and velocity for a section.
///
/// An empty section carries no flow.
///
/// # Errors
///
/// Returns a [`ValidationError`] if the slope or roughness is not positive,
/// or if the section is invalid.
pub fn flow(input: &ManningInput) -> Result<ManningOutput, ValidationError> {
    let slope = ensure_positive("channel gradient", input.slope)?;
    let manning_n = ensure_positive("manning's n", input.manning_n)?;
    let properties = input.section.properties()?;

    let velocity = if properties.area > 0.0 {
        properties.hydraulic_radius.powf(2.0 / 3.0) * slope.sqrt() / manning_n
    } else {
        0.0
    };

    Ok(ManningOutput {
        flow: velocity * properties.area,
        velocity,
        properties,
    })
}

/// Residual `Q(depth) - target` for a fixed channel profile.
#[derive(Debug, Clone, Copy)]
pub struct NormalDepthProblem {
    pub profile: Profile,
    pub slope: f64,
    pub manning_n: f64,
    pub target_flow: f64,
}

impl EquationProblem<1> for NormalDepthProblem {
    type Input = ManningInput;
    type Output = ManningOutput;
    type Error = ValidationError;

    fn input(&self, x: &[f64; 1]) -> Result<Self::Input, Self::Error> {
        Ok(ManningInput {
            section: self.profile.at_depth(x[0]),
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

/// How the flow depth is determined.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DepthMode {
    /// Search for the depth at which the channel carries the target flow.
    Normal,
    /// Use the given depth as-is.
    Fixed(f64),
}

/// Flow conditions at a resolved depth.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FlowState {
    pub depth: f64,
    pub flow: f64,
    pub velocity: f64,
    pub properties: SectionProperties,
    pub search: SearchSummary,
}

/// Resolves the flow depth in a channel for a target flow.
///
/// In [`DepthMode::Normal`] the depth is found by bisection over
/// `settings.bracket`, expanding the bracket if the root lies above it.
/// A zero target flow resolves to an empty channel without searching.
///
/// # Errors
///
/// Returns a [`DesignError`] if the inputs are invalid, the search fails, or
/// no depth carrying the target flow can be bracketed.
pub fn solve_normal_depth(
    target_flow: f64,
    profile: Profile,
    slope: f64,
    manning_n: f64,
    mode: DepthMode,
    settings: &SearchSettings,
) -> Result<FlowState, DesignError> {
    let target_flow = ensure_non_negative("target flow", target_flow)?;

    let (depth, output, search) = match mode {
        DepthMode::Fixed(depth) => (
            depth,
            flow(&ManningInput {
                section: profile.at_depth(depth),
                slope,
                manning_n,
            })?,
            SearchSummary::direct(),
        ),
        DepthMode::Normal if target_flow == 0.0 => (
            0.0,
            flow(&ManningInput {
                section: profile.at_depth(0.0),
                slope,
                manning_n,
            })?,
            SearchSummary::direct(),
        ),
        DepthMode::Normal => {
            let problem = NormalDepthProblem {
                profile,
                slope,
                manning_n,
                target_flow,
            };
            search_normal_depth(&problem, settings)?
        }
    };

    debug!(
        target: "stormline::manning",
        depth,
        flow = output.flow,
        velocity = output.velocity,
        "resolved flow depth"
    );

    Ok(FlowState {
        depth,
        flow: output.flow,
        velocity: output.velocity,
        properties: output.properties,
        search,
    })
}

/// Bisects for the normal depth.
///
/// A flow smaller than the one carried at the lower end of the bracket lies
/// between an empty channel and that lower end, so the search narrows to
/// `[0, lower]` rather than expanding into negative depths.
fn search_normal_depth(
    problem: &NormalDepthProblem,
    settings: &SearchSettings,
) -> Result<(f64, ManningOutput, SearchSummary), DesignError> {
    let [lower, upper] = settings.bracket;
    let at_lower = ManningModel.call(&problem.input(&[lower])?)?;
    let bracket = if at_lower.flow >= problem.target_flow {
        [0.0, lower]
    } else {
        [lower, upper]
    };

    let config = settings.solver_config("normal depth")?;
    let solution = bisection::solve(
        &ManningModel,
        problem,
        bracket,
        &config,
        TraceObserver::new("normal depth"),
    )?;
    let search = SearchSummary::from_solution("normal depth", &solution);
    if solution.status == Status::NoSignChange {
        return Err(DesignError::Unbracketed {
            search: "normal depth",
            target: problem.target_flow,
        });
    }
    Ok((solution.x, solution.snapshot.output, search))
}
