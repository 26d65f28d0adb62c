//! Batch design of every catchment in a project.
//!
//! Each catchment runs the full chain independently: time of concentration,
//! design intensity, peak flow, channel sizing, and the capacity check at
//! the selected size. A catchment that fails validation or whose search
//! fails yields an unprocessed result; the rest of the batch carries on.

use std::collections::{HashMap, hash_map::Entry};

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    config::DesignConfig,
    error::{DesignError, ValidationError, ensure_non_negative, ensure_positive},
    idf::{DesignIntensity, IntensitySource},
    input::{CatchmentInput, ChannelInput, ChannelShape, GeometryOverrides, Rainfall},
    manning::{self, DepthMode, ManningInput},
    rational::{self, SubArea},
    reference::ReferenceData,
    result::{Assessment, CalculationResult, DesignStatus},
    sizing::{self, SizingRequest},
    tc::{self, TimeOfConcentration},
    units,
};

/// Channels indexed by id and by the catchment they serve.
#[derive(Debug, Default)]
pub struct ChannelNetwork<'a> {
    by_id: HashMap<&'a str, &'a ChannelInput>,
    by_catchment: HashMap<&'a str, &'a ChannelInput>,
}

impl<'a> ChannelNetwork<'a> {
    /// Indexes channels. When ids or catchment links repeat, the first
    /// channel wins.
    #[must_use]
    pub fn new(channels: &'a [ChannelInput]) -> Self {
        let mut network = Self::default();
        for channel in channels {
            match network.by_id.entry(channel.id.as_str()) {
                Entry::Occupied(_) => warn!(
                    target: "stormline::batch",
                    channel = %channel.id,
                    "duplicate channel id; keeping the first"
                ),
                Entry::Vacant(slot) => {
                    slot.insert(channel);
                }
            }
            if let Some(catchment_id) = channel.catchment_id.as_deref() {
                network.by_catchment.entry(catchment_id).or_insert(channel);
            }
        }
        network
    }

    /// The channel serving a catchment, if any.
    #[must_use]
    pub fn linked(&self, catchment_id: &str) -> Option<&'a ChannelInput> {
        self.by_catchment.get(catchment_id).copied()
    }

    /// Travel time along a channel, in minutes.
    ///
    /// Uses the channel's precomputed time when it has one, and the Kirpich
    /// formula otherwise.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the id is unknown or the channel's
    /// length or gradient is invalid.
    pub fn channel_minutes(&self, id: &str) -> Result<f64, ValidationError> {
        let channel = self
            .by_id
            .get(id)
            .ok_or_else(|| ValidationError::UnknownChannel(id.to_owned()))?;

        match channel.time_of_concentration {
            Some(minutes) => ensure_non_negative("channel time of concentration", minutes),
            None => tc::kirpich_minutes(channel.length, channel.design_gradient()),
        }
    }
}

/// The channel a catchment drains into, after defaults are applied.
#[derive(Debug, Clone)]
struct ResolvedChannel<'a> {
    id: Option<&'a str>,
    shape: ChannelShape,
    gradient: f64,
    material: &'a str,
    overrides: GeometryOverrides,
    upstream: &'a [String],
}

/// Runs designs against shared reference data and configuration.
#[derive(Debug, Clone, Copy)]
pub struct DesignEngine<'a> {
    reference: &'a ReferenceData,
    config: &'a DesignConfig,
}

impl<'a> DesignEngine<'a> {
    #[must_use]
    pub fn new(reference: &'a ReferenceData, config: &'a DesignConfig) -> Self {
        Self { reference, config }
    }

    /// Designs every catchment, returning results in input order.
    ///
    /// Catchments run on the rayon thread pool when `config.parallel` is set.
    #[must_use]
    pub fn run(
        &self,
        catchments: &[CatchmentInput],
        channels: &[ChannelInput],
    ) -> Vec<CalculationResult> {
        let network = ChannelNetwork::new(channels);
        info!(
            target: "stormline::batch",
            catchments = catchments.len(),
            channels = channels.len(),
            parallel = self.config.parallel,
            "starting batch"
        );

        let results: Vec<CalculationResult> = if self.config.parallel {
            catchments
                .par_iter()
                .map(|catchment| self.process(catchment, &network))
                .collect()
        } else {
            catchments
                .iter()
                .map(|catchment| self.process(catchment, &network))
                .collect()
        };

        let summary = BatchSummary::from_results(&results);
        info!(
            target: "stormline::batch",
            total = summary.total,
            processed = summary.processed,
            failed = summary.failed,
            ok = summary.ok,
            not_ok = summary.not_ok,
            "batch complete"
        );
        results
    }

    /// Designs one catchment, turning any error into an unprocessed result.
    #[must_use]
    pub fn process(
        &self,
        catchment: &CatchmentInput,
        network: &ChannelNetwork<'_>,
    ) -> CalculationResult {
        match self.design(catchment, network) {
            Ok(result) => result,
            Err(error) => {
                warn!(
                    target: "stormline::batch",
                    catchment = %catchment.id,
                    %error,
                    "catchment could not be processed"
                );
                CalculationResult::failed(&catchment.id, &error)
            }
        }
    }

    /// Designs the channel for one catchment.
    ///
    /// # Errors
    ///
    /// Returns a [`DesignError`] if any input is invalid or a search fails.
    /// An inadequate channel is not an error; it is reported through the
    /// result status.
    pub fn design(
        &self,
        catchment: &CatchmentInput,
        network: &ChannelNetwork<'_>,
    ) -> Result<CalculationResult, DesignError> {
        let channel = self.resolve_channel(network.linked(&catchment.id));
        let manning_n = self.reference.manning_n(channel.material)?;

        let upstream = channel
            .upstream
            .iter()
            .map(|id| network.channel_minutes(id))
            .collect::<Result<Vec<_>, _>>()?;
        let time_of_concentration = TimeOfConcentration::combine(
            tc::catchment_minutes(
                catchment.flow_path_length,
                catchment.average_slope,
                catchment.area,
            )?,
            upstream,
        );
        debug!(
            target: "stormline::batch",
            catchment = %catchment.id,
            tc = time_of_concentration.effective,
            "time of concentration"
        );

        let intensity = self.intensity(catchment, time_of_concentration.effective)?;
        let runoff_coefficient = self.runoff_coefficient(catchment)?;
        let peak_flow = rational::peak_flow(
            runoff_coefficient,
            units::mm_per_hour_to_m_per_s(intensity.design),
            catchment.area,
        )?;
        debug!(
            target: "stormline::batch",
            catchment = %catchment.id,
            intensity = intensity.design,
            runoff_coefficient,
            peak_flow,
            "peak flow"
        );

        let selection = sizing::size_channel(
            &SizingRequest {
                target_flow: peak_flow,
                shape: channel.shape,
                slope: channel.gradient,
                manning_n,
                overrides: &channel.overrides,
            },
            &self.reference.u_channel_sizes,
            self.config,
        )?;

        let full = manning::flow(&ManningInput {
            section: selection.section,
            slope: channel.gradient,
            manning_n,
        })?;
        let capacity = ensure_positive("channel capacity", full.flow)?;
        let utilization = peak_flow / capacity;

        let flow_state = manning::solve_normal_depth(
            peak_flow,
            selection.section.profile(),
            channel.gradient,
            manning_n,
            DepthMode::Normal,
            &self.config.normal_depth,
        )?;

        let assessment = Assessment::classify(utilization, full.velocity, &self.config.velocity);
        let using_fallback_intensity = intensity.source == IntensitySource::Fallback;

        let mut warnings = Vec::new();
        if using_fallback_intensity {
            warnings.push(format!(
                "no IDF data loaded; using fallback intensity of {} mm/h",
                intensity.design
            ));
        }
        if selection.overflow {
            warnings.push(format!(
                "no standard U-channel carries the design flow; using {}",
                selection.label
            ));
        }
        warnings.extend(assessment.warning);

        debug!(
            target: "stormline::batch",
            catchment = %catchment.id,
            selected = %selection.label,
            utilization,
            velocity = full.velocity,
            ok = assessment.status == DesignStatus::Ok,
            "capacity check"
        );

        Ok(CalculationResult {
            catchment_id: catchment.id.clone(),
            channel_id: channel.id.map(str::to_owned),
            channel_shape: channel.shape,
            material: channel.material.to_owned(),
            manning_n,
            channel_gradient: channel.gradient,
            time_of_concentration,
            using_fallback_intensity,
            intensity,
            runoff_coefficient,
            peak_flow,
            peak_flow_lps: units::cubic_meters_to_liters_per_second(peak_flow),
            required_width: selection.required_width,
            required_depth: selection.required_depth,
            selected_width: selection.selected_width,
            selected_depth: selection.section.depth(),
            selected_size: selection.label,
            flow_depth: flow_state.depth,
            flow_velocity: flow_state.velocity,
            area: full.properties.area,
            wetted_perimeter: full.properties.wetted_perimeter,
            hydraulic_radius: full.properties.hydraulic_radius,
            capacity,
            velocity: full.velocity,
            utilization,
            status: assessment.status,
            error: assessment.error,
            warning: (!warnings.is_empty()).then(|| warnings.join("; ")),
            processed: true,
            processing_error: None,
        })
    }

    fn resolve_channel<'c>(&self, linked: Option<&'c ChannelInput>) -> ResolvedChannel<'c>
    where
        'a: 'c,
    {
        let defaults = &self.config.default_channel;
        match linked {
            Some(channel) => ResolvedChannel {
                id: Some(&channel.id),
                shape: channel.shape,
                gradient: channel.design_gradient(),
                material: channel.material.as_deref().unwrap_or(&defaults.material),
                overrides: channel.geometry,
                upstream: &channel.upstream,
            },
            None => ResolvedChannel {
                id: None,
                shape: defaults.shape,
                gradient: defaults.gradient,
                material: &defaults.material,
                overrides: GeometryOverrides::default(),
                upstream: &[],
            },
        }
    }

    fn intensity(
        &self,
        catchment: &CatchmentInput,
        duration: f64,
    ) -> Result<DesignIntensity, ValidationError> {
        match catchment.rainfall {
            Rainfall::Manual { intensity } => DesignIntensity::manual(intensity),
            Rainfall::Idf if self.reference.idf.is_empty() => {
                warn!(
                    target: "stormline::batch",
                    catchment = %catchment.id,
                    intensity = self.config.rainfall.fallback_intensity,
                    "no IDF data loaded; using fallback intensity"
                );
                DesignIntensity::fallback(self.config.rainfall.fallback_intensity)
            }
            Rainfall::Idf => DesignIntensity::from_idf(
                &self.reference.idf,
                catchment.return_period,
                duration,
                catchment.temporary_design,
                self.config.rainfall.climate_uplift,
            ),
        }
    }

    fn runoff_coefficient(&self, catchment: &CatchmentInput) -> Result<f64, ValidationError> {
        if catchment.sub_areas.is_empty() {
            return self.reference.runoff_coefficient(&catchment.surface_type);
        }

        let sub_areas = catchment
            .sub_areas
            .iter()
            .map(|sub_area| {
                Ok::<_, ValidationError>(SubArea {
                    runoff_coefficient: self.reference.runoff_coefficient(&sub_area.surface_type)?,
                    area: sub_area.area,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        rational::weighted_coefficient(&sub_areas)
    }
}

/// Designs every catchment with the given reference data and configuration.
#[must_use]
pub fn run_batch(
    reference: &ReferenceData,
    config: &DesignConfig,
    catchments: &[CatchmentInput],
    channels: &[ChannelInput],
) -> Vec<CalculationResult> {
    DesignEngine::new(reference, config).run(catchments, channels)
}

/// Counts of batch outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub processed: usize,
    pub failed: usize,
    pub ok: usize,
    pub not_ok: usize,
    pub with_warnings: usize,
}

impl BatchSummary {
    #[must_use]
    pub fn from_results(results: &[CalculationResult]) -> Self {
        results.iter().fold(
            Self {
                total: results.len(),
                ..Self::default()
            },
            |mut summary, result| {
                if result.processed {
                    summary.processed += 1;
                    match result.status {
                        DesignStatus::Ok => summary.ok += 1,
                        DesignStatus::NotOk => summary.not_ok += 1,
                    }
                } else {
                    summary.failed += 1;
                }
                if result.warning.is_some() {
                    summary.with_warnings += 1;
                }
                summary
            },
        )
    }
}
