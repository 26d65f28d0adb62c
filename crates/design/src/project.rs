//! A complete design project: configuration, reference tables, and records.
//!
//! Everything lives in one TOML document. Every section is optional; missing
//! configuration and reference tables fall back to the built-in defaults.
//!
//! ```toml
//! [config]
//! parallel = false
//!
//! [[catchments]]
//! id = "C1"
//! area = 4200.0
//! average_slope = 2.0
//! flow_path_length = 95.0
//! surface_type = "asphalt"
//! return_period = 10
//!
//! [[channels]]
//! id = "CH1"
//! catchment_id = "C1"
//! shape = "u_channel"
//! length = 60.0
//! terrain_gradient = 0.012
//! ```

use serde::{Deserialize, Serialize};

use crate::{
    batch::{BatchSummary, run_batch},
    config::{ConfigError, DesignConfig},
    input::{CatchmentInput, ChannelInput},
    reference::ReferenceData,
    result::CalculationResult,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub config: DesignConfig,
    pub reference: ReferenceData,
    pub catchments: Vec<CatchmentInput>,
    pub channels: Vec<ChannelInput>,
}

/// Results of a project run, with their summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectReport {
    pub summary: BatchSummary,
    pub results: Vec<CalculationResult>,
}

impl Project {
    /// Parses a project and validates its configuration and tables.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the document does not parse or its
    /// configuration or reference tables are invalid. Problems with
    /// individual catchments are reported per catchment by [`Project::run`].
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let mut project: Self = toml::from_str(source)?;
        project.config.validate()?;
        project.reference.normalize()?;
        Ok(project)
    }

    /// Designs every catchment in the project.
    #[must_use]
    pub fn run(&self) -> ProjectReport {
        let results = run_batch(
            &self.reference,
            &self.config,
            &self.catchments,
            &self.channels,
        );
        ProjectReport {
            summary: BatchSummary::from_results(&results),
            results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::input::{ChannelShape, Rainfall};

    #[test]
    fn empty_document_is_an_empty_project() -> Result<(), ConfigError> {
        let project = Project::from_toml_str("")?;
        assert_eq!(project, Project::default());
        assert_eq!(project.run().summary, BatchSummary::default());
        Ok(())
    }

    #[test]
    fn parses_records_and_overrides() -> Result<(), ConfigError> {
        let project = Project::from_toml_str(
            r#"
            [config]
            parallel = false

            [config.default_channel]
            material = "earth"

            [[catchments]]
            id = "C1"
            area = 4200.0
            average_slope = 2.0
            flow_path_length = 95.0
            surface_type = "asphalt"
            return_period = 10
            rainfall = { source = "manual", intensity = 90.0 }

            [[channels]]
            id = "CH1"
            catchment_id = "C1"
            shape = "u_channel"
            length = 60.0
            terrain_gradient = 0.012
            "#,
        )?;

        assert!(!project.config.parallel);
        assert_eq!(project.config.default_channel.material, "earth");
        assert_eq!(
            project.catchments[0].rainfall,
            Rainfall::Manual { intensity: 90.0 }
        );
        assert_eq!(project.channels[0].shape, ChannelShape::UChannel);
        assert_eq!(project.reference, ReferenceData::builtin());

        let report = project.run();
        assert_eq!(report.summary.total, 1);
        assert_eq!(report.results[0].channel_id.as_deref(), Some("CH1"));
        Ok(())
    }

    #[test]
    fn invalid_configuration_is_rejected() {
        assert!(matches!(
            Project::from_toml_str("[config.trapezoid]\nside_slope = -1.0"),
            Err(ConfigError::Invalid { .. })
        ));
    }
}
