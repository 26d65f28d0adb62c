//! Rainfall intensity from intensity-duration-frequency (IDF) curves.
//!
//! Each return period has its own curve `i = a / (t + b)^c`, with `i` in
//! mm/h and the storm duration `t` in minutes. Permanent works apply a
//! climate-change uplift on top of the raw curve value; temporary works do
//! not.

use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, ensure_non_negative, ensure_positive};

/// Curve constants for one return period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IdfConstants {
    /// Return period in years.
    pub return_period: u32,
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl IdfConstants {
    /// Raw curve intensity in mm/h for a duration in minutes.
    #[must_use]
    pub fn raw_intensity(&self, duration: f64) -> f64 {
        self.a / (duration + self.b).powf(self.c)
    }

    fn formula(&self) -> String {
        format!("i = {} / (t + {})^{}", self.a, self.b, self.c)
    }
}

/// IDF constants keyed by return period.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdfTable {
    rows: Vec<IdfConstants>,
}

impl IdfTable {
    #[must_use]
    pub fn new(rows: Vec<IdfConstants>) -> Self {
        Self { rows }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn rows(&self) -> &[IdfConstants] {
        &self.rows
    }

    /// Finds the constants for an exact return period.
    ///
    /// Return periods are never interpolated.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingIdfConstants`] if there is no row.
    pub fn lookup(&self, return_period: u32) -> Result<&IdfConstants, ValidationError> {
        self.rows
            .iter()
            .find(|row| row.return_period == return_period)
            .ok_or(ValidationError::MissingIdfConstants { return_period })
    }
}

/// Where a design intensity came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IntensitySource {
    #[default]
    Idf,
    Manual,
    /// No IDF data was available, so the configured fallback was used.
    Fallback,
}

/// The rainfall intensity used for design.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DesignIntensity {
    /// Intensity before any uplift, mm/h.
    pub raw: f64,
    /// Intensity used for design, mm/h.
    pub design: f64,
    /// `design` scaled by 1e-6, kept for reporting.
    pub si: f64,
    pub uplift_applied: bool,
    /// Human-readable derivation.
    pub formula: String,
    pub source: IntensitySource,
}

/// Scale between the reported mm/h intensity and its SI column.
const SI_SCALE: f64 = 1e-6;

impl DesignIntensity {
    /// Computes the design intensity from the IDF curve for a return period.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the duration is not positive, the
    /// uplift is not positive, or the table has no row for the return period.
    pub fn from_idf(
        table: &IdfTable,
        return_period: u32,
        duration: f64,
        temporary_design: bool,
        uplift: f64,
    ) -> Result<Self, ValidationError> {
        let duration = ensure_positive("storm duration", duration)?;
        let uplift = ensure_positive("climate uplift", uplift)?;
        let constants = table.lookup(return_period)?;

        let raw = constants.raw_intensity(duration);
        let (design, formula) = if temporary_design {
            (raw, constants.formula())
        } else {
            (raw * uplift, format!("{uplift} × {}", constants.formula()))
        };

        Ok(Self {
            raw,
            design,
            si: design * SI_SCALE,
            uplift_applied: !temporary_design,
            formula,
            source: IntensitySource::Idf,
        })
    }

    /// Uses an intensity supplied directly by the designer.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the intensity is negative.
    pub fn manual(intensity: f64) -> Result<Self, ValidationError> {
        let intensity = ensure_non_negative("manual rainfall intensity", intensity)?;
        Ok(Self::fixed(intensity, IntensitySource::Manual))
    }

    /// Uses the configured fallback intensity.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the intensity is not positive.
    pub fn fallback(intensity: f64) -> Result<Self, ValidationError> {
        let intensity = ensure_positive("fallback rainfall intensity", intensity)?;
        Ok(Self::fixed(intensity, IntensitySource::Fallback))
    }

    fn fixed(intensity: f64, source: IntensitySource) -> Self {
        Self {
            raw: intensity,
            design: intensity,
            si: intensity * SI_SCALE,
            uplift_applied: false,
            formula: format!("i = {intensity}"),
            source,
        }
    }
}
