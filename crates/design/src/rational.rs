//! Peak runoff by the rational method, `Q = C i A`.

use serde::Serialize;

use crate::error::{ValidationError, ensure_non_negative, ensure_positive, ensure_unit_interval};

/// A portion of a catchment with a uniform runoff coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SubArea {
    pub runoff_coefficient: f64,
    /// Area in m².
    pub area: f64,
}

/// Area-weighted runoff coefficient, `Σ(Cᵢ Aᵢ) / Σ Aᵢ`.
///
/// # Errors
///
/// Returns a [`ValidationError`] if any coefficient lies outside `[0, 1]`,
/// any area is not positive, or there are no sub-areas.
pub fn weighted_coefficient(sub_areas: &[SubArea]) -> Result<f64, ValidationError> {
    let mut weighted = 0.0;
    let mut total = 0.0;
    for sub_area in sub_areas {
        let c = ensure_unit_interval("runoff coefficient", sub_area.runoff_coefficient)?;
        let area = ensure_positive("sub-area", sub_area.area)?;
        weighted += c * area;
        total += area;
    }

    if total <= 0.0 {
        return Err(ValidationError::ZeroTotalArea);
    }
    Ok(weighted / total)
}

/// Peak runoff in m³/s.
///
/// `intensity` is in m/s and `area` in m².
///
/// # Errors
///
/// Returns a [`ValidationError`] if the coefficient lies outside `[0, 1]`,
/// the intensity is negative, or the area is not positive.
pub fn peak_flow(runoff_coefficient: f64, intensity: f64, area: f64) -> Result<f64, ValidationError> {
    let c = ensure_unit_interval("runoff coefficient", runoff_coefficient)?;
    let i = ensure_non_negative("rainfall intensity", intensity)?;
    let a = ensure_positive("catchment area", area)?;
    Ok(c * i * a)
}
