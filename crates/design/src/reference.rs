//! Lookup tables shared by every design: surface runoff coefficients,
//! channel roughness, standard U-channel sizes, and IDF constants.
//!
//! The built-in tables are illustrative defaults. Projects should load
//! tables for their own locality with [`ReferenceData::from_toml_str`] or
//! by embedding a `[reference]` section in the project file.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{
    config::ConfigError,
    error::ValidationError,
    idf::{IdfConstants, IdfTable},
};

/// A ground surface with its rational-method runoff coefficient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceType {
    pub id: String,
    pub name: String,
    pub runoff_coefficient: f64,
}

/// A channel lining with its Manning's roughness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelMaterial {
    pub id: String,
    pub name: String,
    pub manning_n: f64,
}

/// A precast U-channel size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardChannelSize {
    /// Internal width, in mm.
    pub size_mm: u32,
    pub label: String,
}

impl StandardChannelSize {
    /// Internal width in m.
    #[must_use]
    pub fn width(&self) -> f64 {
        f64::from(self.size_mm) / 1000.0
    }
}

/// All lookup tables used by a design run.
///
/// Any table missing from a TOML document is taken from the built-in
/// defaults. An explicitly empty `idf` table is kept empty, which makes the
/// engine fall back to a fixed intensity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceData {
    #[serde(default = "builtin_surface_types")]
    pub surface_types: Vec<SurfaceType>,
    #[serde(default = "builtin_materials")]
    pub materials: Vec<ChannelMaterial>,
    #[serde(default = "builtin_u_channel_sizes")]
    pub u_channel_sizes: Vec<StandardChannelSize>,
    #[serde(default = "builtin_idf")]
    pub idf: IdfTable,
}

impl Default for ReferenceData {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ReferenceData {
    /// The built-in tables.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            surface_types: builtin_surface_types(),
            materials: builtin_materials(),
            u_channel_sizes: builtin_u_channel_sizes(),
            idf: builtin_idf(),
        }
    }

    /// Parses tables from TOML, validates them, and sorts the U-channel
    /// sizes ascending.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the document does not parse or a table
    /// is invalid.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let mut reference: Self = toml::from_str(source)?;
        reference.normalize()?;
        Ok(reference)
    }

    /// Validates the tables and sorts the U-channel sizes ascending.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a table is invalid.
    pub fn normalize(&mut self) -> Result<(), ConfigError> {
        self.validate()?;
        self.u_channel_sizes.sort_by_key(|size| size.size_mm);
        Ok(())
    }

    /// Checks every table entry.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] naming the first invalid or duplicate entry.
    pub fn validate(&self) -> Result<(), ConfigError> {
        unique("surface_types", self.surface_types.iter().map(|s| s.id.clone()))?;
        for surface in &self.surface_types {
            if !(0.0..=1.0).contains(&surface.runoff_coefficient) {
                return Err(ConfigError::Invalid {
                    field: "surface_types.runoff_coefficient",
                    reason: format!(
                        "`{}` has {} outside [0, 1]",
                        surface.id, surface.runoff_coefficient
                    ),
                });
            }
        }

        unique("materials", self.materials.iter().map(|m| m.id.clone()))?;
        for material in &self.materials {
            if !(material.manning_n.is_finite() && material.manning_n > 0.0) {
                return Err(ConfigError::Invalid {
                    field: "materials.manning_n",
                    reason: format!("`{}` has non-positive {}", material.id, material.manning_n),
                });
            }
        }

        unique(
            "u_channel_sizes",
            self.u_channel_sizes.iter().map(|s| s.size_mm.to_string()),
        )?;
        if let Some(size) = self.u_channel_sizes.iter().find(|s| s.size_mm == 0) {
            return Err(ConfigError::Invalid {
                field: "u_channel_sizes.size_mm",
                reason: format!("`{}` has zero width", size.label),
            });
        }

        unique(
            "idf",
            self.idf.rows().iter().map(|row| row.return_period.to_string()),
        )?;
        for row in self.idf.rows() {
            if !(row.a > 0.0 && row.b >= 0.0 && row.c > 0.0) {
                return Err(ConfigError::Invalid {
                    field: "idf",
                    reason: format!(
                        "constants for the {}-year return period must be positive",
                        row.return_period
                    ),
                });
            }
        }
        Ok(())
    }

    /// Runoff coefficient of a surface type.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnknownSurfaceType`] for an unknown id.
    pub fn runoff_coefficient(&self, surface_type: &str) -> Result<f64, ValidationError> {
        self.surface_types
            .iter()
            .find(|s| s.id == surface_type)
            .map(|s| s.runoff_coefficient)
            .ok_or_else(|| ValidationError::UnknownSurfaceType(surface_type.to_owned()))
    }

    /// Manning's n of a channel material.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnknownMaterial`] for an unknown id.
    pub fn manning_n(&self, material: &str) -> Result<f64, ValidationError> {
        self.materials
            .iter()
            .find(|m| m.id == material)
            .map(|m| m.manning_n)
            .ok_or_else(|| ValidationError::UnknownMaterial(material.to_owned()))
    }
}

fn unique(table: &'static str, ids: impl Iterator<Item = String>) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id.clone()) {
            return Err(ConfigError::Duplicate { table, id });
        }
    }
    Ok(())
}

fn builtin_surface_types() -> Vec<SurfaceType> {
    [
        ("asphalt", "Asphalt paving", 0.95),
        ("concrete", "Concrete paving", 0.95),
        ("brick", "Brick paving", 0.85),
        ("roof", "Roofs", 0.95),
        ("gravel", "Gravel surfaces", 0.5),
        ("grassland_sandy_flat", "Grassland, sandy soil, flat", 0.1),
        ("grassland_sandy_steep", "Grassland, sandy soil, steep", 0.2),
        ("grassland_heavy_flat", "Grassland, heavy soil, flat", 0.17),
        ("grassland_heavy_steep", "Grassland, heavy soil, steep", 0.35),
        ("woodland", "Woodland", 0.2),
    ]
    .into_iter()
    .map(|(id, name, runoff_coefficient)| SurfaceType {
        id: id.to_owned(),
        name: name.to_owned(),
        runoff_coefficient,
    })
    .collect()
}

fn builtin_materials() -> Vec<ChannelMaterial> {
    [
        ("concrete", "Concrete", 0.013),
        ("cement_rendering", "Cement rendering", 0.015),
        ("stone_pitching", "Stone pitching", 0.025),
        ("earth", "Earth", 0.025),
        ("grass", "Grass lined", 0.035),
    ]
    .into_iter()
    .map(|(id, name, manning_n)| ChannelMaterial {
        id: id.to_owned(),
        name: name.to_owned(),
        manning_n,
    })
    .collect()
}

fn builtin_u_channel_sizes() -> Vec<StandardChannelSize> {
    (300..=900)
        .step_by(75)
        .map(|size_mm| StandardChannelSize {
            size_mm,
            label: format!("U{size_mm}"),
        })
        .collect()
}

fn builtin_idf() -> IdfTable {
    IdfTable::new(
        [
            (2, 540.0, 4.5, 0.44),
            (5, 640.0, 4.8, 0.44),
            (10, 720.0, 5.0, 0.44),
            (20, 790.0, 5.2, 0.44),
            (50, 880.0, 5.5, 0.44),
            (100, 950.0, 5.7, 0.44),
            (200, 1020.0, 6.0, 0.44),
        ]
        .into_iter()
        .map(|(return_period, a, b, c)| IdfConstants {
            return_period,
            a,
            b,
            c,
        })
        .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_tables_are_valid() -> Result<(), ConfigError> {
        let reference = ReferenceData::builtin();
        reference.validate()?;

        let sizes: Vec<u32> = reference.u_channel_sizes.iter().map(|s| s.size_mm).collect();
        assert_eq!(sizes, [300, 375, 450, 525, 600, 675, 750, 825, 900]);
        assert_eq!(reference.u_channel_sizes[2].label, "U450");
        assert_eq!(reference.idf.lookup(10).map(|row| row.a), Ok(720.0));
        Ok(())
    }

    #[test]
    fn lookups_by_id() {
        let reference = ReferenceData::builtin();
        assert_eq!(reference.manning_n("concrete"), Ok(0.013));
        assert_eq!(reference.runoff_coefficient("woodland"), Ok(0.2));
        assert_eq!(
            reference.runoff_coefficient("lava"),
            Err(ValidationError::UnknownSurfaceType("lava".to_owned()))
        );
        assert_eq!(
            reference.manning_n("glass"),
            Err(ValidationError::UnknownMaterial("glass".to_owned()))
        );
    }

    #[test]
    fn toml_tables_replace_only_what_they_name() -> Result<(), ConfigError> {
        let reference = ReferenceData::from_toml_str(
            r#"
            [[u_channel_sizes]]
            size_mm = 600
            label = "U600"

            [[u_channel_sizes]]
            size_mm = 400
            label = "U400"

            [[materials]]
            id = "hdpe"
            name = "HDPE"
            manning_n = 0.011
            "#,
        )?;

        assert_eq!(reference.u_channel_sizes[0].size_mm, 400);
        assert_eq!(reference.manning_n("hdpe"), Ok(0.011));
        assert!(reference.manning_n("concrete").is_err());
        assert_eq!(reference.surface_types, builtin_surface_types());
        assert!(!reference.idf.is_empty());
        Ok(())
    }

    #[test]
    fn empty_idf_table_is_kept() -> Result<(), ConfigError> {
        let reference = ReferenceData::from_toml_str("idf = []")?;
        assert!(reference.idf.is_empty());
        Ok(())
    }

    #[test]
    fn rejects_invalid_tables() {
        let err = ReferenceData::from_toml_str(
            r#"
            [[surface_types]]
            id = "mud"
            name = "Mud"
            runoff_coefficient = 1.4
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));

        let err = ReferenceData::from_toml_str(
            r#"
            [[idf]]
            return_period = 10
            a = 720.0
            b = 5.0
            c = 0.44

            [[idf]]
            return_period = 10
            a = 700.0
            b = 5.0
            c = 0.44
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Duplicate { table: "idf", .. }));
    }
}
