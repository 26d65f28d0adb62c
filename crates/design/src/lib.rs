//! Stormwater drainage channel design.
//!
//! For each catchment the engine estimates a time of concentration, looks up
//! the design rainfall intensity, computes the peak runoff with the rational
//! method, and sizes a trapezoidal or U-shaped channel to carry it using
//! Manning's equation. Every root search goes through the bisection solver
//! in `stormline-solvers`.
//!
//! ```
//! use stormline_design::{
//!     CatchmentInput, DesignConfig, DesignStatus, Rainfall, ReferenceData, run_batch,
//! };
//!
//! let catchment = CatchmentInput {
//!     id: "C1".to_owned(),
//!     area: 5000.0,
//!     average_slope: 2.0,
//!     flow_path_length: 120.0,
//!     surface_type: "asphalt".to_owned(),
//!     sub_areas: Vec::new(),
//!     return_period: 10,
//!     rainfall: Rainfall::Idf,
//!     temporary_design: false,
//! };
//!
//! let results = run_batch(
//!     &ReferenceData::builtin(),
//!     &DesignConfig::default(),
//!     &[catchment],
//!     &[],
//! );
//! assert_eq!(results[0].status, DesignStatus::Ok);
//! ```

pub mod batch;
pub mod config;
pub mod error;
pub mod geometry;
pub mod idf;
pub mod input;
pub mod manning;
pub mod project;
pub mod rational;
pub mod reference;
pub mod result;
pub mod sizing;
pub mod tc;
pub mod units;

mod search;

pub use batch::{BatchSummary, ChannelNetwork, DesignEngine, run_batch};
pub use config::{ConfigError, DesignConfig};
pub use error::{DesignError, ValidationError};
pub use input::{CatchmentInput, ChannelInput, ChannelShape, Override, Rainfall};
pub use project::{Project, ProjectReport};
pub use reference::ReferenceData;
pub use result::{CalculationResult, DesignStatus};
pub use search::SearchSummary;
