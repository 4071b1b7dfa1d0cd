//! # Errors and Warnings
//!
//! Two kinds of problems come out of the alignment core:
//!
//! - [`AlignmentError`]: fatal to a render request. Raised immediately and
//!   propagated to the caller (unknown region, malformed bounding box, invalid
//!   calibration data).
//! - [`AlignmentWarning`]: recovered locally. The affected period or delta is
//!   skipped and the warning is collected on the output sequence so a partial
//!   product can still render.

use crate::dataset::DatasetSource;
use serde::Serialize;
use thiserror::Error;

/// Errors that abort a render request
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AlignmentError {
    #[error("Unknown region code: {0}")]
    UnknownRegion(String),

    #[error(
        "Invalid bounding box (west={west}, east={east}, south={south}, north={north}): {reason}"
    )]
    InvalidBoundingBox {
        west: f64,
        east: f64,
        south: f64,
        north: f64,
        reason: String,
    },

    #[error("Invalid region selector: {0}")]
    InvalidSelector(String),

    #[error("Invalid decimation table: {0}")]
    InvalidDecimationTable(String),

    #[error("Invalid transition window [{start_hour}, {end_hour}): hours must be in 0..24")]
    InvalidTransitionWindow { start_hour: u32, end_hour: u32 },
}

/// Result type for alignment operations
pub type AlignmentResult<T> = Result<T, AlignmentError>;

/// Non-fatal conditions recorded while sequencing periods or stitching trends
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AlignmentWarning {
    #[error("{dataset} dataset has no forecast periods")]
    EmptyDataset { dataset: DatasetSource },

    #[error("Grid '{variable}' is missing for {dataset} period {index}")]
    MissingGrid {
        dataset: DatasetSource,
        index: usize,
        variable: String,
    },

    #[error("Validity window is missing for {dataset} period {index}")]
    MissingValidity { dataset: DatasetSource, index: usize },

    #[error(
        "Grid '{variable}' shape {from_shape:?} of {from_dataset} period {from_index} does not match shape {to_shape:?} of {to_dataset} period {to_index}"
    )]
    ShapeMismatch {
        variable: String,
        from_dataset: DatasetSource,
        from_index: usize,
        from_shape: (usize, usize),
        to_dataset: DatasetSource,
        to_index: usize,
        to_shape: (usize, usize),
    },
}
