//! Error types for the topography crate.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when opening or reading the topography grid.
#[derive(Debug, Error)]
pub enum TopoError {
    /// The backing grid file does not exist.
    #[error("Topography file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// I/O error reading the grid file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid YAML configuration.
    #[error("Invalid dataset configuration: {0}")]
    Config(#[from] serde_yaml::Error),

    /// The file length does not match the grid dimensions.
    #[error("File {} holds {actual} bytes, expected {expected} for the grid shape", path.display())]
    SizeMismatch {
        /// Path of the grid file.
        path: PathBuf,
        /// Expected length in bytes.
        expected: u64,
        /// Actual length in bytes.
        actual: u64,
    },

    /// A longitude lies outside the bounds of the requested convention.
    #[error("Longitudes ({west}, {east}) must lie between {min_lon} and {max_lon} degrees")]
    LongitudeOutOfRange {
        /// Requested western edge.
        west: f64,
        /// Requested eastern edge.
        east: f64,
        /// Lower bound of the convention.
        min_lon: f64,
        /// Upper bound of the convention.
        max_lon: f64,
    },

    /// A latitude lies outside the latitude span of the grid.
    #[error("Latitudes ({south}, {north}) must lie between {min_lat} and {max_lat} degrees")]
    LatitudeOutOfRange {
        /// Requested southern edge.
        south: f64,
        /// Requested northern edge.
        north: f64,
        /// Southernmost latitude of the grid.
        min_lat: f64,
        /// Northernmost latitude of the grid.
        max_lat: f64,
    },

    /// The region has zero width or zero height.
    #[error("Region ({south}, {north}, {west}, {east}) is degenerate: edges must differ")]
    DegenerateRegion {
        /// Southern edge.
        south: f64,
        /// Northern edge.
        north: f64,
        /// Western edge.
        west: f64,
        /// Eastern edge.
        east: f64,
    },

    /// Subsampling factor must be at least one.
    #[error("Invalid subsample factor {0} (must be >= 1)")]
    InvalidSubsample(usize),

    /// The grid description is unusable.
    #[error("Invalid grid shape: {0}")]
    InvalidShape(String),

    /// Output array construction failed.
    #[error("Array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    /// The positioned reader's file lock was poisoned (a thread panicked while holding it).
    #[error("Grid source lock was poisoned")]
    SourceLockPoisoned,
}

impl TopoError {
    /// Whether this error rejects the caller's query rather than the dataset.
    ///
    /// These are resubmittable: the same dataset answers a corrected query.
    pub fn is_range_error(&self) -> bool {
        matches!(
            self,
            TopoError::LongitudeOutOfRange { .. }
                | TopoError::LatitudeOutOfRange { .. }
                | TopoError::DegenerateRegion { .. }
                | TopoError::InvalidSubsample(_)
        )
    }
}
