//! # sstopo
//!
//! Read-only access to the Smith-Sandwell global seafloor topography grid.
//!
//! ## Overview
//!
//! The grid is a flat file of big-endian `i16` samples (meters), 17280 rows
//! by 21600 columns, row-major with the northernmost row first:
//! - Longitude is evenly spaced at 1 arc-minute, cell-centred, starting just
//!   east of the prime meridian.
//! - Latitude is Mercator-spaced between 80.738°S and 80.738°N, so cells
//!   get shorter toward the poles.
//!
//! This crate computes both coordinate axes, flips the rows so latitude
//! increases, and cuts arbitrary latitude-longitude rectangles out of the
//! file, including rectangles that cross the antimeridian or the prime
//! meridian. Only the rows and columns a query needs are read.
//!
//! Longitudes are handled internally in [-180, 180). Queries may use
//! [-180, 180] or [0, 360] (see [`LonConvention`]), and results come back in
//! the query's convention.
//!
//! ## Examples
//!
//! ```no_run
//! use sstopo::{LonConvention, Region, TopoDataset};
//!
//! let topo = TopoDataset::open("data/topo_18.1.img")?;
//!
//! // Whole globe at 1/64 resolution.
//! let (lat, lon, z) = topo.extract_all(64)?.into_parts();
//! println!("global grid: {:?}", z.dim());
//!
//! // 20°S-40°N, 30°W-20°E: crosses the prime meridian in [0, 360].
//! let region = Region::new(-20.0, 40.0, 330.0, 20.0).with_convention(LonConvention::ZeroTo360);
//! let atlantic = topo.extract_region(&region, Some(32))?;
//! assert!(atlantic.longitude()[0] < 0.0);
//!
//! // Single cell lookup.
//! let depth = topo.elevation_nearest(47.6, -122.3)?;
//! # let _ = (lat, lon, depth);
//! # Ok::<(), sstopo::TopoError>(())
//! ```

mod config;
mod dataset;
mod error;
mod extract;
mod geometry;
mod region;
mod source;

pub use config::{DatasetConfig, GridAccess};
pub use dataset::TopoDataset;
pub use error::TopoError;
pub use extract::{ColumnSegment, RegionExtractor, RegionPlan};
pub use geometry::{
    boundary_index_left, boundary_index_right, nearest_index, GridAxes, GridShape, LonConvention,
    LonFrame,
};
pub use region::{Region, RegionResult};
pub use source::{GridSource, InMemoryGrid, MappedGrid, PositionedGrid};

/// Result type for topography operations.
pub type Result<T> = std::result::Result<T, TopoError>;
