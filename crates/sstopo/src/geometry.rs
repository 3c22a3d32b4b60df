//! Coordinate axes of the Mercator topography grid.
//!
//! The grid is evenly spaced in longitude and Mercator-spaced in latitude:
//! rows are uniform in projected `y`, with the projected row height equal to
//! the longitude step (square Mercator cells). Both axes are cell-centred.
//!
//! Internally longitudes use one convention, [-180, 180). The [0, 360) view
//! is produced on demand by [`GridAxes::frame`].

use crate::{Result, TopoError};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::f64::consts::PI;

/// Degrees to radians.
const RAD: f64 = PI / 180.0;

/// Allowed mismatch (degrees) between a declared latitude span and the span of its rows.
const SPAN_TOLERANCE: f64 = 1e-3;

/// Dimensions and latitude span of a Mercator grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridShape {
    /// Number of longitude columns.
    pub n_lon: usize,
    /// Number of latitude rows.
    pub n_lat: usize,
    /// Southern edge of the grid (degrees).
    pub min_lat: f64,
    /// Northern edge of the grid (degrees).
    pub max_lat: f64,
}

impl GridShape {
    /// Smith-Sandwell 1 arc-minute global topography (v18.1).
    pub const SMITH_SANDWELL: GridShape = GridShape {
        n_lon: 21600,
        n_lat: 17280,
        min_lat: -80.738,
        max_lat: 80.738,
    };

    /// Build a symmetric grid shape with square Mercator cells.
    ///
    /// The latitude span follows from the dimensions: `n_lat` rows of
    /// projected height `360 / n_lon` degrees, centred on the equator.
    /// `mercator(21600, 17280)` reproduces the Smith-Sandwell span.
    pub fn mercator(n_lon: usize, n_lat: usize) -> Result<Self> {
        if n_lon == 0 || n_lat == 0 {
            return Err(TopoError::InvalidShape(format!(
                "grid must have at least one row and column, got {n_lat}x{n_lon}"
            )));
        }

        let half_height = n_lat as f64 * (360.0 / n_lon as f64) * RAD / 2.0;
        let max_lat = gudermannian(half_height) / RAD;

        let shape = Self {
            n_lon,
            n_lat,
            min_lat: -max_lat,
            max_lat,
        };
        shape.validate()?;
        Ok(shape)
    }

    /// Check that the shape describes a usable grid.
    pub fn validate(&self) -> Result<()> {
        if self.n_lon == 0 || self.n_lat == 0 {
            return Err(TopoError::InvalidShape(format!(
                "grid must have at least one row and column, got {}x{}",
                self.n_lat, self.n_lon
            )));
        }
        if !(self.min_lat < self.max_lat) || self.min_lat <= -90.0 || self.max_lat >= 90.0 {
            return Err(TopoError::InvalidShape(format!(
                "latitude span ({}, {}) must be increasing and strictly inside the poles",
                self.min_lat, self.max_lat
            )));
        }

        // Rows are laid out from max_lat with the longitude step as their
        // projected height, so the dimensions fix the span.
        let south = self.edge_latitude(0.0);
        let north = self.edge_latitude(self.n_lat as f64);
        if (south - self.min_lat).abs() > SPAN_TOLERANCE
            || (north - self.max_lat).abs() > SPAN_TOLERANCE
        {
            return Err(TopoError::InvalidShape(format!(
                "{}x{} Mercator rows span ({south:.4}, {north:.4}), not ({}, {})",
                self.n_lat, self.n_lon, self.min_lat, self.max_lat
            )));
        }
        Ok(())
    }

    /// Latitude `rows` projected rows north of the southern edge.
    fn edge_latitude(&self, rows: f64) -> f64 {
        let merc_arg = (RAD * (90.0 - self.max_lat) / 2.0).tan().ln();
        2.0 * (RAD * rows * self.lon_step() + merc_arg).exp().atan() / RAD - 90.0
    }

    /// Longitude spacing in degrees.
    pub fn lon_step(&self) -> f64 {
        360.0 / self.n_lon as f64
    }

    /// Number of samples in the grid.
    pub fn sample_count(&self) -> usize {
        self.n_lat * self.n_lon
    }

    /// Size of the backing file in bytes (two bytes per sample).
    pub fn byte_len(&self) -> u64 {
        self.sample_count() as u64 * 2
    }
}

impl Default for GridShape {
    fn default() -> Self {
        Self::SMITH_SANDWELL
    }
}

/// Longitude convention for queries and results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LonConvention {
    /// Longitudes in [-180, 180]; the seam is the antimeridian.
    #[default]
    PlusMinus180,
    /// Longitudes in [0, 360]; the seam is the prime meridian.
    ZeroTo360,
}

impl LonConvention {
    /// Inclusive bounds accepted for query longitudes.
    pub fn bounds(&self) -> (f64, f64) {
        match self {
            LonConvention::PlusMinus180 => (-180.0, 180.0),
            LonConvention::ZeroTo360 => (0.0, 360.0),
        }
    }
}

/// Longitude axis expressed in one convention, with its mapping to file columns.
#[derive(Debug, Clone)]
pub struct LonFrame<'a> {
    convention: LonConvention,
    axis: Cow<'a, [f64]>,
    disk_offset: usize,
}

impl LonFrame<'_> {
    /// Convention of this frame.
    pub fn convention(&self) -> LonConvention {
        self.convention
    }

    /// Sorted longitude axis of this frame.
    pub fn axis(&self) -> &[f64] {
        &self.axis
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.axis.len()
    }

    /// Whether the frame has no columns.
    pub fn is_empty(&self) -> bool {
        self.axis.is_empty()
    }

    /// Column of the backing file holding frame column `column`.
    pub fn disk_column(&self, column: usize) -> usize {
        (column + self.disk_offset) % self.axis.len()
    }
}

/// Immutable latitude and longitude axes of the grid.
#[derive(Debug, Clone)]
pub struct GridAxes {
    shape: GridShape,
    /// Cell-centre latitudes, south to north.
    latitude: Vec<f64>,
    /// Cell-centre longitudes in [-180, 180), west to east.
    longitude: Vec<f64>,
    /// File column where the canonical axis starts (first raw longitude >= 180).
    seam: usize,
}

impl GridAxes {
    /// Compute the axes for a grid shape.
    pub fn new(shape: GridShape) -> Result<Self> {
        shape.validate()?;

        let step = shape.lon_step();

        // Row j counts from the south edge; it is file row n_lat - 1 - j.
        let latitude = (0..shape.n_lat)
            .map(|j| shape.edge_latitude(j as f64 + 0.5))
            .collect();

        // File columns start at 0 degrees; rotate so the axis starts at -180.
        let raw: Vec<f64> = (0..shape.n_lon)
            .map(|k| k as f64 * step + step / 2.0)
            .collect();
        let seam = raw.partition_point(|&lon| lon < 180.0);
        let longitude = raw[seam..]
            .iter()
            .map(|lon| lon - 360.0)
            .chain(raw[..seam].iter().copied())
            .collect();

        Ok(Self {
            shape,
            latitude,
            longitude,
            seam,
        })
    }

    /// Shape these axes were computed for.
    pub fn shape(&self) -> GridShape {
        self.shape
    }

    /// Cell-centre latitudes, strictly increasing.
    pub fn latitude(&self) -> &[f64] {
        &self.latitude
    }

    /// Cell-centre longitudes in [-180, 180), strictly increasing.
    pub fn longitude(&self) -> &[f64] {
        &self.longitude
    }

    /// Longitude spacing in degrees.
    pub fn lon_step(&self) -> f64 {
        self.shape.lon_step()
    }

    /// File row holding ascending-latitude row `row`.
    pub fn disk_row(&self, row: usize) -> usize {
        self.shape.n_lat - 1 - row
    }

    /// The longitude axis expressed in `convention`.
    pub fn frame(&self, convention: LonConvention) -> LonFrame<'_> {
        match convention {
            LonConvention::PlusMinus180 => LonFrame {
                convention,
                axis: Cow::Borrowed(&self.longitude),
                disk_offset: self.seam,
            },
            LonConvention::ZeroTo360 => {
                let east_start = self.shape.n_lon - self.seam;
                let axis = self.longitude[east_start..]
                    .iter()
                    .copied()
                    .chain(self.longitude[..east_start].iter().map(|lon| lon + 360.0))
                    .collect();
                LonFrame {
                    convention,
                    axis: Cow::Owned(axis),
                    disk_offset: 0,
                }
            }
        }
    }

    /// Latitudes of the `n_lat + 1` cell boundaries, south to north.
    pub fn latitude_edges(&self) -> Vec<f64> {
        (0..=self.shape.n_lat)
            .map(|e| self.shape.edge_latitude(e as f64))
            .collect()
    }

    /// Longitudes of the `n_lon + 1` cell boundaries, west to east.
    pub fn longitude_edges(&self) -> Vec<f64> {
        let step = self.lon_step();
        let west = self.longitude[0] - step / 2.0;
        (0..=self.shape.n_lon)
            .map(|e| west + e as f64 * step)
            .collect()
    }
}

/// Index of the last entry at or before `value`, or 0 if `value` precedes them all.
pub fn boundary_index_left(axis: &[f64], value: f64) -> usize {
    axis.partition_point(|&x| x <= value).saturating_sub(1)
}

/// Index of the first entry at or after `value`, or the last index if `value` exceeds them all.
pub fn boundary_index_right(axis: &[f64], value: f64) -> usize {
    axis.partition_point(|&x| x < value).min(axis.len().saturating_sub(1))
}

/// Index of the entry closest to `value`.
pub fn nearest_index(axis: &[f64], value: f64) -> usize {
    let left = boundary_index_left(axis, value);
    let right = boundary_index_right(axis, value);
    if (axis[right] - value).abs() < (value - axis[left]).abs() {
        right
    } else {
        left
    }
}

/// Inverse Mercator: projected `y` (radians) to latitude (radians).
fn gudermannian(y: f64) -> f64 {
    2.0 * y.exp().atan() - PI / 2.0
}
