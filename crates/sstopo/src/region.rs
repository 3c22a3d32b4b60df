//! Query rectangles and extraction results.

use crate::{GridShape, LonConvention, Result, TopoError};
use ndarray::Array2;

/// A latitude-longitude rectangle to extract.
///
/// `west > east` selects the rectangle that crosses the seam of the
/// convention (the antimeridian for [`LonConvention::PlusMinus180`], the
/// prime meridian for [`LonConvention::ZeroTo360`]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    /// Southern edge in degrees.
    pub south: f64,
    /// Northern edge in degrees.
    pub north: f64,
    /// Western edge in degrees.
    pub west: f64,
    /// Eastern edge in degrees.
    pub east: f64,
    /// Convention of `west`, `east` and of the returned longitudes.
    pub convention: LonConvention,
}

impl Region {
    /// Create a region with longitudes in [-180, 180].
    ///
    /// `south` and `north` may be given in either order.
    pub fn new(south: f64, north: f64, west: f64, east: f64) -> Self {
        Self {
            south,
            north,
            west,
            east,
            convention: LonConvention::PlusMinus180,
        }
    }

    /// Use another longitude convention.
    pub fn with_convention(mut self, convention: LonConvention) -> Self {
        self.convention = convention;
        self
    }

    /// Southern and northern edges, sorted.
    pub fn lat_bounds(&self) -> (f64, f64) {
        if self.south <= self.north {
            (self.south, self.north)
        } else {
            (self.north, self.south)
        }
    }

    /// Whether the region wraps across the seam of its convention.
    pub fn crosses_seam(&self) -> bool {
        self.west > self.east
    }

    /// Check the region against the convention bounds and the grid's latitude span.
    pub fn validate(&self, shape: &GridShape) -> Result<()> {
        let (south, north) = self.lat_bounds();
        let (min_lon, max_lon) = self.convention.bounds();
        let lon_range = min_lon..=max_lon;

        if !lon_range.contains(&self.west) || !lon_range.contains(&self.east) {
            return Err(TopoError::LongitudeOutOfRange {
                west: self.west,
                east: self.east,
                min_lon,
                max_lon,
            });
        }

        // Written so that NaN fails too.
        if !(south >= shape.min_lat && north <= shape.max_lat) {
            return Err(TopoError::LatitudeOutOfRange {
                south,
                north,
                min_lat: shape.min_lat,
                max_lat: shape.max_lat,
            });
        }

        if self.east == self.west || south == north {
            return Err(TopoError::DegenerateRegion {
                south,
                north,
                west: self.west,
                east: self.east,
            });
        }

        Ok(())
    }
}

/// Coordinate meshes and samples of an extracted rectangle.
///
/// `topo[[i, j]]` is the sample at `(lat[[i, j]], lon[[i, j]])`. Rows run
/// south to north, columns west to east, and both axes are strictly
/// increasing.
#[derive(Debug, Clone)]
pub struct RegionResult {
    latitude: Vec<f64>,
    longitude: Vec<f64>,
    lat: Array2<f64>,
    lon: Array2<f64>,
    topo: Array2<i16>,
}

impl RegionResult {
    /// Assemble a result from its axes and row-major samples.
    pub(crate) fn from_axes(
        latitude: Vec<f64>,
        longitude: Vec<f64>,
        samples: Vec<i16>,
    ) -> Result<Self> {
        let shape = (latitude.len(), longitude.len());
        let topo = Array2::from_shape_vec(shape, samples)?;
        let lat = Array2::from_shape_fn(shape, |(i, _)| latitude[i]);
        let lon = Array2::from_shape_fn(shape, |(_, j)| longitude[j]);
        Ok(Self {
            latitude,
            longitude,
            lat,
            lon,
            topo,
        })
    }

    /// Latitude of every sample.
    pub fn lat(&self) -> &Array2<f64> {
        &self.lat
    }

    /// Longitude of every sample.
    pub fn lon(&self) -> &Array2<f64> {
        &self.lon
    }

    /// Raw samples (meters, positive up).
    pub fn topo(&self) -> &Array2<i16> {
        &self.topo
    }

    /// Latitude of each row.
    pub fn latitude(&self) -> &[f64] {
        &self.latitude
    }

    /// Longitude of each column.
    pub fn longitude(&self) -> &[f64] {
        &self.longitude
    }

    /// Number of (rows, columns).
    pub fn dim(&self) -> (usize, usize) {
        self.topo.dim()
    }

    /// Split into `(lat, lon, topo)` meshes.
    pub fn into_parts(self) -> (Array2<f64>, Array2<f64>, Array2<i16>) {
        (self.lat, self.lon, self.topo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lat_bounds_are_sorted() {
        assert_eq!(Region::new(45.0, 30.0, 0.0, 5.0).lat_bounds(), (30.0, 45.0));
        assert_eq!(Region::new(30.0, 45.0, 0.0, 5.0).lat_bounds(), (30.0, 45.0));
    }

    #[test]
    fn test_validation_order_and_kinds() {
        let shape = GridShape::SMITH_SANDWELL;

        let degenerate_lat = Region::new(10.0, 10.0, 0.0, 5.0);
        assert!(matches!(
            degenerate_lat.validate(&shape),
            Err(TopoError::DegenerateRegion { .. })
        ));

        // Latitude bounds are checked before degeneracy.
        let everything_wrong =
            Region::new(-90.0, 90.0, 0.0, 0.0).with_convention(LonConvention::ZeroTo360);
        assert!(matches!(
            everything_wrong.validate(&shape),
            Err(TopoError::LatitudeOutOfRange { .. })
        ));
        let degenerate_lon = Region::new(-20.0, 20.0, 0.0, 0.0);
        assert!(matches!(
            degenerate_lon.validate(&shape),
            Err(TopoError::DegenerateRegion { .. })
        ));

        let too_far_north = Region::new(30.0, 85.0, 0.0, 5.0);
        assert!(matches!(
            too_far_north.validate(&shape),
            Err(TopoError::LatitudeOutOfRange { .. })
        ));

        let east_of_range = Region::new(30.0, 45.0, 200.0, 240.0);
        assert!(matches!(
            east_of_range.validate(&shape),
            Err(TopoError::LongitudeOutOfRange { .. })
        ));
        assert!(east_of_range
            .with_convention(LonConvention::ZeroTo360)
            .validate(&shape)
            .is_ok());

        let negative_in_360 =
            Region::new(30.0, 45.0, -10.0, 10.0).with_convention(LonConvention::ZeroTo360);
        assert!(matches!(
            negative_in_360.validate(&shape),
            Err(TopoError::LongitudeOutOfRange { .. })
        ));
    }

    #[test]
    fn test_non_finite_edges_are_rejected() {
        let shape = GridShape::SMITH_SANDWELL;
        assert!(Region::new(f64::NAN, 10.0, 0.0, 5.0).validate(&shape).is_err());
        assert!(Region::new(0.0, 10.0, f64::NAN, 5.0).validate(&shape).is_err());
        assert!(Region::new(0.0, 10.0, 0.0, f64::INFINITY).validate(&shape).is_err());
    }

    #[test]
    fn test_result_meshes() {
        let (latitude, longitude) = (vec![1.0, 2.0], vec![10.0, 20.0, 30.0]);
        let result = RegionResult::from_axes(latitude, longitude, vec![1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(result.dim(), (2, 3));
        assert_eq!(result.lat()[[1, 2]], 2.0);
        assert_eq!(result.lon()[[1, 2]], 30.0);
        assert_eq!(result.topo()[[1, 0]], 4);

        let (lat, lon, topo) = result.into_parts();
        assert_eq!(lat.dim(), lon.dim());
        assert_eq!(lon.dim(), topo.dim());
    }

    #[test]
    fn test_result_shape_mismatch() {
        assert!(matches!(
            RegionResult::from_axes(vec![1.0], vec![1.0, 2.0], vec![0; 3]),
            Err(TopoError::Shape(_))
        ));
    }
}
