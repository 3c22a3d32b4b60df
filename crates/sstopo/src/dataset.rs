//! Dataset handle: geometry plus an open grid source.

use crate::extract::RegionExtractor;
use crate::geometry::nearest_index;
use crate::source::{GridSource, InMemoryGrid, MappedGrid, PositionedGrid};
use crate::{
    DatasetConfig, GridAccess, GridAxes, GridShape, Region, RegionResult, Result, TopoError,
};
use std::path::{Path, PathBuf};
use tracing::debug;

/// An open topography grid.
///
/// The axes and the source are fixed at construction, so a handle can be
/// shared between threads and queried concurrently.
///
/// # Example
///
/// ```no_run
/// use sstopo::{LonConvention, Region, TopoDataset};
///
/// let topo = TopoDataset::open("data/topo_18.1.img")?;
///
/// // North-east Pacific, every 32nd cell.
/// let region = Region::new(30.0, 45.0, 200.0, 240.0).with_convention(LonConvention::ZeroTo360);
/// let result = topo.extract_region(&region, Some(32))?;
/// println!("{:?} cells", result.dim());
/// # Ok::<(), sstopo::TopoError>(())
/// ```
#[derive(Debug)]
pub struct TopoDataset {
    path: Option<PathBuf>,
    axes: GridAxes,
    source: Box<dyn GridSource>,
}

impl TopoDataset {
    /// Memory-map a Smith-Sandwell grid file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, GridShape::SMITH_SANDWELL, GridAccess::Mapped)
    }

    /// Open a grid file of the given shape, checking its length.
    pub fn open_with<P: AsRef<Path>>(
        path: P,
        shape: GridShape,
        access: GridAccess,
    ) -> Result<Self> {
        Self::open_file(path.as_ref(), shape, access, true)
    }

    /// Open the grid described by `config`.
    pub fn from_config(config: &DatasetConfig) -> Result<Self> {
        Self::open_file(&config.path, config.shape, config.access, config.check_size)
    }

    /// Wrap an already-open source whose file layout `shape` describes.
    pub fn from_source<S: GridSource + 'static>(shape: GridShape, source: S) -> Result<Self> {
        if source.dimensions() != (shape.n_lat, shape.n_lon) {
            let (rows, cols) = source.dimensions();
            return Err(TopoError::InvalidShape(format!(
                "source holds {rows}x{cols} samples, shape describes {}x{}",
                shape.n_lat, shape.n_lon
            )));
        }

        Ok(Self {
            path: None,
            axes: GridAxes::new(shape)?,
            source: Box::new(source),
        })
    }

    fn open_file(
        path: &Path,
        shape: GridShape,
        access: GridAccess,
        check_size: bool,
    ) -> Result<Self> {
        if !path.is_file() {
            return Err(TopoError::NotFound(path.to_path_buf()));
        }

        let axes = GridAxes::new(shape)?;

        if check_size {
            let actual = std::fs::metadata(path)?.len();
            if actual != shape.byte_len() {
                return Err(TopoError::SizeMismatch {
                    path: path.to_path_buf(),
                    expected: shape.byte_len(),
                    actual,
                });
            }
        }

        let source: Box<dyn GridSource> = match access {
            GridAccess::Mapped => Box::new(MappedGrid::open(path, shape)?),
            GridAccess::Positioned => Box::new(PositionedGrid::open(path, shape)?),
            GridAccess::InMemory => Box::new(InMemoryGrid::load(path, shape)?),
        };

        debug!(
            path = %path.display(),
            ?access,
            n_lat = shape.n_lat,
            n_lon = shape.n_lon,
            "Opened topography grid"
        );

        Ok(Self {
            path: Some(path.to_path_buf()),
            axes,
            source,
        })
    }

    /// Path of the backing file, if the dataset was opened from one.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Grid dimensions and latitude span.
    pub fn shape(&self) -> GridShape {
        self.axes.shape()
    }

    /// Coordinate axes of the grid.
    pub fn axes(&self) -> &GridAxes {
        &self.axes
    }

    /// Extractor over this dataset, for planning regions without reading them.
    pub fn extractor(&self) -> RegionExtractor<'_> {
        RegionExtractor::new(&self.axes, self.source.as_ref())
    }

    /// The whole grid, keeping every `subsample`-th row and column.
    ///
    /// Longitudes are in [-180, 180).
    pub fn extract_all(&self, subsample: usize) -> Result<RegionResult> {
        self.extractor().extract_all(subsample)
    }

    /// The cells covering `region`, optionally keeping every `subsample`-th row and column.
    ///
    /// If the region crosses its convention's seam, the western part comes
    /// first and one side is shifted by 360 degrees so longitudes increase.
    pub fn extract_region(
        &self,
        region: &Region,
        subsample: Option<usize>,
    ) -> Result<RegionResult> {
        self.extractor().extract_region(region, subsample)
    }

    /// Sample of the cell whose centre is nearest to (`lat`, `lon`).
    ///
    /// `lon` may be given in either convention.
    pub fn elevation_nearest(&self, lat: f64, lon: f64) -> Result<i16> {
        let shape = self.axes.shape();
        if !(lat >= shape.min_lat && lat <= shape.max_lat) {
            return Err(TopoError::LatitudeOutOfRange {
                south: lat,
                north: lat,
                min_lat: shape.min_lat,
                max_lat: shape.max_lat,
            });
        }
        if !(-180.0..=360.0).contains(&lon) {
            return Err(TopoError::LongitudeOutOfRange {
                west: lon,
                east: lon,
                min_lon: -180.0,
                max_lon: 360.0,
            });
        }

        let row = nearest_index(self.axes.latitude(), lat);

        // File columns are centred at step/2, 3*step/2, ... east of 0 degrees.
        let step = self.axes.lon_step();
        let n_lon = shape.n_lon;
        let column = ((lon.rem_euclid(360.0) - step / 2.0) / step)
            .round()
            .rem_euclid(n_lon as f64) as usize
            % n_lon;

        let mut sample = [0i16; 1];
        self.source.read_run(self.axes.disk_row(row), column, &mut sample)?;
        Ok(sample[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LonConvention;

    const N_LON: usize = 36;
    const N_LAT: usize = 24;

    fn synthetic() -> TopoDataset {
        let samples = (0..N_LAT)
            .flat_map(|row| (0..N_LON).map(move |col| (row * 100 + col) as i16))
            .collect();
        let source = InMemoryGrid::from_samples(N_LAT, N_LON, samples).unwrap();
        TopoDataset::from_source(GridShape::mercator(N_LON, N_LAT).unwrap(), source).unwrap()
    }

    #[test]
    fn test_handle_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TopoDataset>();
    }

    #[test]
    fn test_open_missing_file() {
        let err = TopoDataset::open("definitely/not/here/topo_18.1.img").unwrap_err();
        assert!(matches!(err, TopoError::NotFound(_)));
    }

    #[test]
    fn test_from_source_dimension_mismatch() {
        let source = InMemoryGrid::from_samples(2, 3, vec![0; 6]).unwrap();
        assert!(matches!(
            TopoDataset::from_source(GridShape::mercator(4, 2).unwrap(), source),
            Err(TopoError::InvalidShape(_))
        ));
    }

    #[test]
    fn test_elevation_nearest() {
        let topo = synthetic();
        assert!(topo.path().is_none());

        // Southernmost row is the last file row; 7 degrees east is file column 0.
        let south = topo.axes().latitude()[0];
        assert_eq!(topo.elevation_nearest(south, 7.0).unwrap(), 2300);
        // Same cell from either convention.
        assert_eq!(
            topo.elevation_nearest(0.5, -175.0).unwrap(),
            topo.elevation_nearest(0.5, 185.0).unwrap()
        );
        // Just west of the prime meridian rounds to the last column.
        let north = topo.axes().latitude()[N_LAT - 1];
        assert_eq!(topo.elevation_nearest(north, -1.0).unwrap(), 35);
    }

    #[test]
    fn test_elevation_nearest_rejects_out_of_range() {
        let topo = synthetic();
        assert!(topo.elevation_nearest(89.0, 0.0).unwrap_err().is_range_error());
        assert!(topo.elevation_nearest(0.0, 400.0).unwrap_err().is_range_error());
        assert!(topo.elevation_nearest(0.0, f64::NAN).unwrap_err().is_range_error());
    }

    #[test]
    fn test_extract_through_handle() {
        let topo = synthetic();
        let region =
            Region::new(-10.0, 10.0, 330.0, 30.0).with_convention(LonConvention::ZeroTo360);
        let result = topo.extract_region(&region, Some(2)).unwrap();
        assert!(result.longitude().windows(2).all(|w| w[0] < w[1]));
        assert_eq!(topo.extract_all(1).unwrap().dim(), (N_LAT, N_LON));
    }
}
