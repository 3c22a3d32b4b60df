//! Region extraction: index planning and seam splicing.
//!
//! A plan selects a run of ascending-latitude rows and one or two runs of
//! frame columns. Reading maps those onto file rows and file columns,
//! merging file-contiguous columns into as few reads per row as possible.

use crate::geometry::{boundary_index_left, boundary_index_right};
use crate::source::GridSource;
use crate::{GridAxes, LonConvention, LonFrame, Region, RegionResult, Result, TopoError};
use std::ops::Range;
use tracing::debug;

/// Frame columns `start..end` with the longitude shift applied to them in the output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnSegment {
    /// First frame column.
    pub start: usize,
    /// One past the last frame column.
    pub end: usize,
    /// Degrees added to the frame longitudes of this segment.
    pub shift: f64,
}

impl ColumnSegment {
    /// Number of columns in the segment.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the segment has no columns.
    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }
}

/// Validated grid indices of a region, before any data is read.
///
/// A plan is only read by the extractor that made it, so its indices always
/// fit the grid:
///
/// ```compile_fail
/// use sstopo::{Region, TopoDataset};
///
/// let global = TopoDataset::open("data/topo_18.1.img").unwrap();
/// let plan = global.extractor().plan(&Region::new(0.0, 10.0, 0.0, 10.0)).unwrap();
/// let _ = global.extractor().read(&plan, 1);
/// ```
#[derive(Debug, Clone)]
pub struct RegionPlan<'a> {
    frame: LonFrame<'a>,
    rows: Range<usize>,
    segments: Vec<ColumnSegment>,
}

impl<'a> RegionPlan<'a> {
    /// Ascending-latitude rows covered by the region.
    pub fn rows(&self) -> Range<usize> {
        self.rows.clone()
    }

    /// Column segments in output order (west first).
    pub fn segments(&self) -> &[ColumnSegment] {
        &self.segments
    }

    /// Longitude frame the columns are expressed in.
    pub fn frame(&self) -> &LonFrame<'a> {
        &self.frame
    }

    /// Number of (rows, columns) before subsampling.
    pub fn dim(&self) -> (usize, usize) {
        (self.rows.len(), self.segments.iter().map(ColumnSegment::len).sum())
    }
}

/// Cuts regions out of a grid source using the grid's axes.
#[derive(Debug, Clone, Copy)]
pub struct RegionExtractor<'a> {
    axes: &'a GridAxes,
    source: &'a dyn GridSource,
}

impl<'a> RegionExtractor<'a> {
    /// Create an extractor over `source`, whose file layout `axes` describes.
    pub fn new(axes: &'a GridAxes, source: &'a dyn GridSource) -> Self {
        Self { axes, source }
    }

    /// Plan covering the whole grid in [-180, 180).
    pub fn plan_all(&self) -> RegionPlan<'a> {
        let frame = self.axes.frame(LonConvention::PlusMinus180);
        let segments = vec![ColumnSegment {
            start: 0,
            end: frame.len(),
            shift: 0.0,
        }];
        RegionPlan {
            frame,
            rows: 0..self.axes.latitude().len(),
            segments,
        }
    }

    /// Validate `region` and locate the rows and columns bounding it.
    ///
    /// Bounds are inclusive: the plan includes the last cell at or before
    /// the south/west edges and the first cell at or after the north/east
    /// edges, so it covers the region plus at most one cell per side.
    pub fn plan(&self, region: &Region) -> Result<RegionPlan<'a>> {
        region.validate(&self.axes.shape())?;

        let (south, north) = region.lat_bounds();
        let latitude = self.axes.latitude();
        let j_south = boundary_index_left(latitude, south);
        let j_north = boundary_index_right(latitude, north);

        let frame = self.axes.frame(region.convention);
        let i_west = boundary_index_left(frame.axis(), region.west);
        let i_east = boundary_index_right(frame.axis(), region.east);

        let segments = if region.crosses_seam() {
            // West segment runs up to the seam, east segment resumes after it.
            // The side that leaves the convention's range is shifted.
            let (west_shift, east_shift) = match region.convention {
                LonConvention::PlusMinus180 => (0.0, 360.0),
                LonConvention::ZeroTo360 => (-360.0, 0.0),
            };
            let west_segment = ColumnSegment {
                start: i_west,
                end: frame.len(),
                shift: west_shift,
            };
            // Edges in the same cell would wrap onto the west segment's first column.
            let east_segment = ColumnSegment {
                start: 0,
                end: (i_east + 1).min(i_west),
                shift: east_shift,
            };
            [west_segment, east_segment]
                .into_iter()
                .filter(|segment| !segment.is_empty())
                .collect()
        } else {
            vec![ColumnSegment {
                start: i_west,
                end: i_east + 1,
                shift: 0.0,
            }]
        };

        Ok(RegionPlan {
            frame,
            rows: j_south..j_north + 1,
            segments,
        })
    }

    /// Entire grid, every `subsample`-th row and column.
    pub fn extract_all(&self, subsample: usize) -> Result<RegionResult> {
        self.read(&self.plan_all(), subsample)
    }

    /// The cells covering `region`, optionally keeping every `subsample`-th row and column.
    pub fn extract_region(
        &self,
        region: &Region,
        subsample: Option<usize>,
    ) -> Result<RegionResult> {
        let subsample = subsample.unwrap_or(1);
        if subsample == 0 {
            return Err(TopoError::InvalidSubsample(subsample));
        }
        let plan = self.plan(region)?;
        self.read(&plan, subsample)
    }

    /// Read the samples of `plan`, keeping every `subsample`-th row and column from the first.
    fn read(&self, plan: &RegionPlan<'_>, subsample: usize) -> Result<RegionResult> {
        if subsample == 0 {
            return Err(TopoError::InvalidSubsample(subsample));
        }

        let all_latitudes = self.axes.latitude();
        let rows: Vec<usize> = plan.rows().step_by(subsample).collect();
        let latitude: Vec<f64> = rows.iter().map(|&row| all_latitudes[row]).collect();

        let axis = plan.frame.axis();
        let columns: Vec<usize> = plan
            .segments
            .iter()
            .flat_map(|segment| segment.start..segment.end)
            .collect();
        let longitude: Vec<f64> = plan
            .segments
            .iter()
            .flat_map(|segment| (segment.start..segment.end).map(move |c| axis[c] + segment.shift))
            .step_by(subsample)
            .collect();

        let disk_columns: Vec<usize> = columns.iter().map(|&c| plan.frame.disk_column(c)).collect();
        let runs = contiguous_runs(&disk_columns);

        debug!(
            rows = latitude.len(),
            columns = longitude.len(),
            segments = plan.segments.len(),
            reads_per_row = runs.len(),
            subsample,
            "Reading region"
        );

        let mut scratch = vec![0i16; disk_columns.len()];
        let mut samples = Vec::with_capacity(latitude.len() * longitude.len());
        for &row in &rows {
            let disk_row = self.axes.disk_row(row);
            let mut filled = 0;
            for &(start, len) in &runs {
                self.source.read_run(disk_row, start, &mut scratch[filled..filled + len])?;
                filled += len;
            }
            samples.extend(scratch.iter().step_by(subsample).copied());
        }

        RegionResult::from_axes(latitude, longitude, samples)
    }
}

/// Group file columns into `(start, len)` runs of consecutive columns, preserving order.
fn contiguous_runs(columns: &[usize]) -> Vec<(usize, usize)> {
    let mut runs: Vec<(usize, usize)> = Vec::new();
    for &column in columns {
        match runs.last_mut() {
            Some((start, len)) if *start + *len == column => *len += 1,
            _ => runs.push((column, 1)),
        }
    }
    runs
}
