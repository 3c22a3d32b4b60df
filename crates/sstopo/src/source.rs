//! Backing stores for the sample grid.
//!
//! The file holds `n_lat * n_lon` big-endian `i16` samples, row-major, with
//! file row 0 the northernmost row and file column 0 the cell just east of
//! the prime meridian. Sources address samples in that file order; flipping
//! and rotating into ascending axes is the extractor's job.

use crate::{GridShape, Result, TopoError};
use memmap2::Mmap;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Mutex;

/// Bytes per stored sample.
const SAMPLE_BYTES: usize = 2;

/// Read access to a row-major grid of samples.
///
/// Implementations must allow concurrent calls from several threads.
pub trait GridSource: Send + Sync + std::fmt::Debug {
    /// Number of (rows, columns) in file order.
    fn dimensions(&self) -> (usize, usize);

    /// Fill `out` with consecutive samples of file row `row`, starting at file column `column`.
    fn read_run(&self, row: usize, column: usize, out: &mut [i16]) -> Result<()>;
}

/// Memory-mapped grid file. Reads only touch the pages of the requested runs.
#[derive(Debug)]
pub struct MappedGrid {
    mmap: Mmap,
    n_lat: usize,
    n_lon: usize,
}

impl MappedGrid {
    /// Map the grid file at `path`.
    pub fn open<P: AsRef<Path>>(path: P, shape: GridShape) -> Result<Self> {
        let file = File::open(path)?;
        // The file is opened read-only and never written through this mapping.
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(Self {
            mmap,
            n_lat: shape.n_lat,
            n_lon: shape.n_lon,
        })
    }
}

impl GridSource for MappedGrid {
    fn dimensions(&self) -> (usize, usize) {
        (self.n_lat, self.n_lon)
    }

    fn read_run(&self, row: usize, column: usize, out: &mut [i16]) -> Result<()> {
        check_run(self.dimensions(), row, column, out.len())?;
        let start = (row * self.n_lon + column) * SAMPLE_BYTES;
        let end = start + out.len() * SAMPLE_BYTES;
        let bytes = self.mmap.get(start..end).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("grid file ends before byte {end}"),
            )
        })?;
        decode_samples(bytes, out);
        Ok(())
    }
}

/// Grid file read with a seek and a read per run.
///
/// Seeks share one file handle, so reads are serialized.
#[derive(Debug)]
pub struct PositionedGrid {
    file: Mutex<File>,
    n_lat: usize,
    n_lon: usize,
}

impl PositionedGrid {
    /// Open the grid file at `path`.
    pub fn open<P: AsRef<Path>>(path: P, shape: GridShape) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self {
            file: Mutex::new(file),
            n_lat: shape.n_lat,
            n_lon: shape.n_lon,
        })
    }
}

impl GridSource for PositionedGrid {
    fn dimensions(&self) -> (usize, usize) {
        (self.n_lat, self.n_lon)
    }

    fn read_run(&self, row: usize, column: usize, out: &mut [i16]) -> Result<()> {
        check_run(self.dimensions(), row, column, out.len())?;
        let offset = ((row * self.n_lon + column) * SAMPLE_BYTES) as u64;
        let mut bytes = vec![0u8; out.len() * SAMPLE_BYTES];
        {
            let mut file = self.file.lock().map_err(|_| TopoError::SourceLockPoisoned)?;
            file.seek(SeekFrom::Start(offset))?;
            file.read_exact(&mut bytes)?;
        }
        decode_samples(&bytes, out);
        Ok(())
    }
}

/// Whole grid decoded into memory.
#[derive(Debug)]
pub struct InMemoryGrid {
    samples: Box<[i16]>,
    n_lat: usize,
    n_lon: usize,
}

impl InMemoryGrid {
    /// Read and decode the entire grid file at `path`.
    pub fn load<P: AsRef<Path>>(path: P, shape: GridShape) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let needed = shape.sample_count() * SAMPLE_BYTES;
        if bytes.len() < needed {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("grid file holds {} bytes, need {needed}", bytes.len()),
            )
            .into());
        }

        let mut samples = vec![0i16; shape.sample_count()];
        decode_samples(&bytes[..needed], &mut samples);
        Ok(Self {
            samples: samples.into_boxed_slice(),
            n_lat: shape.n_lat,
            n_lon: shape.n_lon,
        })
    }

    /// Wrap already-decoded samples given in file order (north row first).
    pub fn from_samples(n_lat: usize, n_lon: usize, samples: Vec<i16>) -> Result<Self> {
        if samples.len() != n_lat * n_lon {
            return Err(TopoError::InvalidShape(format!(
                "{} samples cannot fill a {n_lat}x{n_lon} grid",
                samples.len()
            )));
        }
        Ok(Self {
            samples: samples.into_boxed_slice(),
            n_lat,
            n_lon,
        })
    }
}

impl GridSource for InMemoryGrid {
    fn dimensions(&self) -> (usize, usize) {
        (self.n_lat, self.n_lon)
    }

    fn read_run(&self, row: usize, column: usize, out: &mut [i16]) -> Result<()> {
        check_run(self.dimensions(), row, column, out.len())?;
        let start = row * self.n_lon + column;
        out.copy_from_slice(&self.samples[start..start + out.len()]);
        Ok(())
    }
}

/// Reject runs that leave the grid or spill into the next row.
fn check_run(
    (n_lat, n_lon): (usize, usize),
    row: usize,
    column: usize,
    len: usize,
) -> Result<()> {
    if row >= n_lat || column + len > n_lon {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("run of {len} samples at ({row}, {column}) exceeds {n_lat}x{n_lon} grid"),
        )
        .into());
    }
    Ok(())
}

/// Decode big-endian samples; `bytes` holds exactly two bytes per output sample.
fn decode_samples(bytes: &[u8], out: &mut [i16]) {
    for (sample, pair) in out.iter_mut().zip(bytes.chunks_exact(SAMPLE_BYTES)) {
        *sample = i16::from_be_bytes([pair[0], pair[1]]);
    }
}
