//! Dataset configuration loaded from YAML.
//!
//! ```yaml
//! path: data/topo_18.1.img
//! access: mapped      # mapped | positioned | in_memory
//! check_size: true
//! shape:              # optional, defaults to Smith-Sandwell v18.1
//!   n_lon: 21600
//!   n_lat: 17280
//!   min_lat: -80.738
//!   max_lat: 80.738
//! ```

use crate::{GridShape, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How the grid file is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridAccess {
    /// Memory-map the file; reads touch only the requested runs.
    #[default]
    Mapped,
    /// Seek and read each run from a shared file handle.
    Positioned,
    /// Read and decode the whole file at open.
    InMemory,
}

/// Where the grid lives and how to open it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatasetConfig {
    /// Path of the grid file.
    pub path: PathBuf,
    /// Read strategy.
    #[serde(default)]
    pub access: GridAccess,
    /// Reject files whose length does not match the grid shape.
    #[serde(default = "default_check_size")]
    pub check_size: bool,
    /// Grid dimensions and latitude span.
    #[serde(default)]
    pub shape: GridShape,
}

fn default_check_size() -> bool {
    true
}

impl DatasetConfig {
    /// Configuration for a memory-mapped file with size checking.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            access: GridAccess::default(),
            check_size: default_check_size(),
            shape: GridShape::default(),
        }
    }

    /// Use another grid shape.
    pub fn with_shape(mut self, shape: GridShape) -> Self {
        self.shape = shape;
        self
    }

    /// Parse a configuration from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load a configuration file. A relative `path` is resolved against the file's directory.
    pub fn from_yaml_file<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();
        let text = std::fs::read_to_string(config_path)?;
        let mut config = Self::from_yaml_str(&text)?;

        if config.path.is_relative() {
            if let Some(dir) = config_path.parent() {
                config.path = dir.join(&config.path);
            }
        }

        Ok(config)
    }
}
