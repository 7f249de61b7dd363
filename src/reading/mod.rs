//! Readers for the supported input formats.

pub mod cities;
pub mod cru;
pub mod dwd;
pub mod shapes;

use std::path::PathBuf;

use tracing::warn;

pub use cities::{filter_cities, load_cities, City};
pub use shapes::{load_shapes, Shape};

use crate::{error::GridError, grid::GridDataset};

/// Implemented by the results of the readers so a missing input can be
/// replaced by an empty value.
pub trait Empty {
    fn empty() -> Self;
}

impl Empty for GridDataset {
    fn empty() -> Self {
        GridDataset::empty()
    }
}

impl<T> Empty for Vec<T> {
    fn empty() -> Self {
        Vec::new()
    }
}

/// Turns a missing input file into an empty result, reporting it once.
pub fn recover_missing<T: Empty>(result: Result<T, GridError>) -> Result<T, GridError> {
    match result {
        Err(e) if e.is_not_found() => {
            warn!("{e}");
            eprintln!("Invalid file: {e}");
            Ok(T::empty())
        }
        other => other,
    }
}

/// Where gridded data comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum GridSource {
    /// A CRU NetCDF file and optionally the variable to read.
    Cru { path: PathBuf, key: Option<String> },
    /// A directory of DWD ASCII grids matching a glob pattern.
    Dwd {
        dir: PathBuf,
        pattern: String,
        unit: String,
    },
}

impl GridSource {
    /// `.nc` files are NetCDF, anything else is a DWD grid directory.
    pub fn from_path(path: PathBuf, key: Option<String>, pattern: &str, unit: &str) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("nc") => GridSource::Cru { path, key },
            _ => GridSource::Dwd {
                dir: path,
                pattern: pattern.to_string(),
                unit: unit.to_string(),
            },
        }
    }

    pub async fn load(&self) -> Result<GridDataset, GridError> {
        match self {
            GridSource::Cru { path, key } => cru::load_grids(path, key.as_deref()),
            GridSource::Dwd { dir, pattern, unit } => {
                let files = dwd::find_grid_files(dir, pattern)?;
                dwd::load_grids(&files, unit).await
            }
        }
    }
}
