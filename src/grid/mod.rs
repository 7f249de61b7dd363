//! Gridded data model: the data cube plus its date and coordinate axes.
//!
//! Coordinate vectors hold cell *edges*: one more entry than the matching
//! cube dimension. Nearest-cell queries and index matching use the centres,
//! which are the edges without the final extrapolated entry.

pub mod cube;

use chrono::NaiveDate;

pub use cube::{mean_defined, Cube};

use crate::error::GridError;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GridDataset {
    pub dates: Vec<NaiveDate>,
    pub lon: Vec<f64>,
    pub lat: Vec<f64>,
    pub cube: Cube,
    pub unit: String,
}

impl GridDataset {
    pub fn new(
        dates: Vec<NaiveDate>,
        lon: Vec<f64>,
        lat: Vec<f64>,
        cube: Cube,
        unit: impl Into<String>,
    ) -> Result<Self, GridError> {
        let [nt, ny, nx] = cube.shape();
        check_axis("date", dates.len(), nt, 0)?;
        check_axis("latitude", lat.len(), ny, 1)?;
        check_axis("longitude", lon.len(), nx, 1)?;

        Ok(GridDataset {
            dates,
            lon,
            lat,
            cube,
            unit: unit.into(),
        })
    }

    /// The unpopulated result returned for a missing source.
    pub fn empty() -> Self {
        GridDataset::default()
    }

    pub fn is_empty(&self) -> bool {
        self.cube.is_empty()
    }

    pub fn lon_centers(&self) -> &[f64] {
        strip_last_edge(&self.lon)
    }

    pub fn lat_centers(&self) -> &[f64] {
        strip_last_edge(&self.lat)
    }
}

fn check_axis(name: &str, len: usize, dim: usize, extra: usize) -> Result<(), GridError> {
    if len == dim + extra || (len == 0 && dim == 0) {
        return Ok(());
    }
    Err(GridError::invalid(format!(
        "{name} axis has {len} entries for a dimension of {dim}"
    )))
}

fn strip_last_edge(edges: &[f64]) -> &[f64] {
    match edges.len() {
        0 => edges,
        n => &edges[..n - 1],
    }
}

/// Appends the edge that closes the last cell: `last + (last - second_to_last)`.
pub fn centers_to_edges(centers: &[f64]) -> Result<Vec<f64>, GridError> {
    match centers {
        [] => Ok(Vec::new()),
        [_] => Err(GridError::invalid(
            "at least two coordinates are needed to derive a cell edge",
        )),
        [.., prev, last] => {
            let mut edges = centers.to_vec();
            edges.push(last + (last - prev));
            Ok(edges)
        }
    }
}

/// Regular axis of `n` cells starting at `origin`, as `n + 1` edges.
pub fn regular_edges(origin: f64, step: f64, n: usize) -> Vec<f64> {
    (0..=n).map(|i| origin + i as f64 * step).collect()
}
