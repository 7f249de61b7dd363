//! Spatial and temporal cut-outs of a dataset.

use chrono::NaiveDate;
use tracing::debug;

use super::BoundingBox;
use crate::grid::GridDataset;

/// Restricts `dataset` to cells whose centres lie in `bbox` and to time
/// slices on or after `min_date`.
///
/// An empty intersection gives a zero-sized dataset.
pub fn subset(dataset: &GridDataset, bbox: &BoundingBox, min_date: Option<NaiveDate>) -> GridDataset {
    if dataset.is_empty() {
        return GridDataset::empty();
    }

    let times: Vec<usize> = dataset
        .dates
        .iter()
        .enumerate()
        .filter(|(_, d)| min_date.map_or(true, |min| **d >= min))
        .map(|(k, _)| k)
        .collect();
    let rows = matching(dataset.lat_centers(), |lat| bbox.contains_lat(lat));
    let cols = matching(dataset.lon_centers(), |lon| bbox.contains_lon(lon));

    debug!(
        times = times.len(),
        rows = rows.len(),
        cols = cols.len(),
        "subset of {:?}",
        dataset.cube.shape()
    );

    GridDataset {
        dates: times.iter().map(|&k| dataset.dates[k]).collect(),
        lon: kept_edges(&dataset.lon, &cols),
        lat: kept_edges(&dataset.lat, &rows),
        cube: dataset.cube.select(&times, &rows, &cols),
        unit: dataset.unit.clone(),
    }
}

fn matching(centers: &[f64], keep: impl Fn(f64) -> bool) -> Vec<usize> {
    centers
        .iter()
        .enumerate()
        .filter(|&(_, &c)| keep(c))
        .map(|(k, _)| k)
        .collect()
}

/// Edges of the kept cells followed by the edge closing the last one.
fn kept_edges(edges: &[f64], kept: &[usize]) -> Vec<f64> {
    match kept.last() {
        None => Vec::new(),
        Some(&last) => kept
            .iter()
            .map(|&k| edges[k])
            .chain(std::iter::once(edges[last + 1]))
            .collect(),
    }
}
