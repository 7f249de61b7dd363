//! Onset and offset of the rain season from a monthly climatology.
//!
//! A cell's threshold is the mean of its twelve monthly values. The onset is
//! the first month (from January, cyclic) where the climatology crosses from
//! below to at-or-above the threshold, the offset the first month after which
//! it drops below again. Both crossings must be confirmed by the neighbouring
//! months of the [`SeasonWindow`].

use std::{fmt, str::FromStr};

use tracing::debug;

use super::climatology::{monthly_climatology, thresholds, Climatology, MONTHS};
use crate::{error::GridError, grid::GridDataset};

/// Months that must confirm a crossing.
///
/// Onset at `m`: `before` months ending at `m - 1` below the threshold,
/// month `m` at or above it and months `m + 1 .. m + after - 1` strictly
/// above. Offset at `m`: `before` months ending at `m` at or above the
/// threshold and `after` months from `m + 1` strictly below.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeasonWindow {
    pub before: usize,
    pub after: usize,
}

impl SeasonWindow {
    /// Single-month crossing test.
    pub const NAIVE: SeasonWindow = SeasonWindow {
        before: 1,
        after: 1,
    };

    pub fn new(before: usize, after: usize) -> Result<Self, GridError> {
        if before == 0 || after == 0 || before + after > MONTHS {
            return Err(GridError::invalid(format!(
                "season window {before}/{after} must have at least one month on each side and fit into a year"
            )));
        }
        Ok(SeasonWindow { before, after })
    }
}

impl Default for SeasonWindow {
    fn default() -> Self {
        SeasonWindow {
            before: 2,
            after: 2,
        }
    }
}

impl FromStr for SeasonWindow {
    type Err = String;

    /// `before,after`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (before, after) = s
            .split_once(',')
            .ok_or_else(|| format!("expected before,after, got `{s}`"))?;
        let parse = |v: &str| v.trim().parse::<usize>().map_err(|e| format!("`{v}`: {e}"));

        SeasonWindow::new(parse(before)?, parse(after)?).map_err(|e| e.to_string())
    }
}

impl fmt::Display for SeasonWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.before, self.after)
    }
}

/// Rain season bounds of one cell, as month indices (0 = January).
///
/// When no month satisfies a crossing the index is 0, as a first-maximum
/// search over an all-false indicator would give, and the matching
/// `*_found` flag is false.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Season {
    pub onset: usize,
    pub offset: usize,
    pub onset_found: bool,
    pub offset_found: bool,
}

impl Season {
    /// First month below the threshold after the season.
    pub fn first_dry_month(&self) -> usize {
        (self.offset + 1) % MONTHS
    }
}

fn below(v: Option<f32>, t: f32) -> bool {
    v.is_some_and(|v| v < t)
}

fn at_or_above(v: Option<f32>, t: f32) -> bool {
    v.is_some_and(|v| v >= t)
}

fn above(v: Option<f32>, t: f32) -> bool {
    v.is_some_and(|v| v > t)
}

fn back(m: usize, k: usize) -> usize {
    (m + MONTHS - k) % MONTHS
}

fn ahead(m: usize, k: usize) -> usize {
    (m + k) % MONTHS
}

pub fn onset_month(series: &[Option<f32>; MONTHS], threshold: f32, window: SeasonWindow) -> Option<usize> {
    (0..MONTHS).find(|&m| {
        (1..=window.before).all(|k| below(series[back(m, k)], threshold))
            && at_or_above(series[m], threshold)
            && (1..window.after).all(|k| above(series[ahead(m, k)], threshold))
    })
}

pub fn offset_month(series: &[Option<f32>; MONTHS], threshold: f32, window: SeasonWindow) -> Option<usize> {
    (0..MONTHS).find(|&m| {
        (0..window.before).all(|k| at_or_above(series[back(m, k)], threshold))
            && (1..=window.after).all(|k| below(series[ahead(m, k)], threshold))
    })
}

/// Season of one cell; `None` when the cell has no data at all.
pub fn detect_season(
    series: &[Option<f32>; MONTHS],
    threshold: Option<f32>,
    window: SeasonWindow,
) -> Option<Season> {
    let threshold = threshold?;
    let onset = onset_month(series, threshold, window);
    let offset = offset_month(series, threshold, window);

    Some(Season {
        onset: onset.unwrap_or(0),
        offset: offset.unwrap_or(0),
        onset_found: onset.is_some(),
        offset_found: offset.is_some(),
    })
}

/// Seasons of all cells, row-major.
pub fn detect_seasons(
    climatology: &Climatology,
    thresholds: &[Option<f32>],
    window: SeasonWindow,
) -> Vec<Option<Season>> {
    let (ny, nx) = climatology.shape();
    (0..ny)
        .flat_map(|y| (0..nx).map(move |x| (y, x)))
        .map(|(y, x)| detect_season(&climatology.series(y, x), thresholds[y * nx + x], window))
        .collect()
}

/// Everything the rain season figures and the inspector need.
#[derive(Debug, Clone, PartialEq)]
pub struct RainSeasonMap {
    pub dataset: GridDataset,
    pub climatology: Climatology,
    pub thresholds: Vec<Option<f32>>,
    pub seasons: Vec<Option<Season>>,
    pub window: SeasonWindow,
}

impl RainSeasonMap {
    pub fn build(dataset: GridDataset, window: SeasonWindow) -> Result<Self, GridError> {
        let climatology = monthly_climatology(&dataset.cube)?;
        let thresholds = thresholds(&climatology);
        let seasons = detect_seasons(&climatology, &thresholds, window);

        debug!(
            cells = seasons.len(),
            masked = seasons.iter().filter(|s| s.is_none()).count(),
            %window,
            "detected rain seasons"
        );

        Ok(RainSeasonMap {
            dataset,
            climatology,
            thresholds,
            seasons,
            window,
        })
    }

    pub fn season(&self, y: usize, x: usize) -> Option<Season> {
        let (_, nx) = self.climatology.shape();
        self.seasons[y * nx + x]
    }

    pub fn onsets(&self) -> Vec<Option<f32>> {
        self.seasons.iter().map(|s| s.map(|s| s.onset as f32)).collect()
    }

    pub fn offsets(&self) -> Vec<Option<f32>> {
        self.seasons.iter().map(|s| s.map(|s| s.offset as f32)).collect()
    }
}
