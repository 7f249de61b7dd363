//! Monthly climatology: the mean annual cycle of every grid cell.

use chrono::{Datelike, NaiveDate};

use crate::{
    error::GridError,
    grid::{mean_defined, Cube},
};

pub const MONTHS: usize = 12;

/// Twelve (lat, lon) planes, January first.
#[derive(Debug, Clone, PartialEq)]
pub struct Climatology {
    ny: usize,
    nx: usize,
    values: Vec<Option<f32>>,
}

impl Climatology {
    pub fn from_months(ny: usize, nx: usize, values: Vec<Option<f32>>) -> Result<Self, GridError> {
        if values.len() != MONTHS * ny * nx {
            return Err(GridError::invalid(format!(
                "climatology of {ny}x{nx} cells needs {} values, got {}",
                MONTHS * ny * nx,
                values.len()
            )));
        }
        Ok(Climatology { ny, nx, values })
    }

    /// `(ny, nx)`
    pub fn shape(&self) -> (usize, usize) {
        (self.ny, self.nx)
    }

    pub fn month(&self, m: usize) -> &[Option<f32>] {
        let plane = self.ny * self.nx;
        &self.values[m * plane..(m + 1) * plane]
    }

    pub fn get(&self, m: usize, y: usize, x: usize) -> Option<f32> {
        self.values[(m * self.ny + y) * self.nx + x]
    }

    /// The annual cycle of one cell.
    pub fn series(&self, y: usize, x: usize) -> [Option<f32>; MONTHS] {
        std::array::from_fn(|m| self.get(m, y, x))
    }
}

/// Averages all slices of the same calendar month, ignoring missing values.
///
/// The time axis must hold whole years of monthly data starting in January;
/// a length that is not a multiple of 12 is rejected.
pub fn monthly_climatology(cube: &Cube) -> Result<Climatology, GridError> {
    let [nt, ny, nx] = cube.shape();
    if nt % MONTHS != 0 {
        return Err(GridError::invalid(format!(
            "time axis of {nt} steps is not a whole number of years of monthly data"
        )));
    }

    let plane = ny * nx;
    let mut values = Vec::with_capacity(MONTHS * plane);
    for m in 0..MONTHS {
        let slices: Vec<&[Option<f32>]> = (m..nt).step_by(MONTHS).map(|t| cube.time_slice(t)).collect();
        for cell in 0..plane {
            values.push(mean_defined(slices.iter().map(|s| &s[cell])));
        }
    }

    Climatology::from_months(ny, nx, values)
}

/// Per-cell mean of the twelve monthly values, ignoring missing months.
pub fn thresholds(climatology: &Climatology) -> Vec<Option<f32>> {
    let (ny, nx) = climatology.shape();
    (0..ny * nx)
        .map(|cell| mean_defined((0..MONTHS).map(|m| &climatology.month(m)[cell])))
        .collect()
}

/// The monthly climatology assumes the first slice is a January.
pub fn check_january_start(dates: &[NaiveDate]) -> Result<(), GridError> {
    match dates.first() {
        Some(d) if d.month() != 1 => Err(GridError::invalid(format!(
            "time axis starts in month {} of {}, expected January",
            d.month(),
            d.year()
        ))),
        _ => Ok(()),
    }
}
