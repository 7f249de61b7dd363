//! Three-axis (time, lat, lon) data cube with explicit no-data cells.

use crate::error::GridError;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Cube {
    nt: usize,
    ny: usize,
    nx: usize,
    values: Vec<Option<f32>>,
}

impl Cube {
    pub fn new(shape: [usize; 3], values: Vec<Option<f32>>) -> Result<Self, GridError> {
        let [nt, ny, nx] = shape;
        if values.len() != nt * ny * nx {
            return Err(GridError::invalid(format!(
                "cube shape {nt}x{ny}x{nx} needs {} values, got {}",
                nt * ny * nx,
                values.len()
            )));
        }

        Ok(Cube { nt, ny, nx, values })
    }

    pub fn empty() -> Self {
        Cube::default()
    }

    /// `[nt, ny, nx]`
    pub fn shape(&self) -> [usize; 3] {
        [self.nt, self.ny, self.nx]
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, t: usize, y: usize, x: usize) -> Option<f32> {
        if t >= self.nt || y >= self.ny || x >= self.nx {
            return None;
        }
        self.values[self.index(t, y, x)]
    }

    /// One (lat, lon) plane, row-major.
    pub fn time_slice(&self, t: usize) -> &[Option<f32>] {
        let plane = self.ny * self.nx;
        &self.values[t * plane..(t + 1) * plane]
    }

    /// All time steps of a single cell.
    pub fn cell_series(&self, y: usize, x: usize) -> Vec<Option<f32>> {
        (0..self.nt).map(|t| self.get(t, y, x)).collect()
    }

    /// Gathers the sub-cube at the given time, row and column indices.
    pub fn select(&self, times: &[usize], rows: &[usize], cols: &[usize]) -> Cube {
        let mut values = Vec::with_capacity(times.len() * rows.len() * cols.len());
        for &t in times {
            for &y in rows {
                for &x in cols {
                    values.push(self.values[self.index(t, y, x)]);
                }
            }
        }

        Cube {
            nt: times.len(),
            ny: rows.len(),
            nx: cols.len(),
            values,
        }
    }

    /// Smallest and largest defined value.
    pub fn min_max(&self) -> Option<(f32, f32)> {
        self.values.iter().flatten().fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }

    fn index(&self, t: usize, y: usize, x: usize) -> usize {
        (t * self.ny + y) * self.nx + x
    }
}

/// Mean of the defined values, `None` when there are none.
pub fn mean_defined<'a>(values: impl IntoIterator<Item = &'a Option<f32>>) -> Option<f32> {
    let (sum, count) = values
        .into_iter()
        .flatten()
        .fold((0.0f64, 0usize), |(s, n), &v| (s + v as f64, n + 1));

    (count > 0).then(|| (sum / count as f64) as f32)
}
