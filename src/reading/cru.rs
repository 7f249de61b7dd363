//! CRU TS grids in NetCDF format, as distributed by CEDA
//! (<https://data.ceda.ac.uk>), e.g. `cru_ts4.06.1901.2021.pre.dat.nc`.
//!
//! Needs the `netcdf` cargo feature and a system libnetcdf.

use chrono::{Days, NaiveDate};

#[cfg(feature = "netcdf")]
pub use backend::{info, load_grids};

#[cfg(not(feature = "netcdf"))]
pub use fallback::{info, load_grids};

/// One line of the variable listing.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableInfo {
    pub name: String,
    pub long_name: String,
    pub unit: String,
    pub shape: Vec<usize>,
}

impl std::fmt::Display for VariableInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let unit = if self.unit.is_empty() {
            String::new()
        } else {
            format!("[{}]", self.unit)
        };
        let shape = self
            .shape
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{:6}: {:50} {:30} {}", self.name, self.long_name, unit, shape)
    }
}

/// Time values count days since 1900-01-01.
pub fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or_default()
}

/// Converts day offsets since [`epoch`] to dates, truncating fractions.
pub fn days_to_dates(days: &[f64]) -> Vec<NaiveDate> {
    let start = epoch();
    days.iter()
        .map(|&d| {
            let whole = d.max(0.0) as u64;
            start.checked_add_days(Days::new(whole)).unwrap_or(NaiveDate::MAX)
        })
        .collect()
}

/// Maps fill values and non-finite values to no-data.
pub fn mask_fill(values: Vec<f32>, fill: &[f32]) -> Vec<Option<f32>> {
    values
        .into_iter()
        .map(|v| (v.is_finite() && !fill.contains(&v)).then_some(v))
        .collect()
}

#[cfg(feature = "netcdf")]
mod backend {
    use std::path::Path;

    use netcdf::AttributeValue;
    use tracing::{debug, info};

    use super::{days_to_dates, mask_fill, VariableInfo};
    use crate::{
        error::GridError,
        grid::{centers_to_edges, Cube, GridDataset},
    };

    /// Position of the data variable in CRU files (`lon`, `lat`, `time`, data, `stn`).
    const DEFAULT_VARIABLE_INDEX: usize = 3;

    fn open(path: &Path) -> Result<netcdf::File, GridError> {
        if !path.exists() {
            return Err(GridError::not_found(path));
        }
        Ok(netcdf::open(path)?)
    }

    fn string_attribute(var: &netcdf::Variable, name: &str) -> Option<String> {
        match var.attribute_value(name)?.ok()? {
            AttributeValue::Str(s) => Some(s),
            _ => None,
        }
    }

    fn float_attributes(var: &netcdf::Variable, names: &[&str]) -> Vec<f32> {
        names
            .iter()
            .filter_map(|name| match var.attribute_value(name)?.ok()? {
                AttributeValue::Float(v) => Some(v),
                AttributeValue::Double(v) => Some(v as f32),
                AttributeValue::Floats(v) => v.first().copied(),
                AttributeValue::Doubles(v) => v.first().map(|&d| d as f32),
                _ => None,
            })
            .collect()
    }

    fn read_1d(file: &netcdf::File, name: &str, path: &Path) -> Result<Vec<f64>, GridError> {
        let var = file.variable(name).ok_or_else(|| {
            GridError::invalid(format!("variable '{name}' not found in {}", path.display()))
        })?;
        Ok(var.get_values::<f64, _>(..)?)
    }

    /// Lists the variables of a NetCDF file.
    pub fn info(path: &Path) -> Result<Vec<VariableInfo>, GridError> {
        let file = open(path)?;

        Ok(file
            .variables()
            .map(|var| VariableInfo {
                name: var.name(),
                long_name: string_attribute(&var, "long_name")
                    .or_else(|| string_attribute(&var, "description"))
                    .unwrap_or_default(),
                unit: string_attribute(&var, "units").unwrap_or_default(),
                shape: var.dimensions().iter().map(|d| d.len()).collect(),
            })
            .collect())
    }

    /// Loads dates, lon/lat edges, the data cube and its unit.
    ///
    /// Without `key` the fourth variable of the file is used.
    pub fn load_grids(path: &Path, key: Option<&str>) -> Result<GridDataset, GridError> {
        let file = open(path)?;

        let lon = centers_to_edges(&read_1d(&file, "lon", path)?)?;
        let lat = centers_to_edges(&read_1d(&file, "lat", path)?)?;
        let dates = days_to_dates(&read_1d(&file, "time", path)?);

        let key = match key {
            Some(k) => k.to_string(),
            None => file
                .variables()
                .nth(DEFAULT_VARIABLE_INDEX)
                .map(|v| v.name())
                .ok_or_else(|| GridError::invalid(format!("{} has no data variable", path.display())))?,
        };
        let var = file.variable(&key).ok_or_else(|| {
            GridError::invalid(format!("variable '{key}' not found in {}", path.display()))
        })?;

        let dims = var.dimensions();
        if dims.len() != 3 {
            return Err(GridError::invalid(format!(
                "variable '{key}' has {} dimensions, expected 3",
                dims.len()
            )));
        }
        let shape = [dims[0].len(), dims[1].len(), dims[2].len()];
        debug!(variable = %key, ?shape, "reading netcdf variable");

        let unit = string_attribute(&var, "units").unwrap_or_default();
        let fill = float_attributes(&var, &["_FillValue", "missing_value"]);
        let values = mask_fill(var.get_values::<f32, _>(..)?, &fill);

        info!(variable = %key, unit = %unit, "loaded {}", path.display());
        GridDataset::new(dates, lon, lat, Cube::new(shape, values)?, unit)
    }
}

#[cfg(not(feature = "netcdf"))]
mod fallback {
    use std::path::Path;

    use super::VariableInfo;
    use crate::{error::GridError, grid::GridDataset};

    fn unsupported(path: &Path) -> GridError {
        if !path.exists() {
            return GridError::not_found(path);
        }
        GridError::invalid(format!(
            "{}: built without the `netcdf` feature",
            path.display()
        ))
    }

    pub fn info(path: &Path) -> Result<Vec<VariableInfo>, GridError> {
        Err(unsupported(path))
    }

    pub fn load_grids(path: &Path, _key: Option<&str>) -> Result<GridDataset, GridError> {
        Err(unsupported(path))
    }
}


#[cfg(all(test, feature = "netcdf"))]
mod netcdf_tests {
    use std::path::Path;

    use super::*;
    use crate::error::GridError;

    const FILL: f32 = -999.0;

    /// A CRU-like file: `lon`, `lat`, `time`, `pre` (2 x 2 x 3) and a 2-D `mask`.
    fn write_fixture(path: &Path) {
        let mut file = netcdf::create(path).unwrap();
        file.add_dimension("lon", 3).unwrap();
        file.add_dimension("lat", 2).unwrap();
        file.add_dimension("time", 2).unwrap();

        for (name, values) in [
            ("lon", vec![-60.5, -59.5, -58.5]),
            ("lat", vec![-9.5, -8.5]),
            ("time", vec![43114.0, 43145.0]),
        ] {
            let mut var = file.add_variable::<f64>(name, &[name]).unwrap();
            var.put_values(&values, ..).unwrap();
        }

        {
            let mut pre = file.add_variable::<f32>("pre", &["time", "lat", "lon"]).unwrap();
            pre.put_attribute("long_name", "precipitation").unwrap();
            pre.put_attribute("units", "mm/month").unwrap();
            pre.put_attribute("_FillValue", FILL).unwrap();
            let values: Vec<f32> = (0..12)
                .map(|i| if i == 4 || i == 11 { FILL } else { i as f32 })
                .collect();
            pre.put_values(&values, ..).unwrap();
        }

        let mut mask = file.add_variable::<f32>("mask", &["lat", "lon"]).unwrap();
        mask.put_values(&[1.0f32; 6], ..).unwrap();
    }

    #[test]
    fn should_load_fourth_variable_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cru.nc");
        write_fixture(&path);

        let ds = load_grids(&path, None).unwrap();

        assert_eq!(ds.unit, "mm/month");
        assert_eq!(ds.cube.shape(), [2, 2, 3]);
        assert_eq!(
            ds.dates,
            vec![
                NaiveDate::from_ymd_opt(2018, 1, 16).unwrap(),
                NaiveDate::from_ymd_opt(2018, 2, 16).unwrap()
            ]
        );
        assert_eq!(ds.lon, vec![-60.5, -59.5, -58.5, -57.5]);
        assert_eq!(ds.lat, vec![-9.5, -8.5, -7.5]);
        assert_eq!(ds.cube.get(0, 0, 0), Some(0.0));
        assert_eq!(ds.cube.get(0, 1, 1), None);
        assert_eq!(ds.cube.get(1, 1, 2), None);
        assert_eq!(ds.cube.get(1, 1, 1), Some(10.0));
    }

    #[test]
    fn should_load_named_variable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cru.nc");
        write_fixture(&path);

        let ds = load_grids(&path, Some("pre")).unwrap();
        assert_eq!(ds.cube.time_slice(1).iter().flatten().count(), 5);
    }

    #[test]
    fn should_reject_variable_without_time_axis() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cru.nc");
        write_fixture(&path);

        let err = load_grids(&path, Some("mask")).unwrap_err();
        assert!(matches!(err, GridError::InvalidInput { .. }));

        let err = load_grids(&path, Some("tmp")).unwrap_err();
        assert!(matches!(err, GridError::InvalidInput { .. }));
    }

    #[test]
    fn should_list_variables_in_file_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cru.nc");
        write_fixture(&path);

        let vars = info(&path).unwrap();
        let names: Vec<_> = vars.iter().map(|v| v.name.as_str()).collect();

        assert_eq!(names, vec!["lon", "lat", "time", "pre", "mask"]);
        assert_eq!(vars[3].long_name, "precipitation");
        assert_eq!(vars[3].unit, "mm/month");
        assert_eq!(vars[3].shape, vec![2, 2, 3]);
    }
}
