//! The rain season pipeline: subset -> monthly climatology -> thresholds ->
//! onset/offset detection, plus the point inspector.

pub mod climatology;
pub mod inspect;
pub mod season;
pub mod subset;

use std::{fmt, str::FromStr};

pub use climatology::{check_january_start, monthly_climatology, thresholds, Climatology, MONTHS};
pub use inspect::{Inspector, QueryResult};
pub use season::{detect_seasons, RainSeasonMap, Season, SeasonWindow};
pub use subset::subset;

pub const MONTH_NAMES: [&str; MONTHS] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Longitude/latitude box, bounds inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub lon_min: f64,
    pub lon_max: f64,
    pub lat_min: f64,
    pub lat_max: f64,
}

impl BoundingBox {
    pub fn new(lon_min: f64, lon_max: f64, lat_min: f64, lat_max: f64) -> Self {
        BoundingBox {
            lon_min,
            lon_max,
            lat_min,
            lat_max,
        }
    }

    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        self.contains_lon(lon) && self.contains_lat(lat)
    }

    pub fn contains_lon(&self, lon: f64) -> bool {
        self.lon_min <= lon && lon <= self.lon_max
    }

    pub fn contains_lat(&self, lat: f64) -> bool {
        self.lat_min <= lat && lat <= self.lat_max
    }
}

impl FromStr for BoundingBox {
    type Err = String;

    /// `lon_min,lon_max,lat_min,lat_max`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split(',')
            .map(|v| v.trim().parse::<f64>().map_err(|e| format!("`{v}`: {e}")))
            .collect::<Result<Vec<_>, _>>()?;

        match values[..] {
            [lon_min, lon_max, lat_min, lat_max] if lon_min <= lon_max && lat_min <= lat_max => {
                Ok(BoundingBox::new(lon_min, lon_max, lat_min, lat_max))
            }
            [_, _, _, _] => Err("minimum bounds must not exceed maximum bounds".to_string()),
            _ => Err(format!("expected lon_min,lon_max,lat_min,lat_max, got `{s}`")),
        }
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.lon_min, self.lon_max, self.lat_min, self.lat_max
        )
    }
}

/// A `lon,lat` pair given on the command line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
}

impl FromStr for Coordinate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lon, lat) = s
            .split_once(',')
            .ok_or_else(|| format!("expected lon,lat, got `{s}`"))?;
        let parse = |v: &str| v.trim().parse::<f64>().map_err(|e| format!("`{v}`: {e}"));

        Ok(Coordinate {
            lon: parse(lon)?,
            lat: parse(lat)?,
        })
    }
}
