//! Defaults for the analyses. Every value can be overridden on the command line.

use chrono::NaiveDate;

use crate::analysis::{inspect::DEFAULT_CITY_RADIUS, BoundingBox, SeasonWindow};

/// South America.
pub const RAIN_SEASON_BBOX: BoundingBox = BoundingBox {
    lon_min: -85.0,
    lon_max: -33.0,
    lat_min: -56.0,
    lat_max: 16.0,
};

pub const RAIN_SEASON_SINCE: &str = "2012-01-01";

/// Whole world, for the city scatter.
pub const WORLD_BBOX: BoundingBox = BoundingBox {
    lon_min: -180.0,
    lon_max: 180.0,
    lat_min: -90.0,
    lat_max: 90.0,
};

/// Cities above this size are labelled in the city scatter.
pub const LABEL_POPULATION: f64 = 1e6;

pub const DEFAULT_GRID_PATTERN: &str = "*.asc*";

#[derive(Debug, Clone, PartialEq)]
pub struct RainSeasonConfig {
    pub bbox: BoundingBox,
    pub since: Option<NaiveDate>,
    pub window: SeasonWindow,
    pub min_population: f64,
    pub city_radius: f64,
}

impl Default for RainSeasonConfig {
    fn default() -> Self {
        RainSeasonConfig {
            bbox: RAIN_SEASON_BBOX,
            since: RAIN_SEASON_SINCE.parse().ok(),
            window: SeasonWindow::default(),
            min_population: 100_000.0,
            city_radius: DEFAULT_CITY_RADIUS,
        }
    }
}

/// Colour limits of the DWD temperature maps, in °C.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureScale {
    pub vmin: f64,
    pub vmax: f64,
}

impl Default for TemperatureScale {
    fn default() -> Self {
        TemperatureScale {
            vmin: 0.0,
            vmax: 12.0,
        }
    }
}
