//! Command line interface.

pub mod command;

use std::{path::PathBuf, time::Duration};

use chrono::NaiveDate;
use clap::{command, Args, Parser, Subcommand};
use indicatif::ProgressBar;

use crate::{
    analysis::{inspect::DEFAULT_CITY_RADIUS, BoundingBox, Coordinate, SeasonWindow},
    config::{self, RainSeasonConfig, TemperatureScale},
};

#[derive(Parser)]
#[command(version, about, long_about = None)]
/// Contains the commands
pub struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Map onset and offset of the rain season from monthly precipitation grids
    Rainseason(RainseasonArgs),
    /// Map annual mean temperatures from DWD grids
    Germany(GermanyArgs),
    /// Plot cities sized by population
    Cities(CitiesArgs),
    /// Plot outlines from shapefiles
    World(WorldArgs),
    /// List the variables of a NetCDF file
    Info(InfoArgs),
}

#[derive(Args)]
pub struct RainseasonArgs {
    /// NetCDF file (`.nc`) or directory of DWD grids
    #[arg(short, long)]
    pub grid: PathBuf,

    /// NetCDF variable to read (default: the fourth variable of the file)
    #[arg(short, long)]
    pub key: Option<String>,

    /// File pattern of DWD grids
    #[arg(long, default_value = config::DEFAULT_GRID_PATTERN)]
    pub pattern: String,

    /// Region as lon_min,lon_max,lat_min,lat_max
    #[arg(long, default_value_t = config::RAIN_SEASON_BBOX, allow_hyphen_values = true)]
    pub bbox: BoundingBox,

    /// First date to use; must be a January
    #[arg(long, default_value = config::RAIN_SEASON_SINCE)]
    pub since: NaiveDate,

    /// Months confirming a crossing, as before,after
    #[arg(long, default_value_t = SeasonWindow::default())]
    pub window: SeasonWindow,

    /// Cities table (worldcities.csv) for markers and point labels
    #[arg(long)]
    pub cities: Option<PathBuf>,

    /// Smallest city shown
    #[arg(long, default_value_t = 100_000.0)]
    pub min_population: f64,

    /// Largest distance of a city from a queried point
    #[arg(long, default_value_t = DEFAULT_CITY_RADIUS)]
    pub city_radius: f64,

    /// Shapefiles drawn as outlines
    #[arg(long)]
    pub shapes: Vec<PathBuf>,

    /// Plot the climatology at lon,lat; may be repeated
    #[arg(long, value_name = "LON,LAT", allow_hyphen_values = true)]
    pub inspect: Vec<Coordinate>,

    /// Also save the per-cell results as parquet
    #[arg(long)]
    pub parquet: bool,

    /// SVG file to write
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl RainseasonArgs {
    pub fn config(&self) -> RainSeasonConfig {
        RainSeasonConfig {
            bbox: self.bbox,
            since: Some(self.since),
            window: self.window,
            min_population: self.min_population,
            city_radius: self.city_radius,
        }
    }
}

#[derive(Args)]
pub struct GermanyArgs {
    /// Directory of annual DWD grids
    #[arg(short, long)]
    pub dir: PathBuf,

    /// File pattern of DWD grids
    #[arg(long, default_value = config::DEFAULT_GRID_PATTERN)]
    pub pattern: String,

    /// Lower colour limit in °C
    #[arg(long, allow_hyphen_values = true)]
    pub vmin: Option<f64>,

    /// Upper colour limit in °C
    #[arg(long, allow_hyphen_values = true)]
    pub vmax: Option<f64>,

    /// Also save the annual means as parquet
    #[arg(long)]
    pub parquet: bool,

    /// SVG file to write
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl GermanyArgs {
    pub fn scale(&self) -> TemperatureScale {
        let default = TemperatureScale::default();
        TemperatureScale {
            vmin: self.vmin.unwrap_or(default.vmin),
            vmax: self.vmax.unwrap_or(default.vmax),
        }
    }
}

#[derive(Args)]
pub struct CitiesArgs {
    /// Cities table (worldcities.csv)
    #[arg(short, long)]
    pub csv: PathBuf,

    /// Smallest city shown
    #[arg(long, default_value_t = 0.0)]
    pub min_population: f64,

    /// Region as lon_min,lon_max,lat_min,lat_max
    #[arg(long, default_value_t = config::WORLD_BBOX, allow_hyphen_values = true)]
    pub bbox: BoundingBox,

    /// SVG file to write
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct WorldArgs {
    /// Shapefiles to draw
    #[arg(short, long, required = true)]
    pub shapes: Vec<PathBuf>,

    /// SVG file to write
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct InfoArgs {
    /// NetCDF file
    #[arg(short, long)]
    pub grid: PathBuf,
}

/// Creates a spinner.
pub fn create_spinner(message: String) -> ProgressBar {
    let bar = ProgressBar::new_spinner().with_message(message);
    bar.enable_steady_tick(Duration::from_millis(100));

    bar
}

// -- Tests ---
