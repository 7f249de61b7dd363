//! Scatter plot of cities sized by population.

use anyhow::Result;
use tracing::info;

use super::{list_files, output_path};
use crate::{
    cli::CitiesArgs,
    reading::{filter_cities, load_cities, recover_missing},
    render::{figures::cities_figure, svg::save_svg},
};

pub async fn cities(args: &CitiesArgs) -> Result<String> {
    let cities = recover_missing(load_cities(&args.csv))?;
    let cities = filter_cities(&cities, &args.bbox, args.min_population);
    info!(count = cities.len(), bbox = %args.bbox, "cities selected");

    let output = output_path(args.output.as_ref(), "cities");
    save_svg(&cities_figure(&cities), &output)?;

    Ok(list_files(&[output]))
}

// -- Tests ---
