//! Annual mean temperature maps from DWD grids.

use anyhow::Result;
use chrono::Datelike;
use tracing::info;

use super::{list_files, output_path, sibling_path};
use crate::{
    cli::{create_spinner, GermanyArgs},
    parquet,
    reading::{dwd, recover_missing},
    render::{
        figures::{annual_means, germany_figure, temperature_scale},
        svg::save_svg,
    },
};

pub async fn germany(args: &GermanyArgs) -> Result<String> {
    let files = recover_missing(dwd::find_grid_files(&args.dir, &args.pattern))?;
    let dataset = dwd::load_grids(&files, "°C").await?;

    match dataset.cube.min_max() {
        Some((min, max)) => {
            println!("minimum temperature: {min:5.1}C");
            println!("maximum temperature: {max:5.1}C");
        }
        None => println!("no temperature data"),
    }

    let scale = args.scale();
    let figure = germany_figure(&dataset, temperature_scale(scale.vmin, scale.vmax));
    let output = output_path(args.output.as_ref(), "germany");
    save_svg(&figure, &output)?;
    let mut saved = vec![output];

    if args.parquet {
        let bar = create_spinner("Saving annual means...".to_string());
        let years: Vec<i32> = dataset.dates.iter().map(|d| d.year()).collect();
        let path = sibling_path(&saved[0], "", "parquet");
        parquet::save_annual_means(&years, &annual_means(&dataset), &path)?;
        bar.finish_with_message("Annual means saved");
        saved.push(path);
    }

    info!(years = dataset.dates.len(), "temperature figure done");
    Ok(list_files(&saved))
}

// -- Tests ---
