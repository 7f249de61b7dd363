//! Rain season onset and offset maps, point queries and parquet export.

use std::path::PathBuf;

use anyhow::Result;
use tracing::{info, warn};

use super::{list_files, output_path, sibling_path};
use crate::{
    analysis::{check_january_start, subset, Inspector, QueryResult, RainSeasonMap, MONTH_NAMES},
    cli::{create_spinner, RainseasonArgs},
    parquet,
    reading::{filter_cities, load_cities, load_shapes, recover_missing, City, GridSource},
    render::{
        figures::{point_figure, rainseason_figure},
        svg::save_svg,
    },
};

pub async fn rainseason(args: &RainseasonArgs) -> Result<String> {
    let config = args.config();

    let source = GridSource::from_path(args.grid.clone(), args.key.clone(), &args.pattern, "mm/month");
    let dataset = recover_missing(source.load().await)?;
    let dataset = subset(&dataset, &config.bbox, config.since);
    check_january_start(&dataset.dates)?;

    let bar = create_spinner("Detecting rain seasons...".to_string());
    let map = RainSeasonMap::build(dataset, config.window)?;
    bar.finish_with_message("Rain seasons detected");

    let cities = match &args.cities {
        Some(path) => filter_cities(
            &recover_missing(load_cities(path))?,
            &config.bbox,
            config.min_population,
        ),
        None => Vec::<City>::new(),
    };
    let mut shapes = Vec::new();
    for path in &args.shapes {
        shapes.extend(recover_missing(load_shapes(path))?);
    }

    let output = output_path(args.output.as_ref(), "rainseason");
    save_svg(&rainseason_figure(&map, &shapes, &cities), &output)?;
    let mut saved: Vec<PathBuf> = vec![output.clone()];

    let inspector = Inspector::new(&map, &cities, config.bbox).with_city_radius(config.city_radius);
    for (k, point) in args.inspect.iter().enumerate() {
        let Some(query) = inspector.inspect_point(point.lon, point.lat) else {
            warn!(lon = point.lon, lat = point.lat, "no grid cell at query point");
            eprintln!("Ignoring query ({}, {}): outside the map", point.lon, point.lat);
            continue;
        };

        println!("{}", describe(&query));
        let path = sibling_path(&output, &format!("-point-{}", k + 1), "svg");
        save_svg(&point_figure(&query), &path)?;
        saved.push(path);
    }

    if args.parquet {
        let path = sibling_path(&output, "", "parquet");
        parquet::save_rainseason(&map, &path)?;
        saved.push(path);
    }

    info!(files = saved.len(), "rain season outputs written");
    Ok(list_files(&saved))
}

/// One line summary of a point query.
fn describe(query: &QueryResult) -> String {
    let threshold = match query.threshold {
        Some(t) => format!("{t:.1} {}", query.unit),
        None => "-".to_string(),
    };
    let season = match query.season {
        Some(s) => format!(
            "onset {}, offset {}",
            if s.onset_found { MONTH_NAMES[s.onset] } else { "-" },
            if s.offset_found { MONTH_NAMES[s.offset] } else { "-" }
        ),
        None => "no data".to_string(),
    };

    format!("{}: threshold {threshold}, {season}", query.title())
}

// -- Tests ---
