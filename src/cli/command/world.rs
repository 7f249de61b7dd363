//! Outline map of shapefiles.

use anyhow::Result;
use tracing::info;

use super::{list_files, output_path};
use crate::{
    cli::{create_spinner, WorldArgs},
    reading::{load_shapes, recover_missing},
    render::{figures::world_figure, svg::save_svg},
};

pub async fn world(args: &WorldArgs) -> Result<String> {
    let bar = create_spinner("Reading shapefiles...".to_string());
    let mut shapes = Vec::new();
    for path in &args.shapes {
        shapes.extend(recover_missing(load_shapes(path))?);
    }
    bar.finish_with_message("Shapefiles read");
    info!(shapes = shapes.len(), "loaded outlines");

    let output = output_path(args.output.as_ref(), "world");
    save_svg(&world_figure(&shapes), &output)?;

    Ok(list_files(&[output]))
}

// -- Tests ---
