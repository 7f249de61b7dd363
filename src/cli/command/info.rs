//! Lists the variables of a NetCDF file.

use anyhow::Result;

use crate::{cli::InfoArgs, reading::cru};

pub async fn info(args: &InfoArgs) -> Result<String> {
    let variables = cru::info(&args.grid)?;

    Ok(variables
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("\n"))
}

// -- Tests ---
