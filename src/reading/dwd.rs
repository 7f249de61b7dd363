//! DWD grid data in ESRI ASCII format, as published on opendata.dwd.de.
//!
//! A file starts with a six line `KEY value` header (`NCOLS`, `NROWS`,
//! `XLLCORNER`, `YLLCORNER`, `CELLSIZE`, `NODATA_VALUE`) followed by the
//! value matrix, north row first. Values are stored in tenths of the unit.

use std::{
    collections::HashMap,
    io::{self, BufRead, BufReader, Read},
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use flate2::read::GzDecoder;
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use crate::{
    error::{open_file, GridError},
    grid::{regular_edges, Cube, GridDataset},
};

const HEADER_LINES: usize = 6;
const SCALE: f64 = 0.1;

/// A single DWD grid. `x` and `y` are cell edges, rows run south to north.
#[derive(Debug, Clone, PartialEq)]
pub struct AsciiGrid {
    pub date: NaiveDate,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub values: Vec<Option<f32>>,
}

impl AsciiGrid {
    pub fn ncols(&self) -> usize {
        self.x.len().saturating_sub(1)
    }

    pub fn nrows(&self) -> usize {
        self.y.len().saturating_sub(1)
    }

    fn same_geometry(&self, other: &AsciiGrid) -> bool {
        self.x == other.x && self.y == other.y
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Header {
    ncols: Option<usize>,
    nrows: Option<usize>,
    xorigin: f64,
    yorigin: f64,
    cellsize: f64,
    nodata: f64,
}

/// Loads a DWD grid file; `.gz` files are decompressed on the fly.
pub fn read_grid(path: &Path) -> Result<AsciiGrid, GridError> {
    let date = date_from_file_name(path)?;
    let file = open_file(path)?;

    let reader: Box<dyn Read> = match path.extension().and_then(|e| e.to_str()) {
        Some("gz") => Box::new(GzDecoder::new(file)),
        _ => Box::new(file),
    };

    parse_grid(BufReader::new(reader), date, path)
}

/// Parses header and matrix from `reader`. `path` is only used in errors.
pub fn parse_grid<R: BufRead>(reader: R, date: NaiveDate, path: &Path) -> Result<AsciiGrid, GridError> {
    let mut lines = reader.lines();

    let mut header_lines = Vec::with_capacity(HEADER_LINES);
    for _ in 0..HEADER_LINES {
        match lines.next() {
            Some(line) => header_lines.push(line?),
            None => return Err(GridError::invalid(format!("{}: truncated header", path.display()))),
        }
    }
    let header = parse_header(&header_lines, path)?;

    let mut rows: Vec<Vec<Option<f32>>> = Vec::new();
    for (k, line) in lines.enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let line_no = HEADER_LINES + k + 1;
        let row = line
            .split_whitespace()
            .map(|token| parse_value(token, header.nodata, path, line_no))
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(first) = rows.first() {
            if first.len() != row.len() {
                return Err(GridError::invalid(format!(
                    "{}:{line_no}: row has {} values, expected {}",
                    path.display(),
                    row.len(),
                    first.len()
                )));
            }
        }
        rows.push(row);
    }

    let nrows = rows.len();
    let ncols = rows.first().map(Vec::len).unwrap_or(0);
    check_dimension("NROWS", header.nrows, nrows, path)?;
    check_dimension("NCOLS", header.ncols, ncols, path)?;

    rows.reverse();
    let values = rows.into_iter().flatten().collect();

    Ok(AsciiGrid {
        date,
        x: regular_edges(header.xorigin, header.cellsize, ncols),
        y: regular_edges(header.yorigin, header.cellsize, nrows),
        values,
    })
}

fn parse_header(lines: &[String], path: &Path) -> Result<Header, GridError> {
    let mut meta: HashMap<String, f64> = HashMap::new();

    for line in lines {
        let mut parts = line.split_whitespace();
        let (Some(key), Some(value), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(GridError::invalid(format!(
                "{}: malformed header line `{line}`",
                path.display()
            )));
        };
        let value: f64 = value.parse().map_err(|_| {
            GridError::invalid(format!("{}: header value `{value}` is not numeric", path.display()))
        })?;
        meta.insert(key.to_ascii_uppercase(), value);
    }

    let require = |key: &str| {
        meta.get(key).copied().ok_or_else(|| {
            GridError::invalid(format!("{}: header is missing {key}", path.display()))
        })
    };

    let cellsize = require("CELLSIZE")?;
    let nodata = require("NODATA_VALUE")?;

    // Origins are given either as lower-left corner or as centre of the lower-left cell.
    let xorigin = match meta.get("XLLCORNER") {
        Some(&x) => x,
        None => require("XLLCENTER")? - cellsize / 2.0,
    };
    let yorigin = match meta.get("YLLCORNER") {
        Some(&y) => y,
        None => require("YLLCENTER")? - cellsize / 2.0,
    };

    Ok(Header {
        ncols: meta.get("NCOLS").map(|&n| n as usize),
        nrows: meta.get("NROWS").map(|&n| n as usize),
        xorigin,
        yorigin,
        cellsize,
        nodata,
    })
}

fn parse_value(token: &str, nodata: f64, path: &Path, line: usize) -> Result<Option<f32>, GridError> {
    let raw: f64 = token.parse().map_err(|_| GridError::Parse {
        path: path.to_path_buf(),
        line,
        reason: format!("bad value `{token}`"),
    })?;

    if raw == nodata {
        Ok(None)
    } else {
        Ok(Some((raw * SCALE) as f32))
    }
}

fn check_dimension(key: &str, declared: Option<usize>, found: usize, path: &Path) -> Result<(), GridError> {
    match declared {
        Some(n) if n != found => Err(GridError::invalid(format!(
            "{}: header declares {key} {n}, matrix has {found}",
            path.display()
        ))),
        _ => Ok(()),
    }
}

/// Date of a DWD grid from the trailing `_` token of its file name.
///
/// `..._1995.asc` is 1995-01-01, `..._199507.asc.gz` is 1995-07-01. Month
/// codes above 12 (seasonal and annual grids) map to January.
pub fn date_from_file_name(path: &Path) -> Result<NaiveDate, GridError> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let token = file_name.rsplit('_').next().unwrap_or_default();
    let digits: String = token.chars().take_while(|c| c.is_ascii_digit()).collect();

    let bad_name = || GridError::invalid(format!("no year in file name `{file_name}`"));

    if digits.len() < 4 {
        return Err(bad_name());
    }
    let year: i32 = digits[..4].parse().map_err(|_| bad_name())?;
    let month = digits
        .get(4..6)
        .and_then(|m| m.parse::<u32>().ok())
        .filter(|m| (1..=12).contains(m))
        .unwrap_or(1);

    NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(bad_name)
}

/// Sorted list of grid files in `dir` matching `pattern`, e.g. `*.asc.gz`.
pub fn find_grid_files(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>, GridError> {
    if !dir.is_dir() {
        return Err(GridError::not_found(dir));
    }

    let full = dir.join(pattern);
    let entries = glob::glob(&full.to_string_lossy())
        .map_err(|e| GridError::invalid(format!("bad pattern `{pattern}`: {e}")))?;

    let mut files = entries
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| GridError::Io(e.into_error()))?;
    files.sort();

    debug!(count = files.len(), dir = %dir.display(), "found grid files");
    Ok(files)
}

/// Loads many DWD grids into one dataset, one time slice per file.
///
/// Files are read concurrently and assembled in the given order. Missing
/// files are skipped with a warning; all loaded grids must share the same
/// geometry.
pub async fn load_grids(paths: &[PathBuf], unit: &str) -> Result<GridDataset, GridError> {
    if paths.is_empty() {
        warn!("no grid files to load");
        return Ok(GridDataset::empty());
    }

    let pb = loading_bar(paths.len() as u64);

    let tasks: Vec<_> = paths
        .iter()
        .map(|path| {
            let path = path.clone();
            let pb = pb.clone();
            tokio::task::spawn_blocking(move || {
                let grid = read_grid(&path);
                pb.inc(1);
                (path, grid)
            })
        })
        .collect();

    let mut grids = Vec::with_capacity(paths.len());
    for result in join_all(tasks).await {
        let (path, grid) = result.map_err(|e| GridError::Io(io::Error::other(e)))?;
        match grid {
            Ok(grid) => grids.push(grid),
            Err(e) if e.is_not_found() => warn!(path = %path.display(), "grid file missing, skipped"),
            Err(e) => return Err(e),
        }
    }
    pb.finish_with_message("Grid files loaded");

    info!(files = grids.len(), "loaded DWD grids");
    assemble(grids, unit)
}

fn loading_bar(size: u64) -> ProgressBar {
    let style = ProgressStyle::with_template("[{eta_precise}] {bar:40.cyan/blue} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");

    ProgressBar::new(size)
        .with_message("Loading grid files...")
        .with_style(style)
}

fn assemble(grids: Vec<AsciiGrid>, unit: &str) -> Result<GridDataset, GridError> {
    let Some(first) = grids.first() else {
        return Ok(GridDataset::empty());
    };

    if let Some(odd) = grids.iter().find(|g| !g.same_geometry(first)) {
        return Err(GridError::invalid(format!(
            "grid of {} differs in geometry from grid of {}",
            odd.date, first.date
        )));
    }

    let shape = [grids.len(), first.nrows(), first.ncols()];
    let x = first.x.clone();
    let y = first.y.clone();

    let mut dates = Vec::with_capacity(grids.len());
    let mut values = Vec::with_capacity(shape.iter().product());
    for grid in grids {
        dates.push(grid.date);
        values.extend(grid.values);
    }

    GridDataset::new(dates, x, y, Cube::new(shape, values)?, unit)
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::{fs, io::Write};

    use flate2::{write::GzEncoder, Compression};

    use super::*;

    const GRID: &str = "NCOLS 3
NROWS 2
XLLCORNER 3280000
YLLCORNER 5230000
CELLSIZE 1000
NODATA_VALUE -999
 10 20 -999
 30 40 50
";

    fn date(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    #[test]
    fn should_parse_grid_south_to_north() {
        let grid = parse_grid(GRID.as_bytes(), date(2000, 1), Path::new("t.asc")).unwrap();

        assert_eq!(grid.ncols(), 3);
        assert_eq!(grid.nrows(), 2);
        assert_eq!(grid.x, vec![3280000.0, 3281000.0, 3282000.0, 3283000.0]);
        assert_eq!(grid.y, vec![5230000.0, 5231000.0, 5232000.0]);
        // last file row comes first
        assert_eq!(grid.values[0], Some(3.0));
        assert_eq!(grid.values[2], Some(5.0));
        assert_eq!(grid.values[3], Some(1.0));
        assert_eq!(grid.values[5], None);
    }

    #[test]
    fn should_accept_centre_origin() {
        let text = GRID
            .replace("XLLCORNER 3280000", "XLLCENTER 3280500")
            .replace("YLLCORNER 5230000", "YLLCENTER 5230500");
        let grid = parse_grid(text.as_bytes(), date(2000, 1), Path::new("t.asc")).unwrap();
        assert_eq!(grid.x[0], 3280000.0);
        assert_eq!(grid.y[0], 5230000.0);
    }

    #[test]
    fn should_reject_missing_header_key() {
        let text = GRID.replace("CELLSIZE 1000", "FOO 1000");
        let err = parse_grid(text.as_bytes(), date(2000, 1), Path::new("t.asc")).unwrap_err();
        assert!(matches!(err, GridError::InvalidInput { .. }));
    }

    #[test]
    fn should_reject_declared_size_mismatch() {
        let text = GRID.replace("NROWS 2", "NROWS 3");
        let err = parse_grid(text.as_bytes(), date(2000, 1), Path::new("t.asc")).unwrap_err();
        assert!(matches!(err, GridError::InvalidInput { .. }));
    }

    #[test]
    fn should_fail_on_bad_literal() {
        let text = GRID.replace(" 30 40 50", " 30 4x0 50");
        let err = parse_grid(text.as_bytes(), date(2000, 1), Path::new("t.asc")).unwrap_err();
        match err {
            GridError::Parse { line, .. } => assert_eq!(line, 8),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn should_take_date_from_file_name() {
        let annual = Path::new("grids_germany_annual_air_temp_mean_1995.asc");
        assert_eq!(date_from_file_name(annual).unwrap(), date(1995, 1));

        let annual_code = Path::new("grids_germany_annual_air_temp_mean_199517.asc.gz");
        assert_eq!(date_from_file_name(annual_code).unwrap(), date(1995, 1));

        let monthly = Path::new("grids_germany_monthly_precipitation_199507.asc.gz");
        assert_eq!(date_from_file_name(monthly).unwrap(), date(1995, 7));

        assert!(date_from_file_name(Path::new("grid.asc")).is_err());
    }

    #[test]
    fn should_read_gzipped_grid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid_201203.asc.gz");
        let mut encoder = GzEncoder::new(fs::File::create(&path).unwrap(), Compression::default());
        encoder.write_all(GRID.as_bytes()).unwrap();
        encoder.finish().unwrap();

        let grid = read_grid(&path).unwrap();
        assert_eq!(grid.date, date(2012, 3));
        assert_eq!(grid.values.len(), 6);
    }

    #[test]
    fn should_report_missing_file() {
        let err = read_grid(Path::new("/nonexistent/grid_2000.asc")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn should_load_grids_in_order_and_skip_missing() {
        let dir = tempfile::tempdir().unwrap();
        for year in ["2001", "2000"] {
            fs::write(dir.path().join(format!("grid_{year}.asc")), GRID).unwrap();
        }

        let mut files = find_grid_files(dir.path(), "*.asc").unwrap();
        assert_eq!(files.len(), 2);
        files.push(dir.path().join("grid_2002.asc"));

        let ds = load_grids(&files, "°C").await.unwrap();
        assert_eq!(ds.dates, vec![date(2000, 1), date(2001, 1)]);
        assert_eq!(ds.cube.shape(), [2, 2, 3]);
        assert_eq!(ds.unit, "°C");
        assert_eq!(ds.lon.len(), 4);
    }

    #[test]
    fn should_size_loading_bar_to_file_count() {
        let pb = loading_bar(3);
        assert_eq!(pb.length(), Some(3));
        assert_eq!(pb.message(), "Loading grid files...");
    }

    #[tokio::test]
    async fn should_return_empty_dataset_without_files() {
        let ds = load_grids(&[], "").await.unwrap();
        assert!(ds.is_empty());
    }

    #[tokio::test]
    async fn should_reject_mixed_geometry() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("grid_2000.asc"), GRID).unwrap();
        fs::write(
            dir.path().join("grid_2001.asc"),
            GRID.replace("CELLSIZE 1000", "CELLSIZE 500"),
        )
        .unwrap();

        let files = find_grid_files(dir.path(), "*.asc").unwrap();
        let err = load_grids(&files, "").await.unwrap_err();
        assert!(matches!(err, GridError::InvalidInput { .. }));
    }
}
