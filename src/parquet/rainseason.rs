//! Save a rain season map to a parquet file, one row per grid cell.

use std::{fs::File, path::Path, sync::Arc};

use anyhow::Result;
use arrow::{
    array::{ArrayRef, BooleanArray, Float32Array, Float64Array, Int32Array},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use parquet::{arrow::ArrowWriter, file::properties::WriterProperties};

use crate::analysis::{RainSeasonMap, MONTHS, MONTH_NAMES};

pub fn save_rainseason(map: &RainSeasonMap, file_path: &Path) -> Result<()> {
    let file = File::create(file_path)?;

    let mut fields = vec![
        Field::new("lon", DataType::Float64, false),
        Field::new("lat", DataType::Float64, false),
        Field::new("threshold", DataType::Float32, true),
        Field::new("onset", DataType::Int32, true),
        Field::new("offset", DataType::Int32, true),
        Field::new("onset_found", DataType::Boolean, true),
        Field::new("offset_found", DataType::Boolean, true),
    ];
    fields.extend(
        MONTH_NAMES
            .iter()
            .map(|m| Field::new(m.to_lowercase(), DataType::Float32, true)),
    );
    let schema = Arc::new(Schema::new(fields));

    let props = WriterProperties::builder()
        .set_compression(parquet::basic::Compression::SNAPPY)
        .build();

    let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;

    let (ny, nx) = map.climatology.shape();
    let num_rows = ny * nx;
    let lon_centers = map.dataset.lon_centers();
    let lat_centers = map.dataset.lat_centers();

    let mut lons = Vec::with_capacity(num_rows);
    let mut lats = Vec::with_capacity(num_rows);
    let mut onsets = Vec::with_capacity(num_rows);
    let mut offsets = Vec::with_capacity(num_rows);
    let mut onsets_found = Vec::with_capacity(num_rows);
    let mut offsets_found = Vec::with_capacity(num_rows);
    let mut months: Vec<Vec<Option<f32>>> = vec![Vec::with_capacity(num_rows); MONTHS];

    for y in 0..ny {
        for x in 0..nx {
            lons.push(lon_centers[x]);
            lats.push(lat_centers[y]);

            let season = map.season(y, x);
            onsets.push(season.map(|s| s.onset as i32));
            offsets.push(season.map(|s| s.offset as i32));
            onsets_found.push(season.map(|s| s.onset_found));
            offsets_found.push(season.map(|s| s.offset_found));

            for (column, value) in months.iter_mut().zip(map.climatology.series(y, x)) {
                column.push(value);
            }
        }
    }

    let mut columns: Vec<ArrayRef> = vec![
        Arc::new(Float64Array::from(lons)),
        Arc::new(Float64Array::from(lats)),
        Arc::new(Float32Array::from(map.thresholds.clone())),
        Arc::new(Int32Array::from(onsets)),
        Arc::new(Int32Array::from(offsets)),
        Arc::new(BooleanArray::from(onsets_found)),
        Arc::new(BooleanArray::from(offsets_found)),
    ];
    columns.extend(
        months
            .into_iter()
            .map(|values| Arc::new(Float32Array::from(values)) as ArrayRef),
    );

    let batch = RecordBatch::try_new(schema, columns)?;

    writer.write(&batch)?;

    writer.close()?;

    Ok(())
}

// -- Tests ---
