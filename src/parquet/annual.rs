//! Save the annual mean series of a grid dataset to a parquet file.

use std::{fs::File, path::Path, sync::Arc};

use anyhow::{ensure, Result};
use arrow::{
    array::{ArrayRef, Float32Array, Int32Array},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use parquet::{arrow::ArrowWriter, file::properties::WriterProperties};

pub fn save_annual_means(years: &[i32], means: &[Option<f32>], file_path: &Path) -> Result<()> {
    ensure!(
        years.len() == means.len(),
        "{} years but {} means",
        years.len(),
        means.len()
    );

    let file = File::create(file_path)?;

    let schema = Arc::new(Schema::new(vec![
        Field::new("year", DataType::Int32, false),
        Field::new("mean", DataType::Float32, true),
    ]));

    let props = WriterProperties::builder()
        .set_compression(parquet::basic::Compression::SNAPPY)
        .build();

    let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;

    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int32Array::from(years.to_vec())),
        Arc::new(Float32Array::from(means.to_vec())),
    ];
    let batch = RecordBatch::try_new(schema, columns)?;

    writer.write(&batch)?;

    writer.close()?;

    Ok(())
}

// -- Tests ---
