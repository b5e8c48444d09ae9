//! Loads a long-form Parquet stats dump into memory.
//!
//! Each row holds one value: `component`, `counter`, `checkpoint`, `entity`,
//! `value`. Rows may come in any order, but every counter must have a value
//! for each (checkpoint, entity) pair.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use arrow_array::{Array, Int64Array, RecordBatch, StringArray};
use checkpoint::{Counter, InMemoryStats};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::file::reader::ChunkReader;

/// (checkpoint, entity) -> value
type Cells = BTreeMap<(usize, usize), Counter>;

/// Opens and fully reads a stats file. The file is closed on return.
pub fn load(path: &Path) -> Result<InMemoryStats> {
    let file =
        File::open(path).with_context(|| format!("Failed to open stats file: {}", path.display()))?;
    read_stats(file).with_context(|| format!("Failed to read stats file: {}", path.display()))
}

pub fn read_stats<R: ChunkReader + 'static>(reader: R) -> Result<InMemoryStats> {
    let arrow_reader = ParquetRecordBatchReaderBuilder::try_new(reader)
        .with_context(|| "Failed to create Parquet reader builder")?
        .build()
        .with_context(|| "Failed to build Arrow reader")?;

    let mut cells: BTreeMap<(String, String), Cells> = BTreeMap::new();
    for batch in arrow_reader {
        let batch = batch.with_context(|| "Failed to read record batch")?;
        collect_batch(&batch, &mut cells)?;
    }

    let mut stats = InMemoryStats::new();
    for ((component, counter), values) in cells {
        let samples = densify(&values)
            .with_context(|| format!("Incomplete series {}/{}", component, counter))?;
        stats.insert(&component, &counter, samples)?;
    }
    Ok(stats)
}

fn column<'a, T: Array + 'static>(batch: &'a RecordBatch, name: &str) -> Result<&'a T> {
    let column = batch
        .column_by_name(name)
        .ok_or_else(|| anyhow!("{} column not found", name))?;
    if column.null_count() > 0 {
        bail!("{} column contains nulls", name);
    }
    column
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| anyhow!("{} column has an unexpected type", name))
}

fn index(value: i64, name: &str) -> Result<usize> {
    usize::try_from(value).map_err(|_| anyhow!("negative {} index {}", name, value))
}

fn collect_batch(
    batch: &RecordBatch,
    cells: &mut BTreeMap<(String, String), Cells>,
) -> Result<()> {
    let component_col = column::<StringArray>(batch, "component")?;
    let counter_col = column::<StringArray>(batch, "counter")?;
    let checkpoint_col = column::<Int64Array>(batch, "checkpoint")?;
    let entity_col = column::<Int64Array>(batch, "entity")?;
    let value_col = column::<Int64Array>(batch, "value")?;

    for i in 0..batch.num_rows() {
        let key = (
            component_col.value(i).to_string(),
            counter_col.value(i).to_string(),
        );
        let cell = (
            index(checkpoint_col.value(i), "checkpoint")?,
            index(entity_col.value(i), "entity")?,
        );

        let series = cells.entry(key).or_default();
        if series.insert(cell, value_col.value(i)).is_some() {
            bail!(
                "duplicate value for {}/{} at checkpoint {} entity {}",
                component_col.value(i),
                counter_col.value(i),
                cell.0,
                cell.1
            );
        }
    }
    Ok(())
}

/// Turns sparse cells into one row per checkpoint
fn densify(cells: &Cells) -> Result<Vec<Vec<Counter>>> {
    let checkpoints = cells.keys().map(|(c, _)| c + 1).max().unwrap_or(0);
    let entities = cells.keys().map(|(_, e)| e + 1).max().unwrap_or(0);

    (0..checkpoints)
        .map(|checkpoint| {
            (0..entities)
                .map(|entity| {
                    cells.get(&(checkpoint, entity)).copied().ok_or_else(|| {
                        anyhow!("no value at checkpoint {} entity {}", checkpoint, entity)
                    })
                })
                .collect::<Result<Vec<_>>>()
        })
        .collect()
}
