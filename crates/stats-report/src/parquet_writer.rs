use std::io::Write;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use arrow_array::builder::{Float64Builder, StringBuilder};
use arrow_array::{ArrayRef, RecordBatch};
use arrow_schema::{DataType, Field, Schema, SchemaRef};
use parquet::arrow::arrow_writer::ArrowWriter;

use crate::report::Report;

/// Component name used for the whole-run summary rows
pub const SUMMARY_COMPONENT: &str = "simulation";
/// Component name used for metrics spanning several components
pub const MISC_COMPONENT: &str = "misc";

/// Writes reports as one long Parquet table of unscaled values
pub struct ReportWriter<W: Write + Send> {
    writer: ArrowWriter<W>,
    schema: SchemaRef,
}

impl<W: Write + Send> ReportWriter<W> {
    pub fn new(writer: W) -> Result<Self> {
        let schema = Arc::new(Schema::new(vec![
            Field::new("file", DataType::Utf8, false),
            Field::new("component", DataType::Utf8, false),
            Field::new("metric", DataType::Utf8, false),
            Field::new("value", DataType::Float64, false),
        ]));

        let arrow_writer = ArrowWriter::try_new(writer, schema.clone(), None)
            .map_err(|e| anyhow!("Failed to create Arrow writer: {}", e))?;

        Ok(Self {
            writer: arrow_writer,
            schema,
        })
    }

    /// Appends every figure of one report
    pub fn write(&mut self, report: &Report) -> Result<()> {
        let batch = self.report_to_batch(report)?;

        self.writer
            .write(&batch)
            .map_err(|e| anyhow!("Failed to write batch to Parquet: {}", e))?;

        Ok(())
    }

    /// Closes the writer, finishing the Parquet file
    pub fn close(self) -> Result<()> {
        self.writer
            .close()
            .map(|_| ())
            .map_err(|e| anyhow!("Failed to close Parquet writer: {}", e))
    }

    fn report_to_batch(&self, report: &Report) -> Result<RecordBatch> {
        let mut rows: Vec<(&str, &str, f64)> = vec![
            (SUMMARY_COMPONENT, "instructions", report.summary.instructions),
            (SUMMARY_COMPONENT, "stats_dumps", report.summary.checkpoints as f64),
            (SUMMARY_COMPONENT, "warmup_percent", report.summary.warmup_fraction),
        ];
        for component in &report.components {
            for (metric_name, metric) in &component.metrics {
                rows.push((component.name.as_str(), *metric_name, metric.value));
            }
        }
        for (metric_name, metric) in &report.misc {
            rows.push((MISC_COMPONENT, metric_name.as_str(), metric.value));
        }

        let mut file_builder =
            StringBuilder::with_capacity(rows.len(), rows.len() * report.file.len());
        let mut component_builder = StringBuilder::with_capacity(rows.len(), rows.len() * 8);
        let mut metric_builder = StringBuilder::with_capacity(rows.len(), rows.len() * 24);
        let mut value_builder = Float64Builder::with_capacity(rows.len());

        for (component, metric, value) in rows {
            file_builder.append_value(&report.file);
            component_builder.append_value(component);
            metric_builder.append_value(metric);
            value_builder.append_value(value);
        }

        let arrays: Vec<ArrayRef> = vec![
            Arc::new(file_builder.finish()),
            Arc::new(component_builder.finish()),
            Arc::new(metric_builder.finish()),
            Arc::new(value_builder.finish()),
        ];

        RecordBatch::try_new(self.schema.clone(), arrays)
            .map_err(|e| anyhow!("Failed to create RecordBatch: {}", e))
    }
}
