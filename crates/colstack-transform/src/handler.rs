//! The stack handler: an ingested table plus the configuration rendered over it.

use std::path::Path;

use colstack_binning::group_labels;
use colstack_ingest::read_csv_table;
use colstack_model::{ColumnOptions, ColumnStack, ScalarType};
use polars::prelude::*;
use tracing::info;

use crate::error::{Result, TransformError};
use crate::frame::{text_values, write_text_column};
use crate::pipeline::{render_stack, resolve_type};

/// Owns the raw input frame, the column stack, and the last rendered frame.
///
/// Every [`render`](Self::render) starts again from the raw frame, so
/// amending the stack and re-rendering never compounds earlier results.
#[derive(Debug, Clone)]
pub struct StackHandler {
    raw: DataFrame,
    frame: DataFrame,
    stack: ColumnStack,
}

impl StackHandler {
    /// Wraps an ingested frame; the initial stack lists its columns.
    pub fn new(raw: DataFrame) -> Self {
        let stack = ColumnStack::from_names(
            raw.get_column_names()
                .into_iter()
                .map(ToString::to_string),
        );
        Self {
            frame: raw.clone(),
            raw,
            stack,
        }
    }

    /// Reads a CSV file and wraps it.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::Ingest`] if the file cannot be read.
    pub fn from_csv(path: &Path) -> Result<Self> {
        let raw = read_csv_table(path)?;
        info!(
            path = %path.display(),
            columns = ?raw.get_column_names(),
            "Ingested CSV file"
        );
        Ok(Self::new(raw))
    }

    pub fn stack(&self) -> &ColumnStack {
        &self.stack
    }

    /// Mutable access for amendments; call [`render`](Self::render) afterwards.
    pub fn stack_mut(&mut self) -> &mut ColumnStack {
        &mut self.stack
    }

    /// The last rendered frame.
    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn raw_frame(&self) -> &DataFrame {
        &self.raw
    }

    /// Replaces the stack and renders it.
    pub fn load(&mut self, stack: ColumnStack) -> Result<()> {
        self.stack = stack;
        self.render()
    }

    /// Parses a JSON configuration, replaces the stack and renders it.
    pub fn load_json(&mut self, json: &str) -> Result<()> {
        self.load(ColumnStack::from_json(json)?)
    }

    /// The stack configuration as JSON, with empty fields omitted.
    pub fn dump(&self) -> Result<serde_json::Value> {
        Ok(self.stack.to_json_value()?)
    }

    /// Appends the columns (and namespace entries) of `stack` and re-renders.
    pub fn append_columns(&mut self, stack: ColumnStack) -> Result<()> {
        self.stack.extend(stack);
        self.render()
    }

    /// Recomputes the frame from the raw input.
    ///
    /// On error the previous frame is kept.
    pub fn render(&mut self) -> Result<()> {
        self.frame = render_stack(&self.stack, &self.raw)?;
        info!(
            rows = self.frame.height(),
            columns = self.frame.width(),
            "Rendered column stack"
        );
        Ok(())
    }

    /// Stack column names in declaration order, each binned column followed
    /// by its label column.
    pub fn column_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.stack.column_options.len());
        for options in &self.stack.column_options {
            names.push(options.name.clone());
            if !options.bins.is_empty() {
                let output = options.binned_column_name();
                if output != options.name {
                    names.push(output);
                }
            }
        }
        names
    }

    /// Scalar type of a column of the rendered frame.
    pub fn column_type(&self, name: &str) -> Result<ScalarType> {
        resolve_type(&self.stack, &self.frame, name)
    }

    /// Groups the rows of a materialized label column by label.
    ///
    /// `column` may name a binned column (its label column is used) or a
    /// label column directly. Unlabelled rows are skipped.
    pub fn bin_groups(&self, column: &str) -> Result<Vec<(String, Vec<usize>)>> {
        let labels_name = self
            .stack
            .get(column)
            .filter(|options| !options.bins.is_empty())
            .map_or_else(|| column.to_string(), ColumnOptions::binned_column_name);
        let labels = self
            .frame
            .column(&labels_name)
            .map_err(|_| TransformError::ColumnNotFound {
                column: labels_name.clone(),
            })?;
        Ok(group_labels(&text_values(labels)?, None))
    }

    /// The rendered frame with every cell converted to display text.
    pub fn export_frame(&self) -> Result<DataFrame> {
        let columns = self
            .frame
            .get_columns()
            .iter()
            .map(|column| Ok(write_text_column(column.name(), text_values(column)?)))
            .collect::<Result<Vec<Column>>>()?;
        Ok(DataFrame::new(columns)?)
    }
}
