//! CSV export of rendered frames.

use std::path::Path;

use ::csv::WriterBuilder;
use polars::prelude::*;
use tracing::debug;

use crate::error::{IngestError, Result};

/// Converts a cell to its CSV text. Null becomes an empty field.
pub fn cell_text(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        AnyValue::Boolean(b) => b.to_string(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::Float64(v) => v.to_string(),
        other => {
            let s = other.to_string();
            s.strip_prefix('"')
                .and_then(|s| s.strip_suffix('"'))
                .map(str::to_string)
                .unwrap_or(s)
        }
    }
}

/// Writes `df` to `path` with a header row.
pub fn write_csv_table(df: &DataFrame, path: &Path) -> Result<()> {
    let write_error = |source: ::csv::Error| IngestError::CsvWrite {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = WriterBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(write_error)?;

    writer
        .write_record(df.get_column_names().iter().map(|name| name.as_str()))
        .map_err(write_error)?;

    let columns = df.get_columns();
    for idx in 0..df.height() {
        let record = columns
            .iter()
            .map(|column| column.get(idx).map(cell_text))
            .collect::<PolarsResult<Vec<_>>>()?;
        writer.write_record(&record).map_err(write_error)?;
    }

    writer
        .flush()
        .map_err(|e| IngestError::io(path, e))?;

    debug!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "Wrote CSV"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(AnyValue::Null), "");
        assert_eq!(cell_text(AnyValue::Int64(42)), "42");
        assert_eq!(cell_text(AnyValue::Float64(1.5)), "1.5");
        assert_eq!(cell_text(AnyValue::Boolean(true)), "true");
        assert_eq!(cell_text(AnyValue::String("gb")), "gb");
    }

    #[test]
    fn test_write_csv_table() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let df = df!(
            "country" => [Some("gb"), None, Some("fr, north")],
            "age" => [Some(34i64), Some(51), None],
        )
        .unwrap();

        write_csv_table(&df, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "country,age\ngb,34\n,51\n\"fr, north\",\n");
    }
}
