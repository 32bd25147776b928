//! Data loading and inspection using Polars

use crate::record::{RawTable, Record, Value};
use anyhow::Context;
use polars::prelude::*;
use std::collections::HashSet;
use std::fmt;
use tracing::{info, warn};

/// Loaded customer dataset: the Polars frame for inspection and the row view
/// consumed by schema derivation.
#[derive(Debug)]
pub struct CustomerData {
    pub frame: DataFrame,
    pub table: RawTable,
}

/// Shape, dtypes, null and duplicate counts plus numeric summaries.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSummary {
    pub rows: usize,
    pub columns: Vec<String>,
    pub dtypes: Vec<String>,
    pub null_counts: Vec<usize>,
    pub duplicate_rows: usize,
    pub numeric: Vec<NumericSummary>,
}

/// Count, mean, standard deviation, min, quartiles and max of one numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericSummary {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

/// Load a CSV file with a header row.
///
/// Numeric columns become [`Value::Number`]; everything else is read as text.
/// Null cells are left out of the row's record.
pub fn load_customer_data(file_path: &str) -> crate::Result<CustomerData> {
    let frame = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(file_path.into()))
        .with_context(|| format!("Failed to open {}", file_path))?
        .finish()
        .with_context(|| format!("Failed to parse CSV {}", file_path))?;

    if frame.height() == 0 {
        anyhow::bail!("No rows found in {}", file_path);
    }

    let table = frame_to_table(&frame)?;
    info!(rows = table.height(), columns = table.columns().len(), "loaded dataset");

    Ok(CustomerData { frame, table })
}

fn frame_to_table(frame: &DataFrame) -> crate::Result<RawTable> {
    let columns: Vec<String> = frame
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    let mut rows = vec![Record::new(); frame.height()];

    for series in frame.get_columns() {
        let name = series.name().to_string();
        if series.dtype().is_numeric() {
            let floats = series.cast(&DataType::Float64)?;
            for (row, value) in rows.iter_mut().zip(floats.f64()?.into_iter()) {
                if let Some(value) = value {
                    row.insert(name.clone(), Value::Number(value));
                }
            }
        } else {
            let strings = series.cast(&DataType::String)?;
            for (row, value) in rows.iter_mut().zip(strings.str()?.into_iter()) {
                if let Some(value) = value {
                    row.insert(name.clone(), Value::from(value));
                }
            }
        }
    }

    Ok(RawTable::new(columns, rows))
}

impl CustomerData {
    pub fn summary(&self) -> DatasetSummary {
        let columns: Vec<String> = self.table.columns().to_vec();
        let dtypes = self.frame.dtypes().iter().map(|d| d.to_string()).collect();
        let null_counts = self
            .frame
            .get_columns()
            .iter()
            .map(|s| s.null_count())
            .collect();

        let numeric = self
            .frame
            .get_columns()
            .iter()
            .filter(|s| s.dtype().is_numeric())
            .filter_map(|s| {
                let values: Vec<f64> = self
                    .table
                    .column(s.name())
                    .flatten()
                    .filter_map(Value::as_number)
                    .collect();
                describe(s.name(), values)
            })
            .collect();

        DatasetSummary {
            rows: self.table.height(),
            columns,
            dtypes,
            null_counts,
            duplicate_rows: count_duplicates(&self.table),
            numeric,
        }
    }
}

/// Number of rows identical to an earlier row across every column.
pub fn count_duplicates(table: &RawTable) -> usize {
    let mut seen = HashSet::with_capacity(table.height());
    table
        .rows()
        .iter()
        .filter(|row| {
            let key: Vec<String> = table
                .columns()
                .iter()
                .map(|c| row.get(c).map(|v| v.to_string()).unwrap_or_default())
                .collect();
            !seen.insert(key)
        })
        .count()
}

fn describe(column: &str, mut values: Vec<f64>) -> Option<NumericSummary> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));

    let count = values.len();
    let mean = values.iter().sum::<f64>() / count as f64;
    let std = if count > 1 {
        (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64).sqrt()
    } else {
        f64::NAN
    };

    Some(NumericSummary {
        column: column.to_string(),
        count,
        mean,
        std,
        min: values[0],
        q25: quantile(&values, 0.25),
        median: quantile(&values, 0.5),
        q75: quantile(&values, 0.75),
        max: values[count - 1],
    })
}

/// Linear-interpolated quantile of sorted, non-empty data.
pub(crate) fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Drop rows whose required numeric attributes are missing or non-numeric.
///
/// Returns the cleaned table and the number of rows removed.
pub fn drop_invalid_numeric(table: RawTable, numeric: &[&str]) -> (RawTable, usize) {
    let (kept, dropped) = table.partition(|row| {
        numeric
            .iter()
            .all(|attr| row.get(attr).and_then(Value::as_number).is_some())
    });
    if dropped.height() > 0 {
        warn!(
            dropped = dropped.height(),
            attributes = ?numeric,
            "dropping rows with non-numeric values"
        );
    }
    (kept, dropped.height())
}

impl fmt::Display for DatasetSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Shape: ({}, {})", self.rows, self.columns.len())?;
        writeln!(f, "Columns: {:?}", self.columns)?;
        writeln!(f, "\n{:<20} {:<10} {:>6}", "Column", "Dtype", "Nulls")?;
        for ((column, dtype), nulls) in self
            .columns
            .iter()
            .zip(self.dtypes.iter())
            .zip(self.null_counts.iter())
        {
            writeln!(f, "{:<20} {:<10} {:>6}", column, dtype, nulls)?;
        }
        writeln!(f, "\nDuplicate rows: {}", self.duplicate_rows)?;

        if !self.numeric.is_empty() {
            writeln!(
                f,
                "\n{:<16} {:>7} {:>10} {:>10} {:>9} {:>9} {:>9} {:>9} {:>9}",
                "", "count", "mean", "std", "min", "25%", "50%", "75%", "max"
            )?;
            for s in &self.numeric {
                writeln!(
                    f,
                    "{:<16} {:>7} {:>10.2} {:>10.2} {:>9.2} {:>9.2} {:>9.2} {:>9.2} {:>9.2}",
                    s.column, s.count, s.mean, s.std, s.min, s.q25, s.median, s.q75, s.max
                )?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_csv() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "customerID,gender,SeniorCitizen,tenure,TotalCharges,Churn").unwrap();
        writeln!(file, "7590-VHVEG,Female,0,1,29.85,No").unwrap();
        writeln!(file, "5575-GNVDE,Male,0,34,1889.5,No").unwrap();
        writeln!(file, "3668-QPYBK,Male,0,2,108.15,Yes").unwrap();
        writeln!(file, "4472-LVYGI,Female,0,0, ,No").unwrap();
        writeln!(file, "3668-QPYBK,Male,0,2,108.15,Yes").unwrap();
        file
    }

    #[test]
    fn test_load_customer_data() {
        let file = create_test_csv();
        let data = load_customer_data(file.path().to_str().unwrap()).unwrap();

        assert_eq!(data.table.height(), 5);
        assert_eq!(data.table.columns().len(), 6);
        assert_eq!(
            data.table.rows()[0].get("tenure").and_then(Value::as_number),
            Some(1.0)
        );
        assert_eq!(data.table.rows()[1].get("gender"), Some(&Value::from("Male")));
    }

    #[test]
    fn test_summary() {
        let file = create_test_csv();
        let data = load_customer_data(file.path().to_str().unwrap()).unwrap();
        let summary = data.summary();

        assert_eq!(summary.rows, 5);
        assert_eq!(summary.duplicate_rows, 1);
        let tenure = summary.numeric.iter().find(|s| s.column == "tenure").unwrap();
        assert_eq!(tenure.count, 5);
        assert_eq!(tenure.min, 0.0);
        assert_eq!(tenure.max, 34.0);
        assert_eq!(tenure.median, 2.0);
        assert!(summary.to_string().contains("Duplicate rows: 1"));
    }

    #[test]
    fn test_drop_invalid_numeric() {
        let file = create_test_csv();
        let data = load_customer_data(file.path().to_str().unwrap()).unwrap();
        let (clean, dropped) = drop_invalid_numeric(data.table, &["tenure", "TotalCharges"]);
        assert_eq!(dropped, 1);
        assert_eq!(clean.height(), 4);
    }

    #[test]
    fn test_quantile_interpolates() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&sorted, 0.5), 2.5);
        assert_eq!(quantile(&sorted, 0.25), 1.75);
        assert_eq!(quantile(&sorted, 1.0), 4.0);
    }

    #[test]
    fn test_missing_file() {
        assert!(load_customer_data("does/not/exist.csv").is_err());
    }
}
