//! Bank churn CSV reader.
//!
//! Loads the raw account table into a typed [`Dataset`] and derives the
//! binary `Churn` label from the `Attrition_Flag` status column, so the
//! pipeline core always sees a labeled dataset.
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use csv::StringRecord;

use crate::data::{Column, Dataset, CATEGORICAL_COLUMNS, RAW_NUMERIC_COLUMNS};
use crate::error::ChurnError;

const STAGE: &str = "ingestion";
const STATUS_COLUMN: &str = "Attrition_Flag";
const EXISTING_CUSTOMER: &str = "Existing Customer";

/// Read a bank churn CSV into a labeled dataset.
///
/// Fails with `DataNotFound` when the file is absent or has no data rows,
/// and with `MissingColumn` when a required header is not present.
pub fn read_bank_csv<P: AsRef<Path>>(path: P) -> Result<Dataset> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path).map_err(|_| ChurnError::DataNotFound {
        path: path.to_path_buf(),
    })?;

    let headers = reader
        .headers()
        .context("Failed to read CSV header row")?
        .clone();

    let status_idx = find_column(&headers, STATUS_COLUMN).ok_or(ChurnError::MissingColumn {
        column: STATUS_COLUMN,
        stage: STAGE,
    })?;

    let mut numeric_indices = Vec::with_capacity(RAW_NUMERIC_COLUMNS.len());
    for column in RAW_NUMERIC_COLUMNS {
        let idx = find_column(&headers, column.name()).ok_or(ChurnError::MissingColumn {
            column: column.name(),
            stage: STAGE,
        })?;
        numeric_indices.push((column, idx));
    }

    let mut categorical_indices = Vec::with_capacity(CATEGORICAL_COLUMNS.len());
    for column in CATEGORICAL_COLUMNS {
        let idx = find_column(&headers, column.name()).ok_or(ChurnError::MissingColumn {
            column: column.name(),
            stage: STAGE,
        })?;
        categorical_indices.push((column, idx));
    }

    let mut numeric_values: Vec<Vec<f64>> = vec![Vec::new(); numeric_indices.len()];
    let mut categorical_values: Vec<Vec<String>> = vec![Vec::new(); categorical_indices.len()];
    let mut churn = Vec::new();

    for (row_idx, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read row {}", row_idx + 1))?;

        let status = record
            .get(status_idx)
            .ok_or_else(|| anyhow!("Missing '{}' value at row {}", STATUS_COLUMN, row_idx + 1))?;
        churn.push(if status.trim() == EXISTING_CUSTOMER { 0.0 } else { 1.0 });

        for (slot, (column, idx)) in numeric_indices.iter().enumerate() {
            let value = record
                .get(*idx)
                .ok_or_else(|| anyhow!("Missing '{}' value at row {}", column.name(), row_idx + 1))?;
            let parsed = value.trim().parse::<f64>().with_context(|| {
                format!("Invalid value for '{}' at row {}", column.name(), row_idx + 1)
            })?;
            numeric_values[slot].push(parsed);
        }

        for (slot, (column, idx)) in categorical_indices.iter().enumerate() {
            let value = record
                .get(*idx)
                .ok_or_else(|| anyhow!("Missing '{}' value at row {}", column.name(), row_idx + 1))?;
            categorical_values[slot].push(value.trim().to_string());
        }
    }

    if churn.is_empty() {
        return Err(ChurnError::DataNotFound {
            path: path.to_path_buf(),
        }
        .into());
    }

    let mut data = Dataset::new(churn.len());
    data.insert_numeric(Column::Churn, churn);
    for ((column, _), values) in numeric_indices.into_iter().zip(numeric_values) {
        data.insert_numeric(column, values);
    }
    for ((column, _), values) in categorical_indices.into_iter().zip(categorical_values) {
        data.insert_categorical(column, values);
    }

    log::info!("loaded {} rows from '{}'", data.n_rows(), path.display());
    Ok(data)
}

fn find_column(headers: &StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|header| header.eq_ignore_ascii_case(name))
}
