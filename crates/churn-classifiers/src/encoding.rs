//! Categorical target encoding.
//!
//! Each categorical column is mapped to a numeric `*_ChurnRate` column
//! whose value for a row is the mean churn label of all rows sharing that
//! row's category value. The row's own label participates in its group
//! mean; that is the behavior downstream numeric assertions depend on and
//! it must not be changed.
use std::collections::HashMap;

use crate::data::{Column, Dataset};
use crate::error::ChurnError;

const STAGE: &str = "target encoding";

/// Append one `*_ChurnRate` column per requested categorical column.
///
/// Fails with `MissingColumn` if the churn label or any requested
/// categorical column is absent. Mutates the dataset by column addition
/// only; the row count is unchanged.
pub fn encode_churn_rates(data: &mut Dataset, categories: &[Column]) -> Result<(), ChurnError> {
    let churn = data.require_numeric(Column::Churn, STAGE)?.to_vec();

    for &category in categories {
        let values = data.require_categorical(category, STAGE)?;

        let mut groups: HashMap<&str, (f64, usize)> = HashMap::new();
        for (value, &label) in values.iter().zip(churn.iter()) {
            let entry = groups.entry(value.as_str()).or_insert((0.0, 0));
            entry.0 += label;
            entry.1 += 1;
        }

        let means: HashMap<&str, f64> = groups
            .into_iter()
            .map(|(value, (sum, count))| (value, sum / count as f64))
            .collect();

        let rates: Vec<f64> = values.iter().map(|value| means[value.as_str()]).collect();

        let derived = category
            .churn_rate()
            .expect("categorical columns map to a churn-rate column");
        log::debug!(
            "encoded '{}' into '{}' ({} categories)",
            category.name(),
            derived.name(),
            means.len()
        );
        data.insert_numeric(derived, rates);
    }

    Ok(())
}
