//! Typed column table for the bank churn dataset.
//!
//! Columns are identified by the fixed [`Column`] enum rather than free-form
//! strings, so an unknown column is unrepresentable and `MissingColumn`
//! only ever means "a known column is absent from this dataset instance".
//! The table mutates by column addition only; the row count is fixed at
//! construction and never changes.
use std::collections::BTreeMap;

use crate::error::ChurnError;

/// Every column identifier the pipeline knows about: the raw numeric
/// account fields, the raw categorical fields, the binary churn label and
/// the derived target-encoded `*_ChurnRate` fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    CustomerAge,
    DependentCount,
    MonthsOnBook,
    TotalRelationshipCount,
    MonthsInactive12Mon,
    ContactsCount12Mon,
    CreditLimit,
    TotalRevolvingBal,
    AvgOpenToBuy,
    TotalAmtChngQ4Q1,
    TotalTransAmt,
    TotalTransCt,
    TotalCtChngQ4Q1,
    AvgUtilizationRatio,
    Gender,
    EducationLevel,
    MaritalStatus,
    IncomeCategory,
    CardCategory,
    Churn,
    GenderChurnRate,
    EducationLevelChurnRate,
    MaritalStatusChurnRate,
    IncomeCategoryChurnRate,
    CardCategoryChurnRate,
}

/// The raw numeric account fields, in source order.
pub const RAW_NUMERIC_COLUMNS: [Column; 14] = [
    Column::CustomerAge,
    Column::DependentCount,
    Column::MonthsOnBook,
    Column::TotalRelationshipCount,
    Column::MonthsInactive12Mon,
    Column::ContactsCount12Mon,
    Column::CreditLimit,
    Column::TotalRevolvingBal,
    Column::AvgOpenToBuy,
    Column::TotalAmtChngQ4Q1,
    Column::TotalTransAmt,
    Column::TotalTransCt,
    Column::TotalCtChngQ4Q1,
    Column::AvgUtilizationRatio,
];

/// The categorical fields that get target-encoded.
pub const CATEGORICAL_COLUMNS: [Column; 5] = [
    Column::Gender,
    Column::EducationLevel,
    Column::MaritalStatus,
    Column::IncomeCategory,
    Column::CardCategory,
];

impl Column {
    /// Header name of the column in the source data and in reports.
    pub fn name(self) -> &'static str {
        match self {
            Column::CustomerAge => "Customer_Age",
            Column::DependentCount => "Dependent_count",
            Column::MonthsOnBook => "Months_on_book",
            Column::TotalRelationshipCount => "Total_Relationship_Count",
            Column::MonthsInactive12Mon => "Months_Inactive_12_mon",
            Column::ContactsCount12Mon => "Contacts_Count_12_mon",
            Column::CreditLimit => "Credit_Limit",
            Column::TotalRevolvingBal => "Total_Revolving_Bal",
            Column::AvgOpenToBuy => "Avg_Open_To_Buy",
            Column::TotalAmtChngQ4Q1 => "Total_Amt_Chng_Q4_Q1",
            Column::TotalTransAmt => "Total_Trans_Amt",
            Column::TotalTransCt => "Total_Trans_Ct",
            Column::TotalCtChngQ4Q1 => "Total_Ct_Chng_Q4_Q1",
            Column::AvgUtilizationRatio => "Avg_Utilization_Ratio",
            Column::Gender => "Gender",
            Column::EducationLevel => "Education_Level",
            Column::MaritalStatus => "Marital_Status",
            Column::IncomeCategory => "Income_Category",
            Column::CardCategory => "Card_Category",
            Column::Churn => "Churn",
            Column::GenderChurnRate => "Gender_ChurnRate",
            Column::EducationLevelChurnRate => "Education_Level_ChurnRate",
            Column::MaritalStatusChurnRate => "Marital_Status_ChurnRate",
            Column::IncomeCategoryChurnRate => "Income_Category_ChurnRate",
            Column::CardCategoryChurnRate => "Card_Category_ChurnRate",
        }
    }

    /// The derived `*_ChurnRate` column for a categorical column, if any.
    pub fn churn_rate(self) -> Option<Column> {
        match self {
            Column::Gender => Some(Column::GenderChurnRate),
            Column::EducationLevel => Some(Column::EducationLevelChurnRate),
            Column::MaritalStatus => Some(Column::MaritalStatusChurnRate),
            Column::IncomeCategory => Some(Column::IncomeCategoryChurnRate),
            Column::CardCategory => Some(Column::CardCategoryChurnRate),
            _ => None,
        }
    }
}

/// An in-memory labeled dataset: a fixed number of rows and a growing set
/// of named columns, numeric or categorical.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    n_rows: usize,
    numeric: BTreeMap<Column, Vec<f64>>,
    categorical: BTreeMap<Column, Vec<String>>,
}

impl Dataset {
    pub fn new(n_rows: usize) -> Self {
        Dataset {
            n_rows,
            numeric: BTreeMap::new(),
            categorical: BTreeMap::new(),
        }
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Add a numeric column. Panics if the length does not match the row
    /// count; callers inside this crate only build row-aligned columns.
    pub fn insert_numeric(&mut self, column: Column, values: Vec<f64>) {
        assert_eq!(
            values.len(),
            self.n_rows,
            "column '{}' has {} values for {} rows",
            column.name(),
            values.len(),
            self.n_rows
        );
        self.numeric.insert(column, values);
    }

    /// Add a categorical column. Same length contract as `insert_numeric`.
    pub fn insert_categorical(&mut self, column: Column, values: Vec<String>) {
        assert_eq!(
            values.len(),
            self.n_rows,
            "column '{}' has {} values for {} rows",
            column.name(),
            values.len(),
            self.n_rows
        );
        self.categorical.insert(column, values);
    }

    pub fn numeric(&self, column: Column) -> Option<&[f64]> {
        self.numeric.get(&column).map(Vec::as_slice)
    }

    pub fn categorical(&self, column: Column) -> Option<&[String]> {
        self.categorical.get(&column).map(Vec::as_slice)
    }

    pub fn has_numeric(&self, column: Column) -> bool {
        self.numeric.contains_key(&column)
    }

    /// Numeric column lookup that fails with `MissingColumn` naming the
    /// pipeline stage that needed it.
    pub fn require_numeric(
        &self,
        column: Column,
        stage: &'static str,
    ) -> Result<&[f64], ChurnError> {
        self.numeric(column).ok_or(ChurnError::MissingColumn {
            column: column.name(),
            stage,
        })
    }

    pub fn require_categorical(
        &self,
        column: Column,
        stage: &'static str,
    ) -> Result<&[String], ChurnError> {
        self.categorical(column).ok_or(ChurnError::MissingColumn {
            column: column.name(),
            stage,
        })
    }

    /// All numeric columns currently present, in `Column` order.
    pub fn numeric_columns(&self) -> impl Iterator<Item = (Column, &[f64])> {
        self.numeric.iter().map(|(c, v)| (*c, v.as_slice()))
    }

    /// Drop a column. Only exists so tests can simulate malformed inputs.
    #[doc(hidden)]
    pub fn remove_column(&mut self, column: Column) {
        self.numeric.remove(&column);
        self.categorical.remove(&column);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChurnError;

    #[test]
    fn require_numeric_reports_missing_column() {
        let data = Dataset::new(3);
        let err = data
            .require_numeric(Column::CreditLimit, "feature selection")
            .unwrap_err();
        match err {
            ChurnError::MissingColumn { column, stage } => {
                assert_eq!(column, "Credit_Limit");
                assert_eq!(stage, "feature selection");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn insert_and_read_back() {
        let mut data = Dataset::new(2);
        data.insert_numeric(Column::Churn, vec![0.0, 1.0]);
        data.insert_categorical(Column::Gender, vec!["F".into(), "M".into()]);
        assert_eq!(data.numeric(Column::Churn), Some(&[0.0, 1.0][..]));
        assert_eq!(data.categorical(Column::Gender).unwrap().len(), 2);
        assert_eq!(data.n_rows(), 2);
    }

    #[test]
    #[should_panic]
    fn mismatched_column_length_panics() {
        let mut data = Dataset::new(3);
        data.insert_numeric(Column::Churn, vec![0.0]);
    }

    #[test]
    fn every_categorical_column_maps_to_a_churn_rate_column() {
        for column in CATEGORICAL_COLUMNS {
            let derived = column.churn_rate().unwrap();
            assert!(derived.name().ends_with("_ChurnRate"));
        }
        assert!(Column::CreditLimit.churn_rate().is_none());
    }
}
