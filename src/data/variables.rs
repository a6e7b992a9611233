//! External continuous variables used as regression predictors.

use super::table::MetaboliteTable;
use crate::error::{MetaboError, Result};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Name of the mandatory first column of a variable table.
pub const VARIABLE_COLUMN: &str = "Variable";

/// Table of external variables (rows) measured on the pool samples (columns).
#[derive(Debug, Clone, PartialEq)]
pub struct VariableTable {
    inner: MetaboliteTable,
}

impl VariableTable {
    /// Load from a tab-separated file.
    ///
    /// Returns `Ok(None)` when the sample columns are not exactly the pool
    /// table's sample columns, in which case the upload is ignored.
    pub fn from_tsv<P: AsRef<Path>>(path: P, pool_samples: &[String]) -> Result<Option<Self>> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file), b'\t', pool_samples)
    }

    /// Parse from any reader; see [`VariableTable::from_tsv`].
    pub fn from_reader<R: Read>(
        reader: R,
        delimiter: u8,
        pool_samples: &[String],
    ) -> Result<Option<Self>> {
        let inner = MetaboliteTable::from_reader_keyed(reader, delimiter, VARIABLE_COLUMN)?;
        let ours: HashSet<&String> = inner.sample_ids().iter().collect();
        let theirs: HashSet<&String> = pool_samples.iter().collect();
        if ours != theirs || inner.n_samples() != pool_samples.len() {
            log::warn!("variable table columns do not match the pool samples; ignoring it");
            return Ok(None);
        }
        Ok(Some(Self { inner }))
    }

    /// Build directly from rows.
    pub fn from_rows(variables: &[&str], sample_ids: &[&str], rows: &[Vec<f64>]) -> Result<Self> {
        Ok(Self {
            inner: MetaboliteTable::from_rows(variables, sample_ids, rows)?,
        })
    }

    /// Variable names in file order.
    pub fn names(&self) -> &[String] {
        self.inner.compounds()
    }

    pub fn sample_ids(&self) -> &[String] {
        self.inner.sample_ids()
    }

    /// Values of a variable at the given samples, in the given order.
    pub fn values_for<S: AsRef<str>>(&self, variable: &str, samples: &[S]) -> Result<Vec<f64>> {
        let row = self.inner.find_compound(variable).ok_or_else(|| {
            MetaboError::InvalidParameter(format!("Unknown external variable '{}'", variable))
        })?;
        let cols = self.inner.sample_indices(samples)?;
        Ok(self.inner.values(row, &cols))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool_samples() -> Vec<String> {
        vec!["S1".to_string(), "S2".to_string(), "S3".to_string()]
    }

    #[test]
    fn test_matching_columns_in_any_order() {
        let tsv = "Variable\tS3\tS1\tS2\nweight\t3\t1\t2\n";
        let vars = VariableTable::from_reader(tsv.as_bytes(), b'\t', &pool_samples())
            .unwrap()
            .unwrap();
        assert_eq!(vars.names(), &["weight"]);
        assert_eq!(vars.values_for("weight", &["S1", "S2", "S3"]).unwrap(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_mismatched_columns_mean_absent() {
        let tsv = "Variable\tS1\tS2\nweight\t1\t2\n";
        let vars = VariableTable::from_reader(tsv.as_bytes(), b'\t', &pool_samples()).unwrap();
        assert!(vars.is_none());
    }

    #[test]
    fn test_wrong_first_column() {
        let tsv = "Compound\tS1\tS2\tS3\nweight\t1\t2\t3\n";
        let result = VariableTable::from_reader(tsv.as_bytes(), b'\t', &pool_samples());
        assert!(matches!(result, Err(MetaboError::InvalidHeader(_))));
    }

    #[test]
    fn test_unknown_variable() {
        let vars = VariableTable::from_rows(&["weight"], &["S1"], &[vec![1.0]]).unwrap();
        assert!(vars.values_for("height", &["S1"]).is_err());
    }
}
