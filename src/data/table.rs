//! Compound-indexed metabolite table with dense storage.

use crate::error::{MetaboError, Result};
use nalgebra::DMatrix;
use regex::Regex;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Name of the mandatory first column of every uploaded table.
pub const COMPOUND_COLUMN: &str = "Compound";
/// Optional metadata column carrying the metabolite class.
pub const PATHWAY_CLASS_COLUMN: &str = "pathway_class";
/// Metadata column carrying the isotopologue label number.
pub const C_LABEL_COLUMN: &str = "C_Label";

/// A dense table of metabolite measurements.
///
/// Rows are compounds, columns are samples. Missing measurements are stored
/// as NaN; an exact `0.0` means "not detected" and is kept distinct from
/// missing throughout the pipeline.
///
/// Two optional metadata columns travel with the rows: the pathway class
/// (attached by class grouping) and the isotopologue `C_Label`.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaboliteTable {
    /// Values (compounds × samples).
    data: DMatrix<f64>,
    /// Compound names (row labels).
    compounds: Vec<String>,
    /// Sample identifiers (column labels).
    sample_ids: Vec<String>,
    /// Pathway class per row, if attached.
    pathway_classes: Option<Vec<String>>,
    /// Isotopologue label per row, if this is an isotopologue table.
    c_labels: Option<Vec<i64>>,
}

impl MetaboliteTable {
    /// Create a new table from a matrix and identifiers.
    pub fn new(
        data: DMatrix<f64>,
        compounds: Vec<String>,
        sample_ids: Vec<String>,
    ) -> Result<Self> {
        let (nrows, ncols) = data.shape();
        if nrows != compounds.len() {
            return Err(MetaboError::DimensionMismatch {
                expected: nrows,
                actual: compounds.len(),
            });
        }
        if ncols != sample_ids.len() {
            return Err(MetaboError::DimensionMismatch {
                expected: ncols,
                actual: sample_ids.len(),
            });
        }
        Ok(Self {
            data,
            compounds,
            sample_ids,
            pathway_classes: None,
            c_labels: None,
        })
    }

    /// Build a table from row vectors.
    pub fn from_rows(compounds: &[&str], sample_ids: &[&str], rows: &[Vec<f64>]) -> Result<Self> {
        if rows.len() != compounds.len() {
            return Err(MetaboError::DimensionMismatch {
                expected: compounds.len(),
                actual: rows.len(),
            });
        }
        let mut data = DMatrix::zeros(rows.len(), sample_ids.len());
        for (i, row) in rows.iter().enumerate() {
            if row.len() != sample_ids.len() {
                return Err(MetaboError::DimensionMismatch {
                    expected: sample_ids.len(),
                    actual: row.len(),
                });
            }
            for (j, &value) in row.iter().enumerate() {
                data[(i, j)] = value;
            }
        }
        Self::new(
            data,
            compounds.iter().map(|s| s.to_string()).collect(),
            sample_ids.iter().map(|s| s.to_string()).collect(),
        )
    }

    /// Attach a pathway class to every row.
    pub fn with_pathway_classes(mut self, classes: Vec<String>) -> Result<Self> {
        if classes.len() != self.n_compounds() {
            return Err(MetaboError::DimensionMismatch {
                expected: self.n_compounds(),
                actual: classes.len(),
            });
        }
        self.pathway_classes = Some(classes);
        Ok(self)
    }

    /// Attach isotopologue labels to every row.
    pub fn with_c_labels(mut self, labels: Vec<i64>) -> Result<Self> {
        if labels.len() != self.n_compounds() {
            return Err(MetaboError::DimensionMismatch {
                expected: self.n_compounds(),
                actual: labels.len(),
            });
        }
        self.c_labels = Some(labels);
        Ok(self)
    }

    /// Assign the same pathway class to all rows.
    pub fn with_uniform_pathway_class(self, class: &str) -> Self {
        let n = self.n_compounds();
        Self {
            pathway_classes: Some(vec![class.to_string(); n]),
            ..self
        }
    }

    /// Drop the pathway class column.
    pub fn without_pathway_classes(mut self) -> Self {
        self.pathway_classes = None;
        self
    }

    /// Number of compound rows.
    #[inline]
    pub fn n_compounds(&self) -> usize {
        self.data.nrows()
    }

    /// Number of sample columns.
    #[inline]
    pub fn n_samples(&self) -> usize {
        self.data.ncols()
    }

    /// True when the table has no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n_compounds() == 0
    }

    /// Compound names.
    #[inline]
    pub fn compounds(&self) -> &[String] {
        &self.compounds
    }

    /// Sample identifiers.
    #[inline]
    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    /// Pathway class per row, if attached.
    #[inline]
    pub fn pathway_classes(&self) -> Option<&[String]> {
        self.pathway_classes.as_deref()
    }

    /// Isotopologue labels per row, if present.
    #[inline]
    pub fn c_labels(&self) -> Option<&[i64]> {
        self.c_labels.as_deref()
    }

    /// Underlying matrix.
    #[inline]
    pub fn data(&self) -> &DMatrix<f64> {
        &self.data
    }

    /// Value at (row, col).
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[(row, col)]
    }

    /// A full row as a vector.
    pub fn row(&self, row: usize) -> Vec<f64> {
        self.data.row(row).iter().copied().collect()
    }

    /// Values of one row at the given column indices.
    pub fn values(&self, row: usize, cols: &[usize]) -> Vec<f64> {
        cols.iter().map(|&c| self.data[(row, c)]).collect()
    }

    /// Indices of all rows carrying the given compound name.
    pub fn compound_rows(&self, compound: &str) -> Vec<usize> {
        self.compounds
            .iter()
            .enumerate()
            .filter(|(_, c)| c.as_str() == compound)
            .map(|(i, _)| i)
            .collect()
    }

    /// Index of the first row carrying the given compound name.
    pub fn find_compound(&self, compound: &str) -> Option<usize> {
        self.compounds.iter().position(|c| c == compound)
    }

    /// Column index of a sample.
    pub fn sample_index(&self, sample: &str) -> Option<usize> {
        self.sample_ids.iter().position(|s| s == sample)
    }

    /// Column indices of the given samples, in the given order.
    pub fn sample_indices<S: AsRef<str>>(&self, samples: &[S]) -> Result<Vec<usize>> {
        samples
            .iter()
            .map(|s| {
                self.sample_index(s.as_ref())
                    .ok_or_else(|| MetaboError::MissingColumn(s.as_ref().to_string()))
            })
            .collect()
    }

    /// Rows at the given indices; indices must be in bounds.
    pub(crate) fn take_rows(&self, indices: &[usize]) -> Self {
        let mut data = DMatrix::zeros(indices.len(), self.n_samples());
        for (new_row, &old_row) in indices.iter().enumerate() {
            data.set_row(new_row, &self.data.row(old_row));
        }
        Self {
            data,
            compounds: indices.iter().map(|&i| self.compounds[i].clone()).collect(),
            sample_ids: self.sample_ids.clone(),
            pathway_classes: self
                .pathway_classes
                .as_ref()
                .map(|pc| indices.iter().map(|&i| pc[i].clone()).collect()),
            c_labels: self
                .c_labels
                .as_ref()
                .map(|cl| indices.iter().map(|&i| cl[i]).collect()),
        }
    }

    /// Subset the table to the given row indices.
    pub fn subset_rows(&self, indices: &[usize]) -> Result<Self> {
        if let Some(&bad) = indices.iter().find(|&&i| i >= self.n_compounds()) {
            return Err(MetaboError::InvalidParameter(format!(
                "Row index {} out of bounds",
                bad
            )));
        }
        Ok(self.take_rows(indices))
    }

    /// Keep only the given compounds, in the given order.
    ///
    /// Every requested compound must be present; the first matching row is used.
    pub fn select_compounds<S: AsRef<str>>(&self, compounds: &[S]) -> Result<Self> {
        let indices = compounds
            .iter()
            .map(|c| {
                self.find_compound(c.as_ref())
                    .ok_or_else(|| MetaboError::UnknownCompound(c.as_ref().to_string()))
            })
            .collect::<Result<Vec<usize>>>()?;
        Ok(self.take_rows(&indices))
    }

    /// Keep only the given sample columns, in the given order.
    pub fn select_samples<S: AsRef<str>>(&self, samples: &[S]) -> Result<Self> {
        let cols = self.sample_indices(samples)?;
        let mut data = DMatrix::zeros(self.n_compounds(), cols.len());
        for (new_col, &old_col) in cols.iter().enumerate() {
            data.set_column(new_col, &self.data.column(old_col));
        }
        Ok(Self {
            data,
            compounds: self.compounds.clone(),
            sample_ids: cols.iter().map(|&c| self.sample_ids[c].clone()).collect(),
            pathway_classes: self.pathway_classes.clone(),
            c_labels: self.c_labels.clone(),
        })
    }

    /// Keep the first row of every compound and drop later duplicates.
    pub fn dedup_compounds(&self) -> Self {
        let mut seen = HashSet::new();
        let keep: Vec<usize> = (0..self.n_compounds())
            .filter(|&i| seen.insert(self.compounds[i].as_str()))
            .collect();
        if keep.len() < self.n_compounds() {
            log::debug!(
                "dropped {} duplicate compound rows",
                self.n_compounds() - keep.len()
            );
        }
        self.take_rows(&keep)
    }

    /// Append the rows of `other` below this table.
    ///
    /// Both tables must have identical sample columns. Metadata columns are
    /// kept only if both tables carry them.
    pub fn concat(&self, other: &MetaboliteTable) -> Result<Self> {
        if self.sample_ids != other.sample_ids {
            return Err(MetaboError::InvalidParameter(
                "Cannot concatenate tables with different sample columns".to_string(),
            ));
        }
        let n = self.n_compounds() + other.n_compounds();
        let mut data = DMatrix::zeros(n, self.n_samples());
        for i in 0..self.n_compounds() {
            data.set_row(i, &self.data.row(i));
        }
        for i in 0..other.n_compounds() {
            data.set_row(self.n_compounds() + i, &other.data.row(i));
        }
        let compounds = self
            .compounds
            .iter()
            .chain(other.compounds.iter())
            .cloned()
            .collect();
        let pathway_classes = match (&self.pathway_classes, &other.pathway_classes) {
            (Some(a), Some(b)) => Some(a.iter().chain(b.iter()).cloned().collect()),
            _ => None,
        };
        let c_labels = match (&self.c_labels, &other.c_labels) {
            (Some(a), Some(b)) => Some(a.iter().chain(b.iter()).copied().collect()),
            _ => None,
        };
        Ok(Self {
            data,
            compounds,
            sample_ids: self.sample_ids.clone(),
            pathway_classes,
            c_labels,
        })
    }

    /// Apply `f` to every cell, keeping labels and metadata.
    pub(crate) fn map_values<F: Fn(f64) -> f64>(&self, f: F) -> Self {
        Self {
            data: self.data.map(f),
            ..self.clone()
        }
    }

    /// Replace the value matrix, keeping labels and metadata.
    pub(crate) fn with_data(&self, data: DMatrix<f64>) -> Self {
        debug_assert_eq!(data.shape(), self.data.shape());
        Self {
            data,
            ..self.clone()
        }
    }

    /// Load a table from a tab-separated file.
    ///
    /// Expected format:
    /// - First row: header; the first column must be `Compound`
    /// - Optional `pathway_class` and `C_Label` columns anywhere after it
    /// - All other columns are numeric sample columns
    ///
    /// Header whitespace is removed, and headers containing quote characters
    /// are rejected. Empty, `NA` and `NaN` cells are read as missing.
    pub fn from_tsv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file), b'\t')
    }

    /// Load a table from a comma-separated file.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file), b',')
    }

    /// Load an isotopologue table from a tab-separated file.
    ///
    /// Returns `Ok(None)` when the `C_Label` column is absent, or when every
    /// label is zero or missing: such an upload carries no labelling data.
    pub fn isotopologue_from_tsv<P: AsRef<Path>>(path: P) -> Result<Option<Self>> {
        let table = Self::from_tsv(path)?;
        Ok(table.c_labels.is_some().then_some(table))
    }

    /// Parse a table from any reader with the given delimiter.
    pub fn from_reader<R: Read>(reader: R, delimiter: u8) -> Result<Self> {
        Self::from_reader_keyed(reader, delimiter, COMPOUND_COLUMN)
    }

    /// Parse a table whose first column is named `key_column`.
    ///
    /// The header line is validated as written, before any CSV unquoting.
    pub(crate) fn from_reader_keyed<R: Read>(
        reader: R,
        delimiter: u8,
        key_column: &str,
    ) -> Result<Self> {
        let mut reader = BufReader::new(reader);
        let mut header_line = String::new();
        reader.read_line(&mut header_line)?;
        let headers = clean_headers(
            header_line
                .trim_end_matches(['\r', '\n'])
                .split(char::from(delimiter)),
        )?;

        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .flexible(true)
            .quoting(delimiter != b'\t')
            .from_reader(reader);

        if headers.first().map(String::as_str) != Some(key_column) {
            return Err(MetaboError::InvalidHeader(format!(
                "The first column should be named '{}'",
                key_column
            )));
        }

        let class_col = headers.iter().position(|h| h == PATHWAY_CLASS_COLUMN);
        let label_col = headers.iter().position(|h| h == C_LABEL_COLUMN);
        let sample_cols: Vec<usize> = (1..headers.len())
            .filter(|&i| Some(i) != class_col && Some(i) != label_col)
            .collect();
        let sample_ids: Vec<String> = sample_cols.iter().map(|&i| headers[i].clone()).collect();

        let mut compounds = Vec::new();
        let mut classes = Vec::new();
        let mut raw_labels = Vec::new();
        let mut values: Vec<f64> = Vec::new();

        for (row_idx, record) in rdr.records().enumerate() {
            let record = record?;
            if record.iter().all(|f| f.trim().is_empty()) {
                continue;
            }
            compounds.push(record.get(0).unwrap_or("").trim().to_string());
            if let Some(c) = class_col {
                classes.push(record.get(c).unwrap_or("").trim().to_string());
            }
            if let Some(c) = label_col {
                raw_labels.push(parse_cell(record.get(c).unwrap_or(""), row_idx, C_LABEL_COLUMN)?);
            }
            for &c in &sample_cols {
                values.push(parse_cell(record.get(c).unwrap_or(""), row_idx, &headers[c])?);
            }
        }

        if compounds.is_empty() {
            return Err(MetaboError::EmptyData("No compound rows in table".to_string()));
        }

        let data = DMatrix::from_row_slice(compounds.len(), sample_ids.len(), &values);
        let mut table = Self::new(data, compounds, sample_ids)?;
        if class_col.is_some() {
            table = table.with_pathway_classes(classes)?;
        }
        if label_col.is_some() {
            if let Some(labels) = labels_if_present(&raw_labels)? {
                table = table.with_c_labels(labels)?;
            } else {
                log::info!("C_Label column is all zero or missing; ignoring isotopologue labels");
            }
        }
        Ok(table)
    }

    /// Write the table to a tab-separated file.
    pub fn to_tsv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        self.to_writer(BufWriter::new(file))
    }

    /// Write the table as TSV to any writer.
    pub fn to_writer<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .from_writer(writer);

        let mut header = vec![COMPOUND_COLUMN.to_string()];
        if self.pathway_classes.is_some() {
            header.push(PATHWAY_CLASS_COLUMN.to_string());
        }
        if self.c_labels.is_some() {
            header.push(C_LABEL_COLUMN.to_string());
        }
        header.extend(self.sample_ids.iter().cloned());
        wtr.write_record(&header)?;

        for row in 0..self.n_compounds() {
            let mut record = vec![self.compounds[row].clone()];
            if let Some(pc) = &self.pathway_classes {
                record.push(pc[row].clone());
            }
            if let Some(cl) = &self.c_labels {
                record.push(cl[row].to_string());
            }
            record.extend((0..self.n_samples()).map(|col| format_value(self.get(row, col))));
            wtr.write_record(&record)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

/// Strip all whitespace from headers and reject quote characters.
pub(crate) fn clean_headers<'a, I: Iterator<Item = &'a str>>(raw: I) -> Result<Vec<String>> {
    let whitespace =
        Regex::new(r"\s+").map_err(|e| MetaboError::InvalidParameter(e.to_string()))?;
    raw.map(|h| {
        let cleaned = whitespace.replace_all(h, "").to_string();
        if let Some(ch) = cleaned.chars().find(|&c| c == '\'' || c == '"') {
            return Err(MetaboError::InvalidHeader(format!(
                "Sample names should not have '{}' characters",
                ch
            )));
        }
        Ok(cleaned)
    })
    .collect()
}

/// Parse one numeric cell; blanks and NA markers become NaN.
pub(crate) fn parse_cell(raw: &str, row: usize, column: &str) -> Result<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("na")
        || trimmed.eq_ignore_ascii_case("nan")
    {
        return Ok(f64::NAN);
    }
    trimmed.parse::<f64>().map_err(|_| MetaboError::InvalidValue {
        value: raw.to_string(),
        row,
        column: column.to_string(),
    })
}

/// Format a value for TSV output; missing values are written as empty cells.
pub(crate) fn format_value(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        value.to_string()
    }
}

/// Convert parsed labels, or `None` when every label is zero or missing.
fn labels_if_present(raw: &[f64]) -> Result<Option<Vec<i64>>> {
    if raw.iter().all(|&l| l.is_nan() || l == 0.0) {
        return Ok(None);
    }
    raw.iter()
        .enumerate()
        .map(|(row, &l)| {
            if l.is_nan() || l.fract() != 0.0 || l < 0.0 {
                Err(MetaboError::InvalidValue {
                    value: l.to_string(),
                    row,
                    column: C_LABEL_COLUMN.to_string(),
                })
            } else {
                Ok(l as i64)
            }
        })
        .collect::<Result<Vec<i64>>>()
        .map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_table() -> MetaboliteTable {
        MetaboliteTable::from_rows(
            &["glucose", "lactate", "citrate"],
            &["S1", "S2", "S3", "S4"],
            &[
                vec![10.0, 20.0, 0.0, 5.0],
                vec![100.0, 200.0, 150.0, 175.0],
                vec![1.0, f64::NAN, 3.0, 4.0],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_dimensions() {
        let table = create_test_table();
        assert_eq!(table.n_compounds(), 3);
        assert_eq!(table.n_samples(), 4);
        assert!(table.pathway_classes().is_none());
    }

    #[test]
    fn test_dimension_mismatch() {
        let result = MetaboliteTable::from_rows(&["a"], &["S1", "S2"], &[vec![1.0]]);
        assert!(matches!(result, Err(MetaboError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_select_samples_reorders() {
        let table = create_test_table();
        let subset = table.select_samples(&["S3", "S1"]).unwrap();
        assert_eq!(subset.sample_ids(), &["S3", "S1"]);
        assert_eq!(subset.row(0), vec![0.0, 10.0]);
    }

    #[test]
    fn test_select_samples_missing_column() {
        let table = create_test_table();
        let result = table.select_samples(&["S9"]);
        assert!(matches!(result, Err(MetaboError::MissingColumn(_))));
    }

    #[test]
    fn test_select_compounds_in_order() {
        let table = create_test_table();
        let subset = table.select_compounds(&["citrate", "glucose"]).unwrap();
        assert_eq!(subset.compounds(), &["citrate", "glucose"]);
        assert!(table.select_compounds(&["pyruvate"]).is_err());
    }

    #[test]
    fn test_dedup_compounds_keeps_first() {
        let table = MetaboliteTable::from_rows(
            &["a", "b", "a"],
            &["S1"],
            &[vec![1.0], vec![2.0], vec![3.0]],
        )
        .unwrap();
        let dedup = table.dedup_compounds();
        assert_eq!(dedup.compounds(), &["a", "b"]);
        assert_eq!(dedup.get(0, 0), 1.0);
    }

    #[test]
    fn test_concat_keeps_shared_metadata() {
        let a = create_test_table().with_uniform_pathway_class("glycolysis");
        let b = MetaboliteTable::from_rows(&["x / y"], &["S1", "S2", "S3", "S4"], &[vec![1.0; 4]])
            .unwrap()
            .with_uniform_pathway_class("metabolite ratios");
        let joined = a.concat(&b).unwrap();
        assert_eq!(joined.n_compounds(), 4);
        assert_eq!(joined.pathway_classes().unwrap()[3], "metabolite ratios");
    }

    #[test]
    fn test_tsv_roundtrip() {
        let table = create_test_table().with_uniform_pathway_class("TCA");
        let temp_file = NamedTempFile::new().unwrap();
        table.to_tsv(temp_file.path()).unwrap();

        let loaded = MetaboliteTable::from_tsv(temp_file.path()).unwrap();
        assert_eq!(loaded.compounds(), table.compounds());
        assert_eq!(loaded.sample_ids(), table.sample_ids());
        assert_eq!(loaded.pathway_classes().unwrap()[0], "TCA");
        assert_eq!(loaded.get(0, 1), 20.0);
        assert!(loaded.get(2, 1).is_nan());
    }

    #[test]
    fn test_header_cleaning_and_compound_trim() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Compound\tS 1\t S2 ").unwrap();
        writeln!(file, "  glucose \t1\t2").unwrap();
        file.flush().unwrap();

        let table = MetaboliteTable::from_tsv(file.path()).unwrap();
        assert_eq!(table.sample_ids(), &["S1", "S2"]);
        assert_eq!(table.compounds(), &["glucose"]);
    }

    #[test]
    fn test_quote_in_header_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Compound\tS'1\tS2").unwrap();
        writeln!(file, "glucose\t1\t2").unwrap();
        file.flush().unwrap();

        let result = MetaboliteTable::from_tsv(file.path());
        assert!(matches!(result, Err(MetaboError::InvalidHeader(_))));
    }

    #[test]
    fn test_quoted_csv_header_rejected() {
        let csv = "Compound,\"S1\",S2\nglucose,1,2\n";
        let result = MetaboliteTable::from_reader(csv.as_bytes(), b',');
        assert!(matches!(result, Err(MetaboError::InvalidHeader(_))));

        // Quoted cells are still read as CSV.
        let csv = "Compound,S1,S2\n\"1,3-bisphosphoglycerate\",1,2\n";
        let table = MetaboliteTable::from_reader(csv.as_bytes(), b',').unwrap();
        assert_eq!(table.compounds(), &["1,3-bisphosphoglycerate"]);
        assert_eq!(table.get(0, 1), 2.0);
    }

    #[test]
    fn test_wrong_first_column_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Name\tS1").unwrap();
        writeln!(file, "glucose\t1").unwrap();
        file.flush().unwrap();

        assert!(matches!(
            MetaboliteTable::from_tsv(file.path()),
            Err(MetaboError::InvalidHeader(_))
        ));
    }

    #[test]
    fn test_invalid_cell_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Compound\tS1").unwrap();
        writeln!(file, "glucose\tabc").unwrap();
        file.flush().unwrap();

        assert!(matches!(
            MetaboliteTable::from_tsv(file.path()),
            Err(MetaboError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_isotopologue_labels() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Compound\tC_Label\tS1\tS2").unwrap();
        writeln!(file, "glucose\t0\t0.5\t0.6").unwrap();
        writeln!(file, "glucose\t1\t0.3\t0.2").unwrap();
        writeln!(file, "glucose\t2\t0.2\t0.2").unwrap();
        file.flush().unwrap();

        let iso = MetaboliteTable::isotopologue_from_tsv(file.path())
            .unwrap()
            .unwrap();
        assert_eq!(iso.c_labels().unwrap(), &[0, 1, 2]);
        assert_eq!(iso.sample_ids(), &["S1", "S2"]);
    }

    #[test]
    fn test_all_zero_labels_mean_absent() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Compound\tC_Label\tS1").unwrap();
        writeln!(file, "glucose\t0\t0.5").unwrap();
        writeln!(file, "lactate\t\t0.5").unwrap();
        file.flush().unwrap();

        let iso = MetaboliteTable::isotopologue_from_tsv(file.path()).unwrap();
        assert!(iso.is_none());
    }
}
