//! Compound to pathway-class reference mapping.

use crate::error::{MetaboError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// One `(analyte_name, pathway_class)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassEntry {
    pub analyte_name: String,
    pub pathway_class: String,
}

/// Reference data built once at startup and shared by reference.
///
/// Holds the class mapping in file order, plus the preselected
/// normalization compounds and classes offered as defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceData {
    entries: Vec<ClassEntry>,
    #[serde(default)]
    normalization_defaults: Vec<String>,
    #[serde(default)]
    class_defaults: Vec<String>,
}

impl ReferenceData {
    /// Build from pairs; duplicate pairs and pairs with an empty field are dropped.
    pub fn new(entries: Vec<ClassEntry>) -> Self {
        let mut seen = HashSet::new();
        let entries: Vec<ClassEntry> = entries
            .into_iter()
            .map(|e| ClassEntry {
                analyte_name: e.analyte_name.trim().to_string(),
                pathway_class: e.pathway_class.trim().to_string(),
            })
            .filter(|e| !e.analyte_name.is_empty() && !e.pathway_class.is_empty())
            .filter(|e| seen.insert(e.clone()))
            .collect();
        Self {
            entries,
            normalization_defaults: Vec::new(),
            class_defaults: Vec::new(),
        }
    }

    /// Set the preselected normalization compounds.
    pub fn with_normalization_defaults(mut self, compounds: Vec<String>) -> Self {
        self.normalization_defaults = compounds;
        self
    }

    /// Set the preselected pathway classes.
    pub fn with_class_defaults(mut self, classes: Vec<String>) -> Self {
        self.class_defaults = classes;
        self
    }

    /// Load from a CSV file with `analyte_name` and `pathway_class` columns.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Parse CSV reference data from any reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);
        let headers = rdr.headers()?.clone();
        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| MetaboError::MissingColumn(name.to_string()))
        };
        let name_col = column("analyte_name")?;
        let class_col = column("pathway_class")?;

        let mut entries = Vec::new();
        for record in rdr.records() {
            let record = record?;
            entries.push(ClassEntry {
                analyte_name: record.get(name_col).unwrap_or("").to_string(),
                pathway_class: record.get(class_col).unwrap_or("").to_string(),
            });
        }
        let reference = Self::new(entries);
        log::debug!(
            "loaded {} reference entries in {} classes",
            reference.len(),
            reference.classes().len()
        );
        Ok(reference)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in file order.
    pub fn entries(&self) -> &[ClassEntry] {
        &self.entries
    }

    pub fn normalization_defaults(&self) -> &[String] {
        &self.normalization_defaults
    }

    pub fn class_defaults(&self) -> &[String] {
        &self.class_defaults
    }

    /// Distinct classes in first-appearance order.
    pub fn classes(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.entries
            .iter()
            .map(|e| e.pathway_class.as_str())
            .filter(|c| seen.insert(*c))
            .collect()
    }

    /// First class listed for a compound.
    pub fn class_of(&self, analyte: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.analyte_name == analyte)
            .map(|e| e.pathway_class.as_str())
    }

    /// Entries whose class is among `classes`, in file order.
    pub fn select<S: AsRef<str>>(&self, classes: &[S]) -> Vec<&ClassEntry> {
        let wanted: HashSet<&str> = classes.iter().map(|c| c.as_ref()).collect();
        self.entries
            .iter()
            .filter(|e| wanted.contains(e.pathway_class.as_str()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REFERENCE_CSV: &str = "\
analyte_name,pathway_class
glucose,glycolysis
lactate,glycolysis
citrate,TCA cycle
glucose,glycolysis
,
succinate,TCA cycle
";

    #[test]
    fn test_from_reader_dedups_and_drops_blank_rows() {
        let reference = ReferenceData::from_reader(REFERENCE_CSV.as_bytes()).unwrap();
        assert_eq!(reference.len(), 4);
        assert_eq!(reference.classes(), vec!["glycolysis", "TCA cycle"]);
    }

    #[test]
    fn test_class_lookup_and_select() {
        let reference = ReferenceData::from_reader(REFERENCE_CSV.as_bytes()).unwrap();
        assert_eq!(reference.class_of("citrate"), Some("TCA cycle"));
        assert_eq!(reference.class_of("pyruvate"), None);

        let tca = reference.select(&["TCA cycle"]);
        let names: Vec<&str> = tca.iter().map(|e| e.analyte_name.as_str()).collect();
        assert_eq!(names, vec!["citrate", "succinate"]);
    }

    #[test]
    fn test_missing_column() {
        let result = ReferenceData::from_reader("name,class\na,b\n".as_bytes());
        assert!(matches!(result, Err(MetaboError::MissingColumn(_))));
    }
}
