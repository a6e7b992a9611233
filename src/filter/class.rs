//! Filtering and ordering rows by pathway class.

use crate::data::{MetaboliteTable, ReferenceData, PATHWAY_CLASS_COLUMN};
use crate::error::{MetaboError, Result};
use std::collections::HashSet;

/// Row index and class of every reference entry in `classes` that matches a table row.
fn join_rows<S: AsRef<str>>(
    table: &MetaboliteTable,
    classes: &[S],
    reference: &ReferenceData,
) -> Vec<(usize, String)> {
    let mut joined = Vec::new();
    for entry in reference.select(classes) {
        for row in table.compound_rows(&entry.analyte_name) {
            joined.push((row, entry.pathway_class.clone()));
        }
    }
    joined
}

fn build(table: &MetaboliteTable, joined: Vec<(usize, String)>) -> Result<MetaboliteTable> {
    let (rows, classes): (Vec<usize>, Vec<String>) = joined.into_iter().unzip();
    table.take_rows(&rows).with_pathway_classes(classes)
}

/// Keep the compounds of the selected classes and attach their class.
///
/// Rows follow the reference order, not the table order. Compounds missing
/// from the reference, or of an unselected class, are dropped; an empty
/// result is valid.
///
/// # Arguments
/// * `table` - Normalized pool table
/// * `classes` - Selected pathway classes
/// * `reference` - Compound to class mapping
pub fn group_by_class<S: AsRef<str>>(
    table: &MetaboliteTable,
    classes: &[S],
    reference: &ReferenceData,
) -> Result<MetaboliteTable> {
    let joined = join_rows(table, classes, reference);
    let kept: HashSet<usize> = joined.iter().map(|(row, _)| *row).collect();
    let dropped = table.n_compounds() - kept.len();
    if dropped > 0 {
        log::info!(
            "class grouping dropped {} of {} compounds",
            dropped,
            table.n_compounds()
        );
    }
    build(table, joined)
}

/// Like [`group_by_class`], then sort by selected-class order and compound name.
///
/// The sort is stable, so isotopologue rows of one compound keep their
/// label order.
pub fn order_by_class<S: AsRef<str>>(
    table: &MetaboliteTable,
    classes: &[S],
    reference: &ReferenceData,
) -> Result<MetaboliteTable> {
    let class_rank = |class: &str| {
        classes
            .iter()
            .position(|c| c.as_ref() == class)
            .unwrap_or(usize::MAX)
    };
    let mut joined = join_rows(table, classes, reference);
    joined.sort_by(|(row_a, class_a), (row_b, class_b)| {
        class_rank(class_a)
            .cmp(&class_rank(class_b))
            .then_with(|| table.compounds()[*row_a].cmp(&table.compounds()[*row_b]))
    });
    build(table, joined)
}

/// Split a class-annotated table into one table per class, in first-appearance order.
pub fn split_by_class(table: &MetaboliteTable) -> Result<Vec<(String, MetaboliteTable)>> {
    let classes = table
        .pathway_classes()
        .ok_or_else(|| MetaboError::MissingColumn(PATHWAY_CLASS_COLUMN.to_string()))?;

    let mut order: Vec<&str> = Vec::new();
    for class in classes {
        if !order.contains(&class.as_str()) {
            order.push(class);
        }
    }
    Ok(order
        .into_iter()
        .map(|class| {
            let rows: Vec<usize> = (0..classes.len()).filter(|&i| classes[i] == class).collect();
            (class.to_string(), table.take_rows(&rows))
        })
        .collect())
}
