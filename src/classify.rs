use std::collections::{BTreeSet, HashMap};
use std::ops::Range;

use crate::categories::CategoryMapping;
use crate::error::{ReportError, Result};

/// Section markers in a report's line-item column. The project section is
/// mandatory; the income section is optional and simply absent from some
/// exports.
pub const PROJECT_SECTION_START: &str = "projects";
pub const PROJECT_SECTION_END: &str = "total projects";
pub const INCOME_SECTION_START: &str = "income";
pub const INCOME_SECTION_END: &str = "total income";

/// A report transposed into classification shape: the ordered line-item
/// labels and one value column per project.
///
/// Each column's values run parallel to `labels`.
#[derive(Debug, Clone)]
pub struct ProjectTable {
    pub labels: Vec<String>,
    pub projects: Vec<ProjectColumn>,
}

#[derive(Debug, Clone)]
pub struct ProjectColumn {
    pub header: String,
    pub values: Vec<f64>,
}

/// The same table re-keyed by MPS category. Categories are sorted and
/// every project carries a value for every category.
#[derive(Debug, Clone)]
pub struct ClassifiedTable {
    pub categories: Vec<String>,
    pub projects: Vec<ClassifiedProject>,
}

#[derive(Debug, Clone)]
pub struct ClassifiedProject {
    pub header: String,
    pub values: Vec<f64>,
}

/// Rolls a report's project and income line items up into MPS categories.
///
/// Only rows inside the marked sections are classified; subtotal and
/// spacer rows outside them never touch the mapping. Rows mapping to the
/// same category are summed.
pub fn classify(table: &ProjectTable, mapping: &CategoryMapping) -> Result<ClassifiedTable> {
    let project_rows = required_section(
        &table.labels,
        PROJECT_SECTION_START,
        PROJECT_SECTION_END,
    )?;
    let income_rows = optional_section(&table.labels, INCOME_SECTION_START, INCOME_SECTION_END);

    let mut row_categories: Vec<(usize, String)> = Vec::new();
    for index in project_rows.chain(income_rows) {
        let category = mapping.resolve(&table.labels[index])?;
        row_categories.push((index, category.to_string()));
    }

    let categories: Vec<String> = row_categories
        .iter()
        .map(|(_, category)| category.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let position: HashMap<&str, usize> = categories
        .iter()
        .enumerate()
        .map(|(index, category)| (category.as_str(), index))
        .collect();

    let projects = table
        .projects
        .iter()
        .map(|project| {
            let mut values = vec![0.0; categories.len()];
            for (row, category) in &row_categories {
                values[position[category.as_str()]] += project.values[*row];
            }
            ClassifiedProject {
                header: project.header.clone(),
                values,
            }
        })
        .collect();

    Ok(ClassifiedTable {
        categories,
        projects,
    })
}

fn find_marker(labels: &[String], marker: &str) -> Option<usize> {
    labels
        .iter()
        .position(|label| label.trim().to_lowercase() == marker)
}

fn required_section(labels: &[String], start: &str, end: &str) -> Result<Range<usize>> {
    let start_index = find_marker(labels, start).ok_or_else(|| missing_marker(start))?;
    let end_index = find_marker(labels, end).ok_or_else(|| missing_marker(end))?;
    Ok(section_between(start_index, end_index))
}

fn optional_section(labels: &[String], start: &str, end: &str) -> Range<usize> {
    match (find_marker(labels, start), find_marker(labels, end)) {
        (Some(start_index), Some(end_index)) => section_between(start_index, end_index),
        _ => 0..0,
    }
}

fn section_between(start: usize, end: usize) -> Range<usize> {
    // Adjacent or inverted markers mean the section holds nothing.
    if end <= start + 1 {
        0..0
    } else {
        start + 1..end
    }
}

fn missing_marker(marker: &str) -> ReportError {
    ReportError::MissingCategoryBoundary {
        marker: marker.to_string(),
    }
}
