//! Grid layout preparation
//!
//! A grid places fields in named areas. Area names in a codebook can be anything, so
//! they are replaced by generated names (`f0`, `f1`, ...) that are always valid in a
//! grid template. Rows of uneven width are padded by repeating their last cell, and
//! row and column sizes become fraction lists of the right length.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Placeholder cell that belongs to no field
const EMPTY_CELL: &str = ".";

/// One row of the areas, either a single area or one area per column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AreaRow {
    Single(String),
    Cells(Vec<String>),
}

impl AreaRow {
    fn cells(&self) -> &[String] {
        match self {
            AreaRow::Single(area) => std::slice::from_ref(area),
            AreaRow::Cells(cells) => cells,
        }
    }
}

/// The grid as written in a unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSpec {
    pub areas: Vec<AreaRow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<serde_json::Number>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<serde_json::Number>>,
}

/// The grid ready for a layout engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridLayout {
    /// Quoted rows of generated area names, joined by spaces
    pub areas: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<String>,
    /// Original area name → generated name
    #[serde(skip)]
    pub area_names: BTreeMap<String, String>,
}

impl GridLayout {
    /// The generated area for a field, if the grid places it
    pub fn area_of(&self, field: &str) -> Option<&str> {
        self.area_names.get(field).map(String::as_str)
    }

    /// Whether a field appears anywhere in the grid
    pub fn places(&self, field: &str) -> bool {
        self.area_names.contains_key(field)
    }
}

pub fn prepare_grid(spec: &GridSpec) -> GridLayout {
    let ncolumns = spec
        .areas
        .iter()
        .map(|row| row.cells().len())
        .max()
        .unwrap_or(1)
        .max(1);

    let mut area_names: BTreeMap<String, String> = BTreeMap::new();
    let mut template = Vec::with_capacity(spec.areas.len());
    for row in &spec.areas {
        let cells = row.cells();
        let mut columns = Vec::with_capacity(ncolumns);
        for i in 0..ncolumns {
            let cell = cells
                .get(i)
                .or_else(|| cells.last())
                .map(String::as_str)
                .unwrap_or(EMPTY_CELL);
            if cell == EMPTY_CELL {
                columns.push(EMPTY_CELL.to_string());
            } else {
                let next = format!("f{}", area_names.len());
                columns.push(area_names.entry(cell.to_string()).or_insert(next).clone());
            }
        }
        template.push(format!("\"{}\"", columns.join(" ")));
    }

    GridLayout {
        areas: template.join(" "),
        rows: fractions(spec.rows.as_deref(), template.len()),
        columns: fractions(spec.columns.as_deref(), ncolumns),
        area_names,
    }
}

/// `n` fraction sizes, repeating the last given value
fn fractions(values: Option<&[serde_json::Number]>, n: usize) -> Option<String> {
    let values = values.filter(|v| !v.is_empty())?;
    let sizes: Vec<String> = (0..n)
        .map(|i| format!("{}fr", values.get(i).unwrap_or(&values[values.len() - 1])))
        .collect();
    Some(sizes.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(json: &str) -> GridLayout {
        prepare_grid(&serde_json::from_str(json).unwrap())
    }

    #[test]
    fn test_areas_are_renamed_and_padded() {
        let layout = grid(r#"{"areas": [["title", "title"], "body", ["image", ".", "notes"]]}"#);
        assert_eq!(
            layout.areas,
            r#""f0 f0 f0" "f1 f1 f1" "f2 . f3""#
        );
        assert_eq!(layout.area_of("notes"), Some("f3"));
        assert!(!layout.places("meta"));
        assert_eq!(layout.rows, None);
    }

    #[test]
    fn test_fractions_repeat_last_value() {
        let layout = grid(r#"{"areas": [["a", "b"], ["c", "c"], ["d", "d"]], "rows": [1, 2.5], "columns": [3]}"#);
        assert_eq!(layout.rows.as_deref(), Some("1fr 2.5fr 2.5fr"));
        assert_eq!(layout.columns.as_deref(), Some("3fr 3fr"));
    }
}
