//! Importer for pre-tokenized data
//!
//! External tools hand over tokens in row form (a list of token objects) or column form
//! (an object of equally long arrays). Both are normalized into [`Token`]s with every
//! field filled in: text from the `token` alias, offsets from `start` or lengths accumulated
//! per field, trailing whitespace from `space` or the gap to the next offset, and dense
//! paragraph numbers.
//!
//! Input that cannot be made consistent (no text, overlapping offsets) is rejected as a
//! whole with a [`ValidationError`].

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::token::{Token, TokenAnnotation};
use crate::annot::error::ValidationError;

static LINE_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r?\n").expect("valid regex"));

/// A token as supplied by an external tokenizer; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawToken {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
    /// Alias of `offset`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<usize>,
    /// Any paragraph identifier; only changes between tokens matter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paragraph: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Alias of `text`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<String>,
    /// Alias of `post`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space: Option<String>,
    #[serde(
        default,
        rename = "codingUnit",
        alias = "coding_unit",
        skip_serializing_if = "Option::is_none"
    )]
    pub coding_unit: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<Vec<TokenAnnotation>>,
}

impl RawToken {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }
}

/// Pre-tokenized input in either layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTokens {
    Rows(Vec<RawToken>),
    Columns(BTreeMap<String, Vec<serde_json::Value>>),
}

impl RawTokens {
    /// Transpose the column layout into rows; rows pass through
    pub fn into_rows(self) -> Result<Vec<RawToken>, ValidationError> {
        match self {
            RawTokens::Rows(rows) => Ok(rows),
            RawTokens::Columns(columns) => columns_to_rows(columns),
        }
    }
}

/// Knobs for [`import_tokens_with`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportOptions {
    /// Field name for tokens that have none
    pub default_field: String,
    /// Trailing whitespace for tokens whose spacing cannot be derived
    pub default_post: String,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            default_field: "text".to_string(),
            default_post: " ".to_string(),
        }
    }
}

fn columns_to_rows(
    columns: BTreeMap<String, Vec<serde_json::Value>>,
) -> Result<Vec<RawToken>, ValidationError> {
    let n = columns.values().next().map(Vec::len).unwrap_or(0);
    if let Some((column, values)) = columns.iter().find(|(_, v)| v.len() != n) {
        return Err(ValidationError::ColumnLength {
            column: column.clone(),
            expected: n,
            found: values.len(),
        });
    }

    (0..n)
        .map(|i| {
            let row: serde_json::Map<String, serde_json::Value> = columns
                .iter()
                .filter(|(_, values)| !values[i].is_null())
                .map(|(column, values)| (column.clone(), values[i].clone()))
                .collect();
            serde_json::from_value(serde_json::Value::Object(row)).map_err(|e| {
                ValidationError::Malformed {
                    index: i,
                    reason: e.to_string(),
                }
            })
        })
        .collect()
}

/// Import tokens with default options
pub fn import_tokens(raw: RawTokens) -> Result<Vec<Token>, ValidationError> {
    import_tokens_with(raw, &ImportOptions::default())
}

/// Normalize pre-tokenized input into tokens
pub fn import_tokens_with(
    raw: RawTokens,
    options: &ImportOptions,
) -> Result<Vec<Token>, ValidationError> {
    let mut rows = raw.into_rows()?;

    for (i, row) in rows.iter_mut().enumerate() {
        if row.text.is_none() {
            row.text = Some(row.token.take().ok_or(ValidationError::MissingText { index: i })?);
        }
        if row.offset.is_none() {
            row.offset = row.start;
        }
    }

    let mut tokens = Vec::with_capacity(rows.len());
    let mut running_offset = 0;
    let mut current_field: Option<String> = None;
    let mut paragraph = 0;
    let mut last_paragraph = rows.first().and_then(|r| r.paragraph.clone());

    for i in 0..rows.len() {
        let row = &rows[i];
        let next = rows.get(i + 1);
        let text = row.text.clone().unwrap_or_default();
        let field = row
            .field
            .clone()
            .unwrap_or_else(|| options.default_field.clone());
        if current_field.as_deref() != Some(field.as_str()) {
            running_offset = 0;
            current_field = Some(field.clone());
        }
        let next_same_field =
            next.filter(|n| n.field.as_deref().unwrap_or(&options.default_field) == field);

        let length = row.length.unwrap_or_else(|| text.chars().count());
        let pre = row.pre.clone().unwrap_or_default();
        let post = match (&row.post, &row.space) {
            (Some(post), _) => post.clone(),
            (None, Some(space)) => space.clone(),
            (None, None) => match (row.offset, next_same_field) {
                (Some(offset), Some(n)) => match n.offset {
                    Some(next_offset) => " ".repeat(next_offset.saturating_sub(offset + length)),
                    None => options.default_post.clone(),
                },
                (Some(_), None) if next.is_none() => String::new(),
                _ => options.default_post.clone(),
            },
        };

        let next_pre_len = next_same_field
            .and_then(|n| n.pre.as_deref())
            .map(|p| p.chars().count())
            .unwrap_or(0);
        let total_length = length + post.chars().count() + next_pre_len;

        let offset = row.offset.unwrap_or(running_offset);
        running_offset = offset + total_length;

        if let Some(next_offset) = next_same_field.and_then(|n| n.offset) {
            if next_offset < offset + total_length {
                return Err(ValidationError::Overlap {
                    index: i,
                    text: format!("{}{}{}", pre, text, post),
                    offset,
                    next_offset,
                });
            }
        }

        // Supplied paragraph ids are renumbered densely; otherwise line breaks decide
        let token_paragraph = match &row.paragraph {
            None => {
                let p = paragraph;
                if LINE_BREAK.is_match(&text) || LINE_BREAK.is_match(&post) {
                    paragraph += 1;
                }
                p
            }
            Some(id) => {
                if Some(id) != last_paragraph.as_ref() {
                    last_paragraph = Some(id.clone());
                    paragraph += 1;
                }
                paragraph
            }
        };

        tokens.push(Token {
            field,
            offset,
            length,
            paragraph: token_paragraph,
            index: i,
            text,
            pre,
            post,
            coding_unit: row.coding_unit.unwrap_or(true),
            annotations: row.annotations.clone().unwrap_or_default(),
        });
    }

    Ok(tokens)
}
