//! Wire unit content and document preparation

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::grid::{prepare_grid, GridLayout, GridSpec};
use crate::annot::annotations::{Annotation, HistoryOptions};
use crate::annot::error::ValidationError;
use crate::annot::serde_helpers::scalar_string;
use crate::annot::tokens::{
    import_tokens_with, tokenize_fields_with, ImportOptions, RawTokens, TextField, Token,
    TokenizerOptions,
};

/// A field shown next to the text but never annotated
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaField {
    pub name: String,
    #[serde(deserialize_with = "scalar_string")]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageField {
    pub name: String,
    /// Image location
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_area: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkdownField {
    pub name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_area: Option<String>,
}

/// Unit content as delivered by a backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitContent {
    /// Pre-tokenized text; when present, text fields are not tokenized
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<RawTokens>,
    #[serde(default)]
    pub text_fields: Vec<TextField>,
    #[serde(default)]
    pub meta_fields: Vec<MetaField>,
    #[serde(default)]
    pub image_fields: Vec<ImageField>,
    #[serde(default)]
    pub markdown_fields: Vec<MarkdownField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid: Option<GridSpec>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub unit: UnitContent,
}

/// Everything needed to prepare a unit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitOptions {
    pub tokenizer: TokenizerOptions,
    pub import: ImportOptions,
    pub history: HistoryOptions,
}

/// A unit laid out and tokenized
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub tokens: Arc<[Token]>,
    pub text_fields: Vec<TextField>,
    pub meta_fields: Vec<MetaField>,
    pub image_fields: Vec<ImageField>,
    pub markdown_fields: Vec<MarkdownField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid: Option<GridLayout>,
}

/// Lay out a unit and produce its token sequence
///
/// With a grid, fields that the grid does not place are left out, and the others get
/// their generated area. Tokens are imported when the unit carries them and produced
/// by the tokenizer otherwise.
pub fn prepare_document(unit: &Unit, options: &UnitOptions) -> Result<Document, ValidationError> {
    let content = &unit.unit;
    let mut text_fields = content.text_fields.clone();
    let mut image_fields = content.image_fields.clone();
    let mut markdown_fields = content.markdown_fields.clone();

    let grid = content.grid.as_ref().map(prepare_grid);
    if let Some(layout) = &grid {
        text_fields.retain(|f| layout.places(&f.name));
        image_fields.retain(|f| layout.places(&f.name));
        markdown_fields.retain(|f| layout.places(&f.name));
        for f in &mut text_fields {
            f.grid_area = layout.area_of(&f.name).map(String::from);
        }
        for f in &mut image_fields {
            f.grid_area = layout.area_of(&f.name).map(String::from);
        }
        for f in &mut markdown_fields {
            f.grid_area = layout.area_of(&f.name).map(String::from);
        }
    }

    let tokens: Vec<Token> = match &content.tokens {
        Some(raw) => import_tokens_with(raw.clone(), &options.import)?,
        None => tokenize_fields_with(&text_fields, &options.tokenizer),
    };
    debug!(
        tokens = tokens.len(),
        text_fields = text_fields.len(),
        imported = content.tokens.is_some(),
        "prepared document"
    );

    Ok(Document {
        tokens: tokens.into(),
        text_fields,
        meta_fields: content.meta_fields.clone(),
        image_fields,
        markdown_fields,
        grid,
    })
}
