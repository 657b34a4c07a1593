//! Tokenizer for raw text fields
//!
//! Several text fields are tokenized into one sequence. Each field keeps its own offsets
//! (relative to the original document, shifted by the field's `offset`), while `index`
//! runs over the whole unit.
//!
//! A field can mark the part the coder is responsible for, either with explicit
//! `unit_start` / `unit_end` positions or by wrapping the value in `context_before` /
//! `context_after`. Tokens outside that part get `coding_unit = false`.

use serde::{Deserialize, Serialize};

use super::segmenter::segment;
use super::token::Token;

/// A text field of a unit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextField {
    #[serde(default)]
    pub name: String,
    #[serde(deserialize_with = "crate::annot::serde_helpers::joined_text")]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_start: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_end: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_before: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_after: Option<String>,
    /// Layout area assigned during grid preparation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_area: Option<String>,
}

impl TextField {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            ..Default::default()
        }
    }
}

/// Knobs for [`tokenize_fields_with`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenizerOptions {
    /// Field name used when a text field has none
    pub default_field: String,
}

impl Default for TokenizerOptions {
    fn default() -> Self {
        Self {
            default_field: "text".to_string(),
        }
    }
}

/// Tokenize text fields with default options
pub fn tokenize_fields(fields: &[TextField]) -> Vec<Token> {
    tokenize_fields_with(fields, &TokenizerOptions::default())
}

/// Tokenize text fields into one token sequence
pub fn tokenize_fields_with(fields: &[TextField], options: &TokenizerOptions) -> Vec<Token> {
    let mut tokens: Vec<Token> = Vec::new();
    let mut paragraph = 0;

    let has_unit_start = fields
        .iter()
        .any(|f| f.unit_start.is_some() || f.context_before.is_some());
    let mut unit_started = !has_unit_start;
    let mut unit_ended = false;

    for text_field in fields {
        let field = if text_field.name.is_empty() {
            options.default_field.clone()
        } else {
            text_field.name.clone()
        };
        let mut offset = text_field.offset.unwrap_or(0);
        let (parts, unit_start, unit_end) = field_parts(text_field, offset);

        let field_first = tokens.len();
        let mut pending_pre = String::new();

        for part in parts {
            let part_first = tokens.len();
            let mut char_pos = 0;
            let mut last_in_part: Option<usize> = None;

            for (kind, span) in segment(part) {
                let slice = &part[span];
                let char_len = slice.chars().count();

                if kind.is_whitespace() {
                    match last_in_part {
                        Some(i) => tokens[i].post.push_str(slice),
                        None => pending_pre.push_str(slice),
                    }
                } else {
                    let token_offset = offset + char_pos;
                    if unit_start.is_some_and(|start| token_offset >= start) {
                        unit_started = true;
                    }
                    if unit_end.is_some_and(|end| token_offset > end) {
                        unit_ended = true;
                    }

                    tokens.push(Token {
                        field: field.clone(),
                        offset: token_offset,
                        length: char_len,
                        paragraph,
                        index: tokens.len(),
                        text: slice.to_string(),
                        pre: std::mem::take(&mut pending_pre),
                        post: String::new(),
                        coding_unit: unit_started && !unit_ended,
                        annotations: Vec::new(),
                    });
                    last_in_part = Some(tokens.len() - 1);
                }
                char_pos += char_len;
            }

            // Paragraphs are only known once a token's trailing whitespace is complete
            for token in tokens.iter_mut().skip(part_first) {
                token.paragraph = paragraph;
                if token.post.contains('\n') {
                    paragraph += 1;
                }
            }
            offset += part.chars().count();
        }

        if !pending_pre.is_empty() && tokens.len() > field_first {
            if let Some(last) = tokens.last_mut() {
                last.post.push_str(&pending_pre);
            }
        }

        paragraph += 1;
        if unit_end.is_some() {
            unit_ended = true;
        }
    }

    tokens
}

/// The texts to tokenize for one field, and the coding unit bounds in field coordinates
fn field_parts(text_field: &TextField, offset: usize) -> (Vec<&str>, Option<usize>, Option<usize>) {
    let mut parts = Vec::with_capacity(3);
    let mut unit_start = text_field.unit_start;
    let mut unit_end = text_field.unit_end;
    let value_len = text_field.value.chars().count();

    let before_len = match &text_field.context_before {
        Some(before) => {
            parts.push(before.as_str());
            let len = before.chars().count();
            unit_start = Some(offset + len);
            len
        }
        None => 0,
    };
    parts.push(text_field.value.as_str());
    if let Some(after) = &text_field.context_after {
        unit_end = Some((offset + before_len + value_len).saturating_sub(1));
        parts.push(after.as_str());
    }

    (parts, unit_start, unit_end)
}
