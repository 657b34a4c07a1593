//! Subcommand handlers
//!
//! Each handler returns the text to print on stdout. Warnings about dropped or
//! repaired input go through `tracing` and end up on stderr.

use std::collections::BTreeMap;
use std::path::Path;

use annot_config::AnnotConfig;
use annot_model::annot::annotations::{
    Annotation, FieldAnnotations, RelationAnnotations, SpanAnnotations,
};
use annot_model::annot::codebook::{
    prepare_questions, Codebook, CodebookKind, RestrictedCodes, VariableMapBuilder,
};
use annot_model::annot::unit::{Unit, UnitState};
use anyhow::{bail, Context, Result};
use serde::Serialize;
use tracing::warn;

use crate::input::read_input;

/// How token listings are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenFormat {
    Json,
    Table,
}

impl TokenFormat {
    pub const NAMES: &'static [&'static str] = &["json", "table"];

    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "json" => Ok(TokenFormat::Json),
            "table" => Ok(TokenFormat::Table),
            other => bail!(
                "Unknown token format '{}' (available: {})",
                other,
                Self::NAMES.join(", ")
            ),
        }
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("serializing output")
}

fn load_unit(
    path: &Path,
    annotations: Option<&Path>,
    config: &AnnotConfig,
) -> Result<UnitState> {
    let unit: Unit = read_input(path)?;
    let records = annotations
        .map(read_input::<Vec<Annotation>>)
        .transpose()?;
    let state = UnitState::load(&unit, records.as_deref(), &config.unit_options())
        .with_context(|| format!("preparing unit {}", path.display()))?;
    if !state.warnings().is_empty() {
        warn!(
            dropped = state.warnings().len(),
            "some annotations could not be placed on the tokens"
        );
    }
    Ok(state)
}

/// The token sequence of a unit
pub fn tokens(path: &Path, format: TokenFormat, config: &AnnotConfig) -> Result<String> {
    let state = load_unit(path, None, config)?;
    let tokens = state.tokens();
    match format {
        TokenFormat::Json => to_json(&tokens[..]),
        TokenFormat::Table => Ok(tokens
            .iter()
            .map(|t| {
                format!(
                    "{}\t{}\t{}\t{}\t{}\t{}\t{:?}\n",
                    t.index,
                    t.field,
                    t.offset,
                    t.length,
                    t.paragraph,
                    if t.coding_unit { "unit" } else { "context" },
                    t.text
                )
            })
            .collect()),
    }
}

#[derive(Serialize)]
struct AnnotationMaps<'a> {
    spans: &'a SpanAnnotations,
    fields: &'a FieldAnnotations,
    relations: &'a RelationAnnotations,
    dropped: Vec<String>,
}

/// The decoded span, field and relation maps of a unit
pub fn annotations(
    path: &Path,
    records: Option<&Path>,
    config: &AnnotConfig,
) -> Result<String> {
    let state = load_unit(path, records, config)?;
    let manager = state.manager();
    to_json(&AnnotationMaps {
        spans: manager.spans(),
        fields: manager.fields(),
        relations: manager.relations(),
        dropped: state.warnings().iter().map(ToString::to_string).collect(),
    })
}

/// The unit's annotations decoded and encoded again: coalesced, placed and ordered
pub fn export(path: &Path, records: Option<&Path>, config: &AnnotConfig) -> Result<String> {
    let state = load_unit(path, records, config)?;
    to_json(&state.export())
}

/// Parse `variable=value` restrictions
pub fn parse_restrictions<'a>(specs: impl IntoIterator<Item = &'a str>) -> Result<RestrictedCodes> {
    let mut restricted: RestrictedCodes = BTreeMap::new();
    for spec in specs {
        let Some((variable, value)) = spec.split_once('=') else {
            bail!("Invalid restriction '{}', expected VARIABLE=VALUE", spec);
        };
        restricted
            .entry(variable.to_string())
            .or_default()
            .insert(value.to_string());
    }
    Ok(restricted)
}

/// Prepared questions, or the variable map scoped to a selection
pub fn codebook(
    path: &Path,
    selection: Option<&str>,
    restricted: &RestrictedCodes,
    config: &AnnotConfig,
) -> Result<String> {
    let codebook: Codebook = read_input(path)?;
    match codebook.kind {
        CodebookKind::Questions => to_json(&prepare_questions(&codebook, &config.codebook)),
        CodebookKind::Annotate => {
            let builder = VariableMapBuilder::new(&codebook.variables, &config.codebook);
            match builder.scope(selection, restricted) {
                Some(scoped) => to_json(&scoped),
                None => to_json(builder.full_map()),
            }
        }
    }
}
