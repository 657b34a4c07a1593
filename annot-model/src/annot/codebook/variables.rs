//! Variable maps for annotate codebooks
//!
//! The full map holds every variable with only its selectable codes. Scoping narrows it
//! to the variable the coder selected, applies restricted codes, and for relation
//! variables works out which span annotations must stay visible.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::code::{Code, CodeEntry};
use super::options::CodebookOptions;
use super::relations::{Relation, ValidRelation};
use super::tree::build_code_tree;

/// Selection that scopes to all variables in edit mode
pub const EDIT_ALL: &str = "EDIT ALL";

/// Restricted value that stands for "no code" and is never synthesized
const EMPTY_VALUE: &str = "EMPTY";

/// How a variable is coded
///
/// Types this model does not know are kept as [`VariableType::Other`] so that the rest
/// of the codebook still loads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableType {
    #[default]
    Span,
    Relation,
    Scale,
    Annotinder,
    Confirm,
    #[serde(other)]
    Other,
}

/// A variable as written in an annotate codebook
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: VariableType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instruction: Option<String>,
    #[serde(default)]
    pub codes: Vec<CodeEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relations: Option<Vec<Relation>>,
    #[serde(default)]
    pub edit_mode: bool,
}

/// A variable with its code map, ready for the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopedVariable {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: VariableType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instruction: Option<String>,
    pub code_map: BTreeMap<String, Code>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relations: Option<Vec<Relation>>,
    pub edit_mode: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<ValidRelation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_to: Option<ValidRelation>,
}

impl ScopedVariable {
    /// Relation codes for a relation between two span annotations
    pub fn codes_between(&self, from: (&str, &str), to: (&str, &str)) -> Vec<Code> {
        match (&self.valid_from, &self.valid_to) {
            (Some(valid_from), Some(valid_to)) => {
                ValidRelation::codes_between(valid_from, valid_to, from, to)
            }
            _ => Vec::new(),
        }
    }
}

pub type VariableMap = BTreeMap<String, ScopedVariable>;

/// variable → values the coder may use
pub type RestrictedCodes = BTreeMap<String, BTreeSet<String>>;

/// The maps the document works with for one selection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopedVariables {
    pub variable_map: VariableMap,
    /// Span annotations that remain visible; differs from the map for relation variables
    pub show_values: VariableMap,
    pub variable_type: VariableType,
    pub edit_mode: bool,
}

/// Builds the full variable map once and scopes it per selection
#[derive(Debug, Clone)]
pub struct VariableMapBuilder {
    full: VariableMap,
    options: CodebookOptions,
}

impl VariableMapBuilder {
    pub fn new(variables: &[Variable], options: &CodebookOptions) -> Self {
        let mut full = VariableMap::new();
        for variable in variables {
            let code_map = build_code_tree(&variable.codes, options).selectable();
            let (valid_from, valid_to) = match &variable.relations {
                Some(relations) => {
                    let (from, to) = ValidRelation::build(relations, &code_map);
                    (Some(from), Some(to))
                }
                None => (None, None),
            };
            if full.contains_key(&variable.name) {
                warn!(variable = %variable.name, "Duplicate variable, keeping the first");
                continue;
            }
            full.insert(
                variable.name.clone(),
                ScopedVariable {
                    name: variable.name.clone(),
                    kind: variable.kind,
                    instruction: variable.instruction.clone(),
                    code_map,
                    relations: variable.relations.clone(),
                    edit_mode: variable.edit_mode,
                    valid_from,
                    valid_to,
                },
            );
        }
        Self {
            full,
            options: options.clone(),
        }
    }

    pub fn full_map(&self) -> &VariableMap {
        &self.full
    }

    /// Scope to a selection; nothing is returned when nothing is selected
    pub fn scope(
        &self,
        selection: Option<&str>,
        restricted: &RestrictedCodes,
    ) -> Option<ScopedVariables> {
        let selected = selection?;

        let mut variable_map = if selected == EDIT_ALL {
            self.full.clone()
        } else {
            match self.full.get(selected) {
                Some(variable) => VariableMap::from([(selected.to_string(), variable.clone())]),
                None => {
                    warn!(variable = selected, "Selected variable is not in the codebook");
                    return Some(ScopedVariables::default());
                }
            }
        };
        self.apply_restrictions(&mut variable_map, restricted);

        let relation_variable = self
            .full
            .get(selected)
            .filter(|v| v.relations.is_some());
        let (variable_type, show_values) = match relation_variable {
            Some(variable) => (
                VariableType::Relation,
                self.relation_show_values(&variable_map, variable),
            ),
            None => (VariableType::Span, variable_map.clone()),
        };
        let edit_mode =
            selected == EDIT_ALL || variable_map.get(selected).is_some_and(|v| v.edit_mode);

        debug!(
            selected,
            variables = variable_map.len(),
            shown = show_values.len(),
            "scoped variable map"
        );
        Some(ScopedVariables {
            variable_map,
            show_values,
            variable_type,
            edit_mode,
        })
    }

    /// Synthesize restricted values missing from the codebook, then keep only the
    /// restricted values
    fn apply_restrictions(&self, variable_map: &mut VariableMap, restricted: &RestrictedCodes) {
        for (name, values) in restricted {
            let Some(variable) = variable_map.get_mut(name) else {
                continue;
            };
            for value in values.iter().filter(|v| v.as_str() != EMPTY_VALUE) {
                if !variable.code_map.contains_key(value) {
                    let code = Code::standalone(value.clone(), self.options.palette_color(value));
                    variable.code_map.insert(value.clone(), code);
                }
            }
            variable.code_map.retain(|code, _| values.contains(code));
        }
    }

    fn relation_show_values(
        &self,
        variable_map: &VariableMap,
        selected: &ScopedVariable,
    ) -> VariableMap {
        let mut shown: BTreeMap<&str, BTreeSet<String>> = BTreeMap::new();

        for relation in selected.relations.iter().flatten() {
            let (Some(from), Some(to)) = (&relation.from, &relation.to) else {
                return self.full.clone();
            };
            for side in [from, to] {
                let Some(name) = side.variable.as_deref() else {
                    return self.full.clone();
                };
                let Some(variable) = self.full.get(name) else {
                    warn!(variable = name, "Relation refers to an unknown variable");
                    continue;
                };
                let values = shown.entry(name).or_default();
                match &side.values {
                    Some(listed) => values.extend(listed.iter().cloned()),
                    None => values.extend(variable.code_map.keys().cloned()),
                }
            }
        }

        let mut show_values = VariableMap::new();
        if let Some(own) = variable_map.get(&selected.name) {
            show_values.insert(selected.name.clone(), own.clone());
        }
        for (name, values) in shown {
            let Some(variable) = self.full.get(name) else {
                continue;
            };
            let mut limited = variable.clone();
            limited.code_map.retain(|code, _| values.contains(code));
            show_values.insert(name.to_string(), limited);
        }
        show_values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annot::codebook::code::CodeSpec;
    use crate::annot::codebook::relations::CodeRelation;

    fn variable(name: &str, codes: &[&str]) -> Variable {
        Variable {
            name: name.to_string(),
            codes: codes.iter().map(|c| CodeEntry::from(*c)).collect(),
            ..Default::default()
        }
    }

    fn builder(variables: &[Variable]) -> VariableMapBuilder {
        VariableMapBuilder::new(variables, &CodebookOptions::default())
    }

    fn keys(map: &BTreeMap<String, Code>) -> Vec<&str> {
        map.keys().map(String::as_str).collect()
    }

    #[test]
    fn test_full_map_keeps_selectable_codes() {
        let mut sentiment = variable("sentiment", &["pos"]);
        sentiment.codes.push(
            CodeSpec {
                active: Some(false),
                ..CodeSpec::new("neg")
            }
            .into(),
        );
        let b = builder(&[sentiment]);
        assert_eq!(keys(&b.full_map()["sentiment"].code_map), vec!["pos"]);
    }

    #[test]
    fn test_no_selection_and_unknown_selection() {
        let b = builder(&[variable("a", &["x"])]);
        assert!(b.scope(None, &RestrictedCodes::new()).is_none());
        let scoped = b.scope(Some("nope"), &RestrictedCodes::new()).unwrap();
        assert!(scoped.variable_map.is_empty());
    }

    #[test]
    fn test_selection_and_edit_all() {
        let b = builder(&[variable("a", &["x"]), variable("b", &["y"])]);
        let one = b.scope(Some("a"), &RestrictedCodes::new()).unwrap();
        assert_eq!(one.variable_map.len(), 1);
        assert_eq!(one.variable_type, VariableType::Span);
        assert!(!one.edit_mode);
        assert_eq!(one.show_values, one.variable_map);

        let all = b.scope(Some(EDIT_ALL), &RestrictedCodes::new()).unwrap();
        assert_eq!(all.variable_map.len(), 2);
        assert!(all.edit_mode);
    }

    #[test]
    fn test_restricted_codes() {
        let b = builder(&[variable("a", &["x", "y"])]);
        let restricted = RestrictedCodes::from([(
            "a".to_string(),
            BTreeSet::from(["y".to_string(), "new".to_string(), "EMPTY".to_string()]),
        )]);
        let scoped = b.scope(Some("a"), &restricted).unwrap();
        assert_eq!(keys(&scoped.variable_map["a"].code_map), vec!["new", "y"]);
        assert_eq!(keys(&b.full_map()["a"].code_map), vec!["x", "y"]);
    }

    #[test]
    fn test_relation_variable_shows_declared_values() {
        let mut rel = variable("rel", &["hits"]);
        rel.kind = VariableType::Relation;
        rel.relations = Some(vec![Relation {
            from: Some(CodeRelation {
                variable: Some("actor".to_string()),
                values: None,
            }),
            to: Some(CodeRelation {
                variable: Some("issue".to_string()),
                values: Some(vec!["tax".to_string()]),
            }),
            codes: None,
        }]);
        let b = builder(&[
            rel,
            variable("actor", &["gov", "ngo"]),
            variable("issue", &["tax", "health"]),
            variable("other", &["z"]),
        ]);
        let scoped = b.scope(Some("rel"), &RestrictedCodes::new()).unwrap();
        assert_eq!(scoped.variable_type, VariableType::Relation);
        let shown: Vec<_> = scoped.show_values.keys().map(String::as_str).collect();
        assert_eq!(shown, vec!["actor", "issue", "rel"]);
        assert_eq!(keys(&scoped.show_values["issue"].code_map), vec!["tax"]);
        assert_eq!(keys(&scoped.show_values["actor"].code_map), vec!["gov", "ngo"]);

        let between = scoped.variable_map["rel"].codes_between(("actor", "gov"), ("issue", "tax"));
        assert_eq!(between.len(), 1);
        assert!(scoped.variable_map["rel"]
            .codes_between(("issue", "tax"), ("actor", "gov"))
            .is_empty());
    }

    #[test]
    fn test_unknown_variable_types_still_load() {
        let variables: Vec<Variable> = serde_json::from_str(
            r#"[
                {"name": "q", "type": "confirm", "codes": ["ok"]},
                {"name": "r", "type": "freetext"},
                {"name": "s", "codes": ["x"]}
            ]"#,
        )
        .unwrap();
        let kinds: Vec<_> = variables.iter().map(|v| v.kind).collect();
        assert_eq!(
            kinds,
            vec![VariableType::Confirm, VariableType::Other, VariableType::Span]
        );

        let b = builder(&variables);
        assert_eq!(b.full_map().len(), 3);
        let scoped = b.scope(Some("q"), &RestrictedCodes::new()).unwrap();
        assert_eq!(scoped.variable_type, VariableType::Span);
    }

    #[test]
    fn test_open_relation_clause_shows_everything() {
        let mut rel = variable("rel", &["link"]);
        rel.relations = Some(vec![Relation::default()]);
        let b = builder(&[rel, variable("a", &["x"])]);
        let scoped = b.scope(Some("rel"), &RestrictedCodes::new()).unwrap();
        assert_eq!(scoped.show_values.len(), 2);
    }
}
