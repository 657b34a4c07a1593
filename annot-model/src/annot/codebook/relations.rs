//! Valid relation endpoints
//!
//! A relation variable declares clauses: which span annotations may be the `from` end,
//! which may be the `to` end, and which relation codes apply. The clauses are indexed
//! into [`ValidRelation`] lookups so that, for a given span annotation, the relations it
//! may start or end are found without scanning the clauses.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::code::Code;

/// Matches any variable or value
pub const WILDCARD: &str = "*";

/// One side of a relation clause; absent parts are unconstrained
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeRelation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<String>>,
}

/// A relation clause of a relation variable
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<CodeRelation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<CodeRelation>,
    /// Relation codes allowed by this clause; all codes when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codes: Option<Vec<String>>,
}

/// variable → value → clause index → relation codes, with [`WILDCARD`] keys
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidRelation(BTreeMap<String, BTreeMap<String, BTreeMap<usize, Vec<Code>>>>);

impl ValidRelation {
    /// Build the `from` and `to` lookups for a relation variable's clauses
    ///
    /// `code_map` holds the relation variable's own selectable codes; clause codes that
    /// are not in it are left out.
    pub fn build(relations: &[Relation], code_map: &BTreeMap<String, Code>) -> (Self, Self) {
        let mut valid_from = Self::default();
        let mut valid_to = Self::default();

        for (id, relation) in relations.iter().enumerate() {
            let codes: Vec<Code> = match &relation.codes {
                Some(names) => names.iter().filter_map(|n| code_map.get(n).cloned()).collect(),
                None => code_map.values().cloned().collect(),
            };
            valid_from.add(id, relation.from.as_ref(), &codes);
            valid_to.add(id, relation.to.as_ref(), &codes);
        }
        (valid_from, valid_to)
    }

    fn add(&mut self, id: usize, side: Option<&CodeRelation>, codes: &[Code]) {
        let Some(variable) = side.and_then(|s| s.variable.as_deref()) else {
            self.entry(WILDCARD, WILDCARD).insert(id, codes.to_vec());
            return;
        };
        match side.and_then(|s| s.values.as_ref()) {
            Some(values) => {
                for value in values {
                    self.entry(variable, value).insert(id, codes.to_vec());
                }
            }
            None => {
                self.entry(variable, WILDCARD).insert(id, codes.to_vec());
            }
        }
    }

    fn entry(&mut self, variable: &str, value: &str) -> &mut BTreeMap<usize, Vec<Code>> {
        self.0
            .entry(variable.to_string())
            .or_default()
            .entry(value.to_string())
            .or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Clause index → relation codes valid for a span annotation
    ///
    /// Entries for the exact variable and value override entries for the variable with
    /// any value, which override entries for any variable.
    pub fn lookup(&self, variable: &str, value: &str) -> BTreeMap<usize, &[Code]> {
        let levels = [
            (WILDCARD, WILDCARD),
            (variable, WILDCARD),
            (variable, value),
        ];
        let mut found = BTreeMap::new();
        for (var, val) in levels {
            if let Some(entries) = self.0.get(var).and_then(|values| values.get(val)) {
                for (id, codes) in entries {
                    found.insert(*id, codes.as_slice());
                }
            }
        }
        found
    }

    /// Relation codes for a relation from one span annotation to another
    ///
    /// Only clauses matching both ends count. Codes are returned once, in clause order.
    pub fn codes_between(
        valid_from: &Self,
        valid_to: &Self,
        from: (&str, &str),
        to: (&str, &str),
    ) -> Vec<Code> {
        let to_ids = valid_to.lookup(to.0, to.1);
        let mut codes: Vec<Code> = Vec::new();
        for (id, from_codes) in valid_from.lookup(from.0, from.1) {
            if !to_ids.contains_key(&id) {
                continue;
            }
            for code in from_codes {
                if !codes.iter().any(|c| c.code == code.code) {
                    codes.push(code.clone());
                }
            }
        }
        codes
    }
}
