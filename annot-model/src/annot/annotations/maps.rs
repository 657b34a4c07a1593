//! The in-memory annotation indexes
//!
//! [SpanAnnotations] is keyed by token index, so the UI can ask "what is on this token"
//! directly. A run of adjacent tokens in one field carrying the same [SpanKey] is one
//! logical annotation; every token of the run holds an identical [SpanAnnotation].

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::annot::tokens::token::covered_text;
use crate::annot::tokens::Token;

/// The `(variable, value)` pair identifying a span annotation on a token
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpanKey {
    pub variable: String,
    pub value: String,
}

impl SpanKey {
    pub fn new(variable: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for SpanKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.variable, self.value)
    }
}

/// The annotation a token belongs to, identical for every token of the run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanAnnotation {
    pub variable: String,
    pub value: String,
    pub field: String,
    pub offset: usize,
    pub length: usize,
    pub text: String,
    /// First and last token index of the run
    pub span: [usize; 2],
}

impl SpanAnnotation {
    /// Describe the run `start..=end`; both indices must be valid for `tokens`
    pub fn from_run(tokens: &[Token], key: &SpanKey, start: usize, end: usize) -> Self {
        let first = &tokens[start];
        Self {
            variable: key.variable.clone(),
            value: key.value.clone(),
            field: first.field.clone(),
            offset: first.offset,
            length: tokens[end].end() - first.offset,
            text: covered_text(tokens, start, end),
            span: [start, end],
        }
    }

    pub fn key(&self) -> SpanKey {
        SpanKey::new(&self.variable, &self.value)
    }
}

/// Token index → span key → annotation detail
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpanAnnotations {
    by_token: BTreeMap<usize, BTreeMap<SpanKey, SpanAnnotation>>,
}

impl SpanAnnotations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.by_token.is_empty()
    }

    /// Annotations on one token
    pub fn get(&self, index: usize) -> Option<&BTreeMap<SpanKey, SpanAnnotation>> {
        self.by_token.get(&index)
    }

    pub fn contains(&self, index: usize, key: &SpanKey) -> bool {
        self.by_token
            .get(&index)
            .is_some_and(|keys| keys.contains_key(key))
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &BTreeMap<SpanKey, SpanAnnotation>)> {
        self.by_token.iter().map(|(i, keys)| (*i, keys))
    }

    /// Every distinct key in use
    pub fn keys(&self) -> BTreeSet<SpanKey> {
        self.by_token
            .values()
            .flat_map(|keys| keys.keys().cloned())
            .collect()
    }

    /// Mark tokens `start..=end` with `key`, then rebuild the details of that key
    pub fn insert_run(&mut self, tokens: &[Token], key: &SpanKey, start: usize, end: usize) {
        let detail = SpanAnnotation::from_run(tokens, key, start, end);
        for index in start..=end {
            self.by_token
                .entry(index)
                .or_default()
                .insert(key.clone(), detail.clone());
        }
    }

    /// Unmark tokens `start..=end` for `key`
    pub fn remove_run(&mut self, key: &SpanKey, start: usize, end: usize) {
        for index in start..=end {
            if let Some(keys) = self.by_token.get_mut(&index) {
                keys.remove(key);
                if keys.is_empty() {
                    self.by_token.remove(&index);
                }
            }
        }
    }

    /// The run of `key` containing token `index`
    pub fn run_at(&self, tokens: &[Token], index: usize, key: &SpanKey) -> Option<(usize, usize)> {
        if index >= tokens.len() || !self.contains(index, key) {
            return None;
        }
        let field = &tokens[index].field;
        let mut start = index;
        while start > 0 && tokens[start - 1].field == *field && self.contains(start - 1, key) {
            start -= 1;
        }
        let mut end = index;
        while end + 1 < tokens.len() && tokens[end + 1].field == *field && self.contains(end + 1, key)
        {
            end += 1;
        }
        Some((start, end))
    }

    /// All maximal runs, ordered by first token and then key
    ///
    /// Indices past the end of `tokens` are ignored.
    pub fn runs(&self, tokens: &[Token]) -> Vec<(SpanKey, usize, usize)> {
        let mut open: BTreeMap<&SpanKey, (usize, usize)> = BTreeMap::new();
        let mut runs = Vec::new();

        for (&index, keys) in self.by_token.range(..tokens.len()) {
            let field = &tokens[index].field;
            let continues = |end: usize| end + 1 == index && tokens[end].field == *field;

            open.retain(|key, (start, end)| {
                if keys.contains_key(*key) && continues(*end) {
                    true
                } else {
                    runs.push(((*key).clone(), *start, *end));
                    false
                }
            });
            for key in keys.keys() {
                open.entry(key)
                    .and_modify(|(_, end)| *end = index)
                    .or_insert((index, index));
            }
        }
        runs.extend(open.into_iter().map(|(key, (s, e))| (key.clone(), s, e)));
        runs.sort_by(|a, b| (a.1, &a.0).cmp(&(b.1, &b.0)));
        runs
    }

    /// Rewrite every detail from the run it belongs to and drop indices past `tokens`
    pub fn normalize(&mut self, tokens: &[Token]) {
        let runs = self.runs(tokens);
        self.by_token.clear();
        for (key, start, end) in runs {
            self.insert_run(tokens, &key, start, end);
        }
    }
}

impl Serialize for SpanAnnotations {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.by_token.len()))?;
        for (index, keys) in &self.by_token {
            let keyed: BTreeMap<String, &SpanAnnotation> =
                keys.iter().map(|(k, v)| (k.to_string(), v)).collect();
            map.serialize_entry(index, &keyed)?;
        }
        map.end()
    }
}

/// Field name → variable → value
///
/// The empty field name holds unit-level annotations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldAnnotations(BTreeMap<String, BTreeMap<String, String>>);

impl FieldAnnotations {
    pub const UNIT: &'static str = "";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Set a value, replacing any previous value of the variable in this field
    pub fn set(&mut self, field: &str, variable: &str, value: &str) {
        self.0
            .entry(field.to_string())
            .or_default()
            .insert(variable.to_string(), value.to_string());
    }

    pub fn get(&self, field: &str, variable: &str) -> Option<&str> {
        self.0.get(field)?.get(variable).map(String::as_str)
    }

    pub fn remove(&mut self, field: &str, variable: &str) -> Option<String> {
        let vars = self.0.get_mut(field)?;
        let removed = vars.remove(variable);
        if vars.is_empty() {
            self.0.remove(field);
        }
        removed
    }

    /// `(field, variable, value)` in field then variable order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        self.0.iter().flat_map(|(field, vars)| {
            vars.iter()
                .map(move |(var, value)| (field.as_str(), var.as_str(), value.as_str()))
        })
    }
}

/// A relation endpoint: the run of one span annotation
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SpanRef {
    pub variable: String,
    pub value: String,
    pub span: [usize; 2],
}

impl SpanRef {
    pub fn new(key: &SpanKey, start: usize, end: usize) -> Self {
        Self {
            variable: key.variable.clone(),
            value: key.value.clone(),
            span: [start, end],
        }
    }

    pub fn key(&self) -> SpanKey {
        SpanKey::new(&self.variable, &self.value)
    }

    pub fn start(&self) -> usize {
        self.span[0]
    }

    pub fn end(&self) -> usize {
        self.span[1]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelationAnnotation {
    pub variable: String,
    pub value: String,
    pub from: SpanRef,
    pub to: SpanRef,
}

/// Relations in insertion order, without duplicates
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RelationAnnotations(Vec<RelationAnnotation>);

impl RelationAnnotations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RelationAnnotation> {
        self.0.iter()
    }

    pub fn contains(&self, relation: &RelationAnnotation) -> bool {
        self.0.contains(relation)
    }

    /// Returns false when the relation was already present
    pub fn insert(&mut self, relation: RelationAnnotation) -> bool {
        if self.contains(&relation) {
            return false;
        }
        self.0.push(relation);
        true
    }

    pub fn remove(&mut self, relation: &RelationAnnotation) -> bool {
        let before = self.0.len();
        self.0.retain(|r| r != relation);
        self.0.len() != before
    }

    pub fn retain(&mut self, keep: impl FnMut(&RelationAnnotation) -> bool) {
        self.0.retain(keep);
    }

    /// Move endpoints onto the current runs of their span annotations
    ///
    /// An endpoint follows the run that contains its first token, or failing that any
    /// token of its old range. Relations left without a run on either side are removed
    /// and returned. Relations that become duplicates collapse into one.
    pub fn resnap(&mut self, spans: &SpanAnnotations, tokens: &[Token]) -> Vec<RelationAnnotation> {
        let snap = |endpoint: &SpanRef| -> Option<SpanRef> {
            let key = endpoint.key();
            (endpoint.start()..=endpoint.end())
                .find_map(|i| spans.run_at(tokens, i, &key))
                .map(|(start, end)| SpanRef::new(&key, start, end))
        };

        let mut dropped = Vec::new();
        let mut kept = Vec::with_capacity(self.0.len());
        for relation in self.0.drain(..) {
            match (snap(&relation.from), snap(&relation.to)) {
                (Some(from), Some(to)) => {
                    let snapped = RelationAnnotation { from, to, ..relation };
                    if !kept.contains(&snapped) {
                        kept.push(snapped);
                    }
                }
                _ => dropped.push(relation),
            }
        }
        self.0 = kept;
        dropped
    }
}
