//! The single mutation point for a unit's annotations
//!
//! Every edit is validated before any map is touched, so a rejected edit leaves the
//! manager exactly as it was. After span edits the relation endpoints are moved onto the
//! current runs; relations that lost an endpoint are removed.

use std::sync::Arc;

use tracing::debug;

use super::decode::decode;
use super::encode::encode;
use super::history::{CodeHistory, HistoryOptions};
use super::maps::{
    FieldAnnotations, RelationAnnotation, RelationAnnotations, SpanAnnotations, SpanKey, SpanRef,
};
use super::record::Annotation;
use crate::annot::error::{AnnotationError, ResolutionWarning};
use crate::annot::tokens::Token;

#[derive(Debug, Clone)]
pub struct AnnotationManager {
    tokens: Arc<[Token]>,
    spans: SpanAnnotations,
    fields: FieldAnnotations,
    relations: RelationAnnotations,
    history: CodeHistory,
}

impl AnnotationManager {
    /// Decode `annotations` onto `tokens`; records that could not be placed are returned
    pub fn new(
        tokens: Arc<[Token]>,
        annotations: &[Annotation],
        options: HistoryOptions,
    ) -> (Self, Vec<ResolutionWarning>) {
        let decoded = decode(annotations, &tokens);
        let manager = Self {
            spans: decoded.spans,
            fields: decoded.fields,
            relations: decoded.relations,
            history: CodeHistory::from_annotations(annotations, options),
            tokens,
        };
        (manager, decoded.warnings)
    }

    pub fn tokens(&self) -> &Arc<[Token]> {
        &self.tokens
    }

    pub fn spans(&self) -> &SpanAnnotations {
        &self.spans
    }

    pub fn fields(&self) -> &FieldAnnotations {
        &self.fields
    }

    pub fn relations(&self) -> &RelationAnnotations {
        &self.relations
    }

    pub fn history(&self) -> &CodeHistory {
        &self.history
    }

    /// The current state as wire records
    pub fn export(&self) -> Vec<Annotation> {
        encode(&self.spans, &self.fields, &self.relations, &self.tokens)
    }

    /// Annotate tokens `start..=end`, merging with overlapping or adjacent runs of the
    /// same variable and value; returns the resulting run
    pub fn create_span(
        &mut self,
        variable: &str,
        value: &str,
        start: usize,
        end: usize,
    ) -> Result<SpanRef, AnnotationError> {
        self.check_range(start, end)?;
        let key = SpanKey::new(variable, value);

        self.spans.insert_run(&self.tokens, &key, start, end);
        self.after_span_edit();
        self.history.record(variable, value);

        let (start, end) = self
            .spans
            .run_at(&self.tokens, start, &key)
            .unwrap_or((start, end));
        debug!(%key, start, end, "created span annotation");
        Ok(SpanRef::new(&key, start, end))
    }

    /// Remove the whole run of `variable`/`value` containing token `index`, along with
    /// the relations that point at it
    pub fn remove_span(
        &mut self,
        variable: &str,
        value: &str,
        index: usize,
    ) -> Result<SpanRef, AnnotationError> {
        let key = SpanKey::new(variable, value);
        let (start, end) = self.run_at(index, &key)?;

        self.spans.remove_run(&key, start, end);
        self.after_span_edit();
        debug!(%key, start, end, "removed span annotation");
        Ok(SpanRef::new(&key, start, end))
    }

    /// Give the run containing token `index` a new value
    ///
    /// Relations attached to the run are carried over to the new value.
    pub fn update_span(
        &mut self,
        variable: &str,
        value: &str,
        new_value: &str,
        index: usize,
    ) -> Result<SpanRef, AnnotationError> {
        let old_key = SpanKey::new(variable, value);
        let (start, end) = self.run_at(index, &old_key)?;
        if value == new_value {
            return Ok(SpanRef::new(&old_key, start, end));
        }
        let old = SpanRef::new(&old_key, start, end);
        let new_key = SpanKey::new(variable, new_value);

        self.spans.remove_run(&old_key, start, end);
        self.spans.insert_run(&self.tokens, &new_key, start, end);
        self.spans.normalize(&self.tokens);

        let (new_start, new_end) = self
            .spans
            .run_at(&self.tokens, start, &new_key)
            .unwrap_or((start, end));
        let new = SpanRef::new(&new_key, new_start, new_end);
        let retarget = |endpoint: &mut SpanRef| {
            if *endpoint == old {
                *endpoint = new.clone();
            }
        };
        let relations = std::mem::take(&mut self.relations);
        for mut relation in relations.iter().cloned() {
            retarget(&mut relation.from);
            retarget(&mut relation.to);
            self.relations.insert(relation);
        }

        self.after_span_edit();
        self.history.record(variable, new_value);
        Ok(new)
    }

    /// Relate two existing span annotations; returns false if the relation already
    /// existed
    pub fn add_relation(
        &mut self,
        variable: &str,
        value: &str,
        from: &SpanRef,
        to: &SpanRef,
    ) -> Result<bool, AnnotationError> {
        self.check_endpoint(from)?;
        self.check_endpoint(to)?;

        let added = self.relations.insert(RelationAnnotation {
            variable: variable.to_string(),
            value: value.to_string(),
            from: from.clone(),
            to: to.clone(),
        });
        self.history.record(variable, value);
        Ok(added)
    }

    pub fn remove_relation(&mut self, relation: &RelationAnnotation) -> bool {
        self.relations.remove(relation)
    }

    /// Set a field annotation; `None` addresses the unit as a whole
    pub fn set_field(&mut self, field: Option<&str>, variable: &str, value: &str) {
        self.fields
            .set(field.unwrap_or(FieldAnnotations::UNIT), variable, value);
        self.history.record(variable, value);
    }

    pub fn clear_field(&mut self, field: Option<&str>, variable: &str) -> Option<String> {
        self.fields
            .remove(field.unwrap_or(FieldAnnotations::UNIT), variable)
    }

    fn check_index(&self, index: usize) -> Result<&Token, AnnotationError> {
        self.tokens.get(index).ok_or(AnnotationError::TokenOutOfRange {
            index,
            len: self.tokens.len(),
        })
    }

    fn check_range(&self, start: usize, end: usize) -> Result<(), AnnotationError> {
        if start > end {
            return Err(AnnotationError::ReversedSpan { start, end });
        }
        let first = self.check_index(start)?;
        let last = self.check_index(end)?;
        if first.field != last.field {
            return Err(AnnotationError::CrossFieldSpan {
                start,
                end,
                from_field: first.field.clone(),
                to_field: last.field.clone(),
            });
        }
        Ok(())
    }

    fn run_at(&self, index: usize, key: &SpanKey) -> Result<(usize, usize), AnnotationError> {
        self.check_index(index)?;
        self.spans
            .run_at(&self.tokens, index, key)
            .ok_or_else(|| AnnotationError::NoSpanAnnotation {
                index,
                variable: key.variable.clone(),
                value: key.value.clone(),
            })
    }

    fn check_endpoint(&self, endpoint: &SpanRef) -> Result<(), AnnotationError> {
        let dangling = || AnnotationError::DanglingEndpoint {
            variable: endpoint.variable.clone(),
            value: endpoint.value.clone(),
            start: endpoint.start(),
            end: endpoint.end(),
        };
        self.check_index(endpoint.start())?;
        match self.spans.run_at(&self.tokens, endpoint.start(), &endpoint.key()) {
            Some((start, end)) if start == endpoint.start() && end == endpoint.end() => Ok(()),
            _ => Err(dangling()),
        }
    }

    fn after_span_edit(&mut self) {
        self.spans.normalize(&self.tokens);
        for relation in self.relations.resnap(&self.spans, &self.tokens) {
            debug!(
                variable = %relation.variable,
                value = %relation.value,
                "removed relation without span annotation"
            );
        }
    }
}
