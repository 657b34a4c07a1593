//! Per-unit annotation state
//!
//! A `UnitState` lives as long as its unit is active. When the coder moves on, a new
//! state is loaded and the old one must not export anymore: exports are only handed out
//! to callers that still hold the token sequence of this very state.

use std::sync::Arc;

use tracing::debug;

use super::content::{prepare_document, Document, Unit, UnitOptions};
use crate::annot::annotations::{token_annotations, Annotation, AnnotationManager};
use crate::annot::error::{ResolutionWarning, ValidationError};
use crate::annot::tokens::Token;

#[derive(Debug, Clone)]
pub struct UnitState {
    document: Document,
    manager: AnnotationManager,
    warnings: Vec<ResolutionWarning>,
}

impl UnitState {
    /// Prepare a unit and decode its annotations
    ///
    /// `annotations` replaces the unit's own list when given. When neither has any
    /// records, annotations embedded in imported tokens are used.
    pub fn load(
        unit: &Unit,
        annotations: Option<&[Annotation]>,
        options: &UnitOptions,
    ) -> Result<Self, ValidationError> {
        let document = prepare_document(unit, options)?;

        let mut records = annotations
            .map(<[Annotation]>::to_vec)
            .unwrap_or_else(|| unit.unit.annotations.clone());
        if records.is_empty() {
            records = token_annotations(&document.tokens);
        }

        let (manager, warnings) =
            AnnotationManager::new(Arc::clone(&document.tokens), &records, options.history);
        debug!(
            records = records.len(),
            dropped = warnings.len(),
            "loaded unit state"
        );
        Ok(Self {
            document,
            manager,
            warnings,
        })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn tokens(&self) -> &Arc<[Token]> {
        &self.document.tokens
    }

    pub fn manager(&self) -> &AnnotationManager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut AnnotationManager {
        &mut self.manager
    }

    /// Records that could not be placed when the unit was loaded
    pub fn warnings(&self) -> &[ResolutionWarning] {
        &self.warnings
    }

    pub fn export(&self) -> Vec<Annotation> {
        self.manager.export()
    }

    /// Export only if `tokens` is this unit's token sequence (the same allocation)
    pub fn export_for(&self, tokens: &Arc<[Token]>) -> Option<Vec<Annotation>> {
        if Arc::ptr_eq(tokens, self.tokens()) {
            Some(self.export())
        } else {
            debug!("refusing export for tokens of another unit");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(json: &str) -> Unit {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_load_decodes_and_reports() {
        let u = unit(
            r#"{"unit": {
                "textFields": [{"name": "text", "value": "Hello world."}],
                "annotations": [
                    {"variable": "sent", "value": "pos", "field": "text", "offset": 0, "length": 5},
                    {"variable": "sent", "value": "neg", "field": "text", "offset": 99, "length": 1}
                ]
            }}"#,
        );
        let state = UnitState::load(&u, None, &UnitOptions::default()).unwrap();
        assert_eq!(state.warnings().len(), 1);
        assert_eq!(state.export().len(), 1);
        assert_eq!(state.manager().history().get("sent"), ["pos", "neg"]);
    }

    #[test]
    fn test_explicit_annotations_replace_unit_annotations() {
        let u = unit(
            r#"{"unit": {
                "textFields": [{"name": "text", "value": "a b"}],
                "annotations": [{"variable": "x", "value": "1", "field": "text", "offset": 0, "length": 1}]
            }}"#,
        );
        let state = UnitState::load(&u, Some(&[]), &UnitOptions::default()).unwrap();
        assert!(state.export().is_empty());
    }

    #[test]
    fn test_token_annotations_seed_empty_units() {
        let u = unit(
            r#"{"unit": {"tokens": [
                {"text": "New", "annotations": [{"name": "ner", "value": "LOC"}]},
                {"text": "York", "annotations": [{"name": "ner", "value": "LOC"}]}
            ]}}"#,
        );
        let state = UnitState::load(&u, None, &UnitOptions::default()).unwrap();
        let exported = state.export();
        assert_eq!(exported.len(), 1);
        assert_eq!(exported[0].text.as_deref(), Some("New York "));
    }

    #[test]
    fn test_export_refused_for_other_tokens() {
        let u = unit(r#"{"unit": {"textFields": [{"name": "text", "value": "a b"}]}}"#);
        let mut state = UnitState::load(&u, None, &UnitOptions::default()).unwrap();
        state.manager_mut().create_span("x", "1", 0, 1).unwrap();

        let same = Arc::clone(state.tokens());
        assert_eq!(state.export_for(&same).map(|r| r.len()), Some(1));

        let other = UnitState::load(&u, None, &UnitOptions::default()).unwrap();
        assert_eq!(state.export_for(other.tokens()), None);
    }
}
