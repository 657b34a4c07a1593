//! The wire-format annotation record

use serde::{Deserialize, Serialize};

use crate::annot::serde_helpers::scalar_string;

/// One end of a relation record, identifying a span annotation
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AnnotationEndpoint {
    pub variable: String,
    #[serde(deserialize_with = "scalar_string")]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
}

impl AnnotationEndpoint {
    pub fn new(variable: &str, value: &str, field: &str, offset: usize, length: usize) -> Self {
        Self {
            variable: variable.to_string(),
            value: value.to_string(),
            field: Some(field.to_string()),
            offset: Some(offset),
            length: Some(length),
            index: None,
        }
    }
}

/// An annotation record as exchanged with the outside world
///
/// A record with `from` and `to` is a relation. A record with `offset` or `index` is a
/// span annotation. Anything else annotates a whole field, or the whole unit when
/// `field` is absent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Annotation {
    pub variable: String,
    #[serde(deserialize_with = "scalar_string")]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<usize>,
    /// Direct token index; takes precedence over `offset` when decoding
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<AnnotationEndpoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<AnnotationEndpoint>,
}

/// Which of the three maps a record belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationKind {
    Span,
    Field,
    Relation,
}

impl Annotation {
    fn bare(variable: &str, value: &str) -> Self {
        Self {
            variable: variable.to_string(),
            value: value.to_string(),
            field: None,
            offset: None,
            length: None,
            index: None,
            text: None,
            from: None,
            to: None,
        }
    }

    pub fn span(variable: &str, value: &str, field: &str, offset: usize, length: usize) -> Self {
        Self {
            field: Some(field.to_string()),
            offset: Some(offset),
            length: Some(length),
            ..Self::bare(variable, value)
        }
    }

    pub fn field(variable: &str, value: &str, field: Option<&str>) -> Self {
        Self {
            field: field.map(str::to_string),
            ..Self::bare(variable, value)
        }
    }

    pub fn relation(
        variable: &str,
        value: &str,
        from: AnnotationEndpoint,
        to: AnnotationEndpoint,
    ) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
            ..Self::bare(variable, value)
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn kind(&self) -> AnnotationKind {
        if self.from.is_some() && self.to.is_some() {
            AnnotationKind::Relation
        } else if self.offset.is_some() || self.index.is_some() {
            AnnotationKind::Span
        } else {
            AnnotationKind::Field
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_shape() {
        assert_eq!(Annotation::span("a", "b", "text", 0, 1).kind(), AnnotationKind::Span);
        assert_eq!(Annotation::field("a", "b", Some("text")).kind(), AnnotationKind::Field);
        let end = AnnotationEndpoint::new("a", "b", "text", 0, 1);
        assert_eq!(
            Annotation::relation("r", "x", end.clone(), end).kind(),
            AnnotationKind::Relation
        );
    }

    #[test]
    fn test_wire_shape() {
        let record: Annotation =
            serde_json::from_str(r#"{"variable": "q", "value": 4, "field": "text"}"#).unwrap();
        assert_eq!(record.value, "4");
        assert_eq!(
            serde_json::to_string(&record).unwrap(),
            r#"{"variable":"q","value":"4","field":"text"}"#
        );
    }
}
