//! Decoding: wire records to token-indexed maps

use serde::Serialize;
use tracing::{debug, warn};

use super::maps::{
    FieldAnnotations, RelationAnnotation, RelationAnnotations, SpanAnnotations, SpanKey, SpanRef,
};
use super::record::{Annotation, AnnotationEndpoint, AnnotationKind};
use super::resolve::TokenLookup;
use crate::annot::error::{ResolutionProblem, ResolutionWarning};
use crate::annot::tokens::Token;

/// The three maps of a unit, plus what had to be dropped to build them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DecodedAnnotations {
    pub spans: SpanAnnotations,
    pub fields: FieldAnnotations,
    pub relations: RelationAnnotations,
    #[serde(skip)]
    pub warnings: Vec<ResolutionWarning>,
}

impl DecodedAnnotations {
    fn drop_record(&mut self, variable: &str, value: &str, problem: ResolutionProblem) {
        let warning = ResolutionWarning {
            variable: variable.to_string(),
            value: value.to_string(),
            problem,
        };
        warn!("{}", warning);
        self.warnings.push(warning);
    }
}

/// Place every record on `tokens`
///
/// Span and field records are placed first so that relation endpoints can be matched
/// against complete span runs. Records that cannot be placed are dropped and reported
/// in [`DecodedAnnotations::warnings`].
pub fn decode(annotations: &[Annotation], tokens: &[Token]) -> DecodedAnnotations {
    let lookup = TokenLookup::new(tokens);
    let mut decoded = DecodedAnnotations::default();
    let mut relation_records = Vec::new();

    for record in annotations {
        match record.kind() {
            AnnotationKind::Relation => relation_records.push(record),
            AnnotationKind::Field => decoded.fields.set(
                record.field.as_deref().unwrap_or(FieldAnnotations::UNIT),
                &record.variable,
                &record.value,
            ),
            AnnotationKind::Span => {
                let resolved = lookup.resolve(
                    record.field.as_deref(),
                    record.offset,
                    record.length,
                    record.index,
                );
                match resolved {
                    Ok((start, end)) => {
                        let key = SpanKey::new(&record.variable, &record.value);
                        decoded.spans.insert_run(tokens, &key, start, end);
                    }
                    Err(problem) => decoded.drop_record(&record.variable, &record.value, problem),
                }
            }
        }
    }
    decoded.spans.normalize(tokens);

    for record in relation_records {
        let (Some(from), Some(to)) = (&record.from, &record.to) else {
            continue;
        };
        let endpoints = resolve_endpoint(&lookup, &decoded.spans, from)
            .and_then(|from| Ok((from, resolve_endpoint(&lookup, &decoded.spans, to)?)));
        match endpoints {
            Ok((from, to)) => {
                decoded.relations.insert(RelationAnnotation {
                    variable: record.variable.clone(),
                    value: record.value.clone(),
                    from,
                    to,
                });
            }
            Err(problem) => decoded.drop_record(&record.variable, &record.value, problem),
        }
    }

    debug!(
        records = annotations.len(),
        spans = decoded.spans.keys().len(),
        relations = decoded.relations.len(),
        dropped = decoded.warnings.len(),
        "decoded annotations"
    );
    decoded
}

/// The span run an endpoint refers to
fn resolve_endpoint(
    lookup: &TokenLookup<'_>,
    spans: &SpanAnnotations,
    endpoint: &AnnotationEndpoint,
) -> Result<SpanRef, ResolutionProblem> {
    let (start, end) = lookup.resolve(
        endpoint.field.as_deref(),
        endpoint.offset,
        endpoint.length,
        endpoint.index,
    )?;
    let key = SpanKey::new(&endpoint.variable, &endpoint.value);
    (start..=end)
        .find_map(|i| spans.run_at(lookup.tokens(), i, &key))
        .map(|(s, e)| SpanRef::new(&key, s, e))
        .ok_or(ResolutionProblem::DanglingEndpoint)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annot::testing::factories::{mk_tokens, span};

    fn hello() -> Vec<Token> {
        mk_tokens("text", &[("Hello", " "), ("world", ""), (".", "")])
    }

    #[test]
    fn test_span_on_first_token_only() {
        let tokens = hello();
        let decoded = decode(&[span("sent", "pos", "text", 0, 5)], &tokens);
        assert!(decoded.warnings.is_empty());
        let on_first = decoded.spans.get(0).unwrap();
        assert_eq!(on_first[&SpanKey::new("sent", "pos")].text, "Hello ");
        assert!(decoded.spans.get(1).is_none());
    }

    #[test]
    fn test_adjacent_records_merge() {
        let tokens = hello();
        let decoded = decode(
            &[span("sent", "pos", "text", 0, 5), span("sent", "pos", "text", 6, 5)],
            &tokens,
        );
        let detail = &decoded.spans.get(1).unwrap()[&SpanKey::new("sent", "pos")];
        assert_eq!(detail.span, [0, 1]);
        assert_eq!(detail.text, "Hello world");
    }

    #[test]
    fn test_index_record() {
        let tokens = hello();
        let mut record = Annotation::span("sent", "neg", "text", 0, 1);
        record.offset = None;
        record.length = None;
        record.index = Some(2);
        let decoded = decode(&[record], &tokens);
        assert!(decoded.spans.contains(2, &SpanKey::new("sent", "neg")));
    }

    #[test]
    fn test_unresolvable_records_are_dropped() {
        let tokens = hello();
        let decoded = decode(
            &[
                span("sent", "pos", "text", 50, 2),
                span("sent", "pos", "comment", 0, 2),
                span("sent", "neg", "text", 0, 5),
            ],
            &tokens,
        );
        assert_eq!(decoded.warnings.len(), 2);
        assert_eq!(decoded.spans.keys().len(), 1);
    }

    #[test]
    fn test_field_records() {
        let decoded = decode(
            &[
                Annotation::field("topic", "a", Some("text")),
                Annotation::field("topic", "b", Some("text")),
                Annotation::field("done", "yes", None),
            ],
            &hello(),
        );
        assert_eq!(decoded.fields.get("text", "topic"), Some("b"));
        assert_eq!(decoded.fields.get(FieldAnnotations::UNIT, "done"), Some("yes"));
    }

    #[test]
    fn test_relation_endpoints_snap_to_runs() {
        let tokens = hello();
        let records = vec![
            span("actor", "x", "text", 0, 5),
            span("target", "y", "text", 6, 6),
            Annotation::relation(
                "rel",
                "hits",
                AnnotationEndpoint::new("actor", "x", "text", 0, 5),
                AnnotationEndpoint::new("target", "y", "text", 11, 1),
            ),
            Annotation::relation(
                "rel",
                "hits",
                AnnotationEndpoint::new("actor", "x", "text", 6, 5),
                AnnotationEndpoint::new("target", "y", "text", 6, 5),
            ),
        ];
        let decoded = decode(&records, &tokens);
        assert_eq!(decoded.relations.len(), 1);
        let relation = decoded.relations.iter().next().unwrap();
        assert_eq!(relation.from.span, [0, 0]);
        assert_eq!(relation.to.span, [1, 2]);
        assert_eq!(
            decoded.warnings[0].problem,
            ResolutionProblem::DanglingEndpoint
        );
    }
}
