//! Encoding: token-indexed maps back to wire records

use tracing::debug;

use super::maps::{FieldAnnotations, RelationAnnotations, SpanAnnotations, SpanKey, SpanRef};
use super::record::{Annotation, AnnotationEndpoint};
use crate::annot::tokens::token::covered_text;
use crate::annot::tokens::Token;

/// All records of a unit: spans, then field annotations, then relations
pub fn encode(
    spans: &SpanAnnotations,
    fields: &FieldAnnotations,
    relations: &RelationAnnotations,
    tokens: &[Token],
) -> Vec<Annotation> {
    let mut records = encode_spans(spans, tokens);
    records.extend(encode_fields(fields));
    records.extend(encode_relations(relations, tokens));
    debug!(records = records.len(), "encoded annotations");
    records
}

/// One record per maximal run, ordered by first token and then key
pub fn encode_spans(spans: &SpanAnnotations, tokens: &[Token]) -> Vec<Annotation> {
    spans
        .runs(tokens)
        .into_iter()
        .map(|(key, start, end)| span_record(tokens, &key, start, end))
        .collect()
}

/// One record per field annotation; unit-level annotations carry no field
pub fn encode_fields(fields: &FieldAnnotations) -> Vec<Annotation> {
    fields
        .iter()
        .map(|(field, variable, value)| {
            let field = (field != FieldAnnotations::UNIT).then_some(field);
            Annotation::field(variable, value, field)
        })
        .collect()
}

/// One record per relation, endpoints given by field and offset
pub fn encode_relations(relations: &RelationAnnotations, tokens: &[Token]) -> Vec<Annotation> {
    relations
        .iter()
        .filter(|r| r.from.end() < tokens.len() && r.to.end() < tokens.len())
        .map(|r| {
            Annotation::relation(
                &r.variable,
                &r.value,
                endpoint(tokens, &r.from),
                endpoint(tokens, &r.to),
            )
        })
        .collect()
}

/// Span records for annotations embedded in pre-tokenized input
///
/// Each `{name, value}` pair on a token is treated as a span annotation of that token.
/// Adjacent tokens with the same pair merge into one record, exactly as
/// [`encode_spans`] coalesces runs. Empty values are skipped.
pub fn token_annotations(tokens: &[Token]) -> Vec<Annotation> {
    let mut spans = SpanAnnotations::new();
    for (index, token) in tokens.iter().enumerate() {
        for annotation in token.annotations.iter().filter(|a| !a.value.is_empty()) {
            let key = SpanKey::new(&annotation.name, &annotation.value);
            spans.insert_run(tokens, &key, index, index);
        }
    }
    encode_spans(&spans, tokens)
}

fn span_record(tokens: &[Token], key: &SpanKey, start: usize, end: usize) -> Annotation {
    let first = &tokens[start];
    Annotation::span(
        &key.variable,
        &key.value,
        &first.field,
        first.offset,
        tokens[end].end() - first.offset,
    )
    .with_text(covered_text(tokens, start, end))
}

fn endpoint(tokens: &[Token], span: &SpanRef) -> AnnotationEndpoint {
    let first = &tokens[span.start()];
    AnnotationEndpoint::new(
        &span.variable,
        &span.value,
        &first.field,
        first.offset,
        tokens[span.end()].end() - first.offset,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annot::annotations::decode::decode;
    use crate::annot::testing::factories::{append_field, mk_tokens, span};
    use crate::annot::tokens::TokenAnnotation;

    #[test]
    fn test_single_token_round_trip() {
        let tokens = mk_tokens("text", &[("Hello", " "), ("world", ""), (".", "")]);
        let record = span("sent", "pos", "text", 0, 5);
        let decoded = decode(&[record.clone()], &tokens);
        let encoded = encode(&decoded.spans, &decoded.fields, &decoded.relations, &tokens);
        assert_eq!(encoded, vec![record.with_text("Hello ")]);
    }

    #[test]
    fn test_runs_do_not_cross_fields() {
        let mut tokens = mk_tokens("title", &[("A", "")]);
        append_field(&mut tokens, "text", &[("b", " "), ("c", "")]);
        let mut spans = SpanAnnotations::new();
        spans.insert_run(&tokens, &SpanKey::new("v", "x"), 0, 0);
        spans.insert_run(&tokens, &SpanKey::new("v", "x"), 1, 2);

        let records = encode_spans(&spans, &tokens);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].field.as_deref(), Some("title"));
        assert_eq!(records[1].text.as_deref(), Some("b c"));
        assert_eq!(records[1].length, Some(3));
    }

    #[test]
    fn test_export_order() {
        let tokens = mk_tokens("text", &[("a", " "), ("b", "")]);
        let records = vec![
            Annotation::field("topic", "t", Some("text")),
            span("z", "1", "text", 0, 1),
            span("a", "1", "text", 2, 1),
            span("b", "1", "text", 0, 1),
        ];
        let decoded = decode(&records, &tokens);
        let encoded = encode(&decoded.spans, &decoded.fields, &decoded.relations, &tokens);
        let order: Vec<_> = encoded.iter().map(|r| r.variable.as_str()).collect();
        assert_eq!(order, vec!["b", "z", "a", "topic"]);
    }

    #[test]
    fn test_unit_level_fields_have_no_field() {
        let mut fields = FieldAnnotations::new();
        fields.set(FieldAnnotations::UNIT, "done", "yes");
        assert_eq!(encode_fields(&fields), vec![Annotation::field("done", "yes", None)]);
    }

    #[test]
    fn test_token_annotations_merge_runs() {
        let mut tokens = mk_tokens("text", &[("New", " "), ("York", " "), ("is", " "), ("big", "")]);
        let tag = |value: &str| TokenAnnotation {
            name: "ner".to_string(),
            value: value.to_string(),
        };
        tokens[0].annotations = vec![tag("LOC")];
        tokens[1].annotations = vec![tag("LOC")];
        tokens[2].annotations = vec![tag("")];
        tokens[3].annotations = vec![tag("ADJ")];

        let records = token_annotations(&tokens);
        assert_eq!(
            records,
            vec![
                span("ner", "LOC", "text", 0, 8).with_text("New York "),
                span("ner", "ADJ", "text", 12, 3).with_text("big"),
            ]
        );
    }
}
