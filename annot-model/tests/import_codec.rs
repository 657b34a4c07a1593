//! Annotations over tokens from an external tokenizer

use annot_model::annot::annotations::{
    decode, encode, Annotation, AnnotationEndpoint, AnnotationKind,
};
use annot_model::annot::tokens::{import_tokens, RawTokens, Token};
use serde_json::json;

fn imported() -> Vec<Token> {
    let raw: RawTokens = serde_json::from_value(json!([
        {"field": "title", "text": "Tax", "space": " "},
        {"field": "title", "text": "plans", "space": ""},
        {"field": "text", "text": "The", "space": " "},
        {"field": "text", "text": "government", "space": " "},
        {"field": "text", "text": "raises", "space": " "},
        {"field": "text", "text": "taxes", "space": ""},
        {"field": "text", "text": ".", "space": ""}
    ]))
    .unwrap();
    import_tokens(raw).unwrap()
}

fn records() -> Vec<Annotation> {
    vec![
        Annotation::span("actor", "gov", "text", 4, 17),
        Annotation::span("issue", "tax", "text", 22, 5),
        Annotation::span("issue", "tax", "title", 0, 3),
        Annotation::field("topic", "economy", None),
        Annotation::relation(
            "rel",
            "supports",
            AnnotationEndpoint::new("actor", "gov", "text", 4, 17),
            AnnotationEndpoint::new("issue", "tax", "text", 22, 5),
        ),
    ]
}

fn roundtrip(records: &[Annotation], tokens: &[Token]) -> Vec<Annotation> {
    let decoded = decode(records, tokens);
    assert!(decoded.warnings.is_empty(), "{:?}", decoded.warnings);
    encode(&decoded.spans, &decoded.fields, &decoded.relations, tokens)
}

#[test]
fn imported_offsets_match_the_text() {
    let tokens = imported();
    let offsets: Vec<_> = tokens.iter().map(|t| (t.field.as_str(), t.offset)).collect();
    assert_eq!(
        offsets,
        vec![
            ("title", 0),
            ("title", 4),
            ("text", 0),
            ("text", 4),
            ("text", 15),
            ("text", 22),
            ("text", 27)
        ]
    );
}

#[test]
fn relation_records_are_stable() {
    let tokens = imported();
    let once = roundtrip(&records(), &tokens);
    let twice = roundtrip(&once, &tokens);
    assert_eq!(once, twice);

    let relations: Vec<_> = once
        .iter()
        .filter(|r| r.kind() == AnnotationKind::Relation)
        .collect();
    assert_eq!(relations.len(), 1);
    let from = relations[0].from.as_ref().unwrap();
    let to = relations[0].to.as_ref().unwrap();
    assert_eq!((from.variable.as_str(), from.offset, from.length), ("actor", Some(4), Some(17)));
    assert_eq!((to.variable.as_str(), to.offset, to.length), ("issue", Some(22), Some(5)));
    assert_eq!(from.field.as_deref(), Some("text"));
}

#[test]
fn relation_maps_survive_encoding() {
    let tokens = imported();
    let first = decode(&records(), &tokens);
    let encoded = encode(&first.spans, &first.fields, &first.relations, &tokens);
    let second = decode(&encoded, &tokens);

    assert_eq!(first.spans, second.spans);
    assert_eq!(first.fields, second.fields);
    assert_eq!(first.relations, second.relations);
}
