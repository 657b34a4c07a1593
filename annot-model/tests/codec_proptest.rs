//! Property-based tests for the tokenizer and the annotation codec
//!
//! These tests check the guarantees the rest of the pipeline relies on:
//! - Tokens reproduce their field text exactly and never overlap
//! - Encoding coalesces runs, and decoding the result gives the same records back
//! - Encoded text is the covered source text plus the last token's trailing whitespace

use annot_model::annot::annotations::{decode, encode, Annotation};
use annot_model::annot::tokens::{detokenize, tokenize_fields, TextField, Token};
use proptest::prelude::*;

/// Generate field text with words, punctuation, numbers and line breaks
fn text_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        // Plain words
        "[a-zA-Z]{1,8}( [a-zA-Z]{1,8}){0,12}",
        // Words with punctuation and paragraph breaks
        "[A-Z][a-z]{0,6}([ ,.;!?\n]{1,3}[a-zA-Z0-9]{1,6}){0,15}[.!?]?",
        // Non-ASCII letters and leading whitespace
        "[ \t]{0,2}[a-zäöüéñß]{1,6}([ \n]{1,2}[a-zäöüéñß]{1,6}){0,10}[ \n]{0,2}",
    ]
}

/// Any printable text
fn any_text_strategy() -> impl Strategy<Value = String> {
    "\\PC{0,60}"
}

fn tokens_for(text: &str) -> Vec<Token> {
    tokenize_fields(&[TextField::new("text", text)])
}

/// Records built from token index ranges, as a coder would make them
fn records_for(tokens: &[Token], picks: &[(usize, usize, usize)]) -> Vec<Annotation> {
    let variables = ["topic", "actor"];
    let values = ["x", "y"];
    picks
        .iter()
        .map(|&(key, a, b)| {
            let start = a % tokens.len();
            let end = (start + b % 3).min(tokens.len() - 1);
            let offset = tokens[start].offset;
            Annotation::span(
                variables[key % 2],
                values[(key / 2) % 2],
                "text",
                offset,
                tokens[end].offset + tokens[end].length - offset,
            )
        })
        .collect()
}

fn roundtrip(records: &[Annotation], tokens: &[Token]) -> Vec<Annotation> {
    let decoded = decode(records, tokens);
    encode(&decoded.spans, &decoded.fields, &decoded.relations, tokens)
}

#[cfg(test)]
mod proptest_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(128))]

        #[test]
        fn test_detokenize_reproduces_text(text in any_text_strategy()) {
            let tokens = tokens_for(&text);
            prop_assert_eq!(detokenize(&tokens, "text"), text);
        }

        #[test]
        fn test_offsets_are_monotonic_and_exact(text in text_strategy()) {
            let tokens = tokens_for(&text);
            let chars: Vec<char> = text.chars().collect();

            for pair in tokens.windows(2) {
                prop_assert!(pair[0].offset < pair[1].offset);
                prop_assert!(pair[0].offset + pair[0].length <= pair[1].offset);
            }
            for (i, token) in tokens.iter().enumerate() {
                prop_assert_eq!(token.index, i);
                let slice: String = chars[token.offset..token.offset + token.length].iter().collect();
                prop_assert_eq!(&slice, &token.text);
            }
        }

        #[test]
        fn test_encode_is_idempotent(
            text in text_strategy(),
            picks in prop::collection::vec((0usize..4, 0usize..64, 0usize..6), 0..8),
        ) {
            let tokens = tokens_for(&text);
            let records = records_for(&tokens, &picks);

            let once = roundtrip(&records, &tokens);
            let twice = roundtrip(&once, &tokens);
            prop_assert_eq!(&once, &twice);
            prop_assert!(once.len() <= records.len());
        }

        #[test]
        fn test_encoded_text_matches_source(
            text in text_strategy(),
            picks in prop::collection::vec((0usize..4, 0usize..64, 0usize..6), 1..6),
        ) {
            let tokens = tokens_for(&text);
            let chars: Vec<char> = text.chars().collect();

            for record in roundtrip(&records_for(&tokens, &picks), &tokens) {
                let offset = record.offset.unwrap_or_default();
                let length = record.length.unwrap_or_default();
                let last = tokens.iter().find(|t| t.end() == offset + length);
                prop_assert!(last.is_some());
                let mut source: String = chars[offset..offset + length].iter().collect();
                source.push_str(&last.unwrap().post);
                prop_assert_eq!(record.text.as_deref(), Some(source.as_str()));
            }
        }

        #[test]
        fn test_single_token_records_survive(text in text_strategy(), index in 0usize..64) {
            let tokens = tokens_for(&text);
            let token = &tokens[index % tokens.len()];
            let record = Annotation::span("sent", "pos", "text", token.offset, token.length)
                .with_text(format!("{}{}", token.text, token.post));

            prop_assert_eq!(roundtrip(&[record.clone()], &tokens), vec![record]);
        }
    }
}
