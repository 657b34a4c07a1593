//! Test factories for tokens, annotation records and codes

use crate::annot::annotations::Annotation;
use crate::annot::codebook::CodeSpec;
use crate::annot::tokens::Token;

/// Build the tokens of one field from `(text, post)` pairs
///
/// Offsets are accumulated from the texts and posts, indices start at 0 and paragraphs
/// advance after a post containing a line break.
pub fn mk_tokens(field: &str, specs: &[(&str, &str)]) -> Vec<Token> {
    let mut tokens = Vec::with_capacity(specs.len());
    let mut offset = 0;
    let mut paragraph = 0;
    for (index, (text, post)) in specs.iter().enumerate() {
        let length = text.chars().count();
        tokens.push(Token {
            field: field.to_string(),
            offset,
            length,
            paragraph,
            index,
            text: text.to_string(),
            pre: String::new(),
            post: post.to_string(),
            coding_unit: true,
            annotations: Vec::new(),
        });
        offset += length + post.chars().count();
        if post.contains('\n') {
            paragraph += 1;
        }
    }
    tokens
}

/// Append the tokens of another field, continuing the global index
pub fn append_field(tokens: &mut Vec<Token>, field: &str, specs: &[(&str, &str)]) {
    let start = tokens.len();
    let paragraph = tokens.last().map(|t| t.paragraph + 1).unwrap_or(0);
    for mut token in mk_tokens(field, specs) {
        token.index += start;
        token.paragraph += paragraph;
        tokens.push(token);
    }
}

/// A positioned span record
pub fn span(variable: &str, value: &str, field: &str, offset: usize, length: usize) -> Annotation {
    Annotation::span(variable, value, field, offset, length)
}

/// A code with a parent
pub fn child_code(code: &str, parent: &str) -> CodeSpec {
    CodeSpec {
        parent: Some(parent.to_string()),
        ..CodeSpec::new(code)
    }
}
