//! The token type shared by the tokenizer, the importer and the codec

use serde::{Deserialize, Serialize};

/// A `{name, value}` pair attached to a token by pre-tokenized input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAnnotation {
    pub name: String,
    #[serde(deserialize_with = "crate::annot::serde_helpers::scalar_string")]
    pub value: String,
}

/// One term of a unit's text
///
/// `offset` and `length` are char positions in the original field text. `index` is
/// the position in the unit's full token sequence. `coding_unit` is false for tokens
/// that only provide context around the part the coder is responsible for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub field: String,
    pub offset: usize,
    pub length: usize,
    pub paragraph: usize,
    pub index: usize,
    pub text: String,
    pub pre: String,
    pub post: String,
    pub coding_unit: bool,
    #[serde(default)]
    pub annotations: Vec<TokenAnnotation>,
}

impl Token {
    /// First char position after the token text
    pub fn end(&self) -> usize {
        self.offset + self.length
    }

    /// First char position after the token text and its trailing whitespace
    pub fn end_with_post(&self) -> usize {
        self.end() + self.post.chars().count()
    }

    /// Whether `offset` falls on this token's text or its trailing whitespace
    pub fn covers(&self, offset: usize) -> bool {
        offset >= self.offset && offset < self.end_with_post().max(self.offset + 1)
    }

    /// The token as it appears in the source, with surrounding whitespace
    pub fn source_text(&self) -> String {
        format!("{}{}{}", self.pre, self.text, self.post)
    }
}

/// Rebuild the text of one field from its tokens
pub fn detokenize(tokens: &[Token], field: &str) -> String {
    tokens
        .iter()
        .filter(|t| t.field == field)
        .map(Token::source_text)
        .collect()
}

/// The source text covered by tokens `start..=end`
///
/// Every token contributes `pre + text + post`, except that the first token's `pre` is
/// left out.
pub fn covered_text(tokens: &[Token], start: usize, end: usize) -> String {
    let mut text = String::new();
    for (i, token) in tokens[start..=end].iter().enumerate() {
        if i > 0 {
            text.push_str(&token.pre);
        }
        text.push_str(&token.text);
        text.push_str(&token.post);
    }
    text
}
