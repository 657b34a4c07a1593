//! Term segmentation using the logos lexer library
//!
//! This is the raw step where a text string becomes a stream of terms and whitespace
//! runs. The tokenizer folds the whitespace into `pre`/`post` of neighbouring terms.
//!
//! Terms are words (letters, combining marks, digits and underscores, with inner
//! apostrophes as in "don't"), dotted abbreviations ("U.S."), numbers with inner
//! separators ("3.14", "1,000") and single punctuation characters.

use logos::Logos;

/// The kind of a raw segment
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    #[regex(r"\s+")]
    Whitespace,

    #[regex(r"\p{L}\.(\p{L}\.)+")]
    Abbreviation,

    #[regex(r"[0-9]+([.,][0-9]+)+")]
    Number,

    #[regex(r"[\p{L}\p{M}\p{N}_]+(['’][\p{L}\p{M}\p{N}_]+)*")]
    Word,

    #[regex(r"[^\s\p{L}\p{M}\p{N}_]")]
    Punctuation,
}

impl Segment {
    pub fn is_whitespace(&self) -> bool {
        matches!(self, Segment::Whitespace)
    }
}

/// Split text into segments with their byte ranges
///
/// Every byte of the input belongs to exactly one segment, so the segments can be
/// concatenated back into the input. Anything the lexer does not recognize is kept
/// as punctuation.
pub fn segment(text: &str) -> Vec<(Segment, std::ops::Range<usize>)> {
    let mut lexer = Segment::lexer(text);
    let mut segments = Vec::new();

    while let Some(result) = lexer.next() {
        let kind = result.unwrap_or(Segment::Punctuation);
        segments.push((kind, lexer.span()));
    }

    segments
}
