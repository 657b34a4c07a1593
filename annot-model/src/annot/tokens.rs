//! Tokens
//!
//!     A unit's text is turned into one flat, indexable token sequence. Every other part of
//!     the model addresses text through it: span annotations are keyed by token index, and
//!     offsets in wire records are resolved against token offsets.
//!
//! Two Sources, One Shape
//!
//!     Tokens come either from raw text fields ([tokenizer]) or from pre-tokenized data
//!     supplied with the unit ([import]). Both produce the same [Token] values, so the
//!     codec and the manager do not care where tokens came from.
//!
//! Lossless Text
//!
//!     Each token carries the whitespace around it in `pre` and `post`. Concatenating
//!     `pre + text + post` over the tokens of one field gives back the field text exactly,
//!     see [detokenize]. Offsets and lengths count chars in the original field text, not
//!     bytes and not positions in a concatenation of fields.
//!
//! Invariants
//!
//!     Within a field, offsets strictly increase and a token never runs past the offset of
//!     the next one. The importer rejects input that breaks this; the tokenizer cannot
//!     produce it.

pub mod import;
pub mod segmenter;
pub mod token;
pub mod tokenizer;

pub use import::{import_tokens, import_tokens_with, ImportOptions, RawToken, RawTokens};
pub use token::{detokenize, Token, TokenAnnotation};
pub use tokenizer::{tokenize_fields, tokenize_fields_with, TextField, TokenizerOptions};
