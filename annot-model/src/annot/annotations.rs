//! Annotations
//!
//!     On the wire, annotations are a flat list of records. In memory they live in three
//!     indexes keyed by position: span annotations per token, field annotations per field,
//!     and relation annotations between two span annotations.
//!
//! The Codec
//!
//!     [decode] places every record on the token sequence, dropping (and reporting) what
//!     cannot be placed. [encode] is its inverse: runs of adjacent tokens that carry the
//!     same variable and value become one record again. Encoding is a pure function of the
//!     maps and the tokens, and decoding its output reproduces the same maps.
//!
//! Mutation
//!
//!     After decoding, only the [manager::AnnotationManager] changes the maps. It keeps them
//!     consistent: no empty spans, and no relation whose endpoint is not a span annotation.

pub mod decode;
pub mod encode;
pub mod history;
pub mod manager;
pub mod maps;
pub mod record;
pub mod resolve;

pub use decode::{decode, DecodedAnnotations};
pub use encode::{encode, encode_fields, encode_relations, encode_spans, token_annotations};
pub use history::{CodeHistory, HistoryOptions};
pub use manager::AnnotationManager;
pub use maps::{
    FieldAnnotations, RelationAnnotation, RelationAnnotations, SpanAnnotation, SpanAnnotations,
    SpanKey, SpanRef,
};
pub use record::{Annotation, AnnotationEndpoint, AnnotationKind};
