//! Units: what a coder is shown and annotates
//!
//! A unit arrives as wire content (text, image, markdown and meta fields, optionally
//! pre-tokenized text, an optional grid layout and existing annotations). Preparation
//! lays out the grid, produces the token sequence and decodes the annotations into a
//! [`UnitState`], which is then the only place annotations of that unit change.

pub mod content;
pub mod grid;
pub mod state;

pub use content::{
    prepare_document, Document, ImageField, MarkdownField, MetaField, Unit, UnitContent,
    UnitOptions,
};
pub use grid::{prepare_grid, AreaRow, GridLayout, GridSpec};
pub use state::UnitState;
