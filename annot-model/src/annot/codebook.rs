//! Codebooks
//!
//!     A codebook lists codes as edges: every code names its parent, if any. The tree
//!     builder turns that list into a flat depth-first array in which every code knows its
//!     ancestry, whether any ancestor is inactive, and which questions it makes irrelevant.
//!
//!     Two kinds of codebook exist. A questions codebook has one code list per question and
//!     is turned into answer options. An annotate codebook has variables; the variable map
//!     builder scopes them to the variable the coder has selected and prepares lookups for
//!     valid relation endpoints.
//!
//!     Problems in a codebook are never fatal. Entries that cannot be used are skipped or
//!     repaired, and a warning is logged.

pub mod code;
pub mod options;
pub mod relations;
pub mod schema;
pub mod tree;
pub mod variables;

pub use code::{Code, CodeEntry, CodeSpec, SwipeDirection};
pub use options::{code_options, CodeOption, CodebookOptions, SwipeOptions};
pub use relations::{CodeRelation, Relation, ValidRelation, WILDCARD};
pub use schema::{prepare_questions, Codebook, CodebookKind, PreparedQuestion, Question};
pub use tree::{build_code_tree, CodeTree, CodeTreeBuilder};
pub use variables::{
    RestrictedCodes, ScopedVariable, ScopedVariables, Variable, VariableMap, VariableMapBuilder,
    VariableType, EDIT_ALL,
};
