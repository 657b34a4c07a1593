//! # annot-model
//!
//! The document and annotation data model behind the annot coding client.
//!
//! File Layout
//!
//! Everything lives under [annot](crate::annot), split by the stage of the pipeline it
//! serves:
//!
//! src/annot
//!   ├── tokens        Tokenizer (raw text fields) and importer (pre-tokenized data)
//!   ├── unit          Wire unit types, grid preparation and per-unit state
//!   ├── annotations   Wire records, the three token-indexed maps, codec and manager
//!   ├── codebook      Code trees, questions, variables and relation validity
//!   └── testing       Factories shared by unit and integration tests
//!
//! The data flow is: unit → tokens → decode → maps → (edits) → encode → records.
//! The codebook side runs independently and produces the option sets that the
//! annotation manager and any UI consult.
//!
//! Nothing here performs I/O. Every transformation is a pure function of its inputs,
//! so callers can re-run them whenever the active unit or codebook changes.

pub mod annot;
