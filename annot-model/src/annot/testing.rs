//! Testing utilities
//!
//!     Tests across the crate build token sequences and annotation records by hand. The
//!     [factories] keep that terse and, more importantly, keep offsets consistent: a token
//!     list built from `(text, post)` pairs always has offsets that match its text, so a
//!     test cannot accidentally exercise the codec with impossible positions.

pub mod factories;
