//! Main module for annot library functionality

pub mod annotations;
pub mod codebook;
pub mod error;
pub mod serde_helpers;
pub mod testing;
pub mod tokens;
pub mod unit;
