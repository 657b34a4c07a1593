//! Code entries as written in a codebook, and codes as placed in the tree

use serde::{Deserialize, Serialize};

use crate::annot::serde_helpers::{one_or_many, opt_scalar_string, scalar_string};

/// Direction of the swipe gesture that selects a code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwipeDirection {
    Left,
    Right,
    Up,
}

/// A code entry with all its settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeSpec {
    #[serde(deserialize_with = "scalar_string")]
    pub code: String,
    #[serde(
        default,
        deserialize_with = "opt_scalar_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub parent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub makes_irrelevant: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub required_for: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swipe: Option<SwipeDirection>,
}

impl CodeSpec {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            ..Default::default()
        }
    }

    /// The parent name, with an empty string meaning no parent
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref().filter(|p| !p.is_empty())
    }
}

/// A codebook entry: a bare code name or a full specification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CodeEntry {
    Name(#[serde(deserialize_with = "scalar_string")] String),
    Spec(CodeSpec),
}

impl CodeEntry {
    /// Bare names become root codes with default settings
    pub fn into_spec(self) -> CodeSpec {
        match self {
            CodeEntry::Name(name) => CodeSpec::new(name),
            CodeEntry::Spec(spec) => spec,
        }
    }
}

impl From<CodeSpec> for CodeEntry {
    fn from(spec: CodeSpec) -> Self {
        CodeEntry::Spec(spec)
    }
}

impl From<&str> for CodeEntry {
    fn from(name: &str) -> Self {
        CodeEntry::Name(name.to_string())
    }
}

/// A code placed in the tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Code {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Ancestor codes, root first; the code itself is not included
    pub tree: Vec<String>,
    pub level: usize,
    pub active: bool,
    /// False when any ancestor is inactive
    #[serde(rename = "activeParent")]
    pub active_parent: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swipe: Option<SwipeDirection>,
    pub makes_irrelevant: Vec<String>,
    pub required_for: Vec<String>,
    pub children: Vec<String>,
}

impl Code {
    /// A root code without settings, as used for values that are missing from a codebook
    pub fn standalone(code: impl Into<String>, color: Option<String>) -> Self {
        Self {
            code: code.into(),
            parent: None,
            color,
            tree: Vec::new(),
            level: 0,
            active: true,
            active_parent: true,
            swipe: None,
            makes_irrelevant: Vec::new(),
            required_for: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Whether the code can be chosen: it and all its ancestors are active
    pub fn is_selectable(&self) -> bool {
        self.active && self.active_parent
    }
}
