//! Answer options derived from a code tree

use serde::{Deserialize, Serialize};

use super::code::SwipeDirection;
use super::tree::CodeTree;

/// Knobs for the tree builder and option derivation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodebookOptions {
    /// Colors picked for codes without one
    pub palette: Vec<String>,
    /// Color for codes whose configured color is not a valid color
    pub default_color: String,
    /// Assign left, right and up to the first three options when no code has a swipe
    pub auto_swipe: bool,
    /// Separator used when joining a code's ancestry for display
    pub tree_separator: String,
}

impl Default for CodebookOptions {
    fn default() -> Self {
        Self {
            palette: [
                "#8dd3c7", "#ffffb3", "#bebada", "#fb8072", "#80b1d3", "#fdb462", "#b3de69",
                "#fccde5", "#d9d9d9", "#bc80bd", "#ccebc5", "#ffed6f",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            default_color: "#d3dfe9".to_string(),
            auto_swipe: true,
            tree_separator: " - ".to_string(),
        }
    }
}

impl CodebookOptions {
    /// A palette color chosen by the code name, stable across runs
    pub fn palette_color(&self, code: &str) -> Option<String> {
        if self.palette.is_empty() {
            return None;
        }
        let hash = code
            .bytes()
            .fold(0u32, |h, b| h.wrapping_mul(31).wrapping_add(u32::from(b)));
        Some(self.palette[hash as usize % self.palette.len()].clone())
    }
}

/// A selectable answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeOption {
    pub code: String,
    /// The ancestry joined for display
    pub tree: String,
    pub makes_irrelevant: Vec<String>,
    pub required_for: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swipe: Option<SwipeDirection>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwipeOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<CodeOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<CodeOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub up: Option<CodeOption>,
}

impl SwipeOptions {
    pub fn get(&self, direction: SwipeDirection) -> Option<&CodeOption> {
        match direction {
            SwipeDirection::Left => self.left.as_ref(),
            SwipeDirection::Right => self.right.as_ref(),
            SwipeDirection::Up => self.up.as_ref(),
        }
    }

    fn slot(&mut self, direction: SwipeDirection) -> &mut Option<CodeOption> {
        match direction {
            SwipeDirection::Left => &mut self.left,
            SwipeDirection::Right => &mut self.right,
            SwipeDirection::Up => &mut self.up,
        }
    }
}

/// Options for every selectable code, in tree order, and the swipe assignments
pub fn code_options(tree: &CodeTree, options: &CodebookOptions) -> (Vec<CodeOption>, SwipeOptions) {
    let mut answers = Vec::new();
    let mut swipes = SwipeOptions::default();

    for code in tree.iter().filter(|c| c.is_selectable()) {
        let option = CodeOption {
            code: code.code.clone(),
            tree: code.tree.join(&options.tree_separator),
            makes_irrelevant: code.makes_irrelevant.clone(),
            required_for: code.required_for.clone(),
            color: code.color.clone(),
            swipe: code.swipe,
        };
        if let Some(direction) = code.swipe {
            *swipes.slot(direction) = Some(option.clone());
        }
        answers.push(option);
    }

    if options.auto_swipe && answers.iter().all(|o| o.swipe.is_none()) {
        let mut assigned = answers.iter().cloned();
        swipes.left = assigned.next();
        swipes.right = assigned.next();
        swipes.up = assigned.next();
    }
    (answers, swipes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annot::codebook::code::{CodeEntry, CodeSpec};
    use crate::annot::codebook::tree::build_code_tree;
    use crate::annot::testing::factories::child_code;

    #[test]
    fn test_palette_color_is_stable() {
        let options = CodebookOptions::default();
        assert_eq!(options.palette_color("yes"), options.palette_color("yes"));
        let empty = CodebookOptions {
            palette: vec![],
            ..Default::default()
        };
        assert_eq!(empty.palette_color("yes"), None);
    }

    #[test]
    fn test_options_skip_inactive_and_join_tree() {
        let options = CodebookOptions::default();
        let tree = build_code_tree(
            &[
                CodeEntry::from("animal"),
                child_code("dog", "animal").into(),
                CodeSpec {
                    active: Some(false),
                    ..CodeSpec::new("plant")
                }
                .into(),
                child_code("tree", "plant").into(),
            ],
            &options,
        );
        let (answers, swipes) = code_options(&tree, &options);
        let names: Vec<_> = answers.iter().map(|o| (o.code.as_str(), o.tree.as_str())).collect();
        assert_eq!(names, vec![("animal", ""), ("dog", "animal")]);
        assert_eq!(swipes.left.as_ref().map(|o| o.code.as_str()), Some("animal"));
        assert_eq!(swipes.right.as_ref().map(|o| o.code.as_str()), Some("dog"));
        assert!(swipes.up.is_none());
    }

    #[test]
    fn test_explicit_swipe_disables_auto_assignment() {
        let options = CodebookOptions::default();
        let tree = build_code_tree(
            &[
                CodeEntry::from("a"),
                CodeSpec {
                    swipe: Some(SwipeDirection::Right),
                    ..CodeSpec::new("b")
                }
                .into(),
            ],
            &options,
        );
        let (_, swipes) = code_options(&tree, &options);
        assert!(swipes.left.is_none());
        assert_eq!(swipes.get(SwipeDirection::Right).unwrap().code, "b");
    }

    #[test]
    fn test_explicit_up_is_kept() {
        let options = CodebookOptions::default();
        let tree = build_code_tree(
            &[
                CodeEntry::from("a"),
                CodeEntry::from("b"),
                CodeEntry::from("c"),
                CodeSpec {
                    swipe: Some(SwipeDirection::Up),
                    ..CodeSpec::new("d")
                }
                .into(),
            ],
            &options,
        );
        let (_, swipes) = code_options(&tree, &options);
        assert!(swipes.left.is_none());
        assert!(swipes.right.is_none());
        assert_eq!(swipes.get(SwipeDirection::Up).unwrap().code, "d");
    }
}
