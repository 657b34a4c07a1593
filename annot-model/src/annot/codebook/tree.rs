//! Codebook tree builder
//!
//! Codes come in as an edge list and go out as a flat array in depth-first order: each
//! root in codebook order, followed by its descendants, children again in codebook
//! order. Every code carries its ancestry (`tree`), its depth and whether all of its
//! ancestors are active.
//!
//! After the walk, `required_for` is turned into `makes_irrelevant`: a code that is not
//! required for a question makes that question irrelevant. This way consumers only have
//! to handle one kind of constraint.

use std::collections::{BTreeMap, BTreeSet};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use super::code::{Code, CodeEntry, CodeSpec};
use super::options::CodebookOptions;

static VALID_COLOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(#([0-9a-fA-F]{3,4}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})|[a-zA-Z]+)$")
        .expect("valid regex")
});

/// Codes in depth-first order with lookup by name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeTree {
    codes: Vec<Code>,
    positions: BTreeMap<String, usize>,
}

impl CodeTree {
    fn from_codes(codes: Vec<Code>) -> Self {
        let positions = codes
            .iter()
            .enumerate()
            .map(|(i, c)| (c.code.clone(), i))
            .collect();
        Self { codes, positions }
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Code> {
        self.codes.iter()
    }

    pub fn get(&self, code: &str) -> Option<&Code> {
        self.positions.get(code).map(|&i| &self.codes[i])
    }

    pub fn codes(&self) -> &[Code] {
        &self.codes
    }

    pub fn into_codes(self) -> Vec<Code> {
        self.codes
    }

    /// Codes that can be chosen, by name
    pub fn selectable(&self) -> BTreeMap<String, Code> {
        self.codes
            .iter()
            .filter(|c| c.is_selectable())
            .map(|c| (c.code.clone(), c.clone()))
            .collect()
    }
}

/// Build a tree with missing colors filled from the palette
pub fn build_code_tree(entries: &[CodeEntry], options: &CodebookOptions) -> CodeTree {
    CodeTreeBuilder::new(options).build(entries)
}

pub struct CodeTreeBuilder<'a> {
    options: &'a CodebookOptions,
    fill_colors: bool,
}

struct Edges<'s> {
    specs: &'s [CodeSpec],
    children: BTreeMap<&'s str, Vec<usize>>,
}

impl<'a> CodeTreeBuilder<'a> {
    pub fn new(options: &'a CodebookOptions) -> Self {
        Self {
            options,
            fill_colors: true,
        }
    }

    /// Whether codes without a color get one from the palette
    pub fn fill_colors(mut self, fill: bool) -> Self {
        self.fill_colors = fill;
        self
    }

    pub fn build(&self, entries: &[CodeEntry]) -> CodeTree {
        let specs = unique_specs(entries);
        let known: BTreeSet<&str> = specs.iter().map(|s| s.code.as_str()).collect();

        let mut roots = Vec::new();
        let mut children: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        for (i, spec) in specs.iter().enumerate() {
            match spec.parent() {
                Some(parent) if known.contains(parent) => {
                    children.entry(parent).or_default().push(i)
                }
                Some(parent) => {
                    warn!(code = %spec.code, parent, "Unknown parent, treating code as root");
                    roots.push(i);
                }
                None => roots.push(i),
            }
        }

        let edges = Edges {
            specs: &specs,
            children,
        };
        let mut visited = vec![false; specs.len()];
        let mut codes = Vec::with_capacity(specs.len());
        let mut ancestors = Vec::new();
        for root in roots {
            self.walk(&edges, root, &mut ancestors, true, &mut visited, &mut codes);
        }

        for (spec, _) in specs.iter().zip(&visited).filter(|(_, seen)| !**seen) {
            warn!(code = %spec.code, "Code is part of a parent cycle, skipping");
        }

        propagate_required_for(&mut codes);
        debug!(codes = codes.len(), "built code tree");
        CodeTree::from_codes(codes)
    }

    fn walk(
        &self,
        edges: &Edges<'_>,
        i: usize,
        ancestors: &mut Vec<String>,
        active_parent: bool,
        visited: &mut [bool],
        codes: &mut Vec<Code>,
    ) {
        visited[i] = true;
        let spec = &edges.specs[i];
        let active = spec.active.unwrap_or(true);
        let kids = edges
            .children
            .get(spec.code.as_str())
            .map(Vec::as_slice)
            .unwrap_or_default();

        codes.push(Code {
            code: spec.code.clone(),
            parent: ancestors.last().cloned(),
            color: self.color(spec),
            tree: ancestors.clone(),
            level: ancestors.len(),
            active,
            active_parent,
            swipe: spec.swipe,
            makes_irrelevant: spec.makes_irrelevant.clone(),
            required_for: spec.required_for.clone(),
            children: kids.iter().map(|&k| edges.specs[k].code.clone()).collect(),
        });

        ancestors.push(spec.code.clone());
        for &kid in kids {
            self.walk(edges, kid, ancestors, active_parent && active, visited, codes);
        }
        ancestors.pop();
    }

    fn color(&self, spec: &CodeSpec) -> Option<String> {
        match &spec.color {
            Some(color) if VALID_COLOR.is_match(color) => Some(color.clone()),
            Some(color) => {
                warn!(code = %spec.code, color = %color, "Invalid color, using the default");
                Some(self.options.default_color.clone())
            }
            None if self.fill_colors => self.options.palette_color(&spec.code),
            None => None,
        }
    }
}

/// Standardized entries, first occurrence of each code name only
fn unique_specs(entries: &[CodeEntry]) -> Vec<CodeSpec> {
    let mut seen = BTreeSet::new();
    let mut specs = Vec::with_capacity(entries.len());
    for spec in entries.iter().cloned().map(CodeEntry::into_spec) {
        if spec.code.is_empty() {
            warn!("Code without a name, skipping");
        } else if !seen.insert(spec.code.clone()) {
            warn!(code = %spec.code, "Duplicate code, keeping the first");
        } else {
            specs.push(spec);
        }
    }
    specs
}

/// Every code that is not required for a question makes that question irrelevant
fn propagate_required_for(codes: &mut [Code]) {
    let required: BTreeSet<String> = codes
        .iter()
        .flat_map(|c| c.required_for.iter().cloned())
        .collect();
    for code in codes.iter_mut() {
        for target in &required {
            if !code.required_for.contains(target) && !code.makes_irrelevant.contains(target) {
                code.makes_irrelevant.push(target.clone());
            }
        }
    }
}
