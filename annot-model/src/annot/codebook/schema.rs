//! The codebook document and question preparation

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::code::{Code, CodeEntry};
use super::options::{code_options, CodeOption, CodebookOptions, SwipeOptions};
use super::tree::CodeTreeBuilder;
use super::variables::Variable;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodebookKind {
    #[default]
    Questions,
    Annotate,
}

/// A codebook as delivered with a job
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Codebook {
    #[serde(rename = "type", default)]
    pub kind: CodebookKind,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub variables: Vec<Variable>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub name: String,
    /// Answer widget, such as `buttons`, `scale` or `search code`
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    #[serde(default)]
    pub codes: Vec<CodeEntry>,
}

impl Question {
    /// Scale answers keep their own colors; other widgets get palette colors
    fn fills_colors(&self) -> bool {
        self.kind != "scale"
    }
}

/// A question with its codes laid out and its answer options derived
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparedQuestion {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    pub codes: Vec<Code>,
    pub options: Vec<CodeOption>,
    pub swipe_options: SwipeOptions,
}

/// Prepare every question of a questions codebook
pub fn prepare_questions(codebook: &Codebook, options: &CodebookOptions) -> Vec<PreparedQuestion> {
    let prepared: Vec<_> = codebook
        .questions
        .iter()
        .map(|question| {
            let tree = CodeTreeBuilder::new(options)
                .fill_colors(question.fills_colors())
                .build(&question.codes);
            let (answers, swipe_options) = code_options(&tree, options);
            PreparedQuestion {
                name: question.name.clone(),
                kind: question.kind.clone(),
                question: question.question.clone(),
                codes: tree.into_codes(),
                options: answers,
                swipe_options,
            }
        })
        .collect();
    debug!(questions = prepared.len(), "prepared questions");
    prepared
}
