//! Recently used values per variable

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::record::Annotation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryOptions {
    /// Values kept per variable; 0 keeps everything
    pub max_entries: usize,
}

impl Default for HistoryOptions {
    fn default() -> Self {
        Self { max_entries: 10 }
    }
}

/// Most recent first, without duplicates
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CodeHistory {
    #[serde(flatten)]
    entries: BTreeMap<String, Vec<String>>,
    #[serde(skip)]
    options: HistoryOptions,
}

impl CodeHistory {
    pub fn new(options: HistoryOptions) -> Self {
        Self {
            entries: BTreeMap::new(),
            options,
        }
    }

    /// Seed from existing records, keeping the order in which values first appear
    pub fn from_annotations(annotations: &[Annotation], options: HistoryOptions) -> Self {
        let mut history = Self::new(options);
        for record in annotations {
            let values = history.entries.entry(record.variable.clone()).or_default();
            if !values.contains(&record.value) {
                values.push(record.value.clone());
            }
        }
        if options.max_entries > 0 {
            for values in history.entries.values_mut() {
                values.truncate(options.max_entries);
            }
        }
        history
    }

    /// Move `value` to the front of the variable's history
    pub fn record(&mut self, variable: &str, value: &str) {
        let values = self.entries.entry(variable.to_string()).or_default();
        values.retain(|v| v != value);
        values.insert(0, value.to_string());
        if self.options.max_entries > 0 {
            values.truncate(self.options.max_entries);
        }
    }

    pub fn get(&self, variable: &str) -> &[String] {
        self.entries.get(variable).map(Vec::as_slice).unwrap_or(&[])
    }
}
