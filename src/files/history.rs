//! Bounded in-memory log of file operations.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use chrono::{DateTime, Utc};

pub const MAX_HISTORY: usize = 1000;

#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub timestamp: DateTime<Utc>,
    pub operation: String,
    pub path: String,
    pub success: bool,
    pub detail: Option<String>,
}

/// Filtered view returned by [`OperationHistory::recent`].
#[derive(Debug, Clone, Default)]
pub struct HistoryView {
    /// Newest first.
    pub operations: Vec<Operation>,
    /// Counts per operation over the whole log, most frequent first.
    pub counts: Vec<(String, usize)>,
    pub total: usize,
    pub succeeded: usize,
}

#[derive(Debug)]
pub struct OperationHistory {
    entries: Mutex<VecDeque<Operation>>,
    capacity: usize,
}

impl Default for OperationHistory {
    fn default() -> Self {
        Self::with_capacity(MAX_HISTORY)
    }
}

impl OperationHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity.min(64))),
            capacity,
        }
    }

    pub fn record(&self, operation: &str, path: &str, success: bool, detail: Option<String>) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(Operation {
            timestamp: Utc::now(),
            operation: operation.to_string(),
            path: path.to_string(),
            success,
            detail,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn recent(&self, limit: usize, operation: Option<&str>) -> HistoryView {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for entry in entries.iter() {
            *counts.entry(entry.operation.as_str()).or_default() += 1;
        }
        let mut counts: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(op, n)| (op.to_string(), n))
            .collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        let matching: Vec<&Operation> = entries
            .iter()
            .filter(|e| operation.is_none_or(|op| e.operation == op))
            .collect();

        HistoryView {
            total: matching.len(),
            succeeded: matching.iter().filter(|e| e.success).count(),
            operations: matching.into_iter().rev().take(limit).cloned().collect(),
            counts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_is_bounded() {
        let history = OperationHistory::with_capacity(3);
        for i in 0..5 {
            history.record("read", &format!("f{}", i), true, None);
        }
        assert_eq!(history.len(), 3);
        let view = history.recent(10, None);
        let paths: Vec<&str> = view.operations.iter().map(|o| o.path.as_str()).collect();
        assert_eq!(paths, vec!["f4", "f3", "f2"]);
    }

    #[test]
    fn recent_filters_and_counts() {
        let history = OperationHistory::default();
        history.record("read", "a", true, None);
        history.record("write", "b", false, Some("denied".to_string()));
        history.record("write", "c", true, None);

        let writes = history.recent(1, Some("write"));
        assert_eq!(writes.total, 2);
        assert_eq!(writes.succeeded, 1);
        assert_eq!(writes.operations.len(), 1);
        assert_eq!(writes.operations[0].path, "c");
        assert_eq!(writes.counts[0], ("write".to_string(), 2));
    }
}
