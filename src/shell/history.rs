//! Bounded command execution history.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Local};

use super::executor::CommandType;

pub const MAX_COMMAND_HISTORY: usize = 500;

#[derive(Debug, Clone, PartialEq)]
pub struct CommandRecord {
    pub timestamp: DateTime<Local>,
    pub command: String,
    pub shell: String,
    pub working_dir: String,
    pub exit_code: i32,
    pub duration: Duration,
    pub success: bool,
    pub output_size: usize,
    pub error_size: usize,
    pub command_type: CommandType,
}

#[derive(Debug, Clone, Default)]
pub struct HistoryStats {
    pub total: usize,
    pub succeeded: usize,
    pub average_duration: Duration,
    /// (shell, commands run)
    pub most_used_shell: Option<(String, usize)>,
}

#[derive(Debug, Clone, Default)]
pub struct CommandHistoryView {
    /// Newest first.
    pub records: Vec<CommandRecord>,
    /// Statistics over the whole history, regardless of the shell filter.
    pub stats: HistoryStats,
}

#[derive(Debug)]
pub struct CommandHistory {
    records: Mutex<VecDeque<CommandRecord>>,
    capacity: usize,
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::with_capacity(MAX_COMMAND_HISTORY)
    }
}

impl CommandHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Mutex::new(VecDeque::new()),
            capacity,
        }
    }

    pub fn push(&self, record: CommandRecord) {
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        while records.len() >= self.capacity {
            records.pop_front();
        }
        records.push_back(record);
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn view(&self, limit: usize, shell: Option<&str>) -> CommandHistoryView {
        let records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        if records.is_empty() {
            return CommandHistoryView::default();
        }

        let succeeded = records.iter().filter(|r| r.success).count();
        let total_duration: Duration = records.iter().map(|r| r.duration).sum();

        let mut usage: HashMap<&str, usize> = HashMap::new();
        for record in records.iter() {
            *usage.entry(record.shell.as_str()).or_default() += 1;
        }
        let most_used_shell = usage
            .into_iter()
            .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(shell, n)| (shell.to_string(), n));

        let stats = HistoryStats {
            total: records.len(),
            succeeded,
            average_duration: total_duration / records.len() as u32,
            most_used_shell,
        };

        let records = records
            .iter()
            .rev()
            .filter(|r| shell.is_none_or(|s| r.shell == s))
            .take(limit)
            .cloned()
            .collect();

        CommandHistoryView { records, stats }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(command: &str, shell: &str, success: bool, millis: u64) -> CommandRecord {
        CommandRecord {
            timestamp: Local::now(),
            command: command.to_string(),
            shell: shell.to_string(),
            working_dir: "/tmp".to_string(),
            exit_code: if success { 0 } else { 1 },
            duration: Duration::from_millis(millis),
            success,
            output_size: 0,
            error_size: 0,
            command_type: CommandType::General,
        }
    }

    #[test]
    fn view_computes_stats_over_everything() {
        let history = CommandHistory::default();
        history.push(record("a", "bash", true, 100));
        history.push(record("b", "sh", false, 300));
        history.push(record("c", "bash", true, 200));

        let view = history.view(10, Some("sh"));
        assert_eq!(view.records.len(), 1);
        assert_eq!(view.records[0].command, "b");
        assert_eq!(view.stats.total, 3);
        assert_eq!(view.stats.succeeded, 2);
        assert_eq!(view.stats.average_duration, Duration::from_millis(200));
        assert_eq!(view.stats.most_used_shell, Some(("bash".to_string(), 2)));
    }

    #[test]
    fn history_is_capped_and_newest_first() {
        let history = CommandHistory::with_capacity(2);
        history.push(record("one", "sh", true, 1));
        history.push(record("two", "sh", true, 1));
        history.push(record("three", "sh", true, 1));

        assert_eq!(history.len(), 2);
        let view = history.view(10, None);
        let commands: Vec<&str> = view.records.iter().map(|r| r.command.as_str()).collect();
        assert_eq!(commands, vec!["three", "two"]);
    }

    #[test]
    fn empty_history_has_no_stats() {
        let view = CommandHistory::default().view(5, None);
        assert!(view.records.is_empty());
        assert_eq!(view.stats.total, 0);
        assert!(view.stats.most_used_shell.is_none());
    }
}
