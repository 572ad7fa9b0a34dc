use std::collections::VecDeque;

use crate::common::api::models::log::{LogEntry, LogLine};

pub const DEFAULT_LOG_CAP: usize = 1000;

/// 有上限的日志缓冲区，超出上限时从头部丢弃
#[derive(Debug)]
pub struct LogBuffer {
    lines: VecDeque<LogLine>,
    cap: usize,
    next_id: u64,
}

impl LogBuffer {
    pub fn new(cap: usize) -> Self {
        let cap = cap.max(1);
        Self {
            lines: VecDeque::with_capacity(cap.min(DEFAULT_LOG_CAP)),
            cap,
            next_id: 0,
        }
    }

    /// 追加一行并返回它（带新分配的ID）
    pub fn push(&mut self, entry: LogEntry) -> LogLine {
        let line = LogLine {
            id: self.next_id,
            entry,
        };
        self.next_id += 1;
        self.lines.push_back(line.clone());
        while self.lines.len() > self.cap {
            self.lines.pop_front();
        }
        line
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogLine> {
        self.lines.iter()
    }

    pub fn snapshot(&self) -> Vec<LogLine> {
        self.lines.iter().cloned().collect()
    }

    /// 最近的 n 行，顺序不变
    pub fn tail(&self, n: usize) -> Vec<LogLine> {
        let skip = self.lines.len().saturating_sub(n);
        self.lines.iter().skip(skip).cloned().collect()
    }

    // ID 继续递增，清空后也不会重复
    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAP)
    }
}
