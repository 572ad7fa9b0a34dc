use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatsType {
    #[default]
    Extraction,
    Download,
}

/// 实时日志中的一行结构化记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "entry_type", rename_all = "snake_case")]
pub enum LogEntry {
    Header {
        #[serde(default)]
        title: String,
    },
    Phase {
        #[serde(default)]
        phase: String,
        #[serde(default)]
        message: String,
    },
    Stats {
        #[serde(default)]
        stats_type: StatsType,
        #[serde(default)]
        success: u32,
        #[serde(default)]
        failed: u32,
        #[serde(default)]
        skipped: u32,
        // 跳过原因 -> 数量
        #[serde(default)]
        skipped_reasons: BTreeMap<String, u32>,
    },
    Progress {
        #[serde(default)]
        current: Option<u64>,
        #[serde(default)]
        total: Option<u64>,
        #[serde(default)]
        message: String,
    },
    Status {
        #[serde(default)]
        status: String,
        #[serde(default)]
        message: String,
    },
    File {
        #[serde(default)]
        path: String,
        #[serde(default)]
        action: String,
    },
    Default {
        #[serde(default)]
        message: String,
        #[serde(default)]
        level: Option<String>,
    },
}

impl LogEntry {
    /// 解析推送消息；不是合法JSON或类型未知时按纯文本处理
    pub fn parse(payload: &str) -> Self {
        match serde_json::from_str::<LogEntry>(payload) {
            Ok(entry) => entry,
            Err(_) => Self::Default {
                message: payload.to_string(),
                level: None,
            },
        }
    }

    pub fn entry_type(&self) -> &'static str {
        match self {
            Self::Header { .. } => "header",
            Self::Phase { .. } => "phase",
            Self::Stats { .. } => "stats",
            Self::Progress { .. } => "progress",
            Self::Status { .. } => "status",
            Self::File { .. } => "file",
            Self::Default { .. } => "default",
        }
    }
}

/// 缓冲区中的日志行，`id` 在一个读取器内唯一且递增
#[derive(Debug, Clone, PartialEq)]
pub struct LogLine {
    pub id: u64,
    pub entry: LogEntry,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_stats_entry() {
        let entry = LogEntry::parse(
            r#"{"entry_type":"stats","stats_type":"download","success":3,"failed":1,"skipped":2,
                "skipped_reasons":{"exists":2}}"#,
        );
        match entry {
            LogEntry::Stats {
                stats_type,
                success,
                skipped_reasons,
                ..
            } => {
                assert_eq!(stats_type, StatsType::Download);
                assert_eq!(success, 3);
                assert_eq!(skipped_reasons.get("exists"), Some(&2));
            }
            other => panic!("期望 stats, 实际 {other:?}"),
        }
    }

    #[test]
    fn plain_text_falls_back_to_default() {
        let entry = LogEntry::parse("[download] 42.0% of 3.1MiB");
        assert_eq!(
            entry,
            LogEntry::Default {
                message: "[download] 42.0% of 3.1MiB".to_string(),
                level: None
            }
        );
    }

    #[test]
    fn unknown_entry_type_keeps_raw_payload() {
        let raw = r#"{"entry_type":"sparkles","message":"hi"}"#;
        match LogEntry::parse(raw) {
            LogEntry::Default { message, .. } => assert_eq!(message, raw),
            other => panic!("期望 default, 实际 {other:?}"),
        }
    }

    #[test]
    fn entry_type_names_match_wire_tags() {
        let entry = LogEntry::parse(r#"{"entry_type":"phase","phase":"importing"}"#);
        assert_eq!(entry.entry_type(), "phase");
    }
}
