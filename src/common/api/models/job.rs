use serde::{Deserialize, Serialize};
use std::fmt;

/// 后端任务状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    FetchingInfo,
    Downloading,
    Importing,
    Completed,
    Failed,
    Cancelled,
    // 后端新增的状态，按进行中处理
    #[serde(other)]
    Unknown,
}

impl JobStatus {
    pub const ALL: [JobStatus; 8] = [
        JobStatus::Pending,
        JobStatus::FetchingInfo,
        JobStatus::Downloading,
        JobStatus::Importing,
        JobStatus::Completed,
        JobStatus::Failed,
        JobStatus::Cancelled,
        JobStatus::Unknown,
    ];

    /// 已经结束的任务不会再变化
    pub fn is_finished(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    pub fn is_active(self) -> bool {
        !self.is_finished()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::FetchingInfo => "fetching_info",
            Self::Downloading => "downloading",
            Self::Importing => "importing",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 任务来源：手动添加或订阅调度器
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobSource {
    #[default]
    Manual,
    Scheduler,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentInfo {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub track_count: Option<u32>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub audio_codec: Option<String>,
    #[serde(default)]
    pub bitrate: Option<u32>,
    // album / playlist / track
    #[serde(default)]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadStats {
    #[serde(default)]
    pub success: u32,
    #[serde(default)]
    pub failed: u32,
    #[serde(default)]
    pub skipped: u32,
}

/// 一个由服务端维护的下载任务
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub url: String,
    pub status: JobStatus,
    // 0-1 或 0-100，取决于生产者，读取时统一换算
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub content_info: Option<ContentInfo>,
    #[serde(default)]
    pub download_stats: Option<DownloadStats>,
    #[serde(default)]
    pub source: JobSource,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub max_items: Option<u32>,
}

impl Job {
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// 用于展示的标题，没有元数据时退回到URL
    pub fn display_title(&self) -> &str {
        self.content_info
            .as_ref()
            .and_then(|info| info.title.as_deref())
            .unwrap_or(&self.url)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateJobRequest {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatedJob {
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_and_finished_partition_every_status() {
        for status in JobStatus::ALL {
            assert_eq!(status.is_active(), !status.is_finished(), "{status}");
        }
        let active: Vec<_> = JobStatus::ALL.iter().filter(|s| s.is_active()).collect();
        assert!(active.contains(&&JobStatus::Pending));
        assert!(active.contains(&&JobStatus::FetchingInfo));
        assert!(active.contains(&&JobStatus::Downloading));
        assert!(active.contains(&&JobStatus::Importing));
        assert!(JobStatus::Completed.is_finished());
        assert!(JobStatus::Failed.is_finished());
        assert!(JobStatus::Cancelled.is_finished());
    }

    #[test]
    fn deserializes_minimal_job() {
        let job: Job = serde_json::from_str(
            r#"{"id":"1","url":"https://x/watch?v=v1","status":"fetching_info"}"#,
        )
        .unwrap();
        assert_eq!(job.status, JobStatus::FetchingInfo);
        assert_eq!(job.progress, None);
        assert_eq!(job.source, JobSource::Manual);
        assert_eq!(job.display_title(), "https://x/watch?v=v1");
    }

    #[test]
    fn unknown_status_is_kept_active() {
        let job: Job =
            serde_json::from_str(r#"{"id":"1","url":"u","status":"transcoding","progress":null}"#)
                .unwrap();
        assert_eq!(job.status, JobStatus::Unknown);
        assert!(job.is_active());
    }

    #[test]
    fn full_job_with_stats_and_info() {
        let job: Job = serde_json::from_str(
            r#"{
                "id": "42",
                "url": "https://music.youtube.com/playlist?list=OLAK5uy",
                "status": "completed",
                "progress": 100,
                "source": "scheduler",
                "created_at": "2024-05-01T10:00:00",
                "content_info": {"title": "Album", "artist": "Band", "track_count": 12, "kind": "album"},
                "download_stats": {"success": 10, "failed": 1, "skipped": 1}
            }"#,
        )
        .unwrap();
        assert_eq!(job.source, JobSource::Scheduler);
        assert_eq!(job.display_title(), "Album");
        assert_eq!(job.download_stats.unwrap().success, 10);
    }

    #[test]
    fn create_request_omits_missing_limit() {
        let body = serde_json::to_string(&CreateJobRequest {
            url: "u".into(),
            max_items: None,
        })
        .unwrap();
        assert_eq!(body, r#"{"url":"u"}"#);
    }
}
