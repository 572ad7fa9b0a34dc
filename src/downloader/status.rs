use colored::Color;
use std::fmt;

use crate::common::api::models::job::{Job, JobStatus};

/// 界面上展示的下载状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayStatus {
    Idle,
    Queued,
    Downloading,
    Completed,
    Failed,
}

/// 状态的展示样式：图标、颜色、文字
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusStyle {
    pub icon: &'static str,
    pub color: Color,
    pub label: &'static str,
}

// 所有视图共用这一张表
const STATUS_STYLES: [(DisplayStatus, StatusStyle); 5] = [
    (
        DisplayStatus::Idle,
        StatusStyle {
            icon: "·",
            color: Color::BrightBlack,
            label: "未下载",
        },
    ),
    (
        DisplayStatus::Queued,
        StatusStyle {
            icon: "⏳",
            color: Color::Yellow,
            label: "排队中",
        },
    ),
    (
        DisplayStatus::Downloading,
        StatusStyle {
            icon: "⬇",
            color: Color::Blue,
            label: "下载中",
        },
    ),
    (
        DisplayStatus::Completed,
        StatusStyle {
            icon: "✓",
            color: Color::Green,
            label: "已完成",
        },
    ),
    (
        DisplayStatus::Failed,
        StatusStyle {
            icon: "✗",
            color: Color::Red,
            label: "失败",
        },
    ),
];

impl DisplayStatus {
    pub fn style(self) -> StatusStyle {
        STATUS_STYLES[self as usize].1
    }
}

impl fmt::Display for DisplayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.style().label)
    }
}

/// 每个实体的派生下载状态，只计算不保存
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivedDownloadState {
    pub status: DisplayStatus,
    pub progress: Option<i64>,
}

impl DerivedDownloadState {
    pub const IDLE: Self = Self {
        status: DisplayStatus::Idle,
        progress: None,
    };

    pub const QUEUED: Self = Self {
        status: DisplayStatus::Queued,
        progress: None,
    };

    pub fn is_idle(&self) -> bool {
        self.status == DisplayStatus::Idle
    }
}

/// 统一进度：≤1 视为比例乘以 100，否则已经是百分比；都四舍五入
pub fn normalize_progress(raw: Option<f64>) -> Option<i64> {
    let value = raw?;
    if value.is_nan() {
        return None;
    }
    let percent = if value <= 1.0 { value * 100.0 } else { value };
    Some(percent.round() as i64)
}

/// 由匹配到的任务和本地等待标记计算展示状态
pub fn derive(job: Option<&Job>, is_pending: bool) -> DerivedDownloadState {
    let Some(job) = job else {
        return if is_pending {
            DerivedDownloadState::QUEUED
        } else {
            DerivedDownloadState::IDLE
        };
    };

    match job.status {
        JobStatus::Completed => DerivedDownloadState {
            status: DisplayStatus::Completed,
            progress: Some(100),
        },
        JobStatus::Failed | JobStatus::Cancelled => DerivedDownloadState {
            status: DisplayStatus::Failed,
            progress: None,
        },
        JobStatus::Pending | JobStatus::FetchingInfo => DerivedDownloadState::QUEUED,
        JobStatus::Downloading | JobStatus::Importing => DerivedDownloadState {
            status: DisplayStatus::Downloading,
            progress: normalize_progress(job.progress),
        },
        JobStatus::Unknown => DerivedDownloadState::QUEUED,
    }
}

/// 专辑视图：曲目自身没有状态时沿用专辑的状态
pub fn with_album_fallback(
    track: DerivedDownloadState,
    album: DerivedDownloadState,
) -> DerivedDownloadState {
    if track.is_idle() && !album.is_idle() {
        album
    } else {
        track
    }
}

/// 在任务列表中按链接精确匹配
pub fn find_job<'a>(jobs: &'a [Job], url: &str) -> Option<&'a Job> {
    jobs.iter().find(|job| job.url == url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(status: JobStatus, progress: Option<f64>) -> Job {
        Job {
            id: "1".into(),
            url: "https://x/watch?v=v1".into(),
            status,
            progress,
            content_info: None,
            download_stats: None,
            source: Default::default(),
            created_at: None,
            error: None,
            max_items: None,
        }
    }

    #[test]
    fn progress_normalization() {
        assert_eq!(normalize_progress(None), None);
        assert_eq!(normalize_progress(Some(f64::NAN)), None);
        assert_eq!(normalize_progress(Some(0.42)), Some(42));
        assert_eq!(normalize_progress(Some(0.005)), Some(1));
        assert_eq!(normalize_progress(Some(1.0)), Some(100));
        assert_eq!(normalize_progress(Some(0.0)), Some(0));
        assert_eq!(normalize_progress(Some(42.4)), Some(42));
        assert_eq!(normalize_progress(Some(99.5)), Some(100));
        for p in [0.1, 0.33, 0.5, 0.999] {
            assert_eq!(normalize_progress(Some(p)), Some((p * 100.0).round() as i64));
        }
        for p in [1.01, 7.0, 55.5, 100.0] {
            assert_eq!(normalize_progress(Some(p)), Some(p.round() as i64));
        }
    }

    #[test]
    fn derivation_table() {
        let cases = [
            (JobStatus::Completed, DisplayStatus::Completed, Some(100)),
            (JobStatus::Failed, DisplayStatus::Failed, None),
            (JobStatus::Cancelled, DisplayStatus::Failed, None),
            (JobStatus::Pending, DisplayStatus::Queued, None),
            (JobStatus::FetchingInfo, DisplayStatus::Queued, None),
            (JobStatus::Downloading, DisplayStatus::Downloading, Some(42)),
            (JobStatus::Importing, DisplayStatus::Downloading, Some(42)),
            (JobStatus::Unknown, DisplayStatus::Queued, None),
        ];
        for (status, expected, progress) in cases {
            let state = derive(Some(&job(status, Some(0.42))), false);
            assert_eq!(state.status, expected, "{status}");
            assert_eq!(state.progress, progress, "{status}");
        }
    }

    #[test]
    fn no_job_uses_pending_marker() {
        assert_eq!(derive(None, true), DerivedDownloadState::QUEUED);
        assert_eq!(derive(None, false), DerivedDownloadState::IDLE);
    }

    #[test]
    fn job_wins_over_pending_marker() {
        let state = derive(Some(&job(JobStatus::Completed, None)), true);
        assert_eq!(state.status, DisplayStatus::Completed);
    }

    #[test]
    fn derivation_is_pure() {
        let j = job(JobStatus::Downloading, Some(0.7));
        assert_eq!(derive(Some(&j), false), derive(Some(&j), false));
        assert_eq!(derive(None, true), derive(None, true));
    }

    #[test]
    fn album_fallback_only_fills_idle_tracks() {
        let downloading = DerivedDownloadState {
            status: DisplayStatus::Downloading,
            progress: Some(10),
        };
        assert_eq!(
            with_album_fallback(DerivedDownloadState::IDLE, downloading),
            downloading
        );
        assert_eq!(
            with_album_fallback(DerivedDownloadState::QUEUED, downloading),
            DerivedDownloadState::QUEUED
        );
        assert_eq!(
            with_album_fallback(DerivedDownloadState::IDLE, DerivedDownloadState::IDLE),
            DerivedDownloadState::IDLE
        );
    }

    #[test]
    fn find_job_is_exact_string_match() {
        let jobs = vec![job(JobStatus::Pending, None)];
        assert!(find_job(&jobs, "https://x/watch?v=v1").is_some());
        assert!(find_job(&jobs, "https://x/watch?v=v1/").is_none());
        assert!(find_job(&jobs, "HTTPS://x/watch?v=v1").is_none());
    }

    #[test]
    fn style_table_is_indexed_by_status() {
        for status in [
            DisplayStatus::Idle,
            DisplayStatus::Queued,
            DisplayStatus::Downloading,
            DisplayStatus::Completed,
            DisplayStatus::Failed,
        ] {
            assert_eq!(STATUS_STYLES[status as usize].0, status);
        }
        assert_eq!(DisplayStatus::Failed.to_string(), "失败");
    }
}
