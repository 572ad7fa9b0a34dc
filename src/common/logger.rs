use colored::*;
use tracing_subscriber::EnvFilter;

use crate::common::api::models::job::Job;
use crate::common::api::models::log::{LogEntry, LogLine, StatsType};
use crate::console::ConnectionState;
use crate::downloader::status::DerivedDownloadState;

/// 初始化 tracing，`RUST_LOG` 优先，其次由 `-v` 决定级别
pub fn init_logging(verbose: bool) {
    let default_directive = if verbose {
        "info,ytmusic_dl=debug"
    } else {
        "warn,ytmusic_dl=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// 漂亮的终端输出工具
pub struct PrettyLogger;

impl PrettyLogger {
    /// 显示成功消息
    pub fn success(message: impl AsRef<str>) {
        println!("{} {}", "✓".green().bold(), message.as_ref());
    }

    /// 显示信息消息
    pub fn info(message: impl AsRef<str>) {
        println!("{} {}", "ℹ".blue().bold(), message.as_ref());
    }

    /// 显示警告消息
    pub fn warning(message: impl AsRef<str>) {
        println!("{} {}", "⚠".yellow().bold(), message.as_ref());
    }

    /// 显示错误消息
    pub fn error(message: impl AsRef<str>) {
        eprintln!("{} {}", "✗".red().bold(), message.as_ref());
    }

    /// 显示分割线
    pub fn separator() {
        println!("{}", "─".repeat(50).bright_black());
    }

    /// 显示标题
    pub fn title(text: impl AsRef<str>) {
        let text = text.as_ref();
        let width = text.chars().count().min(46);
        let padding = (48 - width) / 2;
        println!(
            "{} {} {}",
            "─".repeat(padding).bright_black(),
            text.bold(),
            "─".repeat(48 - padding - width).bright_black()
        );
    }

    /// 状态徽标：图标 + 文字，下载中时带百分比
    pub fn status_badge(state: DerivedDownloadState) -> String {
        let style = state.status.style();
        let text = match state.progress {
            Some(p) if p < 100 => format!("{} {} {}%", style.icon, style.label, p),
            _ => format!("{} {}", style.icon, style.label),
        };
        text.color(style.color).to_string()
    }

    pub fn format_job(job: &Job, state: DerivedDownloadState) -> String {
        let mut line = format!(
            "{} {} {}",
            Self::status_badge(state),
            job.display_title().bold(),
            format!("[{}]", job.id).bright_black()
        );
        if let Some(stats) = job.download_stats {
            line.push_str(&format!(
                " 成功 {} / 失败 {} / 跳过 {}",
                stats.success, stats.failed, stats.skipped
            ));
        }
        if let Some(error) = &job.error {
            line.push_str(&format!(" {}", error.red()));
        }
        line
    }

    /// 按日志类型渲染一行
    pub fn format_log_entry(entry: &LogEntry) -> String {
        match entry {
            LogEntry::Header { title } => {
                format!("{} {} {}", "═══".cyan(), title.cyan().bold(), "═══".cyan())
            }
            LogEntry::Phase { phase, message } => {
                format!("{} {} {}", "▶".cyan().bold(), format!("[{}]", phase).cyan(), message)
            }
            LogEntry::Stats {
                stats_type,
                success,
                failed,
                skipped,
                skipped_reasons,
            } => {
                let label = match stats_type {
                    StatsType::Extraction => "解析",
                    StatsType::Download => "下载",
                };
                let mut line = format!(
                    "📊 {}: {} {} {}",
                    label.bold(),
                    format!("成功 {}", success).green(),
                    format!("失败 {}", failed).red(),
                    format!("跳过 {}", skipped).yellow()
                );
                if !skipped_reasons.is_empty() {
                    let reasons: Vec<String> = skipped_reasons
                        .iter()
                        .map(|(reason, count)| format!("{}: {}", reason, count))
                        .collect();
                    line.push_str(&format!(" ({})", reasons.join(", ")).bright_black().to_string());
                }
                line
            }
            LogEntry::Progress {
                current,
                total,
                message,
            } => match (current, total) {
                (Some(current), Some(total)) => {
                    format!("{} {}", format!("[{}/{}]", current, total).blue(), message)
                }
                _ => format!("{} {}", "⬇".blue(), message),
            },
            LogEntry::Status { status, message } => {
                let icon = match status.as_str() {
                    "success" | "completed" | "done" => "✓".green().bold(),
                    "error" | "failed" => "✗".red().bold(),
                    "warning" | "skipped" => "⚠".yellow().bold(),
                    _ => "ℹ".blue().bold(),
                };
                format!("{} {}", icon, message)
            }
            LogEntry::File { path, action } => {
                format!("📁 {} {}", action.bold(), path)
            }
            LogEntry::Default { message, level } => match level.as_deref() {
                Some("error") => message.red().to_string(),
                Some("warning") | Some("warn") => message.yellow().to_string(),
                Some("debug") => message.bright_black().to_string(),
                _ => message.clone(),
            },
        }
    }

    pub fn log_line(line: &LogLine) {
        println!("{}", Self::format_log_entry(&line.entry));
    }

    pub fn connection(state: ConnectionState) {
        match state {
            ConnectionState::Open => println!("{}", "● 已连接".green()),
            ConnectionState::Connecting => println!("{}", "○ 正在连接...".yellow()),
            ConnectionState::Offline => println!("{}", "○ 离线，稍后重连".red()),
            ConnectionState::Closed => println!("{}", "○ 已关闭".bright_black()),
        }
    }
}

/// 便捷宏用于漂亮的日志输出
#[macro_export]
macro_rules! log_success {
    ($($arg:tt)*) => {
        $crate::common::logger::PrettyLogger::success(format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::common::logger::PrettyLogger::info(format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warning {
    ($($arg:tt)*) => {
        $crate::common::logger::PrettyLogger::warning(format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        $crate::common::logger::PrettyLogger::error(format!($($arg)*))
    };
}
