use anyhow::Result;
use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::collections::HashMap;

use ytmusic_dl::common::api::models::job::JobSource;
use ytmusic_dl::common::logger::PrettyLogger;
use ytmusic_dl::downloader::status::derive;
use ytmusic_dl::{log_info, log_success, log_warning};

use super::App;

pub async fn run_jobs(app: &App, watch: bool) -> Result<()> {
    app.jobs.load().await?;
    let snapshot = app.jobs.snapshot();

    if snapshot.jobs.is_empty() {
        log_info!("暂无下载任务");
        return Ok(());
    }

    PrettyLogger::title(format!("下载任务 ({} 个进行中)", snapshot.active_count()));
    for job in &snapshot.jobs {
        let mut line = PrettyLogger::format_job(job, derive(Some(job), false));
        if job.source == JobSource::Scheduler {
            line.push_str(&" (订阅)".bright_black().to_string());
        }
        println!("{}", line);
    }

    if watch && snapshot.polling {
        PrettyLogger::separator();
        watch_jobs(app).await?;
    }
    Ok(())
}

fn bar_prefix(title: &str) -> String {
    let short: String = title.chars().take(28).collect();
    if short.len() < title.len() {
        format!("{}…", short)
    } else {
        short
    }
}

/// 持续显示任务进度，直到轮询停止或按下 Ctrl-C
pub(crate) async fn watch_jobs(app: &App) -> Result<()> {
    let mut rx = app.jobs.subscribe();
    let board = MultiProgress::new();
    let style = ProgressStyle::with_template("{prefix:30.bold} {bar:30.green/white} {pos:>3}% {msg}")?
        .progress_chars("█▉░");
    let mut bars: HashMap<String, ProgressBar> = HashMap::new();

    loop {
        let snapshot = rx.borrow_and_update().clone();
        for job in &snapshot.jobs {
            let bar = bars.entry(job.id.clone()).or_insert_with(|| {
                let pb = board.add(ProgressBar::new(100));
                pb.set_style(style.clone());
                pb.set_prefix(bar_prefix(job.display_title()));
                pb
            });
            if bar.is_finished() {
                continue;
            }
            let state = derive(Some(job), false);
            bar.set_position(state.progress.unwrap_or(0).clamp(0, 100) as u64);
            bar.set_message(PrettyLogger::status_badge(state));
            if job.status.is_finished() {
                bar.finish();
            }
        }

        if !snapshot.polling {
            break;
        }

        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                log_warning!("已停止监视，任务仍在后台运行");
                break;
            }
        }
    }

    for bar in bars.values() {
        if !bar.is_finished() {
            bar.abandon();
        }
    }
    Ok(())
}

pub async fn run_cancel(app: &App, id: &str) -> Result<()> {
    if app.jobs.cancel(id).await {
        log_success!("已请求取消任务 {}", id);
    } else {
        log_warning!("取消任务 {} 未成功，已刷新任务列表", id);
    }
    print_job(app, id);
    Ok(())
}

pub async fn run_delete(app: &App, id: &str) -> Result<()> {
    if app.jobs.delete(id).await {
        log_success!("已删除任务 {}", id);
    } else {
        log_warning!("删除任务 {} 未成功，已刷新任务列表", id);
    }
    print_job(app, id);
    Ok(())
}

fn print_job(app: &App, id: &str) {
    let snapshot = app.jobs.snapshot();
    if let Some(job) = snapshot.jobs.iter().find(|job| job.id == id) {
        println!("{}", PrettyLogger::format_job(job, derive(Some(job), false)));
    }
}
