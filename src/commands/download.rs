use anyhow::{Result, bail};

use ytmusic_dl::common::api::error::{ApiError, ErrorKind};
use ytmusic_dl::common::api::models::search::SearchParams;
use ytmusic_dl::parser::classify;
use ytmusic_dl::{log_info, log_success, log_warning};

use super::App;
use super::jobs::watch_jobs;
use super::search::run_search;

pub async fn run_download(app: &App, input: &str, max_items: Option<u32>, watch: bool) -> Result<()> {
    let kind = classify(input);

    if kind.is_direct_url {
        submit(app, input.trim(), max_items).await?;
        if watch {
            watch_jobs(app).await?;
        }
        return Ok(());
    }

    if kind.is_searchable {
        log_info!("不是可识别的内容链接，改为搜索 \"{}\"", input.trim());
        return run_search(app, SearchParams::new(input.trim()), None).await;
    }

    bail!("无法识别的链接: {}", input.trim())
}

/// 提交一个下载请求；失败时按错误类型给出提示
pub(crate) async fn submit(app: &App, url: &str, max_items: Option<u32>) -> Result<()> {
    // 先同步一次列表，等待标记才能和已有任务对上
    if !app.jobs.snapshot().loaded {
        let _ = app.jobs.refresh().await;
    }

    match app.jobs.request(url, max_items).await {
        Ok(created) => {
            log_success!("任务已提交: {} ({})", created.id, url);
            Ok(())
        }
        Err(e) => {
            print_hint(&e);
            Err(e.into())
        }
    }
}

fn print_hint(err: &ApiError) {
    match err.kind() {
        ErrorKind::Validation => log_warning!("请检查输入的链接和参数"),
        ErrorKind::Conflict => {
            if let Some(id) = err.active_job_id() {
                log_warning!("可以用 `ytmdl jobs --watch` 查看任务 {} 的进度", id);
            }
        }
        ErrorKind::Transport => log_warning!("请求失败，请确认后端服务可用后重试"),
    }
}
