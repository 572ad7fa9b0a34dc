use anyhow::{Result, bail};
use colored::Colorize;

use ytmusic_dl::common::api::models::subscription::{
    CreateSubscriptionRequest, Subscription, SyncResponse, UpdateSubscriptionRequest,
};
use ytmusic_dl::common::logger::PrettyLogger;
use ytmusic_dl::{log_info, log_success};

use super::App;
use crate::cli::SubsCommand;

fn format_subscription(sub: &Subscription) -> String {
    let state = if sub.enabled {
        "● 启用".green()
    } else {
        "○ 停用".bright_black()
    };
    let mut line = format!(
        "{} {} {}",
        state,
        sub.display_name().bold(),
        format!("[{}]", sub.id).bright_black()
    );
    if let Some(max) = sub.max_items {
        line.push_str(&format!(" 最多 {} 条", max));
    }
    if let Some(synced) = &sub.last_synced_at {
        line.push_str(&format!(" 上次同步 {}", synced).bright_black().to_string());
    }
    line
}

fn report_sync(resp: &SyncResponse) {
    let jobs = resp.triggered_jobs();
    if jobs.is_empty() {
        log_info!("{}", resp.message.as_deref().unwrap_or("没有需要同步的新内容"));
    } else {
        log_success!("已触发 {} 个任务: {}", jobs.len(), jobs.join(", "));
    }
}

pub async fn run_subs(app: &App, command: SubsCommand) -> Result<()> {
    match command {
        SubsCommand::List => {
            let subs = app.client.list_subscriptions().await;
            if subs.is_empty() {
                log_info!("暂无订阅");
            } else {
                PrettyLogger::title(format!("订阅 ({})", subs.len()));
                for sub in &subs {
                    println!("{}", format_subscription(sub));
                }
            }
        }
        SubsCommand::Add {
            url,
            name,
            max_items,
        } => {
            let sub = app
                .client
                .create_subscription(&CreateSubscriptionRequest {
                    url,
                    name,
                    max_items,
                })
                .await?;
            log_success!("已添加订阅");
            println!("{}", format_subscription(&sub));
        }
        SubsCommand::Update {
            id,
            name,
            enable,
            disable,
            max_items,
        } => {
            let request = UpdateSubscriptionRequest {
                name,
                enabled: match (enable, disable) {
                    (true, _) => Some(true),
                    (_, true) => Some(false),
                    _ => None,
                },
                max_items,
            };
            if request.is_empty() {
                bail!("没有需要修改的字段");
            }
            let sub = app.client.update_subscription(&id, &request).await?;
            log_success!("已更新订阅");
            println!("{}", format_subscription(&sub));
        }
        SubsCommand::Remove { id } => {
            app.client.delete_subscription(&id).await?;
            log_success!("已删除订阅 {}", id);
        }
        SubsCommand::Sync { id } => {
            let resp = app.client.sync_subscription(&id).await?;
            report_sync(&resp);
        }
        SubsCommand::SyncAll => {
            let resp = app.client.sync_all_subscriptions().await?;
            report_sync(&resp);
        }
    }
    Ok(())
}

pub async fn run_scheduler(app: &App) -> Result<()> {
    let status = app.client.scheduler_status().await?;
    if status.running {
        log_success!("调度器运行中");
    } else {
        log_info!("调度器未运行");
    }
    if let Some(minutes) = status.interval_minutes {
        println!("  间隔: {} 分钟", minutes);
    }
    if let Some(last) = &status.last_run_at {
        println!("  上次运行: {}", last);
    }
    if let Some(next) = &status.next_run_at {
        println!("  下次运行: {}", next);
    }
    Ok(())
}
