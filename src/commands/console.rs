use anyhow::Result;
use tokio::sync::broadcast::error::RecvError;

use ytmusic_dl::common::api::models::log::{LogEntry, LogLine};
use ytmusic_dl::common::logger::PrettyLogger;
use ytmusic_dl::console::{LogStream, LogStreamOptions};
use ytmusic_dl::{log_info, log_warning};

use super::App;

// 收起状态下只显示概要类的日志
fn is_summary(line: &LogLine) -> bool {
    matches!(
        line.entry,
        LogEntry::Header { .. }
            | LogEntry::Phase { .. }
            | LogEntry::Status { .. }
            | LogEntry::Stats { .. }
    )
}

pub async fn run_console(app: &App, all: bool, compact: bool) -> Result<()> {
    let expanded = if all || compact {
        all
    } else {
        app.prefs.console_expanded()
    };

    let options = LogStreamOptions {
        cap: app.config.log_buffer_cap,
        reconnect_delays: app.config.reconnect_delays(),
    };
    let stream = LogStream::start(app.client.clone(), options);
    let mut lines = stream.subscribe();
    let mut connection = stream.watch_connection();

    log_info!("正在接收实时日志，按 Ctrl-C 退出");
    PrettyLogger::connection(*connection.borrow_and_update());

    loop {
        tokio::select! {
            received = lines.recv() => match received {
                Ok(line) => {
                    if expanded || is_summary(&line) {
                        PrettyLogger::log_line(&line);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    log_warning!("输出太慢，跳过了 {} 行日志", skipped);
                }
                Err(RecvError::Closed) => break,
            },
            changed = connection.changed() => {
                if changed.is_err() {
                    break;
                }
                PrettyLogger::connection(*connection.borrow_and_update());
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    let received = stream.snapshot().len();
    stream.close();
    log_info!("已断开，缓冲区中共有 {} 行日志", received);
    Ok(())
}
