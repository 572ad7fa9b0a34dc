use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::backoff::{DEFAULT_RECONNECT_DELAYS, ReconnectBackoff};
use super::buffer::{DEFAULT_LOG_CAP, LogBuffer};
use crate::common::api::client::{ApiClient, MessageStream};
use crate::common::api::error::ApiError;
use crate::common::api::models::log::{LogEntry, LogLine};

/// 能打开日志推送流的来源
#[async_trait]
pub trait LogSource: Send + Sync + 'static {
    async fn open(&self) -> Result<MessageStream, ApiError>;
}

#[async_trait]
impl LogSource for ApiClient {
    async fn open(&self) -> Result<MessageStream, ApiError> {
        self.open_log_stream().await
    }
}

// 连接状态机
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    // 出错断开，等待重连
    Offline,
    // 已销毁
    Closed,
}

impl ConnectionState {
    pub fn is_connected(self) -> bool {
        matches!(self, Self::Open)
    }
}

#[derive(Debug, Clone)]
pub struct LogStreamOptions {
    pub cap: usize,
    pub reconnect_delays: Vec<Duration>,
}

impl Default for LogStreamOptions {
    fn default() -> Self {
        Self {
            cap: DEFAULT_LOG_CAP,
            reconnect_delays: DEFAULT_RECONNECT_DELAYS.to_vec(),
        }
    }
}

struct Shared {
    buffer: Mutex<LogBuffer>,
    connection: watch::Sender<ConnectionState>,
    lines: broadcast::Sender<LogLine>,
    cancel: CancellationToken,
}

impl Shared {
    fn buffer(&self) -> MutexGuard<'_, LogBuffer> {
        match self.buffer.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn append(&self, payload: &str) {
        // 销毁之后不再更新任何状态
        if self.cancel.is_cancelled() {
            return;
        }
        let line = self.buffer().push(LogEntry::parse(payload));
        // 没有订阅者时发送失败，忽略即可
        let _ = self.lines.send(line);
    }

    fn set_connection(&self, state: ConnectionState) {
        if self.cancel.is_cancelled() {
            return;
        }
        self.connection.send_replace(state);
    }
}

/// 实时日志读取器：保持一条推送连接，断线后按退避阶梯重连
pub struct LogStream {
    shared: Arc<Shared>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl LogStream {
    /// 启动读取任务，必须在 tokio 运行时内调用
    pub fn start(source: Arc<dyn LogSource>, options: LogStreamOptions) -> Self {
        let (connection, _) = watch::channel(ConnectionState::Connecting);
        let (lines, _) = broadcast::channel(options.cap.clamp(16, 1024));
        let shared = Arc::new(Shared {
            buffer: Mutex::new(LogBuffer::new(options.cap)),
            connection,
            lines,
            cancel: CancellationToken::new(),
        });

        let backoff = ReconnectBackoff::new(options.reconnect_delays);
        let handle = tokio::spawn(Self::run(source, Arc::clone(&shared), backoff));

        Self {
            shared,
            handle: Mutex::new(Some(handle)),
        }
    }

    async fn run(source: Arc<dyn LogSource>, shared: Arc<Shared>, mut backoff: ReconnectBackoff) {
        let cancel = shared.cancel.clone();

        loop {
            shared.set_connection(ConnectionState::Connecting);
            let opened = tokio::select! {
                _ = cancel.cancelled() => return,
                opened = source.open() => opened,
            };

            match opened {
                Ok(mut messages) => {
                    backoff.reset();
                    shared.set_connection(ConnectionState::Open);
                    info!("日志流已连接");

                    loop {
                        let next = tokio::select! {
                            _ = cancel.cancelled() => return,
                            next = messages.next() => next,
                        };
                        match next {
                            Some(Ok(payload)) => shared.append(&payload),
                            Some(Err(e)) => {
                                warn!("日志流中断: {}", e);
                                break;
                            }
                            None => {
                                warn!("日志流被服务端关闭");
                                break;
                            }
                        }
                    }
                }
                Err(e) => warn!("连接日志流失败: {}", e),
            }

            shared.set_connection(ConnectionState::Offline);
            let delay = backoff.next_delay();
            debug!(
                "{:.0} 秒后重连日志流 (连续失败 {} 次)",
                delay.as_secs_f64(),
                backoff.attempt()
            );

            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    pub fn connection_state(&self) -> ConnectionState {
        *self.shared.connection.borrow()
    }

    pub fn is_connected(&self) -> bool {
        self.connection_state().is_connected()
    }

    /// 订阅连接状态变化
    pub fn watch_connection(&self) -> watch::Receiver<ConnectionState> {
        self.shared.connection.subscribe()
    }

    /// 订阅新到达的日志行
    pub fn subscribe(&self) -> broadcast::Receiver<LogLine> {
        self.shared.lines.subscribe()
    }

    pub fn snapshot(&self) -> Vec<LogLine> {
        self.shared.buffer().snapshot()
    }

    pub fn tail(&self, n: usize) -> Vec<LogLine> {
        self.shared.buffer().tail(n)
    }

    /// 清空缓冲区；关闭之后不再生效
    pub fn clear(&self) {
        if self.shared.cancel.is_cancelled() {
            return;
        }
        self.shared.buffer().clear();
    }

    /// 断开连接并取消等待中的重连，之后不会再有任何状态变化
    pub fn close(&self) {
        if self.shared.cancel.is_cancelled() {
            return;
        }
        self.shared.cancel.cancel();
        self.shared.connection.send_replace(ConnectionState::Closed);

        let handle = match self.handle.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(handle) = handle {
            handle.abort();
        }
        debug!("日志流已关闭");
    }
}

impl Drop for LogStream {
    fn drop(&mut self) {
        self.close();
    }
}
