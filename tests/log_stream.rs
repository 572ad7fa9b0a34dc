use async_trait::async_trait;
use futures::StreamExt;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

use ytmusic_dl::common::api::client::MessageStream;
use ytmusic_dl::common::api::error::ApiError;
use ytmusic_dl::common::api::models::log::LogEntry;
use ytmusic_dl::console::{ConnectionState, LogSource, LogStream, LogStreamOptions};

enum Step {
    /// 连接失败
    Fail,
    /// 连接成功，发送这些消息后断开
    Messages(Vec<String>),
}

/// 按脚本响应连接请求；脚本用完后保持一条不再有消息的连接
struct FakeSource {
    steps: Mutex<VecDeque<Step>>,
    opens: Mutex<Vec<Instant>>,
}

impl FakeSource {
    fn new(steps: Vec<Step>) -> Arc<Self> {
        Arc::new(Self {
            steps: Mutex::new(steps.into()),
            opens: Mutex::new(Vec::new()),
        })
    }

    fn open_count(&self) -> usize {
        self.opens.lock().unwrap().len()
    }

    fn open_gaps(&self) -> Vec<Duration> {
        let opens = self.opens.lock().unwrap();
        opens.windows(2).map(|w| w[1] - w[0]).collect()
    }
}

#[async_trait]
impl LogSource for FakeSource {
    async fn open(&self) -> Result<MessageStream, ApiError> {
        self.opens.lock().unwrap().push(Instant::now());
        let step = self.steps.lock().unwrap().pop_front();
        match step {
            Some(Step::Fail) => Err(ApiError::Http {
                status: 503,
                message: "unavailable".into(),
            }),
            Some(Step::Messages(messages)) => {
                Ok(futures::stream::iter(messages.into_iter().map(Ok)).boxed())
            }
            None => Ok(futures::stream::pending().boxed()),
        }
    }
}

fn options(cap: usize) -> LogStreamOptions {
    LogStreamOptions {
        cap,
        ..Default::default()
    }
}

async fn wait_for_state(stream: &LogStream, state: ConnectionState) {
    let mut rx = stream.watch_connection();
    tokio::time::timeout(Duration::from_secs(60), rx.wait_for(|s| *s == state))
        .await
        .expect("等待连接状态超时")
        .expect("连接状态通道已关闭");
}

async fn wait_until(mut condition: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(120);
    while !condition() {
        assert!(Instant::now() < deadline, "等待超时");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

fn assert_close(actual: Duration, expected_secs: u64) {
    let expected = Duration::from_secs(expected_secs);
    let diff = if actual > expected {
        actual - expected
    } else {
        expected - actual
    };
    assert!(
        diff <= Duration::from_millis(50),
        "间隔 {actual:?}，期望约 {expected:?}"
    );
}

#[tokio::test(start_paused = true)]
async fn test_reconnect_backoff_ladder_and_reset() {
    let source = FakeSource::new(vec![
        Step::Fail,
        Step::Fail,
        // 成功后立刻断开，退避从头开始
        Step::Messages(vec![]),
        Step::Fail,
        Step::Fail,
    ]);
    let stream = LogStream::start(source.clone(), options(100));

    wait_until(|| source.open_count() >= 6).await;
    let gaps = source.open_gaps();
    for (gap, expected) in gaps.iter().zip([1, 2, 1, 2, 4]) {
        assert_close(*gap, expected);
    }

    wait_for_state(&stream, ConnectionState::Open).await;
    assert!(stream.is_connected());
}

#[tokio::test(start_paused = true)]
async fn test_backoff_caps_at_last_delay() {
    let source = FakeSource::new((0..7).map(|_| Step::Fail).collect());
    let _stream = LogStream::start(
        source.clone(),
        LogStreamOptions {
            cap: 10,
            reconnect_delays: vec![Duration::from_secs(1), Duration::from_secs(3)],
        },
    );

    wait_until(|| source.open_count() >= 5).await;
    let gaps = source.open_gaps();
    assert_close(gaps[0], 1);
    assert_close(gaps[1], 3);
    assert_close(gaps[2], 3);
    assert_close(gaps[3], 3);
}

#[tokio::test(start_paused = true)]
async fn test_connection_flag_follows_open_and_error() {
    let source = FakeSource::new(vec![Step::Fail]);
    let stream = LogStream::start(source, options(10));

    wait_for_state(&stream, ConnectionState::Offline).await;
    assert!(!stream.is_connected());

    wait_for_state(&stream, ConnectionState::Open).await;
    assert!(stream.is_connected());
}

#[tokio::test(start_paused = true)]
async fn test_buffer_keeps_newest_lines_in_order() {
    let messages: Vec<String> = (0..1005).map(|i| format!("line {i}")).collect();
    let source = FakeSource::new(vec![Step::Messages(messages)]);
    let stream = LogStream::start(source, options(1000));

    wait_until(|| {
        stream
            .snapshot()
            .last()
            .is_some_and(|line| line.entry == LogEntry::parse("line 1004"))
    })
    .await;

    let lines = stream.snapshot();
    assert_eq!(lines.len(), 1000);
    assert_eq!(lines[0].entry, LogEntry::parse("line 5"));
    assert!(lines.windows(2).all(|w| w[0].id < w[1].id));

    let tail = stream.tail(2);
    assert_eq!(tail[1].entry, LogEntry::parse("line 1004"));

    stream.clear();
    assert!(stream.snapshot().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_subscribers_receive_parsed_entries() {
    let source = FakeSource::new(vec![Step::Messages(vec![
        r#"{"entry_type":"header","title":"Discovery"}"#.to_string(),
        r#"{"entry_type":"progress","current":1,"total":14,"message":"One More Time"}"#.to_string(),
        "plain text".to_string(),
    ])]);
    let stream = LogStream::start(source, options(100));
    let mut rx = stream.subscribe();

    let first = rx.recv().await.unwrap();
    assert_eq!(
        first.entry,
        LogEntry::Header {
            title: "Discovery".into()
        }
    );
    let second = rx.recv().await.unwrap();
    assert_eq!(second.entry.entry_type(), "progress");
    let third = rx.recv().await.unwrap();
    assert_eq!(
        third.entry,
        LogEntry::Default {
            message: "plain text".into(),
            level: None,
        }
    );
    assert!(first.id < second.id && second.id < third.id);
}

#[tokio::test(start_paused = true)]
async fn test_close_cancels_pending_reconnect() {
    let source = FakeSource::new(vec![Step::Fail, Step::Fail]);
    let stream = LogStream::start(source.clone(), options(10));

    wait_for_state(&stream, ConnectionState::Offline).await;
    stream.close();
    assert_eq!(stream.connection_state(), ConnectionState::Closed);

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(source.open_count(), 1);
    assert_eq!(stream.connection_state(), ConnectionState::Closed);
}

#[tokio::test(start_paused = true)]
async fn test_close_drops_open_connection() {
    let source = FakeSource::new(vec![]);
    let stream = LogStream::start(source.clone(), options(10));

    wait_for_state(&stream, ConnectionState::Open).await;
    stream.close();
    stream.close();
    assert!(!stream.is_connected());

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(source.open_count(), 1);
    assert!(stream.snapshot().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_drop_tears_down_reader() {
    let source = FakeSource::new(vec![Step::Fail, Step::Fail, Step::Fail]);
    let stream = LogStream::start(source.clone(), options(10));
    wait_for_state(&stream, ConnectionState::Offline).await;
    drop(stream);

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(source.open_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_clear_after_close_keeps_buffer() {
    let source = FakeSource::new(vec![Step::Messages(vec!["a".into(), "b".into()])]);
    let stream = LogStream::start(source, options(10));
    wait_until(|| stream.snapshot().len() == 2).await;

    stream.close();
    stream.clear();
    assert_eq!(stream.snapshot().len(), 2);
}
