use std::time::Duration;

/// 默认重连间隔：1s, 2s, 4s, 8s, 16s，之后一直停在最后一档
pub const DEFAULT_RECONNECT_DELAYS: [Duration; 5] = [
    Duration::from_secs(1),
    Duration::from_secs(2),
    Duration::from_secs(4),
    Duration::from_secs(8),
    Duration::from_secs(16),
];

/// 固定阶梯的指数退避
#[derive(Debug, Clone)]
pub struct ReconnectBackoff {
    delays: Vec<Duration>,
    attempt: usize,
}

impl ReconnectBackoff {
    pub fn new(delays: Vec<Duration>) -> Self {
        let delays = if delays.is_empty() {
            DEFAULT_RECONNECT_DELAYS.to_vec()
        } else {
            delays
        };
        Self { delays, attempt: 0 }
    }

    /// 连续失败的次数
    pub fn attempt(&self) -> usize {
        self.attempt
    }

    /// 记录一次失败，返回下一次重连前的等待时间。
    /// 第 k 次连续失败后等待 `delays[min(k-1, len-1)]`。
    pub fn next_delay(&mut self) -> Duration {
        self.attempt += 1;
        let index = (self.attempt - 1).min(self.delays.len() - 1);
        self.delays[index]
    }

    /// 连接成功后归零
    pub fn reset(&mut self) {
        self.attempt = 0;
    }
}

impl Default for ReconnectBackoff {
    fn default() -> Self {
        Self::new(DEFAULT_RECONNECT_DELAYS.to_vec())
    }
}
