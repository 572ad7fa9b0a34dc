//! `text/event-stream` 解码。
//!
//! 只关心 `data:` 字段：同一事件的多行 data 用 `\n` 拼接，
//! 空行结束一个事件。注释行（以 `:` 开头）和 `event:`/`id:`/`retry:` 忽略。

use tracing::warn;

/// 单行超过这个长度时整行丢弃
pub const MAX_LINE_BYTES: usize = 1024 * 1024;

/// 增量解码器，字节块可以在任意位置断开。
/// 行尾可以是 `\n`、`\r\n` 或单独的 `\r`。
#[derive(Debug, Default)]
pub struct SseDecoder {
    line: Vec<u8>,
    data: Vec<String>,
    // 上一块以 \r 结尾，下一块开头的 \n 属于同一个行尾
    after_cr: bool,
    // 正在跳过超长行的剩余部分
    discarding: bool,
}

impl SseDecoder {
    /// 喂入一块字节，返回其中完整的事件数据
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut events = Vec::new();
        let mut rest = chunk;
        if std::mem::take(&mut self.after_cr) && rest.first() == Some(&b'\n') {
            rest = &rest[1..];
        }

        while let Some(pos) = rest.iter().position(|b| matches!(b, b'\r' | b'\n')) {
            self.push_bytes(&rest[..pos]);
            let terminator = rest[pos];
            rest = &rest[pos + 1..];
            if terminator == b'\r' {
                match rest.first() {
                    Some(b'\n') => rest = &rest[1..],
                    None => self.after_cr = true,
                    Some(_) => {}
                }
            }
            self.end_line(&mut events);
        }
        self.push_bytes(rest);
        events
    }

    fn push_bytes(&mut self, bytes: &[u8]) {
        if self.discarding || bytes.is_empty() {
            return;
        }
        if self.line.len() + bytes.len() > MAX_LINE_BYTES {
            warn!("日志流中的一行超过 {} 字节，已丢弃", MAX_LINE_BYTES);
            self.line = Vec::new();
            self.discarding = true;
            return;
        }
        self.line.extend_from_slice(bytes);
    }

    fn end_line(&mut self, events: &mut Vec<String>) {
        if std::mem::take(&mut self.discarding) {
            return;
        }
        let raw = std::mem::take(&mut self.line);
        let line = String::from_utf8_lossy(&raw);

        if line.is_empty() {
            if !self.data.is_empty() {
                events.push(self.data.join("\n"));
                self.data.clear();
            }
            return;
        }
        if line.starts_with(':') {
            return;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (&*line, ""),
        };
        if field == "data" {
            self.data.push(value.to_string());
        }
    }
}
