use lazy_static::lazy_static;
use regex::Regex;

/// 用户输入的分类结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputKind {
    /// 可以直接提交下载的内容链接
    pub is_direct_url: bool,
    /// 可以当作关键词搜索
    pub is_searchable: bool,
}

lazy_static! {
    // 支持的链接形式：歌单、浏览页、播放页（带或不带 music. 子域名）以及短链接
    static ref DIRECT_URL_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"^https?://(?:(?:music|www)\.)?youtube\.com/playlist\?(?:[^#]*&)?list=[\w-]+").unwrap(),
        Regex::new(r"^https?://(?:(?:music|www)\.)?youtube\.com/browse/[\w-]+").unwrap(),
        Regex::new(r"^https?://(?:(?:music|www)\.)?youtube\.com/watch\?(?:[^#]*&)?v=[\w-]+").unwrap(),
        Regex::new(r"^https?://youtu\.be/[\w-]+").unwrap(),
    ];
}

/// 判断输入是直接链接还是搜索关键词，不访问网络
pub fn classify(input: &str) -> InputKind {
    let trimmed = input.trim();
    InputKind {
        is_direct_url: is_direct_url(trimmed),
        is_searchable: is_searchable(trimmed),
    }
}

fn is_direct_url(input: &str) -> bool {
    DIRECT_URL_PATTERNS
        .iter()
        .any(|pattern| pattern.is_match(input))
}

fn is_searchable(input: &str) -> bool {
    if input.is_empty() {
        return false;
    }
    let lower = input.to_ascii_lowercase();
    !(lower.starts_with("http://") || lower.starts_with("https://"))
}
