use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Artist {
    pub name: String,
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Thumbnail {
    pub url: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlbumRef {
    pub name: String,
    #[serde(default)]
    pub id: Option<String>,
}

/// 搜索结果，字段随 resultType 不同而缺省
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    #[serde(default)]
    pub result_type: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub video_id: Option<String>,
    #[serde(default)]
    pub browse_id: Option<String>,
    #[serde(default)]
    pub playlist_id: Option<String>,
    #[serde(default)]
    pub artists: Vec<Artist>,
    #[serde(default)]
    pub album: Option<AlbumRef>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub thumbnails: Vec<Thumbnail>,
}

impl SearchResult {
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("(无标题)")
    }
}

/// 搜索过滤器
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SearchFilter {
    Songs,
    Videos,
    Albums,
    Artists,
    Playlists,
    CommunityPlaylists,
    FeaturedPlaylists,
    Uploads,
}

/// GET /search 的查询参数
#[derive(Debug, Clone, Serialize)]
pub struct SearchParams {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<SearchFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    pub ignore_spelling: bool,
}

impl SearchParams {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            filter: None,
            scope: None,
            limit: None,
            ignore_spelling: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionRun {
    pub text: String,
    #[serde(default)]
    pub bold: bool,
}

/// 搜索建议：纯文本或带高亮片段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Suggestion {
    Text(String),
    Detailed {
        text: String,
        #[serde(default)]
        runs: Vec<SuggestionRun>,
    },
}

impl Suggestion {
    pub fn text(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::Detailed { text, .. } => text,
        }
    }
}
