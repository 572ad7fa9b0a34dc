use crate::common::api::models::album::{Album, AlbumTrack, RelatedItem};
use crate::common::api::models::search::SearchResult;

pub const DEFAULT_CONTENT_BASE_URL: &str = "https://music.youtube.com";

/// 界面实体到内容链接的映射。
///
/// 任务是否属于某个实体只看 `job.url` 和这里生成的链接是否完全相等，
/// 不做查询参数顺序、末尾斜杠或大小写的归一化。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentUrls {
    base: String,
}

impl ContentUrls {
    pub fn new(base: impl Into<String>) -> Self {
        let base: String = base.into();
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn watch(&self, video_id: &str) -> String {
        format!("{}/watch?v={}", self.base, video_id)
    }

    pub fn playlist(&self, playlist_id: &str) -> String {
        format!("{}/playlist?list={}", self.base, playlist_id)
    }

    pub fn browse(&self, browse_id: &str) -> String {
        format!("{}/browse/{}", self.base, browse_id)
    }

    /// 按 歌单 > 浏览页 > 播放页 的优先级选择链接
    pub fn by_ids(
        &self,
        playlist_id: Option<&str>,
        browse_id: Option<&str>,
        video_id: Option<&str>,
    ) -> Option<String> {
        if let Some(id) = non_empty(playlist_id) {
            return Some(self.playlist(id));
        }
        if let Some(id) = non_empty(browse_id) {
            return Some(self.browse(id));
        }
        non_empty(video_id).map(|id| self.watch(id))
    }

    pub fn url_for(&self, entity: &impl Downloadable) -> Option<String> {
        entity.content_url(self)
    }
}

impl Default for ContentUrls {
    fn default() -> Self {
        Self::new(DEFAULT_CONTENT_BASE_URL)
    }
}

fn non_empty(id: Option<&str>) -> Option<&str> {
    id.filter(|id| !id.trim().is_empty())
}

/// 可以提交下载的实体
pub trait Downloadable {
    fn content_url(&self, urls: &ContentUrls) -> Option<String>;
}

impl Downloadable for AlbumTrack {
    fn content_url(&self, urls: &ContentUrls) -> Option<String> {
        non_empty(self.video_id.as_deref()).map(|id| urls.watch(id))
    }
}

// 专辑优先用音频歌单，没有时退回浏览页
impl Downloadable for Album {
    fn content_url(&self, urls: &ContentUrls) -> Option<String> {
        if let Some(id) = non_empty(self.audio_playlist_id.as_deref()) {
            return Some(urls.playlist(id));
        }
        non_empty(self.browse_id.as_deref()).map(|id| urls.browse(id))
    }
}

impl Downloadable for SearchResult {
    fn content_url(&self, urls: &ContentUrls) -> Option<String> {
        urls.by_ids(
            self.playlist_id.as_deref(),
            self.browse_id.as_deref(),
            self.video_id.as_deref(),
        )
    }
}

impl Downloadable for RelatedItem {
    fn content_url(&self, urls: &ContentUrls) -> Option<String> {
        urls.by_ids(
            self.playlist_id.as_deref(),
            self.browse_id.as_deref(),
            self.video_id.as_deref(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_maps_to_watch_url() {
        let urls = ContentUrls::default();
        let track = AlbumTrack {
            video_id: Some("v1".into()),
            ..Default::default()
        };
        assert_eq!(
            urls.url_for(&track).as_deref(),
            Some("https://music.youtube.com/watch?v=v1")
        );
        assert_eq!(urls.url_for(&AlbumTrack::default()), None);
    }

    #[test]
    fn album_prefers_audio_playlist() {
        let urls = ContentUrls::new("https://x/");
        let mut album = Album {
            browse_id: Some("MPREb_1".into()),
            audio_playlist_id: Some("OLAK5uy_1".into()),
            ..Default::default()
        };
        assert_eq!(
            urls.url_for(&album).as_deref(),
            Some("https://x/playlist?list=OLAK5uy_1")
        );
        album.audio_playlist_id = None;
        assert_eq!(urls.url_for(&album).as_deref(), Some("https://x/browse/MPREb_1"));
    }

    #[test]
    fn search_result_priority_is_playlist_browse_watch() {
        let urls = ContentUrls::new("https://x");
        let mut result = SearchResult {
            video_id: Some("v".into()),
            browse_id: Some("b".into()),
            playlist_id: Some("p".into()),
            ..Default::default()
        };
        assert_eq!(urls.url_for(&result).as_deref(), Some("https://x/playlist?list=p"));
        result.playlist_id = None;
        assert_eq!(urls.url_for(&result).as_deref(), Some("https://x/browse/b"));
        result.browse_id = Some(String::new());
        assert_eq!(urls.url_for(&result).as_deref(), Some("https://x/watch?v=v"));
        result.video_id = None;
        assert_eq!(urls.url_for(&result), None);
    }

    #[test]
    fn related_items_use_the_same_priority() {
        let urls = ContentUrls::default();
        let item = RelatedItem {
            browse_id: Some("MPREb_9".into()),
            video_id: Some("v9".into()),
            ..Default::default()
        };
        assert_eq!(
            urls.url_for(&item).as_deref(),
            Some("https://music.youtube.com/browse/MPREb_9")
        );
    }
}
