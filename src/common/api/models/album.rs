use serde::{Deserialize, Serialize};

use super::search::{Artist, Thumbnail};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumTrack {
    #[serde(default)]
    pub video_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub artists: Vec<Artist>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub track_number: Option<u32>,
    #[serde(default)]
    pub is_available: Option<bool>,
}

/// GET /albums/{browseId}
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    #[serde(default)]
    pub browse_id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub artists: Vec<Artist>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub track_count: Option<u32>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub audio_playlist_id: Option<String>,
    #[serde(default)]
    pub thumbnails: Vec<Thumbnail>,
    #[serde(default)]
    pub tracks: Vec<AlbumTrack>,
}

/// 相关内容中的一项（歌曲、专辑或歌单）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedItem {
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
    pub year: Option<String>,
    #[serde(default)]
    pub thumbnails: Vec<Thumbnail>,
}

/// GET /songs/{videoId}/related 返回的有序分组
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelatedSection {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub contents: Vec<RelatedItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn album_document_with_nested_tracks() {
        let album: Album = serde_json::from_str(
            r#"{
                "title": "Random Access Memories",
                "audioPlaylistId": "OLAK5uy_abc",
                "artists": [{"name": "Daft Punk", "id": "UC1"}],
                "tracks": [
                    {"videoId": "v1", "title": "Give Life Back to Music", "trackNumber": 1},
                    {"videoId": null, "title": "Unavailable", "isAvailable": false}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(album.audio_playlist_id.as_deref(), Some("OLAK5uy_abc"));
        assert_eq!(album.tracks.len(), 2);
        assert_eq!(album.tracks[0].track_number, Some(1));
        assert!(album.tracks[1].video_id.is_none());
    }
}
