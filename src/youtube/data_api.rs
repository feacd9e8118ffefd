//! YouTube Data API v3 client.

use super::{format_iso_duration, VideoDetails, VideoInput, VideoSource};
use crate::error::{Result, YtDocsError};
use crate::llm::required_env;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

const PAGE_SIZE: &str = "50";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItem {
    content_details: PlaylistItemDetails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemDetails {
    video_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Channel {
    content_details: ChannelDetails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelDetails {
    related_playlists: RelatedPlaylists,
}

#[derive(Debug, Deserialize)]
struct RelatedPlaylists {
    uploads: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Video {
    snippet: Snippet,
    content_details: VideoContentDetails,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Snippet {
    title: String,
    description: String,
    published_at: String,
    channel_title: String,
    tags: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct VideoContentDetails {
    duration: String,
}

impl Video {
    fn into_details(self, video_id: &str) -> VideoDetails {
        VideoDetails {
            id: video_id.to_string(),
            title: self.snippet.title,
            description: self.snippet.description,
            published: self.snippet.published_at,
            channel: self.snippet.channel_title,
            tags: self.snippet.tags.join(", "),
            duration: format_iso_duration(&self.content_details.duration),
        }
    }
}

/// Video source backed by the YouTube Data API, keyed by `YOUTUBE_DATA_API_KEY`.
pub struct YoutubeDataApi {
    http: reqwest::Client,
    api_base: String,
    api_key: String,
}

impl YoutubeDataApi {
    pub fn new(api_base: &str, api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| YtDocsError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    /// Build a client with the key from the environment.
    pub fn from_env(api_base: &str, timeout: Duration) -> Result<Self> {
        Self::new(api_base, required_env("YOUTUBE_DATA_API_KEY")?, timeout)
    }

    async fn get<T: DeserializeOwned>(&self, resource: &str, params: &[(&str, &str)]) -> Result<T> {
        let url = format!("{}/{}", self.api_base, resource);
        let response = self
            .http
            .get(&url)
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(YtDocsError::VideoSource(format!(
                "YouTube API {} returned {}: {}",
                resource, status, body
            )));
        }

        Ok(response.json().await?)
    }

    /// Every video ID in a playlist, following pagination.
    #[instrument(skip(self))]
    async fn playlist_video_ids(&self, playlist_id: &str) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut params = vec![
                ("part", "contentDetails"),
                ("playlistId", playlist_id),
                ("maxResults", PAGE_SIZE),
            ];
            if let Some(token) = page_token.as_deref() {
                params.push(("pageToken", token));
            }

            let page: ListResponse<PlaylistItem> = self.get("playlistItems", &params).await?;
            ids.extend(page.items.into_iter().map(|i| i.content_details.video_id));

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!("Playlist {} has {} videos", playlist_id, ids.len());
        Ok(ids)
    }

    /// Uploads playlist of a channel handle such as `@name`.
    async fn uploads_playlist(&self, handle: &str) -> Result<String> {
        let page: ListResponse<Channel> = self
            .get("channels", &[("part", "contentDetails"), ("forHandle", handle)])
            .await?;

        page.items
            .into_iter()
            .next()
            .map(|c| c.content_details.related_playlists.uploads)
            .ok_or_else(|| YtDocsError::VideoNotFound(format!("No channel for handle {}", handle)))
    }
}

#[async_trait]
impl VideoSource for YoutubeDataApi {
    async fn resolve_video_ids(&self, input: &str) -> Result<Vec<String>> {
        let ids = match VideoInput::classify(input) {
            VideoInput::Videos(ids) => ids,
            VideoInput::Playlist(list) => self.playlist_video_ids(&list).await?,
            VideoInput::Handle(handle) => {
                let uploads = self.uploads_playlist(&handle).await?;
                info!("Resolved {} to uploads playlist {}", handle, uploads);
                self.playlist_video_ids(&uploads).await?
            }
        };

        if ids.is_empty() {
            return Err(YtDocsError::InvalidInput(format!("No videos found for '{}'", input)));
        }
        Ok(ids)
    }

    #[instrument(skip(self))]
    async fn fetch_details(&self, video_id: &str) -> Result<Option<VideoDetails>> {
        let page: ListResponse<Video> = self
            .get("videos", &[("part", "snippet,contentDetails"), ("id", video_id)])
            .await?;

        match page.items.into_iter().next() {
            Some(video) => Ok(Some(video.into_details(video_id))),
            None => {
                warn!("Video {} not found", video_id);
                Ok(None)
            }
        }
    }
}
