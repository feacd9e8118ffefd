//! YouTube video resolution and metadata.

mod data_api;

pub use data_api::YoutubeDataApi;

use crate::error::Result;
use crate::table::{columns, Row};
use async_trait::async_trait;
use regex::Regex;
use std::sync::OnceLock;

/// Video metadata as written into the structural columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoDetails {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Publish timestamp as reported by the platform (ISO 8601).
    pub published: String,
    pub channel: String,
    /// Comma-joined tags.
    pub tags: String,
    /// `H:MM:SS`.
    pub duration: String,
}

impl VideoDetails {
    /// Rebuild details from the structural columns of an existing row.
    pub fn from_row(video_id: &str, row: &Row) -> Self {
        let text = |c: &str| row.get(c).map(|v| v.to_string()).unwrap_or_default();
        Self {
            id: video_id.to_string(),
            title: text(columns::TITLE),
            description: text(columns::DESCRIPTION),
            published: text(columns::PUBLISHED),
            channel: text(columns::CHANNEL),
            tags: text(columns::TAGS),
            duration: text(columns::DURATION),
        }
    }

    /// Write the structural columns (everything except the transcript ones).
    pub fn write_to(&self, row: &mut Row) {
        row.set(columns::URL, columns::watch_url(&self.id));
        row.set(columns::TITLE, self.title.as_str());
        row.set(columns::DESCRIPTION, self.description.as_str());
        row.set(columns::PUBLISHED, self.published.as_str());
        row.set(columns::CHANNEL, self.channel.as_str());
        row.set(columns::TAGS, self.tags.as_str());
        row.set(columns::DURATION, self.duration.as_str());
    }
}

/// Where videos come from and what they are called.
#[async_trait]
pub trait VideoSource: Send + Sync {
    /// Expand a CLI input (ID, URL, list, playlist or handle) into video IDs.
    async fn resolve_video_ids(&self, input: &str) -> Result<Vec<String>>;

    /// Fetch metadata for one video. `None` when the video does not exist.
    async fn fetch_details(&self, video_id: &str) -> Result<Option<VideoDetails>>;
}

/// What a CLI video argument refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoInput {
    Videos(Vec<String>),
    Playlist(String),
    Handle(String),
}

impl VideoInput {
    /// Classify a raw argument without touching the network.
    pub fn classify(input: &str) -> Self {
        let input = input.trim();

        if let Some(list) = playlist_param(input) {
            return VideoInput::Playlist(list);
        }
        if input.starts_with('@') {
            return VideoInput::Handle(input.to_string());
        }
        if input.starts_with("PL") && !input.contains(',') {
            return VideoInput::Playlist(input.to_string());
        }

        let ids = input
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| extract_video_id(s).unwrap_or_else(|| s.to_string()))
            .collect();
        VideoInput::Videos(ids)
    }
}

fn playlist_param(input: &str) -> Option<String> {
    if !input.starts_with("http") {
        return None;
    }
    let parsed = url::Url::parse(input).ok()?;
    parsed
        .query_pairs()
        .find(|(k, _)| k == "list")
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.is_empty())
}

/// Extract a video ID from a YouTube URL or a bare 11-character ID.
pub fn extract_video_id(input: &str) -> Option<String> {
    static VIDEO_ID_RE: OnceLock<Regex> = OnceLock::new();
    let re = VIDEO_ID_RE.get_or_init(|| {
        Regex::new(
            r"(?x)
            (?:
                (?:https?://)?
                (?:www\.|m\.)?
                (?:youtube\.com/watch\?(?:.*&)?v=|youtu\.be/|youtube\.com/embed/|youtube\.com/v/|youtube\.com/shorts/)
                ([a-zA-Z0-9_-]{11})
            )
            |
            ^([a-zA-Z0-9_-]{11})$
        ",
        )
        .expect("valid regex")
    });

    let caps = re.captures(input.trim())?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str().to_string())
}

/// Format an ISO 8601 duration (`PT1H2M3S`) as `H:MM:SS`.
///
/// Days fold into hours. Unparseable input is returned unchanged.
pub fn format_iso_duration(iso: &str) -> String {
    static DURATION_RE: OnceLock<Regex> = OnceLock::new();
    let re = DURATION_RE.get_or_init(|| {
        Regex::new(r"^P(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?)?$").expect("valid regex")
    });

    let Some(caps) = re.captures(iso.trim()) else {
        return iso.to_string();
    };
    let part = |i: usize| -> u64 {
        caps.get(i)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0)
    };

    let hours = part(1) * 24 + part(2);
    format!("{}:{:02}:{:02}", hours, part(3), part(4))
}
