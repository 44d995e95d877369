//! YouTube channel feed fetching and parsing.
//!
//! Each monitored channel exposes an Atom feed of its most recent uploads.
//! This module fetches that feed and maps its entries to [`Video`] records,
//! newest first, which is the order YouTube serves them in.

use chrono::{DateTime, Utc};
use feed_rs::parser;
use reqwest::Client;
use std::time::Duration;

use crate::config::{ChannelConfig, MonitorConfig};
use crate::{Result, TubewatchError};

/// Feed URL prefix; the channel id is appended verbatim.
const FEED_URL_PREFIX: &str = "https://www.youtube.com/feeds/videos.xml?channel_id=";

/// Maximum length of a video description after shortening, placeholder
/// included.
pub const MAX_DESCRIPTION_LENGTH: usize = 200;

/// Placeholder appended to shortened descriptions.
const DESCRIPTION_PLACEHOLDER: &str = "...";

/// Maximum number of redirects to follow.
const MAX_REDIRECTS: usize = 5;

/// User agent string for feed fetching.
const USER_AGENT: &str = "tubewatch/0.1 (YouTube feed monitor)";

/// A single video parsed out of a channel feed.
///
/// Produced fresh on every fetch and never persisted; only the `id` outlives
/// the pass, as the channel's cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Video {
    /// Stable video id used for cursor comparison.
    pub id: String,
    /// Video title.
    pub title: String,
    /// Canonical watch link.
    pub link: String,
    /// Uploader name.
    pub author: String,
    /// Uploader channel URL.
    pub author_url: String,
    /// Publication time, when the feed provides one.
    pub published: Option<DateTime<Utc>>,
    /// Thumbnail image URL, empty when absent.
    pub thumbnail: String,
    /// Display name of the channel the video belongs to.
    pub channel_name: String,
    /// Description, shortened to at most [`MAX_DESCRIPTION_LENGTH`] chars.
    pub description: String,
}

impl Video {
    /// Whether the video is a YouTube Short.
    ///
    /// Shorts are excluded from notification but still advance the cursor.
    pub fn is_short(&self) -> bool {
        self.link.contains("shorts")
    }
}

/// Source of per-channel video lists, newest first.
///
/// The production implementation is [`YoutubeFeedSource`]; tests substitute
/// canned sources.
pub trait FeedSource {
    /// Fetch the channel's current uploads, newest first.
    fn fetch(
        &self,
        channel: &ChannelConfig,
    ) -> impl std::future::Future<Output = Result<Vec<Video>>> + Send;
}

/// Feed source backed by YouTube's public channel Atom feeds.
pub struct YoutubeFeedSource {
    client: Client,
}

impl YoutubeFeedSource {
    /// Create a source with timeouts from the monitor configuration.
    pub fn new(config: &MonitorConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .read_timeout(Duration::from_secs(config.read_timeout_secs))
            .timeout(Duration::from_secs(config.total_timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| TubewatchError::Fetch(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

impl FeedSource for YoutubeFeedSource {
    async fn fetch(&self, channel: &ChannelConfig) -> Result<Vec<Video>> {
        let url = format!("{FEED_URL_PREFIX}{}", channel.id);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| TubewatchError::Fetch(format!("failed to fetch feed: {e}")))?;

        if !response.status().is_success() {
            return Err(TubewatchError::Fetch(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| TubewatchError::Fetch(format!("failed to read response: {e}")))?;

        parse_videos(&bytes, &channel.name)
    }
}

/// Parse feed bytes into videos, preserving feed (newest-first) order.
pub fn parse_videos(bytes: &[u8], channel_name: &str) -> Result<Vec<Video>> {
    let feed = parser::parse(bytes)
        .map_err(|e| TubewatchError::Fetch(format!("failed to parse feed: {e}")))?;

    let videos = feed
        .entries
        .into_iter()
        .map(|entry| {
            let link = entry
                .links
                .first()
                .map(|l| l.href.clone())
                .unwrap_or_default();
            let id = extract_video_id(&entry.id, &link);
            let title = entry.title.map(|t| t.content).unwrap_or_default();
            let author = entry
                .authors
                .first()
                .map(|a| a.name.clone())
                .unwrap_or_default();
            let author_url = entry
                .authors
                .first()
                .and_then(|a| a.uri.clone())
                .unwrap_or_default();
            let published = entry.published.or(entry.updated);

            // YouTube carries thumbnail and description in the media group.
            let thumbnail = entry
                .media
                .first()
                .and_then(|m| m.thumbnails.first())
                .map(|t| t.image.uri.clone())
                .unwrap_or_default();
            let description = entry
                .summary
                .map(|t| t.content)
                .or_else(|| {
                    entry
                        .media
                        .first()
                        .and_then(|m| m.description.as_ref().map(|d| d.content.clone()))
                })
                .map(|d| shorten_description(&d))
                .unwrap_or_default();

            Video {
                id,
                title,
                link,
                author,
                author_url,
                published,
                thumbnail,
                channel_name: channel_name.to_string(),
                description,
            }
        })
        .collect();

    Ok(videos)
}

/// Extract the bare video id from an Atom entry.
///
/// YouTube entry ids look like `yt:video:VIDEOID`; the watch link's `v=`
/// query parameter is the fallback for anything else.
fn extract_video_id(entry_id: &str, link: &str) -> String {
    if let Some(id) = entry_id.strip_prefix("yt:video:") {
        return id.to_string();
    }
    if let Some((_, id)) = link.split_once("v=") {
        return id.to_string();
    }
    entry_id.to_string()
}

/// Shorten a description to at most [`MAX_DESCRIPTION_LENGTH`] characters.
///
/// Whitespace is collapsed first; when the text is too long it is cut at a
/// word boundary and terminated with an ellipsis, placeholder length counted
/// against the limit.
pub fn shorten_description(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= MAX_DESCRIPTION_LENGTH {
        return collapsed;
    }

    let budget = MAX_DESCRIPTION_LENGTH - DESCRIPTION_PLACEHOLDER.chars().count();
    let mut result = String::new();
    let mut len = 0;
    for word in collapsed.split(' ') {
        let word_len = word.chars().count();
        let sep = usize::from(!result.is_empty());
        if len + sep + word_len > budget {
            break;
        }
        if sep == 1 {
            result.push(' ');
        }
        result.push_str(word);
        len += sep + word_len;
    }
    if result.is_empty() {
        // A single overlong token (often a URL); keep a broken prefix
        // rather than dropping all content.
        result = collapsed.chars().take(budget).collect();
    }
    result.push_str(DESCRIPTION_PLACEHOLDER);
    result
}
