//! Webhook notification for new videos.
//!
//! Messages are shaped as Discord embeds: one embed per notification with
//! the video title, link, shortened description, thumbnail and author block.

use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use crate::config::MonitorConfig;
use crate::feed::Video;
use crate::{Result, TubewatchError};

/// Embed accent color (red, matching the YouTube brand).
const EMBED_COLOR: u32 = 16711680;

/// Embed image block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedImage {
    /// Image URL; may be empty when the video has no thumbnail.
    pub url: String,
}

/// Embed author block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedAuthor {
    /// Uploader name.
    pub name: String,
    /// Uploader channel URL.
    pub url: String,
}

/// A single embed describing one new video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Embed {
    /// Video title.
    pub title: String,
    /// Canonical watch link.
    pub url: String,
    /// Shortened description.
    pub description: String,
    /// Accent color.
    pub color: u32,
    /// Publication time, RFC 3339.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Thumbnail image.
    pub image: EmbedImage,
    /// Author block.
    pub author: EmbedAuthor,
}

/// Webhook payload: a list with exactly one embed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Embeds carried by the message.
    pub embeds: Vec<Embed>,
}

impl Notification {
    /// Build the notification for a new video.
    pub fn for_video(video: &Video) -> Self {
        Self {
            embeds: vec![Embed {
                title: video.title.clone(),
                url: video.link.clone(),
                description: video.description.clone(),
                color: EMBED_COLOR,
                timestamp: video.published.map(|t| t.to_rfc3339()),
                image: EmbedImage {
                    url: video.thumbnail.clone(),
                },
                author: EmbedAuthor {
                    name: video.author.clone(),
                    url: video.author_url.clone(),
                },
            }],
        }
    }
}

/// Delivery target for notifications.
///
/// The production implementation is [`DiscordNotifier`]; tests substitute a
/// recording implementation.
pub trait Notifier {
    /// Deliver one notification.
    fn notify(
        &self,
        message: &Notification,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Notifier that posts to a Discord webhook URL.
pub struct DiscordNotifier {
    client: Client,
    webhook_url: String,
}

impl DiscordNotifier {
    /// Create a notifier with timeouts from the monitor configuration.
    pub fn new(webhook_url: impl Into<String>, config: &MonitorConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .read_timeout(Duration::from_secs(config.read_timeout_secs))
            .timeout(Duration::from_secs(config.total_timeout_secs))
            .build()
            .map_err(|e| TubewatchError::Send(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            webhook_url: webhook_url.into(),
        })
    }
}

impl Notifier for DiscordNotifier {
    async fn notify(&self, message: &Notification) -> Result<()> {
        let response = self
            .client
            .post(&self.webhook_url)
            .json(message)
            .send()
            .await
            .map_err(|e| TubewatchError::Send(format!("failed to post webhook: {e}")))?;

        if !response.status().is_success() {
            return Err(TubewatchError::Send(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        Ok(())
    }
}
