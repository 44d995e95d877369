//! Monitor pass: fetch, detect, notify, persist.
//!
//! One pass walks every configured channel in randomized order, strictly
//! sequentially. Per channel: fetch the feed, diff it against the stored
//! cursor, notify for the newest new video (Shorts are absorbed silently),
//! persist the advanced cursor, then pause for a randomized delay before the
//! next channel so neither the feed host nor the webhook sees bursts.
//!
//! Fetch and send failures are isolated to their channel; a cursor that
//! cannot be persisted aborts the pass, since losing it would duplicate
//! notifications on the next run.

use std::ops::RangeInclusive;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tokio::time::{sleep, Duration};
use tracing::{debug, info, warn};

use crate::config::{ChannelConfig, MonitorConfig};
use crate::detect::detect_new;
use crate::feed::FeedSource;
use crate::notify::{Notification, Notifier};
use crate::state::StateStore;
use crate::Result;

/// Counters for one completed pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassSummary {
    /// Channels whose feed was fetched successfully.
    pub channels_checked: usize,
    /// Notifications delivered.
    pub notifications_sent: usize,
    /// Channels skipped because the fetch failed.
    pub fetch_failures: usize,
    /// Notifications that failed to deliver.
    pub send_failures: usize,
}

/// Drives one pass over the configured channels.
pub struct Monitor<S, N, R = StdRng> {
    source: S,
    notifier: N,
    store: StateStore,
    rng: R,
    delay_secs: RangeInclusive<u64>,
}

impl<S: FeedSource, N: Notifier> Monitor<S, N> {
    /// Create a monitor with OS-seeded randomness.
    pub fn new(source: S, notifier: N, store: StateStore, config: &MonitorConfig) -> Self {
        Self::with_rng(source, notifier, store, config, StdRng::from_os_rng())
    }
}

impl<S: FeedSource, N: Notifier, R: Rng> Monitor<S, N, R> {
    /// Create a monitor with an explicit randomness source.
    ///
    /// Channel ordering and pacing delays are driven by `rng`; tests pass a
    /// seeded generator for deterministic runs.
    pub fn with_rng(
        source: S,
        notifier: N,
        store: StateStore,
        config: &MonitorConfig,
        rng: R,
    ) -> Self {
        Self {
            source,
            notifier,
            store,
            rng,
            delay_secs: config.delay_min_secs..=config.delay_max_secs,
        }
    }

    /// Run one pass over `channels`.
    ///
    /// Per-channel failures are logged and skipped; state-store errors abort
    /// the pass.
    pub async fn run_pass(&mut self, channels: &[ChannelConfig]) -> Result<PassSummary> {
        let mut states = self.store.load()?;
        let mut summary = PassSummary::default();

        let mut order: Vec<&ChannelConfig> = channels.iter().collect();
        order.shuffle(&mut self.rng);

        for channel in order {
            if channel.id.is_empty() {
                info!("skipping channel without id: {}", channel.name);
                continue;
            }

            info!("checking channel: {} ({})", channel.name, channel.id);

            let videos = match self.source.fetch(channel).await {
                Ok(videos) => videos,
                Err(e) => {
                    warn!("fetch failed for {} ({}): {e}", channel.name, channel.id);
                    summary.fetch_failures += 1;
                    continue;
                }
            };
            summary.channels_checked += 1;

            let cursor = states
                .get(&channel.id)
                .and_then(|s| s.last_video_id.as_deref());

            let Some(detection) = detect_new(&videos, cursor) else {
                debug!("no entries found for {}", channel.name);
                continue;
            };

            if cursor.is_none() {
                info!(
                    "initialized cursor for {} at video: {}",
                    channel.name, videos[0].title
                );
            }

            let Some(newest) = detection.new_videos.first() else {
                debug!("no new videos for {}", channel.name);
                continue;
            };

            // Only the newest new video is ever announced; anything older is
            // absorbed by the cursor jump below.
            if newest.is_short() {
                info!("absorbing short without notification: {}", newest.title);
            } else {
                match self.notifier.notify(&Notification::for_video(newest)).await {
                    Ok(()) => {
                        info!("sent notification for: {}", newest.title);
                        summary.notifications_sent += 1;
                    }
                    Err(e) => {
                        // Logged, not retried; the cursor advances regardless.
                        warn!("send failed for {}: {e}", newest.title);
                        summary.send_failures += 1;
                    }
                }
            }

            states.entry(channel.id.clone()).or_default().last_video_id =
                Some(detection.next_cursor.clone());
            self.store.save(&states)?;

            let delay = self.rng.random_range(self.delay_secs.clone());
            if delay > 0 {
                debug!("pacing delay: {delay}s");
                sleep(Duration::from_secs(delay)).await;
            }
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::Video;
    use crate::state::ChannelState;
    use crate::TubewatchError;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    struct StubSource {
        feeds: HashMap<String, Vec<Video>>,
        fail: Vec<String>,
    }

    impl FeedSource for StubSource {
        async fn fetch(&self, channel: &ChannelConfig) -> Result<Vec<Video>> {
            if self.fail.contains(&channel.id) {
                return Err(TubewatchError::Fetch("stub failure".to_string()));
            }
            Ok(self.feeds.get(&channel.id).cloned().unwrap_or_default())
        }
    }

    #[derive(Clone)]
    struct RecordingNotifier {
        sent: Arc<Mutex<Vec<Notification>>>,
        fail: bool,
    }

    impl RecordingNotifier {
        fn new() -> Self {
            Self {
                sent: Arc::new(Mutex::new(Vec::new())),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                sent: Arc::new(Mutex::new(Vec::new())),
                fail: true,
            }
        }

        fn sent_titles(&self) -> Vec<String> {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .map(|n| n.embeds[0].title.clone())
                .collect()
        }
    }

    impl Notifier for RecordingNotifier {
        async fn notify(&self, message: &Notification) -> Result<()> {
            if self.fail {
                return Err(TubewatchError::Send("stub failure".to_string()));
            }
            self.sent.lock().unwrap().push(message.clone());
            Ok(())
        }
    }

    fn video(id: &str, link: &str) -> Video {
        Video {
            id: id.to_string(),
            title: format!("Video {id}"),
            link: link.to_string(),
            ..Video::default()
        }
    }

    fn watch_video(id: &str) -> Video {
        video(id, &format!("https://www.youtube.com/watch?v={id}"))
    }

    fn channel(id: &str, name: &str) -> ChannelConfig {
        ChannelConfig {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    fn test_config() -> MonitorConfig {
        MonitorConfig {
            delay_min_secs: 0,
            delay_max_secs: 0,
            ..MonitorConfig::default()
        }
    }

    fn monitor_with(
        feeds: HashMap<String, Vec<Video>>,
        fail: Vec<String>,
        notifier: RecordingNotifier,
        store: StateStore,
    ) -> Monitor<StubSource, RecordingNotifier, StdRng> {
        Monitor::with_rng(
            StubSource { feeds, fail },
            notifier,
            store,
            &test_config(),
            StdRng::seed_from_u64(7),
        )
    }

    #[tokio::test]
    async fn test_short_is_absorbed_without_notification() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path().join("state.json"));

        let mut states = crate::state::ChannelStates::new();
        states.insert(
            "UCa".to_string(),
            ChannelState {
                last_video_id: Some("v1".to_string()),
            },
        );
        store.save(&states).unwrap();

        let feeds = HashMap::from([(
            "UCa".to_string(),
            vec![
                video("v2", "https://www.youtube.com/shorts/v2"),
                watch_video("v1"),
            ],
        )]);

        let notifier = RecordingNotifier::new();
        let mut monitor = monitor_with(feeds, vec![], notifier.clone(), store.clone());
        let summary = monitor.run_pass(&[channel("UCa", "A")]).await.unwrap();

        assert_eq!(summary.notifications_sent, 0);
        assert!(notifier.sent_titles().is_empty());
        // Cursor advanced past the short anyway.
        let states = store.load().unwrap();
        assert_eq!(states["UCa"].last_video_id.as_deref(), Some("v2"));
    }

    #[tokio::test]
    async fn test_send_failure_still_advances_cursor() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path().join("state.json"));

        let mut states = crate::state::ChannelStates::new();
        states.insert(
            "UCa".to_string(),
            ChannelState {
                last_video_id: Some("v1".to_string()),
            },
        );
        store.save(&states).unwrap();

        let feeds = HashMap::from([(
            "UCa".to_string(),
            vec![watch_video("v2"), watch_video("v1")],
        )]);

        let mut monitor = monitor_with(feeds, vec![], RecordingNotifier::failing(), store.clone());
        let summary = monitor.run_pass(&[channel("UCa", "A")]).await.unwrap();

        assert_eq!(summary.notifications_sent, 0);
        assert_eq!(summary.send_failures, 1);
        let states = store.load().unwrap();
        assert_eq!(states["UCa"].last_video_id.as_deref(), Some("v2"));
    }

    #[tokio::test]
    async fn test_channel_without_id_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path().join("state.json"));

        let notifier = RecordingNotifier::new();
        let mut monitor = monitor_with(HashMap::new(), vec![], notifier.clone(), store.clone());
        let summary = monitor.run_pass(&[channel("", "Nameless")]).await.unwrap();

        assert_eq!(summary, PassSummary::default());
        assert!(store.load().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unchanged_channel_writes_no_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path().join("state.json"));

        let mut states = crate::state::ChannelStates::new();
        states.insert(
            "UCa".to_string(),
            ChannelState {
                last_video_id: Some("v1".to_string()),
            },
        );
        store.save(&states).unwrap();
        let before = std::fs::metadata(store.path()).unwrap().modified().unwrap();

        let feeds = HashMap::from([("UCa".to_string(), vec![watch_video("v1")])]);
        let notifier = RecordingNotifier::new();
        let mut monitor = monitor_with(feeds, vec![], notifier.clone(), store.clone());
        let summary = monitor.run_pass(&[channel("UCa", "A")]).await.unwrap();

        assert_eq!(summary.notifications_sent, 0);
        assert!(notifier.sent_titles().is_empty());
        let after = std::fs::metadata(store.path()).unwrap().modified().unwrap();
        assert_eq!(before, after);
    }
}
