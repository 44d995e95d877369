//! tubewatch - YouTube channel monitor
//!
//! Polls the public Atom feed of each configured YouTube channel, detects
//! videos uploaded since the last run, and posts a Discord-webhook embed for
//! the newest one per channel. A JSON state file of per-channel cursors keeps
//! re-runs from re-notifying.

pub mod config;
pub mod detect;
pub mod error;
pub mod feed;
pub mod logging;
pub mod monitor;
pub mod notify;
pub mod state;

pub use config::{ChannelConfig, Config, LoggingConfig, MonitorConfig};
pub use detect::{detect_new, Detection};
pub use error::{Result, TubewatchError};
pub use feed::{FeedSource, Video, YoutubeFeedSource, MAX_DESCRIPTION_LENGTH};
pub use monitor::{Monitor, PassSummary};
pub use notify::{DiscordNotifier, Notification, Notifier};
pub use state::{ChannelState, ChannelStates, StateStore};
