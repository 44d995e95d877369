//! Per-channel cursor persistence for tubewatch.
//!
//! The state file is the only durable data the monitor keeps: a JSON map of
//! channel id to the id of the most recently observed video. It is what
//! prevents re-notification across runs.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Result, TubewatchError};

/// Cursor for one channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelState {
    /// Id of the most recently observed video. `None` means the channel has
    /// never been checked.
    pub last_video_id: Option<String>,
}

/// All channel cursors, keyed by channel id.
pub type ChannelStates = HashMap<String, ChannelState>;

/// JSON-file-backed store for channel cursors.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    /// Create a store backed by the given file path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all cursors.
    ///
    /// A missing file is not an error and yields an empty map. A file that
    /// exists but does not parse is fatal: silently resetting it would
    /// re-notify every channel's visible backlog.
    pub fn load(&self) -> Result<ChannelStates> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(ChannelStates::new());
            }
            Err(e) => return Err(TubewatchError::Io(e)),
        };

        serde_json::from_str(&content)
            .map_err(|e| TubewatchError::StateCorrupt(format!("{}: {e}", self.path.display())))
    }

    /// Persist all cursors, replacing the previous contents.
    ///
    /// Writes to a sibling temp file and renames it into place so a crash
    /// mid-write never leaves a truncated file behind.
    pub fn save(&self, states: &ChannelStates) -> Result<()> {
        let json = serde_json::to_string_pretty(states)
            .map_err(|e| TubewatchError::Io(std::io::Error::other(e)))?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
