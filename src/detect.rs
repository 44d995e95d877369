//! New-video detection against a channel's stored cursor.

use crate::feed::Video;

/// Outcome of diffing a fetched video list against a channel's cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    /// Videos newer than the cursor, newest first.
    pub new_videos: Vec<Video>,
    /// Id the channel's cursor should advance to.
    pub next_cursor: String,
}

/// Diff a freshly fetched video list against the stored cursor.
///
/// `videos` must be ordered newest first, as the feed serves them. Returns
/// `None` when the list is empty; the cursor is left untouched in that case.
///
/// With no prior cursor (first contact with the channel) only the single
/// newest video is surfaced, so a newly added channel announces one video
/// instead of its whole visible backlog. With a cursor, videos are collected
/// newest-to-oldest until the cursor id is reached; a cursor that has rotated
/// out of the feed window marks everything as new.
pub fn detect_new(videos: &[Video], cursor: Option<&str>) -> Option<Detection> {
    let newest = videos.first()?;

    let new_videos = match cursor {
        None => vec![newest.clone()],
        Some(cursor) => videos
            .iter()
            .take_while(|v| v.id != cursor)
            .cloned()
            .collect(),
    };

    Some(Detection {
        new_videos,
        next_cursor: newest.id.clone(),
    })
}
