//! Per-video records and the raw pieces they are joined from.

use serde::{Deserialize, Serialize};

use crate::duration::{DurationParts, Precision, ZERO_DURATION_TOKEN, format_human_duration};

/// One entry of a playlist page, before duration details are joined in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistItem {
    /// Stable video identifier.
    pub video_id: String,
    /// Video title as listed in the playlist.
    pub title: String,
    /// Zero-based position within the playlist.
    pub position: u32,
    /// Channel that owns the video, if reported.
    pub channel_title: Option<String>,
    /// Channel ID that owns the video, if reported.
    pub channel_id: Option<String>,
    /// When the item was added to the playlist.
    pub published_at: Option<String>,
}

/// A page of playlist items plus the continuation token, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaylistPage {
    /// Items in playlist order.
    pub items: Vec<PlaylistItem>,
    /// Opaque token for the next page; `None` on the final page.
    pub next_page_token: Option<String>,
}

/// Content details fetched for a single video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoDetails {
    /// Raw ISO-8601 duration token.
    pub raw_duration: String,
    /// View count, when statistics were returned.
    pub view_count: Option<u64>,
}

/// A normalized playlist entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
    /// Stable video identifier.
    pub id: String,
    /// Video title; arbitrary Unicode.
    pub title: String,
    /// Zero-based position within the playlist.
    pub position: u32,
    /// Raw duration token (`PT0S` when details were missing).
    pub raw_duration: String,
    /// Duration in whole seconds.
    pub duration_secs: u64,
    /// Duration in fractional minutes.
    pub duration_minutes: f64,
    /// Clock-style duration, e.g. `1:02:03`.
    pub duration_text: String,
    /// Canonical watch URL.
    pub url: String,
    /// Shortened `youtu.be` URL.
    pub short_url: String,
    /// Owning channel, if known.
    pub channel_title: Option<String>,
    /// View count, if known.
    pub view_count: Option<u64>,
    /// True when the details endpoint returned nothing for this video.
    #[serde(default)]
    pub details_missing: bool,
}

impl VideoRecord {
    /// Join a playlist item with its details.
    ///
    /// Missing details produce a zero-duration placeholder so the playlist stays
    /// complete.
    #[must_use]
    pub fn from_item(item: PlaylistItem, details: Option<&VideoDetails>) -> Self {
        let raw_duration =
            details.map_or_else(|| ZERO_DURATION_TOKEN.to_string(), |d| d.raw_duration.clone());
        let parts = DurationParts::parse(&raw_duration).unwrap_or_default();
        let duration_minutes = parts.total_minutes();

        Self {
            url: watch_url(&item.video_id),
            short_url: short_url(&item.video_id),
            id: item.video_id,
            title: item.title,
            position: item.position,
            duration_secs: parts.total_seconds(),
            duration_text: format_human_duration(duration_minutes, Precision::Clock),
            duration_minutes,
            raw_duration,
            channel_title: item.channel_title,
            view_count: details.and_then(|d| d.view_count),
            details_missing: details.is_none(),
        }
    }

    /// One-based position for display.
    #[must_use]
    pub const fn ordinal(&self) -> u32 {
        self.position + 1
    }
}

/// Canonical watch URL for a video.
#[must_use]
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}

/// Shortened URL for a video.
#[must_use]
pub fn short_url(video_id: &str) -> String {
    format!("https://youtu.be/{video_id}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn item(id: &str, position: u32) -> PlaylistItem {
        PlaylistItem {
            video_id: id.to_string(),
            title: format!("Video {id}"),
            position,
            channel_title: Some("Channel".to_string()),
            channel_id: None,
            published_at: None,
        }
    }

    #[test]
    fn test_from_item_with_details() {
        let details = VideoDetails {
            raw_duration: "PT2M30S".to_string(),
            view_count: Some(42),
        };
        let record = VideoRecord::from_item(item("abc", 3), Some(&details));

        assert_eq!(record.id, "abc");
        assert_eq!(record.duration_secs, 150);
        assert_eq!(record.duration_minutes, 2.5);
        assert_eq!(record.duration_text, "2:30");
        assert_eq!(record.url, "https://www.youtube.com/watch?v=abc");
        assert_eq!(record.short_url, "https://youtu.be/abc");
        assert_eq!(record.view_count, Some(42));
        assert_eq!(record.ordinal(), 4);
        assert!(!record.details_missing);
    }

    #[test]
    fn test_from_item_without_details_is_placeholder() {
        let record = VideoRecord::from_item(item("gone", 0), None);

        assert_eq!(record.raw_duration, "PT0S");
        assert_eq!(record.duration_minutes, 0.0);
        assert_eq!(record.duration_text, "0:00");
        assert!(record.view_count.is_none());
        assert!(record.details_missing);
    }

    #[test]
    fn test_from_item_with_malformed_duration() {
        let details = VideoDetails {
            raw_duration: "nonsense".to_string(),
            view_count: None,
        };
        let record = VideoRecord::from_item(item("odd", 1), Some(&details));

        assert_eq!(record.raw_duration, "nonsense");
        assert_eq!(record.duration_secs, 0);
        assert!(!record.details_missing);
    }

    #[test]
    fn test_unicode_title_preserved() {
        let mut source = item("u", 0);
        source.title = "Ünïcødé 日本語 🎵".to_string();
        let record = VideoRecord::from_item(source, None);
        assert_eq!(record.title, "Ünïcødé 日本語 🎵");
    }
}
