//! Text formatting of playlist entries.
//!
//! Lines compose enabled fields in a fixed order: ordinal, title, duration,
//! channel, link. A disabled or unknown field contributes no separator.

use serde::{Deserialize, Serialize};

use crate::duration::plural;
use crate::playlist::PlaylistAggregate;
use crate::stats::PlaylistStats;
use crate::video::VideoRecord;

const fn default_true() -> bool {
    true
}

/// Which fields a formatted line includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatOptions {
    /// Prefix each line with `N. `.
    #[serde(default = "default_true")]
    pub include_numbers: bool,
    /// Append ` [M:SS]`.
    #[serde(default = "default_true")]
    pub include_duration: bool,
    /// Append ` (URL)`.
    #[serde(default = "default_true")]
    pub include_links: bool,
    /// Use `youtu.be` links instead of watch URLs.
    #[serde(default = "default_true")]
    pub short_links: bool,
    /// Append ` - Channel`.
    #[serde(default)]
    pub include_channels: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            include_numbers: true,
            include_duration: true,
            include_links: true,
            short_links: true,
            include_channels: false,
        }
    }
}

/// Format one video as a line (without a trailing newline).
///
/// `index` is the zero-based display index; the printed ordinal is `index + 1`.
///
/// ```rust
/// use tubetally_core::format::{FormatOptions, format_output_line};
/// use tubetally_core::video::{PlaylistItem, VideoDetails, VideoRecord};
///
/// let record = VideoRecord::from_item(
///     PlaylistItem {
///         video_id: "abc".into(),
///         title: "Intro".into(),
///         position: 0,
///         channel_title: None,
///         channel_id: None,
///         published_at: None,
///     },
///     Some(&VideoDetails { raw_duration: "PT1M30S".into(), view_count: None }),
/// );
/// let options = FormatOptions {
///     include_numbers: false,
///     include_links: false,
///     ..FormatOptions::default()
/// };
/// assert_eq!(format_output_line(&record, &options, 0), "Intro [1:30]");
/// ```
#[must_use]
pub fn format_output_line(record: &VideoRecord, options: &FormatOptions, index: usize) -> String {
    let mut line = String::new();

    if options.include_numbers {
        line.push_str(&format!("{}. ", index + 1));
    }

    line.push_str(&record.title);

    if options.include_duration {
        line.push_str(&format!(" [{}]", record.duration_text));
    }

    if options.include_channels
        && let Some(channel) = record.channel_title.as_deref().filter(|c| !c.is_empty())
    {
        line.push_str(&format!(" - {channel}"));
    }

    if options.include_links {
        let url = if options.short_links {
            &record.short_url
        } else {
            &record.url
        };
        line.push_str(&format!(" ({url})"));
    }

    line
}

/// Format every video, one line each, each terminated by `\n`.
#[must_use]
pub fn format_playlist(aggregate: &PlaylistAggregate, options: &FormatOptions) -> String {
    aggregate
        .videos
        .iter()
        .enumerate()
        .map(|(index, video)| format_output_line(video, options, index) + "\n")
        .collect()
}

/// One-sentence summary of the playlist length.
///
/// e.g. `Total playlist duration: 1 hour, 2 minutes, and 3 seconds (4 videos)`.
#[must_use]
pub fn format_summary_header(stats: &PlaylistStats) -> String {
    let total_secs = (stats.total_minutes * 60.0).round().max(0.0) as u64;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    let videos = plural(stats.count as u64, "video");

    let length = if hours > 0 {
        format!(
            "{}, {}, and {}",
            plural(hours, "hour"),
            plural(minutes, "minute"),
            plural(seconds, "second")
        )
    } else if minutes > 0 {
        format!(
            "{} and {}",
            plural(minutes, "minute"),
            plural(seconds, "second")
        )
    } else {
        plural(seconds, "second")
    };

    format!("Total playlist duration: {length} ({videos})")
}
