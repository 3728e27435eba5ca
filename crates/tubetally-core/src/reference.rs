//! Playlist reference extraction.
//!
//! A [`PlaylistReference`] is the opaque playlist identifier pulled out of a
//! `YouTube` URL. Only the URL shapes below are recognised; anything else yields
//! no reference:
//!
//! - `https://www.youtube.com/playlist?list=PLxxxxxxxx`
//! - `https://www.youtube.com/watch?v=xxxxx&list=PLxxxxxxxx`
//! - `https://youtu.be/xxxxx&list=PLxxxxxxxx` (and `?list=`)
//!
//! The identifier runs up to the next `&` or whitespace.
//!
//! ```rust
//! use tubetally_core::reference::extract_reference;
//!
//! let reference = extract_reference("https://www.youtube.com/watch?v=abc&list=XYZ123");
//! assert_eq!(reference.map(|r| r.to_string()), Some("XYZ123".to_string()));
//! assert!(extract_reference("https://example.com/notaplaylist").is_none());
//! ```

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[allow(clippy::expect_used)]
static PLAYLIST_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:youtube\.com/playlist\?list=|youtube\.com/watch\?v=.+&list=|youtu\.be/.+[?&]list=)([^&\s]+)",
    )
    .expect("playlist URL pattern is valid")
});

/// Identifier of a remote playlist, immutable once derived.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaylistReference(String);

impl PlaylistReference {
    /// The raw playlist identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Canonical playlist page URL for this reference.
    #[must_use]
    pub fn normalized_url(&self) -> String {
        format!("https://www.youtube.com/playlist?list={}", self.0)
    }

    /// Player URL that embeds the whole playlist.
    #[must_use]
    pub fn embed_url(&self) -> String {
        format!("https://www.youtube.com/embed/videoseries?list={}", self.0)
    }
}

impl std::fmt::Display for PlaylistReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PlaylistReference {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Shape of a `YouTube` URL, used to explain why extraction failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum YouTubeUrlType {
    /// `youtube.com/playlist?list=...`
    Playlist,
    /// `youtube.com/watch?v=...&list=...`
    WatchWithPlaylist,
    /// `youtu.be/...`
    ShortUrl,
    /// `youtube.com/watch?v=...` without a playlist.
    SingleVideo,
    /// Not a recognised `YouTube` URL.
    #[default]
    Invalid,
}

/// Extract the playlist reference from a URL, if any pattern matches.
#[must_use]
pub fn extract_reference(url: &str) -> Option<PlaylistReference> {
    PLAYLIST_URL_RE
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| PlaylistReference(m.as_str().to_string()))
}

/// Extract the playlist reference, failing with [`Error::InvalidReference`].
///
/// The error reason is tailored to the detected URL shape so a caller can tell
/// a single-video link apart from a non-`YouTube` URL.
pub fn parse_reference(url: &str) -> Result<PlaylistReference> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(Error::invalid_reference(url, "URL cannot be empty"));
    }

    if let Some(reference) = extract_reference(trimmed) {
        return Ok(reference);
    }

    let reason = match classify_url(trimmed) {
        YouTubeUrlType::SingleVideo => "URL is a single video, not a playlist",
        YouTubeUrlType::ShortUrl => "Short URL does not contain a playlist",
        YouTubeUrlType::Playlist | YouTubeUrlType::WatchWithPlaylist => {
            "URL does not contain a valid playlist ID"
        }
        YouTubeUrlType::Invalid => "URL is not a recognised YouTube playlist URL",
    };
    Err(Error::invalid_reference(url, reason))
}

/// Detect the shape of a `YouTube` URL.
#[must_use]
pub fn classify_url(url: &str) -> YouTubeUrlType {
    let url_lower = url.to_lowercase();

    if url_lower.contains("youtu.be/") {
        if url_lower.contains("list=") {
            YouTubeUrlType::WatchWithPlaylist
        } else {
            YouTubeUrlType::ShortUrl
        }
    } else if !url_lower.contains("youtube.com") {
        YouTubeUrlType::Invalid
    } else if url_lower.contains("/playlist") {
        YouTubeUrlType::Playlist
    } else if url_lower.contains("/watch") {
        if url_lower.contains("list=") {
            YouTubeUrlType::WatchWithPlaylist
        } else {
            YouTubeUrlType::SingleVideo
        }
    } else {
        YouTubeUrlType::Invalid
    }
}
