//! Remote Data Gateway: paginated retrieval and joining of playlist data.
//!
//! [`PlaylistSource`] is the seam between the pipeline and the network. The
//! HTTP implementation lives in [`crate::client`]; tests substitute mocks.
//!
//! The pipeline fetches pages strictly in sequence because each continuation
//! token comes from the previous response. For every page it issues one batched
//! details request, joins by video ID and appends the joined records.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::playlist::PlaylistAggregate;
use crate::reference::PlaylistReference;
use crate::stats::MissingDetailsPolicy;
use crate::video::{PlaylistItem, PlaylistPage, VideoDetails, VideoRecord};

/// Maximum items per playlist page and IDs per details request.
pub const MAX_PAGE_SIZE: usize = 50;

/// Default cap on the number of pages fetched for one playlist.
pub const DEFAULT_MAX_PAGES: usize = 200;

/// Source of playlist pages and video details.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlaylistSource: Send + Sync {
    /// Fetch up to [`MAX_PAGE_SIZE`] items starting at `page_token`.
    async fn fetch_playlist_page(
        &self,
        playlist_id: &str,
        page_token: Option<String>,
    ) -> Result<PlaylistPage>;

    /// Fetch details for a batch of video IDs.
    ///
    /// Videos unknown upstream are absent from the map.
    async fn fetch_video_details(&self, video_ids: &[String])
    -> Result<HashMap<String, VideoDetails>>;

    /// Fetch the playlist's own title, if the upstream has one.
    async fn fetch_playlist_title(&self, playlist_id: &str) -> Result<Option<String>>;
}

/// Knobs for [`fetch_playlist`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    /// Fail with [`Error::PaginationExceeded`] past this many pages.
    pub max_pages: usize,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

/// The joined result of a complete fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedPlaylist {
    /// Resolved or synthesized title.
    pub title: String,
    /// Joined records in playlist order.
    pub videos: Vec<VideoRecord>,
    /// Number of pages fetched.
    pub pages: usize,
}

/// Title used when the upstream has none for the playlist.
#[must_use]
pub fn fallback_title(first_item: Option<&PlaylistItem>) -> String {
    let channel = first_item
        .and_then(|item| item.channel_title.as_deref())
        .filter(|c| !c.trim().is_empty())
        .unwrap_or("YouTube");
    format!("{channel}'s Playlist")
}

/// Resolve the playlist title, falling back instead of failing.
pub async fn resolve_playlist_title<S: PlaylistSource + ?Sized>(
    source: &S,
    playlist_id: &str,
    first_item: Option<&PlaylistItem>,
) -> String {
    match source.fetch_playlist_title(playlist_id).await {
        Ok(Some(title)) if !title.trim().is_empty() => title,
        Ok(_) => {
            warn!("No title returned for playlist {}, using fallback", playlist_id);
            fallback_title(first_item)
        }
        Err(e) => {
            warn!("Failed to fetch title for playlist {}: {}", playlist_id, e);
            fallback_title(first_item)
        }
    }
}

/// Join items with their details, keeping items that have none.
#[must_use]
pub fn join_page(
    items: Vec<PlaylistItem>,
    details: &HashMap<String, VideoDetails>,
) -> Vec<VideoRecord> {
    items
        .into_iter()
        .map(|item| {
            let found = details.get(&item.video_id);
            if found.is_none() {
                debug!("No details for video {}, using placeholder", item.video_id);
            }
            VideoRecord::from_item(item, found)
        })
        .collect()
}

/// Fetch every page of a playlist and join duration details.
///
/// The title is resolved once, after the first non-empty page. `cancel` is
/// checked before every page and before every details request.
pub async fn fetch_playlist<S: PlaylistSource + ?Sized>(
    source: &S,
    reference: &PlaylistReference,
    options: FetchOptions,
    cancel: &CancellationToken,
) -> Result<FetchedPlaylist> {
    let playlist_id = reference.as_str();
    let mut videos: Vec<VideoRecord> = Vec::new();
    let mut title: Option<String> = None;
    let mut page_token: Option<String> = None;
    let mut pages = 0usize;

    loop {
        if cancel.is_cancelled() {
            info!("Fetch of playlist {} cancelled after {} pages", playlist_id, pages);
            return Err(Error::Cancelled);
        }
        if pages >= options.max_pages {
            return Err(Error::PaginationExceeded {
                max_pages: options.max_pages,
            });
        }

        let page = source
            .fetch_playlist_page(playlist_id, page_token.take())
            .await?;
        pages += 1;
        debug!(
            "Fetched page {} of playlist {} ({} items)",
            pages,
            playlist_id,
            page.items.len()
        );

        if title.is_none() && !page.items.is_empty() {
            title = Some(resolve_playlist_title(source, playlist_id, page.items.first()).await);
        }

        let mut details = HashMap::new();
        let ids: Vec<String> = page.items.iter().map(|i| i.video_id.clone()).collect();
        for batch in ids.chunks(MAX_PAGE_SIZE) {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            details.extend(source.fetch_video_details(batch).await?);
        }

        videos.extend(join_page(page.items, &details));

        match page.next_page_token {
            Some(token) if !token.is_empty() => page_token = Some(token),
            _ => break,
        }
    }

    videos.sort_by_key(|v| v.position);
    info!(
        "Fetched {} videos from playlist {} in {} pages",
        videos.len(),
        playlist_id,
        pages
    );

    Ok(FetchedPlaylist {
        title: title.unwrap_or_else(|| fallback_title(None)),
        videos,
        pages,
    })
}

/// Fetch a playlist and fold it into an aggregate.
///
/// A playlist with no videos is reported as [`Error::EmptyResult`].
pub async fn fetch_aggregate<S: PlaylistSource + ?Sized>(
    source: &S,
    reference: &PlaylistReference,
    options: FetchOptions,
    policy: MissingDetailsPolicy,
    cancel: &CancellationToken,
) -> Result<PlaylistAggregate> {
    let fetched = fetch_playlist(source, reference, options, cancel).await?;
    if fetched.videos.is_empty() {
        return Err(Error::EmptyResult {
            playlist_id: reference.to_string(),
        });
    }
    Ok(PlaylistAggregate::new(
        reference.clone(),
        fetched.title,
        fetched.videos,
        policy,
    ))
}
