//! Playlist-level aggregate and the single-slot "current playlist" holder.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::reference::PlaylistReference;
use crate::stats::{
    MissingDetailsPolicy, PlaybackSpeed, PlaylistStats, SpeedAdjustedStats, aggregate_with_policy,
};
use crate::video::VideoRecord;

/// A fully fetched playlist with its derived statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistAggregate {
    /// The playlist this was built from.
    pub reference: PlaylistReference,
    /// Resolved or synthesized playlist title.
    pub title: String,
    /// Videos ordered by playlist position.
    pub videos: Vec<VideoRecord>,
    /// Statistics over `videos`.
    pub stats: PlaylistStats,
    /// Policy used to compute `stats`.
    #[serde(default)]
    pub policy: MissingDetailsPolicy,
    /// Speed used for projections; never applied to `stats`.
    #[serde(default)]
    pub speed: PlaybackSpeed,
}

impl PlaylistAggregate {
    /// Build an aggregate, ordering videos by position and computing stats.
    #[must_use]
    pub fn new(
        reference: PlaylistReference,
        title: String,
        mut videos: Vec<VideoRecord>,
        policy: MissingDetailsPolicy,
    ) -> Self {
        videos.sort_by_key(|v| v.position);
        let stats = aggregate_with_policy(&videos, policy);
        Self {
            reference,
            title,
            videos,
            stats,
            policy,
            speed: PlaybackSpeed::NORMAL,
        }
    }

    /// Set the projection speed.
    #[must_use]
    pub const fn with_speed(mut self, speed: PlaybackSpeed) -> Self {
        self.speed = speed;
        self
    }

    /// Statistics projected at the aggregate's speed.
    #[must_use]
    pub fn projected(&self) -> SpeedAdjustedStats {
        self.stats.at_speed(self.speed)
    }

    /// Recompute statistics from the videos.
    ///
    /// Always equal to `stats` for an aggregate built through [`Self::new`].
    #[must_use]
    pub fn recomputed_stats(&self) -> PlaylistStats {
        aggregate_with_policy(&self.videos, self.policy)
    }
}

/// Holder for the most recent successful result.
///
/// A new result replaces the previous one wholesale; there is no merging.
#[derive(Debug, Default)]
pub struct CurrentPlaylistState {
    current: Option<PlaylistAggregate>,
}

impl CurrentPlaylistState {
    /// Create an empty holder.
    #[must_use]
    pub const fn new() -> Self {
        Self { current: None }
    }

    /// Replace the held playlist, returning the previous one.
    pub fn replace(&mut self, aggregate: PlaylistAggregate) -> Option<PlaylistAggregate> {
        debug!(
            "Current playlist set to {} ({} videos)",
            aggregate.reference,
            aggregate.videos.len()
        );
        self.current.replace(aggregate)
    }

    /// The held playlist, if any.
    #[must_use]
    pub const fn current(&self) -> Option<&PlaylistAggregate> {
        self.current.as_ref()
    }

    /// Drop the held playlist.
    pub fn clear(&mut self) {
        self.current = None;
    }

    /// Recompute projections at a new speed.
    ///
    /// Base statistics are recomputed from the stored videos and left
    /// untouched. Returns `Ok(None)` when nothing is held.
    pub fn recompute_at_speed(&mut self, speed: f64) -> Result<Option<SpeedAdjustedStats>> {
        let speed = PlaybackSpeed::new(speed)?;
        let Some(aggregate) = self.current.as_mut() else {
            return Ok(None);
        };
        aggregate.speed = speed;
        Ok(Some(aggregate.recomputed_stats().at_speed(speed)))
    }
}
