//! Playlist statistics and playback-speed projection.
//!
//! Statistics are always recomputed from the video records; nothing here keeps
//! state. Speed-adjusted values are derived on demand and never stored in place
//! of the base totals.

use serde::{Deserialize, Serialize};

use crate::duration::{Precision, format_human_duration};
use crate::error::{Error, Result};
use crate::video::VideoRecord;

/// How videos without upstream details count towards the average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingDetailsPolicy {
    /// Count them as zero-length videos.
    #[default]
    CountAsZero,
    /// Leave them out of the average's denominator.
    ExcludeFromAverage,
}

/// Aggregate statistics over a sequence of videos.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlaylistStats {
    /// Number of videos.
    pub count: usize,
    /// Number of videos that had no upstream details.
    #[serde(default)]
    pub missing_details: usize,
    /// Exact sum of durations, in minutes.
    pub total_minutes: f64,
    /// Average duration in minutes; zero when there is nothing to average.
    pub avg_minutes: f64,
}

impl PlaylistStats {
    /// Total rendered as `Xh Ym` / `Ym Zs`.
    #[must_use]
    pub fn total_display(&self) -> String {
        format_human_duration(self.total_minutes, Precision::Summary)
    }

    /// Average rendered as `Xh Ym` / `Ym Zs`.
    #[must_use]
    pub fn avg_display(&self) -> String {
        format_human_duration(self.avg_minutes, Precision::Summary)
    }

    /// Project these statistics at a playback speed.
    #[must_use]
    pub fn at_speed(&self, speed: PlaybackSpeed) -> SpeedAdjustedStats {
        SpeedAdjustedStats {
            speed,
            total_minutes: speed.project(self.total_minutes),
            avg_minutes: speed.project(self.avg_minutes),
        }
    }
}

/// Fold videos into statistics, counting missing details as zero.
#[must_use]
pub fn aggregate(videos: &[VideoRecord]) -> PlaylistStats {
    aggregate_with_policy(videos, MissingDetailsPolicy::CountAsZero)
}

/// Fold videos into statistics under the given missing-details policy.
///
/// The total is summed in whole seconds, so it does not depend on the order of
/// `videos`.
#[must_use]
pub fn aggregate_with_policy(
    videos: &[VideoRecord],
    policy: MissingDetailsPolicy,
) -> PlaylistStats {
    let count = videos.len();
    let missing_details = videos.iter().filter(|v| v.details_missing).count();
    let total_secs: u64 = videos
        .iter()
        .fold(0u64, |acc, v| acc.saturating_add(v.duration_secs));
    let total_minutes = total_secs as f64 / 60.0;

    let denominator = match policy {
        MissingDetailsPolicy::CountAsZero => count,
        MissingDetailsPolicy::ExcludeFromAverage => count - missing_details,
    };
    let avg_minutes = if denominator > 0 {
        total_minutes / denominator as f64
    } else {
        0.0
    };

    PlaylistStats {
        count,
        missing_details,
        total_minutes,
        avg_minutes,
    }
}

/// A validated, strictly positive playback-speed multiplier.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct PlaybackSpeed(f64);

impl PlaybackSpeed {
    /// Normal playback.
    pub const NORMAL: Self = Self(1.0);

    /// Validate a multiplier.
    pub fn new(speed: f64) -> Result<Self> {
        if speed.is_finite() && speed > 0.0 {
            Ok(Self(speed))
        } else {
            Err(Error::InvalidSpeed(speed))
        }
    }

    /// The raw multiplier.
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }

    /// Minutes needed to watch `minutes` of content at this speed.
    #[must_use]
    pub fn project(self, minutes: f64) -> f64 {
        minutes / self.0
    }
}

impl Default for PlaybackSpeed {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl TryFrom<f64> for PlaybackSpeed {
    type Error = Error;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<PlaybackSpeed> for f64 {
    fn from(speed: PlaybackSpeed) -> Self {
        speed.0
    }
}

impl std::fmt::Display for PlaybackSpeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x", self.0)
    }
}

/// Divide `minutes` by `speed`, rejecting non-positive speeds.
pub fn project_at_speed(minutes: f64, speed: f64) -> Result<f64> {
    Ok(PlaybackSpeed::new(speed)?.project(minutes))
}

/// Statistics projected at a playback speed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedAdjustedStats {
    /// The speed used for the projection.
    pub speed: PlaybackSpeed,
    /// Projected watch time for the whole playlist.
    pub total_minutes: f64,
    /// Projected watch time per video.
    pub avg_minutes: f64,
}

impl SpeedAdjustedStats {
    /// Projected total rendered as `Xh Ym` / `Ym Zs`.
    #[must_use]
    pub fn total_display(&self) -> String {
        format_human_duration(self.total_minutes, Precision::Summary)
    }

    /// Projected average rendered as `Xh Ym` / `Ym Zs`.
    #[must_use]
    pub fn avg_display(&self) -> String {
        format_human_duration(self.avg_minutes, Precision::Summary)
    }
}

/// Duration range a video falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationBucket {
    /// Shorter than one minute, including videos without details.
    UnderOneMinute,
    /// 1 to 3 minutes.
    OneToThree,
    /// 3 to 5 minutes.
    ThreeToFive,
    /// 5 to 10 minutes.
    FiveToTen,
    /// 10 to 20 minutes.
    TenToTwenty,
    /// 20 to 30 minutes.
    TwentyToThirty,
    /// 30 to 60 minutes.
    ThirtyToSixty,
    /// An hour or longer.
    OverSixty,
}

impl DurationBucket {
    /// All buckets, shortest first.
    pub const ALL: [Self; 8] = [
        Self::UnderOneMinute,
        Self::OneToThree,
        Self::ThreeToFive,
        Self::FiveToTen,
        Self::TenToTwenty,
        Self::TwentyToThirty,
        Self::ThirtyToSixty,
        Self::OverSixty,
    ];

    /// Bucket for a duration in whole seconds; lower bounds are inclusive.
    #[must_use]
    pub const fn for_seconds(secs: u64) -> Self {
        match secs {
            0..60 => Self::UnderOneMinute,
            60..180 => Self::OneToThree,
            180..300 => Self::ThreeToFive,
            300..600 => Self::FiveToTen,
            600..1200 => Self::TenToTwenty,
            1200..1800 => Self::TwentyToThirty,
            1800..3600 => Self::ThirtyToSixty,
            _ => Self::OverSixty,
        }
    }

    /// Human label, e.g. `5-10 mins`.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::UnderOneMinute => "Under 1 min",
            Self::OneToThree => "1-3 mins",
            Self::ThreeToFive => "3-5 mins",
            Self::FiveToTen => "5-10 mins",
            Self::TenToTwenty => "10-20 mins",
            Self::TwentyToThirty => "20-30 mins",
            Self::ThirtyToSixty => "30-60 mins",
            Self::OverSixty => "Over 60 mins",
        }
    }
}

impl std::fmt::Display for DurationBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Count videos per duration range, shortest first, leaving out empty ranges.
#[must_use]
pub fn duration_distribution(videos: &[VideoRecord]) -> Vec<(DurationBucket, usize)> {
    let mut counts = [0usize; DurationBucket::ALL.len()];
    for video in videos {
        counts[DurationBucket::for_seconds(video.duration_secs) as usize] += 1;
    }
    DurationBucket::ALL
        .into_iter()
        .zip(counts)
        .filter(|(_, count)| *count > 0)
        .collect()
}
