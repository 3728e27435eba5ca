//! Tubetally Core Library
//!
//! This crate provides the core functionality for the Tubetally playlist
//! formatter:
//! - Playlist URL parsing and validation
//! - Paginated retrieval of playlist items and video details from the
//!   YouTube Data API, directly or through a proxy
//! - Duration parsing, playlist statistics and playback-speed projection
//! - Line formatting, export and a bounded history of past runs

pub mod client;
pub mod config;
pub mod duration;
pub mod error;
pub mod export;
pub mod format;
pub mod gateway;
pub mod history;
pub mod playlist;
pub mod reference;
pub mod stats;
pub mod video;

pub use client::{TransportConfig, YouTubeApiClient};
pub use config::AppConfig;
pub use duration::{ParsedDuration, Precision, format_human_duration, parse_duration};
pub use error::{Error, ErrorKind, Result};
pub use export::ExportFormat;
pub use format::{FormatOptions, format_output_line, format_playlist, format_summary_header};
pub use gateway::{FetchOptions, PlaylistSource, fetch_aggregate, fetch_playlist};
pub use history::{HistoryEntry, HistoryStore};
pub use playlist::{CurrentPlaylistState, PlaylistAggregate};
pub use reference::{PlaylistReference, extract_reference, parse_reference};
pub use stats::{
    DurationBucket, MissingDetailsPolicy, PlaybackSpeed, PlaylistStats, SpeedAdjustedStats,
    aggregate, duration_distribution, project_at_speed,
};
pub use video::VideoRecord;

/// Re-exported so callers can cancel a fetch without a direct dependency.
pub use tokio_util::sync::CancellationToken;
