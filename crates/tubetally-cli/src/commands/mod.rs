//! Command implementations.
//!
//! Each command returns the text to print; `main` owns stdout and stderr.

mod config;
mod format;
mod history;

use std::path::PathBuf;

use tubetally_core::{
    AppConfig, CurrentPlaylistState, HistoryStore, PlaybackSpeed, PlaylistAggregate, Result,
    duration_distribution, format_summary_header,
};

pub use config::run as run_config;
pub use format::run as run_format;
pub use history::run as run_history;

/// State shared by every command of one invocation.
#[derive(Debug)]
pub struct AppContext {
    /// Effective configuration.
    pub config: AppConfig,
    /// Where `config` is stored.
    pub config_path: PathBuf,
    /// Result of the last successful fetch or history load.
    pub state: CurrentPlaylistState,
}

impl AppContext {
    /// Load configuration from `config_path`, or the default location.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self> {
        let config_path = config_path.unwrap_or_else(AppConfig::config_file_path);
        let config = AppConfig::load_from(&config_path)?;
        Ok(Self {
            config,
            config_path,
            state: CurrentPlaylistState::new(),
        })
    }

    /// History file, kept beside the config file.
    ///
    /// The default `config.json` pairs with `history.json`; any other config
    /// file `<stem>.json` pairs with `<stem>-history.json`, so the two never
    /// share a path.
    pub fn history_path(&self) -> PathBuf {
        let stem = self
            .config_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = match stem.as_str() {
            "" | "config" => "history.json".to_string(),
            other => format!("{other}-history.json"),
        };
        self.config_path.with_file_name(name)
    }

    /// Open the history store with the configured limit.
    pub fn open_history(&self) -> Result<HistoryStore> {
        HistoryStore::open(self.history_path(), self.config.history_limit)
    }

    /// Speed from the command line, or the configured default.
    pub fn speed(&self, requested: Option<f64>) -> Result<PlaybackSpeed> {
        requested.map_or(Ok(self.config.playback_speed), PlaybackSpeed::new)
    }
}

/// Render the full report for a playlist: heading, lines, statistics.
pub fn render_report(aggregate: &PlaylistAggregate, lines: &str) -> String {
    let stats = &aggregate.stats;
    let mut out = format!(
        "{}\n{}\n\n{}",
        aggregate.title,
        aggregate.reference.normalized_url(),
        lines
    );
    if !lines.is_empty() && !lines.ends_with('\n') {
        out.push('\n');
    }

    out.push('\n');
    out.push_str(&format_summary_header(stats));
    out.push('\n');

    out.push_str(&format!("Videos: {}", stats.count));
    if stats.missing_details > 0 {
        out.push_str(&format!(" ({} without duration details)", stats.missing_details));
    }
    out.push('\n');
    out.push_str(&format!(
        "Total: {}  Average: {}\n",
        stats.total_display(),
        stats.avg_display()
    ));

    let distribution: Vec<String> = duration_distribution(&aggregate.videos)
        .into_iter()
        .map(|(bucket, count)| format!("{bucket}: {count}"))
        .collect();
    if !distribution.is_empty() {
        out.push_str(&format!("Lengths: {}\n", distribution.join(", ")));
    }

    if aggregate.speed != PlaybackSpeed::NORMAL {
        let projected = aggregate.projected();
        out.push_str(&format!(
            "At {}: total {}, average {}\n",
            projected.speed,
            projected.total_display(),
            projected.avg_display()
        ));
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tubetally_core::{FormatOptions, MissingDetailsPolicy, format_playlist};
    use tubetally_core::parse_reference;
    use tubetally_core::video::{PlaylistItem, VideoDetails, VideoRecord};

    fn render_aggregate(aggregate: &PlaylistAggregate, options: &FormatOptions) -> String {
        render_report(aggregate, &format_playlist(aggregate, options))
    }

    pub(super) fn sample_aggregate() -> PlaylistAggregate {
        let videos = [("a", "PT1M0S"), ("b", "PT2M30S"), ("c", "PT0M45S")]
            .iter()
            .enumerate()
            .map(|(position, (id, token))| {
                VideoRecord::from_item(
                    PlaylistItem {
                        video_id: (*id).to_string(),
                        title: format!("Track {id}"),
                        position: position as u32,
                        channel_title: Some("Channel".to_string()),
                        channel_id: None,
                        published_at: None,
                    },
                    Some(&VideoDetails {
                        raw_duration: (*token).to_string(),
                        view_count: None,
                    }),
                )
            })
            .collect();
        PlaylistAggregate::new(
            parse_reference("https://www.youtube.com/playlist?list=PLcli").expect("reference"),
            "CLI Mix".to_string(),
            videos,
            MissingDetailsPolicy::CountAsZero,
        )
    }

    #[test]
    fn test_report_at_normal_speed() {
        let options = FormatOptions {
            include_links: false,
            ..FormatOptions::default()
        };
        let report = render_aggregate(&sample_aggregate(), &options);

        assert_eq!(
            report,
            "CLI Mix\n\
             https://www.youtube.com/playlist?list=PLcli\n\
             \n\
             1. Track a [1:00]\n\
             2. Track b [2:30]\n\
             3. Track c [0:45]\n\
             \n\
             Total playlist duration: 4 minutes and 15 seconds (3 videos)\n\
             Videos: 3\n\
             Total: 4m 15s  Average: 1m 25s\n\
             Lengths: Under 1 min: 1, 1-3 mins: 2\n"
        );
    }

    #[test]
    fn test_report_includes_projection() {
        let aggregate =
            sample_aggregate().with_speed(PlaybackSpeed::new(2.0).expect("valid speed"));
        let report = render_aggregate(&aggregate, &FormatOptions::default());
        assert!(report.contains("\nAt 2x: total 2m 8s, average "));
    }

    #[test]
    fn test_context_speed_defaults_to_config() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let ctx = AppContext::load(Some(dir.path().join("config.json"))).expect("load");

        assert_eq!(ctx.speed(None).expect("default"), PlaybackSpeed::NORMAL);
        assert_eq!(ctx.speed(Some(1.5)).expect("valid").value(), 1.5);
        assert!(ctx.speed(Some(0.0)).is_err());
        assert_eq!(ctx.history_path(), dir.path().join("history.json"));
    }

    #[test]
    fn test_history_path_never_equals_config_path() {
        let dir = tempfile::TempDir::new().expect("temp dir");

        let ctx = AppContext::load(Some(dir.path().join("history.json"))).expect("load");
        assert_eq!(ctx.history_path(), dir.path().join("history-history.json"));
        assert_ne!(ctx.history_path(), ctx.config_path);

        let ctx = AppContext::load(Some(dir.path().join("work.json"))).expect("load");
        assert_eq!(ctx.history_path(), dir.path().join("work-history.json"));
    }
}
