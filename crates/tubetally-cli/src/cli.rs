//! Command-line arguments.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use tubetally_core::config::API_KEY_ENV_VAR;
use tubetally_core::{ExportFormat, FormatOptions};

/// Format YouTube playlists and total up their running time.
#[derive(Debug, Parser)]
#[command(name = "tubetally", author, version, about, long_about = None)]
pub struct Cli {
    /// Increase console log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Use this config file instead of the default location
    #[arg(long = "config", global = true, value_name = "PATH")]
    pub config_path: Option<PathBuf>,

    /// Write log files to this directory
    #[arg(long, global = true, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Log to the console only
    #[arg(long, global = true)]
    pub no_log_file: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch a playlist and print it with statistics
    Format(FormatArgs),
    /// Inspect previously formatted playlists
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
    /// Show or change settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Args)]
pub struct FormatArgs {
    /// Playlist URL (playlist page, watch URL with list=, or youtu.be link)
    pub url: String,

    /// API key; overrides the stored key
    #[arg(long, value_name = "KEY", env = API_KEY_ENV_VAR, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Playback speed used for projected watch time
    #[arg(long, value_name = "X")]
    pub speed: Option<f64>,

    #[command(flatten)]
    pub format: FormatFlags,

    /// Also export as txt, md, csv, json or html
    #[arg(long, value_name = "FMT", value_parser = parse_export_format)]
    pub export: Option<ExportFormat>,

    /// Export destination (defaults to a name derived from the title)
    #[arg(long, short, value_name = "PATH", requires = "export")]
    pub output: Option<PathBuf>,

    /// Do not record this run in the history
    #[arg(long)]
    pub no_history: bool,
}

// Overrides applied on top of the configured format.
#[derive(Debug, Args, Clone, Copy)]
#[command(next_help_heading = "Formatting")]
pub struct FormatFlags {
    /// Omit the "N. " prefix
    #[arg(long)]
    pub no_numbers: bool,
    /// Omit the [duration] field
    #[arg(long)]
    pub no_duration: bool,
    /// Omit links
    #[arg(long)]
    pub no_links: bool,
    /// Use full watch URLs instead of youtu.be links
    #[arg(long)]
    pub long_links: bool,
    /// Include the channel name
    #[arg(long)]
    pub channels: bool,
}

impl FormatFlags {
    /// Apply the flags to a base set of options.
    pub const fn apply(self, mut options: FormatOptions) -> FormatOptions {
        if self.no_numbers {
            options.include_numbers = false;
        }
        if self.no_duration {
            options.include_duration = false;
        }
        if self.no_links {
            options.include_links = false;
        }
        if self.long_links {
            options.short_links = false;
        }
        if self.channels {
            options.include_channels = true;
        }
        options
    }
}

#[derive(Debug, Subcommand)]
pub enum HistoryAction {
    /// List remembered playlists, newest first
    List,
    /// Print a remembered playlist
    Show {
        /// Playlist URL
        url: String,
        /// Playback speed used for projected watch time
        #[arg(long, value_name = "X")]
        speed: Option<f64>,
    },
    /// Forget one playlist
    Remove {
        /// Playlist URL
        url: String,
    },
    /// Forget everything
    Clear,
}

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration (the key is masked)
    Show,
    /// Store an API key
    SetKey {
        /// The key; an empty string clears it
        key: String,
    },
    /// Store the default playback speed
    SetSpeed {
        /// Multiplier, greater than zero
        speed: f64,
    },
    /// Print the config file location
    Path,
}

fn parse_export_format(value: &str) -> Result<ExportFormat, String> {
    value.parse().map_err(|e: tubetally_core::Error| e.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_format_command() {
        let cli = Cli::try_parse_from([
            "tubetally",
            "-vv",
            "format",
            "https://www.youtube.com/playlist?list=PL1",
            "--speed",
            "1.5",
            "--no-links",
            "--channels",
            "--export",
            "csv",
        ])
        .expect("parse");

        assert_eq!(cli.verbose, 2);
        let Command::Format(args) = cli.command else {
            panic!("expected format command");
        };
        assert_eq!(args.speed, Some(1.5));
        assert_eq!(args.export, Some(ExportFormat::Csv));

        let options = args.format.apply(FormatOptions::default());
        assert!(!options.include_links);
        assert!(options.include_channels);
        assert!(options.include_numbers);
    }

    #[test]
    fn test_api_key_reads_environment() {
        use clap::CommandFactory;
        let command = Cli::command();
        let format = command.find_subcommand("format").expect("format subcommand");
        let api_key = format
            .get_arguments()
            .find(|arg| arg.get_id() == "api_key")
            .expect("api_key argument");

        assert_eq!(
            api_key.get_env(),
            Some(std::ffi::OsStr::new("YOUTUBE_API_KEY"))
        );
    }

    #[test]
    fn test_global_logging_flags() {
        let cli = Cli::try_parse_from([
            "tubetally",
            "config",
            "path",
            "--log-dir",
            "/tmp/logs",
            "--no-log-file",
        ])
        .expect("parse");

        assert_eq!(cli.log_dir, Some(PathBuf::from("/tmp/logs")));
        assert!(cli.no_log_file);
    }

    #[test]
    fn test_rejects_unknown_export_format() {
        let result = Cli::try_parse_from([
            "tubetally",
            "format",
            "https://www.youtube.com/playlist?list=PL1",
            "--export",
            "pdf",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_output_requires_export() {
        let result = Cli::try_parse_from([
            "tubetally",
            "format",
            "https://www.youtube.com/playlist?list=PL1",
            "--output",
            "out.txt",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_history_show_with_speed() {
        let cli = Cli::try_parse_from([
            "tubetally",
            "history",
            "show",
            "https://www.youtube.com/playlist?list=PL1",
            "--speed",
            "2",
        ])
        .expect("parse");
        assert!(matches!(
            cli.command,
            Command::History {
                action: HistoryAction::Show { speed: Some(s), .. }
            } if s == 2.0
        ));
    }

    #[test]
    fn test_verify_command_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
