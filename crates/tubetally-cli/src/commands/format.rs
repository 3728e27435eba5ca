//! `tubetally format`: fetch, print, export and remember a playlist.

use std::path::PathBuf;

use tracing::{info, warn};
use tubetally_core::export::{export_to_file, suggested_file_name};
use tubetally_core::{
    CancellationToken, ExportFormat, HistoryEntry, PlaylistAggregate, Result,
    YouTubeApiClient, fetch_aggregate, format_playlist, parse_reference,
};

use super::{AppContext, render_report};
use crate::cli::FormatArgs;

/// Run the command, returning the report to print.
pub async fn run(
    ctx: &mut AppContext,
    args: FormatArgs,
    cancel: &CancellationToken,
) -> Result<String> {
    let reference = parse_reference(&args.url)?;
    let speed = ctx.speed(args.speed)?;
    let options = args.format.apply(ctx.config.format);

    let api_key = ctx.config.resolve_api_key(args.api_key.as_deref());
    let client = YouTubeApiClient::new(
        api_key,
        ctx.config.transport.clone(),
        ctx.config.request_timeout(),
    )?;

    info!("Formatting playlist {}", reference);
    let aggregate = fetch_aggregate(
        &client,
        &reference,
        ctx.config.fetch_options(),
        ctx.config.missing_details,
        cancel,
    )
    .await?
    .with_speed(speed);

    let lines = format_playlist(&aggregate, &options);
    let mut report = render_report(&aggregate, &lines);

    if let Some(format) = args.export {
        let path = export_path(&aggregate, format, args.output);
        export_to_file(&aggregate, &options, format, &path)?;
        report.push_str(&format!("\nExported {} to {}\n", format, path.display()));
    }

    if !args.no_history {
        remember(ctx, &aggregate, lines);
    }

    ctx.state.replace(aggregate);
    Ok(report)
}

fn export_path(
    aggregate: &PlaylistAggregate,
    format: ExportFormat,
    output: Option<PathBuf>,
) -> PathBuf {
    output.unwrap_or_else(|| PathBuf::from(suggested_file_name(&aggregate.title, format)))
}

// A history failure must not lose a successful fetch.
fn remember(ctx: &AppContext, aggregate: &PlaylistAggregate, lines: String) {
    let result = ctx
        .open_history()
        .and_then(|mut history| history.add(HistoryEntry::from_aggregate(aggregate, lines)));
    if let Err(e) = result {
        warn!("Failed to record history: {}", e);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::commands::tests::sample_aggregate;

    #[test]
    fn test_export_path_from_title() {
        let aggregate = sample_aggregate();
        assert_eq!(
            export_path(&aggregate, ExportFormat::Markdown, None),
            PathBuf::from("cli_mix.md")
        );
        assert_eq!(
            export_path(&aggregate, ExportFormat::Csv, Some(PathBuf::from("out.csv"))),
            PathBuf::from("out.csv")
        );
    }

    #[test]
    fn test_remember_writes_history() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let ctx = AppContext::load(Some(dir.path().join("config.json"))).expect("load");
        let aggregate = sample_aggregate();

        remember(&ctx, &aggregate, "1. Track a\n".to_string());

        let history = ctx.open_history().expect("history");
        assert_eq!(history.list().len(), 1);
        assert_eq!(history.list()[0].title, "CLI Mix");
    }

    #[tokio::test]
    async fn test_invalid_url_fails_before_network() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let mut ctx = AppContext::load(Some(dir.path().join("config.json"))).expect("load");
        let args = FormatArgs {
            url: "https://example.com/notaplaylist".to_string(),
            api_key: Some("key".to_string()),
            speed: None,
            format: crate::cli::FormatFlags {
                no_numbers: false,
                no_duration: false,
                no_links: false,
                long_links: false,
                channels: false,
            },
            export: None,
            output: None,
            no_history: true,
        };

        let err = run(&mut ctx, args, &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), tubetally_core::ErrorKind::InvalidReference);
        assert!(ctx.state.current().is_none());
    }
}
