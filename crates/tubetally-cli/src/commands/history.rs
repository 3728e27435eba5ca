//! `tubetally history`: list, show, remove and clear remembered playlists.

use tubetally_core::{Error, Result};

use super::{AppContext, render_report};
use crate::cli::HistoryAction;

/// Run a history action, returning the text to print.
pub fn run(ctx: &mut AppContext, action: HistoryAction) -> Result<String> {
    let mut history = ctx.open_history()?;

    match action {
        HistoryAction::List => {
            if history.list().is_empty() {
                return Ok("No history yet.\n".to_string());
            }
            let mut out = String::new();
            for (index, entry) in history.list().iter().enumerate() {
                out.push_str(&format!(
                    "{}. {} ({} videos, {}) {}\n   {}\n",
                    index + 1,
                    entry.title,
                    entry.stats.count,
                    entry.stats.total_display(),
                    entry.date.format("%Y-%m-%d %H:%M UTC"),
                    entry.url
                ));
            }
            Ok(out)
        }
        HistoryAction::Show { url, speed } => {
            let speed = ctx.speed(speed)?;
            let entry = history.get(&url).ok_or_else(|| not_found(&url))?;
            let lines = entry.formatted_output.clone();
            let aggregate = entry.to_aggregate(ctx.config.missing_details)?;

            // Loading an entry replaces the current playlist like a fresh fetch.
            ctx.state.replace(aggregate);
            ctx.state.recompute_at_speed(speed.value())?;
            let current = ctx.state.current().ok_or_else(|| not_found(&url))?;
            Ok(render_report(current, &lines))
        }
        HistoryAction::Remove { url } => {
            if history.remove(&url)? {
                Ok(format!("Removed {url} from history.\n"))
            } else {
                Err(not_found(&url))
            }
        }
        HistoryAction::Clear => {
            history.clear()?;
            Ok("History cleared.\n".to_string())
        }
    }
}

fn not_found(url: &str) -> Error {
    Error::NotFound(format!("No history entry for {url}"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::commands::tests::sample_aggregate;
    use tubetally_core::HistoryEntry;

    fn context_with_entry(dir: &tempfile::TempDir) -> AppContext {
        let ctx = AppContext::load(Some(dir.path().join("config.json"))).expect("load");
        let mut history = ctx.open_history().expect("history");
        history
            .add(HistoryEntry::from_aggregate(
                &sample_aggregate(),
                "1. Track a [1:00]\n".to_string(),
            ))
            .expect("add");
        ctx
    }

    #[test]
    fn test_list() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let mut ctx = context_with_entry(&dir);
        let out = run(&mut ctx, HistoryAction::List).expect("list");
        assert!(out.starts_with("1. CLI Mix (3 videos, 4m 15s)"));
    }

    #[test]
    fn test_show_replaces_state_and_projects() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let mut ctx = context_with_entry(&dir);

        let out = run(
            &mut ctx,
            HistoryAction::Show {
                url: "https://www.youtube.com/watch?v=a&list=PLcli".to_string(),
                speed: Some(2.0),
            },
        )
        .expect("show");

        assert!(out.contains("1. Track a [1:00]\n"));
        assert!(out.contains("At 2x: total 2m 8s"));
        let current = ctx.state.current().expect("state");
        assert_eq!(current.stats.total_minutes, 4.25);
    }

    #[test]
    fn test_show_unknown_url() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let mut ctx = context_with_entry(&dir);
        let err = run(
            &mut ctx,
            HistoryAction::Show {
                url: "https://www.youtube.com/playlist?list=PLother".to_string(),
                speed: None,
            },
        )
        .unwrap_err();
        assert_eq!(err.kind(), tubetally_core::ErrorKind::NotFound);
        assert!(err.to_string().contains("No history entry"));
    }

    #[test]
    fn test_remove_then_clear() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let mut ctx = context_with_entry(&dir);

        run(
            &mut ctx,
            HistoryAction::Remove {
                url: "https://www.youtube.com/playlist?list=PLcli".to_string(),
            },
        )
        .expect("remove");
        assert_eq!(
            run(&mut ctx, HistoryAction::List).expect("list"),
            "No history yet.\n"
        );
        assert_eq!(
            run(&mut ctx, HistoryAction::Clear).expect("clear"),
            "History cleared.\n"
        );
    }
}
