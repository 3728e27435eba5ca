//! Export of a formatted playlist to text-based file formats.
//!
//! Every renderer works from the aggregate itself rather than re-parsing the
//! formatted text, so titles containing brackets or parentheses survive.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::Serialize;
use tracing::info;

use crate::error::{Error, Result};
use crate::format::{FormatOptions, format_playlist};
use crate::playlist::PlaylistAggregate;
use crate::video::VideoRecord;

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// The formatted lines as printed.
    #[default]
    Text,
    /// `# Title` followed by the formatted lines.
    Markdown,
    /// `Number,Title,Duration,URL` rows.
    Csv,
    /// `{title, count, videos}` document.
    Json,
    /// Standalone HTML page.
    Html,
}

impl ExportFormat {
    /// All formats, in menu order.
    pub const ALL: [Self; 5] = [
        Self::Text,
        Self::Markdown,
        Self::Csv,
        Self::Json,
        Self::Html,
    ];

    /// File extension without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Markdown => "md",
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Html => "html",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "txt" | "text" => Ok(Self::Text),
            "md" | "markdown" => Ok(Self::Markdown),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "html" | "htm" => Ok(Self::Html),
            other => Err(Error::Export(format!(
                "Unknown export format '{other}' (expected txt, md, csv, json or html)"
            ))),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

#[derive(Serialize)]
struct JsonPlaylist<'a> {
    title: &'a str,
    count: usize,
    videos: Vec<JsonVideo<'a>>,
}

#[derive(Serialize)]
struct JsonVideo<'a> {
    number: u32,
    title: &'a str,
    duration: &'a str,
    url: &'a str,
}

fn link<'a>(video: &'a VideoRecord, options: &FormatOptions) -> &'a str {
    if options.short_links {
        &video.short_url
    } else {
        &video.url
    }
}

fn csv_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Render the aggregate in `format`.
pub fn render(
    aggregate: &PlaylistAggregate,
    options: &FormatOptions,
    format: ExportFormat,
) -> Result<String> {
    match format {
        ExportFormat::Text => Ok(format_playlist(aggregate, options)),
        ExportFormat::Markdown => Ok(format!(
            "# {}\n\n{}",
            aggregate.title,
            format_playlist(aggregate, options)
        )),
        ExportFormat::Csv => Ok(render_csv(aggregate, options)),
        ExportFormat::Json => render_json(aggregate, options),
        ExportFormat::Html => Ok(render_html(aggregate, options)),
    }
}

fn render_csv(aggregate: &PlaylistAggregate, options: &FormatOptions) -> String {
    let mut csv = String::from("Number,Title,Duration,URL\n");
    for (index, video) in aggregate.videos.iter().enumerate() {
        let row = [
            (index + 1).to_string(),
            video.title.clone(),
            video.duration_text.clone(),
            link(video, options).to_string(),
        ];
        let fields: Vec<String> = row.iter().map(|f| csv_field(f)).collect();
        csv.push_str(&fields.join(","));
        csv.push('\n');
    }
    csv
}

fn render_json(aggregate: &PlaylistAggregate, options: &FormatOptions) -> Result<String> {
    let document = JsonPlaylist {
        title: &aggregate.title,
        count: aggregate.videos.len(),
        videos: aggregate
            .videos
            .iter()
            .enumerate()
            .map(|(index, video)| JsonVideo {
                number: index as u32 + 1,
                title: &video.title,
                duration: &video.duration_text,
                url: link(video, options),
            })
            .collect(),
    };
    serde_json::to_string_pretty(&document).map_err(|e| Error::Export(e.to_string()))
}

fn render_html(aggregate: &PlaylistAggregate, options: &FormatOptions) -> String {
    let title = html_escape::encode_text(&aggregate.title);
    let mut html = format!(
        "<!DOCTYPE html>\n<html>\n<head>\n    <meta charset=\"UTF-8\">\n    <title>{title}</title>\n</head>\n<body>\n    <h1>{title}</h1>\n    <ol>\n"
    );
    for video in &aggregate.videos {
        let url = html_escape::encode_double_quoted_attribute(link(video, options));
        html.push_str(&format!(
            "        <li><a href=\"{url}\">{}</a> <span class=\"duration\">[{}]</span></li>\n",
            html_escape::encode_text(&video.title),
            html_escape::encode_text(&video.duration_text)
        ));
    }
    html.push_str("    </ol>\n</body>\n</html>\n");
    html
}

/// File name for an export: the title reduced to `[a-z0-9_]` plus extension.
#[must_use]
pub fn suggested_file_name(title: &str, format: ExportFormat) -> String {
    let stem: String = title
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    let stem = if stem.is_empty() { "playlist".to_string() } else { stem };
    format!("{stem}.{}", format.extension())
}

/// Render and write to `path`.
pub fn export_to_file(
    aggregate: &PlaylistAggregate,
    options: &FormatOptions,
    format: ExportFormat,
    path: &Path,
) -> Result<()> {
    let content = render(aggregate, options, format)?;
    fs::write(path, content).map_err(|e| Error::FileSystem {
        path: path.to_path_buf(),
        reason: format!("Failed to write export: {e}"),
    })?;
    info!("Exported {} as {} to {}", aggregate.reference, format, path.display());
    Ok(())
}
