//! Duration token parsing and human-readable duration formatting.
//!
//! The upstream API reports durations as ISO-8601 tokens such as `PT1H2M3S`.
//! Parsing is total: malformed or absent tokens become zero minutes with a
//! neutral placeholder label, never an error.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Label used when a duration token cannot be parsed.
pub const PLACEHOLDER_DISPLAY: &str = "video";

/// Token used for videos whose details were missing upstream.
pub const ZERO_DURATION_TOKEN: &str = "PT0S";

#[allow(clippy::expect_used)]
static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^P(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?)?$")
        .expect("duration pattern is valid")
});

/// Hour, minute and second groups of a duration token.
///
/// Day groups are folded into `hours`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DurationParts {
    /// Hours, including 24 per day group.
    pub hours: u64,
    /// Minutes group as written (not normalized past 59).
    pub minutes: u64,
    /// Seconds group as written.
    pub seconds: u64,
}

impl DurationParts {
    /// Parse a token, returning `None` when it does not follow the grammar.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        if token.len() < 2 {
            return None;
        }
        let caps = DURATION_RE.captures(token)?;

        let group = |index: usize| -> Option<u64> {
            caps.get(index)
                .map_or(Some(0), |m| m.as_str().parse::<u64>().ok())
        };

        let days = group(1)?;
        let hours = days.checked_mul(24)?.checked_add(group(2)?)?;
        Some(Self {
            hours,
            minutes: group(3)?,
            seconds: group(4)?,
        })
    }

    /// Total length in whole seconds, saturating on absurd inputs.
    #[must_use]
    pub const fn total_seconds(&self) -> u64 {
        self.hours
            .saturating_mul(3600)
            .saturating_add(self.minutes.saturating_mul(60))
            .saturating_add(self.seconds)
    }

    /// Total length in fractional minutes.
    #[must_use]
    pub fn total_minutes(&self) -> f64 {
        self.hours as f64 * 60.0 + self.minutes as f64 + self.seconds as f64 / 60.0
    }

    /// Narrative label, e.g. `1hr 2min 3sec video`.
    #[must_use]
    pub fn narrative(&self) -> String {
        if self.hours > 0 {
            format!(
                "{}hr {}min {}sec video",
                self.hours, self.minutes, self.seconds
            )
        } else if self.minutes > 0 {
            format!("{}min {}sec video", self.minutes, self.seconds)
        } else {
            format!("{}sec video", self.seconds)
        }
    }
}

/// Result of parsing a duration token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedDuration {
    /// Length in fractional minutes; zero for malformed tokens.
    pub minutes: f64,
    /// Narrative label, or [`PLACEHOLDER_DISPLAY`] for malformed tokens.
    pub display: String,
}

/// Parse a duration token into minutes and a narrative label.
///
/// ```rust
/// use tubetally_core::duration::parse_duration;
///
/// let parsed = parse_duration("PT45S");
/// assert_eq!(parsed.minutes, 0.75);
/// assert_eq!(parsed.display, "45sec video");
/// ```
#[must_use]
pub fn parse_duration(token: &str) -> ParsedDuration {
    match DurationParts::parse(token) {
        Some(parts) => ParsedDuration {
            minutes: parts.total_minutes(),
            display: parts.narrative(),
        },
        None => ParsedDuration {
            minutes: 0.0,
            display: PLACEHOLDER_DISPLAY.to_string(),
        },
    }
}

/// Display granularity for [`format_human_duration`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    /// `H:MM:SS` or `M:SS`, used for individual videos.
    #[default]
    Clock,
    /// `Xh Ym`, or `Ym Zs` under an hour, used for playlist totals.
    Summary,
}

/// Render a minute value at the given precision.
///
/// Seconds are rounded (not truncated) from the total before splitting into
/// fields, so re-deriving a display from the same minutes is stable and never
/// shows a `60` seconds field.
#[must_use]
pub fn format_human_duration(minutes: f64, precision: Precision) -> String {
    let total_secs = if minutes.is_finite() && minutes > 0.0 {
        (minutes * 60.0).round() as u64
    } else {
        0
    };
    let hours = total_secs / 3600;
    let mins = (total_secs % 3600) / 60;
    let secs = total_secs % 60;

    match precision {
        Precision::Clock if hours > 0 => format!("{hours}:{mins:02}:{secs:02}"),
        Precision::Clock => format!("{mins}:{secs:02}"),
        Precision::Summary if hours > 0 => format!("{hours}h {mins}m"),
        Precision::Summary => format!("{mins}m {secs}s"),
    }
}

/// Pluralize a unit for the summary sentence.
pub(crate) fn plural(count: u64, unit: &str) -> String {
    if count == 1 {
        format!("{count} {unit}")
    } else {
        format!("{count} {unit}s")
    }
}
