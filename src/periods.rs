/*!
 * Speech period extraction.
 *
 * Turns parsed dialogue into the minimal list of time ranges that contain
 * speech: markup is stripped, unwanted entries are filtered, every survivor is
 * padded, and overlapping or touching ranges are merged.
 */

use regex::Regex;
use once_cell::sync::Lazy;
use log::debug;
use serde::{Deserialize, Serialize};
use crate::app_config::Config;
use crate::errors::SubtitleError;
use crate::subtitle_processor::{self, SubtitleEntry};

// @const: Inline angle-bracket markup such as <i> or <font color="...">
static MARKUP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<[^>]*>").unwrap()
});

/// Opening and closing characters that mark a whole entry as non-speech
const ENCLOSING_PAIRS: [(char, char); 4] = [('(', ')'), ('（', '）'), ('[', ']'), ('{', '}')];

/// A contiguous range of retained speech, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub start_ms: u64,
    pub end_ms: u64,
}

impl Period {
    pub fn new(start_ms: u64, end_ms: u64) -> Self {
        Self { start_ms, end_ms }
    }

    pub fn duration_ms(&self) -> u64 {
        self.end_ms.saturating_sub(self.start_ms)
    }

    /// True when the entry lies entirely inside this period, boundaries included
    pub fn contains(&self, entry: &SubtitleEntry) -> bool {
        entry.start_time_ms >= self.start_ms && entry.end_time_ms <= self.end_ms
    }
}

/// Sum of all period durations
pub fn total_duration_ms(periods: &[Period]) -> u64 {
    periods.iter().map(Period::duration_ms).sum()
}

/// Parse subtitle text of any supported dialect and derive its speech periods
pub fn extract_periods(subtitle_text: &str, config: &Config) -> Result<Vec<Period>, SubtitleError> {
    let entries = subtitle_processor::parse_subtitles(subtitle_text)?;
    periods_from_entries(&entries, config)
}

/// Derive speech periods from already-parsed entries
pub fn periods_from_entries(entries: &[SubtitleEntry], config: &Config) -> Result<Vec<Period>, SubtitleError> {
    let kept = filter_entries(entries, config);
    debug!("{} of {} entries kept after filtering", kept.len(), entries.len());

    let raw = build_raw_periods(&kept, config.padding_ms);
    let merged = merge_periods(&raw);

    if merged.is_empty() {
        return Err(SubtitleError::Validation(
            "no speech periods left after filtering".to_string(),
        ));
    }

    debug!("Merged {} raw periods into {}", raw.len(), merged.len());
    Ok(merged)
}

/// Apply markup stripping, enclosure filtering and character removal.
///
/// Returns new entries carrying the cleaned text; entries left empty are dropped.
pub fn filter_entries(entries: &[SubtitleEntry], config: &Config) -> Vec<SubtitleEntry> {
    entries
        .iter()
        .filter_map(|entry| {
            let stripped = strip_markup(&entry.text);
            if stripped.trim().is_empty() {
                return None;
            }
            if config.filter_parentheses && is_enclosed(&stripped) {
                return None;
            }

            let cleaned: String = stripped
                .chars()
                .filter(|c| !config.filtered_characters.contains(*c))
                .collect();
            if cleaned.trim().is_empty() {
                return None;
            }

            Some(SubtitleEntry {
                text: cleaned.trim().to_string(),
                ..entry.clone()
            })
        })
        .collect()
}

/// Remove inline angle-bracket markup
pub fn strip_markup(text: &str) -> String {
    MARKUP_REGEX.replace_all(text, "").into_owned()
}

/// True when the trimmed text opens and closes with a matching enclosing pair.
///
/// This is a whole-string test; "(a) and (b)" counts as enclosed.
pub fn is_enclosed(text: &str) -> bool {
    let trimmed = text.trim();
    let (Some(first), Some(last)) = (trimmed.chars().next(), trimmed.chars().last()) else {
        return false;
    };
    trimmed.chars().count() >= 2
        && ENCLOSING_PAIRS.iter().any(|&(open, close)| first == open && last == close)
}

/// Pad every entry into a raw period, in source order.
///
/// The last period gets its trailing padding taken back off so the output
/// does not end on padded silence.
pub fn build_raw_periods(entries: &[SubtitleEntry], padding_ms: u64) -> Vec<Period> {
    let mut periods: Vec<Period> = entries
        .iter()
        .map(|entry| Period {
            start_ms: entry.start_time_ms.saturating_sub(padding_ms),
            end_ms: entry.end_time_ms + padding_ms,
        })
        .collect();

    if let Some(last) = periods.last_mut() {
        last.end_ms = last.end_ms.saturating_sub(padding_ms).max(last.start_ms);
    }

    periods
}

/// Merge periods left to right without sorting.
///
/// A period is absorbed while its start is at or before the running end.
/// Zero-length results are dropped.
pub fn merge_periods(periods: &[Period]) -> Vec<Period> {
    let mut merged = Vec::with_capacity(periods.len());
    let mut i = 0;

    while i < periods.len() {
        let start_ms = periods[i].start_ms;
        let mut end_ms = periods[i].end_ms;
        let mut j = i + 1;

        while j < periods.len() && end_ms >= periods[j].start_ms {
            end_ms = end_ms.max(periods[j].end_ms);
            j += 1;
        }

        if end_ms > start_ms {
            merged.push(Period { start_ms, end_ms });
        }
        i = j;
    }

    merged
}
