use std::fmt;
use std::fmt::Write;
use std::str::FromStr;
use anyhow::anyhow;
use log::debug;
use serde::{Deserialize, Serialize};
use crate::errors::SubtitleError;
use crate::periods::Period;
use crate::subtitle_processor::{self, SubtitleEntry};
use crate::timecode::{self, TimeFormat};

// @module: Condensed subtitle rebuilding on the concatenated-period timeline

/// Output dialect for condensed subtitles
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CondensedFormat {
    #[default]
    Srt,
    Lrc,
}

impl CondensedFormat {
    // @returns: File extension without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Srt => "srt",
            Self::Lrc => "lrc",
        }
    }
}

impl fmt::Display for CondensedFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl FromStr for CondensedFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim_start_matches('.').to_lowercase().as_str() {
            "srt" => Ok(Self::Srt),
            "lrc" => Ok(Self::Lrc),
            _ => Err(anyhow!("Unsupported condensed subtitle format: {}", s)),
        }
    }
}

/// Re-time entries onto the condensed timeline.
///
/// Each period contributes the entries it fully contains, shifted so the
/// period starts at the running offset. Entries straddling a period boundary
/// are dropped, never clipped.
pub fn rebuild_entries(periods: &[Period], entries: &[SubtitleEntry]) -> Vec<SubtitleEntry> {
    let mut rebuilt = Vec::new();
    let mut running_offset = 0u64;

    for period in periods {
        for entry in entries.iter().filter(|entry| period.contains(entry)) {
            rebuilt.push(SubtitleEntry::new(
                rebuilt.len() + 1,
                entry.start_time_ms - period.start_ms + running_offset,
                entry.end_time_ms - period.start_ms + running_offset,
                entry.text.clone(),
            ));
        }
        running_offset += period.duration_ms();
    }

    debug!("Rebuilt {} of {} entries across {} periods", rebuilt.len(), entries.len(), periods.len());
    rebuilt
}

/// Serialize entries in the given condensed format
pub fn render(entries: &[SubtitleEntry], format: CondensedFormat) -> String {
    let mut output = String::new();
    match format {
        CondensedFormat::Srt => {
            for entry in entries {
                // Writing into a String cannot fail
                let _ = write!(output, "{}", entry);
            }
        }
        CondensedFormat::Lrc => {
            for entry in entries {
                let text = entry.text.lines().collect::<Vec<_>>().join(" ");
                let _ = writeln!(output, "[{}]{}", timecode::format_timestamp(entry.start_time_ms, TimeFormat::Lrc), text);
                let _ = writeln!(output, "[{}]", timecode::format_timestamp(entry.end_time_ms, TimeFormat::Lrc));
            }
        }
    }
    output
}

/// Parse the original subtitle text and produce condensed subtitles for the given periods
pub fn create_condensed_subtitles(
    periods: &[Period],
    original_subtitle_text: &str,
    format: CondensedFormat,
) -> Result<String, SubtitleError> {
    let entries = subtitle_processor::parse_subtitles(original_subtitle_text)?;
    Ok(render(&rebuild_entries(periods, &entries), format))
}
