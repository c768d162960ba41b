use std::fmt;
use regex::Regex;
use once_cell::sync::Lazy;
use crate::errors::SubtitleError;

// @module: Timestamp conversion between subtitle dialects and milliseconds

// @const: HH:MM:SS,mmm
static SRT_TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+):(\d{2}):(\d{2}),(\d{3})$").unwrap()
});

// @const: HH:MM:SS.mmm with optional hours
static VTT_TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(\d+):)?(\d{2}):(\d{2})\.(\d{3})$").unwrap()
});

// @const: H:MM:SS.cc
static ASS_TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+):(\d{2}):(\d{2})\.(\d{2})$").unwrap()
});

// @const: MM:SS.cc
static LRC_TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+):(\d{2})\.(\d{2})$").unwrap()
});

/// Timestamp dialects understood by the codec
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeFormat {
    /// `HH:MM:SS,mmm`
    Srt,
    /// `HH:MM:SS.mmm`
    Vtt,
    /// `H:MM:SS.cc`, shared by ASS and SSA
    Ass,
    /// `MM:SS.cc`
    Lrc,
}

impl fmt::Display for TimeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Srt => "SRT",
            Self::Vtt => "VTT",
            Self::Ass => "ASS",
            Self::Lrc => "LRC",
        };
        write!(f, "{}", name)
    }
}

/// Parse a timestamp written in the given dialect into milliseconds.
///
/// Centisecond dialects (ASS, LRC) are scaled by ten, so no precision is lost
/// in this direction.
pub fn parse_timestamp(value: &str, format: TimeFormat) -> Result<u64, SubtitleError> {
    let value = value.trim();
    let format_error = || SubtitleError::Format {
        format: format.to_string(),
        value: value.to_string(),
    };

    let (regex, groups, centiseconds) = match format {
        TimeFormat::Srt => (&*SRT_TIMESTAMP_REGEX, [Some(1), Some(2), Some(3), Some(4)], false),
        TimeFormat::Vtt => (&*VTT_TIMESTAMP_REGEX, [Some(1), Some(2), Some(3), Some(4)], false),
        TimeFormat::Ass => (&*ASS_TIMESTAMP_REGEX, [Some(1), Some(2), Some(3), Some(4)], true),
        TimeFormat::Lrc => (&*LRC_TIMESTAMP_REGEX, [None, Some(1), Some(2), Some(3)], true),
    };
    let caps = regex.captures(value).ok_or_else(format_error)?;
    let [hours, minutes, seconds, fraction] =
        groups.map(|group| group.map_or(Some(0), |idx| number(&caps, idx)));
    let (Some(hours), Some(minutes), Some(seconds), Some(fraction)) = (hours, minutes, seconds, fraction) else {
        return Err(format_error());
    };
    let millis = if centiseconds { fraction * 10 } else { fraction };

    // LRC carries total minutes, so only its seconds are bounded
    let minutes_out_of_range = format != TimeFormat::Lrc && minutes >= 60;
    if minutes_out_of_range || seconds >= 60 {
        return Err(format_error());
    }

    hours
        .checked_mul(3_600_000)
        .and_then(|ms| ms.checked_add(minutes.checked_mul(60_000)?))
        .and_then(|ms| ms.checked_add(seconds * 1_000 + millis))
        .ok_or_else(format_error)
}

/// Format milliseconds as a timestamp in the given dialect.
///
/// ASS and LRC output truncates to centiseconds; that loss is one-directional
/// and accepted.
pub fn format_timestamp(ms: u64, format: TimeFormat) -> String {
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let seconds = (ms % 60_000) / 1_000;
    let millis = ms % 1_000;

    match format {
        TimeFormat::Srt => format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis),
        TimeFormat::Vtt => format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis),
        TimeFormat::Ass => format!("{}:{:02}:{:02}.{:02}", hours, minutes, seconds, millis / 10),
        TimeFormat::Lrc => format!("{:02}:{:02}.{:02}", ms / 60_000, seconds, millis / 10),
    }
}

/// Digit-only group as a number; an absent optional group counts as zero,
/// a value too large for u64 is `None`
fn number(caps: &regex::Captures, idx: usize) -> Option<u64> {
    caps.get(idx).map_or(Some(0), |m| m.as_str().parse().ok())
}
