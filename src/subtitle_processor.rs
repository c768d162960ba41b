use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use regex::Regex;
use once_cell::sync::Lazy;
use anyhow::{Context, Result};
use log::{debug, warn};
use crate::errors::SubtitleError;
use crate::timecode::{self, TimeFormat};

// @module: Subtitle parsing for SRT, WebVTT and ASS/SSA

// @const: SRT timing line, settings after the end stamp are ignored
static SRT_TIMING_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\S+)\s*-->\s*(\S+)").unwrap()
});

// @const: WebVTT cue timing line
static VTT_TIMING_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*((?:\d+:)?\d{2}:\d{2}\.\d{3})\s+-->\s+((?:\d+:)?\d{2}:\d{2}\.\d{3})").unwrap()
});

// @const: ASS inline override block
static ASS_OVERRIDE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{[^}]*\}").unwrap()
});

/// Number of commas that precede the text field of an ASS `Dialogue:` line
const ASS_TEXT_FIELD_INDEX: usize = 9;

// @struct: Single dialogue entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleEntry {
    // @field: Sequence number, reassigned from 1
    pub seq_num: usize,

    // @field: Start time in ms
    pub start_time_ms: u64,

    // @field: End time in ms
    pub end_time_ms: u64,

    // @field: Subtitle text, lines joined with '\n'
    pub text: String,
}

impl SubtitleEntry {
    /// Creates a new subtitle entry
    pub fn new(seq_num: usize, start_time_ms: u64, end_time_ms: u64, text: String) -> Self {
        SubtitleEntry {
            seq_num,
            start_time_ms,
            end_time_ms,
            text,
        }
    }

    pub fn duration_ms(&self) -> u64 {
        self.end_time_ms - self.start_time_ms
    }

    /// Convert start time to formatted SRT timestamp
    pub fn format_start_time(&self) -> String {
        timecode::format_timestamp(self.start_time_ms, TimeFormat::Srt)
    }

    /// Convert end time to formatted SRT timestamp
    pub fn format_end_time(&self) -> String {
        timecode::format_timestamp(self.end_time_ms, TimeFormat::Srt)
    }
}

impl fmt::Display for SubtitleEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.seq_num)?;
        writeln!(f, "{} --> {}", self.format_start_time(), self.format_end_time())?;
        writeln!(f, "{}", self.text)?;
        writeln!(f)
    }
}

/// Subtitle dialects the parser understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtitleFormat {
    Srt,
    Vtt,
    /// ASS and SSA share one grammar for dialogue lines
    Ass,
}

impl fmt::Display for SubtitleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Srt => write!(f, "srt"),
            Self::Vtt => write!(f, "vtt"),
            Self::Ass => write!(f, "ass"),
        }
    }
}

/// Detect the dialect of subtitle content. Anything unrecognized is treated as SRT.
pub fn detect_format(content: &str) -> SubtitleFormat {
    let content = normalize_content(content);
    if content.trim_start().starts_with("WEBVTT") {
        SubtitleFormat::Vtt
    } else if content.contains("[Script Info]") || content.contains("[V4+ Styles]") {
        SubtitleFormat::Ass
    } else {
        SubtitleFormat::Srt
    }
}

/// Detect the dialect and parse the content into ordered entries
pub fn parse_subtitles(content: &str) -> Result<Vec<SubtitleEntry>, SubtitleError> {
    match detect_format(content) {
        SubtitleFormat::Srt => parse_srt(content),
        SubtitleFormat::Vtt => parse_vtt(content),
        SubtitleFormat::Ass => parse_ass(content),
    }
}

/// Parse SRT content.
///
/// A block needs an index line, a timing line and at least one text line.
/// Malformed blocks are skipped and the parse carries on.
pub fn parse_srt(content: &str) -> Result<Vec<SubtitleEntry>, SubtitleError> {
    let content = normalize_content(content);
    let mut entries = Vec::new();
    let mut block: Vec<&str> = Vec::new();

    for line in content.lines().chain(std::iter::once("")) {
        if !line.trim().is_empty() {
            block.push(line.trim_end());
            continue;
        }
        if block.is_empty() {
            continue;
        }

        match parse_srt_block(&block) {
            Ok(Some((start, end, text))) => {
                entries.push(SubtitleEntry::new(entries.len() + 1, start, end, text));
            }
            Ok(None) => debug!("Skipping malformed SRT block starting with '{}'", block[0]),
            Err(e) => debug!("Skipping SRT block '{}': {}", block[0], e),
        }
        block.clear();
    }

    finish(entries)
}

fn parse_srt_block(block: &[&str]) -> Result<Option<(u64, u64, String)>, SubtitleError> {
    if block.len() < 3 || block[0].trim().parse::<u64>().is_err() {
        return Ok(None);
    }
    let Some(caps) = SRT_TIMING_REGEX.captures(block[1]) else {
        return Ok(None);
    };

    let start = timecode::parse_timestamp(&caps[1], TimeFormat::Srt)?;
    let end = timecode::parse_timestamp(&caps[2], TimeFormat::Srt)?;
    if end < start {
        return Ok(None);
    }

    Ok(Some((start, end, block[2..].join("\n"))))
}

/// Parse WebVTT content.
///
/// Lines before the first cue timing are ignored. Cue text runs from the timing
/// line to the next blank line or timing line, whichever comes first. Stopping
/// at the blank line keeps the next cue's identifier out of the text, so stray
/// lines between cues are dropped rather than appended.
pub fn parse_vtt(content: &str) -> Result<Vec<SubtitleEntry>, SubtitleError> {
    let content = normalize_content(content);
    let mut entries = Vec::new();
    let mut current: Option<(u64, u64)> = None;
    let mut text_lines: Vec<&str> = Vec::new();
    let mut accepting_text = false;

    for line in content.lines() {
        let trimmed = line.trim();

        if let Some(caps) = VTT_TIMING_REGEX.captures(trimmed) {
            push_cue(&mut entries, current.take(), &mut text_lines);
            let start = timecode::parse_timestamp(&caps[1], TimeFormat::Vtt);
            let end = timecode::parse_timestamp(&caps[2], TimeFormat::Vtt);
            match (start, end) {
                (Ok(start), Ok(end)) if start <= end => current = Some((start, end)),
                (Err(e), _) | (_, Err(e)) => debug!("Skipping VTT cue: {}", e),
                _ => debug!("Skipping VTT cue with inverted timing: {}", trimmed),
            }
            accepting_text = true;
            continue;
        }

        if trimmed.is_empty() {
            accepting_text = false;
            continue;
        }
        if trimmed.starts_with("WEBVTT") || trimmed.starts_with("NOTE") {
            continue;
        }
        if accepting_text && current.is_some() {
            text_lines.push(trimmed);
        }
    }
    push_cue(&mut entries, current.take(), &mut text_lines);

    finish(entries)
}

fn push_cue(entries: &mut Vec<SubtitleEntry>, timing: Option<(u64, u64)>, text_lines: &mut Vec<&str>) {
    if let Some((start, end)) = timing {
        if !text_lines.is_empty() {
            entries.push(SubtitleEntry::new(entries.len() + 1, start, end, text_lines.join("\n")));
        }
    }
    text_lines.clear();
}

/// Parse ASS/SSA content.
///
/// Only `Dialogue:` lines are read. The text field is everything after the
/// ninth comma, so a comma inside an earlier field shifts the fields.
pub fn parse_ass(content: &str) -> Result<Vec<SubtitleEntry>, SubtitleError> {
    let content = normalize_content(content);
    let mut entries = Vec::new();

    for line in content.lines() {
        let Some(body) = line.trim_start().strip_prefix("Dialogue:") else {
            continue;
        };

        let fields: Vec<&str> = body.split(',').collect();
        if fields.len() <= ASS_TEXT_FIELD_INDEX {
            debug!("Skipping ASS dialogue line with {} fields", fields.len());
            continue;
        }

        let timing = timecode::parse_timestamp(fields[1], TimeFormat::Ass)
            .and_then(|start| Ok((start, timecode::parse_timestamp(fields[2], TimeFormat::Ass)?)));
        let (start, end) = match timing {
            Ok((start, end)) if start <= end => (start, end),
            Ok(_) => {
                debug!("Skipping ASS dialogue with inverted timing: {}", line);
                continue;
            }
            Err(e) => {
                debug!("Skipping ASS dialogue: {}", e);
                continue;
            }
        };

        let raw_text = fields[ASS_TEXT_FIELD_INDEX..].join(",");
        let text = clean_ass_text(&raw_text);
        if text.is_empty() {
            continue;
        }

        entries.push(SubtitleEntry::new(entries.len() + 1, start, end, text));
    }

    finish(entries)
}

fn clean_ass_text(raw: &str) -> String {
    let stripped = ASS_OVERRIDE_REGEX.replace_all(raw, "");
    stripped
        .replace("\\N", "\n")
        .replace("\\n", "\n")
        .replace("\\h", " ")
        .trim()
        .to_string()
}

fn normalize_content(content: &str) -> String {
    content.trim_start_matches('\u{feff}').replace("\r\n", "\n").replace('\r', "\n")
}

fn finish(entries: Vec<SubtitleEntry>) -> Result<Vec<SubtitleEntry>, SubtitleError> {
    if entries.is_empty() {
        warn!("No valid subtitle entries found in content");
        return Err(SubtitleError::Parse("no entries found".to_string()));
    }
    Ok(entries)
}

/// Collection of subtitle entries with metadata
#[derive(Debug)]
pub struct SubtitleCollection {
    /// Source filename
    pub source_file: PathBuf,

    /// Detected dialect
    pub format: SubtitleFormat,

    /// List of subtitle entries
    pub entries: Vec<SubtitleEntry>,
}

impl SubtitleCollection {
    /// Read and parse a subtitle file, detecting its dialect
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read subtitle file: {:?}", path))?;
        let format = detect_format(&content);
        let entries = parse_subtitles(&content)
            .with_context(|| format!("Failed to parse subtitle file: {:?}", path))?;

        debug!("Parsed {} {} entries from {:?}", entries.len(), format, path);

        Ok(SubtitleCollection {
            source_file: path.to_path_buf(),
            format,
            entries,
        })
    }

    /// Serialize the entries as SRT
    pub fn to_srt_string(&self) -> String {
        self.entries.iter().map(|entry| entry.to_string()).collect()
    }
}

impl fmt::Display for SubtitleCollection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Subtitle Collection")?;
        writeln!(f, "Source: {:?}", self.source_file)?;
        writeln!(f, "Format: {}", self.format)?;
        writeln!(f, "Entries: {}", self.entries.len())?;
        Ok(())
    }
}
