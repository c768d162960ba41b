/*!
 * Filename analysis.
 *
 * Extracts a normalized set of title tokens and an episode/season identity
 * from a video or subtitle filename. Episode patterns are tried from most to
 * least specific; the first one that yields a usable number wins and its rank
 * sets the base confidence.
 */

use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use regex::Regex;
use once_cell::sync::Lazy;
use serde::Serialize;

/// Result of analyzing one filename
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilenameAnalysis {
    pub original_name: String,
    pub title_tokens: BTreeSet<String>,
    pub episode: Option<u32>,
    pub season: Option<u32>,
    /// Rank of the pattern that matched, 0 is the most specific
    pub pattern_rank: Option<u8>,
    /// In [0, 1]
    pub confidence: f64,
}

impl FilenameAnalysis {
    /// Episode present without a season
    pub fn is_sequential(&self) -> bool {
        self.episode.is_some() && self.season.is_none()
    }

    /// Both season and episode present
    pub fn is_seasonal(&self) -> bool {
        self.episode.is_some() && self.season.is_some()
    }
}

/// One step of the episode pattern cascade
struct EpisodePattern {
    rank: u8,
    regex: Regex,
    season_group: Option<usize>,
    episode_group: usize,
    /// The surrounding text already says "this is an episode", so a
    /// year-shaped number is taken at face value
    explicit_context: bool,
}

impl EpisodePattern {
    fn new(rank: u8, pattern: &str, season_group: Option<usize>, episode_group: usize, explicit_context: bool) -> Self {
        Self {
            rank,
            regex: Regex::new(pattern).unwrap(),
            season_group,
            episode_group,
            explicit_context,
        }
    }
}

// @const: Episode patterns, most specific first
static EPISODE_PATTERNS: Lazy<Vec<EpisodePattern>> = Lazy::new(|| {
    vec![
        EpisodePattern::new(0, r"(?i)\bs(\d{1,2})\s?e(\d{1,4})\b", Some(1), 2, true),
        EpisodePattern::new(1, r"(?i)\bseason\s*(\d{1,2})\b.*?\bepisode\s*(\d{1,4})\b", Some(1), 2, true),
        EpisodePattern::new(2, r"(?i)\b(\d{1,2})x(\d{1,3})\b", Some(1), 2, true),
        EpisodePattern::new(3, r"\[(\d{1,4})\]", None, 1, false),
        EpisodePattern::new(4, r"\((\d{1,4})\)", None, 1, false),
        EpisodePattern::new(5, r"(?i)\b(?:episode|ep|e)\.?\s*(\d{1,4})\b", None, 1, true),
        EpisodePattern::new(6, r"\b(\d{2,3})\b", None, 1, false),
        EpisodePattern::new(7, r"\b(\d)\b", None, 1, false),
    ]
});

// @const: Extension-stripped name separators
static SEPARATOR_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\[\]_\-.]+").unwrap()
});

// @const: Whitespace runs
static WHITESPACE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s+").unwrap()
});

// @const: Token splitter for title extraction
static TOKEN_SPLIT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\s\[\]_\-.()（）{},+&!?'~]+").unwrap()
});

// @const: Release noise dropped from title tokens
static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        // resolution
        "480p", "576p", "720p", "1080p", "1080i", "2160p", "4k", "uhd", "hd", "fhd", "sd",
        // video codec
        "x264", "x265", "h264", "h265", "hevc", "avc", "xvid", "divx", "av1", "vp9", "10bit", "8bit", "hdr",
        // audio codec
        "aac", "ac3", "eac3", "dts", "flac", "mp3", "opus", "ddp", "dd", "truehd", "atmos", "2ch", "6ch",
        // source
        "bluray", "bdrip", "brrip", "bd", "webrip", "web", "webdl", "dl", "hdtv", "dvdrip", "dvd", "remux",
        // language and subtitle markers
        "en", "eng", "english", "ja", "jp", "jpn", "japanese", "es", "spa", "fr", "fre", "de", "ger",
        "it", "pt", "ru", "zh", "chi", "chs", "cht", "ko", "kor", "sub", "subs", "subbed", "dub", "dual",
        "multi",
        // release markers
        "proper", "repack", "batch", "complete", "uncut", "raw", "v2", "v3", "final",
    ]
    .into_iter()
    .collect()
});

const MIN_PLAUSIBLE_EPISODE: u32 = 1;
const MAX_PLAUSIBLE_EPISODE: u32 = 999;
const YEAR_RANGE: (u32, u32) = (1900, 2030);

/// Analyze a filename for title tokens and episode identity
pub fn analyze_filename(name: &str) -> FilenameAnalysis {
    let stem = strip_extension(name);

    // Brackets are still needed for the cascade, so only the softer
    // separators are normalized before matching
    let candidate_name = collapse_whitespace(&stem.replace(['_', '.'], " "));
    let found = find_episode(&candidate_name);

    let (episode, season, pattern_rank, confidence, title_source) = match found {
        Some(found) => {
            let mut remainder = candidate_name.clone();
            remainder.replace_range(found.span.0..found.span.1, " ");
            (Some(found.episode), found.season, Some(found.rank), found.confidence, strip_episode_patterns(&remainder))
        }
        None => (None, None, None, 0.0, strip_episode_patterns(&candidate_name)),
    };

    FilenameAnalysis {
        original_name: name.to_string(),
        title_tokens: title_tokens(&title_source),
        episode,
        season,
        pattern_rank,
        confidence,
    }
}

/// Replace bracket, underscore and dash separators with spaces and collapse whitespace
pub fn normalize_separators(name: &str) -> String {
    collapse_whitespace(&SEPARATOR_REGEX.replace_all(name, " "))
}

fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_REGEX.replace_all(text, " ").trim().to_string()
}

fn strip_extension(name: &str) -> String {
    let file_name = Path::new(name)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| name.to_string());

    match file_name.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty()
                && (1..=5).contains(&ext.len())
                && ext.chars().all(|c| c.is_ascii_alphanumeric())
                && !ext.chars().all(|c| c.is_ascii_digit()) =>
        {
            stem.to_string()
        }
        _ => file_name,
    }
}

/// Remove every substring any cascade pattern matches, not only the winner
fn strip_episode_patterns(name: &str) -> String {
    EPISODE_PATTERNS
        .iter()
        .fold(name.to_string(), |remaining, pattern| pattern.regex.replace_all(&remaining, " ").into_owned())
}

struct EpisodeMatch {
    rank: u8,
    episode: u32,
    season: Option<u32>,
    confidence: f64,
    span: (usize, usize),
}

fn find_episode(name: &str) -> Option<EpisodeMatch> {
    for pattern in EPISODE_PATTERNS.iter() {
        for caps in pattern.regex.captures_iter(name) {
            let Some(episode) = caps.get(pattern.episode_group).and_then(|m| m.as_str().parse::<u32>().ok()) else {
                continue;
            };
            if !pattern.explicit_context && is_probable_year(episode) {
                continue;
            }

            let season = pattern
                .season_group
                .and_then(|group| caps.get(group))
                .and_then(|m| m.as_str().parse::<u32>().ok());

            // Tenths keep the confidence arithmetic exact
            let bonus = u8::from(is_plausible_episode(episode));
            let tenths = (10 - i32::from(pattern.rank) + i32::from(bonus)).clamp(0, 10);
            let whole = caps.get(0)?;

            return Some(EpisodeMatch {
                rank: pattern.rank,
                episode,
                season,
                confidence: f64::from(tenths) / 10.0,
                span: (whole.start(), whole.end()),
            });
        }
    }
    None
}

fn is_plausible_episode(value: u32) -> bool {
    (MIN_PLAUSIBLE_EPISODE..=MAX_PLAUSIBLE_EPISODE).contains(&value) && !is_probable_year(value)
}

fn is_probable_year(value: u32) -> bool {
    (YEAR_RANGE.0..=YEAR_RANGE.1).contains(&value)
}

fn title_tokens(text: &str) -> BTreeSet<String> {
    let lowered = normalize_separators(text).to_lowercase();
    TOKEN_SPLIT_REGEX
        .split(&lowered)
        .filter(|token| !token.is_empty())
        .filter(|token| !token.chars().all(|c| c.is_ascii_digit()))
        .filter(|token| !STOP_WORDS.contains(*token))
        .map(str::to_string)
        .collect()
}
