/*!
 * # subcondense - condensed audio and subtitles from dialogue
 *
 * A Rust library that derives the speech periods of a video from its
 * subtitles and pairs videos with their subtitle files.
 *
 * ## Features
 *
 * - Parse SRT, WebVTT and ASS/SSA subtitles with per-entry error recovery
 * - Filter non-speech entries, pad and merge dialogue into speech periods
 * - Re-time subtitles onto the condensed timeline (SRT or LRC output)
 * - Match videos to subtitles by filename, including across sequential and
 *   seasonal episode numbering
 * - Cut and re-encode the matching audio through an external transcoder
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `timecode`: Timestamp conversion for every supported dialect
 * - `subtitle_processor`: Dialect detection and parsing
 * - `periods`: Filtering, padding and merging into speech periods
 * - `condensed`: Condensed subtitle rebuilding
 * - `matching`: Video/subtitle pairing:
 *   - `matching::filename`: Filename analysis
 *   - `matching::scorer`: Pair scoring
 *   - `matching::season_map`: Cross-format episode mapping
 *   - `matching::orchestrator`: Batch assignment
 * - `audio`: Audio transcoder boundary
 * - `app_config`: Configuration management
 * - `file_utils`: File system operations
 * - `app_controller`: Folder-level workflow
 * - `errors`: Custom error types
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod audio;
pub mod condensed;
pub mod errors;
pub mod file_utils;
pub mod matching;
pub mod periods;
pub mod subtitle_processor;
pub mod timecode;

// Re-export main types for easier usage
pub use app_config::Config;
pub use condensed::{create_condensed_subtitles, CondensedFormat};
pub use errors::{AppError, AudioError, SubtitleError};
pub use matching::{analyze_filename, find_matches_for_batch, FilenameAnalysis, MatchKind, MatchResult};
pub use periods::{extract_periods, Period};
pub use subtitle_processor::{SubtitleCollection, SubtitleEntry, SubtitleFormat};
