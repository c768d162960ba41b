/*!
 * Video/subtitle pairing.
 *
 * This module pairs each video in a batch with its subtitle even when the
 * filenames diverge:
 * - `filename`: Title token and episode/season extraction
 * - `scorer`: Scoring of one video/subtitle pair
 * - `season_map`: Seasonal vs. sequential episode numbering bijection
 * - `orchestrator`: Greedy, input-ordered batch assignment
 */

pub mod filename;
pub mod orchestrator;
pub mod scorer;
pub mod season_map;

pub use filename::{analyze_filename, FilenameAnalysis};
pub use orchestrator::{find_matches_for_batch, MatchResult};
pub use scorer::{jaccard_similarity, score_cross_format, score_direct, MatchCandidate, MatchKind};
pub use season_map::{MappingDirection, SeasonMapping};
