use std::path::Path;
use log::{debug, info, warn};
use serde::Serialize;
use crate::app_config::Config;
use crate::file_utils::SUBTITLE_EXTENSIONS;
use super::filename::{analyze_filename, FilenameAnalysis};
use super::scorer::{score_cross_format, score_direct, MatchCandidate, MatchKind};
use super::season_map::SeasonMapping;

// @module: Batch assignment of subtitles to videos

/// Outcome for one video. A missing subtitle is a normal result, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub video: String,
    pub subtitle: Option<String>,
    pub kind: Option<MatchKind>,
    /// 100 for exact matches
    pub score: Option<u8>,
}

/// Assign each video at most one subtitle.
///
/// Exact name matches are taken first for every video. The remaining videos
/// are then scored greedily in input order, so a subtitle that two videos
/// could use goes to the earlier one. No subtitle is used twice.
pub fn find_matches_for_batch<V, S>(video_names: &[V], subtitle_names: &[S], config: &Config) -> Vec<MatchResult>
where
    V: AsRef<str>,
    S: AsRef<str>,
{
    let mut consumed = vec![false; subtitle_names.len()];
    let mut assigned: Vec<Option<MatchCandidate>> = vec![None; video_names.len()];

    for (video_idx, video) in video_names.iter().enumerate() {
        if let Some(subtitle_ref) = find_exact_match(video.as_ref(), subtitle_names, &consumed, &config.subtitle_suffix) {
            consumed[subtitle_ref] = true;
            assigned[video_idx] = Some(MatchCandidate {
                subtitle_ref,
                score: 100,
                kind: MatchKind::Exact,
            });
        }
    }

    let video_analyses: Vec<FilenameAnalysis> = video_names.iter().map(|v| analyze_filename(v.as_ref())).collect();
    let subtitle_analyses: Vec<FilenameAnalysis> = subtitle_names.iter().map(|s| analyze_filename(s.as_ref())).collect();
    let mapping = SeasonMapping::build(&video_analyses, &subtitle_analyses);
    if let Some(mapping) = &mapping {
        info!("Mixed episode numbering detected, using {:?} mapping", mapping.direction);
    }

    for (video_idx, video) in video_analyses.iter().enumerate() {
        if assigned[video_idx].is_some() {
            continue;
        }

        let best = best_candidate(video, &subtitle_analyses, &consumed, mapping.as_ref(), config.minimum_match_score);
        if let Some(candidate) = best {
            consumed[candidate.subtitle_ref] = true;
            assigned[video_idx] = Some(candidate);
        }
    }

    video_names
        .iter()
        .zip(assigned)
        .map(|(video, candidate)| {
            let video = video.as_ref().to_string();
            match candidate {
                Some(candidate) => {
                    let subtitle = subtitle_names[candidate.subtitle_ref].as_ref().to_string();
                    info!("Matched {} -> {} ({:?}, score {})", video, subtitle, candidate.kind, candidate.score);
                    MatchResult {
                        video,
                        subtitle: Some(subtitle),
                        kind: Some(candidate.kind),
                        score: Some(candidate.score),
                    }
                }
                None => {
                    warn!("No subtitle match found for {}", video);
                    MatchResult {
                        video,
                        subtitle: None,
                        kind: None,
                        score: None,
                    }
                }
            }
        })
        .collect()
}

/// Look for `base name + suffix + extension` among the unconsumed subtitles
fn find_exact_match<S: AsRef<str>>(video: &str, subtitle_names: &[S], consumed: &[bool], suffix: &str) -> Option<usize> {
    let base = Path::new(video).file_stem()?.to_string_lossy().to_string();

    SUBTITLE_EXTENSIONS.iter().find_map(|ext| {
        let expected = format!("{}{}.{}", base, suffix, ext);
        subtitle_names
            .iter()
            .enumerate()
            .find(|(idx, name)| !consumed[*idx] && file_name_of(name.as_ref()) == expected)
            .map(|(idx, _)| idx)
    })
}

fn file_name_of(name: &str) -> String {
    Path::new(name)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| name.to_string())
}

/// Pick the best acceptable candidate. Cross-format scores are only computed
/// when the best direct score falls below the threshold. Ties go to the
/// earlier subtitle, direct before cross-format.
fn best_candidate(
    video: &FilenameAnalysis,
    subtitles: &[FilenameAnalysis],
    consumed: &[bool],
    mapping: Option<&SeasonMapping>,
    threshold: u8,
) -> Option<MatchCandidate> {
    let available = || subtitles.iter().enumerate().filter(|(idx, _)| !consumed[*idx]);

    let mut pool: Vec<MatchCandidate> = available()
        .map(|(subtitle_ref, subtitle)| MatchCandidate {
            subtitle_ref,
            score: score_direct(video, subtitle),
            kind: MatchKind::Direct,
        })
        .collect();

    let best_direct = pool.iter().map(|c| c.score).max().unwrap_or(0);
    if best_direct < threshold {
        if let Some(mapping) = mapping {
            pool.extend(available().map(|(subtitle_ref, subtitle)| MatchCandidate {
                subtitle_ref,
                score: score_cross_format(video, subtitle, mapping),
                kind: MatchKind::CrossFormat,
            }));
        }
    }

    let mut best: Option<MatchCandidate> = None;
    for candidate in pool.into_iter().filter(|c| c.score >= threshold) {
        if best.is_none_or(|b| candidate.score > b.score) {
            best = Some(candidate);
        }
    }

    if best.is_none() {
        debug!("Best score for {} was {}, below threshold {}", video.original_name, best_direct, threshold);
    }
    best
}
