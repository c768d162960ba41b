use std::collections::BTreeSet;
use serde::Serialize;
use super::filename::FilenameAnalysis;
use super::season_map::{MappingDirection, SeasonMapping};

// @module: Scoring of video/subtitle filename pairs

/// How a match was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MatchKind {
    /// `base name + suffix + extension` matched exactly
    Exact,
    /// Episode identities agree as written
    Direct,
    /// Episode identities agree after seasonal/sequential translation
    CrossFormat,
}

/// A scored subtitle for one video
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchCandidate {
    /// Index into the batch's subtitle list
    pub subtitle_ref: usize,
    /// 0 to 100
    pub score: u8,
    pub kind: MatchKind,
}

const DIRECT_BASE: i32 = 50;
const CROSS_FORMAT_BASE: i32 = 45;
const DIRECT_TITLE_WEIGHT: f64 = 20.0;
const CROSS_FORMAT_TITLE_WEIGHT: f64 = 15.0;
const CROSS_FORMAT_BONUS: i32 = 5;
const SEASON_AGREE: i32 = 20;
const SEASON_DISAGREE: i32 = -10;
const SAME_PATTERN_BONUS: i32 = 5;
const LOW_CONFIDENCE_PENALTY: i32 = -10;
const LOW_CONFIDENCE_THRESHOLD: f64 = 0.8;

/// |A ∩ B| / |A ∪ B|, zero when both sets are empty
pub fn jaccard_similarity(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

/// Score a pair using episode numbers exactly as written.
///
/// Any episode mismatch, or a missing episode on either side, scores 0 no
/// matter how similar the titles are.
pub fn score_direct(video: &FilenameAnalysis, subtitle: &FilenameAnalysis) -> u8 {
    match (video.episode, subtitle.episode) {
        (Some(a), Some(b)) if a == b => {}
        _ => return 0,
    }

    let mut score = DIRECT_BASE;
    if let (Some(a), Some(b)) = (video.season, subtitle.season) {
        score += if a == b { SEASON_AGREE } else { SEASON_DISAGREE };
    }
    score += title_points(video, subtitle, DIRECT_TITLE_WEIGHT);
    score += shared_adjustments(video, subtitle);

    clamp_score(score)
}

/// Score a pair after translating the seasonal side into the other side's numbering.
///
/// Returns 0 when the translation is not possible or the identities still differ.
pub fn score_cross_format(video: &FilenameAnalysis, subtitle: &FilenameAnalysis, mapping: &SeasonMapping) -> u8 {
    let identities_agree = match mapping.direction {
        MappingDirection::SeasonalToSequential => match (video.season, video.episode, subtitle.season, subtitle.episode) {
            (Some(season), Some(episode), None, Some(sequential)) => {
                mapping.to_sequential(season, episode) == Some(sequential)
            }
            _ => false,
        },
        MappingDirection::SequentialToSeasonal => match (video.season, video.episode, subtitle.season, subtitle.episode) {
            (None, Some(sequential), Some(season), Some(episode)) => {
                mapping.to_season_episode(sequential) == Some((season, episode))
            }
            _ => false,
        },
    };
    if !identities_agree {
        return 0;
    }

    let mut score = CROSS_FORMAT_BASE + CROSS_FORMAT_BONUS;
    score += title_points(video, subtitle, CROSS_FORMAT_TITLE_WEIGHT);
    score += shared_adjustments(video, subtitle);

    clamp_score(score)
}

fn title_points(video: &FilenameAnalysis, subtitle: &FilenameAnalysis, weight: f64) -> i32 {
    (weight * jaccard_similarity(&video.title_tokens, &subtitle.title_tokens)).round() as i32
}

fn shared_adjustments(video: &FilenameAnalysis, subtitle: &FilenameAnalysis) -> i32 {
    let mut adjustment = 0;
    if video.pattern_rank.is_some() && video.pattern_rank == subtitle.pattern_rank {
        adjustment += SAME_PATTERN_BONUS;
    }
    if video.confidence < LOW_CONFIDENCE_THRESHOLD || subtitle.confidence < LOW_CONFIDENCE_THRESHOLD {
        adjustment += LOW_CONFIDENCE_PENALTY;
    }
    adjustment
}

fn clamp_score(score: i32) -> u8 {
    score.clamp(0, 100) as u8
}
