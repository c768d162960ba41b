use std::collections::BTreeMap;
use log::debug;
use serde::Serialize;
use super::filename::FilenameAnalysis;

// @module: Batch-wide mapping between seasonal and sequential episode numbering

/// Which side of the batch carries the seasonal numbering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MappingDirection {
    /// Videos are numbered by season, subtitles sequentially
    SeasonalToSequential,
    /// Videos are numbered sequentially, subtitles by season
    SequentialToSeasonal,
}

/// Bijection between (season, episode) and a flattened episode counter.
///
/// Built once per batch from the seasonal side. Each season is assumed to run
/// gaplessly from episode 1 to the highest episode seen; a gap shifts every
/// later sequential number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonMapping {
    pub direction: MappingDirection,
    pub season_episode_to_sequential: BTreeMap<(u32, u32), u32>,
    pub sequential_to_season_episode: BTreeMap<u32, (u32, u32)>,
    pub per_season_episode_count: BTreeMap<u32, u32>,
}

impl SeasonMapping {
    /// Build a mapping when one side of the batch is purely sequential and the
    /// other is seasonal. Returns `None` otherwise.
    pub fn build(videos: &[FilenameAnalysis], subtitles: &[FilenameAnalysis]) -> Option<Self> {
        let direction = detect_direction(videos, subtitles)?;
        let seasonal_side = match direction {
            MappingDirection::SeasonalToSequential => videos,
            MappingDirection::SequentialToSeasonal => subtitles,
        };

        let mut episodes_by_season: BTreeMap<u32, Vec<u32>> = BTreeMap::new();
        for analysis in seasonal_side {
            if let (Some(season), Some(episode)) = (analysis.season, analysis.episode) {
                episodes_by_season.entry(season).or_default().push(episode);
            }
        }

        let mut mapping = SeasonMapping {
            direction,
            season_episode_to_sequential: BTreeMap::new(),
            sequential_to_season_episode: BTreeMap::new(),
            per_season_episode_count: BTreeMap::new(),
        };

        let mut counter = 1u32;
        for (season, mut episodes) in episodes_by_season {
            episodes.sort_unstable();
            let count = episodes.last().copied().unwrap_or(0);
            mapping.per_season_episode_count.insert(season, count);

            for episode in 1..=count {
                mapping.season_episode_to_sequential.insert((season, episode), counter);
                mapping.sequential_to_season_episode.insert(counter, (season, episode));
                counter += 1;
            }
        }

        debug!(
            "Built {:?} season mapping over {} seasons ({} episodes)",
            mapping.direction,
            mapping.per_season_episode_count.len(),
            counter - 1
        );
        Some(mapping)
    }

    pub fn to_sequential(&self, season: u32, episode: u32) -> Option<u32> {
        self.season_episode_to_sequential.get(&(season, episode)).copied()
    }

    pub fn to_season_episode(&self, sequential: u32) -> Option<(u32, u32)> {
        self.sequential_to_season_episode.get(&sequential).copied()
    }
}

/// Decide whether the batch mixes numbering schemes.
///
/// This looks at each side as a whole: a side is purely sequential when it has
/// sequential entries and no seasonal ones.
pub fn detect_direction(videos: &[FilenameAnalysis], subtitles: &[FilenameAnalysis]) -> Option<MappingDirection> {
    let purely_sequential = |side: &[FilenameAnalysis]| {
        side.iter().any(FilenameAnalysis::is_sequential) && !side.iter().any(FilenameAnalysis::is_seasonal)
    };
    let has_seasonal = |side: &[FilenameAnalysis]| side.iter().any(FilenameAnalysis::is_seasonal);

    if has_seasonal(videos) && purely_sequential(subtitles) {
        Some(MappingDirection::SeasonalToSequential)
    } else if purely_sequential(videos) && has_seasonal(subtitles) {
        Some(MappingDirection::SequentialToSeasonal)
    } else {
        None
    }
}
