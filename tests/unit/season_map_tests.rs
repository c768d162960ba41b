/*!
 * Tests for the cross-format episode mapping
 */

use subcondense::matching::filename::analyze_filename;
use subcondense::matching::season_map::{detect_direction, MappingDirection, SeasonMapping};
use subcondense::matching::FilenameAnalysis;

fn analyze_all(names: &[String]) -> Vec<FilenameAnalysis> {
    names.iter().map(|n| analyze_filename(n)).collect()
}

fn seasonal_names(seasons: &[(u32, u32)]) -> Vec<String> {
    seasons
        .iter()
        .flat_map(|&(season, count)| (1..=count).map(move |e| format!("Show S{:02}E{:02}.mkv", season, e)))
        .collect()
}

fn sequential_names(count: u32, ext: &str) -> Vec<String> {
    (1..=count).map(|e| format!("Show - {:02}.{}", e, ext)).collect()
}

/// Test that a seasonal video side and sequential subtitle side is detected
#[test]
fn test_detect_direction_withSeasonalVideos_shouldMapToSequential() {
    let videos = analyze_all(&seasonal_names(&[(1, 2)]));
    let subtitles = analyze_all(&sequential_names(2, "srt"));

    assert_eq!(detect_direction(&videos, &subtitles), Some(MappingDirection::SeasonalToSequential));
    assert_eq!(detect_direction(&subtitles, &videos), Some(MappingDirection::SequentialToSeasonal));
}

/// Test that no mapping is built when both sides share a numbering scheme
#[test]
fn test_build_withMatchingSchemes_shouldReturnNone() {
    let seasonal = analyze_all(&seasonal_names(&[(1, 3)]));
    let sequential = analyze_all(&sequential_names(3, "srt"));

    assert!(SeasonMapping::build(&seasonal, &seasonal).is_none());
    assert!(SeasonMapping::build(&sequential, &sequential).is_none());
}

/// Test that a side mixing both schemes is not treated as purely sequential
#[test]
fn test_build_withMixedSubtitleSide_shouldReturnNone() {
    let videos = analyze_all(&seasonal_names(&[(1, 2)]));
    let mut subtitle_names = sequential_names(2, "srt");
    subtitle_names.push("Show S01E02.srt".to_string());
    let subtitles = analyze_all(&subtitle_names);

    assert!(SeasonMapping::build(&videos, &subtitles).is_none());
}

/// Test the flattened numbering across seasons
#[test]
fn test_build_withTwoSeasons_shouldNumberContinuously() {
    let videos = analyze_all(&seasonal_names(&[(1, 13), (2, 3)]));
    let subtitles = analyze_all(&sequential_names(16, "ass"));

    let mapping = SeasonMapping::build(&videos, &subtitles).unwrap();

    assert_eq!(mapping.direction, MappingDirection::SeasonalToSequential);
    assert_eq!(mapping.per_season_episode_count.get(&1), Some(&13));
    assert_eq!(mapping.per_season_episode_count.get(&2), Some(&3));
    assert_eq!(mapping.to_sequential(1, 1), Some(1));
    assert_eq!(mapping.to_sequential(1, 13), Some(13));
    assert_eq!(mapping.to_sequential(2, 1), Some(14));
    assert_eq!(mapping.to_sequential(2, 3), Some(16));
    assert_eq!(mapping.to_sequential(3, 1), None);
    assert_eq!(mapping.to_season_episode(15), Some((2, 2)));
    assert_eq!(mapping.to_season_episode(17), None);
}

/// Test that the two directions of the mapping are inverse to each other
#[test]
fn test_build_withAnyBatch_shouldBeBijective() {
    let videos = analyze_all(&sequential_names(20, "mkv"));
    let subtitles = analyze_all(&seasonal_names(&[(1, 12), (2, 8)]));

    let mapping = SeasonMapping::build(&videos, &subtitles).unwrap();

    assert_eq!(mapping.direction, MappingDirection::SequentialToSeasonal);
    assert_eq!(mapping.season_episode_to_sequential.len(), mapping.sequential_to_season_episode.len());
    for (&(season, episode), &sequential) in &mapping.season_episode_to_sequential {
        assert_eq!(mapping.to_season_episode(sequential), Some((season, episode)));
    }
}

/// Test that a missing episode is filled in rather than corrected
#[test]
fn test_build_withGapInSeason_shouldAssumeGaplessNumbering() {
    let video_names = vec!["Show S01E01.mkv".to_string(), "Show S01E04.mkv".to_string(), "Show S02E01.mkv".to_string()];
    let videos = analyze_all(&video_names);
    let subtitles = analyze_all(&sequential_names(5, "srt"));

    let mapping = SeasonMapping::build(&videos, &subtitles).unwrap();

    assert_eq!(mapping.per_season_episode_count.get(&1), Some(&4));
    assert_eq!(mapping.to_sequential(2, 1), Some(5));
}
