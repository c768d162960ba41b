/*!
 * Tests for batch video/subtitle matching
 */

use subcondense::app_config::Config;
use subcondense::matching::{find_matches_for_batch, MatchKind, MatchResult};

fn subtitle_of(results: &[MatchResult], video: &str) -> Option<String> {
    results.iter().find(|r| r.video == video).and_then(|r| r.subtitle.clone())
}

/// Test that an exact name match wins over heuristics
#[test]
fn test_find_matches_withExactName_shouldPreferExactMatch() {
    let results = find_matches_for_batch(&["Movie.mkv"], &["Movie S01E01.srt", "Movie.srt"], &Config::default());

    assert_eq!(results, vec![MatchResult {
        video: "Movie.mkv".to_string(),
        subtitle: Some("Movie.srt".to_string()),
        kind: Some(MatchKind::Exact),
        score: Some(100),
    }]);
}

/// Test exact matching with a configured suffix and extension priority
#[test]
fn test_find_matches_withSubtitleSuffix_shouldUseSuffixAndExtensionOrder() {
    let config = Config {
        subtitle_suffix: ".en".to_string(),
        ..Config::default()
    };
    let subtitles = ["/subs/Show S01E01.en.ass", "/subs/Show S01E01.en.srt", "/subs/Show S01E01.srt"];

    let results = find_matches_for_batch(&["/videos/Show S01E01.mkv"], &subtitles, &config);

    assert_eq!(results[0].subtitle.as_deref(), Some("/subs/Show S01E01.en.srt"));
    assert_eq!(results[0].kind, Some(MatchKind::Exact));
}

/// Test the bracketed video scenario
#[test]
fn test_find_matches_withBracketedVideo_shouldAcceptSeasonalSubtitle() {
    let results = find_matches_for_batch(&["Show [01].mkv"], &["Show S01E02.srt", "Show S01E01.srt"], &Config::default());

    assert_eq!(results[0].subtitle.as_deref(), Some("Show S01E01.srt"));
    assert_eq!(results[0].kind, Some(MatchKind::Direct));
    assert!(results[0].score.unwrap() >= 50);
}

/// Test the sequential/seasonal scenario across two seasons
#[test]
fn test_find_matches_withSequentialSubtitles_shouldCrossMapSecondSeason() {
    let mut videos: Vec<String> = (1..=13).map(|e| format!("Show S01E{:02}.mkv", e)).collect();
    videos.push("Show S02E01.mkv".to_string());
    let subtitles: Vec<String> = (1..=14).rev().map(|e| format!("Show Episode {}.srt", e)).collect();

    let results = find_matches_for_batch(&videos, &subtitles, &Config::default());

    assert_eq!(results.len(), 14);
    for (e, result) in results.iter().take(13).enumerate() {
        assert_eq!(result.subtitle, Some(format!("Show Episode {}.srt", e + 1)));
        assert_eq!(result.kind, Some(MatchKind::Direct));
    }
    let last = &results[13];
    assert_eq!(last.subtitle.as_deref(), Some("Show Episode 14.srt"));
    assert_eq!(last.kind, Some(MatchKind::CrossFormat));
    assert_eq!(last.score, Some(55));
}

/// Test that a contested subtitle goes to the earlier video
#[test]
fn test_find_matches_withContestedSubtitle_shouldFavorInputOrder() {
    let subtitles = ["Show - 01.srt"];

    let results = find_matches_for_batch(&["Show 01.mkv", "Show [01].mkv"], &subtitles, &Config::default());
    assert_eq!(subtitle_of(&results, "Show 01.mkv").as_deref(), Some("Show - 01.srt"));
    assert_eq!(subtitle_of(&results, "Show [01].mkv"), None);

    let reversed = find_matches_for_batch(&["Show [01].mkv", "Show 01.mkv"], &subtitles, &Config::default());
    assert_eq!(subtitle_of(&reversed, "Show [01].mkv").as_deref(), Some("Show - 01.srt"));
    assert_eq!(subtitle_of(&reversed, "Show 01.mkv"), None);
}

/// Test that exact matches are claimed for the whole batch before any heuristic runs
#[test]
fn test_find_matches_withLaterExactMatch_shouldReserveSubtitle() {
    let results = find_matches_for_batch(&["Show [01].mkv", "Show S01E01.mkv"], &["Show S01E01.srt"], &Config::default());

    assert_eq!(results[0].subtitle, None);
    assert_eq!(results[1].kind, Some(MatchKind::Exact));
}

/// Test that no subtitle is ever used twice
#[test]
fn test_find_matches_withDuplicateEpisodes_shouldNotReuseSubtitles() {
    let videos = ["Show S01E01.mkv", "Show S01E01 v2.mkv", "Show S01E02.mkv"];
    let subtitles = ["Show 1x01.srt", "Show 1x02.srt"];

    let results = find_matches_for_batch(&videos, &subtitles, &Config::default());

    let used: Vec<_> = results.iter().filter_map(|r| r.subtitle.clone()).collect();
    assert_eq!(used, vec!["Show 1x01.srt".to_string(), "Show 1x02.srt".to_string()]);
    assert_eq!(results[1].subtitle, None);
}

/// Test that scores below the threshold are not accepted
#[test]
fn test_find_matches_withHighThreshold_shouldLeaveVideoUnmatched() {
    let config = Config {
        minimum_match_score: 90,
        ..Config::default()
    };
    let results = find_matches_for_batch(&["Show [01].mkv"], &["Show S01E01.srt"], &config);

    assert_eq!(results[0].subtitle, None);
    assert_eq!(results[0].kind, None);
    assert_eq!(results[0].score, None);
}

/// Test empty input
#[test]
fn test_find_matches_withNoSubtitles_shouldReturnUnmatchedResults() {
    let no_subtitles: [&str; 0] = [];
    let results = find_matches_for_batch(&["A.mkv", "B.mkv"], &no_subtitles, &Config::default());
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.subtitle.is_none()));

    let no_videos: [&str; 0] = [];
    assert!(find_matches_for_batch(&no_videos, &["A.srt"], &Config::default()).is_empty());
}
