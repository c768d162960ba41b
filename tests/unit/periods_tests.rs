/*!
 * Tests for period extraction and merging
 */

use subcondense::app_config::Config;
use subcondense::errors::SubtitleError;
use subcondense::periods::{
    build_raw_periods, extract_periods, filter_entries, merge_periods, periods_from_entries, total_duration_ms,
    Period,
};
use subcondense::subtitle_processor::SubtitleEntry;
use crate::common;

fn config_with_padding(padding_ms: u64) -> Config {
    Config {
        padding_ms,
        ..Config::default()
    }
}

fn entry(seq: usize, start: u64, end: u64, text: &str) -> SubtitleEntry {
    SubtitleEntry::new(seq, start, end, text.to_string())
}

/// Test the basic overlapping-merge scenario
#[test]
fn test_merge_periods_withOverlappingPair_shouldProduceOnePeriod() {
    let raw = vec![Period::new(1_000, 5_000), Period::new(4_000, 8_000)];
    assert_eq!(merge_periods(&raw), vec![Period::new(1_000, 8_000)]);
}

/// Test that merging an already merged list changes nothing
#[test]
fn test_merge_periods_withMergedInput_shouldBeIdempotent() {
    let raw = vec![
        Period::new(0, 1_500),
        Period::new(1_200, 2_000),
        Period::new(2_000, 2_400),
        Period::new(5_000, 6_000),
        Period::new(5_500, 5_600),
        Period::new(9_000, 9_500),
    ];
    let once = merge_periods(&raw);
    assert_eq!(once, vec![Period::new(0, 2_400), Period::new(5_000, 6_000), Period::new(9_000, 9_500)]);
    assert_eq!(merge_periods(&once), once);
}

/// Test that periods are merged in source order with no chronological sort
#[test]
fn test_merge_periods_withOutOfOrderInput_shouldMergeInSourceOrder() {
    // An earlier-starting period after a later one is absorbed, not reordered
    let raw = vec![Period::new(3_000, 4_000), Period::new(1_000, 2_000)];
    assert_eq!(merge_periods(&raw), vec![Period::new(3_000, 4_000)]);

    let raw = vec![Period::new(5_000, 6_000), Period::new(1_000, 7_000)];
    assert_eq!(merge_periods(&raw), vec![Period::new(5_000, 7_000)]);

    // Sorted first, this would give three periods
    let raw = vec![Period::new(1_000, 2_000), Period::new(5_000, 6_000), Period::new(3_000, 3_500)];
    assert_eq!(merge_periods(&raw), vec![Period::new(1_000, 2_000), Period::new(5_000, 6_000)]);
}

/// Test that out-of-order SRT entries flow through extraction unsorted
#[test]
fn test_extract_periods_withOutOfOrderEntries_shouldNotSort() {
    let srt = "1\n00:00:10,000 --> 00:00:12,000\nLater line\n\n2\n00:00:01,000 --> 00:00:02,000\nEarlier line\n";

    let periods = extract_periods(srt, &config_with_padding(0)).unwrap();

    assert_eq!(periods, vec![Period::new(10_000, 12_000)]);
}

/// Test that merged periods are strictly separated
#[test]
fn test_merge_periods_withManyEntries_shouldBeStrictlyMonotonic() {
    let entries: Vec<SubtitleEntry> = (0..200u64)
        .map(|i| entry(i as usize + 1, i * 1_700, i * 1_700 + 900 + (i % 7) * 400, "line"))
        .collect();
    let merged = merge_periods(&build_raw_periods(&entries, 300));

    assert!(!merged.is_empty());
    for pair in merged.windows(2) {
        assert!(pair[0].end_ms < pair[1].start_ms, "{:?}", pair);
    }
    for period in &merged {
        assert!(period.start_ms < period.end_ms);
    }
}

/// Test the single entry padding and trailing trim scenario
#[test]
fn test_build_raw_periods_withSingleEntry_shouldTrimTrailingPadding() {
    let entries = vec![entry(1, 2_000, 3_000, "Hello")];

    // Untrimmed it would be [1500, 3500]
    assert_eq!(build_raw_periods(&entries, 500), vec![Period::new(1_500, 3_000)]);
    assert_eq!(
        periods_from_entries(&entries, &config_with_padding(500)).unwrap(),
        vec![Period::new(1_500, 3_000)]
    );
}

/// Test that only the last period gets its trailing padding removed
#[test]
fn test_build_raw_periods_withSeveralEntries_shouldOnlyTrimLast() {
    let entries = vec![entry(1, 1_000, 2_000, "a"), entry(2, 10_000, 11_000, "b")];
    assert_eq!(
        build_raw_periods(&entries, 200),
        vec![Period::new(800, 2_200), Period::new(9_800, 11_000)]
    );
}

/// Test that the trim is applied before merging even when the last period is absorbed
#[test]
fn test_periods_from_entries_withNestedLastEntry_shouldStillTrimIt() {
    let entries = vec![entry(1, 1_000, 10_000, "long"), entry(2, 2_000, 3_000, "short")];
    let periods = periods_from_entries(&entries, &config_with_padding(500)).unwrap();
    assert_eq!(periods, vec![Period::new(500, 10_500)]);
}

/// Test parenthetical filtering
#[test]
fn test_filter_entries_withParentheticals_shouldDropOnlyWholeEnclosures() {
    let entries = vec![
        entry(1, 0, 1_000, "(laughing)"),
        entry(2, 1_000, 2_000, "[music]"),
        entry(3, 2_000, 3_000, "Hello (aside) world"),
        entry(4, 3_000, 4_000, "<i>(whispering)</i>"),
    ];

    let kept = filter_entries(&entries, &Config::default());
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].text, "Hello (aside) world");

    let unfiltered = Config {
        filter_parentheses: false,
        ..Config::default()
    };
    assert_eq!(filter_entries(&entries, &unfiltered).len(), 4);
}

/// Test that markup-only and filtered-to-empty entries disappear
#[test]
fn test_filter_entries_withMarkupOnlyText_shouldDropEntry() {
    let entries = vec![entry(1, 0, 1_000, "<i></i>"), entry(2, 1_000, 2_000, "♪ ♫"), entry(3, 2_000, 3_000, "<b>Hi</b> ♪")];
    let kept = filter_entries(&entries, &Config::default());
    assert_eq!(kept, vec![entry(3, 2_000, 3_000, "Hi")]);
}

/// Test full extraction from SRT text
#[test]
fn test_extract_periods_withSampleSrt_shouldSkipSoundCue() {
    let periods = extract_periods(common::SAMPLE_SRT, &config_with_padding(500)).unwrap();

    assert_eq!(periods, vec![Period::new(500, 9_500), Period::new(29_500, 32_500)]);
    assert_eq!(total_duration_ms(&periods), 12_000);
}

/// Test that a file whose dialogue is all filtered away is a validation error
#[test]
fn test_extract_periods_withOnlySoundCues_shouldReturnValidationError() {
    let content = "1\n00:00:01,000 --> 00:00:02,000\n[music]\n\n2\n00:00:03,000 --> 00:00:04,000\n(sighs)\n";
    assert!(matches!(
        extract_periods(content, &Config::default()),
        Err(SubtitleError::Validation(_))
    ));
}

/// Test that a parse failure is passed through
#[test]
fn test_extract_periods_withGarbage_shouldReturnParseError() {
    assert!(matches!(
        extract_periods("not a subtitle", &Config::default()),
        Err(SubtitleError::Parse(_))
    ));
}
