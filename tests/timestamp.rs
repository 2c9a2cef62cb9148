//! Timestamp planner integration tests.
//!
//! These tests are pure and need no fixtures.

use std::time::Duration;

use vidsheet::SheetError;
use vidsheet::timestamp::{
    PlanOptions, credits_length, display_plan, extraction_plan, format_cue_timestamp,
    format_timestamp, parse_timestamp,
};

fn secs(value: u64) -> Duration {
    Duration::from_secs(value)
}

// ── Extraction plan ────────────────────────────────────────────────

#[test]
fn count_mode_divides_by_count_plus_one() {
    let plan = extraction_plan(&PlanOptions::count(4), secs(100)).unwrap();
    assert_eq!(plan, vec![secs(20), secs(40), secs(60), secs(80)]);
}

#[test]
fn count_mode_never_reaches_the_end() {
    for count in 2..50 {
        let duration = Duration::from_millis(7_919);
        let plan = extraction_plan(&PlanOptions::count(count), duration).unwrap();
        assert_eq!(plan.len(), count as usize);
        assert!(plan.iter().all(|timestamp| *timestamp < duration));
        assert!(plan.windows(2).all(|pair| pair[0] < pair[1]));
    }
}

#[test]
fn single_capture_uses_midpoint() {
    let plan = extraction_plan(&PlanOptions::count(1), secs(100)).unwrap();
    assert_eq!(plan, vec![secs(50)]);

    let plan = extraction_plan(&PlanOptions::count(0), secs(100)).unwrap();
    assert_eq!(plan, vec![secs(50)]);
}

#[test]
fn midpoint_honours_range() {
    let options = PlanOptions::count(1).with_range(secs(20), Some(secs(60)));
    let plan = extraction_plan(&options, secs(100)).unwrap();
    assert_eq!(plan, vec![secs(40)]);
}

#[test]
fn count_mode_with_range() {
    let options = PlanOptions::count(3).with_range(secs(10), Some(secs(50)));
    let plan = extraction_plan(&options, secs(100)).unwrap();
    assert_eq!(plan, vec![secs(20), secs(30), secs(40)]);
}

#[test]
fn interval_mode_stops_before_end() {
    let plan = extraction_plan(&PlanOptions::interval(secs(30)), secs(100)).unwrap();
    assert_eq!(plan, vec![secs(0), secs(30), secs(60), secs(90)]);

    let plan = extraction_plan(&PlanOptions::interval(secs(25)), secs(100)).unwrap();
    assert_eq!(plan, vec![secs(0), secs(25), secs(50), secs(75)]);
}

#[test]
fn interval_mode_starts_at_from() {
    let options = PlanOptions::interval(secs(10)).with_range(secs(5), Some(secs(30)));
    let plan = extraction_plan(&options, secs(100)).unwrap();
    assert_eq!(plan, vec![secs(5), secs(15), secs(25)]);
}

#[test]
fn to_beyond_duration_is_clamped() {
    let options = PlanOptions::count(1).with_range(Duration::ZERO, Some(secs(500)));
    let plan = extraction_plan(&options, secs(100)).unwrap();
    assert_eq!(plan, vec![secs(50)]);
}

#[test]
fn skip_credits_uses_ten_percent_for_short_videos() {
    assert_eq!(credits_length(secs(600)), secs(60));

    let options = PlanOptions::count(1).with_skip_credits(true);
    let plan = extraction_plan(&options, secs(600)).unwrap();
    assert_eq!(plan, vec![secs(270)]);
}

#[test]
fn skip_credits_is_capped_at_two_minutes() {
    assert_eq!(credits_length(secs(3600)), secs(120));

    let options = PlanOptions::count(1).with_skip_credits(true);
    let plan = extraction_plan(&options, secs(3600)).unwrap();
    assert_eq!(plan, vec![secs(1740)]);
}

#[test]
fn zero_duration_is_rejected() {
    let result = extraction_plan(&PlanOptions::count(4), Duration::ZERO);
    assert!(matches!(result, Err(SheetError::InvalidRange { .. })));
}

#[test]
fn from_beyond_duration_is_rejected() {
    let options = PlanOptions::count(4).with_range(secs(200), None);
    let result = extraction_plan(&options, secs(100));
    assert!(matches!(result, Err(SheetError::InvalidTimestamp(_))));
}

#[test]
fn from_after_to_is_rejected() {
    let options = PlanOptions::count(4).with_range(secs(60), Some(secs(30)));
    let result = extraction_plan(&options, secs(100));
    assert!(matches!(result, Err(SheetError::InvalidRange { .. })));
}

// ── Display plan ───────────────────────────────────────────────────

#[test]
fn display_plan_covers_full_duration() {
    let plan = display_plan(secs(90), 3);
    assert_eq!(plan, vec![secs(0), secs(30), secs(60), secs(90)]);
}

#[test]
fn display_plan_ignores_trimming() {
    // Trimming only affects extraction; cues always span the whole video.
    let extraction = extraction_plan(
        &PlanOptions::count(4)
            .with_range(secs(10), Some(secs(50)))
            .with_skip_credits(true),
        secs(100),
    )
    .unwrap();
    let display = display_plan(secs(100), extraction.len());
    assert_eq!(display.len(), extraction.len() + 1);
    assert_eq!(display.first(), Some(&Duration::ZERO));
    assert_eq!(display.last(), Some(&secs(100)));
}

#[test]
fn display_plan_uses_accepted_count() {
    let plan = display_plan(secs(100), 3);
    assert_eq!(plan.len(), 4);
    assert!(plan.windows(2).all(|pair| pair[0] < pair[1]));
    assert_eq!(plan[3], secs(100));
}

#[test]
fn display_plan_for_no_frames() {
    assert_eq!(display_plan(secs(100), 0), vec![Duration::ZERO]);
}

// ── Parsing and formatting ─────────────────────────────────────────

#[test]
fn parse_timestamp_formats() {
    assert_eq!(parse_timestamp("75").unwrap(), secs(75));
    assert_eq!(parse_timestamp("01:15").unwrap(), secs(75));
    assert_eq!(parse_timestamp("00:01:15").unwrap(), secs(75));
    assert_eq!(parse_timestamp("1:00:00").unwrap(), secs(3600));
    assert_eq!(parse_timestamp(" 00:00:02.5 ").unwrap(), Duration::from_millis(2500));
}

#[test]
fn parse_timestamp_rejects_garbage() {
    for input in ["", "abc", "1:2:3:4", "00:61", "00:60:00", "-5", "00:xx:10"] {
        let result = parse_timestamp(input);
        assert!(
            matches!(result, Err(SheetError::TimestampParse { .. })),
            "{input:?} should not parse"
        );
    }
}

#[test]
fn parse_timestamp_rejects_values_out_of_range() {
    for input in ["1e20", "9999999999999999:00:00", "18446744073709551615:59:59"] {
        let error = parse_timestamp(input).unwrap_err();
        assert!(error.is_input_error(), "{input:?}: {error}");
        assert!(error.to_string().contains("out of range"), "{input:?}: {error}");
    }
}

#[test]
fn format_timestamp_truncates() {
    assert_eq!(format_timestamp(Duration::ZERO), "00:00:00");
    assert_eq!(format_timestamp(Duration::from_millis(3_723_900)), "01:02:03");
    assert_eq!(format_timestamp(secs(36_000)), "10:00:00");
}

#[test]
fn format_cue_timestamp_has_millis() {
    assert_eq!(format_cue_timestamp(Duration::ZERO), "00:00:00.000");
    assert_eq!(format_cue_timestamp(Duration::from_millis(61_250)), "00:01:01.250");
}
