//! Tests for timestamp resolution and whole-second arithmetic

use chrono::Duration;
use fmea_graph_core_rs::core::time::{
    parse_date, parse_time, resolve_timestamp, seconds_between, to_iso,
};
use fmea_graph_core_rs::TimeError;
use proptest::prelude::*;

#[test]
fn test_day_first_dates() {
    let dashed = parse_date("03-04-2025").unwrap();
    let slashed = parse_date("03/04/2025").unwrap();

    assert_eq!(dashed, slashed);
    assert_eq!(dashed.to_string(), "2025-04-03", "day comes first");
}

#[test]
fn test_iso_dates_accepted() {
    assert_eq!(parse_date("2025-04-03").unwrap(), parse_date("03-04-2025").unwrap());
}

#[test]
fn test_surrounding_whitespace_ignored() {
    let ts = resolve_timestamp(" 14-01-2025 ", " 08:30:15 ").unwrap();
    assert_eq!(to_iso(&ts), "2025-01-14T08:30:15");
}

#[test]
fn test_invalid_dates_rejected() {
    for raw in ["2025/01/14", "31-02-2025", "14-13-2025", "", "yesterday"] {
        assert_eq!(
            parse_date(raw),
            Err(TimeError::InvalidDate(raw.to_string())),
            "{:?} should not parse",
            raw
        );
    }
}

#[test]
fn test_invalid_times_rejected() {
    for raw in ["24:00:00", "10:61:00", "10:00", "10h00"] {
        assert!(
            matches!(parse_time(raw), Err(TimeError::InvalidTime(_))),
            "{:?} should not parse",
            raw
        );
    }
}

#[test]
fn test_resolve_reports_date_before_time() {
    let err = resolve_timestamp("bad", "also bad").unwrap_err();
    assert_eq!(err, TimeError::InvalidDate("bad".to_string()));
}

#[test]
fn test_seconds_between_across_midnight() {
    let before = resolve_timestamp("31-12-2024", "23:59:30").unwrap();
    let after = resolve_timestamp("01-01-2025", "00:00:45").unwrap();

    assert_eq!(seconds_between(&before, &after), 75);
    assert_eq!(seconds_between(&after, &before), -75);
    assert_eq!(seconds_between(&before, &before), 0);
}

proptest! {
    #[test]
    fn prop_seconds_between_is_exact(offset in -1_000_000i64..1_000_000) {
        let base = resolve_timestamp("15-06-2025", "12:00:00").unwrap();
        let later = base + Duration::seconds(offset);

        prop_assert_eq!(seconds_between(&base, &later), offset);
        prop_assert_eq!(seconds_between(&later, &base), -offset);
    }
}
