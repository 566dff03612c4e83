mod units;

use serde::{Deserialize, Serialize};

use crate::timeline::{ClipTimestamp, DateRange};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DivisionType {
    Year,
    Month,
    Week,
    Day,
    Hour,
    Minute,
}

impl DivisionType {
    fn label_format(&self) -> &'static str {
        match self {
            DivisionType::Year => "%Y",
            DivisionType::Month => "%b %-d, %Y",
            DivisionType::Week => "Mon, %b %-d",
            DivisionType::Day => "%b %-d",
            DivisionType::Hour => "%-I %p",
            DivisionType::Minute => "%-I:%M %p",
        }
    }
}

/// One labelled tick on the timeline axis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DateDivision {
    pub division_type: DivisionType,
    pub label: String,
    pub date: ClipTimestamp,
}

impl DateDivision {
    pub fn new(division_type: DivisionType, date: ClipTimestamp) -> Self {
        Self {
            division_type,
            label: date.format(division_type.label_format()).to_string(),
            date,
        }
    }
}

type UnitPass = fn((ClipTimestamp, ClipTimestamp)) -> Vec<DateDivision>;

const PASSES: [UnitPass; 6] = [
    units::years,
    units::months,
    units::weeks,
    units::days,
    units::hours,
    units::minutes,
];

/// Tick budget used for a filter range on the vertical date line. Seven
/// daily ticks fit "Last 7 days" without one falling off the end.
pub fn division_budget(range: &DateRange) -> usize {
    if range.name() == "Last 7 days" {
        7
    } else {
        6
    }
}

/// Thin out one unit's ticks so they fit in `budget` slots.
fn decimate(divisions: Vec<DateDivision>, budget: usize) -> Vec<DateDivision> {
    let len = divisions.len();
    if len <= budget {
        return divisions;
    }
    if budget == 0 {
        return Vec::new();
    }
    // small overflows: trim the ends rather than thinning the middle
    if len == budget + 1 {
        return divisions.into_iter().take(budget).collect();
    }
    if len == budget + 2 {
        return divisions.into_iter().skip(1).take(budget).collect();
    }

    let step = len.div_ceil(budget);
    divisions.into_iter().step_by(step).collect()
}

/// Calendar-aligned ticks for `range`, coarsest unit first, never more than
/// `max_count` of them.
pub fn find_date_divisions(range: &DateRange, max_count: usize) -> Vec<DateDivision> {
    let Some(bounds) = range.bounds() else {
        return Vec::new();
    };
    if max_count == 0 || range.is_empty() {
        return Vec::new();
    }

    let mut divisions: Vec<DateDivision> = Vec::with_capacity(max_count);
    for pass in PASSES {
        let batch = pass(bounds);
        let remaining = max_count - divisions.len();
        divisions.extend(decimate(batch, remaining));
        if divisions.len() >= max_count {
            break;
        }
    }
    divisions.truncate(max_count);
    divisions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::parse_filename_date;
    use proptest::prelude::*;

    fn ts(name: &str) -> ClipTimestamp {
        parse_filename_date(name).unwrap()
    }

    fn range(start: &str, end: &str) -> DateRange {
        DateRange::new("testRange", ts(start), ts(end))
    }

    #[test]
    fn test_zero_budget_is_empty() {
        let r = range("20230101-000000", "20231231-000000");
        assert!(find_date_divisions(&r, 0).is_empty());
    }

    #[test]
    fn test_empty_range_is_empty() {
        assert!(find_date_divisions(&DateRange::Empty, 6).is_empty());
        let zero = range("20230101-000000", "20230101-000000");
        assert!(find_date_divisions(&zero, 6).is_empty());
    }

    #[test]
    fn test_single_year_drops_tail() {
        let result = find_date_divisions(&range("20220101-000000", "20230101-000000"), 1);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].division_type, DivisionType::Year);
        assert_eq!(result[0].label, "2022");
    }

    #[test]
    fn test_multi_year_years_only() {
        let result = find_date_divisions(&range("20200101-000000", "20230101-000000"), 3);
        assert_eq!(result.len(), 3);
        assert!(result.iter().all(|d| d.division_type == DivisionType::Year));
    }

    #[test]
    fn test_multi_year_with_month_filler() {
        let result = find_date_divisions(&range("20191215-000000", "20230115-000000"), 6);
        let got: Vec<(DivisionType, &str)> = result
            .iter()
            .map(|d| (d.division_type, d.label.as_str()))
            .collect();
        assert_eq!(
            got,
            vec![
                (DivisionType::Year, "2020"),
                (DivisionType::Year, "2021"),
                (DivisionType::Year, "2022"),
                (DivisionType::Year, "2023"),
                (DivisionType::Month, "Feb 1, 2020"),
                (DivisionType::Month, "Aug 1, 2021"),
            ]
        );
        assert_eq!(result[5].date, ts("20210801-000000"));
    }

    #[test]
    fn test_months_fill_half_year() {
        let result = find_date_divisions(&range("20230101-000000", "20230701-000000"), 6);
        assert_eq!(result.len(), 6);
        assert_eq!(result[0].division_type, DivisionType::Year);
        assert!(result[1..].iter().all(|d| d.division_type == DivisionType::Month));
    }

    #[test]
    fn test_weeks_follow_months() {
        let result = find_date_divisions(&range("20230101-000000", "20230131-000000"), 10);
        assert_eq!(result.len(), 10);
        assert!(result.iter().any(|d| d.division_type == DivisionType::Week));
        assert!(result.iter().any(|d| d.division_type == DivisionType::Day));
    }

    #[test]
    fn test_days_follow_weeks() {
        let result = find_date_divisions(&range("20230110-000000", "20230120-000000"), 8);
        assert_eq!(result.len(), 8);
        assert_eq!(result[0].label, "Mon, Jan 16");
        assert!(result[1..].iter().all(|d| d.division_type == DivisionType::Day));
    }

    #[test]
    fn test_hours_for_afternoon() {
        let result = find_date_divisions(&range("20230101-100000", "20230101-150000"), 4);
        let labels: Vec<&str> = result.iter().map(|d| d.label.as_str()).collect();
        assert_eq!(labels, vec!["10 AM", "11 AM", "12 PM", "1 PM"]);
        assert!(result.iter().all(|d| d.division_type == DivisionType::Hour));
    }

    #[test]
    fn test_minutes_fill_single_hour() {
        let result = find_date_divisions(&range("20230101-120000", "20230101-130000"), 3);
        assert_eq!(result.len(), 3);
        assert_eq!(result[0].division_type, DivisionType::Hour);
        assert!(result[1..].iter().all(|d| d.division_type == DivisionType::Minute));

        let result = find_date_divisions(&range("20230101-101000", "20230101-105000"), 5);
        assert_eq!(result.len(), 5);
        assert!(result.iter().all(|d| d.division_type == DivisionType::Minute));
    }

    #[test]
    fn test_hour_range_uses_minutes() {
        let result = find_date_divisions(&range("20230301-140500", "20230301-144500"), 6);
        assert_eq!(result.len(), 6);
        assert!(result.iter().all(|d| d.division_type == DivisionType::Minute));
    }

    #[test]
    fn test_decimate_small_overflow() {
        let batch: Vec<DateDivision> = (0..5)
            .map(|h| {
                let at = ts("20230301-010000") + chrono::Duration::hours(h);
                DateDivision::new(DivisionType::Hour, at)
            })
            .collect();
        let dropped_tail = decimate(batch.clone(), 4);
        assert_eq!(dropped_tail, batch[..4].to_vec());
        let dropped_ends = decimate(batch.clone(), 3);
        assert_eq!(dropped_ends, batch[1..4].to_vec());
        let strided = decimate(batch.clone(), 2);
        assert_eq!(strided, vec![batch[0].clone(), batch[3].clone()]);
    }

    #[test]
    fn test_budget_for_week_range() {
        let week = range("20230101-000000", "20230108-000000").with_name("Last 7 days");
        assert_eq!(division_budget(&week), 7);
        assert_eq!(division_budget(&week.with_name("All time")), 6);
    }

    proptest! {
        #[test]
        fn never_exceeds_budget(
            start_secs in 0i64..(3 * 365 * 86_400),
            span_secs in 0i64..(400 * 86_400),
            max_count in 0usize..40,
        ) {
            let start = ts("20220101-000000") + chrono::Duration::seconds(start_secs);
            let r = DateRange::new("prop", start, start + chrono::Duration::seconds(span_secs));
            let result = find_date_divisions(&r, max_count);
            prop_assert!(result.len() <= max_count);
            prop_assert!(result.iter().all(|d| r.contains(d.date)));
        }
    }
}
