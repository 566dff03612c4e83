//! One generator per calendar unit. Each finer unit leaves out the points a
//! coarser unit already labels, so the passes can simply be concatenated.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};

use super::{DateDivision, DivisionType};
use crate::timeline::ClipTimestamp;

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

fn push_if_inside(
    divisions: &mut Vec<DateDivision>,
    bounds: (ClipTimestamp, ClipTimestamp),
    division_type: DivisionType,
    date: NaiveDateTime,
) {
    let (start, end) = bounds;
    if start <= date && date <= end {
        divisions.push(DateDivision::new(division_type, date));
    }
}

/// Fixed-step walk from `first` up to (not including) the range end.
fn stepped(
    bounds: (ClipTimestamp, ClipTimestamp),
    division_type: DivisionType,
    first: NaiveDateTime,
    step: Duration,
    skip: impl Fn(&NaiveDateTime) -> bool,
) -> Vec<DateDivision> {
    let (_, end) = bounds;
    let mut divisions = Vec::new();
    let mut at = first;
    while at < end {
        if !skip(&at) {
            push_if_inside(&mut divisions, bounds, division_type, at);
        }
        at += step;
    }
    divisions
}

pub(super) fn years(bounds: (ClipTimestamp, ClipTimestamp)) -> Vec<DateDivision> {
    let (start, end) = bounds;
    let mut divisions = Vec::new();
    for year in start.year()..=end.year() {
        if let Some(date) = NaiveDate::from_ymd_opt(year, 1, 1) {
            push_if_inside(&mut divisions, bounds, DivisionType::Year, midnight(date));
        }
    }
    divisions
}

/// Month lengths vary, so months are enumerated by calendar rather than by
/// a fixed step. January is left to the year pass.
pub(super) fn months(bounds: (ClipTimestamp, ClipTimestamp)) -> Vec<DateDivision> {
    let (start, end) = bounds;
    let mut divisions = Vec::new();
    for year in start.year()..=end.year() {
        let first = if year == start.year() { start.month().max(2) } else { 2 };
        let last = if year == end.year() { end.month() } else { 12 };
        for month in first..=last {
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, 1) {
                push_if_inside(&mut divisions, bounds, DivisionType::Month, midnight(date));
            }
        }
    }
    divisions
}

/// Mondays, except those near a month boundary where the month tick sits.
pub(super) fn weeks(bounds: (ClipTimestamp, ClipTimestamp)) -> Vec<DateDivision> {
    let (start, _) = bounds;
    let day = start.date();
    let monday = day - Duration::days(day.weekday().num_days_from_sunday() as i64)
        + Duration::days(1);
    stepped(
        bounds,
        DivisionType::Week,
        midnight(monday),
        Duration::weeks(1),
        |at| at.day() < 5 || at.day() > 25,
    )
}

pub(super) fn days(bounds: (ClipTimestamp, ClipTimestamp)) -> Vec<DateDivision> {
    let (start, _) = bounds;
    stepped(
        bounds,
        DivisionType::Day,
        midnight(start.date()),
        Duration::days(1),
        |at| at.day() < 2 || at.day() > 28 || at.weekday() == Weekday::Mon,
    )
}

pub(super) fn hours(bounds: (ClipTimestamp, ClipTimestamp)) -> Vec<DateDivision> {
    let (start, _) = bounds;
    let first = start
        .date()
        .and_hms_opt(start.hour(), 0, 0)
        .unwrap_or(start);
    stepped(bounds, DivisionType::Hour, first, Duration::hours(1), |at| {
        at.hour() == 0
    })
}

pub(super) fn minutes(bounds: (ClipTimestamp, ClipTimestamp)) -> Vec<DateDivision> {
    let (start, _) = bounds;
    let first = start
        .date()
        .and_hms_opt(start.hour(), start.minute(), 0)
        .unwrap_or(start);
    stepped(bounds, DivisionType::Minute, first, Duration::minutes(1), |at| {
        at.minute() < 10 || at.minute() > 50
    })
}
