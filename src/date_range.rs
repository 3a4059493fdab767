use chrono::{Datelike, Duration, NaiveDate};
use std::collections::BTreeMap;

use crate::data_types::Weekday;
use crate::errors::DateRangeError;

/// Parses a week header like "27.03. - 31.03.2023" (or "27.02.-03.03.2023")
/// into the dates of monday to friday.
///
/// The first date has no year. It gets the year of the second date, or the
/// year before if the range wraps from december to january. Dates are
/// assigned consecutively starting with the first one, since plans always
/// begin on a monday.
pub fn parse_date_range(line: &str) -> Result<BTreeMap<Weekday, NaiveDate>, DateRangeError> {
    // the pdf uses an odd code point instead of '-', so split on whitespace first
    let mut tokens: Vec<&str> = line.trim().split(' ').collect();
    let mut offset = 2;
    if tokens.len() == 1 {
        tokens = line.trim().split('-').collect();
        offset = 1;
    }

    let from_token = tokens[0].trim();
    let until_token = tokens
        .get(offset)
        .map(|t| t.trim())
        .ok_or_else(|| DateRangeError::MissingUntilDate(line.to_string()))?;

    let (from_day, from_month) = parse_day_month(from_token)?;
    let until = NaiveDate::parse_from_str(until_token, "%d.%m.%Y")
        .ok()
        .filter(|_| is_strict_full_date(until_token))
        .ok_or_else(|| DateRangeError::InvalidDate(until_token.to_string()))?;

    let year = if until.month() < from_month {
        until.year() - 1
    } else {
        until.year()
    };
    let from = NaiveDate::from_ymd_opt(year, from_month, from_day)
        .ok_or_else(|| DateRangeError::InvalidDate(from_token.to_string()))?;

    Ok(Weekday::ALL
        .into_iter()
        .zip(0..)
        .map(|(weekday, offset)| (weekday, from + Duration::days(offset)))
        .collect())
}

/// Strict "DD.MM." with one or two digit fields.
fn parse_day_month(token: &str) -> Result<(u32, u32), DateRangeError> {
    let invalid = || DateRangeError::InvalidDate(token.to_string());

    let fields = token.strip_suffix('.').ok_or_else(invalid)?;
    let (day, month) = fields.split_once('.').ok_or_else(invalid)?;
    if !is_short_number(day) || !is_short_number(month) {
        return Err(invalid());
    }

    let day = day.parse::<u32>().map_err(|_| invalid())?;
    let month = month.parse::<u32>().map_err(|_| invalid())?;
    if !(1..=31).contains(&day) || !(1..=12).contains(&month) {
        return Err(invalid());
    }

    Ok((day, month))
}

fn is_short_number(s: &str) -> bool {
    (1..=2).contains(&s.len()) && s.chars().all(|c| c.is_ascii_digit())
}

/// chrono is lenient on field widths, the plans always print "DD.MM.YYYY".
fn is_strict_full_date(token: &str) -> bool {
    let fields: Vec<&str> = token.split('.').collect();
    fields.len() == 3
        && is_short_number(fields[0])
        && is_short_number(fields[1])
        && fields[2].len() == 4
        && fields[2].chars().all(|c| c.is_ascii_digit())
}

/// Finds the week header in a page's text: the first non-empty line with a '.'.
pub fn find_date_header(page_text: &str) -> Option<&str> {
    page_text
        .split('\n')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .find(|l| l.contains('.'))
}

pub fn monday_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Monday to friday of the week `date` lies in.
pub fn week_dates(date: NaiveDate) -> Vec<NaiveDate> {
    let monday = monday_of(date);
    (0..5).map(|i| monday + Duration::days(i)).collect()
}

/// Weekdays of `weeks` consecutive weeks, starting with the week of `date`.
pub fn week_dates_with_lookahead(date: NaiveDate, weeks: u32) -> Vec<NaiveDate> {
    (0..weeks as i64)
        .flat_map(|w| week_dates(date + Duration::weeks(w)))
        .collect()
}

pub fn iso_week(date: NaiveDate) -> u32 {
    date.iso_week().week()
}

/// Week label as used in plan file names, e.g. "KW05".
pub fn week_label(date: NaiveDate) -> String {
    format!("KW{:02}", iso_week(date))
}
