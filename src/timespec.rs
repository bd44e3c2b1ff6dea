use chrono::{Datelike, Days, NaiveDate, Weekday};

use crate::error::{Result, SprigError};

/// A resolved date expression: the concrete due date plus the recurrence
/// interval in days, when the expression implies one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub date: NaiveDate,
    pub every: Option<u32>,
}

impl Schedule {
    fn once(date: NaiveDate) -> Self {
        Self { date, every: None }
    }

    fn repeating(date: NaiveDate, every: u32) -> Self {
        Self {
            date,
            every: Some(every),
        }
    }
}

/// Resolve a free-form date/recurrence expression against `today`.
///
/// Recognized forms, first match wins: "daily"/"everyday"/"every day",
/// "today", "tomorrow", "in N day(s)", "every <weekday>", "every N day(s)",
/// a bare weekday name, "YYYY-MM-DD", "MM-DD" (this year), and a bare
/// day-of-month. Weekday resolution is strictly after today: "monday" on a
/// Monday means next week, never the current day.
pub fn resolve(expr: &str, today: NaiveDate) -> Result<Schedule> {
    let value = expr.trim();
    let fail = || SprigError::BadDateExpr(value.to_string());
    if value.is_empty() {
        return Err(fail());
    }
    let lowered = value.to_ascii_lowercase();

    match lowered.as_str() {
        "daily" | "everyday" | "every day" => return Ok(Schedule::repeating(today, 1)),
        "today" => return Ok(Schedule::once(today)),
        "tomorrow" => {
            return today
                .checked_add_days(Days::new(1))
                .map(Schedule::once)
                .ok_or_else(fail);
        }
        _ => {}
    }

    if let Some(rest) = lowered.strip_prefix("in ") {
        let number = strip_day_suffix(rest.trim());
        let offset: u64 = number.parse().map_err(|_| fail())?;
        return today
            .checked_add_days(Days::new(offset))
            .map(Schedule::once)
            .ok_or_else(fail);
    }

    if let Some(rest) = lowered.strip_prefix("every ") {
        let rest = rest.trim();
        if matches!(rest, "day" | "daily" | "day(s)") {
            return Ok(Schedule::repeating(today, 1));
        }
        if let Some(weekday) = weekday_from_name(rest) {
            return Ok(Schedule::repeating(next_weekday(today, weekday), 7));
        }
        let number = strip_day_suffix(rest);
        if number != rest
            && let Ok(interval) = number.parse::<u32>()
            && interval > 0
        {
            return today
                .checked_add_days(Days::new(u64::from(interval)))
                .map(|date| Schedule::repeating(date, interval))
                .ok_or_else(fail);
        }
        return Err(fail());
    }

    if let Some(weekday) = weekday_from_name(&lowered) {
        return Ok(Schedule::once(next_weekday(today, weekday)));
    }

    if let Ok(date) = value.parse::<NaiveDate>() {
        return Ok(Schedule::once(date));
    }

    // MM-DD in today's year.
    let parts: Vec<&str> = value.split('-').collect();
    if parts.len() == 2 && parts.iter().all(|p| is_digits(p)) {
        let month: u32 = parts[0].parse().map_err(|_| fail())?;
        let day: u32 = parts[1].parse().map_err(|_| fail())?;
        return NaiveDate::from_ymd_opt(today.year(), month, day)
            .map(Schedule::once)
            .ok_or_else(fail);
    }

    // Bare day-of-month in today's year and month.
    if is_digits(value) {
        let day: u32 = value.parse().map_err(|_| fail())?;
        return NaiveDate::from_ymd_opt(today.year(), today.month(), day)
            .map(Schedule::once)
            .ok_or_else(fail);
    }

    Err(fail())
}

/// Next due date of a recurring task being completed: interval days past the
/// current due date, or past today when no due date was set. No expression
/// parsing is involved.
pub fn next_occurrence(due: Option<NaiveDate>, every: u32, today: NaiveDate) -> NaiveDate {
    due.unwrap_or(today) + chrono::Duration::days(i64::from(every))
}

fn strip_day_suffix(text: &str) -> &str {
    text.strip_suffix(" days")
        .or_else(|| text.strip_suffix(" day"))
        .unwrap_or(text)
        .trim()
}

fn is_digits(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

fn weekday_from_name(name: &str) -> Option<Weekday> {
    const NAMES: &[(&str, Weekday)] = &[
        ("monday", Weekday::Mon),
        ("mon", Weekday::Mon),
        ("mo", Weekday::Mon),
        ("tuesday", Weekday::Tue),
        ("tues", Weekday::Tue),
        ("tue", Weekday::Tue),
        ("tu", Weekday::Tue),
        ("wednesday", Weekday::Wed),
        ("wed", Weekday::Wed),
        ("we", Weekday::Wed),
        ("thursday", Weekday::Thu),
        ("thur", Weekday::Thu),
        ("thu", Weekday::Thu),
        ("th", Weekday::Thu),
        ("friday", Weekday::Fri),
        ("fri", Weekday::Fri),
        ("fr", Weekday::Fri),
        ("saturday", Weekday::Sat),
        ("sat", Weekday::Sat),
        ("sa", Weekday::Sat),
        ("sunday", Weekday::Sun),
        ("sun", Weekday::Sun),
        ("su", Weekday::Sun),
    ];
    let token = name.trim();
    NAMES
        .iter()
        .find(|(alias, _)| *alias == token)
        .map(|&(_, weekday)| weekday)
}

/// The next calendar date falling on `target`, strictly after `today`.
fn next_weekday(today: NaiveDate, target: Weekday) -> NaiveDate {
    let ahead = (target.num_days_from_monday() + 7 - today.weekday().num_days_from_monday()) % 7;
    let ahead = if ahead == 0 { 7 } else { ahead };
    today + chrono::Duration::days(i64::from(ahead))
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2025-04-20 is a Sunday.
    fn sunday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, 20).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn daily_forms_resolve_to_today_with_interval_one() {
        for expr in ["daily", "everyday", "every day", "Every Day", " DAILY "] {
            let schedule = resolve(expr, sunday()).unwrap();
            assert_eq!(schedule, Schedule::repeating(sunday(), 1), "expr {expr}");
        }
    }

    #[test]
    fn today_and_tomorrow() {
        assert_eq!(resolve("today", sunday()).unwrap(), Schedule::once(sunday()));
        assert_eq!(
            resolve("tomorrow", sunday()).unwrap(),
            Schedule::once(date(2025, 4, 21))
        );
    }

    #[test]
    fn in_n_days_offsets_from_today() {
        assert_eq!(
            resolve("in 3 days", sunday()).unwrap(),
            Schedule::once(date(2025, 4, 23))
        );
        assert_eq!(
            resolve("in 1 day", sunday()).unwrap(),
            Schedule::once(date(2025, 4, 21))
        );
        assert_eq!(
            resolve("in 0 days", sunday()).unwrap(),
            Schedule::once(sunday())
        );
    }

    #[test]
    fn in_n_days_rejects_negative_and_junk() {
        assert!(resolve("in -2 days", sunday()).is_err());
        assert!(resolve("in two days", sunday()).is_err());
    }

    #[test]
    fn every_weekday_repeats_weekly_strictly_after_today() {
        let schedule = resolve("every monday", sunday()).unwrap();
        assert_eq!(schedule, Schedule::repeating(date(2025, 4, 21), 7));

        // Sunday resolved on a Sunday lands a full week out, never today.
        let schedule = resolve("every sunday", sunday()).unwrap();
        assert_eq!(schedule, Schedule::repeating(date(2025, 4, 27), 7));
    }

    #[test]
    fn every_n_days_repeats_with_that_interval() {
        assert_eq!(
            resolve("every 3 days", sunday()).unwrap(),
            Schedule::repeating(date(2025, 4, 23), 3)
        );
        assert!(resolve("every 0 days", sunday()).is_err());
        assert!(resolve("every some days", sunday()).is_err());
        // A bare number after "every" has no day suffix and fails.
        assert!(resolve("every 3", sunday()).is_err());
    }

    #[test]
    fn bare_weekday_resolves_once() {
        assert_eq!(
            resolve("wednesday", sunday()).unwrap(),
            Schedule::once(date(2025, 4, 23))
        );
        assert_eq!(
            resolve("WED", sunday()).unwrap(),
            Schedule::once(date(2025, 4, 23))
        );
        assert_eq!(
            resolve("th", sunday()).unwrap(),
            Schedule::once(date(2025, 4, 24))
        );
        assert_eq!(
            resolve("tues", sunday()).unwrap(),
            Schedule::once(date(2025, 4, 22))
        );
    }

    #[test]
    fn full_dates_resolve_independently_of_today() {
        for today in [sunday(), date(1999, 1, 1), date(2030, 12, 31)] {
            assert_eq!(
                resolve("2025-04-20", today).unwrap(),
                Schedule::once(date(2025, 4, 20))
            );
        }
    }

    #[test]
    fn month_day_uses_current_year() {
        assert_eq!(
            resolve("05-01", sunday()).unwrap(),
            Schedule::once(date(2025, 5, 1))
        );
        assert_eq!(
            resolve("5-1", sunday()).unwrap(),
            Schedule::once(date(2025, 5, 1))
        );
        assert!(resolve("13-01", sunday()).is_err());
        assert!(resolve("02-30", sunday()).is_err());
    }

    #[test]
    fn bare_day_uses_current_month() {
        assert_eq!(
            resolve("25", sunday()).unwrap(),
            Schedule::once(date(2025, 4, 25))
        );
        assert!(resolve("31", sunday()).is_err()); // April has 30 days
        assert!(resolve("0", sunday()).is_err());
    }

    #[test]
    fn unrecognized_expressions_fail() {
        for expr in ["", "  ", "next week", "whenever", "2025/04/20", "someday"] {
            assert!(resolve(expr, sunday()).is_err(), "expr {expr:?}");
        }
    }

    #[test]
    fn next_occurrence_advances_from_due_or_today() {
        assert_eq!(
            next_occurrence(Some(date(2025, 4, 20)), 1, sunday()),
            date(2025, 4, 21)
        );
        assert_eq!(
            next_occurrence(Some(date(2025, 4, 10)), 7, sunday()),
            date(2025, 4, 17)
        );
        assert_eq!(next_occurrence(None, 3, sunday()), date(2025, 4, 23));
    }
}
