use std::sync::LazyLock;

use chrono::{Datelike, Days, Duration, Local, Months, NaiveDate, Weekday};
use regex::Regex;

static ORDINAL_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d{1,2})(?:st|nd|rd|th)\b").expect("valid regex"));

/// Words stripped from the front of a deadline phrase
const LEADING_FILLERS: &[&str] = &[
    "by", "on", "before", "until", "till", "due", "no", "later", "than", "at", "latest",
];

/// Time-of-day words that do not change the date
const TRAILING_FILLERS: &[&str] = &[
    "morning", "afternoon", "evening", "night", "noon", "eod", "cob", "latest", "at",
];

/// Resolve a natural-language deadline against today's local date.
///
/// Returns `YYYY-MM-DD` on success and the input unchanged otherwise.
/// Blank input yields an empty string.
pub fn resolve_deadline(text: &str) -> String {
    resolve_deadline_from(text, Local::now().date_naive())
}

/// Resolve a deadline relative to a fixed reference date
pub fn resolve_deadline_from(text: &str, today: NaiveDate) -> String {
    if text.trim().is_empty() {
        return String::new();
    }
    match parse_deadline(text, today) {
        Some(date) => date.format("%Y-%m-%d").to_string(),
        None => text.to_string(),
    }
}

/// Parse a deadline phrase into a date, preferring future dates
pub fn parse_deadline(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let cleaned = ORDINAL_SUFFIX.replace_all(text.trim(), "$1").to_lowercase();
    let cleaned = cleaned.trim_end_matches(['.', ',', '!', '?', ';', ':']);

    let mut words: Vec<&str> = cleaned
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| c == ',' || c == '"' || c == '\''))
        .filter(|w| !w.is_empty() && *w != "the")
        .collect();

    while words.len() > 1 && LEADING_FILLERS.contains(&words[0]) {
        words.remove(0);
    }
    while words.len() > 1 && words.last().is_some_and(|w| TRAILING_FILLERS.contains(w)) {
        words.pop();
    }
    if words.is_empty() {
        return None;
    }

    parse_relative(&words, today).or_else(|| parse_absolute(&words.join(" "), today))
}

fn parse_relative(words: &[&str], today: NaiveDate) -> Option<NaiveDate> {
    match words {
        ["today"] | ["tonight"] | ["eod"] | ["end", "of", "day"] | ["end", "of", "today"] => {
            Some(today)
        }
        ["tomorrow"] | ["tmrw"] | ["tmr"] => Some(today + Duration::days(1)),
        ["day", "after", "tomorrow"] => Some(today + Duration::days(2)),
        ["next", "week"] => Some(today + Duration::days(7)),
        ["next", "month"] => today.checked_add_months(Months::new(1)),
        ["next", "year"] => today.checked_add_months(Months::new(12)),
        ["end", "of", "week"] | ["end", "of", "this", "week"] => {
            Some(upcoming_weekday(today, Weekday::Fri, false))
        }
        ["end", "of", "next", "week"] => {
            Some(upcoming_weekday(today, Weekday::Fri, false) + Duration::days(7))
        }
        ["end", "of", "month"] | ["end", "of", "this", "month"] => last_day_of_month(today),
        ["end", "of", "next", "month"] => {
            last_day_of_month(today.checked_add_months(Months::new(1))?)
        }
        ["end", "of", "year"] | ["end", "of", "this", "year"] => {
            NaiveDate::from_ymd_opt(today.year(), 12, 31)
        }
        [day] => parse_weekday(day).map(|wd| upcoming_weekday(today, wd, false)),
        ["this", day] | ["coming", day] | ["this", "coming", day] => {
            parse_weekday(day).map(|wd| upcoming_weekday(today, wd, false))
        }
        ["next", day] => parse_weekday(day).map(|wd| upcoming_weekday(today, wd, true)),
        [day, "next", "week"] => {
            let wd = parse_weekday(day)?;
            let next_monday = upcoming_weekday(today, Weekday::Mon, true);
            Some(next_monday + Duration::days(wd.num_days_from_monday() as i64))
        }
        ["in", amount, unit] | [amount, unit, "from", "now"] | [amount, unit, "later"] => {
            offset(today, parse_amount(amount)?, unit)
        }
        ["in", "a", "couple", "of", unit] | ["in", "couple", "of", unit] => offset(today, 2, unit),
        _ => None,
    }
}

fn parse_absolute(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    const WITH_YEAR: &[&str] = &[
        "%Y-%m-%d",
        "%Y/%m/%d",
        "%m/%d/%Y",
        "%d/%m/%Y",
        "%m-%d-%Y",
        "%d.%m.%Y",
        "%B %d %Y",
        "%B %d, %Y",
        "%d %B %Y",
        "%d %B, %Y",
        "%A %B %d %Y",
        "%A, %B %d, %Y",
    ];
    const WITHOUT_YEAR: &[&str] = &["%B %d", "%d %B", "%m/%d", "%A %B %d", "%A, %B %d"];

    for format in WITH_YEAR {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date);
        }
    }

    // Yearless dates land on the next occurrence
    for format in WITHOUT_YEAR {
        let with_year = format!("{} {}", text, today.year());
        let format_with_year = format!("{} %Y", format);
        if let Ok(date) = NaiveDate::parse_from_str(&with_year, &format_with_year) {
            if date >= today {
                return Some(date);
            }
            return date.with_year(today.year() + 1);
        }
    }

    None
}

fn parse_weekday(word: &str) -> Option<Weekday> {
    match word {
        "monday" | "mon" => Some(Weekday::Mon),
        "tuesday" | "tue" | "tues" => Some(Weekday::Tue),
        "wednesday" | "wed" => Some(Weekday::Wed),
        "thursday" | "thu" | "thur" | "thurs" => Some(Weekday::Thu),
        "friday" | "fri" => Some(Weekday::Fri),
        "saturday" | "sat" => Some(Weekday::Sat),
        "sunday" | "sun" => Some(Weekday::Sun),
        _ => None,
    }
}

fn parse_amount(word: &str) -> Option<u32> {
    if let Ok(n) = word.parse::<u32>() {
        return Some(n);
    }
    let n = match word {
        "a" | "an" | "one" => 1,
        "two" | "couple" => 2,
        "three" | "few" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        "eleven" => 11,
        "twelve" => 12,
        _ => return None,
    };
    Some(n)
}

fn offset(today: NaiveDate, amount: u32, unit: &str) -> Option<NaiveDate> {
    match unit.trim_end_matches('s') {
        "day" => today.checked_add_days(Days::new(amount.into())),
        "week" => today.checked_add_days(Days::new(u64::from(amount).checked_mul(7)?)),
        "month" => today.checked_add_months(Months::new(amount)),
        "year" => today.checked_add_months(Months::new(amount.checked_mul(12)?)),
        _ => None,
    }
}

/// Next date falling on `weekday`; today counts unless `strictly_after`
fn upcoming_weekday(today: NaiveDate, weekday: Weekday, strictly_after: bool) -> NaiveDate {
    let current = today.weekday().num_days_from_monday() as i64;
    let target = weekday.num_days_from_monday() as i64;
    let mut delta = (target - current).rem_euclid(7);
    if delta == 0 && strictly_after {
        delta = 7;
    }
    today + Duration::days(delta)
}

fn last_day_of_month(date: NaiveDate) -> Option<NaiveDate> {
    let first = NaiveDate::from_ymd_opt(date.year(), date.month(), 1)?;
    first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
}
