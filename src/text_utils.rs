use chrono::{DateTime, Datelike, NaiveDate};
use lazy_static::lazy_static;
use regex::Regex;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

fn to_int<T: std::str::FromStr>(num_str: &str, date_str: &str) -> Result<T, String> {
    match num_str.parse::<T>() {
        Ok(x) => Ok(x),
        Err(_) => Err(format!("Error parsing {} from the date {}", num_str, date_str)),
    }
}

fn date_from_parts(y: &str, m: &str, d: &str, buf: &str) -> Result<NaiveDate, String> {
    let y: i32 = to_int(y, buf)?;
    let m: u32 = to_int(m, buf)?;
    let d: u32 = to_int(d, buf)?;

    NaiveDate::from_ymd_opt(y, m, d).ok_or_else(|| format!("Invalid calendar date {}", buf))
}

/// `%Y` accepts signed and longer years, which would not print as `YYYY-MM-DD`.
fn four_digit_year(date: NaiveDate, buf: &str) -> Result<NaiveDate, String> {
    if (0..=9999).contains(&date.year()) {
        Ok(date)
    } else {
        Err(format!("Year out of range in the date {}", buf))
    }
}

/// Parses the date part of what people usually write in a post header.
/// Time and offset are accepted but ignored: the date is kept as written.
pub fn parse_date(buf: &str) -> Result<NaiveDate, String> {
    lazy_static! {
        static ref DATE_REGEX: Regex = Regex::new(
            r"^(\d{4})[-/.](\d{1,2})[-/.](\d{1,2})(?:[T ]\d{1,2}:\d{2}(?::\d{2}(?:\.\d+)?)?(?: ?(?:Z|[+-]\d{2}:?\d{2}))?)?$"
        ).unwrap();
        static ref COMPACT_REGEX: Regex = Regex::new(r"^(\d{4})(\d{2})(\d{2})$").unwrap();
    }

    let buf = buf.trim();

    // We are using the regex approach to make it more flexible
    if let Some(caps) = DATE_REGEX.captures(buf).or_else(|| COMPACT_REGEX.captures(buf)) {
        return date_from_parts(&caps[1], &caps[2], &caps[3], buf);
    }

    if let Ok(date_time) = DateTime::parse_from_rfc3339(buf) {
        return four_digit_year(date_time.date_naive(), buf);
    }

    for fmt in ["%B %d, %Y", "%b %d, %Y", "%d %B %Y", "%d %b %Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(buf, fmt) {
            return four_digit_year(date, buf);
        }
    }

    Err(format!("Unable to parse date {}", buf))
}

pub fn format_date(date: &NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// `my-first_post` -> `My First Post`
pub fn title_case(text: &str) -> String {
    text.split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Cuts `text` to at most `max_chars` characters, on a word boundary when there is one.
pub fn truncate_words(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let cut: String = text.chars().take(max_chars).collect();
    match cut.rfind(char::is_whitespace) {
        Some(pos) if pos > 0 => cut[..pos].trim_end().to_string(),
        _ => cut,
    }
}

pub fn excerpt(line: &str, max_chars: usize) -> String {
    let line = line.trim();
    if line.chars().count() > max_chars {
        let cut: String = line.chars().take(max_chars).collect();
        format!("{}...", cut)
    } else {
        line.to_string()
    }
}

pub fn reading_time(body: &str) -> String {
    let minutes = body.chars().count().div_ceil(1000).max(1);
    format!("{} min read", minutes)
}
