use std::ops::Range;

use lazy_static::lazy_static;
use regex::Regex;

use crate::content::MetaValue;

/// Splits a frontmatter line into key and raw value.
/// Lines without a colon, blank lines and `#` comments give `None`.
pub fn extract_key_val(line: &str) -> Option<(&str, &str)> {
    lazy_static! {
        static ref KEY_VAL_REGEX: Regex = Regex::new(
            r"^\s*(?P<key>[^:#\-\s][^:]*?)\s*:(?P<value>.*)$"
        ).unwrap();
    }

    KEY_VAL_REGEX.captures(line).and_then(|cap| {
        let key = cap.name("key").map(|key| key.as_str());
        let val = cap.name("value").map(|val| val.as_str().trim());
        match (key, val) {
            (Some(key), Some(val)) => Some((key, val)),
            _ => None
        }
    })
}

/// `- item` lines of a block list.
pub fn extract_list_item(line: &str) -> Option<&str> {
    let line = line.trim();
    if line == "-" {
        return Some("");
    }
    line.strip_prefix("- ").map(|item| item.trim())
}

pub fn parse_value(raw: &str) -> MetaValue {
    let raw = raw.trim();
    if raw.len() >= 2 && raw.starts_with('[') && raw.ends_with(']') {
        MetaValue::List(split_list(&raw[1..raw.len() - 1]))
    } else {
        MetaValue::Text(parse_scalar(raw))
    }
}

pub fn parse_scalar(raw: &str) -> String {
    let raw = raw.trim();
    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        unescape(&raw[1..raw.len() - 1])
    } else if raw.len() >= 2 && raw.starts_with('\'') && raw.ends_with('\'') {
        raw[1..raw.len() - 1].to_string()
    } else {
        raw.to_string()
    }
}

/// Splits the inside of `[a, "b, c", 'd']`. Quoted items keep their commas
/// and whitespace, blank unquoted items are dropped.
fn split_list(inner: &str) -> Vec<String> {
    let mut items = vec![];
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut quoted_item = false;
    let mut chars = inner.chars().peekable();

    while let Some(c) = chars.next() {
        match quote {
            Some('"') => match c {
                '\\' => {
                    let next = chars.next();
                    push_escaped(&mut current, next);
                }
                '"' => quote = None,
                _ => current.push(c),
            },
            Some(q) => {
                if c == q {
                    quote = None;
                } else {
                    current.push(c);
                }
            }
            None => match c {
                ',' => {
                    push_item(&mut items, &current, quoted_item);
                    current.clear();
                    quoted_item = false;
                }
                // Anything between a closing quote and the comma is noise
                _ if quoted_item => {}
                '"' | '\'' if current.trim().is_empty() => {
                    current.clear();
                    quote = Some(c);
                    quoted_item = true;
                }
                _ => current.push(c),
            },
        }
    }
    push_item(&mut items, &current, quoted_item);

    items
}

fn push_item(items: &mut Vec<String>, raw: &str, quoted: bool) {
    if quoted {
        items.push(raw.to_string());
    } else {
        let item = raw.trim();
        if !item.is_empty() {
            items.push(item.to_string());
        }
    }
}

fn push_escaped(buf: &mut String, escaped: Option<char>) {
    match escaped {
        Some('n') => buf.push('\n'),
        Some('r') => buf.push('\r'),
        Some('t') => buf.push('\t'),
        Some('"') => buf.push('"'),
        Some('\\') => buf.push('\\'),
        Some(other) => {
            buf.push('\\');
            buf.push(other);
        }
        None => buf.push('\\'),
    }
}

fn unescape(quoted: &str) -> String {
    let mut res = String::with_capacity(quoted.len());
    let mut chars = quoted.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            push_escaped(&mut res, chars.next());
        } else {
            res.push(c);
        }
    }
    res
}

fn escape(text: &str) -> String {
    let mut res = String::with_capacity(text.len() + 2);
    for c in text.chars() {
        match c {
            '\\' => res.push_str("\\\\"),
            '"' => res.push_str("\\\""),
            '\n' => res.push_str("\\n"),
            '\r' => res.push_str("\\r"),
            '\t' => res.push_str("\\t"),
            _ => res.push(c),
        }
    }
    res
}

fn needs_quotes(text: &str) -> bool {
    text.is_empty()
        || text.trim() != text
        || text.starts_with(['"', '\'', '['])
        || text.contains(['\n', '\r'])
}

fn format_scalar(text: &str, in_list: bool) -> String {
    if needs_quotes(text) || (in_list && text.contains(',')) {
        format!("\"{}\"", escape(text))
    } else {
        text.to_string()
    }
}

pub fn format_value(value: &MetaValue) -> String {
    match value {
        MetaValue::Text(text) => format_scalar(text, false),
        MetaValue::List(items) => {
            let items: Vec<String> = items.iter()
                .map(|item| format_scalar(item, true))
                .collect();
            format!("[{}]", items.join(", "))
        }
    }
}

fn heading_text(line: &str) -> Option<&str> {
    let line = line.trim_end_matches(['\n', '\r']);
    let rest = line.strip_prefix('#')?;
    if !rest.starts_with([' ', '\t']) {
        return None;
    }
    let title = rest.trim();
    if title.is_empty() {
        None
    } else {
        Some(title)
    }
}

fn is_fence(line: &str) -> bool {
    let line = line.trim_start();
    line.starts_with("```") || line.starts_with("~~~")
}

/// First level-one heading outside fenced code, with the byte range of its line.
pub fn find_title_heading(body: &str) -> Option<(String, Range<usize>)> {
    let mut offset = 0;
    let mut in_fence = false;

    for line in body.split_inclusive('\n') {
        let start = offset;
        offset += line.len();

        if is_fence(line) {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }
        if let Some(title) = heading_text(line) {
            return Some((title.to_string(), start..offset));
        }
    }

    None
}

/// Removes the heading line. When the heading opened the body, the blank
/// lines around it go too.
pub fn remove_heading(body: &str, heading: Range<usize>) -> String {
    let before = &body[..heading.start];
    let after = &body[heading.end..];

    if !before.trim().is_empty() {
        return format!("{}{}", before, after);
    }

    let mut rest = after;
    while let Some(line) = rest.split_inclusive('\n').next() {
        if !line.trim().is_empty() {
            break;
        }
        rest = &rest[line.len()..];
    }
    rest.to_string()
}

/// First non-blank line, without leading heading or quote markers.
pub fn first_text_line(body: &str) -> Option<&str> {
    body.lines()
        .map(|line| line.trim().trim_start_matches(['#', '>']).trim())
        .find(|line| !line.is_empty())
}

/// First line of prose: not blank, not a heading, a comment or a code fence.
pub fn first_paragraph_line(body: &str) -> Option<&str> {
    let mut in_fence = false;
    for line in body.lines() {
        if is_fence(line) {
            in_fence = !in_fence;
            continue;
        }
        let line = line.trim();
        if in_fence || line.is_empty() || line.starts_with('#') || line.starts_with("<!--") {
            continue;
        }
        return Some(line);
    }
    None
}
