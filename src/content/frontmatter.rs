use std::fmt::Write;

use crate::content::{Metadata, MetaValue};
use crate::content::parsing_utils::{extract_key_val, extract_list_item, format_value, parse_scalar, parse_value};

pub const MARKER: &str = "---";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// The text does not open with a marker line
    NoFrontmatter,
    /// Opening marker without a closing one
    Unterminated,
}

/// Result of decoding a post. A fallback carries the whole input as body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    Parsed { metadata: Metadata, body: String },
    Fallback { body: String, reason: FallbackReason },
}

impl Decoded {
    pub fn is_parsed(&self) -> bool {
        matches!(self, Decoded::Parsed { .. })
    }

    pub fn into_parts(self) -> (Metadata, String) {
        match self {
            Decoded::Parsed { metadata, body } => (metadata, body),
            Decoded::Fallback { body, .. } => (Metadata::new(), body),
        }
    }
}

fn is_marker(line: &str) -> bool {
    line.trim_end() == MARKER
}

/// Example of post
/// ---
/// title: What I learned
/// date: 2024-02-12
/// tags: [rust, career]
/// ---
///
/// Body starts here
pub fn decode(raw_text: &str) -> Decoded {
    let text = raw_text.strip_prefix('\u{feff}').unwrap_or(raw_text);
    let mut lines = text.split_inclusive('\n');

    let opened = match lines.next() {
        Some(first) => is_marker(first).then_some(first.len()),
        None => None,
    };
    let Some(mut offset) = opened else {
        return Decoded::Fallback {
            body: raw_text.to_string(),
            reason: FallbackReason::NoFrontmatter,
        };
    };

    let mut block = vec![];
    for line in lines {
        offset += line.len();
        if is_marker(line) {
            return Decoded::Parsed {
                metadata: parse_block(&block),
                body: text[offset..].to_string(),
            };
        }
        block.push(line);
    }

    Decoded::Fallback {
        body: raw_text.to_string(),
        reason: FallbackReason::Unterminated,
    }
}

fn parse_block(lines: &[&str]) -> Metadata {
    let mut metadata = Metadata::new();
    // Set while a `key:` line may be followed by `- item` lines
    let mut block_key: Option<String> = None;

    for line in lines {
        let line = line.trim_end_matches(['\n', '\r']);

        if let Some(ref key) = block_key {
            if let Some(item) = extract_list_item(line) {
                let mut items = match metadata.get(key) {
                    Some(MetaValue::List(items)) => items.clone(),
                    _ => vec![],
                };
                if !item.is_empty() {
                    items.push(parse_scalar(item));
                }
                metadata.insert(key.clone(), MetaValue::List(items));
                continue;
            }
        }
        block_key = None;

        let Some((key, raw)) = extract_key_val(line) else {
            continue;
        };
        if raw.is_empty() {
            block_key = Some(key.to_string());
        }
        metadata.insert(key, parse_value(raw));
    }

    metadata
}

pub fn encode(metadata: &Metadata, body: &str) -> String {
    let mut buf = String::new();

    let _ = writeln!(&mut buf, "{}", MARKER);
    for (key, value) in metadata.iter() {
        let _ = writeln!(&mut buf, "{}: {}", key, format_value(value));
    }
    let _ = writeln!(&mut buf, "{}", MARKER);
    buf.push_str(body);

    buf
}

#[cfg(test)]
mod tests {
    use crate::test_data::{BLOCK_LIST_POST, FRONTMATTER_POST};

    use super::*;

    fn list(items: &[&str]) -> MetaValue {
        MetaValue::List(items.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_decode_frontmatter() {
        let decoded = decode(FRONTMATTER_POST);
        assert!(decoded.is_parsed());
        let (metadata, body) = decoded.into_parts();

        assert_eq!(metadata.text("title"), Some("What I learned after 20+ years: a list"));
        assert_eq!(metadata.text("date"), Some("2022-04-02"));
        assert_eq!(metadata.get("tags"), Some(&list(&["career", "software", "career"])));
        assert_eq!(metadata.text("description"), Some("Advice, mostly"));
        assert!(body.starts_with("How to be a great software engineer?"));
    }

    #[test]
    fn test_decode_block_list() {
        let (metadata, body) = decode(BLOCK_LIST_POST).into_parts();
        assert_eq!(metadata.get("tags"), Some(&list(&["rust", "tools"])));
        assert_eq!(metadata.text("author"), Some("thiago"));
        assert_eq!(metadata.get("empty"), Some(&MetaValue::from("")));
        assert_eq!(body, "Body\n");
    }

    #[test]
    fn test_decode_without_frontmatter() {
        let raw = "Just some notes, no frontmatter.";
        assert_eq!(decode(raw), Decoded::Fallback {
            body: raw.to_string(),
            reason: FallbackReason::NoFrontmatter,
        });

        // Marker must be at the very start
        let raw = "\n---\ntitle: x\n---\nbody";
        assert_eq!(decode(raw), Decoded::Fallback {
            body: raw.to_string(),
            reason: FallbackReason::NoFrontmatter,
        });

        assert_eq!(decode(""), Decoded::Fallback {
            body: String::new(),
            reason: FallbackReason::NoFrontmatter,
        });
    }

    #[test]
    fn test_decode_unterminated() {
        let raw = "---\ntitle: Never closed\n\n# Heading\n";
        let decoded = decode(raw);
        assert_eq!(decoded, Decoded::Fallback {
            body: raw.to_string(),
            reason: FallbackReason::Unterminated,
        });
        let (metadata, body) = decoded.into_parts();
        assert!(metadata.is_empty());
        assert_eq!(body, raw);
    }

    #[test]
    fn test_decode_ignores_noise() {
        let raw = "---\r\n# a comment\r\nno colon\r\ntitle: \"Quoted\"\r\n\r\ntitle: 'Replaced'\r\n---\r\nbody";
        let (metadata, body) = decode(raw).into_parts();
        assert_eq!(metadata.len(), 1);
        assert_eq!(metadata.text("title"), Some("Replaced"));
        assert_eq!(body, "body");
    }

    #[test]
    fn test_encode() {
        let metadata: Metadata = vec![
            ("title", MetaValue::from("Hello: World")),
            ("date", MetaValue::from("2024-01-01")),
            ("tags", list(&["a", "b"])),
            ("published", MetaValue::from("true")),
        ].into_iter().collect();

        let encoded = encode(&metadata, "\nBody\n");
        assert_eq!(encoded, "---\ntitle: Hello: World\ndate: 2024-01-01\ntags: [a, b]\npublished: true\n---\n\nBody\n");
    }

    #[test]
    fn test_round_trip() {
        let metadata: Metadata = vec![
            ("title", MetaValue::from("Quotes \"inside\" and \\ backslash")),
            ("subtitle", MetaValue::from("'leading quote")),
            ("empty", MetaValue::from("")),
            ("padded", MetaValue::from("  spaced  ")),
            ("multi line", MetaValue::from("first\nsecond")),
            ("bracketed", MetaValue::from("[looks like a list]")),
            ("tags", list(&["one", "two, three", " four ", "", "\"five\""])),
            ("none", list(&[])),
            ("url", MetaValue::from("https://example.com/a:b")),
        ].into_iter().collect();
        let body = "\n# Heading\n\n---\n\nText after a rule\n";

        let decoded = decode(&encode(&metadata, body));
        assert_eq!(decoded, Decoded::Parsed {
            metadata,
            body: body.to_string(),
        });
    }

    #[test]
    fn test_round_trip_empty() {
        let decoded = decode(&encode(&Metadata::new(), ""));
        assert_eq!(decoded, Decoded::Parsed {
            metadata: Metadata::new(),
            body: String::new(),
        });
    }
}
