use chrono::NaiveDate;

use crate::config::Defaults;
use crate::content::{AUTHOR, DATE, Metadata, MetaValue, PUBLISHED, SLUG, TAGS, TITLE};
use crate::content::parsing_utils::{find_title_heading, first_text_line, remove_heading};
use crate::slug::slugify;
use crate::text_utils::{format_date, parse_date, title_case, truncate_words};

const MAX_TITLE_CHARS: usize = 80;
const UNTITLED: &str = "Untitled";

pub struct Normalized {
    pub metadata: Metadata,
    pub body: String,
    pub title: String,
    pub date: NaiveDate,
    pub slug: String,
}

/// Fills the fields every published post must have. Values that are already
/// there and valid are left untouched, missing ones are appended.
pub fn normalize(metadata: Metadata, body: &str, source_file_name: &str, today: NaiveDate, defaults: &Defaults) -> Normalized {
    let mut metadata = metadata;
    let mut body = body.to_string();
    let stem = file_stem(source_file_name);

    let title = match metadata.text(TITLE) {
        Some(title) => title.to_string(),
        None => {
            let (title, stripped) = derive_title(&body, stem, defaults);
            body = stripped;
            metadata.insert(TITLE, MetaValue::Text(title.clone()));
            title
        }
    };

    let date = metadata.text(DATE)
        .and_then(|date| parse_date(date).ok())
        .unwrap_or(today);
    metadata.insert(DATE, MetaValue::Text(format_date(&date)));

    if metadata.text(AUTHOR).is_none() {
        metadata.insert(AUTHOR, MetaValue::Text(defaults.author.clone()));
    }

    let tags = metadata.list(TAGS).map(unique_tags).unwrap_or_default();
    let tags = if tags.is_empty() {
        unique_tags(&defaults.tags)
    } else {
        tags
    };
    metadata.insert(TAGS, MetaValue::List(tags));

    let slug = match metadata.text(SLUG) {
        Some(slug) => slug.to_string(),
        None => {
            let mut slug = slugify(&title);
            if slug.is_empty() {
                slug = slugify(stem);
            }
            metadata.insert(SLUG, MetaValue::Text(slug.clone()));
            slug
        }
    };

    metadata.insert(PUBLISHED, MetaValue::Text("true".to_string()));

    Normalized {
        metadata,
        body,
        title,
        date,
        slug,
    }
}

fn file_stem(file_name: &str) -> &str {
    match file_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file_name,
    }
}

/// `untitled`, `Untitled 2`, `untitled-(3)`...
fn is_placeholder(stem: &str, defaults: &Defaults) -> bool {
    let stem = stem.trim().to_lowercase();
    defaults.placeholder_names.iter().any(|name| {
        let name = name.to_lowercase();
        match stem.strip_prefix(name.as_str()) {
            Some(rest) => rest.chars().all(|c| c.is_ascii_digit() || c.is_whitespace() || "-_()".contains(c)),
            None => false,
        }
    })
}

/// Title and the body left once the title is taken out of it.
fn derive_title(body: &str, stem: &str, defaults: &Defaults) -> (String, String) {
    if let Some((title, heading)) = find_title_heading(body) {
        return (title, remove_heading(body, heading));
    }

    if is_placeholder(stem, defaults) {
        if let Some(line) = first_text_line(body) {
            return (truncate_words(line, MAX_TITLE_CHARS), body.to_string());
        }
    }

    let title = title_case(stem);
    if title.is_empty() {
        (UNTITLED.to_string(), body.to_string())
    } else {
        (title, body.to_string())
    }
}

fn unique_tags(tags: &[String]) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !unique.iter().any(|t| t == tag) {
            unique.push(tag.to_string());
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use crate::content::frontmatter::decode;
    use crate::test_data::{COMPLETE_POST, HEADING_POST, test_defaults};

    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn tags(items: &[&str]) -> MetaValue {
        MetaValue::List(items.iter().map(|s| s.to_string()).collect())
    }

    fn meta(pairs: &[(&str, MetaValue)]) -> Metadata {
        pairs.iter().cloned().collect()
    }

    #[test]
    fn test_title_from_heading() {
        let (metadata, body) = decode(HEADING_POST).into_parts();
        let res = normalize(metadata, &body, "some-file.md", today(), &test_defaults());

        assert_eq!(res.title, "My Title");
        assert_eq!(res.metadata.text("title"), Some("My Title"));
        assert_eq!(res.body, "Some text");
        assert_eq!(res.slug, "my-title");
    }

    #[test]
    fn test_complete_post_is_unchanged() {
        let (metadata, body) = decode(COMPLETE_POST).into_parts();
        let res = normalize(metadata.clone(), &body, "whatever.md", today(), &test_defaults());

        assert_eq!(res.metadata, metadata);
        assert_eq!(res.body, body);
        assert_eq!(res.date, NaiveDate::from_ymd_opt(2020, 5, 22).unwrap());
        assert_eq!(res.slug, "how-to-write-a-code-review");
    }

    #[test]
    fn test_normalize_twice() {
        let first = normalize(Metadata::new(), HEADING_POST, "x.md", today(), &test_defaults());
        let second = normalize(first.metadata.clone(), &first.body, "x.md", today(), &test_defaults());
        assert_eq!(second.metadata, first.metadata);
        assert_eq!(second.body, first.body);
    }

    #[test]
    fn test_everything_missing() {
        let body = "Just some notes, no frontmatter.";
        let res = normalize(Metadata::new(), body, "untitled.md", today(), &test_defaults());

        assert_eq!(res.metadata, meta(&[
            ("title", MetaValue::from("Just some notes, no frontmatter.")),
            ("date", MetaValue::from("2024-06-15")),
            ("author", MetaValue::from("thiago")),
            ("tags", tags(&["general"])),
            ("slug", MetaValue::from("just-some-notes-no-frontmatter")),
            ("published", MetaValue::from("true")),
        ]));
        assert_eq!(res.body, body);
    }

    #[test]
    fn test_title_from_file_name() {
        let res = normalize(Metadata::new(), "No heading here", "my-first_post.md", today(), &test_defaults());
        assert_eq!(res.title, "My First Post");
        assert_eq!(res.slug, "my-first-post");
        assert_eq!(res.body, "No heading here");

        let res = normalize(Metadata::new(), "", "Untitled 2.md", today(), &test_defaults());
        assert_eq!(res.title, "Untitled 2");
    }

    #[test]
    fn test_placeholder_names() {
        let defaults = test_defaults();
        assert!(is_placeholder("untitled", &defaults));
        assert!(is_placeholder("Untitled-(3)", &defaults));
        assert!(!is_placeholder("untitled-thoughts", &defaults));
        assert!(!is_placeholder("notes", &defaults));
    }

    #[test]
    fn test_dates() {
        let res = normalize(meta(&[("date", MetaValue::from("March 1, 2024"))]), "", "a.md", today(), &test_defaults());
        assert_eq!(res.metadata.text("date"), Some("2024-03-01"));

        let res = normalize(meta(&[("date", MetaValue::from("not a date"))]), "", "a.md", today(), &test_defaults());
        assert_eq!(res.metadata.text("date"), Some("2024-06-15"));
        assert_eq!(res.date, today());

        let res = normalize(meta(&[("date", MetaValue::from("March 1, +12345"))]), "", "a.md", today(), &test_defaults());
        assert_eq!(res.metadata.text("date"), Some("2024-06-15"));

        let res = normalize(meta(&[("date", tags(&["2024-01-01"]))]), "", "a.md", today(), &test_defaults());
        assert_eq!(res.metadata.text("date"), Some("2024-06-15"));
    }

    #[test]
    fn test_tags() {
        let res = normalize(meta(&[("tags", tags(&["ai", "AI", "ai"]))]), "", "a.md", today(), &test_defaults());
        assert_eq!(res.metadata.get("tags"), Some(&tags(&["ai", "AI"])));

        let res = normalize(meta(&[("tags", MetaValue::from("rust"))]), "", "a.md", today(), &test_defaults());
        assert_eq!(res.metadata.get("tags"), Some(&tags(&["general"])));

        let res = normalize(meta(&[("tags", tags(&[]))]), "", "a.md", today(), &test_defaults());
        assert_eq!(res.metadata.get("tags"), Some(&tags(&["general"])));
    }

    #[test]
    fn test_explicit_slug_is_kept() {
        let res = normalize(meta(&[
            ("title", MetaValue::from("A Title")),
            ("slug", MetaValue::from("Weird Slug!")),
        ]), "", "a.md", today(), &test_defaults());
        assert_eq!(res.slug, "Weird Slug!");
        assert_eq!(res.metadata.text("slug"), Some("Weird Slug!"));
    }

    #[test]
    fn test_slug_falls_back_to_file_name() {
        let res = normalize(meta(&[("title", MetaValue::from("!!!"))]), "", "bang-bang.md", today(), &test_defaults());
        assert_eq!(res.slug, "bang-bang");
    }

    #[test]
    fn test_published_is_forced() {
        let res = normalize(meta(&[("published", MetaValue::from("false"))]), "", "a.md", today(), &test_defaults());
        assert_eq!(res.metadata.text("published"), Some("true"));
    }

    #[test]
    fn test_blank_author_replaced() {
        let res = normalize(meta(&[("author", MetaValue::from(""))]), "", "a.md", today(), &test_defaults());
        assert_eq!(res.metadata.text("author"), Some("thiago"));
        let keys: Vec<&str> = res.metadata.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["author", "title", "date", "tags", "slug", "published"]);
    }
}
