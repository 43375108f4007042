use chrono::NaiveDate;

use crate::error::IngestError;
use crate::text_utils::format_date;

pub fn slugify(text: &str) -> String {
    let ascii = unidecode::unidecode(text).to_lowercase();

    let mut slug = String::with_capacity(ascii.len());
    let mut pending_dash = false;

    for c in ascii.chars() {
        match c {
            'a'..='z' | '0'..='9' => {
                if pending_dash && !slug.is_empty() {
                    slug.push('-');
                }
                pending_dash = false;
                slug.push(c);
            }
            '-' => pending_dash = true,
            c if c.is_whitespace() => pending_dash = true,
            _ => {}
        }
    }

    slug
}

/// Slugs come verbatim from frontmatter, so they are checked before being
/// turned into a path.
fn is_safe_file_stem(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('.')
        && !slug.contains("..")
        && !slug.contains(['/', '\\'])
        && !slug.chars().any(char::is_control)
}

/// `<YYYY-MM-DD>-<slug>.<ext>`
pub fn post_file_name(date: &NaiveDate, slug: &str, ext: &str) -> Result<String, IngestError> {
    if !is_safe_file_stem(slug) {
        return Err(IngestError::UnsafeSlug(slug.to_string()));
    }
    Ok(format!("{}-{}.{}", format_date(date), slug, ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("  multiple   spaces "), "multiple-spaces");
        assert_eq!(slugify("Just some notes, no frontmatter."), "just-some-notes-no-frontmatter");
        assert_eq!(slugify("Post title of mine - dir2"), "post-title-of-mine-dir2");
        assert_eq!(slugify("--Already--slugged--"), "already-slugged");
        assert_eq!(slugify("snake_case_title"), "snakecasetitle");
        assert_eq!(slugify("Don't stop"), "dont-stop");
    }

    #[test]
    fn test_slugify_transliterates() {
        assert_eq!(slugify("Post title of mine ábaco"), "post-title-of-mine-abaco");
        assert_eq!(slugify("Ação rápida"), "acao-rapida");
    }

    #[test]
    fn test_slugify_edge_cases() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("!!!"), "");
        let slug = slugify("Hello, World!");
        assert_eq!(slugify(&slug), slug);
    }

    #[test]
    fn test_post_file_name() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let name = post_file_name(&date, "post-title-of-mine", "md").unwrap();
        assert_eq!(name, "2024-02-29-post-title-of-mine.md");
        let name = post_file_name(&date, "Verbatim_Slug", "mdx").unwrap();
        assert_eq!(name, "2024-02-29-Verbatim_Slug.mdx");
    }

    #[test]
    fn test_post_file_name_rejects_unsafe_slug() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        for slug in ["", "../escape", "nested/slug", "back\\slash", ".hidden", "tab\there"] {
            assert!(matches!(post_file_name(&date, slug, "md"), Err(IngestError::UnsafeSlug(_))), "{}", slug);
        }
    }
}
