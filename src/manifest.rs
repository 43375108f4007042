use std::collections::HashMap;
use std::path::Path;
use std::{fs, io};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use spdlog::{debug, warn};

use crate::config::Defaults;
use crate::content::{AUTHOR, CATEGORY, DESCRIPTION, EXCERPT, PUBLISHED, TAGS};
use crate::content::frontmatter::decode;
use crate::content::parsing_utils::first_paragraph_line;
use crate::file_ops::write_atomic;
use crate::normalizer::normalize;
use crate::post_list::PostList;
use crate::text_utils::{excerpt, format_date, reading_time};

/// Summary of a published post, as the site reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub date: String,
    pub category: String,
    pub tags: Vec<String>,
    pub excerpt: String,
    pub author: String,
    pub reading_time: String,
    pub file: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

/// `None` for posts explicitly marked as drafts.
pub fn entry_from_post(file_name: &str, raw_text: &str, today: NaiveDate, defaults: &Defaults) -> Option<ManifestEntry> {
    let (metadata, body) = decode(raw_text).into_parts();

    if metadata.text(PUBLISHED).is_some_and(|p| p.eq_ignore_ascii_case("false")) {
        return None;
    }

    // Content store files are normalized already, this only covers hand edits
    let post = normalize(metadata, &body, file_name, today, defaults);
    let metadata = &post.metadata;

    let category = metadata.text(CATEGORY)
        .unwrap_or(defaults.category.as_str())
        .to_string();
    let summary = match metadata.text(EXCERPT).or_else(|| metadata.text(DESCRIPTION)) {
        Some(text) => text.to_string(),
        None => first_paragraph_line(&post.body)
            .map(|line| excerpt(line, defaults.excerpt_length))
            .unwrap_or_default(),
    };

    Some(ManifestEntry {
        id: post.slug.clone(),
        slug: post.slug.clone(),
        title: post.title.clone(),
        date: format_date(&post.date),
        category,
        tags: metadata.list(TAGS).map(|t| t.to_vec()).unwrap_or_default(),
        excerpt: summary,
        author: metadata.text(AUTHOR).unwrap_or_default().to_string(),
        reading_time: reading_time(&post.body),
        file: file_name.to_string(),
    })
}

/// Newest first. Posts of the same day keep their scan order.
pub fn sort_entries(entries: &mut [ManifestEntry]) {
    entries.sort_by(|a, b| b.date.cmp(&a.date));
}

pub fn build_manifest(content_dir: &Path, today: NaiveDate, defaults: &Defaults) -> io::Result<Vec<ManifestEntry>> {
    let files = PostList::new(content_dir).retrieve_files()?;

    let mut entries = Vec::with_capacity(files.len());
    for path in files {
        let file_name = path.file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();

        let raw_text = match fs::read_to_string(&path) {
            Ok(raw_text) => raw_text,
            Err(e) => {
                warn!("Skipping {} in manifest: {}", path.display(), e);
                continue;
            }
        };

        match entry_from_post(&file_name, &raw_text, today, defaults) {
            Some(entry) => entries.push(entry),
            None => debug!("Skipping draft {}", file_name),
        }
    }

    sort_entries(&mut entries);
    Ok(entries)
}

/// Tags by number of posts, most used first.
pub fn tag_index(entries: &[ManifestEntry]) -> Vec<TagCount> {
    let mut tag_map: HashMap<&str, usize> = HashMap::new();
    for entry in entries {
        for tag in entry.tags.iter() {
            *tag_map.entry(tag.as_str()).or_insert(0) += 1;
        }
    }

    let mut tags: Vec<TagCount> = tag_map.into_iter()
        .map(|(tag, count)| TagCount { tag: tag.to_string(), count })
        .collect();
    tags.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.tag.cmp(&b.tag)));
    tags
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    write_atomic(path, &json)
}

pub fn write_manifest(path: &Path, entries: &[ManifestEntry]) -> io::Result<()> {
    write_json(path, entries)
}

pub fn write_tag_index(path: &Path, tags: &[TagCount]) -> io::Result<()> {
    write_json(path, tags)
}
