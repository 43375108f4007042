pub mod frontmatter;
pub mod parsing_utils;

pub const TITLE: &str = "title";
pub const DATE: &str = "date";
pub const AUTHOR: &str = "author";
pub const TAGS: &str = "tags";
pub const SLUG: &str = "slug";
pub const CATEGORY: &str = "category";
pub const DESCRIPTION: &str = "description";
pub const EXCERPT: &str = "excerpt";
pub const PUBLISHED: &str = "published";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaValue {
    Text(String),
    List(Vec<String>),
}

impl MetaValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            MetaValue::Text(s) => Some(s.as_str()),
            MetaValue::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            MetaValue::Text(_) => None,
            MetaValue::List(items) => Some(items.as_slice()),
        }
    }
}

impl From<&str> for MetaValue {
    fn from(value: &str) -> Self {
        MetaValue::Text(value.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(value: String) -> Self {
        MetaValue::Text(value)
    }
}

impl From<Vec<String>> for MetaValue {
    fn from(value: Vec<String>) -> Self {
        MetaValue::List(value)
    }
}

/// Frontmatter keys and values, in the order they were written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    entries: Vec<(String, MetaValue)>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.entries.iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Text value of `key`, trimmed. Blank values count as missing.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key)
            .and_then(|v| v.as_text())
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }

    pub fn list(&self, key: &str) -> Option<&[String]> {
        self.get(key).and_then(|v| v.as_list())
    }

    /// Replaces the value in place when the key exists, appends it otherwise.
    pub fn insert(&mut self, key: impl Into<String>, value: MetaValue) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item=(&str, &MetaValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, MetaValue)> for Metadata {
    fn from_iter<I: IntoIterator<Item=(K, MetaValue)>>(iter: I) -> Self {
        let mut metadata = Metadata::new();
        for (key, value) in iter {
            metadata.insert(key, value);
        }
        metadata
    }
}

/// One inbox file on its way through the pipeline.
#[derive(Debug, Clone)]
pub struct PostRecord {
    pub source_file_name: String,
    pub raw_text: String,
    pub metadata: Metadata,
    pub body: String,
    pub destination_file_name: Option<String>,
}

impl PostRecord {
    pub fn new(source_file_name: String, raw_text: String) -> Self {
        PostRecord {
            source_file_name,
            raw_text,
            metadata: Metadata::new(),
            body: String::new(),
            destination_file_name: None,
        }
    }

    /// Extension of the source file, lowercased. Defaults to `md`.
    pub fn extension(&self) -> String {
        match self.source_file_name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => ext.to_ascii_lowercase(),
            _ => "md".to_string(),
        }
    }
}
