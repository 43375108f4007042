use std::collections::HashSet;
use std::fmt::{self, Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate, NaiveDateTime};
use spdlog::{debug, error, info, warn};

use crate::config::{Defaults, Paths};
use crate::content::PostRecord;
use crate::content::frontmatter::{decode, encode, Decoded, FallbackReason};
use crate::error::IngestError;
use crate::file_ops::{relocate, write_atomic};
use crate::manifest::{build_manifest, tag_index, write_manifest, write_tag_index};
use crate::normalizer::normalize;
use crate::post_list::PostList;
use crate::slug::post_file_name;

/// Where a file stands while being processed. `Archived` and `Quarantined`
/// are the terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileState {
    Pending,
    Read,
    Decoded,
    Normalized,
    Written,
    Archived,
    Failed,
    Quarantined,
}

impl Display for FileState {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileState::Pending => "pending",
            FileState::Read => "read",
            FileState::Decoded => "decoded",
            FileState::Normalized => "normalized",
            FileState::Written => "written",
            FileState::Archived => "archived",
            FileState::Failed => "failed",
            FileState::Quarantined => "quarantined",
        };
        write!(f, "{}", name)
    }
}

impl FileState {
    fn advance(&mut self, next: FileState, file_name: &str) {
        debug!("{}: {} -> {}", file_name, self, next);
        *self = next;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Written to the content store. `archived` is false when the original
    /// could not be moved out of the inbox.
    Published { destination: String, archived: bool },
    Quarantined { reason: String },
    /// Failed, and the move to the error directory failed too
    Stranded { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    pub file_name: String,
    pub outcome: Outcome,
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub files: Vec<FileOutcome>,
    pub manifest_entries: usize,
    /// Set when the inbox was processed but the manifest could not be rebuilt
    pub manifest_error: Option<IngestError>,
}

impl RunReport {
    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.files.iter().filter(|f| pred(&f.outcome)).count()
    }

    pub fn published(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Published { .. }))
    }

    pub fn quarantined(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Quarantined { .. }))
    }

    pub fn stranded(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Stranded { .. }))
    }
}

impl Display for RunReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} file(s) processed: {} published, {} quarantined, {} stranded. ",
               self.files.len(),
               self.published(),
               self.quarantined(),
               self.stranded(),
        )?;
        match self.manifest_error {
            Some(_) => write!(f, "Manifest was not written"),
            None => write!(f, "Manifest has {} entries", self.manifest_entries),
        }
    }
}

pub struct Pipeline {
    paths: Paths,
    defaults: Defaults,
    today_provider: Box<dyn Fn() -> NaiveDate + Send>,
}

impl Pipeline {
    pub fn new(paths: Paths, defaults: Defaults) -> Self {
        Self {
            paths,
            defaults,
            today_provider: Box::new(|| -> NaiveDate { Local::now().date_naive() }),
        }
    }

    #[cfg(test)]
    pub fn new_for_test(paths: Paths, defaults: Defaults, today_provider: Box<dyn Fn() -> NaiveDate + Send>) -> Self {
        Self {
            paths,
            defaults,
            today_provider,
        }
    }

    pub fn paths(&self) -> &Paths {
        &self.paths
    }

    fn prepare(&self) -> Result<(), IngestError> {
        let mut dirs: Vec<&Path> = vec![
            self.paths.inbox_dir.as_path(),
            self.paths.content_dir.as_path(),
            self.paths.archive_dir.as_path(),
            self.paths.error_dir.as_path(),
        ];
        dirs.extend(self.paths.manifest_file.parent());
        if let Some(ref tag_index_file) = self.paths.tag_index_file {
            dirs.extend(tag_index_file.parent());
        }

        for dir in dirs.into_iter().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|source| IngestError::Directory {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        Ok(())
    }

    /// Ingests every post of the inbox, then rebuilds the manifest from the
    /// content store. Setup errors abort the run. A manifest error comes back
    /// inside the report, next to the outcomes of the files already moved.
    pub fn run(&self) -> Result<RunReport, IngestError> {
        self.prepare()?;

        let inbox = &self.paths.inbox_dir;
        let files = PostList::new(inbox).retrieve_files().map_err(|source| IngestError::Listing {
            path: inbox.clone(),
            source,
        })?;

        let today = (self.today_provider)();
        if files.is_empty() {
            info!("No markdown files found in {}", inbox.display());
        } else {
            info!("Found {} file(s) to process in {}", files.len(), inbox.display());
        }

        let mut published = HashSet::new();
        let mut report = RunReport::default();
        for source in files.iter() {
            report.files.push(self.process_file(source, today, &mut published));
        }

        match self.write_indexes(today) {
            Ok(count) => report.manifest_entries = count,
            Err(err) => {
                error!("Inbox processed but the manifest is stale: {}", err);
                report.manifest_error = Some(err);
            }
        }
        Ok(report)
    }

    /// Rebuilds the manifest without touching the inbox.
    pub fn rebuild_manifest(&self) -> Result<usize, IngestError> {
        self.prepare()?;
        self.write_indexes((self.today_provider)())
    }

    fn write_indexes(&self, today: NaiveDate) -> Result<usize, IngestError> {
        let content_dir = &self.paths.content_dir;
        let entries = build_manifest(content_dir, today, &self.defaults).map_err(|source| IngestError::Listing {
            path: content_dir.clone(),
            source,
        })?;

        let manifest_file = &self.paths.manifest_file;
        write_manifest(manifest_file, &entries).map_err(|source| IngestError::Manifest {
            path: manifest_file.clone(),
            source,
        })?;
        info!("Manifest {} written with {} entries", manifest_file.display(), entries.len());

        if let Some(ref tag_index_file) = self.paths.tag_index_file {
            let tags = tag_index(&entries);
            write_tag_index(tag_index_file, &tags).map_err(|source| IngestError::Manifest {
                path: tag_index_file.clone(),
                source,
            })?;
            info!("Tag index {} written with {} tags", tag_index_file.display(), tags.len());
        }

        Ok(entries.len())
    }

    fn process_file(&self, source: &Path, today: NaiveDate, published: &mut HashSet<String>) -> FileOutcome {
        let file_name = source.file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        let mut state = FileState::Pending;
        let now: NaiveDateTime = Local::now().naive_local();

        match self.publish(source, &file_name, today, published, &mut state) {
            Ok(record) => {
                let destination = record.destination_file_name.unwrap_or_default();
                let archived = match relocate(source, &self.paths.archive_dir, &now) {
                    Ok(archive_path) => {
                        state.advance(FileState::Archived, &file_name);
                        debug!("Archived {} as {}", file_name, archive_path.display());
                        true
                    }
                    Err(e) => {
                        warn!("Published {} ({}, archive failed), the original stays in the inbox: {}", file_name, state, e);
                        false
                    }
                };
                info!("Processed {} -> {}", file_name, destination);

                FileOutcome {
                    file_name,
                    outcome: Outcome::Published { destination, archived },
                }
            }
            Err(err) => {
                error!("Error processing {} ({}): {}", file_name, state, err);
                state.advance(FileState::Failed, &file_name);

                let reason = err.to_string();
                let outcome = match relocate(source, &self.paths.error_dir, &now) {
                    Ok(error_path) => {
                        state.advance(FileState::Quarantined, &file_name);
                        warn!("Moved {} to {}", file_name, error_path.display());
                        Outcome::Quarantined { reason }
                    }
                    Err(e) => {
                        error!("Could not move {} to the error directory, leaving it in the inbox: {}", file_name, e);
                        Outcome::Stranded { reason: format!("{}; quarantine failed: {}", reason, e) }
                    }
                };

                FileOutcome {
                    file_name,
                    outcome,
                }
            }
        }
    }

    fn publish(&self, source: &Path, file_name: &str, today: NaiveDate,
               published: &mut HashSet<String>, state: &mut FileState) -> Result<PostRecord, IngestError> {
        let raw_text = fs::read_to_string(source).map_err(|source_err| IngestError::Read {
            path: source.to_path_buf(),
            source: source_err,
        })?;
        let mut record = PostRecord::new(file_name.to_string(), raw_text);
        state.advance(FileState::Read, file_name);

        let decoded = decode(&record.raw_text);
        if let Decoded::Fallback { reason: FallbackReason::Unterminated, .. } = decoded {
            warn!("{}: frontmatter is never closed, reading the whole file as body", file_name);
        }
        let (metadata, body) = decoded.into_parts();
        state.advance(FileState::Decoded, file_name);

        let post = normalize(metadata, &body, file_name, today, &self.defaults);
        record.metadata = post.metadata;
        record.body = post.body;
        state.advance(FileState::Normalized, file_name);

        let destination_name = post_file_name(&post.date, &post.slug, &record.extension())?;
        if published.contains(&destination_name) {
            return Err(IngestError::Collision(destination_name));
        }

        let destination: PathBuf = self.paths.content_dir.join(&destination_name);
        if destination.exists() {
            info!("Replacing {} with the content of {}", destination_name, file_name);
        }
        write_atomic(&destination, &encode(&record.metadata, &record.body)).map_err(|source_err| IngestError::Write {
            path: destination.clone(),
            source: source_err,
        })?;
        published.insert(destination_name.clone());
        record.destination_file_name = Some(destination_name);
        state.advance(FileState::Written, file_name);

        Ok(record)
    }
}
