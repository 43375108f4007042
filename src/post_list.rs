use std::{fs, io};
use std::path::{Path, PathBuf};

pub struct PostList {
    pub root_dir: PathBuf,
}

pub fn is_post_file(file_name: &str) -> bool {
    if file_name.starts_with('.') {
        return false;
    }
    let lower = file_name.to_ascii_lowercase();
    lower.ends_with(".md") || lower.ends_with(".mdx")
}

impl PostList {
    pub fn new(root_dir: &Path) -> PostList {
        PostList {
            root_dir: root_dir.to_path_buf(),
        }
    }

    /// Markdown files of the directory, sorted by file name so runs are
    /// reproducible. Anything else is left alone.
    pub fn retrieve_files(&self) -> io::Result<Vec<PathBuf>> {
        let mut posts = vec![];
        let entries = fs::read_dir(self.root_dir.as_path())?;
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let file_name = entry.file_name();
            if let Some(file_name) = file_name.to_str() {
                if is_post_file(file_name) {
                    posts.push(entry.path());
                }
            }
        }
        posts.sort();
        Ok(posts)
    }
}
