use std::{fs, io};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

/// Writes next to the target and renames, so readers never see half a post.
pub fn write_atomic(path: &Path, content: &str) -> io::Result<()> {
    let file_name = match path.file_name() {
        Some(name) => name.to_string_lossy().to_string(),
        None => return Err(io::Error::new(ErrorKind::InvalidInput, format!("Invalid file path {}", path.display()))),
    };
    let tmp_path = path.with_file_name(format!(".{}.tmp", file_name));

    fs::write(&tmp_path, content)?;
    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }
    Ok(())
}

/// Rename, or copy then remove when source and target sit on different devices.
pub fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    fs::copy(from, to)?;
    fs::remove_file(from)
}

/// `dir/file_name`, or a timestamped variant of it when the name is taken.
pub fn unique_destination(dir: &Path, file_name: &str, now: &NaiveDateTime) -> PathBuf {
    let candidate = dir.join(file_name);
    if !candidate.exists() {
        return candidate;
    }

    let stamp = now.format("%Y%m%dT%H%M%S");
    let candidate = dir.join(format!("{}-{}", stamp, file_name));
    if !candidate.exists() {
        return candidate;
    }

    let mut counter = 1;
    loop {
        let candidate = dir.join(format!("{}-{}-{}", stamp, counter, file_name));
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

/// Moves `from` into `dir`, keeping its file name whenever possible.
pub fn relocate(from: &Path, dir: &Path, now: &NaiveDateTime) -> io::Result<PathBuf> {
    let file_name = match from.file_name() {
        Some(name) => name.to_string_lossy().to_string(),
        None => return Err(io::Error::new(ErrorKind::InvalidInput, format!("Invalid file path {}", from.display()))),
    };

    let destination = unique_destination(dir, &file_name, now);
    move_file(from, &destination)?;
    Ok(destination)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use tempfile::TempDir;

    use super::*;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 2, 27).unwrap().and_hms_opt(6, 20, 53).unwrap()
    }

    #[test]
    fn test_write_atomic() -> io::Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("post.md");

        write_atomic(&path, "first")?;
        write_atomic(&path, "second")?;

        assert_eq!(fs::read_to_string(&path)?, "second");
        assert!(!dir.path().join(".post.md.tmp").exists());
        Ok(())
    }

    #[test]
    fn test_write_atomic_missing_dir() {
        let dir = TempDir::new().unwrap();
        let res = write_atomic(&dir.path().join("nope").join("post.md"), "x");
        assert!(res.is_err());
    }

    #[test]
    fn test_relocate_keeps_name() -> io::Result<()> {
        let dir = TempDir::new()?;
        let inbox = dir.path().join("inbox");
        let archive = dir.path().join("archive");
        fs::create_dir_all(&inbox)?;
        fs::create_dir_all(&archive)?;
        fs::write(inbox.join("post.md"), "content")?;

        let dest = relocate(&inbox.join("post.md"), &archive, &now())?;

        assert_eq!(dest, archive.join("post.md"));
        assert!(!inbox.join("post.md").exists());
        assert_eq!(fs::read_to_string(dest)?, "content");
        Ok(())
    }

    #[test]
    fn test_relocate_never_overwrites() -> io::Result<()> {
        let dir = TempDir::new()?;
        fs::write(dir.path().join("post.md"), "old")?;
        fs::write(dir.path().join("20240227T062053-post.md"), "older")?;

        let first = unique_destination(dir.path(), "post.md", &now());
        assert_eq!(first, dir.path().join("20240227T062053-1-post.md"));

        let src = TempDir::new()?;
        fs::write(src.path().join("post.md"), "new")?;
        let dest = relocate(&src.path().join("post.md"), dir.path(), &now())?;
        assert_eq!(dest, first);
        assert_eq!(fs::read_to_string(dir.path().join("post.md"))?, "old");
        assert_eq!(fs::read_to_string(dest)?, "new");
        Ok(())
    }

    #[test]
    fn test_relocate_missing_source() {
        let dir = TempDir::new().unwrap();
        let res = relocate(&dir.path().join("ghost.md"), dir.path(), &now());
        assert!(res.is_err());
    }
}
