use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::{env, fs, io};

use serde::Deserialize;

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Paths {
    pub inbox_dir: PathBuf,
    pub content_dir: PathBuf,
    pub archive_dir: PathBuf,
    pub error_dir: PathBuf,
    pub manifest_file: PathBuf,
    pub tag_index_file: Option<PathBuf>,
}

impl Default for Paths {
    fn default() -> Self {
        Paths {
            inbox_dir: PathBuf::from("content/_incoming"),
            content_dir: PathBuf::from("content/posts"),
            archive_dir: PathBuf::from("content/_processed"),
            error_dir: PathBuf::from("content/_errors"),
            manifest_file: PathBuf::from("public/content/index.json"),
            tag_index_file: None,
        }
    }
}

impl Paths {
    /// The default layout, rooted at `root` instead of the current directory.
    pub fn under(root: &Path) -> Paths {
        let defaults = Paths::default();
        Paths {
            inbox_dir: root.join(defaults.inbox_dir),
            content_dir: root.join(defaults.content_dir),
            archive_dir: root.join(defaults.archive_dir),
            error_dir: root.join(defaults.error_dir),
            manifest_file: root.join(defaults.manifest_file),
            tag_index_file: None,
        }
    }
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Defaults {
    /// Author of posts without one. If empty, OS user real name is being used
    pub author: String,
    pub tags: Vec<String>,
    pub category: String,
    /// File names that say nothing about the post, such as `untitled.md`
    pub placeholder_names: Vec<String>,
    pub excerpt_length: usize,
}

impl Default for Defaults {
    fn default() -> Self {
        Defaults {
            author: os_user_name(),
            tags: vec!["general".to_string()],
            category: "Uncategorized".to_string(),
            placeholder_names: vec!["untitled".to_string()],
            excerpt_length: 150,
        }
    }
}

#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct Log {
    pub level: LogLevel,
    pub log_to_console: bool,
    pub location: Option<PathBuf>,
}

impl Default for Log {
    fn default() -> Self {
        Log {
            level: LogLevel::Info,
            log_to_console: true,
            location: None,
        }
    }
}

#[derive(Deserialize, Copy, Clone, Debug, PartialEq)]
pub enum LogLevel {
    Critical = 0,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Deserialize, Default, Clone, Debug)]
#[serde(default)]
pub struct Config {
    pub paths: Paths,
    pub defaults: Defaults,
    pub log: Option<Log>,
}

pub fn os_user_name() -> String {
    let name = whoami::realname();
    if name.trim().is_empty() {
        return whoami::username();
    }
    name
}

fn parse_path(path: PathBuf) -> PathBuf {
    if !path.starts_with("${exe_dir}") {
        return path;
    }

    let exe_dir = env::current_exe().ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));
    match (exe_dir, path.to_str()) {
        (Some(exe_dir), Some(str_path)) => {
            PathBuf::from(str_path.replace("${exe_dir}", &exe_dir.to_string_lossy()))
        }
        _ => path,
    }
}

pub fn parse_config(cfg_content: &str) -> io::Result<Config> {
    let mut cfg: Config = match toml::from_str::<Config>(cfg_content) {
        Ok(cfg) => cfg,
        Err(e) => return Err(io::Error::new(
            ErrorKind::InvalidData, format!("Error parsing configuration file: {}", e))),
    };

    cfg.paths = Paths {
        inbox_dir: parse_path(cfg.paths.inbox_dir),
        content_dir: parse_path(cfg.paths.content_dir),
        archive_dir: parse_path(cfg.paths.archive_dir),
        error_dir: parse_path(cfg.paths.error_dir),
        manifest_file: parse_path(cfg.paths.manifest_file),
        tag_index_file: cfg.paths.tag_index_file.map(parse_path),
    };
    if let Some(ref mut log) = cfg.log {
        log.location = log.location.take().map(parse_path);
    }

    Ok(cfg)
}

pub fn read_config(cfg_path: &Path) -> io::Result<Config> {
    let cfg_content = match fs::read_to_string(cfg_path) {
        Ok(content) => content,
        Err(e) => return Err(io::Error::new(e.kind(), format!("Error opening configuration file {}: {}", cfg_path.display(), e))),
    };

    parse_config(&cfg_content)
}
