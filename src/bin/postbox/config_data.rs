use std::fs::File;
use std::io;
use std::io::{ErrorKind, Write};
use std::path::Path;

const CONFIG_SAMPLE: &str = r#"# For the file locations, If you want it to be relative to the executable directory
# use ${exe_dir}/location
[paths]
inbox_dir = "content/_incoming"
content_dir = "content/posts"
archive_dir = "content/_processed"
error_dir = "content/_errors"
manifest_file = "public/content/index.json"
# tag_index_file = "public/content/tags.json"

# Values given to posts that do not have them
[defaults]
# author = "Jane Doe"
tags = ["general"]
category = "Uncategorized"
placeholder_names = ["untitled"]
excerpt_length = 150

[log]
level = "Info"
log_to_console = true
# location = "${exe_dir}/log/ingest.log"
"#;

pub(crate) fn write_sample_cfg(file_path: &Path) -> io::Result<()> {
    if file_path.exists() {
        return Err(io::Error::new(ErrorKind::AlreadyExists, format!("{} already exists", file_path.display())));
    }
    let mut file = File::create(file_path)?;
    file.write_all(CONFIG_SAMPLE.as_bytes())
}
