// File LogSink Implementation

use async_trait::async_trait;
use crm_core::error::Result;
use crm_core::port::LogSink;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

/// Appends newline-terminated lines to one fixed file
///
/// The file (and its parent directory) is created on first write.
/// Existing content is never truncated or rewritten.
pub struct FileLogSink {
    path: PathBuf,
    location: String,
}

impl FileLogSink {
    /// `~` at the start of the path is expanded
    pub fn new(path: impl AsRef<str>) -> Self {
        let expanded = shellexpand::tilde(path.as_ref()).into_owned();
        Self {
            path: PathBuf::from(&expanded),
            location: expanded,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl LogSink for FileLogSink {
    fn location(&self) -> &str {
        &self.location
    }

    async fn append_line(&self, line: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;

        let mut buf = String::with_capacity(line.len() + 1);
        buf.push_str(line);
        buf.push('\n');
        file.write_all(buf.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}
