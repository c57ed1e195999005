//! Append-only local message log.
//!
//! Each identity gets `<dir>/<UserID_x|RoomID_x|GroupID_x>/messages.txt`;
//! every relayed message is appended as one tab-separated line
//! `<rfc3339>\t<role>\t<text>`.  Recording is best-effort: callers log
//! failures and carry on.

use std::path::{Path, PathBuf};

use chrono::Utc;

use lr_domain::error::{Error, Result};
use lr_domain::identity::IdentityKey;
use lr_domain::trace::TraceEvent;

/// Sink for relayed messages.
#[async_trait::async_trait]
pub trait MessageRecorder: Send + Sync {
    async fn record(&self, identity: &IdentityKey, role: &str, text: &str) -> Result<()>;
}

/// Writes messages under a base directory, one folder per identity.
pub struct FileRecorder {
    base_dir: PathBuf,
}

impl FileRecorder {
    pub fn new(base_dir: &Path) -> Self {
        Self {
            base_dir: base_dir.to_path_buf(),
        }
    }

    /// Path of the message file for an identity.
    pub fn file_for(&self, identity: &IdentityKey) -> PathBuf {
        self.base_dir
            .join(identity.folder_name())
            .join("messages.txt")
    }
}

#[async_trait::async_trait]
impl MessageRecorder for FileRecorder {
    async fn record(&self, identity: &IdentityKey, role: &str, text: &str) -> Result<()> {
        let path = self.file_for(identity);
        let line = format_line(role, text);

        // File I/O on a blocking thread so the runtime never stalls.
        tokio::task::spawn_blocking(move || {
            use std::io::Write;
            if let Some(dir) = path.parent() {
                std::fs::create_dir_all(dir)?;
            }
            let mut file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)?;
            file.write_all(line.as_bytes())?;
            Ok::<(), Error>(())
        })
        .await
        .map_err(|e| Error::Other(format!("spawn_blocking join: {e}")))??;

        TraceEvent::MessageRecorded {
            identity: identity.to_string(),
            role: role.to_owned(),
        }
        .emit();

        Ok(())
    }
}

/// One log line.  Newlines and tabs inside the text are escaped so each
/// message stays on a single line.
fn format_line(role: &str, text: &str) -> String {
    let escaped = text
        .replace('\\', "\\\\")
        .replace('\n', "\\n")
        .replace('\t', "\\t");
    format!("{}\t{role}\t{escaped}\n", Utc::now().to_rfc3339())
}
