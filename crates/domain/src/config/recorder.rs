use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Local message recorder
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Optional append-only log of relayed messages, one folder per identity.
/// Intended for local runs; disabled by default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecorderConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "d_dir")]
    pub dir: PathBuf,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            dir: d_dir(),
        }
    }
}

fn d_dir() -> PathBuf {
    PathBuf::from("conversations")
}
