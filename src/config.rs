use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::countdown::MalformedEntryPolicy;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LobbyConfig {
    pub app_name: String,
    pub target_fps: u32,
    pub prefs_path: PathBuf,
    pub reward_cooldown_secs: u64,
    pub on_malformed: MalformedEntryPolicy,
}

impl Default for LobbyConfig {
    fn default() -> Self {
        Self {
            app_name: "Lobby".to_string(),
            target_fps: 60,
            prefs_path: PathBuf::from("lobby-prefs.ron"),
            reward_cooldown_secs: 10,
            on_malformed: MalformedEntryPolicy::Discard,
        }
    }
}

impl LobbyConfig {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        ron::from_str(&raw).with_context(|| format!("failed to parse config {}", path.display()))
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "falling back to default config");
                Self::default()
            }
        }
    }
}
