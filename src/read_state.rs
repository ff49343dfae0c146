use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::RwLock,
};

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadState {
    pub last_chapter_id: Option<String>,
    #[serde(default)]
    pub read_chapter_ids: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

pub trait ReadStateStore: Send + Sync {
    fn get(&self, title_id: &str) -> Option<ReadState>;
}

/// Read state for every title, kept in one JSON object keyed by title hid.
#[derive(Debug, Default)]
pub struct JsonReadStateStore {
    path: Option<PathBuf>,
    states: RwLock<HashMap<String, ReadState>>,
}

impl JsonReadStateStore {
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub async fn load(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let states = match fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .with_context(|| format!("parse read state: {}", path.display()))?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(err) => {
                return Err(err).with_context(|| format!("read: {}", path.display()));
            }
        };

        Ok(Self {
            path: Some(path),
            states: RwLock::new(states),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn record(&self, title_id: &str, chapter_id: &str) {
        let mut states = self.states.write().unwrap_or_else(|err| err.into_inner());
        let state = states
            .entry(title_id.to_string())
            .or_insert_with(|| ReadState {
                last_chapter_id: None,
                read_chapter_ids: vec![],
                updated_at: Utc::now(),
            });
        state.last_chapter_id = Some(chapter_id.to_string());
        if !state.read_chapter_ids.iter().any(|id| id == chapter_id) {
            state.read_chapter_ids.push(chapter_id.to_string());
        }
        state.updated_at = Utc::now();
    }

    pub async fn save(&self) -> anyhow::Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let data = {
            let states = self.states.read().unwrap_or_else(|err| err.into_inner());
            serde_json::to_vec_pretty(&*states).context("serialize read state")?
        };
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("create dir: {}", parent.display()))?;
        }
        fs::write(path, data)
            .await
            .with_context(|| format!("write: {}", path.display()))?;
        Ok(())
    }
}

impl ReadStateStore for JsonReadStateStore {
    fn get(&self, title_id: &str) -> Option<ReadState> {
        let states = self.states.read().unwrap_or_else(|err| err.into_inner());
        states.get(title_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_is_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonReadStateStore::load(dir.path().join("state.json"))
            .await
            .unwrap();
        assert_eq!(store.get("h1"), None);
    }

    #[tokio::test]
    async fn record_then_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        let store = JsonReadStateStore::load(&path).await.unwrap();
        store.record("h1", "c1");
        store.record("h1", "c2");
        store.record("h1", "c1");
        store.save().await.unwrap();

        let reloaded = JsonReadStateStore::load(&path).await.unwrap();
        let state = reloaded.get("h1").unwrap();
        assert_eq!(state.last_chapter_id.as_deref(), Some("c1"));
        assert_eq!(state.read_chapter_ids, vec!["c1", "c2"]);
    }

    #[test]
    fn in_memory_store_skips_save_path() {
        let store = JsonReadStateStore::in_memory();
        store.record("h1", "c9");
        assert_eq!(store.path(), None);
        assert_eq!(
            store.get("h1").and_then(|s| s.last_chapter_id).as_deref(),
            Some("c9")
        );
    }
}
