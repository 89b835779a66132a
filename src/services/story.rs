//! Story persistence boundary.
//!
//! The pipeline only needs keyed lookup/insert of story records; the trait
//! keeps the backing store swappable. The default implementation keeps one
//! JSON document per story id on disk.

use std::fs;
use std::path::PathBuf;

use log::{info, warn};

use crate::errors::{AppError, AppResult};
use crate::models::StoryRecord;

pub trait StoryStore: Send + Sync {
    /// Fetch a story by id. A missing id is the distinguished
    /// [`AppError::StoryNotFound`] outcome, which the pipeline treats as a
    /// terminal job-start failure.
    fn get(&self, id: &str) -> AppResult<StoryRecord>;

    fn insert(&self, record: &StoryRecord) -> AppResult<()>;
}

pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn record_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }
}

impl StoryStore for JsonFileStore {
    fn get(&self, id: &str) -> AppResult<StoryRecord> {
        let path = self.record_path(id);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Story not found: {id}");
                return Err(AppError::StoryNotFound(id.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        let record: StoryRecord = serde_json::from_str(&raw)?;
        Ok(record)
    }

    fn insert(&self, record: &StoryRecord) -> AppResult<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.record_path(&record.id);
        fs::write(&path, serde_json::to_string_pretty(record)?)?;
        info!("Story {} saved to {}", record.id, path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn insert_then_get_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().to_path_buf());
        let record = StoryRecord {
            id: "abc123".to_string(),
            topic: "transformers".to_string(),
            content: "Hello world.".to_string(),
            model: "deepseek/deepseek-r1-0528-qwen3-8b:free".to_string(),
            created_at: Utc::now(),
        };
        store.insert(&record).unwrap();

        let loaded = store.get("abc123").unwrap();
        assert_eq!(loaded.content, "Hello world.");
        assert_eq!(loaded.topic, "transformers");
    }

    #[test]
    fn missing_id_is_story_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().to_path_buf());
        let err = store.get("nope").unwrap_err();
        assert!(matches!(err, AppError::StoryNotFound(id) if id == "nope"));
    }
}
