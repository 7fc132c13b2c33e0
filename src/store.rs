//! Local persistence for saved and shared prompts, feedback, presets and
//! daily usage counters.
//!
//! The whole store is one JSON document. Every mutation rewrites it through
//! a temp file in the same directory followed by a rename, so readers never
//! observe a half-written file.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::payload::FeedbackInput;
use crate::prompt::PromptInputs;

pub const DEFAULT_LIST_LIMIT: usize = 50;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read store {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write store {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("store {path} is not valid JSON: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("prompt text is empty")]
    EmptyPrompt,

    #[error("preset name is empty")]
    EmptyPresetName,

    #[error("no preset named '{0}'")]
    PresetNotFound(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedPrompt {
    pub id: Uuid,
    pub user_id: String,
    pub prompt_text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedPrompt {
    pub id: Uuid,
    pub user_id: String,
    pub prompt_text: String,
    pub created_at: DateTime<Utc>,
}

impl SharedPrompt {
    /// Public link for this prompt, if a share base URL is configured.
    pub fn url(&self, base: Option<&str>) -> Option<String> {
        base.map(|b| format!("{}/{}", b.trim_end_matches('/'), self.id))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub id: Uuid,
    pub user_id: String,
    pub text: String,
    pub rating: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub user_id: String,
    pub name: String,
    pub inputs: PromptInputs,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub user_id: String,
    pub daily_quota: u32,
    pub used_today: u32,
    pub last_reset_date: NaiveDate,
}

/// Outcome of a quota check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UsageDecision {
    pub allowed: bool,
    pub used_today: u32,
    pub daily_quota: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct StoreData {
    saved_prompts: Vec<SavedPrompt>,
    shared_prompts: Vec<SharedPrompt>,
    feedback: Vec<Feedback>,
    presets: Vec<Preset>,
    usage: Vec<UsageRecord>,
}

pub struct PromptStore {
    path: PathBuf,
    data: StoreData,
}

impl PromptStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let data = match fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => StoreData::default(),
            Ok(content) => {
                serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
                    path: path.clone(),
                    source,
                })?
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No store at {}, starting empty", path.display());
                StoreData::default()
            }
            Err(source) => return Err(StoreError::Read { path, source }),
        };
        Ok(Self { path, data })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> StoreResult<()> {
        let write_err = |source: io::Error| StoreError::Write {
            path: self.path.clone(),
            source,
        };
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(write_err)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(write_err)?;
        serde_json::to_writer_pretty(&mut tmp, &self.data)
            .map_err(|e| write_err(io::Error::other(e)))?;
        tmp.write_all(b"\n").map_err(write_err)?;
        tmp.persist(&self.path).map_err(|e| write_err(e.error))?;
        debug!("Wrote store {}", self.path.display());
        Ok(())
    }

    pub fn save_prompt(&mut self, user_id: &str, text: &str) -> StoreResult<SavedPrompt> {
        let text = non_empty(text).ok_or(StoreError::EmptyPrompt)?;
        let record = SavedPrompt {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            prompt_text: text,
            created_at: Utc::now(),
        };
        self.data.saved_prompts.push(record.clone());
        self.persist()?;
        info!("Saved prompt {} for {}", record.id, user_id);
        Ok(record)
    }

    pub fn share_prompt(&mut self, user_id: &str, text: &str) -> StoreResult<SharedPrompt> {
        let text = non_empty(text).ok_or(StoreError::EmptyPrompt)?;
        let record = SharedPrompt {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            prompt_text: text,
            created_at: Utc::now(),
        };
        self.data.shared_prompts.push(record.clone());
        self.persist()?;
        info!("Shared prompt {} for {}", record.id, user_id);
        Ok(record)
    }

    pub fn get_shared(&self, id: &Uuid) -> Option<&SharedPrompt> {
        self.data.shared_prompts.iter().find(|p| &p.id == id)
    }

    /// A user's saved prompts, newest first.
    pub fn list_saved(&self, user_id: &str, limit: usize) -> Vec<&SavedPrompt> {
        // Records are appended in creation order.
        self.data
            .saved_prompts
            .iter()
            .rev()
            .filter(|p| p.user_id == user_id)
            .take(limit)
            .collect()
    }

    pub fn record_feedback(
        &mut self,
        user_id: &str,
        input: FeedbackInput,
    ) -> StoreResult<Feedback> {
        let record = Feedback {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            text: input.text,
            rating: input.rating,
            prompt_id: input.prompt_id,
            created_at: Utc::now(),
        };
        self.data.feedback.push(record.clone());
        self.persist()?;
        info!("Recorded {}-star feedback from {}", record.rating, user_id);
        Ok(record)
    }

    pub fn feedback_for(&self, user_id: &str) -> Vec<&Feedback> {
        self.data
            .feedback
            .iter()
            .filter(|f| f.user_id == user_id)
            .collect()
    }

    /// Insert or replace the preset `name`.
    pub fn save_preset(
        &mut self,
        user_id: &str,
        name: &str,
        inputs: PromptInputs,
    ) -> StoreResult<Preset> {
        let name = non_empty(name).ok_or(StoreError::EmptyPresetName)?;
        let preset = Preset {
            user_id: user_id.to_string(),
            name,
            inputs,
            updated_at: Utc::now(),
        };
        match self
            .data
            .presets
            .iter_mut()
            .find(|p| p.user_id == user_id && p.name == preset.name)
        {
            Some(existing) => *existing = preset.clone(),
            None => self.data.presets.push(preset.clone()),
        }
        self.persist()?;
        Ok(preset)
    }

    pub fn load_preset(&self, user_id: &str, name: &str) -> StoreResult<&Preset> {
        let name = name.trim();
        self.data
            .presets
            .iter()
            .find(|p| p.user_id == user_id && p.name == name)
            .ok_or_else(|| StoreError::PresetNotFound(name.to_string()))
    }

    /// A user's presets sorted by name.
    pub fn list_presets(&self, user_id: &str) -> Vec<&Preset> {
        let mut presets: Vec<&Preset> = self
            .data
            .presets
            .iter()
            .filter(|p| p.user_id == user_id)
            .collect();
        presets.sort_by(|a, b| a.name.cmp(&b.name));
        presets
    }

    pub fn delete_preset(&mut self, user_id: &str, name: &str) -> StoreResult<()> {
        let name = name.trim();
        let before = self.data.presets.len();
        self.data
            .presets
            .retain(|p| !(p.user_id == user_id && p.name == name));
        if self.data.presets.len() == before {
            return Err(StoreError::PresetNotFound(name.to_string()));
        }
        self.persist()
    }

    /// Count one quota-limited call for `user_id` on `today` (UTC).
    ///
    /// The counter resets when the stored reset date differs from `today`.
    /// A quota of zero never denies. Denied calls are not counted.
    pub fn check_and_increment_usage(
        &mut self,
        user_id: &str,
        today: NaiveDate,
        daily_quota: u32,
    ) -> StoreResult<UsageDecision> {
        let idx = match self.data.usage.iter().position(|u| u.user_id == user_id) {
            Some(idx) => idx,
            None => {
                self.data.usage.push(UsageRecord {
                    user_id: user_id.to_string(),
                    daily_quota,
                    used_today: 0,
                    last_reset_date: today,
                });
                self.data.usage.len() - 1
            }
        };

        let record = &mut self.data.usage[idx];
        record.daily_quota = daily_quota;
        if record.last_reset_date != today {
            debug!("Resetting daily usage for {}", user_id);
            record.used_today = 0;
            record.last_reset_date = today;
        }

        let allowed = daily_quota == 0 || record.used_today < daily_quota;
        if allowed {
            record.used_today += 1;
        }
        let decision = UsageDecision {
            allowed,
            used_today: record.used_today,
            daily_quota,
        };
        self.persist()?;
        Ok(decision)
    }

    pub fn usage(&self, user_id: &str) -> Option<&UsageRecord> {
        self.data.usage.iter().find(|u| u.user_id == user_id)
    }
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_store() -> (TempDir, PromptStore) {
        let dir = TempDir::new().unwrap();
        let store = PromptStore::open(dir.path().join("nested").join("store.json")).unwrap();
        (dir, store)
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    #[test]
    fn test_missing_file_is_empty_store() {
        let (_dir, store) = temp_store();
        assert!(store.list_saved("anonymous", 10).is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_save_persists_and_reopens() {
        let (_dir, mut store) = temp_store();
        let saved = store.save_prompt("ana", "  You are acting as a tutor.  ").unwrap();
        assert_eq!(saved.prompt_text, "You are acting as a tutor.");

        let reopened = PromptStore::open(store.path()).unwrap();
        let list = reopened.list_saved("ana", DEFAULT_LIST_LIMIT);
        assert_eq!(list.len(), 1);
        assert_eq!(list[0], &saved);
    }

    #[test]
    fn test_save_rejects_blank_text() {
        let (_dir, mut store) = temp_store();
        assert!(matches!(
            store.save_prompt("ana", " \n "),
            Err(StoreError::EmptyPrompt)
        ));
        assert!(!store.path().exists());
    }

    #[test]
    fn test_list_saved_newest_first_per_user_with_limit() {
        let (_dir, mut store) = temp_store();
        for i in 0..5 {
            store.save_prompt("ana", &format!("prompt {}", i)).unwrap();
        }
        store.save_prompt("ben", "other user").unwrap();

        let list = store.list_saved("ana", 3);
        let texts: Vec<&str> = list.iter().map(|p| p.prompt_text.as_str()).collect();
        assert_eq!(texts, vec!["prompt 4", "prompt 3", "prompt 2"]);
        assert_eq!(store.list_saved("ben", 50).len(), 1);
        assert!(store.list_saved("cat", 50).is_empty());
    }

    #[test]
    fn test_share_and_lookup() {
        let (_dir, mut store) = temp_store();
        let shared = store.share_prompt("ana", "share me").unwrap();
        assert_eq!(store.get_shared(&shared.id).unwrap().prompt_text, "share me");
        assert!(store.get_shared(&Uuid::new_v4()).is_none());
        assert_eq!(
            shared.url(Some("https://promptalpha.app/s/")),
            Some(format!("https://promptalpha.app/s/{}", shared.id))
        );
        assert!(shared.url(None).is_none());
    }

    #[test]
    fn test_record_feedback() {
        let (_dir, mut store) = temp_store();
        let fb = store
            .record_feedback(
                "ana",
                FeedbackInput {
                    text: "Very clear".to_string(),
                    rating: 5,
                    prompt_id: Some("p-1".to_string()),
                },
            )
            .unwrap();
        assert_eq!(fb.rating, 5);
        let reopened = PromptStore::open(store.path()).unwrap();
        assert_eq!(reopened.feedback_for("ana"), vec![&fb]);
    }

    #[test]
    fn test_presets_insert_replace_delete() {
        let (_dir, mut store) = temp_store();
        let mut inputs = PromptInputs {
            tone: "neutral".to_string(),
            ..Default::default()
        };
        store.save_preset("ana", " weekly ", inputs.clone()).unwrap();
        inputs.tone = "creative".to_string();
        store.save_preset("ana", "weekly", inputs.clone()).unwrap();
        store.save_preset("ana", "alpha", PromptInputs::default()).unwrap();

        let names: Vec<&str> = store
            .list_presets("ana")
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["alpha", "weekly"]);
        assert_eq!(store.load_preset("ana", "weekly").unwrap().inputs.tone, "creative");
        assert!(matches!(
            store.load_preset("ben", "weekly"),
            Err(StoreError::PresetNotFound(_))
        ));

        store.delete_preset("ana", "weekly").unwrap();
        assert!(store.load_preset("ana", "weekly").is_err());
        assert!(matches!(
            store.delete_preset("ana", "weekly"),
            Err(StoreError::PresetNotFound(_))
        ));
        assert!(matches!(
            store.save_preset("ana", "  ", PromptInputs::default()),
            Err(StoreError::EmptyPresetName)
        ));
    }

    #[test]
    fn test_usage_denies_after_quota_and_resets_next_day() {
        let (_dir, mut store) = temp_store();
        for expected in 1..=2 {
            let d = store.check_and_increment_usage("ana", day(1), 2).unwrap();
            assert!(d.allowed);
            assert_eq!(d.used_today, expected);
        }
        let denied = store.check_and_increment_usage("ana", day(1), 2).unwrap();
        assert!(!denied.allowed);
        assert_eq!(denied.used_today, 2);

        let next = store.check_and_increment_usage("ana", day(2), 2).unwrap();
        assert!(next.allowed);
        assert_eq!(next.used_today, 1);
        assert_eq!(store.usage("ana").unwrap().last_reset_date, day(2));
    }

    #[test]
    fn test_usage_zero_quota_is_unlimited() {
        let (_dir, mut store) = temp_store();
        for _ in 0..20 {
            assert!(store.check_and_increment_usage("ana", day(5), 0).unwrap().allowed);
        }
        assert_eq!(store.usage("ana").unwrap().used_today, 20);
    }

    #[test]
    fn test_corrupt_store_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            PromptStore::open(&path),
            Err(StoreError::Corrupt { .. })
        ));
    }

    #[test]
    fn test_empty_file_is_empty_store() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "").unwrap();
        let store = PromptStore::open(&path).unwrap();
        assert!(store.list_presets("ana").is_empty());
    }
}
