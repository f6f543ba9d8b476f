use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use checkin_core::Identifier;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::CheckinStore;
use crate::types::{CheckinRecord, RejectionRecord, StoreError};

#[derive(Debug, Default, Serialize, Deserialize)]
struct FileContents {
    #[serde(default)]
    checkins: BTreeMap<Identifier, DateTime<Utc>>,
    #[serde(default)]
    rejections: BTreeMap<Identifier, StoredRejection>,
}

/// Accepted file layouts. Older deployments wrote a bare array of
/// checked-in identifiers with no timestamps and no rejections.
#[derive(Deserialize)]
#[serde(untagged)]
enum OnDisk {
    Legacy(Vec<String>),
    Current(FileContents),
}

impl OnDisk {
    fn into_contents(self) -> Result<FileContents, StoreError> {
        match self {
            OnDisk::Current(contents) => Ok(contents),
            OnDisk::Legacy(ids) => {
                let now = Utc::now();
                let mut contents = FileContents::default();
                for raw in ids {
                    contents.checkins.insert(Identifier::parse(&raw)?, now);
                }
                log::warn!(
                    "📄 Converting {} check-ins from the legacy array format",
                    contents.checkins.len()
                );
                Ok(contents)
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredRejection {
    reason: String,
    #[serde(default)]
    rejected_by: Option<String>,
    rejected_at: DateTime<Utc>,
}

/// Flat-file store keeping both collections in one JSON document.
///
/// The whole document is held in memory behind a mutex; each mutation is
/// applied and written back (temp file + rename) while the lock is held, so
/// inserts are atomic within the process. Not safe for several processes
/// sharing one file.
pub struct JsonFileStore {
    path: PathBuf,
    contents: Mutex<FileContents>,
}

impl JsonFileStore {
    /// Opens the store at `path`, starting empty if the file does not exist.
    ///
    /// A legacy file holding a bare array of identifiers is read as check-ins
    /// registered now; it is rewritten in the current layout on the first
    /// mutation.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let contents = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => FileContents::default(),
            Ok(bytes) => serde_json::from_slice::<OnDisk>(&bytes)?.into_contents()?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => FileContents::default(),
            Err(e) => return Err(e.into()),
        };

        log::info!(
            "📄 Opened check-in file {} ({} check-ins, {} rejections)",
            path.display(),
            contents.checkins.len(),
            contents.rejections.len()
        );

        Ok(Self {
            path,
            contents: Mutex::new(contents),
        })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, contents: &FileContents) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(contents)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");

        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(|e| {
            log::error!("Failed to write to data file {}: {}", self.path.display(), e);
            e
        })?;
        Ok(())
    }
}

#[async_trait]
impl CheckinStore for JsonFileStore {
    async fn insert_checkin(&self, record: &CheckinRecord) -> Result<bool, StoreError> {
        let mut contents = self.contents.lock().await;
        if contents.checkins.contains_key(&record.identifier) {
            return Ok(false);
        }

        contents
            .checkins
            .insert(record.identifier.clone(), record.registered_at);
        if let Err(e) = self.persist(&contents).await {
            // Keep memory consistent with what is on disk.
            contents.checkins.remove(&record.identifier);
            return Err(e);
        }
        Ok(true)
    }

    async fn insert_rejection(&self, record: &RejectionRecord) -> Result<bool, StoreError> {
        let mut contents = self.contents.lock().await;
        if contents.rejections.contains_key(&record.identifier) {
            return Ok(false);
        }

        contents.rejections.insert(
            record.identifier.clone(),
            StoredRejection {
                reason: record.reason.clone(),
                rejected_by: record.rejected_by.clone(),
                rejected_at: record.rejected_at,
            },
        );
        if let Err(e) = self.persist(&contents).await {
            contents.rejections.remove(&record.identifier);
            return Err(e);
        }
        Ok(true)
    }

    async fn find_rejection(
        &self,
        identifier: &Identifier,
    ) -> Result<Option<RejectionRecord>, StoreError> {
        let contents = self.contents.lock().await;
        Ok(contents
            .rejections
            .get(identifier)
            .map(|stored| RejectionRecord {
                identifier: identifier.clone(),
                reason: stored.reason.clone(),
                rejected_by: stored.rejected_by.clone(),
                rejected_at: stored.rejected_at,
            }))
    }

    async fn list_checkins(&self) -> Result<Vec<CheckinRecord>, StoreError> {
        let contents = self.contents.lock().await;
        Ok(contents
            .checkins
            .iter()
            .map(|(identifier, registered_at)| CheckinRecord {
                identifier: identifier.clone(),
                registered_at: *registered_at,
            })
            .collect())
    }

    async fn clear_checkins(&self) -> Result<u64, StoreError> {
        let mut contents = self.contents.lock().await;
        let previous = std::mem::take(&mut contents.checkins);
        let removed = previous.len() as u64;

        if let Err(e) = self.persist(&contents).await {
            contents.checkins = previous;
            return Err(e);
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path() -> PathBuf {
        std::env::temp_dir().join(format!("checkin-store-{}.json", uuid::Uuid::new_v4()))
    }

    fn checkin(id: &str) -> CheckinRecord {
        CheckinRecord {
            identifier: Identifier::parse(id).unwrap(),
            registered_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_records_survive_reopen() {
        let path = temp_path();

        {
            let store = JsonFileStore::open(&path).await.unwrap();
            assert!(store.insert_checkin(&checkin("guest-2")).await.unwrap());
            assert!(store.insert_checkin(&checkin("guest-1")).await.unwrap());
            assert!(!store.insert_checkin(&checkin("guest-1")).await.unwrap());
            assert!(
                store
                    .insert_rejection(&RejectionRecord {
                        identifier: Identifier::parse("guest-9").unwrap(),
                        reason: "banned".into(),
                        rejected_by: None,
                        rejected_at: Utc::now(),
                    })
                    .await
                    .unwrap()
            );
        }

        let reopened = JsonFileStore::open(&path).await.unwrap();
        let ids: Vec<String> = reopened
            .list_checkins()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.identifier.to_string())
            .collect();
        assert_eq!(ids, vec!["guest-1", "guest-2"]);

        let rejection = reopened
            .find_rejection(&Identifier::parse("guest-9").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(rejection.reason, "banned");

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_clear_keeps_rejections_on_disk() {
        let path = temp_path();
        let store = JsonFileStore::open(&path).await.unwrap();
        store.insert_checkin(&checkin("guest-1")).await.unwrap();
        store
            .insert_rejection(&RejectionRecord {
                identifier: Identifier::parse("guest-1").unwrap(),
                reason: "fake badge".into(),
                rejected_by: Some("desk".into()),
                rejected_at: Utc::now(),
            })
            .await
            .unwrap();

        assert_eq!(store.clear_checkins().await.unwrap(), 1);

        let reopened = JsonFileStore::open(&path).await.unwrap();
        assert!(reopened.list_checkins().await.unwrap().is_empty());
        assert!(
            reopened
                .find_rejection(&Identifier::parse("guest-1").unwrap())
                .await
                .unwrap()
                .is_some()
        );

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_missing_file_opens_empty() {
        let store = JsonFileStore::open(temp_path()).await.unwrap();
        assert!(store.list_checkins().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_legacy_array_file_is_read_as_checkins() {
        let path = temp_path();
        std::fs::write(&path, r#"["guest-b", "guest-a"]"#).unwrap();

        let store = JsonFileStore::open(&path).await.unwrap();
        let ids: Vec<String> = store
            .list_checkins()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.identifier.to_string())
            .collect();
        assert_eq!(ids, vec!["guest-a", "guest-b"]);
        assert!(!store.insert_checkin(&checkin("guest-a")).await.unwrap());
        assert!(store.insert_checkin(&checkin("guest-c")).await.unwrap());

        let reopened = JsonFileStore::open(&path).await.unwrap();
        assert_eq!(reopened.list_checkins().await.unwrap().len(), 3);

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_legacy_array_with_bad_identifier_is_corrupt() {
        let path = temp_path();
        std::fs::write(&path, r#"["guest-a", "x"]"#).unwrap();

        assert!(matches!(
            JsonFileStore::open(&path).await,
            Err(StoreError::Corrupt(_))
        ));

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_inserts_create_one_record() {
        let path = temp_path();
        let store = std::sync::Arc::new(JsonFileStore::open(&path).await.unwrap());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.insert_checkin(&checkin("guest-42")).await })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            if handle.await.unwrap().unwrap() {
                created += 1;
            }
        }
        assert_eq!(created, 1);

        let reopened = JsonFileStore::open(&path).await.unwrap();
        let records = reopened.list_checkins().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].identifier.as_str(), "guest-42");

        let _ = std::fs::remove_file(&path);
    }
}
