use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::atomic::{AtomicU64, Ordering},
};

use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::{
    config::Config,
    error::Error,
    models::{
        attendance::Attendance, progress::Progress, project::Project,
        safety_record::SafetyRecord, schedule::Schedule, weather::WeatherInfo, worker::Worker,
    },
};

/// A record that can live in a [`Collection`]. The ID is assigned on first save.
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    fn id(&self) -> Option<u64>;
    fn set_id(&mut self, id: u64);
}

/// In-memory map of records keyed by ID, mirrored to one JSON file.
///
/// Every mutation rewrites the whole file. Write failures are logged and the
/// in-memory state stays authoritative until the next successful flush.
pub struct Collection<T> {
    path: PathBuf,
    records: RwLock<BTreeMap<u64, T>>,
    next_id: AtomicU64,
}

impl<T: Record> Collection<T> {
    pub fn open(dir: &Path, file_name: &str) -> Self {
        let path = dir.join(file_name);
        let records = load(&path);
        let next_id = records.keys().next_back().map_or(1, |id| id + 1);
        debug!(path = %path.display(), count = records.len(), next_id, "collection opened");

        Self {
            path,
            records: RwLock::new(records),
            next_id: AtomicU64::new(next_id),
        }
    }

    fn assign_id(&self, record: &mut T) -> u64 {
        match record.id() {
            Some(id) => {
                self.next_id.fetch_max(id + 1, Ordering::SeqCst);
                id
            }
            None => {
                let id = self.next_id.fetch_add(1, Ordering::SeqCst);
                record.set_id(id);
                id
            }
        }
    }

    pub async fn save(&self, mut record: T) -> T {
        let id = self.assign_id(&mut record);

        let mut records = self.records.write().await;
        records.insert(id, record.clone());
        self.flush(&records).await;
        record
    }

    /// Returns the first record matching `predicate`, or saves the one built by
    /// `create`. Both happen under the write lock, so concurrent callers agree.
    pub async fn find_or_save<P, F>(&self, predicate: P, create: F) -> T
    where
        P: Fn(&T) -> bool,
        F: FnOnce() -> T,
    {
        let mut records = self.records.write().await;
        if let Some(found) = records.values().find(|record| predicate(record)) {
            return found.clone();
        }

        let mut record = create();
        let id = self.assign_id(&mut record);
        records.insert(id, record.clone());
        self.flush(&records).await;
        record
    }

    pub async fn find_by_id(&self, id: u64) -> Option<T> {
        self.records.read().await.get(&id).cloned()
    }

    pub async fn exists(&self, id: u64) -> bool {
        self.records.read().await.contains_key(&id)
    }

    pub async fn find<P>(&self, predicate: P) -> Vec<T>
    where
        P: Fn(&T) -> bool,
    {
        self.records
            .read()
            .await
            .values()
            .filter(|record| predicate(record))
            .cloned()
            .collect()
    }

    pub async fn find_one<P>(&self, predicate: P) -> Option<T>
    where
        P: Fn(&T) -> bool,
    {
        self.records
            .read()
            .await
            .values()
            .find(|record| predicate(record))
            .cloned()
    }

    pub async fn all(&self) -> Vec<T> {
        self.records.read().await.values().cloned().collect()
    }

    pub async fn count<P>(&self, predicate: P) -> usize
    where
        P: Fn(&T) -> bool,
    {
        self.records
            .read()
            .await
            .values()
            .filter(|record| predicate(record))
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    pub async fn delete_by_id(&self, id: u64) -> bool {
        let mut records = self.records.write().await;
        let removed = records.remove(&id).is_some();
        if removed {
            self.flush(&records).await;
        }
        removed
    }

    pub async fn delete_many(&self, ids: &[u64]) -> usize {
        let mut records = self.records.write().await;
        let removed = ids.iter().filter(|id| records.remove(id).is_some()).count();
        if removed > 0 {
            self.flush(&records).await;
        }
        removed
    }

    async fn flush(&self, records: &BTreeMap<u64, T>) {
        let snapshot: Vec<&T> = records.values().collect();
        let bytes = match serde_json::to_vec_pretty(&snapshot) {
            Ok(bytes) => bytes,
            Err(error) => {
                error!(path = %self.path.display(), %error, "serializing collection failed");
                return;
            }
        };

        if let Some(parent) = self.path.parent() {
            if let Err(error) = tokio::fs::create_dir_all(parent).await {
                error!(path = %parent.display(), %error, "creating data directory failed");
                return;
            }
        }
        if let Err(error) = tokio::fs::write(&self.path, bytes).await {
            error!(path = %self.path.display(), %error, "writing collection failed");
        }
    }
}

fn load<T: Record>(path: &Path) -> BTreeMap<u64, T> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => return BTreeMap::new(),
        Err(error) => {
            warn!(path = %path.display(), %error, "reading collection failed, starting empty");
            return BTreeMap::new();
        }
    };
    if raw.trim().is_empty() {
        return BTreeMap::new();
    }

    match serde_json::from_str::<Vec<T>>(&raw) {
        Ok(list) => {
            let mut records = BTreeMap::new();
            for record in list {
                match record.id() {
                    Some(id) => {
                        records.insert(id, record);
                    }
                    None => warn!(path = %path.display(), "skipping stored record without id"),
                }
            }
            records
        }
        Err(error) => {
            warn!(path = %path.display(), %error, "parsing collection failed, starting empty");
            BTreeMap::new()
        }
    }
}

pub struct Database {
    pub workers: Collection<Worker>,
    pub schedules: Collection<Schedule>,
    pub attendance: Collection<Attendance>,
    pub safety_records: Collection<SafetyRecord>,
    pub projects: Collection<Project>,
    pub progress: Collection<Progress>,
    pub weather: Collection<WeatherInfo>,
}

impl Database {
    pub fn open(dir: &Path) -> Self {
        Self {
            workers: Collection::open(dir, "workers.json"),
            schedules: Collection::open(dir, "schedules.json"),
            attendance: Collection::open(dir, "attendance.json"),
            safety_records: Collection::open(dir, "safety_records.json"),
            projects: Collection::open(dir, "projects.json"),
            progress: Collection::open(dir, "progress.json"),
            weather: Collection::open(dir, "weather_infos.json"),
        }
    }
}

pub fn connect(config: &Config) -> Result<Database, Error> {
    fs::create_dir_all(&config.data_dir)?;
    info!(data_dir = %config.data_dir.display(), "loading collections");
    Ok(Database::open(&config.data_dir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    struct Note {
        id: Option<u64>,
        text: String,
    }

    impl Record for Note {
        fn id(&self) -> Option<u64> {
            self.id
        }
        fn set_id(&mut self, id: u64) {
            self.id = Some(id);
        }
    }

    fn note(text: &str) -> Note {
        Note {
            id: None,
            text: text.to_string(),
        }
    }

    #[actix_web::test]
    async fn save_assigns_increasing_ids() {
        let dir = tempfile::tempdir().unwrap();
        let notes: Collection<Note> = Collection::open(dir.path(), "notes.json");

        let first = notes.save(note("a")).await;
        let second = notes.save(note("b")).await;

        assert_eq!(first.id, Some(1));
        assert_eq!(second.id, Some(2));
        assert_eq!(notes.find_by_id(2).await.unwrap().text, "b");
    }

    #[actix_web::test]
    async fn reopening_restores_records_and_resumes_counter() {
        let dir = tempfile::tempdir().unwrap();
        {
            let notes: Collection<Note> = Collection::open(dir.path(), "notes.json");
            for text in ["a", "b", "c"] {
                notes.save(note(text)).await;
            }
            notes.delete_by_id(3).await;
        }

        let notes: Collection<Note> = Collection::open(dir.path(), "notes.json");
        let stored = notes.all().await;
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0], Note { id: Some(1), text: "a".into() });
        assert_eq!(stored[1], Note { id: Some(2), text: "b".into() });

        let next = notes.save(note("d")).await;
        assert_eq!(next.id, Some(3));
    }

    #[actix_web::test]
    async fn find_or_save_creates_once() {
        let dir = tempfile::tempdir().unwrap();
        let notes = std::sync::Arc::new(Collection::<Note>::open(dir.path(), "notes.json"));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let notes = notes.clone();
                actix_web::rt::spawn(async move {
                    notes
                        .find_or_save(|n| n.text == "shared", || note("shared"))
                        .await
                })
            })
            .collect();
        let mut ids = Vec::new();
        for task in tasks {
            ids.push(task.await.unwrap().id);
        }

        assert!(ids.iter().all(|id| *id == Some(1)));
        assert_eq!(notes.count(|_| true).await, 1);

        let again = notes
            .find_or_save(|n| n.text == "shared", || panic!("already stored"))
            .await;
        assert_eq!(again.id, Some(1));
    }

    #[actix_web::test]
    async fn deleted_ids_are_not_reused() {
        let dir = tempfile::tempdir().unwrap();
        let notes: Collection<Note> = Collection::open(dir.path(), "notes.json");
        notes.save(note("a")).await;
        notes.save(note("b")).await;
        assert!(notes.delete_by_id(2).await);

        let next = notes.save(note("c")).await;
        assert_eq!(next.id, Some(3));
    }

    #[actix_web::test]
    async fn explicit_id_bumps_the_counter() {
        let dir = tempfile::tempdir().unwrap();
        let notes: Collection<Note> = Collection::open(dir.path(), "notes.json");
        notes
            .save(Note {
                id: Some(40),
                text: "imported".into(),
            })
            .await;

        assert_eq!(notes.save(note("next")).await.id, Some(41));
    }

    #[actix_web::test]
    async fn file_is_a_pretty_json_array() {
        let dir = tempfile::tempdir().unwrap();
        let notes: Collection<Note> = Collection::open(dir.path(), "notes.json");
        notes.save(note("a")).await;

        let raw = fs::read_to_string(dir.path().join("notes.json")).unwrap();
        assert!(raw.starts_with('['));
        assert!(raw.contains('\n'));
        let parsed: Vec<Note> = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed.len(), 1);
    }

    #[actix_web::test]
    async fn corrupt_file_yields_empty_collection() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("notes.json"), "{ not json").unwrap();

        let notes: Collection<Note> = Collection::open(dir.path(), "notes.json");
        assert!(notes.is_empty().await);
        assert_eq!(notes.save(note("fresh")).await.id, Some(1));
    }

    #[actix_web::test]
    async fn delete_many_counts_only_present_ids() {
        let dir = tempfile::tempdir().unwrap();
        let notes: Collection<Note> = Collection::open(dir.path(), "notes.json");
        for text in ["a", "b", "c"] {
            notes.save(note(text)).await;
        }

        assert_eq!(notes.delete_many(&[1, 3, 99]).await, 2);
        assert_eq!(notes.count(|_| true).await, 1);
    }
}
