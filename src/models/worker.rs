use std::{collections::BTreeMap, sync::OnceLock};

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{
    database::{Database, Record},
    error::Error,
};

use super::page::{Page, PageQuery};

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum WorkerStatus {
    Active,
    OnLeave,
    Resigned,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Worker {
    #[serde(default)]
    pub id: Option<u64>,
    pub name: String,
    pub gender: Option<String>,
    pub age: Option<u32>,
    pub id_card: String,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub hire_date: Option<NaiveDate>,
    pub status: WorkerStatus,
    pub address: Option<String>,
    pub remarks: Option<String>,
}
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerRequest {
    pub name: String,
    pub gender: Option<String>,
    pub age: Option<u32>,
    pub id_card: String,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub hire_date: Option<NaiveDate>,
    pub status: Option<WorkerStatus>,
    pub address: Option<String>,
    pub remarks: Option<String>,
}
#[derive(Debug, Default, Deserialize)]
pub struct WorkerQuery {
    pub name: Option<String>,
    pub position: Option<String>,
    pub status: Option<WorkerStatus>,
}
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerStatistics {
    pub total_workers: usize,
    pub position_stats: BTreeMap<String, usize>,
    pub status_stats: BTreeMap<WorkerStatus, usize>,
}

impl Record for Worker {
    fn id(&self) -> Option<u64> {
        self.id
    }
    fn set_id(&mut self, id: u64) {
        self.id = Some(id);
    }
}

impl WorkerRequest {
    pub fn into_worker(self, id: Option<u64>) -> Worker {
        Worker {
            id,
            name: self.name,
            gender: self.gender,
            age: self.age,
            id_card: self.id_card,
            phone: self.phone,
            position: self.position,
            hire_date: self.hire_date,
            status: self.status.unwrap_or(WorkerStatus::Active),
            address: self.address,
            remarks: self.remarks,
        }
    }
}

fn id_card_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{17}[\dXx]$").expect("id card pattern compiles"))
}
fn phone_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\+?\d{7,15}$").expect("phone pattern compiles"))
}

impl WorkerQuery {
    fn matches(&self, worker: &Worker) -> bool {
        if let Some(name) = self.name.as_deref().filter(|name| !name.is_empty()) {
            if !worker.name.contains(name) {
                return false;
            }
        }
        if let Some(position) = self.position.as_deref().filter(|p| !p.is_empty()) {
            if worker.position.as_deref() != Some(position) {
                return false;
            }
        }
        self.status.map_or(true, |status| worker.status == status)
    }
}

impl Worker {
    pub fn validate(&self) -> Result<(), Error> {
        if self.name.trim().is_empty() {
            return Err(Error::validation("WORKER_MUST_HAVE_NAME"));
        }
        if !id_card_pattern().is_match(&self.id_card) {
            return Err(Error::validation("WORKER_MUST_HAVE_VALID_ID_CARD"));
        }
        if let Some(phone) = self.phone.as_deref().filter(|phone| !phone.is_empty()) {
            if !phone_pattern().is_match(phone) {
                return Err(Error::validation("WORKER_MUST_HAVE_VALID_PHONE"));
            }
        }
        Ok(())
    }
    pub async fn save(self, db: &Database) -> Result<Worker, Error> {
        self.validate()?;

        let own_id = self.id;
        let id_card = self.id_card.to_uppercase();
        if db
            .workers
            .find_one(|worker| worker.id != own_id && worker.id_card.to_uppercase() == id_card)
            .await
            .is_some()
        {
            return Err(Error::Duplicate("WORKER_ID_CARD_EXISTS"));
        }

        Ok(db.workers.save(self).await)
    }
    pub async fn update(mut self, db: &Database, id: u64) -> Result<Worker, Error> {
        if !db.workers.exists(id).await {
            return Err(Error::NotFound("WORKER_NOT_FOUND"));
        }
        self.id = Some(id);
        self.save(db).await
    }
    pub async fn find_by_id(db: &Database, id: u64) -> Option<Worker> {
        db.workers.find_by_id(id).await
    }
    pub async fn find_by_id_card(db: &Database, id_card: &str) -> Option<Worker> {
        let id_card = id_card.to_uppercase();
        db.workers
            .find_one(|worker| worker.id_card.to_uppercase() == id_card)
            .await
    }
    pub async fn find_many(db: &Database, query: &WorkerQuery, page: &PageQuery) -> Page<Worker> {
        let workers = db.workers.find(|worker| query.matches(worker)).await;
        Page::from_sorted(workers, page)
    }
    pub async fn delete_by_id(db: &Database, id: u64) -> Result<usize, Error> {
        if db.workers.delete_by_id(id).await {
            Ok(1)
        } else {
            Err(Error::NotFound("WORKER_NOT_FOUND"))
        }
    }
    pub async fn delete_many(db: &Database, ids: &[u64]) -> usize {
        db.workers.delete_many(ids).await
    }
    pub async fn statistics(db: &Database) -> WorkerStatistics {
        let workers = db.workers.all().await;
        let mut position_stats = BTreeMap::new();
        let mut status_stats = BTreeMap::new();

        for worker in workers.iter() {
            if let Some(position) = &worker.position {
                *position_stats.entry(position.clone()).or_insert(0) += 1;
            }
            *status_stats.entry(worker.status).or_insert(0) += 1;
        }

        WorkerStatistics {
            total_workers: workers.len(),
            position_stats,
            status_stats,
        }
    }
}
