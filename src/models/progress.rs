use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::{
    database::{Database, Record},
    error::Error,
};

use super::page::{Page, PageQuery};

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    InProgress,
    Completed,
    Delayed,
}

/// Planned against actual completion of one road section.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    #[serde(default)]
    pub id: Option<u64>,
    pub project_id: u64,
    pub section: String,
    pub planned_progress: u8,
    pub actual_progress: u8,
    pub start_date: Option<NaiveDate>,
    pub planned_end_date: Option<NaiveDate>,
    pub actual_end_date: Option<NaiveDate>,
    pub status: ProgressStatus,
    pub description: Option<String>,
    pub obstacles: Option<String>,
    pub solutions: Option<String>,
    pub update_time: Option<NaiveDateTime>,
    pub updated_by: Option<String>,
    pub remarks: Option<String>,
}
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressQuery {
    pub project_id: Option<u64>,
    pub status: Option<ProgressStatus>,
}

impl Record for Progress {
    fn id(&self) -> Option<u64> {
        self.id
    }
    fn set_id(&mut self, id: u64) {
        self.id = Some(id);
    }
}

impl Progress {
    /// Behind plan, or past the planned end without being completed.
    pub fn is_delayed(&self, today: NaiveDate) -> bool {
        self.actual_progress < self.planned_progress
            || (self.planned_end_date.is_some_and(|end| end < today)
                && self.status != ProgressStatus::Completed)
    }
    pub fn derived_status(&self, today: NaiveDate) -> ProgressStatus {
        if self.status == ProgressStatus::Completed {
            ProgressStatus::Completed
        } else if self.is_delayed(today) {
            ProgressStatus::Delayed
        } else {
            ProgressStatus::InProgress
        }
    }
    pub fn validate(&self) -> Result<(), Error> {
        if self.planned_progress > 100 || self.actual_progress > 100 {
            return Err(Error::validation("PROGRESS_OUT_OF_RANGE"));
        }
        if self.section.trim().is_empty() {
            return Err(Error::validation("PROGRESS_MUST_HAVE_SECTION"));
        }
        Ok(())
    }
    pub async fn save(mut self, db: &Database) -> Result<Progress, Error> {
        self.validate()?;
        self.update_time = Some(Local::now().naive_local());
        Ok(db.progress.save(self).await)
    }
    pub async fn update(mut self, db: &Database, id: u64) -> Result<Progress, Error> {
        if !db.progress.exists(id).await {
            return Err(Error::NotFound("PROGRESS_NOT_FOUND"));
        }
        self.id = Some(id);
        self.save(db).await
    }
    pub async fn find_by_id(db: &Database, id: u64) -> Option<Progress> {
        db.progress.find_by_id(id).await
    }
    pub async fn find_many(db: &Database, query: &ProgressQuery, page: &PageQuery) -> Page<Progress> {
        let entries = db
            .progress
            .find(|entry| {
                query.project_id.map_or(true, |id| entry.project_id == id)
                    && query.status.map_or(true, |status| entry.status == status)
            })
            .await;
        Page::from_sorted(entries, page)
    }
    pub async fn find_behind_schedule(db: &Database, today: NaiveDate) -> Vec<Progress> {
        db.progress.find(|entry| entry.is_delayed(today)).await
    }
    pub async fn delete_by_id(db: &Database, id: u64) -> Result<usize, Error> {
        if db.progress.delete_by_id(id).await {
            Ok(1)
        } else {
            Err(Error::NotFound("PROGRESS_NOT_FOUND"))
        }
    }
}
