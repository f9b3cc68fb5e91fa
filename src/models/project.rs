use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    database::{Database, Record},
    error::Error,
};

use super::page::{Page, PageQuery};

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatusKind {
    Pending,
    Running,
    Paused,
    Finished,
    Cancelled,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default)]
    pub id: Option<u64>,
    pub name: String,
    pub description: Option<String>,
    pub location: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: ProjectStatusKind,
    pub manager: Option<String>,
    pub budget: Option<f64>,
    #[serde(default)]
    pub progress: u8,
}
#[derive(Debug, Default, Deserialize)]
pub struct ProjectQuery {
    pub name: Option<String>,
    pub status: Option<ProjectStatusKind>,
}

impl Record for Project {
    fn id(&self) -> Option<u64> {
        self.id
    }
    fn set_id(&mut self, id: u64) {
        self.id = Some(id);
    }
}

impl Project {
    pub fn validate(&self) -> Result<(), Error> {
        if self.name.trim().is_empty() {
            return Err(Error::validation("PROJECT_MUST_HAVE_NAME"));
        }
        if self.progress > 100 {
            return Err(Error::validation("PROJECT_PROGRESS_OUT_OF_RANGE"));
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if end < start {
                return Err(Error::validation("INVALID_DATE_RANGE"));
            }
        }
        Ok(())
    }
    pub async fn save(self, db: &Database) -> Result<Project, Error> {
        self.validate()?;
        Ok(db.projects.save(self).await)
    }
    pub async fn update(mut self, db: &Database, id: u64) -> Result<Project, Error> {
        if !db.projects.exists(id).await {
            return Err(Error::NotFound("PROJECT_NOT_FOUND"));
        }
        self.id = Some(id);
        self.save(db).await
    }
    pub async fn find_by_id(db: &Database, id: u64) -> Option<Project> {
        db.projects.find_by_id(id).await
    }
    pub async fn find_many(db: &Database, query: &ProjectQuery, page: &PageQuery) -> Page<Project> {
        let projects = db
            .projects
            .find(|project| {
                query
                    .name
                    .as_deref()
                    .map_or(true, |name| project.name.contains(name))
                    && query.status.map_or(true, |status| project.status == status)
            })
            .await;
        Page::from_sorted(projects, page)
    }
    pub async fn delete_by_id(db: &Database, id: u64) -> Result<usize, Error> {
        if db.projects.delete_by_id(id).await {
            Ok(1)
        } else {
            Err(Error::NotFound("PROJECT_NOT_FOUND"))
        }
    }
}
