use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{
    database::{Database, Record},
    error::Error,
};

use super::page::{Page, PageQuery};

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SafetyEventKind {
    Violation,
    NearMiss,
    FirstAid,
    LostTimeInjury,
    PropertyDamage,
    Environmental,
    Fatal,
}
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum SeverityLevel {
    Low,
    Medium,
    High,
    Critical,
}
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SafetyRecordStatus {
    Open,
    OnGoing,
    Resolved,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SafetyRecord {
    #[serde(default)]
    pub id: Option<u64>,
    pub worker_id: Option<u64>,
    pub worker_name: Option<String>,
    pub project_id: Option<u64>,
    pub project_name: Option<String>,
    pub event_type: SafetyEventKind,
    pub severity_level: SeverityLevel,
    pub description: String,
    pub location: String,
    pub occurrence_time: NaiveDateTime,
    pub status: SafetyRecordStatus,
    pub measures: Option<String>,
    pub handler: Option<String>,
    pub remarks: Option<String>,
}
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyRecordRequest {
    pub worker_id: Option<u64>,
    pub project_id: Option<u64>,
    pub event_type: SafetyEventKind,
    pub severity_level: SeverityLevel,
    pub description: String,
    pub location: String,
    pub occurrence_time: NaiveDateTime,
    pub status: Option<SafetyRecordStatus>,
    pub measures: Option<String>,
    pub handler: Option<String>,
    pub remarks: Option<String>,
}
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyRecordQuery {
    pub worker_id: Option<u64>,
    pub project_id: Option<u64>,
    pub event_type: Option<SafetyEventKind>,
    pub severity_level: Option<SeverityLevel>,
    pub status: Option<SafetyRecordStatus>,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    pub location: Option<String>,
}

impl Record for SafetyRecord {
    fn id(&self) -> Option<u64> {
        self.id
    }
    fn set_id(&mut self, id: u64) {
        self.id = Some(id);
    }
}

impl SafetyRecordRequest {
    pub fn into_record(self, id: Option<u64>) -> SafetyRecord {
        SafetyRecord {
            id,
            worker_id: self.worker_id,
            worker_name: None,
            project_id: self.project_id,
            project_name: None,
            event_type: self.event_type,
            severity_level: self.severity_level,
            description: self.description,
            location: self.location,
            occurrence_time: self.occurrence_time,
            status: self.status.unwrap_or(SafetyRecordStatus::Open),
            measures: self.measures,
            handler: self.handler,
            remarks: self.remarks,
        }
    }
}

impl SafetyRecordQuery {
    fn matches(&self, record: &SafetyRecord) -> bool {
        self.worker_id.map_or(true, |id| record.worker_id == Some(id))
            && self.project_id.map_or(true, |id| record.project_id == Some(id))
            && self.event_type.map_or(true, |kind| record.event_type == kind)
            && self
                .severity_level
                .map_or(true, |level| record.severity_level == level)
            && self.status.map_or(true, |status| record.status == status)
            && self
                .start_time
                .map_or(true, |start| record.occurrence_time >= start)
            && self.end_time.map_or(true, |end| record.occurrence_time <= end)
            && self
                .location
                .as_deref()
                .filter(|location| !location.is_empty())
                .map_or(true, |location| record.location.contains(location))
    }
}

impl SafetyRecord {
    /// Copies the referenced worker and project names onto the record.
    /// References to missing rows are kept as they are.
    async fn denormalize(&mut self, db: &Database) {
        if let Some(worker_id) = self.worker_id {
            if let Some(worker) = db.workers.find_by_id(worker_id).await {
                self.worker_name = Some(worker.name);
            }
        }
        if let Some(project_id) = self.project_id {
            if let Some(project) = db.projects.find_by_id(project_id).await {
                self.project_name = Some(project.name);
            }
        }
    }
    pub async fn save(mut self, db: &Database) -> Result<SafetyRecord, Error> {
        if self.description.trim().is_empty() {
            return Err(Error::validation("SAFETY_RECORD_MUST_HAVE_DESCRIPTION"));
        }
        self.denormalize(db).await;
        Ok(db.safety_records.save(self).await)
    }
    pub async fn update(mut self, db: &Database, id: u64) -> Result<SafetyRecord, Error> {
        if !db.safety_records.exists(id).await {
            return Err(Error::NotFound("SAFETY_RECORD_NOT_FOUND"));
        }
        self.id = Some(id);
        self.save(db).await
    }
    pub async fn find_by_id(db: &Database, id: u64) -> Option<SafetyRecord> {
        db.safety_records.find_by_id(id).await
    }
    /// Matching records, most recent occurrence first.
    pub async fn find_many(
        db: &Database,
        query: &SafetyRecordQuery,
        page: &PageQuery,
    ) -> Page<SafetyRecord> {
        let mut records = db.safety_records.find(|record| query.matches(record)).await;
        records.sort_by(|a, b| {
            b.occurrence_time
                .cmp(&a.occurrence_time)
                .then(a.id.cmp(&b.id))
        });
        Page::from_sorted(records, page)
    }
    pub async fn delete_by_id(db: &Database, id: u64) -> Result<usize, Error> {
        if db.safety_records.delete_by_id(id).await {
            Ok(1)
        } else {
            Err(Error::NotFound("SAFETY_RECORD_NOT_FOUND"))
        }
    }
    pub async fn delete_many(db: &Database, ids: &[u64]) -> usize {
        db.safety_records.delete_many(ids).await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{test_db, worker::tests::worker};
    use chrono::NaiveDate;

    pub(crate) fn incident(worker_id: Option<u64>, day: u32, severity: SeverityLevel) -> SafetyRecord {
        SafetyRecordRequest {
            worker_id,
            project_id: None,
            event_type: SafetyEventKind::NearMiss,
            severity_level: severity,
            description: "unsecured trench edge".to_string(),
            location: "K12+300 north ramp".to_string(),
            occurrence_time: NaiveDate::from_ymd_opt(2025, 4, day)
                .unwrap()
                .and_hms_opt(10, 30, 0)
                .unwrap(),
            status: None,
            measures: None,
            handler: Some("safety officer".to_string()),
            remarks: None,
        }
        .into_record(None)
    }

    #[actix_web::test]
    async fn save_copies_the_worker_name() {
        let (_dir, db) = test_db();
        let zhang = worker("Zhang San", "410123198912123456").save(&db).await.unwrap();

        let saved = incident(zhang.id, 1, SeverityLevel::Low).save(&db).await.unwrap();
        assert_eq!(saved.worker_name.as_deref(), Some("Zhang San"));
        assert_eq!(saved.status, SafetyRecordStatus::Open);
    }

    #[actix_web::test]
    async fn unknown_worker_reference_is_tolerated() {
        let (_dir, db) = test_db();
        let saved = incident(Some(404), 1, SeverityLevel::Low).save(&db).await.unwrap();
        assert_eq!(saved.worker_id, Some(404));
        assert!(saved.worker_name.is_none());
    }

    #[actix_web::test]
    async fn listing_is_most_recent_first_with_filters() {
        let (_dir, db) = test_db();
        incident(Some(1), 3, SeverityLevel::High).save(&db).await.unwrap();
        incident(Some(1), 9, SeverityLevel::High).save(&db).await.unwrap();
        incident(Some(1), 5, SeverityLevel::Low).save(&db).await.unwrap();
        incident(Some(2), 7, SeverityLevel::High).save(&db).await.unwrap();

        let query = SafetyRecordQuery {
            worker_id: Some(1),
            severity_level: Some(SeverityLevel::High),
            location: Some("north".to_string()),
            ..SafetyRecordQuery::default()
        };
        let page = SafetyRecord::find_many(&db, &query, &PageQuery::default()).await;
        let days: Vec<u32> = page
            .items
            .iter()
            .map(|r| chrono::Datelike::day(&r.occurrence_time))
            .collect();
        assert_eq!(days, vec![9, 3]);
    }

    #[actix_web::test]
    async fn time_window_is_inclusive() {
        let (_dir, db) = test_db();
        incident(None, 4, SeverityLevel::Medium).save(&db).await.unwrap();
        let at = NaiveDate::from_ymd_opt(2025, 4, 4)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();

        let query = SafetyRecordQuery {
            start_time: Some(at),
            end_time: Some(at),
            ..SafetyRecordQuery::default()
        };
        let page = SafetyRecord::find_many(&db, &query, &PageQuery::default()).await;
        assert_eq!(page.total_items, 1);
    }
}
