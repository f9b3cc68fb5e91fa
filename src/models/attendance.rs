use std::collections::BTreeMap;

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::{
    database::{Database, Record},
    error::Error,
};

use super::page::{Page, PageQuery};

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Normal,
    Late,
    EarlyLeave,
    Absent,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    #[serde(default)]
    pub id: Option<u64>,
    pub worker_id: u64,
    pub date: NaiveDate,
    pub check_in_time: Option<NaiveDateTime>,
    pub check_out_time: Option<NaiveDateTime>,
    pub status: AttendanceStatus,
    pub work_hours: Option<f64>,
    pub overtime_hours: Option<f64>,
    pub remarks: Option<String>,
}
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceQuery {
    pub worker_id: Option<u64>,
    pub status: Option<AttendanceStatus>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceStatistics {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_records: usize,
    pub status_counts: BTreeMap<AttendanceStatus, usize>,
}

impl Record for Attendance {
    fn id(&self) -> Option<u64> {
        self.id
    }
    fn set_id(&mut self, id: u64) {
        self.id = Some(id);
    }
}

impl AttendanceQuery {
    fn matches(&self, record: &Attendance) -> bool {
        self.worker_id.map_or(true, |id| record.worker_id == id)
            && self.status.map_or(true, |status| record.status == status)
            && self.start_date.map_or(true, |start| record.date >= start)
            && self.end_date.map_or(true, |end| record.date <= end)
    }
}

/// Hours between check-in and check-out, rounded to one decimal.
pub fn worked_hours(check_in: NaiveDateTime, check_out: NaiveDateTime) -> f64 {
    let minutes = (check_out - check_in).num_minutes() as f64;
    (minutes / 6.0).round() / 10.0
}

/// First and last day of the month containing `day`.
pub fn month_bounds(day: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = day.with_day(1).unwrap_or(day);
    let next_month = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    };
    let last = next_month.and_then(|d| d.pred_opt()).unwrap_or(first);
    (first, last)
}

impl Attendance {
    fn check_times(&self) -> Result<(), Error> {
        if let (Some(check_in), Some(check_out)) = (self.check_in_time, self.check_out_time) {
            if check_out < check_in {
                return Err(Error::validation("INVALID_TIME_RANGE"));
            }
        }
        Ok(())
    }
    pub async fn save(mut self, db: &Database) -> Result<Attendance, Error> {
        self.check_times()?;

        if self.id.is_none() && self.work_hours.is_none() {
            if let (Some(check_in), Some(check_out)) = (self.check_in_time, self.check_out_time) {
                self.work_hours = Some(worked_hours(check_in, check_out));
            }
        }

        Ok(db.attendance.save(self).await)
    }
    pub async fn update(mut self, db: &Database, id: u64) -> Result<Attendance, Error> {
        if !db.attendance.exists(id).await {
            return Err(Error::NotFound("ATTENDANCE_NOT_FOUND"));
        }
        self.id = Some(id);
        self.save(db).await
    }
    pub async fn find_by_id(db: &Database, id: u64) -> Option<Attendance> {
        db.attendance.find_by_id(id).await
    }
    pub async fn find_by_worker_and_date(
        db: &Database,
        worker_id: u64,
        date: NaiveDate,
    ) -> Option<Attendance> {
        db.attendance
            .find_one(|record| record.worker_id == worker_id && record.date == date)
            .await
    }
    /// Matching records, newest date first.
    pub async fn find_many(
        db: &Database,
        query: &AttendanceQuery,
        page: &PageQuery,
    ) -> Page<Attendance> {
        let mut records = db.attendance.find(|record| query.matches(record)).await;
        records.sort_by(|a, b| b.date.cmp(&a.date).then(a.id.cmp(&b.id)));
        Page::from_sorted(records, page)
    }
    pub async fn delete_by_id(db: &Database, id: u64) -> Result<usize, Error> {
        if db.attendance.delete_by_id(id).await {
            Ok(1)
        } else {
            Err(Error::NotFound("ATTENDANCE_NOT_FOUND"))
        }
    }
    pub async fn statistics(
        db: &Database,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<AttendanceStatistics, Error> {
        let (default_start, default_end) = month_bounds(Local::now().date_naive());
        let start_date = start_date.unwrap_or(default_start);
        let end_date = end_date.unwrap_or(default_end);
        if end_date < start_date {
            return Err(Error::validation("INVALID_DATE_RANGE"));
        }

        let records = db
            .attendance
            .find(|record| record.date >= start_date && record.date <= end_date)
            .await;
        let mut status_counts = BTreeMap::new();
        for status in [
            AttendanceStatus::Normal,
            AttendanceStatus::Late,
            AttendanceStatus::EarlyLeave,
            AttendanceStatus::Absent,
        ] {
            status_counts.insert(status, 0);
        }
        for record in records.iter() {
            *status_counts.entry(record.status).or_insert(0) += 1;
        }

        Ok(AttendanceStatistics {
            start_date,
            end_date,
            total_records: records.len(),
            status_counts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_db;

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 4, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn attendance(worker_id: u64, day: u32, status: AttendanceStatus) -> Attendance {
        Attendance {
            id: None,
            worker_id,
            date: NaiveDate::from_ymd_opt(2025, 4, day).unwrap(),
            check_in_time: Some(at(day, 8, 0)),
            check_out_time: Some(at(day, 17, 0)),
            status,
            work_hours: None,
            overtime_hours: Some(0.0),
            remarks: None,
        }
    }

    #[test]
    fn worked_hours_round_to_one_decimal() {
        assert_eq!(worked_hours(at(1, 8, 0), at(1, 16, 0)), 8.0);
        assert_eq!(worked_hours(at(1, 8, 0), at(1, 15, 32)), 7.5);
        assert_eq!(worked_hours(at(1, 8, 0), at(1, 8, 20)), 0.3);
    }

    #[test]
    fn month_bounds_handle_december() {
        let (first, last) = month_bounds(NaiveDate::from_ymd_opt(2024, 12, 17).unwrap());
        assert_eq!(first, NaiveDate::from_ymd_opt(2024, 12, 1).unwrap());
        assert_eq!(last, NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());

        let (_, last) = month_bounds(NaiveDate::from_ymd_opt(2024, 2, 10).unwrap());
        assert_eq!(last, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[actix_web::test]
    async fn new_record_gets_computed_work_hours() {
        let (_dir, db) = test_db();
        let saved = attendance(1, 2, AttendanceStatus::Normal)
            .save(&db)
            .await
            .unwrap();
        assert_eq!(saved.work_hours, Some(9.0));
    }

    #[actix_web::test]
    async fn explicit_work_hours_are_kept() {
        let (_dir, db) = test_db();
        let mut record = attendance(1, 2, AttendanceStatus::Late);
        record.work_hours = Some(7.5);
        assert_eq!(record.save(&db).await.unwrap().work_hours, Some(7.5));
    }

    #[actix_web::test]
    async fn check_out_before_check_in_is_rejected() {
        let (_dir, db) = test_db();
        let mut record = attendance(1, 2, AttendanceStatus::Normal);
        record.check_out_time = Some(at(2, 7, 0));
        let error = record.save(&db).await.unwrap_err();
        assert_eq!(error.to_string(), "INVALID_TIME_RANGE");
    }

    #[actix_web::test]
    async fn listing_is_newest_first_and_filtered() {
        let (_dir, db) = test_db();
        for day in [3, 1, 2] {
            attendance(1, day, AttendanceStatus::Normal)
                .save(&db)
                .await
                .unwrap();
        }
        attendance(2, 4, AttendanceStatus::Absent)
            .save(&db)
            .await
            .unwrap();

        let query = AttendanceQuery {
            worker_id: Some(1),
            ..AttendanceQuery::default()
        };
        let page = Attendance::find_many(&db, &query, &PageQuery::default()).await;
        let days: Vec<u32> = page.items.iter().map(|r| r.date.day()).collect();
        assert_eq!(days, vec![3, 2, 1]);
    }

    #[actix_web::test]
    async fn statistics_count_each_status_in_range() {
        let (_dir, db) = test_db();
        attendance(1, 1, AttendanceStatus::Normal).save(&db).await.unwrap();
        attendance(1, 2, AttendanceStatus::Late).save(&db).await.unwrap();
        attendance(2, 2, AttendanceStatus::Late).save(&db).await.unwrap();
        attendance(2, 20, AttendanceStatus::Absent).save(&db).await.unwrap();

        let stats = Attendance::statistics(
            &db,
            NaiveDate::from_ymd_opt(2025, 4, 1),
            NaiveDate::from_ymd_opt(2025, 4, 10),
        )
        .await
        .unwrap();
        assert_eq!(stats.total_records, 3);
        assert_eq!(stats.status_counts[&AttendanceStatus::Late], 2);
        assert_eq!(stats.status_counts[&AttendanceStatus::Absent], 0);
    }

    #[actix_web::test]
    async fn find_by_worker_and_date_matches_both_keys() {
        let (_dir, db) = test_db();
        attendance(1, 5, AttendanceStatus::Normal).save(&db).await.unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 4, 5).unwrap();
        assert!(Attendance::find_by_worker_and_date(&db, 1, date).await.is_some());
        assert!(Attendance::find_by_worker_and_date(&db, 2, date).await.is_none());
    }
}
