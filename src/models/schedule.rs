use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    database::{Database, Record},
    error::Error,
};

use super::{
    page::{Page, PageQuery},
    weather::{weather_impact, WeatherCondition, WeatherInfo, WeatherProvider},
};

const SECONDS_PER_DAY: u32 = 24 * 60 * 60;

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    #[serde(default)]
    pub id: Option<u64>,
    pub worker_id: u64,
    pub project_id: Option<u64>,
    pub date: NaiveDate,
    pub shift_type: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub location: String,
    pub status: ScheduleStatus,
    pub weather_condition: Option<WeatherCondition>,
    pub temperature: Option<f64>,
    pub rainfall: Option<f64>,
    pub wind_speed: Option<f64>,
    pub weather_alert: Option<String>,
    pub suitable_for_work: Option<bool>,
    pub weather_impact: Option<String>,
    #[serde(default)]
    pub has_conflict: bool,
    pub conflict_description: Option<String>,
    pub remarks: Option<String>,
}
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRequest {
    pub worker_id: u64,
    pub project_id: Option<u64>,
    pub date: NaiveDate,
    pub shift_type: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub location: String,
    pub status: Option<ScheduleStatus>,
    pub remarks: Option<String>,
}
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleQuery {
    pub worker_id: Option<u64>,
    pub project_id: Option<u64>,
    pub date: Option<NaiveDate>,
    pub location: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictReport {
    pub has_conflict: bool,
    pub conflict_message: String,
    pub conflicting_ids: Vec<u64>,
}
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleWeatherReport {
    pub weather_condition: Option<WeatherCondition>,
    pub suitable_for_work: Option<bool>,
    pub work_suggestion: Option<String>,
}
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShortRest {
    pub previous_id: u64,
    pub next_id: u64,
    pub rest_hours: f64,
}
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RestReport {
    pub worker_id: u64,
    pub max_continuous_work_hours: f64,
    pub min_rest_hours: f64,
    pub overlong_shifts: Vec<u64>,
    pub short_rests: Vec<ShortRest>,
}

impl Record for Schedule {
    fn id(&self) -> Option<u64> {
        self.id
    }
    fn set_id(&mut self, id: u64) {
        self.id = Some(id);
    }
}

impl ScheduleRequest {
    pub fn into_schedule(self, id: Option<u64>) -> Schedule {
        Schedule {
            id,
            worker_id: self.worker_id,
            project_id: self.project_id,
            date: self.date,
            shift_type: self.shift_type,
            start_time: self.start_time,
            end_time: self.end_time,
            location: self.location,
            status: self.status.unwrap_or(ScheduleStatus::Pending),
            weather_condition: None,
            temperature: None,
            rainfall: None,
            wind_speed: None,
            weather_alert: None,
            suitable_for_work: None,
            weather_impact: None,
            has_conflict: false,
            conflict_description: None,
            remarks: self.remarks,
        }
    }
}

impl ScheduleQuery {
    fn matches(&self, schedule: &Schedule) -> bool {
        self.worker_id.map_or(true, |id| schedule.worker_id == id)
            && self
                .project_id
                .map_or(true, |id| schedule.project_id == Some(id))
            && self.date.map_or(true, |date| schedule.date == date)
            && self
                .location
                .as_deref()
                .filter(|location| !location.is_empty())
                .map_or(true, |location| schedule.location == location)
            && self.start_date.map_or(true, |start| schedule.date >= start)
            && self.end_date.map_or(true, |end| schedule.date <= end)
    }
}

/// Two shifts conflict when they belong to the same worker on the same date
/// and their `[start, end)` intervals intersect. Touching shifts do not.
pub fn overlaps(a: &Schedule, b: &Schedule) -> bool {
    if a.worker_id != b.worker_id || a.date != b.date {
        return false;
    }
    let (a_start, a_end) = a.interval();
    let (b_start, b_end) = b.interval();
    !(a_end <= b_start || a_start >= b_end)
}

/// Shifts in `existing` that overlap `candidate`, skipping the candidate itself.
pub fn find_conflicts<'a>(candidate: &Schedule, existing: &'a [Schedule]) -> Vec<&'a Schedule> {
    existing
        .iter()
        .filter(|other| candidate.id.is_none() || other.id != candidate.id)
        .filter(|other| overlaps(candidate, other))
        .collect()
}

impl Schedule {
    /// Seconds since midnight as `[start, end)`. An end of exactly `00:00:00`
    /// closes the day.
    pub fn interval(&self) -> (u32, u32) {
        let start = self.start_time.num_seconds_from_midnight();
        let end = if self.end_time == NaiveTime::MIN {
            SECONDS_PER_DAY
        } else {
            self.end_time.num_seconds_from_midnight()
        };
        (start, end)
    }
    fn span(&self) -> (NaiveDateTime, NaiveDateTime) {
        let (start, end) = self.interval();
        let midnight = self.date.and_time(NaiveTime::MIN);
        (
            midnight + Duration::seconds(i64::from(start)),
            midnight + Duration::seconds(i64::from(end)),
        )
    }
    pub fn validate(&self) -> Result<(), Error> {
        let (start, end) = self.interval();
        if end <= start {
            return Err(Error::validation("INVALID_TIME_RANGE"));
        }
        if self.location.trim().is_empty() {
            return Err(Error::validation("SCHEDULE_MUST_HAVE_LOCATION"));
        }
        Ok(())
    }
    async fn assess_conflicts(&mut self, db: &Database) {
        let (worker_id, date) = (self.worker_id, self.date);
        let same_day = db
            .schedules
            .find(|other| other.worker_id == worker_id && other.date == date)
            .await;
        let conflicts = find_conflicts(self, &same_day);

        self.has_conflict = !conflicts.is_empty();
        self.conflict_description = if conflicts.is_empty() {
            None
        } else {
            let described: Vec<String> = conflicts
                .iter()
                .map(|other| {
                    format!(
                        "#{} ({}-{})",
                        other.id.unwrap_or_default(),
                        other.start_time.format("%H:%M"),
                        other.end_time.format("%H:%M")
                    )
                })
                .collect();
            Some(format!("Overlaps shift {}", described.join(", ")))
        };
    }
    pub fn apply_weather(&mut self, info: &WeatherInfo) {
        self.weather_condition = Some(info.weather_condition);
        self.temperature = Some(info.temperature);
        self.rainfall = Some(info.rainfall);
        self.wind_speed = Some(info.wind_speed);
        self.weather_alert = info.weather_alert.clone();
        self.suitable_for_work = Some(info.suitable_for_work);
        self.weather_impact = Some(weather_impact(&info.reading()));
    }
    async fn attach_weather(&mut self, db: &Database, weather: &WeatherProvider) -> Result<(), Error> {
        match weather.lookup(db, &self.location, self.date).await {
            Ok(info) => {
                self.apply_weather(&info);
                Ok(())
            }
            Err(Error::NotFound(code)) => {
                warn!(location = %self.location, date = %self.date, code, "no weather for shift");
                Ok(())
            }
            Err(error) => Err(error),
        }
    }
    pub async fn create(
        mut self,
        db: &Database,
        weather: &WeatherProvider,
    ) -> Result<Schedule, Error> {
        self.id = None;
        self.validate()?;
        self.assess_conflicts(db).await;
        self.attach_weather(db, weather).await?;

        let schedule = db.schedules.save(self).await;
        if schedule.has_conflict {
            info!(id = ?schedule.id, worker_id = schedule.worker_id, "shift saved with conflict");
        }
        Ok(schedule)
    }
    pub async fn update(
        mut self,
        db: &Database,
        weather: &WeatherProvider,
        id: u64,
    ) -> Result<Schedule, Error> {
        if !db.schedules.exists(id).await {
            return Err(Error::NotFound("SCHEDULE_NOT_FOUND"));
        }
        self.id = Some(id);
        self.validate()?;
        self.assess_conflicts(db).await;
        self.attach_weather(db, weather).await?;

        Ok(db.schedules.save(self).await)
    }
    pub async fn find_by_id(db: &Database, id: u64) -> Option<Schedule> {
        db.schedules.find_by_id(id).await
    }
    /// Matching shifts ordered by date, then start time.
    pub async fn find_many(db: &Database, query: &ScheduleQuery, page: &PageQuery) -> Page<Schedule> {
        let mut schedules = db.schedules.find(|schedule| query.matches(schedule)).await;
        schedules.sort_by(|a, b| {
            a.date
                .cmp(&b.date)
                .then(a.start_time.cmp(&b.start_time))
                .then(a.id.cmp(&b.id))
        });
        Page::from_sorted(schedules, page)
    }
    pub async fn delete_by_id(db: &Database, id: u64) -> Result<usize, Error> {
        if db.schedules.delete_by_id(id).await {
            Ok(1)
        } else {
            Err(Error::NotFound("SCHEDULE_NOT_FOUND"))
        }
    }
    pub async fn delete_many(db: &Database, ids: &[u64]) -> usize {
        db.schedules.delete_many(ids).await
    }
    /// Re-runs the overlap check for a stored shift against the current store.
    pub async fn check_conflict(db: &Database, id: u64) -> Result<ConflictReport, Error> {
        let schedule = Self::find_by_id(db, id)
            .await
            .ok_or(Error::NotFound("SCHEDULE_NOT_FOUND"))?;
        let same_day = db
            .schedules
            .find(|other| other.worker_id == schedule.worker_id && other.date == schedule.date)
            .await;
        let conflicting_ids: Vec<u64> = find_conflicts(&schedule, &same_day)
            .iter()
            .filter_map(|other| other.id)
            .collect();

        let has_conflict = !conflicting_ids.is_empty();
        Ok(ConflictReport {
            has_conflict,
            conflict_message: if has_conflict {
                "Time conflict found".to_string()
            } else {
                "No conflict found".to_string()
            },
            conflicting_ids,
        })
    }
    pub async fn refresh_weather(
        db: &Database,
        weather: &WeatherProvider,
        id: u64,
    ) -> Result<ScheduleWeatherReport, Error> {
        let mut schedule = Self::find_by_id(db, id)
            .await
            .ok_or(Error::NotFound("SCHEDULE_NOT_FOUND"))?;
        let info = weather.lookup(db, &schedule.location, schedule.date).await?;
        schedule.apply_weather(&info);
        let schedule = db.schedules.save(schedule).await;

        Ok(ScheduleWeatherReport {
            weather_condition: schedule.weather_condition,
            suitable_for_work: schedule.suitable_for_work,
            work_suggestion: schedule.weather_impact,
        })
    }
    /// Shifts longer than the continuous-work limit and consecutive shifts
    /// with less rest between them than the minimum.
    pub async fn rest_check(
        db: &Database,
        worker_id: u64,
        max_continuous_work_hours: f64,
        min_rest_hours: f64,
    ) -> RestReport {
        let mut shifts: Vec<(u64, NaiveDateTime, NaiveDateTime)> = db
            .schedules
            .find(|schedule| {
                schedule.worker_id == worker_id && schedule.status != ScheduleStatus::Cancelled
            })
            .await
            .iter()
            .filter_map(|schedule| {
                let (start, end) = schedule.span();
                schedule.id.map(|id| (id, start, end))
            })
            .collect();
        shifts.sort_by_key(|(id, start, _)| (*start, *id));

        let hours = |duration: Duration| duration.num_seconds() as f64 / 3600.0;
        let overlong_shifts = shifts
            .iter()
            .filter(|(_, start, end)| hours(*end - *start) > max_continuous_work_hours)
            .map(|(id, _, _)| *id)
            .collect();
        let short_rests = shifts
            .windows(2)
            .filter_map(|pair| {
                let (previous_id, _, previous_end) = pair[0];
                let (next_id, next_start, _) = pair[1];
                let rest_hours = hours(next_start - previous_end);
                (rest_hours < min_rest_hours).then_some(ShortRest {
                    previous_id,
                    next_id,
                    rest_hours,
                })
            })
            .collect();

        RestReport {
            worker_id,
            max_continuous_work_hours,
            min_rest_hours,
            overlong_shifts,
            short_rests,
        }
    }
}
