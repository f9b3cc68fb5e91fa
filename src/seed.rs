use chrono::{Datelike, Duration, Local, NaiveDate, NaiveTime};
use tracing::info;

use crate::{
    database::Database,
    error::Error,
    models::{
        attendance::{Attendance, AttendanceStatus},
        progress::{Progress, ProgressStatus},
        project::{Project, ProjectStatusKind},
        safety_record::{SafetyEventKind, SafetyRecordRequest, SeverityLevel},
        schedule::ScheduleRequest,
        weather::WeatherProvider,
        worker::{Worker, WorkerRequest, WorkerStatus},
    },
};

const WORKERS: [(&str, &str, &str, &str); 5] = [
    ("Zhang Wei", "male", "110101198503071234", "paver operator"),
    ("Li Na", "female", "320102199002152345", "surveyor"),
    ("Wang Qiang", "male", "440103198811203456", "roller operator"),
    ("Liu Yang", "male", "510104199206184567", "safety officer"),
    ("Chen Jie", "female", "33010519950909567X", "site engineer"),
];

/// Fills an empty store with a small, coherent set of sample records.
/// Returns `false` without touching anything when workers already exist.
pub async fn seed(db: &Database, weather: &WeatherProvider) -> Result<bool, Error> {
    if !db.workers.is_empty().await {
        return Ok(false);
    }
    let today = Local::now().date_naive();

    let mut workers: Vec<Worker> = Vec::new();
    for (name, gender, id_card, position) in WORKERS {
        let worker = WorkerRequest {
            name: name.to_string(),
            gender: Some(gender.to_string()),
            age: None,
            id_card: id_card.to_string(),
            phone: Some("13800138000".to_string()),
            position: Some(position.to_string()),
            hire_date: NaiveDate::from_ymd_opt(2022, 3, 1),
            status: Some(WorkerStatus::Active),
            address: None,
            remarks: None,
        }
        .into_worker(None)
        .save(db)
        .await?;
        workers.push(worker);
    }
    let first_worker = workers[0].id.unwrap_or(1);

    let mut projects: Vec<Project> = Vec::new();
    for (name, location, progress) in [
        ("Expressway widening, north section", "K10-K30", 35),
        ("Interchange ramp reconstruction", "K42+500", 10),
    ] {
        let project = Project {
            id: None,
            name: name.to_string(),
            description: None,
            location: location.to_string(),
            start_date: NaiveDate::from_ymd_opt(today.year(), 1, 1),
            end_date: None,
            status: ProjectStatusKind::Running,
            manager: Some(WORKERS[4].0.to_string()),
            budget: None,
            progress,
        }
        .save(db)
        .await?;
        projects.push(project);
    }
    let first_project = projects[0].id;

    for (shift_type, start_hour, end_hour) in [("morning", 8, 16), ("evening", 16, 0)] {
        let (Some(start_time), Some(end_time)) = (
            NaiveTime::from_hms_opt(start_hour, 0, 0),
            NaiveTime::from_hms_opt(end_hour, 0, 0),
        ) else {
            continue;
        };
        ScheduleRequest {
            worker_id: first_worker,
            project_id: first_project,
            date: today,
            shift_type: shift_type.to_string(),
            start_time,
            end_time,
            location: projects[0].location.clone(),
            status: None,
            remarks: None,
        }
        .into_schedule(None)
        .create(db, weather)
        .await?;
    }

    let yesterday = today - Duration::days(1);
    let midnight = yesterday.and_time(NaiveTime::MIN);
    for (worker, status, late_by) in [
        (&workers[0], AttendanceStatus::Normal, 0),
        (&workers[1], AttendanceStatus::Late, 25),
    ] {
        let check_in = midnight + Duration::minutes(8 * 60 + late_by);
        let check_out = midnight + Duration::hours(17);
        Attendance {
            id: None,
            worker_id: worker.id.unwrap_or_default(),
            date: yesterday,
            check_in_time: Some(check_in),
            check_out_time: Some(check_out),
            status,
            work_hours: None,
            overtime_hours: None,
            remarks: None,
        }
        .save(db)
        .await?;
    }

    for (worker, kind, severity, description) in [
        (
            &workers[0],
            SafetyEventKind::NearMiss,
            SeverityLevel::Medium,
            "Roller reversed without a spotter",
        ),
        (
            &workers[2],
            SafetyEventKind::Violation,
            SeverityLevel::Low,
            "Hard hat not worn in the paving zone",
        ),
        (
            &workers[1],
            SafetyEventKind::FirstAid,
            SeverityLevel::High,
            "Hand burned by hot asphalt",
        ),
    ] {
        SafetyRecordRequest {
            worker_id: worker.id,
            project_id: first_project,
            event_type: kind,
            severity_level: severity,
            description: description.to_string(),
            location: projects[0].location.clone(),
            occurrence_time: midnight + Duration::hours(10),
            status: None,
            measures: None,
            handler: Some(WORKERS[3].0.to_string()),
            remarks: None,
        }
        .into_record(None)
        .save(db)
        .await?;
    }

    for (project, section, planned, actual) in [
        (&projects[0], "K10-K15 subgrade", 60, 55),
        (&projects[0], "K15-K20 base course", 30, 30),
        (&projects[1], "Ramp A piling", 20, 10),
    ] {
        Progress {
            id: None,
            project_id: project.id.unwrap_or_default(),
            section: section.to_string(),
            planned_progress: planned,
            actual_progress: actual,
            start_date: project.start_date,
            planned_end_date: Some(today + Duration::days(90)),
            actual_end_date: None,
            status: ProgressStatus::InProgress,
            description: None,
            obstacles: None,
            solutions: None,
            update_time: None,
            updated_by: Some(WORKERS[4].0.to_string()),
            remarks: None,
        }
        .save(db)
        .await?;
    }

    info!(
        workers = workers.len(),
        projects = projects.len(),
        "sample data seeded"
    );
    Ok(true)
}
