use actix_web::{error::InternalError, web, HttpResponse};
use serde_json::json;
use tracing::debug;

use crate::error::Error;

pub mod attendance;
pub mod progress;
pub mod project;
pub mod safety_record;
pub mod schedule;
pub mod weather;
pub mod worker;

/// Registers every API route together with the extractor error handlers.
///
/// Literal segments (`/statistics`, `/id-card/...`, `/behind-schedule`) are
/// registered ahead of the `{id}` routes they would otherwise collide with.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .service(worker::get_worker_statistics)
        .service(worker::get_worker_by_id_card)
        .service(worker::get_workers)
        .service(worker::get_worker)
        .service(worker::create_worker)
        .service(worker::update_worker)
        .service(worker::delete_worker)
        .service(worker::delete_workers)
        .service(attendance::get_attendance_statistics)
        .service(attendance::get_attendances)
        .service(attendance::get_worker_attendance_on)
        .service(attendance::get_attendance)
        .service(attendance::create_attendance)
        .service(attendance::update_attendance)
        .service(attendance::delete_attendance)
        .service(schedule::get_rest_check)
        .service(schedule::get_schedules)
        .service(schedule::get_schedule)
        .service(schedule::get_schedule_conflict)
        .service(schedule::refresh_schedule_weather)
        .service(schedule::create_schedule)
        .service(schedule::update_schedule)
        .service(schedule::delete_schedule)
        .service(schedule::delete_schedules)
        .service(weather::get_weather)
        .service(weather::update_weather)
        .service(weather::check_weather)
        .service(weather::get_work_suggestion)
        .service(safety_record::get_safety_records)
        .service(safety_record::get_safety_record)
        .service(safety_record::create_safety_record)
        .service(safety_record::update_safety_record)
        .service(safety_record::delete_safety_record)
        .service(safety_record::delete_safety_records)
        .service(project::get_projects)
        .service(project::get_project)
        .service(project::create_project)
        .service(project::update_project)
        .service(project::delete_project)
        .service(progress::get_behind_schedule)
        .service(progress::get_progresses)
        .service(progress::get_progress)
        .service(progress::get_progress_status)
        .service(progress::create_progress)
        .service(progress::update_progress)
        .service(progress::delete_progress);
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|error, _req| {
        debug!(%error, "rejected request body");
        InternalError::from_response(error, HttpResponse::BadRequest().body("INVALID_PAYLOAD"))
            .into()
    })
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|error, _req| {
        debug!(%error, "rejected query string");
        InternalError::from_response(error, HttpResponse::BadRequest().body("INVALID_QUERY"))
            .into()
    })
}

pub(crate) fn parse_id(raw: &str) -> Result<u64, Error> {
    raw.trim()
        .parse()
        .map_err(|_| Error::validation("INVALID_ID"))
}

pub(crate) fn deleted(count: usize) -> HttpResponse {
    HttpResponse::Ok().json(json!({ "deleted": count }))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_must_be_numeric() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert_eq!(parse_id("abc").unwrap_err().to_string(), "INVALID_ID");
        assert!(parse_id("-1").is_err());
    }
}
