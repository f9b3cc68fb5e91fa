use actix_web::{delete, get, post, put, web, HttpResponse, ResponseError};

use crate::{
    config::Config,
    database::Database,
    models::{
        page::PageQuery,
        schedule::{Schedule, ScheduleQuery, ScheduleRequest},
        weather::WeatherProvider,
    },
};

use super::{deleted, parse_id};

#[get("/api/schedules")]
pub async fn get_schedules(
    db: web::Data<Database>,
    query: web::Query<ScheduleQuery>,
    page: web::Query<PageQuery>,
) -> HttpResponse {
    HttpResponse::Ok().json(Schedule::find_many(&db, &query, &page).await)
}
#[get("/api/schedules/rest-check/{worker_id}")]
pub async fn get_rest_check(
    db: web::Data<Database>,
    config: web::Data<Config>,
    worker_id: web::Path<String>,
) -> HttpResponse {
    let worker_id = match parse_id(&worker_id) {
        Ok(worker_id) => worker_id,
        Err(error) => return error.error_response(),
    };

    let report = Schedule::rest_check(
        &db,
        worker_id,
        config.max_continuous_work_hours,
        config.min_rest_hours,
    )
    .await;
    HttpResponse::Ok().json(report)
}
#[get("/api/schedules/{schedule_id}")]
pub async fn get_schedule(db: web::Data<Database>, schedule_id: web::Path<String>) -> HttpResponse {
    let schedule_id = match parse_id(&schedule_id) {
        Ok(schedule_id) => schedule_id,
        Err(error) => return error.error_response(),
    };

    match Schedule::find_by_id(&db, schedule_id).await {
        Some(schedule) => HttpResponse::Ok().json(schedule),
        None => HttpResponse::NotFound().body("SCHEDULE_NOT_FOUND"),
    }
}
#[get("/api/schedules/{schedule_id}/conflict")]
pub async fn get_schedule_conflict(
    db: web::Data<Database>,
    schedule_id: web::Path<String>,
) -> HttpResponse {
    let schedule_id = match parse_id(&schedule_id) {
        Ok(schedule_id) => schedule_id,
        Err(error) => return error.error_response(),
    };

    match Schedule::check_conflict(&db, schedule_id).await {
        Ok(report) => HttpResponse::Ok().json(report),
        Err(error) => error.error_response(),
    }
}
#[post("/api/schedules/{schedule_id}/weather")]
pub async fn refresh_schedule_weather(
    db: web::Data<Database>,
    weather: web::Data<WeatherProvider>,
    schedule_id: web::Path<String>,
) -> HttpResponse {
    let schedule_id = match parse_id(&schedule_id) {
        Ok(schedule_id) => schedule_id,
        Err(error) => return error.error_response(),
    };

    match Schedule::refresh_weather(&db, &weather, schedule_id).await {
        Ok(report) => HttpResponse::Ok().json(report),
        Err(error) => error.error_response(),
    }
}
#[post("/api/schedules")]
pub async fn create_schedule(
    db: web::Data<Database>,
    weather: web::Data<WeatherProvider>,
    payload: web::Json<ScheduleRequest>,
) -> HttpResponse {
    let schedule: Schedule = payload.into_inner().into_schedule(None);

    match schedule.create(&db, &weather).await {
        Ok(schedule) => HttpResponse::Created().json(schedule),
        Err(error) => error.error_response(),
    }
}
#[put("/api/schedules/{schedule_id}")]
pub async fn update_schedule(
    db: web::Data<Database>,
    weather: web::Data<WeatherProvider>,
    schedule_id: web::Path<String>,
    payload: web::Json<ScheduleRequest>,
) -> HttpResponse {
    let schedule_id = match parse_id(&schedule_id) {
        Ok(schedule_id) => schedule_id,
        Err(error) => return error.error_response(),
    };
    let schedule: Schedule = payload.into_inner().into_schedule(Some(schedule_id));

    match schedule.update(&db, &weather, schedule_id).await {
        Ok(schedule) => HttpResponse::Ok().json(schedule),
        Err(error) => error.error_response(),
    }
}
#[delete("/api/schedules/{schedule_id}")]
pub async fn delete_schedule(
    db: web::Data<Database>,
    schedule_id: web::Path<String>,
) -> HttpResponse {
    let schedule_id = match parse_id(&schedule_id) {
        Ok(schedule_id) => schedule_id,
        Err(error) => return error.error_response(),
    };

    match Schedule::delete_by_id(&db, schedule_id).await {
        Ok(count) => deleted(count),
        Err(error) => error.error_response(),
    }
}
#[delete("/api/schedules")]
pub async fn delete_schedules(
    db: web::Data<Database>,
    payload: web::Json<Vec<u64>>,
) -> HttpResponse {
    deleted(Schedule::delete_many(&db, &payload).await)
}
