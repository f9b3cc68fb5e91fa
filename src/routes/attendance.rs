use actix_web::{delete, get, post, put, web, HttpResponse, ResponseError};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::{
    database::Database,
    models::{
        attendance::{Attendance, AttendanceQuery},
        page::PageQuery,
    },
};

use super::{deleted, parse_id};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Deserialize)]
pub struct DayQuery {
    pub date: NaiveDate,
}

#[get("/api/attendance")]
pub async fn get_attendances(
    db: web::Data<Database>,
    query: web::Query<AttendanceQuery>,
    page: web::Query<PageQuery>,
) -> HttpResponse {
    HttpResponse::Ok().json(Attendance::find_many(&db, &query, &page).await)
}
#[get("/api/attendance/statistics")]
pub async fn get_attendance_statistics(
    db: web::Data<Database>,
    query: web::Query<StatisticsQuery>,
) -> HttpResponse {
    match Attendance::statistics(&db, query.start_date, query.end_date).await {
        Ok(statistics) => HttpResponse::Ok().json(statistics),
        Err(error) => error.error_response(),
    }
}
#[get("/api/attendance/{attendance_id}")]
pub async fn get_attendance(
    db: web::Data<Database>,
    attendance_id: web::Path<String>,
) -> HttpResponse {
    let attendance_id = match parse_id(&attendance_id) {
        Ok(attendance_id) => attendance_id,
        Err(error) => return error.error_response(),
    };

    match Attendance::find_by_id(&db, attendance_id).await {
        Some(attendance) => HttpResponse::Ok().json(attendance),
        None => HttpResponse::NotFound().body("ATTENDANCE_NOT_FOUND"),
    }
}
#[get("/api/attendance/worker/{worker_id}")]
pub async fn get_worker_attendance_on(
    db: web::Data<Database>,
    worker_id: web::Path<String>,
    query: web::Query<DayQuery>,
) -> HttpResponse {
    let worker_id = match parse_id(&worker_id) {
        Ok(worker_id) => worker_id,
        Err(error) => return error.error_response(),
    };

    match Attendance::find_by_worker_and_date(&db, worker_id, query.date).await {
        Some(attendance) => HttpResponse::Ok().json(attendance),
        None => HttpResponse::NotFound().body("ATTENDANCE_NOT_FOUND"),
    }
}
#[post("/api/attendance")]
pub async fn create_attendance(
    db: web::Data<Database>,
    payload: web::Json<Attendance>,
) -> HttpResponse {
    let mut attendance: Attendance = payload.into_inner();
    attendance.id = None;

    match attendance.save(&db).await {
        Ok(attendance) => HttpResponse::Created().json(attendance),
        Err(error) => error.error_response(),
    }
}
#[put("/api/attendance/{attendance_id}")]
pub async fn update_attendance(
    db: web::Data<Database>,
    attendance_id: web::Path<String>,
    payload: web::Json<Attendance>,
) -> HttpResponse {
    let attendance_id = match parse_id(&attendance_id) {
        Ok(attendance_id) => attendance_id,
        Err(error) => return error.error_response(),
    };

    match payload.into_inner().update(&db, attendance_id).await {
        Ok(attendance) => HttpResponse::Ok().json(attendance),
        Err(error) => error.error_response(),
    }
}
#[delete("/api/attendance/{attendance_id}")]
pub async fn delete_attendance(
    db: web::Data<Database>,
    attendance_id: web::Path<String>,
) -> HttpResponse {
    let attendance_id = match parse_id(&attendance_id) {
        Ok(attendance_id) => attendance_id,
        Err(error) => return error.error_response(),
    };

    match Attendance::delete_by_id(&db, attendance_id).await {
        Ok(count) => deleted(count),
        Err(error) => error.error_response(),
    }
}
