use actix_web::{delete, get, post, put, web, HttpResponse, ResponseError};
use chrono::Local;
use serde_json::json;

use crate::{
    database::Database,
    models::{
        page::PageQuery,
        progress::{Progress, ProgressQuery},
    },
};

use super::{deleted, parse_id};

#[get("/api/progress")]
pub async fn get_progresses(
    db: web::Data<Database>,
    query: web::Query<ProgressQuery>,
    page: web::Query<PageQuery>,
) -> HttpResponse {
    HttpResponse::Ok().json(Progress::find_many(&db, &query, &page).await)
}
#[get("/api/progress/behind-schedule")]
pub async fn get_behind_schedule(db: web::Data<Database>) -> HttpResponse {
    let today = Local::now().date_naive();
    HttpResponse::Ok().json(Progress::find_behind_schedule(&db, today).await)
}
#[get("/api/progress/{progress_id}")]
pub async fn get_progress(db: web::Data<Database>, progress_id: web::Path<String>) -> HttpResponse {
    let progress_id = match parse_id(&progress_id) {
        Ok(progress_id) => progress_id,
        Err(error) => return error.error_response(),
    };

    match Progress::find_by_id(&db, progress_id).await {
        Some(progress) => HttpResponse::Ok().json(progress),
        None => HttpResponse::NotFound().body("PROGRESS_NOT_FOUND"),
    }
}
#[get("/api/progress/{progress_id}/status")]
pub async fn get_progress_status(
    db: web::Data<Database>,
    progress_id: web::Path<String>,
) -> HttpResponse {
    let progress_id = match parse_id(&progress_id) {
        Ok(progress_id) => progress_id,
        Err(error) => return error.error_response(),
    };
    let today = Local::now().date_naive();

    match Progress::find_by_id(&db, progress_id).await {
        Some(progress) => HttpResponse::Ok().json(json!({
            "delayed": progress.is_delayed(today),
            "status": progress.derived_status(today),
        })),
        None => HttpResponse::NotFound().body("PROGRESS_NOT_FOUND"),
    }
}
#[post("/api/progress")]
pub async fn create_progress(
    db: web::Data<Database>,
    payload: web::Json<Progress>,
) -> HttpResponse {
    let mut progress: Progress = payload.into_inner();
    progress.id = None;

    match progress.save(&db).await {
        Ok(progress) => HttpResponse::Created().json(progress),
        Err(error) => error.error_response(),
    }
}
#[put("/api/progress/{progress_id}")]
pub async fn update_progress(
    db: web::Data<Database>,
    progress_id: web::Path<String>,
    payload: web::Json<Progress>,
) -> HttpResponse {
    let progress_id = match parse_id(&progress_id) {
        Ok(progress_id) => progress_id,
        Err(error) => return error.error_response(),
    };

    match payload.into_inner().update(&db, progress_id).await {
        Ok(progress) => HttpResponse::Ok().json(progress),
        Err(error) => error.error_response(),
    }
}
#[delete("/api/progress/{progress_id}")]
pub async fn delete_progress(
    db: web::Data<Database>,
    progress_id: web::Path<String>,
) -> HttpResponse {
    let progress_id = match parse_id(&progress_id) {
        Ok(progress_id) => progress_id,
        Err(error) => return error.error_response(),
    };

    match Progress::delete_by_id(&db, progress_id).await {
        Ok(count) => deleted(count),
        Err(error) => error.error_response(),
    }
}
