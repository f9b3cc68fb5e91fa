use actix_web::{delete, get, post, put, web, HttpResponse, ResponseError};
use tracing::info;

use crate::{
    database::Database,
    models::{
        page::PageQuery,
        worker::{Worker, WorkerQuery, WorkerRequest},
    },
};

use super::{deleted, parse_id};

#[get("/api/workers")]
pub async fn get_workers(
    db: web::Data<Database>,
    query: web::Query<WorkerQuery>,
    page: web::Query<PageQuery>,
) -> HttpResponse {
    HttpResponse::Ok().json(Worker::find_many(&db, &query, &page).await)
}
#[get("/api/workers/statistics")]
pub async fn get_worker_statistics(db: web::Data<Database>) -> HttpResponse {
    HttpResponse::Ok().json(Worker::statistics(&db).await)
}
#[get("/api/workers/id-card/{id_card}")]
pub async fn get_worker_by_id_card(
    db: web::Data<Database>,
    id_card: web::Path<String>,
) -> HttpResponse {
    match Worker::find_by_id_card(&db, &id_card).await {
        Some(worker) => HttpResponse::Ok().json(worker),
        None => HttpResponse::NotFound().body("WORKER_NOT_FOUND"),
    }
}
#[get("/api/workers/{worker_id}")]
pub async fn get_worker(db: web::Data<Database>, worker_id: web::Path<String>) -> HttpResponse {
    let worker_id = match parse_id(&worker_id) {
        Ok(worker_id) => worker_id,
        Err(error) => return error.error_response(),
    };

    match Worker::find_by_id(&db, worker_id).await {
        Some(worker) => HttpResponse::Ok().json(worker),
        None => HttpResponse::NotFound().body("WORKER_NOT_FOUND"),
    }
}
#[post("/api/workers")]
pub async fn create_worker(
    db: web::Data<Database>,
    payload: web::Json<WorkerRequest>,
) -> HttpResponse {
    let worker: Worker = payload.into_inner().into_worker(None);

    match worker.save(&db).await {
        Ok(worker) => {
            info!(id = ?worker.id, "worker created");
            HttpResponse::Created().json(worker)
        }
        Err(error) => error.error_response(),
    }
}
#[put("/api/workers/{worker_id}")]
pub async fn update_worker(
    db: web::Data<Database>,
    worker_id: web::Path<String>,
    payload: web::Json<WorkerRequest>,
) -> HttpResponse {
    let worker_id = match parse_id(&worker_id) {
        Ok(worker_id) => worker_id,
        Err(error) => return error.error_response(),
    };
    let worker: Worker = payload.into_inner().into_worker(Some(worker_id));

    match worker.update(&db, worker_id).await {
        Ok(worker) => HttpResponse::Ok().json(worker),
        Err(error) => error.error_response(),
    }
}
#[delete("/api/workers/{worker_id}")]
pub async fn delete_worker(db: web::Data<Database>, worker_id: web::Path<String>) -> HttpResponse {
    let worker_id = match parse_id(&worker_id) {
        Ok(worker_id) => worker_id,
        Err(error) => return error.error_response(),
    };

    match Worker::delete_by_id(&db, worker_id).await {
        Ok(count) => deleted(count),
        Err(error) => error.error_response(),
    }
}
#[delete("/api/workers")]
pub async fn delete_workers(db: web::Data<Database>, payload: web::Json<Vec<u64>>) -> HttpResponse {
    deleted(Worker::delete_many(&db, &payload).await)
}
