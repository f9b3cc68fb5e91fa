use actix_web::{delete, get, post, put, web, HttpResponse, ResponseError};

use crate::{
    database::Database,
    models::{
        page::PageQuery,
        project::{Project, ProjectQuery},
    },
};

use super::{deleted, parse_id};

#[get("/api/projects")]
pub async fn get_projects(
    db: web::Data<Database>,
    query: web::Query<ProjectQuery>,
    page: web::Query<PageQuery>,
) -> HttpResponse {
    HttpResponse::Ok().json(Project::find_many(&db, &query, &page).await)
}
#[get("/api/projects/{project_id}")]
pub async fn get_project(db: web::Data<Database>, project_id: web::Path<String>) -> HttpResponse {
    let project_id = match parse_id(&project_id) {
        Ok(project_id) => project_id,
        Err(error) => return error.error_response(),
    };

    match Project::find_by_id(&db, project_id).await {
        Some(project) => HttpResponse::Ok().json(project),
        None => HttpResponse::NotFound().body("PROJECT_NOT_FOUND"),
    }
}
#[post("/api/projects")]
pub async fn create_project(db: web::Data<Database>, payload: web::Json<Project>) -> HttpResponse {
    let mut project: Project = payload.into_inner();
    project.id = None;

    match project.save(&db).await {
        Ok(project) => HttpResponse::Created().json(project),
        Err(error) => error.error_response(),
    }
}
#[put("/api/projects/{project_id}")]
pub async fn update_project(
    db: web::Data<Database>,
    project_id: web::Path<String>,
    payload: web::Json<Project>,
) -> HttpResponse {
    let project_id = match parse_id(&project_id) {
        Ok(project_id) => project_id,
        Err(error) => return error.error_response(),
    };

    match payload.into_inner().update(&db, project_id).await {
        Ok(project) => HttpResponse::Ok().json(project),
        Err(error) => error.error_response(),
    }
}
#[delete("/api/projects/{project_id}")]
pub async fn delete_project(
    db: web::Data<Database>,
    project_id: web::Path<String>,
) -> HttpResponse {
    let project_id = match parse_id(&project_id) {
        Ok(project_id) => project_id,
        Err(error) => return error.error_response(),
    };

    match Project::delete_by_id(&db, project_id).await {
        Ok(count) => deleted(count),
        Err(error) => error.error_response(),
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test, App};
    use serde_json::{json, Value};

    use crate::routes::testing::TestState;

    #[actix_web::test]
    async fn project_lifecycle() {
        let state = TestState::new();
        let app = test::init_service(App::new().configure(|cfg| state.install(cfg))).await;

        let body = json!({
            "name": "G4 widening, north section",
            "location": "K10-K30",
            "startDate": "2025-01-01",
            "endDate": "2025-12-31",
            "status": "running",
            "progress": 20
        });
        let req = test::TestRequest::post()
            .uri("/api/projects")
            .set_json(&body)
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);

        let req = test::TestRequest::get()
            .uri("/api/projects?status=running&name=north")
            .to_request();
        let page: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(page["totalItems"], 1);

        let mut paused = body.clone();
        paused["status"] = json!("paused");
        let req = test::TestRequest::put()
            .uri("/api/projects/1")
            .set_json(paused)
            .to_request();
        let updated: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(updated["status"], "paused");

        let req = test::TestRequest::delete().uri("/api/projects/1").to_request();
        let res: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(res["deleted"], 1);

        let req = test::TestRequest::get().uri("/api/projects/1").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
