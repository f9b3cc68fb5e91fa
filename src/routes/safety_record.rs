use actix_web::{delete, get, post, put, web, HttpResponse, ResponseError};
use tracing::warn;

use crate::{
    database::Database,
    models::{
        page::PageQuery,
        safety_record::{SafetyRecord, SafetyRecordQuery, SafetyRecordRequest, SeverityLevel},
    },
};

use super::{deleted, parse_id};

#[get("/safety/api/records")]
pub async fn get_safety_records(
    db: web::Data<Database>,
    query: web::Query<SafetyRecordQuery>,
    page: web::Query<PageQuery>,
) -> HttpResponse {
    HttpResponse::Ok().json(SafetyRecord::find_many(&db, &query, &page).await)
}
#[get("/safety/api/records/{record_id}")]
pub async fn get_safety_record(
    db: web::Data<Database>,
    record_id: web::Path<String>,
) -> HttpResponse {
    let record_id = match parse_id(&record_id) {
        Ok(record_id) => record_id,
        Err(error) => return error.error_response(),
    };

    match SafetyRecord::find_by_id(&db, record_id).await {
        Some(record) => HttpResponse::Ok().json(record),
        None => HttpResponse::NotFound().body("SAFETY_RECORD_NOT_FOUND"),
    }
}
#[post("/safety/api/records")]
pub async fn create_safety_record(
    db: web::Data<Database>,
    payload: web::Json<SafetyRecordRequest>,
) -> HttpResponse {
    let record: SafetyRecord = payload.into_inner().into_record(None);

    match record.save(&db).await {
        Ok(record) => {
            if record.severity_level >= SeverityLevel::High {
                warn!(
                    id = ?record.id,
                    severity = ?record.severity_level,
                    location = %record.location,
                    "serious safety event recorded"
                );
            }
            HttpResponse::Created().json(record)
        }
        Err(error) => error.error_response(),
    }
}
#[put("/safety/api/records/{record_id}")]
pub async fn update_safety_record(
    db: web::Data<Database>,
    record_id: web::Path<String>,
    payload: web::Json<SafetyRecordRequest>,
) -> HttpResponse {
    let record_id = match parse_id(&record_id) {
        Ok(record_id) => record_id,
        Err(error) => return error.error_response(),
    };
    let record: SafetyRecord = payload.into_inner().into_record(Some(record_id));

    match record.update(&db, record_id).await {
        Ok(record) => HttpResponse::Ok().json(record),
        Err(error) => error.error_response(),
    }
}
#[delete("/safety/api/records/{record_id}")]
pub async fn delete_safety_record(
    db: web::Data<Database>,
    record_id: web::Path<String>,
) -> HttpResponse {
    let record_id = match parse_id(&record_id) {
        Ok(record_id) => record_id,
        Err(error) => return error.error_response(),
    };

    match SafetyRecord::delete_by_id(&db, record_id).await {
        Ok(count) => deleted(count),
        Err(error) => error.error_response(),
    }
}
#[delete("/safety/api/records")]
pub async fn delete_safety_records(
    db: web::Data<Database>,
    payload: web::Json<Vec<u64>>,
) -> HttpResponse {
    deleted(SafetyRecord::delete_many(&db, &payload).await)
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test, App};
    use serde_json::{json, Value};

    use crate::routes::testing::TestState;

    fn record(severity: &str, at: &str) -> Value {
        json!({
            "eventType": "near_miss",
            "severityLevel": severity,
            "description": "excavator swung over a walkway",
            "location": "K12+300 north ramp",
            "occurrenceTime": at
        })
    }

    #[actix_web::test]
    async fn create_update_and_filter() {
        let state = TestState::new();
        let app = test::init_service(App::new().configure(|cfg| state.install(cfg))).await;

        for (severity, at) in [
            ("low", "2025-04-01T09:00:00"),
            ("high", "2025-04-03T14:15:00"),
        ] {
            let req = test::TestRequest::post()
                .uri("/safety/api/records")
                .set_json(record(severity, at))
                .to_request();
            let res = test::call_service(&app, req).await;
            assert_eq!(res.status(), StatusCode::CREATED);
        }

        let mut resolved = record("high", "2025-04-03T14:15:00");
        resolved["status"] = json!("resolved");
        resolved["measures"] = json!("walkway fenced off");
        let req = test::TestRequest::put()
            .uri("/safety/api/records/2")
            .set_json(resolved)
            .to_request();
        let updated: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(updated["status"], "resolved");

        let req = test::TestRequest::get()
            .uri("/safety/api/records?severityLevel=high&location=north")
            .to_request();
        let page: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(page["totalItems"], 1);
        assert_eq!(page["items"][0]["id"], 2);

        let req = test::TestRequest::delete()
            .uri("/safety/api/records")
            .set_json(json!([1, 2, 3]))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["deleted"], 2);
    }

    #[actix_web::test]
    async fn update_of_unknown_record_is_not_found() {
        let state = TestState::new();
        let app = test::init_service(App::new().configure(|cfg| state.install(cfg))).await;

        let req = test::TestRequest::put()
            .uri("/safety/api/records/5")
            .set_json(record("low", "2025-04-01T09:00:00"))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(test::read_body(res).await, "SAFETY_RECORD_NOT_FOUND");
    }
}
