use actix_web::{get, post, web, HttpResponse, ResponseError};
use chrono::{Local, NaiveDate};
use serde::Deserialize;

use crate::{
    database::Database,
    models::weather::{is_suitable, work_suggestion, WeatherProvider, WeatherReading},
};

#[derive(Deserialize)]
pub struct WeatherQueryParams {
    pub location: String,
    pub date: Option<NaiveDate>,
}
#[derive(Deserialize)]
pub struct LocationParams {
    pub location: String,
}

#[get("/api/weather")]
pub async fn get_weather(
    db: web::Data<Database>,
    weather: web::Data<WeatherProvider>,
    query: web::Query<WeatherQueryParams>,
) -> HttpResponse {
    let date = query.date.unwrap_or_else(|| Local::now().date_naive());

    match weather.lookup(&db, &query.location, date).await {
        Ok(info) => HttpResponse::Ok().json(info),
        Err(error) => error.error_response(),
    }
}
#[post("/api/weather/update")]
pub async fn update_weather(
    db: web::Data<Database>,
    weather: web::Data<WeatherProvider>,
    query: web::Query<LocationParams>,
) -> HttpResponse {
    match weather.refresh(&db, &query.location).await {
        Ok(info) => HttpResponse::Ok().json(info),
        Err(error) => error.error_response(),
    }
}
#[post("/api/weather/check")]
pub async fn check_weather(payload: web::Json<WeatherReading>) -> HttpResponse {
    HttpResponse::Ok().json(is_suitable(&payload))
}
#[post("/api/weather/suggestion")]
pub async fn get_work_suggestion(payload: web::Json<WeatherReading>) -> HttpResponse {
    HttpResponse::Ok().body(work_suggestion(&payload))
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test, App};
    use serde_json::{json, Value};

    use crate::routes::testing::TestState;

    #[actix_web::test]
    async fn lookup_is_cached_per_location_and_date() {
        let state = TestState::new();
        let app = test::init_service(App::new().configure(|cfg| state.install(cfg))).await;

        let uri = "/api/weather?location=K12%2B300&date=2025-04-27";
        let first: Value =
            test::call_and_read_body_json(&app, test::TestRequest::get().uri(uri).to_request())
                .await;
        let second: Value =
            test::call_and_read_body_json(&app, test::TestRequest::get().uri(uri).to_request())
                .await;
        assert_eq!(first, second);
        assert_eq!(first["location"], "K12+300");
        assert_eq!(state.db.weather.count(|_| true).await, 1);
    }

    #[actix_web::test]
    async fn update_uses_today() {
        let state = TestState::new();
        let app = test::init_service(App::new().configure(|cfg| state.install(cfg))).await;

        let req = test::TestRequest::post()
            .uri("/api/weather/update?location=K3")
            .to_request();
        let info: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(
            info["date"],
            chrono::Local::now().date_naive().format("%Y-%m-%d").to_string()
        );
    }

    #[actix_web::test]
    async fn check_and_suggestion_evaluate_the_reading() {
        let state = TestState::new();
        let app = test::init_service(App::new().configure(|cfg| state.install(cfg))).await;

        let req = test::TestRequest::post()
            .uri("/api/weather/check")
            .set_json(json!({ "temperature": 20.0, "rainfall": 6.0, "windSpeed": 0.0 }))
            .to_request();
        let suitable: bool = test::call_and_read_body_json(&app, req).await;
        assert!(!suitable);

        let req = test::TestRequest::post()
            .uri("/api/weather/suggestion")
            .set_json(json!({ "temperature": 20.0, "rainfall": 0.0, "windSpeed": 2.0 }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            test::read_body(res).await,
            "Weather is suitable for construction, proceed normally."
        );
    }

    #[actix_web::test]
    async fn location_is_required() {
        let state = TestState::new();
        let app = test::init_service(App::new().configure(|cfg| state.install(cfg))).await;

        let req = test::TestRequest::get().uri("/api/weather").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
