//! JSON API over the planner, mounted under `/api`.

mod error;
mod handlers;

use std::sync::Arc;

use anyhow::Result;
use axum::routing::{delete, get, patch, post};
use axum::Router;
use weekboard_core::planner::Planner;
use weekboard_core::repository::SqliteRepository;

pub type AppState = Arc<Planner<SqliteRepository>>;

pub fn router(planner: AppState) -> Router {
    Router::new()
        .route(
            "/api/categories",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route(
            "/api/categories/:id",
            get(handlers::get_category)
                .patch(handlers::update_category)
                .delete(handlers::delete_category),
        )
        .route("/api/categories/:id/weeks", get(handlers::list_weeks))
        .route("/api/categories/:id/weeks/:week_id/view", get(handlers::week_view))
        .route("/api/categories/:id/day-tags", get(handlers::list_day_tags))
        .route(
            "/api/categories/:id/day-notes",
            get(handlers::list_day_notes).post(handlers::upsert_day_note),
        )
        .route("/api/day-tags", post(handlers::upsert_day_tag))
        .route("/api/day-tags/:id", delete(handlers::delete_day_tag))
        .route("/api/weeks/generate", post(handlers::generate_weeks))
        .route("/api/weeks/:id/todos", get(handlers::week_todos))
        .route(
            "/api/weeks/:id/reflection",
            get(handlers::get_reflection).put(handlers::put_reflection),
        )
        .route("/api/todos", post(handlers::create_todo))
        .route("/api/todos/reorder", post(handlers::reorder_todos))
        .route(
            "/api/todos/:id",
            patch(handlers::update_todo).delete(handlers::delete_todo),
        )
        .with_state(planner)
}

pub async fn serve(planner: AppState, bind: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(planner)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use chrono::{Datelike, Local};
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use weekboard_core::db::establish_connection;
    use weekboard_core::planner::PlannerConfig;

    async fn setup() -> AppState {
        let pool = establish_connection(":memory:").await.unwrap();
        Arc::new(Planner::new(SqliteRepository::new(pool), PlannerConfig::default()))
    }

    async fn send(app: &AppState, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = router(app.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn create_category(app: &AppState, name: &str) -> Value {
        let (status, body) = send(app, "POST", "/api/categories", Some(json!({ "name": name }))).await;
        assert_eq!(status, StatusCode::CREATED);
        body["category"].clone()
    }

    async fn current_week(app: &AppState, category_id: &str) -> Value {
        let (status, body) = send(app, "GET", &format!("/api/categories/{}/weeks?limit=1", category_id), None).await;
        assert_eq!(status, StatusCode::OK);
        body["weeks"][0].clone()
    }

    #[tokio::test]
    async fn category_lifecycle() {
        let app = setup().await;
        let category = create_category(&app, "Groceries").await;
        let id = category["id"].as_str().unwrap();
        assert_eq!(category["color"], "#3B82F6");

        let (status, body) = send(&app, "GET", "/api/categories", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["categories"].as_array().unwrap().len(), 1);

        let (status, body) = send(
            &app,
            "PATCH",
            &format!("/api/categories/{}", id),
            Some(json!({ "color": "#10B981" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["category"]["color"], "#10B981");

        let (status, body) = send(&app, "DELETE", &format!("/api/categories/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": true }));

        let (status, body) = send(&app, "GET", &format!("/api/categories/{}", id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn validation_errors_are_bad_requests() {
        let app = setup().await;

        let (status, body) = send(&app, "POST", "/api/categories", Some(json!({ "name": "  " }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Name is required");

        let category = create_category(&app, "Work Daily").await;
        let id = category["id"].as_str().unwrap();

        let (status, body) = send(
            &app,
            "POST",
            "/api/day-tags",
            Some(json!({ "categoryId": id, "date": "2025-02-05", "tag": "Holiday" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("Weekend, Vacation, Sick"));

        let (status, body) = send(&app, "GET", &format!("/api/categories/{}/day-notes", id), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "startDate and endDate are required");

        let (status, _) = send(&app, "POST", "/api/weeks/generate", Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn default_categories_cannot_be_deleted() {
        let app = setup().await;
        app.seed_default_categories().await.unwrap();
        let categories = app.categories().await.unwrap();

        let (status, body) = send(&app, "DELETE", &format!("/api/categories/{}", categories[0].id), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Cannot delete default categories");
    }

    #[tokio::test]
    async fn weeks_are_paged_for_the_current_year() {
        let app = setup().await;
        let category = create_category(&app, "Personal Daily").await;
        let id = category["id"].as_str().unwrap();

        let (status, body) = send(&app, "GET", &format!("/api/categories/{}/weeks?limit=2", id), None).await;
        assert_eq!(status, StatusCode::OK);
        let year = Local::now().date_naive().iso_week().year();
        let weeks = body["weeks"].as_array().unwrap();
        assert!(weeks.len() <= 2);
        assert!(weeks.iter().all(|w| w["year"] == year));
        assert!(body["total"].as_i64().unwrap() >= weeks.len() as i64);
        assert!(body["hasMore"].is_boolean());

        let (status, body) = send(
            &app,
            "POST",
            "/api/weeks/generate",
            Some(json!({ "categoryId": id, "weeksAhead": 3 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["weeksCreated"], 3);
        assert_eq!(body["weeks"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn generation_bounds_the_requested_count() {
        let app = setup().await;
        let category = create_category(&app, "Personal Daily").await;
        let id = category["id"].as_str().unwrap();

        let (status, body) = send(
            &app,
            "POST",
            "/api/weeks/generate",
            Some(json!({ "categoryId": id, "weeksAhead": 20_000_000 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("at most"));

        let (status, body) = send(
            &app,
            "POST",
            "/api/weeks/generate",
            Some(json!({ "categoryId": id, "weeksAhead": 0 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["weeksCreated"], 0);
        assert!(body["weeks"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn todos_flow_through_week_endpoints() {
        let app = setup().await;
        let category = create_category(&app, "Personal Daily").await;
        let category_id = category["id"].as_str().unwrap().to_string();
        let week = current_week(&app, &category_id).await;
        let week_id = week["id"].as_str().unwrap().to_string();
        let start = week["startDate"].as_str().unwrap().to_string();

        let (status, body) = send(
            &app,
            "POST",
            "/api/todos",
            Some(json!({ "weekId": week_id, "content": "Water plants", "dueDate": start })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let todo_id = body["todo"]["id"].as_str().unwrap().to_string();

        let (status, body) = send(
            &app,
            "PATCH",
            &format!("/api/todos/{}", todo_id),
            Some(json!({ "completed": true })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["todo"]["completed"], true);
        assert!(body["todo"]["completedAt"].is_string());

        let (status, body) = send(&app, "GET", &format!("/api/weeks/{}/todos", week_id), None).await;
        assert_eq!(status, StatusCode::OK);
        let dates = body["dates"].as_array().unwrap();
        assert_eq!(dates.len(), 7);
        assert_eq!(dates[0]["todos"][0]["content"], "Water plants");

        let (status, body) = send(
            &app,
            "POST",
            "/api/todos/reorder",
            Some(json!({ "updates": [{ "id": todo_id, "order": 5 }] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);

        let (status, body) = send(
            &app,
            "GET",
            &format!("/api/categories/{}/weeks/{}/view", category_id, week_id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["stats"]["completed"], 1);
        assert_eq!(body["readOnly"], false);

        let (status, _) = send(&app, "DELETE", &format!("/api/todos/{}", todo_id), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, "DELETE", &format!("/api/todos/{}", todo_id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn day_metadata_and_reflection() {
        let app = setup().await;
        let category = create_category(&app, "Personal Daily").await;
        let id = category["id"].as_str().unwrap().to_string();
        let week = current_week(&app, &id).await;
        let week_id = week["id"].as_str().unwrap();

        let (status, body) = send(
            &app,
            "POST",
            "/api/day-tags",
            Some(json!({ "categoryId": id, "date": "2025-02-05", "tag": "Vacation" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let tag_id = body["dayTag"]["id"].as_str().unwrap().to_string();

        let (_, body) = send(
            &app,
            "GET",
            &format!("/api/categories/{}/day-tags?startDate=2025-02-01&endDate=2025-02-28", id),
            None,
        )
        .await;
        assert_eq!(body["dayTags"][0]["tag"], "Vacation");

        let (status, _) = send(&app, "DELETE", &format!("/api/day-tags/{}", tag_id), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(
            &app,
            "POST",
            &format!("/api/categories/{}/day-notes", id),
            Some(json!({ "date": "2025-02-05", "content": "Dentist at 10" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["dayNote"]["content"], "Dentist at 10");

        let (_, body) = send(
            &app,
            "GET",
            &format!("/api/categories/{}/day-notes?startDate=2025-02-03&endDate=2025-02-09", id),
            None,
        )
        .await;
        assert_eq!(body["dayNotes"].as_array().unwrap().len(), 1);

        let (status, body) = send(&app, "GET", &format!("/api/weeks/{}/reflection", week_id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["reflection"].is_null());

        let (status, body) = send(
            &app,
            "PUT",
            &format!("/api/weeks/{}/reflection", week_id),
            Some(json!({ "content": 42 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Content must be a string");

        let (status, body) = send(
            &app,
            "PUT",
            &format!("/api/weeks/{}/reflection", week_id),
            Some(json!({ "content": "Good week" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reflection"]["content"], "Good week");
    }

    #[tokio::test]
    async fn combined_categories_reject_generation() {
        let app = setup().await;
        let combined = create_category(&app, "Combined").await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/weeks/generate",
            Some(json!({ "categoryId": combined["id"] })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["error"].as_str().unwrap().contains("combined"));
    }
}
