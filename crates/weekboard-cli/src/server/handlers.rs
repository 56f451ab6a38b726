use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{Datelike, Local};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;
use weekboard_core::dates::parse_api_date;
use weekboard_core::models::{
    DayTagKind, NewCategoryData, NewTodoData, ReorderUpdate, UpdateCategoryData, UpdateTodoData, WeekQuery,
};

use super::error::ApiError;
use super::AppState;

type ApiResult = Result<Json<Value>, ApiError>;
type Created = Result<(StatusCode, Json<Value>), ApiError>;

fn success() -> ApiResult {
    Ok(Json(json!({ "success": true })))
}

// ----------------------------------------------------------------------------
// Categories
// ----------------------------------------------------------------------------

pub async fn list_categories(State(planner): State<AppState>) -> ApiResult {
    let categories = planner.categories().await?;
    Ok(Json(json!({ "categories": categories })))
}

pub async fn create_category(
    State(planner): State<AppState>,
    payload: Result<Json<NewCategoryData>, JsonRejection>,
) -> Created {
    let Json(data) = payload?;
    let category = planner.create_category(data).await?;
    Ok((StatusCode::CREATED, Json(json!({ "category": category }))))
}

pub async fn get_category(State(planner): State<AppState>, Path(id): Path<Uuid>) -> ApiResult {
    let category = planner.category(id).await?;
    Ok(Json(json!({ "category": category })))
}

pub async fn update_category(
    State(planner): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<UpdateCategoryData>, JsonRejection>,
) -> ApiResult {
    let Json(data) = payload?;
    let category = planner.update_category(id, data).await?;
    Ok(Json(json!({ "category": category })))
}

pub async fn delete_category(State(planner): State<AppState>, Path(id): Path<Uuid>) -> ApiResult {
    planner.delete_category(id).await?;
    success()
}

#[derive(Debug, Deserialize)]
pub struct WeeksParams {
    limit: Option<i64>,
    offset: Option<i64>,
    year: Option<i32>,
}

pub async fn list_weeks(
    State(planner): State<AppState>,
    Path(id): Path<Uuid>,
    params: Result<Query<WeeksParams>, QueryRejection>,
) -> ApiResult {
    let Query(params) = params?;
    let defaults = WeekQuery::default();
    let query = WeekQuery {
        year: Some(params.year.unwrap_or_else(|| Local::now().date_naive().iso_week().year())),
        limit: params.limit.unwrap_or(defaults.limit),
        offset: params.offset.unwrap_or(defaults.offset),
    };

    let page = planner.weeks_page(id, &query).await?;
    Ok(Json(json!(page)))
}

pub async fn week_view(State(planner): State<AppState>, Path((id, week_id)): Path<(Uuid, Uuid)>) -> ApiResult {
    let view = planner.week_view(id, week_id).await?;
    Ok(Json(json!(view)))
}

// ----------------------------------------------------------------------------
// Day tags and notes
// ----------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeParams {
    start_date: Option<String>,
    end_date: Option<String>,
}

pub async fn list_day_tags(
    State(planner): State<AppState>,
    Path(id): Path<Uuid>,
    params: Result<Query<RangeParams>, QueryRejection>,
) -> ApiResult {
    let Query(params) = params?;
    let start = params.start_date.as_deref().map(parse_api_date).transpose()?;
    let end = params.end_date.as_deref().map(parse_api_date).transpose()?;

    let day_tags = planner.day_tags(id, start, end).await?;
    Ok(Json(json!({ "dayTags": day_tags })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayTagBody {
    category_id: Option<Uuid>,
    date: Option<String>,
    tag: Option<String>,
}

pub async fn upsert_day_tag(State(planner): State<AppState>, payload: Result<Json<DayTagBody>, JsonRejection>) -> Created {
    let Json(body) = payload?;
    let (Some(category_id), Some(date), Some(tag)) = (body.category_id, body.date, body.tag) else {
        return Err(ApiError::bad_request("Missing required fields: categoryId, date, tag"));
    };
    let tag: DayTagKind = tag.parse().map_err(|e| ApiError::bad_request(format!("{}", e)))?;
    let date = parse_api_date(&date)?;

    let day_tag = planner.set_day_tag(category_id, date, tag).await?;
    Ok((StatusCode::CREATED, Json(json!({ "dayTag": day_tag }))))
}

pub async fn delete_day_tag(State(planner): State<AppState>, Path(id): Path<Uuid>) -> ApiResult {
    planner.delete_day_tag(id).await?;
    success()
}

pub async fn list_day_notes(
    State(planner): State<AppState>,
    Path(id): Path<Uuid>,
    params: Result<Query<RangeParams>, QueryRejection>,
) -> ApiResult {
    let Query(params) = params?;
    let (Some(start), Some(end)) = (params.start_date, params.end_date) else {
        return Err(ApiError::bad_request("startDate and endDate are required"));
    };

    let day_notes = planner
        .day_notes(id, parse_api_date(&start)?, parse_api_date(&end)?)
        .await?;
    Ok(Json(json!({ "dayNotes": day_notes })))
}

#[derive(Debug, Deserialize)]
pub struct DayNoteBody {
    date: Option<String>,
    content: Option<String>,
}

pub async fn upsert_day_note(
    State(planner): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<DayNoteBody>, JsonRejection>,
) -> Created {
    let Json(body) = payload?;
    let (Some(date), Some(content)) = (body.date, body.content) else {
        return Err(ApiError::bad_request("date and content are required"));
    };

    let day_note = planner.set_day_note(id, parse_api_date(&date)?, content).await?;
    Ok((StatusCode::CREATED, Json(json!({ "dayNote": day_note }))))
}

// ----------------------------------------------------------------------------
// Weeks
// ----------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateBody {
    category_id: Option<Uuid>,
    weeks_ahead: Option<i64>,
}

pub async fn generate_weeks(
    State(planner): State<AppState>,
    payload: Result<Json<GenerateBody>, JsonRejection>,
) -> ApiResult {
    let Json(body) = payload?;
    let Some(category_id) = body.category_id else {
        return Err(ApiError::bad_request("categoryId is required"));
    };

    let generated = planner.generate_weeks(category_id, body.weeks_ahead).await?;
    Ok(Json(json!(generated)))
}

pub async fn week_todos(State(planner): State<AppState>, Path(id): Path<Uuid>) -> ApiResult {
    planner.week(id).await?;
    let dates = planner.week_todos(id).await?;
    Ok(Json(json!({ "dates": dates })))
}

pub async fn get_reflection(State(planner): State<AppState>, Path(id): Path<Uuid>) -> ApiResult {
    let reflection = planner.reflection(id).await?;
    Ok(Json(json!({ "reflection": reflection })))
}

pub async fn put_reflection(
    State(planner): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult {
    let Json(body) = payload?;
    let Some(content) = body.get("content").and_then(Value::as_str) else {
        return Err(ApiError::bad_request("Content must be a string"));
    };

    let reflection = planner.set_reflection(id, content.to_string()).await?;
    Ok(Json(json!({ "reflection": reflection })))
}

// ----------------------------------------------------------------------------
// Todos
// ----------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTodoBody {
    week_id: Option<Uuid>,
    content: Option<String>,
    due_date: Option<String>,
    parent_id: Option<Uuid>,
}

pub async fn create_todo(State(planner): State<AppState>, payload: Result<Json<NewTodoBody>, JsonRejection>) -> Created {
    let Json(body) = payload?;
    let (Some(week_id), Some(content), Some(due_date)) = (body.week_id, body.content, body.due_date) else {
        return Err(ApiError::bad_request("weekId, content and dueDate are required"));
    };

    let todo = planner
        .add_todo(NewTodoData {
            week_id,
            content,
            due_date: parse_api_date(&due_date)?,
            parent_id: body.parent_id,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(json!({ "todo": todo }))))
}

pub async fn update_todo(
    State(planner): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<UpdateTodoData>, JsonRejection>,
) -> ApiResult {
    let Json(data) = payload?;
    let todo = planner.update_todo(id, data).await?;
    Ok(Json(json!({ "todo": todo })))
}

pub async fn delete_todo(State(planner): State<AppState>, Path(id): Path<Uuid>) -> ApiResult {
    planner.delete_todo(id).await?;
    success()
}

#[derive(Debug, Deserialize)]
pub struct ReorderBody {
    updates: Option<Vec<ReorderUpdate>>,
}

pub async fn reorder_todos(State(planner): State<AppState>, payload: Result<Json<ReorderBody>, JsonRejection>) -> ApiResult {
    let Json(body) = payload?;
    let Some(updates) = body.updates else {
        return Err(ApiError::bad_request("Missing or invalid updates array"));
    };

    planner.reorder_todos(&updates).await?;
    success()
}
