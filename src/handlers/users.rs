// handlers/users.rs - /api/users CRUD backed by the generic repository

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use mongodb::bson::Document;
use mongodb::Database;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::models::User;
use crate::database::{MongoRepository, Repository};
use crate::middleware::{ApiResponse, ApiResult};

const COLLECTION: &str = "users";

fn users(database: &Database) -> MongoRepository<User> {
    MongoRepository::new(database, COLLECTION)
}

#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub skip: Option<u64>,
    pub take: Option<i64>,
    pub name: Option<String>,
    pub email: Option<String>,
}

/// POST /api/users
pub async fn user_post(
    State(database): State<Database>,
    Json(payload): Json<CreateUser>,
) -> ApiResult<Value> {
    let user = User {
        id: None,
        name: payload.name,
        email: payload.email,
        created_at: Utc::now(),
    };

    let id = users(&database).create(&user).await?;
    Ok(ApiResponse::created(json!({ "id": id })))
}

/// GET /api/users?skip=&take=&name=&email=
pub async fn user_list(
    State(database): State<Database>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Value> {
    let mut filter = Document::new();
    if let Some(name) = query.name {
        filter.insert("name", name);
    }
    if let Some(email) = query.email {
        filter.insert("email", email);
    }

    let repo = users(&database);
    let total = repo.count(filter.clone()).await?;
    let records = repo.get(filter, query.skip, query.take).await?;

    Ok(ApiResponse::success(json!({
        "total": total,
        "users": records
    })))
}

/// GET /api/users/:id
pub async fn user_get(
    State(database): State<Database>,
    Path(id): Path<String>,
) -> ApiResult<User> {
    let user = users(&database).get_by_id(&id).await?;
    Ok(ApiResponse::success(user))
}

/// PUT /api/users/:id
pub async fn user_put(
    State(database): State<Database>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateUser>,
) -> ApiResult<Value> {
    let repo = users(&database);

    let mut user = repo.get_by_id(&id).await?;
    if let Some(name) = payload.name {
        user.name = name;
    }
    if let Some(email) = payload.email {
        user.email = email;
    }

    repo.update(&id, &user).await?;
    Ok(ApiResponse::success(json!({ "id": id })))
}

/// DELETE /api/users/:id
pub async fn user_delete(
    State(database): State<Database>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    users(&database).delete(&id).await?;
    Ok(ApiResponse::<()>::no_content())
}
