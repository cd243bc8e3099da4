use crate::auth::auth::AuthUser;
use crate::auth::handlers::is_email_available;
use crate::auth::password::hash_password;
use crate::model::role::Role;
use crate::model::user::User;
use crate::utils::db_utils::{build_update_sql, execute_update};
use crate::utils::validate::is_valid_email;
use crate::utils::{email_cache, email_filter};
use actix_web::{HttpResponse, Responder, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, json};
use sqlx::{MySqlPool, prelude::FromRow};
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CreateUser {
    #[schema(example = "Somchai Prasert")]
    pub name: String,
    #[schema(example = "somchai@university.ac.th", format = "email")]
    pub email: String,
    #[schema(example = "s3cret-pass")]
    pub password: String,
    #[schema(example = "STUDENT")]
    pub role: Role,
    #[schema(example = "ST-2026-014", nullable = true)]
    pub student_id: Option<String>,
    #[schema(example = 2, nullable = true)]
    pub department_id: Option<u64>,
    #[schema(example = 1, nullable = true)]
    pub location_id: Option<u64>,
    #[schema(example = 3, nullable = true)]
    pub saka_id: Option<u64>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateUser {
    pub name: Option<String>,
    #[schema(format = "email")]
    pub email: Option<String>,
    pub password: Option<String>,
    #[schema(example = "STUDENT")]
    pub role: Option<Role>,
    pub student_id: Option<String>,
    pub department_id: Option<u64>,
    pub location_id: Option<u64>,
    pub saka_id: Option<u64>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateProfile {
    pub name: Option<String>,
    #[schema(format = "email")]
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct UserQuery {
    /// Pagination page number (start with 1)
    pub page: Option<u32>,
    /// Items per page, capped at 100
    pub per_page: Option<u32>,
    /// Filter by role
    pub role: Option<String>,
    /// Filter by department
    pub department_id: Option<u64>,
    /// Search by name or email
    pub search: Option<String>,
}

// Helper enum for typed SQLx binding
enum FilterValue {
    U64(u64),
    Str(String),
}

/// User row joined with its reference-table names.
#[derive(Serialize, Deserialize, FromRow, ToSchema)]
pub struct UserWithNames {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "Somchai Prasert")]
    pub name: String,
    #[schema(example = "somchai@university.ac.th")]
    pub email: String,
    #[schema(example = "STUDENT")]
    pub role: String,
    #[schema(example = "ST-2026-014", nullable = true)]
    pub student_id: Option<String>,
    #[schema(example = 2, nullable = true)]
    pub department_id: Option<u64>,
    #[schema(example = 1, nullable = true)]
    pub location_id: Option<u64>,
    #[schema(example = 3, nullable = true)]
    pub saka_id: Option<u64>,
    #[schema(example = "Computer Engineering", nullable = true)]
    pub department_name: Option<String>,
    #[schema(example = "Bangkok HQ", nullable = true)]
    pub location_name: Option<String>,
    #[schema(example = "Saka Nakhon", nullable = true)]
    pub saka_name: Option<String>,
    #[schema(example = "2026-06-01T02:15:00Z", format = "date-time", value_type = String)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, ToSchema)]
pub struct UserListResponse {
    pub data: Vec<UserWithNames>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 42)]
    pub total: i64,
}

const USER_COLUMNS: &str =
    "id, name, email, role, student_id, department_id, location_id, saka_id, created_at";

async fn fetch_user(pool: &MySqlPool, id: u64) -> Result<Option<User>, sqlx::Error> {
    let sql = format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS);
    sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
}

async fn fetch_user_with_names(
    pool: &MySqlPool,
    id: u64,
) -> Result<Option<UserWithNames>, sqlx::Error> {
    sqlx::query_as::<_, UserWithNames>(
        r#"
        SELECT u.id, u.name, u.email, u.role, u.student_id,
               u.department_id, u.location_id, u.saka_id,
               d.name AS department_name, l.name AS location_name, s.saka_name,
               u.created_at
        FROM users u
        LEFT JOIN departments d ON d.id = u.department_id
        LEFT JOIN locations l ON l.id = u.location_id
        LEFT JOIN sakas s ON s.id = u.saka_id
        WHERE u.id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/* =========================
Create user (admin)
========================= */
/// Swagger doc for create_user endpoint
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Validation failed", body = Object, example = json!({
            "error": "Email already exists"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Users"
)]
pub async fn create_user(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateUser>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let name = payload.name.trim();
    let email = payload.email.trim();

    if name.is_empty() || email.is_empty() || payload.password.is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "error": "Missing required fields: name, email, password, role"
        })));
    }

    if !is_valid_email(email) {
        return Ok(HttpResponse::BadRequest().json(json!({
            "error": "Invalid email format"
        })));
    }

    if !is_email_available(email, pool.get_ref()).await {
        return Ok(HttpResponse::BadRequest().json(json!({
            "error": "Email already exists"
        })));
    }

    let hashed = hash_password(&payload.password);

    let result = sqlx::query(
        r#"
        INSERT INTO users (name, email, password, role, student_id, department_id, location_id, saka_id)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(name)
    .bind(email)
    .bind(hashed)
    .bind(payload.role.as_ref())
    .bind(&payload.student_id)
    .bind(payload.department_id)
    .bind(payload.location_id)
    .bind(payload.saka_id)
    .execute(pool.get_ref())
    .await;

    let user_id = match result {
        Ok(done) => done.last_insert_id(),
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return Ok(HttpResponse::BadRequest().json(json!({
                        "error": "Email already exists"
                    })));
                }
                if db_err.is_foreign_key_violation() {
                    return Ok(HttpResponse::BadRequest().json(json!({
                        "error": "Invalid department, location or saka reference"
                    })));
                }
            }

            tracing::error!(error = %e, "Failed to create user");
            return Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ));
        }
    };

    email_filter::insert(email);
    email_cache::mark_taken(email).await;

    let user = fetch_user(pool.get_ref(), user_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, user_id, "Failed to fetch created user");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("Internal Server Error"))?;

    Ok(HttpResponse::Created().json(user))
}

/* =========================
List users (admin)
========================= */
/// Swagger doc for list_users endpoint
#[utoipa::path(
    get,
    path = "/api/users",
    params(UserQuery),
    responses(
        (status = 200, description = "Paginated user list with reference names", body = UserListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Users"
)]
pub async fn list_users(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<UserQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    // ---------- build WHERE clause dynamically ----------
    let mut conditions = Vec::new();
    let mut bindings: Vec<FilterValue> = Vec::new();

    if let Some(role) = &query.role {
        conditions.push("u.role = ?");
        bindings.push(FilterValue::Str(role.clone()));
    }

    if let Some(department_id) = query.department_id {
        conditions.push("u.department_id = ?");
        bindings.push(FilterValue::U64(department_id));
    }

    if let Some(search) = &query.search {
        conditions.push("(u.name LIKE ? OR u.email LIKE ?)");
        let like = format!("%{}%", search);
        bindings.push(FilterValue::Str(like.clone()));
        bindings.push(FilterValue::Str(like));
    }

    let where_clause = if conditions.is_empty() {
        "".to_string()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    // ---------- total count ----------
    let count_sql = format!("SELECT COUNT(*) FROM users u {}", where_clause);

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    for b in &bindings {
        count_query = match b {
            FilterValue::U64(v) => count_query.bind(*v),
            FilterValue::Str(s) => count_query.bind(s.as_str()),
        };
    }

    let total = count_query.fetch_one(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, sql = %count_sql, "Failed to count users");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    // ---------- data query ----------
    let data_sql = format!(
        r#"
        SELECT u.id, u.name, u.email, u.role, u.student_id,
               u.department_id, u.location_id, u.saka_id,
               d.name AS department_name, l.name AS location_name, s.saka_name,
               u.created_at
        FROM users u
        LEFT JOIN departments d ON d.id = u.department_id
        LEFT JOIN locations l ON l.id = u.location_id
        LEFT JOIN sakas s ON s.id = u.saka_id
        {}
        ORDER BY u.id DESC
        LIMIT ? OFFSET ?
        "#,
        where_clause
    );

    let mut data_query = sqlx::query_as::<_, UserWithNames>(&data_sql);
    for b in &bindings {
        data_query = match b {
            FilterValue::U64(v) => data_query.bind(*v),
            FilterValue::Str(s) => data_query.bind(s.as_str()),
        };
    }

    let users = data_query
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, sql = %data_sql, "Failed to fetch users");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(UserListResponse {
        data: users,
        page,
        per_page,
        total,
    }))
}

/* =========================
Get user by ID (admin)
========================= */
/// Swagger doc for get_user endpoint
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(
        ("id" = u64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User found", body = UserWithNames),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found", body = Object, example = json!({
            "error": "User not found"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Users"
)]
pub async fn get_user(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let user_id = path.into_inner();

    let user = fetch_user_with_names(pool.get_ref(), user_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, user_id, "Failed to fetch user");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    match user {
        Some(u) => Ok(HttpResponse::Ok().json(u)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "error": "User not found"
        }))),
    }
}

// Shared by the admin update and the self-service profile update.
async fn apply_user_update(
    pool: &MySqlPool,
    user_id: u64,
    fields: Map<String, serde_json::Value>,
    new_email: Option<&str>,
) -> actix_web::Result<HttpResponse> {
    // Grab the current email up front; it doubles as the existence check.
    let old_email =
        sqlx::query_scalar::<_, String>("SELECT email FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, user_id, "Failed to fetch user for update");
                actix_web::error::ErrorInternalServerError("Internal Server Error")
            })?;

    let old_email = match old_email {
        Some(e) => e,
        None => {
            return Ok(HttpResponse::NotFound().json(json!({
                "error": "User not found"
            })));
        }
    };

    let update = build_update_sql("users", &fields, "id", user_id)?;

    if let Err(e) = execute_update(pool, update).await {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                return Ok(HttpResponse::BadRequest().json(json!({
                    "error": "Email already exists"
                })));
            }
            if db_err.is_foreign_key_violation() {
                return Ok(HttpResponse::BadRequest().json(json!({
                    "error": "Invalid department, location or saka reference"
                })));
            }
        }

        tracing::error!(error = %e, user_id, "Failed to update user");
        return Err(actix_web::error::ErrorInternalServerError(
            "Internal Server Error",
        ));
    }

    // Keep the availability caches in sync with an address change.
    if let Some(new_email) = new_email {
        if !new_email.eq_ignore_ascii_case(&old_email) {
            email_filter::remove(&old_email);
            email_cache::mark_free(&old_email).await;
            email_filter::insert(new_email);
            email_cache::mark_taken(new_email).await;
        }
    }

    let user = fetch_user(pool, user_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, user_id, "Failed to fetch updated user");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("Internal Server Error"))?;

    Ok(HttpResponse::Ok().json(user))
}

/* =========================
Update user (admin)
========================= */
/// Swagger doc for update_user endpoint
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(
        ("id" = u64, Path, description = "User ID")
    ),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "Updated user", body = User),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found", body = Object, example = json!({
            "error": "User not found"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Users"
)]
pub async fn update_user(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<UpdateUser>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let user_id = path.into_inner();

    if let Some(email) = payload.email.as_deref() {
        if !is_valid_email(email.trim()) {
            return Ok(HttpResponse::BadRequest().json(json!({
                "error": "Invalid email format"
            })));
        }
    }

    let mut fields = Map::new();
    if let Some(name) = &payload.name {
        fields.insert("name".into(), json!(name.trim()));
    }
    if let Some(email) = &payload.email {
        fields.insert("email".into(), json!(email.trim()));
    }
    if let Some(password) = &payload.password {
        fields.insert("password".into(), json!(hash_password(password)));
    }
    if let Some(role) = payload.role {
        fields.insert("role".into(), json!(role.as_ref()));
    }
    if let Some(student_id) = &payload.student_id {
        fields.insert("student_id".into(), json!(student_id));
    }
    if let Some(department_id) = payload.department_id {
        fields.insert("department_id".into(), json!(department_id));
    }
    if let Some(location_id) = payload.location_id {
        fields.insert("location_id".into(), json!(location_id));
    }
    if let Some(saka_id) = payload.saka_id {
        fields.insert("saka_id".into(), json!(saka_id));
    }

    let new_email = payload.email.as_deref().map(str::trim);
    apply_user_update(pool.get_ref(), user_id, fields, new_email).await
}

/* =========================
Delete user (admin)
========================= */
/// Swagger doc for delete_user endpoint
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(
        ("id" = u64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User deleted", body = Object, example = json!({
            "message": "User deleted"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found", body = Object, example = json!({
            "error": "User not found"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Users"
)]
pub async fn delete_user(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let user_id = path.into_inner();

    // Attendance and leave rows go with the user (ON DELETE CASCADE).
    let email =
        sqlx::query_scalar::<_, String>("SELECT email FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(pool.get_ref())
            .await
            .map_err(|e| {
                tracing::error!(error = %e, user_id, "Failed to fetch user for delete");
                actix_web::error::ErrorInternalServerError("Internal Server Error")
            })?;

    let email = match email {
        Some(e) => e,
        None => {
            return Ok(HttpResponse::NotFound().json(json!({
                "error": "User not found"
            })));
        }
    };

    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(user_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, user_id, "Failed to delete user");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "error": "User not found"
        })));
    }

    email_filter::remove(&email);
    email_cache::mark_free(&email).await;

    Ok(HttpResponse::Ok().json(json!({
        "message": "User deleted"
    })))
}

/* =========================
My profile (any role)
========================= */
/// Swagger doc for get_profile endpoint
#[utoipa::path(
    get,
    path = "/api/profile",
    responses(
        (status = 200, description = "Caller's profile with reference names", body = UserWithNames),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Users"
)]
pub async fn get_profile(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let user = fetch_user_with_names(pool.get_ref(), auth.user_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, user_id = auth.user_id, "Failed to fetch profile");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    match user {
        Some(u) => Ok(HttpResponse::Ok().json(u)),
        // Valid token for a row that has since been deleted.
        None => Ok(HttpResponse::NotFound().json(json!({
            "error": "User not found"
        }))),
    }
}

/* =========================
Update my profile (any role)
========================= */
/// Swagger doc for update_profile endpoint
#[utoipa::path(
    put,
    path = "/api/profile",
    request_body = UpdateProfile,
    responses(
        (status = 200, description = "Updated user", body = User),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Users"
)]
pub async fn update_profile(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<UpdateProfile>,
) -> actix_web::Result<impl Responder> {
    if let Some(email) = payload.email.as_deref() {
        if !is_valid_email(email.trim()) {
            return Ok(HttpResponse::BadRequest().json(json!({
                "error": "Invalid email format"
            })));
        }
    }

    let mut fields = Map::new();
    if let Some(name) = &payload.name {
        fields.insert("name".into(), json!(name.trim()));
    }
    if let Some(email) = &payload.email {
        fields.insert("email".into(), json!(email.trim()));
    }
    if let Some(password) = &payload.password {
        fields.insert("password".into(), json!(hash_password(password)));
    }

    let new_email = payload.email.as_deref().map(str::trim);
    apply_user_update(pool.get_ref(), auth.user_id, fields, new_email).await
}
