use crate::auth::auth::AuthUser;
use crate::model::leave_request::{LeaveRequest, LeaveType};
use actix_web::{HttpResponse, Responder, web};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::{MySqlPool, prelude::FromRow};
use strum_macros::AsRefStr;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CreateLeave {
    #[schema(example = "2026-09-01", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-09-03", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "SICK")]
    pub leave_type: LeaveType, // enum ensures Swagger dropdown
    #[schema(example = "Flu, doctor's note attached", nullable = true)]
    pub reason: Option<String>,
}

/// The only transitions an admin may apply. PENDING is the initial
/// state and fails deserialization here on purpose.
#[derive(Debug, PartialEq, Serialize, Deserialize, AsRefStr, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum LeaveDecision {
    Approved,
    Rejected,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateLeaveStatus {
    #[schema(example = "APPROVED")]
    pub status: LeaveDecision,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct LeaveFilter {
    #[schema(example = 7)]
    /// Filter by user ID
    pub user_id: Option<u64>,
    #[schema(example = "PENDING")]
    /// Filter by leave status
    pub status: Option<String>,
    #[schema(example = 1)]
    /// Pagination page number (start with 1)
    pub page: Option<u64>, // 1-based
    #[schema(example = 10)]
    /// Pagination per page number
    pub per_page: Option<u64>, // items per page
}

// Helper enum for typed SQLx binding
enum FilterValue<'a> {
    U64(u64),
    Str(&'a str),
}

#[derive(Serialize, Deserialize, FromRow, ToSchema)]
pub struct LeaveWithUser {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 7)]
    pub user_id: u64,
    #[schema(example = "Somchai Prasert")]
    pub user_name: String,
    #[schema(example = "ST-2026-014", nullable = true)]
    pub student_id: Option<String>,
    #[schema(example = "2026-09-01", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-09-03", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "SICK")]
    pub leave_type: String,
    #[schema(example = "Flu, doctor's note attached", nullable = true)]
    pub reason: Option<String>,
    #[schema(example = "PENDING")]
    pub status: String,
    #[schema(example = "2026-08-22T04:00:00Z", format = "date-time", value_type = String)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, ToSchema)]
pub struct LeaveListResponse {
    pub data: Vec<LeaveWithUser>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 1)]
    pub total: i64,
}

async fn fetch_leave(pool: &MySqlPool, id: u64) -> Result<Option<LeaveRequest>, sqlx::Error> {
    sqlx::query_as::<_, LeaveRequest>(
        r#"
        SELECT id, user_id, start_date, end_date, leave_type, reason, status, created_at
        FROM leave_requests
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/* =========================
Create leave request (student)
========================= */
/// Swagger doc for create_leave endpoint
#[utoipa::path(
    post,
    path = "/api/leaves",
    request_body(
        content = CreateLeave,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Leave request submitted, status starts as PENDING", body = LeaveRequest),
        (status = 400, description = "Bad request", body = Object, example = json!({
            "error": "start_date cannot be after end_date"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn create_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateLeave>,
) -> actix_web::Result<impl Responder> {
    auth.require_student()?;

    // 1️⃣ validate dates
    if payload.start_date > payload.end_date {
        return Ok(HttpResponse::BadRequest().json(json!({
            "error": "start_date cannot be after end_date"
        })));
    }

    // 2️⃣ insert request, status defaults to PENDING
    let result = sqlx::query(
        r#"
        INSERT INTO leave_requests (user_id, start_date, end_date, leave_type, reason)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(auth.user_id)
    .bind(payload.start_date)
    .bind(payload.end_date)
    .bind(payload.leave_type.as_ref())
    .bind(&payload.reason)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, user_id = auth.user_id, "Failed to create leave request");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let leave = fetch_leave(pool.get_ref(), result.last_insert_id())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch created leave request");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("Internal Server Error"))?;

    Ok(HttpResponse::Created().json(leave))
}

/* =========================
My leave history (student)
========================= */
/// Swagger doc for my_leaves endpoint
#[utoipa::path(
    get,
    path = "/api/leaves/my-history",
    responses(
        (status = 200, description = "Leave requests of the caller, newest first", body = Vec<LeaveRequest>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn my_leaves(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require_student()?;

    let leaves = sqlx::query_as::<_, LeaveRequest>(
        r#"
        SELECT id, user_id, start_date, end_date, leave_type, reason, status, created_at
        FROM leave_requests
        WHERE user_id = ?
        ORDER BY created_at DESC
        "#,
    )
    .bind(auth.user_id)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, user_id = auth.user_id, "Failed to fetch leave history");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(leaves))
}

/* =========================
List leave requests (admin)
========================= */
/// Swagger doc for list_leaves endpoint
#[utoipa::path(
    get,
    path = "/api/leaves",
    params(LeaveFilter),
    responses(
        (status = 200, description = "Paginated leave list", body = LeaveListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn list_leaves(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<LeaveFilter>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    // -------------------------
    // Pagination
    // -------------------------
    let per_page = query.per_page.unwrap_or(10).min(100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    // -------------------------
    // WHERE clause
    // -------------------------
    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(user_id) = query.user_id {
        where_sql.push_str(" AND lr.user_id = ?");
        args.push(FilterValue::U64(user_id));
    }

    if let Some(status) = query.status.as_deref() {
        where_sql.push_str(" AND lr.status = ?");
        args.push(FilterValue::Str(status));
    }

    // -------------------------
    // COUNT query
    // -------------------------
    let count_sql = format!("SELECT COUNT(*) FROM leave_requests lr{}", where_sql);

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::U64(v) => count_q.bind(*v),
            FilterValue::Str(s) => count_q.bind(*s),
        };
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to count leave requests");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    // -------------------------
    // DATA query
    // -------------------------
    let data_sql = format!(
        r#"
        SELECT lr.id, lr.user_id, u.name AS user_name, u.student_id,
               lr.start_date, lr.end_date, lr.leave_type, lr.reason, lr.status, lr.created_at
        FROM leave_requests lr
        JOIN users u ON u.id = lr.user_id
        {}
        ORDER BY lr.created_at DESC
        LIMIT ? OFFSET ?
        "#,
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, LeaveWithUser>(&data_sql);
    for arg in args {
        data_q = match arg {
            FilterValue::U64(v) => data_q.bind(v),
            FilterValue::Str(s) => data_q.bind(s),
        };
    }

    let leaves = data_q
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch leave list");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    // -------------------------
    // Response
    // -------------------------
    let response = LeaveListResponse {
        data: leaves,
        page: page as u32,
        per_page: per_page as u32,
        total,
    };

    Ok(HttpResponse::Ok().json(response))
}

/* =========================
Approve or reject (admin)
========================= */
/// Swagger doc for update_leave_status endpoint
#[utoipa::path(
    put,
    path = "/api/leaves/{id}/status",
    params(
        ("id" = u64, Path, description = "ID of the leave request to decide")
    ),
    request_body(
        content = UpdateLeaveStatus,
        description = "APPROVED or REJECTED",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Decided leave request", body = LeaveRequest),
        (status = 400, description = "Leave request not found or already processed", body = Object, example = json!({
            "error": "Leave request not found or already processed"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn update_leave_status(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<UpdateLeaveStatus>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let leave_id = path.into_inner();

    // The status guard makes the transition one-shot: a second decision
    // matches zero rows.
    let result = sqlx::query(
        r#"
        UPDATE leave_requests
        SET status = ?
        WHERE id = ?
        AND status = 'PENDING'
        "#,
    )
    .bind(payload.status.as_ref())
    .bind(leave_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, leave_id, "Leave decision failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(json!({
            "error": "Leave request not found or already processed"
        })));
    }

    let leave = fetch_leave(pool.get_ref(), leave_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, leave_id, "Failed to fetch decided leave request");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("Internal Server Error"))?;

    Ok(HttpResponse::Ok().json(leave))
}

/* =========================
Delete leave request (admin)
========================= */
/// Swagger doc for delete_leave endpoint
#[utoipa::path(
    delete,
    path = "/api/leaves/{id}",
    params(
        ("id" = u64, Path, description = "ID of the leave request to delete")
    ),
    responses(
        (status = 200, description = "Leave request deleted", body = Object, example = json!({
            "message": "Leave request deleted"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found", body = Object, example = json!({
            "error": "Leave request not found"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn delete_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let leave_id = path.into_inner();

    let result = sqlx::query("DELETE FROM leave_requests WHERE id = ?")
        .bind(leave_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, leave_id, "Failed to delete leave request");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "error": "Leave request not found"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Leave request deleted"
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_accepts_only_terminal_states() {
        assert_eq!(
            serde_json::from_str::<LeaveDecision>("\"APPROVED\"").unwrap(),
            LeaveDecision::Approved
        );
        assert_eq!(
            serde_json::from_str::<LeaveDecision>("\"REJECTED\"").unwrap(),
            LeaveDecision::Rejected
        );
        assert!(serde_json::from_str::<LeaveDecision>("\"PENDING\"").is_err());
        assert!(serde_json::from_str::<LeaveDecision>("\"approved\"").is_err());
    }

    #[test]
    fn decision_binds_as_screaming_snake() {
        assert_eq!(LeaveDecision::Approved.as_ref(), "APPROVED");
        assert_eq!(LeaveDecision::Rejected.as_ref(), "REJECTED");
    }
}
