use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::model::attendance::{Attendance, AttendanceStatus};
use crate::utils::day_key;
use crate::utils::db_utils::{build_update_sql, execute_update};
use crate::utils::uploads;
use actix_web::{HttpResponse, Responder, web};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, json};
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CheckInReq {
    /// Base64-encoded snapshot, optionally carrying a data-URI prefix.
    #[schema(example = "data:image/jpeg;base64,/9j/4AAQ...", nullable = true)]
    pub photo: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateAbsence {
    #[schema(example = 7)]
    pub user_id: u64,
    #[schema(example = "2026-08-22", format = "date", value_type = String)]
    pub date: NaiveDate,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateAttendance {
    #[schema(example = "2026-08-22T01:42:00", format = "date-time", value_type = String)]
    pub check_in: Option<NaiveDateTime>,
    #[schema(example = "2026-08-22T10:05:00", format = "date-time", value_type = String)]
    pub check_out: Option<NaiveDateTime>,
    #[schema(example = "PRESENT")]
    pub status: Option<AttendanceStatus>,
    #[schema(example = false)]
    pub is_late: Option<bool>,
}

#[derive(Deserialize, IntoParams)]
pub struct MonthlyReportQuery {
    /// Month number, 1-12
    pub month: Option<u32>,
    /// Four-digit year
    pub year: Option<i32>,
}

#[derive(serde::Serialize, sqlx::FromRow, ToSchema)]
pub struct AttendanceWithStudent {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 7)]
    pub user_id: u64,
    #[schema(example = "Somchai Prasert")]
    pub user_name: String,
    #[schema(example = "ST-2026-014", nullable = true)]
    pub student_id: Option<String>,
    #[schema(example = "2026-08-22", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "2026-08-22T01:42:00Z", format = "date-time", value_type = String)]
    pub check_in: Option<DateTime<Utc>>,
    #[schema(example = "2026-08-22T10:05:00Z", format = "date-time", value_type = String)]
    pub check_out: Option<DateTime<Utc>>,
    #[schema(example = "PRESENT")]
    pub status: String,
    #[schema(example = false)]
    pub is_late: bool,
    #[schema(example = "/uploads/checkin_7_1b9d6bcd.jpg", nullable = true)]
    pub check_in_photo: Option<String>,
}

async fn fetch_attendance(pool: &MySqlPool, id: u64) -> Result<Option<Attendance>, sqlx::Error> {
    sqlx::query_as::<_, Attendance>(
        r#"
        SELECT id, user_id, date, check_in, check_out, status, is_late, check_in_photo, created_at
        FROM attendance
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/* =========================
Check-in (student)
========================= */
/// Swagger doc for check_in endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/check-in",
    request_body(
        content = CheckInReq,
        description = "Optional check-in snapshot",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Checked in successfully", body = Attendance),
        (status = 400, description = "Already checked in today", body = Object, example = json!({
            "error": "Already checked in today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_in(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    payload: Option<web::Json<CheckInReq>>,
) -> actix_web::Result<impl Responder> {
    auth.require_student()?;

    let now = Utc::now();
    let today = day_key::attendance_day(now);

    // 1️⃣ fast duplicate check; the unique key below still closes the race
    let existing = sqlx::query_scalar::<_, u64>(
        "SELECT id FROM attendance WHERE user_id = ? AND date = ?",
    )
    .bind(auth.user_id)
    .bind(today)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, user_id = auth.user_id, "Check-in lookup failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if existing.is_some() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "error": "Already checked in today"
        })));
    }

    // 2️⃣ store the snapshot, if any
    let photo = payload
        .and_then(|p| p.into_inner().photo)
        .filter(|p| !p.is_empty());

    let photo_path = match photo {
        Some(data) => {
            let bytes = match uploads::decode_base64_image(&data) {
                Ok(b) => b,
                Err(_) => {
                    return Ok(HttpResponse::BadRequest().json(json!({
                        "error": "Invalid photo payload"
                    })));
                }
            };
            let file_name = uploads::photo_file_name(auth.user_id, &data);
            let dir = config.upload_dir.clone();
            let stored = web::block(move || uploads::write_photo(&dir, &file_name, &bytes))
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, "Photo write task failed");
                    actix_web::error::ErrorInternalServerError("Internal Server Error")
                })?
                .map_err(|e| {
                    tracing::error!(error = %e, "Failed to store check-in photo");
                    actix_web::error::ErrorInternalServerError("Internal Server Error")
                })?;
            Some(stored)
        }
        None => None,
    };

    // 3️⃣ insert the day's record
    let result = sqlx::query(
        r#"
        INSERT INTO attendance (user_id, date, check_in, status, is_late, check_in_photo)
        VALUES (?, ?, ?, 'PRESENT', ?, ?)
        "#,
    )
    .bind(auth.user_id)
    .bind(today)
    .bind(now)
    .bind(day_key::is_late(now))
    .bind(&photo_path)
    .execute(pool.get_ref())
    .await;

    let record_id = match result {
        Ok(done) => done.last_insert_id(),
        Err(e) => {
            // Concurrent duplicate check-in for the same day
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return Ok(HttpResponse::BadRequest().json(json!({
                        "error": "Already checked in today"
                    })));
                }
            }

            tracing::error!(error = %e, user_id = auth.user_id, "Check-in failed");
            return Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ));
        }
    };

    let record = fetch_attendance(pool.get_ref(), record_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, record_id, "Failed to fetch check-in record");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("Internal Server Error"))?;

    Ok(HttpResponse::Ok().json(record))
}

/* =========================
Check-out (student)
========================= */
/// Swagger doc for check_out endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/check-out",
    responses(
        (status = 200, description = "Checked out successfully", body = Attendance),
        (status = 400, description = "No check-in found or already checked out", body = Object, example = json!({
            "error": "No check-in record found for today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_out(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require_student()?;

    let now = Utc::now();
    let today = day_key::attendance_day(now);

    let row = sqlx::query_as::<_, (u64, Option<DateTime<Utc>>, Option<DateTime<Utc>>)>(
        "SELECT id, check_in, check_out FROM attendance WHERE user_id = ? AND date = ?",
    )
    .bind(auth.user_id)
    .bind(today)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, user_id = auth.user_id, "Check-out lookup failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    // Absence rows have no check_in and cannot be checked out of.
    let (record_id, check_in, check_out) = match row {
        Some(r) => r,
        None => {
            return Ok(HttpResponse::BadRequest().json(json!({
                "error": "No check-in record found for today"
            })));
        }
    };

    if check_in.is_none() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "error": "No check-in record found for today"
        })));
    }

    if check_out.is_some() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "error": "Already checked out"
        })));
    }

    sqlx::query("UPDATE attendance SET check_out = ? WHERE id = ?")
        .bind(now)
        .bind(record_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, record_id, "Check-out failed");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let record = fetch_attendance(pool.get_ref(), record_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, record_id, "Failed to fetch check-out record");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("Internal Server Error"))?;

    Ok(HttpResponse::Ok().json(record))
}

/* =========================
My attendance history (student)
========================= */
/// Swagger doc for my_history endpoint
#[utoipa::path(
    get,
    path = "/api/attendance/my-history",
    responses(
        (status = 200, description = "Attendance records for the caller, newest first", body = Vec<Attendance>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn my_history(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require_student()?;

    let records = sqlx::query_as::<_, Attendance>(
        r#"
        SELECT id, user_id, date, check_in, check_out, status, is_late, check_in_photo, created_at
        FROM attendance
        WHERE user_id = ?
        ORDER BY date DESC
        "#,
    )
    .bind(auth.user_id)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, user_id = auth.user_id, "Failed to fetch attendance history");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(records))
}

/* =========================
Record absence (admin)
========================= */
/// Swagger doc for record_absence endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/absent",
    request_body(
        content = CreateAbsence,
        description = "User and day to mark absent",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Absence recorded", body = Attendance),
        (status = 400, description = "Record already exists", body = Object, example = json!({
            "error": "Record already exists"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn record_absence(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateAbsence>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let existing = sqlx::query_scalar::<_, u64>(
        "SELECT id FROM attendance WHERE user_id = ? AND date = ?",
    )
    .bind(payload.user_id)
    .bind(payload.date)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, user_id = payload.user_id, "Absence lookup failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if existing.is_some() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "error": "Record already exists"
        })));
    }

    let result = sqlx::query(
        r#"INSERT INTO attendance (user_id, date, status) VALUES (?, ?, 'ABSENT')"#,
    )
    .bind(payload.user_id)
    .bind(payload.date)
    .execute(pool.get_ref())
    .await;

    let record_id = match result {
        Ok(done) => done.last_insert_id(),
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return Ok(HttpResponse::BadRequest().json(json!({
                        "error": "Record already exists"
                    })));
                }
                if db_err.is_foreign_key_violation() {
                    return Ok(HttpResponse::BadRequest().json(json!({
                        "error": "User not found"
                    })));
                }
            }

            tracing::error!(error = %e, user_id = payload.user_id, "Failed to record absence");
            return Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ));
        }
    };

    let record = fetch_attendance(pool.get_ref(), record_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, record_id, "Failed to fetch absence record");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("Internal Server Error"))?;

    Ok(HttpResponse::Ok().json(record))
}

/* =========================
Update attendance record (admin)
========================= */
/// Swagger doc for update_attendance endpoint
#[utoipa::path(
    put,
    path = "/api/attendance/{id}",
    params(
        ("id" = u64, Path, description = "ID of the attendance record to update")
    ),
    request_body(
        content = UpdateAttendance,
        description = "Fields to update; omitted fields are left unchanged",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Updated attendance record", body = Attendance),
        (status = 400, description = "No fields provided for update"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Attendance record not found", body = Object, example = json!({
            "error": "Attendance record not found"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn update_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<UpdateAttendance>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let id = path.into_inner();

    let mut fields = Map::new();
    if let Some(ts) = payload.check_in {
        fields.insert(
            "check_in".into(),
            json!(ts.format("%Y-%m-%dT%H:%M:%S").to_string()),
        );
    }
    if let Some(ts) = payload.check_out {
        fields.insert(
            "check_out".into(),
            json!(ts.format("%Y-%m-%dT%H:%M:%S").to_string()),
        );
    }
    if let Some(status) = payload.status {
        fields.insert("status".into(), json!(status.as_ref()));
    }
    if let Some(late) = payload.is_late {
        fields.insert("is_late".into(), json!(late));
    }

    let update = build_update_sql("attendance", &fields, "id", id)?;

    execute_update(pool.get_ref(), update).await.map_err(|e| {
        tracing::error!(error = %e, id, "Failed to update attendance");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    // rows_affected is 0 both for a missing row and for a no-op update,
    // so existence is decided by the fetch.
    match fetch_attendance(pool.get_ref(), id).await.map_err(|e| {
        tracing::error!(error = %e, id, "Failed to fetch updated attendance");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })? {
        Some(record) => Ok(HttpResponse::Ok().json(record)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "error": "Attendance record not found"
        }))),
    }
}

/* =========================
Monthly report (teacher/admin)
========================= */
/// Swagger doc for monthly_report endpoint
#[utoipa::path(
    get,
    path = "/api/attendance/monthly-report",
    params(MonthlyReportQuery),
    responses(
        (status = 200, description = "All attendance records for the month", body = Vec<AttendanceWithStudent>),
        (status = 400, description = "Month and year are required", body = Object, example = json!({
            "error": "Month and year are required"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn monthly_report(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<MonthlyReportQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_teacher_or_admin()?;

    let (month, year) = match (query.month, query.year) {
        (Some(m), Some(y)) => (m, y),
        _ => {
            return Ok(HttpResponse::BadRequest().json(json!({
                "error": "Month and year are required"
            })));
        }
    };

    let (first_day, last_day) = match day_key::month_bounds(year, month) {
        Some(bounds) => bounds,
        None => {
            return Ok(HttpResponse::BadRequest().json(json!({
                "error": "Invalid month or year"
            })));
        }
    };

    let records = sqlx::query_as::<_, AttendanceWithStudent>(
        r#"
        SELECT a.id, a.user_id, u.name AS user_name, u.student_id,
               a.date, a.check_in, a.check_out, a.status, a.is_late, a.check_in_photo
        FROM attendance a
        JOIN users u ON u.id = a.user_id
        WHERE a.date >= ? AND a.date <= ?
        ORDER BY a.date ASC, u.name ASC
        "#,
    )
    .bind(first_day)
    .bind(last_day)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, month, year, "Failed to fetch monthly report");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(records))
}

/* =========================
Per-student history (teacher/admin)
========================= */
/// Swagger doc for student_history endpoint
#[utoipa::path(
    get,
    path = "/api/students/{id}/attendance",
    params(
        ("id" = u64, Path, description = "ID of the student")
    ),
    responses(
        (status = 200, description = "Attendance records for the student, newest first", body = Vec<Attendance>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn student_history(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_teacher_or_admin()?;

    let user_id = path.into_inner();

    let records = sqlx::query_as::<_, Attendance>(
        r#"
        SELECT id, user_id, date, check_in, check_out, status, is_late, check_in_photo, created_at
        FROM attendance
        WHERE user_id = ?
        ORDER BY date DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, user_id, "Failed to fetch student attendance");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(records))
}
