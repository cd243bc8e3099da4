use crate::auth::auth::AuthUser;
use crate::utils::day_key::{attendance_day, month_bounds, shift_month};
use actix_web::{HttpResponse, Responder, web};
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::{MySqlPool, prelude::FromRow};
use utoipa::{IntoParams, ToSchema};

#[derive(Serialize, ToSchema)]
pub struct DashboardStats {
    #[schema(example = 128)]
    pub total_students: i64,
    #[schema(example = 6)]
    pub total_departments: i64,
    #[schema(example = 97)]
    pub check_ins_today: i64,
    #[schema(example = 4)]
    pub absent_today: i64,
    #[schema(example = 3)]
    pub pending_leaves: i64,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct SummaryQuery {
    /// Calendar month (1-12)
    pub month: Option<u32>,
    /// Four digit year
    pub year: Option<i32>,
}

/// Per-status counts for one month. LATE rows are also counted under
/// PRESENT; no attendance status maps to leave, so LEAVE stays zero.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct AttendanceSummary {
    #[schema(example = 412)]
    pub present: i64,
    #[schema(example = 23)]
    pub absent: i64,
    #[schema(example = 31)]
    pub late: i64,
    #[schema(example = 0)]
    pub leave: i64,
}

#[derive(FromRow)]
struct TrendRow {
    yr: i32,
    mon: i32,
    present: i64,
    late: i64,
    absent: i64,
}

#[derive(Serialize, ToSchema)]
pub struct MonthlyTrend {
    #[schema(example = 3)]
    pub month: u32,
    #[schema(example = 2026)]
    pub year: i32,
    /// On-time check-ins only
    #[schema(example = 380)]
    pub present: i64,
    #[schema(example = 31)]
    pub late: i64,
    #[schema(example = 23)]
    pub absent: i64,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct StudentStatsQuery {
    /// Pagination page number (start with 1)
    pub page: Option<u32>,
    /// Items per page, capped at 100
    pub per_page: Option<u32>,
    /// Search by name or email
    pub search: Option<String>,
}

#[derive(Serialize, FromRow, ToSchema)]
pub struct StudentStatRow {
    #[schema(example = 7)]
    pub id: u64,
    #[schema(example = "Somchai Prasert")]
    pub name: String,
    #[schema(example = "somchai@university.ac.th")]
    pub email: String,
    #[schema(example = "Computer Engineering", nullable = true)]
    pub department_name: Option<String>,
    #[schema(example = 52)]
    pub present: i64,
    #[schema(example = 2)]
    pub absent: i64,
    #[schema(example = 5)]
    pub late: i64,
}

#[derive(Serialize, ToSchema)]
pub struct StudentStatsResponse {
    pub data: Vec<StudentStatRow>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 128)]
    pub total: i64,
}

/* =========================
Dashboard
========================= */
/// Swagger doc for dashboard endpoint
#[utoipa::path(
    get,
    path = "/api/reports/dashboard",
    responses(
        (status = 200, description = "Headline counters for the admin dashboard", body = DashboardStats),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Reports"
)]
pub async fn dashboard(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let today = attendance_day(Utc::now());

    let total_students =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE role = 'STUDENT'")
            .fetch_one(pool.get_ref())
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to count students");
                actix_web::error::ErrorInternalServerError("Internal Server Error")
            })?;

    let total_departments = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM departments")
        .fetch_one(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to count departments");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let check_ins_today = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM attendance WHERE date = ? AND status = 'PRESENT'",
    )
    .bind(today)
    .fetch_one(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to count today's check-ins");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let absent_today = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM attendance WHERE date = ? AND status = 'ABSENT'",
    )
    .bind(today)
    .fetch_one(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to count today's absences");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let pending_leaves = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM leave_requests WHERE status = 'PENDING'",
    )
    .fetch_one(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to count pending leaves");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(DashboardStats {
        total_students,
        total_departments,
        check_ins_today,
        absent_today,
        pending_leaves,
    }))
}

/* =========================
Attendance summary
========================= */
/// Swagger doc for attendance_summary endpoint
#[utoipa::path(
    get,
    path = "/api/reports/attendance-summary",
    params(SummaryQuery),
    responses(
        (status = 200, description = "Status counts for the requested month", body = AttendanceSummary),
        (status = 400, description = "Missing or invalid month/year", body = Object, example = json!({
            "error": "Month and year are required"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Reports"
)]
pub async fn attendance_summary(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<SummaryQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let (month, year) = match (query.month, query.year) {
        (Some(m), Some(y)) => (m, y),
        _ => {
            return Ok(HttpResponse::BadRequest().json(json!({
                "error": "Month and year are required"
            })));
        }
    };

    let (first_day, last_day) = match month_bounds(year, month) {
        Some(bounds) => bounds,
        None => {
            return Ok(HttpResponse::BadRequest().json(json!({
                "error": "Invalid month or year"
            })));
        }
    };

    let status_counts = sqlx::query_as::<_, (String, i64)>(
        "SELECT status, COUNT(*) FROM attendance WHERE date BETWEEN ? AND ? GROUP BY status",
    )
    .bind(first_day)
    .bind(last_day)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, month, year, "Failed to aggregate attendance statuses");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let late = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM attendance WHERE date BETWEEN ? AND ? AND is_late = TRUE",
    )
    .bind(first_day)
    .bind(last_day)
    .fetch_one(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, month, year, "Failed to count late check-ins");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let mut summary = AttendanceSummary {
        present: 0,
        absent: 0,
        late,
        leave: 0,
    };
    for (status, count) in status_counts {
        match status.as_str() {
            "PRESENT" => summary.present = count,
            "ABSENT" => summary.absent = count,
            other => tracing::warn!(status = other, "Unexpected attendance status in summary"),
        }
    }

    Ok(HttpResponse::Ok().json(summary))
}

/* =========================
Monthly trends
========================= */
/// Swagger doc for monthly_trends endpoint
#[utoipa::path(
    get,
    path = "/api/reports/monthly-trends",
    responses(
        (status = 200, description = "Attendance counts for the last six calendar months, oldest first", body = Vec<MonthlyTrend>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Reports"
)]
pub async fn monthly_trends(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let today = attendance_day(Utc::now());
    let (earliest_year, earliest_month) = shift_month(today, 5);

    let bounds = month_bounds(earliest_year, earliest_month)
        .zip(month_bounds(today.year(), today.month()));
    let (range_start, range_end) = match bounds {
        Some(((start, _), (_, end))) => (start, end),
        None => {
            tracing::error!(%today, "Failed to compute trend range");
            return Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ));
        }
    };

    let rows = sqlx::query_as::<_, TrendRow>(
        r#"
        SELECT YEAR(date) AS yr, MONTH(date) AS mon,
               COUNT(CASE WHEN status = 'PRESENT' AND is_late = FALSE THEN 1 END) AS present,
               COUNT(CASE WHEN is_late = TRUE THEN 1 END) AS late,
               COUNT(CASE WHEN status = 'ABSENT' THEN 1 END) AS absent
        FROM attendance
        WHERE date BETWEEN ? AND ?
        GROUP BY YEAR(date), MONTH(date)
        "#,
    )
    .bind(range_start)
    .bind(range_end)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to aggregate monthly trends");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    // Months without any rows still show up, zeroed.
    let trends: Vec<MonthlyTrend> = (0..6)
        .rev()
        .map(|back| {
            let (year, month) = shift_month(today, back);
            let row = rows
                .iter()
                .find(|r| r.yr == year && r.mon == month as i32);
            MonthlyTrend {
                month,
                year,
                present: row.map_or(0, |r| r.present),
                late: row.map_or(0, |r| r.late),
                absent: row.map_or(0, |r| r.absent),
            }
        })
        .collect();

    Ok(HttpResponse::Ok().json(trends))
}

/* =========================
Per-student stats
========================= */
/// Swagger doc for student_stats endpoint
#[utoipa::path(
    get,
    path = "/api/reports/student-stats",
    params(StudentStatsQuery),
    responses(
        (status = 200, description = "Paginated per-student attendance totals", body = StudentStatsResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Reports"
)]
pub async fn student_stats(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<StudentStatsQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    let pattern = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("%{}%", s));

    let mut where_sql = String::from(" WHERE u.role = 'STUDENT'");
    if pattern.is_some() {
        where_sql.push_str(" AND (u.name LIKE ? OR u.email LIKE ?)");
    }

    // ---------- total count ----------
    let count_sql = format!("SELECT COUNT(*) FROM users u{}", where_sql);
    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    if let Some(p) = &pattern {
        count_query = count_query.bind(p).bind(p);
    }
    let total = count_query.fetch_one(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to count students for stats");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    // ---------- page of per-student totals ----------
    let data_sql = format!(
        r#"
        SELECT u.id, u.name, u.email, d.name AS department_name,
               COUNT(CASE WHEN a.status = 'PRESENT' THEN 1 END) AS present,
               COUNT(CASE WHEN a.status = 'ABSENT' THEN 1 END) AS absent,
               COUNT(CASE WHEN a.is_late = TRUE THEN 1 END) AS late
        FROM users u
        LEFT JOIN departments d ON d.id = u.department_id
        LEFT JOIN attendance a ON a.user_id = u.id
        {}
        GROUP BY u.id, u.name, u.email, d.name
        ORDER BY u.name ASC
        LIMIT ? OFFSET ?
        "#,
        where_sql
    );
    let mut data_query = sqlx::query_as::<_, StudentStatRow>(&data_sql);
    if let Some(p) = &pattern {
        data_query = data_query.bind(p).bind(p);
    }
    let data = data_query
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch student stats");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(StudentStatsResponse {
        data,
        page,
        per_page,
        total,
    }))
}
