use crate::auth::auth::AuthUser;
use crate::model::department::Department;
use crate::model::location::Location;
use crate::model::saka::Saka;
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct DepartmentPayload {
    #[schema(example = "Computer Engineering")]
    pub name: String,
}

#[derive(Deserialize, ToSchema)]
pub struct LocationPayload {
    #[schema(example = "Bangkok HQ")]
    pub name: String,
    #[schema(example = "123 Sukhumvit Rd, Bangkok", nullable = true)]
    pub address: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct SakaPayload {
    #[schema(example = "Saka Nakhon")]
    pub saka_name: String,
}

// Deletes of rows still referenced by users trip the FK constraint and
// come back as a 400 rather than a 500.
fn delete_conflict(entity: &str) -> HttpResponse {
    HttpResponse::BadRequest().json(json!({
        "error": format!("{} is still referenced by users", entity)
    }))
}

/* =========================
Departments
========================= */
/// Swagger doc for create_department endpoint
#[utoipa::path(
    post,
    path = "/api/departments",
    request_body = DepartmentPayload,
    responses(
        (status = 201, description = "Department created", body = Department),
        (status = 400, description = "Validation failed", body = Object, example = json!({
            "error": "Department already exists"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Master Data"
)]
pub async fn create_department(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<DepartmentPayload>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let name = payload.name.trim();
    if name.is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "error": "Name is required"
        })));
    }

    let result = sqlx::query("INSERT INTO departments (name) VALUES (?)")
        .bind(name)
        .execute(pool.get_ref())
        .await;

    let id = match result {
        Ok(done) => done.last_insert_id(),
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return Ok(HttpResponse::BadRequest().json(json!({
                        "error": "Department already exists"
                    })));
                }
            }

            tracing::error!(error = %e, "Failed to create department");
            return Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ));
        }
    };

    let department =
        sqlx::query_as::<_, Department>("SELECT id, name FROM departments WHERE id = ?")
            .bind(id)
            .fetch_one(pool.get_ref())
            .await
            .map_err(|e| {
                tracing::error!(error = %e, id, "Failed to fetch created department");
                actix_web::error::ErrorInternalServerError("Internal Server Error")
            })?;

    Ok(HttpResponse::Created().json(department))
}

/// Swagger doc for list_departments endpoint
#[utoipa::path(
    get,
    path = "/api/departments",
    responses(
        (status = 200, description = "All departments", body = Vec<Department>),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Master Data"
)]
pub async fn list_departments(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let departments =
        sqlx::query_as::<_, Department>("SELECT id, name FROM departments ORDER BY name ASC")
            .fetch_all(pool.get_ref())
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to fetch departments");
                actix_web::error::ErrorInternalServerError("Internal Server Error")
            })?;

    Ok(HttpResponse::Ok().json(departments))
}

/// Swagger doc for update_department endpoint
#[utoipa::path(
    put,
    path = "/api/departments/{id}",
    params(
        ("id" = u64, Path, description = "Department ID")
    ),
    request_body = DepartmentPayload,
    responses(
        (status = 200, description = "Updated department", body = Department),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Department not found", body = Object, example = json!({
            "error": "Department not found"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Master Data"
)]
pub async fn update_department(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<DepartmentPayload>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let id = path.into_inner();
    let name = payload.name.trim();
    if name.is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "error": "Name is required"
        })));
    }

    sqlx::query("UPDATE departments SET name = ? WHERE id = ?")
        .bind(name)
        .bind(id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, id, "Failed to update department");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let department =
        sqlx::query_as::<_, Department>("SELECT id, name FROM departments WHERE id = ?")
            .bind(id)
            .fetch_optional(pool.get_ref())
            .await
            .map_err(|e| {
                tracing::error!(error = %e, id, "Failed to fetch updated department");
                actix_web::error::ErrorInternalServerError("Internal Server Error")
            })?;

    match department {
        Some(d) => Ok(HttpResponse::Ok().json(d)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "error": "Department not found"
        }))),
    }
}

/// Swagger doc for delete_department endpoint
#[utoipa::path(
    delete,
    path = "/api/departments/{id}",
    params(
        ("id" = u64, Path, description = "Department ID")
    ),
    responses(
        (status = 200, description = "Department deleted", body = Object, example = json!({
            "message": "Department deleted"
        })),
        (status = 400, description = "Department is still referenced by users"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Department not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Master Data"
)]
pub async fn delete_department(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let id = path.into_inner();

    let result = sqlx::query("DELETE FROM departments WHERE id = ?")
        .bind(id)
        .execute(pool.get_ref())
        .await;

    match result {
        Ok(done) if done.rows_affected() == 0 => Ok(HttpResponse::NotFound().json(json!({
            "error": "Department not found"
        }))),
        Ok(_) => Ok(HttpResponse::Ok().json(json!({
            "message": "Department deleted"
        }))),
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_foreign_key_violation() {
                    return Ok(delete_conflict("Department"));
                }
            }

            tracing::error!(error = %e, id, "Failed to delete department");
            Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ))
        }
    }
}

/* =========================
Locations
========================= */
/// Swagger doc for create_location endpoint
#[utoipa::path(
    post,
    path = "/api/locations",
    request_body = LocationPayload,
    responses(
        (status = 201, description = "Location created", body = Location),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Master Data"
)]
pub async fn create_location(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<LocationPayload>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let name = payload.name.trim();
    if name.is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "error": "Name is required"
        })));
    }

    let result = sqlx::query("INSERT INTO locations (name, address) VALUES (?, ?)")
        .bind(name)
        .bind(&payload.address)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to create location");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let location =
        sqlx::query_as::<_, Location>("SELECT id, name, address FROM locations WHERE id = ?")
            .bind(result.last_insert_id())
            .fetch_one(pool.get_ref())
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to fetch created location");
                actix_web::error::ErrorInternalServerError("Internal Server Error")
            })?;

    Ok(HttpResponse::Created().json(location))
}

/// Swagger doc for list_locations endpoint
#[utoipa::path(
    get,
    path = "/api/locations",
    responses(
        (status = 200, description = "All locations", body = Vec<Location>),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Master Data"
)]
pub async fn list_locations(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let locations =
        sqlx::query_as::<_, Location>("SELECT id, name, address FROM locations ORDER BY name ASC")
            .fetch_all(pool.get_ref())
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to fetch locations");
                actix_web::error::ErrorInternalServerError("Internal Server Error")
            })?;

    Ok(HttpResponse::Ok().json(locations))
}

/// Swagger doc for update_location endpoint
#[utoipa::path(
    put,
    path = "/api/locations/{id}",
    params(
        ("id" = u64, Path, description = "Location ID")
    ),
    request_body = LocationPayload,
    responses(
        (status = 200, description = "Updated location", body = Location),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Location not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Master Data"
)]
pub async fn update_location(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<LocationPayload>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let id = path.into_inner();
    let name = payload.name.trim();
    if name.is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "error": "Name is required"
        })));
    }

    sqlx::query("UPDATE locations SET name = ?, address = ? WHERE id = ?")
        .bind(name)
        .bind(&payload.address)
        .bind(id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, id, "Failed to update location");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let location =
        sqlx::query_as::<_, Location>("SELECT id, name, address FROM locations WHERE id = ?")
            .bind(id)
            .fetch_optional(pool.get_ref())
            .await
            .map_err(|e| {
                tracing::error!(error = %e, id, "Failed to fetch updated location");
                actix_web::error::ErrorInternalServerError("Internal Server Error")
            })?;

    match location {
        Some(l) => Ok(HttpResponse::Ok().json(l)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "error": "Location not found"
        }))),
    }
}

/// Swagger doc for delete_location endpoint
#[utoipa::path(
    delete,
    path = "/api/locations/{id}",
    params(
        ("id" = u64, Path, description = "Location ID")
    ),
    responses(
        (status = 200, description = "Location deleted", body = Object, example = json!({
            "message": "Location deleted"
        })),
        (status = 400, description = "Location is still referenced by users"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Location not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Master Data"
)]
pub async fn delete_location(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let id = path.into_inner();

    let result = sqlx::query("DELETE FROM locations WHERE id = ?")
        .bind(id)
        .execute(pool.get_ref())
        .await;

    match result {
        Ok(done) if done.rows_affected() == 0 => Ok(HttpResponse::NotFound().json(json!({
            "error": "Location not found"
        }))),
        Ok(_) => Ok(HttpResponse::Ok().json(json!({
            "message": "Location deleted"
        }))),
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_foreign_key_violation() {
                    return Ok(delete_conflict("Location"));
                }
            }

            tracing::error!(error = %e, id, "Failed to delete location");
            Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ))
        }
    }
}

/* =========================
Sakas
========================= */
/// Swagger doc for create_saka endpoint
#[utoipa::path(
    post,
    path = "/api/sakas",
    request_body = SakaPayload,
    responses(
        (status = 201, description = "Saka created", body = Saka),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Master Data"
)]
pub async fn create_saka(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<SakaPayload>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let saka_name = payload.saka_name.trim();
    if saka_name.is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "error": "saka_name is required"
        })));
    }

    let result = sqlx::query("INSERT INTO sakas (saka_name) VALUES (?)")
        .bind(saka_name)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to create saka");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let saka = sqlx::query_as::<_, Saka>("SELECT id, saka_name FROM sakas WHERE id = ?")
        .bind(result.last_insert_id())
        .fetch_one(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch created saka");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Created().json(saka))
}

/// Swagger doc for list_sakas endpoint
#[utoipa::path(
    get,
    path = "/api/sakas",
    responses(
        (status = 200, description = "All sakas", body = Vec<Saka>),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Master Data"
)]
pub async fn list_sakas(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let sakas = sqlx::query_as::<_, Saka>("SELECT id, saka_name FROM sakas ORDER BY saka_name ASC")
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch sakas");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(sakas))
}

/// Swagger doc for update_saka endpoint
#[utoipa::path(
    put,
    path = "/api/sakas/{id}",
    params(
        ("id" = u64, Path, description = "Saka ID")
    ),
    request_body = SakaPayload,
    responses(
        (status = 200, description = "Updated saka", body = Saka),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Saka not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Master Data"
)]
pub async fn update_saka(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<SakaPayload>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let id = path.into_inner();
    let saka_name = payload.saka_name.trim();
    if saka_name.is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "error": "saka_name is required"
        })));
    }

    sqlx::query("UPDATE sakas SET saka_name = ? WHERE id = ?")
        .bind(saka_name)
        .bind(id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, id, "Failed to update saka");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let saka = sqlx::query_as::<_, Saka>("SELECT id, saka_name FROM sakas WHERE id = ?")
        .bind(id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, id, "Failed to fetch updated saka");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    match saka {
        Some(s) => Ok(HttpResponse::Ok().json(s)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "error": "Saka not found"
        }))),
    }
}

/// Swagger doc for delete_saka endpoint
#[utoipa::path(
    delete,
    path = "/api/sakas/{id}",
    params(
        ("id" = u64, Path, description = "Saka ID")
    ),
    responses(
        (status = 200, description = "Saka deleted", body = Object, example = json!({
            "message": "Saka deleted"
        })),
        (status = 400, description = "Saka is still referenced by users"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Saka not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Master Data"
)]
pub async fn delete_saka(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let id = path.into_inner();

    let result = sqlx::query("DELETE FROM sakas WHERE id = ?")
        .bind(id)
        .execute(pool.get_ref())
        .await;

    match result {
        Ok(done) if done.rows_affected() == 0 => Ok(HttpResponse::NotFound().json(json!({
            "error": "Saka not found"
        }))),
        Ok(_) => Ok(HttpResponse::Ok().json(json!({
            "message": "Saka deleted"
        }))),
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_foreign_key_violation() {
                    return Ok(delete_conflict("Saka"));
                }
            }

            tracing::error!(error = %e, id, "Failed to delete saka");
            Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ))
        }
    }
}
