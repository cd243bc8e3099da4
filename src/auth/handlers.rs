use std::str::FromStr;

use crate::{
    auth::{
        jwt::generate_access_token,
        password::{hash_password, verify_password},
    },
    config::Config,
    model::role::Role,
    models::{LoginReqDto, RegisterReq, UserSql},
};
use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{debug, error, info, instrument};

use crate::utils::email_cache;
use crate::utils::email_filter;
use crate::utils::validate::is_valid_email;
// auth end points

/// Inserts a new user into the database and updates the Cuckoo filter
async fn insert_user(
    name: &str,
    email: &str,
    password: &str,
    role: Role,
    student_id: Option<&str>,
    pool: &MySqlPool,
) -> Result<u64, HttpResponse> {
    let hashed = hash_password(password);

    let result = sqlx::query(
        r#"INSERT INTO users (name, email, password, role, student_id) VALUES (?, ?, ?, ?, ?)"#,
    )
    .bind(name)
    .bind(email)
    .bind(hashed)
    .bind(role.as_ref())
    .bind(student_id)
    .execute(pool)
    .await;

    match result {
        Ok(done) => {
            // if insert success, insert/populate filter using email, and keep cache populated.
            email_filter::insert(email);
            email_cache::mark_taken(email).await;
            Ok(done.last_insert_id())
        }
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Err(HttpResponse::BadRequest().json(json!({
                        "error": "Email already exists"
                    })));
                }
            }
            error!(error = %e, "Failed to insert user");

            Err(HttpResponse::InternalServerError().json(json!({
                "error": "Failed to register user"
            })))
        }
    }
}

/// true  => email AVAILABLE
/// false => email TAKEN
pub async fn is_email_available(email: &str, pool: &MySqlPool) -> bool {
    let email = email.to_lowercase();

    // 1️⃣ Cuckoo filter — fast negative
    // if filter says not exist then it is definitely available, else it may exist or not.
    if !email_filter::might_exist(&email) {
        return true;
    }

    // 2️⃣ Moka cache — fast positive
    if email_cache::is_taken(&email).await {
        return false;
    }

    // 3️⃣ Database fallback
    let taken = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE email = ?")
        .bind(&email)
        .fetch_one(pool)
        .await
        .map(|count| count > 0)
        .unwrap_or(true); // fail-safe

    !taken
}

// #[post("/register")]

/// Self-service registration. New accounts are students unless the
/// request explicitly asks for the TEACHER role.
pub async fn register(user: web::Json<RegisterReq>, pool: web::Data<MySqlPool>) -> impl Responder {
    let name = user.name.trim();
    let email = user.email.trim();
    let student_id = user.student_id.trim();

    if name.is_empty() || email.is_empty() || user.password.is_empty() || student_id.is_empty() {
        return HttpResponse::BadRequest().json(json!({
            "error": "Missing required fields: name, email, password, student_id"
        }));
    }

    if !is_valid_email(email) {
        return HttpResponse::BadRequest().json(json!({
            "error": "Invalid email format"
        }));
    }

    if !is_email_available(email, pool.get_ref()).await {
        return HttpResponse::BadRequest().json(json!({
            "error": "Email already exists"
        }));
    }

    let role = Role::from_registration(user.role.as_deref());

    // Safe to insert after DB check; a concurrent duplicate still trips
    // the unique key inside insert_user.
    match insert_user(name, email, &user.password, role, Some(student_id), pool.get_ref()).await {
        Ok(user_id) => HttpResponse::Created().json(json!({
            "message": "User registered successfully",
            "user_id": user_id
        })),
        Err(err_resp) => err_resp,
    }
}

#[derive(Serialize, Deserialize)]
struct LoginUser {
    id: u64,
    name: String,
    role: String,
}

#[derive(Serialize, Deserialize)]
struct LoginResponse {
    token: String,
    user: LoginUser,
}

// #[post("/login")]
#[instrument(
    name = "auth_login",
    skip(pool, config, user),
    fields(email = %user.email)
)]
pub async fn login(
    user: web::Json<LoginReqDto>,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> impl Responder {
    info!("Login request received");

    // 1️⃣ Basic validation
    if user.email.trim().is_empty() || user.password.is_empty() {
        info!("Validation failed: empty email or password");
        return HttpResponse::BadRequest().json(json!({
            "error": "Email and password are required"
        }));
    }

    debug!("Fetching user from database");

    // 2️⃣ Fetch user
    let db_user = match sqlx::query_as::<_, UserSql>(
        r#"
        SELECT id, name, email, password, role
        FROM users
        WHERE email = ?
        "#,
    )
    .bind(&user.email)
    .fetch_optional(pool.get_ref())
    .await
    {
        Ok(Some(user)) => {
            debug!(user_id = user.id, "User found");
            user
        }
        Ok(None) => {
            info!("Invalid credentials: user not found");
            return HttpResponse::Unauthorized().json(json!({
                "error": "Invalid email or password"
            }));
        }
        Err(e) => {
            error!(error = %e, "Database error while fetching user");
            return HttpResponse::InternalServerError().json(json!({
                "error": "Internal Server Error"
            }));
        }
    };

    // 3️⃣ Verify password
    debug!("Verifying password");

    if let Err(e) = verify_password(&user.password, &db_user.password) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return HttpResponse::Unauthorized().json(json!({
            "error": "Invalid email or password"
        }));
    }

    debug!("Password verified");

    let role = match Role::from_str(&db_user.role) {
        Ok(r) => r,
        Err(_) => {
            error!(role = %db_user.role, "Unknown role stored for user");
            return HttpResponse::InternalServerError().json(json!({
                "error": "Internal Server Error"
            }));
        }
    };

    // 4️⃣ Generate access token
    debug!("Generating access token");

    let token = generate_access_token(
        db_user.id,
        db_user.email.clone(),
        role,
        &config.jwt_secret,
        config.access_token_ttl,
    );

    // 5️⃣ Update last_login_at (non-fatal)
    debug!("Updating last_login_at");

    if let Err(e) = sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = ?")
        .bind(db_user.id)
        .execute(pool.get_ref())
        .await
    {
        error!(error = %e, "Failed to update last_login_at");
        // intentionally not failing login
    }

    info!("Login successful");

    HttpResponse::Ok().json(LoginResponse {
        token,
        user: LoginUser {
            id: db_user.id,
            name: db_user.name,
            role: db_user.role,
        },
    })
}
