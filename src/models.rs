use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::model::role::Role;

#[derive(Deserialize)]
pub struct RegisterReq {
    pub name: String,
    pub email: String,
    pub password: String,
    pub student_id: String,
    /// Requested role; anything other than TEACHER is coerced to STUDENT.
    pub role: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginReqDto {
    pub email: String,
    pub password: String,
}

#[derive(FromRow)]
pub struct UserSql {
    pub id: u64, // 👈 matches BIGINT UNSIGNED
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: u64,
    pub sub: String, // email
    pub role: Role,
    pub exp: usize,
    pub jti: String,
}
