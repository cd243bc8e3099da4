use crate::config::Config;
use crate::{model::role::Role, models::Claims};
use actix_web::{
    FromRequest, HttpRequest, HttpResponse, dev::Payload, error::InternalError, web::Data,
};
use futures::future::{Ready, ready};
use jsonwebtoken::decode;
use jsonwebtoken::{DecodingKey, Validation};
use serde_json::json;

pub struct AuthUser {
    pub user_id: u64,
    pub email: String,
    pub role: Role,
}

// Error bodies keep the same {"error": ...} shape as handler errors.
fn unauthorized(msg: &str) -> actix_web::Error {
    InternalError::from_response(
        msg.to_owned(),
        HttpResponse::Unauthorized().json(json!({ "error": msg })),
    )
    .into()
}

fn forbidden(msg: &str) -> actix_web::Error {
    InternalError::from_response(
        msg.to_owned(),
        HttpResponse::Forbidden().json(json!({ "error": msg })),
    )
    .into()
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let token = match req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
        {
            Some(t) => t,
            None => return ready(Err(unauthorized("Missing token"))),
        };

        let config = match req.app_data::<Data<Config>>() {
            Some(c) => c,
            None => {
                return ready(Err(
                    actix_web::error::ErrorInternalServerError("Config missing"),
                ))
            }
        };

        let data = match decode::<Claims>(
            token,
            &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            &Validation::default(),
        ) {
            Ok(d) => d,
            Err(_) => return ready(Err(unauthorized("Invalid token"))),
        };

        ready(Ok(AuthUser {
            user_id: data.claims.user_id,
            email: data.claims.sub,
            role: data.claims.role,
        }))
    }
}

impl AuthUser {
    pub fn require_admin(&self) -> actix_web::Result<()> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(forbidden("Admin only"))
        }
    }

    pub fn require_teacher_or_admin(&self) -> actix_web::Result<()> {
        if matches!(self.role, Role::Admin | Role::Teacher) {
            Ok(())
        } else {
            Err(forbidden("Teacher/Admin only"))
        }
    }

    /// Endpoints that act on "my" attendance or leave are student-only.
    pub fn require_student(&self) -> actix_web::Result<()> {
        if self.role == Role::Student {
            Ok(())
        } else {
            Err(forbidden("Student only"))
        }
    }
}
