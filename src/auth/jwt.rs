use std::time::{SystemTime, UNIX_EPOCH};

use crate::model::role::Role;
use crate::models::Claims;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

fn now() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize
}

pub fn generate_access_token(
    user_id: u64,
    email: String,
    role: Role,
    secret: &str,
    ttl: usize,
) -> String {
    let claims = Claims {
        user_id,
        sub: email,
        role,
        exp: now() + ttl,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn roundtrips_claims() {
        let token =
            generate_access_token(7, "somchai@university.ac.th".into(), Role::Student, SECRET, 3600);
        let claims = verify_token(&token, SECRET).unwrap();

        assert_eq!(claims.user_id, 7);
        assert_eq!(claims.sub, "somchai@university.ac.th");
        assert_eq!(claims.role, Role::Student);
        assert!(!claims.jti.is_empty());
    }

    #[test]
    fn rejects_wrong_secret() {
        let token = generate_access_token(1, "a@b.co".into(), Role::Admin, SECRET, 3600);
        assert!(verify_token(&token, "other-secret").is_err());
    }

    #[test]
    fn rejects_expired_token() {
        // Well past the default 60s decode leeway.
        let claims = Claims {
            user_id: 1,
            sub: "a@b.co".into(),
            role: Role::Student,
            exp: now() - 600,
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(verify_token(&token, SECRET).is_err());
    }

    #[test]
    fn rejects_tampered_token() {
        let token = generate_access_token(1, "a@b.co".into(), Role::Student, SECRET, 3600);
        let mut tampered = token.clone();
        tampered.pop();
        assert!(verify_token(&tampered, SECRET).is_err());
    }
}
