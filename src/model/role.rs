use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, EnumString, Display, AsRefStr, ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Student,
    Teacher,
    Admin,
}

impl Role {
    /// Roles a self-service registration may claim. Anything else is
    /// coerced to `Student`.
    pub fn from_registration(requested: Option<&str>) -> Self {
        match requested {
            Some("TEACHER") => Role::Teacher,
            _ => Role::Student,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn parses_db_values() {
        assert_eq!(Role::from_str("STUDENT").ok(), Some(Role::Student));
        assert_eq!(Role::from_str("TEACHER").ok(), Some(Role::Teacher));
        assert_eq!(Role::from_str("ADMIN").ok(), Some(Role::Admin));
        assert!(Role::from_str("admin").is_err());
        assert!(Role::from_str("HR").is_err());
    }

    #[test]
    fn serializes_as_screaming_snake() {
        assert_eq!(Role::Admin.as_ref(), "ADMIN");
        assert_eq!(Role::Student.to_string(), "STUDENT");
        assert_eq!(
            serde_json::to_string(&Role::Teacher).unwrap(),
            "\"TEACHER\""
        );
    }

    #[test]
    fn registration_never_grants_admin() {
        assert_eq!(Role::from_registration(Some("ADMIN")), Role::Student);
        assert_eq!(Role::from_registration(Some("TEACHER")), Role::Teacher);
        assert_eq!(Role::from_registration(Some("STUDENT")), Role::Student);
        assert_eq!(Role::from_registration(Some("banana")), Role::Student);
        assert_eq!(Role::from_registration(None), Role::Student);
    }
}
