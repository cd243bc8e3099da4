use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// User row as exposed by the API. The password column is never
/// selected into this struct.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "name": "Somchai Prasert",
        "email": "somchai@university.ac.th",
        "role": "STUDENT",
        "student_id": "ST-2026-014",
        "department_id": 2,
        "location_id": 1,
        "saka_id": 3,
        "created_at": "2026-06-01T02:15:00Z"
    })
)]
pub struct User {
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

    #[schema(
        example = "2026-06-01T02:15:00Z",
        value_type = String,
        format = "date-time"
    )]
    pub created_at: Option<DateTime<Utc>>,
}
