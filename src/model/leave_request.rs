use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, EnumString, Display, AsRefStr, ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum LeaveType {
    Sick,
    Personal,
}

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, EnumString, Display, AsRefStr, ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct LeaveRequest {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 7)]
    pub user_id: u64,

    #[schema(example = "2026-09-01", value_type = String, format = "date")]
    pub start_date: NaiveDate,

    #[schema(example = "2026-09-03", value_type = String, format = "date")]
    pub end_date: NaiveDate,

    #[schema(example = "SICK")]
    pub leave_type: String,

    #[schema(example = "Flu, doctor's note attached", nullable = true)]
    pub reason: Option<String>,

    #[schema(example = "PENDING")]
    pub status: String,

    #[schema(
        example = "2026-08-22T04:00:00Z",
        value_type = String,
        format = "date-time",
        nullable = true
    )]
    pub created_at: Option<DateTime<Utc>>,
}
