use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, EnumString, Display, AsRefStr, ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendanceStatus {
    Present,
    Absent,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Attendance {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 7)]
    pub user_id: u64,

    /// Calendar day in the placement-local timezone (UTC+7).
    #[schema(example = "2026-08-22", value_type = String, format = "date")]
    pub date: NaiveDate,

    #[schema(
        example = "2026-08-22T01:42:00Z",
        value_type = String,
        format = "date-time",
        nullable = true
    )]
    pub check_in: Option<DateTime<Utc>>,

    #[schema(
        example = "2026-08-22T10:05:00Z",
        value_type = String,
        format = "date-time",
        nullable = true
    )]
    pub check_out: Option<DateTime<Utc>>,

    #[schema(example = "PRESENT")]
    pub status: String,

    #[schema(example = false)]
    pub is_late: bool,

    #[schema(example = "/uploads/checkin_7_1b9d6bcd.jpg", nullable = true)]
    pub check_in_photo: Option<String>,

    #[schema(
        example = "2026-08-22T01:42:00Z",
        value_type = String,
        format = "date-time",
        nullable = true
    )]
    pub created_at: Option<DateTime<Utc>>,
}
