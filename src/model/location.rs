use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Location {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "Bangkok HQ")]
    pub name: String,

    #[schema(example = "123 Sukhumvit Rd, Bangkok", nullable = true)]
    pub address: Option<String>,
}
