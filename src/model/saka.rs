use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Saka {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "Saka Nakhon")]
    pub saka_name: String,
}
