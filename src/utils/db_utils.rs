use actix_web::{HttpResponse, error::InternalError};
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::{Map, Value, json};
use sqlx::MySqlPool;

// Same {"error": ...} body shape the handlers produce.
fn bad_request(msg: &str) -> actix_web::Error {
    InternalError::from_response(
        msg.to_owned(),
        HttpResponse::BadRequest().json(json!({ "error": msg })),
    )
    .into()
}

/// ===============================
/// SQL bindable value enum
/// ===============================
#[derive(Debug)]
pub enum SqlValue {
    String(String),
    I64(i64),
    U64(u64),
    Bool(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Null,
}

/// ===============================
/// SQL update container
/// ===============================
#[derive(Debug)]
pub struct SqlUpdate {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

/// ===============================
/// Build dynamic UPDATE SQL
/// ===============================
/// Callers build the field map from a typed DTO, so keys are trusted
/// column names and never raw client input.
pub fn build_update_sql(
    table: &str,
    fields: &Map<String, Value>,
    id_column: &str,
    id_value: u64,
) -> Result<SqlUpdate, actix_web::Error> {
    if fields.is_empty() {
        return Err(bad_request("No fields provided for update"));
    }

    // Build SET clause
    let set_clause = fields
        .keys()
        .map(|k| format!("{} = ?", k))
        .collect::<Vec<_>>()
        .join(", ");

    let sql = format!(
        "UPDATE {} SET {} WHERE {} = ?",
        table, set_clause, id_column
    );

    let mut values = Vec::with_capacity(fields.len() + 1);

    // Convert JSON values → SqlValue
    for value in fields.values() {
        match value {
            Value::String(s) => {
                if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                    values.push(SqlValue::Date(d));
                } else if let Ok(dt) =
                    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
                {
                    values.push(SqlValue::DateTime(dt));
                } else {
                    values.push(SqlValue::String(s.clone()));
                }
            }
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    values.push(SqlValue::I64(i));
                } else if let Some(u) = n.as_u64() {
                    values.push(SqlValue::U64(u));
                } else {
                    return Err(bad_request("Unsupported numeric value"));
                }
            }
            Value::Bool(b) => values.push(SqlValue::Bool(*b)),
            Value::Null => values.push(SqlValue::Null),
            _ => return Err(bad_request("Unsupported JSON value type")),
        }
    }

    // WHERE id = ?
    values.push(SqlValue::U64(id_value));

    Ok(SqlUpdate { sql, values })
}

/// ===============================
/// Execute the update
/// ===============================
pub async fn execute_update(
    pool: &MySqlPool,
    update: SqlUpdate,
) -> Result<u64, sqlx::Error> {
    let mut query = sqlx::query(&update.sql);

    for value in update.values {
        query = match value {
            SqlValue::String(v) => query.bind(v),
            SqlValue::I64(v) => query.bind(v),
            SqlValue::U64(v) => query.bind(v),
            SqlValue::Bool(v) => query.bind(v),
            SqlValue::Date(v) => query.bind(v),
            SqlValue::DateTime(v) => query.bind(v),
            SqlValue::Null => query.bind(None::<String>),
        };
    }

    let result = query.execute(pool).await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn builds_set_clause_and_binds_in_key_order() {
        let payload = fields(json!({"check_out": "2026-08-22T10:05:00", "status": "PRESENT"}));
        let update = build_update_sql("attendance", &payload, "id", 42).unwrap();

        assert_eq!(
            update.sql,
            "UPDATE attendance SET check_out = ?, status = ? WHERE id = ?"
        );
        assert_eq!(update.values.len(), 3);
        assert!(matches!(update.values[0], SqlValue::DateTime(_)));
        assert!(matches!(update.values[1], SqlValue::String(_)));
        assert!(matches!(update.values[2], SqlValue::U64(42)));
    }

    #[test]
    fn rejects_empty_payload() {
        let payload = fields(json!({}));
        assert!(build_update_sql("users", &payload, "id", 1).is_err());
    }

    #[test]
    fn detects_dates_and_datetimes_in_strings() {
        let payload = fields(json!({
            "check_in": "2026-09-01T01:30:00",
            "name": "not a date",
            "start_date": "2026-09-01"
        }));
        let update = build_update_sql("t", &payload, "id", 1).unwrap();

        assert!(matches!(update.values[0], SqlValue::DateTime(_)));
        assert!(matches!(update.values[1], SqlValue::String(_)));
        assert!(matches!(update.values[2], SqlValue::Date(_)));
    }

    #[test]
    fn maps_scalars() {
        let payload = fields(json!({
            "department_id": 5,
            "is_late": true,
            "student_id": null
        }));
        let update = build_update_sql("users", &payload, "id", 9).unwrap();

        assert!(matches!(update.values[0], SqlValue::I64(5)));
        assert!(matches!(update.values[1], SqlValue::Bool(true)));
        assert!(matches!(update.values[2], SqlValue::Null));
    }
}
