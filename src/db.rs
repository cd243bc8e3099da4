use anyhow::Result;
use sqlx::MySqlPool;
use tracing::info;

pub async fn init_db(database_url: &str) -> MySqlPool {
    let pool = MySqlPool::connect(database_url)
        .await
        .expect("Failed to connect to database");
    run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    pool
}

async fn run_migrations(pool: &MySqlPool) -> Result<()> {
    execute_sql(pool, include_str!("../migrations/001_initial.sql")).await?;
    info!("Database migrations complete");
    Ok(())
}

// MySQL rejects multi-statement prepared queries, so the migration file
// is executed one statement at a time.
async fn execute_sql(pool: &MySqlPool, sql: &str) -> Result<()> {
    for statement in sql.split(';') {
        let cleaned: String = statement
            .lines()
            .filter(|line| !line.trim_start().starts_with("--"))
            .collect::<Vec<_>>()
            .join("\n");
        let trimmed = cleaned.trim();
        if !trimmed.is_empty() {
            sqlx::query(trimmed).execute(pool).await?;
        }
    }
    Ok(())
}
