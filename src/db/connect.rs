//! PostgreSQL connection management.

use crate::model::connection::{ConnectionConfig, ConnectionTestResult};
use sqlx::postgres::{PgPool, PgPoolOptions};

/// Test a connection by opening a single-connection pool and running a
/// probe query, then closing the pool again. Every failure is folded into
/// the returned result; nothing propagates as an error.
pub async fn test_connection(config: &ConnectionConfig) -> ConnectionTestResult {
    let pool = match PgPoolOptions::new()
        .max_connections(1)
        .connect_with(config.connect_options())
        .await
    {
        Ok(pool) => pool,
        Err(e) => {
            tracing::warn!(url = %config.display_string(), error = %e, "connection test failed");
            return ConnectionTestResult::failed("Failed to test connection", e.to_string());
        }
    };

    let result = match sqlx::query("SELECT 1").execute(&pool).await {
        Ok(_) => ConnectionTestResult::ok("Connection successful!"),
        Err(e) => {
            tracing::warn!(url = %config.display_string(), error = %e, "test query failed");
            ConnectionTestResult::failed("Failed to execute test query", e.to_string())
        }
    };

    pool.close().await;
    result
}

/// Open a pooled session and verify it with a probe query.
pub async fn open_session(config: &ConnectionConfig) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect_with(config.connect_options())
        .await?;

    if let Err(e) = sqlx::query("SELECT 1").execute(&pool).await {
        pool.close().await;
        return Err(e);
    }

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Port 1 is unassigned on loopback, so these fail fast with a refused
    // connection instead of reaching out to a real server.
    fn unreachable_config() -> ConnectionConfig {
        ConnectionConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            ..ConnectionConfig::default()
        }
    }

    #[tokio::test]
    async fn refused_connection_becomes_a_failed_result() {
        let result = test_connection(&unreachable_config()).await;
        assert!(!result.success);
        assert_eq!(result.message, "Failed to test connection");
        assert!(result.error.is_some());
        assert!(!result.error.unwrap().is_empty());
    }

    #[test]
    fn open_session_propagates_connect_errors() {
        let outcome = tokio_test::block_on(open_session(&unreachable_config()));
        assert!(outcome.is_err());
    }
}
