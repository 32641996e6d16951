//! Connection model types shared between the form, the database layer and
//! the command surface.

use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgConnectOptions, PgSslMode};

/// Parameters required to address and authenticate to a PostgreSQL instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConnectionConfig {
    pub id: Option<String>,
    pub name: String,
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: String,
    pub ssl: bool,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            id: None,
            name: "Local PostgreSQL".to_string(),
            host: "localhost".to_string(),
            port: 5432,
            database: "postgres".to_string(),
            username: "postgres".to_string(),
            password: String::new(),
            ssl: false,
        }
    }
}

impl ConnectionConfig {
    /// Build typed connect options for sqlx. A raw URL would need the
    /// userinfo percent-encoded; the builder takes the fields as-is.
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.username)
            .password(&self.password)
            .database(&self.database)
            .ssl_mode(if self.ssl {
                PgSslMode::Require
            } else {
                PgSslMode::Prefer
            })
    }

    /// Password-free rendering of the target, for logs and the UI.
    pub fn display_string(&self) -> String {
        format!(
            "postgres://{}@{}:{}/{}",
            self.username, self.host, self.port, self.database
        )
    }
}

/// Outcome of a connection test or connect attempt. Failures carry the
/// driver's message verbatim in `error`; nothing is raised past the
/// command boundary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConnectionTestResult {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConnectionTestResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            error: Some(error.into()),
        }
    }
}
