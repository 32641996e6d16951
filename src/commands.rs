//! Tauri commands for the PGConnect application.

use crate::db::connect;
use crate::form::{ConnectionForm, FormError, FormField, FormSnapshot};
use crate::model::connection::ConnectionTestResult;
use sqlx::postgres::PgPool;
use sqlx::Row;
use tokio::sync::Mutex;

/// Application state managed by Tauri: the connection form and, once
/// `connect` succeeds, the session pool.
pub struct AppState {
    pub form: Mutex<ConnectionForm>,
    pub pool: Mutex<Option<PgPool>>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            form: Mutex::new(ConnectionForm::new()),
            pool: Mutex::new(None),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// Current form state for the render layer.
#[tauri::command]
pub async fn get_form(state: tauri::State<'_, AppState>) -> Result<FormSnapshot, String> {
    let form = state.form.lock().await;
    Ok(form.snapshot())
}

/// Replace one field of the connection config. Validation failures (bad
/// port, bad ssl value, unknown field) come back as the command error and
/// leave the form untouched.
#[tauri::command]
pub async fn update_field(
    state: tauri::State<'_, AppState>,
    field: String,
    value: String,
) -> Result<FormSnapshot, String> {
    let field: FormField = field.parse().map_err(|e: FormError| e.to_string())?;
    let mut form = state.form.lock().await;
    form.set_field(field, &value).map_err(|e| e.to_string())?;
    Ok(form.snapshot())
}

/// Test the current connection config. The form lock is released while the
/// probe runs so the render layer can observe the testing state; the
/// outcome is always a result value, never a command error.
#[tauri::command]
pub async fn test_connection(
    state: tauri::State<'_, AppState>,
) -> Result<ConnectionTestResult, String> {
    let config = {
        let mut form = state.form.lock().await;
        form.begin_test().map_err(|e| e.to_string())?
    };

    tracing::info!(url = %config.display_string(), "testing connection");
    let result = connect::test_connection(&config).await;

    let mut form = state.form.lock().await;
    form.finish(result.clone());
    Ok(result)
}

/// Establish a persistent session with the current config. On success the
/// pool replaces any previous session and the config gets a session id.
#[tauri::command]
pub async fn connect(state: tauri::State<'_, AppState>) -> Result<ConnectionTestResult, String> {
    let config = {
        let mut form = state.form.lock().await;
        form.begin_connect().map_err(|e| e.to_string())?
    };

    tracing::info!(url = %config.display_string(), "opening session");
    let (result, session) = match connect::open_session(&config).await {
        Ok(pool) => (ConnectionTestResult::ok("Connected successfully!"), Some(pool)),
        Err(e) => {
            tracing::warn!(url = %config.display_string(), error = %e, "connect failed");
            (
                ConnectionTestResult::failed("Failed to connect", e.to_string()),
                None,
            )
        }
    };

    if let Some(pool) = session {
        let mut slot = state.pool.lock().await;
        if let Some(previous) = slot.replace(pool) {
            previous.close().await;
            tracing::info!("previous session closed");
        }
    }

    let mut form = state.form.lock().await;
    if result.success {
        let id = form.ensure_session_id();
        tracing::info!(session = %id, "session established");
    }
    form.finish(result.clone());
    Ok(result)
}

/// Close the active session, if any. Idempotent.
#[tauri::command]
pub async fn disconnect(state: tauri::State<'_, AppState>) -> Result<(), String> {
    let mut slot = state.pool.lock().await;
    if let Some(pool) = slot.take() {
        pool.close().await;
        tracing::info!("session closed");
    }
    Ok(())
}

/// Whether a session pool is currently held.
#[tauri::command]
pub async fn is_connected(state: tauri::State<'_, AppState>) -> Result<bool, String> {
    Ok(state.pool.lock().await.is_some())
}

/// Server-side details of the active session (database, user, version).
#[tauri::command]
pub async fn session_info(state: tauri::State<'_, AppState>) -> Result<serde_json::Value, String> {
    let slot = state.pool.lock().await;
    let pool = slot.as_ref().ok_or_else(|| "Not connected".to_string())?;

    let row = sqlx::query(
        r#"
        SELECT
            current_database() as database_name,
            current_user as current_user,
            version() as server_version
        "#,
    )
    .fetch_one(pool)
    .await
    .map_err(|e| format!("Failed to get session info: {}", e))?;

    Ok(serde_json::json!({
        "database_name": row.get::<String, _>("database_name"),
        "current_user": row.get::<String, _>("current_user"),
        "server_version": row.get::<String, _>("server_version"),
    }))
}
