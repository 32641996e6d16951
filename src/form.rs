//! Connection form state.
//!
//! The form owns the editable [`ConnectionConfig`], the lifecycle status of
//! the current attempt and the latest result. At most one test or connect
//! attempt may be in flight; `begin_test`/`begin_connect` enforce that
//! rather than relying on the UI disabling its buttons.

use crate::model::connection::{ConnectionConfig, ConnectionTestResult};
use serde::Serialize;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum FormError {
    #[error("unknown field: {0}")]
    UnknownField(String),
    #[error("invalid port \"{0}\": expected an integer between 1 and 65535")]
    InvalidPort(String),
    #[error("invalid ssl value \"{0}\": expected true or false")]
    InvalidSsl(String),
    #[error("a connection attempt is already in progress")]
    Busy,
}

/// Editable fields of the connection form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FormField {
    Name,
    Host,
    Port,
    Database,
    Username,
    Password,
    Ssl,
}

impl FromStr for FormField {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Self::Name),
            "host" => Ok(Self::Host),
            "port" => Ok(Self::Port),
            "database" => Ok(Self::Database),
            "username" => Ok(Self::Username),
            "password" => Ok(Self::Password),
            "ssl" => Ok(Self::Ssl),
            other => Err(FormError::UnknownField(other.to_string())),
        }
    }
}

/// Lifecycle of the current attempt. An enum, so testing and connecting
/// can never both be active.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FormStatus {
    Idle,
    Testing,
    Connecting,
}

/// Serializable projection of the form for the render layer, flattened to
/// the two booleans the frontend binds its buttons to.
#[derive(Debug, Clone, Serialize)]
pub struct FormSnapshot {
    pub config: ConnectionConfig,
    pub testing: bool,
    pub connecting: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ConnectionTestResult>,
}

#[derive(Debug)]
pub struct ConnectionForm {
    config: ConnectionConfig,
    status: FormStatus,
    result: Option<ConnectionTestResult>,
}

impl ConnectionForm {
    pub fn new() -> Self {
        Self {
            config: ConnectionConfig::default(),
            status: FormStatus::Idle,
            result: None,
        }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn status(&self) -> FormStatus {
        self.status
    }

    pub fn is_busy(&self) -> bool {
        self.status != FormStatus::Idle
    }

    /// Replace a single field, leaving every other field untouched. Port
    /// values must parse into 1..=65535; ssl must be "true" or "false".
    pub fn set_field(&mut self, field: FormField, value: &str) -> Result<(), FormError> {
        match field {
            FormField::Name => self.config.name = value.to_string(),
            FormField::Host => self.config.host = value.to_string(),
            FormField::Database => self.config.database = value.to_string(),
            FormField::Username => self.config.username = value.to_string(),
            FormField::Password => self.config.password = value.to_string(),
            FormField::Port => {
                let port = value
                    .trim()
                    .parse::<u16>()
                    .map_err(|_| FormError::InvalidPort(value.to_string()))?;
                if port == 0 {
                    return Err(FormError::InvalidPort(value.to_string()));
                }
                self.config.port = port;
            }
            FormField::Ssl => {
                self.config.ssl = value
                    .trim()
                    .parse::<bool>()
                    .map_err(|_| FormError::InvalidSsl(value.to_string()))?;
            }
        }
        Ok(())
    }

    /// Start a test attempt: clears the previous result and returns the
    /// config to test against. Fails if an attempt is already in flight.
    pub fn begin_test(&mut self) -> Result<ConnectionConfig, FormError> {
        self.begin(FormStatus::Testing)
    }

    /// Start a connect attempt. Same lifecycle as `begin_test` under the
    /// connecting status.
    pub fn begin_connect(&mut self) -> Result<ConnectionConfig, FormError> {
        self.begin(FormStatus::Connecting)
    }

    fn begin(&mut self, status: FormStatus) -> Result<ConnectionConfig, FormError> {
        if self.is_busy() {
            return Err(FormError::Busy);
        }
        self.result = None;
        self.status = status;
        Ok(self.config.clone())
    }

    /// Store the outcome of the in-flight attempt and return to idle.
    pub fn finish(&mut self, result: ConnectionTestResult) {
        self.result = Some(result);
        self.status = FormStatus::Idle;
    }

    /// Tag the config with a session id once a connection is established.
    pub fn ensure_session_id(&mut self) -> String {
        match &self.config.id {
            Some(id) => id.clone(),
            None => {
                let id = uuid::Uuid::new_v4().to_string();
                self.config.id = Some(id.clone());
                id
            }
        }
    }

    pub fn snapshot(&self) -> FormSnapshot {
        FormSnapshot {
            config: self.config.clone(),
            testing: self.status == FormStatus::Testing,
            connecting: self.status == FormStatus::Connecting,
            result: self.result.clone(),
        }
    }
}

impl Default for ConnectionForm {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_field_updates_only_that_field() {
        let mut form = ConnectionForm::new();
        let before = form.config().clone();

        form.set_field(FormField::Host, "db.internal").unwrap();

        let after = form.config();
        assert_eq!(after.host, "db.internal");
        assert_eq!(after.name, before.name);
        assert_eq!(after.port, before.port);
        assert_eq!(after.database, before.database);
        assert_eq!(after.username, before.username);
        assert_eq!(after.password, before.password);
        assert_eq!(after.ssl, before.ssl);
    }

    #[test]
    fn port_accepts_valid_range_only() {
        let mut form = ConnectionForm::new();

        form.set_field(FormField::Port, "6432").unwrap();
        assert_eq!(form.config().port, 6432);

        for bad in ["0", "65536", "-1", "54x2", "", "five"] {
            let err = form.set_field(FormField::Port, bad).unwrap_err();
            assert!(matches!(err, FormError::InvalidPort(_)), "input {:?}", bad);
            assert_eq!(form.config().port, 6432, "config changed on input {:?}", bad);
        }
    }

    #[test]
    fn ssl_parses_booleans() {
        let mut form = ConnectionForm::new();
        form.set_field(FormField::Ssl, "true").unwrap();
        assert!(form.config().ssl);
        form.set_field(FormField::Ssl, "false").unwrap();
        assert!(!form.config().ssl);
        assert_eq!(
            form.set_field(FormField::Ssl, "yes"),
            Err(FormError::InvalidSsl("yes".to_string()))
        );
    }

    #[test]
    fn field_names_parse_and_reject_unknowns() {
        assert_eq!("port".parse::<FormField>().unwrap(), FormField::Port);
        assert_eq!("ssl".parse::<FormField>().unwrap(), FormField::Ssl);
        assert_eq!(
            "sslmode".parse::<FormField>(),
            Err(FormError::UnknownField("sslmode".to_string()))
        );
    }

    #[test]
    fn begin_clears_previous_result() {
        let mut form = ConnectionForm::new();
        form.finish(ConnectionTestResult::failed(
            "Failed to test connection",
            "ECONNREFUSED",
        ));
        assert!(form.snapshot().result.is_some());

        form.begin_test().unwrap();
        let snapshot = form.snapshot();
        assert!(snapshot.result.is_none());
        assert!(snapshot.testing);
        assert!(!snapshot.connecting);
    }

    #[test]
    fn second_attempt_is_rejected_while_one_is_in_flight() {
        let mut form = ConnectionForm::new();
        form.begin_test().unwrap();
        assert_eq!(form.begin_test().unwrap_err(), FormError::Busy);
        assert_eq!(form.begin_connect().unwrap_err(), FormError::Busy);

        form.finish(ConnectionTestResult::ok("Connection successful!"));
        assert!(!form.is_busy());

        form.begin_connect().unwrap();
        assert_eq!(form.begin_test().unwrap_err(), FormError::Busy);
        let snapshot = form.snapshot();
        assert!(snapshot.connecting);
        assert!(!snapshot.testing);
    }

    #[test]
    fn finish_stores_result_and_returns_to_idle() {
        let mut form = ConnectionForm::new();
        form.begin_connect().unwrap();
        form.finish(ConnectionTestResult::ok("Connected successfully!"));

        assert_eq!(form.status(), FormStatus::Idle);
        let result = form.snapshot().result.unwrap();
        assert!(result.success);
        assert_eq!(result.message, "Connected successfully!");
    }

    #[test]
    fn session_id_is_assigned_once() {
        let mut form = ConnectionForm::new();
        let id = form.ensure_session_id();
        assert_eq!(form.ensure_session_id(), id);
        assert_eq!(form.config().id.as_deref(), Some(id.as_str()));
    }

    #[test]
    fn snapshot_serialization_omits_missing_result() {
        let form = ConnectionForm::new();
        let json = serde_json::to_value(form.snapshot()).unwrap();
        assert!(json.get("result").is_none());
        assert_eq!(json["testing"], false);
        assert_eq!(json["connecting"], false);
        assert_eq!(json["config"]["port"], 5432);
    }
}
