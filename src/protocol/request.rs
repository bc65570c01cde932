//! Request and Response message types.
//!
//! Defines the message format for command requests sent by extension hosts
//! and the single response each request receives.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::identifiers::RequestId;

use super::Command;

// ============================================================================
// Request
// ============================================================================

/// A command request from an extension host.
///
/// # Format
///
/// ```json
/// {
///   "id": "uuid",
///   "method": "tabs.get",
///   "params": { "tabId": 1 }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Unique identifier for request/response correlation.
    pub id: RequestId,

    /// Method in `module.methodName` format.
    pub method: String,

    /// Method params.
    #[serde(default)]
    pub params: Value,
}

impl Request {
    /// Creates a new request with auto-generated ID.
    #[inline]
    #[must_use]
    pub fn new(method: impl Into<String>, params: Value) -> Self {
        Self {
            id: RequestId::generate(),
            method: method.into(),
            params,
        }
    }

    /// Creates a request from a typed command.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if the command fails to serialize.
    pub fn from_command(command: &Command) -> Result<Self> {
        let mut tagged = serde_json::to_value(command)?;
        let params = tagged
            .get_mut("params")
            .map(Value::take)
            .unwrap_or(Value::Null);
        Ok(Self::new(command.method(), params))
    }

    /// Parses the typed command.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownCommand`] if the method is not answered
    /// - [`Error::InvalidArgument`] if params do not match
    pub fn command(&self) -> Result<Command> {
        Command::from_parts(&self.method, self.params.clone())
    }
}

// ============================================================================
// Response
// ============================================================================

/// A response to one request.
///
/// # Format
///
/// Success:
/// ```json
/// {
///   "id": "uuid",
///   "type": "success",
///   "result": { ... }
/// }
/// ```
///
/// Error:
/// ```json
/// {
///   "id": "uuid",
///   "type": "error",
///   "error": "no such tab",
///   "message": "Tab not found: 4"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Matches the request `id`.
    pub id: RequestId,

    /// Response type.
    #[serde(rename = "type")]
    pub response_type: ResponseType,

    /// Result data (if success).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    /// Error code (if error).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Error message (if error).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Response {
    /// Creates a success response.
    #[inline]
    #[must_use]
    pub fn success(id: RequestId, result: Value) -> Self {
        Self {
            id,
            response_type: ResponseType::Success,
            result: Some(result),
            error: None,
            message: None,
        }
    }

    /// Creates an error response from a crate error.
    #[must_use]
    pub fn error(id: RequestId, error: &Error) -> Self {
        Self {
            id,
            response_type: ResponseType::Error,
            result: None,
            error: Some(error.code().to_string()),
            message: Some(error.to_string()),
        }
    }

    /// Returns `true` if this is a success response.
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.response_type == ResponseType::Success
    }

    /// Returns `true` if this is an error response.
    #[inline]
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.response_type == ResponseType::Error
    }

    /// Extracts the result value, returning error if response was error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] carrying the error message.
    pub fn into_result(self) -> Result<Value> {
        match self.response_type {
            ResponseType::Success => Ok(self.result.unwrap_or(Value::Null)),
            ResponseType::Error => {
                let error_code = self.error.unwrap_or_else(|| "unknown error".to_string());
                let message = self.message.unwrap_or_else(|| error_code.clone());
                Err(Error::invalid_argument(message))
            }
        }
    }
}

// ============================================================================
// ResponseType
// ============================================================================

/// Response type discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    /// Successful response.
    Success,
    /// Error response.
    Error,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifiers::TabId;
    use crate::protocol::TabsCommand;

    use serde_json::json;

    #[test]
    fn test_request_parsing() {
        let json_str = r#"{
            "id": "550e8400-e29b-41d4-a716-446655440000",
            "method": "tabs.get",
            "params": {"tabId": 5}
        }"#;

        let request: Request = serde_json::from_str(json_str).expect("parse");
        let command = request.command().expect("command");
        assert_eq!(
            command,
            Command::Tabs(TabsCommand::Get {
                tab_id: TabId::new(5)
            })
        );
    }

    #[test]
    fn test_request_without_params() {
        let json_str = r#"{
            "id": "550e8400-e29b-41d4-a716-446655440000",
            "method": "tabs.query"
        }"#;

        let request: Request = serde_json::from_str(json_str).expect("parse");
        assert_eq!(request.params, Value::Null);
        assert!(request.command().is_ok());
    }

    #[test]
    fn test_from_command() {
        let command = Command::Tabs(TabsCommand::Get {
            tab_id: TabId::new(2),
        });
        let request = Request::from_command(&command).expect("request");
        assert_eq!(request.method, "tabs.get");
        assert_eq!(request.params, json!({"tabId": 2}));
        assert_eq!(request.command().expect("command"), command);
    }

    #[test]
    fn test_success_response_format() {
        let id = RequestId::generate();
        let response = Response::success(id, json!(true));
        let json = serde_json::to_value(&response).expect("serialize");

        assert_eq!(json["type"], "success");
        assert_eq!(json["result"], true);
        assert!(json.get("error").is_none());
        assert!(response.is_success());
    }

    #[test]
    fn test_error_response_format() {
        let id = RequestId::generate();
        let response = Response::error(id, &Error::tab_not_found(TabId::new(4)));

        assert!(response.is_error());
        assert_eq!(response.error.as_deref(), Some("no such tab"));
        assert_eq!(response.message.as_deref(), Some("Tab not found: 4"));
        assert!(response.into_result().is_err());
    }

    #[test]
    fn test_into_result_success() {
        let response = Response::success(RequestId::generate(), json!({"id": -1}));
        let result = response.into_result().expect("should succeed");
        assert_eq!(result["id"], -1);
    }
}
