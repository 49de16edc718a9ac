//! The JSON envelope wrapped around every API response.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use haulhub_domain::time::{now, to_wire};

/// Error details inside a failed envelope.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

/// `{success, data|error, message?, timestamp, requestId}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub timestamp: String,
    pub request_id: String,
}

fn request_id() -> String {
    format!("req_{}", uuid::Uuid::new_v4().simple())
}

impl<T> Envelope<T> {
    fn success(data: Option<T>, message: Option<&'static str>) -> Self {
        Self {
            success: true,
            data,
            error: None,
            message,
            timestamp: to_wire(now()),
            request_id: request_id(),
        }
    }
}

impl Envelope<()> {
    /// A failed envelope carrying `code` and `message`.
    #[must_use]
    pub fn failure(code: &'static str, message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ErrorBody { code, message }),
            message: None,
            timestamp: to_wire(now()),
            request_id: request_id(),
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// A successful response: status code plus enveloped payload.
pub struct ApiResponse<T> {
    status: StatusCode,
    envelope: Envelope<T>,
}

impl<T> ApiResponse<T> {
    /// `200 OK` with `data`.
    pub fn ok(data: T) -> Self {
        Self {
            status: StatusCode::OK,
            envelope: Envelope::success(Some(data), None),
        }
    }

    /// `201 Created` with `data`.
    pub fn created(data: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            envelope: Envelope::success(Some(data), None),
        }
    }

    /// Attach a human-readable message.
    #[must_use]
    pub fn with_message(mut self, message: &'static str) -> Self {
        self.envelope.message = Some(message);
        self
    }
}

impl ApiResponse<()> {
    /// `200 OK` carrying only a message.
    #[must_use]
    pub fn message(message: &'static str) -> Self {
        Self {
            status: StatusCode::OK,
            envelope: Envelope::success(None, Some(message)),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, self.envelope).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_omit_error_on_success() {
        let envelope = Envelope::success(Some(serde_json::json!({ "x": 1 })), Some("done"));
        let json = serde_json::to_value(&envelope).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["x"], 1);
        assert_eq!(json["message"], "done");
        assert!(json.get("error").is_none());
        assert!(json["requestId"].as_str().unwrap().starts_with("req_"));
        assert!(json["timestamp"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn should_omit_data_on_failure() {
        let envelope = Envelope::failure("MISSING_FIELD", "Field addressId is required".to_string());
        let json = serde_json::to_value(&envelope).unwrap();

        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["code"], "MISSING_FIELD");
        assert!(json.get("data").is_none());
        assert!(json.get("message").is_none());
    }

    #[test]
    fn should_use_distinct_request_ids() {
        assert_ne!(request_id(), request_id());
    }
}
