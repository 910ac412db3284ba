/// Success envelope
///
/// Every successful API response is wrapped in the same shape:
///
/// ```json
/// {
///   "success": true,
///   "data": { "project": { "id": "…", "name": "Launch" } },
///   "message": "Project created successfully"
/// }
/// ```
///
/// `data` and `message` are omitted when absent.

use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Data only
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            message: None,
        })
    }

    /// Data with a confirmation message
    pub fn with_message(data: T, message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
        })
    }
}

impl ApiResponse<()> {
    /// Message only, for deletions and logout
    pub fn message(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            data: None,
            message: Some(message.into()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_shapes() {
        let Json(with_data) = ApiResponse::ok(json!({ "projects": [] }));
        assert_eq!(
            serde_json::to_value(&with_data).unwrap(),
            json!({ "success": true, "data": { "projects": [] } })
        );

        let Json(message_only) = ApiResponse::message("Project deleted successfully");
        assert_eq!(
            serde_json::to_value(&message_only).unwrap(),
            json!({ "success": true, "message": "Project deleted successfully" })
        );
    }
}
