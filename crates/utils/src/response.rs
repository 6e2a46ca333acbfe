use serde::{Deserialize, Serialize};

/// JSON envelope returned by every API route.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T, E = T> {
    success: bool,
    data: Option<T>,
    error_data: Option<E>,
    message: Option<String>,
}

impl<T, E> ApiResponse<T, E> {
    /// Creates a successful response, with `data` and no message.
    pub fn success(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            message: None,
            error_data: None,
        }
    }

    /// Creates an error response, with `message` and no data.
    pub fn error(message: &str) -> Self {
        ApiResponse {
            success: false,
            data: None,
            message: Some(message.to_string()),
            error_data: None,
        }
    }

    /// Creates an error response carrying structured error data.
    pub fn error_with_data(message: &str, data: E) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error_data: Some(data),
            message: Some(message.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn into_data(self) -> Option<T> {
        self.data
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn error_data(&self) -> Option<&E> {
        self.error_data.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_serializes_without_message() {
        let response: ApiResponse<i64> = ApiResponse::success(7);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"], 7);
        assert!(json["message"].is_null());
    }

    #[test]
    fn error_keeps_message_and_data() {
        let response: ApiResponse<(), String> =
            ApiResponse::error_with_data("Escolha o tema.", "theme".to_string());
        assert!(!response.is_success());
        assert_eq!(response.message(), Some("Escolha o tema."));
        assert_eq!(response.error_data().map(String::as_str), Some("theme"));
    }
}
