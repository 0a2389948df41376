use assignly_shared::WorkRequest;
use async_trait::async_trait;

/// The request-creation backend. Registers the work request and issues the
/// server-side id the payment is later reconciled against.
#[async_trait]
pub trait RequestService: Send + Sync {
    async fn create_request(&self, request: &WorkRequest) -> Result<String, SubmitError>;
}

/// Transport errors from the backend, mapped from its response classes. All
/// of them are recoverable: the session stays in Drafting and the user may
/// retry. Nothing is retried automatically.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SubmitError {
    /// 400-class: the backend rejected the payload, possibly naming fields.
    #[error("Invalid data: {message}")]
    Validation {
        message: String,
        missing_fields: Vec<String>,
    },

    /// 500-class.
    #[error("Server error")]
    Server,

    /// 404-class or no response at all.
    #[error("Service unavailable")]
    Unavailable,
}

impl SubmitError {
    /// Single retryable message shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            SubmitError::Validation { message, missing_fields } => {
                if missing_fields.is_empty() {
                    format!("{}. Please check your inputs and try again.", message)
                } else {
                    format!(
                        "{}. Missing: {}. Please check your inputs and try again.",
                        message,
                        missing_fields.join(", ")
                    )
                }
            }
            SubmitError::Server => "Server error. Please try again later.".to_string(),
            SubmitError::Unavailable => {
                "Service temporarily unavailable. Please try again later.".to_string()
            }
        }
    }
}

/// In-memory backend for tests: hands out sequential ids, or fails with a
/// scripted error.
pub struct MockRequestService {
    fail_with: Option<SubmitError>,
    counter: std::sync::atomic::AtomicU64,
}

impl MockRequestService {
    pub fn accepting() -> Self {
        Self {
            fail_with: None,
            counter: std::sync::atomic::AtomicU64::new(0),
        }
    }

    pub fn failing(error: SubmitError) -> Self {
        Self {
            fail_with: Some(error),
            counter: std::sync::atomic::AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl RequestService for MockRequestService {
    async fn create_request(&self, _request: &WorkRequest) -> Result<String, SubmitError> {
        if let Some(error) = &self.fail_with {
            return Err(error.clone());
        }
        let n = self.counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(format!("req_{}", n + 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_lists_missing_fields() {
        let error = SubmitError::Validation {
            message: "Invalid data".to_string(),
            missing_fields: vec!["phone".to_string(), "deadline".to_string()],
        };
        assert_eq!(
            error.user_message(),
            "Invalid data. Missing: phone, deadline. Please check your inputs and try again."
        );
    }

    #[test]
    fn test_every_transport_error_is_retryable_prose() {
        for error in [
            SubmitError::Validation {
                message: "Invalid data".to_string(),
                missing_fields: vec![],
            },
            SubmitError::Server,
            SubmitError::Unavailable,
        ] {
            assert!(error.user_message().contains("try again"));
        }
    }
}
