use serde::Serialize;

pub const STATUS_SUCCESS: &str = "success";
pub const STATUS_ERROR: &str = "error";

/// Response envelope. Payload fields are flattened next to `status`/`message`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub payload: T,
}

impl<T> ApiResponse<T> {
    pub const fn success(payload: T) -> Self {
        Self {
            status: STATUS_SUCCESS,
            message: None,
            payload,
        }
    }

    pub fn with_message(message: impl Into<String>, payload: T) -> Self {
        Self {
            status: STATUS_SUCCESS,
            message: Some(message.into()),
            payload,
        }
    }
}

impl ApiResponse<Empty> {
    pub fn message(message: impl Into<String>) -> Self {
        Self::with_message(message, Empty {})
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub status: &'static str,
    pub message: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: STATUS_ERROR,
            message: message.into(),
        }
    }
}

/// Envelope payload with no extra fields.
#[derive(Debug, Serialize)]
pub struct Empty {}

/// Payload placed under `data`.
#[derive(Debug, Serialize)]
pub struct Data<T> {
    pub data: T,
}

/// Reference GET returns one row when an id is given, otherwise all rows.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}
