use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Plain acknowledgement body, e.g. after a delete.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({"message": "Product deleted successfully"}))]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
