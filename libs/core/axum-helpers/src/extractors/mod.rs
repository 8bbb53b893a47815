//! Extractors that reject with the shared [`ErrorResponse`](crate::ErrorResponse) envelope.

pub mod id_path;
pub mod validated_json;

pub use id_path::IdPath;
pub use validated_json::ValidatedJson;
