use serde::{Deserialize, Serialize};

/// One successfully rendered certificate, returned by the generation
/// endpoint for immediate display. Transient: never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResult {
    /// Publicly resolvable URL of the rendered artifact.
    pub url: String,
    pub name: String,
    pub email: String,
    pub id: String,
}

/// Response payload of `POST /api/certificates/generate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub message: String,
    pub files: Vec<GenerationResult>,
}

/// One recipient of a distribution batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendRecipient {
    pub email: String,
    pub name: String,
    pub certificate_url: String,
}

/// Request payload of `POST /api/certificates/send`. A manual single send is
/// simply a batch of one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendBatchRequest {
    pub recipients: Vec<SendRecipient>,
    pub subject: String,
    pub body: String,
}

/// Per-recipient dispatch failure, keyed by email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendError {
    pub email: String,
    pub error: String,
}

/// Aggregate outcome of a distribution batch. The endpoint always answers
/// 200 with this accounting; total failure shows up in the counts, never as
/// an HTTP error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendBatchResponse {
    pub message: String,
    pub total: usize,
    pub success: usize,
    pub failed: usize,
    pub errors: Vec<SendError>,
}
