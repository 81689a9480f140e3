//! Remote API types
//!
//! Values owned by the remote service plus the DTOs exchanged with it.

use serde::{Deserialize, Serialize};

use crate::core::reconcile::{EntryUpdate, MutationBatch};
use crate::core::record::AnswerRecord;

// ============== Slices ==============

/// Which copy of the knowledge base an operation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Slice {
    /// Editable test copy
    #[default]
    Test,
    /// Published copy
    Production,
}

impl Slice {
    pub fn from_production_flag(production: bool) -> Self {
        if production {
            Slice::Production
        } else {
            Slice::Test
        }
    }

    /// Environment segment used by the download endpoint
    pub fn environment(&self) -> &'static str {
        match self {
            Slice::Test => "Test",
            Slice::Production => "Prod",
        }
    }

    pub fn is_test(&self) -> bool {
        matches!(self, Slice::Test)
    }
}

impl std::fmt::Display for Slice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Slice::Test => write!(f, "test"),
            Slice::Production => write!(f, "production"),
        }
    }
}

// ============== Operations ==============

/// State of a long-running operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationState {
    NotStarted,
    Running,
    Succeeded,
    Failed,
}

impl OperationState {
    /// True while the service is still working on the operation
    pub fn is_pending(&self) -> bool {
        matches!(self, OperationState::NotStarted | OperationState::Running)
    }
}

impl std::fmt::Display for OperationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationState::NotStarted => write!(f, "NotStarted"),
            OperationState::Running => write!(f, "Running"),
            OperationState::Succeeded => write!(f, "Succeeded"),
            OperationState::Failed => write!(f, "Failed"),
        }
    }
}

/// Handle returned by every mutating call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationHandle {
    pub operation_id: String,
    pub state: OperationState,
    pub resource_location: Option<String>,
    pub error_detail: Option<String>,
}

impl OperationHandle {
    pub fn new(operation_id: impl Into<String>, state: OperationState) -> Self {
        Self {
            operation_id: operation_id.into(),
            state,
            resource_location: None,
            error_detail: None,
        }
    }
}

/// Operation as returned by the authoring API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationDto {
    pub operation_id: String,
    pub operation_state: OperationState,
    #[serde(default)]
    pub resource_location: Option<String>,
    #[serde(default)]
    pub error_response: Option<ErrorResponse>,
}

impl From<OperationDto> for OperationHandle {
    fn from(dto: OperationDto) -> Self {
        Self {
            operation_id: dto.operation_id,
            state: dto.operation_state,
            resource_location: dto.resource_location,
            error_detail: dto.error_response.map(|e| e.to_string()),
        }
    }
}

/// Error envelope used by both APIs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl std::fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = self.error.code.as_deref().unwrap_or("Unknown");
        match &self.error.message {
            Some(message) => write!(f, "{}: {}", code, message),
            None => write!(f, "{}", code),
        }
    }
}

// ============== Knowledge base entries ==============

/// Metadata pair attached to an entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataDto {
    pub name: String,
    pub value: String,
}

/// Entry as stored by the remote knowledge base
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteEntry {
    pub id: i32,
    pub answer: String,
    #[serde(default)]
    pub questions: Vec<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub metadata: Vec<MetadataDto>,
}

/// Response from the download endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QnaDocumentsDto {
    pub qna_documents: Vec<RemoteEntry>,
}

/// New entry on the wire (`qnaList` item)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QnaDto {
    pub id: i32,
    pub answer: String,
    pub questions: Vec<String>,
    pub source: String,
    pub metadata: Vec<MetadataDto>,
}

/// Source tag for entries authored by this tool
pub const EDITORIAL_SOURCE: &str = "Editorial";

impl From<&AnswerRecord> for QnaDto {
    fn from(record: &AnswerRecord) -> Self {
        Self {
            id: 0,
            answer: record.answer.clone(),
            questions: record.questions.clone(),
            source: EDITORIAL_SOURCE.to_string(),
            metadata: Vec::new(),
        }
    }
}

/// Request to create a knowledge base
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateKbRequest {
    pub name: String,
    pub qna_list: Vec<QnaDto>,
}

// ============== Update batch ==============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddSection {
    pub qna_list: Vec<QnaDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionsDelta {
    pub add: Vec<String>,
    pub delete: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateQnaDto {
    pub id: i32,
    pub answer: String,
    pub questions: QuestionsDelta,
}

impl From<&EntryUpdate> for UpdateQnaDto {
    fn from(update: &EntryUpdate) -> Self {
        Self {
            id: update.id,
            answer: update.answer.clone(),
            questions: QuestionsDelta {
                add: update.add_questions.clone(),
                delete: update.remove_questions.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSection {
    pub qna_list: Vec<UpdateQnaDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteSection {
    pub ids: Vec<i32>,
}

/// PATCH body; empty groups are left out entirely
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateKbRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add: Option<AddSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update: Option<UpdateSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<DeleteSection>,
}

impl From<&MutationBatch> for UpdateKbRequest {
    fn from(batch: &MutationBatch) -> Self {
        Self {
            add: (!batch.additions.is_empty()).then(|| AddSection {
                qna_list: batch.additions.iter().map(QnaDto::from).collect(),
            }),
            update: (!batch.updates.is_empty()).then(|| UpdateSection {
                qna_list: batch.updates.iter().map(UpdateQnaDto::from).collect(),
            }),
            delete: (!batch.deletions.is_empty()).then(|| DeleteSection {
                ids: batch.deletions.clone(),
            }),
        }
    }
}

// ============== Endpoint keys ==============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointKeysDto {
    pub primary_endpoint_key: String,
    #[serde(default)]
    pub secondary_endpoint_key: Option<String>,
}

// ============== Query ==============

/// generateAnswer request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub question: String,
    pub top: usize,
    pub is_test: bool,
}

/// Ranked answer from a query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: i32,
    pub answer: String,
    #[serde(default)]
    pub questions: Vec<String>,
    #[serde(default)]
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub answers: Vec<Candidate>,
}

// ============== Training ==============

/// One question→answer reinforcement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRecord {
    pub user_id: String,
    pub user_question: String,
    pub qna_id: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRecordsDto {
    pub feedback_records: Vec<FeedbackRecord>,
}
