//! Step payloads accepted by the engine and the records it hands back.
//!
//! Payload types mirror the JSON bodies of the wizard steps. Record types
//! mirror stored rows and are what the aggregate view is built from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::{RequestStatus, Workflow};

/// Root row of one workflow instance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestRecord {
    pub id: i64,
    pub workflow: Workflow,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Identity and status only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestSummary {
    pub id: i64,
    pub status: RequestStatus,
}

impl From<&RequestRecord> for RequestSummary {
    fn from(record: &RequestRecord) -> Self {
        Self {
            id: record.id,
            status: record.status,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    #[serde(default)]
    pub length: Option<String>,
    #[serde(default)]
    pub width: Option<String>,
    #[serde(default)]
    pub height: Option<String>,
}

/// Body of the product step. Every save replaces the whole row, so an
/// omitted field is stored as null rather than keeping an older value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductDetailsPayload {
    pub eut_name: Option<String>,
    pub eut_quantity: Option<String>,
    pub manufacturer: Option<String>,
    pub model_no: Option<String>,
    pub serial_no: Option<String>,
    pub supply_voltage: Option<String>,
    pub operating_frequency: Option<String>,
    pub current: Option<String>,
    pub weight: Option<String>,
    pub dimensions: Option<Dimensions>,
    pub power_ports: Option<String>,
    pub signal_lines: Option<String>,
    pub software_name: Option<String>,
    pub software_version: Option<String>,
    pub industry: Vec<String>,
    pub industry_other: Option<String>,
    pub preferred_date: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDetails {
    pub id: i64,
    pub eut_name: Option<String>,
    pub eut_quantity: Option<String>,
    pub manufacturer: Option<String>,
    pub model_no: Option<String>,
    pub serial_no: Option<String>,
    pub supply_voltage: Option<String>,
    pub operating_frequency: Option<String>,
    pub current: Option<String>,
    pub weight: Option<String>,
    pub length_mm: Option<String>,
    pub width_mm: Option<String>,
    pub height_mm: Option<String>,
    pub power_ports: Option<String>,
    pub signal_lines: Option<String>,
    pub software_name: Option<String>,
    pub software_version: Option<String>,
    pub industry: Vec<String>,
    pub industry_other: Option<String>,
    pub preferred_date: Option<String>,
    pub notes: Option<String>,
}

/// Body of the certification details step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificationDetailsPayload {
    pub target_region: String,
    pub product_name: String,
    pub product_category: String,
    #[serde(default)]
    pub standards: Vec<String>,
    pub estimated_fee_range: String,
    #[serde(default)]
    pub additional_notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificationDetails {
    pub id: i64,
    pub target_region: String,
    pub product_name: String,
    pub product_category: String,
    pub standards: Vec<String>,
    pub estimated_fee_range: String,
    pub additional_notes: Option<String>,
}

/// One entry of the JSON documents step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub doc_type: String,
    pub file_name: String,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub file_size: Option<i64>,
}

/// The documents step accepts `{"documents": [...]}` or a bare list
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DocumentsPayload {
    Wrapped { documents: Vec<DocumentMetadata> },
    List(Vec<DocumentMetadata>),
}

impl DocumentsPayload {
    pub fn into_documents(self) -> Vec<DocumentMetadata> {
        match self {
            DocumentsPayload::Wrapped { documents } => documents,
            DocumentsPayload::List(documents) => documents,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalDocument {
    pub id: i64,
    pub doc_type: String,
    pub file_name: String,
    pub file_path: Option<String>,
    pub file_size: i64,
    pub display_order: i64,
    pub uploaded_at: DateTime<Utc>,
}

/// A file received by the upload step, before it is written to disk
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedFile {
    pub file_name: String,
    pub content: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementsPayload {
    pub test_type: String,
    #[serde(default)]
    pub selected_tests: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Requirements {
    pub id: i64,
    pub test_type: String,
    pub selected_tests: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StandardsPayload {
    #[serde(default)]
    pub regions: Vec<String>,
    #[serde(default)]
    pub standards: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standards {
    pub id: i64,
    pub regions: Vec<String>,
    pub standards: Vec<String>,
}

/// Lab location filter chosen in the lab-selection step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

impl Region {
    /// A region with no non-blank component carries no information
    pub fn is_blank(&self) -> bool {
        [&self.country, &self.state, &self.city]
            .into_iter()
            .all(|part| part.as_deref().map_or(true, |value| value.trim().is_empty()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabSelectionPayload {
    pub selected_labs: Vec<String>,
    #[serde(default)]
    pub region: Option<Region>,
    #[serde(default)]
    pub remarks: Option<String>,
}

impl LabSelectionPayload {
    /// The region to write, or `None` when the stored one must be kept
    pub fn effective_region(&self) -> Option<&Region> {
        self.region.as_ref().filter(|region| !region.is_blank())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabSelection {
    pub id: i64,
    pub selected_labs: Vec<String>,
    pub region: Option<Region>,
    pub remarks: Option<String>,
}

/// Request header inside the aggregate view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestHeader {
    pub id: i64,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Nested read model of one request and every child row it owns
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FullRequest {
    pub workflow: Workflow,
    pub request: RequestHeader,
    pub product: Option<ProductDetails>,
    pub details: Option<CertificationDetails>,
    pub requirements: Option<Requirements>,
    pub standards: Option<Standards>,
    pub lab: Option<LabSelection>,
    pub documents: Vec<TechnicalDocument>,
}

/// Newest draft of a workflow, as returned by the draft lookup
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DraftView {
    pub id: i64,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub details: Option<CertificationDetails>,
}

/// Outcome of one retention pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RetentionReport {
    pub deleted: u64,
    pub files_removed: u64,
    pub file_failures: u64,
}
