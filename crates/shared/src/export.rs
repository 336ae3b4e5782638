use serde::{Deserialize, Serialize};

use crate::domain::{CompanyInfo, ControlArea, ControlStatus};

/// Placeholder written in place of empty evidence notes.
pub const EMPTY_NOTES_PLACEHOLDER: &str = "—";

/// Downloadable evidence pack handed to an assessor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredExport {
    pub exported_at: String,
    pub company: CompanyInfo,
    pub readiness_summary: String,
    pub controls: Vec<ExportedControl>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedControl {
    pub area: ControlArea,
    pub control: String,
    pub status: ControlStatus,
    pub notes: String,
}
