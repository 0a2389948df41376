use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category of academic deliverable. Closed set: an unrecognized value is a
/// hard error, never defaulted to `Assignment`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum WorkType {
    Assignment,
    Presentation,
    Thesis,
    Report,
    Project,
    WritingNotes,
}

impl WorkType {
    pub const ALL: [WorkType; 6] = [
        WorkType::Assignment,
        WorkType::Presentation,
        WorkType::Thesis,
        WorkType::Report,
        WorkType::Project,
        WorkType::WritingNotes,
    ];

    /// Wire/form value, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkType::Assignment => "assignment",
            WorkType::Presentation => "presentation",
            WorkType::Thesis => "thesis",
            WorkType::Report => "report",
            WorkType::Project => "project",
            WorkType::WritingNotes => "writing_notes",
        }
    }

    /// True for the work types priced per written page rather than by a flat
    /// base fee.
    pub fn is_writing_work(&self) -> bool {
        matches!(self, WorkType::Assignment | WorkType::WritingNotes)
    }
}

impl fmt::Display for WorkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkType {
    type Err = UnknownWorkType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "assignment" => Ok(WorkType::Assignment),
            "presentation" => Ok(WorkType::Presentation),
            "thesis" => Ok(WorkType::Thesis),
            "report" => Ok(WorkType::Report),
            "project" => Ok(WorkType::Project),
            "writing_notes" => Ok(WorkType::WritingNotes),
            other => Err(UnknownWorkType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("Unknown work type: {0}")]
pub struct UnknownWorkType(pub String);

/// Fulfillment mode for the finished work.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryType {
    SoftCopy,
    Printed,
    PrintedSpiral,
    Handwritten,
}

impl DeliveryType {
    /// Human-facing label shown on the order summary.
    pub fn label(&self) -> &'static str {
        match self {
            DeliveryType::SoftCopy => "Soft Copy Only",
            DeliveryType::Printed => "Printed Document",
            DeliveryType::PrintedSpiral => "Printed & Spiral Bound",
            DeliveryType::Handwritten => "Handwritten",
        }
    }
}

/// A customer's academic-writing job as captured by intake.
///
/// Profile fields (name, contact, department) are carried for the backend and
/// gateway metadata but never priced. Immutable once submitted for pricing
/// except by returning the session to Drafting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkRequest {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub department: String,
    pub level: String,
    pub course_of_study: String,
    pub work_type: WorkType,
    pub deadline: DateTime<Utc>,
    pub notes: String,
    /// Uploaded attachment names. Opaque to pricing.
    pub files: Vec<String>,
    pub page_count: u32,
    pub diagram_count: u32,
    pub delivery_type: DeliveryType,
}

impl WorkRequest {
    /// Local field-level validation. No network, field-scoped messages.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = Vec::new();

        if self.full_name.trim().is_empty() {
            errors.push(FieldError::new("full_name", "Full name is required"));
        }
        if self.email.trim().is_empty() {
            errors.push(FieldError::new("email", "Email is required"));
        } else if !is_plausible_email(&self.email) {
            errors.push(FieldError::new("email", "Email is invalid"));
        }
        if self.phone.trim().is_empty() {
            errors.push(FieldError::new("phone", "Phone number is required"));
        }
        if self.page_count < 1 {
            errors.push(FieldError::new("page_count", "Page count must be at least 1"));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(errors))
        }
    }
}

// Same shape check the intake form applies: something@something.something.
fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

/// A single field that failed local validation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("{} field(s) failed validation", .0.len())]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|e| e.field.as_str())
    }
}
