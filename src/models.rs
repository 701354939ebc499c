use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::DateTime;
use serde::{Deserialize, Serialize};

use crate::error::{FeedbackError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: i64,
    pub name: String,
    pub number: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluator {
    pub name: String,
    pub number: i64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[cfg(test)]
impl Evaluator {
    pub fn new(name: impl Into<String>, number: i64) -> Self {
        Self {
            name: name.into(),
            number,
            extra: serde_json::Map::new(),
        }
    }
}

/// One evaluator's ratings for a set of employees, as received from the form.
///
/// Fields the form sends beyond the known ones are carried in `extra` (here and
/// on the evaluator), and `reasons` stays absent when it was not sent, so the
/// structured record is written back exactly as submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackSubmission {
    pub evaluator: Evaluator,
    pub ratings: BTreeMap<String, i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasons: Option<BTreeMap<String, String>>,
    pub completed_at: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl FeedbackSubmission {
    pub fn validate(&self) -> Result<()> {
        let name = &self.evaluator.name;
        if name.trim().is_empty() {
            return Err(FeedbackError::InvalidSubmission(
                "evaluator name must not be blank".to_string(),
            ));
        }
        if name.contains(['/', '\\', '\0']) {
            return Err(FeedbackError::InvalidSubmission(format!(
                "evaluator name '{}' cannot be used in a filename",
                name.escape_default()
            )));
        }

        DateTime::parse_from_rfc3339(&self.completed_at).map_err(|err| {
            FeedbackError::InvalidSubmission(format!(
                "completedAt '{}' is not an ISO-8601 timestamp: {err}",
                self.completed_at
            ))
        })?;

        Ok(())
    }

    /// The reason text for an employee, treating an empty string as absent.
    pub fn reason_for(&self, employee_key: &str) -> Option<&str> {
        self.reasons
            .as_ref()?
            .get(employee_key)
            .map(String::as_str)
            .filter(|reason| !reason.is_empty())
    }
}

/// A persisted record as returned by the admin listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredFeedback {
    pub filename: String,
    pub data: FeedbackSubmission,
}

/// Where a submission landed on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecordHandle {
    pub base_name: String,
    pub json_path: PathBuf,
    pub csv_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub message: String,
}

impl SubmitResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}
