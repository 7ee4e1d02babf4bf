//! Case updates: diagnosis notes, progress reports, success stories.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{CaseId, CaseUpdateId, UserId};

/// Kind of update posted against a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UpdateKind {
    /// Medical notes from the assigned doctor.
    Diagnosis,
    /// Treatment progress from the owning welfare.
    Progress,
    /// Outcome story from the owning welfare.
    SuccessStory,
}

/// An update attached to a case. Only published updates are public.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CaseUpdate {
    /// Update identifier.
    pub id: CaseUpdateId,
    /// Case the update belongs to.
    pub case_id: CaseId,
    /// Account that wrote it.
    pub author: UserId,
    /// Update kind.
    pub kind: UpdateKind,
    /// Headline.
    pub title: String,
    /// Body text.
    pub content: String,
    /// Attached images.
    pub images: Vec<String>,
    /// Public visibility gate.
    pub is_published: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}
