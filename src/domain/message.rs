//! Inbox messages. Written as a side effect of workflow transitions and
//! never used to drive other records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{CaseId, MessageId, UserId};

/// A notification sitting in a user's inbox.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Message {
    /// Message identifier.
    pub id: MessageId,
    /// Sender account.
    pub from: UserId,
    /// Recipient account.
    pub to: UserId,
    /// Subject line.
    pub title: String,
    /// Body text.
    pub content: String,
    /// Case the message is about, if any.
    pub related_case: Option<CaseId>,
    /// Whether the recipient has opened it.
    pub is_read: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Message about to be delivered.
#[derive(Debug, Clone)]
pub struct Notice {
    /// Sender account.
    pub from: UserId,
    /// Recipient account.
    pub to: UserId,
    /// Subject line.
    pub title: String,
    /// Body text.
    pub content: String,
    /// Case the message is about, if any.
    pub related_case: Option<CaseId>,
}

impl Notice {
    /// Creates a notice with no related case.
    #[must_use]
    pub fn new(from: UserId, to: UserId, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            from,
            to,
            title: title.into(),
            content: content.into(),
            related_case: None,
        }
    }

    /// Attaches a related case.
    #[must_use]
    pub fn about(mut self, case_id: CaseId) -> Self {
        self.related_case = Some(case_id);
        self
    }

    /// Turns the notice into a stored message.
    #[must_use]
    pub fn into_message(self) -> Message {
        Message {
            id: MessageId::new(),
            from: self.from,
            to: self.to,
            title: self.title,
            content: self.content,
            related_case: self.related_case,
            is_read: false,
            created_at: Utc::now(),
        }
    }
}
