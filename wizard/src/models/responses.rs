// Submission results
// What the endpoint told us, and what the success screen shows.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::form::FormData;

/// Accepted response from the form endpoint. Only the status is consumed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub status: u16,
    pub correlation_id: String,
    pub received_at: DateTime<Utc>,
}

/// Read-only data for the Success step.
#[derive(Debug, Clone)]
pub struct SuccessSummary {
    /// Final form snapshot, frozen at submission time.
    pub snapshot: FormData,
    pub receipt: SubmissionReceipt,
    /// Present when attachments were left out for exceeding the ceiling.
    pub oversize_notice: Option<String>,
}

impl SuccessSummary {
    pub fn business_name(&self) -> &str {
        self.snapshot.business_name.trim()
    }

    pub fn industry(&self) -> String {
        self.snapshot.effective_industry()
    }

    pub fn city(&self) -> &str {
        self.snapshot.city.trim()
    }

    pub fn email(&self) -> &str {
        self.snapshot.email.trim()
    }

    pub fn attachments_omitted(&self) -> bool {
        self.oversize_notice.is_some()
    }
}

pub fn oversize_notice(support_email: &str) -> String {
    format!(
        "Your files were too large to send with the form, so we only received your details. \
         Please email your logo, photos and documents to {} instead.",
        support_email
    )
}
