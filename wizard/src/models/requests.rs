// Outgoing submission payload
// Assembled from FormData as a pure step; the HTTP layer turns it into multipart.

use serde::Serialize;

use super::form::FormData;
use super::uploads::AttachedFile;

/// Aggregate attachment size above which files are left out of the submission.
pub const DEFAULT_UPLOAD_CEILING_BYTES: u64 = 8 * 1024 * 1024;

/// Textual part names, in the order they are sent.
pub const TEXT_FIELD_KEYS: [&str; 14] = [
    "businessName",
    "contactName",
    "industry",
    "otherIndustry",
    "city",
    "email",
    "phone",
    "services",
    "websiteStatus",
    "existingUrl",
    "differentiators",
    "websiteGoals",
    "additionalNotes",
    "hearAboutUs",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextField {
    pub key: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub key: &'static str,
    pub file: AttachedFile,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionPayload {
    pub text_fields: Vec<TextField>,
    pub file_parts: Vec<FilePart>,
    /// Aggregate size of everything attached at assembly time.
    pub total_upload_bytes: u64,
    /// True when files were attached but left out for exceeding the ceiling.
    pub attachments_omitted: bool,
}

impl SubmissionPayload {
    /// Build the payload for `form`. Attachments are included only when their
    /// combined size is at or below `ceiling_bytes`.
    pub fn assemble(form: &FormData, ceiling_bytes: u64) -> Self {
        let values: [String; 14] = [
            form.business_name.trim().to_string(),
            form.contact_name.trim().to_string(),
            form.effective_industry(),
            form.other_industry.trim().to_string(),
            form.city.trim().to_string(),
            form.email.trim().to_string(),
            form.phone.trim().to_string(),
            form.services.trim().to_string(),
            form.website_status
                .map(|s| s.as_str().to_string())
                .unwrap_or_default(),
            form.effective_existing_url().to_string(),
            form.differentiators.trim().to_string(),
            form.goals_joined(),
            form.additional_notes.trim().to_string(),
            form.hear_about_us
                .map(|r| r.label().to_string())
                .unwrap_or_default(),
        ];

        let text_fields = TEXT_FIELD_KEYS
            .into_iter()
            .zip(values)
            .map(|(key, value)| TextField { key, value })
            .collect();

        let total_upload_bytes = form.uploads.total_size();
        let within_ceiling = total_upload_bytes <= ceiling_bytes;
        let file_parts = if within_ceiling {
            form.uploads
                .iter_parts()
                .map(|(key, file)| FilePart {
                    key,
                    file: file.clone(),
                })
                .collect()
        } else {
            Vec::new()
        };

        Self {
            text_fields,
            file_parts,
            total_upload_bytes,
            attachments_omitted: !within_ceiling && form.uploads.file_count() > 0,
        }
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.text_fields
            .iter()
            .find(|f| f.key == key)
            .map(|f| f.value.as_str())
    }
}
