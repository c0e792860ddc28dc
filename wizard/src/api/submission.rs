// Lead submission endpoint client
//
// FormSubmitter is the seam between the wizard and the network: production
// code posts multipart over HTTP, tests plug in stubs.

use async_trait::async_trait;
use chrono::Utc;
use log::{error, info, warn};
use reqwest::multipart::{Form, Part};
use std::time::{Duration, Instant};
use thiserror::Error;
use url::Url;

use crate::models::requests::SubmissionPayload;
use crate::models::responses::SubmissionReceipt;
use crate::utils::config::WizardConfig;
use crate::utils::files::read_contents;

pub const CORRELATION_HEADER: &str = "X-Correlation-Id";

/// Shown to the user for any failed submission; they can edit and try again.
pub const GENERIC_SUBMIT_ERROR: &str =
    "Something went wrong sending your details. Please try again.";

/// A failed submission.
/// Keeps the user-facing message apart from internal details for the logs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{user_message}")]
pub struct SubmitError {
    /// Safe to show in the UI
    pub user_message: String,
    /// For logging only
    pub internal_details: String,
}

impl SubmitError {
    pub fn generic(internal_details: impl Into<String>) -> Self {
        Self {
            user_message: GENERIC_SUBMIT_ERROR.to_string(),
            internal_details: internal_details.into(),
        }
    }
}

/// Sends an assembled lead to the form endpoint. One attempt, no retries.
#[async_trait]
pub trait FormSubmitter: Send + Sync {
    async fn submit(
        &self,
        payload: &SubmissionPayload,
        correlation_id: &str,
    ) -> Result<SubmissionReceipt, SubmitError>;
}

/// Production submitter: multipart POST to the configured endpoint.
pub struct HttpSubmitter {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpSubmitter {
    pub fn new(endpoint: Url, request_timeout: Option<Duration>) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(t) = request_timeout {
            builder = builder.timeout(t);
        }
        Ok(Self {
            client: builder.build()?,
            endpoint,
        })
    }

    pub fn from_config(cfg: &WizardConfig) -> anyhow::Result<Self> {
        Self::new(cfg.endpoint_url.clone(), cfg.request_timeout)
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

async fn build_multipart(payload: &SubmissionPayload) -> Result<Form, SubmitError> {
    let mut form = Form::new();
    for field in &payload.text_fields {
        form = form.text(field.key, field.value.clone());
    }

    for part in &payload.file_parts {
        let bytes = read_contents(&part.file).await.map_err(|e| {
            SubmitError::generic(format!("Failed to read attachment {}: {}", part.file.name, e))
        })?;
        // The ceiling was checked against the size seen at attach time.
        if bytes.len() as u64 != part.file.size {
            return Err(SubmitError::generic(format!(
                "Attachment {} changed size since it was attached ({} -> {} bytes)",
                part.file.name,
                part.file.size,
                bytes.len()
            )));
        }
        let file_part = Part::bytes(bytes)
            .file_name(part.file.name.clone())
            .mime_str(&part.file.content_type)
            .map_err(|e| {
                SubmitError::generic(format!(
                    "Invalid content type {:?} for {}: {}",
                    part.file.content_type, part.file.name, e
                ))
            })?;
        form = form.part(part.key, file_part);
    }

    Ok(form)
}

#[async_trait]
impl FormSubmitter for HttpSubmitter {
    async fn submit(
        &self,
        payload: &SubmissionPayload,
        correlation_id: &str,
    ) -> Result<SubmissionReceipt, SubmitError> {
        let started = Instant::now();
        info!(
            "[PHASE: submission] [STEP: post] Posting lead (fields={}, files={}, attachments_omitted={}, correlation_id={})",
            payload.text_fields.len(),
            payload.file_parts.len(),
            payload.attachments_omitted,
            correlation_id
        );

        let form = build_multipart(payload).await?;

        let resp = self
            .client
            .post(self.endpoint.clone())
            .header(CORRELATION_HEADER, correlation_id)
            .header(reqwest::header::ACCEPT, "application/json")
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                error!(
                    "[PHASE: submission] [STEP: post] Transport error: {} (correlation_id={})",
                    e, correlation_id
                );
                SubmitError::generic(format!("Transport error: {}", e))
            })?;

        let status = resp.status();
        if !status.is_success() {
            warn!(
                "[PHASE: submission] [STEP: post] Endpoint rejected lead: HTTP {} (duration_ms={}, correlation_id={})",
                status,
                started.elapsed().as_millis(),
                correlation_id
            );
            return Err(SubmitError::generic(format!("HTTP {}", status)));
        }

        info!(
            "[PHASE: submission] [STEP: post] Lead accepted: HTTP {} (duration_ms={}, correlation_id={})",
            status,
            started.elapsed().as_millis(),
            correlation_id
        );
        Ok(SubmissionReceipt {
            status: status.as_u16(),
            correlation_id: correlation_id.to_string(),
            received_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::form::FormData;
    use crate::models::industry::Industry;
    use crate::models::requests::DEFAULT_UPLOAD_CEILING_BYTES;
    use crate::models::uploads::{AttachedFile, UploadField};
    use wiremock::matchers::{header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn lead() -> FormData {
        FormData {
            business_name: "Paws & Co".into(),
            contact_name: "Riley".into(),
            industry: Some(Industry::Other),
            other_industry: "Dog Grooming".into(),
            city: "Wellington".into(),
            email: "riley@paws.co.nz".into(),
            phone: "021 555 0199".into(),
            ..FormData::default()
        }
    }

    fn submitter_for(server: &MockServer) -> HttpSubmitter {
        let url = Url::parse(&format!("{}/leads", server.uri())).expect("mock url");
        HttpSubmitter::new(url, Some(Duration::from_secs(5))).expect("client")
    }

    #[tokio::test]
    async fn posts_multipart_with_text_and_files() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/leads"))
            .and(header_exists("x-correlation-id"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let mut form = lead();
        form.uploads.add(
            UploadField::GalleryPhotos,
            vec![
                AttachedFile::in_memory("one.jpg", "image/jpeg", b"JPEG-ONE".to_vec()),
                AttachedFile::in_memory("two.jpg", "image/jpeg", b"JPEG-TWO".to_vec()),
            ],
        );
        let payload = SubmissionPayload::assemble(&form, DEFAULT_UPLOAD_CEILING_BYTES);

        let receipt = submitter_for(&server)
            .submit(&payload, "abc123")
            .await
            .expect("accepted");
        assert_eq!(receipt.status, 200);
        assert_eq!(receipt.correlation_id, "abc123");

        let requests = server.received_requests().await.expect("recorded requests");
        let body = String::from_utf8_lossy(&requests[0].body).to_string();
        assert!(body.contains("name=\"industry\""), "{}", body);
        assert!(body.contains("Dog Grooming"));
        assert!(body.contains("name=\"websiteGoals\""));
        assert_eq!(body.matches("name=\"galleryPhotos\"").count(), 2);
        assert!(body.contains("filename=\"two.jpg\""));
        assert!(body.contains("JPEG-TWO"));
    }

    #[tokio::test]
    async fn non_success_status_is_a_generic_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let payload = SubmissionPayload::assemble(&lead(), DEFAULT_UPLOAD_CEILING_BYTES);
        let err = submitter_for(&server)
            .submit(&payload, "c1")
            .await
            .expect_err("rejected");
        assert_eq!(err.user_message, GENERIC_SUBMIT_ERROR);
        assert!(err.internal_details.contains("500"), "{}", err.internal_details);
    }

    #[tokio::test]
    async fn transport_failure_is_a_generic_error() {
        // Bind then drop a listener so the port is known to be closed.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
            listener.local_addr().expect("addr").port()
        };
        let url = Url::parse(&format!("http://127.0.0.1:{}/leads", port)).expect("url");
        let submitter = HttpSubmitter::new(url, Some(Duration::from_secs(2))).expect("client");

        let payload = SubmissionPayload::assemble(&lead(), DEFAULT_UPLOAD_CEILING_BYTES);
        let err = submitter.submit(&payload, "c2").await.expect_err("no server");
        assert_eq!(err.to_string(), GENERIC_SUBMIT_ERROR);
        assert!(err.internal_details.starts_with("Transport error"));
    }

    #[tokio::test]
    async fn unreadable_attachment_fails_before_posting() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("logo.png");
        std::fs::write(&path, b"png").expect("write");
        let mut form = lead();
        form.uploads.add(
            UploadField::Logo,
            vec![crate::utils::files::attach_from_path(&path).expect("attach")],
        );
        std::fs::remove_file(&path).expect("remove");

        let payload = SubmissionPayload::assemble(&form, DEFAULT_UPLOAD_CEILING_BYTES);
        let err = submitter_for(&server)
            .submit(&payload, "c3")
            .await
            .expect_err("missing file");
        assert!(err.internal_details.contains("logo.png"));
    }

    #[tokio::test]
    async fn attachment_grown_after_attach_is_not_sent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("logo.png");
        std::fs::write(&path, b"png!").expect("write");
        let mut form = lead();
        form.uploads.add(
            UploadField::Logo,
            vec![crate::utils::files::attach_from_path(&path).expect("attach")],
        );

        // Grows past the ceiling after the size was recorded.
        let grown = vec![0u8; (DEFAULT_UPLOAD_CEILING_BYTES + 1) as usize];
        std::fs::write(&path, grown).expect("rewrite");

        let payload = SubmissionPayload::assemble(&form, DEFAULT_UPLOAD_CEILING_BYTES);
        assert_eq!(payload.file_parts.len(), 1);

        let err = submitter_for(&server)
            .submit(&payload, "c4")
            .await
            .expect_err("size changed");
        assert!(err.internal_details.contains("logo.png"));
        assert!(err.internal_details.contains("changed size"));
        assert_eq!(err.user_message, GENERIC_SUBMIT_ERROR);
    }
}
