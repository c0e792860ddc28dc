//! Lead capture wizard: step sequencing, per-step validation, upload edits
//! and the single terminal submission.
//!
//! All transitions are synchronous and pure with respect to the network.
//! Submission is split in two: [`LeadWizard::advance`] (from Uploads) or
//! [`LeadWizard::skip_to_submit`] hand back a [`PendingSubmission`], the
//! caller performs the POST, and [`LeadWizard::finish_submission`] applies
//! the result. [`LeadWizard::submit`] does all three for async callers.

mod step;

pub use step::Step;

use log::{info, warn};
use thiserror::Error;
use uuid::Uuid;

use crate::api::submission::{FormSubmitter, SubmitError};
use crate::models::form::FormData;
use crate::models::industry::industry_from_trade_name;
use crate::models::requests::SubmissionPayload;
use crate::models::responses::{oversize_notice, SubmissionReceipt, SuccessSummary};
use crate::models::uploads::{AttachedFile, UploadField};
use crate::utils::config::WizardConfig;
use crate::utils::logging::{mask_email, mask_phone};
use crate::utils::validation::{validate_contact, validate_identity, PhonePolicy, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WizardError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Submission(#[from] SubmitError),
    #[error("Your details are still being sent.")]
    Busy,
    #[error("Your request has already been sent.")]
    Finished,
    #[error("Submitting is not available from the {0} step.")]
    CannotSubmitFrom(Step),
    #[error("No submission is in progress.")]
    NotSubmitting,
}

/// Result of a forward move.
#[derive(Debug)]
pub enum Transition {
    Moved(Step),
    /// Leaving Uploads: the caller must send this and report back.
    SubmitRequested(PendingSubmission),
}

/// A submission that has been started but not yet resolved.
#[derive(Debug, Clone)]
pub struct PendingSubmission {
    pub payload: SubmissionPayload,
    pub correlation_id: String,
    pub origin: Step,
}

#[derive(Debug, Clone)]
struct InFlight {
    origin: Step,
    attachments_omitted: bool,
}

#[derive(Debug)]
pub struct LeadWizard {
    step: Step,
    form: FormData,
    error: Option<String>,
    in_flight: Option<InFlight>,
    success: Option<SuccessSummary>,
    last_prefill: Option<String>,

    phone_policy: PhonePolicy,
    upload_ceiling_bytes: u64,
    support_email: String,
}

impl LeadWizard {
    pub fn new(cfg: &WizardConfig) -> Self {
        Self {
            step: Step::Identity,
            form: FormData::default(),
            error: None,
            in_flight: None,
            success: None,
            last_prefill: None,
            phone_policy: cfg.phone_policy,
            upload_ceiling_bytes: cfg.upload_ceiling_bytes,
            support_email: cfg.support_email.clone(),
        }
    }

    /// New wizard with an externally supplied trade name applied.
    pub fn with_prefill(cfg: &WizardConfig, trade_name: Option<&str>) -> Self {
        let mut wizard = Self::new(cfg);
        wizard.apply_prefill(trade_name);
        wizard
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn form(&self) -> &FormData {
        &self.form
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn success(&self) -> Option<&SuccessSummary> {
        self.success.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.step == Step::Success
    }

    pub fn upload_ceiling_bytes(&self) -> u64 {
        self.upload_ceiling_bytes
    }

    /// Aggregate size of every attached file, computed from the lists.
    pub fn total_upload_bytes(&self) -> u64 {
        self.form.uploads.total_size()
    }

    pub fn exceeds_upload_ceiling(&self) -> bool {
        self.total_upload_bytes() > self.upload_ceiling_bytes
    }

    fn is_locked(&self) -> bool {
        self.in_flight.is_some() || self.step == Step::Success
    }

    /// Apply a field edit. Clears the error slot. Ignored (returns false)
    /// while submitting or after success.
    pub fn edit<F>(&mut self, apply: F) -> bool
    where
        F: FnOnce(&mut FormData),
    {
        if self.is_locked() {
            return false;
        }
        apply(&mut self.form);
        self.error = None;
        true
    }

    pub fn attach(&mut self, field: UploadField, files: Vec<AttachedFile>) -> bool {
        if self.is_locked() {
            return false;
        }
        let incoming = files.len();
        self.form.uploads.add(field, files);
        self.error = None;
        info!(
            "[PHASE: uploads] [STEP: attach] field={} incoming={} now={} total_bytes={}",
            field.form_key(),
            incoming,
            self.form.uploads.files(field).len(),
            self.total_upload_bytes()
        );
        true
    }

    pub fn remove_attachment(&mut self, field: UploadField, index: usize) -> Option<AttachedFile> {
        if self.is_locked() {
            return None;
        }
        let removed = self.form.uploads.remove(field, index);
        if removed.is_some() {
            self.error = None;
        }
        removed
    }

    pub fn clear_attachments(&mut self, field: UploadField) -> bool {
        if self.is_locked() {
            return false;
        }
        self.form.uploads.clear(field);
        self.error = None;
        true
    }

    /// Apply an externally supplied trade name (e.g. from the industry
    /// carousel). Only a changed value is applied; it overwrites the industry
    /// when it maps to a known one. Returns true when the industry changed.
    pub fn apply_prefill(&mut self, trade_name: Option<&str>) -> bool {
        let incoming = trade_name.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        if incoming == self.last_prefill {
            return false;
        }
        // A value that arrives while the form is locked stays pending.
        if self.is_locked() {
            return false;
        }
        self.last_prefill = incoming.clone();

        let Some(name) = incoming else {
            return false;
        };
        match industry_from_trade_name(&name) {
            Some(industry) => {
                info!(
                    "[PHASE: wizard] [STEP: prefill] Industry prefilled from {:?} -> {}",
                    name,
                    industry.as_str()
                );
                self.form.industry = Some(industry);
                true
            }
            None => {
                warn!(
                    "[PHASE: wizard] [STEP: prefill] Unknown trade name {:?}; industry left unchanged",
                    name
                );
                false
            }
        }
    }

    fn validate_current(&self) -> Result<(), ValidationError> {
        match self.step {
            Step::Identity => validate_identity(&self.form),
            Step::Contact => validate_contact(&self.form, self.phone_policy),
            Step::Details | Step::Uploads | Step::Success => Ok(()),
        }
    }

    /// Move forward after validating the active step. From Uploads this
    /// starts the submission instead.
    pub fn advance(&mut self) -> Result<Transition, WizardError> {
        if self.in_flight.is_some() {
            return Err(WizardError::Busy);
        }
        if self.step == Step::Success {
            return Err(WizardError::Finished);
        }

        if let Err(e) = self.validate_current() {
            info!(
                "[PHASE: wizard] [STEP: {}] Validation failed: {:?}",
                self.step, e
            );
            self.error = Some(e.to_string());
            return Err(e.into());
        }

        match self.step.next() {
            Some(next) => {
                self.step = next;
                self.error = None;
                info!("[PHASE: wizard] [STEP: {}] Advanced", next);
                Ok(Transition::Moved(next))
            }
            None => self.begin_submission().map(Transition::SubmitRequested),
        }
    }

    /// Go back one step. Never validates. No-op on Identity, Success, or
    /// while submitting.
    pub fn retreat(&mut self) -> bool {
        if self.in_flight.is_some() {
            return false;
        }
        match self.step.prev() {
            Some(prev) => {
                self.step = prev;
                self.error = None;
                info!("[PHASE: wizard] [STEP: {}] Went back", prev);
                true
            }
            None => false,
        }
    }

    /// Submit from Details or Uploads without visiting the remaining steps.
    pub fn skip_to_submit(&mut self) -> Result<PendingSubmission, WizardError> {
        self.begin_submission()
    }

    fn begin_submission(&mut self) -> Result<PendingSubmission, WizardError> {
        if self.in_flight.is_some() {
            return Err(WizardError::Busy);
        }
        if self.step == Step::Success {
            return Err(WizardError::Finished);
        }
        if !self.step.can_submit() {
            return Err(WizardError::CannotSubmitFrom(self.step));
        }

        let payload = SubmissionPayload::assemble(&self.form, self.upload_ceiling_bytes);
        let correlation_id = Uuid::new_v4().simple().to_string();
        self.in_flight = Some(InFlight {
            origin: self.step,
            attachments_omitted: payload.attachments_omitted,
        });
        self.error = None;

        info!(
            "[PHASE: submission] [STEP: begin] Submitting from {} (email={}, phone={}, upload_bytes={}, attachments_omitted={}, correlation_id={})",
            self.step,
            mask_email(&self.form.email),
            mask_phone(&self.form.phone),
            payload.total_upload_bytes,
            payload.attachments_omitted,
            correlation_id
        );

        Ok(PendingSubmission {
            payload,
            correlation_id,
            origin: self.step,
        })
    }

    /// Apply the outcome of a started submission. Failure leaves the wizard
    /// on the step it was submitted from, with a retryable message.
    pub fn finish_submission(
        &mut self,
        outcome: Result<SubmissionReceipt, SubmitError>,
    ) -> Result<&SuccessSummary, WizardError> {
        let Some(in_flight) = self.in_flight.take() else {
            return Err(WizardError::NotSubmitting);
        };

        match outcome {
            Ok(receipt) => {
                let oversize = in_flight
                    .attachments_omitted
                    .then(|| oversize_notice(&self.support_email));
                info!(
                    "[PHASE: submission] [STEP: complete] Lead accepted (status={}, correlation_id={})",
                    receipt.status, receipt.correlation_id
                );
                self.step = Step::Success;
                self.error = None;
                Ok(self.success.insert(SuccessSummary {
                    snapshot: self.form.clone(),
                    receipt,
                    oversize_notice: oversize,
                }))
            }
            Err(e) => {
                warn!(
                    "[PHASE: submission] [STEP: failed] {} (step={})",
                    e.internal_details, in_flight.origin
                );
                self.step = in_flight.origin;
                self.error = Some(e.user_message.clone());
                Err(WizardError::Submission(e))
            }
        }
    }

    /// Run the whole submission protocol from the current step.
    pub async fn submit(
        &mut self,
        submitter: &dyn FormSubmitter,
    ) -> Result<&SuccessSummary, WizardError> {
        let pending = self.begin_submission()?;
        let outcome = submitter
            .submit(&pending.payload, &pending.correlation_id)
            .await;
        self.finish_submission(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::industry::Industry;
    use crate::models::requests::DEFAULT_UPLOAD_CEILING_BYTES;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    // -------------------------------------------------------------------------
    // Stub submitters
    // -------------------------------------------------------------------------

    /// Accepts everything and remembers what it was sent.
    #[derive(Default)]
    struct AcceptingStub {
        calls: AtomicU32,
        last: Mutex<Option<SubmissionPayload>>,
    }

    #[async_trait]
    impl FormSubmitter for AcceptingStub {
        async fn submit(
            &self,
            payload: &SubmissionPayload,
            correlation_id: &str,
        ) -> Result<SubmissionReceipt, SubmitError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last.lock().unwrap() = Some(payload.clone());
            Ok(SubmissionReceipt {
                status: 200,
                correlation_id: correlation_id.to_string(),
                received_at: Utc::now(),
            })
        }
    }

    /// Fails the first `failures` calls with an HTTP 502, then accepts.
    struct FailThenAcceptStub {
        failures: u32,
        calls: AtomicU32,
    }

    impl FailThenAcceptStub {
        fn new(failures: u32) -> Self {
            Self {
                failures,
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl FormSubmitter for FailThenAcceptStub {
        async fn submit(
            &self,
            _payload: &SubmissionPayload,
            correlation_id: &str,
        ) -> Result<SubmissionReceipt, SubmitError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                return Err(SubmitError::generic("HTTP 502 Bad Gateway"));
            }
            Ok(SubmissionReceipt {
                status: 201,
                correlation_id: correlation_id.to_string(),
                received_at: Utc::now(),
            })
        }
    }

    // -------------------------------------------------------------------------
    // Helpers
    // -------------------------------------------------------------------------

    fn wizard() -> LeadWizard {
        LeadWizard::new(&WizardConfig::default())
    }

    fn fill_identity(w: &mut LeadWizard) {
        w.edit(|f| {
            f.business_name = "Apex Roofing".into();
            f.contact_name = "Sam".into();
            f.industry = Some(Industry::Roofer);
            f.city = "Austin, TX".into();
        });
    }

    fn fill_contact(w: &mut LeadWizard) {
        w.edit(|f| {
            f.email = "sam@apexroofing.com".into();
            f.phone = "(555) 123-4567".into();
        });
    }

    fn at_uploads() -> LeadWizard {
        let mut w = wizard();
        fill_identity(&mut w);
        w.advance().expect("identity");
        fill_contact(&mut w);
        w.advance().expect("contact");
        w.advance().expect("details");
        assert_eq!(w.step(), Step::Uploads);
        w
    }

    fn file_of(name: &str, size: u64) -> AttachedFile {
        AttachedFile::in_memory(name, "image/jpeg", vec![0u8; size as usize])
    }

    // -------------------------------------------------------------------------
    // Step transitions
    // -------------------------------------------------------------------------

    #[test]
    fn starts_empty_on_identity() {
        let w = wizard();
        assert_eq!(w.step(), Step::Identity);
        assert!(w.error().is_none());
        assert!(w.form().business_name.is_empty());
        assert!(w.form().industry.is_none());
        assert_eq!(w.total_upload_bytes(), 0);
    }

    #[test]
    fn identity_blocks_on_each_missing_field() {
        let blanks: [fn(&mut FormData); 5] = [
            |f: &mut FormData| f.business_name.clear(),
            |f: &mut FormData| f.contact_name = "  ".into(),
            |f: &mut FormData| f.industry = None,
            |f: &mut FormData| f.city.clear(),
            |f: &mut FormData| {
                f.industry = Some(Industry::Other);
                f.other_industry.clear();
            },
        ];

        for blank in blanks {
            let mut w = wizard();
            fill_identity(&mut w);
            w.edit(blank);

            let err = w.advance().expect_err("should block");
            assert!(matches!(err, WizardError::Validation(_)), "{:?}", err);
            assert_eq!(w.step(), Step::Identity);
            assert_eq!(w.error(), Some(err.to_string().as_str()));
        }
    }

    #[test]
    fn contact_checks_email_before_phone() {
        let mut w = wizard();
        fill_identity(&mut w);
        w.advance().expect("identity");

        w.edit(|f| f.email = "sam@apex".into());
        let err = w.advance().expect_err("bad email");
        assert_eq!(err, WizardError::Validation(ValidationError::InvalidEmail));

        w.edit(|f| f.email = "sam@apex.com".into());
        let err = w.advance().expect_err("no phone");
        assert_eq!(err, WizardError::Validation(ValidationError::MissingPhone));
        assert_eq!(w.step(), Step::Contact);
    }

    #[test]
    fn edit_clears_error() {
        let mut w = wizard();
        assert!(w.advance().is_err());
        assert!(w.error().is_some());

        w.edit(|f| f.business_name = "A".into());
        assert!(w.error().is_none());
    }

    #[test]
    fn retreat_then_advance_returns_to_same_step_without_error() {
        let mut w = wizard();
        fill_identity(&mut w);
        w.advance().expect("identity");
        fill_contact(&mut w);
        w.advance().expect("contact");
        assert_eq!(w.step(), Step::Details);

        assert!(w.retreat());
        assert_eq!(w.step(), Step::Contact);
        assert!(matches!(w.advance(), Ok(Transition::Moved(Step::Details))));
        assert!(w.error().is_none());
    }

    #[test]
    fn retreat_does_not_validate_and_clears_error() {
        let mut w = wizard();
        fill_identity(&mut w);
        w.advance().expect("identity");
        assert!(w.advance().is_err());
        assert!(w.error().is_some());

        assert!(w.retreat());
        assert_eq!(w.step(), Step::Identity);
        assert!(w.error().is_none());
        assert!(!w.retreat());
        assert_eq!(w.step(), Step::Identity);
    }

    #[test]
    fn details_and_uploads_do_not_block() {
        let mut w = at_uploads();
        assert!(w.form().services.is_empty());
        assert!(w.retreat());
        assert!(matches!(w.advance(), Ok(Transition::Moved(Step::Uploads))));
    }

    #[test]
    fn advancing_from_uploads_requests_submission() {
        let mut w = at_uploads();
        match w.advance() {
            Ok(Transition::SubmitRequested(pending)) => {
                assert_eq!(pending.origin, Step::Uploads);
                assert_eq!(pending.correlation_id.len(), 32);
            }
            other => panic!("expected submission, got {:?}", other),
        }
        assert!(w.is_submitting());
        assert_eq!(w.step(), Step::Uploads);
    }

    #[test]
    fn skip_to_submit_only_from_details_or_uploads() {
        let mut w = wizard();
        assert_eq!(
            w.skip_to_submit().unwrap_err(),
            WizardError::CannotSubmitFrom(Step::Identity)
        );

        let mut w = at_uploads();
        w.retreat();
        let pending = w.skip_to_submit().expect("from details");
        assert_eq!(pending.origin, Step::Details);
        assert!(pending.payload.file_parts.is_empty());
    }

    #[test]
    fn submitting_locks_the_form() {
        let mut w = at_uploads();
        w.skip_to_submit().expect("start");

        assert!(!w.edit(|f| f.city = "Elsewhere".into()));
        assert_eq!(w.form().city, "Austin, TX");
        assert!(!w.retreat());
        assert!(!w.attach(UploadField::Logo, vec![file_of("l.png", 1)]));
        assert_eq!(w.advance().unwrap_err(), WizardError::Busy);
        assert_eq!(w.skip_to_submit().unwrap_err(), WizardError::Busy);
    }

    #[test]
    fn finishing_without_a_submission_is_rejected() {
        let mut w = at_uploads();
        let outcome = Err(SubmitError::generic("late"));
        assert_eq!(
            w.finish_submission(outcome).unwrap_err(),
            WizardError::NotSubmitting
        );
    }

    // -------------------------------------------------------------------------
    // Uploads through the wizard
    // -------------------------------------------------------------------------

    #[test]
    fn attach_respects_field_caps_and_derives_total() {
        let mut w = at_uploads();
        let files: Vec<_> = (0..25).map(|i| file_of(&format!("g{}.jpg", i), 100)).collect();
        w.attach(UploadField::GalleryPhotos, files);
        assert_eq!(w.form().uploads.files(UploadField::GalleryPhotos).len(), 20);
        assert_eq!(w.total_upload_bytes(), 2000);

        w.attach(UploadField::GalleryPhotos, Vec::new());
        assert_eq!(w.form().uploads.files(UploadField::GalleryPhotos).len(), 20);

        w.remove_attachment(UploadField::GalleryPhotos, 0);
        assert_eq!(w.total_upload_bytes(), 1900);
        assert_eq!(
            w.form().uploads.files(UploadField::GalleryPhotos)[0].name,
            "g1.jpg"
        );
    }

    #[test]
    fn clearing_a_field_drops_only_its_files() {
        let mut w = at_uploads();
        w.attach(UploadField::TeamPhotos, vec![file_of("a.jpg", 10), file_of("b.jpg", 20)]);
        w.attach(UploadField::Logo, vec![file_of("logo.jpg", 5)]);

        assert!(w.clear_attachments(UploadField::TeamPhotos));
        assert!(w.form().uploads.files(UploadField::TeamPhotos).is_empty());
        assert_eq!(w.total_upload_bytes(), 5);
    }

    // -------------------------------------------------------------------------
    // Prefill
    // -------------------------------------------------------------------------

    #[test]
    fn prefill_maps_trade_name() {
        let w = LeadWizard::with_prefill(&WizardConfig::default(), Some("Roofers"));
        assert_eq!(w.form().industry, Some(Industry::Roofer));
        assert_eq!(w.form().effective_industry(), "Roofer");
    }

    #[test]
    fn prefill_applies_only_when_value_changes() {
        let mut w = LeadWizard::with_prefill(&WizardConfig::default(), Some("Roofers"));
        w.edit(|f| f.industry = Some(Industry::Salon));

        // Same external value again: user's choice stands.
        assert!(!w.apply_prefill(Some("Roofers")));
        assert_eq!(w.form().industry, Some(Industry::Salon));

        assert!(w.apply_prefill(Some("Plumbers")));
        assert_eq!(w.form().industry, Some(Industry::Plumber));

        assert!(!w.apply_prefill(Some("Astronauts")));
        assert_eq!(w.form().industry, Some(Industry::Plumber));
    }

    #[test]
    fn prefill_arriving_while_submitting_applies_after_failure() {
        let mut w = at_uploads();
        w.skip_to_submit().expect("start");

        assert!(!w.apply_prefill(Some("Plumbers")));
        assert_eq!(w.form().industry, Some(Industry::Roofer));

        let _ = w.finish_submission(Err(SubmitError::generic("connection reset")));
        assert!(!w.is_submitting());

        assert!(w.apply_prefill(Some("Plumbers")));
        assert_eq!(w.form().industry, Some(Industry::Plumber));
    }

    // -------------------------------------------------------------------------
    // Submission
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn successful_submission_reaches_success_with_snapshot() {
        let mut w = at_uploads();
        let stub = AcceptingStub::default();

        let summary = w.submit(&stub).await.expect("accepted");
        assert_eq!(summary.business_name(), "Apex Roofing");
        assert_eq!(summary.industry(), "Roofer");
        assert_eq!(summary.city(), "Austin, TX");
        assert_eq!(summary.email(), "sam@apexroofing.com");
        assert!(!summary.attachments_omitted());

        assert_eq!(w.step(), Step::Success);
        assert!(!w.is_submitting());
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn success_is_terminal_and_read_only() {
        let mut w = at_uploads();
        w.submit(&AcceptingStub::default()).await.expect("accepted");

        assert!(!w.edit(|f| f.city = "Changed".into()));
        assert!(!w.retreat());
        assert_eq!(w.advance().unwrap_err(), WizardError::Finished);
        assert_eq!(
            w.submit(&AcceptingStub::default()).await.unwrap_err(),
            WizardError::Finished
        );
        assert_eq!(w.success().map(|s| s.city()), Some("Austin, TX"));
    }

    #[tokio::test]
    async fn other_industry_is_echoed_and_sent() {
        let mut w = wizard();
        w.edit(|f| {
            f.business_name = "Paws & Co".into();
            f.contact_name = "Riley".into();
            f.industry = Some(Industry::Other);
            f.other_industry = "Dog Grooming".into();
            f.city = "Wellington".into();
        });
        w.advance().expect("identity");
        fill_contact(&mut w);
        w.advance().expect("contact");
        w.advance().expect("details");

        let stub = AcceptingStub::default();
        let summary = w.submit(&stub).await.expect("accepted");
        assert_eq!(summary.industry(), "Dog Grooming");

        let sent = stub.last.lock().unwrap().clone().expect("payload");
        assert_eq!(sent.text("industry"), Some("Dog Grooming"));
    }

    #[tokio::test]
    async fn failed_submission_stays_on_step_and_can_be_retried() {
        let mut w = at_uploads();
        let stub = FailThenAcceptStub::new(1);

        let err = w.submit(&stub).await.unwrap_err();
        assert!(matches!(err, WizardError::Submission(_)));
        assert_eq!(w.step(), Step::Uploads);
        assert!(!w.is_submitting());
        assert_eq!(
            w.error(),
            Some(crate::api::submission::GENERIC_SUBMIT_ERROR)
        );
        // Data survives the failure.
        assert_eq!(w.form().business_name, "Apex Roofing");

        let summary = w.submit(&stub).await.expect("second attempt");
        assert_eq!(summary.receipt.status, 201);
        assert_eq!(stub.calls.load(Ordering::SeqCst), 2);
        assert!(w.error().is_none());
    }

    #[tokio::test]
    async fn failed_skip_from_details_returns_to_details() {
        let mut w = at_uploads();
        w.retreat();
        let err = w.submit(&FailThenAcceptStub::new(5)).await.unwrap_err();
        assert!(matches!(err, WizardError::Submission(_)));
        assert_eq!(w.step(), Step::Details);
    }

    #[tokio::test]
    async fn uploads_at_ceiling_are_sent() {
        let mut w = at_uploads();
        w.attach(
            UploadField::Documents,
            vec![file_of("brochure.jpg", DEFAULT_UPLOAD_CEILING_BYTES)],
        );
        assert!(!w.exceeds_upload_ceiling());

        let stub = AcceptingStub::default();
        let summary = w.submit(&stub).await.expect("accepted");
        assert!(summary.oversize_notice.is_none());

        let sent = stub.last.lock().unwrap().clone().expect("payload");
        assert_eq!(sent.file_parts.len(), 1);
    }

    #[tokio::test]
    async fn uploads_over_ceiling_are_dropped_but_submission_succeeds() {
        let mut w = at_uploads();
        w.attach(
            UploadField::Documents,
            vec![file_of("brochure.jpg", DEFAULT_UPLOAD_CEILING_BYTES)],
        );
        w.attach(UploadField::Logo, vec![file_of("logo.jpg", 1)]);
        assert!(w.exceeds_upload_ceiling());

        let stub = AcceptingStub::default();
        let summary = w.submit(&stub).await.expect("accepted");
        let notice = summary.oversize_notice.clone().expect("oversize notice");
        assert!(notice.contains("hello@vibely.co.nz"));
        assert!(summary.attachments_omitted());
        assert_eq!(w.step(), Step::Success);

        let sent = stub.last.lock().unwrap().clone().expect("payload");
        assert!(sent.file_parts.is_empty());
        assert_eq!(sent.text("businessName"), Some("Apex Roofing"));
    }
}
