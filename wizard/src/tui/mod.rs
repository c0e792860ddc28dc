//! Terminal UI for the lead capture wizard.
//!
//! Layout:
//! - Centered window titled "Vibely: Free Website Preview"
//! - Left banner panel with the step list
//! - Main content panel with the active step's fields
//! - Bottom button row: [ Back ] [ Next ] [ Skip & Submit ] [ Cancel ]
//! - Modal confirmation for Cancel, message modal for rejected files
//!
//! All form rules live in [`LeadWizard`]; this module only maps keys to
//! wizard calls and renders its state. The POST runs on a worker thread.
//!
//! Note: Logging is file-only in TUI mode (stdout logging is disabled) to avoid corrupting the terminal UI.

use crate::api::submission::{FormSubmitter, HttpSubmitter, SubmitError};
use crate::models::form::{FormData, Referral, WebsiteGoal, WebsiteStatus};
use crate::models::industry::Industry;
use crate::models::responses::SubmissionReceipt;
use crate::models::uploads::{format_size, UploadField};
use crate::utils::config::WizardConfig;
use crate::utils::files::attach_from_path;
use crate::wizard::{LeadWizard, PendingSubmission, Step, Transition, WizardError};
use anyhow::Result;
use chrono::Utc;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use log::{info, warn};
use ratatui::backend::{Backend, CrosstermBackend, TestBackend};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Terminal;
use std::io::{self, Stdout};
use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

const BANNER: &str = r#"
 __   ___ _         _
 \ \ / (_) |__  ___| |_  _
  \ V /| | '_ \/ -_) | || |
   \_/ |_|_.__/\___|_|\_, |
                      |__/
"#;

const WINDOW_TITLE: &str = "Vibely: Free Website Preview";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ButtonFocus {
    Back,
    Next,
    Skip,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Modal {
    ConfirmCancel,
    Message { title: String, body: String },
}

/// One focusable row on a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    BusinessName,
    ContactName,
    Industry,
    OtherIndustry,
    City,
    Email,
    Phone,
    Services,
    WebsiteStatus,
    ExistingUrl,
    Differentiators,
    Goal(WebsiteGoal),
    AdditionalNotes,
    HearAboutUs,
    Upload(UploadField),
}

impl Field {
    fn label(&self) -> &'static str {
        match self {
            Field::BusinessName => "Business name",
            Field::ContactName => "Your name",
            Field::Industry => "Industry",
            Field::OtherIndustry => "Your industry",
            Field::City => "City",
            Field::Email => "Email",
            Field::Phone => "Mobile phone",
            Field::Services => "Services you offer",
            Field::WebsiteStatus => "Current website",
            Field::ExistingUrl => "Website URL",
            Field::Differentiators => "What makes you different",
            Field::Goal(g) => g.label(),
            Field::AdditionalNotes => "Anything else?",
            Field::HearAboutUs => "How did you hear about us?",
            Field::Upload(u) => u.label(),
        }
    }

    fn is_text(&self) -> bool {
        matches!(
            self,
            Field::BusinessName
                | Field::ContactName
                | Field::OtherIndustry
                | Field::City
                | Field::Email
                | Field::Phone
                | Field::Services
                | Field::ExistingUrl
                | Field::Differentiators
                | Field::AdditionalNotes
        )
    }
}

fn text_slot(form: &mut FormData, field: Field) -> Option<&mut String> {
    match field {
        Field::BusinessName => Some(&mut form.business_name),
        Field::ContactName => Some(&mut form.contact_name),
        Field::OtherIndustry => Some(&mut form.other_industry),
        Field::City => Some(&mut form.city),
        Field::Email => Some(&mut form.email),
        Field::Phone => Some(&mut form.phone),
        Field::Services => Some(&mut form.services),
        Field::ExistingUrl => Some(&mut form.existing_url),
        Field::Differentiators => Some(&mut form.differentiators),
        Field::AdditionalNotes => Some(&mut form.additional_notes),
        _ => None,
    }
}

fn text_slot_ref(form: &FormData, field: Field) -> Option<&String> {
    match field {
        Field::BusinessName => Some(&form.business_name),
        Field::ContactName => Some(&form.contact_name),
        Field::OtherIndustry => Some(&form.other_industry),
        Field::City => Some(&form.city),
        Field::Email => Some(&form.email),
        Field::Phone => Some(&form.phone),
        Field::Services => Some(&form.services),
        Field::ExistingUrl => Some(&form.existing_url),
        Field::Differentiators => Some(&form.differentiators),
        Field::AdditionalNotes => Some(&form.additional_notes),
        _ => None,
    }
}

/// Single-line text editor. The cursor is a char index.
struct TextInput {
    value: String,
    cursor: usize,
}

impl TextInput {
    fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            cursor: value.chars().count(),
            value,
        }
    }

    fn set(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.cursor = self.value.chars().count();
    }

    fn byte_index(&self, char_idx: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_idx)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    fn handle_key(&mut self, code: KeyCode) -> bool {
        let len = self.value.chars().count();
        match code {
            KeyCode::Char(c) => {
                let at = self.byte_index(self.cursor);
                self.value.insert(at, c);
                self.cursor += 1;
                true
            }
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    let at = self.byte_index(self.cursor - 1);
                    self.value.remove(at);
                    self.cursor -= 1;
                }
                true
            }
            KeyCode::Delete => {
                if self.cursor < len {
                    let at = self.byte_index(self.cursor);
                    self.value.remove(at);
                }
                true
            }
            KeyCode::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                true
            }
            KeyCode::Right => {
                self.cursor = (self.cursor + 1).min(len);
                true
            }
            KeyCode::Home => {
                self.cursor = 0;
                true
            }
            KeyCode::End => {
                self.cursor = len;
                true
            }
            _ => false,
        }
    }

    /// Value with a visible caret, for the focused row.
    fn display_with_cursor(&self) -> String {
        let at = self.byte_index(self.cursor);
        format!("{}_{}", &self.value[..at], &self.value[at..])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FocusTarget {
    Field(usize),
    Button(ButtonFocus),
}

enum UiMsg {
    SubmissionFinished(Result<SubmissionReceipt, SubmitError>),
}

struct WizardState {
    wizard: LeadWizard,
    submitter: Arc<dyn FormSubmitter>,
    modal: Option<Modal>,
    focus: FocusTarget,
    quit: bool,

    /// Editor for the focused text field; synced into the form on each key.
    editor: TextInput,
    editor_field: Option<Field>,

    /// Path typed while an upload field is focused.
    upload_path: TextInput,
    upload_selected: usize,
}

impl WizardState {
    fn new(wizard: LeadWizard, submitter: Arc<dyn FormSubmitter>) -> Self {
        let mut state = Self {
            wizard,
            submitter,
            modal: None,
            focus: FocusTarget::Field(0),
            quit: false,
            editor: TextInput::new(""),
            editor_field: None,
            upload_path: TextInput::new(""),
            upload_selected: 0,
        };
        sync_editor(&mut state);
        state
    }

    fn step(&self) -> Step {
        self.wizard.step()
    }
}

fn page_fields(state: &WizardState) -> Vec<Field> {
    let form = state.wizard.form();
    match state.step() {
        Step::Identity => {
            let mut v = vec![Field::BusinessName, Field::ContactName, Field::Industry];
            if form.industry == Some(Industry::Other) {
                v.push(Field::OtherIndustry);
            }
            v.push(Field::City);
            v
        }
        Step::Contact => vec![Field::Email, Field::Phone],
        Step::Details => {
            let mut v = vec![Field::Services, Field::WebsiteStatus];
            if form.website_status.is_some_and(|s| s.has_existing_site()) {
                v.push(Field::ExistingUrl);
            }
            v.push(Field::Differentiators);
            v.extend(WebsiteGoal::ALL.into_iter().map(Field::Goal));
            v.push(Field::AdditionalNotes);
            v.push(Field::HearAboutUs);
            v
        }
        Step::Uploads => UploadField::ALL.into_iter().map(Field::Upload).collect(),
        Step::Success => Vec::new(),
    }
}

fn focused_field(state: &WizardState) -> Option<Field> {
    match state.focus {
        FocusTarget::Field(i) => page_fields(state).get(i).copied(),
        FocusTarget::Button(_) => None,
    }
}

/// Point the editor at the focused text field, loading its current value.
fn sync_editor(state: &mut WizardState) {
    let field = focused_field(state).filter(|f| f.is_text());
    if field != state.editor_field {
        let value = field
            .and_then(|f| text_slot_ref(state.wizard.form(), f).cloned())
            .unwrap_or_default();
        state.editor.set(value);
        state.editor_field = field;
    }
    if !matches!(focused_field(state), Some(Field::Upload(_))) {
        state.upload_path.set("");
        state.upload_selected = 0;
    }
}

fn next_label(step: Step) -> &'static str {
    match step {
        Step::Uploads => "Submit",
        Step::Success => "Finish",
        _ => "Next",
    }
}

fn can_go_back(state: &WizardState) -> bool {
    state.step().can_retreat() && !state.wizard.is_submitting()
}

fn can_go_next(state: &WizardState) -> bool {
    !state.wizard.is_submitting()
}

fn can_skip(state: &WizardState) -> bool {
    state.step() == Step::Details && !state.wizard.is_submitting()
}

fn can_cancel(state: &WizardState) -> bool {
    state.step() != Step::Success && !state.wizard.is_submitting()
}

fn button_enabled(state: &WizardState, b: ButtonFocus) -> bool {
    match b {
        ButtonFocus::Back => can_go_back(state),
        ButtonFocus::Next => can_go_next(state),
        ButtonFocus::Skip => can_skip(state),
        ButtonFocus::Cancel => can_cancel(state),
    }
}

pub fn run(cfg: &WizardConfig, prefill: Option<&str>) -> Result<()> {
    info!("[PHASE: tui] [STEP: start] Starting TUI wizard");

    let http = HttpSubmitter::from_config(cfg)?;
    info!(
        "[PHASE: tui] [STEP: start] Leads will be posted to {}",
        http.endpoint()
    );
    let submitter: Arc<dyn FormSubmitter> = Arc::new(http);
    let state = WizardState::new(LeadWizard::with_prefill(cfg, prefill), submitter);

    let mut terminal = setup_terminal()?;
    let result = run_loop(&mut terminal, state);
    restore_terminal(&mut terminal)?;

    result
}

fn new_smoke_wizard_state(cfg: &WizardConfig, target: &str) -> WizardState {
    // Smoke-only: seeded state for deterministic page rendering.
    let mut wizard = LeadWizard::with_prefill(cfg, Some("Roofers"));
    wizard.edit(|f| {
        f.business_name = "Apex Roofing".into();
        f.contact_name = "Sam".into();
        f.city = "Austin, TX".into();
        f.email = "sam@apexroofing.com".into();
        f.phone = "(555) 123-4567".into();
        f.website_status = Some(WebsiteStatus::NeedsUpdate);
        f.existing_url = "apexroofing.com".into();
    });

    let wanted = Step::from_id(target).unwrap_or(Step::Identity);
    while wizard.step() < wanted && wizard.step() != Step::Uploads {
        if wizard.advance().is_err() {
            break;
        }
    }
    if wanted == Step::Success {
        if let Ok(pending) = wizard.skip_to_submit() {
            let _ = wizard.finish_submission(Ok(SubmissionReceipt {
                status: 200,
                correlation_id: pending.correlation_id,
                received_at: Utc::now(),
            }));
        }
    }

    let mut state = WizardState::new(wizard, Arc::new(SmokeSubmitter));
    if state.step() == Step::Success {
        state.focus = FocusTarget::Button(ButtonFocus::Next);
    }
    state
}

/// Never called: smoke mode renders one frame and exits.
struct SmokeSubmitter;

#[async_trait::async_trait]
impl FormSubmitter for SmokeSubmitter {
    async fn submit(
        &self,
        _payload: &crate::models::requests::SubmissionPayload,
        _correlation_id: &str,
    ) -> Result<SubmissionReceipt, SubmitError> {
        Err(SubmitError::generic("smoke mode does not submit"))
    }
}

/// Non-interactive smoke mode: render a single frame and exit.
/// Targets: identity|contact|details|uploads|success
pub fn smoke(cfg: &WizardConfig, target: &str) -> Result<()> {
    info!(
        "[PHASE: tui] [STEP: smoke] Rendering single-frame TUI smoke target={}",
        target
    );

    let t = target.trim().to_ascii_lowercase();
    let state = new_smoke_wizard_state(cfg, t.as_str());

    // In-memory backend: no raw mode or alternate screen.
    render_to_test_backend(&state).map(|_| ())
}

fn render_to_test_backend(state: &WizardState) -> Result<Terminal<TestBackend>> {
    render_sized(state, 100, 30)
}

fn render_sized(state: &WizardState, width: u16, height: u16) -> Result<Terminal<TestBackend>> {
    let backend = TestBackend::new(width, height);
    let mut terminal = Terminal::new(backend)?;
    terminal.draw(|f| draw(f.size(), f, state))?;
    Ok(terminal)
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn run_loop<B: Backend>(terminal: &mut Terminal<B>, mut state: WizardState) -> Result<()> {
    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();
    let (tx, rx) = mpsc::channel::<UiMsg>();

    while !state.quit {
        drain_messages(&mut state, &rx);
        terminal.draw(|f| draw(f.size(), f, &state))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_millis(0));

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_key(&mut state, key.code, &tx);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }
    }

    Ok(())
}

fn focused_button(state: &WizardState) -> ButtonFocus {
    match state.focus {
        FocusTarget::Button(b) => b,
        _ => ButtonFocus::Next,
    }
}

fn set_focused_button(state: &mut WizardState, b: ButtonFocus) {
    state.focus = FocusTarget::Button(b);
}

fn drain_messages(state: &mut WizardState, rx: &mpsc::Receiver<UiMsg>) {
    while let Ok(msg) = rx.try_recv() {
        match msg {
            UiMsg::SubmissionFinished(outcome) => {
                // Failures land in the wizard's inline error slot.
                if state.wizard.finish_submission(outcome).is_ok() {
                    set_focused_button(state, ButtonFocus::Next);
                }
                sync_editor(state);
            }
        }
    }
}

/// Post a pending submission on a worker thread; the result comes back as a
/// [`UiMsg::SubmissionFinished`].
fn start_submission(state: &WizardState, pending: PendingSubmission, tx: &mpsc::Sender<UiMsg>) {
    let submitter = Arc::clone(&state.submitter);
    let tx = tx.clone();
    thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build();
        let outcome = match rt {
            Ok(rt) => rt.block_on(submitter.submit(&pending.payload, &pending.correlation_id)),
            Err(e) => Err(SubmitError::generic(format!(
                "Internal error starting submission: {}",
                e
            ))),
        };
        let _ = tx.send(UiMsg::SubmissionFinished(outcome));
    });
}

fn go_next(state: &mut WizardState, tx: &mpsc::Sender<UiMsg>) {
    if state.wizard.is_finished() {
        state.quit = true;
        return;
    }
    match state.wizard.advance() {
        Ok(Transition::Moved(_)) => {
            state.focus = FocusTarget::Field(0);
        }
        Ok(Transition::SubmitRequested(pending)) => start_submission(state, pending, tx),
        // Validation failures are already in the wizard's error slot.
        Err(WizardError::Validation(_)) => {}
        Err(e) => warn!("[PHASE: tui] [STEP: next] {}", e),
    }
    sync_editor(state);
}

fn go_back(state: &mut WizardState) {
    if state.wizard.retreat() {
        state.focus = FocusTarget::Field(0);
        sync_editor(state);
    }
}

fn skip_and_submit(state: &mut WizardState, tx: &mpsc::Sender<UiMsg>) {
    match state.wizard.skip_to_submit() {
        Ok(pending) => start_submission(state, pending, tx),
        Err(e) => warn!("[PHASE: tui] [STEP: skip] {}", e),
    }
}

fn activate_button(state: &mut WizardState, b: ButtonFocus, tx: &mpsc::Sender<UiMsg>) {
    if !button_enabled(state, b) {
        return;
    }
    match b {
        ButtonFocus::Back => go_back(state),
        ButtonFocus::Next => go_next(state, tx),
        ButtonFocus::Skip => skip_and_submit(state, tx),
        ButtonFocus::Cancel => {
            state.modal = Some(Modal::ConfirmCancel);
            set_focused_button(state, ButtonFocus::Next);
        }
    }
}

fn cycle_focus(state: &mut WizardState, forward: bool) {
    let fields = page_fields(state).len();
    let mut order: Vec<FocusTarget> = (0..fields).map(FocusTarget::Field).collect();
    order.extend(
        [
            ButtonFocus::Back,
            ButtonFocus::Next,
            ButtonFocus::Skip,
            ButtonFocus::Cancel,
        ]
        .into_iter()
        .filter(|b| button_enabled(state, *b))
        .map(FocusTarget::Button),
    );
    if order.is_empty() {
        return;
    }
    let pos = order.iter().position(|t| *t == state.focus).unwrap_or(0);
    let next = if forward {
        (pos + 1) % order.len()
    } else {
        (pos + order.len() - 1) % order.len()
    };
    state.focus = order[next];
    sync_editor(state);
}

fn attach_typed_path(state: &mut WizardState, upload: UploadField) {
    let raw = state.upload_path.value.trim().to_string();
    if raw.is_empty() {
        return;
    }
    let path = PathBuf::from(&raw);
    match attach_from_path(&path) {
        Ok(file) if !upload.accepts(&file) => {
            state.modal = Some(Modal::Message {
                title: "File not accepted".to_string(),
                body: format!(
                    "{} can't be used for {}. Accepted: {}",
                    file.name,
                    upload.label(),
                    upload.accept()
                ),
            });
        }
        Ok(file) => {
            state.wizard.attach(upload, vec![file]);
            state.upload_path.set("");
        }
        Err(e) => {
            state.modal = Some(Modal::Message {
                title: "Couldn't attach file".to_string(),
                body: e.to_string(),
            });
        }
    }
}

fn handle_key(state: &mut WizardState, code: KeyCode, tx: &mpsc::Sender<UiMsg>) {
    // Modal handling
    if let Some(modal) = state.modal.clone() {
        match modal {
            Modal::ConfirmCancel => match code {
                KeyCode::Left | KeyCode::Right | KeyCode::Tab => {
                    let next = match focused_button(state) {
                        ButtonFocus::Cancel => ButtonFocus::Next,
                        _ => ButtonFocus::Cancel,
                    };
                    set_focused_button(state, next);
                }
                KeyCode::Enter => {
                    let confirm = focused_button(state) == ButtonFocus::Cancel;
                    state.modal = None;
                    if confirm {
                        info!("[PHASE: tui] [STEP: cancel] User cancelled the wizard");
                        state.quit = true;
                    } else {
                        set_focused_button(state, ButtonFocus::Cancel);
                    }
                }
                KeyCode::Esc => {
                    state.modal = None;
                    set_focused_button(state, ButtonFocus::Cancel);
                }
                _ => {}
            },
            Modal::Message { .. } => {
                if matches!(code, KeyCode::Enter | KeyCode::Esc) {
                    state.modal = None;
                }
            }
        }
        return;
    }

    // Nothing but the overlay while the POST is in flight.
    if state.wizard.is_submitting() {
        return;
    }

    match code {
        KeyCode::Tab => return cycle_focus(state, true),
        KeyCode::BackTab => return cycle_focus(state, false),
        KeyCode::Esc => {
            if can_cancel(state) {
                state.modal = Some(Modal::ConfirmCancel);
                set_focused_button(state, ButtonFocus::Next);
            } else {
                state.quit = true;
            }
            return;
        }
        _ => {}
    }

    let FocusTarget::Field(_) = state.focus else {
        match code {
            KeyCode::Left => cycle_focus(state, false),
            KeyCode::Right => cycle_focus(state, true),
            KeyCode::Enter => activate_button(state, focused_button(state), tx),
            KeyCode::Char('q') if state.step() == Step::Success => state.quit = true,
            _ => {}
        }
        return;
    };

    let Some(field) = focused_field(state) else {
        return;
    };

    match field {
        Field::Industry => match code {
            KeyCode::Left => {
                state.wizard.edit(|f| f.industry = Some(Industry::prev(f.industry)));
            }
            KeyCode::Right | KeyCode::Char(' ') => {
                state.wizard.edit(|f| f.industry = Some(Industry::next(f.industry)));
            }
            KeyCode::Up => cycle_focus(state, false),
            KeyCode::Down => cycle_focus(state, true),
            KeyCode::Enter => go_next(state, tx),
            _ => {}
        },
        Field::WebsiteStatus => match code {
            KeyCode::Left | KeyCode::Right | KeyCode::Char(' ') => {
                let forward = code != KeyCode::Left;
                state.wizard.edit(|f| {
                    f.website_status = cycle_option(&WebsiteStatus::ALL, f.website_status, forward)
                });
            }
            KeyCode::Up => cycle_focus(state, false),
            KeyCode::Down => cycle_focus(state, true),
            KeyCode::Enter => go_next(state, tx),
            _ => {}
        },
        Field::HearAboutUs => match code {
            KeyCode::Left | KeyCode::Right | KeyCode::Char(' ') => {
                let forward = code != KeyCode::Left;
                state.wizard.edit(|f| {
                    f.hear_about_us = cycle_option(&Referral::ALL, f.hear_about_us, forward)
                });
            }
            KeyCode::Up => cycle_focus(state, false),
            KeyCode::Down => cycle_focus(state, true),
            KeyCode::Enter => go_next(state, tx),
            _ => {}
        },
        Field::Goal(goal) => match code {
            KeyCode::Char(' ') => {
                state.wizard.edit(|f| {
                    f.toggle_goal(goal);
                });
            }
            KeyCode::Up => cycle_focus(state, false),
            KeyCode::Down => cycle_focus(state, true),
            KeyCode::Enter => go_next(state, tx),
            _ => {}
        },
        Field::Upload(upload) => match code {
            KeyCode::Enter if !state.upload_path.value.trim().is_empty() => {
                attach_typed_path(state, upload)
            }
            KeyCode::Enter => go_next(state, tx),
            KeyCode::Up if state.upload_selected > 0 => state.upload_selected -= 1,
            KeyCode::Down
                if state.upload_selected + 1 < state.wizard.form().uploads.files(upload).len() =>
            {
                state.upload_selected += 1
            }
            KeyCode::Up => cycle_focus(state, false),
            KeyCode::Down => cycle_focus(state, true),
            KeyCode::Delete if state.upload_path.value.is_empty() => {
                if state
                    .wizard
                    .remove_attachment(upload, state.upload_selected)
                    .is_some()
                {
                    state.upload_selected = state.upload_selected.saturating_sub(1);
                }
            }
            other => {
                state.upload_path.handle_key(other);
            }
        },
        _ => match code {
            KeyCode::Enter => go_next(state, tx),
            KeyCode::Up => cycle_focus(state, false),
            KeyCode::Down => cycle_focus(state, true),
            other => {
                if state.editor.handle_key(other) {
                    let value = state.editor.value.clone();
                    state.wizard.edit(|f| {
                        if let Some(slot) = text_slot(f, field) {
                            *slot = value;
                        }
                    });
                }
            }
        },
    }

    // Conditional rows can appear or vanish; keep focus in range.
    let fields = page_fields(state).len();
    if let FocusTarget::Field(i) = state.focus {
        if i >= fields {
            state.focus = if fields == 0 {
                FocusTarget::Button(ButtonFocus::Next)
            } else {
                FocusTarget::Field(fields - 1)
            };
        }
    }
    sync_editor(state);
}

/// Step through `None -> all[0] -> .. -> all[n-1] -> None`.
fn cycle_option<T: Copy + PartialEq>(all: &[T], current: Option<T>, forward: bool) -> Option<T> {
    let pos = current.and_then(|c| all.iter().position(|x| *x == c));
    let n = all.len();
    let next = match (pos, forward) {
        (None, true) => Some(0),
        (None, false) => n.checked_sub(1),
        (Some(i), true) if i + 1 < n => Some(i + 1),
        (Some(_), true) => None,
        (Some(0), false) => None,
        (Some(i), false) => Some(i - 1),
    };
    next.map(|i| all[i])
}

fn field_line(state: &WizardState, idx: usize, field: Field) -> Line<'static> {
    let focused = matches!(state.focus, FocusTarget::Field(i) if i == idx);
    let prefix = if focused { ">" } else { " " };
    let form = state.wizard.form();

    let value = match field {
        Field::Industry => match form.industry {
            Some(i) => format!("< {} >", i.label()),
            None => "< Select your industry >".to_string(),
        },
        Field::WebsiteStatus => match form.website_status {
            Some(s) => format!("< {} >", s.label()),
            None => "< Not answered >".to_string(),
        },
        Field::HearAboutUs => match form.hear_about_us {
            Some(r) => format!("< {} >", r.label()),
            None => "< Not answered >".to_string(),
        },
        Field::Goal(g) => {
            let mark = if form.website_goals.contains(&g) { "[x]" } else { "[ ]" };
            return styled_line(format!("{} {} {}", prefix, mark, g.label()), focused);
        }
        Field::Upload(u) => {
            let files = form.uploads.files(u);
            let cap = if u.is_multiple() && form.uploads.is_at_limit(u) {
                format!("{}/{}, full", files.len(), u.max_files())
            } else if u.is_multiple() {
                format!("{}/{}", files.len(), u.max_files())
            } else if files.is_empty() {
                "none".to_string()
            } else {
                "attached".to_string()
            };
            return styled_line(format!("{} {} ({})", prefix, u.label(), cap), focused);
        }
        text if focused && state.editor_field == Some(text) => state.editor.display_with_cursor(),
        text => text_slot_ref(form, text).cloned().unwrap_or_default(),
    };

    styled_line(format!("{} {}: {}", prefix, field.label(), value), focused)
}

fn styled_line(s: String, focused: bool) -> Line<'static> {
    if focused {
        Line::from(Span::styled(s, Style::default().add_modifier(Modifier::BOLD)))
    } else {
        Line::from(s)
    }
}

fn step_intro(step: Step) -> &'static str {
    match step {
        Step::Identity => "Tell us who you are and we'll build you a free website preview.",
        Step::Contact => "We'll text you the preview link.",
        Step::Details => "Optional, but it helps us make the preview feel like yours.",
        Step::Uploads => "Optional. Type a file path and press Enter to attach it.",
        Step::Success => "",
    }
}

fn success_text(state: &WizardState) -> Text<'static> {
    let Some(summary) = state.wizard.success() else {
        return Text::from("");
    };
    let mut lines = vec![
        Line::from(format!(
            "Thanks! We're building a preview for {}.",
            summary.business_name()
        )),
        Line::from(""),
        Line::from(format!("Industry: {}", summary.industry())),
        Line::from(format!("City:     {}", summary.city())),
        Line::from(format!("Email:    {}", summary.email())),
        Line::from(""),
        Line::from("We'll be in touch within 48 hours."),
    ];
    if let Some(notice) = summary.oversize_notice.as_ref() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            notice.clone(),
            Style::default().fg(Color::Yellow),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(format!(
        "Reference: {}",
        summary.receipt.correlation_id
    )));
    lines.push(Line::from("Select Finish to exit."));
    Text::from(lines)
}

fn page_text(state: &WizardState) -> Text<'static> {
    let step = state.step();
    if step == Step::Success {
        return success_text(state);
    }

    let mut lines = vec![Line::from(step_intro(step)), Line::from("")];
    for (idx, field) in page_fields(state).into_iter().enumerate() {
        lines.push(field_line(state, idx, field));
    }

    if let Some(Field::Upload(upload)) = focused_field(state) {
        lines.push(Line::from(""));
        lines.push(Line::from(upload.help_text()));
        for (i, file) in state.wizard.form().uploads.files(upload).iter().enumerate() {
            let marker = if i == state.upload_selected { "*" } else { " " };
            lines.push(Line::from(format!(
                "  {} {} ({})",
                marker,
                file.name,
                format_size(file.size)
            )));
        }
        lines.push(Line::from(format!(
            "  Path: {}",
            state.upload_path.display_with_cursor()
        )));
        lines.push(Line::from("  Enter attaches, Delete removes the marked file."));
    }

    if step == Step::Uploads {
        let total = state.wizard.total_upload_bytes();
        lines.push(Line::from(""));
        let mut total_line = format!(
            "Total: {} of {}",
            format_size(total),
            format_size(state.wizard.upload_ceiling_bytes())
        );
        if state.wizard.exceeds_upload_ceiling() {
            total_line.push_str(" (too large to send; we'll follow up by email)");
        }
        lines.push(Line::from(total_line));
    }

    if let Some(err) = state.wizard.error() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("Error: {}", err),
            Style::default().fg(Color::Red),
        )));
    }

    Text::from(lines)
}

fn banner_text(state: &WizardState) -> Text<'static> {
    let mut lines: Vec<Line> = BANNER.lines().map(|l| Line::from(l.to_string())).collect();
    lines.push(Line::from(""));
    for s in Step::ALL {
        let marker = if s == state.step() {
            ">"
        } else if s < state.step() {
            "✓"
        } else {
            " "
        };
        lines.push(Line::from(format!(" {} {}. {}", marker, s.number(), s.title())));
    }
    Text::from(lines)
}

fn draw(area: Rect, f: &mut ratatui::Frame<'_>, state: &WizardState) {
    let window_area = centered_window(area, 100, 30);

    let outer_block = Block::default().borders(Borders::ALL).title(WINDOW_TITLE);
    f.render_widget(outer_block, window_area);

    // Inner layout: banner + content + buttons row
    let inner = window_area.inner(&ratatui::layout::Margin {
        vertical: 1,
        horizontal: 1,
    });
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)].as_ref())
        .split(inner);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(36), Constraint::Min(0)].as_ref())
        .split(rows[0]);

    let banner = Paragraph::new(banner_text(state))
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Left);
    f.render_widget(banner, cols[0]);

    let step = state.step();
    let content_block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Step {} of 5: {}", step.number(), step.title()));
    let content = Paragraph::new(page_text(state))
        .block(content_block)
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: false });
    f.render_widget(content, cols[1]);

    draw_buttons(f, rows[1], state);

    if state.wizard.is_submitting() {
        draw_busy_overlay(f, window_area);
    }

    if let Some(modal) = state.modal.as_ref() {
        match modal {
            Modal::ConfirmCancel => draw_cancel_modal(f, window_area, state),
            Modal::Message { title, body } => draw_message_modal(f, window_area, title, body),
        }
    }
}

fn centered_window(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width.saturating_sub(2)).max(60).min(area.width);
    let h = height.min(area.height.saturating_sub(2)).max(20).min(area.height);
    let x = area.x + (area.width.saturating_sub(w)) / 2;
    let y = area.y + (area.height.saturating_sub(h)) / 2;
    Rect {
        x,
        y,
        width: w,
        height: h,
    }
}

fn modal_rect(window_area: Rect, width: u16, height: u16) -> Rect {
    let w = width
        .min(window_area.width.saturating_sub(4))
        .max(30)
        .min(window_area.width);
    let h = height
        .min(window_area.height.saturating_sub(4))
        .max(5)
        .min(window_area.height);
    Rect {
        x: window_area.x + (window_area.width.saturating_sub(w)) / 2,
        y: window_area.y + (window_area.height.saturating_sub(h)) / 2,
        width: w,
        height: h,
    }
}

fn draw_buttons(f: &mut ratatui::Frame<'_>, area: Rect, state: &WizardState) {
    let focused = |b: ButtonFocus| matches!(state.focus, FocusTarget::Button(x) if x == b);

    let mut spans = Vec::new();
    if state.step() != Step::Success {
        spans.push(button_text(
            "Back",
            focused(ButtonFocus::Back),
            can_go_back(state),
        ));
        spans.push(Span::raw(" "));
    }
    spans.push(button_text(
        next_label(state.step()),
        focused(ButtonFocus::Next),
        can_go_next(state),
    ));
    if state.step() == Step::Details {
        spans.push(Span::raw(" "));
        spans.push(button_text(
            "Skip & Submit",
            focused(ButtonFocus::Skip),
            can_skip(state),
        ));
    }
    if state.step() != Step::Success {
        spans.push(Span::raw(" "));
        spans.push(button_text(
            "Cancel",
            focused(ButtonFocus::Cancel),
            can_cancel(state),
        ));
    }

    let p = Paragraph::new(Text::from(Line::from(spans))).alignment(Alignment::Right);
    f.render_widget(p, area);
}

fn button_text(label: &str, focused: bool, enabled: bool) -> Span<'static> {
    let mut style = Style::default();
    if !enabled {
        style = style.fg(Color::DarkGray);
    }
    if focused && enabled {
        style = style.add_modifier(Modifier::REVERSED);
    }
    Span::styled(format!("[ {} ]", label), style)
}

fn draw_busy_overlay(f: &mut ratatui::Frame<'_>, window_area: Rect) {
    let area = modal_rect(window_area, 44, 5);
    f.render_widget(Clear, area);
    let p = Paragraph::new(Text::from(vec![
        Line::from(""),
        Line::from("Sending your details…"),
    ]))
    .block(Block::default().borders(Borders::ALL).title("Please wait"))
    .alignment(Alignment::Center);
    f.render_widget(p, area);
}

fn draw_cancel_modal(f: &mut ratatui::Frame<'_>, window_area: Rect, state: &WizardState) {
    let area = modal_rect(window_area, 56, 7);
    f.render_widget(Clear, area);

    let block = Block::default().borders(Borders::ALL).title("Leave the wizard?");
    let body = Paragraph::new(Text::from(vec![
        Line::from("Your answers haven't been sent and will be lost."),
        Line::from(""),
        Line::from(""),
    ]))
    .block(block)
    .wrap(Wrap { trim: false });
    f.render_widget(body, area);

    // Buttons: [Yes, leave] [No] (primary on right)
    let buttons_area = Rect {
        x: area.x + 1,
        y: area.y + area.height.saturating_sub(2),
        width: area.width.saturating_sub(2),
        height: 1,
    };

    let yes = button_text(
        "Yes, leave",
        focused_button(state) == ButtonFocus::Cancel,
        true,
    );
    let no = button_text("No", focused_button(state) == ButtonFocus::Next, true);

    let line = Line::from(vec![yes, Span::raw(" "), no]);
    let p = Paragraph::new(Text::from(line)).alignment(Alignment::Right);
    f.render_widget(p, buttons_area);
}

fn draw_message_modal(f: &mut ratatui::Frame<'_>, window_area: Rect, title: &str, body: &str) {
    let area = modal_rect(window_area, 70, 9);
    f.render_widget(Clear, area);

    let block = Block::default().borders(Borders::ALL).title(title.to_string());
    let p = Paragraph::new(Text::from(body.to_string()))
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(p, area);

    let buttons_area = Rect {
        x: area.x + 1,
        y: area.y + area.height.saturating_sub(2),
        width: area.width.saturating_sub(2),
        height: 1,
    };
    let ok = button_text("OK", true, true);
    let p = Paragraph::new(Text::from(Line::from(vec![ok]))).alignment(Alignment::Right);
    f.render_widget(p, buttons_area);
}
