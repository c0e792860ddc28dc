// Vibely lead capture wizard
// Library entry point

pub mod api;
pub mod models;
pub mod tui;
pub mod utils;
pub mod wizard;

use log::{error, info};
use std::path::PathBuf;

pub use api::submission::{FormSubmitter, HttpSubmitter, SubmitError};
pub use utils::config::WizardConfig;
pub use wizard::{LeadWizard, PendingSubmission, Step, Transition, WizardError};

/// Initialize logging system with dual format (JSON + human-readable)
fn init_logging(with_stdout: bool) -> Result<(), Box<dyn std::error::Error>> {
    let log_dir = utils::path_resolver::resolve_log_folder()?;
    std::fs::create_dir_all(&log_dir)?;

    let timestamp = chrono::Utc::now().format("%Y-%m-%d-%H%M%S");

    // JSON log file for structured parsing
    let json_log_file = log_dir.join(format!("lead-wizard-{}.log", timestamp));

    // Human-readable log file (.txt)
    let txt_log_file = log_dir.join(format!("lead-wizard-{}.txt", timestamp));

    // Stdout only when the terminal UI is not drawing.
    let mut dispatch = fern::Dispatch::new().level(log::LevelFilter::Debug);

    if with_stdout {
        dispatch = dispatch.chain(
            fern::Dispatch::new()
                .level(log::LevelFilter::Info)
                .format(move |out, message, record| {
                    let timestamp_local = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
                    let (phase, step, cleaned_message) =
                        utils::logging::parse_log_metadata(&message.to_string());
                    let txt_line = utils::logging::format_human_readable_log(
                        &timestamp_local.to_string(),
                        record.level(),
                        record.target(),
                        &cleaned_message,
                        phase.as_deref(),
                        step.as_deref(),
                    );
                    out.finish(format_args!("{}", txt_line));
                })
                .chain(std::io::stdout()),
        );
    }

    dispatch = dispatch
        .chain(
            fern::Dispatch::new()
                .format(move |out, message, record| {
                    let timestamp_utc = chrono::Utc::now().to_rfc3339();
                    let (phase, step, cleaned_message) =
                        utils::logging::parse_log_metadata(&message.to_string());
                    let json_line = utils::logging::format_json_log(
                        &timestamp_utc,
                        record.level(),
                        record.target(),
                        &cleaned_message,
                        phase.as_deref(),
                        step.as_deref(),
                    );
                    out.finish(format_args!("{}", json_line));
                })
                .chain(fern::log_file(json_log_file)?),
        )
        .chain(
            fern::Dispatch::new()
                .format(move |out, message, record| {
                    let timestamp_local = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
                    let (phase, step, cleaned_message) =
                        utils::logging::parse_log_metadata(&message.to_string());
                    let txt_line = utils::logging::format_human_readable_log(
                        &timestamp_local.to_string(),
                        record.level(),
                        record.target(),
                        &cleaned_message,
                        phase.as_deref(),
                        step.as_deref(),
                    );
                    out.finish(format_args!("{}", txt_line));
                })
                .chain(fern::log_file(txt_log_file)?),
        );

    dispatch.apply()?;

    log::info!(
        "[PHASE: initialization] Logging initialized, log directory: {:?}",
        log_dir
    );
    Ok(())
}

/// Interactive terminal wizard.
/// `prefill` is an externally supplied trade name (e.g. "Roofers").
pub fn run_tui(config_path: Option<PathBuf>, prefill: Option<String>) {
    // Initialize logging (no stdout to avoid corrupting the TUI)
    if let Err(e) = init_logging(false) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    info!(
        "[PHASE: initialization] Lead wizard starting at {}",
        chrono::Utc::now()
    );

    let cfg = match WizardConfig::load(config_path.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("[PHASE: initialization] [STEP: config] {:?}", e);
            eprintln!("Lead wizard configuration error: {}", e);
            std::process::exit(2);
        }
    };

    if let Err(e) = tui::run(&cfg, prefill.as_deref()) {
        error!("[PHASE: tui] [STEP: fatal] TUI exited with error: {:?}", e);
        eprintln!("Lead wizard error: {}", e);
        std::process::exit(1);
    }
}

/// Non-interactive TUI smoke mode (for automated checks).
/// Renders a single frame of the given step and exits.
pub fn run_tui_smoke(config_path: Option<PathBuf>, target: Option<String>) {
    // The smoke frame goes to an in-memory backend, so stdout is free.
    if let Err(e) = init_logging(true) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    info!(
        "[PHASE: initialization] TUI smoke starting at {}",
        chrono::Utc::now()
    );

    let cfg = match WizardConfig::load(config_path.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Lead wizard configuration error: {}", e);
            std::process::exit(2);
        }
    };

    let target = target.as_deref().unwrap_or("identity");
    if let Err(e) = tui::smoke(&cfg, target) {
        error!(
            "[PHASE: tui] [STEP: smoke] TUI smoke exited with error: {:?}",
            e
        );
        eprintln!("Lead wizard error: {}", e);
        std::process::exit(1);
    }
}
