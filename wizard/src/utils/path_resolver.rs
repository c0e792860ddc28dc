use anyhow::Result;
use std::path::PathBuf;

const LOG_FOLDER_NAME: &str = "Lead_Wizard_Log";

/// Resolve deployment folder (absolute path)
pub fn resolve_deployment_folder() -> Result<PathBuf> {
    // Prefer the folder where the binary is running from
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(dir) = exe_path.parent() {
            return Ok(dir.to_path_buf());
        }
    }

    // Fallback: current working directory
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    Ok(cwd)
}

/// Resolve log folder (absolute path)
pub fn resolve_log_folder() -> Result<PathBuf> {
    // Walk up from CWD looking for an existing `Lead_Wizard_Log/`, or the
    // workspace root (a `Cargo.toml` declaring `[workspace]`), so running
    // from `wizard/` doesn't scatter log folders into the crate directory.
    if let Ok(mut dir) = std::env::current_dir() {
        for _ in 0..12 {
            let candidate = dir.join(LOG_FOLDER_NAME);
            if candidate.exists() {
                return Ok(candidate);
            }

            if is_workspace_root(&dir) {
                std::fs::create_dir_all(&candidate)
                    .map_err(|e| anyhow::anyhow!("Failed to create log folder: {}", e))?;
                return Ok(candidate);
            }

            if let Some(parent) = dir.parent() {
                dir = parent.to_path_buf();
            } else {
                break;
            }
        }
    }

    // Fallback: per-user data dir, then the deployment folder.
    let base = match dirs::data_local_dir() {
        Some(d) => d.join("vibely"),
        None => resolve_deployment_folder()?,
    };
    let log_dir = base.join(LOG_FOLDER_NAME);
    std::fs::create_dir_all(&log_dir)
        .map_err(|e| anyhow::anyhow!("Failed to create log folder: {}", e))?;
    Ok(log_dir)
}

fn is_workspace_root(dir: &std::path::Path) -> bool {
    std::fs::read_to_string(dir.join("Cargo.toml"))
        .map(|s| s.contains("[workspace]"))
        .unwrap_or(false)
}

/// Per-user config file location (`<config dir>/vibely/lead-wizard.toml`).
pub fn default_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("vibely").join("lead-wizard.toml"))
}
