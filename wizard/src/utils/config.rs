//! Wizard configuration.
//!
//! Layered with the `config` crate: built-in defaults, then an optional TOML
//! file, then `LEAD_WIZARD_*` environment variables.

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use log::info;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::models::requests::DEFAULT_UPLOAD_CEILING_BYTES;
use crate::utils::validation::{is_valid_email, PhonePolicy};

pub const DEFAULT_ENDPOINT_URL: &str = "https://forms.vibely.co.nz/preview-request";
pub const SUPPORT_EMAIL: &str = "hello@vibely.co.nz";
pub const ENV_PREFIX: &str = "LEAD_WIZARD";

#[derive(Debug, Clone)]
pub struct WizardConfig {
    pub endpoint_url: Url,
    pub upload_ceiling_bytes: u64,
    /// Client-side request timeout. `None` leaves it to the transport.
    pub request_timeout: Option<Duration>,
    pub phone_policy: PhonePolicy,
    pub support_email: String,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            endpoint_url: Url::parse(DEFAULT_ENDPOINT_URL).expect("default endpoint URL is valid"),
            upload_ceiling_bytes: DEFAULT_UPLOAD_CEILING_BYTES,
            request_timeout: None,
            phone_policy: PhonePolicy::default(),
            support_email: SUPPORT_EMAIL.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    endpoint_url: String,
    upload_ceiling_bytes: u64,
    #[serde(default)]
    request_timeout_secs: Option<u64>,
    phone_policy: PhonePolicy,
    support_email: String,
}

impl WizardConfig {
    /// Load configuration. An explicit `file` must exist; otherwise the
    /// per-user config file is used when present.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("endpoint_url", DEFAULT_ENDPOINT_URL)?
            .set_default("upload_ceiling_bytes", DEFAULT_UPLOAD_CEILING_BYTES as i64)?
            .set_default("phone_policy", "required")?
            .set_default("support_email", SUPPORT_EMAIL)?;

        match file {
            Some(path) => {
                builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
            }
            None => {
                if let Some(path) = crate::utils::path_resolver::default_config_file() {
                    builder =
                        builder.add_source(File::from(path).format(FileFormat::Toml).required(false));
                }
            }
        }

        let raw: RawConfig = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .context("Failed to read wizard configuration")?
            .try_deserialize()
            .context("Invalid wizard configuration")?;

        let cfg = Self::from_raw(raw)?;
        info!(
            "[PHASE: initialization] [STEP: config] Configuration loaded (endpoint={}, ceiling_bytes={}, phone_policy={:?})",
            cfg.endpoint_url, cfg.upload_ceiling_bytes, cfg.phone_policy
        );
        Ok(cfg)
    }

    fn from_raw(raw: RawConfig) -> Result<Self> {
        let endpoint_url = Url::parse(raw.endpoint_url.trim())
            .with_context(|| format!("endpoint_url is not a valid URL: {}", raw.endpoint_url))?;
        if !matches!(endpoint_url.scheme(), "http" | "https") {
            anyhow::bail!("endpoint_url must use http or https");
        }

        let support_email = raw.support_email.trim().to_string();
        if !is_valid_email(&support_email) {
            anyhow::bail!("support_email is not a valid email address");
        }

        let request_timeout = match raw.request_timeout_secs {
            Some(0) | None => None,
            Some(secs) => Some(Duration::from_secs(secs)),
        };

        Ok(Self {
            endpoint_url,
            upload_ceiling_bytes: raw.upload_ceiling_bytes,
            request_timeout,
            phone_policy: raw.phone_policy,
            support_email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("create temp config");
        file.write_all(contents.as_bytes()).expect("write temp config");
        file
    }

    #[test]
    fn defaults_match_the_built_in_values() {
        let cfg = WizardConfig::default();
        assert_eq!(cfg.endpoint_url.as_str(), DEFAULT_ENDPOINT_URL);
        assert_eq!(cfg.upload_ceiling_bytes, 8 * 1024 * 1024);
        assert_eq!(cfg.phone_policy, PhonePolicy::Required);
        assert_eq!(cfg.support_email, SUPPORT_EMAIL);
        assert!(cfg.request_timeout.is_none());
    }

    #[test]
    fn file_values_override_defaults() {
        let file = write_config(
            r#"
endpoint_url = "http://localhost:8080/leads"
upload_ceiling_bytes = 1024
request_timeout_secs = 30
phone_policy = "pattern"
"#,
        );

        let cfg = WizardConfig::load(Some(file.path())).expect("load config");
        assert_eq!(cfg.endpoint_url.as_str(), "http://localhost:8080/leads");
        assert_eq!(cfg.upload_ceiling_bytes, 1024);
        assert_eq!(cfg.request_timeout, Some(Duration::from_secs(30)));
        assert_eq!(cfg.phone_policy, PhonePolicy::Pattern);
        assert_eq!(cfg.support_email, SUPPORT_EMAIL);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let missing = dir.path().join("nope.toml");
        assert!(WizardConfig::load(Some(&missing)).is_err());
    }

    #[test]
    fn non_http_endpoint_is_rejected() {
        let file = write_config(r#"endpoint_url = "ftp://forms.example/leads""#);
        let err = WizardConfig::load(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("http"), "{}", err);
    }

    #[test]
    fn zero_timeout_means_transport_default() {
        let file = write_config("request_timeout_secs = 0");
        let cfg = WizardConfig::load(Some(file.path())).expect("load config");
        assert!(cfg.request_timeout.is_none());
    }

    #[test]
    fn environment_overrides_file() {
        // Other loads in this module tolerate Pattern if they run concurrently.
        std::env::set_var("LEAD_WIZARD_PHONE_POLICY", "pattern");
        let file = write_config(r#"phone_policy = "required""#);
        let loaded = WizardConfig::load(Some(file.path()));
        std::env::remove_var("LEAD_WIZARD_PHONE_POLICY");

        let cfg = loaded.expect("load config");
        assert_eq!(cfg.phone_policy, PhonePolicy::Pattern);
    }
}
