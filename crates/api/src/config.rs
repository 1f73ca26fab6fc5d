use std::str::FromStr;
use std::time::Duration;

use genbatch_core::polling::PollPolicy;
use genbatch_inference::adapters::{InferenceConfig, ModelKind};
use genbatch_pipeline::orchestrator::BatchDefaults;
use genbatch_pipeline::scheduler::SchedulerSettings;
use genbatch_records::airtable::{RecordStoreConfig, DEFAULT_API_URL};
use genbatch_records::fields::FieldMap;

/// Errors raised while loading [`ServerConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var}='{value}' is invalid: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Server configuration loaded from environment variables.
///
/// Everything except the backend and record store credentials has a
/// default suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8080`).
    pub port: u16,
    /// HTTP request timeout in seconds (default: `30`). Only bounds the
    /// request itself; detached batches are not affected.
    pub request_timeout_secs: u64,
    /// How long shutdown waits for in-flight batches (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Emit JSON log lines instead of the human-readable format.
    pub log_json: bool,
    pub inference: InferenceConfig,
    pub records: RecordStoreConfig,
    pub fields: FieldMap,
    pub defaults: BatchDefaults,
    pub scheduler: SchedulerSettings,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                        |
    /// |-------------------------|--------------------------------|
    /// | `HOST`                  | `0.0.0.0`                      |
    /// | `PORT`                  | `8080`                         |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                           |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `30`                           |
    /// | `LOG_FORMAT`            | `text` (`json` for JSON lines) |
    /// | `INFERENCE_API_URL`     | required                       |
    /// | `INFERENCE_API_KEY`     | required                       |
    /// | `INFERENCE_MODEL`       | required                       |
    /// | `INFERENCE_MODEL_KIND`  | `image_edit`                   |
    /// | `RECORD_STORE_API_URL`  | `https://api.airtable.com/v0`  |
    /// | `RECORD_STORE_API_KEY`  | required                       |
    /// | `RECORD_DEFAULT_TABLE`  | `Generations`                  |
    /// | `FIELD_INPUTS`          | `Input Images`                 |
    /// | `FIELD_PROMPT`          | `Prompt`                       |
    /// | `FIELD_OUTPUTS`         | `Outputs`                      |
    /// | `FIELD_STATUS`          | `Status`                       |
    /// | `FIELD_ERROR`           | `Error`                        |
    /// | `FIELD_RESOLUTION`      | `Resolution`                   |
    /// | `FIELD_COUNT`           | `Count`                        |
    /// | `DEFAULT_JOB_COUNT`     | `4`                            |
    /// | `DEFAULT_TIMEOUT_SECS`  | `600`                          |
    /// | `DEFAULT_RESOLUTION`    | `1080p`                        |
    /// | `MAX_CONCURRENCY`       | `4`                            |
    /// | `GROUP_PAUSE_MS`        | `1000`                         |
    /// | `POLL_INITIAL_MS`       | `3000`                         |
    /// | `POLL_INCREMENT_MS`     | `2000`                         |
    /// | `POLL_MAX_MS`           | `15000`                        |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);
        let field_defaults = FieldMap::default();

        let inference = InferenceConfig {
            api_url: env.required("INFERENCE_API_URL")?,
            api_key: env.required("INFERENCE_API_KEY")?,
            model: env.required("INFERENCE_MODEL")?,
            kind: env.parsed::<ModelKind>("INFERENCE_MODEL_KIND", ModelKind::ImageEdit)?,
        };

        let records = RecordStoreConfig {
            api_url: env.or("RECORD_STORE_API_URL", DEFAULT_API_URL),
            api_key: env.required("RECORD_STORE_API_KEY")?,
            default_table: env.or("RECORD_DEFAULT_TABLE", "Generations"),
        };

        let fields = FieldMap {
            inputs: env.or("FIELD_INPUTS", &field_defaults.inputs),
            prompt: env.or("FIELD_PROMPT", &field_defaults.prompt),
            outputs: env.or("FIELD_OUTPUTS", &field_defaults.outputs),
            status: env.or("FIELD_STATUS", &field_defaults.status),
            error: env.or("FIELD_ERROR", &field_defaults.error),
            resolution: env.or("FIELD_RESOLUTION", &field_defaults.resolution),
            count: env.or("FIELD_COUNT", &field_defaults.count),
        };

        let defaults = BatchDefaults {
            job_count: env.parsed("DEFAULT_JOB_COUNT", 4u32)?,
            job_timeout: Duration::from_secs(env.parsed("DEFAULT_TIMEOUT_SECS", 600u64)?),
            resolution: env.or("DEFAULT_RESOLUTION", "1080p"),
        };

        let scheduler = SchedulerSettings {
            max_concurrency: env.parsed("MAX_CONCURRENCY", 4usize)?,
            group_pause: Duration::from_millis(env.parsed("GROUP_PAUSE_MS", 1000u64)?),
            poll_policy: PollPolicy::new(
                Duration::from_millis(env.parsed("POLL_INITIAL_MS", 3000u64)?),
                Duration::from_millis(env.parsed("POLL_INCREMENT_MS", 2000u64)?),
                Duration::from_millis(env.parsed("POLL_MAX_MS", 15000u64)?),
            ),
        };

        Ok(Self {
            host: env.or("HOST", "0.0.0.0"),
            port: env.parsed("PORT", 8080u16)?,
            request_timeout_secs: env.parsed("REQUEST_TIMEOUT_SECS", 30u64)?,
            shutdown_timeout_secs: env.parsed("SHUTDOWN_TIMEOUT_SECS", 30u64)?,
            log_json: env
                .lookup("LOG_FORMAT")
                .is_some_and(|v| v.eq_ignore_ascii_case("json")),
            inference,
            records,
            fields,
            defaults,
            scheduler,
        })
    }
}

/// Typed accessors over a key lookup. Blank values count as unset.
struct Env<'a, F: Fn(&str) -> Option<String>>(&'a F);

impl<F: Fn(&str) -> Option<String>> Env<'_, F> {
    fn lookup(&self, var: &str) -> Option<String> {
        (self.0)(var)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn or(&self, var: &str, default: &str) -> String {
        self.lookup(var).unwrap_or_else(|| default.to_string())
    }

    fn required(&self, var: &'static str) -> Result<String, ConfigError> {
        self.lookup(var).ok_or(ConfigError::Missing(var))
    }

    fn parsed<T>(&self, var: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.lookup(var) {
            None => Ok(default),
            Some(value) => value.parse().map_err(|e: T::Err| ConfigError::Invalid {
                var,
                reason: e.to_string(),
                value,
            }),
        }
    }
}
