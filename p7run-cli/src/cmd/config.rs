use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use p7run_core::Inputs;
use p7run_exec::retry::{Jitter, RetryConfig};
use p7run_exec::secrets::{default_provider, SecretRef, SecretsProvider};
use p7run_exec::upload::UploadFile;
use p7run_exec::{ApiClient, ClientConfig, LifecycleConfig, ReqwestHttpClient};

use crate::{LifecycleArgs, RetryArgs, ServerArgs};

/// Inputs file (JSON or YAML object) merged with `--set` values; later values win.
pub fn load_inputs(path: Option<&Path>, set_inputs: &[String]) -> Result<Inputs, String> {
    let mut inputs = match path {
        Some(path) => read_inputs_file(path)?,
        None => Inputs::new(),
    };
    for s in set_inputs {
        let (name, raw) = s
            .split_once('=')
            .filter(|(name, _)| !name.is_empty())
            .ok_or_else(|| format!("invalid --set '{s}' (expected NAME=VALUE)"))?;
        inputs.insert(name.to_string(), parse_literal(raw));
    }
    Ok(inputs)
}

fn read_inputs_file(path: &Path) -> Result<Inputs, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read inputs {}: {e}", path.display()))?;
    let value: serde_json::Value = match serde_json::from_str(&content) {
        Ok(v) => v,
        Err(_) => serde_yaml::from_str(&content)
            .map_err(|_| "inputs file is neither valid JSON nor YAML".to_string())?,
    };
    match value {
        serde_json::Value::Object(map) => Ok(map),
        _ => Err("inputs file must contain an object of NAME: VALUE pairs".to_string()),
    }
}

/// `8` -> number, `[1,2]` -> list, `{"p":1}` -> mapping, anything else -> string.
fn parse_literal(raw: &str) -> serde_json::Value {
    serde_json::from_str(raw).unwrap_or_else(|_| serde_json::Value::String(raw.to_string()))
}

/// `LOCAL=DEST`, or just `LOCAL` to upload under the same file name at the top level.
pub fn parse_uploads(specs: &[String]) -> Result<Vec<UploadFile>, String> {
    specs
        .iter()
        .map(|s| {
            let (local, dest) = match s.split_once('=') {
                Some((local, dest)) => (local, dest.to_string()),
                None => {
                    let name = Path::new(s)
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    (s.as_str(), name)
                }
            };
            if local.is_empty() || dest.is_empty() {
                return Err(format!("invalid --upload '{s}' (expected LOCAL=DEST)"));
            }
            Ok(UploadFile {
                local_path: PathBuf::from(local),
                destination: dest,
            })
        })
        .collect()
}

pub fn build_retry_config(retry: &RetryArgs) -> Result<RetryConfig, String> {
    Ok(RetryConfig {
        max_elapsed: Duration::from_secs(retry.retry_max_elapsed),
        max_delay: Duration::from_millis(retry.retry_max_delay),
        max_attempts: retry.retry_max_attempts,
        jitter: retry.retry_jitter.parse::<Jitter>()?,
        ..Default::default()
    })
}

pub fn build_lifecycle_config(args: &LifecycleArgs) -> LifecycleConfig {
    let limit = |secs: u64| (secs > 0).then(|| Duration::from_secs(secs));
    LifecycleConfig {
        configuration_poll: Duration::from_millis(args.configuration_poll_ms),
        running_poll: Duration::from_millis(args.running_poll_ms),
        terminal_poll: Duration::from_millis(args.terminal_poll_ms),
        settle_delay: Duration::from_secs(args.settle_seconds),
        configuration_timeout: limit(args.configuration_timeout_seconds),
        running_timeout: limit(args.running_timeout_seconds),
        terminal_timeout: limit(args.terminal_timeout_seconds),
    }
}

/// Errors split by exit code: invalid arguments vs. runtime failures.
pub enum SetupError {
    Invalid(String),
    Runtime(String),
}

pub async fn build_client(server: &ServerArgs, retry: &RetryArgs) -> Result<ApiClient, SetupError> {
    let base_url = url::Url::parse(&server.base_url)
        .map_err(|e| SetupError::Invalid(format!("invalid --base-url '{}': {e}", server.base_url)))?;
    let secret_ref = SecretRef::parse(&server.token)
        .map_err(|e| SetupError::Invalid(format!("invalid --token: {e}")))?;
    let retry = build_retry_config(retry).map_err(SetupError::Invalid)?;

    let token = default_provider()
        .get(&secret_ref)
        .await
        .map_err(|e| SetupError::Runtime(format!("failed to resolve API token: {e}")))?;
    let http = ReqwestHttpClient::new().map_err(|e| SetupError::Runtime(e.to_string()))?;

    let mut config = ClientConfig::new(base_url);
    config.request_timeout = Duration::from_millis(server.timeout);
    config.retry = retry;
    ApiClient::new(Arc::new(http), config, token)
        .map_err(|e| SetupError::Invalid(format!("invalid API token: {e}")))
}
