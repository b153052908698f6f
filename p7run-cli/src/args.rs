use clap::Args;

use crate::output::OutputFormat;

#[derive(Debug, Args, Clone)]
pub struct OutputArgs {
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    #[arg(long, short)]
    pub quiet: bool,
}

#[derive(Debug, Args, Clone)]
pub struct ServerArgs {
    #[arg(long, env = "P7RUN_BASE_URL", default_value = "http://pseven.online/")]
    pub base_url: String,
    /// Secret reference of the API token (secrets://ENV_VAR or file-secrets://PATH).
    #[arg(long, env = "P7RUN_TOKEN_REF", default_value = "secrets://P7RUN_API_TOKEN")]
    pub token: String,
    /// Per-request timeout in milliseconds.
    #[arg(long, default_value_t = 30000)]
    pub timeout: u64,
}

#[derive(Debug, Args, Clone)]
pub struct LifecycleArgs {
    #[arg(long, default_value_t = 100)]
    pub configuration_poll_ms: u64,
    #[arg(long, default_value_t = 2000)]
    pub running_poll_ms: u64,
    #[arg(long, default_value_t = 2000)]
    pub terminal_poll_ms: u64,
    /// Wait before reading results of a finished run.
    #[arg(long, default_value_t = 30)]
    pub settle_seconds: u64,
    /// 0 disables the limit.
    #[arg(long, default_value_t = 600)]
    pub configuration_timeout_seconds: u64,
    /// 0 disables the limit.
    #[arg(long, default_value_t = 600)]
    pub running_timeout_seconds: u64,
    /// 0 disables the limit.
    #[arg(long, default_value_t = 0)]
    pub terminal_timeout_seconds: u64,
}

#[derive(Debug, Args, Clone)]
pub struct RetryArgs {
    /// Total time budget for retrying one request, in seconds.
    #[arg(long, default_value_t = 600)]
    pub retry_max_elapsed: u64,
    /// Longest single backoff wait, in milliseconds.
    #[arg(long, default_value_t = 10_000)]
    pub retry_max_delay: u64,
    #[arg(long)]
    pub retry_max_attempts: Option<usize>,
    #[arg(long, default_value = "none")]
    pub retry_jitter: String,
}
