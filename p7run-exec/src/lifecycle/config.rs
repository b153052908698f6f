use std::time::Duration;

#[derive(Debug, Clone)]
pub struct LifecycleConfig {
    /// Poll interval while waiting for CONFIGURATION after creation.
    pub configuration_poll: Duration,
    /// Poll interval while waiting for RUNNING after the start action.
    pub running_poll: Duration,
    /// Poll interval while waiting for a terminal state.
    pub terminal_poll: Duration,
    /// Wait after a terminal state before reading results, so the server can materialize them.
    pub settle_delay: Duration,
    pub configuration_timeout: Option<Duration>,
    pub running_timeout: Option<Duration>,
    pub terminal_timeout: Option<Duration>,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            configuration_poll: Duration::from_millis(100),
            running_poll: Duration::from_secs(2),
            terminal_poll: Duration::from_secs(2),
            settle_delay: Duration::from_secs(30),
            configuration_timeout: Some(Duration::from_secs(600)),
            running_timeout: Some(Duration::from_secs(600)),
            terminal_timeout: None,
        }
    }
}
