//! Debugging feature flags.

/// Activate trace_time macro (scope-level timing of the slow pipeline stages)
pub const LOG_PERFORMANCE: bool = true;

#[allow(dead_code)]
pub struct LogFlags {
    /// Log the loss of every training epoch (otherwise only the summary line).
    pub log_training_epochs: bool,

    /// Log outgoing provider requests and their bar counts.
    pub log_provider_requests: bool,

    /// Log job submission / completion on the worker pool.
    pub log_pool_jobs: bool,

    /// Log every autoregressive step of the forecast rollout.
    pub log_rollout_steps: bool,

    /// Log the indicator snapshot of the latest bar.
    pub log_indicators: bool,
}

pub const DF: LogFlags = LogFlags {
    log_training_epochs: false,
    log_provider_requests: true,
    log_pool_jobs: false,
    log_rollout_steps: false,
    log_indicators: false,
};
