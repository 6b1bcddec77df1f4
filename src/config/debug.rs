//! Debugging feature flags.

pub struct LogFlags {
    /// Which conversion path each normalization took.
    pub log_normalization: bool,

    /// Trace index bookkeeping on show/hide/replot.
    pub log_registry: bool,

    /// Fetch responses dropped because a newer request superseded them.
    pub log_stale_responses: bool,

    /// Activate trace_time macro (for cool scope-level timing)
    pub log_performance: bool,
}

pub const DF: LogFlags = LogFlags {
    log_normalization: false,
    log_registry: false,
    log_stale_responses: true,
    log_performance: false,
};
