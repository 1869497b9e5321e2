//! Status icons for CLI output

use crate::domain::workload::Rollback;
use crate::infrastructure::kubernetes::client::CreateOutcome;

/// Status icons for different states
pub struct StatusIcon;

impl StatusIcon {
    /// Success icon (all replicas ready)
    pub const SUCCESS: &'static str = "✓";

    /// Warning icon (partial replicas ready)
    pub const WARNING: &'static str = "⚠";

    /// Error icon (no replicas ready)
    pub const ERROR: &'static str = "✗";

    /// Existing resource reused
    pub const REUSED: &'static str = "=";

    pub const UNKNOWN: &'static str = "?";

    /// Get status icon based on ready/total replicas
    pub fn get_replica_icon(ready: u32, total: u32) -> &'static str {
        if total == 0 {
            Self::UNKNOWN
        } else if ready == total {
            Self::SUCCESS
        } else if ready > 0 {
            Self::WARNING
        } else {
            Self::ERROR
        }
    }

    /// Get status text based on ready/total replicas
    pub fn get_status_text(ready: u32, total: u32) -> &'static str {
        if total == 0 {
            "Unknown"
        } else if ready == total {
            "Running"
        } else if ready > 0 {
            "Degraded"
        } else {
            "Pending"
        }
    }

    pub fn get_outcome_icon(outcome: CreateOutcome) -> &'static str {
        match outcome {
            CreateOutcome::Created => Self::SUCCESS,
            CreateOutcome::AlreadyExists => Self::REUSED,
        }
    }

    pub fn get_rollback_icon(rollback: &Rollback) -> &'static str {
        match rollback {
            Rollback::Performed => Self::WARNING,
            Rollback::Partial { .. } => Self::ERROR,
            Rollback::NotAttempted => Self::UNKNOWN,
        }
    }
}
