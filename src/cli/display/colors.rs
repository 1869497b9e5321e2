//! Color theme for CLI output

use crate::domain::workload::Rollback;
use crate::infrastructure::kubernetes::client::CreateOutcome;
use comfy_table::Color as TableColor;

/// Color theme for terminal output
#[derive(Debug, Clone)]
pub struct ColorTheme {
    pub success: TableColor,
    pub warning: TableColor,
    pub error: TableColor,
    pub info: TableColor,
    pub muted: TableColor,
}

impl Default for ColorTheme {
    fn default() -> Self {
        Self {
            success: TableColor::Green,
            warning: TableColor::Yellow,
            error: TableColor::Red,
            info: TableColor::Cyan,
            muted: TableColor::DarkGrey,
        }
    }
}

impl ColorTheme {
    /// Get color based on replica status
    pub fn get_replica_color(&self, ready: u32, total: u32) -> TableColor {
        if total == 0 {
            self.muted
        } else if ready == total {
            self.success
        } else if ready > 0 {
            self.warning
        } else {
            self.error
        }
    }

    /// Reused resources are shown in the info color, fresh ones as success.
    pub fn get_outcome_color(&self, outcome: CreateOutcome) -> TableColor {
        match outcome {
            CreateOutcome::Created => self.success,
            CreateOutcome::AlreadyExists => self.info,
        }
    }

    pub fn get_rollback_color(&self, rollback: &Rollback) -> TableColor {
        match rollback {
            Rollback::Performed => self.warning,
            Rollback::Partial { .. } => self.error,
            Rollback::NotAttempted => self.muted,
        }
    }
}
