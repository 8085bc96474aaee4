//! Mocked subscription plan and the features it unlocks.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

use crate::document::Verbosity;
use crate::export::ExportFormat;

/// History entries a free plan can see.
pub const FREE_HISTORY_LIMIT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    #[default]
    Free,
    Pro,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
    #[error("{feature} requires the Pro plan")]
    RequiresPro { feature: String },

    #[error("unknown plan '{0}' (expected 'free' or 'pro')")]
    Unknown(String),
}

impl Plan {
    pub fn is_pro(&self) -> bool {
        matches!(self, Plan::Pro)
    }

    pub fn check_verbosity(&self, verbosity: Verbosity) -> Result<(), PlanError> {
        if self.is_pro() || verbosity == Verbosity::Short {
            return Ok(());
        }
        Err(PlanError::RequiresPro {
            feature: format!("{verbosity} summaries"),
        })
    }

    pub fn check_export(&self, format: ExportFormat) -> Result<(), PlanError> {
        if self.is_pro() || format == ExportFormat::Markdown {
            return Ok(());
        }
        Err(PlanError::RequiresPro {
            feature: format!("{format} export"),
        })
    }

    pub fn check_history_clear(&self) -> Result<(), PlanError> {
        if self.is_pro() {
            return Ok(());
        }
        Err(PlanError::RequiresPro {
            feature: "clearing history".to_string(),
        })
    }

    /// Maximum number of history entries shown, `None` for unlimited.
    pub fn history_limit(&self) -> Option<usize> {
        match self {
            Plan::Free => Some(FREE_HISTORY_LIMIT),
            Plan::Pro => None,
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Plan::Free => f.write_str("free"),
            Plan::Pro => f.write_str("pro"),
        }
    }
}

impl FromStr for Plan {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(Plan::Free),
            "pro" => Ok(Plan::Pro),
            other => Err(PlanError::Unknown(other.to_string())),
        }
    }
}
