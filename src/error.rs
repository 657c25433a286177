use std::path::PathBuf;

use thiserror::Error;

pub type ChartId = u32;

/// Failures surfaced by the scraping pipeline. Everything that happens while
/// handling a chart carries the chart id so it can be looked up on the site.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("invalid selection: {message}")]
    Configuration { message: String },

    #[error("chart {chart_id}: fetch failed: {source}")]
    Fetch {
        chart_id: ChartId,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("chart {chart_id}: page has no {element}")]
    Parse {
        chart_id: ChartId,
        element: &'static str,
    },

    #[error("chart {chart_id}: malformed title {title:?}: {reason}")]
    MalformedTitle {
        chart_id: ChartId,
        title: String,
        reason: &'static str,
    },

    #[error("chart {chart_id}, row {row}: {reason}")]
    Normalization {
        chart_id: ChartId,
        row: usize,
        reason: NormalizationFailure,
    },

    #[error("chart {chart_id}: I/O error on {}: {source}", path.display())]
    Io {
        chart_id: ChartId,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("chart {chart_id}: CSV error on {}: {source}", path.display())]
    Csv {
        chart_id: ChartId,
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Why a single leaderboard row could not become a record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizationFailure {
    #[error("no {0} found in row")]
    MissingField(&'static str),
    #[error("display name {0:?} has no quoted username")]
    MalformedUsername(String),
    #[error("submission date {0:?} is not YYYY-MM-DD")]
    MalformedDate(String),
    #[error("rank {0:?} is not a whole number")]
    MalformedRank(String),
}

impl ScrapeError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub(crate) fn normalization(
        chart_id: ChartId,
        row: usize,
        reason: NormalizationFailure,
    ) -> Self {
        Self::Normalization {
            chart_id,
            row,
            reason,
        }
    }

    /// The chart this error belongs to, if any.
    pub fn chart_id(&self) -> Option<ChartId> {
        match self {
            Self::Configuration { .. } => None,
            Self::Fetch { chart_id, .. }
            | Self::Parse { chart_id, .. }
            | Self::MalformedTitle { chart_id, .. }
            | Self::Normalization { chart_id, .. }
            | Self::Io { chart_id, .. }
            | Self::Csv { chart_id, .. } => Some(*chart_id),
        }
    }
}
