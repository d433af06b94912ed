use thiserror::Error;

use crate::model::MetricKind;

/// AIRE Core 统一错误类型
#[derive(Error, Debug)]
pub enum AireError {
    #[error("Invalid sample: {0}")]
    InvalidSample(String),

    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    #[error("Metric mismatch: expected {expected}, found {found}")]
    MetricMismatch {
        expected: MetricKind,
        found: MetricKind,
    },

    #[error("Empty window for metric {0}")]
    EmptyWindow(MetricKind),

    #[error("Invalid confidence: {0} (expected 0-100)")]
    InvalidConfidence(f64),

    #[error("Invalid bands: {0}")]
    InvalidBands(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, AireError>;

impl AireError {
    /// 输入校验类错误（非 IO）
    pub fn is_validation(&self) -> bool {
        !matches!(self, AireError::Io(_))
    }
}
