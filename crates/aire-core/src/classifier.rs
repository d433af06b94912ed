use tracing::warn;

use crate::error::{AireError, Result};
use crate::model::{ClassificationResult, MetricKind};
use crate::threshold::{lower_bound, Band, ThresholdRegistry};

impl ThresholdRegistry {
    /// 对单个数值分类
    ///
    /// 比较为严格小于上界：恰好等于上界的值落入下一个（更严重的）分段。
    pub fn classify(&self, value: f64, metric: MetricKind) -> Result<ClassificationResult> {
        let (_, band) = self.matching_band(value, metric)?;
        Ok(ClassificationResult {
            value,
            status: band.status.clone(),
            severity: band.severity,
        })
    }

    /// 命中的分段及其下界
    pub(crate) fn matching_band(&self, value: f64, metric: MetricKind) -> Result<(Option<f64>, &Band)> {
        if !value.is_finite() {
            return Err(AireError::InvalidSample(format!(
                "{} value must be finite, got {}",
                metric, value
            )));
        }

        let bands = self.bands_for(metric)?;
        let index = bands
            .iter()
            .position(|band| band.admits(value))
            .unwrap_or(bands.len() - 1);

        Ok((lower_bound(bands, index), &bands[index]))
    }

    /// 实时面板：逐个指标分类，单个指标失败不影响其它指标
    pub fn evaluate_snapshot(
        &self,
        readings: &[(MetricKind, f64)],
    ) -> Vec<(MetricKind, Result<ClassificationResult>)> {
        readings
            .iter()
            .map(|(metric, value)| {
                let result = self.classify(*value, *metric);
                if let Err(e) = &result {
                    warn!(metric = %metric, error = %e, "Snapshot reading rejected");
                }
                (*metric, result)
            })
            .collect()
    }
}

/// 使用内置阈值表分类
pub fn classify(value: f64, metric: MetricKind) -> Result<ClassificationResult> {
    ThresholdRegistry::global().classify(value, metric)
}

/// 使用内置阈值表评估实时读数
pub fn evaluate_snapshot(readings: &[(MetricKind, f64)]) -> Vec<(MetricKind, Result<ClassificationResult>)> {
    ThresholdRegistry::global().evaluate_snapshot(readings)
}
