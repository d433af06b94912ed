use serde::{Deserialize, Serialize};

use crate::error::{AireError, Result};
use crate::model::{AggregateResult, MetricKind, PredictionPoint, Sample};
use crate::threshold::ThresholdRegistry;

/// 预测序列摘要
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionSummary {
    pub metric: MetricKind,
    pub count: usize,
    /// 平均置信度
    pub average_confidence: f64,
    pub peak_predicted: f64,
    /// 峰值出现的时间（并列时取最早）
    pub peak_timestamp: String,
}

impl ThresholdRegistry {
    /// 窗口聚合：均值、最大值、最小值、超阈值次数
    ///
    /// 结果与样本顺序无关：求和前先按数值排序，避免浮点累加顺序带来的差异。
    /// 每个值先除以样本数再累加，接近 `f64::MAX` 的有限值也不会溢出。
    pub fn aggregate(&self, samples: &[Sample], metric: MetricKind) -> Result<AggregateResult> {
        if samples.is_empty() {
            return Err(AireError::EmptyWindow(metric));
        }

        let mut values = Vec::with_capacity(samples.len());
        let mut count_above_threshold = 0;
        for sample in samples {
            if sample.metric != metric {
                return Err(AireError::MetricMismatch {
                    expected: metric,
                    found: sample.metric,
                });
            }
            let classification = self.classify(sample.value, metric)?;
            if classification.severity.is_above_threshold() {
                count_above_threshold += 1;
            }
            values.push(sample.value);
        }

        values.sort_by(f64::total_cmp);
        let n = values.len() as f64;
        let mean: f64 = values.iter().map(|value| value / n).sum();
        let min = values[0];
        let max = values[values.len() - 1];

        Ok(AggregateResult {
            metric,
            window_size: values.len(),
            mean,
            max,
            min,
            count_above_threshold,
        })
    }
}

/// 使用内置阈值表聚合
pub fn aggregate(samples: &[Sample], metric: MetricKind) -> Result<AggregateResult> {
    ThresholdRegistry::global().aggregate(samples, metric)
}

/// 预测序列摘要（平均置信度、峰值）
pub fn summarize_predictions(
    points: &[PredictionPoint],
    metric: MetricKind,
) -> Result<PredictionSummary> {
    let first = points.first().ok_or(AireError::EmptyWindow(metric))?;

    let mut confidences = Vec::with_capacity(points.len());
    let mut peak = first;
    for point in points {
        validate_confidence(point.confidence_percent)?;
        if !point.predicted_value.is_finite() {
            return Err(AireError::InvalidSample(format!(
                "{} predicted value at {} must be finite",
                metric, point.timestamp
            )));
        }
        if point.predicted_value > peak.predicted_value {
            peak = point;
        }
        confidences.push(point.confidence_percent);
    }

    confidences.sort_by(f64::total_cmp);
    let total: f64 = confidences.iter().sum();

    Ok(PredictionSummary {
        metric,
        count: points.len(),
        average_confidence: total / points.len() as f64,
        peak_predicted: peak.predicted_value,
        peak_timestamp: peak.timestamp.clone(),
    })
}

pub(crate) fn validate_confidence(confidence: f64) -> Result<()> {
    if confidence.is_finite() && (0.0..=100.0).contains(&confidence) {
        Ok(())
    } else {
        Err(AireError::InvalidConfidence(confidence))
    }
}
