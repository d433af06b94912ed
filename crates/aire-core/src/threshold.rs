use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{AireError, Result};
use crate::model::{MetricKind, Severity};
use crate::report::DELIMITER;

lazy_static! {
    static ref STANDARD_REGISTRY: ThresholdRegistry = ThresholdRegistry::standard();
}

/// 阈值分段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub metric: MetricKind,

    /// 上界（不含）；最后一个分段为 None，表示无上界
    pub upper_bound_exclusive: Option<f64>,

    /// 状态文本
    pub status: String,

    pub severity: Severity,
}

impl Band {
    pub fn new(
        metric: MetricKind,
        upper_bound_exclusive: Option<f64>,
        status: impl Into<String>,
        severity: Severity,
    ) -> Self {
        Self {
            metric,
            upper_bound_exclusive,
            status: status.into(),
            severity,
        }
    }

    /// 数值是否落在该分段上界以下
    pub fn admits(&self, value: f64) -> bool {
        match self.upper_bound_exclusive {
            Some(upper) => value < upper,
            None => true,
        }
    }
}

/// 阈值注册表，进程启动时加载一次，之后只读
#[derive(Debug, Clone)]
pub struct ThresholdRegistry {
    bands: HashMap<MetricKind, Vec<Band>>,
}

impl ThresholdRegistry {
    /// 内置阈值表
    pub fn standard() -> Self {
        let bands = MetricKind::ALL
            .iter()
            .map(|metric| (*metric, standard_bands(*metric)))
            .collect();
        Self { bands }
    }

    /// 进程级共享的内置注册表
    pub fn global() -> &'static ThresholdRegistry {
        &STANDARD_REGISTRY
    }

    /// 从分段列表构建（只包含列表中出现的指标）
    pub fn from_bands(bands: Vec<Band>) -> Result<Self> {
        let mut grouped: HashMap<MetricKind, Vec<Band>> = HashMap::new();
        for band in bands {
            grouped.entry(band.metric).or_default().push(band);
        }

        for (metric, bands) in &grouped {
            validate_bands(*metric, bands)?;
        }

        Ok(Self { bands: grouped })
    }

    /// 替换单个指标的分段
    pub fn with_override(mut self, metric: MetricKind, bands: Vec<Band>) -> Result<Self> {
        if let Some(other) = bands.iter().find(|band| band.metric != metric) {
            return Err(AireError::MetricMismatch {
                expected: metric,
                found: other.metric,
            });
        }
        validate_bands(metric, &bands)?;
        self.bands.insert(metric, bands);
        Ok(self)
    }

    pub fn bands_for(&self, metric: MetricKind) -> Result<&[Band]> {
        self.bands
            .get(&metric)
            .map(Vec::as_slice)
            .ok_or_else(|| AireError::UnknownMetric(metric.tag().to_string()))
    }

    /// 告警阈值：第一个 severity ≥ 1 分段的下界
    pub fn alert_threshold(&self, metric: MetricKind) -> Result<Option<f64>> {
        let bands = self.bands_for(metric)?;
        Ok(bands
            .iter()
            .position(|band| band.severity.is_above_threshold())
            .and_then(|index| lower_bound(bands, index)))
    }

    pub fn metrics(&self) -> Vec<MetricKind> {
        let mut metrics: Vec<MetricKind> = self.bands.keys().copied().collect();
        metrics.sort();
        metrics
    }
}

impl Default for ThresholdRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

/// 分段下界（第一个分段无下界）
pub fn lower_bound(bands: &[Band], index: usize) -> Option<f64> {
    index
        .checked_sub(1)
        .and_then(|previous| bands.get(previous))
        .and_then(|band| band.upper_bound_exclusive)
}

fn standard_bands(metric: MetricKind) -> Vec<Band> {
    use Severity::*;

    let table: &[(Option<f64>, &str, Severity)] = match metric {
        MetricKind::Co2 => &[
            (Some(800.0), "Bueno", Normal),
            (Some(1000.0), "Moderado", Elevated),
            (None, "Alto", Critical),
        ],
        MetricKind::Pm25 => &[
            (Some(35.0), "Bueno", Normal),
            (Some(55.0), "Moderado", Elevated),
            (None, "Alto", Critical),
        ],
        MetricKind::Uv => &[
            (Some(3.0), "Bajo", Normal),
            (Some(6.0), "Moderado", Elevated),
            (None, "Alto", Critical),
        ],
        MetricKind::Humidity => &[(Some(70.0), "Normal", Normal), (None, "Elevado", Elevated)],
        MetricKind::Temperature => &[(Some(30.0), "Normal", Normal), (None, "Elevado", Elevated)],
        MetricKind::Pm10 => &[(Some(50.0), "Normal", Normal), (None, "Elevado", Elevated)],
    };

    table
        .iter()
        .map(|(upper, status, severity)| Band::new(metric, *upper, *status, *severity))
        .collect()
}

fn validate_bands(metric: MetricKind, bands: &[Band]) -> Result<()> {
    let invalid = |reason: String| Err(AireError::InvalidBands(format!("{}: {}", metric, reason)));

    let Some(last) = bands.last() else {
        return invalid("no bands defined".to_string());
    };
    if last.upper_bound_exclusive.is_some() {
        return invalid("last band must be open-ended".to_string());
    }
    if bands[0].severity != Severity::Normal {
        return invalid("lowest band must have severity 0".to_string());
    }

    let mut previous: Option<&Band> = None;
    for (index, band) in bands.iter().enumerate() {
        if band.status.trim().is_empty() {
            return invalid(format!("band {} has an empty status", index));
        }
        // 状态文本会写入分隔文本报表
        if band.status.contains(DELIMITER) || band.status.contains(['\n', '\r']) {
            return invalid(format!(
                "band {} status {:?} contains a delimiter or line break",
                index, band.status
            ));
        }
        if index + 1 < bands.len() {
            match band.upper_bound_exclusive {
                Some(upper) if upper.is_finite() => {}
                _ => return invalid(format!("band {} needs a finite upper bound", index)),
            }
        }
        if let Some(prev) = previous {
            if let (Some(prev_upper), Some(upper)) =
                (prev.upper_bound_exclusive, band.upper_bound_exclusive)
            {
                if upper <= prev_upper {
                    return invalid(format!("bounds must be strictly increasing at band {}", index));
                }
            }
            if band.severity < prev.severity {
                return invalid(format!("severity decreases at band {}", index));
            }
        }
        previous = Some(band);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry_covers_all_metrics() {
        let registry = ThresholdRegistry::standard();
        for metric in MetricKind::ALL {
            let bands = registry.bands_for(metric).unwrap();
            assert!(validate_bands(metric, bands).is_ok());
        }
        assert_eq!(registry.metrics().len(), MetricKind::ALL.len());
    }

    #[test]
    fn test_co2_bands() {
        let bands = ThresholdRegistry::global().bands_for(MetricKind::Co2).unwrap();
        assert_eq!(bands.len(), 3);
        assert_eq!(bands[1].status, "Moderado");
        assert_eq!(lower_bound(bands, 0), None);
        assert_eq!(lower_bound(bands, 2), Some(1000.0));
    }

    #[test]
    fn test_alert_threshold() {
        let registry = ThresholdRegistry::global();
        assert_eq!(registry.alert_threshold(MetricKind::Co2).unwrap(), Some(800.0));
        assert_eq!(registry.alert_threshold(MetricKind::Pm10).unwrap(), Some(50.0));
    }

    #[test]
    fn test_missing_metric_is_unknown() {
        let registry = ThresholdRegistry::from_bands(vec![
            Band::new(MetricKind::Co2, Some(600.0), "Bueno", Severity::Normal),
            Band::new(MetricKind::Co2, None, "Alto", Severity::Critical),
        ])
        .unwrap();

        assert!(registry.bands_for(MetricKind::Co2).is_ok());
        assert!(matches!(
            registry.bands_for(MetricKind::Uv),
            Err(AireError::UnknownMetric(_))
        ));
    }

    #[test]
    fn test_rejects_non_increasing_bounds() {
        let result = ThresholdRegistry::from_bands(vec![
            Band::new(MetricKind::Pm25, Some(50.0), "Bueno", Severity::Normal),
            Band::new(MetricKind::Pm25, Some(40.0), "Moderado", Severity::Elevated),
            Band::new(MetricKind::Pm25, None, "Alto", Severity::Critical),
        ]);
        assert!(matches!(result, Err(AireError::InvalidBands(_))));
    }

    #[test]
    fn test_rejects_decreasing_severity() {
        let result = ThresholdRegistry::standard().with_override(
            MetricKind::Humidity,
            vec![
                Band::new(MetricKind::Humidity, Some(60.0), "Normal", Severity::Normal),
                Band::new(MetricKind::Humidity, Some(80.0), "Alto", Severity::Critical),
                Band::new(MetricKind::Humidity, None, "Elevado", Severity::Elevated),
            ],
        );
        assert!(matches!(result, Err(AireError::InvalidBands(_))));
    }

    #[test]
    fn test_rejects_closed_last_band() {
        let result = ThresholdRegistry::from_bands(vec![Band::new(
            MetricKind::Uv,
            Some(3.0),
            "Bajo",
            Severity::Normal,
        )]);
        assert!(matches!(result, Err(AireError::InvalidBands(_))));
    }

    #[test]
    fn test_rejects_status_with_delimiter() {
        for status in ["Alto, ventilar", "Alto\nventilar", "Alto\r"] {
            let result = ThresholdRegistry::standard().with_override(
                MetricKind::Co2,
                vec![
                    Band::new(MetricKind::Co2, Some(800.0), "Bueno", Severity::Normal),
                    Band::new(MetricKind::Co2, None, status, Severity::Critical),
                ],
            );
            assert!(matches!(result, Err(AireError::InvalidBands(_))), "{:?}", status);
        }
    }

    #[test]
    fn test_rejects_elevated_lowest_band() {
        let result = ThresholdRegistry::from_bands(vec![
            Band::new(MetricKind::Co2, Some(800.0), "Moderado", Severity::Elevated),
            Band::new(MetricKind::Co2, None, "Alto", Severity::Critical),
        ]);
        assert!(matches!(result, Err(AireError::InvalidBands(_))));
    }

    #[test]
    fn test_override_replaces_metric() {
        let registry = ThresholdRegistry::standard()
            .with_override(
                MetricKind::Pm10,
                vec![
                    Band::new(MetricKind::Pm10, Some(62.0), "Normal", Severity::Normal),
                    Band::new(MetricKind::Pm10, None, "Elevado", Severity::Elevated),
                ],
            )
            .unwrap();
        assert_eq!(registry.alert_threshold(MetricKind::Pm10).unwrap(), Some(62.0));
    }
}
