use aire_core::{AireError, Band, MetricKind, Severity, ThresholdRegistry};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 配置文件中的单个分段
///
/// ```toml
/// [[thresholds.co2]]
/// upper = 800
/// status = "Bueno"
/// severity = 0
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BandConfig {
    /// 不含上界；最后一个分段省略
    #[serde(default)]
    pub upper: Option<f64>,
    pub status: String,
    /// 0 = 正常, 1 = 偏高, 2 = 严重
    pub severity: u8,
}

impl BandConfig {
    pub fn to_band(&self, metric: MetricKind) -> aire_core::Result<Band> {
        let severity = Severity::from_level(self.severity).ok_or_else(|| {
            AireError::InvalidBands(format!(
                "{}: severity {} out of range 0-2",
                metric, self.severity
            ))
        })?;
        Ok(Band::new(metric, self.upper, self.status.clone(), severity))
    }
}

/// 在标准分段上叠加配置中的覆盖
pub fn build_registry(
    overrides: &BTreeMap<String, Vec<BandConfig>>,
) -> aire_core::Result<ThresholdRegistry> {
    let mut registry = ThresholdRegistry::standard();
    for (tag, bands) in overrides {
        let metric: MetricKind = tag.parse()?;
        let bands = bands
            .iter()
            .map(|band| band.to_band(metric))
            .collect::<aire_core::Result<Vec<_>>>()?;
        registry = registry.with_override(metric, bands)?;
    }
    Ok(registry)
}
