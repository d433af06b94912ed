use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AireError;

/// 监测指标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    /// 二氧化碳 (ppm)
    Co2,
    /// 细颗粒物 PM2.5 (μg/m³)
    Pm25,
    /// 可吸入颗粒物 PM10 (μg/m³)
    Pm10,
    /// 相对湿度 (%)
    Humidity,
    /// 温度 (°C)
    Temperature,
    /// 紫外线指数
    Uv,
}

impl MetricKind {
    /// 全部指标，按报表列顺序排列
    pub const ALL: [MetricKind; 6] = [
        MetricKind::Co2,
        MetricKind::Pm25,
        MetricKind::Pm10,
        MetricKind::Humidity,
        MetricKind::Temperature,
        MetricKind::Uv,
    ];

    /// 稳定标识（配置、导出文件中使用）
    pub fn tag(&self) -> &'static str {
        match self {
            MetricKind::Co2 => "co2",
            MetricKind::Pm25 => "pm25",
            MetricKind::Pm10 => "pm10",
            MetricKind::Humidity => "humidity",
            MetricKind::Temperature => "temperature",
            MetricKind::Uv => "uv",
        }
    }

    /// 显示名称
    pub fn display_name(&self) -> &'static str {
        match self {
            MetricKind::Co2 => "CO₂",
            MetricKind::Pm25 => "PM2.5",
            MetricKind::Pm10 => "PM10",
            MetricKind::Humidity => "Humedad",
            MetricKind::Temperature => "Temperatura",
            MetricKind::Uv => "Índice UV",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            MetricKind::Co2 => "ppm",
            MetricKind::Pm25 | MetricKind::Pm10 => "μg/m³",
            MetricKind::Humidity => "%",
            MetricKind::Temperature => "°C",
            MetricKind::Uv => "",
        }
    }

    /// 列标签，例如 `CO₂ (ppm)`
    pub fn label(&self) -> String {
        match self.unit() {
            "" => self.display_name().to_string(),
            unit => format!("{} ({})", self.display_name(), unit),
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for MetricKind {
    type Err = AireError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        MetricKind::ALL
            .iter()
            .copied()
            .find(|metric| metric.tag() == normalized)
            .ok_or_else(|| AireError::UnknownMetric(s.to_string()))
    }
}

/// 严重程度（0=正常，1=偏高，2=严重）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Normal,
    Elevated,
    Critical,
}

impl Severity {
    pub fn level(&self) -> u8 {
        match self {
            Severity::Normal => 0,
            Severity::Elevated => 1,
            Severity::Critical => 2,
        }
    }

    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            0 => Some(Severity::Normal),
            1 => Some(Severity::Elevated),
            2 => Some(Severity::Critical),
            _ => None,
        }
    }

    /// 是否超过阈值（severity ≥ 1）
    pub fn is_above_threshold(&self) -> bool {
        *self >= Severity::Elevated
    }
}

/// 采样点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// 时间标签（如 `8:00`、`Lun`），同一序列内唯一且按时间排序
    pub timestamp: String,
    pub metric: MetricKind,
    pub value: f64,
}

impl Sample {
    pub fn new(timestamp: impl Into<String>, metric: MetricKind, value: f64) -> Self {
        Self {
            timestamp: timestamp.into(),
            metric,
            value,
        }
    }
}

/// 预测点，由外部预测服务提供
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionPoint {
    pub timestamp: String,
    pub current_value: f64,
    pub predicted_value: f64,
    /// 置信度（0-100）
    pub confidence_percent: f64,
}

impl PredictionPoint {
    pub fn new(
        timestamp: impl Into<String>,
        current_value: f64,
        predicted_value: f64,
        confidence_percent: f64,
    ) -> Self {
        Self {
            timestamp: timestamp.into(),
            current_value,
            predicted_value,
            confidence_percent,
        }
    }
}

/// 分类结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub value: f64,
    pub status: String,
    pub severity: Severity,
}

/// 窗口聚合结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub metric: MetricKind,
    pub window_size: usize,
    pub mean: f64,
    pub max: f64,
    pub min: f64,
    pub count_above_threshold: usize,
}

/// 告警等级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertTier {
    Info,
    Medium,
    High,
}

impl AlertTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertTier::Info => "info",
            AlertTier::Medium => "medium",
            AlertTier::High => "high",
        }
    }
}

impl fmt::Display for AlertTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 预测告警
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// 在有序结果中的位置（从 1 开始）
    pub id: u32,
    pub metric: MetricKind,
    pub current_value: f64,
    pub predicted_value: f64,
    /// 被突破的分段下界
    pub threshold: f64,
    pub timestamp: String,
    pub confidence_percent: f64,
    pub severity: Severity,
    pub tier: AlertTier,
    pub message: String,
    pub recommendation: String,
}

/// 查询时间范围
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowRange {
    Week,
    Month,
    Year,
}

impl WindowRange {
    pub fn tag(&self) -> &'static str {
        match self {
            WindowRange::Week => "week",
            WindowRange::Month => "month",
            WindowRange::Year => "year",
        }
    }

    /// 报表中的时间段描述
    pub fn period_label(&self) -> &'static str {
        match self {
            WindowRange::Week => "Última semana",
            WindowRange::Month => "Último mes",
            WindowRange::Year => "Último año",
        }
    }

    /// 导出文件名，例如 `reporte-calidad-aire-week.csv`
    pub fn export_file_name(&self, extension: &str) -> String {
        format!("reporte-calidad-aire-{}.{}", self.tag(), extension)
    }
}

impl FromStr for WindowRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "week" => Ok(WindowRange::Week),
            "month" => Ok(WindowRange::Month),
            "year" => Ok(WindowRange::Year),
            other => Err(format!("unknown window range: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_tag_roundtrip() {
        for metric in MetricKind::ALL {
            assert_eq!(metric.tag().parse::<MetricKind>().unwrap(), metric);
        }
        assert_eq!(" PM25 ".parse::<MetricKind>().unwrap(), MetricKind::Pm25);
    }

    #[test]
    fn test_unknown_metric_tag() {
        let err = "ozone".parse::<MetricKind>().unwrap_err();
        assert!(matches!(err, AireError::UnknownMetric(tag) if tag == "ozone"));
    }

    #[test]
    fn test_metric_labels() {
        assert_eq!(MetricKind::Co2.label(), "CO₂ (ppm)");
        assert_eq!(MetricKind::Pm25.label(), "PM2.5 (μg/m³)");
        assert_eq!(MetricKind::Uv.label(), "Índice UV");
    }

    #[test]
    fn test_severity_order() {
        assert!(Severity::Critical > Severity::Elevated);
        assert!(!Severity::Normal.is_above_threshold());
        assert!(Severity::Elevated.is_above_threshold());
        assert_eq!(Severity::from_level(2), Some(Severity::Critical));
        assert_eq!(Severity::from_level(3), None);
    }

    #[test]
    fn test_window_range() {
        let range: WindowRange = "month".parse().unwrap();
        assert_eq!(range.period_label(), "Último mes");
        assert_eq!(range.export_file_name("csv"), "reporte-calidad-aire-month.csv");
        assert!("decade".parse::<WindowRange>().is_err());
    }

    #[test]
    fn test_alert_tier_serialization() {
        let json = serde_json::to_string(&AlertTier::High).unwrap();
        assert_eq!(json, "\"high\"");
        assert!(AlertTier::High > AlertTier::Medium);
        assert!(AlertTier::Medium > AlertTier::Info);
    }
}
