use aire_core::{AlertPolicy, MetricKind, RefreshSelection, WindowRange};
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::thresholds::BandConfig;

/// 全局配置
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub system: SystemConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub alerts: AlertsConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub logging: LoggingConfig,

    /// 阈值覆盖，键为指标标识（如 `co2`）
    #[serde(default)]
    pub thresholds: BTreeMap<String, Vec<BandConfig>>,
}

/// 系统配置
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SystemConfig {
    pub name: String,
    pub version: String,
}

/// 刷新与选择配置
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MonitorConfig {
    /// 刷新间隔（秒）
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,

    #[serde(default = "default_metric")]
    pub metric: String,

    /// week / month / year
    #[serde(default = "default_window")]
    pub window: String,

    #[serde(default = "default_sensor")]
    pub sensor: String,
}

/// 告警配置
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AlertsConfig {
    /// 中等告警最低置信度（0-100）
    #[serde(default = "default_medium_confidence_min")]
    pub medium_confidence_min: f64,
}

/// 导出配置
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExportConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// 文本报表每页行数
    #[serde(default = "default_rows_per_page")]
    pub rows_per_page: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 输出 JSON 格式日志
    #[serde(default)]
    pub json: bool,
}

// 默认值函数
fn default_refresh_interval_secs() -> u64 {
    30
}

fn default_metric() -> String {
    "co2".to_string()
}

fn default_window() -> String {
    "week".to_string()
}

fn default_sensor() -> String {
    aire_core::report::DEFAULT_SENSOR_LABEL.to_string()
}

fn default_medium_confidence_min() -> f64 {
    AlertPolicy::default().medium_confidence_min
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./reports")
}

fn default_rows_per_page() -> usize {
    25
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            name: "AIRE Air Quality Monitor".to_string(),
            version: "1.0.0".to_string(),
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval_secs(),
            metric: default_metric(),
            window: default_window(),
            sensor: default_sensor(),
        }
    }
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            medium_confidence_min: default_medium_confidence_min(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            rows_per_page: default_rows_per_page(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl MonitorConfig {
    pub fn metric(&self) -> Result<MetricKind> {
        Ok(self.metric.parse()?)
    }

    pub fn window(&self) -> Result<WindowRange> {
        self.window.parse().map_err(|e: String| anyhow!(e))
    }

    /// 当前选择
    pub fn selection(&self) -> Result<RefreshSelection> {
        Ok(RefreshSelection::new(self.metric()?, self.window()?).with_sensor(self.sensor.clone()))
    }
}

impl AlertsConfig {
    pub fn policy(&self) -> AlertPolicy {
        AlertPolicy {
            medium_confidence_min: self.medium_confidence_min,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_global_config() {
        let config = GlobalConfig::default();
        assert_eq!(config.system.name, "AIRE Air Quality Monitor");
        assert_eq!(config.monitor.refresh_interval_secs, 30);
        assert_eq!(config.alerts.medium_confidence_min, 80.0);
        assert_eq!(config.export.rows_per_page, 25);
        assert!(config.thresholds.is_empty());
    }

    #[test]
    fn test_default_selection() {
        let selection = MonitorConfig::default().selection().unwrap();
        assert_eq!(selection.metric, MetricKind::Co2);
        assert_eq!(selection.window, WindowRange::Week);
        assert_eq!(selection.sensor, "Todos los sensores");
    }

    #[test]
    fn test_invalid_selection() {
        let monitor = MonitorConfig {
            metric: "ozone".to_string(),
            ..Default::default()
        };
        assert!(monitor.selection().is_err());

        let monitor = MonitorConfig {
            window: "decade".to_string(),
            ..Default::default()
        };
        assert!(monitor.window().is_err());
    }
}
