use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{AireError, Result};
use crate::fixtures;
use crate::model::{MetricKind, PredictionPoint, Sample, WindowRange};
use crate::report::DEFAULT_SENSOR_LABEL;

/// 样本数据源
#[async_trait]
pub trait SampleSource: Send + Sync {
    /// 指定指标与时间范围的有序样本
    async fn samples(&self, metric: MetricKind, window: WindowRange) -> Result<Vec<Sample>>;

    /// 每个指标的最新读数
    async fn current_readings(&self) -> Result<Vec<(MetricKind, f64)>> {
        let mut readings = Vec::new();
        for metric in MetricKind::ALL {
            if let Some(latest) = self.samples(metric, WindowRange::Week).await?.pop() {
                readings.push((metric, latest.value));
            }
        }
        Ok(readings)
    }

    /// 数据源名称
    fn name(&self) -> &str;
}

/// 预测数据源
#[async_trait]
pub trait PredictionSource: Send + Sync {
    async fn prediction_points(&self, metric: MetricKind) -> Result<Vec<PredictionPoint>>;
}

/// 导出目标
#[async_trait]
pub trait ExportSink: Send + Sync {
    /// 写出文件内容，返回保存位置
    async fn export(&self, name: &str, contents: &str) -> Result<String>;
}

/// 当前选择的指标、时间范围与传感器
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshSelection {
    pub metric: MetricKind,
    pub window: WindowRange,
    pub sensor: String,
}

impl RefreshSelection {
    pub fn new(metric: MetricKind, window: WindowRange) -> Self {
        Self {
            metric,
            window,
            sensor: DEFAULT_SENSOR_LABEL.to_string(),
        }
    }

    pub fn with_sensor(mut self, sensor: impl Into<String>) -> Self {
        self.sensor = sensor.into();
        self
    }
}

/// 内置演示数据源
#[derive(Debug, Clone, Default)]
pub struct FixtureSource;

impl FixtureSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SampleSource for FixtureSource {
    async fn samples(&self, metric: MetricKind, window: WindowRange) -> Result<Vec<Sample>> {
        let history = fixtures::history(metric, window);
        if history.is_empty() {
            // 紫外线只有当日曲线，任何时间范围都返回逐时数据
            return Ok(fixtures::hourly(metric));
        }
        Ok(history)
    }

    async fn current_readings(&self) -> Result<Vec<(MetricKind, f64)>> {
        Ok(fixtures::LIVE_READINGS.to_vec())
    }

    fn name(&self) -> &str {
        "fixtures"
    }
}

#[async_trait]
impl PredictionSource for FixtureSource {
    async fn prediction_points(&self, metric: MetricKind) -> Result<Vec<PredictionPoint>> {
        Ok(fixtures::predictions(metric))
    }
}

/// 本地目录导出
#[derive(Debug, Clone)]
pub struct FileExportSink {
    root: PathBuf,
}

impl FileExportSink {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ExportSink for FileExportSink {
    async fn export(&self, name: &str, contents: &str) -> Result<String> {
        let file_name = Path::new(name);
        if name.is_empty() || file_name.components().count() != 1 || file_name.is_absolute() {
            return Err(AireError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("export name must be a plain file name: {:?}", name),
            )));
        }

        tokio::fs::create_dir_all(&self.root).await?;
        let path = self.root.join(file_name);
        tokio::fs::write(&path, contents).await?;

        info!(path = %path.display(), bytes = contents.len(), "Report exported");

        Ok(path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_fixture_source() {
        let source = FixtureSource::new();
        let samples = source.samples(MetricKind::Co2, WindowRange::Year).await.unwrap();
        assert_eq!(samples.len(), 12);
        assert_eq!(source.name(), "fixtures");

        let readings = source.current_readings().await.unwrap();
        assert_eq!(readings.len(), MetricKind::ALL.len());
    }

    #[tokio::test]
    async fn test_fixture_source_serves_uv_hourly_curve() {
        let source = FixtureSource::new();
        for window in [WindowRange::Week, WindowRange::Month, WindowRange::Year] {
            let samples = source.samples(MetricKind::Uv, window).await.unwrap();
            assert_eq!(samples.len(), 8);
            assert_eq!(samples[3].timestamp, "12");
            assert_eq!(samples[3].value, 8.0);
        }
    }

    #[test]
    fn test_fixture_predictions() {
        let source = FixtureSource::new();
        let points = tokio_test::block_on(source.prediction_points(MetricKind::Pm25)).unwrap();
        assert_eq!(points[7].predicted_value, 58.0);
        assert_eq!(points[7].confidence_percent, 76.0);
    }

    struct WeekOnly;

    #[async_trait]
    impl SampleSource for WeekOnly {
        async fn samples(&self, metric: MetricKind, window: WindowRange) -> Result<Vec<Sample>> {
            Ok(fixtures::history(metric, window))
        }

        fn name(&self) -> &str {
            "week-only"
        }
    }

    #[tokio::test]
    async fn test_default_current_readings_use_latest_sample() {
        let readings = WeekOnly.current_readings().await.unwrap();
        // 紫外线无历史数据
        assert_eq!(readings.len(), 5);
        assert_eq!(readings[0], (MetricKind::Co2, 580.0));
    }

    #[tokio::test]
    async fn test_file_export_sink() {
        let dir = tempdir().unwrap();
        let sink = FileExportSink::new(dir.path().join("reports"));

        let location = sink.export("reporte.csv", "Fecha,CO₂ (ppm)\n").await.unwrap();
        let written = std::fs::read_to_string(&location).unwrap();
        assert_eq!(written, "Fecha,CO₂ (ppm)\n");
        assert!(location.ends_with("reporte.csv"));
    }

    #[tokio::test]
    async fn test_file_export_rejects_paths() {
        let dir = tempdir().unwrap();
        let sink = FileExportSink::new(dir.path());

        assert!(sink.export("../escape.csv", "x").await.is_err());
        assert!(sink.export("", "x").await.is_err());
    }

    #[test]
    fn test_refresh_selection() {
        let selection = RefreshSelection::new(MetricKind::Pm10, WindowRange::Month).with_sensor("Laboratorio");
        assert_eq!(selection.sensor, "Laboratorio");
        assert_eq!(selection.window, WindowRange::Month);
    }
}
