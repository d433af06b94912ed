use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

use crate::error::{AireError, Result};
use crate::model::{MetricKind, Sample};
use crate::threshold::ThresholdRegistry;

/// 分隔符
pub const DELIMITER: char = ',';

pub const REPORT_TITLE: &str = "Reporte de Calidad del Aire";

pub const DEFAULT_SENSOR_LABEL: &str = "Todos los sensores";

const DATE_COLUMN: &str = "Fecha";

/// 多指标宽表导出的列（紫外线没有历史记录，不参与导出）
pub const WIDE_EXPORT_METRICS: [MetricKind; 5] = [
    MetricKind::Co2,
    MetricKind::Pm25,
    MetricKind::Pm10,
    MetricKind::Humidity,
    MetricKind::Temperature,
];

/// 表格单元
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Number(f64),
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(text) => f.write_str(text),
            Cell::Number(value) => f.write_str(&format_value(*value)),
        }
    }
}

/// 报表数据表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

/// 报表文档，下载与预览共用同一结构
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDocument {
    pub header: Vec<String>,
    pub table: ReportTable,
}

/// 报表元信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMeta {
    /// 时间段描述，例如 `Última semana`
    pub window_label: String,
    pub sensor_label: String,
    pub generated_at: DateTime<Utc>,
}

impl ReportMeta {
    pub fn new(window_label: impl Into<String>, generated_at: DateTime<Utc>) -> Self {
        Self {
            window_label: window_label.into(),
            sensor_label: DEFAULT_SENSOR_LABEL.to_string(),
            generated_at,
        }
    }

    pub fn with_sensor(mut self, sensor_label: impl Into<String>) -> Self {
        self.sensor_label = sensor_label.into();
        self
    }
}

/// 数值格式化：整数不带小数位，其余使用最短可还原表示
pub fn format_value(value: f64) -> String {
    value.to_string()
}

fn check_label(label: &str) -> Result<()> {
    if label.contains(DELIMITER) || label.contains('\n') || label.contains('\r') {
        return Err(AireError::InvalidSample(format!(
            "label {:?} contains a delimiter or line break",
            label
        )));
    }
    Ok(())
}

fn check_sample(sample: &Sample) -> Result<()> {
    check_label(&sample.timestamp)?;
    if !sample.value.is_finite() {
        return Err(AireError::InvalidSample(format!(
            "{} value at {} must be finite",
            sample.metric, sample.timestamp
        )));
    }
    Ok(())
}

fn join_row<I, S>(fields: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut line = fields
        .into_iter()
        .map(|field| field.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(&DELIMITER.to_string());
    line.push('\n');
    line
}

/// 单指标分隔文本：表头 + 每个样本一行，保持输入顺序
pub fn to_delimited_text(samples: &[Sample], metric: MetricKind) -> Result<String> {
    let mut out = join_row([DATE_COLUMN.to_string(), metric.label()]);

    for sample in samples {
        if sample.metric != metric {
            return Err(AireError::MetricMismatch {
                expected: metric,
                found: sample.metric,
            });
        }
        check_sample(sample)?;
        out.push_str(&join_row([sample.timestamp.clone(), format_value(sample.value)]));
    }

    Ok(out)
}

/// 多指标宽表：每个时间标签一行（按首次出现顺序），缺失值留空
pub fn to_wide_delimited_text(samples: &[Sample], metrics: &[MetricKind]) -> Result<String> {
    let mut columns = vec![DATE_COLUMN.to_string()];
    columns.extend(metrics.iter().map(MetricKind::label));
    let mut out = join_row(columns);

    let mut order: Vec<&str> = Vec::new();
    let mut rows: HashMap<&str, Vec<Option<f64>>> = HashMap::new();

    for sample in samples {
        let Some(column) = metrics.iter().position(|metric| *metric == sample.metric) else {
            debug!(metric = %sample.metric, "Sample metric not selected for export, skipped");
            continue;
        };
        check_sample(sample)?;

        let row = rows.entry(sample.timestamp.as_str()).or_insert_with(|| {
            order.push(sample.timestamp.as_str());
            vec![None; metrics.len()]
        });
        if row[column].is_some() {
            return Err(AireError::InvalidSample(format!(
                "duplicate {} sample at {}",
                sample.metric, sample.timestamp
            )));
        }
        row[column] = Some(sample.value);
    }

    for timestamp in order {
        let mut fields = vec![timestamp.to_string()];
        if let Some(values) = rows.get(timestamp) {
            fields.extend(values.iter().map(|value| value.map(format_value).unwrap_or_default()));
        }
        out.push_str(&join_row(fields));
    }

    Ok(out)
}

impl ThresholdRegistry {
    /// 生成报表文档：表头信息 + 汇总统计 + (时间, 数值, 状态) 数据行
    pub fn report_document(
        &self,
        samples: &[Sample],
        metric: MetricKind,
        meta: &ReportMeta,
    ) -> Result<ReportDocument> {
        let summary = self.aggregate(samples, metric)?;

        let mut rows = Vec::with_capacity(samples.len());
        for sample in samples {
            check_label(&sample.timestamp)?;
            let classification = self.classify(sample.value, metric)?;
            rows.push(vec![
                Cell::Text(sample.timestamp.clone()),
                Cell::Number(sample.value),
                Cell::Text(classification.status),
            ]);
        }

        let header = vec![
            REPORT_TITLE.to_string(),
            format!("Período: {}", meta.window_label),
            format!("Métrica: {}", metric.label()),
            format!("Sensor: {}", meta.sensor_label),
            format!("Fecha de generación: {}", meta.generated_at.format("%d/%m/%Y")),
            format!("Promedio: {:.1}", summary.mean),
            format!("Máximo: {}", format_value(summary.max)),
            format!("Mínimo: {}", format_value(summary.min)),
            format!("Alertas: {}", summary.count_above_threshold),
        ];

        Ok(ReportDocument {
            header,
            table: ReportTable {
                columns: vec![
                    DATE_COLUMN.to_string(),
                    "Valor".to_string(),
                    "Estado".to_string(),
                ],
                rows,
            },
        })
    }
}

/// 使用内置阈值表生成报表文档
pub fn to_report_document(
    samples: &[Sample],
    metric: MetricKind,
    window_label: &str,
    generated_at: DateTime<Utc>,
) -> Result<ReportDocument> {
    ThresholdRegistry::global().report_document(
        samples,
        metric,
        &ReportMeta::new(window_label, generated_at),
    )
}

impl ReportDocument {
    /// 数据表的分隔文本形式
    pub fn to_delimited_text(&self) -> String {
        let mut out = join_row(&self.table.columns);
        for row in &self.table.rows {
            out.push_str(&join_row(row.iter().map(Cell::to_string)));
        }
        out
    }

    /// 分页纯文本排版，每页重复表头
    pub fn render_pages(&self, rows_per_page: usize) -> Vec<String> {
        let rows_per_page = rows_per_page.max(1);
        let widths = self.column_widths();
        let chunks: Vec<&[Vec<Cell>]> = if self.table.rows.is_empty() {
            vec![&[]]
        } else {
            self.table.rows.chunks(rows_per_page).collect()
        };
        let total = chunks.len();

        chunks
            .into_iter()
            .enumerate()
            .map(|(index, rows)| {
                let mut page = String::new();
                for line in &self.header {
                    page.push_str(line);
                    page.push('\n');
                }
                page.push('\n');
                page.push_str(&pad_row(self.table.columns.iter().cloned(), &widths));
                for row in rows {
                    page.push_str(&pad_row(row.iter().map(Cell::to_string), &widths));
                }
                page.push('\n');
                page.push_str(&format!("Página {}/{}\n", index + 1, total));
                page
            })
            .collect()
    }

    fn column_widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self
            .table
            .columns
            .iter()
            .map(|column| column.chars().count())
            .collect();
        for row in &self.table.rows {
            for (index, cell) in row.iter().enumerate() {
                let len = cell.to_string().chars().count();
                match widths.get_mut(index) {
                    Some(width) => *width = (*width).max(len),
                    None => widths.push(len),
                }
            }
        }
        widths
    }
}

fn pad_row<I: IntoIterator<Item = String>>(fields: I, widths: &[usize]) -> String {
    let padded: Vec<String> = fields
        .into_iter()
        .enumerate()
        .map(|(index, field)| {
            let width = widths.get(index).copied().unwrap_or(0);
            let fill = width.saturating_sub(field.chars().count());
            format!("{}{}", field, " ".repeat(fill))
        })
        .collect();
    let mut line = padded.join("  ").trim_end().to_string();
    line.push('\n');
    line
}
