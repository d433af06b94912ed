use aire_config::GlobalConfig;
use aire_core::{
    report::{format_value, WIDE_EXPORT_METRICS},
    summarize_predictions, to_delimited_text, to_wide_delimited_text, AlertPolicy, ExportSink,
    FileExportSink, FixtureSource, MetricKind, PredictionSource, RefreshSelection, ReportMeta,
    SampleSource, ThresholdRegistry, WindowRange,
};
use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

use crate::cli::ExportFormat;
use crate::monitor::Monitor;

/// 命令执行上下文
pub struct Context {
    pub config: GlobalConfig,
    pub registry: Arc<ThresholdRegistry>,
    pub policy: AlertPolicy,
    pub source: Arc<FixtureSource>,
}

impl Context {
    pub fn new(config: GlobalConfig, registry: ThresholdRegistry) -> Self {
        let policy = config.alerts.policy();
        Self {
            config,
            registry: Arc::new(registry),
            policy,
            source: Arc::new(FixtureSource::new()),
        }
    }

    /// 命令行参数覆盖配置中的默认选择
    pub fn selection(
        &self,
        metric: Option<MetricKind>,
        window: Option<WindowRange>,
    ) -> Result<RefreshSelection> {
        let mut selection = self.config.monitor.selection()?;
        if let Some(metric) = metric {
            selection.metric = metric;
        }
        if let Some(window) = window {
            selection.window = window;
        }
        Ok(selection)
    }
}

pub async fn status(ctx: &Context) -> Result<()> {
    let readings = ctx.source.current_readings().await?;

    for (metric, result) in ctx.registry.evaluate_snapshot(&readings) {
        match result {
            Ok(classification) => println!(
                "{:<20} {:>8}  {}",
                metric.label(),
                format_value(classification.value),
                classification.status
            ),
            Err(e) => println!("{:<20} {:>8}  {}", metric.label(), "-", e),
        }
    }
    Ok(())
}

pub async fn summary(ctx: &Context, selection: &RefreshSelection) -> Result<()> {
    let metric = selection.metric;
    let samples = ctx.source.samples(metric, selection.window).await?;
    let result = ctx.registry.aggregate(&samples, metric)?;

    println!("{} · {}", metric.label(), selection.window.period_label());
    println!("Promedio: {:.1}", result.mean);
    println!("Máximo: {}", format_value(result.max));
    println!("Mínimo: {}", format_value(result.min));
    println!("Alertas: {}", result.count_above_threshold);

    let points = ctx.source.prediction_points(metric).await?;
    if !points.is_empty() {
        let forecast = summarize_predictions(&points, metric)?;
        println!(
            "Pico previsto: {} a las {} (confianza media {:.1}%)",
            format_value(forecast.peak_predicted),
            forecast.peak_timestamp,
            forecast.average_confidence
        );
    }
    Ok(())
}

pub async fn alerts(ctx: &Context, metric: MetricKind, json: bool) -> Result<()> {
    let points = ctx.source.prediction_points(metric).await?;
    let alerts = ctx.registry.derive_alerts(&ctx.policy, &points, metric)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&alerts)?);
        return Ok(());
    }

    if alerts.is_empty() {
        println!("Sin alertas para {}", metric.display_name());
    }
    for alert in &alerts {
        println!(
            "#{} [{}] {} · previsto {} (umbral {}, confianza {}%)",
            alert.id,
            alert.tier,
            alert.message,
            format_value(alert.predicted_value),
            format_value(alert.threshold),
            format_value(alert.confidence_percent)
        );
        println!("    {}", alert.recommendation);
    }
    Ok(())
}

pub async fn export(
    ctx: &Context,
    selection: &RefreshSelection,
    format: ExportFormat,
) -> Result<String> {
    let window = selection.window;
    let contents = match format {
        ExportFormat::Csv => {
            let samples = ctx.source.samples(selection.metric, window).await?;
            to_delimited_text(&samples, selection.metric)?
        }
        ExportFormat::Wide => {
            let mut samples = Vec::new();
            for metric in WIDE_EXPORT_METRICS {
                samples.extend(ctx.source.samples(metric, window).await?);
            }
            to_wide_delimited_text(&samples, &WIDE_EXPORT_METRICS)?
        }
        ExportFormat::Text => {
            let samples = ctx.source.samples(selection.metric, window).await?;
            let meta = ReportMeta::new(window.period_label(), Utc::now())
                .with_sensor(selection.sensor.clone());
            let document = ctx
                .registry
                .report_document(&samples, selection.metric, &meta)?;
            document
                .render_pages(ctx.config.export.rows_per_page)
                .join("\n")
        }
    };

    let sink = FileExportSink::new(&ctx.config.export.output_dir);
    let location = sink
        .export(&window.export_file_name(format.extension()), &contents)
        .await?;
    println!("{}", location);
    Ok(location)
}

pub async fn watch(ctx: &Context, selection: RefreshSelection, ticks: Option<u64>) -> Result<()> {
    let monitor = Monitor::new(
        ctx.source.clone(),
        ctx.source.clone(),
        ctx.registry.clone(),
        selection,
    )
    .with_policy(ctx.policy)
    .with_refresh_interval(ctx.config.monitor.refresh_interval_secs);

    let completed = monitor.run(ticks).await;
    info!(ticks = completed, "Watch finished");
    Ok(())
}
