use aire_core::{
    AggregateResult, AireError, Alert, AlertPolicy, ClassificationResult, MetricKind,
    PredictionSource, RefreshSelection, SampleSource, ThresholdRegistry,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{error, info, warn};

/// 一次刷新的结果；所选指标的聚合或告警失败不影响实时读数
#[derive(Debug)]
pub struct RefreshReport {
    pub live: Vec<(MetricKind, aire_core::Result<ClassificationResult>)>,
    pub aggregate: aire_core::Result<AggregateResult>,
    pub alerts: aire_core::Result<Vec<Alert>>,
}

/// 周期刷新服务
pub struct Monitor {
    samples: Arc<dyn SampleSource>,
    predictions: Arc<dyn PredictionSource>,
    registry: Arc<ThresholdRegistry>,
    policy: AlertPolicy,
    selection: RefreshSelection,

    /// 刷新间隔（秒）
    refresh_interval_secs: u64,
}

impl Monitor {
    pub fn new(
        samples: Arc<dyn SampleSource>,
        predictions: Arc<dyn PredictionSource>,
        registry: Arc<ThresholdRegistry>,
        selection: RefreshSelection,
    ) -> Self {
        Self {
            samples,
            predictions,
            registry,
            policy: AlertPolicy::default(),
            selection,
            refresh_interval_secs: 30,
        }
    }

    pub fn with_policy(mut self, policy: AlertPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_refresh_interval(mut self, secs: u64) -> Self {
        self.refresh_interval_secs = secs.max(1);
        self
    }

    /// 重新读取数据并评估当前选择
    ///
    /// 只有读取实时读数失败时返回错误。
    pub async fn refresh(&self) -> aire_core::Result<RefreshReport> {
        let metric = self.selection.metric;

        let readings = self.samples.current_readings().await?;
        let live = self.registry.evaluate_snapshot(&readings);

        let aggregate = match self.samples.samples(metric, self.selection.window).await {
            Ok(samples) => self.registry.aggregate(&samples, metric),
            Err(e) => Err(e),
        };

        let alerts = match self.predictions.prediction_points(metric).await {
            Ok(points) => self.registry.derive_alerts(&self.policy, &points, metric),
            Err(e) => Err(e),
        };

        Ok(RefreshReport {
            live,
            aggregate,
            alerts,
        })
    }

    /// 按间隔刷新，直到 `shutdown` 完成或达到 `ticks` 次；返回完成的刷新次数
    pub async fn run_until<F>(&self, ticks: Option<u64>, shutdown: F) -> u64
    where
        F: Future<Output = ()>,
    {
        let mut interval = interval(Duration::from_secs(self.refresh_interval_secs));
        let mut completed = 0u64;
        tokio::pin!(shutdown);

        info!(
            source = self.samples.name(),
            metric = %self.selection.metric,
            window = self.selection.window.tag(),
            sensor = %self.selection.sensor,
            interval_secs = self.refresh_interval_secs,
            "Monitor started"
        );

        loop {
            if ticks.map_or(false, |limit| completed >= limit) {
                break;
            }

            tokio::select! {
                _ = interval.tick() => {
                    completed += 1;
                    match self.refresh().await {
                        Ok(report) => log_report(&report),
                        Err(e) => log_failure("Refresh", &e),
                    }
                }
                _ = &mut shutdown => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        info!(ticks = completed, "Monitor stopped");
        completed
    }

    /// 刷新直到 Ctrl-C
    pub async fn run(&self, ticks: Option<u64>) -> u64 {
        self.run_until(ticks, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
    }
}

fn log_failure(what: &str, e: &AireError) {
    if e.is_validation() {
        warn!("{} skipped: {}", what, e);
    } else {
        error!("{} failed: {}", what, e);
    }
}

fn log_report(report: &RefreshReport) {
    match &report.aggregate {
        Ok(aggregate) => info!(
            metric = %aggregate.metric,
            window_size = aggregate.window_size,
            mean = aggregate.mean,
            max = aggregate.max,
            min = aggregate.min,
            above_threshold = aggregate.count_above_threshold,
            "Aggregate refreshed"
        ),
        Err(e) => log_failure("Aggregate", e),
    }

    match &report.alerts {
        Ok(alerts) => info!(alerts = alerts.len(), "Alerts refreshed"),
        Err(e) => log_failure("Alerts", e),
    }

    for (metric, result) in &report.live {
        match result {
            Ok(classification) if classification.severity.is_above_threshold() => {
                warn!(
                    metric = %metric,
                    value = classification.value,
                    status = %classification.status,
                    "Live reading above threshold"
                );
            }
            _ => {}
        }
    }
}
