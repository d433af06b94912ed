use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::debug;

use crate::aggregator::validate_confidence;
use crate::error::Result;
use crate::model::{Alert, AlertTier, MetricKind, PredictionPoint, Severity};
use crate::threshold::ThresholdRegistry;

/// 告警分级策略
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlertPolicy {
    /// 中等告警所需的最低置信度，低于该值的 severity 1 告警降级为 info
    pub medium_confidence_min: f64,
}

impl Default for AlertPolicy {
    fn default() -> Self {
        Self {
            medium_confidence_min: 80.0,
        }
    }
}

impl AlertPolicy {
    pub fn tier_for(&self, severity: Severity, confidence_percent: f64) -> Option<AlertTier> {
        match severity {
            Severity::Normal => None,
            Severity::Critical => Some(AlertTier::High),
            Severity::Elevated if confidence_percent >= self.medium_confidence_min => {
                Some(AlertTier::Medium)
            }
            Severity::Elevated => Some(AlertTier::Info),
        }
    }
}

struct Candidate<'a> {
    index: usize,
    point: &'a PredictionPoint,
    threshold: f64,
    severity: Severity,
    tier: AlertTier,
}

impl Candidate<'_> {
    fn outranks(&self, other: &Candidate<'_>) -> bool {
        (self.tier, self.severity)
            .cmp(&(other.tier, other.severity))
            .then_with(|| self.point.predicted_value.total_cmp(&other.point.predicted_value))
            == Ordering::Greater
    }
}

impl ThresholdRegistry {
    /// 根据预测序列生成告警
    ///
    /// 排序：等级降序，预测值降序，原始时间顺序升序。同一时间点只保留最严重的一条。
    pub fn derive_alerts(
        &self,
        policy: &AlertPolicy,
        points: &[PredictionPoint],
        metric: MetricKind,
    ) -> Result<Vec<Alert>> {
        let mut candidates: Vec<Candidate> = Vec::new();
        let mut by_timestamp: HashMap<&str, usize> = HashMap::new();

        for (index, point) in points.iter().enumerate() {
            validate_confidence(point.confidence_percent)?;

            let (lower, band) = self.matching_band(point.predicted_value, metric)?;
            let Some(tier) = policy.tier_for(band.severity, point.confidence_percent) else {
                continue;
            };

            let candidate = Candidate {
                index,
                point,
                // 最低分段的 severity 恒为 0，命中的分段必有下界
                threshold: lower.unwrap_or(point.predicted_value),
                severity: band.severity,
                tier,
            };

            match by_timestamp.get(point.timestamp.as_str()) {
                Some(&slot) => {
                    debug!(
                        metric = %metric,
                        timestamp = %point.timestamp,
                        "Duplicate prediction timestamp, keeping most severe"
                    );
                    if candidate.outranks(&candidates[slot]) {
                        candidates[slot] = candidate;
                    }
                }
                None => {
                    by_timestamp.insert(point.timestamp.as_str(), candidates.len());
                    candidates.push(candidate);
                }
            }
        }

        candidates.sort_by(|a, b| {
            b.tier
                .cmp(&a.tier)
                .then_with(|| b.point.predicted_value.total_cmp(&a.point.predicted_value))
                .then_with(|| a.index.cmp(&b.index))
        });

        let alerts: Vec<Alert> = candidates
            .into_iter()
            .enumerate()
            .map(|(position, candidate)| Alert {
                id: position as u32 + 1,
                metric,
                current_value: candidate.point.current_value,
                predicted_value: candidate.point.predicted_value,
                threshold: candidate.threshold,
                timestamp: candidate.point.timestamp.clone(),
                confidence_percent: candidate.point.confidence_percent,
                severity: candidate.severity,
                tier: candidate.tier,
                message: alert_message(metric, &candidate.point.timestamp),
                recommendation: recommendation(metric, candidate.tier).to_string(),
            })
            .collect();

        debug!(metric = %metric, points = points.len(), alerts = alerts.len(), "Alerts derived");

        Ok(alerts)
    }
}

/// 使用内置阈值表与默认策略生成告警
pub fn derive_alerts(points: &[PredictionPoint], metric: MetricKind) -> Result<Vec<Alert>> {
    ThresholdRegistry::global().derive_alerts(&AlertPolicy::default(), points, metric)
}

pub fn alert_message(metric: MetricKind, timestamp: &str) -> String {
    format!(
        "Niveles de {} por encima del umbral previstos para las {}",
        metric.display_name(),
        timestamp
    )
}

/// 建议措施，仅取决于指标与告警等级
pub fn recommendation(metric: MetricKind, tier: AlertTier) -> &'static str {
    match (metric, tier) {
        (MetricKind::Co2, AlertTier::High) => "Abrir ventanas y activar sistema de ventilación",
        (MetricKind::Co2, AlertTier::Medium) => "Ventilar el aula en los próximos minutos",
        (MetricKind::Co2, AlertTier::Info) => "Vigilar la ventilación del aula",
        (MetricKind::Pm25 | MetricKind::Pm10, AlertTier::High) => {
            "Evitar actividad física intensa y mantener ventanas cerradas"
        }
        (MetricKind::Pm25 | MetricKind::Pm10, AlertTier::Medium) => {
            "Limitar actividades físicas intensas"
        }
        (MetricKind::Pm25 | MetricKind::Pm10, AlertTier::Info) => {
            "Vigilar la concentración de partículas"
        }
        (MetricKind::Humidity, AlertTier::High | AlertTier::Medium) => {
            "Activar deshumidificador y mejorar la ventilación"
        }
        (MetricKind::Humidity, AlertTier::Info) => "Activar deshumidificador si es necesario",
        (MetricKind::Temperature, AlertTier::High | AlertTier::Medium) => {
            "Mantener hidratación y activar sistemas de enfriamiento"
        }
        (MetricKind::Temperature, AlertTier::Info) => "Asegurar buena ventilación del aula",
        (MetricKind::Uv, AlertTier::High) => "Evitar actividades al aire libre y usar protección solar",
        (MetricKind::Uv, AlertTier::Medium) => "Usar protección solar en el exterior",
        (MetricKind::Uv, AlertTier::Info) => "Vigilar la exposición solar",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AireError;

    fn point(t: &str, predicted: f64, confidence: f64) -> PredictionPoint {
        PredictionPoint::new(t, predicted, predicted, confidence)
    }

    #[test]
    fn test_critical_overrides_confidence() {
        let alerts = derive_alerts(&[point("14:00", 1280.0, 75.0)], MetricKind::Co2).unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].tier, AlertTier::High);
        assert_eq!(alerts[0].severity, Severity::Critical);
        assert_eq!(alerts[0].threshold, 1000.0);
        assert_eq!(alerts[0].id, 1);
    }

    #[test]
    fn test_pm25_58_is_high() {
        let alerts = derive_alerts(&[point("14:00", 58.0, 76.0)], MetricKind::Pm25).unwrap();
        assert_eq!(alerts[0].tier, AlertTier::High);
        assert_eq!(alerts[0].threshold, 55.0);
    }

    #[test]
    fn test_moderate_breach_depends_on_confidence() {
        let alerts = derive_alerts(
            &[point("08:00", 48.0, 82.0), point("12:00", 50.0, 79.9)],
            MetricKind::Pm25,
        )
        .unwrap();

        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].tier, AlertTier::Medium);
        assert_eq!(alerts[0].timestamp, "08:00");
        assert_eq!(alerts[1].tier, AlertTier::Info);
        assert_eq!(alerts[1].threshold, 35.0);
    }

    #[test]
    fn test_no_alerts_below_threshold() {
        let alerts = derive_alerts(
            &[point("00:00", 430.0, 95.0), point("02:00", 385.0, 92.0)],
            MetricKind::Co2,
        )
        .unwrap();
        assert!(alerts.is_empty());
    }

    #[test]
    fn test_ordering_and_ties() {
        let points = vec![
            point("08:00", 900.0, 90.0),
            point("10:00", 1020.0, 82.0),
            point("12:00", 1150.0, 78.0),
            point("14:00", 1150.0, 75.0),
            point("16:00", 850.0, 60.0),
        ];
        let alerts = derive_alerts(&points, MetricKind::Co2).unwrap();
        let order: Vec<&str> = alerts.iter().map(|a| a.timestamp.as_str()).collect();

        assert_eq!(order, vec!["12:00", "14:00", "10:00", "08:00", "16:00"]);
        let ids: Vec<u32> = alerts.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_idempotent() {
        let points = vec![point("10:00", 1020.0, 82.0), point("08:00", 820.0, 85.0)];
        let first = derive_alerts(&points, MetricKind::Co2).unwrap();
        let second = derive_alerts(&points, MetricKind::Co2).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_duplicate_timestamp_keeps_most_severe() {
        let points = vec![
            point("14:00", 900.0, 95.0),
            point("14:00", 1100.0, 60.0),
            point("14:00", 950.0, 99.0),
        ];
        let alerts = derive_alerts(&points, MetricKind::Co2).unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].predicted_value, 1100.0);
        assert_eq!(alerts[0].tier, AlertTier::High);
    }

    #[test]
    fn test_invalid_confidence() {
        for confidence in [-1.0, 100.5, f64::NAN] {
            let result = derive_alerts(&[point("00:00", 430.0, confidence)], MetricKind::Co2);
            assert!(matches!(result, Err(AireError::InvalidConfidence(_))));
        }
        assert!(derive_alerts(&[point("00:00", 1200.0, 100.0)], MetricKind::Co2).is_ok());
        assert!(derive_alerts(&[point("00:00", 1200.0, 0.0)], MetricKind::Co2).is_ok());
    }

    #[test]
    fn test_custom_policy() {
        let policy = AlertPolicy {
            medium_confidence_min: 70.0,
        };
        let alerts = ThresholdRegistry::global()
            .derive_alerts(&policy, &[point("04:00", 82.0, 76.0)], MetricKind::Humidity)
            .unwrap();
        assert_eq!(alerts[0].tier, AlertTier::Medium);
        assert_eq!(alerts[0].threshold, 70.0);
    }

    #[test]
    fn test_message_and_recommendation() {
        let alerts = derive_alerts(&[point("14:00", 1280.0, 75.0)], MetricKind::Co2).unwrap();
        assert_eq!(
            alerts[0].message,
            "Niveles de CO₂ por encima del umbral previstos para las 14:00"
        );
        assert_eq!(
            alerts[0].recommendation,
            "Abrir ventanas y activar sistema de ventilación"
        );
    }
}
