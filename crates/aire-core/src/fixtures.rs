use crate::model::{MetricKind, PredictionPoint, Sample, WindowRange};

/// 历史数据行：(标签, CO₂, PM2.5, PM10, 湿度, 温度)
type HistoryRow = (&'static str, f64, f64, f64, f64, f64);

/// 预测数据：(时间, 当前值, 预测值, 置信度)
type PredictionRow = (&'static str, f64, f64, f64);

const WEEKLY: &[HistoryRow] = &[
    ("Lun", 850.0, 45.0, 62.0, 68.0, 26.0),
    ("Mar", 920.0, 48.0, 65.0, 70.0, 27.0),
    ("Mié", 780.0, 42.0, 58.0, 65.0, 25.0),
    ("Jue", 1050.0, 52.0, 70.0, 72.0, 28.0),
    ("Vie", 890.0, 46.0, 63.0, 69.0, 26.0),
    ("Sáb", 650.0, 35.0, 48.0, 60.0, 24.0),
    ("Dom", 580.0, 32.0, 45.0, 58.0, 23.0),
];

const MONTHLY: &[HistoryRow] = &[
    ("Sem 1", 825.0, 42.0, 58.0, 66.0, 25.0),
    ("Sem 2", 890.0, 48.0, 65.0, 70.0, 27.0),
    ("Sem 3", 920.0, 45.0, 62.0, 68.0, 26.0),
    ("Sem 4", 850.0, 50.0, 68.0, 72.0, 28.0),
];

const YEARLY: &[HistoryRow] = &[
    ("Ene", 780.0, 38.0, 52.0, 65.0, 22.0),
    ("Feb", 820.0, 42.0, 58.0, 68.0, 24.0),
    ("Mar", 860.0, 45.0, 62.0, 70.0, 26.0),
    ("Abr", 890.0, 48.0, 65.0, 72.0, 28.0),
    ("May", 920.0, 50.0, 68.0, 75.0, 30.0),
    ("Jun", 950.0, 52.0, 70.0, 78.0, 32.0),
    ("Jul", 930.0, 48.0, 66.0, 76.0, 31.0),
    ("Ago", 900.0, 46.0, 64.0, 74.0, 29.0),
    ("Sep", 870.0, 44.0, 60.0, 70.0, 27.0),
    ("Oct", 840.0, 42.0, 58.0, 68.0, 25.0),
    ("Nov", 810.0, 40.0, 55.0, 66.0, 23.0),
    ("Dic", 790.0, 38.0, 52.0, 64.0, 21.0),
];

const HOURLY_CO2: &[(&str, f64)] = &[
    ("6:00", 420.0),
    ("7:00", 580.0),
    ("8:00", 750.0),
    ("9:00", 920.0),
    ("10:00", 1050.0),
    ("11:00", 980.0),
    ("12:00", 650.0),
    ("13:00", 890.0),
    ("14:00", 1200.0),
    ("15:00", 1100.0),
    ("16:00", 850.0),
    ("17:00", 620.0),
    ("18:00", 480.0),
    ("19:00", 420.0),
];

const HOURLY_UV: &[(&str, f64)] = &[
    ("06", 1.0),
    ("08", 3.0),
    ("10", 6.0),
    ("12", 8.0),
    ("14", 7.0),
    ("16", 5.0),
    ("18", 2.0),
    ("20", 0.0),
];

/// (时间, PM2.5, PM10)
const HOURLY_PM: &[(&str, f64, f64)] = &[
    ("00", 30.0, 45.0),
    ("04", 25.0, 40.0),
    ("08", 45.0, 62.0),
    ("12", 55.0, 70.0),
    ("16", 48.0, 65.0),
    ("20", 35.0, 52.0),
];

const HOURLY_HUMIDITY: &[(&str, f64)] = &[
    ("00", 75.0),
    ("04", 80.0),
    ("08", 68.0),
    ("12", 65.0),
    ("16", 70.0),
    ("20", 72.0),
];

const CO2_PREDICTIONS: &[PredictionRow] = &[
    ("00:00", 420.0, 430.0, 95.0),
    ("02:00", 380.0, 385.0, 92.0),
    ("04:00", 350.0, 360.0, 94.0),
    ("06:00", 400.0, 420.0, 88.0),
    ("08:00", 750.0, 780.0, 85.0),
    ("10:00", 950.0, 1020.0, 82.0),
    ("12:00", 1100.0, 1150.0, 78.0),
    ("14:00", 1200.0, 1280.0, 75.0),
    ("16:00", 1050.0, 1100.0, 80.0),
    ("18:00", 800.0, 820.0, 87.0),
    ("20:00", 650.0, 680.0, 90.0),
    ("22:00", 480.0, 500.0, 93.0),
];

const PM25_PREDICTIONS: &[PredictionRow] = &[
    ("00:00", 25.0, 28.0, 88.0),
    ("02:00", 22.0, 24.0, 90.0),
    ("04:00", 20.0, 22.0, 92.0),
    ("06:00", 35.0, 38.0, 85.0),
    ("08:00", 45.0, 48.0, 82.0),
    ("10:00", 52.0, 55.0, 78.0),
    ("12:00", 48.0, 50.0, 80.0),
    ("14:00", 55.0, 58.0, 76.0),
    ("16:00", 50.0, 52.0, 83.0),
    ("18:00", 42.0, 45.0, 86.0),
    ("20:00", 35.0, 37.0, 89.0),
    ("22:00", 30.0, 32.0, 91.0),
];

const HUMIDITY_PREDICTIONS: &[PredictionRow] = &[
    ("00:00", 75.0, 77.0, 94.0),
    ("02:00", 78.0, 80.0, 95.0),
    ("04:00", 80.0, 82.0, 96.0),
    ("06:00", 75.0, 76.0, 93.0),
    ("08:00", 68.0, 70.0, 90.0),
    ("10:00", 65.0, 66.0, 88.0),
    ("12:00", 62.0, 64.0, 85.0),
    ("14:00", 58.0, 60.0, 87.0),
    ("16:00", 60.0, 62.0, 89.0),
    ("18:00", 65.0, 67.0, 91.0),
    ("20:00", 70.0, 72.0, 93.0),
    ("22:00", 73.0, 75.0, 95.0),
];

/// 实时面板读数
pub const LIVE_READINGS: [(MetricKind, f64); 6] = [
    (MetricKind::Co2, 850.0),
    (MetricKind::Pm25, 45.0),
    (MetricKind::Pm10, 62.0),
    (MetricKind::Humidity, 68.0),
    (MetricKind::Temperature, 26.0),
    (MetricKind::Uv, 7.0),
];

fn history_value(row: &HistoryRow, metric: MetricKind) -> Option<f64> {
    let (_, co2, pm25, pm10, humidity, temperature) = *row;
    match metric {
        MetricKind::Co2 => Some(co2),
        MetricKind::Pm25 => Some(pm25),
        MetricKind::Pm10 => Some(pm10),
        MetricKind::Humidity => Some(humidity),
        MetricKind::Temperature => Some(temperature),
        MetricKind::Uv => None,
    }
}

/// 历史窗口样本；紫外线没有历史记录，返回空序列
pub fn history(metric: MetricKind, window: WindowRange) -> Vec<Sample> {
    let rows = match window {
        WindowRange::Week => WEEKLY,
        WindowRange::Month => MONTHLY,
        WindowRange::Year => YEARLY,
    };

    rows.iter()
        .filter_map(|row| history_value(row, metric).map(|value| Sample::new(row.0, metric, value)))
        .collect()
}

/// 当日逐时曲线；温度没有逐时数据
pub fn hourly(metric: MetricKind) -> Vec<Sample> {
    let rows: Vec<(&str, f64)> = match metric {
        MetricKind::Co2 => HOURLY_CO2.to_vec(),
        MetricKind::Uv => HOURLY_UV.to_vec(),
        MetricKind::Humidity => HOURLY_HUMIDITY.to_vec(),
        MetricKind::Pm25 => HOURLY_PM.iter().map(|(time, pm25, _)| (*time, *pm25)).collect(),
        MetricKind::Pm10 => HOURLY_PM.iter().map(|(time, _, pm10)| (*time, *pm10)).collect(),
        MetricKind::Temperature => Vec::new(),
    };
    rows.into_iter()
        .map(|(time, value)| Sample::new(time, metric, value))
        .collect()
}

/// 未来 24 小时预测；没有预测模型的指标返回空序列
pub fn predictions(metric: MetricKind) -> Vec<PredictionPoint> {
    let rows: &[PredictionRow] = match metric {
        MetricKind::Co2 => CO2_PREDICTIONS,
        MetricKind::Pm25 => PM25_PREDICTIONS,
        MetricKind::Humidity => HUMIDITY_PREDICTIONS,
        _ => &[],
    };
    rows.iter()
        .map(|(time, current, predicted, confidence)| {
            PredictionPoint::new(*time, *current, *predicted, *confidence)
        })
        .collect()
}
